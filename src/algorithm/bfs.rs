use super::{
    AlgorithmCore, AlgorithmResult, ComputationState, GraphColor, OutEdgeFilter, OutEdges,
    RootHolder, ServiceRegistry,
};
use crate::event::Event;
use crate::graph::{Edge, VertexListGraph};
use ahash::RandomState;
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;
use std::rc::Rc;

/// A breadth-first traversal from a root vertex.
///
/// Visits vertices in frontier order, reporting each step on an event
/// channel: `examine_vertex` when a vertex is dequeued, `tree_edge` /
/// `non_tree_edge` per examined edge, `finish_vertex` once all of a
/// vertex's out-edges are done. Vertices unreachable from the root are
/// initialized but never examined; [`BreadthFirstSearch::visit`] resumes
/// the search from another root without re-whitening.
pub struct BreadthFirstSearch<'g, V, G> {
    core: AlgorithmCore,
    graph: &'g G,
    root: RootHolder<V>,
    colors: HashMap<V, GraphColor, RandomState>,
    queue: VecDeque<V>,
    out_edge_filter: Option<OutEdgeFilter<'g, V>>,
    initialize_vertex: Event<V>,
    start_vertex: Event<V>,
    examine_vertex: Event<V>,
    discover_vertex: Event<V>,
    finish_vertex: Event<V>,
    examine_edge: Event<Edge<V>>,
    tree_edge: Event<Edge<V>>,
    non_tree_edge: Event<Edge<V>>,
    gray_target: Event<Edge<V>>,
    black_target: Event<Edge<V>>,
}

impl<'g, V, G> BreadthFirstSearch<'g, V, G>
where
    V: Clone + Eq + Hash + 'static,
    G: VertexListGraph<V>,
{
    pub fn new(graph: &'g G) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            root: RootHolder::new(),
            colors: HashMap::with_hasher(RandomState::new()),
            queue: VecDeque::new(),
            out_edge_filter: None,
            initialize_vertex: Event::new(),
            start_vertex: Event::new(),
            examine_vertex: Event::new(),
            discover_vertex: Event::new(),
            finish_vertex: Event::new(),
            examine_edge: Event::new(),
            tree_edge: Event::new(),
            non_tree_edge: Event::new(),
            gray_target: Event::new(),
            black_target: Event::new(),
        }
    }

    /// Resolves services, including the cancel flag, from `services`
    /// instead of a private registry.
    pub fn with_host(mut self, services: Rc<ServiceRegistry>) -> Self {
        self.core = AlgorithmCore::with_host(services);
        self
    }

    /// Supplies the backing queue, e.g. one with preallocated capacity.
    /// Its contents are cleared when a run initializes.
    pub fn with_queue(mut self, queue: VecDeque<V>) -> Self {
        self.queue = queue;
        self
    }

    /// Supplies the backing color map. Cleared when a run initializes.
    pub fn with_colors(mut self, colors: HashMap<V, GraphColor, RandomState>) -> Self {
        self.colors = colors;
        self
    }

    /// Rewrites each vertex's out-edge walk before it is examined.
    pub fn with_out_edge_filter(
        mut self,
        filter: impl Fn(OutEdges<'g, V>) -> OutEdges<'g, V> + 'g,
    ) -> Self {
        self.out_edge_filter = Some(Box::new(filter));
        self
    }

    // ------------------------------------------------------------------
    // lifecycle
    // ------------------------------------------------------------------

    /// A handle on the lifecycle state machine, usable from inside event
    /// subscribers.
    pub fn core(&self) -> AlgorithmCore {
        self.core.clone()
    }

    pub fn state(&self) -> ComputationState {
        self.core.state()
    }

    pub fn abort(&self) {
        self.core.abort();
    }

    pub fn started(&self) -> &Event<()> {
        self.core.started()
    }

    pub fn finished(&self) -> &Event<()> {
        self.core.finished()
    }

    pub fn aborted(&self) -> &Event<()> {
        self.core.aborted()
    }

    pub fn state_changed(&self) -> &Event<()> {
        self.core.state_changed()
    }

    // ------------------------------------------------------------------
    // root
    // ------------------------------------------------------------------

    pub fn set_root_vertex(&mut self, root: V) {
        self.root.set_root(root);
    }

    pub fn clear_root_vertex(&mut self) {
        self.root.clear_root();
    }

    pub fn try_root_vertex(&self) -> Option<&V> {
        self.root.try_root()
    }

    pub fn root_vertex_changed(&self) -> &Event<()> {
        self.root.root_changed()
    }

    // ------------------------------------------------------------------
    // results
    // ------------------------------------------------------------------

    pub fn vertex_colors(&self) -> &HashMap<V, GraphColor, RandomState> {
        &self.colors
    }

    pub fn vertex_color(&self, v: &V) -> Option<GraphColor> {
        self.colors.get(v).copied()
    }

    // ------------------------------------------------------------------
    // events
    // ------------------------------------------------------------------

    pub fn initialize_vertex(&self) -> &Event<V> {
        &self.initialize_vertex
    }

    pub fn start_vertex(&self) -> &Event<V> {
        &self.start_vertex
    }

    pub fn examine_vertex(&self) -> &Event<V> {
        &self.examine_vertex
    }

    pub fn discover_vertex(&self) -> &Event<V> {
        &self.discover_vertex
    }

    pub fn finish_vertex(&self) -> &Event<V> {
        &self.finish_vertex
    }

    pub fn examine_edge(&self) -> &Event<Edge<V>> {
        &self.examine_edge
    }

    pub fn tree_edge(&self) -> &Event<Edge<V>> {
        &self.tree_edge
    }

    pub fn non_tree_edge(&self) -> &Event<Edge<V>> {
        &self.non_tree_edge
    }

    /// A non-tree edge whose target is still on the queue.
    pub fn gray_target(&self) -> &Event<Edge<V>> {
        &self.gray_target
    }

    /// A non-tree edge whose target was already finished.
    pub fn black_target(&self) -> &Event<Edge<V>> {
        &self.black_target
    }

    // ------------------------------------------------------------------
    // computation
    // ------------------------------------------------------------------

    /// Runs the search from the configured root. With no root set the run
    /// initializes colors and finishes without examining anything.
    pub fn compute(&mut self) -> AlgorithmResult<()> {
        self.core.begin_computation()?;
        self.initialize()?;
        self.internal_compute()?;
        self.core.end_computation()
    }

    pub fn compute_from(&mut self, root: V) -> AlgorithmResult<()> {
        self.set_root_vertex(root);
        self.compute()
    }

    /// Continues the search from `root` with the colors left by a prior
    /// run, so a second component can be swept without re-whitening the
    /// first. Must run between `begin_computation` and `end_computation`
    /// on the exposed core, or as part of `compute`.
    pub fn visit(&mut self, root: V) -> AlgorithmResult<()> {
        self.enqueue_root(root);
        self.flush_visit_queue()
    }

    fn initialize(&mut self) -> AlgorithmResult<()> {
        if self.core.cancel_manager()?.is_cancelling() {
            return Ok(());
        }
        self.colors.clear();
        self.queue.clear();
        let graph = self.graph;
        for v in graph.vertices() {
            self.colors.insert(v.clone(), GraphColor::White);
            self.initialize_vertex.emit(v);
        }
        Ok(())
    }

    fn internal_compute(&mut self) -> AlgorithmResult<()> {
        if self.graph.vertex_count() == 0 {
            return Ok(());
        }
        if let Some(root) = self.root.try_root().cloned() {
            self.visit(root)?;
        }
        Ok(())
    }

    fn enqueue_root(&mut self, root: V) {
        tracing::trace!("starting search tree");
        self.start_vertex.emit(&root);
        self.colors.insert(root.clone(), GraphColor::Gray);
        self.discover_vertex.emit(&root);
        self.queue.push_back(root);
    }

    fn flush_visit_queue(&mut self) -> AlgorithmResult<()> {
        let cancel = self.core.cancel_manager()?;
        let graph = self.graph;
        while let Some(u) = self.queue.pop_front() {
            if cancel.is_cancelling() {
                return Ok(());
            }
            self.examine_vertex.emit(&u);
            for e in self.filtered(graph.out_edges(&u)) {
                self.examine_edge.emit(e);
                let v = e.target();
                match self.colors.get(v).copied() {
                    None | Some(GraphColor::White) => {
                        self.tree_edge.emit(e);
                        self.colors.insert(v.clone(), GraphColor::Gray);
                        self.discover_vertex.emit(v);
                        self.queue.push_back(v.clone());
                    }
                    Some(color) => {
                        self.non_tree_edge.emit(e);
                        if color == GraphColor::Gray {
                            self.gray_target.emit(e);
                        } else {
                            self.black_target.emit(e);
                        }
                    }
                }
            }
            self.colors.insert(u.clone(), GraphColor::Black);
            self.finish_vertex.emit(&u);
        }
        Ok(())
    }

    fn filtered(&self, edges: OutEdges<'g, V>) -> OutEdges<'g, V> {
        match &self.out_edge_filter {
            Some(filter) => filter(edges),
            None => edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::BidirectionalGraph;
    use std::cell::RefCell;

    fn graph_from(edges: &[(u8, u8)]) -> BidirectionalGraph<u8> {
        let mut g = BidirectionalGraph::new();
        for &(s, t) in edges {
            g.add_vertices_and_edge(Edge::new(s, t));
        }
        g
    }

    fn trace_all(bfs: &BreadthFirstSearch<'_, u8, BidirectionalGraph<u8>>) -> Rc<RefCell<Vec<String>>> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let push = |name: &'static str, event: &Event<u8>| {
            let log = Rc::clone(&log);
            // traces live as long as the test, leak the subscription
            std::mem::forget(event.subscribe(move |v| log.borrow_mut().push(format!("{name} {v}"))));
        };
        push("init", bfs.initialize_vertex());
        push("start", bfs.start_vertex());
        push("examine-v", bfs.examine_vertex());
        push("discover", bfs.discover_vertex());
        push("finish", bfs.finish_vertex());
        let push_edge = |name: &'static str, event: &Event<Edge<u8>>| {
            let log = Rc::clone(&log);
            std::mem::forget(event.subscribe(move |e| log.borrow_mut().push(format!("{name} {e:?}"))));
        };
        push_edge("examine-e", bfs.examine_edge());
        push_edge("tree", bfs.tree_edge());
        push_edge("non-tree", bfs.non_tree_edge());
        push_edge("gray", bfs.gray_target());
        push_edge("black", bfs.black_target());
        log
    }

    #[test]
    fn event_trace_matches_frontier_order() {
        let g = graph_from(&[(1, 2), (1, 3), (2, 3), (3, 1)]);
        let mut bfs = BreadthFirstSearch::new(&g);
        let log = trace_all(&bfs);

        bfs.compute_from(1).unwrap();

        assert_eq!(
            *log.borrow(),
            vec![
                "init 1",
                "init 2",
                "init 3",
                "start 1",
                "discover 1",
                "examine-v 1",
                "examine-e 1 -> 2",
                "tree 1 -> 2",
                "discover 2",
                "examine-e 1 -> 3",
                "tree 1 -> 3",
                "discover 3",
                "finish 1",
                "examine-v 2",
                "examine-e 2 -> 3",
                "non-tree 2 -> 3",
                "gray 2 -> 3",
                "finish 2",
                "examine-v 3",
                "examine-e 3 -> 1",
                "non-tree 3 -> 1",
                "black 3 -> 1",
                "finish 3",
            ]
        );
        assert_eq!(bfs.state(), ComputationState::Finished);
        assert_eq!(bfs.vertex_color(&3), Some(GraphColor::Black));
    }

    #[test]
    fn discovery_proceeds_by_layers() {
        // 0 -> {1, 2}, 1 -> 3, 2 -> 4, 3 -> 5
        let g = graph_from(&[(0, 1), (0, 2), (1, 3), (2, 4), (3, 5)]);
        let mut bfs = BreadthFirstSearch::new(&g);
        let order = Rc::new(RefCell::new(Vec::new()));
        let sub = {
            let order = Rc::clone(&order);
            bfs.discover_vertex()
                .subscribe(move |v| order.borrow_mut().push(*v))
        };

        bfs.compute_from(0).unwrap();
        assert_eq!(*order.borrow(), vec![0, 1, 2, 3, 4, 5]);
        sub.unsubscribe();
    }

    #[test]
    fn unreachable_vertices_stay_white() {
        let g = graph_from(&[(1, 2), (3, 4)]);
        let mut bfs = BreadthFirstSearch::new(&g);
        bfs.compute_from(1).unwrap();
        assert_eq!(bfs.vertex_color(&2), Some(GraphColor::Black));
        assert_eq!(bfs.vertex_color(&3), Some(GraphColor::White));
        assert_eq!(bfs.vertex_color(&4), Some(GraphColor::White));
    }

    #[test]
    fn no_root_run_finishes_without_examining() {
        let g = graph_from(&[(1, 2)]);
        let mut bfs = BreadthFirstSearch::new(&g);
        let log = trace_all(&bfs);
        bfs.compute().unwrap();
        assert_eq!(*log.borrow(), vec!["init 1", "init 2"]);
        assert_eq!(bfs.state(), ComputationState::Finished);
    }

    #[test]
    fn abort_from_a_subscriber_stops_the_run() {
        let g = graph_from(&[(1, 2), (1, 3), (2, 4)]);
        let mut bfs = BreadthFirstSearch::new(&g);
        let core = bfs.core();
        let sub = bfs.discover_vertex().subscribe(move |v| {
            if *v == 2 {
                core.abort();
            }
        });
        let finishes = Rc::new(RefCell::new(0));
        let finish_sub = {
            let finishes = Rc::clone(&finishes);
            bfs.finish_vertex()
                .subscribe(move |_| *finishes.borrow_mut() += 1)
        };
        let aborts = Rc::new(RefCell::new(0));
        let abort_sub = {
            let aborts = Rc::clone(&aborts);
            bfs.aborted().subscribe(move |_| *aborts.borrow_mut() += 1)
        };

        bfs.compute_from(1).unwrap();

        assert_eq!(bfs.state(), ComputationState::Aborted);
        assert_eq!(*aborts.borrow(), 1);
        // vertex 1 finishes its edge sweep, nothing gets dequeued after
        assert_eq!(*finishes.borrow(), 1);
        assert_eq!(bfs.vertex_color(&4), Some(GraphColor::White));
        sub.unsubscribe();
        finish_sub.unsubscribe();
        abort_sub.unsubscribe();
    }

    #[test]
    fn visit_resumes_into_another_component() {
        let g = graph_from(&[(1, 2), (3, 4)]);
        let mut bfs = BreadthFirstSearch::new(&g);
        let starts = Rc::new(RefCell::new(Vec::new()));
        let sub = {
            let starts = Rc::clone(&starts);
            bfs.start_vertex()
                .subscribe(move |v| starts.borrow_mut().push(*v))
        };

        bfs.compute_from(1).unwrap();
        assert_eq!(bfs.vertex_color(&3), Some(GraphColor::White));

        let core = bfs.core();
        core.begin_computation().unwrap();
        bfs.visit(3).unwrap();
        core.end_computation().unwrap();

        // first component keeps its colors, second got swept
        assert_eq!(bfs.vertex_color(&2), Some(GraphColor::Black));
        assert_eq!(bfs.vertex_color(&4), Some(GraphColor::Black));
        assert_eq!(*starts.borrow(), vec![1, 3]);
        sub.unsubscribe();
    }

    #[test]
    fn out_edge_filter_prunes_the_frontier() {
        let g = graph_from(&[(1, 2), (1, 3), (3, 4)]);
        let mut bfs = BreadthFirstSearch::new(&g)
            .with_out_edge_filter(|edges| Box::new(edges.filter(|e| *e.target() != 3)));
        bfs.compute_from(1).unwrap();
        assert_eq!(bfs.vertex_color(&2), Some(GraphColor::Black));
        assert_eq!(bfs.vertex_color(&3), Some(GraphColor::White));
        assert_eq!(bfs.vertex_color(&4), Some(GraphColor::White));
    }

    #[test]
    fn root_change_notifications_skip_no_ops() {
        let g = graph_from(&[(1, 2)]);
        let mut bfs = BreadthFirstSearch::new(&g);
        let changes = Rc::new(RefCell::new(0));
        let sub = {
            let changes = Rc::clone(&changes);
            bfs.root_vertex_changed()
                .subscribe(move |_| *changes.borrow_mut() += 1)
        };
        bfs.set_root_vertex(1);
        bfs.set_root_vertex(1);
        bfs.set_root_vertex(2);
        bfs.clear_root_vertex();
        assert_eq!(*changes.borrow(), 3);
        assert_eq!(bfs.try_root_vertex(), None);
        sub.unsubscribe();
    }
}
