use super::{
    AlgorithmCore, AlgorithmResult, ComputationState, GraphColor, OutEdgeFilter, OutEdges,
    RootHolder, ServiceRegistry,
};
use crate::event::Event;
use crate::graph::{Edge, VertexListGraph};
use ahash::RandomState;
use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

/// One suspended vertex on the explicit traversal stack: the vertex, the
/// rest of its out-edge walk, and its depth below the search root.
struct SearchFrame<'g, V> {
    vertex: V,
    edges: OutEdges<'g, V>,
    depth: usize,
}

/// A depth-first traversal with edge classification.
///
/// With a root set it searches that root's reachable subgraph; without one
/// it sweeps every vertex in store order, starting a fresh tree (and firing
/// `start_vertex`) at each still-white vertex. Each examined edge is
/// classified against its target's color: `tree_edge` for white,
/// `back_edge` for gray, `forward_or_cross_edge` for black. The recursion
/// is an explicit stack, so depth is bounded by memory rather than the
/// call stack, and event order matches the recursive formulation exactly.
pub struct DepthFirstSearch<'g, V, G> {
    core: AlgorithmCore,
    graph: &'g G,
    root: RootHolder<V>,
    colors: HashMap<V, GraphColor, RandomState>,
    max_depth: usize,
    out_edge_filter: Option<OutEdgeFilter<'g, V>>,
    initialize_vertex: Event<V>,
    start_vertex: Event<V>,
    discover_vertex: Event<V>,
    finish_vertex: Event<V>,
    examine_edge: Event<Edge<V>>,
    tree_edge: Event<Edge<V>>,
    back_edge: Event<Edge<V>>,
    forward_or_cross_edge: Event<Edge<V>>,
}

impl<'g, V, G> DepthFirstSearch<'g, V, G>
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
            max_depth: usize::MAX,
            out_edge_filter: None,
            initialize_vertex: Event::new(),
            start_vertex: Event::new(),
            discover_vertex: Event::new(),
            finish_vertex: Event::new(),
            examine_edge: Event::new(),
            tree_edge: Event::new(),
            back_edge: Event::new(),
            forward_or_cross_edge: Event::new(),
        }
    }

    /// Resolves services, including the cancel flag, from `services`
    /// instead of a private registry.
    pub fn with_host(mut self, services: Rc<ServiceRegistry>) -> Self {
        self.core = AlgorithmCore::with_host(services);
        self
    }

    /// Caps descent depth. A vertex at the cap is finished without its
    /// out-edges being examined, so `0` finishes the root immediately.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
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

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

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

    /// The root of each new search tree.
    pub fn start_vertex(&self) -> &Event<V> {
        &self.start_vertex
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

    /// An edge to a gray target, i.e. to an ancestor still on the stack.
    /// Present exactly when the searched subgraph has a cycle.
    pub fn back_edge(&self) -> &Event<Edge<V>> {
        &self.back_edge
    }

    pub fn forward_or_cross_edge(&self) -> &Event<Edge<V>> {
        &self.forward_or_cross_edge
    }

    // ------------------------------------------------------------------
    // computation
    // ------------------------------------------------------------------

    /// Runs the search: rooted if a root is set, otherwise a full sweep in
    /// store order.
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

    fn initialize(&mut self) -> AlgorithmResult<()> {
        if self.core.cancel_manager()?.is_cancelling() {
            return Ok(());
        }
        self.colors.clear();
        let graph = self.graph;
        for v in graph.vertices() {
            self.colors.insert(v.clone(), GraphColor::White);
            self.initialize_vertex.emit(v);
        }
        Ok(())
    }

    fn internal_compute(&mut self) -> AlgorithmResult<()> {
        if let Some(root) = self.root.try_root().cloned() {
            tracing::trace!("starting search tree");
            self.start_vertex.emit(&root);
            return self.visit(root);
        }
        let cancel = self.core.cancel_manager()?;
        let graph = self.graph;
        for v in graph.vertices() {
            if cancel.is_cancelling() {
                return Ok(());
            }
            if self.is_unvisited(v) {
                tracing::trace!("starting search tree");
                self.start_vertex.emit(v);
                self.visit(v.clone())?;
            }
        }
        Ok(())
    }

    fn is_unvisited(&self, v: &V) -> bool {
        matches!(self.colors.get(v).copied(), None | Some(GraphColor::White))
    }

    /// Searches the subtree below `root`, leaving non-white colors in
    /// place so repeated calls sweep distinct trees.
    pub fn visit(&mut self, root: V) -> AlgorithmResult<()> {
        let cancel = self.core.cancel_manager()?;
        let graph = self.graph;
        let mut todo: Vec<SearchFrame<'g, V>> = Vec::new();

        self.colors.insert(root.clone(), GraphColor::Gray);
        self.discover_vertex.emit(&root);
        let edges = self.filtered(graph.out_edges(&root));
        todo.push(SearchFrame {
            vertex: root,
            edges,
            depth: 0,
        });

        'descend: while let Some(frame) = todo.pop() {
            if cancel.is_cancelling() {
                return Ok(());
            }
            let SearchFrame {
                vertex: u,
                mut edges,
                depth,
            } = frame;
            if depth < self.max_depth {
                while let Some(e) = edges.next() {
                    if cancel.is_cancelling() {
                        return Ok(());
                    }
                    self.examine_edge.emit(e);
                    let v = e.target();
                    match self.colors.get(v).copied() {
                        None | Some(GraphColor::White) => {
                            self.tree_edge.emit(e);
                            self.colors.insert(v.clone(), GraphColor::Gray);
                            self.discover_vertex.emit(v);
                            let child = SearchFrame {
                                vertex: v.clone(),
                                edges: self.filtered(graph.out_edges(v)),
                                depth: depth + 1,
                            };
                            todo.push(SearchFrame {
                                vertex: u,
                                edges,
                                depth,
                            });
                            todo.push(child);
                            continue 'descend;
                        }
                        Some(GraphColor::Gray) => self.back_edge.emit(e),
                        Some(GraphColor::Black) => self.forward_or_cross_edge.emit(e),
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
