use super::{
    AlgorithmCore, AlgorithmError, AlgorithmResult, ComputationState, DepthFirstSearch,
    ServiceRegistry,
};
use crate::event::Event;
use crate::graph::VertexListGraph;
use std::cell::{Cell, RefCell};
use std::hash::Hash;
use std::rc::Rc;

/// Orders vertices so that every edge points from an earlier vertex to a
/// later one.
///
/// Runs a full depth-first sweep on a shared host, prepending each vertex
/// to the order as it finishes. A back edge proves a cycle: by default the
/// sweep is aborted on the spot and [`AlgorithmError::NotAcyclic`] comes
/// back with an empty order. With `allow_cyclic` set, back edges are
/// ignored and the order is only valid for the edges off the cycles.
///
/// The order depends on the graph's vertex store order, as ties between
/// independent vertices go to whichever tree the sweep reaches first.
pub struct TopologicalSort<'g, V, G> {
    core: AlgorithmCore,
    graph: &'g G,
    allow_cyclic: bool,
    sorted: Vec<V>,
}

impl<'g, V, G> TopologicalSort<'g, V, G>
where
    V: Clone + Eq + Hash + 'static,
    G: VertexListGraph<V>,
{
    pub fn new(graph: &'g G) -> Self {
        Self {
            core: AlgorithmCore::new(),
            graph,
            allow_cyclic: false,
            sorted: Vec::new(),
        }
    }

    /// Tolerates cycles instead of failing on them.
    pub fn with_allow_cyclic(mut self, allow: bool) -> Self {
        self.allow_cyclic = allow;
        self
    }

    /// Resolves services, including the cancel flag, from `services`
    /// instead of a private registry.
    pub fn with_host(mut self, services: Rc<ServiceRegistry>) -> Self {
        self.core = AlgorithmCore::with_host(services);
        self
    }

    pub fn core(&self) -> AlgorithmCore {
        self.core.clone()
    }

    pub fn state(&self) -> ComputationState {
        self.core.state()
    }

    pub fn allow_cyclic(&self) -> bool {
        self.allow_cyclic
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

    /// The order produced by the last successful run, empty otherwise.
    pub fn sorted_vertices(&self) -> &[V] {
        &self.sorted
    }

    pub fn into_sorted_vertices(self) -> Vec<V> {
        self.sorted
    }

    pub fn compute(&mut self) -> AlgorithmResult<()> {
        self.sorted.clear();
        self.core.begin_computation()?;
        self.internal_compute()?;
        self.core.end_computation()
    }

    fn internal_compute(&mut self) -> AlgorithmResult<()> {
        let mut dfs = DepthFirstSearch::new(self.graph).with_host(self.core.services());
        let order: Rc<RefCell<Vec<V>>> = Rc::new(RefCell::new(Vec::new()));
        let cyclic = Rc::new(Cell::new(false));

        let finish_sub = {
            let order = Rc::clone(&order);
            dfs.finish_vertex()
                .subscribe(move |v| order.borrow_mut().insert(0, v.clone()))
        };
        let back_sub = if self.allow_cyclic {
            None
        } else {
            let cyclic = Rc::clone(&cyclic);
            let dfs_core = dfs.core();
            Some(dfs.back_edge().subscribe(move |_| {
                cyclic.set(true);
                dfs_core.abort();
            }))
        };

        let run = dfs.compute();
        finish_sub.unsubscribe();
        if let Some(sub) = back_sub {
            sub.unsubscribe();
        }
        run?;

        if cyclic.get() {
            tracing::debug!("back edge found, graph has no topological order");
            return Err(AlgorithmError::NotAcyclic);
        }
        self.sorted = order.take();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{BidirectionalGraph, Edge};
    use ahash::RandomState;
    use quickcheck_macros::quickcheck;
    use std::collections::HashMap;

    fn graph_from(edges: &[(u8, u8)]) -> BidirectionalGraph<u8> {
        let mut g = BidirectionalGraph::new();
        for &(s, t) in edges {
            g.add_vertices_and_edge(Edge::new(s, t));
        }
        g
    }

    #[test]
    fn order_follows_finish_times_and_store_order() {
        let mut g = BidirectionalGraph::new();
        g.add_vertex_range(['a', 'b', 'c', 'd', 'e']);
        g.add_edge(Edge::new('a', 'b')).unwrap();
        g.add_edge(Edge::new('a', 'c')).unwrap();
        g.add_edge(Edge::new('b', 'd')).unwrap();

        let mut sort = TopologicalSort::new(&g);
        sort.compute().unwrap();

        // 'e' finishes last in the sweep, so it lands first
        assert_eq!(sort.sorted_vertices(), ['e', 'a', 'c', 'b', 'd']);
        assert_eq!(sort.state(), ComputationState::Finished);
    }

    #[quickcheck]
    fn every_edge_points_forward_in_the_order(pairs: Vec<(u8, u8)>) {
        // forcing source < target keeps the graph acyclic
        let edges: Vec<(u8, u8)> = pairs
            .into_iter()
            .filter(|(a, b)| a != b)
            .map(|(a, b)| (a.min(b), a.max(b)))
            .collect();
        let g = graph_from(&edges);

        let mut sort = TopologicalSort::new(&g);
        sort.compute().unwrap();

        let position: HashMap<u8, usize, RandomState> = sort
            .sorted_vertices()
            .iter()
            .enumerate()
            .map(|(i, v)| (*v, i))
            .collect();
        assert_eq!(position.len(), g.vertex_count());
        for e in g.edges() {
            assert!(position[e.source()] < position[e.target()]);
        }
    }

    #[test]
    fn cycle_fails_with_an_empty_order() {
        let g = graph_from(&[(1, 2), (2, 3), (3, 1)]);
        let mut sort = TopologicalSort::new(&g);
        assert_eq!(sort.compute(), Err(AlgorithmError::NotAcyclic));
        assert!(sort.sorted_vertices().is_empty());
    }

    #[test]
    fn self_loop_counts_as_a_cycle() {
        let g = graph_from(&[(1, 1)]);
        let mut sort = TopologicalSort::new(&g);
        assert_eq!(sort.compute(), Err(AlgorithmError::NotAcyclic));
    }

    #[test]
    fn allow_cyclic_orders_what_it_can() {
        let g = graph_from(&[(1, 2), (2, 3), (3, 1), (4, 1)]);
        let mut sort = TopologicalSort::new(&g).with_allow_cyclic(true);
        sort.compute().unwrap();

        let sorted = sort.sorted_vertices();
        assert_eq!(sorted.len(), 4);
        // the edge off the cycle still points forward
        let pos = |v: u8| sorted.iter().position(|x| *x == v).unwrap();
        assert!(pos(4) < pos(1));
    }

    #[test]
    fn repeated_runs_give_identical_results() {
        let g = graph_from(&[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let mut sort = TopologicalSort::new(&g);
        sort.compute().unwrap();
        let first = sort.sorted_vertices().to_vec();
        sort.compute().unwrap();
        assert_eq!(sort.sorted_vertices(), first);
    }

    #[quickcheck]
    fn cycle_detection_agrees_with_petgraph(pairs: Vec<(u8, u8)>) {
        let g = graph_from(&pairs);

        let mut pg = petgraph::graph::DiGraph::<u8, ()>::new();
        let mut nodes: HashMap<u8, petgraph::graph::NodeIndex, RandomState> = HashMap::default();
        for v in g.vertices() {
            nodes.insert(*v, pg.add_node(*v));
        }
        for e in g.edges() {
            pg.add_edge(nodes[e.source()], nodes[e.target()], ());
        }

        let mut sort = TopologicalSort::new(&g);
        assert_eq!(
            sort.compute().is_err(),
            petgraph::algo::toposort(&pg, None).is_err()
        );
    }
}
