use super::{Edge, GraphError, GraphResult, IncidenceGraph, VertexListGraph};
use crate::event::Event;
use ahash::RandomState;
use std::collections::HashMap;
use std::hash::Hash;

/// Both edge lists of one vertex. Keeping them in a single entry makes the
/// "in the out-index iff in the in-index" invariant hold by construction.
struct VertexEntry<V> {
    out_edges: Vec<Edge<V>>,
    in_edges: Vec<Edge<V>>,
}

impl<V> VertexEntry<V> {
    fn new() -> Self {
        Self {
            out_edges: Vec::new(),
            in_edges: Vec::new(),
        }
    }
}

fn remove_first<T: PartialEq>(list: &mut Vec<T>, item: &T) -> bool {
    match list.iter().position(|x| x == item) {
        Some(idx) => {
            list.remove(idx);
            true
        }
        None => false,
    }
}

/// A mutable directed graph efficient for sparse graphs where both
/// out-edges and in-edges need to be enumerated. Requires twice the memory
/// of a plain adjacency graph.
///
/// Vertices enumerate in insertion order. Every mutation fires exactly one
/// notification per affected vertex or edge; [`BidirectionalGraph::clear`]
/// fires a single `cleared` instead of per-element events.
pub struct BidirectionalGraph<V> {
    allow_parallel_edges: bool,
    entries: HashMap<V, VertexEntry<V>, RandomState>,
    order: Vec<V>,
    edge_count: usize,
    vertex_added: Event<V>,
    vertex_removed: Event<V>,
    edge_added: Event<Edge<V>>,
    edge_removed: Event<Edge<V>>,
    cleared: Event<()>,
}

impl<V> BidirectionalGraph<V>
where
    V: Clone + Eq + Hash + 'static,
{
    /// An empty graph that accepts parallel edges.
    pub fn new() -> Self {
        Self {
            allow_parallel_edges: true,
            entries: HashMap::with_hasher(RandomState::new()),
            order: Vec::new(),
            edge_count: 0,
            vertex_added: Event::new(),
            vertex_removed: Event::new(),
            edge_added: Event::new(),
            edge_removed: Event::new(),
            cleared: Event::new(),
        }
    }

    /// Sets the parallel-edge policy. Intended at construction time, before
    /// any edge exists.
    pub fn with_parallel_edges(mut self, allow: bool) -> Self {
        self.allow_parallel_edges = allow;
        self
    }

    // ------------------------------------------------------------------
    // mutations
    // ------------------------------------------------------------------

    /// Adds `v`. Returns `false` (and fires nothing) if it already exists.
    pub fn add_vertex(&mut self, v: V) -> bool {
        if self.entries.contains_key(&v) {
            return false;
        }
        self.entries.insert(v.clone(), VertexEntry::new());
        self.order.push(v.clone());
        self.vertex_added.emit(&v);
        true
    }

    /// Adds every vertex of `vertices`, returning how many were new.
    pub fn add_vertex_range(&mut self, vertices: impl IntoIterator<Item = V>) -> usize {
        vertices
            .into_iter()
            .filter(|v| self.add_vertex(v.clone()))
            .count()
    }

    /// Removes `v` and all incident edges. Each incident edge fires
    /// `edge_removed` exactly once (a self-loop is incident on both sides
    /// but still reported once), then the vertex fires `vertex_removed`.
    pub fn remove_vertex(&mut self, v: &V) -> bool {
        if !self.entries.contains_key(v) {
            return false;
        }
        let mut removed: Vec<Edge<V>> = Vec::new();
        let outs: Vec<Edge<V>> = self
            .entries
            .get(v)
            .map(|entry| entry.out_edges.clone())
            .unwrap_or_default();
        for edge in outs {
            if let Some(target_entry) = self.entries.get_mut(edge.target()) {
                remove_first(&mut target_entry.in_edges, &edge);
            }
            removed.push(edge);
        }
        // self-loops are already gone from the in-list at this point
        let ins: Vec<Edge<V>> = self
            .entries
            .get(v)
            .map(|entry| entry.in_edges.clone())
            .unwrap_or_default();
        for edge in ins {
            let present = self
                .entries
                .get_mut(edge.source())
                .is_some_and(|source_entry| remove_first(&mut source_entry.out_edges, &edge));
            if present {
                removed.push(edge);
            }
        }
        // finish the bookkeeping before notifying, so subscribers querying
        // the graph see a state that agrees with the event stream
        self.entries.remove(v);
        self.order.retain(|x| x != v);
        self.edge_count -= removed.len();
        for edge in &removed {
            self.edge_removed.emit(edge);
        }
        self.vertex_removed.emit(v);
        true
    }

    /// Removes every vertex matching `predicate`, returning how many were
    /// removed. Candidates are snapshotted before any mutation.
    pub fn remove_vertex_if(&mut self, predicate: impl Fn(&V) -> bool) -> usize {
        let candidates: Vec<V> = self.order.iter().filter(|v| predicate(v)).cloned().collect();
        for v in &candidates {
            self.remove_vertex(v);
        }
        candidates.len()
    }

    /// Adds `edge`. Both endpoints must already be vertices. Returns
    /// `Ok(false)` without mutating when parallel edges are disallowed and
    /// an edge with the same endpoints exists.
    pub fn add_edge(&mut self, edge: Edge<V>) -> GraphResult<bool> {
        if !self.entries.contains_key(edge.source()) || !self.entries.contains_key(edge.target()) {
            return Err(GraphError::VertexNotFound);
        }
        Ok(self.insert_edge(edge))
    }

    /// Adds every edge of `edges`, returning how many were inserted.
    pub fn add_edge_range(&mut self, edges: impl IntoIterator<Item = Edge<V>>) -> GraphResult<usize> {
        let mut count = 0;
        for edge in edges {
            if self.add_edge(edge)? {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Adds missing endpoints, then the edge itself.
    pub fn add_vertices_and_edge(&mut self, edge: Edge<V>) -> bool {
        self.add_vertex(edge.source().clone());
        self.add_vertex(edge.target().clone());
        self.insert_edge(edge)
    }

    pub fn add_vertices_and_edge_range(
        &mut self,
        edges: impl IntoIterator<Item = Edge<V>>,
    ) -> usize {
        edges
            .into_iter()
            .filter(|edge| self.add_vertices_and_edge(edge.clone()))
            .count()
    }

    /// Endpoints are known to exist here.
    fn insert_edge(&mut self, edge: Edge<V>) -> bool {
        if !self.allow_parallel_edges && self.contains_vertex_edge(edge.source(), edge.target()) {
            return false;
        }
        if let Some(entry) = self.entries.get_mut(edge.source()) {
            entry.out_edges.push(edge.clone());
        }
        if let Some(entry) = self.entries.get_mut(edge.target()) {
            entry.in_edges.push(edge.clone());
        }
        self.edge_count += 1;
        self.edge_added.emit(&edge);
        true
    }

    /// Removes one occurrence of `edge`. Returns `false` if absent.
    pub fn remove_edge(&mut self, edge: &Edge<V>) -> bool {
        let present = self
            .entries
            .get_mut(edge.source())
            .is_some_and(|entry| remove_first(&mut entry.out_edges, edge));
        if !present {
            return false;
        }
        if let Some(entry) = self.entries.get_mut(edge.target()) {
            remove_first(&mut entry.in_edges, edge);
        }
        self.edge_count -= 1;
        self.edge_removed.emit(edge);
        true
    }

    /// Removes every edge matching `predicate`, snapshotting candidates
    /// before any mutation.
    pub fn remove_edge_if(&mut self, predicate: impl Fn(&Edge<V>) -> bool) -> usize {
        let candidates: Vec<Edge<V>> = self.edges().filter(|e| predicate(e)).cloned().collect();
        for edge in &candidates {
            self.remove_edge(edge);
        }
        candidates.len()
    }

    pub fn remove_out_edge_if(&mut self, v: &V, predicate: impl Fn(&Edge<V>) -> bool) -> usize {
        let candidates: Vec<Edge<V>> = self
            .entries
            .get(v)
            .map(|entry| {
                entry
                    .out_edges
                    .iter()
                    .filter(|e| predicate(e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        for edge in &candidates {
            self.remove_edge(edge);
        }
        candidates.len()
    }

    pub fn remove_in_edge_if(&mut self, v: &V, predicate: impl Fn(&Edge<V>) -> bool) -> usize {
        let candidates: Vec<Edge<V>> = self
            .entries
            .get(v)
            .map(|entry| {
                entry
                    .in_edges
                    .iter()
                    .filter(|e| predicate(e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        for edge in &candidates {
            self.remove_edge(edge);
        }
        candidates.len()
    }

    /// Removes all out-edges of `v`, firing `edge_removed` for each.
    pub fn clear_out_edges(&mut self, v: &V) {
        let outs = match self.entries.get_mut(v) {
            Some(entry) => std::mem::take(&mut entry.out_edges),
            None => return,
        };
        for edge in &outs {
            if let Some(target_entry) = self.entries.get_mut(edge.target()) {
                remove_first(&mut target_entry.in_edges, edge);
            }
        }
        self.edge_count -= outs.len();
        for edge in &outs {
            self.edge_removed.emit(edge);
        }
    }

    /// Removes all in-edges of `v`, firing `edge_removed` for each.
    pub fn clear_in_edges(&mut self, v: &V) {
        let ins = match self.entries.get_mut(v) {
            Some(entry) => std::mem::take(&mut entry.in_edges),
            None => return,
        };
        for edge in &ins {
            if let Some(source_entry) = self.entries.get_mut(edge.source()) {
                remove_first(&mut source_entry.out_edges, edge);
            }
        }
        self.edge_count -= ins.len();
        for edge in &ins {
            self.edge_removed.emit(edge);
        }
    }

    /// Removes all edges incident to `v`, in either direction.
    pub fn clear_edges(&mut self, v: &V) {
        self.clear_out_edges(v);
        self.clear_in_edges(v);
    }

    /// Empties the graph. Fires a single `cleared`, not per-element events.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.edge_count = 0;
        self.cleared.emit(&());
    }

    // ------------------------------------------------------------------
    // queries
    // ------------------------------------------------------------------

    pub fn is_directed(&self) -> bool {
        true
    }

    pub fn allow_parallel_edges(&self) -> bool {
        self.allow_parallel_edges
    }

    pub fn vertex_count(&self) -> usize {
        self.order.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    pub fn is_vertices_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn is_edges_empty(&self) -> bool {
        self.edge_count == 0
    }

    /// Vertices in insertion order.
    pub fn vertices(&self) -> impl Iterator<Item = &V> + '_ {
        self.order.iter()
    }

    /// Every edge, grouped by source vertex in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge<V>> + '_ {
        self.order
            .iter()
            .filter_map(move |v| self.entries.get(v))
            .flat_map(|entry| entry.out_edges.iter())
    }

    pub fn contains_vertex(&self, v: &V) -> bool {
        self.entries.contains_key(v)
    }

    pub fn contains_edge(&self, edge: &Edge<V>) -> bool {
        self.entries
            .get(edge.source())
            .is_some_and(|entry| entry.out_edges.contains(edge))
    }

    /// Whether any edge runs from `source` to `target`.
    pub fn contains_vertex_edge(&self, source: &V, target: &V) -> bool {
        self.entries
            .get(source)
            .is_some_and(|entry| entry.out_edges.iter().any(|e| e.target() == target))
    }

    pub fn out_degree(&self, v: &V) -> usize {
        self.entries.get(v).map_or(0, |entry| entry.out_edges.len())
    }

    pub fn in_degree(&self, v: &V) -> usize {
        self.entries.get(v).map_or(0, |entry| entry.in_edges.len())
    }

    pub fn degree(&self, v: &V) -> usize {
        self.in_degree(v) + self.out_degree(v)
    }

    pub fn is_out_edges_empty(&self, v: &V) -> bool {
        self.out_degree(v) == 0
    }

    pub fn is_in_edges_empty(&self, v: &V) -> bool {
        self.in_degree(v) == 0
    }

    /// Out-edges of `v`; empty for an absent vertex.
    pub fn out_edges(&self, v: &V) -> impl Iterator<Item = &Edge<V>> + '_ {
        self.entries
            .get(v)
            .into_iter()
            .flat_map(|entry| entry.out_edges.iter())
    }

    /// In-edges of `v`; empty for an absent vertex.
    pub fn in_edges(&self, v: &V) -> impl Iterator<Item = &Edge<V>> + '_ {
        self.entries
            .get(v)
            .into_iter()
            .flat_map(|entry| entry.in_edges.iter())
    }

    /// Out-edges of `v`, or `None` when `v` is not a vertex (as opposed to
    /// a vertex with no out-edges).
    pub fn try_out_edges(&self, v: &V) -> Option<impl Iterator<Item = &Edge<V>> + '_> {
        self.entries.get(v).map(|entry| entry.out_edges.iter())
    }

    pub fn try_in_edges(&self, v: &V) -> Option<impl Iterator<Item = &Edge<V>> + '_> {
        self.entries.get(v).map(|entry| entry.in_edges.iter())
    }

    pub fn out_edge(&self, v: &V, index: usize) -> Option<&Edge<V>> {
        self.entries.get(v).and_then(|entry| entry.out_edges.get(index))
    }

    pub fn in_edge(&self, v: &V, index: usize) -> Option<&Edge<V>> {
        self.entries.get(v).and_then(|entry| entry.in_edges.get(index))
    }

    /// The first edge from `source` to `target`, if any.
    pub fn try_edge(&self, source: &V, target: &V) -> Option<&Edge<V>> {
        self.entries
            .get(source)?
            .out_edges
            .iter()
            .find(|e| e.target() == target)
    }

    /// All edges from `source` to `target`, or `None` when `source` is not
    /// a vertex.
    pub fn try_edges<'a>(
        &'a self,
        source: &V,
        target: &'a V,
    ) -> Option<impl Iterator<Item = &'a Edge<V>> + 'a> {
        let entry = self.entries.get(source)?;
        Some(
            entry
                .out_edges
                .iter()
                .filter(move |e| e.target() == target),
        )
    }

    // ------------------------------------------------------------------
    // notifications
    // ------------------------------------------------------------------

    pub fn vertex_added(&self) -> &Event<V> {
        &self.vertex_added
    }

    pub fn vertex_removed(&self) -> &Event<V> {
        &self.vertex_removed
    }

    pub fn edge_added(&self) -> &Event<Edge<V>> {
        &self.edge_added
    }

    pub fn edge_removed(&self) -> &Event<Edge<V>> {
        &self.edge_removed
    }

    pub fn cleared(&self) -> &Event<()> {
        &self.cleared
    }
}

impl<V> Default for BidirectionalGraph<V>
where
    V: Clone + Eq + Hash + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> IncidenceGraph<V> for BidirectionalGraph<V>
where
    V: Clone + Eq + Hash + 'static,
{
    fn contains_vertex(&self, v: &V) -> bool {
        self.entries.contains_key(v)
    }

    fn out_degree(&self, v: &V) -> usize {
        BidirectionalGraph::out_degree(self, v)
    }

    fn out_edges<'a>(&'a self, v: &V) -> Box<dyn Iterator<Item = &'a Edge<V>> + 'a> {
        Box::new(
            self.entries
                .get(v)
                .into_iter()
                .flat_map(|entry| entry.out_edges.iter()),
        )
    }
}

impl<V> VertexListGraph<V> for BidirectionalGraph<V>
where
    V: Clone + Eq + Hash + 'static,
{
    fn vertex_count(&self) -> usize {
        self.order.len()
    }

    fn vertices<'a>(&'a self) -> Box<dyn Iterator<Item = &'a V> + 'a> {
        Box::new(self.order.iter())
    }
}

impl<V> std::fmt::Debug for BidirectionalGraph<V>
where
    V: Clone + Eq + Hash + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "BidirectionalGraph {{")?;
        for v in &self.order {
            writeln!(f, "  {:?}:", v)?;
            for e in self.out_edges(v) {
                writeln!(f, "    -> {:?}", e.target())?;
            }
        }
        writeln!(f, "}}")
    }
}
