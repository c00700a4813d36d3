use super::Edge;

/// Out-edge incidence queries, the part of a graph a rooted traversal needs.
pub trait IncidenceGraph<V> {
    fn contains_vertex(&self, v: &V) -> bool;

    fn out_degree(&self, v: &V) -> usize;

    /// A lazy, finite, single-pass walk over `v`'s out-edges. Re-calling
    /// yields a fresh walk; an absent vertex yields an empty one.
    fn out_edges<'a>(&'a self, v: &V) -> Box<dyn Iterator<Item = &'a Edge<V>> + 'a>;
}

/// Incidence queries plus whole-vertex-set enumeration in store order.
///
/// Store order is observable: an unrooted depth-first sweep visits trees in
/// exactly this order, and results derived from it (e.g. a topological
/// sort) depend on it.
pub trait VertexListGraph<V>: IncidenceGraph<V> {
    fn vertex_count(&self) -> usize;

    fn vertices<'a>(&'a self) -> Box<dyn Iterator<Item = &'a V> + 'a>;
}
