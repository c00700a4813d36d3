/// A directed edge, an immutable `(source, target)` pair.
///
/// Equality and hashing go by the endpoints, so two parallel edges between
/// the same pair of vertices are indistinguishable as values.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Edge<V> {
    source: V,
    target: V,
}

impl<V> Edge<V> {
    pub fn new(source: V, target: V) -> Self {
        Self { source, target }
    }

    pub fn source(&self) -> &V {
        &self.source
    }

    pub fn target(&self) -> &V {
        &self.target
    }

    pub fn is_self_loop(&self) -> bool
    where
        V: PartialEq,
    {
        self.source == self.target
    }
}

impl<V: std::fmt::Debug> std::fmt::Debug for Edge<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} -> {:?}", self.source, self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equality_goes_by_endpoints() {
        assert_eq!(Edge::new(1, 2), Edge::new(1, 2));
        assert_ne!(Edge::new(1, 2), Edge::new(2, 1));
        assert!(Edge::new(3, 3).is_self_loop());
        assert!(!Edge::new(3, 4).is_self_loop());
    }
}
