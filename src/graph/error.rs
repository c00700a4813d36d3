use thiserror::Error;

/// Result type for graph mutations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised by graph mutations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum GraphError {
    /// An edge endpoint is not a vertex of the graph. `add_vertices_and_edge`
    /// is the variant that inserts missing endpoints instead.
    #[error("edge endpoint is not a vertex of this graph")]
    VertexNotFound,
}
