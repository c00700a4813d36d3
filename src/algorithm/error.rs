use super::ComputationState;
use thiserror::Error;

/// Result type for running algorithms.
pub type AlgorithmResult<T> = Result<T, AlgorithmError>;

/// Errors raised by the algorithm lifecycle or by individual computations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum AlgorithmError {
    /// A lifecycle transition was requested from a state that does not
    /// permit it, e.g. ending a computation that never began.
    #[error("operation not permitted in computation state {state:?}")]
    InvalidState { state: ComputationState },

    /// A service token resolved to nothing: no cached instance, and the
    /// token's factory declined to build one.
    #[error("no service registered for token {name:?}")]
    ServiceNotFound { name: &'static str },

    /// A topological order was requested for a graph with a cycle.
    #[error("graph is not acyclic")]
    NotAcyclic,
}
