//! The mutable bidirectional graph store and its query traits.
//!
//! [`BidirectionalGraph`] keeps two vertex→edge-list indices, one for
//! out-edges and one for in-edges, so both directions enumerate in
//! O(degree) at the cost of storing every edge twice. Traversal algorithms
//! consume it through the narrow [`IncidenceGraph`] / [`VertexListGraph`]
//! traits rather than the concrete type.

mod edge;
pub use self::edge::*;
mod r#trait;
pub use self::r#trait::*;
mod bidirectional;
pub use self::bidirectional::*;
mod error;
pub use self::error::*;
