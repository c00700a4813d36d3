//! Observable, cancelable graph computations.
//!
//! Every algorithm follows the same shape: it borrows a graph through the
//! traits in [`crate::graph`], exposes [`crate::event::Event`] channels for
//! each step it takes, and runs under an [`AlgorithmCore`] state machine
//! whose [`CancelManager`] can stop it between steps, including from inside
//! one of its own event subscribers.

use crate::graph::Edge;

/// A boxed walk over out-edges, as handed out by
/// [`crate::graph::IncidenceGraph::out_edges`].
pub type OutEdges<'g, V> = Box<dyn Iterator<Item = &'g Edge<V>> + 'g>;

/// Rewrites an out-edge walk before a traversal consumes it, to reorder or
/// drop edges.
pub type OutEdgeFilter<'g, V> = Box<dyn Fn(OutEdges<'g, V>) -> OutEdges<'g, V> + 'g>;

mod state;
pub use self::state::*;
mod color;
pub use self::color::*;
mod error;
pub use self::error::*;
mod services;
pub use self::services::*;
mod cancel;
pub use self::cancel::*;
mod base;
pub use self::base::*;
mod rooted;
pub use self::rooted::*;
mod bfs;
pub use self::bfs::*;
mod dfs;
pub use self::dfs::*;
mod toposort;
pub use self::toposort::*;
