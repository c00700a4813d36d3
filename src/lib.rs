//! A mutable bidirectional graph plus observable, cancelable traversal
//! algorithms over it.
//!
//! # Graph store
//!
//! [`graph::BidirectionalGraph`] indexes both out-edges and in-edges per
//! vertex, so either direction enumerates in O(degree). Every mutation fires
//! exactly one notification per affected vertex or edge through the
//! synchronous multicast channels in [`event`].
//!
//! # Algorithms
//!
//! Traversals are small state machines over a shared execution core:
//! [`algorithm::BreadthFirstSearch`], [`algorithm::DepthFirstSearch`]
//! (iterative, with exact tree/back/forward-or-cross edge classification)
//! and [`algorithm::TopologicalSort`], which drives an internal DFS and
//! derives its output purely from the DFS event stream. A run can be
//! observed through its events and stopped cooperatively from any
//! subscriber via a cloned [`algorithm::AlgorithmCore`] handle.
//!
//! ```
//! use graphwalk::algorithm::TopologicalSort;
//! use graphwalk::graph::{BidirectionalGraph, Edge};
//!
//! let mut g = BidirectionalGraph::new();
//! g.add_vertex_range(["a", "b", "c"]);
//! g.add_edge(Edge::new("a", "b")).unwrap();
//! g.add_edge(Edge::new("b", "c")).unwrap();
//!
//! let mut sort = TopologicalSort::new(&g);
//! sort.compute().unwrap();
//! assert_eq!(sort.sorted_vertices(), ["a", "b", "c"]);
//! ```

pub mod algorithm;
pub mod event;
pub mod graph;
