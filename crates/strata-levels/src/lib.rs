#![forbid(unsafe_code)]

//! Level graphs: the rank-partitioned graph model consumed by `strata`.
//!
//! Nodes live in an arena (`Vec<LevelNode>`) and are referenced by index. Every rank keeps its own
//! dense, rank-local id space so that per-rank orders and positions are plain permutations.

pub mod builder;
pub mod error;
mod graph;
mod neighbors;
mod ranking;
mod weight;

pub use builder::{InputEdge, InputMap, InputNode, LayoutInput, LevelGraphBuilder};
pub use error::{Error, Result};
pub use graph::{LevelEdge, LevelGraph, LevelNode, NodeId, NodeKind};
pub use neighbors::{Direction, Neighbor, NeighborLists};
pub use ranking::Ranking;
pub use weight::EdgeWeight;
