#![forbid(unsafe_code)]

//! Layered graph layout for rank-assigned graphs.
//!
//! Given a [`LevelGraph`](strata_levels::LevelGraph) the pipeline
//! - counts weighted edge crossings between adjacent ranks ([`cross_count`]),
//! - reorders ranks to reduce them ([`order`]),
//! - assigns horizontal coordinates ([`position`]).
//!
//! [`tasks`] runs layouts of independent graphs on a `strata_pool` dispatcher.

pub mod cross_count;
pub mod error;
pub mod fixtures;
pub mod order;
pub mod pipeline;
pub mod position;
pub mod tasks;
pub mod validate;

pub use cross_count::{CountingEdge, CrossingCounter, DenseKernels, boundary_crossings};
pub use error::{Error, Result};
pub use order::{CancelToken, ReorderOptions, ReorderStats, reorder};
pub use pipeline::{
    CountingMode, LayoutDocument, LayoutOptions, LayoutResult, Layouter, PlacedNode, layout,
    layout_input,
};
pub use position::{Alignment, Bias, PositionOptions, VerticalDirection, assign_coordinates};

pub use strata_levels as levels;
