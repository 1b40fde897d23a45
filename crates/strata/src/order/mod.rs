//! Crossing reduction.
//!
//! Ranks are swept alternately downward and upward. Each visited rank is sorted by the weighted
//! mean slot of its neighbors on the rank the sweep comes from; the resulting candidate order is
//! split into independent sub-ranges, and each sub-range is kept only if it strictly reduces the
//! crossings on the source-facing boundary without increasing the rank's total.

mod changes;
mod sweep;

pub use changes::{Change, changes};
pub use sweep::Reorderer;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strata_levels::{NeighborLists, Ranking};

/// Cooperative cancellation flag, checked by the reorderer between ranks.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReorderOptions {
    /// Sweeps granted without a strict improvement before the reorderer stops.
    pub improvement_budget: usize,
    /// Keeps the input order untouched.
    pub disabled: bool,
    #[serde(skip)]
    pub cancel: Option<CancelToken>,
}

impl Default for ReorderOptions {
    fn default() -> Self {
        Self {
            improvement_budget: 2,
            disabled: false,
            cancel: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderStats {
    pub sweeps: usize,
    pub trials: usize,
    pub accepted: usize,
    pub crossings_before: u64,
    pub crossings_after: u64,
    pub cancelled: bool,
    /// Whether the incrementally maintained counts matched the final recount.
    pub consistent: bool,
}

/// Reorders `ranking` in place. `crossings` holds the per-boundary counts of the input order (as
/// produced by [`crate::cross_count::cross_count`]) and is kept up to date; it is recomputed first
/// if its length does not match the rank count.
pub fn reorder(
    ranking: &mut Ranking,
    neighbors: &NeighborLists,
    crossings: &mut Vec<u64>,
    options: &ReorderOptions,
) -> ReorderStats {
    Reorderer::new().run(ranking, neighbors, crossings, options)
}
