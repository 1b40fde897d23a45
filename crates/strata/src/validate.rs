//! Consistency checks for computed layouts.

use crate::cross_count::cross_count;
use crate::error::{Error, Result};
use crate::pipeline::{LayoutOptions, LayoutResult, Layouter};
use crate::position::rank_coordinates;
use strata_levels::{LevelGraph, NeighborLists, NodeId, Ranking};

const EPSILON: f64 = 1e-6;

/// Checks that `result` is a well-formed layout of `levels`: every rank order is a permutation,
/// the reported crossings match a recount, and consecutive nodes keep at least `spacing` between
/// their borders.
pub fn validate(levels: &LevelGraph, result: &LayoutResult, spacing: f64) -> Result<()> {
    let ranking = Ranking::for_graph(levels, result.order.clone())?;
    let neighbors = NeighborLists::new(levels);

    let recount = cross_count(&ranking, &neighbors);
    if recount != result.crossings {
        return Err(Error::Validation(format!(
            "reported crossings {:?} differ from recount {recount:?}",
            result.crossings
        )));
    }

    if result.x.len() != levels.node_count() {
        return Err(Error::Validation(format!(
            "expected {} coordinates, got {}",
            levels.node_count(),
            result.x.len()
        )));
    }

    let width = |id| levels.node(id).map_or(0.0, |n| n.width);
    for r in 0..levels.rank_count() {
        let placed: Vec<(NodeId, f64)> = rank_coordinates(levels, &ranking, &result.x, r).collect();
        for pair in placed.windows(2) {
            let ((prev, prev_x), (next, next_x)) = (pair[0], pair[1]);
            let gap = next_x - prev_x;
            let required = (width(prev) + width(next)) / 2.0 + spacing;
            if gap + EPSILON < required {
                return Err(Error::Validation(format!(
                    "rank {r}: nodes {prev} and {next} are {gap} apart, need {required}"
                )));
            }
        }
    }
    Ok(())
}

/// Lays `levels` out `runs` times with fresh state and checks that every run agrees.
pub fn check_repeatable(
    levels: &LevelGraph,
    options: &LayoutOptions,
    runs: usize,
) -> Result<LayoutResult> {
    let first = crate::pipeline::layout(levels, options)?;
    for run in 1..runs {
        let again = crate::pipeline::layout(levels, options)?;
        if again != first {
            return Err(Error::Validation(format!(
                "run {run} differs from the first run"
            )));
        }
    }
    Ok(first)
}

/// Like [`check_repeatable`], reusing one warm [`Layouter`] for every run.
pub fn check_repeatable_warm(layouter: &mut Layouter, levels: &LevelGraph, runs: usize) -> Result<LayoutResult> {
    let first = layouter.layout(levels)?;
    for run in 1..runs {
        if layouter.layout(levels)? != first {
            return Err(Error::Validation(format!(
                "warm run {run} differs from the first run"
            )));
        }
    }
    Ok(first)
}
