//! Horizontal coordinate assignment.
//!
//! A Brandes & Köpf style pass: nodes are aligned into vertical blocks with their median
//! neighbors on the previously processed rank, and blocks are then compacted by longest-path
//! relaxation over separation constraints. Heavy edges restrict which neighbors may align so that
//! chains of one logical node stay straight.

mod align;
mod balance;
mod compact;

use serde::{Deserialize, Serialize};
use strata_levels::{Direction, LevelGraph, NeighborLists, NodeId, Ranking};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bias {
    #[default]
    Left,
    Right,
}

/// Order in which ranks are aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalDirection {
    #[default]
    Down,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    /// One pass with the configured bias and direction.
    #[default]
    Single,
    /// All four bias/direction passes, combined per node.
    Balanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionOptions {
    /// Minimum horizontal gap between the borders of neighboring nodes.
    pub spacing: f64,
    pub bias: Bias,
    pub direction: VerticalDirection,
    pub alignment: Alignment,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            spacing: 50.0,
            bias: Bias::Left,
            direction: VerticalDirection::Down,
            alignment: Alignment::Single,
        }
    }
}

/// Assigns an x-coordinate (node center) to every level node, indexed by [`NodeId`].
///
/// The result is a pure function of its inputs and is translated so that the smallest coordinate
/// is 0.
#[tracing::instrument(skip_all, fields(nodes = levels.node_count()))]
pub fn assign_coordinates(
    levels: &LevelGraph,
    ranking: &Ranking,
    neighbors: &NeighborLists,
    options: &PositionOptions,
) -> Vec<f64> {
    let widths: Vec<Vec<f64>> = (0..levels.rank_count()).map(|r| levels.widths(r)).collect();
    let mut xs = match options.alignment {
        Alignment::Single => single_pass(
            levels,
            ranking,
            neighbors,
            &widths,
            options.spacing,
            options.direction,
            options.bias,
        ),
        Alignment::Balanced => {
            let passes = balance::PASSES.map(|(direction, bias)| {
                single_pass(
                    levels,
                    ranking,
                    neighbors,
                    &widths,
                    options.spacing,
                    direction,
                    bias,
                )
            });
            balance::balance(levels, passes)
        }
    };
    normalize(&mut xs);
    xs
}

fn single_pass(
    levels: &LevelGraph,
    ranking: &Ranking,
    neighbors: &NeighborLists,
    widths: &[Vec<f64>],
    spacing: f64,
    direction: VerticalDirection,
    bias: Bias,
) -> Vec<f64> {
    let frame = Frame::new(ranking, direction, bias);
    let blocks = align::vertical_alignment(&frame, neighbors, widths);
    let block_x = compact::horizontal_compaction(&frame, &blocks, spacing);

    let sign = if frame.mirrored { -1.0 } else { 1.0 };
    let mut xs = vec![0.0; levels.node_count()];
    for (r, ids) in levels.ranks().enumerate() {
        for (n, &id) in ids.iter().enumerate() {
            xs[id] = sign * block_x[blocks.root[r][n]];
        }
    }
    normalize(&mut xs);
    xs
}

/// Shifts all coordinates so that the smallest one is 0.
fn normalize(xs: &mut [f64]) {
    let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
    if min.is_finite() && min != 0.0 {
        for x in xs.iter_mut() {
            *x -= min;
        }
    }
}

/// A view of the ranking for one pass: ranks in processing order and slots mirrored for a
/// right bias, so that every pass can align toward the left.
pub(crate) struct Frame<'a> {
    ranking: &'a Ranking,
    mirrored: bool,
    /// Ranks in processing order.
    ranks: Vec<usize>,
    /// Direction of the previously processed rank.
    toward: Direction,
}

impl<'a> Frame<'a> {
    fn new(ranking: &'a Ranking, direction: VerticalDirection, bias: Bias) -> Self {
        let count = ranking.rank_count();
        let (ranks, toward) = match direction {
            VerticalDirection::Down => ((0..count).collect(), Direction::Up),
            VerticalDirection::Up => ((0..count).rev().collect(), Direction::Down),
        };
        Self {
            ranking,
            mirrored: bias == Bias::Right,
            ranks,
            toward,
        }
    }

    fn len(&self, rank: usize) -> usize {
        self.ranking.order(rank).len()
    }

    /// Slot of rank-local id `n` in this frame.
    fn slot(&self, rank: usize, n: usize) -> usize {
        let p = self.ranking.position(rank)[n];
        if self.mirrored { self.len(rank) - 1 - p } else { p }
    }

    fn node_at(&self, rank: usize, slot: usize) -> usize {
        let order = self.ranking.order(rank);
        if self.mirrored {
            order[order.len() - 1 - slot]
        } else {
            order[slot]
        }
    }

    /// Rank-local ids of `rank` in frame slot order.
    fn nodes(&self, rank: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.len(rank)).map(move |slot| self.node_at(rank, slot))
    }
}

/// Global ids and coordinates of `rank`, in slot order.
pub fn rank_coordinates<'a>(
    levels: &'a LevelGraph,
    ranking: &'a Ranking,
    xs: &'a [f64],
    rank: usize,
) -> impl Iterator<Item = (NodeId, f64)> + 'a {
    ranking.order(rank).iter().map(move |&n| {
        let id = levels.rank(rank)[n];
        (id, xs[id])
    })
}
