use super::{Change, ReorderOptions, ReorderStats, changes};
use crate::cross_count::{CrossingCounter, total};
use strata_levels::{Direction, NeighborLists, Ranking};

/// Reusable scratch state for [`super::reorder`].
#[derive(Debug, Default)]
pub struct Reorderer {
    counter: CrossingCounter,
    keys: Vec<(f64, usize)>,
    candidate: Vec<usize>,
    trial: Vec<usize>,
    permutation: Vec<usize>,
    changes: Vec<Change>,
}

/// The rank visited by a sweep together with its two boundaries.
#[derive(Debug, Clone, Copy)]
struct Step {
    rank: usize,
    /// Direction of the rank the sweep comes from.
    toward: Direction,
    north_rank: usize,
    north_boundary: usize,
    /// `(rank, boundary)` on the far side, absent on the last rank of the sweep.
    south: Option<(usize, usize)>,
}

impl Step {
    fn new(downward: bool, rank: usize, num_ranks: usize) -> Self {
        if downward {
            Self {
                rank,
                toward: Direction::Up,
                north_rank: rank - 1,
                north_boundary: rank,
                south: (rank + 1 < num_ranks).then_some((rank + 1, rank + 1)),
            }
        } else {
            Self {
                rank,
                toward: Direction::Down,
                north_rank: rank + 1,
                north_boundary: rank + 1,
                south: (rank > 0).then(|| (rank - 1, rank)),
            }
        }
    }
}

enum Trial {
    Rejected,
    Accepted,
    Improved,
}

impl Reorderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip_all, fields(ranks = ranking.rank_count()))]
    pub fn run(
        &mut self,
        ranking: &mut Ranking,
        neighbors: &NeighborLists,
        crossings: &mut Vec<u64>,
        options: &ReorderOptions,
    ) -> ReorderStats {
        let num_ranks = ranking.rank_count();
        if crossings.len() != num_ranks {
            *crossings = self.counter.all_boundaries(ranking, neighbors);
        }
        let mut stats = ReorderStats {
            crossings_before: total(crossings),
            ..Default::default()
        };

        if num_ranks >= 2 && !options.disabled {
            self.sweeps(ranking, neighbors, crossings, options, &mut stats);
        }

        let fresh = self.counter.all_boundaries(ranking, neighbors);
        stats.consistent = fresh == *crossings;
        if !stats.consistent {
            tracing::warn!(cached = ?crossings, recount = ?fresh, "crossing cache diverged from recount");
            *crossings = fresh;
        }
        stats.crossings_after = total(crossings);
        tracing::debug!(
            sweeps = stats.sweeps,
            accepted = stats.accepted,
            before = stats.crossings_before,
            after = stats.crossings_after,
            "reorder finished"
        );
        stats
    }

    fn sweeps(
        &mut self,
        ranking: &mut Ranking,
        neighbors: &NeighborLists,
        crossings: &mut [u64],
        options: &ReorderOptions,
        stats: &mut ReorderStats,
    ) {
        let num_ranks = ranking.rank_count();
        let multiplier = mean_multiplier(neighbors);
        let mut budget = options.improvement_budget;
        let mut downward = true;

        while budget > 0 {
            budget -= 1;
            stats.sweeps += 1;
            let ranks: Vec<usize> = if downward {
                (1..num_ranks).collect()
            } else {
                (0..num_ranks - 1).rev().collect()
            };

            for rank in ranks {
                if options.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                    stats.cancelled = true;
                    tracing::debug!(rank, "reorder cancelled");
                    return;
                }
                let step = Step::new(downward, rank, num_ranks);
                if crossings[step.north_boundary] == 0 {
                    continue;
                }

                self.candidate_order(ranking, neighbors, &step, multiplier);
                changes(
                    &self.candidate,
                    ranking.position(rank),
                    &mut self.permutation,
                    &mut self.changes,
                );
                for i in 0..self.changes.len() {
                    let Change { begin, end } = self.changes[i];
                    self.trial.clear();
                    self.trial.extend_from_slice(ranking.order(rank));
                    self.trial[begin..=end].copy_from_slice(&self.candidate[begin..=end]);
                    stats.trials += 1;
                    match self.try_trial(ranking, neighbors, crossings, &step) {
                        Trial::Rejected => {}
                        Trial::Accepted => stats.accepted += 1,
                        Trial::Improved => {
                            stats.accepted += 1;
                            budget = options.improvement_budget;
                        }
                    }
                }
            }
            downward = !downward;
        }
    }

    /// Sorts the rank by the weighted mean slot of its neighbors on the sweep's source rank.
    fn candidate_order(
        &mut self,
        ranking: &Ranking,
        neighbors: &NeighborLists,
        step: &Step,
        multiplier: f64,
    ) {
        let north_position = ranking.position(step.north_rank);
        self.keys.clear();
        for (pos, &n) in ranking.order(step.rank).iter().enumerate() {
            let (mut sum, mut num) = (0u128, 0u128);
            for nb in neighbors.of(step.toward, step.rank, n) {
                let w = u128::from(nb.weight.ordering_weight());
                sum += w * north_position[nb.end] as u128;
                num += w;
            }
            let pos = pos as f64;
            let key = if num > 0 {
                multiplier * sum as f64 / num as f64 + pos
            } else {
                multiplier * pos + pos
            };
            self.keys.push((key, n));
        }
        self.keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        self.candidate.clear();
        self.candidate.extend(self.keys.iter().map(|&(_, n)| n));
    }

    fn try_trial(
        &mut self,
        ranking: &mut Ranking,
        neighbors: &NeighborLists,
        crossings: &mut [u64],
        step: &Step,
    ) -> Trial {
        let prev_north = crossings[step.north_boundary];
        let new_north = self.counter.boundary(
            &self.trial,
            neighbors.rank(step.toward, step.rank),
            ranking.position(step.north_rank),
        );
        let (prev_south, new_south) = match step.south {
            Some((south_rank, boundary)) => (
                crossings[boundary],
                self.counter.boundary(
                    &self.trial,
                    neighbors.rank(step.toward.opposite(), step.rank),
                    ranking.position(south_rank),
                ),
            ),
            None => (0, 0),
        };

        let prev_total = prev_north.saturating_add(prev_south);
        let new_total = new_north.saturating_add(new_south);
        if new_north >= prev_north || new_total > prev_total {
            return Trial::Rejected;
        }

        crossings[step.north_boundary] = new_north;
        if let Some((_, boundary)) = step.south {
            crossings[boundary] = new_south;
        }
        ranking.set_order(step.rank, &self.trial);
        tracing::trace!(rank = step.rank, new_north, new_south, "trial accepted");

        if new_total < prev_total {
            Trial::Improved
        } else {
            Trial::Accepted
        }
    }
}

/// Scales mean slots so that any difference in means outweighs the slot tie-breaker.
fn mean_multiplier(neighbors: &NeighborLists) -> f64 {
    let mut max_edges = 0usize;
    let mut max_weight = 0u32;
    for r in 0..neighbors.rank_count() {
        let lists = neighbors.rank(Direction::Up, r);
        max_edges = max_edges.max(lists.iter().map(Vec::len).sum());
        for nb in lists.iter().flatten() {
            max_weight = max_weight.max(nb.weight.ordering_weight());
        }
    }
    f64::from(max_weight) * max_edges as f64 + 1.0
}
