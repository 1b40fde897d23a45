//! Weighted crossing counting between adjacent ranks.
//!
//! [`CrossingCounter`] implements the accumulator-tree sweep of Barth, Jünger and Mutzel
//! (O(E log S) per rank pair). [`DenseKernels`] computes the same number through dense matrix
//! kernels and is meant for wide ranks where the matrix fits comfortably in memory.

mod dense;

pub use dense::DenseKernels;

use strata_levels::{Direction, Neighbor, NeighborLists, Ranking};

/// An edge between two adjacent ranks, expressed in slots of the current order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CountingEdge {
    pub north: usize,
    pub south: usize,
    pub weight: u64,
}

impl CountingEdge {
    pub fn new(north: usize, south: usize, weight: u64) -> Self {
        Self {
            north,
            south,
            weight,
        }
    }
}

/// Counts the weighted crossings of `edges` between a rank pair with `num_south` slots below.
///
/// Counts saturate at `u64::MAX`.
///
/// Allocates scratch space on every call; loops should keep a [`CrossingCounter`] instead.
pub fn bilayer_cross_count(num_south: usize, edges: &[CountingEdge]) -> u64 {
    CrossingCounter::new().count(num_south, edges)
}

/// Collects the edges leaving `order` (the rank being counted, in slot order) toward the rank whose
/// slots are given by `other_position`. Heavy edges count with weight 1.
pub fn boundary_edges(
    order: &[usize],
    neighbors: &[Vec<Neighbor>],
    other_position: &[usize],
    out: &mut Vec<CountingEdge>,
) {
    out.clear();
    for (north, &n) in order.iter().enumerate() {
        for nb in &neighbors[n] {
            out.push(CountingEdge::new(
                north,
                other_position[nb.end],
                u64::from(nb.weight.ordering_weight()),
            ));
        }
    }
}

/// Counts one boundary for a (possibly trial) `order` against the fixed `other_position` slots.
pub fn boundary_crossings(
    order: &[usize],
    neighbors: &[Vec<Neighbor>],
    other_position: &[usize],
) -> u64 {
    CrossingCounter::new().boundary(order, neighbors, other_position)
}

/// Per-boundary crossing counts of the whole graph.
///
/// `crossings[r]` counts the boundary between ranks `r - 1` and `r`; `crossings[0]` is always 0.
pub fn cross_count(ranking: &Ranking, neighbors: &NeighborLists) -> Vec<u64> {
    CrossingCounter::new().all_boundaries(ranking, neighbors)
}

/// Sum of per-boundary counts, saturating at `u64::MAX`.
pub fn total(crossings: &[u64]) -> u64 {
    crossings.iter().fold(0, |acc, &c| acc.saturating_add(c))
}

/// Tree-based counter holding its scratch buffers between calls.
#[derive(Debug, Clone, Default)]
pub struct CrossingCounter {
    edges: Vec<CountingEdge>,
    tree: Vec<u64>,
}

impl CrossingCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&mut self, num_south: usize, edges: &[CountingEdge]) -> u64 {
        self.edges.clear();
        self.edges.extend_from_slice(edges);
        self.sweep(num_south)
    }

    /// Counts one boundary for a (possibly trial) `order` of one rank against the fixed
    /// positions of an adjacent rank.
    pub fn boundary(
        &mut self,
        order: &[usize],
        neighbors: &[Vec<Neighbor>],
        other_position: &[usize],
    ) -> u64 {
        let mut edges = std::mem::take(&mut self.edges);
        boundary_edges(order, neighbors, other_position, &mut edges);
        self.edges = edges;
        self.sweep(other_position.len())
    }

    pub fn all_boundaries(&mut self, ranking: &Ranking, neighbors: &NeighborLists) -> Vec<u64> {
        let mut crossings = vec![0; ranking.rank_count()];
        for r in 1..ranking.rank_count() {
            crossings[r] = self.boundary(
                ranking.order(r),
                neighbors.rank(Direction::Up, r),
                ranking.position(r - 1),
            );
        }
        crossings
    }

    fn sweep(&mut self, num_south: usize) -> u64 {
        if self.edges.is_empty() {
            return 0;
        }
        self.edges.sort_unstable();

        let first_index = num_south.next_power_of_two();
        let tree_size = 2 * first_index - 1;
        let leaf_base = first_index - 1;
        self.tree.clear();
        self.tree.resize(tree_size, 0);

        let mut crossings: u64 = 0;
        for edge in &self.edges {
            let mut index = edge.south + leaf_base;
            self.tree[index] = self.tree[index].saturating_add(edge.weight);
            let mut weight_sum: u64 = 0;
            while index > 0 {
                // Odd indices are left children: the right sibling holds larger south slots.
                if index % 2 == 1 {
                    weight_sum = weight_sum.saturating_add(self.tree[index + 1]);
                }
                index = (index - 1) >> 1;
                self.tree[index] = self.tree[index].saturating_add(edge.weight);
            }
            crossings = crossings.saturating_add(edge.weight.saturating_mul(weight_sum));
        }
        crossings
    }
}
