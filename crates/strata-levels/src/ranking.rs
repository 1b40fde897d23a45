use crate::error::{Error, Result};
use crate::graph::LevelGraph;

/// Per-rank node order and its inverse.
///
/// `order[r][p]` is the rank-local id at slot `p`; `position[r][id]` is the slot of `id`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ranking {
    order: Vec<Vec<usize>>,
    position: Vec<Vec<usize>>,
}

impl Ranking {
    /// Insertion order on every rank.
    pub fn identity(levels: &LevelGraph) -> Self {
        let order: Vec<Vec<usize>> = (0..levels.rank_count())
            .map(|r| (0..levels.rank_len(r)).collect())
            .collect();
        let position = order.clone();
        Self { order, position }
    }

    pub fn from_orders(order: Vec<Vec<usize>>) -> Result<Self> {
        let mut position = Vec::with_capacity(order.len());
        for (r, rank) in order.iter().enumerate() {
            let mut inverse = vec![usize::MAX; rank.len()];
            for (p, &n) in rank.iter().enumerate() {
                if n >= rank.len() || inverse[n] != usize::MAX {
                    return Err(Error::NotAPermutation {
                        rank: r,
                        len: rank.len(),
                    });
                }
                inverse[n] = p;
            }
            position.push(inverse);
        }
        Ok(Self { order, position })
    }

    /// Like [`Ranking::from_orders`], additionally checking the shape against `levels`.
    pub fn for_graph(levels: &LevelGraph, order: Vec<Vec<usize>>) -> Result<Self> {
        if order.len() != levels.rank_count() {
            return Err(Error::RankCountMismatch {
                expected: levels.rank_count(),
                actual: order.len(),
            });
        }
        for (r, rank) in order.iter().enumerate() {
            if rank.len() != levels.rank_len(r) {
                return Err(Error::NotAPermutation {
                    rank: r,
                    len: levels.rank_len(r),
                });
            }
        }
        Self::from_orders(order)
    }

    pub fn rank_count(&self) -> usize {
        self.order.len()
    }

    pub fn order(&self, r: usize) -> &[usize] {
        &self.order[r]
    }

    pub fn position(&self, r: usize) -> &[usize] {
        &self.position[r]
    }

    pub fn orders(&self) -> &[Vec<usize>] {
        &self.order
    }

    /// Replaces the order of rank `r`; `new_order` must be a permutation of the same ids.
    pub fn set_order(&mut self, r: usize, new_order: &[usize]) {
        debug_assert_eq!(new_order.len(), self.order[r].len());
        self.order[r].copy_from_slice(new_order);
        for (p, &n) in new_order.iter().enumerate() {
            self.position[r][n] = p;
        }
    }

    /// `position[r][order[r][p]] == p` on every rank.
    pub fn is_consistent(&self) -> bool {
        self.order.len() == self.position.len()
            && self.order.iter().zip(&self.position).all(|(order, position)| {
                order.len() == position.len()
                    && order
                        .iter()
                        .enumerate()
                        .all(|(p, &n)| position.get(n) == Some(&p))
            })
    }

    pub fn into_orders(self) -> Vec<Vec<usize>> {
        self.order
    }
}
