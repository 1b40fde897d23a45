use crate::graph::LevelGraph;
use crate::weight::EdgeWeight;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward the lower rank index.
    Up,
    /// Toward the higher rank index.
    Down,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbor {
    /// Rank-local id of the node on the adjacent rank.
    pub end: usize,
    pub weight: EdgeWeight,
}

/// Adjacency of every node toward both adjacent ranks, indexed by rank and rank-local id.
#[derive(Debug, Clone, Default)]
pub struct NeighborLists {
    up: Vec<Vec<Vec<Neighbor>>>,
    down: Vec<Vec<Vec<Neighbor>>>,
}

impl NeighborLists {
    pub fn new(levels: &LevelGraph) -> Self {
        let empty = |levels: &LevelGraph| -> Vec<Vec<Vec<Neighbor>>> {
            (0..levels.rank_count())
                .map(|r| vec![Vec::new(); levels.rank_len(r)])
                .collect()
        };
        let mut up = empty(levels);
        let mut down = empty(levels);

        for edge in levels.edges() {
            let (Some(src), Some(dst)) = (levels.node(edge.src), levels.node(edge.dst)) else {
                continue;
            };
            down[src.rank][src.index].push(Neighbor {
                end: dst.index,
                weight: edge.weight,
            });
            up[dst.rank][dst.index].push(Neighbor {
                end: src.index,
                weight: edge.weight,
            });
        }

        Self { up, down }
    }

    pub fn of(&self, direction: Direction, rank: usize, index: usize) -> &[Neighbor] {
        &self.rank(direction, rank)[index]
    }

    /// Neighbor lists of every node on `rank`, indexed by rank-local id.
    pub fn rank(&self, direction: Direction, rank: usize) -> &[Vec<Neighbor>] {
        let lists = match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        };
        lists.get(rank).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rank_count(&self) -> usize {
        self.up.len()
    }

    /// Number of edges between rank `r` and rank `r + 1`.
    pub fn edges_below(&self, r: usize) -> usize {
        self.rank(Direction::Down, r).iter().map(Vec::len).sum()
    }
}
