use crate::error::{Error, Result};
use crate::weight::EdgeWeight;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

/// Global arena index of a level node.
pub type NodeId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A slice of an input node (possibly one segment of a multi-rank chain).
    #[default]
    Regular,
    /// A dummy standing in for a long edge on an intermediate rank.
    Virtual,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LevelNode {
    pub id: NodeId,
    pub rank: usize,
    /// Rank-local id; `Ranking` orders and positions are expressed in these.
    pub index: usize,
    pub width: f64,
    pub kind: NodeKind,
    /// First level node of the chain that represents one input node.
    pub is_first: bool,
    /// Last level node of the chain that represents one input node.
    pub is_last: bool,
    /// Index of the input node this level node was derived from, if any.
    pub source: Option<usize>,
}

impl LevelNode {
    pub fn is_virtual(&self) -> bool {
        self.kind == NodeKind::Virtual
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelEdge {
    pub src: NodeId,
    pub dst: NodeId,
    pub weight: EdgeWeight,
}

/// A rank-partitioned graph: every edge connects a node on rank `r` to a node on rank `r + 1`.
#[derive(Debug, Clone, Default)]
pub struct LevelGraph {
    nodes: Vec<LevelNode>,
    ranks: Vec<Vec<NodeId>>,
    edges: Vec<LevelEdge>,
    edge_index: HashMap<(NodeId, NodeId), usize>,
}

impl LevelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with `count` empty ranks.
    pub fn with_ranks(count: usize) -> Self {
        Self {
            ranks: vec![Vec::new(); count],
            ..Default::default()
        }
    }

    pub fn add_node(&mut self, rank: usize, width: f64) -> NodeId {
        self.push_node(rank, width, NodeKind::Regular, true, true, None)
    }

    pub fn add_virtual_node(&mut self, rank: usize) -> NodeId {
        self.push_node(rank, 0.0, NodeKind::Virtual, false, false, None)
    }

    pub(crate) fn push_node(
        &mut self,
        rank: usize,
        width: f64,
        kind: NodeKind,
        is_first: bool,
        is_last: bool,
        source: Option<usize>,
    ) -> NodeId {
        if self.ranks.len() <= rank {
            self.ranks.resize_with(rank + 1, Vec::new);
        }
        let id = self.nodes.len();
        let index = self.ranks[rank].len();
        self.ranks[rank].push(id);
        self.nodes.push(LevelNode {
            id,
            rank,
            index,
            width,
            kind,
            is_first,
            is_last,
            source,
        });
        id
    }

    /// Adds an edge between adjacent ranks. Parallel edges are merged by combining weights.
    pub fn add_edge(&mut self, src: NodeId, dst: NodeId, weight: EdgeWeight) -> Result<()> {
        let src_rank = self.require(src)?.rank;
        let dst_rank = self.require(dst)?.rank;
        if dst_rank != src_rank + 1 {
            return Err(Error::EdgeNotDownward {
                src: src.to_string(),
                dst: dst.to_string(),
                src_rank,
                dst_rank,
            });
        }

        match self.edge_index.get(&(src, dst)) {
            Some(&i) => {
                let edge = &mut self.edges[i];
                edge.weight = edge.weight.combine(weight);
            }
            None => {
                self.edge_index.insert((src, dst), self.edges.len());
                self.edges.push(LevelEdge { src, dst, weight });
            }
        }
        Ok(())
    }

    fn require(&self, id: NodeId) -> Result<&LevelNode> {
        self.nodes.get(id).ok_or_else(|| Error::UnknownNode {
            id: id.to_string(),
        })
    }

    pub fn node(&self, id: NodeId) -> Option<&LevelNode> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> &[LevelNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[LevelEdge] {
        &self.edges
    }

    pub fn edge_between(&self, src: NodeId, dst: NodeId) -> Option<&LevelEdge> {
        self.edge_index.get(&(src, dst)).map(|&i| &self.edges[i])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn rank_count(&self) -> usize {
        self.ranks.len()
    }

    /// Global ids of the nodes on rank `r`, indexed by their rank-local id.
    pub fn rank(&self, r: usize) -> &[NodeId] {
        self.ranks.get(r).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn rank_len(&self, r: usize) -> usize {
        self.rank(r).len()
    }

    pub fn ranks(&self) -> impl Iterator<Item = &[NodeId]> {
        self.ranks.iter().map(Vec::as_slice)
    }

    /// Resolves a rank-local id to its node.
    pub fn node_at(&self, rank: usize, index: usize) -> Option<&LevelNode> {
        self.ranks
            .get(rank)
            .and_then(|ids| ids.get(index))
            .and_then(|&id| self.nodes.get(id))
    }

    pub fn widths(&self, rank: usize) -> Vec<f64> {
        self.rank(rank).iter().map(|&id| self.nodes[id].width).collect()
    }
}
