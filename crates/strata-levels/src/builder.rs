//! Construction of level graphs from rank-assigned layout nodes.
//!
//! An input node spanning several ranks becomes a chain of level nodes joined by heavy edges; an
//! input edge spanning several ranks is routed through virtual nodes on the intermediate ranks.

use crate::error::{Error, Result};
use crate::graph::{LevelGraph, NodeId, NodeKind};
use crate::weight::EdgeWeight;
use rustc_hash::FxHashMap as HashMap;
use serde::{Deserialize, Serialize};

fn default_rank_span() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputNode {
    pub id: String,
    pub rank: usize,
    #[serde(default = "default_rank_span")]
    pub rank_span: usize,
    #[serde(default)]
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputEdge {
    pub src: String,
    pub dst: String,
    #[serde(default)]
    pub weight: EdgeWeight,
}

/// A rank-assigned graph as handed over by the rank-assignment collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutInput {
    #[serde(default)]
    pub nodes: Vec<InputNode>,
    #[serde(default)]
    pub edges: Vec<InputEdge>,
}

/// Maps input nodes to the level nodes representing them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputMap {
    pub ids: Vec<String>,
    pub first: Vec<NodeId>,
    pub last: Vec<NodeId>,
}

#[derive(Debug, Default)]
pub struct LevelGraphBuilder {
    graph: LevelGraph,
    index: HashMap<String, usize>,
    map: InputMap,
}

impl LevelGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_input(input: &LayoutInput) -> Result<Self> {
        let mut builder = Self::new();
        for node in &input.nodes {
            builder.add_node(node.id.clone(), node.rank, node.rank_span, node.width)?;
        }
        for edge in &input.edges {
            builder.add_edge(&edge.src, &edge.dst, edge.weight)?;
        }
        Ok(builder)
    }

    /// Adds an input node occupying ranks `rank..rank + rank_span`. Returns its input index.
    pub fn add_node(
        &mut self,
        id: impl Into<String>,
        rank: usize,
        rank_span: usize,
        width: f64,
    ) -> Result<usize> {
        let id = id.into();
        if self.index.contains_key(&id) {
            return Err(Error::DuplicateNode { id });
        }
        if rank_span == 0 {
            return Err(Error::ZeroRankSpan { id });
        }
        if !width.is_finite() || width < 0.0 {
            return Err(Error::InvalidWidth { id, width });
        }

        let input = self.map.ids.len();
        let last_rank = rank + rank_span - 1;
        let first = self.graph.push_node(
            rank,
            width,
            NodeKind::Regular,
            true,
            rank_span == 1,
            Some(input),
        );
        let mut prev = first;
        for r in (rank + 1)..=last_rank {
            let next = self.graph.push_node(
                r,
                width,
                NodeKind::Regular,
                false,
                r == last_rank,
                Some(input),
            );
            self.graph.add_edge(prev, next, EdgeWeight::Heavy)?;
            prev = next;
        }

        self.index.insert(id.clone(), input);
        self.map.ids.push(id);
        self.map.first.push(first);
        self.map.last.push(prev);
        Ok(input)
    }

    pub fn add_edge(&mut self, src: &str, dst: &str, weight: EdgeWeight) -> Result<()> {
        let src_input = self.lookup(src)?;
        let dst_input = self.lookup(dst)?;
        let tail = self.map.last[src_input];
        let head = self.map.first[dst_input];
        let tail_rank = self.rank_of(tail);
        let head_rank = self.rank_of(head);

        if head_rank <= tail_rank {
            return Err(Error::EdgeNotDownward {
                src: src.to_string(),
                dst: dst.to_string(),
                src_rank: tail_rank,
                dst_rank: head_rank,
            });
        }

        let mut prev = tail;
        let mut segment_weight = weight;
        for r in (tail_rank + 1)..head_rank {
            let dummy = self.graph.add_virtual_node(r);
            self.graph.add_edge(prev, dummy, segment_weight)?;
            segment_weight = EdgeWeight::Heavy;
            prev = dummy;
        }
        self.graph.add_edge(prev, head, weight)
    }

    fn lookup(&self, id: &str) -> Result<usize> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownNode { id: id.to_string() })
    }

    fn rank_of(&self, id: NodeId) -> usize {
        self.graph.node(id).map(|n| n.rank).unwrap_or(0)
    }

    pub fn build(self) -> (LevelGraph, InputMap) {
        (self.graph, self.map)
    }
}
