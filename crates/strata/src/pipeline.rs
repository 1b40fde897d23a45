//! End-to-end layout of a level graph: crossing counts, reordering, coordinates.

use crate::cross_count::{CrossingCounter, DenseKernels, total};
use crate::error::{Error, Result};
use crate::order::{ReorderOptions, ReorderStats, Reorderer};
use crate::position::{PositionOptions, assign_coordinates};
use serde::{Deserialize, Serialize};
use strata_levels::{InputMap, LayoutInput, LevelGraph, LevelGraphBuilder, NeighborLists, Ranking};

/// Which counter produces the crossing counts handed to (and checked after) the reorderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountingMode {
    #[default]
    Tree,
    Dense,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    pub counting: CountingMode,
    pub reorder: ReorderOptions,
    pub position: PositionOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutResult {
    /// Rank-local ids per rank, in slot order.
    pub order: Vec<Vec<usize>>,
    /// Per-boundary crossings; `crossings[r]` counts the boundary above rank `r`.
    pub crossings: Vec<u64>,
    /// Node centers, indexed by level node id.
    pub x: Vec<f64>,
    pub stats: ReorderStats,
}

impl LayoutResult {
    pub fn total_crossings(&self) -> u64 {
        total(&self.crossings)
    }
}

/// Placement of one input node (the first level node of its chain).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedNode {
    pub id: String,
    pub rank: usize,
    pub slot: usize,
    pub x: f64,
}

/// Layout of a [`LayoutInput`] document, keyed by input node ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub nodes: Vec<PlacedNode>,
    pub crossings: Vec<u64>,
    pub total_crossings: u64,
    pub stats: ReorderStats,
}

impl LayoutDocument {
    fn new(levels: &LevelGraph, map: &InputMap, result: LayoutResult) -> Self {
        let nodes = map
            .ids
            .iter()
            .zip(&map.first)
            .filter_map(|(id, &first)| {
                let node = levels.node(first)?;
                let slot = result.order[node.rank]
                    .iter()
                    .position(|&n| n == node.index)?;
                Some(PlacedNode {
                    id: id.clone(),
                    rank: node.rank,
                    slot,
                    x: result.x[first],
                })
            })
            .collect();
        Self {
            nodes,
            total_crossings: result.total_crossings(),
            crossings: result.crossings,
            stats: result.stats,
        }
    }
}

/// Lays out graphs with one set of options, keeping scratch buffers (and the dense kernels, if
/// any) warm between calls.
#[derive(Debug, Default)]
pub struct Layouter {
    options: LayoutOptions,
    counter: CrossingCounter,
    reorderer: Reorderer,
    kernels: Option<DenseKernels>,
}

impl Layouter {
    pub fn new(options: LayoutOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    /// Uses `kernels` when the options select [`CountingMode::Dense`].
    pub fn with_dense_kernels(options: LayoutOptions, kernels: DenseKernels) -> Self {
        Self {
            options,
            kernels: Some(kernels),
            ..Default::default()
        }
    }

    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    pub fn layout(&mut self, levels: &LevelGraph) -> Result<LayoutResult> {
        let neighbors = NeighborLists::new(levels);
        self.layout_ranked(levels, &neighbors, Ranking::identity(levels))
    }

    /// Lays out `levels` starting from an explicit initial order.
    #[tracing::instrument(skip_all, fields(ranks = levels.rank_count(), nodes = levels.node_count()))]
    pub fn layout_ranked(
        &mut self,
        levels: &LevelGraph,
        neighbors: &NeighborLists,
        mut ranking: Ranking,
    ) -> Result<LayoutResult> {
        let mut crossings = self.count(&ranking, neighbors)?;
        let stats = self
            .reorderer
            .run(&mut ranking, neighbors, &mut crossings, &self.options.reorder);

        if self.options.counting == CountingMode::Dense {
            let recount = self.count(&ranking, neighbors)?;
            if recount != crossings {
                return Err(Error::Validation(format!(
                    "dense crossing counts {recount:?} disagree with tree counts {crossings:?}"
                )));
            }
        }

        let x = assign_coordinates(levels, &ranking, neighbors, &self.options.position);
        tracing::debug!(crossings = total(&crossings), "layout finished");
        Ok(LayoutResult {
            order: ranking.into_orders(),
            crossings,
            x,
            stats,
        })
    }

    /// Builds the level graph of `input` and lays it out.
    pub fn layout_input(&mut self, input: &LayoutInput) -> Result<LayoutDocument> {
        let (levels, map) = LevelGraphBuilder::from_input(input)?.build();
        let result = self.layout(&levels)?;
        Ok(LayoutDocument::new(&levels, &map, result))
    }

    fn count(&mut self, ranking: &Ranking, neighbors: &NeighborLists) -> Result<Vec<u64>> {
        match self.options.counting {
            CountingMode::Tree => Ok(self.counter.all_boundaries(ranking, neighbors)),
            CountingMode::Dense => self
                .kernels
                .as_mut()
                .ok_or(Error::KernelsNotInitialized)?
                .cross_count(ranking, neighbors),
        }
    }
}

/// One-shot layout. Dense counting initializes a fresh kernel handle for this call.
pub fn layout(levels: &LevelGraph, options: &LayoutOptions) -> Result<LayoutResult> {
    layouter_for(options)?.layout(levels)
}

pub fn layout_input(input: &LayoutInput, options: &LayoutOptions) -> Result<LayoutDocument> {
    layouter_for(options)?.layout_input(input)
}

fn layouter_for(options: &LayoutOptions) -> Result<Layouter> {
    Ok(match options.counting {
        CountingMode::Tree => Layouter::new(options.clone()),
        CountingMode::Dense => Layouter::with_dense_kernels(options.clone(), DenseKernels::initialized()?),
    })
}
