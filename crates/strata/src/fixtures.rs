//! Seeded random graphs for tests, benchmarks and validation runs.
//!
//! Every generator takes an explicit seed, so the same seed always yields the same graph.

use crate::cross_count::CountingEdge;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use strata_levels::{EdgeWeight, InputEdge, InputNode, LayoutInput, LevelGraph};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomGraphOptions {
    pub ranks: usize,
    pub nodes_per_rank: usize,
    /// Probability of an edge between any two nodes on adjacent ranks.
    pub density: f64,
    /// Finite weights are drawn from `1..=max_weight`.
    pub max_weight: u32,
    /// Probability that an edge is heavy.
    pub heavy_fraction: f64,
    pub min_width: f64,
    pub max_width: f64,
}

impl Default for RandomGraphOptions {
    fn default() -> Self {
        Self {
            ranks: 8,
            nodes_per_rank: 20,
            density: 0.1,
            max_weight: 3,
            heavy_fraction: 0.05,
            min_width: 10.0,
            max_width: 80.0,
        }
    }
}

/// Built-in fixtures: `(name, seed, options)`.
pub fn named_fixtures() -> Vec<(&'static str, u64, RandomGraphOptions)> {
    let base = RandomGraphOptions::default();
    vec![
        (
            "small",
            1,
            RandomGraphOptions {
                ranks: 4,
                nodes_per_rank: 8,
                density: 0.25,
                ..base.clone()
            },
        ),
        ("medium", 2, base.clone()),
        (
            "large",
            3,
            RandomGraphOptions {
                ranks: 24,
                nodes_per_rank: 120,
                density: 0.02,
                ..base.clone()
            },
        ),
        (
            "wide",
            4,
            RandomGraphOptions {
                ranks: 3,
                nodes_per_rank: 400,
                density: 0.01,
                heavy_fraction: 0.0,
                ..base
            },
        ),
    ]
}

pub fn named(name: &str) -> Result<LevelGraph> {
    let (_, seed, options) = named_fixtures()
        .into_iter()
        .find(|(n, _, _)| *n == name)
        .ok_or_else(|| Error::UnknownFixture {
            name: name.to_string(),
        })?;
    random_level_graph(seed, &options)
}

/// A level graph with `nodes_per_rank` nodes on each rank and random edges between adjacent ranks.
pub fn random_level_graph(seed: u64, options: &RandomGraphOptions) -> Result<LevelGraph> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut g = LevelGraph::with_ranks(options.ranks);
    let (min_width, max_width) = width_range(options);
    for r in 0..options.ranks {
        for _ in 0..options.nodes_per_rank {
            let width = rng.gen_range(min_width..=max_width);
            g.add_node(r, width);
        }
    }

    let density = options.density.clamp(0.0, 1.0);
    let heavy = options.heavy_fraction.clamp(0.0, 1.0);
    let max_weight = options.max_weight.max(1);
    for r in 1..options.ranks {
        let (upper, lower) = (g.rank(r - 1).to_vec(), g.rank(r).to_vec());
        for &src in &upper {
            for &dst in &lower {
                if !rng.gen_bool(density) {
                    continue;
                }
                let weight = if rng.gen_bool(heavy) {
                    EdgeWeight::Heavy
                } else {
                    EdgeWeight::Finite(rng.gen_range(1..=max_weight))
                };
                g.add_edge(src, dst, weight)?;
            }
        }
    }
    Ok(g)
}

/// Random edges between two ranks, each present with probability `density`.
pub fn random_bilayer(
    seed: u64,
    num_north: usize,
    num_south: usize,
    density: f64,
    max_weight: u32,
) -> Vec<CountingEdge> {
    let mut rng = StdRng::seed_from_u64(seed);
    let density = density.clamp(0.0, 1.0);
    let max_weight = u64::from(max_weight.max(1));
    let mut edges = Vec::new();
    for north in 0..num_north {
        for south in 0..num_south {
            if rng.gen_bool(density) {
                edges.push(CountingEdge::new(north, south, rng.gen_range(1..=max_weight)));
            }
        }
    }
    edges
}

/// Exports `levels` as an input document with one single-rank node per level node, named `n{id}`.
pub fn to_layout_input(levels: &LevelGraph) -> LayoutInput {
    let name = |id: usize| format!("n{id}");
    LayoutInput {
        nodes: levels
            .nodes()
            .iter()
            .map(|n| InputNode {
                id: name(n.id),
                rank: n.rank,
                rank_span: 1,
                width: n.width,
            })
            .collect(),
        edges: levels
            .edges()
            .iter()
            .map(|e| InputEdge {
                src: name(e.src),
                dst: name(e.dst),
                weight: e.weight,
            })
            .collect(),
    }
}

fn width_range(options: &RandomGraphOptions) -> (f64, f64) {
    let lo = options.min_width.max(0.0);
    (lo, options.max_width.max(lo))
}
