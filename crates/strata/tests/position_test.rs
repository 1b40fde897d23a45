use strata::fixtures::{RandomGraphOptions, random_level_graph};
use strata::levels::{EdgeWeight, LevelGraph, NeighborLists, Ranking};
use strata::position::{
    Alignment, Bias, PositionOptions, VerticalDirection, assign_coordinates,
};

fn options(spacing: f64) -> PositionOptions {
    PositionOptions {
        spacing,
        ..Default::default()
    }
}

fn positions(g: &LevelGraph, ranking: &Ranking, options: &PositionOptions) -> Vec<f64> {
    assign_coordinates(g, ranking, &NeighborLists::new(g), options)
}

fn assert_separated(g: &LevelGraph, ranking: &Ranking, xs: &[f64], spacing: f64) {
    for r in 0..g.rank_count() {
        let ids = g.rank(r);
        for pair in ranking.order(r).windows(2) {
            let (a, b) = (ids[pair[0]], ids[pair[1]]);
            let required = (g.nodes()[a].width + g.nodes()[b].width) / 2.0 + spacing;
            assert!(
                xs[b] - xs[a] >= required - 1e-9,
                "rank {r}: {a} at {} and {b} at {} are closer than {required}",
                xs[a],
                xs[b]
            );
        }
    }
}

#[test]
fn single_rank_is_packed_by_width_and_spacing() {
    let mut g = LevelGraph::new();
    for _ in 0..3 {
        g.add_node(0, 10.0);
    }
    let ranking = Ranking::identity(&g);
    assert_eq!(positions(&g, &ranking, &options(20.0)), vec![0.0, 30.0, 60.0]);
}

#[test]
fn right_bias_packs_a_single_rank_the_same_way() {
    let mut g = LevelGraph::new();
    for _ in 0..3 {
        g.add_node(0, 10.0);
    }
    let ranking = Ranking::identity(&g);
    let opts = PositionOptions {
        bias: Bias::Right,
        ..options(20.0)
    };
    assert_eq!(positions(&g, &ranking, &opts), vec![0.0, 30.0, 60.0]);
}

#[test]
fn mixed_widths_keep_exact_gaps_without_edges() {
    let mut g = LevelGraph::new();
    g.add_node(0, 10.0);
    g.add_node(0, 30.0);
    g.add_node(0, 0.0);
    let ranking = Ranking::identity(&g);
    // (10 + 30) / 2 + 5 = 25, then (30 + 0) / 2 + 5 = 20.
    assert_eq!(positions(&g, &ranking, &options(5.0)), vec![0.0, 25.0, 45.0]);
}

#[test]
fn coordinates_follow_the_ranking_not_insertion_order() {
    let mut g = LevelGraph::new();
    for _ in 0..3 {
        g.add_node(0, 10.0);
    }
    let ranking = Ranking::from_orders(vec![vec![2, 0, 1]]).unwrap();
    assert_eq!(positions(&g, &ranking, &options(20.0)), vec![30.0, 60.0, 0.0]);
}

#[test]
fn nodes_align_with_their_median_neighbor() {
    // A over B: a single edge keeps both on one vertical line.
    let mut g = LevelGraph::new();
    let left = g.add_node(0, 10.0);
    let a = g.add_node(0, 10.0);
    let b = g.add_node(1, 10.0);
    g.add_edge(a, b, EdgeWeight::ONE).unwrap();

    let xs = positions(&g, &Ranking::identity(&g), &options(20.0));
    assert_eq!(xs[left], 0.0);
    assert_eq!(xs[a], 30.0);
    assert_eq!(xs[b], xs[a]);
}

#[test]
fn heavy_edges_force_alignment_over_the_median() {
    // North [A, B, E], south [C]. C's median neighbor is B, but its heavy partner is E.
    let mut g = LevelGraph::new();
    let a = g.add_node(0, 10.0);
    let b = g.add_node(0, 10.0);
    let e = g.add_node(0, 10.0);
    let c = g.add_node(1, 10.0);
    g.add_edge(a, c, EdgeWeight::ONE).unwrap();
    g.add_edge(b, c, EdgeWeight::ONE).unwrap();
    g.add_edge(e, c, EdgeWeight::Heavy).unwrap();

    let xs = positions(&g, &Ranking::identity(&g), &options(20.0));
    assert_eq!(xs[c], xs[e]);
    assert_ne!(xs[c], xs[b]);

    let mut light = LevelGraph::new();
    for _ in 0..3 {
        light.add_node(0, 10.0);
    }
    let c = light.add_node(1, 10.0);
    for n in 0..3 {
        light.add_edge(n, c, EdgeWeight::ONE).unwrap();
    }
    let xs = positions(&light, &Ranking::identity(&light), &options(20.0));
    assert_eq!(xs[c], xs[1]);
}

#[test]
fn heavy_segments_keep_other_nodes_on_their_side() {
    // North [A, H], south [X, K] with a heavy edge H -- K. X's only neighbor is H, but X sits
    // left of the heavy edge, so aligning with H would cut through it.
    let mut g = LevelGraph::new();
    let a = g.add_node(0, 10.0);
    let h = g.add_node(0, 10.0);
    let x = g.add_node(1, 10.0);
    let k = g.add_node(1, 10.0);
    g.add_edge(h, x, EdgeWeight::ONE).unwrap();
    g.add_edge(h, k, EdgeWeight::Heavy).unwrap();

    let xs = positions(&g, &Ranking::identity(&g), &options(20.0));
    assert_eq!(xs[k], xs[h]);
    assert_eq!(xs[h], 30.0);
    assert_eq!(xs[a], 0.0);
    assert_eq!(xs[x], 0.0);
}

#[test]
fn multi_rank_chains_stay_vertical() {
    let mut b = strata::levels::LevelGraphBuilder::new();
    b.add_node("wide", 0, 3, 80.0).unwrap();
    b.add_node("n1", 0, 1, 10.0).unwrap();
    b.add_node("n2", 1, 1, 10.0).unwrap();
    b.add_node("n3", 2, 1, 10.0).unwrap();
    b.add_edge("n1", "n2", EdgeWeight::ONE).unwrap();
    b.add_edge("n2", "n3", EdgeWeight::ONE).unwrap();
    let (g, map) = b.build();

    let xs = positions(&g, &Ranking::identity(&g), &options(20.0));
    let chain: Vec<f64> = g
        .nodes()
        .iter()
        .filter(|n| n.source == Some(0))
        .map(|n| xs[n.id])
        .collect();
    assert_eq!(chain.len(), 3);
    assert!(chain.iter().all(|&x| x == chain[0]));
    assert_eq!(xs[map.first[0]], 0.0);
}

#[test]
fn assignment_is_a_pure_function() {
    let g = random_level_graph(17, &RandomGraphOptions::default()).unwrap();
    let ranking = Ranking::identity(&g);
    let neighbors = NeighborLists::new(&g);
    let opts = options(12.0);
    let first = assign_coordinates(&g, &ranking, &neighbors, &opts);
    let second = assign_coordinates(&g, &ranking, &neighbors, &opts);
    assert_eq!(first, second);
}

#[test]
fn every_mode_keeps_neighbors_separated() {
    let g = random_level_graph(
        23,
        &RandomGraphOptions {
            ranks: 6,
            nodes_per_rank: 12,
            density: 0.2,
            heavy_fraction: 0.15,
            ..Default::default()
        },
    )
    .unwrap();
    let ranking = Ranking::identity(&g);

    for alignment in [Alignment::Single, Alignment::Balanced] {
        for bias in [Bias::Left, Bias::Right] {
            for direction in [VerticalDirection::Down, VerticalDirection::Up] {
                let opts = PositionOptions {
                    spacing: 15.0,
                    bias,
                    direction,
                    alignment,
                };
                let xs = positions(&g, &ranking, &opts);
                assert_eq!(xs.len(), g.node_count());
                assert_eq!(xs.iter().copied().fold(f64::INFINITY, f64::min), 0.0);
                assert_separated(&g, &ranking, &xs, opts.spacing);
            }
        }
    }
}

#[test]
fn empty_graph_has_no_coordinates() {
    let g = LevelGraph::with_ranks(2);
    assert!(positions(&g, &Ranking::identity(&g), &options(10.0)).is_empty());
}
