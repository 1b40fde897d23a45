use strata::cross_count::{
    CountingEdge, CrossingCounter, bilayer_cross_count, boundary_crossings, cross_count, total,
};
use strata::fixtures::random_bilayer;
use strata::levels::{Direction, EdgeWeight, LevelGraph, NeighborLists, Ranking};

fn brute_force(edges: &[CountingEdge]) -> u64 {
    let mut crossings = 0;
    for (i, a) in edges.iter().enumerate() {
        for b in &edges[i + 1..] {
            let opposite = (a.north < b.north && a.south > b.south)
                || (a.north > b.north && a.south < b.south);
            if opposite {
                crossings += a.weight * b.weight;
            }
        }
    }
    crossings
}

/// Two ranks `a*` over `b*`, connected by `(a, b, weight)` triples.
fn bilayer(north: usize, south: usize, edges: &[(usize, usize, u32)]) -> LevelGraph {
    let mut g = LevelGraph::with_ranks(2);
    for _ in 0..north {
        g.add_node(0, 10.0);
    }
    for _ in 0..south {
        g.add_node(1, 10.0);
    }
    for &(a, b, w) in edges {
        g.add_edge(a, north + b, EdgeWeight::Finite(w)).unwrap();
    }
    g
}

#[test]
fn cross_count_returns_0_for_an_empty_graph() {
    let g = LevelGraph::new();
    let ranking = Ranking::identity(&g);
    assert!(cross_count(&ranking, &NeighborLists::new(&g)).is_empty());
    assert_eq!(bilayer_cross_count(0, &[]), 0);
}

#[test]
fn cross_count_returns_0_for_a_layering_with_no_crossings() {
    // A -> C, B -> D
    let g = bilayer(2, 2, &[(0, 0, 1), (1, 1, 1)]);
    let crossings = cross_count(&Ranking::identity(&g), &NeighborLists::new(&g));
    assert_eq!(crossings, vec![0, 0]);
}

#[test]
fn cross_count_returns_1_for_a_layering_with_1_crossing() {
    // A -> D, B -> C
    let g = bilayer(2, 2, &[(0, 1, 1), (1, 0, 1)]);
    let crossings = cross_count(&Ranking::identity(&g), &NeighborLists::new(&g));
    assert_eq!(crossings, vec![0, 1]);
    assert_eq!(total(&crossings), 1);
}

#[test]
fn cross_count_returns_a_weighted_crossing_count_for_a_layering_with_1_crossing() {
    let g = bilayer(2, 2, &[(0, 1, 2), (1, 0, 3)]);
    let crossings = cross_count(&Ranking::identity(&g), &NeighborLists::new(&g));
    assert_eq!(crossings[1], 6);
}

#[test]
fn cross_count_follows_the_current_order() {
    let g = bilayer(2, 2, &[(0, 1, 1), (1, 0, 1)]);
    let ranking = Ranking::from_orders(vec![vec![0, 1], vec![1, 0]]).unwrap();
    assert_eq!(cross_count(&ranking, &NeighborLists::new(&g)), vec![0, 0]);
}

#[test]
fn cross_count_counts_heavy_edges_with_weight_1() {
    let mut g = LevelGraph::with_ranks(2);
    let a = g.add_node(0, 0.0);
    let b = g.add_node(0, 0.0);
    let c = g.add_node(1, 0.0);
    let d = g.add_node(1, 0.0);
    g.add_edge(a, d, EdgeWeight::Heavy).unwrap();
    g.add_edge(b, c, EdgeWeight::Finite(4)).unwrap();
    assert_eq!(
        cross_count(&Ranking::identity(&g), &NeighborLists::new(&g)),
        vec![0, 4]
    );
}

#[test]
fn cross_count_sums_boundaries_independently() {
    let mut g = LevelGraph::with_ranks(3);
    let top: Vec<_> = (0..2).map(|_| g.add_node(0, 0.0)).collect();
    let mid: Vec<_> = (0..2).map(|_| g.add_node(1, 0.0)).collect();
    let bottom: Vec<_> = (0..2).map(|_| g.add_node(2, 0.0)).collect();
    g.add_edge(top[0], mid[1], EdgeWeight::ONE).unwrap();
    g.add_edge(top[1], mid[0], EdgeWeight::ONE).unwrap();
    g.add_edge(mid[0], bottom[1], EdgeWeight::Finite(2)).unwrap();
    g.add_edge(mid[1], bottom[0], EdgeWeight::Finite(5)).unwrap();

    let crossings = cross_count(&Ranking::identity(&g), &NeighborLists::new(&g));
    assert_eq!(crossings, vec![0, 1, 10]);
}

#[test]
fn single_slot_ranks_never_cross() {
    let edges = [
        CountingEdge::new(0, 0, 3),
        CountingEdge::new(1, 0, 2),
        CountingEdge::new(2, 0, 1),
    ];
    assert_eq!(bilayer_cross_count(1, &edges), 0);
}

#[test]
fn tree_count_matches_the_pairwise_oracle() {
    let mut counter = CrossingCounter::new();
    let shapes = [(1, 1), (2, 3), (7, 5), (16, 16), (33, 9), (50, 64)];
    for (seed, &(north, south)) in shapes.iter().enumerate() {
        for density in [0.05, 0.3, 0.8] {
            let edges = random_bilayer(seed as u64, north, south, density, 4);
            assert_eq!(
                counter.count(south, &edges),
                brute_force(&edges),
                "north={north} south={south} density={density}"
            );
        }
    }
}

#[test]
fn counting_does_not_depend_on_edge_order() {
    let mut edges = random_bilayer(11, 20, 20, 0.3, 3);
    let expected = bilayer_cross_count(20, &edges);
    edges.reverse();
    assert_eq!(bilayer_cross_count(20, &edges), expected);
}

#[test]
fn boundary_crossings_counts_a_trial_order() {
    // A -> D, B -> C
    let g = bilayer(2, 2, &[(0, 1, 1), (1, 0, 1)]);
    let neighbors = NeighborLists::new(&g);
    let ranking = Ranking::identity(&g);
    let up = neighbors.rank(Direction::Up, 1);

    assert_eq!(boundary_crossings(ranking.order(1), up, ranking.position(0)), 1);
    assert_eq!(boundary_crossings(&[1, 0], up, ranking.position(0)), 0);
}

#[test]
fn maximal_weights_count_exactly_or_saturate() {
    let w = u64::from(u32::MAX);
    let crossed = [CountingEdge::new(0, 1, w), CountingEdge::new(1, 0, w)];
    assert_eq!(bilayer_cross_count(2, &crossed), w * w);

    // Three mutually crossing edges: 3·w² does not fit in a u64.
    let all_crossed = [
        CountingEdge::new(0, 2, w),
        CountingEdge::new(1, 1, w),
        CountingEdge::new(2, 0, w),
    ];
    assert_eq!(CrossingCounter::new().count(3, &all_crossed), u64::MAX);
    assert_eq!(total(&[u64::MAX, 1]), u64::MAX);
}

#[test]
fn maximal_weights_from_a_level_graph_do_not_overflow() {
    let g = bilayer(3, 3, &[(0, 2, u32::MAX), (1, 1, u32::MAX), (2, 0, u32::MAX)]);
    let crossings = cross_count(&Ranking::identity(&g), &NeighborLists::new(&g));
    assert_eq!(crossings, vec![0, u64::MAX]);
}
