use super::{Bias, VerticalDirection};
use strata_levels::LevelGraph;

/// The four passes of a balanced alignment, in tie-breaking order.
pub(crate) const PASSES: [(VerticalDirection, Bias); 4] = [
    (VerticalDirection::Down, Bias::Left),
    (VerticalDirection::Down, Bias::Right),
    (VerticalDirection::Up, Bias::Left),
    (VerticalDirection::Up, Bias::Right),
];

/// Combines four passes: every pass is aligned to the narrowest one (left-biased passes by their
/// minimum, right-biased ones by their maximum), then each node takes the mean of its two median
/// coordinates.
pub(crate) fn balance(levels: &LevelGraph, mut passes: [Vec<f64>; 4]) -> Vec<f64> {
    let narrowest = narrowest_pass(levels, &passes);
    let (target_min, target_max) = extent(&passes[narrowest]);

    for (xs, (_, bias)) in passes.iter_mut().zip(PASSES) {
        let (min, max) = extent(xs);
        let delta = match bias {
            Bias::Left => target_min - min,
            Bias::Right => target_max - max,
        };
        if delta != 0.0 {
            for x in xs.iter_mut() {
                *x += delta;
            }
        }
    }

    (0..levels.node_count())
        .map(|id| {
            let mut vals = [passes[0][id], passes[1][id], passes[2][id], passes[3][id]];
            vals.sort_by(f64::total_cmp);
            (vals[1] + vals[2]) / 2.0
        })
        .collect()
}

fn narrowest_pass(levels: &LevelGraph, passes: &[Vec<f64>; 4]) -> usize {
    let mut best = 0;
    let mut best_width = f64::INFINITY;
    for (i, xs) in passes.iter().enumerate() {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for (node, &x) in levels.nodes().iter().zip(xs) {
            let half = node.width / 2.0;
            min = min.min(x - half);
            max = max.max(x + half);
        }
        let width = max - min;
        if width < best_width {
            best_width = width;
            best = i;
        }
    }
    best
}

fn extent(xs: &[f64]) -> (f64, f64) {
    xs.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
        (lo.min(x), hi.max(x))
    })
}
