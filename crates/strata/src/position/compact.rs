use super::Frame;
use super::align::Blocks;
use rustc_hash::FxHashMap as HashMap;
use std::collections::VecDeque;

/// Places every block at the smallest coordinate allowed by the separation constraints between
/// consecutive nodes, then pulls unconstrained source blocks toward their successors.
pub(crate) fn horizontal_compaction(frame: &Frame<'_>, blocks: &Blocks, spacing: f64) -> Vec<f64> {
    let count = blocks.width.len();

    let mut separation: HashMap<(usize, usize), f64> = HashMap::default();
    for &r in &frame.ranks {
        let mut prev: Option<usize> = None;
        for v in frame.nodes(r) {
            let bv = blocks.root[r][v];
            if let Some(bu) = prev {
                let sep = (blocks.width[bu] + blocks.width[bv]) / 2.0 + spacing;
                let entry = separation.entry((bu, bv)).or_insert(sep);
                *entry = entry.max(sep);
            }
            prev = Some(bv);
        }
    }

    let mut constraints: Vec<((usize, usize), f64)> = separation.into_iter().collect();
    constraints.sort_unstable_by_key(|&(key, _)| key);

    let mut successors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); count];
    let mut in_degree = vec![0usize; count];
    for ((u, v), sep) in constraints {
        successors[u].push((v, sep));
        in_degree[v] += 1;
    }

    // Longest path in topological order; sources start at 0.
    let mut xs = vec![0.0f64; count];
    let mut remaining = in_degree.clone();
    let mut queue: VecDeque<usize> = (0..count).filter(|&b| in_degree[b] == 0).collect();
    let mut placed = 0usize;
    while let Some(b) = queue.pop_front() {
        placed += 1;
        for &(v, sep) in &successors[b] {
            xs[v] = xs[v].max(xs[b] + sep);
            remaining[v] -= 1;
            if remaining[v] == 0 {
                queue.push_back(v);
            }
        }
    }
    if placed < count {
        tracing::warn!(
            blocks = count,
            placed,
            "block constraint graph is cyclic; some blocks were only partially relaxed"
        );
    }

    for b in 0..count {
        if in_degree[b] != 0 || successors[b].is_empty() {
            continue;
        }
        let slack = successors[b]
            .iter()
            .map(|&(v, sep)| xs[v] - sep)
            .fold(f64::INFINITY, f64::min);
        if slack > xs[b] {
            xs[b] = slack;
        }
    }

    xs
}
