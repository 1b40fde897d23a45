use super::Frame;
use strata_levels::NeighborLists;

/// Vertical blocks of one pass.
pub(crate) struct Blocks {
    /// Block of every node, indexed by rank and rank-local id.
    pub root: Vec<Vec<usize>>,
    /// Widest member of every block.
    pub width: Vec<f64>,
}

/// Aligns every node with a median neighbor on the previously processed rank.
///
/// Claims on the previous rank advance strictly left to right. Heavy edges between the two ranks
/// (reduced to a non-crossing subset) split both ranks into segments: a heavy endpoint aligns only
/// with its partner, any other node only with neighbors inside its own segment.
pub(crate) fn vertical_alignment(
    frame: &Frame<'_>,
    neighbors: &NeighborLists,
    widths: &[Vec<f64>],
) -> Blocks {
    let mut root: Vec<Vec<usize>> = widths.iter().map(|w| vec![usize::MAX; w.len()]).collect();
    let mut block_width: Vec<f64> = Vec::new();

    let mut heavy: Vec<(usize, usize)> = Vec::new();
    let mut ws: Vec<usize> = Vec::new();
    let mut prev: Option<usize> = None;

    for &r in &frame.ranks {
        if let Some(p) = prev {
            heavy_segments(frame, neighbors, r, p, &mut heavy);
        }

        let mut claimed: Option<usize> = None;
        for n in frame.nodes(r) {
            let w = widths[r][n];
            let target = prev.and_then(|p| {
                usable_neighbors(frame, neighbors, r, p, n, &heavy, &mut ws);
                let slot = median_claim(&ws, &mut claimed)?;
                Some(root[p][frame.node_at(p, slot)])
            });

            match target {
                Some(block) => {
                    root[r][n] = block;
                    block_width[block] = block_width[block].max(w);
                }
                None => {
                    root[r][n] = block_width.len();
                    block_width.push(w);
                }
            }
        }
        prev = Some(r);
    }

    Blocks {
        root,
        width: block_width,
    }
}

/// Heavy edges between `rank` and the previous rank `prev` as `(prev slot, slot)` pairs, greedily
/// reduced to a set where both coordinates strictly increase.
fn heavy_segments(
    frame: &Frame<'_>,
    neighbors: &NeighborLists,
    rank: usize,
    prev: usize,
    out: &mut Vec<(usize, usize)>,
) {
    out.clear();
    for n in frame.nodes(rank) {
        let slot = frame.slot(rank, n);
        for nb in neighbors.of(frame.toward, rank, n) {
            if nb.weight.is_heavy() {
                out.push((frame.slot(prev, nb.end), slot));
            }
        }
    }
    out.sort_unstable();

    let mut last: Option<(usize, usize)> = None;
    out.retain(|&(p, s)| {
        let keep = last.is_none_or(|(lp, ls)| p > lp && s > ls);
        if keep {
            last = Some((p, s));
        }
        keep
    });
}

/// Sorted previous-rank slots node `n` may align with.
fn usable_neighbors(
    frame: &Frame<'_>,
    neighbors: &NeighborLists,
    rank: usize,
    prev: usize,
    n: usize,
    heavy: &[(usize, usize)],
    out: &mut Vec<usize>,
) {
    out.clear();
    out.extend(
        neighbors
            .of(frame.toward, rank, n)
            .iter()
            .map(|nb| frame.slot(prev, nb.end)),
    );
    out.sort_unstable();
    out.dedup();

    let slot = frame.slot(rank, n);
    let k = heavy.partition_point(|&(_, s)| s < slot);
    match heavy.get(k) {
        Some(&(partner, s)) if s == slot => out.retain(|&p| p == partner),
        upper => {
            let lo = k.checked_sub(1).map(|i| heavy[i].0);
            let hi = upper.map(|&(p, _)| p);
            out.retain(|&p| lo.is_none_or(|lo| p > lo) && hi.is_none_or(|hi| p < hi));
        }
    }
}

/// Picks the lower median, then the upper one, skipping slots at or left of the last claim.
fn median_claim(ws: &[usize], claimed: &mut Option<usize>) -> Option<usize> {
    if ws.is_empty() {
        return None;
    }
    let (lo, hi) = ((ws.len() - 1) / 2, ws.len() / 2);
    for &slot in &ws[lo..=hi] {
        if claimed.is_none_or(|c| slot > c) {
            *claimed = Some(slot);
            return Some(slot);
        }
    }
    None
}
