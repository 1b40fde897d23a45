/// An inclusive slot range of a rank that a candidate order rearranges as a closed unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub begin: usize,
    pub end: usize,
}

/// Splits the move from the current order to `candidate` into independent sub-ranges.
///
/// `position` maps rank-local ids to their current slot. A range opens at a slot whose new
/// occupant comes from further right, grows while later slots are still covered by the furthest
/// such origin, and closes at the first fixed slot (or new left-mover) beyond it. Every range is
/// a permutation of the slots it covers, so each can be applied on its own.
pub fn changes(
    candidate: &[usize],
    position: &[usize],
    permutation: &mut Vec<usize>,
    out: &mut Vec<Change>,
) {
    permutation.clear();
    permutation.extend(candidate.iter().map(|&n| position[n]));
    out.clear();

    let mut open: Option<(usize, usize)> = None;
    for (slot, &from) in permutation.iter().enumerate() {
        if from > slot {
            open = match open {
                None => Some((slot, from)),
                Some((begin, furthest)) if furthest < slot => {
                    out.push(Change {
                        begin,
                        end: slot - 1,
                    });
                    Some((slot, from))
                }
                Some((begin, furthest)) => Some((begin, furthest.max(from))),
            };
        } else if from == slot {
            if let Some((begin, furthest)) = open {
                if furthest < slot {
                    out.push(Change {
                        begin,
                        end: slot - 1,
                    });
                    open = None;
                }
            }
        }
    }
    if let Some((begin, _)) = open {
        out.push(Change {
            begin,
            end: permutation.len() - 1,
        });
    }
}
