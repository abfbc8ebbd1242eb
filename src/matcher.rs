use tracing::{debug, trace};

use crate::config::{BEST_EFFORT_FUZZ, PatchConfiguration};
use crate::diff::{Hunk, Line, LineKind};

/// Hard cap on positional drift explored in either direction. Keeps the
/// search bounded on adversarial input.
pub const MAX_SEARCH_WINDOW: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchFailure {
    NoMatch,
    SearchWindowExceeded,
}

impl std::fmt::Display for MatchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchFailure::NoMatch => write!(f, "no matching context found"),
            MatchFailure::SearchWindowExceeded => write!(f, "search window exceeded"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HunkMatch {
    /// Start of the matched (peeled) anchor span in the target, 0-based.
    pub start: usize,
    /// Context lines ignored at the front of the anchor.
    pub peel_front: usize,
    /// Context lines ignored at the back of the anchor.
    pub peel_back: usize,
    /// Fuzz level the match was found at.
    pub fuzz: usize,
    /// Drift of the whole hunk relative to its declared position.
    pub offset: i64,
}

/// Locates the line range in `target` that the hunk's Context+Removed lines
/// correspond to.
///
/// Search order is deterministic: fuzz levels from 0 upward (so the minimal
/// fuzz that matches is reported), and within a level candidate positions by
/// distance from the nominal start, the lower line number first on ties. At
/// fuzz 0 only the nominal position is tried; a non-zero fuzz enables the
/// positional scan, capped at [`MAX_SEARCH_WINDOW`] lines of drift.
pub fn find_hunk_match(
    hunk: &Hunk,
    target: &[String],
    expected_offset: i64,
    config: &PatchConfiguration,
) -> Result<HunkMatch, MatchFailure> {
    let anchor: Vec<&Line> = hunk
        .lines
        .iter()
        .filter(|l| l.kind != LineKind::Added)
        .collect();

    if anchor.is_empty() {
        // Pure insertion: old_start names the line the insertion follows.
        let nominal = hunk.old_start as i64 + expected_offset;
        let start = nominal.clamp(0, target.len() as i64) as usize;
        return Ok(HunkMatch {
            start,
            peel_front: 0,
            peel_back: 0,
            fuzz: 0,
            offset: start as i64 - nominal,
        });
    }

    let nominal = hunk.old_start as i64 - 1 + expected_offset;
    let ignore_ws = config.ignore_whitespace();

    let leading_context = anchor
        .iter()
        .take_while(|l| l.kind == LineKind::Context)
        .count();
    let trailing_context = if leading_context == anchor.len() {
        0
    } else {
        anchor
            .iter()
            .rev()
            .take_while(|l| l.kind == LineKind::Context)
            .count()
    };

    let peelable = leading_context.max(trailing_context);
    let max_peel = match config.fuzz() {
        BEST_EFFORT_FUZZ => peelable,
        fuzz => (fuzz as usize).min(peelable),
    };
    let window = if config.fuzz() == 0 { 0 } else { MAX_SEARCH_WINDOW };

    let mut truncated = false;

    for peel in 0..=max_peel {
        let front = peel.min(leading_context).min(anchor.len() - 1);
        let back = peel
            .min(trailing_context)
            .min(anchor.len() - front - 1);
        let reduced = &anchor[front..anchor.len() - back];

        if reduced.len() > target.len() {
            trace!(peel, "anchor longer than target, skipping level");
            continue;
        }

        // The reduced anchor's own expected position shifts by the peeled
        // front lines.
        let reduced_nominal = nominal + front as i64;
        let max_pos = (target.len() - reduced.len()) as i64;

        let span_below = reduced_nominal.max(0);
        let span_above = (max_pos - reduced_nominal).max(0);
        if window > 0 && span_below.max(span_above) as usize > window {
            truncated = true;
        }

        for distance in 0..=window as i64 {
            for candidate in [reduced_nominal - distance, reduced_nominal + distance] {
                if candidate < 0 || candidate > max_pos {
                    continue;
                }
                let pos = candidate as usize;
                if anchor_matches_at(reduced, target, pos, ignore_ws) {
                    let offset = candidate - reduced_nominal;
                    debug!(peel, offset, pos, "hunk matched");
                    return Ok(HunkMatch {
                        start: pos,
                        peel_front: front,
                        peel_back: back,
                        fuzz: peel,
                        offset,
                    });
                }
                if distance == 0 {
                    // nominal-distance and nominal+distance coincide.
                    break;
                }
            }
        }

        trace!(peel, "no match at this fuzz level");
    }

    if truncated {
        Err(MatchFailure::SearchWindowExceeded)
    } else {
        Err(MatchFailure::NoMatch)
    }
}

fn anchor_matches_at(anchor: &[&Line], target: &[String], pos: usize, ignore_ws: bool) -> bool {
    anchor
        .iter()
        .zip(&target[pos..pos + anchor.len()])
        .all(|(expected, actual)| lines_match(actual, &expected.text, ignore_ws))
}

fn lines_match(actual: &str, expected: &str, ignore_ws: bool) -> bool {
    if ignore_ws {
        normalize_whitespace(actual) == normalize_whitespace(expected)
    } else {
        actual == expected
    }
}

/// Collapses interior whitespace runs and trims both ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
