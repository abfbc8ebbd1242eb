use tracing::debug;

use crate::config::PatchConfiguration;
use crate::diff::{FilePatch, Hunk, LineKind};
use crate::matcher::{self, HunkMatch, MatchFailure};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkStatus {
    Applied,
    AppliedWithFuzz(usize),
    Skipped,
    Failed(MatchFailure),
}

impl HunkStatus {
    pub fn is_applied(&self) -> bool {
        matches!(self, HunkStatus::Applied | HunkStatus::AppliedWithFuzz(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub hunk: &'a Hunk,
    /// Signed delta between the hunk's declared position and where it was
    /// actually matched.
    pub offset: i64,
    pub status: HunkStatus,
}

/// Freshly allocated per apply call; never aliases the input target.
#[derive(Debug, Clone)]
pub struct PatchResult<'a> {
    pub new_content: Vec<String>,
    pub hunks: Vec<MatchResult<'a>>,
}

impl PatchResult<'_> {
    pub fn applied_count(&self) -> usize {
        self.hunks.iter().filter(|r| r.status.is_applied()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.hunks
            .iter()
            .filter(|r| matches!(r.status, HunkStatus::Failed(_)))
            .count()
    }

    pub fn all_applied(&self) -> bool {
        self.failed_count() == 0
    }
}

/// Applies every hunk of `file_patch` against `target`, in declared order,
/// carrying the line-offset drift of each applied hunk into the next.
///
/// Partial success is the normal contract: the result always holds one
/// `MatchResult` per hunk, and a failed hunk leaves its span of the output
/// untouched without disturbing the hunks that did apply.
pub fn apply<'a>(
    file_patch: &'a FilePatch,
    target: &[String],
    config: &PatchConfiguration,
) -> PatchResult<'a> {
    // Reversal works on an inverted working copy; results still borrow the
    // caller's hunks.
    let inverted;
    let working_hunks: Vec<&Hunk> = if config.reversed() {
        inverted = file_patch.invert();
        inverted.hunks.iter().collect()
    } else {
        file_patch.hunks.iter().collect()
    };

    let mut out: Vec<String> = target.to_vec();
    let mut results: Vec<MatchResult<'a>> = Vec::with_capacity(file_patch.hunks.len());
    let mut offset: i64 = 0;

    for (original, hunk) in file_patch.hunks.iter().zip(working_hunks.iter().copied()) {
        if config.hunk_filters().iter().any(|f| !f.select(original)) {
            debug!(label = %original.label(), "hunk rejected by filter");
            results.push(MatchResult {
                hunk: original,
                offset: 0,
                status: HunkStatus::Skipped,
            });
            continue;
        }

        match matcher::find_hunk_match(hunk, &out, offset, config) {
            Ok(found) => {
                splice(&mut out, hunk, &found);
                offset += found.offset + (hunk.new_len as i64 - hunk.old_len as i64);
                results.push(MatchResult {
                    hunk: original,
                    offset: found.offset,
                    status: if found.fuzz == 0 {
                        HunkStatus::Applied
                    } else {
                        HunkStatus::AppliedWithFuzz(found.fuzz)
                    },
                });
            }
            Err(failure) => {
                debug!(label = %original.label(), %failure, "hunk failed");
                results.push(MatchResult {
                    hunk: original,
                    offset: 0,
                    status: HunkStatus::Failed(failure),
                });
            }
        }
    }

    PatchResult {
        new_content: out,
        hunks: results,
    }
}

/// Replaces the matched Context+Removed span with the Context+Added span.
/// Under fuzz only the reduced span is touched: target lines sitting where
/// context was peeled stay exactly as they are.
fn splice(target: &mut Vec<String>, hunk: &Hunk, found: &HunkMatch) {
    let anchor_positions: Vec<usize> = hunk
        .lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.kind != LineKind::Added)
        .map(|(i, _)| i)
        .collect();

    let peeled_front = &anchor_positions[..found.peel_front];
    let peeled_back = &anchor_positions[anchor_positions.len() - found.peel_back..];

    let replacement: Vec<String> = hunk
        .lines
        .iter()
        .enumerate()
        .filter(|(i, l)| {
            l.kind != LineKind::Removed
                && !peeled_front.contains(i)
                && !peeled_back.contains(i)
        })
        .map(|(_, l)| l.text.clone())
        .collect();

    let removed_len = anchor_positions.len() - found.peel_front - found.peel_back;
    target.splice(found.start..found.start + removed_len, replacement);
}
