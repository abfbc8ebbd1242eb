use std::sync::Arc;

use seam::config::{HunkFilter, PatchConfiguration};
use seam::diff::Hunk;
use seam::matcher::{MatchFailure, find_hunk_match};
use seam::parser::parse_patch;
use seam::patcher::{self, HunkStatus};

fn to_lines(s: &str) -> Vec<String> {
    s.lines().map(String::from).collect()
}

fn config_with_fuzz(fuzz: i32) -> PatchConfiguration {
    let mut config = PatchConfiguration::new();
    config.set_fuzz(fuzz).unwrap();
    config
}

const GREETING_DIFF: &str = "--- a/greeting.txt\n+++ b/greeting.txt\n@@ -1,3 +1,3 @@\n hello\n-world\n+there\n world again\n";

#[test]
fn test_exact_application() {
    // 1. ARRANGE
    let target = to_lines("hello\nworld\nworld again");
    let patches = parse_patch(GREETING_DIFF).unwrap();

    // 2. ACT
    let result = patcher::apply(&patches[0], &target, &PatchConfiguration::new());

    // 3. ASSERT
    assert_eq!(result.new_content, to_lines("hello\nthere\nworld again"));
    assert_eq!(result.hunks.len(), 1);
    assert_eq!(result.hunks[0].status, HunkStatus::Applied);
    assert_eq!(result.hunks[0].offset, 0);
}

#[test]
fn test_removed_line_mismatch_fails_at_any_fuzz() {
    // Fuzz tolerates context drift, never a removed-line mismatch.
    let target = to_lines("hello\ngoodbye\nworld again");
    let patches = parse_patch(GREETING_DIFF).unwrap();

    let strict = patcher::apply(&patches[0], &target, &config_with_fuzz(0));
    let fuzzy = patcher::apply(&patches[0], &target, &config_with_fuzz(1));

    assert_eq!(strict.hunks[0].status, HunkStatus::Failed(MatchFailure::NoMatch));
    assert_eq!(strict.new_content, target);
    assert_eq!(fuzzy.hunks[0].status, HunkStatus::Failed(MatchFailure::NoMatch));
    assert_eq!(fuzzy.new_content, target);
}

const TWO_HUNK_DIFF: &str = "\
--- a/f.txt
+++ b/f.txt
@@ -1,2 +1,4 @@
 alpha
+inserted one
+inserted two
 beta
@@ -10,3 +12,3 @@
 gamma
-delta
+delta prime
 epsilon
";

fn two_hunk_target() -> Vec<String> {
    let mut lines = to_lines("alpha\nbeta");
    for i in 3..=9 {
        lines.push(format!("filler {i}"));
    }
    lines.extend(to_lines("gamma\ndelta\nepsilon"));
    lines
}

#[test]
fn test_offset_propagates_to_later_hunks() {
    // The first hunk grows the file by two lines; the second hunk's context
    // only exists at the shifted position, so it can only apply if the
    // running offset was carried forward (fuzz 0 allows no search).
    let target = two_hunk_target();
    let patches = parse_patch(TWO_HUNK_DIFF).unwrap();

    let result = patcher::apply(&patches[0], &target, &PatchConfiguration::new());

    assert_eq!(result.hunks[0].status, HunkStatus::Applied);
    assert_eq!(result.hunks[1].status, HunkStatus::Applied);
    assert_eq!(result.hunks[1].offset, 0);
    assert_eq!(result.new_content[1], "inserted one");
    assert_eq!(result.new_content[12], "delta prime");
    assert_eq!(result.new_content.len(), target.len() + 2);
}

#[test]
fn test_whole_file_addition() {
    let diff = "--- /dev/null\n+++ b/new.txt\n@@ -0,0 +1,2 @@\n+first\n+second\n";
    let patches = parse_patch(diff).unwrap();

    let result = patcher::apply(&patches[0], &[], &PatchConfiguration::new());

    assert_eq!(result.new_content, to_lines("first\nsecond"));
    assert_eq!(result.hunks[0].status, HunkStatus::Applied);
}

#[test]
fn test_whole_file_deletion() {
    let diff = "--- a/gone.txt\n+++ /dev/null\n@@ -1,2 +0,0 @@\n-first\n-second\n";
    let target = to_lines("first\nsecond");
    let patches = parse_patch(diff).unwrap();

    let result = patcher::apply(&patches[0], &target, &PatchConfiguration::new());

    assert!(result.new_content.is_empty());
    assert_eq!(result.hunks[0].status, HunkStatus::Applied);
}

#[test]
fn test_filtered_hunk_is_skipped_and_does_not_shift_offset() {
    let target = two_hunk_target();
    let patches = parse_patch(TWO_HUNK_DIFF).unwrap();

    let mut config = PatchConfiguration::new();
    let reject_first: Arc<dyn HunkFilter> = Arc::new(|hunk: &Hunk| hunk.old_start != 1);
    config.add_hunk_filter(reject_first);

    let result = patcher::apply(&patches[0], &target, &config);

    assert_eq!(result.hunks[0].status, HunkStatus::Skipped);
    // With the first hunk suppressed the second must land at its original,
    // unshifted position.
    assert_eq!(result.hunks[1].status, HunkStatus::Applied);
    assert_eq!(result.new_content.len(), target.len());
    assert_eq!(result.new_content[1], "beta");
    assert_eq!(result.new_content[10], "delta prime");
}

#[test]
fn test_apply_never_mutates_its_input() {
    let target = to_lines("hello\nworld\nworld again");
    let before = target.clone();
    let patches = parse_patch(GREETING_DIFF).unwrap();

    let result = patcher::apply(&patches[0], &target, &PatchConfiguration::new());

    assert_eq!(target, before);
    assert_ne!(result.new_content, target);
}

#[test]
fn test_fuzz_peels_mismatched_context() {
    // Leading context differs from the target; fuzz 1 peels it and the
    // target's own line survives in the output.
    let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -1,3 +1,3 @@\n anchor top\n-middle\n+middle patched\n anchor bottom\n";
    let target = to_lines("something else\nmiddle\nanchor bottom");
    let patches = parse_patch(diff).unwrap();

    let strict = patcher::apply(&patches[0], &target, &config_with_fuzz(0));
    let fuzzy = patcher::apply(&patches[0], &target, &config_with_fuzz(1));

    assert_eq!(strict.hunks[0].status, HunkStatus::Failed(MatchFailure::NoMatch));
    assert_eq!(fuzzy.hunks[0].status, HunkStatus::AppliedWithFuzz(1));
    assert_eq!(
        fuzzy.new_content,
        to_lines("something else\nmiddle patched\nanchor bottom")
    );
}

#[test]
fn test_best_effort_fuzz_matches_where_finite_fuzz_does() {
    let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -1,5 +1,5 @@\n ctx one\n ctx two\n-old core\n+new core\n ctx three\n ctx four\n";
    // Both edges of the context have drifted; only the core survives.
    let target = to_lines("changed one\nchanged two\nold core\nchanged three\nchanged four");
    let patches = parse_patch(diff).unwrap();

    let finite = patcher::apply(&patches[0], &target, &config_with_fuzz(2));
    let best_effort = patcher::apply(&patches[0], &target, &config_with_fuzz(-1));

    assert_eq!(finite.hunks[0].status, HunkStatus::AppliedWithFuzz(2));
    assert_eq!(best_effort.hunks[0].status, HunkStatus::AppliedWithFuzz(2));
    assert_eq!(finite.new_content, best_effort.new_content);
    assert_eq!(
        finite.new_content,
        to_lines("changed one\nchanged two\nnew core\nchanged three\nchanged four")
    );
}

#[test]
fn test_positional_drift_within_window_reports_offset() {
    let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -1,3 +1,3 @@\n aaa\n-bbb\n+BBB\n ccc\n";
    let mut target: Vec<String> = (0..500).map(|i| format!("filler {i}")).collect();
    target.extend(to_lines("aaa\nbbb\nccc"));
    let patches = parse_patch(diff).unwrap();

    let hunk = &patches[0].hunks[0];
    let found = find_hunk_match(hunk, &target, 0, &config_with_fuzz(1)).unwrap();

    assert_eq!(found.start, 500);
    assert_eq!(found.offset, 500);
    assert_eq!(found.fuzz, 0);

    let result = patcher::apply(&patches[0], &target, &config_with_fuzz(1));
    assert_eq!(result.hunks[0].status, HunkStatus::Applied);
    assert_eq!(result.hunks[0].offset, 500);
}

#[test]
fn test_drift_beyond_window_is_reported_as_such() {
    let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -1,3 +1,3 @@\n aaa\n-bbb\n+BBB\n ccc\n";
    let mut target: Vec<String> = (0..1100).map(|i| format!("filler {i}")).collect();
    target.extend(to_lines("aaa\nbbb\nccc"));
    let patches = parse_patch(diff).unwrap();

    let result = patcher::apply(&patches[0], &target, &config_with_fuzz(1));

    assert_eq!(
        result.hunks[0].status,
        HunkStatus::Failed(MatchFailure::SearchWindowExceeded)
    );
    assert_eq!(result.new_content, target);
}

#[test]
fn test_insertion_hunk_without_context() {
    let diff = "--- a/f.txt\n+++ b/f.txt\n@@ -2,0 +3,2 @@\n+wedge one\n+wedge two\n";
    let target = to_lines("one\ntwo\nthree");
    let patches = parse_patch(diff).unwrap();

    let result = patcher::apply(&patches[0], &target, &PatchConfiguration::new());

    assert_eq!(result.hunks[0].status, HunkStatus::Applied);
    assert_eq!(
        result.new_content,
        to_lines("one\ntwo\nwedge one\nwedge two\nthree")
    );
}
