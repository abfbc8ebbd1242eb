use crate::config::PatchConfiguration;
use crate::diff::{DEV_NULL, FilePatch};

/// Drops the first `strip` `/`-separated segments. Over-stripping clamps so
/// the final segment always survives.
pub fn strip_prefix_segments(path: &str, strip: usize) -> &str {
    let mut rest = path;
    for _ in 0..strip {
        match rest.split_once('/') {
            Some((_, tail)) if !tail.is_empty() => rest = tail,
            _ => break,
        }
    }
    rest
}

/// The target-relative path a file patch applies to: the stripped new path,
/// or the stripped old path when the configuration is reversed. For an
/// addition or deletion the non-`/dev/null` side names the file.
pub fn target_path<'a>(patch: &'a FilePatch, config: &PatchConfiguration) -> &'a str {
    let (primary, fallback) = if config.reversed() {
        (&patch.old_path, &patch.new_path)
    } else {
        (&patch.new_path, &patch.old_path)
    };
    let raw = if primary == DEV_NULL { fallback } else { primary };
    strip_prefix_segments(raw, config.strip_prefix_segments())
}
