use regex::Regex;
use tracing::debug;

use crate::diff::{DEV_NULL, FilePatch, Hunk, Line};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    MalformedHeader,
    TruncatedHunk,
    UnexpectedEndOfInput,
}

#[derive(Debug, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line_number: usize,
    pub line_content: String,
    pub message: String,
}

impl ParseError {
    fn new(
        kind: ParseErrorKind,
        line_number: usize,
        line_content: &str,
        message: impl Into<String>,
    ) -> ParseError {
        ParseError {
            kind,
            line_number,
            line_content: line_content.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "on line {}: {}\n   L content: '{}'",
            self.line_number, self.message, self.line_content
        )
    }
}

impl std::error::Error for ParseError {}

/// True when the text contains at least one well-formed file patch. Never
/// errors on non-patch input.
pub fn is_patch(text: &str) -> bool {
    match parse_patch(text) {
        Ok(patches) => !patches.is_empty(),
        Err(_) => false,
    }
}

/// Parses a unified-diff stream into file patches, in stream order.
///
/// A malformed file patch aborts only itself: scanning resumes at the next
/// `--- ` header, so one bad entry in a multi-file diff does not hide the
/// others. An error is returned only when the stream looked like a patch but
/// nothing survived parsing; plain non-patch text yields an empty vec.
pub fn parse_patch(text: &str) -> Result<Vec<FilePatch>, ParseError> {
    let hunk_header_re = Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@(?: (.*))?$")
        .expect("Invalid regex");

    let lines: Vec<&str> = text.lines().collect();
    let mut patches: Vec<FilePatch> = Vec::new();
    let mut first_error: Option<ParseError> = None;
    let mut i = 0;

    while i < lines.len() {
        if !is_old_header(lines[i]) || i + 1 >= lines.len() || !is_new_header(lines[i + 1]) {
            // Inter-patch noise: git extended headers, prose, binary notes.
            i += 1;
            continue;
        }

        match parse_file_patch(&lines, i, &hunk_header_re) {
            Ok((patch, next)) => {
                // Header pairs with no hunk bodies carry no edits.
                if !patch.hunks.is_empty() {
                    patches.push(patch);
                }
                i = next;
            }
            Err(err) => {
                debug!(line = err.line_number, "skipping malformed file patch: {}", err.message);
                if first_error.is_none() {
                    first_error = Some(err);
                }
                i += 1;
            }
        }
    }

    if patches.is_empty() {
        if let Some(err) = first_error {
            return Err(err);
        }
    }

    Ok(patches)
}

fn is_old_header(line: &str) -> bool {
    line.starts_with("--- ")
}

fn is_new_header(line: &str) -> bool {
    line.starts_with("+++ ")
}

/// Splits a `--- `/`+++ ` header into the raw path and the metadata after the
/// first tab (timestamps, git blob ids). The path is kept exactly as written;
/// prefix stripping happens at resolution time, not here.
fn split_header(rest: &str) -> (String, Option<String>) {
    match rest.split_once('\t') {
        Some((path, metadata)) => (path.to_string(), Some(metadata.to_string())),
        None => (rest.to_string(), None),
    }
}

fn parse_file_patch(
    lines: &[&str],
    start: usize,
    hunk_header_re: &Regex,
) -> Result<(FilePatch, usize), ParseError> {
    let (old_path, old_metadata) = split_header(&lines[start][4..]);
    let (new_path, new_metadata) = split_header(&lines[start + 1][4..]);

    let mut patch = FilePatch {
        old_path: normalize_dev_null(old_path),
        new_path: normalize_dev_null(new_path),
        old_metadata,
        new_metadata,
        hunks: Vec::new(),
    };

    let mut i = start + 2;
    while i < lines.len() && lines[i].starts_with("@@") {
        let (hunk, next) = parse_hunk(lines, i, hunk_header_re)?;
        patch.hunks.push(hunk);
        i = next;
    }

    Ok((patch, i))
}

fn normalize_dev_null(path: String) -> String {
    if path == "dev/null" { DEV_NULL.to_string() } else { path }
}

fn parse_hunk(
    lines: &[&str],
    start: usize,
    hunk_header_re: &Regex,
) -> Result<(Hunk, usize), ParseError> {
    let header = lines[start];
    let caps = hunk_header_re.captures(header).ok_or_else(|| {
        ParseError::new(
            ParseErrorKind::MalformedHeader,
            start + 1,
            header,
            "Malformed hunk header",
        )
    })?;

    let parse_num = |group: usize, default: usize| -> Result<usize, ParseError> {
        caps.get(group)
            .map_or(Ok(default), |m| m.as_str().parse::<usize>())
            .map_err(|e| {
                ParseError::new(
                    ParseErrorKind::MalformedHeader,
                    start + 1,
                    header,
                    format!("Invalid number in hunk header: {e}"),
                )
            })
    };

    let mut hunk = Hunk {
        old_start: parse_num(1, 0)?,
        old_len: parse_num(2, 1)?,
        new_start: parse_num(3, 0)?,
        new_len: parse_num(4, 1)?,
        section: caps.get(5).map(|m| m.as_str().to_string()).filter(|s| !s.is_empty()),
        lines: Vec::new(),
    };

    // Count-driven body: consume until old_len Context+Removed lines and
    // new_len Context+Added lines have been seen. Length markers, not
    // sentinels, delimit a hunk.
    let mut old_seen = 0;
    let mut new_seen = 0;
    let mut i = start + 1;

    let (old_len, new_len) = (hunk.old_len, hunk.new_len);
    let overrun = move |at: usize, content: &str| {
        ParseError::new(
            ParseErrorKind::TruncatedHunk,
            at + 1,
            content,
            format!("Hunk body longer than its header declares ({old_len} old, {new_len} new lines)"),
        )
    };

    while old_seen < hunk.old_len || new_seen < hunk.new_len {
        let Some(&raw) = lines.get(i) else {
            return Err(ParseError::new(
                ParseErrorKind::UnexpectedEndOfInput,
                i,
                lines.last().unwrap_or(&""),
                format!(
                    "Hunk truncated by end of input: expected {} old and {} new lines, found {} and {}",
                    hunk.old_len, hunk.new_len, old_seen, new_seen
                ),
            ));
        };

        if let Some(text) = raw.strip_prefix(' ') {
            if old_seen >= old_len || new_seen >= new_len {
                return Err(overrun(i, raw));
            }
            hunk.lines.push(Line::context(text));
            old_seen += 1;
            new_seen += 1;
        } else if let Some(text) = raw.strip_prefix('-') {
            if old_seen >= old_len {
                return Err(overrun(i, raw));
            }
            hunk.lines.push(Line::removed(text));
            old_seen += 1;
        } else if let Some(text) = raw.strip_prefix('+') {
            if new_seen >= new_len {
                return Err(overrun(i, raw));
            }
            hunk.lines.push(Line::added(text));
            new_seen += 1;
        } else if raw.starts_with('\\') {
            // Attaches to the preceding line; never counts toward a length.
            if let Some(last) = hunk.lines.last_mut() {
                last.missing_newline = true;
            }
        } else if raw.is_empty() {
            // Some emitters drop the lone trailing space of an empty context
            // line; tolerate it the way common patch tools do.
            if old_seen >= old_len || new_seen >= new_len {
                return Err(overrun(i, raw));
            }
            hunk.lines.push(Line::context(""));
            old_seen += 1;
            new_seen += 1;
        } else {
            return Err(ParseError::new(
                ParseErrorKind::TruncatedHunk,
                i + 1,
                raw,
                format!(
                    "Hunk body ended early: expected {} old and {} new lines, found {} and {}",
                    hunk.old_len, hunk.new_len, old_seen, new_seen
                ),
            ));
        }

        i += 1;
    }

    // Trailing no-newline marker after the counts are satisfied.
    if let Some(raw) = lines.get(i) {
        if raw.starts_with('\\') {
            if let Some(last) = hunk.lines.last_mut() {
                last.missing_newline = true;
            }
            i += 1;
        }
    }

    Ok((hunk, i))
}
