pub const DEV_NULL: &str = "/dev/null";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Context,
    Added,
    Removed,
}

#[derive(Debug, Clone)]
pub struct Line {
    pub kind: LineKind,
    pub text: String,
    /// A `\ No newline at end of file` marker followed this line.
    pub missing_newline: bool,
}

impl Line {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Line {
        Line {
            kind,
            text: text.into(),
            missing_newline: false,
        }
    }

    pub fn context(text: impl Into<String>) -> Line {
        Line::new(LineKind::Context, text)
    }

    pub fn added(text: impl Into<String>) -> Line {
        Line::new(LineKind::Added, text)
    }

    pub fn removed(text: impl Into<String>) -> Line {
        Line::new(LineKind::Removed, text)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hunk {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub section: Option<String>,
    pub lines: Vec<Line>,
}

impl Hunk {
    pub fn label(&self) -> String {
        match &self.section {
            Some(section) => format!(
                "@@ -{},{} +{},{} @@ {}",
                self.old_start, self.old_len, self.new_start, self.new_len, section
            ),
            None => format!(
                "@@ -{},{} +{},{} @@",
                self.old_start, self.old_len, self.new_start, self.new_len
            ),
        }
    }

    /// Context + Removed lines, in order: the text this hunk expects to find.
    pub fn original_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.kind != LineKind::Added)
    }

    /// Context + Added lines, in order: the text this hunk produces.
    pub fn patched_lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.iter().filter(|l| l.kind != LineKind::Removed)
    }

    pub fn render_original(&self) -> String {
        render(self.original_lines())
    }

    pub fn render_patched(&self) -> String {
        render(self.patched_lines())
    }

    pub fn invert(&self) -> Hunk {
        let inverted_lines = self
            .lines
            .iter()
            .map(|line| {
                let kind = match line.kind {
                    LineKind::Context => LineKind::Context,
                    LineKind::Added => LineKind::Removed,
                    LineKind::Removed => LineKind::Added,
                };
                Line {
                    kind,
                    text: line.text.clone(),
                    missing_newline: line.missing_newline,
                }
            })
            .collect();

        Hunk {
            old_start: self.new_start,
            old_len: self.new_len,
            new_start: self.old_start,
            new_len: self.old_len,
            section: self.section.clone(),
            lines: inverted_lines,
        }
    }
}

fn render<'a>(lines: impl Iterator<Item = &'a Line>) -> String {
    let mut out = String::new();
    let mut last_missing_newline = false;
    for line in lines {
        out.push_str(&line.text);
        out.push('\n');
        last_missing_newline = line.missing_newline;
    }
    if last_missing_newline {
        out.pop();
    }
    out
}

#[derive(Debug, Clone, Default)]
pub struct FilePatch {
    pub old_path: String,
    pub new_path: String,
    pub old_metadata: Option<String>,
    pub new_metadata: Option<String>,
    pub hunks: Vec<Hunk>,
}

impl FilePatch {
    pub fn is_addition(&self) -> bool {
        self.old_path == DEV_NULL
    }

    pub fn is_deletion(&self) -> bool {
        self.new_path == DEV_NULL
    }

    pub fn is_rename(&self) -> bool {
        !self.is_addition()
            && !self.is_deletion()
            && crate::paths::strip_prefix_segments(&self.old_path, 1)
                != crate::paths::strip_prefix_segments(&self.new_path, 1)
    }

    pub fn invert(&self) -> FilePatch {
        FilePatch {
            old_path: self.new_path.clone(),
            new_path: self.old_path.clone(),
            old_metadata: self.new_metadata.clone(),
            new_metadata: self.old_metadata.clone(),
            hunks: self.hunks.iter().map(Hunk::invert).collect(),
        }
    }
}
