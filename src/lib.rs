pub mod config;
pub mod diff;
pub mod error;
pub mod matcher;
pub mod parser;
pub mod paths;
pub mod patcher;

pub use config::{BEST_EFFORT_FUZZ, ConfigError, HunkFilter, PatchConfiguration, PropertyValue};
pub use diff::{DEV_NULL, FilePatch, Hunk, Line, LineKind};
pub use matcher::{HunkMatch, MatchFailure, find_hunk_match};
pub use parser::{ParseError, ParseErrorKind, is_patch, parse_patch};
pub use patcher::{HunkStatus, MatchResult, PatchResult, apply};
