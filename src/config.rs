use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::diff::Hunk;

/// Fuzz value meaning "widen automatically until the context runs out".
pub const BEST_EFFORT_FUZZ: i32 = -1;

pub trait HunkFilter: Send + Sync {
    fn select(&self, hunk: &Hunk) -> bool;
}

impl<F> HunkFilter for F
where
    F: Fn(&Hunk) -> bool + Send + Sync,
{
    fn select(&self, hunk: &Hunk) -> bool {
        self(hunk)
    }
}

#[derive(Clone)]
pub enum PropertyValue {
    Str(String),
    Int(i64),
    Bool(bool),
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl fmt::Debug for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Str(s) => write!(f, "Str({s:?})"),
            PropertyValue::Int(i) => write!(f, "Int({i})"),
            PropertyValue::Bool(b) => write!(f, "Bool({b})"),
            PropertyValue::Opaque(_) => write!(f, "Opaque(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    InvalidFuzz(i32),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidFuzz(fuzz) => {
                write!(f, "Invalid fuzz factor {fuzz}: must be -1 (best effort) or >= 0")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Options consumed by the applier. Value object: cheap to clone, safe to
/// share read-only across concurrent apply calls.
#[derive(Clone, Default)]
pub struct PatchConfiguration {
    fuzz: i32,
    reversed: bool,
    ignore_whitespace: bool,
    strip_prefix_segments: usize,
    filters: Vec<Arc<dyn HunkFilter>>,
    properties: HashMap<String, PropertyValue>,
}

impl PatchConfiguration {
    pub fn new() -> PatchConfiguration {
        PatchConfiguration::default()
    }

    pub fn fuzz(&self) -> i32 {
        self.fuzz
    }

    pub fn set_fuzz(&mut self, fuzz: i32) -> Result<(), ConfigError> {
        if fuzz < BEST_EFFORT_FUZZ {
            return Err(ConfigError::InvalidFuzz(fuzz));
        }
        self.fuzz = fuzz;
        Ok(())
    }

    pub fn reversed(&self) -> bool {
        self.reversed
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        self.reversed = reversed;
    }

    pub fn ignore_whitespace(&self) -> bool {
        self.ignore_whitespace
    }

    pub fn set_ignore_whitespace(&mut self, ignore_whitespace: bool) {
        self.ignore_whitespace = ignore_whitespace;
    }

    pub fn strip_prefix_segments(&self) -> usize {
        self.strip_prefix_segments
    }

    pub fn set_strip_prefix_segments(&mut self, count: usize) {
        self.strip_prefix_segments = count;
    }

    pub fn add_hunk_filter(&mut self, filter: Arc<dyn HunkFilter>) {
        self.filters.push(filter);
    }

    /// Removes the first registered occurrence of exactly this filter.
    pub fn remove_hunk_filter(&mut self, filter: &Arc<dyn HunkFilter>) -> bool {
        match self.filters.iter().position(|f| Arc::ptr_eq(f, filter)) {
            Some(pos) => {
                self.filters.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn hunk_filters(&self) -> &[Arc<dyn HunkFilter>] {
        &self.filters
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: impl Into<String>, value: PropertyValue) {
        self.properties.insert(key.into(), value);
    }
}

impl fmt::Debug for PatchConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchConfiguration")
            .field("fuzz", &self.fuzz)
            .field("reversed", &self.reversed)
            .field("ignore_whitespace", &self.ignore_whitespace)
            .field("strip_prefix_segments", &self.strip_prefix_segments)
            .field("filters", &self.filters.len())
            .field("properties", &self.properties)
            .finish()
    }
}
