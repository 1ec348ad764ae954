// goal.rs — Goal model and input parsing.
//
// A goal is one line of oracle input: `<id>:<label>`. The canonical
// collection is parsed once per invocation and never mutated. Matcher stages
// that capture named groups re-wrap a goal (same id and label, fresh
// bindings) instead of changing it, so captures never leak back into earlier
// stages.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::OracleError;

/// Named capture values attached to a goal by the match that produced it.
///
/// A `BTreeMap` keeps iteration order stable, which keeps diagnostics and
/// test output deterministic.
pub type Bindings = BTreeMap<String, String>;

/// One identified, labeled item from the oracle input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal {
    id: u64,
    label: Arc<str>,
    bindings: Bindings,
}

impl Goal {
    /// Create a goal with no bindings.
    pub fn new(id: u64, label: impl Into<Arc<str>>) -> Self {
        Self {
            id,
            label: label.into(),
            bindings: Bindings::new(),
        }
    }

    /// Parse a single `<id>:<label>` line. `line` is 1-based and only used
    /// for diagnostics.
    pub fn parse_line(line: usize, content: &str) -> Result<Self, OracleError> {
        let malformed = |reason: String| OracleError::MalformedInput {
            line,
            content: content.to_string(),
            reason,
        };

        let (prefix, label) = content
            .split_once(':')
            .ok_or_else(|| malformed("missing ':' delimiter".to_string()))?;
        let id = prefix
            .trim()
            .parse::<u64>()
            .map_err(|e| malformed(format!("goal id '{}' is not a number: {}", prefix.trim(), e)))?;

        Ok(Self::new(id, label.trim()))
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Look up a single capture value.
    pub fn binding(&self, name: &str) -> Option<&str> {
        self.bindings.get(name).map(String::as_str)
    }

    /// Re-wrap this goal with a new set of bindings.
    ///
    /// The label is shared (`Arc`), so re-wrapping never copies label text.
    /// Prior bindings are replaced, not merged.
    pub fn with_bindings(&self, bindings: Bindings) -> Self {
        Self {
            id: self.id,
            label: Arc::clone(&self.label),
            bindings,
        }
    }
}

/// Goals display as their id, which is what the oracle prints.
impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

/// Parse the full oracle input into the canonical goal collection.
///
/// Blank lines are skipped. Any other line must be `<id>:<label>`; the first
/// malformed line aborts parsing.
pub fn parse_goals(input: &str) -> Result<Vec<Goal>, OracleError> {
    input
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| Goal::parse_line(index + 1, line))
        .collect()
}
