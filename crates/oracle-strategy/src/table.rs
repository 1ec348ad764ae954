// table.rs — Strategy lookup by name.
//
// Lookup order:
// 1. An entry listing `name` exactly
// 2. The first entry (file order) with a prefix that starts `name`
// 3. The empty strategy; an unknown name is not an error
//
// Exact names are unique across the table; this is checked at load time.

use std::collections::HashSet;
use std::path::Path;

use oracle_engine::{PatternCache, Stage};

use crate::compiler::StrategyCompiler;
use crate::config::{StrategyEntry, StrategyFile};
use crate::error::StrategyError;

/// A validated strategy table.
#[derive(Debug, Clone, Default)]
pub struct StrategyTable {
    entries: Vec<StrategyEntry>,
}

impl StrategyTable {
    /// An empty table: every name resolves to the empty strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a parsed strategy file.
    pub fn from_file(file: StrategyFile) -> Result<Self, StrategyError> {
        let mut seen = HashSet::new();
        for (index, entry) in file.strategies.iter().enumerate() {
            if entry.names.is_empty() && entry.prefixes.is_empty() {
                return Err(StrategyError::EmptyEntry { index });
            }
            for name in &entry.names {
                if !seen.insert(name.as_str()) {
                    return Err(StrategyError::DuplicateName { name: name.clone() });
                }
            }
        }
        Ok(Self {
            entries: file.strategies,
        })
    }

    /// Parse and validate a YAML strategy table.
    pub fn from_yaml(text: &str) -> Result<Self, StrategyError> {
        let file: StrategyFile = serde_yaml::from_str(text)?;
        Self::from_file(file)
    }

    /// Load a strategy table from disk.
    pub fn load(path: &Path) -> Result<Self, StrategyError> {
        let text = std::fs::read_to_string(path).map_err(|source| StrategyError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let table = Self::from_yaml(&text)?;
        tracing::debug!(
            path = %path.display(),
            entries = table.len(),
            "loaded strategy table"
        );
        Ok(table)
    }

    /// Find the entry that answers to `name`, if any.
    pub fn entry_for(&self, name: &str) -> Option<&StrategyEntry> {
        self.entries
            .iter()
            .find(|entry| entry.has_name(name))
            .or_else(|| self.entries.iter().find(|entry| entry.has_prefix_of(name)))
    }

    /// Compile the strategy for `name`, or return the empty strategy when no
    /// entry answers to it.
    pub fn select(&self, name: &str, cache: &PatternCache) -> Result<Stage, StrategyError> {
        match self.entry_for(name) {
            Some(entry) => {
                let stage = StrategyCompiler::compile(name, &entry.stage, cache)?;
                tracing::debug!(strategy = name, entry = %entry.label(), %stage, "selected strategy");
                Ok(stage)
            }
            None => {
                tracing::info!(strategy = name, "unknown strategy, selecting nothing");
                Ok(Stage::empty())
            }
        }
    }

    /// Compile every entry, returning how many compiled. Used to validate a
    /// table up front.
    pub fn compile_all(&self, cache: &PatternCache) -> Result<usize, StrategyError> {
        for entry in &self.entries {
            StrategyCompiler::compile(&entry.label(), &entry.stage, cache)?;
        }
        Ok(self.entries.len())
    }

    /// Every exact name, in file order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|entry| entry.names.iter().map(String::as_str))
    }

    /// Every name prefix, in file order.
    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .flat_map(|entry| entry.prefixes.iter().map(String::as_str))
    }

    pub fn entries(&self) -> &[StrategyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
