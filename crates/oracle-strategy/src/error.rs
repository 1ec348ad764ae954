// error.rs — Error types for strategy tables.

use oracle_engine::OracleError;
use thiserror::Error;

/// Errors that can occur while loading or compiling a strategy table.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// The strategy file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The strategy file is not valid YAML for the table schema.
    #[error("strategy file parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Two entries claim the same exact name.
    #[error("strategy name '{name}' is defined more than once")]
    DuplicateName { name: String },

    /// An entry has neither names nor prefixes, so it can never be selected.
    #[error("strategy entry #{index} has no names or prefixes")]
    EmptyEntry { index: usize },

    /// A token declares both or neither of `literal` and `regex`.
    #[error("invalid token in strategy '{strategy}': {reason}")]
    InvalidToken { strategy: String, reason: String },

    /// Compiling a pattern or template failed.
    #[error("strategy '{strategy}': {source}")]
    Engine {
        strategy: String,
        source: OracleError,
    },
}
