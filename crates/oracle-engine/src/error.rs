// error.rs — Error types for the matching engine.

use thiserror::Error;

/// Errors that can occur while parsing goals or evaluating a strategy.
///
/// Every variant is fatal for the invocation that raised it: the engine is a
/// pure transform, so an error means the input or the strategy is defective.
#[derive(Debug, Error)]
pub enum OracleError {
    /// A goal line could not be split into `<id>:<label>`.
    #[error("malformed goal on line {line}: '{content}': {reason}")]
    MalformedInput {
        line: usize,
        content: String,
        reason: String,
    },

    /// A template references a capture name the producing match never bound.
    #[error("template '{template}' references unbound capture '{name}'")]
    MissingBinding { name: String, template: String },

    /// A regex source failed to compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
