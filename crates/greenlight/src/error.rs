//! Builder usage errors.

use thiserror::Error;

/// Usage errors recorded while chaining builder calls.
///
/// The builder stays fluent mid-chain; the first error encountered is
/// remembered and surfaced by `build()`. Most of the original misuse cases
/// (rule calls before `validates`, missing message arguments) are already
/// impossible at the type level, so what remains is helper lookup and
/// argument validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuilderError {
    /// `using` was given an empty failure message.
    #[error("validation for `{attribute}` needs a non-empty failure message")]
    EmptyMessage { attribute: String },

    /// `apply` named a helper missing from the builder's registry.
    #[error("no helper registered under `{0}`")]
    UnknownHelper(String),

    /// A helper rejected its arguments.
    #[error("helper `{helper}` {reason}")]
    HelperArgs { helper: String, reason: String },
}
