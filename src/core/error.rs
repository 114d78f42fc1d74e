// ============================================================================
// subject-store - Errors
// Failures surfaced by path access and deep cloning
// ============================================================================

use thiserror::Error;

/// Why a selector could not be parsed or applied to a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("unterminated bracket starting at offset {offset}")]
    UnterminatedBracket { offset: usize },

    #[error("unterminated quoted key starting at offset {offset}")]
    UnterminatedQuote { offset: usize },

    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedChar { found: char, offset: usize },

    #[error("empty segment at offset {offset}")]
    EmptySegment { offset: usize },

    /// A non-numeric key was used to index into an array.
    #[error("key {key:?} cannot index an array")]
    KeyOnArray { key: String },

    /// Writing this index would pad the array with too many nulls.
    #[error("index {index} is too far past the end of an array of length {len}")]
    IndexTooLarge { index: usize, len: usize },
}

/// Errors raised by store internals that callers may want to inspect.
///
/// Public store operations recover from these (logging a warning); the
/// fallible `try_*` variants return them.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("value cannot be deep cloned: {0}")]
    Clone(#[from] serde_json::Error),
}
