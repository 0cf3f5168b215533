//! Error types for value and sequence operations.

use thiserror::Error;

use super::Kind;

/// Errors raised by typed reads of a [`Value`](super::Value) and by
/// [`Sequence`](super::Sequence) element access.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// The value holds a different tag than the one requested.
    #[error("type mismatch: expected {expected:?}, got {got:?}")]
    TypeMismatch { expected: Kind, got: Kind },

    /// The value is nullable and currently absent.
    #[error("value is absent (nullable {declared:?} with no value)")]
    Absent { declared: Kind },

    /// A sequence was read with a different element type than it holds.
    #[error("sequence element mismatch: expected {expected}, got {got}")]
    SequenceElementMismatch {
        expected: &'static str,
        got: &'static str,
    },

    /// Checked index past the end of a sequence.
    #[error("index {index} out of range for sequence of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Attempted to resize an owned, fixed-length sequence buffer.
    #[error("sequence length is fixed at {len}; cannot resize to {requested}")]
    FixedLength { len: usize, requested: usize },

    /// An external sequence host rejected an operation.
    #[error("sequence host error: {0}")]
    Host(String),
}
