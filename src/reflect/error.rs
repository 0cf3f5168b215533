//! Error types for string-encoded metadata parsing.

use thiserror::Error;

/// Errors raised while walking a reflection metadata string.
///
/// Offsets are byte positions into the metadata string handed to the
/// failing type, not into any enclosing interface string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReflectError {
    #[error("metadata ended unexpectedly at offset {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("unknown type tag {tag:?} at offset {offset}")]
    UnknownTypeTag { tag: char, offset: usize },

    #[error("expected {expected} declaration, got tag {got:?}")]
    UnexpectedDecl { expected: &'static str, got: char },

    #[error("name of {length} bytes at offset {offset} overruns the metadata")]
    NameOutOfRange { offset: usize, length: u32 },

    #[error("length prefix at offset {offset} overflows")]
    NumberOverflow { offset: usize },

    #[error("constant value at offset {offset} is not a number")]
    BadNumber { offset: usize },

    #[error("index {index} out of range ({count} entries)")]
    IndexOutOfRange { index: u32, count: u32 },

    #[error("constant at offset {offset} has no terminating space")]
    UnterminatedConstant { offset: usize },

    #[error("bad escape sequence at offset {offset}")]
    BadEscape { offset: usize },
}
