//! Error types for Ent blob building and decoding.

use thiserror::Error;

/// Errors raised while building or reading an Ent blob.
///
/// Decode errors mean the blob is malformed; build errors mean a caller
/// violated a record's declared capacity or handed in an invalid reference.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntError {
    #[error("bad magic number {0:02x?}")]
    BadMagic([u8; 4]),

    #[error("unsupported format version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("header file size {header} does not match blob length {actual}")]
    SizeMismatch { header: u32, actual: usize },

    #[error("blob truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("offset {offset} out of range for blob of {file_size} bytes")]
    OffsetOutOfRange { offset: u32, file_size: u32 },

    #[error("unknown record discriminant {0}")]
    UnknownRecordType(u32),

    #[error("unexpected record: expected {expected}, got {got}")]
    UnexpectedRecord {
        expected: &'static str,
        got: &'static str,
    },

    #[error("spec {spec:#010x} does not reference a record")]
    NotARecord { spec: u32 },

    #[error("all {count} {record} slots are already assigned")]
    SlotsFull { record: &'static str, count: u32 },

    #[error("index {index} out of range ({count} entries)")]
    IndexOutOfRange { index: u32, count: u32 },

    #[error("unterminated name string at offset {offset}")]
    UnterminatedString { offset: u32 },

    #[error("name string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: u32 },

    #[error("interned names cannot contain NUL bytes")]
    NulInName,

    #[error("array ranks must be non-zero")]
    ZeroRank,

    #[error("blob size {size} exceeds the u32 file-size field")]
    TooLarge { size: usize },

    #[error(transparent)]
    Fmt(#[from] std::fmt::Error),
}
