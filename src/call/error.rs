//! Error types for call marshaling.

use thiserror::Error;

use crate::reflect::ReflectError;
use crate::value::{Kind, ValueError};

/// Errors raised while validating, packing, or decoding a native call.
///
/// Every validation error is raised before the native entry point runs;
/// once the call is made the only failures left are return decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    #[error("expected {expected} arguments, got {got}")]
    ArityMismatch { expected: u32, got: usize },

    #[error("variadic method needs at least {required} arguments, got {got}")]
    VariadicArityMismatch { required: u32, got: usize },

    #[error("argument {index}: expected {expected}, got {got:?}")]
    ArgumentType {
        index: usize,
        expected: &'static str,
        got: Kind,
    },

    #[error("argument {index} is void")]
    VoidArgument { index: usize },

    #[error("parameter {index} has unsupported type tag {tag:?}")]
    UnsupportedParameterType { index: usize, tag: char },

    #[error("unsupported return type tag {tag:?}")]
    UnsupportedReturnType { tag: char },

    #[error("native entry returned {got}, expected {expected}")]
    ReturnMismatch {
        expected: &'static str,
        got: &'static str,
    },

    #[error("no raw entry shim for arity {arity}")]
    UnsupportedArity { arity: usize },

    #[error("raw entry points cannot produce a {0} return")]
    UnsupportedReturnClass(&'static str),

    #[error(transparent)]
    Reflect(#[from] ReflectError),

    #[error(transparent)]
    Value(#[from] ValueError),
}
