//! Unified error type for the idl-meta library.
//!
//! Each module defines its own error enum; this module wraps them in a
//! single [`Error`] so application code can use one error type end to end.

use thiserror::Error;

use crate::call::CallError;
use crate::ent::EntError;
use crate::reflect::ReflectError;
use crate::value::ValueError;

/// Unified error type for all idl-meta operations.
///
/// # Example
///
/// ```ignore
/// use idl_meta::{Result, reflect::Interface};
///
/// fn method_name(info: &str) -> Result<&str> {
///     let interface = Interface::parse(info)?;
///     Ok(interface.method(0)?.name()?)
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Error from value conversion or sequence access.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Error from building or reading an Ent blob.
    #[error(transparent)]
    Ent(#[from] EntError),

    /// Error from parsing reflection metadata strings.
    #[error(transparent)]
    Reflect(#[from] ReflectError),

    /// Error from call validation, packing, or return decoding.
    #[error(transparent)]
    Call(#[from] CallError),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a value error.
    pub fn is_value(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Returns `true` if this is an Ent format error.
    pub fn is_ent(&self) -> bool {
        matches!(self, Self::Ent(_))
    }

    /// Returns `true` if this is a reflection metadata error.
    pub fn is_reflect(&self) -> bool {
        matches!(self, Self::Reflect(_))
    }

    /// Returns `true` if this is a call marshaling error.
    pub fn is_call(&self) -> bool {
        matches!(self, Self::Call(_))
    }
}
