//! Convenient re-exports for common usage patterns.
//!
//! This module provides a single import to bring all commonly used types
//! into scope.
//!
//! # Example
//!
//! ```ignore
//! use idl_meta::prelude::*;
//!
//! let interface = Interface::parse(info)?;
//! let marshaler = CallMarshaler::new(interface.method(0)?);
//! let result = marshaler.call(&entry, None, &args)?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Value types
pub use crate::value::{
    AnySequence, Kind, Object, ObjectRef, Sequence, SequenceHost, Value, ValueError,
};

// Ent binary metadata
pub use crate::ent::{
    EntBuilder, EntError, EntReader, InterfaceDesc, Primitive, Record, RecordType, Spec,
};

// Reflection metadata strings
pub use crate::reflect::{Constant, Interface, Method, Parameter, ReflectError, Type};

// Call marshaling
pub use crate::call::{
    CallError, CallMarshaler, NativeTarget, RawEntry, RawReturn, ReturnClass, invoke_method,
};
