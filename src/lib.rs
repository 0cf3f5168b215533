//! Interface metadata codecs and value marshaling for IDL-generated bindings.
//!
//! This library provides the runtime data layer a language binding generator
//! leans on: a tagged-union value type that crosses the binding boundary, a
//! binary metadata format for whole-module interface descriptions, a compact
//! string encoding for per-interface reflection, and a marshaler that turns
//! value arguments into native calls under the direction of that metadata.
//!
//! # Quick Start
//!
//! ```ignore
//! use idl_meta::prelude::*;
//!
//! // Parse an interface reflection string produced by the IDL compiler
//! let interface = Interface::parse(info)?;
//!
//! // Marshal a call through its first method
//! let method = interface.method(0)?;
//! let result = CallMarshaler::new(method).call(&entry, Some(&receiver), &args)?;
//! ```
//!
//! # Modules
//!
//! - [`value`] - The tagged-union [`Value`] carried across the boundary,
//!   with aliasing [`Sequence`] buffers and opaque object references
//! - [`ent`] - Builder, reader, and dump listing for the binary Ent
//!   metadata format
//! - [`reflect`] - Zero-allocation accessors over string-encoded interface
//!   metadata
//! - [`call`] - Argument validation, word-frame packing, and native entry
//!   dispatch
//!
//! # Feature Flags
//!
//! - `logging` - Enable library-level tracing (consumers provide their own
//!   subscriber)

pub mod call;
pub mod ent;
mod logging;
pub mod prelude;
pub mod reflect;
pub mod value;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

// Re-export the types most call sites touch
pub use call::{CallMarshaler, NativeTarget, RawEntry, ReturnClass, invoke_method};
pub use ent::{EntBuilder, EntReader, Spec};
pub use reflect::{Constant, Interface, Method, Type};
pub use value::{Kind, ObjectRef, Sequence, Value};
