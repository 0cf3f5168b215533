//! Tag-directed marshaling of value arguments into native calls.
//!
//! A [`CallMarshaler`] binds one reflected method declaration. Calling
//! through it validates the argument list against the declared signature,
//! packs a word frame, invokes a [`NativeTarget`], and decodes the raw
//! return into a typed [`Value`]. Every mismatch is rejected before the
//! native entry runs; a call with a wrong shape is never attempted.
//!
//! Variadic methods accept the declared count minus one or more arguments;
//! extras re-use the last declared parameter type. An argument carrying
//! the dynamic flag, or declared as `any` or nullable, crosses the
//! boundary erased: as a pointer to the whole value, type information
//! intact.
//!
//! # Module Organization
//!
//! - [`error`]: call validation and decoding errors
//! - [`frame`]: tag-directed word packing
//! - [`entry`]: the native entry seam and the raw-pointer shims

mod entry;
mod error;
mod frame;

pub use entry::{NativeTarget, RawEntry, RawReturn, ReturnClass};
pub use error::CallError;
pub use frame::{ArgPass, CallFrame};

use crate::logging::debug;
use crate::reflect::{self, tag};
use crate::value::{Kind, ObjectRef, Value};

/// Marshals calls through one reflected method declaration.
pub struct CallMarshaler<'a> {
    method: reflect::Method<'a>,
}

impl<'a> CallMarshaler<'a> {
    pub fn new(method: reflect::Method<'a>) -> Self {
        Self { method }
    }

    pub fn method(&self) -> &reflect::Method<'a> {
        &self.method
    }

    /// Validate, pack, invoke, and decode one call.
    ///
    /// `receiver` packs as the implicit first word for interface method
    /// calls; free functions pass `None`.
    pub fn call(
        &self,
        target: &impl NativeTarget,
        receiver: Option<&ObjectRef>,
        args: &[Value],
    ) -> Result<Value, CallError> {
        let declared = self.method.parameter_count()?;
        let variadic = self.method.is_variadic();
        if variadic {
            let required = declared.saturating_sub(1);
            if args.len() < required as usize {
                return Err(CallError::VariadicArityMismatch {
                    required,
                    got: args.len(),
                });
            }
        } else if args.len() != declared as usize {
            return Err(CallError::ArityMismatch {
                expected: declared,
                got: args.len(),
            });
        }

        let mut param_types = Vec::with_capacity(declared as usize);
        for parameter in self.method.parameters()? {
            param_types.push(parameter?.type_of());
        }

        let mut passes = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            let ty = param_types
                .get(index)
                .or_else(|| param_types.last())
                .ok_or(CallError::ArityMismatch {
                    expected: declared,
                    got: args.len(),
                })?;
            passes.push(check_argument(index, arg, ty)?);
        }

        let return_type = self.method.return_type()?;
        let class = return_class(&return_type)?;

        let mut frame = CallFrame::pack(args, &passes)?;
        if let Some(receiver) = receiver {
            frame = frame.with_receiver(receiver.as_ptr() as u64);
        }
        debug!(words = frame.words().len(), "invoking native entry");
        let raw = target.invoke(frame.words(), class)?;
        decode_return(&return_type, class, raw)
    }
}

/// The one-signature boundary generated proxy and stub code relies on:
/// a receiver, an interface, a method index, and an untyped argument
/// array in; a typed value out.
///
/// `method_index` counts from the root of the inheritance chain; `base` is
/// the number of methods contributed by base interfaces (the interface's
/// inherited method count), so `method_index - base` selects within this
/// interface's own declarations.
pub fn invoke_method(
    interface: &reflect::Interface<'_>,
    receiver: Option<&ObjectRef>,
    base: u32,
    method_index: u32,
    target: &impl NativeTarget,
    args: &[Value],
) -> Result<Value, CallError> {
    let local = method_index
        .checked_sub(base)
        .ok_or(CallError::Reflect(reflect::ReflectError::IndexOutOfRange {
            index: method_index,
            count: base,
        }))?;
    let method = interface.method(local)?;
    CallMarshaler::new(method).call(target, receiver, args)
}

fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Void => "void",
        Kind::Bool => "boolean",
        Kind::S8 => "byte",
        Kind::U8 => "octet",
        Kind::S16 => "short",
        Kind::U16 => "unsigned short",
        Kind::S32 => "long",
        Kind::U32 => "unsigned long",
        Kind::S64 => "long long",
        Kind::U64 => "unsigned long long",
        Kind::F32 => "float",
        Kind::F64 => "double",
        Kind::String => "string",
        Kind::Object => "object",
        Kind::Sequence => "sequence",
    }
}

fn expected_kind(type_tag: u8) -> Option<Kind> {
    Some(match type_tag {
        tag::BOOLEAN => Kind::Bool,
        tag::BYTE => Kind::S8,
        tag::OCTET => Kind::U8,
        tag::SHORT => Kind::S16,
        tag::UNSIGNED_SHORT => Kind::U16,
        tag::LONG => Kind::S32,
        tag::UNSIGNED_LONG => Kind::U32,
        tag::LONG_LONG => Kind::S64,
        tag::UNSIGNED_LONG_LONG => Kind::U64,
        tag::FLOAT => Kind::F32,
        tag::DOUBLE => Kind::F64,
        tag::STRING => Kind::String,
        tag::OBJECT => Kind::Object,
        tag::SEQUENCE | tag::ARRAY => Kind::Sequence,
        _ => return None,
    })
}

fn check_argument(
    index: usize,
    value: &Value,
    ty: &reflect::Type<'_>,
) -> Result<ArgPass, CallError> {
    if value.is_dynamic() || ty.is_any() {
        return Ok(ArgPass::Erased);
    }
    let type_tag = ty.tag()?;
    let expected = expected_kind(type_tag).ok_or(CallError::UnsupportedParameterType {
        index,
        tag: type_tag as char,
    })?;
    if ty.is_nullable() {
        // Absence has no word encoding; nullable arguments cross erased.
        if !value.is_absent() && value.kind() != expected {
            return Err(CallError::ArgumentType {
                index,
                expected: kind_name(expected),
                got: value.kind(),
            });
        }
        return Ok(ArgPass::Erased);
    }
    if value.kind() != expected {
        return Err(CallError::ArgumentType {
            index,
            expected: kind_name(expected),
            got: value.kind(),
        });
    }
    Ok(ArgPass::Typed)
}

fn return_class(ty: &reflect::Type<'_>) -> Result<ReturnClass, CallError> {
    let type_tag = ty.tag()?;
    Ok(match type_tag {
        tag::VOID => ReturnClass::Void,
        tag::BOOLEAN
        | tag::BYTE
        | tag::OCTET
        | tag::SHORT
        | tag::UNSIGNED_SHORT
        | tag::LONG
        | tag::UNSIGNED_LONG
        | tag::LONG_LONG
        | tag::UNSIGNED_LONG_LONG => ReturnClass::Word,
        tag::FLOAT => ReturnClass::F32,
        tag::DOUBLE => ReturnClass::F64,
        tag::STRING | tag::OBJECT | tag::SEQUENCE | tag::ARRAY | tag::ANY => ReturnClass::Value,
        other => {
            return Err(CallError::UnsupportedReturnType {
                tag: other as char,
            });
        }
    })
}

fn decode_return(
    ty: &reflect::Type<'_>,
    class: ReturnClass,
    raw: RawReturn,
) -> Result<Value, CallError> {
    let mismatch = |got: &RawReturn| CallError::ReturnMismatch {
        expected: class.name(),
        got: got.name(),
    };
    match class {
        ReturnClass::Void => match raw {
            RawReturn::Void => Ok(Value::VOID),
            other => Err(mismatch(&other)),
        },
        ReturnClass::Word => {
            let word = match raw {
                RawReturn::Word(word) => word,
                other => return Err(mismatch(&other)),
            };
            Ok(match ty.tag()? {
                tag::BOOLEAN => Value::from(word != 0),
                tag::BYTE => Value::from(word as u8 as i8),
                tag::OCTET => Value::from(word as u8),
                tag::SHORT => Value::from(word as u16 as i16),
                tag::UNSIGNED_SHORT => Value::from(word as u16),
                tag::LONG => Value::from(word as u32 as i32),
                tag::UNSIGNED_LONG => Value::from(word as u32),
                tag::LONG_LONG => Value::from(word as i64),
                _ => Value::from(word),
            })
        }
        ReturnClass::F32 => match raw {
            RawReturn::F32(v) => Ok(Value::from(v)),
            other => Err(mismatch(&other)),
        },
        ReturnClass::F64 => match raw {
            RawReturn::F64(v) => Ok(Value::from(v)),
            other => Err(mismatch(&other)),
        },
        ReturnClass::Value => {
            let value = match raw {
                RawReturn::Value(value) => value,
                other => return Err(mismatch(&other)),
            };
            let type_tag = ty.tag()?;
            if type_tag == tag::ANY {
                return Ok(value);
            }
            if ty.is_nullable() && value.is_absent() {
                return Ok(value);
            }
            let expected = expected_kind(type_tag).ok_or(CallError::UnsupportedReturnType {
                tag: type_tag as char,
            })?;
            if value.kind() != expected {
                return Err(CallError::ReturnMismatch {
                    expected: kind_name(expected),
                    got: kind_name(value.kind()),
                });
            }
            Ok(value)
        }
    }
}
