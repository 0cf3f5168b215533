//! The universal tagged-union value type crossing the call boundary.
//!
//! A [`Value`] holds exactly one of the IDL primitive kinds, a string, an
//! opaque object reference, or a typed sequence, and owns its payload for as
//! long as the tag is active. Two orthogonal flags ride beside the tag:
//!
//! - **nullable**: the value carries an IDL-declared nullable type and may
//!   legitimately be absent. A nullable value whose tag is `Void` is the
//!   absent state; a plain `Void` value is present-but-typed-void. The two
//!   are distinct and never conflated.
//! - **dynamic**: the value was produced as a wrapped dynamic (`any`) value
//!   and must be treated opaquely by generic dispatch code rather than
//!   unwrapped to its underlying primitive.
//!
//! No constructor sets both flags; they describe different things.
//!
//! Typed reads are checked: reading a tag other than the active one is a
//! [`ValueError::TypeMismatch`], and reading out of an absent value is
//! [`ValueError::Absent`]. The union bytes are never reinterpreted.
//!
//! # Module Organization
//!
//! - [`error`]: error types for value and sequence operations
//! - [`sequence`]: the reference-counted [`Sequence`] buffer
//! - [`object`]: the opaque [`ObjectRef`] shared reference

mod error;
mod object;
mod sequence;

pub use error::ValueError;
pub use object::{Object, ObjectRef};
pub use sequence::{Sequence, SequenceHost};

/// The active tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Void,
    Bool,
    S8,
    U8,
    S16,
    U16,
    S32,
    U32,
    S64,
    U64,
    F32,
    F64,
    String,
    Object,
    Sequence,
}

/// A [`Sequence`] of any supported element type, with the element type
/// recoverable only through [`SequenceElement::from_any`]. Reading with the
/// wrong element type fails fast with a typed error.
#[derive(Debug, Clone, PartialEq)]
pub enum AnySequence {
    Bool(Sequence<bool>),
    S8(Sequence<i8>),
    U8(Sequence<u8>),
    S16(Sequence<i16>),
    U16(Sequence<u16>),
    S32(Sequence<i32>),
    U32(Sequence<u32>),
    S64(Sequence<i64>),
    U64(Sequence<u64>),
    F32(Sequence<f32>),
    F64(Sequence<f64>),
    String(Sequence<String>),
    Object(Sequence<ObjectRef>),
    Any(Sequence<Value>),
}

macro_rules! any_sequence_dispatch {
    ($self:expr, $seq:ident => $body:expr) => {
        match $self {
            AnySequence::Bool($seq) => $body,
            AnySequence::S8($seq) => $body,
            AnySequence::U8($seq) => $body,
            AnySequence::S16($seq) => $body,
            AnySequence::U16($seq) => $body,
            AnySequence::S32($seq) => $body,
            AnySequence::U32($seq) => $body,
            AnySequence::S64($seq) => $body,
            AnySequence::U64($seq) => $body,
            AnySequence::F32($seq) => $body,
            AnySequence::F64($seq) => $body,
            AnySequence::String($seq) => $body,
            AnySequence::Object($seq) => $body,
            AnySequence::Any($seq) => $body,
        }
    };
}

impl AnySequence {
    pub fn len(&self) -> usize {
        any_sequence_dispatch!(self, seq => seq.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stable address of the backing record, independent of element type.
    pub fn as_ptr(&self) -> *const () {
        any_sequence_dispatch!(self, seq => seq.as_ptr())
    }

    /// Name of the element type, for diagnostics.
    pub fn element_name(&self) -> &'static str {
        match self {
            AnySequence::Bool(_) => "bool",
            AnySequence::S8(_) => "s8",
            AnySequence::U8(_) => "u8",
            AnySequence::S16(_) => "s16",
            AnySequence::U16(_) => "u16",
            AnySequence::S32(_) => "s32",
            AnySequence::U32(_) => "u32",
            AnySequence::S64(_) => "s64",
            AnySequence::U64(_) => "u64",
            AnySequence::F32(_) => "f32",
            AnySequence::F64(_) => "f64",
            AnySequence::String(_) => "string",
            AnySequence::Object(_) => "object",
            AnySequence::Any(_) => "any",
        }
    }
}

/// Element types a [`Sequence`] may carry inside a [`Value`].
pub trait SequenceElement: Sized {
    /// Element type name used in mismatch diagnostics.
    const ELEMENT_NAME: &'static str;

    fn into_any(seq: Sequence<Self>) -> AnySequence;
    fn from_any(seq: &AnySequence) -> Option<Sequence<Self>>;
}

macro_rules! impl_sequence_element {
    ($ty:ty, $variant:ident, $name:literal) => {
        impl SequenceElement for $ty {
            const ELEMENT_NAME: &'static str = $name;

            fn into_any(seq: Sequence<Self>) -> AnySequence {
                AnySequence::$variant(seq)
            }

            fn from_any(seq: &AnySequence) -> Option<Sequence<Self>> {
                match seq {
                    AnySequence::$variant(inner) => Some(inner.clone()),
                    _ => None,
                }
            }
        }
    };
}

impl_sequence_element!(bool, Bool, "bool");
impl_sequence_element!(i8, S8, "s8");
impl_sequence_element!(u8, U8, "u8");
impl_sequence_element!(i16, S16, "s16");
impl_sequence_element!(u16, U16, "u16");
impl_sequence_element!(i32, S32, "s32");
impl_sequence_element!(u32, U32, "u32");
impl_sequence_element!(i64, S64, "s64");
impl_sequence_element!(u64, U64, "u64");
impl_sequence_element!(f32, F32, "f32");
impl_sequence_element!(f64, F64, "f64");
impl_sequence_element!(String, String, "string");
impl_sequence_element!(ObjectRef, Object, "object");
impl_sequence_element!(Value, Any, "any");

#[derive(Debug, Clone, PartialEq)]
enum Payload {
    Void,
    Bool(bool),
    S8(i8),
    U8(u8),
    S16(i16),
    U16(u16),
    S32(i32),
    U32(u32),
    S64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
    Object(ObjectRef),
    Sequence(AnySequence),
}

impl Payload {
    fn kind(&self) -> Kind {
        match self {
            Payload::Void => Kind::Void,
            Payload::Bool(_) => Kind::Bool,
            Payload::S8(_) => Kind::S8,
            Payload::U8(_) => Kind::U8,
            Payload::S16(_) => Kind::S16,
            Payload::U16(_) => Kind::U16,
            Payload::S32(_) => Kind::S32,
            Payload::U32(_) => Kind::U32,
            Payload::S64(_) => Kind::S64,
            Payload::U64(_) => Kind::U64,
            Payload::F32(_) => Kind::F32,
            Payload::F64(_) => Kind::F64,
            Payload::String(_) => Kind::String,
            Payload::Object(_) => Kind::Object,
            Payload::Sequence(_) => Kind::Sequence,
        }
    }
}

/// The universal value type. See the module documentation.
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    payload: Payload,
    nullable: bool,
    dynamic: bool,
}

impl Value {
    /// A present value of type void (an operation with no result).
    pub const VOID: Value = Value {
        payload: Payload::Void,
        nullable: false,
        dynamic: false,
    };

    /// The absent state of a nullable value.
    pub fn null() -> Self {
        Value {
            payload: Payload::Void,
            nullable: true,
            dynamic: false,
        }
    }

    fn from_payload(payload: Payload) -> Self {
        Value {
            payload,
            nullable: false,
            dynamic: false,
        }
    }

    /// Wrap an opaque object reference.
    pub fn object(object: ObjectRef) -> Self {
        Self::from_payload(Payload::Object(object))
    }

    /// Wrap a typed sequence. The value holds a handle aliasing the
    /// sequence's backing record.
    pub fn sequence<T: SequenceElement>(seq: Sequence<T>) -> Self {
        Self::from_payload(Payload::Sequence(T::into_any(seq)))
    }

    /// Mark this value as carrying an IDL-declared nullable type.
    pub fn into_nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Mark this value as a wrapped dynamic value: generic dispatch must
    /// pass it through whole instead of unwrapping the payload.
    pub fn into_dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    pub fn kind(&self) -> Kind {
        self.payload.kind()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn is_string(&self) -> bool {
        self.kind() == Kind::String
    }

    pub fn is_object(&self) -> bool {
        self.kind() == Kind::Object
    }

    pub fn is_sequence(&self) -> bool {
        self.kind() == Kind::Sequence
    }

    /// A nullable value with no payload. Distinct from a present void value.
    pub fn is_absent(&self) -> bool {
        self.nullable && self.kind() == Kind::Void
    }

    /// The value holds an actual payload (not void, not absent).
    pub fn has_value(&self) -> bool {
        self.kind() != Kind::Void
    }

    fn check_present(&self, expected: Kind) -> Result<(), ValueError> {
        if self.is_absent() {
            return Err(ValueError::Absent {
                declared: expected,
            });
        }
        Ok(())
    }

    fn mismatch(&self, expected: Kind) -> ValueError {
        ValueError::TypeMismatch {
            expected,
            got: self.kind(),
        }
    }

    /// Borrow the string payload.
    pub fn as_str(&self) -> Result<&str, ValueError> {
        self.check_present(Kind::String)?;
        match &self.payload {
            Payload::String(s) => Ok(s),
            _ => Err(self.mismatch(Kind::String)),
        }
    }

    /// Borrow the object payload.
    pub fn as_object(&self) -> Result<&ObjectRef, ValueError> {
        self.check_present(Kind::Object)?;
        match &self.payload {
            Payload::Object(obj) => Ok(obj),
            _ => Err(self.mismatch(Kind::Object)),
        }
    }

    /// Borrow the sequence payload with its element type erased.
    pub fn as_any_sequence(&self) -> Result<&AnySequence, ValueError> {
        self.check_present(Kind::Sequence)?;
        match &self.payload {
            Payload::Sequence(seq) => Ok(seq),
            _ => Err(self.mismatch(Kind::Sequence)),
        }
    }

    /// Recover the typed sequence handle. Fails fast when the element type
    /// does not match the one the sequence was constructed with.
    pub fn as_sequence<T: SequenceElement>(&self) -> Result<Sequence<T>, ValueError> {
        let seq = self.as_any_sequence()?;
        T::from_any(seq).ok_or(ValueError::SequenceElementMismatch {
            expected: T::ELEMENT_NAME,
            got: seq.element_name(),
        })
    }
}

macro_rules! impl_primitive {
    ($ty:ty, $variant:ident, $kind:ident, $reader:ident) => {
        impl From<$ty> for Value {
            fn from(value: $ty) -> Self {
                Self::from_payload(Payload::$variant(value))
            }
        }

        impl Value {
            /// Read the payload as this exact tag; any other tag is an error.
            pub fn $reader(&self) -> Result<$ty, ValueError> {
                self.check_present(Kind::$kind)?;
                match &self.payload {
                    Payload::$variant(v) => Ok(*v),
                    _ => Err(self.mismatch(Kind::$kind)),
                }
            }
        }
    };
}

impl_primitive!(bool, Bool, Bool, to_bool);
impl_primitive!(i8, S8, S8, to_i8);
impl_primitive!(u8, U8, U8, to_u8);
impl_primitive!(i16, S16, S16, to_i16);
impl_primitive!(u16, U16, U16, to_u16);
impl_primitive!(i32, S32, S32, to_i32);
impl_primitive!(u32, U32, U32, to_u32);
impl_primitive!(i64, S64, S64, to_i64);
impl_primitive!(u64, U64, U64, to_u64);
impl_primitive!(f32, F32, F32, to_f32);
impl_primitive!(f64, F64, F64, to_f64);

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::from_payload(Payload::String(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::from_payload(Payload::String(value.to_owned()))
    }
}

impl From<ObjectRef> for Value {
    fn from(value: ObjectRef) -> Self {
        Self::object(value)
    }
}

impl<T: SequenceElement> From<Sequence<T>> for Value {
    fn from(value: Sequence<T>) -> Self {
        Self::sequence(value)
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::VOID
    }
}
