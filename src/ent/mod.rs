//! The Ent binary interface-metadata format.
//!
//! An Ent blob is a relocatable image: a fixed [`Header`] followed by one
//! global module record and every record reachable from it, all packed into
//! one contiguous byte region. Records never hold pointers; every structural
//! cross-reference is a [`Spec`], either a tagged primitive-type code (top
//! bit set) or a byte offset from the start of the blob to a non-primitive
//! record. Multi-byte integers are stored in native host order; the format
//! is for same-process consumption, not network interchange.
//!
//! Construction is append-only through [`EntBuilder`]: records are created
//! with fixed slot counts and `add_*` operations fill the first free slot,
//! failing once the record is full. Reading through [`EntReader`] is a pure
//! traversal that validates the header, every offset, and every record
//! discriminant before handing out a view. A blob is read-only once built
//! and must not be read while still being appended to.
//!
//! # Module Organization
//!
//! - [`error`]: decode/build error types
//! - [`builder`]: arena writer with string interning
//! - [`reader`]: validating reader and typed record views
//! - [`dump`]: whole-blob listing with shared-record detection

pub mod builder;
pub mod dump;
mod error;
pub(crate) mod layout;
pub mod reader;

pub use builder::{EntBuilder, InterfaceDesc};
pub use dump::dump;
pub use error::EntError;
pub use reader::{EntReader, Record};

/// Magic number at the start of every blob: `\x7f E N T`.
pub const MAGIC: [u8; 4] = [0x7f, b'E', b'N', b'T'];

/// Format version written by this crate.
pub const VERSION: (u8, u8, u8) = (0, 1, 0);

/// A tagged primitive-type code or a byte offset to a non-primitive record.
///
/// `Spec(0)` is the distinguished "none / unassigned" value; offset 0 is
/// always the header, never a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Spec(u32);

impl Spec {
    const PRIMITIVE_BIT: u32 = 0x8000_0000;

    /// The unassigned slot marker.
    pub const NONE: Spec = Spec(0);

    pub const fn from_raw(raw: u32) -> Self {
        Spec(raw)
    }

    pub const fn from_offset(offset: u32) -> Self {
        Spec(offset)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub const fn is_primitive(self) -> bool {
        self.0 & Self::PRIMITIVE_BIT != 0
    }

    /// The byte offset for a non-primitive, assigned spec.
    pub fn offset(self) -> Option<u32> {
        if self.is_none() || self.is_primitive() {
            None
        } else {
            Some(self.0)
        }
    }

    /// The primitive kind, when the top bit is set.
    pub fn primitive(self) -> Option<Primitive> {
        if self.is_primitive() {
            Primitive::from_code(self.0 & !Self::PRIMITIVE_BIT)
        } else {
            None
        }
    }
}

impl Default for Spec {
    /// Defaults to [`Spec::NONE`], matching an unassigned slot.
    fn default() -> Self {
        Spec::NONE
    }
}

impl From<Primitive> for Spec {
    fn from(kind: Primitive) -> Self {
        Spec(Spec::PRIMITIVE_BIT | kind as u32)
    }
}

/// The fixed enumeration of primitive kinds a [`Spec`] can encode directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Primitive {
    S8 = 0,
    S16 = 1,
    S32 = 2,
    S64 = 3,
    U8 = 4,
    U16 = 5,
    U32 = 6,
    U64 = 7,
    F32 = 8,
    F64 = 9,
    F128 = 10,
    Bool = 11,
    Char = 12,
    WChar = 13,
    Void = 14,
    Uuid = 15,
    String = 16,
    WString = 17,
    Any = 18,
    Object = 19,
    Fixed = 20,
    ValueType = 21,
    Variant = 22,
}

impl Primitive {
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => Primitive::S8,
            1 => Primitive::S16,
            2 => Primitive::S32,
            3 => Primitive::S64,
            4 => Primitive::U8,
            5 => Primitive::U16,
            6 => Primitive::U32,
            7 => Primitive::U64,
            8 => Primitive::F32,
            9 => Primitive::F64,
            10 => Primitive::F128,
            11 => Primitive::Bool,
            12 => Primitive::Char,
            13 => Primitive::WChar,
            14 => Primitive::Void,
            15 => Primitive::Uuid,
            16 => Primitive::String,
            17 => Primitive::WString,
            18 => Primitive::Any,
            19 => Primitive::Object,
            20 => Primitive::Fixed,
            21 => Primitive::ValueType,
            22 => Primitive::Variant,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::S8 => "s8",
            Primitive::S16 => "s16",
            Primitive::S32 => "s32",
            Primitive::S64 => "s64",
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::F128 => "f128",
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::WChar => "wchar",
            Primitive::Void => "void",
            Primitive::Uuid => "uuid",
            Primitive::String => "string",
            Primitive::WString => "wstring",
            Primitive::Any => "any",
            Primitive::Object => "object",
            Primitive::Fixed => "fixed",
            Primitive::ValueType => "value",
            Primitive::Variant => "variant",
        }
    }
}

/// Discriminant stored as the first field of every non-primitive record
/// reachable through [`EntReader::resolve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RecordType {
    Module = 0,
    Interface = 1,
    Structure = 2,
    Exception = 3,
    Enum = 4,
    Array = 5,
    Sequence = 6,
}

impl RecordType {
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            0 => RecordType::Module,
            1 => RecordType::Interface,
            2 => RecordType::Structure,
            3 => RecordType::Exception,
            4 => RecordType::Enum,
            5 => RecordType::Array,
            6 => RecordType::Sequence,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            RecordType::Module => "module",
            RecordType::Interface => "interface",
            RecordType::Structure => "structure",
            RecordType::Exception => "exception",
            RecordType::Enum => "enum",
            RecordType::Array => "array",
            RecordType::Sequence => "sequence",
        }
    }
}

/// Attribute bits carried on methods and parameters.
pub mod attr {
    pub const MASK: u32 = 0x0000_0003;
    pub const OPERATION: u32 = 0x0000_0000;
    pub const GETTER: u32 = 0x0000_0001;
    pub const SETTER: u32 = 0x0000_0002;

    pub const IN: u32 = 0x0000_0000;
    pub const OUT: u32 = 0x0000_0001;
    pub const INOUT: u32 = 0x0000_0002;

    pub const INDEX_MASK: u32 = 0x0000_003c;
    pub const INDEX_CREATOR: u32 = 0x0000_0004;
    pub const INDEX_DELETER: u32 = 0x0000_0008;
    pub const INDEX_GETTER: u32 = 0x0000_0010;
    pub const INDEX_SETTER: u32 = 0x0000_0020;

    pub const NAME_MASK: u32 = 0x0000_03c0;
    pub const NAME_CREATOR: u32 = 0x0000_0040;
    pub const NAME_DELETER: u32 = 0x0000_0080;
    pub const NAME_GETTER: u32 = 0x0000_0100;
    pub const NAME_SETTER: u32 = 0x0000_0200;

    pub const NO_INDEXING_OPERATIONS: u32 = 0x0000_0400;

    pub const CALLBACK_MASK: u32 = 0x0000_1800;
    pub const CALLBACK: u32 = 0x0000_1800;
    pub const CALLBACK_FUNCTION_ONLY: u32 = 0x0000_0800;
    pub const CALLBACK_PROPERTY_ONLY: u32 = 0x0000_1000;

    pub const NO_INTERFACE_OBJECT: u32 = 0x0000_2000;
    pub const PROTOTYPE_ROOT: u32 = 0x0000_4000;

    pub const NULL_IS_EMPTY: u32 = 0x0000_8000;
    pub const NULL_IS_NULL: u32 = 0x0001_0000;
    pub const UNDEFINED_IS_EMPTY: u32 = 0x0002_0000;
    pub const UNDEFINED_IS_NULL: u32 = 0x0004_0000;

    pub const STRINGIFIES: u32 = 0x0008_0000;
    pub const REPLACEABLE: u32 = 0x0010_0000;
    pub const CALLABLE: u32 = 0x0020_0000;
    pub const OPTIONAL: u32 = 0x0040_0000;
    pub const VARIADIC: u32 = 0x0080_0000;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_specs_are_tagged() {
        let spec = Spec::from(Primitive::F64);
        assert!(spec.is_primitive());
        assert_eq!(spec.primitive(), Some(Primitive::F64));
        assert_eq!(spec.offset(), None);
    }

    #[test]
    fn offset_specs_are_untagged() {
        let spec = Spec::from_offset(12);
        assert!(!spec.is_primitive());
        assert_eq!(spec.offset(), Some(12));
        assert_eq!(spec.primitive(), None);
    }

    #[test]
    fn none_is_neither() {
        assert!(Spec::NONE.is_none());
        assert_eq!(Spec::NONE.offset(), None);
        assert_eq!(Spec::NONE.primitive(), None);
    }
}
