//! Validating reader over a finished Ent blob.
//!
//! The reader borrows the blob bytes and performs no allocation while
//! traversing. [`EntReader::new`] checks the header once; every `resolve`
//! and slot accessor then re-validates the offset, record discriminant, and
//! index it is handed, so a corrupt blob surfaces as an [`EntError`] instead
//! of a wild read.

use crate::logging::trace;

use super::layout::{self, METHOD_FIXED, PARAM_SIZE, SPEC_SIZE};
use super::{EntError, MAGIC, Primitive, RecordType, Spec, VERSION, attr};

/// Borrowed view over one Ent blob.
#[derive(Clone, Copy)]
pub struct EntReader<'a> {
    data: &'a [u8],
}

impl<'a> EntReader<'a> {
    /// Validate the header and wrap the blob.
    pub fn new(data: &'a [u8]) -> Result<Self, EntError> {
        let magic: [u8; 4] = [
            layout::read_u8(data, 0)?,
            layout::read_u8(data, 1)?,
            layout::read_u8(data, 2)?,
            layout::read_u8(data, 3)?,
        ];
        if magic != MAGIC {
            return Err(EntError::BadMagic(magic));
        }
        let major = layout::read_u8(data, 4)?;
        let minor = layout::read_u8(data, 5)?;
        if (major, minor) != (VERSION.0, VERSION.1) {
            return Err(EntError::UnsupportedVersion { major, minor });
        }
        let file_size = layout::read_u32(data, 8)?;
        if file_size as usize != data.len() {
            return Err(EntError::SizeMismatch {
                header: file_size,
                actual: data.len(),
            });
        }
        trace!(size = data.len(), "opened ent blob");
        Ok(Self { data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The module record every blob starts with, directly after the header.
    pub fn global_module(&self) -> Result<ModuleView<'a>, EntError> {
        match self.resolve(Spec::from_offset(layout::HEADER_SIZE as u32))? {
            Record::Module(module) => Ok(module),
            other => Err(EntError::UnexpectedRecord {
                expected: "module",
                got: other.name(),
            }),
        }
    }

    /// Resolve a spec to a primitive kind or a typed record view.
    ///
    /// Method records carry no discriminant and cannot be resolved this
    /// way; they are reached through [`InterfaceView::method`] and
    /// [`InterfaceView::constructor`].
    pub fn resolve(&self, spec: Spec) -> Result<Record<'a>, EntError> {
        if let Some(kind) = spec.primitive() {
            return Ok(Record::Primitive(kind));
        }
        let offset = self.record_offset(spec)?;
        let code = layout::read_u32(self.data, offset)?;
        let record = RecordType::from_code(code).ok_or(EntError::UnknownRecordType(code))?;
        Ok(match record {
            RecordType::Module => Record::Module(ModuleView { ent: *self, offset }),
            RecordType::Interface => Record::Interface(InterfaceView { ent: *self, offset }),
            RecordType::Structure => Record::Structure(StructureView { ent: *self, offset }),
            RecordType::Exception => Record::Exception(StructureView { ent: *self, offset }),
            RecordType::Enum => Record::Enum(EnumView { ent: *self, offset }),
            RecordType::Array => Record::Array(ArrayView { ent: *self, offset }),
            RecordType::Sequence => Record::Sequence(SequenceView { ent: *self, offset }),
        })
    }

    /// Read the NUL-terminated name string at a byte offset. Offset zero is
    /// the conventional "unnamed" marker and reads as the empty string.
    pub fn string_at(&self, offset: u32) -> Result<&'a str, EntError> {
        if offset == 0 {
            return Ok("");
        }
        let start = offset as usize;
        let tail = self
            .data
            .get(start..)
            .ok_or(EntError::OffsetOutOfRange {
                offset,
                file_size: self.data.len() as u32,
            })?;
        let end = tail
            .iter()
            .position(|&b| b == 0)
            .ok_or(EntError::UnterminatedString { offset })?;
        let bytes = tail.get(..end).ok_or(EntError::UnterminatedString { offset })?;
        std::str::from_utf8(bytes).map_err(|_| EntError::InvalidUtf8 { offset })
    }

    fn record_offset(&self, spec: Spec) -> Result<usize, EntError> {
        let offset = spec.offset().ok_or(EntError::NotARecord { spec: spec.raw() })?;
        if (offset as usize) >= self.data.len() {
            return Err(EntError::OffsetOutOfRange {
                offset,
                file_size: self.data.len() as u32,
            });
        }
        Ok(offset as usize)
    }

    fn u32_at(&self, offset: usize) -> Result<u32, EntError> {
        layout::read_u32(self.data, offset)
    }

    fn check_index(index: u32, count: u32) -> Result<(), EntError> {
        if index < count {
            Ok(())
        } else {
            Err(EntError::IndexOutOfRange { index, count })
        }
    }
}

/// A resolved spec: either a primitive kind or a typed record view.
pub enum Record<'a> {
    Primitive(Primitive),
    Module(ModuleView<'a>),
    Interface(InterfaceView<'a>),
    Structure(StructureView<'a>),
    Exception(StructureView<'a>),
    Enum(EnumView<'a>),
    Array(ArrayView<'a>),
    Sequence(SequenceView<'a>),
}

impl Record<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Record::Primitive(_) => "primitive",
            Record::Module(_) => RecordType::Module.name(),
            Record::Interface(_) => RecordType::Interface.name(),
            Record::Structure(_) => RecordType::Structure.name(),
            Record::Exception(_) => RecordType::Exception.name(),
            Record::Enum(_) => RecordType::Enum.name(),
            Record::Array(_) => RecordType::Array.name(),
            Record::Sequence(_) => RecordType::Sequence.name(),
        }
    }
}

/// View of a Module record.
#[derive(Clone, Copy)]
pub struct ModuleView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl<'a> ModuleView<'a> {
    pub fn spec(&self) -> Spec {
        Spec::from_offset(self.offset as u32)
    }

    pub fn name(&self) -> Result<&'a str, EntError> {
        let name = self.ent.u32_at(self.offset + 4)?;
        self.ent.string_at(name)
    }

    pub fn parent(&self) -> Result<Spec, EntError> {
        Ok(Spec::from_raw(self.ent.u32_at(self.offset + 8)?))
    }

    pub fn module_count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 12)
    }

    pub fn interface_count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 16)
    }

    pub fn constant_count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 20)
    }

    /// Spec filled into the `index`th child-module slot, or
    /// [`Spec::NONE`] when the slot was never assigned.
    pub fn module(&self, index: u32) -> Result<Spec, EntError> {
        EntReader::check_index(index, self.module_count()?)?;
        let slot = self.offset + 24 + SPEC_SIZE * index as usize;
        Ok(Spec::from_raw(self.ent.u32_at(slot)?))
    }

    pub fn interface(&self, index: u32) -> Result<Spec, EntError> {
        EntReader::check_index(index, self.interface_count()?)?;
        let base = self.offset + 24 + SPEC_SIZE * self.module_count()? as usize;
        Ok(Spec::from_raw(self.ent.u32_at(base + SPEC_SIZE * index as usize)?))
    }

    pub fn constant(&self, index: u32) -> Result<ConstantView<'a>, EntError> {
        EntReader::check_index(index, self.constant_count()?)?;
        let slots = self.module_count()? as usize + self.interface_count()? as usize;
        let base = self.offset + 24 + SPEC_SIZE * slots;
        Ok(ConstantView {
            ent: self.ent,
            offset: base + layout::CONSTANT_SIZE * index as usize,
        })
    }
}

/// View of one constant slot of a Module or Interface.
#[derive(Clone, Copy)]
pub struct ConstantView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl<'a> ConstantView<'a> {
    pub fn spec(&self) -> Result<Spec, EntError> {
        Ok(Spec::from_raw(self.ent.u32_at(self.offset)?))
    }

    pub fn name(&self) -> Result<&'a str, EntError> {
        let name = self.ent.u32_at(self.offset + 4)?;
        self.ent.string_at(name)
    }

    /// Raw constant payload; an immediate value or an offset depending on
    /// the constant's type.
    pub fn value(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 8)
    }
}

/// View of an Interface record.
#[derive(Clone, Copy)]
pub struct InterfaceView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl<'a> InterfaceView<'a> {
    pub fn spec(&self) -> Spec {
        Spec::from_offset(self.offset as u32)
    }

    pub fn name(&self) -> Result<&'a str, EntError> {
        let name = self.ent.u32_at(self.offset + 4)?;
        self.ent.string_at(name)
    }

    pub fn attr(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 8)
    }

    pub fn fully_qualified_name(&self) -> Result<&'a str, EntError> {
        let name = self.ent.u32_at(self.offset + 12)?;
        self.ent.string_at(name)
    }

    pub fn fully_qualified_base_name(&self) -> Result<&'a str, EntError> {
        let name = self.ent.u32_at(self.offset + 16)?;
        self.ent.string_at(name)
    }

    pub fn module(&self) -> Result<Spec, EntError> {
        Ok(Spec::from_raw(self.ent.u32_at(self.offset + 20)?))
    }

    pub fn method_count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 24)
    }

    pub fn constant_count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 28)
    }

    /// Methods inherited from the base interface chain, counted so a
    /// caller can number its own methods after them.
    pub fn inherited_method_count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 32)
    }

    /// The constructor method, when this interface declares one.
    pub fn constructor(&self) -> Result<Option<MethodView<'a>>, EntError> {
        let spec = Spec::from_raw(self.ent.u32_at(self.offset + 36)?);
        if spec.is_none() {
            return Ok(None);
        }
        Ok(Some(self.method_at(spec)?))
    }

    pub fn method(&self, index: u32) -> Result<MethodView<'a>, EntError> {
        EntReader::check_index(index, self.method_count()?)?;
        let slot = self.offset + 40 + SPEC_SIZE * index as usize;
        self.method_at(Spec::from_raw(self.ent.u32_at(slot)?))
    }

    pub fn constant(&self, index: u32) -> Result<ConstantView<'a>, EntError> {
        EntReader::check_index(index, self.constant_count()?)?;
        let base = self.offset + 40 + SPEC_SIZE * self.method_count()? as usize;
        Ok(ConstantView {
            ent: self.ent,
            offset: base + layout::CONSTANT_SIZE * index as usize,
        })
    }

    fn method_at(&self, spec: Spec) -> Result<MethodView<'a>, EntError> {
        let offset = self.ent.record_offset(spec)?;
        if offset + METHOD_FIXED > self.ent.data.len() {
            return Err(EntError::Truncated {
                needed: offset + METHOD_FIXED,
                available: self.ent.data.len(),
            });
        }
        Ok(MethodView {
            ent: self.ent,
            offset,
        })
    }
}

/// View of a Method record.
///
/// Methods carry no record discriminant; a view is only handed out by an
/// [`InterfaceView`], which knows its method slots by construction.
#[derive(Clone, Copy)]
pub struct MethodView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl<'a> MethodView<'a> {
    pub fn spec(&self) -> Spec {
        Spec::from_offset(self.offset as u32)
    }

    /// Return type of the method.
    pub fn return_spec(&self) -> Result<Spec, EntError> {
        Ok(Spec::from_raw(self.ent.u32_at(self.offset)?))
    }

    pub fn name(&self) -> Result<&'a str, EntError> {
        let name = self.ent.u32_at(self.offset + 4)?;
        self.ent.string_at(name)
    }

    pub fn attr(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 8)
    }

    pub fn param_count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 12)
    }

    pub fn raise_count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 16)
    }

    pub fn param(&self, index: u32) -> Result<ParamView<'a>, EntError> {
        EntReader::check_index(index, self.param_count()?)?;
        Ok(ParamView {
            ent: self.ent,
            offset: self.offset + METHOD_FIXED + PARAM_SIZE * index as usize,
        })
    }

    /// Spec of the `index`th declared exception.
    pub fn raise(&self, index: u32) -> Result<Spec, EntError> {
        EntReader::check_index(index, self.raise_count()?)?;
        let base = self.offset + METHOD_FIXED + PARAM_SIZE * self.param_count()? as usize;
        Ok(Spec::from_raw(self.ent.u32_at(base + SPEC_SIZE * index as usize)?))
    }

    pub fn is_operation(&self) -> Result<bool, EntError> {
        Ok(self.attr()? & attr::MASK == attr::OPERATION)
    }

    pub fn is_getter(&self) -> Result<bool, EntError> {
        Ok(self.attr()? & attr::MASK == attr::GETTER)
    }

    pub fn is_setter(&self) -> Result<bool, EntError> {
        Ok(self.attr()? & attr::MASK == attr::SETTER)
    }
}

/// View of one parameter slot of a Method.
#[derive(Clone, Copy)]
pub struct ParamView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl<'a> ParamView<'a> {
    pub fn spec(&self) -> Result<Spec, EntError> {
        Ok(Spec::from_raw(self.ent.u32_at(self.offset)?))
    }

    pub fn name(&self) -> Result<&'a str, EntError> {
        let name = self.ent.u32_at(self.offset + 4)?;
        self.ent.string_at(name)
    }

    pub fn attr(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 8)
    }

    pub fn is_input(&self) -> Result<bool, EntError> {
        Ok(self.attr()? & attr::MASK == attr::IN)
    }

    pub fn is_output(&self) -> Result<bool, EntError> {
        Ok(self.attr()? & attr::MASK == attr::OUT)
    }

    pub fn is_inout(&self) -> Result<bool, EntError> {
        Ok(self.attr()? & attr::MASK == attr::INOUT)
    }

    pub fn is_optional(&self) -> Result<bool, EntError> {
        Ok(self.attr()? & attr::OPTIONAL != 0)
    }

    pub fn is_variadic(&self) -> Result<bool, EntError> {
        Ok(self.attr()? & attr::VARIADIC != 0)
    }
}

/// View of a Structure or Exception record; both share one layout.
#[derive(Clone, Copy)]
pub struct StructureView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl<'a> StructureView<'a> {
    pub fn spec(&self) -> Spec {
        Spec::from_offset(self.offset as u32)
    }

    pub fn member_count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 4)
    }

    pub fn member(&self, index: u32) -> Result<MemberView<'a>, EntError> {
        EntReader::check_index(index, self.member_count()?)?;
        Ok(MemberView {
            ent: self.ent,
            offset: self.offset + 8 + layout::MEMBER_SIZE * index as usize,
        })
    }
}

/// View of one member slot of a Structure or Exception.
#[derive(Clone, Copy)]
pub struct MemberView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl<'a> MemberView<'a> {
    pub fn spec(&self) -> Result<Spec, EntError> {
        Ok(Spec::from_raw(self.ent.u32_at(self.offset)?))
    }

    pub fn name(&self) -> Result<&'a str, EntError> {
        let name = self.ent.u32_at(self.offset + 4)?;
        self.ent.string_at(name)
    }
}

/// View of an Enum record.
#[derive(Clone, Copy)]
pub struct EnumView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl<'a> EnumView<'a> {
    pub fn spec(&self) -> Spec {
        Spec::from_offset(self.offset as u32)
    }

    pub fn count(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 4)
    }

    pub fn name(&self, index: u32) -> Result<&'a str, EntError> {
        EntReader::check_index(index, self.count()?)?;
        let slot = self.offset + 8 + SPEC_SIZE * index as usize;
        let name = self.ent.u32_at(slot)?;
        self.ent.string_at(name)
    }
}

/// View of an Array record.
#[derive(Clone, Copy)]
pub struct ArrayView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl ArrayView<'_> {
    pub fn spec(&self) -> Spec {
        Spec::from_offset(self.offset as u32)
    }

    pub fn element(&self) -> Result<Spec, EntError> {
        Ok(Spec::from_raw(self.ent.u32_at(self.offset + 4)?))
    }

    pub fn dim(&self) -> Result<u32, EntError> {
        self.ent.u32_at(self.offset + 8)
    }

    pub fn rank(&self, index: u32) -> Result<u32, EntError> {
        EntReader::check_index(index, self.dim()?)?;
        self.ent.u32_at(self.offset + 12 + SPEC_SIZE * index as usize)
    }
}

/// View of a Sequence record.
#[derive(Clone, Copy)]
pub struct SequenceView<'a> {
    ent: EntReader<'a>,
    offset: usize,
}

impl SequenceView<'_> {
    pub fn spec(&self) -> Spec {
        Spec::from_offset(self.offset as u32)
    }

    pub fn element(&self) -> Result<Spec, EntError> {
        Ok(Spec::from_raw(self.ent.u32_at(self.offset + 4)?))
    }

    /// Declared maximum element count; zero means unbounded.
    pub fn max(&self) -> Result<u64, EntError> {
        layout::read_u64(self.ent.data, self.offset + 8)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ent::EntBuilder;
    use crate::ent::builder::InterfaceDesc;

    fn tiny_blob() -> Vec<u8> {
        let mut b = EntBuilder::new();
        // The global module goes first so it lands right after the header;
        // name offset 0 reads back as the empty string.
        let module = b.append_module(0, Spec::NONE, 0, 1, 0).unwrap();
        let iface_name = b.intern("Counter").unwrap();
        let iface = b
            .append_interface(&InterfaceDesc {
                name: iface_name,
                module,
                method_count: 1,
                ..InterfaceDesc::default()
            })
            .unwrap();
        let m_name = b.intern("increment").unwrap();
        let method = b
            .append_method(Spec::from(Primitive::S32), m_name, 0, 1, 0)
            .unwrap();
        let p_name = b.intern("delta").unwrap();
        b.add_param(method, Spec::from(Primitive::S32), p_name, attr::IN)
            .unwrap();
        b.add_method(iface, method).unwrap();
        b.add_interface(module, iface).unwrap();
        b.finish().unwrap()
    }

    #[test]
    fn rejects_bad_magic() {
        let mut blob = tiny_blob();
        if let Some(byte) = blob.get_mut(0) {
            *byte = 0x7e;
        }
        assert!(matches!(
            EntReader::new(&blob),
            Err(EntError::BadMagic(_))
        ));
    }

    #[test]
    fn rejects_size_mismatch() {
        let mut blob = tiny_blob();
        blob.push(0);
        assert!(matches!(
            EntReader::new(&blob),
            Err(EntError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn traverses_module_to_param() {
        let blob = tiny_blob();
        let reader = EntReader::new(&blob).unwrap();
        let module = reader.global_module().unwrap();
        assert_eq!(module.interface_count().unwrap(), 1);

        let iface = match reader.resolve(module.interface(0).unwrap()).unwrap() {
            Record::Interface(iface) => iface,
            _ => panic!("expected interface"),
        };
        assert_eq!(iface.name().unwrap(), "Counter");
        assert!(iface.constructor().unwrap().is_none());

        let method = iface.method(0).unwrap();
        assert_eq!(method.name().unwrap(), "increment");
        assert_eq!(
            method.return_spec().unwrap().primitive(),
            Some(Primitive::S32)
        );
        assert!(method.is_operation().unwrap());

        let param = method.param(0).unwrap();
        assert_eq!(param.name().unwrap(), "delta");
        assert!(param.is_input().unwrap());
        assert!(!param.is_variadic().unwrap());
    }

    #[test]
    fn slot_index_out_of_range() {
        let blob = tiny_blob();
        let reader = EntReader::new(&blob).unwrap();
        let module = reader.global_module().unwrap();
        assert_eq!(
            module.interface(1),
            Err(EntError::IndexOutOfRange { index: 1, count: 1 })
        );
    }
}
