//! Append-only arena writer for Ent blobs.
//!
//! The builder owns the byte arena. Records are appended with fixed slot
//! counts (use the `layout` size functions to budget the arena up front via
//! [`EntBuilder::with_capacity`]); `add_*` operations then fill the first
//! free slot of an existing record, failing with [`EntError::SlotsFull`]
//! once every slot is assigned. A zero slot means "not yet assigned", which
//! is unambiguous because offset 0 is the header.
//!
//! Name strings are interned as NUL-terminated bytes inside the same arena
//! and referenced by offset, keeping the finished blob fully relocatable.
//! Construction must complete before any reader observes the blob.

use std::collections::HashMap;

use crate::logging::trace;

use super::layout::{
    self, CONSTANT_SIZE, HEADER_SIZE, MEMBER_SIZE, METHOD_FIXED, PARAM_SIZE, SPEC_SIZE,
};
use super::{EntError, MAGIC, RecordType, Spec, VERSION};

/// Fixed fields of an Interface record, grouped to keep the append call
/// readable.
#[derive(Debug, Clone, Default)]
pub struct InterfaceDesc {
    pub name: u32,
    pub fully_qualified_name: u32,
    pub fully_qualified_base_name: u32,
    pub module: Spec,
    pub method_count: u32,
    pub const_count: u32,
    pub inherited_method_count: u32,
    pub constructor: Spec,
}

/// Arena writer for one Ent blob.
pub struct EntBuilder {
    data: Vec<u8>,
    strings: HashMap<String, u32>,
}

impl EntBuilder {
    pub fn new() -> Self {
        Self::with_capacity(HEADER_SIZE)
    }

    /// Pre-size the arena; `capacity` is a budget computed from the
    /// `layout` size functions, not a hard limit.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut data = Vec::with_capacity(capacity.max(HEADER_SIZE));
        data.extend_from_slice(&MAGIC);
        data.push(VERSION.0);
        data.push(VERSION.1);
        data.push(VERSION.2);
        data.push(0); // reserved
        data.extend_from_slice(&0u32.to_ne_bytes()); // file size, patched by finish()
        Self {
            data,
            strings: HashMap::new(),
        }
    }

    /// Current arena length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        false // the header is always present
    }

    /// Intern a NUL-terminated name string, deduplicating repeats.
    /// Returns the byte offset used in record name fields.
    pub fn intern(&mut self, name: &str) -> Result<u32, EntError> {
        if name.contains('\0') {
            return Err(EntError::NulInName);
        }
        if let Some(&offset) = self.strings.get(name) {
            return Ok(offset);
        }
        let offset = self.checked_offset(self.data.len())?;
        self.data.extend_from_slice(name.as_bytes());
        self.data.push(0);
        self.strings.insert(name.to_owned(), offset);
        Ok(offset)
    }

    fn checked_offset(&self, at: usize) -> Result<u32, EntError> {
        u32::try_from(at).map_err(|_| EntError::TooLarge { size: at })
    }

    /// Append `size` zeroed bytes at the next 4-aligned position and return
    /// the record offset.
    fn append_record(&mut self, size: usize) -> Result<u32, EntError> {
        while self.data.len() % 4 != 0 {
            self.data.push(0);
        }
        let offset = self.checked_offset(self.data.len())?;
        self.data.resize(self.data.len() + size, 0);
        Ok(offset)
    }

    fn put_u32(&mut self, offset: usize, value: u32) -> Result<(), EntError> {
        layout::write_u32(&mut self.data, offset, value)
    }

    /// Append a Module record with zeroed slots.
    ///
    /// The global module must be the first append so it lands immediately
    /// after the header, where [`EntReader::global_module`] looks for it.
    /// Its name is conventionally offset 0, which reads back as the empty
    /// string.
    ///
    /// [`EntReader::global_module`]: super::EntReader::global_module
    pub fn append_module(
        &mut self,
        name: u32,
        parent: Spec,
        module_count: u32,
        interface_count: u32,
        const_count: u32,
    ) -> Result<Spec, EntError> {
        let size = layout::module_size(module_count, interface_count, const_count);
        let off = self.append_record(size)? as usize;
        self.put_u32(off, RecordType::Module as u32)?;
        self.put_u32(off + 4, name)?;
        self.put_u32(off + 8, parent.raw())?;
        self.put_u32(off + 12, module_count)?;
        self.put_u32(off + 16, interface_count)?;
        self.put_u32(off + 20, const_count)?;
        trace!(offset = off, "appended module record");
        Ok(Spec::from_offset(off as u32))
    }

    /// Append an Interface record with zeroed method/constant slots.
    pub fn append_interface(&mut self, desc: &InterfaceDesc) -> Result<Spec, EntError> {
        let size = layout::interface_size(desc.method_count, desc.const_count);
        let off = self.append_record(size)? as usize;
        self.put_u32(off, RecordType::Interface as u32)?;
        self.put_u32(off + 4, desc.name)?;
        self.put_u32(off + 8, 0)?; // attr, set separately
        self.put_u32(off + 12, desc.fully_qualified_name)?;
        self.put_u32(off + 16, desc.fully_qualified_base_name)?;
        self.put_u32(off + 20, desc.module.raw())?;
        self.put_u32(off + 24, desc.method_count)?;
        self.put_u32(off + 28, desc.const_count)?;
        self.put_u32(off + 32, desc.inherited_method_count)?;
        self.put_u32(off + 36, desc.constructor.raw())?;
        trace!(offset = off, "appended interface record");
        Ok(Spec::from_offset(off as u32))
    }

    /// Set the attribute bits of an Interface record.
    pub fn set_interface_attr(&mut self, interface: Spec, attr: u32) -> Result<(), EntError> {
        let off = self.expect_record(interface, RecordType::Interface)?;
        self.put_u32(off + 8, attr)
    }

    /// Append a Method record with zeroed parameter/raise slots.
    ///
    /// Method records carry no discriminant; they are only reachable from
    /// the method slots and constructor field of an Interface.
    pub fn append_method(
        &mut self,
        return_spec: Spec,
        name: u32,
        attr: u32,
        param_count: u32,
        raise_count: u32,
    ) -> Result<Spec, EntError> {
        let size = layout::method_size(param_count, raise_count);
        let off = self.append_record(size)? as usize;
        self.put_u32(off, return_spec.raw())?;
        self.put_u32(off + 4, name)?;
        self.put_u32(off + 8, attr)?;
        self.put_u32(off + 12, param_count)?;
        self.put_u32(off + 16, raise_count)?;
        trace!(offset = off, "appended method record");
        Ok(Spec::from_offset(off as u32))
    }

    /// Append a Structure record with zeroed member slots.
    pub fn append_structure(&mut self, member_count: u32) -> Result<Spec, EntError> {
        self.append_members_record(RecordType::Structure, member_count)
    }

    /// Append an Exception record with zeroed member slots.
    pub fn append_exception(&mut self, member_count: u32) -> Result<Spec, EntError> {
        self.append_members_record(RecordType::Exception, member_count)
    }

    fn append_members_record(
        &mut self,
        record: RecordType,
        member_count: u32,
    ) -> Result<Spec, EntError> {
        let size = layout::structure_size(member_count);
        let off = self.append_record(size)? as usize;
        self.put_u32(off, record as u32)?;
        self.put_u32(off + 4, member_count)?;
        Ok(Spec::from_offset(off as u32))
    }

    /// Append an Enum record with zeroed name slots.
    pub fn append_enum(&mut self, enum_count: u32) -> Result<Spec, EntError> {
        let size = layout::enum_size(enum_count);
        let off = self.append_record(size)? as usize;
        self.put_u32(off, RecordType::Enum as u32)?;
        self.put_u32(off + 4, enum_count)?;
        Ok(Spec::from_offset(off as u32))
    }

    /// Append an Array record with zeroed rank slots.
    pub fn append_array(&mut self, element: Spec, dim: u32) -> Result<Spec, EntError> {
        let size = layout::array_size(dim);
        let off = self.append_record(size)? as usize;
        self.put_u32(off, RecordType::Array as u32)?;
        self.put_u32(off + 4, element.raw())?;
        self.put_u32(off + 8, dim)?;
        Ok(Spec::from_offset(off as u32))
    }

    /// Append a Sequence record.
    pub fn append_sequence(&mut self, element: Spec, max: u64) -> Result<Spec, EntError> {
        let off = self.append_record(layout::SEQUENCE_SIZE)? as usize;
        self.put_u32(off, RecordType::Sequence as u32)?;
        self.put_u32(off + 4, element.raw())?;
        layout::write_u64(&mut self.data, off + 8, max)?;
        Ok(Spec::from_offset(off as u32))
    }

    // ---- slot fills ----

    /// Add a child module spec into the first free module slot of `parent`.
    pub fn add_module(&mut self, parent: Spec, child: Spec) -> Result<(), EntError> {
        let assigned = self.non_none(child)?;
        let off = self.expect_record(parent, RecordType::Module)?;
        let count = layout::read_u32(&self.data, off + 12)?;
        let slot = self.free_spec_slot("module", off + 24, count, SPEC_SIZE)?;
        self.put_u32(slot, assigned)
    }

    /// Add an interface spec into the first free interface slot of `parent`.
    pub fn add_interface(&mut self, parent: Spec, interface: Spec) -> Result<(), EntError> {
        let assigned = self.non_none(interface)?;
        let off = self.expect_record(parent, RecordType::Module)?;
        let module_count = layout::read_u32(&self.data, off + 12)? as usize;
        let count = layout::read_u32(&self.data, off + 16)?;
        let base = off + 24 + SPEC_SIZE * module_count;
        let slot = self.free_spec_slot("interface", base, count, SPEC_SIZE)?;
        self.put_u32(slot, assigned)
    }

    /// Add a constant into the first free constant slot of a Module.
    pub fn add_module_constant(
        &mut self,
        parent: Spec,
        spec: Spec,
        name: u32,
        value: u32,
    ) -> Result<(), EntError> {
        let assigned = self.non_none(spec)?;
        let off = self.expect_record(parent, RecordType::Module)?;
        let module_count = layout::read_u32(&self.data, off + 12)? as usize;
        let interface_count = layout::read_u32(&self.data, off + 16)? as usize;
        let count = layout::read_u32(&self.data, off + 20)?;
        let base = off + 24 + SPEC_SIZE * (module_count + interface_count);
        let slot = self.free_spec_slot("constant", base, count, CONSTANT_SIZE)?;
        self.put_u32(slot, assigned)?;
        self.put_u32(slot + 4, name)?;
        self.put_u32(slot + 8, value)
    }

    /// Add a constant into the first free constant slot of an Interface.
    pub fn add_interface_constant(
        &mut self,
        parent: Spec,
        spec: Spec,
        name: u32,
        value: u32,
    ) -> Result<(), EntError> {
        let assigned = self.non_none(spec)?;
        let off = self.expect_record(parent, RecordType::Interface)?;
        let method_count = layout::read_u32(&self.data, off + 24)? as usize;
        let count = layout::read_u32(&self.data, off + 28)?;
        let base = off + 40 + SPEC_SIZE * method_count;
        let slot = self.free_spec_slot("constant", base, count, CONSTANT_SIZE)?;
        self.put_u32(slot, assigned)?;
        self.put_u32(slot + 4, name)?;
        self.put_u32(slot + 8, value)
    }

    /// Add a method spec into the first free method slot of an Interface.
    pub fn add_method(&mut self, parent: Spec, method: Spec) -> Result<(), EntError> {
        let assigned = self.non_none(method)?;
        self.expect_method(method)?;
        let off = self.expect_record(parent, RecordType::Interface)?;
        let count = layout::read_u32(&self.data, off + 24)?;
        let slot = self.free_spec_slot("method", off + 40, count, SPEC_SIZE)?;
        self.put_u32(slot, assigned)
    }

    /// Add a parameter into the first free parameter slot of a Method.
    pub fn add_param(
        &mut self,
        method: Spec,
        spec: Spec,
        name: u32,
        attr: u32,
    ) -> Result<(), EntError> {
        let assigned = self.non_none(spec)?;
        let off = self.expect_method(method)?;
        let count = layout::read_u32(&self.data, off + 12)?;
        let slot = self.free_spec_slot("parameter", off + METHOD_FIXED, count, PARAM_SIZE)?;
        self.put_u32(slot, assigned)?;
        self.put_u32(slot + 4, name)?;
        self.put_u32(slot + 8, attr)
    }

    /// Add an exception spec into the first free raise slot of a Method.
    pub fn add_raise(&mut self, method: Spec, spec: Spec) -> Result<(), EntError> {
        let assigned = self.non_none(spec)?;
        let off = self.expect_method(method)?;
        let param_count = layout::read_u32(&self.data, off + 12)? as usize;
        let count = layout::read_u32(&self.data, off + 16)?;
        let base = off + METHOD_FIXED + PARAM_SIZE * param_count;
        let slot = self.free_spec_slot("raise", base, count, SPEC_SIZE)?;
        self.put_u32(slot, assigned)
    }

    /// Add a member into the first free member slot of a Structure or
    /// Exception record.
    pub fn add_member(&mut self, parent: Spec, spec: Spec, name: u32) -> Result<(), EntError> {
        let assigned = self.non_none(spec)?;
        let off = self.expect_members_record(parent)?;
        let count = layout::read_u32(&self.data, off + 4)?;
        let slot = self.free_spec_slot("member", off + 8, count, MEMBER_SIZE)?;
        self.put_u32(slot, assigned)?;
        self.put_u32(slot + 4, name)
    }

    /// Add a name into the first free slot of an Enum record.
    pub fn add_enum_name(&mut self, parent: Spec, name: u32) -> Result<(), EntError> {
        if name == 0 {
            return Err(EntError::NotARecord { spec: 0 });
        }
        let off = self.expect_record(parent, RecordType::Enum)?;
        let count = layout::read_u32(&self.data, off + 4)?;
        let slot = self.free_spec_slot("enum name", off + 8, count, SPEC_SIZE)?;
        self.put_u32(slot, name)
    }

    /// Fill the next unset rank of an Array record. Ranks are non-zero.
    pub fn set_rank(&mut self, array: Spec, rank: u32) -> Result<(), EntError> {
        if rank == 0 {
            return Err(EntError::ZeroRank);
        }
        let off = self.expect_record(array, RecordType::Array)?;
        let dim = layout::read_u32(&self.data, off + 8)?;
        let slot = self.free_spec_slot("rank", off + 12, dim, SPEC_SIZE)?;
        self.put_u32(slot, rank)
    }

    /// Patch the header file size and hand over the finished blob.
    pub fn finish(mut self) -> Result<Vec<u8>, EntError> {
        let size = self.data.len();
        let size32 = u32::try_from(size).map_err(|_| EntError::TooLarge { size })?;
        layout::write_u32(&mut self.data, 8, size32)?;
        crate::logging::debug!(size, records = self.strings.len(), "finished ent blob");
        Ok(self.data)
    }

    // ---- internal checks ----

    fn non_none(&self, spec: Spec) -> Result<u32, EntError> {
        if spec.is_none() {
            return Err(EntError::NotARecord { spec: 0 });
        }
        Ok(spec.raw())
    }

    fn expect_record(&self, spec: Spec, expected: RecordType) -> Result<usize, EntError> {
        let offset = spec.offset().ok_or(EntError::NotARecord { spec: spec.raw() })? as usize;
        let code = layout::read_u32(&self.data, offset)?;
        let got = RecordType::from_code(code).ok_or(EntError::UnknownRecordType(code))?;
        if got != expected {
            return Err(EntError::UnexpectedRecord {
                expected: expected.name(),
                got: got.name(),
            });
        }
        Ok(offset)
    }

    fn expect_members_record(&self, spec: Spec) -> Result<usize, EntError> {
        let offset = spec.offset().ok_or(EntError::NotARecord { spec: spec.raw() })? as usize;
        let code = layout::read_u32(&self.data, offset)?;
        match RecordType::from_code(code) {
            Some(RecordType::Structure) | Some(RecordType::Exception) => Ok(offset),
            Some(got) => Err(EntError::UnexpectedRecord {
                expected: "structure or exception",
                got: got.name(),
            }),
            None => Err(EntError::UnknownRecordType(code)),
        }
    }

    fn expect_method(&self, spec: Spec) -> Result<usize, EntError> {
        let offset = spec.offset().ok_or(EntError::NotARecord { spec: spec.raw() })? as usize;
        if offset + METHOD_FIXED > self.data.len() {
            return Err(EntError::Truncated {
                needed: offset + METHOD_FIXED,
                available: self.data.len(),
            });
        }
        Ok(offset)
    }

    /// Scan a slot array for the first entry whose leading u32 is zero.
    fn free_spec_slot(
        &self,
        record: &'static str,
        base: usize,
        count: u32,
        stride: usize,
    ) -> Result<usize, EntError> {
        for i in 0..count as usize {
            let slot = base + stride * i;
            if layout::read_u32(&self.data, slot)? == 0 {
                return Ok(slot);
            }
        }
        Err(EntError::SlotsFull { record, count })
    }
}

impl Default for EntBuilder {
    fn default() -> Self {
        Self::new()
    }
}
