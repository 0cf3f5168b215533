//! Human-readable listing of an Ent blob.
//!
//! Walks every record reachable from the global module and writes an
//! indented listing. Records referenced from more than one place (shared
//! sequence specs, base interfaces) are printed once; later references show
//! the record offset with a `shared` marker so the walk terminates even on
//! blobs with reference cycles.

use std::collections::HashSet;
use std::fmt::Write;

use super::reader::{
    ArrayView, EntReader, EnumView, InterfaceView, MethodView, ModuleView, Record, SequenceView,
    StructureView,
};
use super::{EntError, Spec};

/// Write a listing of every record reachable from the global module.
pub fn dump(reader: &EntReader<'_>, out: &mut impl Write) -> Result<(), EntError> {
    let mut dumper = Dumper {
        reader,
        visited: HashSet::new(),
    };
    let module = reader.global_module()?;
    dumper.module(out, &module, 0)
}

struct Dumper<'r, 'a> {
    reader: &'r EntReader<'a>,
    visited: HashSet<u32>,
}

impl Dumper<'_, '_> {
    /// Marks a record visited; false when it was already printed.
    fn enter(&mut self, spec: Spec) -> bool {
        self.visited.insert(spec.raw())
    }

    fn indent(out: &mut impl Write, depth: usize) -> Result<(), EntError> {
        for _ in 0..depth {
            out.write_str("  ")?;
        }
        Ok(())
    }

    /// Short form of a spec for inline positions: a primitive name or the
    /// record offset.
    fn spec_label(&self, spec: Spec) -> String {
        if spec.is_none() {
            return "none".to_owned();
        }
        if let Some(kind) = spec.primitive() {
            return kind.name().to_owned();
        }
        format!("@{}", spec.raw())
    }

    fn module(
        &mut self,
        out: &mut impl Write,
        module: &ModuleView<'_>,
        depth: usize,
    ) -> Result<(), EntError> {
        Self::indent(out, depth)?;
        if !self.enter(module.spec()) {
            writeln!(out, "module {} shared", self.spec_label(module.spec()))?;
            return Ok(());
        }
        writeln!(out, "module \"{}\"", module.name()?)?;

        for i in 0..module.constant_count()? {
            let constant = module.constant(i)?;
            Self::indent(out, depth + 1)?;
            writeln!(
                out,
                "const {} {} = {:#x}",
                self.spec_label(constant.spec()?),
                constant.name()?,
                constant.value()?
            )?;
        }
        for i in 0..module.interface_count()? {
            self.spec(out, module.interface(i)?, depth + 1)?;
        }
        for i in 0..module.module_count()? {
            self.spec(out, module.module(i)?, depth + 1)?;
        }
        Ok(())
    }

    fn spec(&mut self, out: &mut impl Write, spec: Spec, depth: usize) -> Result<(), EntError> {
        if spec.is_none() {
            Self::indent(out, depth)?;
            writeln!(out, "none")?;
            return Ok(());
        }
        match self.reader.resolve(spec)? {
            Record::Primitive(kind) => {
                Self::indent(out, depth)?;
                writeln!(out, "{}", kind.name())?;
                Ok(())
            }
            Record::Module(module) => self.module(out, &module, depth),
            Record::Interface(iface) => self.interface(out, &iface, depth),
            Record::Structure(record) => self.members(out, "structure", &record, depth),
            Record::Exception(record) => self.members(out, "exception", &record, depth),
            Record::Enum(record) => self.enumeration(out, &record, depth),
            Record::Array(array) => self.array(out, &array, depth),
            Record::Sequence(sequence) => self.sequence(out, &sequence, depth),
        }
    }

    fn interface(
        &mut self,
        out: &mut impl Write,
        iface: &InterfaceView<'_>,
        depth: usize,
    ) -> Result<(), EntError> {
        Self::indent(out, depth)?;
        if !self.enter(iface.spec()) {
            writeln!(out, "interface {} shared", self.spec_label(iface.spec()))?;
            return Ok(());
        }
        let base = iface.fully_qualified_base_name()?;
        if base.is_empty() {
            writeln!(out, "interface {}", iface.fully_qualified_name()?)?;
        } else {
            writeln!(out, "interface {} : {}", iface.fully_qualified_name()?, base)?;
        }

        for i in 0..iface.constant_count()? {
            let constant = iface.constant(i)?;
            Self::indent(out, depth + 1)?;
            writeln!(
                out,
                "const {} {} = {:#x}",
                self.spec_label(constant.spec()?),
                constant.name()?,
                constant.value()?
            )?;
        }
        if let Some(constructor) = iface.constructor()? {
            self.method(out, "constructor", &constructor, depth + 1)?;
        }
        for i in 0..iface.method_count()? {
            self.method(out, "method", &iface.method(i)?, depth + 1)?;
        }
        Ok(())
    }

    fn method(
        &mut self,
        out: &mut impl Write,
        label: &str,
        method: &MethodView<'_>,
        depth: usize,
    ) -> Result<(), EntError> {
        Self::indent(out, depth)?;
        writeln!(
            out,
            "{} {} {}",
            label,
            self.spec_label(method.return_spec()?),
            method.name()?
        )?;
        for i in 0..method.param_count()? {
            let param = method.param(i)?;
            Self::indent(out, depth + 1)?;
            let direction = if param.is_inout()? {
                "inout"
            } else if param.is_output()? {
                "out"
            } else {
                "in"
            };
            let variadic = if param.is_variadic()? { "..." } else { "" };
            writeln!(
                out,
                "param {} {}{} [{}]",
                self.spec_label(param.spec()?),
                param.name()?,
                variadic,
                direction
            )?;
        }
        for i in 0..method.raise_count()? {
            Self::indent(out, depth + 1)?;
            writeln!(out, "raises {}", self.spec_label(method.raise(i)?))?;
        }
        // Follow non-primitive return and parameter types so standalone
        // structure and sequence records show up in the listing.
        let ret = method.return_spec()?;
        if ret.offset().is_some() {
            self.spec(out, ret, depth + 1)?;
        }
        for i in 0..method.param_count()? {
            let spec = method.param(i)?.spec()?;
            if spec.offset().is_some() {
                self.spec(out, spec, depth + 1)?;
            }
        }
        Ok(())
    }

    fn members(
        &mut self,
        out: &mut impl Write,
        label: &str,
        record: &StructureView<'_>,
        depth: usize,
    ) -> Result<(), EntError> {
        Self::indent(out, depth)?;
        if !self.enter(record.spec()) {
            writeln!(out, "{} {} shared", label, self.spec_label(record.spec()))?;
            return Ok(());
        }
        writeln!(out, "{} {}", label, self.spec_label(record.spec()))?;
        for i in 0..record.member_count()? {
            let member = record.member(i)?;
            Self::indent(out, depth + 1)?;
            writeln!(
                out,
                "member {} {}",
                self.spec_label(member.spec()?),
                member.name()?
            )?;
        }
        Ok(())
    }

    fn enumeration(
        &mut self,
        out: &mut impl Write,
        record: &EnumView<'_>,
        depth: usize,
    ) -> Result<(), EntError> {
        Self::indent(out, depth)?;
        if !self.enter(record.spec()) {
            writeln!(out, "enum {} shared", self.spec_label(record.spec()))?;
            return Ok(());
        }
        writeln!(out, "enum {}", self.spec_label(record.spec()))?;
        for i in 0..record.count()? {
            Self::indent(out, depth + 1)?;
            writeln!(out, "{}", record.name(i)?)?;
        }
        Ok(())
    }

    fn array(
        &mut self,
        out: &mut impl Write,
        array: &ArrayView<'_>,
        depth: usize,
    ) -> Result<(), EntError> {
        Self::indent(out, depth)?;
        if !self.enter(array.spec()) {
            writeln!(out, "array {} shared", self.spec_label(array.spec()))?;
            return Ok(());
        }
        let mut ranks = String::new();
        for i in 0..array.dim()? {
            write!(ranks, "[{}]", array.rank(i)?)?;
        }
        writeln!(out, "array {}{}", self.spec_label(array.element()?), ranks)?;
        let element = array.element()?;
        if element.offset().is_some() {
            self.spec(out, element, depth + 1)?;
        }
        Ok(())
    }

    fn sequence(
        &mut self,
        out: &mut impl Write,
        sequence: &SequenceView<'_>,
        depth: usize,
    ) -> Result<(), EntError> {
        Self::indent(out, depth)?;
        if !self.enter(sequence.spec()) {
            writeln!(out, "sequence {} shared", self.spec_label(sequence.spec()))?;
            return Ok(());
        }
        let max = sequence.max()?;
        if max == 0 {
            writeln!(out, "sequence<{}>", self.spec_label(sequence.element()?))?;
        } else {
            writeln!(
                out,
                "sequence<{}, {}>",
                self.spec_label(sequence.element()?),
                max
            )?;
        }
        let element = sequence.element()?;
        if element.offset().is_some() {
            self.spec(out, element, depth + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ent::builder::InterfaceDesc;
    use crate::ent::{EntBuilder, Primitive, attr};

    #[test]
    fn listing_covers_reachable_records() {
        let mut b = EntBuilder::new();
        let module = b.append_module(0, Spec::NONE, 0, 1, 0).unwrap();
        let name = b.intern("Stack").unwrap();
        let fqn = b.intern("::test::Stack").unwrap();
        let iface = b
            .append_interface(&InterfaceDesc {
                name,
                fully_qualified_name: fqn,
                module,
                method_count: 1,
                ..InterfaceDesc::default()
            })
            .unwrap();
        let seq = b
            .append_sequence(Spec::from(Primitive::S32), 0)
            .unwrap();
        let m_name = b.intern("drain").unwrap();
        let method = b.append_method(seq, m_name, 0, 1, 0).unwrap();
        let p_name = b.intern("limit").unwrap();
        b.add_param(method, Spec::from(Primitive::U32), p_name, attr::IN)
            .unwrap();
        b.add_method(iface, method).unwrap();
        b.add_interface(module, iface).unwrap();
        let blob = b.finish().unwrap();

        let reader = EntReader::new(&blob).unwrap();
        let mut listing = String::new();
        dump(&reader, &mut listing).unwrap();

        assert!(listing.contains("interface ::test::Stack"));
        assert!(listing.contains("drain"));
        assert!(listing.contains("sequence<s32>"));
        assert!(listing.contains("param u32 limit [in]"));
    }

    #[test]
    fn shared_records_print_once() {
        let mut b = EntBuilder::new();
        let module = b.append_module(0, Spec::NONE, 0, 1, 0).unwrap();
        let name = b.intern("Pair").unwrap();
        let iface = b
            .append_interface(&InterfaceDesc {
                name,
                fully_qualified_name: name,
                module,
                method_count: 2,
                ..InterfaceDesc::default()
            })
            .unwrap();
        let seq = b
            .append_sequence(Spec::from(Primitive::F64), 0)
            .unwrap();
        let m_name = b.intern("left").unwrap();
        let m1 = b.append_method(seq, m_name, 0, 0, 0).unwrap();
        let n_name = b.intern("right").unwrap();
        let m2 = b.append_method(seq, n_name, 0, 0, 0).unwrap();
        b.add_method(iface, m1).unwrap();
        b.add_method(iface, m2).unwrap();
        b.add_interface(module, iface).unwrap();
        let blob = b.finish().unwrap();

        let reader = EntReader::new(&blob).unwrap();
        let mut listing = String::new();
        dump(&reader, &mut listing).unwrap();

        assert_eq!(listing.matches("sequence<f64>").count(), 1);
        assert_eq!(listing.matches("shared").count(), 1);
    }
}
