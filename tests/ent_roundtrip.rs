//! Round-trip tests for the Ent binary metadata format.
//!
//! These build a blob through the public builder, then read every field
//! back through the validating reader, including a pass through a file on
//! disk since blobs are relocatable byte images.

use std::io::{Read, Write};

use idl_meta::ent::{
    EntBuilder, EntError, EntReader, InterfaceDesc, Primitive, Record, Spec, attr, dump,
};

/// One module, one interface, one method with two parameters; every field
/// written is read back.
fn build_device_blob() -> Result<Vec<u8>, anyhow::Error> {
    let mut builder = EntBuilder::new();
    let module = builder.append_module(0, Spec::NONE, 0, 1, 1)?;

    let name = builder.intern("Device")?;
    let fqn = builder.intern("::hw::Device")?;
    let fqbn = builder.intern("::hw::Node")?;
    let interface = builder.append_interface(&InterfaceDesc {
        name,
        fully_qualified_name: fqn,
        fully_qualified_base_name: fqbn,
        module,
        method_count: 1,
        const_count: 1,
        inherited_method_count: 3,
        constructor: Spec::NONE,
    })?;
    builder.set_interface_attr(interface, attr::CALLBACK)?;

    let method_name = builder.intern("transfer")?;
    let method = builder.append_method(
        Spec::from(Primitive::U32),
        method_name,
        attr::OPERATION,
        2,
        0,
    )?;
    let buffer = builder.append_sequence(Spec::from(Primitive::U8), 0)?;
    let data_name = builder.intern("data")?;
    builder.add_param(method, buffer, data_name, attr::IN)?;
    let offset_name = builder.intern("offset")?;
    builder.add_param(
        method,
        Spec::from(Primitive::U64),
        offset_name,
        attr::IN | attr::OPTIONAL,
    )?;
    builder.add_method(interface, method)?;

    let const_name = builder.intern("MAX_LANES")?;
    builder.add_interface_constant(interface, Spec::from(Primitive::U32), const_name, 4)?;

    builder.add_interface(module, interface)?;
    Ok(builder.finish()?)
}

#[test]
fn module_interface_method_param_roundtrip() -> Result<(), anyhow::Error> {
    let blob = build_device_blob()?;
    let reader = EntReader::new(&blob)?;

    let module = reader.global_module()?;
    assert_eq!(module.name()?, "");
    assert!(module.parent()?.is_none());
    assert_eq!(module.module_count()?, 0);
    assert_eq!(module.interface_count()?, 1);

    let interface = match reader.resolve(module.interface(0)?)? {
        Record::Interface(interface) => interface,
        other => anyhow::bail!("expected interface, got {}", other.name()),
    };
    assert_eq!(interface.name()?, "Device");
    assert_eq!(interface.fully_qualified_name()?, "::hw::Device");
    assert_eq!(interface.fully_qualified_base_name()?, "::hw::Node");
    assert_eq!(interface.attr()?, attr::CALLBACK);
    assert_eq!(interface.module()?, module.spec());
    assert_eq!(interface.method_count()?, 1);
    assert_eq!(interface.constant_count()?, 1);
    assert_eq!(interface.inherited_method_count()?, 3);
    assert!(interface.constructor()?.is_none());

    let method = interface.method(0)?;
    assert_eq!(method.name()?, "transfer");
    assert_eq!(method.return_spec()?.primitive(), Some(Primitive::U32));
    assert!(method.is_operation()?);
    assert_eq!(method.param_count()?, 2);
    assert_eq!(method.raise_count()?, 0);

    let data = method.param(0)?;
    assert_eq!(data.name()?, "data");
    assert!(data.is_input()?);
    assert!(!data.is_optional()?);
    let buffer = match reader.resolve(data.spec()?)? {
        Record::Sequence(sequence) => sequence,
        other => anyhow::bail!("expected sequence, got {}", other.name()),
    };
    assert_eq!(buffer.element()?.primitive(), Some(Primitive::U8));
    assert_eq!(buffer.max()?, 0);

    let offset = method.param(1)?;
    assert_eq!(offset.name()?, "offset");
    assert_eq!(offset.spec()?.primitive(), Some(Primitive::U64));
    assert!(offset.is_optional()?);

    let constant = interface.constant(0)?;
    assert_eq!(constant.name()?, "MAX_LANES");
    assert_eq!(constant.spec()?.primitive(), Some(Primitive::U32));
    assert_eq!(constant.value()?, 4);
    Ok(())
}

#[test]
fn blob_survives_a_trip_through_disk() -> Result<(), anyhow::Error> {
    let blob = build_device_blob()?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("device.ent");
    std::fs::File::create(&path)?.write_all(&blob)?;

    let mut reloaded = Vec::new();
    std::fs::File::open(&path)?.read_to_end(&mut reloaded)?;
    assert_eq!(reloaded, blob);

    let reader = EntReader::new(&reloaded)?;
    let module = reader.global_module()?;
    let interface = match reader.resolve(module.interface(0)?)? {
        Record::Interface(interface) => interface,
        other => anyhow::bail!("expected interface, got {}", other.name()),
    };
    assert_eq!(interface.method(0)?.name()?, "transfer");
    Ok(())
}

#[test]
fn dump_lists_the_whole_blob() -> Result<(), anyhow::Error> {
    let blob = build_device_blob()?;
    let reader = EntReader::new(&blob)?;
    let mut listing = String::new();
    dump(&reader, &mut listing)?;

    assert!(listing.contains("interface ::hw::Device : ::hw::Node"));
    assert!(listing.contains("method u32 transfer"));
    assert!(listing.contains("const u32 MAX_LANES = 0x4"));
    assert!(listing.contains("sequence<u8>"));
    Ok(())
}

#[test]
fn adding_past_declared_slot_count_fails() -> Result<(), anyhow::Error> {
    let mut builder = EntBuilder::new();
    let module = builder.append_module(0, Spec::NONE, 0, 1, 0)?;
    let name = builder.intern("Tiny")?;
    let interface = builder.append_interface(&InterfaceDesc {
        name,
        module,
        method_count: 1,
        ..InterfaceDesc::default()
    })?;
    let m_name = builder.intern("only")?;
    let first = builder.append_method(Spec::from(Primitive::Void), m_name, 0, 0, 0)?;
    let second = builder.append_method(Spec::from(Primitive::Void), m_name, 0, 0, 0)?;

    builder.add_method(interface, first)?;
    assert_eq!(
        builder.add_method(interface, second),
        Err(EntError::SlotsFull {
            record: "method",
            count: 1
        })
    );
    Ok(())
}

#[test]
fn truncated_blob_is_rejected() -> Result<(), anyhow::Error> {
    let blob = build_device_blob()?;
    let truncated = blob.get(..blob.len() - 8).unwrap_or_default();
    assert!(matches!(
        EntReader::new(truncated),
        Err(EntError::SizeMismatch { .. })
    ));
    Ok(())
}
