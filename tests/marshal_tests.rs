//! End-to-end marshaling tests: reflected signatures driving native calls.

use idl_meta::call::{CallError, CallMarshaler, RawEntry, RawReturn, ReturnClass};
use idl_meta::reflect::{Interface, Method};
use idl_meta::value::{Kind, ObjectRef, Sequence, Value};

extern "C" fn machine_epsilon() -> f64 {
    f64::EPSILON
}

extern "C" fn meter_read(_receiver: u64) -> f64 {
    f64::EPSILON
}

extern "C" fn add(a: u64, b: u64) -> u64 {
    (a as u32 as i32).wrapping_add(b as u32 as i32) as u32 as u64
}

extern "C" fn string_length(ptr: u64, len: u64) -> u64 {
    // The marshaler packs strings as pointer and byte length.
    let bytes = unsafe { std::slice::from_raw_parts(ptr as *const u8, len as usize) };
    debug_assert!(std::str::from_utf8(bytes).is_ok());
    len
}

#[test]
fn zero_arg_double_returns_the_exact_value() -> Result<(), anyhow::Error> {
    let method = Method::new("F0d7epsilon")?;
    let entry = unsafe { RawEntry::new(machine_epsilon as *const () as usize) };
    let result = CallMarshaler::new(method).call(&entry, None, &[])?;
    assert_eq!(result.to_f64()?, f64::EPSILON);
    Ok(())
}

#[test]
fn two_long_arguments_through_a_raw_entry() -> Result<(), anyhow::Error> {
    let method = Method::new("F2l3addl1al1b")?;
    let entry = unsafe { RawEntry::new(add as *const () as usize) };
    let args = [Value::from(40i32), Value::from(2i32)];
    let result = CallMarshaler::new(method).call(&entry, None, &args)?;
    assert_eq!(result.to_i32()?, 42);
    Ok(())
}

#[test]
fn string_argument_packs_two_words() -> Result<(), anyhow::Error> {
    let method = Method::new("F1m6lengthD4text")?;
    let entry = unsafe { RawEntry::new(string_length as *const () as usize) };
    let args = [Value::from("four")];
    let result = CallMarshaler::new(method).call(&entry, None, &args)?;
    assert_eq!(result.to_u32()?, 4);
    Ok(())
}

#[test]
fn whole_boundary_from_interface_string() -> Result<(), anyhow::Error> {
    // interface Meter { double read(); void reset(); }
    let info = concat!("I5Meter", "F0d4read", "F0v5reset");
    let interface = Interface::parse(info)?;

    // The receiver packs as the implicit first word, so the native side
    // takes one more argument than the declaration shows.
    let entry = unsafe { RawEntry::new(meter_read as *const () as usize) };
    let receiver = ObjectRef::new(0u32);
    let result = idl_meta::invoke_method(&interface, Some(&receiver), 0, 0, &entry, &[])?;
    assert_eq!(result.to_f64()?, f64::EPSILON);
    Ok(())
}

#[test]
fn base_offset_selects_within_own_declarations() -> Result<(), anyhow::Error> {
    // An interface inheriting three methods; global index 3 is its first
    // own declaration.
    let mut interface = Interface::parse(concat!("I5Gauge", "F0d4read"))?;
    interface.set_inherited_method_count(3);
    let base = interface.inherited_method_count();

    let entry = unsafe { RawEntry::new(machine_epsilon as *const () as usize) };
    let result = idl_meta::invoke_method(&interface, None, base, 3, &entry, &[])?;
    assert_eq!(result.to_f64()?, f64::EPSILON);

    // Indices inside the inherited range cannot resolve here.
    assert!(idl_meta::invoke_method(&interface, None, base, 1, &entry, &[]).is_err());
    Ok(())
}

#[test]
fn mismatches_are_rejected_before_dispatch() -> Result<(), anyhow::Error> {
    let method = Method::new("F1v4takeD4text")?;
    let marshaler = CallMarshaler::new(method);
    let untouched = |_: &[u64], _: ReturnClass| -> Result<RawReturn, CallError> {
        Ok(RawReturn::Void)
    };

    assert_eq!(
        marshaler.call(&untouched, None, &[]),
        Err(CallError::ArityMismatch {
            expected: 1,
            got: 0
        })
    );
    assert_eq!(
        marshaler.call(&untouched, None, &[Value::from(3i32)]),
        Err(CallError::ArgumentType {
            index: 0,
            expected: "string",
            got: Kind::S32,
        })
    );
    Ok(())
}

#[test]
fn host_targets_return_whole_values() -> Result<(), anyhow::Error> {
    let method = Method::new("F0Qm5codes")?;
    let host = |_: &[u64], ret: ReturnClass| -> Result<RawReturn, CallError> {
        assert_eq!(ret, ReturnClass::Value);
        Ok(RawReturn::Value(Value::sequence(Sequence::from_slice(&[
            200u32, 404,
        ]))))
    };
    let result = CallMarshaler::new(method).call(&host, None, &[])?;
    let codes = result.as_sequence::<u32>()?;
    assert_eq!(codes.to_vec()?, vec![200, 404]);
    Ok(())
}

#[test]
fn nullable_parameters_accept_absence() -> Result<(), anyhow::Error> {
    let method = Method::new("F1v3setl?5limit")?;
    let saw_absent = |words: &[u64], _: ReturnClass| -> Result<RawReturn, CallError> {
        let first = words.first().copied().unwrap_or_default();
        let value = unsafe { &*(first as *const Value) };
        assert!(value.is_absent());
        Ok(RawReturn::Void)
    };
    let result = CallMarshaler::new(method).call(&saw_absent, None, &[Value::null()])?;
    assert_eq!(result, Value::VOID);
    Ok(())
}
