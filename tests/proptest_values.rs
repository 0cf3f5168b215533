//! Property-based tests for value round-trips and word packing.

use idl_meta::call::{ArgPass, CallFrame};
use idl_meta::reflect::Constant;
use idl_meta::value::{Sequence, Value};

use proptest::prelude::*;

proptest! {
    #[test]
    fn primitive_roundtrip_i32(v in any::<i32>()) {
        prop_assert_eq!(Value::from(v).to_i32(), Ok(v));
    }

    #[test]
    fn primitive_roundtrip_u64(v in any::<u64>()) {
        prop_assert_eq!(Value::from(v).to_u64(), Ok(v));
    }

    #[test]
    fn primitive_roundtrip_f64(v in any::<f64>()) {
        let got = Value::from(v).to_f64().unwrap();
        // Bitwise comparison so NaN payloads count as preserved.
        prop_assert_eq!(got.to_bits(), v.to_bits());
    }

    #[test]
    fn string_roundtrip(s in ".*") {
        let value = Value::from(s.as_str());
        prop_assert_eq!(value.as_str(), Ok(s.as_str()));
    }

    #[test]
    fn sequence_roundtrip(v in proptest::collection::vec(any::<i64>(), 0..64)) {
        let seq = Sequence::from_slice(&v);
        prop_assert_eq!(seq.to_vec(), Ok(v));
    }

    #[test]
    fn signed_words_sign_extend(v in any::<i16>()) {
        let frame = CallFrame::pack(&[Value::from(v)], &[ArgPass::Typed]).unwrap();
        prop_assert_eq!(frame.words(), &[v as i64 as u64]);
    }

    #[test]
    fn float_words_carry_bit_patterns(v in any::<f32>()) {
        let frame = CallFrame::pack(&[Value::from(v)], &[ArgPass::Typed]).unwrap();
        prop_assert_eq!(frame.words(), &[u64::from(v.to_bits())]);
    }

    #[test]
    fn integer_constants_parse_exactly(v in any::<i32>()) {
        let info = format!("Cl1K{v} ");
        let constant = Constant::new(&info).unwrap();
        prop_assert_eq!(constant.value().unwrap(), f64::from(v));
    }

    #[test]
    fn plain_string_constants_roundtrip(s in "[a-zA-Z0-9_.,;:!-]{0,40}") {
        let info = format!("CD1S{s} ");
        let constant = Constant::new(&info).unwrap();
        prop_assert_eq!(constant.string_value().unwrap(), s);
    }
}
