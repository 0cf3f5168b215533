//! Argument frames: tag-directed packing of values into machine words.
//!
//! The frame owns a clone of every argument so the pointers packed into the
//! word array stay alive for the duration of the call. Strings, objects,
//! and sequences all have heap-stable payloads, so cloning the `Value` does
//! not move the bytes a packed pointer refers to.
//!
//! Word encoding:
//!
//! - booleans and integers widen to one word (signed values sign-extend)
//! - `f32`/`f64` pack their bit patterns into one word
//! - strings pack two words, pointer then byte length
//! - objects and sequences pack the address of their shared record
//! - erased arguments pack the address of the whole owned [`Value`]
//!
//! An argument is passed erased when it is a wrapped dynamic value, when
//! the declared parameter type is `any`, or when the declared type is
//! nullable, since absence has no word encoding of its own.

use crate::value::{Kind, Value, ValueError};

use super::CallError;

/// How one argument crosses the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgPass {
    /// Unwrap the payload into its native word encoding.
    Typed,
    /// Pass a pointer to the whole value, type information intact.
    Erased,
}

/// A packed argument frame, pinned until the call returns.
pub struct CallFrame {
    // The words borrow from these owned clones. Boxed so the values have a
    // stable address even while the frame itself moves.
    args: Box<[Value]>,
    words: Vec<u64>,
}

impl CallFrame {
    /// Clone the arguments and pack them. `passes` must be one entry per
    /// argument; a missing entry packs as [`ArgPass::Typed`].
    pub fn pack(args: &[Value], passes: &[ArgPass]) -> Result<Self, CallError> {
        let args: Box<[Value]> = args.to_vec().into_boxed_slice();
        let mut words = Vec::with_capacity(args.len() + 1);
        for (index, value) in args.iter().enumerate() {
            let pass = passes.get(index).copied().unwrap_or(ArgPass::Typed);
            if pass == ArgPass::Erased || value.is_dynamic() {
                words.push(value as *const Value as u64);
                continue;
            }
            Self::pack_typed(index, value, &mut words)?;
        }
        Ok(Self { args, words })
    }

    /// Prepend a receiver pointer word, the implicit first argument of an
    /// interface method call.
    pub fn with_receiver(mut self, receiver: u64) -> Self {
        self.words.insert(0, receiver);
        self
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub fn arg_count(&self) -> usize {
        self.args.len()
    }

    fn pack_typed(index: usize, value: &Value, words: &mut Vec<u64>) -> Result<(), CallError> {
        match value.kind() {
            Kind::Bool => words.push(u64::from(value.to_bool()?)),
            Kind::S8 => words.push(value.to_i8()? as i64 as u64),
            Kind::U8 => words.push(u64::from(value.to_u8()?)),
            Kind::S16 => words.push(value.to_i16()? as i64 as u64),
            Kind::U16 => words.push(u64::from(value.to_u16()?)),
            Kind::S32 => words.push(value.to_i32()? as i64 as u64),
            Kind::U32 => words.push(u64::from(value.to_u32()?)),
            Kind::S64 => words.push(value.to_i64()? as u64),
            Kind::U64 => words.push(value.to_u64()?),
            Kind::F32 => words.push(u64::from(value.to_f32()?.to_bits())),
            Kind::F64 => words.push(value.to_f64()?.to_bits()),
            Kind::String => {
                let s = value.as_str()?;
                words.push(s.as_ptr() as u64);
                words.push(s.len() as u64);
            }
            Kind::Object => words.push(value.as_object()?.as_ptr() as u64),
            Kind::Sequence => words.push(value.as_any_sequence()?.as_ptr() as u64),
            Kind::Void => {
                if value.is_absent() {
                    return Err(CallError::Value(ValueError::Absent {
                        declared: Kind::Void,
                    }));
                }
                // A bare void argument has no word encoding at all.
                return Err(CallError::VoidArgument { index });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::value::Sequence;

    #[test]
    fn integers_widen_to_one_word() {
        let frame = CallFrame::pack(
            &[Value::from(-1i8), Value::from(7u16), Value::from(true)],
            &[],
        )
        .unwrap();
        assert_eq!(frame.words(), &[u64::MAX, 7, 1]);
    }

    #[test]
    fn floats_pack_bit_patterns() {
        let frame = CallFrame::pack(&[Value::from(1.5f64), Value::from(2.5f32)], &[]).unwrap();
        assert_eq!(frame.words()[0], 1.5f64.to_bits());
        assert_eq!(frame.words()[1], u64::from(2.5f32.to_bits()));
    }

    #[test]
    fn string_packs_pointer_and_length() {
        let frame = CallFrame::pack(&[Value::from("hello")], &[]).unwrap();
        assert_eq!(frame.words().len(), 2);
        assert_eq!(frame.words()[1], 5);
        let ptr = frame.words()[0] as *const u8;
        let bytes = unsafe { std::slice::from_raw_parts(ptr, 5) };
        assert_eq!(bytes, b"hello");
    }

    #[test]
    fn sequence_packs_backing_record_address() {
        let seq = Sequence::from_slice(&[1u32, 2]);
        let expected = seq.as_ptr() as u64;
        let frame = CallFrame::pack(&[Value::sequence(seq)], &[]).unwrap();
        assert_eq!(frame.words(), &[expected]);
    }

    #[test]
    fn erased_argument_packs_value_address() {
        let frame =
            CallFrame::pack(&[Value::from(5i32).into_dynamic()], &[ArgPass::Typed]).unwrap();
        assert_eq!(frame.words().len(), 1);
        let value = unsafe { &*(frame.words()[0] as *const Value) };
        assert_eq!(value.to_i32(), Ok(5));
        assert!(value.is_dynamic());
    }

    #[test]
    fn receiver_word_goes_first() {
        let frame = CallFrame::pack(&[Value::from(2u8)], &[])
            .unwrap()
            .with_receiver(0xbeef);
        assert_eq!(frame.words(), &[0xbeef, 2]);
    }

    #[test]
    fn absent_argument_is_rejected() {
        let err = CallFrame::pack(&[Value::null()], &[]).map(|_| ()).unwrap_err();
        assert!(matches!(err, CallError::Value(_)));
    }
}
