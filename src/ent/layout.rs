//! Byte-level layout of Ent records.
//!
//! Field offsets mirror the packed record structs of the format; all
//! multi-byte integers are native host order. The `*_size` functions compute
//! the exact byte footprint of a record from its slot counts so a caller can
//! size the arena before constructing records into it.

use super::EntError;

pub const HEADER_SIZE: usize = 12;

// Fixed header portions of each record kind.
pub const MODULE_FIXED: usize = 24;
pub const INTERFACE_FIXED: usize = 40;
pub const METHOD_FIXED: usize = 20;
pub const STRUCTURE_FIXED: usize = 8;
pub const ENUM_FIXED: usize = 8;
pub const ARRAY_FIXED: usize = 12;
pub const SEQUENCE_SIZE: usize = 16;

// Slot entry strides.
pub const SPEC_SIZE: usize = 4;
pub const CONSTANT_SIZE: usize = 12; // spec, name, value
pub const PARAM_SIZE: usize = 12; // spec, name, attr
pub const MEMBER_SIZE: usize = 8; // spec, name

/// Exact byte footprint of a Module with the given slot counts.
pub fn module_size(module_count: u32, interface_count: u32, const_count: u32) -> usize {
    MODULE_FIXED
        + SPEC_SIZE * (module_count as usize + interface_count as usize)
        + CONSTANT_SIZE * const_count as usize
}

/// Exact byte footprint of an Interface with the given slot counts.
pub fn interface_size(method_count: u32, const_count: u32) -> usize {
    INTERFACE_FIXED + SPEC_SIZE * method_count as usize + CONSTANT_SIZE * const_count as usize
}

/// Exact byte footprint of a Method with the given slot counts.
pub fn method_size(param_count: u32, raise_count: u32) -> usize {
    METHOD_FIXED + PARAM_SIZE * param_count as usize + SPEC_SIZE * raise_count as usize
}

/// Exact byte footprint of a Structure or Exception record.
pub fn structure_size(member_count: u32) -> usize {
    STRUCTURE_FIXED + MEMBER_SIZE * member_count as usize
}

/// Exact byte footprint of an Enum record.
pub fn enum_size(enum_count: u32) -> usize {
    ENUM_FIXED + SPEC_SIZE * enum_count as usize
}

/// Exact byte footprint of an Array record.
pub fn array_size(dim: u32) -> usize {
    ARRAY_FIXED + SPEC_SIZE * dim as usize
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8, EntError> {
    buf.get(offset).copied().ok_or(EntError::Truncated {
        needed: offset + 1,
        available: buf.len(),
    })
}

pub fn read_u32(buf: &[u8], offset: usize) -> Result<u32, EntError> {
    let bytes = buf
        .get(offset..offset + 4)
        .ok_or(EntError::Truncated {
            needed: offset + 4,
            available: buf.len(),
        })?
        .try_into()
        .map_err(|_| EntError::Truncated {
            needed: offset + 4,
            available: buf.len(),
        })?;
    Ok(u32::from_ne_bytes(bytes))
}

pub fn read_u64(buf: &[u8], offset: usize) -> Result<u64, EntError> {
    let bytes = buf
        .get(offset..offset + 8)
        .ok_or(EntError::Truncated {
            needed: offset + 8,
            available: buf.len(),
        })?
        .try_into()
        .map_err(|_| EntError::Truncated {
            needed: offset + 8,
            available: buf.len(),
        })?;
    Ok(u64::from_ne_bytes(bytes))
}

pub fn write_u32(buf: &mut [u8], offset: usize, value: u32) -> Result<(), EntError> {
    let len = buf.len();
    buf.get_mut(offset..offset + 4)
        .ok_or(EntError::Truncated {
            needed: offset + 4,
            available: len,
        })?
        .copy_from_slice(&value.to_ne_bytes());
    Ok(())
}

pub fn write_u64(buf: &mut [u8], offset: usize, value: u64) -> Result<(), EntError> {
    let len = buf.len();
    buf.get_mut(offset..offset + 8)
        .ok_or(EntError::Truncated {
            needed: offset + 8,
            available: len,
        })?
        .copy_from_slice(&value.to_ne_bytes());
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn sizes_match_fixed_plus_slots() {
        assert_eq!(module_size(0, 0, 0), 24);
        assert_eq!(module_size(2, 3, 1), 24 + 4 * 5 + 12);
        assert_eq!(interface_size(2, 1), 40 + 8 + 12);
        assert_eq!(method_size(2, 1), 20 + 24 + 4);
        assert_eq!(structure_size(3), 8 + 24);
        assert_eq!(enum_size(4), 8 + 16);
        assert_eq!(array_size(2), 12 + 8);
    }

    #[test]
    fn read_write_roundtrip_native_order() {
        let mut buf = vec![0u8; 16];
        write_u32(&mut buf, 4, 0xdead_beef).unwrap();
        assert_eq!(read_u32(&buf, 4), Ok(0xdead_beef));
        write_u64(&mut buf, 8, u64::MAX - 1).unwrap();
        assert_eq!(read_u64(&buf, 8), Ok(u64::MAX - 1));
    }

    #[test]
    fn short_reads_are_errors() {
        let buf = [0u8; 3];
        assert!(matches!(read_u32(&buf, 0), Err(EntError::Truncated { .. })));
        assert!(matches!(read_u8(&buf, 3), Err(EntError::Truncated { .. })));
    }
}
