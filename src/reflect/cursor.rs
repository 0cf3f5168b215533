//! Byte cursor over a reflection metadata string.
//!
//! The metadata grammar is designed for single-pass skipping: every
//! construct starts with a tag byte and its extent can be computed without
//! a symbol table. The cursor provides the three primitives everything
//! else is built from, reading a decimal run, reading a length-prefixed
//! name, and skipping one type, each returning an error instead of running
//! past the end of a truncated string.

use super::{ReflectError, tag};

#[derive(Clone)]
pub(crate) struct Cursor<'a> {
    data: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a str) -> Self {
        Self { data, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The unconsumed remainder of the metadata string.
    pub fn rest(&self) -> &'a str {
        self.data.get(self.pos..).unwrap_or("")
    }

    pub fn peek(&self) -> Option<u8> {
        self.data.as_bytes().get(self.pos).copied()
    }

    pub fn bump(&mut self) -> Result<u8, ReflectError> {
        let byte = self
            .peek()
            .ok_or(ReflectError::UnexpectedEnd { offset: self.pos })?;
        self.pos += 1;
        Ok(byte)
    }

    /// Read a run of zero or more decimal digits. A missing run reads as
    /// zero, which the grammar relies on for unbounded sequences and
    /// unnamed setter parameters.
    pub fn read_digits(&mut self) -> Result<u32, ReflectError> {
        let start = self.pos;
        let mut value: u32 = 0;
        while let Some(byte @ b'0'..=b'9') = self.peek() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(u32::from(byte - b'0')))
                .ok_or(ReflectError::NumberOverflow { offset: start })?;
            self.pos += 1;
        }
        Ok(value)
    }

    /// Read a `<decimal-length><bytes>` name.
    pub fn read_name(&mut self) -> Result<&'a str, ReflectError> {
        let length = self.read_digits()?;
        let start = self.pos;
        let end = start
            .checked_add(length as usize)
            .ok_or(ReflectError::NameOutOfRange {
                offset: start,
                length,
            })?;
        let name = self
            .data
            .get(start..end)
            .ok_or(ReflectError::NameOutOfRange {
                offset: start,
                length,
            })?;
        self.pos = end;
        Ok(name)
    }

    pub fn skip_name(&mut self) -> Result<(), ReflectError> {
        self.read_name().map(|_| ())
    }

    /// Consume a trailing `?` nullability marker, if present.
    pub fn skip_nullable(&mut self) {
        if self.peek() == Some(tag::NULLABLE) {
            self.pos += 1;
        }
    }

    /// Skip one encoded type, including any length prefix, element type,
    /// object name, or nullability marker it carries.
    pub fn skip_type(&mut self) -> Result<(), ReflectError> {
        let offset = self.pos;
        match self.bump()? {
            tag::VOID | tag::ANY | tag::POINTER | tag::DATE => Ok(()),
            tag::BOOLEAN
            | tag::BYTE
            | tag::OCTET
            | tag::SHORT
            | tag::UNSIGNED_SHORT
            | tag::LONG
            | tag::UNSIGNED_LONG
            | tag::LONG_LONG
            | tag::UNSIGNED_LONG_LONG
            | tag::FLOAT
            | tag::DOUBLE
            | tag::STRING => {
                self.skip_nullable();
                Ok(())
            }
            tag::SEQUENCE | tag::ARRAY => {
                self.read_digits()?;
                self.skip_type()
            }
            tag::OBJECT => self.skip_name(),
            other => Err(ReflectError::UnknownTypeTag {
                tag: other as char,
                offset,
            }),
        }
    }

    /// Advance just past the next space, the terminator of a constant
    /// value.
    pub fn skip_past_space(&mut self) -> Result<(), ReflectError> {
        let offset = self.pos;
        while let Some(byte) = self.peek() {
            self.pos += 1;
            if byte == b' ' {
                return Ok(());
            }
        }
        Err(ReflectError::UnterminatedConstant { offset })
    }

    /// Skip method special markers: everything up to the parameter-count
    /// digits that must follow them.
    pub fn skip_specials(&mut self) {
        while let Some(byte) = self.peek() {
            if byte.is_ascii_digit() {
                break;
            }
            self.pos += 1;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn read_name_by_length_prefix() {
        let mut cursor = Cursor::new("10getByIndexm5index");
        assert_eq!(cursor.read_name().unwrap(), "getByIndex");
        assert_eq!(cursor.peek(), Some(b'm'));
    }

    #[test]
    fn missing_digits_read_as_zero() {
        let mut cursor = Cursor::new("v");
        assert_eq!(cursor.read_digits().unwrap(), 0);
        assert_eq!(cursor.read_name().unwrap(), "");
    }

    #[test]
    fn name_overrunning_end_is_an_error() {
        let mut cursor = Cursor::new("9abc");
        assert_eq!(
            cursor.read_name(),
            Err(ReflectError::NameOutOfRange {
                offset: 1,
                length: 9
            })
        );
    }

    #[test]
    fn skip_type_handles_nesting() {
        let mut cursor = Cursor::new("Q4O3Foos");
        cursor.skip_type().unwrap();
        assert_eq!(cursor.rest(), "s");
    }

    #[test]
    fn skip_type_consumes_nullable_marker() {
        let mut cursor = Cursor::new("D?x");
        cursor.skip_type().unwrap();
        assert_eq!(cursor.rest(), "x");
    }

    #[test]
    fn unknown_tag_is_an_error() {
        let mut cursor = Cursor::new("Z");
        assert_eq!(
            cursor.skip_type(),
            Err(ReflectError::UnknownTypeTag {
                tag: 'Z',
                offset: 0
            })
        );
    }
}
