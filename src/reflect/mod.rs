//! String-encoded interface metadata.
//!
//! A reflection string is a compact, printable encoding of one interface:
//! its qualified name, base interfaces, and every operation, attribute
//! accessor, constructor, and constant it declares. The encoding is
//! produced by an external compiler and consumed verbatim; names are
//! length-prefixed (`3foo`), types are single tag characters with optional
//! suffixes, and a whole declaration can be skipped without understanding
//! it, so lookups are linear scans with no allocation.
//!
//! ```text
//! interface  -> I name extends* implements* decl*
//! decl       -> operation | getter | setter | constructor | constant
//! operation  -> F special* count type name (type name)* raises*
//! getter     -> G special* 0 type name raises*
//! setter     -> S special* 1 v name type raises*
//! constructor-> N count type name (type name)* raises*
//! constant   -> C type name value ' '
//! raises     -> R name
//! ```
//!
//! All accessors return `Result`: a truncated or corrupted string surfaces
//! as a [`ReflectError`] instead of a wild read, no matter where in the
//! string the damage is.

mod cursor;
mod error;
pub mod escape;

pub use error::ReflectError;

use cursor::Cursor;

/// Tag characters of the metadata grammar.
pub mod tag {
    // Types.
    pub const VOID: u8 = b'v';
    pub const BOOLEAN: u8 = b'b';
    pub const BYTE: u8 = b'g';
    pub const OCTET: u8 = b'h';
    pub const SHORT: u8 = b's';
    pub const UNSIGNED_SHORT: u8 = b't';
    pub const LONG: u8 = b'l';
    pub const UNSIGNED_LONG: u8 = b'm';
    pub const LONG_LONG: u8 = b'x';
    pub const UNSIGNED_LONG_LONG: u8 = b'y';
    pub const FLOAT: u8 = b'f';
    pub const DOUBLE: u8 = b'd';
    pub const STRING: u8 = b'D';
    pub const ANY: u8 = b'A';
    pub const OBJECT: u8 = b'O';
    pub const SEQUENCE: u8 = b'Q';
    pub const ARRAY: u8 = b'Y';
    pub const DATE: u8 = b'T';
    pub const POINTER: u8 = b'p';
    pub const NULLABLE: u8 = b'?';

    // Declarations.
    pub const INTERFACE: u8 = b'I';
    pub const EXTENDS: u8 = b'X';
    pub const IMPLEMENTS: u8 = b'M';
    pub const CONSTANT: u8 = b'C';
    pub const OPERATION: u8 = b'F';
    pub const GETTER: u8 = b'G';
    pub const SETTER: u8 = b'S';
    pub const CONSTRUCTOR: u8 = b'N';
    pub const EXCEPTION: u8 = b'E';
    pub const RAISES: u8 = b'R';

    // Special operation markers.
    pub const SPECIAL_GETTER: u8 = b'g';
    pub const SPECIAL_SETTER: u8 = b's';
    pub const SPECIAL_CREATOR: u8 = b'c';
    pub const SPECIAL_DELETER: u8 = b'd';
    pub const SPECIAL_CALLER: u8 = b'f';
    pub const SPECIAL_STRINGIFIER: u8 = b't';
    pub const SPECIAL_OMITTABLE: u8 = b'o';
    pub const VARIADIC: u8 = b'V';
}

/// One encoded type, borrowed from its enclosing metadata string.
#[derive(Clone, Copy, Debug)]
pub struct Type<'a> {
    info: &'a str,
}

impl<'a> Type<'a> {
    pub fn new(info: &'a str) -> Self {
        Self { info }
    }

    /// The leading tag character.
    pub fn tag(&self) -> Result<u8, ReflectError> {
        self.info
            .as_bytes()
            .first()
            .copied()
            .ok_or(ReflectError::UnexpectedEnd { offset: 0 })
    }

    fn tag_is(&self, tag: u8) -> bool {
        self.info.as_bytes().first() == Some(&tag)
    }

    pub fn is_void(&self) -> bool {
        self.tag_is(tag::VOID)
    }

    pub fn is_boolean(&self) -> bool {
        self.tag_is(tag::BOOLEAN)
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self.info.as_bytes().first(),
            Some(
                &tag::BYTE
                    | &tag::OCTET
                    | &tag::SHORT
                    | &tag::UNSIGNED_SHORT
                    | &tag::LONG
                    | &tag::UNSIGNED_LONG
                    | &tag::LONG_LONG
                    | &tag::UNSIGNED_LONG_LONG
            )
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(
            self.info.as_bytes().first(),
            Some(&tag::FLOAT | &tag::DOUBLE)
        )
    }

    pub fn is_string(&self) -> bool {
        self.tag_is(tag::STRING)
    }

    pub fn is_any(&self) -> bool {
        self.tag_is(tag::ANY)
    }

    pub fn is_object(&self) -> bool {
        self.tag_is(tag::OBJECT)
    }

    pub fn is_sequence(&self) -> bool {
        self.tag_is(tag::SEQUENCE)
    }

    pub fn is_array(&self) -> bool {
        self.tag_is(tag::ARRAY)
    }

    pub fn is_date(&self) -> bool {
        self.tag_is(tag::DATE)
    }

    pub fn is_interface(&self) -> bool {
        self.tag_is(tag::INTERFACE)
    }

    pub fn is_exception(&self) -> bool {
        self.tag_is(tag::EXCEPTION)
    }

    /// True when a primitive or string type carries the `?` marker.
    pub fn is_nullable(&self) -> bool {
        let bytes = self.info.as_bytes();
        let nullable_capable = matches!(
            bytes.first(),
            Some(
                &tag::BOOLEAN
                    | &tag::BYTE
                    | &tag::OCTET
                    | &tag::SHORT
                    | &tag::UNSIGNED_SHORT
                    | &tag::LONG
                    | &tag::UNSIGNED_LONG
                    | &tag::LONG_LONG
                    | &tag::UNSIGNED_LONG_LONG
                    | &tag::FLOAT
                    | &tag::DOUBLE
                    | &tag::STRING
            )
        );
        nullable_capable && bytes.get(1) == Some(&tag::NULLABLE)
    }

    /// In-memory size of a value of this type. Strings, any, and dates
    /// have no fixed size and report zero; unbounded sequences likewise.
    pub fn byte_size(&self) -> Result<usize, ReflectError> {
        Ok(match self.tag()? {
            tag::VOID => 0,
            tag::BOOLEAN | tag::BYTE | tag::OCTET => 1,
            tag::SHORT | tag::UNSIGNED_SHORT => 2,
            tag::LONG | tag::UNSIGNED_LONG | tag::FLOAT => 4,
            tag::LONG_LONG | tag::UNSIGNED_LONG_LONG | tag::DOUBLE => 8,
            tag::POINTER | tag::OBJECT => std::mem::size_of::<*const ()>(),
            tag::ARRAY => {
                let array = ArrayType { info: self.info };
                array.element_type()?.byte_size()? * array.rank()? as usize
            }
            tag::SEQUENCE => {
                let sequence = SequenceType { info: self.info };
                sequence.element_type()?.byte_size()? * sequence.max()? as usize
            }
            _ => 0,
        })
    }

    /// The qualified interface name of an object type, or the empty string
    /// for any other type.
    pub fn qualified_name(&self) -> Result<&'a str, ReflectError> {
        if !self.is_object() {
            return Ok("");
        }
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.read_name()
    }

    pub fn as_sequence(&self) -> Option<SequenceType<'a>> {
        self.is_sequence().then_some(SequenceType { info: self.info })
    }

    pub fn as_array(&self) -> Option<ArrayType<'a>> {
        self.is_array().then_some(ArrayType { info: self.info })
    }
}

/// A `Q [max] type` sequence type.
#[derive(Clone, Copy, Debug)]
pub struct SequenceType<'a> {
    info: &'a str,
}

impl<'a> SequenceType<'a> {
    pub fn element_type(&self) -> Result<Type<'a>, ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.read_digits()?;
        Ok(Type::new(cursor.rest()))
    }

    /// Declared maximum element count; zero for a variable-length sequence.
    pub fn max(&self) -> Result<u32, ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.read_digits()
    }
}

/// A `Y [rank] type` array type.
#[derive(Clone, Copy, Debug)]
pub struct ArrayType<'a> {
    info: &'a str,
}

impl<'a> ArrayType<'a> {
    pub fn element_type(&self) -> Result<Type<'a>, ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.read_digits()?;
        Ok(Type::new(cursor.rest()))
    }

    pub fn rank(&self) -> Result<u32, ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.read_digits()
    }
}

/// One `type name` parameter of a method.
#[derive(Clone, Copy, Debug)]
pub struct Parameter<'a> {
    info: &'a str,
}

impl<'a> Parameter<'a> {
    pub fn type_of(&self) -> Type<'a> {
        Type::new(self.info)
    }

    /// The parameter name; empty for a setter's unnamed value parameter.
    pub fn name(&self) -> Result<&'a str, ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.skip_type()?;
        cursor.read_name()
    }
}

/// Iterator over the parameters of a [`Method`]. Yields exactly the
/// declared parameter count, or an error once if the string is truncated.
pub struct Parameters<'a> {
    cursor: Cursor<'a>,
    remaining: u32,
}

impl<'a> Iterator for Parameters<'a> {
    type Item = Result<Parameter<'a>, ReflectError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let parameter = Parameter {
            info: self.cursor.rest(),
        };
        let advanced = self
            .cursor
            .skip_type()
            .and_then(|()| self.cursor.skip_name());
        match advanced {
            Ok(()) => Some(Ok(parameter)),
            Err(err) => {
                self.remaining = 0;
                Some(Err(err))
            }
        }
    }
}

/// Iterator over the `R name` raises clauses of a [`Method`].
pub struct Raises<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Iterator for Raises<'a> {
    type Item = Result<&'a str, ReflectError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.peek() != Some(tag::RAISES) {
            return None;
        }
        let advanced = self.cursor.bump().and_then(|_| self.cursor.read_name());
        if advanced.is_err() {
            // Poison the cursor so the error is yielded once.
            self.cursor = Cursor::new("");
        }
        Some(advanced)
    }
}

/// An operation, accessor, or constructor declaration.
#[derive(Clone, Copy, Debug)]
pub struct Method<'a> {
    info: &'a str,
}

impl<'a> Method<'a> {
    /// Wrap a metadata string starting at a method declaration.
    pub fn new(info: &'a str) -> Result<Self, ReflectError> {
        match info.as_bytes().first() {
            Some(&tag::OPERATION | &tag::GETTER | &tag::SETTER | &tag::CONSTRUCTOR) => {
                Ok(Self { info })
            }
            Some(&other) => Err(ReflectError::UnexpectedDecl {
                expected: "method",
                got: other as char,
            }),
            None => Err(ReflectError::UnexpectedEnd { offset: 0 }),
        }
    }

    fn decl_tag(&self) -> u8 {
        // Validated by `new`.
        self.info.as_bytes().first().copied().unwrap_or(0)
    }

    pub fn is_operation(&self) -> bool {
        self.decl_tag() == tag::OPERATION
    }

    pub fn is_getter(&self) -> bool {
        self.decl_tag() == tag::GETTER
    }

    pub fn is_setter(&self) -> bool {
        self.decl_tag() == tag::SETTER
    }

    pub fn is_constructor(&self) -> bool {
        self.decl_tag() == tag::CONSTRUCTOR
    }

    /// The special markers between the declaration tag and the parameter
    /// count.
    pub fn specials(&self) -> &'a str {
        let bytes = self.info.as_bytes();
        let mut end = 1;
        while let Some(byte) = bytes.get(end) {
            if byte.is_ascii_digit() {
                break;
            }
            end += 1;
        }
        self.info.get(1..end).unwrap_or("")
    }

    pub fn has_special(&self, special: u8) -> bool {
        self.specials().as_bytes().contains(&special)
    }

    pub fn is_special_getter(&self) -> bool {
        self.has_special(tag::SPECIAL_GETTER)
    }

    pub fn is_special_setter(&self) -> bool {
        self.has_special(tag::SPECIAL_SETTER)
    }

    pub fn is_special_creator(&self) -> bool {
        self.has_special(tag::SPECIAL_CREATOR)
    }

    pub fn is_special_deleter(&self) -> bool {
        self.has_special(tag::SPECIAL_DELETER)
    }

    pub fn is_special_caller(&self) -> bool {
        self.has_special(tag::SPECIAL_CALLER)
    }

    pub fn is_special_stringifier(&self) -> bool {
        self.has_special(tag::SPECIAL_STRINGIFIER)
    }

    pub fn is_special_omittable(&self) -> bool {
        self.has_special(tag::SPECIAL_OMITTABLE)
    }

    /// True when the last parameter repeats.
    pub fn is_variadic(&self) -> bool {
        self.has_special(tag::VARIADIC)
    }

    fn after_count(&self) -> Result<(Cursor<'a>, u32), ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.skip_specials();
        let count = cursor.read_digits()?;
        Ok((cursor, count))
    }

    pub fn parameter_count(&self) -> Result<u32, ReflectError> {
        Ok(self.after_count()?.1)
    }

    pub fn return_type(&self) -> Result<Type<'a>, ReflectError> {
        let (cursor, _) = self.after_count()?;
        Ok(Type::new(cursor.rest()))
    }

    pub fn name(&self) -> Result<&'a str, ReflectError> {
        let (mut cursor, _) = self.after_count()?;
        cursor.skip_type()?;
        cursor.read_name()
    }

    pub fn parameters(&self) -> Result<Parameters<'a>, ReflectError> {
        let (mut cursor, count) = self.after_count()?;
        cursor.skip_type()?;
        cursor.skip_name()?;
        Ok(Parameters {
            cursor,
            remaining: count,
        })
    }

    pub fn raises(&self) -> Result<Raises<'a>, ReflectError> {
        let (mut cursor, count) = self.after_count()?;
        // The return type and name read as the first pair; setters rely on
        // the empty-name case for their unnamed value parameter.
        for _ in 0..=count {
            cursor.skip_type()?;
            cursor.skip_name()?;
        }
        Ok(Raises { cursor })
    }

    /// Advance a cursor past one whole method declaration.
    fn skip(cursor: &mut Cursor<'a>) -> Result<(), ReflectError> {
        cursor.bump()?;
        cursor.skip_specials();
        let count = cursor.read_digits()?;
        for _ in 0..=count {
            cursor.skip_type()?;
            cursor.skip_name()?;
        }
        while cursor.peek() == Some(tag::RAISES) {
            cursor.bump()?;
            cursor.skip_name()?;
        }
        Ok(())
    }
}

/// A `C type name value ' '` constant declaration.
#[derive(Clone, Copy, Debug)]
pub struct Constant<'a> {
    info: &'a str,
}

impl<'a> Constant<'a> {
    pub fn new(info: &'a str) -> Result<Self, ReflectError> {
        match info.as_bytes().first() {
            Some(&tag::CONSTANT) => Ok(Self { info }),
            Some(&other) => Err(ReflectError::UnexpectedDecl {
                expected: "constant",
                got: other as char,
            }),
            None => Err(ReflectError::UnexpectedEnd { offset: 0 }),
        }
    }

    pub fn type_of(&self) -> Type<'a> {
        Type::new(self.info.get(1..).unwrap_or(""))
    }

    pub fn name(&self) -> Result<&'a str, ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.skip_type()?;
        cursor.read_name()
    }

    fn value_region(&self) -> Result<(&'a str, usize), ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.skip_type()?;
        cursor.skip_name()?;
        Ok((cursor.rest(), cursor.pos()))
    }

    /// The numeric value, parsed as the longest number prefix of the value
    /// region, the way `strtod` reads it.
    pub fn value(&self) -> Result<f64, ReflectError> {
        let (region, offset) = self.value_region()?;
        parse_number_prefix(region).ok_or(ReflectError::BadNumber { offset })
    }

    /// The decoded text of a string constant.
    pub fn string_value(&self) -> Result<String, ReflectError> {
        let (region, offset) = self.value_region()?;
        let end = region
            .find(' ')
            .ok_or(ReflectError::UnterminatedConstant { offset })?;
        let encoded = region
            .get(..end)
            .ok_or(ReflectError::UnterminatedConstant { offset })?;
        escape::unescape(encoded)
    }

    /// Advance a cursor past one whole constant declaration, including the
    /// terminating space.
    fn skip(cursor: &mut Cursor<'a>) -> Result<(), ReflectError> {
        cursor.bump()?;
        cursor.skip_type()?;
        cursor.skip_past_space()
    }
}

fn parse_number_prefix(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let mut has_mantissa = false;
    while matches!(bytes.get(end), Some(b'0'..=b'9')) {
        end += 1;
        has_mantissa = true;
    }
    if bytes.get(end) == Some(&b'.') {
        end += 1;
        while matches!(bytes.get(end), Some(b'0'..=b'9')) {
            end += 1;
            has_mantissa = true;
        }
    }
    if !has_mantissa {
        return None;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        if matches!(bytes.get(exp), Some(b'0'..=b'9')) {
            while matches!(bytes.get(exp), Some(b'0'..=b'9')) {
                exp += 1;
            }
            end = exp;
        }
    }
    s.get(..end)?.parse().ok()
}

/// A whole interface or exception declaration.
///
/// Construction walks the string once to count declarations; the indexed
/// accessors re-scan from the start, trading lookup speed for zero
/// allocation, the same bargain the encoding itself makes.
#[derive(Clone, Debug)]
pub struct Interface<'a> {
    info: &'a str,
    method_count: u32,
    constant_count: u32,
    constructor_count: u32,
    inherited_method_count: u32,
}

impl<'a> Interface<'a> {
    pub fn parse(info: &'a str) -> Result<Self, ReflectError> {
        let mut cursor = Cursor::new(info);
        match cursor.bump()? {
            tag::INTERFACE | tag::EXCEPTION => {}
            other => {
                return Err(ReflectError::UnexpectedDecl {
                    expected: "interface",
                    got: other as char,
                });
            }
        }
        cursor.skip_name()?;
        while matches!(cursor.peek(), Some(tag::EXTENDS | tag::IMPLEMENTS)) {
            cursor.bump()?;
            cursor.skip_name()?;
        }

        let mut method_count = 0;
        let mut constant_count = 0;
        let mut constructor_count = 0;
        while let Some(decl) = cursor.peek() {
            match decl {
                tag::CONSTANT => {
                    Constant::skip(&mut cursor)?;
                    constant_count += 1;
                }
                tag::OPERATION | tag::GETTER | tag::SETTER => {
                    Method::skip(&mut cursor)?;
                    method_count += 1;
                }
                tag::CONSTRUCTOR => {
                    Method::skip(&mut cursor)?;
                    constructor_count += 1;
                }
                // An unrecognized tag ends the declaration run; whatever
                // follows belongs to the next top-level declaration.
                _ => break,
            }
        }

        Ok(Self {
            info,
            method_count,
            constant_count,
            constructor_count,
            inherited_method_count: 0,
        })
    }

    pub fn is_exception(&self) -> bool {
        self.info.as_bytes().first() == Some(&tag::EXCEPTION)
    }

    /// The unqualified interface name.
    pub fn name(&self) -> Result<&'a str, ReflectError> {
        let qualified = self.qualified_name()?;
        Ok(match qualified.rfind(':') {
            Some(pos) => qualified.get(pos + 1..).unwrap_or(""),
            None => qualified,
        })
    }

    pub fn qualified_name(&self) -> Result<&'a str, ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.read_name()
    }

    /// The qualified name up to and including the last `:`, or the empty
    /// string for an unscoped interface.
    pub fn qualified_module_name(&self) -> Result<&'a str, ReflectError> {
        let qualified = self.qualified_name()?;
        Ok(match qualified.rfind(':') {
            Some(pos) => qualified.get(..=pos).unwrap_or(""),
            None => "",
        })
    }

    /// The qualified name of the base interface, when one is declared.
    pub fn qualified_super_name(&self) -> Result<Option<&'a str>, ReflectError> {
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.skip_name()?;
        if cursor.peek() != Some(tag::EXTENDS) {
            return Ok(None);
        }
        cursor.bump()?;
        cursor.read_name().map(Some)
    }

    /// Methods declared by this interface, constructors excluded.
    pub fn method_count(&self) -> u32 {
        self.method_count
    }

    pub fn constant_count(&self) -> u32 {
        self.constant_count
    }

    pub fn constructor_count(&self) -> u32 {
        self.constructor_count
    }

    /// Methods contributed by base interfaces, maintained by the consumer
    /// while it walks the inheritance chain.
    pub fn inherited_method_count(&self) -> u32 {
        self.inherited_method_count
    }

    pub fn set_inherited_method_count(&mut self, count: u32) {
        self.inherited_method_count = count;
    }

    pub fn method(&self, n: u32) -> Result<Method<'a>, ReflectError> {
        self.nth_decl(n, self.method_count, |decl| {
            matches!(decl, tag::OPERATION | tag::GETTER | tag::SETTER)
        })
        .and_then(Method::new)
    }

    pub fn constructor(&self, n: u32) -> Result<Method<'a>, ReflectError> {
        self.nth_decl(n, self.constructor_count, |decl| decl == tag::CONSTRUCTOR)
            .and_then(Method::new)
    }

    pub fn constant(&self, n: u32) -> Result<Constant<'a>, ReflectError> {
        self.nth_decl(n, self.constant_count, |decl| decl == tag::CONSTANT)
            .and_then(Constant::new)
    }

    fn nth_decl(
        &self,
        n: u32,
        count: u32,
        matches_kind: impl Fn(u8) -> bool,
    ) -> Result<&'a str, ReflectError> {
        if n >= count {
            return Err(ReflectError::IndexOutOfRange { index: n, count });
        }
        let mut cursor = Cursor::new(self.info);
        cursor.bump()?;
        cursor.skip_name()?;
        while matches!(cursor.peek(), Some(tag::EXTENDS | tag::IMPLEMENTS)) {
            cursor.bump()?;
            cursor.skip_name()?;
        }
        let mut seen = 0;
        while let Some(decl) = cursor.peek() {
            if matches_kind(decl) {
                if seen == n {
                    return Ok(cursor.rest());
                }
                seen += 1;
            }
            match decl {
                tag::CONSTANT => Constant::skip(&mut cursor)?,
                tag::OPERATION | tag::GETTER | tag::SETTER | tag::CONSTRUCTOR => {
                    Method::skip(&mut cursor)?;
                }
                _ => break,
            }
        }
        Err(ReflectError::IndexOutOfRange { index: n, count })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn operation_without_parameters() {
        let method = Method::new("F0v3foo").unwrap();
        assert!(method.is_operation());
        assert_eq!(method.name().unwrap(), "foo");
        assert!(method.return_type().unwrap().is_void());
        assert_eq!(method.parameter_count().unwrap(), 0);
        assert_eq!(method.parameters().unwrap().count(), 0);
    }

    #[test]
    fn operation_returning_object() {
        let method = Method::new("F0O3Foo3bar").unwrap();
        assert_eq!(method.name().unwrap(), "bar");
        let ret = method.return_type().unwrap();
        assert!(ret.is_object());
        assert_eq!(ret.qualified_name().unwrap(), "Foo");
    }

    #[test]
    fn operation_with_two_parameters() {
        let method = Method::new("F2v3bazb2hif5there").unwrap();
        assert_eq!(method.name().unwrap(), "baz");
        let params: Vec<_> = method
            .parameters()
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(params.len(), 2);
        assert!(params[0].type_of().is_boolean());
        assert_eq!(params[0].name().unwrap(), "hi");
        assert!(params[1].type_of().is_float());
        assert_eq!(params[1].name().unwrap(), "there");
    }

    #[test]
    fn special_getter_with_any_return() {
        let method = Method::new("Fg1A10getByIndexm5index").unwrap();
        assert!(method.is_operation());
        assert!(method.is_special_getter());
        assert!(!method.is_variadic());
        assert_eq!(method.name().unwrap(), "getByIndex");
        assert!(method.return_type().unwrap().is_any());
        assert_eq!(method.parameter_count().unwrap(), 1);
        let param = method.parameters().unwrap().next().unwrap().unwrap();
        assert_eq!(param.type_of().tag().unwrap(), tag::UNSIGNED_LONG);
        assert!(param.type_of().is_integer());
        assert_eq!(param.name().unwrap(), "index");
    }

    #[test]
    fn short_constant() {
        let constant = Constant::new("Cs1A-2 ").unwrap();
        assert_eq!(constant.type_of().tag().unwrap(), tag::SHORT);
        assert_eq!(constant.name().unwrap(), "A");
        assert_eq!(constant.value().unwrap(), -2.0);
    }

    #[test]
    fn double_constant() {
        let constant = Constant::new("Cd2PI3.14159265358979 ").unwrap();
        assert_eq!(constant.name().unwrap(), "PI");
        assert_eq!(constant.value().unwrap(), 3.14159265358979);
    }

    #[test]
    fn string_constant_decodes_escapes() {
        let constant = Constant::new(r"CD4NAMEhi\x20there ").unwrap();
        assert_eq!(constant.string_value().unwrap(), "hi there");
    }

    #[test]
    fn interface_counts_and_lookup() {
        let info = concat!("I1Y", "X1X", "F0v1x", "F0v1y", "Cs1K-2 ", "N0v14createInstance");
        let interface = Interface::parse(info).unwrap();
        assert_eq!(interface.qualified_name().unwrap(), "Y");
        assert_eq!(interface.name().unwrap(), "Y");
        assert_eq!(interface.qualified_super_name().unwrap(), Some("X"));
        assert_eq!(interface.method_count(), 2);
        assert_eq!(interface.constant_count(), 1);
        assert_eq!(interface.constructor_count(), 1);

        assert_eq!(interface.method(0).unwrap().name().unwrap(), "x");
        assert_eq!(interface.method(1).unwrap().name().unwrap(), "y");
        assert_eq!(interface.constant(0).unwrap().name().unwrap(), "K");
        assert_eq!(
            interface.constructor(0).unwrap().name().unwrap(),
            "createInstance"
        );
        assert!(matches!(
            interface.method(2),
            Err(ReflectError::IndexOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn qualified_names_split_on_colons() {
        let interface = Interface::parse("I8::es::UpF0v3foo").unwrap();
        assert_eq!(interface.qualified_name().unwrap(), "::es::Up");
        assert_eq!(interface.name().unwrap(), "Up");
        assert_eq!(interface.qualified_module_name().unwrap(), "::es::");
    }

    #[test]
    fn truncated_method_is_an_error() {
        let interface = Interface::parse("I3FooF1v3ba");
        assert!(interface.is_err());
    }

    #[test]
    fn nested_sequence_type() {
        let ty = Type::new("Q8D");
        let seq = ty.as_sequence().unwrap();
        assert_eq!(seq.max().unwrap(), 8);
        assert!(seq.element_type().unwrap().is_string());
        assert_eq!(ty.byte_size().unwrap(), 0);
    }

    #[test]
    fn nullable_marker() {
        assert!(Type::new("D?").is_nullable());
        assert!(Type::new("l?").is_nullable());
        assert!(!Type::new("l").is_nullable());
        assert!(!Type::new("A").is_nullable());
    }

    #[test]
    fn setter_skips_unnamed_value_parameter() {
        let info = concat!("I1Z", "S1v3setD");
        let interface = Interface::parse(info).unwrap();
        assert_eq!(interface.method_count(), 1);
        let setter = interface.method(0).unwrap();
        assert!(setter.is_setter());
        assert_eq!(setter.name().unwrap(), "set");
        let param = setter.parameters().unwrap().next().unwrap().unwrap();
        assert!(param.type_of().is_string());
        assert_eq!(param.name().unwrap(), "");
    }
}
