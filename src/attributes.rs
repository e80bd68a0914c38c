use tracing::trace;

use crate::bytecode::{self, Instruction};
use crate::bytes_ext::Cursor;
use crate::classfile::{ConstantValue, ExceptionHandler};
use crate::constants::{attribute, ATTRIBUTE_HEADER_SIZE};
use crate::error::{DecodeError, DecodeResult};
use crate::pool::{ConstantPool, PoolEntry};

/// The framing of one attribute: its resolved name and where its payload lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeHeader {
    pub name: String,
    /// Offset of the name index, the first byte of the attribute
    pub offset: usize,
    pub length: u32,
}

impl AttributeHeader {
    /// Read an attribute header and move the cursor past the whole attribute.
    ///
    /// The declared length is trusted to find the end, whether or not the
    /// attribute is understood. The cursor always lands on `offset + 6 + length`.
    pub fn read(cursor: &mut Cursor, pool: &ConstantPool) -> DecodeResult<Self> {
        let offset = cursor.position();
        let name = pool.resolve_utf8(cursor.try_get_u16()?)?;
        let length = cursor.try_get_u32()?;

        cursor.skip(length as usize)?;

        Ok(Self {
            name,
            offset,
            length,
        })
    }

    pub fn payload_start(&self) -> usize {
        self.offset + ATTRIBUTE_HEADER_SIZE
    }

    pub fn end(&self) -> usize {
        self.payload_start() + self.length as usize
    }

    /// Decode the payload as a known attribute, checking that its contents
    /// account for exactly the declared length.
    pub fn decode<'a, T>(&self, data: &'a [u8], pool: &ConstantPool<'a>) -> DecodeResult<T>
    where
        T: KnownAttribute,
    {
        let end = self.end();
        let payload = data.get(..end).ok_or(DecodeError::TruncatedInput {
            offset: self.payload_start(),
            needed: self.length as usize,
            remaining: data.len().saturating_sub(self.payload_start()),
        })?;

        let mut cursor = Cursor::at(payload, self.payload_start());
        let value = T::decode(&mut cursor, pool).map_err(|err| match err {
            DecodeError::TruncatedInput { .. } => DecodeError::attribute(
                &self.name,
                self.offset,
                format!("declared length {} is too short for its contents", self.length),
            ),
            other => other,
        })?;

        if cursor.position() != end {
            return Err(DecodeError::attribute(
                &self.name,
                self.offset,
                format!(
                    "declared length {} but contents end after {} bytes",
                    self.length,
                    cursor.position() - self.payload_start()
                ),
            ));
        }

        Ok(value)
    }
}

pub trait KnownAttribute
where
    Self: Sized,
{
    fn decode(cursor: &mut Cursor, constant_pool: &ConstantPool) -> DecodeResult<Self>;
    fn id() -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    /// Buffer offset of the first code byte
    pub code_offset: usize,
    pub instructions: Vec<Instruction>,
    pub exception_handlers: Vec<ExceptionHandler>,
}

impl KnownAttribute for CodeAttribute {
    fn decode(cursor: &mut Cursor, constant_pool: &ConstantPool) -> DecodeResult<Self> {
        let start = cursor.position();
        let max_stack = cursor.try_get_u16()?;
        let max_locals = cursor.try_get_u16()?;
        let code_length = cursor.try_get_u32()? as usize;

        if code_length == 0 {
            return Err(DecodeError::attribute(
                Self::id(),
                start - ATTRIBUTE_HEADER_SIZE,
                "code length must be greater than zero",
            ));
        }

        let code_start = cursor.position();
        cursor.skip(code_length)?;
        let instructions = bytecode::decode(cursor.data(), code_start, code_length)?;

        let exception_length = cursor.try_get_u16()?;
        let mut exception_handlers = Vec::with_capacity(exception_length.into());
        for _ in 0..exception_length {
            exception_handlers.push(ExceptionHandler {
                start_pc: cursor.try_get_u16()?,
                end_pc: cursor.try_get_u16()?,
                handler_pc: cursor.try_get_u16()?,
                catch_type: constant_pool.resolve_optional_class_name(cursor.try_get_u16()?)?,
            });
        }

        // LineNumberTable, StackMapTable and friends are not modelled
        let attribute_count = cursor.try_get_u16()?;
        for _ in 0..attribute_count {
            let nested = AttributeHeader::read(cursor, constant_pool)?;
            trace!("skipping code attribute '{}' ({} bytes)", nested.name, nested.length);
        }

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code_offset: code_start,
            instructions,
            exception_handlers,
        })
    }

    fn id() -> &'static str {
        attribute::CODE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionsAttribute {
    pub exceptions: Vec<String>,
}

impl KnownAttribute for ExceptionsAttribute {
    fn decode(cursor: &mut Cursor, constant_pool: &ConstantPool) -> DecodeResult<Self> {
        let length = cursor.try_get_u16()?;
        let mut exceptions = Vec::with_capacity(length.into());

        for _ in 0..length {
            exceptions.push(constant_pool.resolve_class_name(cursor.try_get_u16()?)?);
        }

        Ok(ExceptionsAttribute { exceptions })
    }

    fn id() -> &'static str {
        attribute::EXCEPTIONS
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConstantValueAttribute {
    pub value: ConstantValue,
}

impl KnownAttribute for ConstantValueAttribute {
    fn decode(cursor: &mut Cursor, constant_pool: &ConstantPool) -> DecodeResult<Self> {
        let index = cursor.try_get_u16()?;

        let value = match constant_pool.entry(index)? {
            PoolEntry::Integer(v) => ConstantValue::Integer(v),
            PoolEntry::Float(v) => ConstantValue::Float(v),
            PoolEntry::Long(v) => ConstantValue::Long(v),
            PoolEntry::Double(v) => ConstantValue::Double(v),
            PoolEntry::String(utf8) => ConstantValue::String(constant_pool.resolve_utf8(utf8)?),
            other => {
                return Err(DecodeError::pool(
                    index,
                    constant_pool.entry_offset(index)?,
                    format!("{:?} entry cannot be a constant value", other.tag()),
                ))
            }
        };

        Ok(ConstantValueAttribute { value })
    }

    fn id() -> &'static str {
        attribute::CONSTANT_VALUE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileAttribute {
    pub source_file: String,
}

impl KnownAttribute for SourceFileAttribute {
    fn decode(cursor: &mut Cursor, constant_pool: &ConstantPool) -> DecodeResult<Self> {
        Ok(SourceFileAttribute {
            source_file: constant_pool.resolve_utf8(cursor.try_get_u16()?)?,
        })
    }

    fn id() -> &'static str {
        attribute::SOURCE_FILE
    }
}

/// Marker attributes carry no payload, a non-zero length is malformed
macro_rules! marker_attribute {
    ($type: ident, $id: expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $type;

        impl KnownAttribute for $type {
            fn decode(_: &mut Cursor, _: &ConstantPool) -> DecodeResult<Self> {
                Ok($type)
            }

            fn id() -> &'static str {
                $id
            }
        }
    };
}

marker_attribute!(SyntheticAttribute, attribute::SYNTHETIC);
marker_attribute!(DeprecatedAttribute, attribute::DEPRECATED);
