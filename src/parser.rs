use tracing::{debug, trace, warn};

use crate::attributes::{
    AttributeHeader, CodeAttribute, ConstantValueAttribute, DeprecatedAttribute,
    ExceptionsAttribute, SourceFileAttribute, SyntheticAttribute,
};
use crate::bytes_ext::Cursor;
use crate::classfile::{ClassRecord, FieldRecord, MetaData, MethodRecord};
use crate::config::{ParserConfig, VersionPolicy};
use crate::constants::{attribute, MAGIC, POOL_START};
use crate::error::{DecodeError, DecodeResult};
use crate::flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use crate::pool::ConstantPool;

/// Decodes one class file held in memory.
///
/// The parser borrows the buffer, nothing is copied out of it except the
/// strings and values that end up in the returned [`ClassRecord`].
pub struct Parser<'a> {
    data: &'a [u8],
    config: ParserConfig,
}

// Class level attributes we care about
#[derive(Default)]
struct ClassAttributes {
    source_file: Option<String>,
    synthetic: bool,
    deprecated: bool,
}

impl<'a> Parser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, ParserConfig::default())
    }

    pub fn with_config(data: &'a [u8], config: ParserConfig) -> Self {
        Self { data, config }
    }

    /// Check the header and index the constant pool, without walking any further.
    pub fn index_pool(&self) -> DecodeResult<ConstantPool<'a>> {
        let meta_data = self.read_header()?;
        let mut cursor = Cursor::at(self.data, POOL_START - 2);
        let count = cursor.try_get_u16()?;

        debug!(
            "class file version {}.{}, {} constant pool slots",
            meta_data.major_version, meta_data.minor_version, count
        );

        ConstantPool::index(self.data, count)
    }

    pub fn parse(&self) -> DecodeResult<ClassRecord> {
        let pool = self.index_pool()?;
        self.walk(&pool)
    }

    fn read_header(&self) -> DecodeResult<MetaData> {
        let mut cursor = Cursor::new(self.data);
        let magic = cursor.try_get_u32()?;

        // Format checking: The first four bytes must contain the right magic number
        if magic != MAGIC {
            return Err(DecodeError::BadMagic { found: magic });
        }

        let minor = cursor.try_get_u16()?;
        let major = cursor.try_get_u16()?;

        if !self.config.accepts_version(major, minor) {
            match self.config.version_policy {
                VersionPolicy::Reject => {
                    return Err(DecodeError::UnsupportedVersion { major, minor })
                }
                VersionPolicy::Warn => {
                    warn!("decoding unsupported class file version {}.{}", major, minor)
                }
            }
        }

        Ok(MetaData {
            minor_version: minor,
            major_version: major,
        })
    }

    /// Walk everything after the constant pool, resolving references through `pool`.
    ///
    /// `pool` must come from [`Parser::index_pool`] over the same buffer.
    pub fn walk(&self, pool: &ConstantPool<'a>) -> DecodeResult<ClassRecord> {
        debug_assert!(
            pool.is_over(self.data),
            "constant pool was indexed over a different buffer"
        );

        let mut cursor = Cursor::at(self.data, pool.end());

        let access_flags = ClassAccessFlags::from_raw(cursor.try_get_u16()?);
        let name = pool.resolve_class_name(cursor.try_get_u16()?)?;
        let super_name = pool.resolve_optional_class_name(cursor.try_get_u16()?)?;

        debug!("walking class '{}'", name);

        let interfaces = self.parse_interfaces(&mut cursor, pool)?;
        let fields = self.parse_fields(&mut cursor, pool)?;
        let methods = self.parse_methods(&mut cursor, pool)?;
        let attributes = self.parse_class_attributes(&mut cursor, pool)?;

        // Format checking: The class file must not be truncated or have extra bytes at the end
        if !cursor.is_empty() {
            if !self.config.allow_trailing_bytes {
                return Err(DecodeError::TrailingBytes {
                    offset: cursor.position(),
                    count: cursor.remaining(),
                });
            }

            warn!(
                "ignoring {} trailing bytes after class '{}'",
                cursor.remaining(),
                name
            );
        }

        // the header was checked when the pool was indexed
        let mut header = Cursor::at(self.data, 4);
        let meta_data = MetaData {
            minor_version: header.try_get_u16()?,
            major_version: header.try_get_u16()?,
        };

        Ok(ClassRecord {
            meta_data,
            constant_pool: pool.snapshot()?,
            access_flags,
            name,
            super_name,
            interfaces,
            fields,
            methods,
            source_file: attributes.source_file,
            synthetic: attributes.synthetic,
            deprecated: attributes.deprecated,
        })
    }

    fn parse_interfaces(
        &self,
        cursor: &mut Cursor<'a>,
        pool: &ConstantPool<'a>,
    ) -> DecodeResult<Vec<String>> {
        let length = cursor.try_get_u16()?;
        let mut interfaces = Vec::with_capacity(length.into());

        for _ in 0..length {
            interfaces.push(pool.resolve_class_name(cursor.try_get_u16()?)?);
        }

        Ok(interfaces)
    }

    fn parse_fields(
        &self,
        cursor: &mut Cursor<'a>,
        pool: &ConstantPool<'a>,
    ) -> DecodeResult<Vec<FieldRecord>> {
        let length = cursor.try_get_u16()?;
        let mut fields = Vec::with_capacity(length.into());

        for _ in 0..length {
            let mut field = FieldRecord {
                access_flags: FieldAccessFlags::from_raw(cursor.try_get_u16()?),
                name: pool.resolve_utf8(cursor.try_get_u16()?)?,
                descriptor: pool.resolve_utf8(cursor.try_get_u16()?)?,
                synthetic: false,
                deprecated: false,
                constant_value: None,
            };

            trace!("parsing field {} {}", field.name, field.descriptor);

            let attribute_count = cursor.try_get_u16()?;
            for _ in 0..attribute_count {
                let header = AttributeHeader::read(cursor, pool)?;

                match header.name.as_str() {
                    attribute::SYNTHETIC => {
                        header.decode::<SyntheticAttribute>(self.data, pool)?;
                        field.synthetic = true;
                    }
                    attribute::DEPRECATED => {
                        header.decode::<DeprecatedAttribute>(self.data, pool)?;
                        field.deprecated = true;
                    }
                    attribute::CONSTANT_VALUE => {
                        let attr = header.decode::<ConstantValueAttribute>(self.data, pool)?;
                        field.constant_value = Some(attr.value);
                    }
                    _ => skipped(&header),
                }
            }

            fields.push(field);
        }

        Ok(fields)
    }

    fn parse_methods(
        &self,
        cursor: &mut Cursor<'a>,
        pool: &ConstantPool<'a>,
    ) -> DecodeResult<Vec<MethodRecord>> {
        let length = cursor.try_get_u16()?;
        let mut methods = Vec::with_capacity(length.into());

        for _ in 0..length {
            let mut method = MethodRecord {
                access_flags: MethodAccessFlags::from_raw(cursor.try_get_u16()?),
                name: pool.resolve_utf8(cursor.try_get_u16()?)?,
                descriptor: pool.resolve_utf8(cursor.try_get_u16()?)?,
                synthetic: false,
                deprecated: false,
                max_stack: 0,
                max_locals: 0,
                code_offset: None,
                exceptions: vec![],
                instructions: None,
                exception_handlers: vec![],
            };

            trace!("parsing method {}{}", method.name, method.descriptor);

            let attribute_count = cursor.try_get_u16()?;
            for _ in 0..attribute_count {
                let header = AttributeHeader::read(cursor, pool)?;

                match header.name.as_str() {
                    attribute::CODE => {
                        let code = header.decode::<CodeAttribute>(self.data, pool)?;
                        method.max_stack = code.max_stack;
                        method.max_locals = code.max_locals;
                        method.code_offset = Some(code.code_offset);
                        method.instructions = Some(code.instructions);
                        method.exception_handlers = code.exception_handlers;
                    }
                    attribute::EXCEPTIONS => {
                        let attr = header.decode::<ExceptionsAttribute>(self.data, pool)?;
                        method.exceptions = attr.exceptions;
                    }
                    attribute::SYNTHETIC => {
                        header.decode::<SyntheticAttribute>(self.data, pool)?;
                        method.synthetic = true;
                    }
                    attribute::DEPRECATED => {
                        header.decode::<DeprecatedAttribute>(self.data, pool)?;
                        method.deprecated = true;
                    }
                    _ => skipped(&header),
                }
            }

            methods.push(method);
        }

        Ok(methods)
    }

    fn parse_class_attributes(
        &self,
        cursor: &mut Cursor<'a>,
        pool: &ConstantPool<'a>,
    ) -> DecodeResult<ClassAttributes> {
        let mut attributes = ClassAttributes::default();

        let length = cursor.try_get_u16()?;
        for _ in 0..length {
            let header = AttributeHeader::read(cursor, pool)?;

            match header.name.as_str() {
                attribute::SOURCE_FILE => {
                    let attr = header.decode::<SourceFileAttribute>(self.data, pool)?;
                    attributes.source_file = Some(attr.source_file);
                }
                attribute::SYNTHETIC => {
                    header.decode::<SyntheticAttribute>(self.data, pool)?;
                    attributes.synthetic = true;
                }
                attribute::DEPRECATED => {
                    header.decode::<DeprecatedAttribute>(self.data, pool)?;
                    attributes.deprecated = true;
                }
                _ => skipped(&header),
            }
        }

        Ok(attributes)
    }
}

fn skipped(header: &AttributeHeader) {
    debug!(
        "skipping attribute '{}' ({} bytes) at offset {}",
        header.name, header.length, header.offset
    );
}
