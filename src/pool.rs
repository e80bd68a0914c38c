use enum_as_inner::EnumAsInner;
use tracing::trace;

use crate::bytes_ext::Cursor;
use crate::constants::POOL_START;
use crate::encoding::decode_modified_utf8;
use crate::error::{DecodeError, DecodeResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTag {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    Field,
    Method,
    InterfaceMethod,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

impl ConstantTag {
    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            1 => ConstantTag::Utf8,
            3 => ConstantTag::Integer,
            4 => ConstantTag::Float,
            5 => ConstantTag::Long,
            6 => ConstantTag::Double,
            7 => ConstantTag::Class,
            8 => ConstantTag::String,
            9 => ConstantTag::Field,
            10 => ConstantTag::Method,
            11 => ConstantTag::InterfaceMethod,
            12 => ConstantTag::NameAndType,
            15 => ConstantTag::MethodHandle,
            16 => ConstantTag::MethodType,
            17 => ConstantTag::Dynamic,
            18 => ConstantTag::InvokeDynamic,
            19 => ConstantTag::Module,
            20 => ConstantTag::Package,
            _ => return None,
        })
    }

    pub fn tag(&self) -> u8 {
        match self {
            ConstantTag::Utf8 => 1,
            ConstantTag::Integer => 3,
            ConstantTag::Float => 4,
            ConstantTag::Long => 5,
            ConstantTag::Double => 6,
            ConstantTag::Class => 7,
            ConstantTag::String => 8,
            ConstantTag::Field => 9,
            ConstantTag::Method => 10,
            ConstantTag::InterfaceMethod => 11,
            ConstantTag::NameAndType => 12,
            ConstantTag::MethodHandle => 15,
            ConstantTag::MethodType => 16,
            ConstantTag::Dynamic => 17,
            ConstantTag::InvokeDynamic => 18,
            ConstantTag::Module => 19,
            ConstantTag::Package => 20,
        }
    }

    /// Total entry size in bytes, tag included.
    /// None for Utf8, whose size depends on its length prefix.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            ConstantTag::Utf8 => None,
            ConstantTag::Class
            | ConstantTag::String
            | ConstantTag::MethodType
            | ConstantTag::Module
            | ConstantTag::Package => Some(3),
            ConstantTag::MethodHandle => Some(4),
            ConstantTag::Integer
            | ConstantTag::Float
            | ConstantTag::Field
            | ConstantTag::Method
            | ConstantTag::InterfaceMethod
            | ConstantTag::NameAndType
            | ConstantTag::Dynamic
            | ConstantTag::InvokeDynamic => Some(5),
            ConstantTag::Long | ConstantTag::Double => Some(9),
        }
    }

    /// 64 bit constants take up two slots in the pool
    pub fn is_wide(&self) -> bool {
        matches!(self, ConstantTag::Long | ConstantTag::Double)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRef {
    pub class: u16,
    pub name_and_type: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameAndType {
    pub name: u16,
    pub descriptor: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodHandle {
    pub kind: u8,
    pub reference: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicRef {
    pub bootstrap_method: u16,
    pub name_and_type: u16,
}

/// A decoded constant pool entry. Index references are left as raw pool indices;
/// Float and Double keep their bit patterns so that equality is exact.
#[derive(EnumAsInner, Debug, Clone, PartialEq)]
pub enum PoolEntry {
    Utf8(String),
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    Class(u16),
    String(u16),
    Field(MemberRef),
    Method(MemberRef),
    InterfaceMethod(MemberRef),
    NameAndType(NameAndType),
    MethodHandle(MethodHandle),
    MethodType(u16),
    Dynamic(DynamicRef),
    InvokeDynamic(DynamicRef),
    Module(u16),
    Package(u16),
}

impl PoolEntry {
    pub fn tag(&self) -> ConstantTag {
        match self {
            PoolEntry::Utf8(_) => ConstantTag::Utf8,
            PoolEntry::Integer(_) => ConstantTag::Integer,
            PoolEntry::Float(_) => ConstantTag::Float,
            PoolEntry::Long(_) => ConstantTag::Long,
            PoolEntry::Double(_) => ConstantTag::Double,
            PoolEntry::Class(_) => ConstantTag::Class,
            PoolEntry::String(_) => ConstantTag::String,
            PoolEntry::Field(_) => ConstantTag::Field,
            PoolEntry::Method(_) => ConstantTag::Method,
            PoolEntry::InterfaceMethod(_) => ConstantTag::InterfaceMethod,
            PoolEntry::NameAndType(_) => ConstantTag::NameAndType,
            PoolEntry::MethodHandle(_) => ConstantTag::MethodHandle,
            PoolEntry::MethodType(_) => ConstantTag::MethodType,
            PoolEntry::Dynamic(_) => ConstantTag::Dynamic,
            PoolEntry::InvokeDynamic(_) => ConstantTag::InvokeDynamic,
            PoolEntry::Module(_) => ConstantTag::Module,
            PoolEntry::Package(_) => ConstantTag::Package,
        }
    }
}

/// Offset table over the constant pool of a class file buffer.
///
/// Indexing only records where each entry starts, entries are decoded on demand
/// from the borrowed buffer when they are resolved.
#[derive(Debug, Clone)]
pub struct ConstantPool<'a> {
    data: &'a [u8],
    count: u16,
    // offsets[i] is the position of entry i's tag byte. Index 0 and the slot
    // after a Long/Double are None.
    offsets: Vec<Option<usize>>,
    end: usize,
}

impl<'a> ConstantPool<'a> {
    /// Index a pool that starts right after the fixed class file header.
    pub fn index(data: &'a [u8], count: u16) -> DecodeResult<Self> {
        Self::index_at(data, POOL_START, count)
    }

    /// Index `count - 1` entries (numbered from 1) starting at `start`.
    pub fn index_at(data: &'a [u8], start: usize, count: u16) -> DecodeResult<Self> {
        if count == 0 {
            return Err(DecodeError::pool(0, start, "constant pool count must be at least 1"));
        }

        let mut offsets: Vec<Option<usize>> = vec![None; count as usize];
        let mut cursor = Cursor::at(data, start);

        let mut i: u16 = 1;
        while i < count {
            let offset = cursor.position();
            let raw_tag = cursor.try_get_u8()?;
            let tag = ConstantTag::from_tag(raw_tag)
                .ok_or_else(|| DecodeError::pool(i, offset, format!("unknown tag {}", raw_tag)))?;

            let size = match tag.fixed_size() {
                Some(size) => size,
                None => 3 + cursor.peek_u16(offset + 1)? as usize,
            };

            // rewind to the tag, then skip the whole entry so truncation is reported from its start
            cursor = Cursor::at(data, offset);
            cursor.skip(size)?;
            offsets[i as usize] = Some(offset);

            // Special case: 64 bit types are supposed to take up 2 slots
            // The next index is reserved and left unindexed
            if tag.is_wide() {
                if i + 1 >= count {
                    return Err(DecodeError::pool(
                        i,
                        offset,
                        "64 bit constant has no room for its reserved slot",
                    ));
                }
                i += 1;
            }

            i += 1;
        }

        trace!(
            "indexed {} constant pool slots, pool ends at {}",
            count - 1,
            cursor.position()
        );

        Ok(Self {
            data,
            count,
            offsets,
            end: cursor.position(),
        })
    }

    /// The declared constant_pool_count, one more than the number of usable slots
    pub fn count(&self) -> u16 {
        self.count
    }

    /// Whether this pool was indexed over exactly `data`
    pub fn is_over(&self, data: &[u8]) -> bool {
        std::ptr::eq(self.data, data)
    }

    /// The offset of the first byte after the pool
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn entry_offset(&self, index: u16) -> DecodeResult<usize> {
        if index == 0 || index >= self.count {
            return Err(DecodeError::pool(
                index,
                self.end,
                format!("index out of range (pool has {} slots)", self.count),
            ));
        }

        self.offsets[index as usize].ok_or_else(|| {
            DecodeError::pool(
                index,
                self.end,
                "index is the reserved slot of a 64 bit constant",
            )
        })
    }

    pub fn tag(&self, index: u16) -> DecodeResult<ConstantTag> {
        let offset = self.entry_offset(index)?;
        let raw_tag = Cursor::at(self.data, offset).try_get_u8()?;

        // every indexed offset was validated when the table was built
        ConstantTag::from_tag(raw_tag)
            .ok_or_else(|| DecodeError::pool(index, offset, format!("unknown tag {}", raw_tag)))
    }

    /// Decode the entry at `index`.
    pub fn entry(&self, index: u16) -> DecodeResult<PoolEntry> {
        let tag = self.tag(index)?;
        let offset = self.entry_offset(index)?;
        let mut cursor = Cursor::at(self.data, offset + 1);

        Ok(match tag {
            ConstantTag::Utf8 => PoolEntry::Utf8(self.utf8_at(index, offset)?),
            ConstantTag::Integer => PoolEntry::Integer(cursor.try_get_i32()?),
            ConstantTag::Float => PoolEntry::Float(cursor.try_get_u32()?),
            ConstantTag::Long => PoolEntry::Long(cursor.try_get_i64()?),
            ConstantTag::Double => PoolEntry::Double(cursor.try_get_u64()?),
            ConstantTag::Class => PoolEntry::Class(cursor.try_get_u16()?),
            ConstantTag::String => PoolEntry::String(cursor.try_get_u16()?),
            ConstantTag::Field => PoolEntry::Field(Self::member_ref(&mut cursor)?),
            ConstantTag::Method => PoolEntry::Method(Self::member_ref(&mut cursor)?),
            ConstantTag::InterfaceMethod => {
                PoolEntry::InterfaceMethod(Self::member_ref(&mut cursor)?)
            }
            ConstantTag::NameAndType => PoolEntry::NameAndType(NameAndType {
                name: cursor.try_get_u16()?,
                descriptor: cursor.try_get_u16()?,
            }),
            ConstantTag::MethodHandle => PoolEntry::MethodHandle(MethodHandle {
                kind: cursor.try_get_u8()?,
                reference: cursor.try_get_u16()?,
            }),
            ConstantTag::MethodType => PoolEntry::MethodType(cursor.try_get_u16()?),
            ConstantTag::Dynamic => PoolEntry::Dynamic(Self::dynamic_ref(&mut cursor)?),
            ConstantTag::InvokeDynamic => {
                PoolEntry::InvokeDynamic(Self::dynamic_ref(&mut cursor)?)
            }
            ConstantTag::Module => PoolEntry::Module(cursor.try_get_u16()?),
            ConstantTag::Package => PoolEntry::Package(cursor.try_get_u16()?),
        })
    }

    fn member_ref(cursor: &mut Cursor) -> DecodeResult<MemberRef> {
        Ok(MemberRef {
            class: cursor.try_get_u16()?,
            name_and_type: cursor.try_get_u16()?,
        })
    }

    fn dynamic_ref(cursor: &mut Cursor) -> DecodeResult<DynamicRef> {
        Ok(DynamicRef {
            bootstrap_method: cursor.try_get_u16()?,
            name_and_type: cursor.try_get_u16()?,
        })
    }

    fn expect(&self, index: u16, expected: ConstantTag) -> DecodeResult<usize> {
        let found = self.tag(index)?;
        let offset = self.entry_offset(index)?;

        if found != expected {
            return Err(DecodeError::pool(
                index,
                offset,
                format!("expected {:?} entry, found {:?}", expected, found),
            ));
        }

        Ok(offset)
    }

    fn utf8_at(&self, index: u16, offset: usize) -> DecodeResult<String> {
        let mut cursor = Cursor::at(self.data, offset + 1);
        let length = cursor.try_get_u16()?;
        let bytes = cursor.take(length as usize)?;

        decode_modified_utf8(bytes)
            .ok_or_else(|| DecodeError::pool(index, offset, "invalid modified utf-8"))
    }

    pub fn resolve_utf8(&self, index: u16) -> DecodeResult<String> {
        let offset = self.expect(index, ConstantTag::Utf8)?;
        self.utf8_at(index, offset)
    }

    /// Chase a Class entry to the Utf8 entry holding its internal name.
    pub fn resolve_class_name(&self, index: u16) -> DecodeResult<String> {
        let offset = self.expect(index, ConstantTag::Class)?;
        let name = Cursor::at(self.data, offset + 1).try_get_u16()?;

        self.resolve_utf8(name)
    }

    /// Like resolve_class_name, except that index 0 means "no class".
    pub fn resolve_optional_class_name(&self, index: u16) -> DecodeResult<Option<String>> {
        if index == 0 {
            return Ok(None);
        }

        self.resolve_class_name(index).map(Some)
    }

    /// Resolve a NameAndType entry to its (name, descriptor) strings.
    pub fn resolve_name_and_type(&self, index: u16) -> DecodeResult<(String, String)> {
        let offset = self.expect(index, ConstantTag::NameAndType)?;
        let mut cursor = Cursor::at(self.data, offset + 1);
        let name = cursor.try_get_u16()?;
        let descriptor = cursor.try_get_u16()?;

        Ok((self.resolve_utf8(name)?, self.resolve_utf8(descriptor)?))
    }

    /// Take an owned copy of every entry, addressed by pool index.
    pub fn snapshot(&self) -> DecodeResult<ConstantTable> {
        let mut entries = Vec::with_capacity(self.count as usize);

        for (index, offset) in self.offsets.iter().enumerate() {
            entries.push(match offset {
                Some(_) => Some(self.entry(index as u16)?),
                None => None,
            });
        }

        Ok(ConstantTable { entries })
    }
}

/// An owned, immutable copy of a constant pool.
/// Slot 0 and the reserved slot after each Long/Double hold no entry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConstantTable {
    entries: Vec<Option<PoolEntry>>,
}

impl ConstantTable {
    /// The constant_pool_count this table was read with
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    pub fn get(&self, index: u16) -> Option<&PoolEntry> {
        self.entries.get(index as usize).and_then(Option::as_ref)
    }

    /// Every populated slot with its index, in pool order
    pub fn iter(&self) -> impl Iterator<Item = (u16, &PoolEntry)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|e| (index as u16, e)))
    }

    pub fn utf8(&self, index: u16) -> Option<&str> {
        self.get(index)?.as_utf8().map(String::as_str)
    }

    pub fn class_name(&self, index: u16) -> Option<&str> {
        let name = self.get(index)?.as_class()?;
        self.utf8(*name)
    }
}
