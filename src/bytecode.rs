use tracing::trace;

use crate::bytes_ext::Cursor;
use crate::error::{DecodeError, DecodeResult};
use crate::opcode::{OpcodeDescriptor, OperandKind};

/// The decoded operands of one instruction.
/// Branch offsets are raw, relative to the start of the instruction that holds them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operands {
    None,
    /// bipush / sipush
    Immediate(i32),
    Local(u16),
    /// A constant pool index, from ldc, field/method access, new, checkcast...
    Constant(u16),
    Branch(i32),
    Increment {
        index: u16,
        delta: i16,
    },
    ArrayType(u8),
    MultiArray {
        class: u16,
        dimensions: u8,
    },
    InvokeInterface {
        method: u16,
        count: u8,
    },
    InvokeDynamic {
        call_site: u16,
    },
    TableSwitch {
        default: i32,
        low: i32,
        high: i32,
        offsets: Vec<i32>,
    },
    LookupSwitch {
        default: i32,
        pairs: Vec<(i32, i32)>,
    },
    /// `wide` and the instruction it modifies. `increment` is only present for iinc
    Wide {
        opcode: u8,
        index: u16,
        increment: Option<i16>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Position of the opcode, relative to the start of the method body.
    /// See `MethodRecord::absolute_offset` for the position in the buffer
    pub offset: u32,
    pub opcode: u8,
    pub name: &'static str,
    /// Total size in bytes, opcode included
    pub length: u32,
    pub operands: Operands,
}

impl Instruction {
    pub fn operand_length(&self) -> u32 {
        self.length - 1
    }

    /// The raw relative offsets this instruction may jump to.
    pub fn branch_targets(&self) -> Vec<i32> {
        match &self.operands {
            Operands::Branch(offset) => vec![*offset],
            Operands::TableSwitch {
                default, offsets, ..
            } => std::iter::once(*default)
                .chain(offsets.iter().copied())
                .collect(),
            Operands::LookupSwitch { default, pairs } => std::iter::once(*default)
                .chain(pairs.iter().map(|(_, offset)| *offset))
                .collect(),
            _ => vec![],
        }
    }
}

/// Padding between a switch opcode at `offset` and its 4 byte aligned operands.
pub fn switch_padding(offset: usize) -> usize {
    (4 - (offset + 1) % 4) % 4
}

/// Decode `length` bytes of code starting at `start` into a flat instruction sequence.
pub fn decode(data: &[u8], start: usize, length: usize) -> DecodeResult<Vec<Instruction>> {
    let end = start.checked_add(length).unwrap_or(usize::MAX);
    if end > data.len() {
        return Err(DecodeError::TruncatedInput {
            offset: start,
            needed: length,
            remaining: data.len().saturating_sub(start),
        });
    }

    // reads past the end of the body fail instead of spilling into the next structure
    let code = &data[..end];
    let mut instructions = Vec::new();
    let mut offset = 0;

    while offset < length {
        let instruction = decode_instruction(code, start, offset)?;
        offset += instruction.length as usize;
        instructions.push(instruction);
    }

    trace!(
        "decoded {} instructions from {} bytes of code",
        instructions.len(),
        length
    );

    Ok(instructions)
}

/// Decode the single instruction at `offset` within the body that begins at `base`.
/// `code` must end where the body ends.
fn decode_instruction(code: &[u8], base: usize, offset: usize) -> DecodeResult<Instruction> {
    let position = base + offset;
    let mut cursor = Cursor::at(code, position);

    let opcode = cursor.try_get_u8()?;
    let descriptor = OpcodeDescriptor::lookup(opcode).ok_or_else(|| {
        DecodeError::instruction(position, format!("unknown opcode {:#04x}", opcode))
    })?;

    let operands = read_operands(&mut cursor, descriptor, offset).map_err(|err| match err {
        DecodeError::TruncatedInput { .. } => DecodeError::instruction(
            position,
            format!("{} runs past the end of the code", descriptor.name),
        ),
        other => other,
    })?;

    Ok(Instruction {
        offset: offset as u32,
        opcode,
        name: descriptor.name,
        length: (cursor.position() - position) as u32,
        operands,
    })
}

fn read_operands(
    cursor: &mut Cursor,
    descriptor: &OpcodeDescriptor,
    offset: usize,
) -> DecodeResult<Operands> {
    Ok(match descriptor.operands {
        OperandKind::Implicit => Operands::None,
        OperandKind::Byte => Operands::Immediate(cursor.try_get_i8()? as i32),
        OperandKind::Short => Operands::Immediate(cursor.try_get_i16()? as i32),
        OperandKind::Local => Operands::Local(cursor.try_get_u8()? as u16),
        OperandKind::ConstantByte => Operands::Constant(cursor.try_get_u8()? as u16),
        OperandKind::Constant => Operands::Constant(cursor.try_get_u16()?),
        OperandKind::Branch => Operands::Branch(cursor.try_get_i16()? as i32),
        OperandKind::WideBranch => Operands::Branch(cursor.try_get_i32()?),
        OperandKind::Increment => Operands::Increment {
            index: cursor.try_get_u8()? as u16,
            delta: cursor.try_get_i8()? as i16,
        },
        OperandKind::ArrayType => Operands::ArrayType(cursor.try_get_u8()?),
        OperandKind::MultiArray => Operands::MultiArray {
            class: cursor.try_get_u16()?,
            dimensions: cursor.try_get_u8()?,
        },
        OperandKind::InvokeInterface => {
            let method = cursor.try_get_u16()?;
            let count = cursor.try_get_u8()?;
            cursor.skip(1)?;

            Operands::InvokeInterface { method, count }
        }
        OperandKind::InvokeDynamic => {
            let call_site = cursor.try_get_u16()?;
            cursor.skip(2)?;

            Operands::InvokeDynamic { call_site }
        }
        OperandKind::TableSwitch => read_table_switch(cursor, offset)?,
        OperandKind::LookupSwitch => read_lookup_switch(cursor, offset)?,
        OperandKind::Wide => read_wide(cursor)?,
    })
}

fn read_table_switch(cursor: &mut Cursor, offset: usize) -> DecodeResult<Operands> {
    let start = cursor.position() - 1;
    cursor.skip(switch_padding(offset))?;

    let default = cursor.try_get_i32()?;
    let low = cursor.try_get_i32()?;
    let high = cursor.try_get_i32()?;

    if high < low {
        return Err(DecodeError::instruction(
            start,
            format!("tableswitch high bound {} is below low bound {}", high, low),
        ));
    }

    // computed in i64, high - low + 1 overflows i32 for the widest tables
    let entries = usize::try_from(high as i64 - low as i64 + 1).map_err(|_| {
        DecodeError::instruction(
            start,
            format!("tableswitch bounds {}..={} do not fit in memory", low, high),
        )
    })?;
    if entries.saturating_mul(4) > cursor.remaining() {
        return Err(DecodeError::instruction(
            start,
            format!("tableswitch with {} entries exceeds the code length", entries),
        ));
    }

    let mut offsets = Vec::with_capacity(entries);
    for _ in 0..entries {
        offsets.push(cursor.try_get_i32()?);
    }

    Ok(Operands::TableSwitch {
        default,
        low,
        high,
        offsets,
    })
}

fn read_lookup_switch(cursor: &mut Cursor, offset: usize) -> DecodeResult<Operands> {
    let start = cursor.position() - 1;
    cursor.skip(switch_padding(offset))?;

    let default = cursor.try_get_i32()?;
    let count = cursor.try_get_i32()?;

    if count < 0 {
        return Err(DecodeError::instruction(
            start,
            format!("lookupswitch has a negative pair count {}", count),
        ));
    }

    let count = count as usize;
    if count.saturating_mul(8) > cursor.remaining() {
        return Err(DecodeError::instruction(
            start,
            format!("lookupswitch with {} pairs exceeds the code length", count),
        ));
    }

    let mut pairs = Vec::with_capacity(count);
    for _ in 0..count {
        pairs.push((cursor.try_get_i32()?, cursor.try_get_i32()?));
    }

    Ok(Operands::LookupSwitch { default, pairs })
}

fn read_wide(cursor: &mut Cursor) -> DecodeResult<Operands> {
    let start = cursor.position() - 1;
    let opcode = cursor.try_get_u8()?;

    let wrapped = OpcodeDescriptor::lookup(opcode)
        .filter(|descriptor| descriptor.is_widenable())
        .ok_or_else(|| {
            DecodeError::instruction(start, format!("wide cannot modify opcode {:#04x}", opcode))
        })?;

    let index = cursor.try_get_u16()?;
    let increment = match wrapped.operands {
        OperandKind::Increment => Some(cursor.try_get_i16()?),
        _ => None,
    };

    Ok(Operands::Wide {
        opcode,
        index,
        increment,
    })
}
