use anyhow::{anyhow, Result};
use bytes::BufMut;
use classfile::bytecode::switch_padding;
use classfile::opcode::{OpcodeDescriptor, OperandKind};
use classfile::{ClassRecord, ConstantTable, ConstantValue, Instruction, Operands, PoolEntry};

/// Re-encodes a decoded class from its pool snapshot.
/// Only the attributes the decoder models are written back.
pub fn write(class: &ClassRecord) -> Result<Vec<u8>> {
    let pool = &class.constant_pool;
    let mut out = vec![];

    out.put_u32(0xCAFEBABE);
    out.put_u16(class.meta_data.minor_version);
    out.put_u16(class.meta_data.major_version);

    out.put_u16(pool.count());
    for (_, entry) in pool.iter() {
        write_entry(&mut out, entry);
    }

    out.put_u16(class.access_flags.bits());
    out.put_u16(class_index(pool, &class.name)?);
    out.put_u16(match &class.super_name {
        Some(name) => class_index(pool, name)?,
        None => 0,
    });

    out.put_u16(class.interfaces.len() as u16);
    for interface in &class.interfaces {
        out.put_u16(class_index(pool, interface)?);
    }

    out.put_u16(class.fields.len() as u16);
    for field in &class.fields {
        out.put_u16(field.access_flags.bits());
        out.put_u16(utf8_index(pool, &field.name)?);
        out.put_u16(utf8_index(pool, &field.descriptor)?);

        let mut attributes = vec![];
        if let Some(value) = &field.constant_value {
            let index = constant_index(pool, value)?;
            attributes.push(attribute(pool, "ConstantValue", &index.to_be_bytes())?);
        }
        markers(pool, &mut attributes, field.synthetic, field.deprecated)?;
        put_attributes(&mut out, &attributes);
    }

    out.put_u16(class.methods.len() as u16);
    for method in &class.methods {
        out.put_u16(method.access_flags.bits());
        out.put_u16(utf8_index(pool, &method.name)?);
        out.put_u16(utf8_index(pool, &method.descriptor)?);

        let mut attributes = vec![];
        if let Some(instructions) = &method.instructions {
            let mut payload = vec![];
            payload.put_u16(method.max_stack);
            payload.put_u16(method.max_locals);

            let code = write_code(instructions)?;
            payload.put_u32(code.len() as u32);
            payload.extend_from_slice(&code);

            payload.put_u16(method.exception_handlers.len() as u16);
            for handler in &method.exception_handlers {
                payload.put_u16(handler.start_pc);
                payload.put_u16(handler.end_pc);
                payload.put_u16(handler.handler_pc);
                payload.put_u16(match &handler.catch_type {
                    Some(name) => class_index(pool, name)?,
                    None => 0,
                });
            }

            // nested attributes are not modelled
            payload.put_u16(0);
            attributes.push(attribute(pool, "Code", &payload)?);
        }

        if !method.exceptions.is_empty() {
            let mut payload = vec![];
            payload.put_u16(method.exceptions.len() as u16);
            for exception in &method.exceptions {
                payload.put_u16(class_index(pool, exception)?);
            }
            attributes.push(attribute(pool, "Exceptions", &payload)?);
        }

        markers(pool, &mut attributes, method.synthetic, method.deprecated)?;
        put_attributes(&mut out, &attributes);
    }

    let mut attributes = vec![];
    if let Some(source_file) = &class.source_file {
        let index = utf8_index(pool, source_file)?;
        attributes.push(attribute(pool, "SourceFile", &index.to_be_bytes())?);
    }
    markers(pool, &mut attributes, class.synthetic, class.deprecated)?;
    put_attributes(&mut out, &attributes);

    Ok(out)
}

/// Re-encode a flat instruction sequence. Switch padding is recomputed from each offset.
pub fn write_code(instructions: &[Instruction]) -> Result<Vec<u8>> {
    let mut code = vec![];

    for instruction in instructions {
        let descriptor = OpcodeDescriptor::lookup(instruction.opcode)
            .ok_or_else(|| anyhow!("unknown opcode {:#04x}", instruction.opcode))?;

        code.put_u8(instruction.opcode);

        match (&instruction.operands, descriptor.operands) {
            (Operands::None, OperandKind::Implicit) => {}
            (Operands::Immediate(value), OperandKind::Byte) => code.put_i8(*value as i8),
            (Operands::Immediate(value), OperandKind::Short) => code.put_i16(*value as i16),
            (Operands::Local(index), OperandKind::Local) => code.put_u8(*index as u8),
            (Operands::Constant(index), OperandKind::ConstantByte) => code.put_u8(*index as u8),
            (Operands::Constant(index), OperandKind::Constant) => code.put_u16(*index),
            (Operands::Branch(offset), OperandKind::Branch) => code.put_i16(*offset as i16),
            (Operands::Branch(offset), OperandKind::WideBranch) => code.put_i32(*offset),
            (Operands::Increment { index, delta }, OperandKind::Increment) => {
                code.put_u8(*index as u8);
                code.put_i8(*delta as i8);
            }
            (Operands::ArrayType(kind), OperandKind::ArrayType) => code.put_u8(*kind),
            (Operands::MultiArray { class, dimensions }, OperandKind::MultiArray) => {
                code.put_u16(*class);
                code.put_u8(*dimensions);
            }
            (Operands::InvokeInterface { method, count }, OperandKind::InvokeInterface) => {
                code.put_u16(*method);
                code.put_u8(*count);
                code.put_u8(0);
            }
            (Operands::InvokeDynamic { call_site }, OperandKind::InvokeDynamic) => {
                code.put_u16(*call_site);
                code.put_u16(0);
            }
            (
                Operands::TableSwitch {
                    default,
                    low,
                    high,
                    offsets,
                },
                OperandKind::TableSwitch,
            ) => {
                code.put_bytes(0, switch_padding(instruction.offset as usize));
                code.put_i32(*default);
                code.put_i32(*low);
                code.put_i32(*high);
                for offset in offsets {
                    code.put_i32(*offset);
                }
            }
            (Operands::LookupSwitch { default, pairs }, OperandKind::LookupSwitch) => {
                code.put_bytes(0, switch_padding(instruction.offset as usize));
                code.put_i32(*default);
                code.put_i32(pairs.len() as i32);
                for (key, offset) in pairs {
                    code.put_i32(*key);
                    code.put_i32(*offset);
                }
            }
            (
                Operands::Wide {
                    opcode,
                    index,
                    increment,
                },
                OperandKind::Wide,
            ) => {
                code.put_u8(*opcode);
                code.put_u16(*index);
                if let Some(increment) = increment {
                    code.put_i16(*increment);
                }
            }
            (operands, kind) => {
                return Err(anyhow!(
                    "{} has operands {:?} that do not fit {:?}",
                    instruction.name,
                    operands,
                    kind
                ))
            }
        }
    }

    Ok(code)
}

fn write_entry(out: &mut Vec<u8>, entry: &PoolEntry) {
    out.put_u8(entry.tag().tag());

    match entry {
        PoolEntry::Utf8(value) => {
            let encoded = encode_modified_utf8(value);
            out.put_u16(encoded.len() as u16);
            out.extend_from_slice(&encoded);
        }
        PoolEntry::Integer(value) => out.put_i32(*value),
        PoolEntry::Float(bits) => out.put_u32(*bits),
        PoolEntry::Long(value) => out.put_i64(*value),
        PoolEntry::Double(bits) => out.put_u64(*bits),
        PoolEntry::Class(index)
        | PoolEntry::String(index)
        | PoolEntry::MethodType(index)
        | PoolEntry::Module(index)
        | PoolEntry::Package(index) => out.put_u16(*index),
        PoolEntry::Field(member)
        | PoolEntry::Method(member)
        | PoolEntry::InterfaceMethod(member) => {
            out.put_u16(member.class);
            out.put_u16(member.name_and_type);
        }
        PoolEntry::NameAndType(nat) => {
            out.put_u16(nat.name);
            out.put_u16(nat.descriptor);
        }
        PoolEntry::MethodHandle(handle) => {
            out.put_u8(handle.kind);
            out.put_u16(handle.reference);
        }
        PoolEntry::Dynamic(dynamic) | PoolEntry::InvokeDynamic(dynamic) => {
            out.put_u16(dynamic.bootstrap_method);
            out.put_u16(dynamic.name_and_type);
        }
    }
}

fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = vec![];

    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.put_u8(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.put_u8(0xC0 | (unit >> 6) as u8);
                out.put_u8(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.put_u8(0xE0 | (unit >> 12) as u8);
                out.put_u8(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.put_u8(0x80 | (unit & 0x3F) as u8);
            }
        }
    }

    out
}

fn utf8_index(pool: &ConstantTable, value: &str) -> Result<u16> {
    pool.iter()
        .find(|(_, entry)| entry.as_utf8().map(String::as_str) == Some(value))
        .map(|(index, _)| index)
        .ok_or_else(|| anyhow!("no Utf8 entry for '{}'", value))
}

fn class_index(pool: &ConstantTable, name: &str) -> Result<u16> {
    pool.iter()
        .find(|(index, _)| pool.class_name(*index) == Some(name))
        .map(|(index, _)| index)
        .ok_or_else(|| anyhow!("no Class entry for '{}'", name))
}

fn constant_index(pool: &ConstantTable, value: &ConstantValue) -> Result<u16> {
    pool.iter()
        .find(|(_, entry)| match (value, entry) {
            (ConstantValue::Integer(a), PoolEntry::Integer(b)) => a == b,
            (ConstantValue::Float(a), PoolEntry::Float(b)) => a == b,
            (ConstantValue::Long(a), PoolEntry::Long(b)) => a == b,
            (ConstantValue::Double(a), PoolEntry::Double(b)) => a == b,
            (ConstantValue::String(a), PoolEntry::String(b)) => pool.utf8(*b) == Some(a.as_str()),
            _ => false,
        })
        .map(|(index, _)| index)
        .ok_or_else(|| anyhow!("no pool entry for constant {:?}", value))
}

fn attribute(pool: &ConstantTable, name: &str, payload: &[u8]) -> Result<Vec<u8>> {
    let mut attribute = vec![];
    attribute.put_u16(utf8_index(pool, name)?);
    attribute.put_u32(payload.len() as u32);
    attribute.extend_from_slice(payload);
    Ok(attribute)
}

fn markers(
    pool: &ConstantTable,
    attributes: &mut Vec<Vec<u8>>,
    synthetic: bool,
    deprecated: bool,
) -> Result<()> {
    if synthetic {
        attributes.push(attribute(pool, "Synthetic", &[])?);
    }
    if deprecated {
        attributes.push(attribute(pool, "Deprecated", &[])?);
    }
    Ok(())
}

fn put_attributes(out: &mut Vec<u8>, attributes: &[Vec<u8>]) {
    out.put_u16(attributes.len() as u16);
    for attribute in attributes {
        out.extend_from_slice(attribute);
    }
}
