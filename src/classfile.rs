use enum_as_inner::EnumAsInner;

use crate::bytecode::Instruction;
use crate::flags::{ClassAccessFlags, FieldAccessFlags, MethodAccessFlags};
use crate::pool::ConstantTable;

/// A fully decoded class file. Fields and methods are kept in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassRecord {
    pub meta_data: MetaData,
    pub constant_pool: ConstantTable,

    pub access_flags: ClassAccessFlags,
    pub name: String,
    /// None only for java/lang/Object and module descriptors
    pub super_name: Option<String>,

    pub interfaces: Vec<String>,
    pub fields: Vec<FieldRecord>,
    pub methods: Vec<MethodRecord>,

    pub source_file: Option<String>,
    pub synthetic: bool,
    pub deprecated: bool,
}

impl ClassRecord {
    pub fn field(&self, name: &str) -> Option<&FieldRecord> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str, descriptor: &str) -> Option<&MethodRecord> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.descriptor == descriptor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetaData {
    pub minor_version: u16,
    pub major_version: u16,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    pub access_flags: FieldAccessFlags,
    pub name: String,
    pub descriptor: String,
    /// Set by a Synthetic attribute, independent of the access flag
    pub synthetic: bool,
    pub deprecated: bool,
    pub constant_value: Option<ConstantValue>,
}

impl FieldRecord {
    pub fn is_synthetic(&self) -> bool {
        self.synthetic || self.access_flags.has(FieldAccessFlags::SYNTHETIC)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodRecord {
    pub access_flags: MethodAccessFlags,
    pub name: String,
    pub descriptor: String,
    pub synthetic: bool,
    pub deprecated: bool,

    pub max_stack: u16,
    pub max_locals: u16,
    /// Buffer offset of the first code byte, None when there is no Code attribute.
    /// An instruction starts at `code_offset + instruction.offset`
    pub code_offset: Option<usize>,
    /// Checked exceptions from the Exceptions attribute, empty when there is none
    pub exceptions: Vec<String>,
    /// None for methods without a Code attribute (abstract and native methods)
    pub instructions: Option<Vec<Instruction>>,
    pub exception_handlers: Vec<ExceptionHandler>,
}

impl MethodRecord {
    pub fn has_body(&self) -> bool {
        self.instructions.is_some()
    }

    /// Where `instruction` begins in the decoded buffer
    pub fn absolute_offset(&self, instruction: &Instruction) -> Option<usize> {
        self.code_offset.map(|start| start + instruction.offset as usize)
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic || self.access_flags.has(MethodAccessFlags::SYNTHETIC)
    }
}

/// One row of a Code attribute's exception table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionHandler {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    /// None catches everything (used for finally blocks)
    pub catch_type: Option<String>,
}

/// The value of a field's ConstantValue attribute.
/// Float and Double hold their raw bits.
#[derive(EnumAsInner, Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Integer(i32),
    Float(u32),
    Long(i64),
    Double(u64),
    String(String),
}
