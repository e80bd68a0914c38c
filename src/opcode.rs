//! The static opcode table. Every opcode the decoder understands has one entry here,
//! indexed by its opcode value.

pub const IINC: u8 = 0x84;
pub const RET: u8 = 0xa9;
pub const TABLESWITCH: u8 = 0xaa;
pub const LOOKUPSWITCH: u8 = 0xab;
pub const WIDE: u8 = 0xc4;

/// How the bytes following an opcode are laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// no operand bytes
    Implicit,
    /// signed 1 byte immediate
    Byte,
    /// signed 2 byte immediate
    Short,
    /// unsigned 1 byte local variable index
    Local,
    /// unsigned 1 byte constant pool index (ldc)
    ConstantByte,
    /// unsigned 2 byte constant pool index
    Constant,
    /// signed 2 byte branch offset
    Branch,
    /// signed 4 byte branch offset
    WideBranch,
    /// local variable index (u1) and signed increment (s1)
    Increment,
    /// primitive array type code (u1)
    ArrayType,
    /// class index (u2) and dimension count (u1)
    MultiArray,
    /// method index (u2), argument count (u1), and a zero byte
    InvokeInterface,
    /// call site index (u2) followed by two zero bytes
    InvokeDynamic,
    TableSwitch,
    LookupSwitch,
    Wide,
}

impl OperandKind {
    /// Operand bytes following the opcode, or None when the size depends on the stream
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            OperandKind::Implicit => Some(0),
            OperandKind::Byte
            | OperandKind::Local
            | OperandKind::ConstantByte
            | OperandKind::ArrayType => Some(1),
            OperandKind::Short
            | OperandKind::Constant
            | OperandKind::Branch
            | OperandKind::Increment => Some(2),
            OperandKind::MultiArray => Some(3),
            OperandKind::WideBranch
            | OperandKind::InvokeInterface
            | OperandKind::InvokeDynamic => Some(4),
            OperandKind::TableSwitch | OperandKind::LookupSwitch | OperandKind::Wide => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeDescriptor {
    pub opcode: u8,
    pub name: &'static str,
    pub operands: OperandKind,
}

impl OpcodeDescriptor {
    pub fn lookup(opcode: u8) -> Option<&'static OpcodeDescriptor> {
        OPCODES.get(opcode as usize)
    }

    pub fn fixed_operand_size(&self) -> Option<usize> {
        self.operands.fixed_size()
    }

    /// Whether this opcode may be wrapped by `wide`
    pub fn is_widenable(&self) -> bool {
        matches!(self.operands, OperandKind::Local | OperandKind::Increment)
    }
}

const fn op(opcode: u8, name: &'static str, operands: OperandKind) -> OpcodeDescriptor {
    OpcodeDescriptor {
        opcode,
        name,
        operands,
    }
}

use OperandKind as K;

pub static OPCODES: [OpcodeDescriptor; 203] = [
    op(0x00, "nop", K::Implicit),
    op(0x01, "aconst_null", K::Implicit),
    op(0x02, "iconst_m1", K::Implicit),
    op(0x03, "iconst_0", K::Implicit),
    op(0x04, "iconst_1", K::Implicit),
    op(0x05, "iconst_2", K::Implicit),
    op(0x06, "iconst_3", K::Implicit),
    op(0x07, "iconst_4", K::Implicit),
    op(0x08, "iconst_5", K::Implicit),
    op(0x09, "lconst_0", K::Implicit),
    op(0x0a, "lconst_1", K::Implicit),
    op(0x0b, "fconst_0", K::Implicit),
    op(0x0c, "fconst_1", K::Implicit),
    op(0x0d, "fconst_2", K::Implicit),
    op(0x0e, "dconst_0", K::Implicit),
    op(0x0f, "dconst_1", K::Implicit),
    op(0x10, "bipush", K::Byte),
    op(0x11, "sipush", K::Short),
    op(0x12, "ldc", K::ConstantByte),
    op(0x13, "ldc_w", K::Constant),
    op(0x14, "ldc2_w", K::Constant),
    op(0x15, "iload", K::Local),
    op(0x16, "lload", K::Local),
    op(0x17, "fload", K::Local),
    op(0x18, "dload", K::Local),
    op(0x19, "aload", K::Local),
    op(0x1a, "iload_0", K::Implicit),
    op(0x1b, "iload_1", K::Implicit),
    op(0x1c, "iload_2", K::Implicit),
    op(0x1d, "iload_3", K::Implicit),
    op(0x1e, "lload_0", K::Implicit),
    op(0x1f, "lload_1", K::Implicit),
    op(0x20, "lload_2", K::Implicit),
    op(0x21, "lload_3", K::Implicit),
    op(0x22, "fload_0", K::Implicit),
    op(0x23, "fload_1", K::Implicit),
    op(0x24, "fload_2", K::Implicit),
    op(0x25, "fload_3", K::Implicit),
    op(0x26, "dload_0", K::Implicit),
    op(0x27, "dload_1", K::Implicit),
    op(0x28, "dload_2", K::Implicit),
    op(0x29, "dload_3", K::Implicit),
    op(0x2a, "aload_0", K::Implicit),
    op(0x2b, "aload_1", K::Implicit),
    op(0x2c, "aload_2", K::Implicit),
    op(0x2d, "aload_3", K::Implicit),
    op(0x2e, "iaload", K::Implicit),
    op(0x2f, "laload", K::Implicit),
    op(0x30, "faload", K::Implicit),
    op(0x31, "daload", K::Implicit),
    op(0x32, "aaload", K::Implicit),
    op(0x33, "baload", K::Implicit),
    op(0x34, "caload", K::Implicit),
    op(0x35, "saload", K::Implicit),
    op(0x36, "istore", K::Local),
    op(0x37, "lstore", K::Local),
    op(0x38, "fstore", K::Local),
    op(0x39, "dstore", K::Local),
    op(0x3a, "astore", K::Local),
    op(0x3b, "istore_0", K::Implicit),
    op(0x3c, "istore_1", K::Implicit),
    op(0x3d, "istore_2", K::Implicit),
    op(0x3e, "istore_3", K::Implicit),
    op(0x3f, "lstore_0", K::Implicit),
    op(0x40, "lstore_1", K::Implicit),
    op(0x41, "lstore_2", K::Implicit),
    op(0x42, "lstore_3", K::Implicit),
    op(0x43, "fstore_0", K::Implicit),
    op(0x44, "fstore_1", K::Implicit),
    op(0x45, "fstore_2", K::Implicit),
    op(0x46, "fstore_3", K::Implicit),
    op(0x47, "dstore_0", K::Implicit),
    op(0x48, "dstore_1", K::Implicit),
    op(0x49, "dstore_2", K::Implicit),
    op(0x4a, "dstore_3", K::Implicit),
    op(0x4b, "astore_0", K::Implicit),
    op(0x4c, "astore_1", K::Implicit),
    op(0x4d, "astore_2", K::Implicit),
    op(0x4e, "astore_3", K::Implicit),
    op(0x4f, "iastore", K::Implicit),
    op(0x50, "lastore", K::Implicit),
    op(0x51, "fastore", K::Implicit),
    op(0x52, "dastore", K::Implicit),
    op(0x53, "aastore", K::Implicit),
    op(0x54, "bastore", K::Implicit),
    op(0x55, "castore", K::Implicit),
    op(0x56, "sastore", K::Implicit),
    op(0x57, "pop", K::Implicit),
    op(0x58, "pop2", K::Implicit),
    op(0x59, "dup", K::Implicit),
    op(0x5a, "dup_x1", K::Implicit),
    op(0x5b, "dup_x2", K::Implicit),
    op(0x5c, "dup2", K::Implicit),
    op(0x5d, "dup2_x1", K::Implicit),
    op(0x5e, "dup2_x2", K::Implicit),
    op(0x5f, "swap", K::Implicit),
    op(0x60, "iadd", K::Implicit),
    op(0x61, "ladd", K::Implicit),
    op(0x62, "fadd", K::Implicit),
    op(0x63, "dadd", K::Implicit),
    op(0x64, "isub", K::Implicit),
    op(0x65, "lsub", K::Implicit),
    op(0x66, "fsub", K::Implicit),
    op(0x67, "dsub", K::Implicit),
    op(0x68, "imul", K::Implicit),
    op(0x69, "lmul", K::Implicit),
    op(0x6a, "fmul", K::Implicit),
    op(0x6b, "dmul", K::Implicit),
    op(0x6c, "idiv", K::Implicit),
    op(0x6d, "ldiv", K::Implicit),
    op(0x6e, "fdiv", K::Implicit),
    op(0x6f, "ddiv", K::Implicit),
    op(0x70, "irem", K::Implicit),
    op(0x71, "lrem", K::Implicit),
    op(0x72, "frem", K::Implicit),
    op(0x73, "drem", K::Implicit),
    op(0x74, "ineg", K::Implicit),
    op(0x75, "lneg", K::Implicit),
    op(0x76, "fneg", K::Implicit),
    op(0x77, "dneg", K::Implicit),
    op(0x78, "ishl", K::Implicit),
    op(0x79, "lshl", K::Implicit),
    op(0x7a, "ishr", K::Implicit),
    op(0x7b, "lshr", K::Implicit),
    op(0x7c, "iushr", K::Implicit),
    op(0x7d, "lushr", K::Implicit),
    op(0x7e, "iand", K::Implicit),
    op(0x7f, "land", K::Implicit),
    op(0x80, "ior", K::Implicit),
    op(0x81, "lor", K::Implicit),
    op(0x82, "ixor", K::Implicit),
    op(0x83, "lxor", K::Implicit),
    op(0x84, "iinc", K::Increment),
    op(0x85, "i2l", K::Implicit),
    op(0x86, "i2f", K::Implicit),
    op(0x87, "i2d", K::Implicit),
    op(0x88, "l2i", K::Implicit),
    op(0x89, "l2f", K::Implicit),
    op(0x8a, "l2d", K::Implicit),
    op(0x8b, "f2i", K::Implicit),
    op(0x8c, "f2l", K::Implicit),
    op(0x8d, "f2d", K::Implicit),
    op(0x8e, "d2i", K::Implicit),
    op(0x8f, "d2l", K::Implicit),
    op(0x90, "d2f", K::Implicit),
    op(0x91, "i2b", K::Implicit),
    op(0x92, "i2c", K::Implicit),
    op(0x93, "i2s", K::Implicit),
    op(0x94, "lcmp", K::Implicit),
    op(0x95, "fcmpl", K::Implicit),
    op(0x96, "fcmpg", K::Implicit),
    op(0x97, "dcmpl", K::Implicit),
    op(0x98, "dcmpg", K::Implicit),
    op(0x99, "ifeq", K::Branch),
    op(0x9a, "ifne", K::Branch),
    op(0x9b, "iflt", K::Branch),
    op(0x9c, "ifge", K::Branch),
    op(0x9d, "ifgt", K::Branch),
    op(0x9e, "ifle", K::Branch),
    op(0x9f, "if_icmpeq", K::Branch),
    op(0xa0, "if_icmpne", K::Branch),
    op(0xa1, "if_icmplt", K::Branch),
    op(0xa2, "if_icmpge", K::Branch),
    op(0xa3, "if_icmpgt", K::Branch),
    op(0xa4, "if_icmple", K::Branch),
    op(0xa5, "if_acmpeq", K::Branch),
    op(0xa6, "if_acmpne", K::Branch),
    op(0xa7, "goto", K::Branch),
    op(0xa8, "jsr", K::Branch),
    op(0xa9, "ret", K::Local),
    op(0xaa, "tableswitch", K::TableSwitch),
    op(0xab, "lookupswitch", K::LookupSwitch),
    op(0xac, "ireturn", K::Implicit),
    op(0xad, "lreturn", K::Implicit),
    op(0xae, "freturn", K::Implicit),
    op(0xaf, "dreturn", K::Implicit),
    op(0xb0, "areturn", K::Implicit),
    op(0xb1, "return", K::Implicit),
    op(0xb2, "getstatic", K::Constant),
    op(0xb3, "putstatic", K::Constant),
    op(0xb4, "getfield", K::Constant),
    op(0xb5, "putfield", K::Constant),
    op(0xb6, "invokevirtual", K::Constant),
    op(0xb7, "invokespecial", K::Constant),
    op(0xb8, "invokestatic", K::Constant),
    op(0xb9, "invokeinterface", K::InvokeInterface),
    op(0xba, "invokedynamic", K::InvokeDynamic),
    op(0xbb, "new", K::Constant),
    op(0xbc, "newarray", K::ArrayType),
    op(0xbd, "anewarray", K::Constant),
    op(0xbe, "arraylength", K::Implicit),
    op(0xbf, "athrow", K::Implicit),
    op(0xc0, "checkcast", K::Constant),
    op(0xc1, "instanceof", K::Constant),
    op(0xc2, "monitorenter", K::Implicit),
    op(0xc3, "monitorexit", K::Implicit),
    op(0xc4, "wide", K::Wide),
    op(0xc5, "multianewarray", K::MultiArray),
    op(0xc6, "ifnull", K::Branch),
    op(0xc7, "ifnonnull", K::Branch),
    op(0xc8, "goto_w", K::WideBranch),
    op(0xc9, "jsr_w", K::WideBranch),
    op(0xca, "breakpoint", K::Implicit),
];
