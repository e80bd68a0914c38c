//! Decoder for JVM class files.
//!
//! The constant pool is indexed once into an offset table and entries are decoded from
//! the borrowed buffer as they are resolved. The rest of the file is walked structurally,
//! and method bodies are decoded into flat instruction sequences.
//!
//! ```no_run
//! let bytes = std::fs::read("Hello.class").unwrap();
//! let class = classfile::decode(&bytes).unwrap();
//!
//! for method in &class.methods {
//!     println!("{}{}", method.name, method.descriptor);
//! }
//! ```

pub mod attributes;
pub mod bytecode;
pub mod bytes_ext;
pub mod classfile;
pub mod config;
pub mod constants;
pub mod encoding;
pub mod error;
pub mod flags;
pub mod opcode;
pub mod parser;
pub mod pool;

extern crate bytes;
extern crate enum_as_inner;

pub use bytecode::{Instruction, Operands};
pub use classfile::{ClassRecord, ConstantValue, ExceptionHandler, FieldRecord, MethodRecord};
pub use config::{ParserConfig, VersionPolicy};
pub use error::{DecodeError, DecodeResult};
pub use opcode::OpcodeDescriptor;
pub use parser::Parser;
pub use pool::{ConstantPool, ConstantTable, PoolEntry};

/// Decode a class file with the default configuration.
pub fn decode(data: &[u8]) -> DecodeResult<ClassRecord> {
    Parser::new(data).parse()
}
