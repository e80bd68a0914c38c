use thiserror::Error;

pub type DecodeResult<T> = Result<T, DecodeError>;

/// Every failure the decoder can report. All of them end the current decode call;
/// offsets are absolute positions in the input buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid magic value {found:#010x}")]
    BadMagic { found: u32 },

    #[error("unsupported class file version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("truncated input at offset {offset} (needed {needed} bytes, {remaining} remaining)")]
    TruncatedInput {
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("malformed constant pool entry #{index} at offset {offset} (reason: {reason})")]
    MalformedPool {
        index: u16,
        offset: usize,
        reason: String,
    },

    #[error("malformed attribute '{name}' at offset {offset} (reason: {reason})")]
    MalformedAttribute {
        name: String,
        offset: usize,
        reason: String,
    },

    #[error("malformed instruction at offset {offset} (reason: {reason})")]
    MalformedInstruction { offset: usize, reason: String },

    #[error("classfile has {count} extra bytes at offset {offset}")]
    TrailingBytes { offset: usize, count: usize },
}

impl DecodeError {
    pub(crate) fn pool(index: u16, offset: usize, reason: impl Into<String>) -> Self {
        DecodeError::MalformedPool {
            index,
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn attribute(name: &str, offset: usize, reason: impl Into<String>) -> Self {
        DecodeError::MalformedAttribute {
            name: name.to_string(),
            offset,
            reason: reason.into(),
        }
    }

    pub(crate) fn instruction(offset: usize, reason: impl Into<String>) -> Self {
        DecodeError::MalformedInstruction {
            offset,
            reason: reason.into(),
        }
    }

    /// The byte offset the error was detected at, where one is known.
    pub fn offset(&self) -> Option<usize> {
        match self {
            DecodeError::BadMagic { .. } => Some(0),
            DecodeError::UnsupportedVersion { .. } => Some(4),
            DecodeError::TruncatedInput { offset, .. }
            | DecodeError::MalformedPool { offset, .. }
            | DecodeError::MalformedAttribute { offset, .. }
            | DecodeError::MalformedInstruction { offset, .. }
            | DecodeError::TrailingBytes { offset, .. } => Some(*offset),
        }
    }
}
