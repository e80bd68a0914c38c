pub const MAGIC: u32 = 0xCAFEBABE;

/// magic (4) + minor (2) + major (2) + constant_pool_count (2)
pub const POOL_START: usize = 10;

pub const MIN_SUPPORTED_MAJOR: u16 = 45;
pub const MAX_SUPPORTED_MAJOR: u16 = 65;

/// From Java 12 (major 56) onwards, the minor version must be 0,
/// or this marker for preview features
pub const PREVIEW_MINOR: u16 = 0xFFFF;
pub const FIRST_STRICT_MINOR_MAJOR: u16 = 56;

/// Every attribute starts with a name index (u2) followed by a length (u4)
pub const ATTRIBUTE_HEADER_SIZE: usize = 6;

pub mod attribute {
    pub const CODE: &str = "Code";
    pub const CONSTANT_VALUE: &str = "ConstantValue";
    pub const DEPRECATED: &str = "Deprecated";
    pub const EXCEPTIONS: &str = "Exceptions";
    pub const SOURCE_FILE: &str = "SourceFile";
    pub const SYNTHETIC: &str = "Synthetic";
}
