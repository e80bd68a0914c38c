//! defines the bitflags used in class file parsing
//! these flags are used to determine access levels and features of various entities
//! this module defines a private macro to generate flag implementations based on a flag struct

use bitflags::bitflags;
use tracing::warn;

macro_rules! impl_flags {
    ( $flag_type:ident ) => {
        impl $flag_type {
            /// Unknown bits are reported and dropped, never rejected.
            pub fn from_raw(raw: u16) -> Self {
                let flags = <$flag_type>::from_bits_truncate(raw);

                if flags.bits() != raw {
                    warn!(
                        "unrecognised bits {:#06x} for {}",
                        raw & !flags.bits(),
                        stringify!($flag_type)
                    );
                }

                flags
            }

            pub fn has(&self, other: $flag_type) -> bool {
                self.contains(other)
            }
        }
    };
}

bitflags! {
    pub struct ClassAccessFlags: u16 {
         const PUBLIC = 0x0001;
         const FINAL = 0x0010;
         const SUPER = 0x0020;
         const INTERFACE = 0x0200;
         const ABSTRACT = 0x0400;
         const SYNTHETIC = 0x1000;
         const ANNOTATION = 0x2000;
         const ENUM = 0x4000;
         const MODULE = 0x8000;
    }
}

bitflags! {
    pub struct MethodAccessFlags: u16 {
         const PUBLIC = 0x0001;
         const PRIVATE = 0x0002;
         const PROTECTED = 0x0004;
         const STATIC = 0x0008;
         const FINAL = 0x0010;
         const SYNCHRONIZED = 0x0020;
         const BRIDGE = 0x0040;
         const VARARGS = 0x0080;
         const NATIVE = 0x0100;
         const ABSTRACT = 0x0400;
         const STRICT_FP = 0x0800;
         const SYNTHETIC = 0x1000;
    }
}

bitflags! {
    pub struct FieldAccessFlags: u16 {
         const PUBLIC = 0x0001;
         const PRIVATE = 0x0002;
         const PROTECTED = 0x0004;
         const STATIC = 0x0008;
         const FINAL = 0x0010;
         const VOLATILE = 0x0040;
         const TRANSIENT = 0x0080;
         const SYNTHETIC = 0x1000;
         const ENUM = 0x4000;
    }
}

impl_flags!(ClassAccessFlags);
impl_flags!(MethodAccessFlags);
impl_flags!(FieldAccessFlags);
