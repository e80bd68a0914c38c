use std::ops::RangeInclusive;

use crate::constants::{
    FIRST_STRICT_MINOR_MAJOR, MAX_SUPPORTED_MAJOR, MIN_SUPPORTED_MAJOR, PREVIEW_MINOR,
};

/// What to do with a class file whose version is outside the accepted range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionPolicy {
    Reject,
    /// Log the version and keep decoding
    Warn,
}

#[derive(Debug, Clone)]
pub struct ParserConfig {
    pub major_versions: RangeInclusive<u16>,
    pub version_policy: VersionPolicy,
    pub allow_trailing_bytes: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            major_versions: MIN_SUPPORTED_MAJOR..=MAX_SUPPORTED_MAJOR,
            version_policy: VersionPolicy::Reject,
            allow_trailing_bytes: false,
        }
    }
}

impl ParserConfig {
    pub fn lenient() -> Self {
        Self {
            version_policy: VersionPolicy::Warn,
            allow_trailing_bytes: true,
            ..Self::default()
        }
    }

    pub fn accepts_version(&self, major: u16, minor: u16) -> bool {
        if !self.major_versions.contains(&major) {
            return false;
        }

        major < FIRST_STRICT_MINOR_MAJOR || minor == 0 || minor == PREVIEW_MINOR
    }
}
