//! Codec configuration
//!
//! The byte order is not self-describing on the wire: writer and reader of the
//! same stream must agree on it.

use crate::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_LENGTH};

/// Byte order for multi-byte fixed-width payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Network byte order
    #[default]
    Big,
    /// Little-endian
    Little,
}

/// Settings fixed for the lifetime of one encoder or decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    /// Byte order of fixed-width payloads and `String4` lengths
    pub endianness: Endianness,
    /// Largest length or element count accepted while decoding
    pub max_length: usize,
    /// Deepest struct/list/map nesting accepted while decoding or skipping
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            endianness: Endianness::Big,
            max_length: DEFAULT_MAX_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Create a config with default settings
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the byte order
    #[inline]
    pub fn with_endianness(mut self, endianness: Endianness) -> Self {
        self.endianness = endianness;
        self
    }

    /// Set the decode length limit
    #[inline]
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Set the decode nesting limit
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CodecConfig::default();
        assert_eq!(config.endianness, Endianness::Big);
        assert_eq!(config.max_length, DEFAULT_MAX_LENGTH);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_config_builder() {
        let config = CodecConfig::new()
            .with_endianness(Endianness::Little)
            .with_max_length(1024)
            .with_max_depth(8);
        assert_eq!(config.endianness, Endianness::Little);
        assert_eq!(config.max_length, 1024);
        assert_eq!(config.max_depth, 8);
    }
}
