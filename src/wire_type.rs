//! Wire type table and field head packing
//!
//! Every field on the wire starts with a head naming its wire type and tag:
//!
//! ```text
//! tag < 15:   +-----------+----------+
//!             | type (4)  | tag (4)  |
//!             +-----------+----------+
//! tag >= 15:  +-----------+----------+-----------+
//!             | type (4)  | 0xF (4)  | tag (8)   |
//!             +-----------+----------+-----------+
//! ```

use crate::error::{Error, Result};

/// Low nibble value that escapes to a second tag byte
pub const TAG_ESCAPE: u8 = 0x0F;

/// Wire type codes, the only type information ever placed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// 1-byte integer payload
    Byte = 0,
    /// 2-byte integer payload
    Short = 1,
    /// 4-byte integer payload
    Int = 2,
    /// 8-byte integer payload
    Long = 3,
    /// 4-byte IEEE-754 payload
    Float = 4,
    /// 8-byte IEEE-754 payload
    Double = 5,
    /// String with 1-byte length prefix
    String1 = 6,
    /// String with 4-byte length prefix
    String4 = 7,
    /// Map of key/value pairs
    Map = 8,
    /// Homogeneous list
    List = 9,
    /// Start of a nested struct
    StructBegin = 10,
    /// End of a nested struct
    StructEnd = 11,
    /// Zero value, no payload
    ZeroTag = 12,
    /// Raw byte blob
    SimpleList = 13,
}

impl WireType {
    /// Convert a 4-bit code into a wire type
    #[inline]
    pub fn from_u8(code: u8) -> Result<Self> {
        Ok(match code {
            0 => WireType::Byte,
            1 => WireType::Short,
            2 => WireType::Int,
            3 => WireType::Long,
            4 => WireType::Float,
            5 => WireType::Double,
            6 => WireType::String1,
            7 => WireType::String4,
            8 => WireType::Map,
            9 => WireType::List,
            10 => WireType::StructBegin,
            11 => WireType::StructEnd,
            12 => WireType::ZeroTag,
            13 => WireType::SimpleList,
            other => return Err(Error::InvalidWireType(other)),
        })
    }

    /// Numeric code of this wire type
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name used in error messages
    pub const fn name(self) -> &'static str {
        match self {
            WireType::Byte => "Byte",
            WireType::Short => "Short",
            WireType::Int => "Int",
            WireType::Long => "Long",
            WireType::Float => "Float",
            WireType::Double => "Double",
            WireType::String1 => "String1",
            WireType::String4 => "String4",
            WireType::Map => "Map",
            WireType::List => "List",
            WireType::StructBegin => "StructBegin",
            WireType::StructEnd => "StructEnd",
            WireType::ZeroTag => "ZeroTag",
            WireType::SimpleList => "SimpleList",
        }
    }

    /// Payload size for fixed-width types, `None` for length-prefixed or nested ones
    #[inline]
    pub const fn fixed_size(self) -> Option<usize> {
        match self {
            WireType::Byte => Some(1),
            WireType::Short => Some(2),
            WireType::Int | WireType::Float => Some(4),
            WireType::Long | WireType::Double => Some(8),
            WireType::StructEnd | WireType::ZeroTag => Some(0),
            _ => None,
        }
    }
}

impl core::fmt::Display for WireType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Field head: the (type, tag) prefix of every field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head {
    /// Wire type of the payload that follows
    pub wire_type: WireType,
    /// Field tag
    pub tag: u8,
}

impl Head {
    /// Maximum encoded head size in bytes
    pub const MAX_SIZE: usize = 2;

    /// Create a new head
    #[inline]
    pub const fn new(wire_type: WireType, tag: u8) -> Self {
        Self { wire_type, tag }
    }

    /// Number of bytes this head occupies on the wire
    #[inline]
    pub const fn encoded_len(&self) -> usize {
        encoded_head_len(self.tag)
    }

    /// Encode head into `buf`, returning the number of bytes used
    #[inline]
    pub fn encode(&self, buf: &mut [u8; Self::MAX_SIZE]) -> usize {
        let ty = self.wire_type.code() << 4;
        if self.tag < TAG_ESCAPE {
            buf[0] = ty | self.tag;
            1
        } else {
            buf[0] = ty | TAG_ESCAPE;
            buf[1] = self.tag;
            2
        }
    }

    /// Split the first head byte into its wire type and low nibble
    ///
    /// A nibble of [`TAG_ESCAPE`] means the real tag is in the next byte.
    #[inline]
    pub fn split_first(byte: u8) -> Result<(WireType, u8)> {
        let wire_type = WireType::from_u8(byte >> 4)?;
        Ok((wire_type, byte & 0x0F))
    }
}

/// Bytes needed to encode a head with the given tag
#[inline]
pub const fn encoded_head_len(tag: u8) -> usize {
    if tag < TAG_ESCAPE {
        1
    } else {
        2
    }
}
