//! tagwire: tag-based compact binary serialization for RPC payloads
//!
//! Every field is written as a one or two byte head carrying its wire type and
//! tag, followed by a payload. Integers are narrowed to the smallest width that
//! holds them, zero values cost a single head byte, and readers locate fields
//! by tag so that optional fields can be omitted and unknown fields skipped.
//!
//! # Field Format
//!
//! ```text
//! Field  := Head Payload?
//! Head   := byte(type:4 tag:4)                  tag < 15
//!         | byte(type:4 0xF) byte(tag:8)         tag >= 15
//!
//! ZeroTag      -> (none)
//! Byte/Short/Int/Long -> 1/2/4/8 bytes
//! Float/Double -> 4/8 bytes (IEEE-754)
//! String1      -> u8 length + bytes
//! String4      -> u32 length + bytes
//! SimpleList   -> Head(Byte,0) + count(tag 0) + raw bytes
//! List         -> count(tag 0) + element(tag 0)*
//! Map          -> count(tag 0) + (key(tag 0) value(tag 1))*
//! StructBegin  -> Field* + Head(StructEnd,0)
//! ```
//!
//! Multi-byte payloads use one configured byte order (big-endian by default)
//! that writer and reader must agree on.
//!
//! # Features
//!
//! - Width narrowing on write, widening-tolerant reads
//! - Optional and required fields with caller-supplied defaults
//! - Forward/backward compatibility by skipping unknown tags
//! - Byte blobs, lists, maps and nested structs
//!
//! # Example
//!
//! ```rust
//! use std::io::{BufRead, Write};
//! use tagwire::{Decoder, Encoder, Field, Message, Result};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Trade {
//!     price: i64,
//!     symbol: String,
//!     tags: Vec<i8>,
//! }
//!
//! impl Message for Trade {
//!     fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
//!         self.price.write_field(enc, 0)?;
//!         self.symbol.write_field(enc, 1)?;
//!         self.tags.write_field(enc, 5)
//!     }
//!
//!     fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
//!         self.price.read_field(dec, 0, true)?;
//!         self.symbol.read_field(dec, 1, false)?;
//!         self.tags.read_field(dec, 5, false)
//!     }
//! }
//!
//! let trade = Trade { price: 0, symbol: "abc".into(), tags: vec![1, 2, 3] };
//! let bytes = tagwire::encode(&trade)?;
//! assert_eq!(
//!     &bytes[..],
//!     &[0xC0, 0x61, 0x03, b'a', b'b', b'c', 0xD5, 0x00, 0x00, 0x03, 1, 2, 3]
//! );
//!
//! let mut decoded = Trade::default();
//! tagwire::decode(&bytes, &mut decoded)?;
//! assert_eq!(decoded, trade);
//! # Ok::<(), tagwire::Error>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod field;
pub mod message;
pub mod wire_type;

use std::io::{Read, Write};

use bytes::Bytes;

// Re-export main types
pub use codec::TaggedCodec;
pub use config::{CodecConfig, Endianness};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{Error, Result};
pub use field::Field;
pub use message::Message;
pub use wire_type::{Head, WireType};

/// Default limit on decoded lengths and element counts (16MB - safety limit)
pub const DEFAULT_MAX_LENGTH: usize = 16 * 1024 * 1024;

/// Default limit on nested structs, lists and maps while decoding
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Encode a message with the default configuration
#[inline]
pub fn encode<M: Message>(value: &M) -> Result<Bytes> {
    TaggedCodec::new().encode(value)
}

/// Encode a message into a writer with the default configuration
#[inline]
pub fn encode_to<M: Message, W: Write>(value: &M, writer: W) -> Result<()> {
    TaggedCodec::new().encode_to(value, writer)
}

/// Decode a message from bytes with the default configuration
#[inline]
pub fn decode<M: Message>(bytes: &[u8], value: &mut M) -> Result<()> {
    TaggedCodec::new().decode(bytes, value)
}

/// Decode a message from a reader with the default configuration
#[inline]
pub fn decode_from<M: Message, R: Read>(reader: R, value: &mut M) -> Result<()> {
    TaggedCodec::new().decode_from(reader, value)
}
