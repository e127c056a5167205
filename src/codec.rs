//! Whole-message codec
//!
//! [`TaggedCodec`] binds one [`CodecConfig`] and encodes or decodes top-level
//! [`Message`] values. The transport layer owns one per configured byte order
//! and passes it wherever payloads are framed.

use std::io::{BufReader, BufWriter, Read, Write};

use bytes::Bytes;
use tracing::debug;

use crate::config::CodecConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::message::Message;

/// Encodes and decodes top-level messages with a fixed configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaggedCodec {
    config: CodecConfig,
}

impl TaggedCodec {
    /// Codec name as advertised to the transport layer
    pub const NAME: &'static str = "tagwire";

    /// Create codec with the default configuration
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create codec with the given configuration
    #[inline]
    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Codec name
    #[inline]
    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// Configuration in use
    #[inline]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Encode a message into a new buffer
    pub fn encode<M: Message>(&self, value: &M) -> Result<Bytes> {
        let mut enc = Encoder::with_config(Vec::new(), self.config);
        value.write_to(&mut enc)?;
        let buf = enc.into_inner()?;
        debug!(len = buf.len(), "encoded message");
        Ok(Bytes::from(buf))
    }

    /// Encode a message into a writer
    ///
    /// Output is buffered and flushed before returning.
    pub fn encode_to<M: Message, W: Write>(&self, value: &M, writer: W) -> Result<()> {
        let mut enc = Encoder::with_config(BufWriter::new(writer), self.config);
        value.write_to(&mut enc)?;
        let written = enc.position();
        enc.into_inner()?;
        debug!(len = written, "encoded message to writer");
        Ok(())
    }

    /// Decode a message from a byte slice
    pub fn decode<M: Message>(&self, bytes: &[u8], value: &mut M) -> Result<()> {
        let mut dec = Decoder::from_slice_with_config(bytes, self.config);
        value.read_from(&mut dec)?;
        debug!(len = dec.position(), "decoded message");
        Ok(())
    }

    /// Decode a message from a reader
    ///
    /// The reader is wrapped in a `BufReader` and may be read past the end of
    /// the message; give it a reader bounded to exactly one message.
    pub fn decode_from<M: Message, R: Read>(&self, reader: R, value: &mut M) -> Result<()> {
        let mut dec = Decoder::with_config(BufReader::new(reader), self.config);
        value.read_from(&mut dec)?;
        debug!(len = dec.position(), "decoded message from reader");
        Ok(())
    }
}
