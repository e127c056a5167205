//! Field encoder
//!
//! Writes heads and payloads through a [`ByteWriter`]. Integer writers narrow
//! every value to the smallest wire type that holds it, and zero values of
//! any numeric type cost a single `ZeroTag` head.
//!
//! Callers must write the fields of one struct in non-decreasing tag order;
//! the encoder does not check this.

use std::io::Write;

use crate::config::CodecConfig;
use crate::cursor::ByteWriter;
use crate::error::{Error, Result};
use crate::wire_type::{Head, WireType};

/// Field encoder that writes into any `Write` sink
#[derive(Debug)]
pub struct Encoder<W> {
    out: ByteWriter<W>,
    config: CodecConfig,
}

impl<W: Write> Encoder<W> {
    /// Create new encoder with the default configuration
    #[inline]
    pub fn new(inner: W) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Create new encoder with the given configuration
    #[inline]
    pub fn with_config(inner: W, config: CodecConfig) -> Self {
        Self {
            out: ByteWriter::new(inner, config.endianness),
            config,
        }
    }

    /// Configuration this encoder was built with
    #[inline]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Write a field head
    #[inline]
    pub fn write_head(&mut self, wire_type: WireType, tag: u8) -> Result<()> {
        let mut buf = [0u8; Head::MAX_SIZE];
        let n = Head::new(wire_type, tag).encode(&mut buf);
        self.out.put_bytes(&buf[..n])
    }

    /// Write an i8 value
    #[inline]
    pub fn write_i8(&mut self, value: i8, tag: u8) -> Result<()> {
        if value == 0 {
            return self.write_head(WireType::ZeroTag, tag);
        }
        self.write_head(WireType::Byte, tag)?;
        self.out.put_u8(value as u8)
    }

    /// Write an i16 value, narrowed to a byte when it fits
    #[inline]
    pub fn write_i16(&mut self, value: i16, tag: u8) -> Result<()> {
        if let Ok(v) = i8::try_from(value) {
            return self.write_i8(v, tag);
        }
        self.write_head(WireType::Short, tag)?;
        self.out.put_u16(value as u16)
    }

    /// Write an i32 value, narrowed when it fits
    #[inline]
    pub fn write_i32(&mut self, value: i32, tag: u8) -> Result<()> {
        if let Ok(v) = i16::try_from(value) {
            return self.write_i16(v, tag);
        }
        self.write_head(WireType::Int, tag)?;
        self.out.put_u32(value as u32)
    }

    /// Write an i64 value, narrowed when it fits
    #[inline]
    pub fn write_i64(&mut self, value: i64, tag: u8) -> Result<()> {
        if let Ok(v) = i32::try_from(value) {
            return self.write_i32(v, tag);
        }
        self.write_head(WireType::Long, tag)?;
        self.out.put_u64(value as u64)
    }

    /// Write a u8 value (same bits as i8)
    #[inline]
    pub fn write_u8(&mut self, value: u8, tag: u8) -> Result<()> {
        self.write_i8(value as i8, tag)
    }

    /// Write a u16 value (same bits as i16)
    #[inline]
    pub fn write_u16(&mut self, value: u16, tag: u8) -> Result<()> {
        self.write_i16(value as i16, tag)
    }

    /// Write a u32 value (same bits as i32)
    #[inline]
    pub fn write_u32(&mut self, value: u32, tag: u8) -> Result<()> {
        self.write_i32(value as i32, tag)
    }

    /// Write a u64 value (same bits as i64)
    #[inline]
    pub fn write_u64(&mut self, value: u64, tag: u8) -> Result<()> {
        self.write_i64(value as i64, tag)
    }

    /// Write a bool as a 0/1 byte
    #[inline]
    pub fn write_bool(&mut self, value: bool, tag: u8) -> Result<()> {
        self.write_i8(value as i8, tag)
    }

    /// Write an f32 value
    #[inline]
    pub fn write_f32(&mut self, value: f32, tag: u8) -> Result<()> {
        if value == 0.0 {
            return self.write_head(WireType::ZeroTag, tag);
        }
        self.write_head(WireType::Float, tag)?;
        self.out.put_u32(value.to_bits())
    }

    /// Write an f64 value
    ///
    /// Never narrowed to `Float`: the round trip through f32 loses precision.
    #[inline]
    pub fn write_f64(&mut self, value: f64, tag: u8) -> Result<()> {
        if value == 0.0 {
            return self.write_head(WireType::ZeroTag, tag);
        }
        self.write_head(WireType::Double, tag)?;
        self.out.put_u64(value.to_bits())
    }

    /// Write a string with a 1-byte or 4-byte length prefix
    pub fn write_string(&mut self, value: &str, tag: u8) -> Result<()> {
        let bytes = value.as_bytes();
        match u8::try_from(bytes.len()) {
            Ok(len) => {
                self.write_head(WireType::String1, tag)?;
                self.out.put_u8(len)?;
            }
            Err(_) => {
                let len = u32::try_from(bytes.len()).map_err(|_| Error::MalformedLength {
                    length: bytes.len() as i64,
                })?;
                self.write_head(WireType::String4, tag)?;
                self.out.put_u32(len)?;
            }
        }
        self.out.put_bytes(bytes)
    }

    /// Write a byte blob as a `SimpleList`
    pub fn write_bytes(&mut self, value: &[u8], tag: u8) -> Result<()> {
        self.write_head(WireType::SimpleList, tag)?;
        self.write_head(WireType::Byte, 0)?;
        self.write_count(value.len())?;
        self.out.put_bytes(value)
    }

    /// Write a signed byte blob as a `SimpleList`
    pub fn write_i8_slice(&mut self, value: &[i8], tag: u8) -> Result<()> {
        let bytes: Vec<u8> = value.iter().map(|&b| b as u8).collect();
        self.write_bytes(&bytes, tag)
    }

    /// Write a list or map element count as an i32 field at tag 0
    pub fn write_count(&mut self, len: usize) -> Result<()> {
        let len = i32::try_from(len).map_err(|_| Error::MalformedLength { length: len as i64 })?;
        self.write_i32(len, 0)
    }

    /// Write the `StructBegin` head of a nested struct
    #[inline]
    pub fn begin_struct(&mut self, tag: u8) -> Result<()> {
        self.write_head(WireType::StructBegin, tag)
    }

    /// Write the `StructEnd` head closing a nested struct
    #[inline]
    pub fn end_struct(&mut self) -> Result<()> {
        self.write_head(WireType::StructEnd, 0)
    }

    /// Write a raw fixed 4-byte length word
    #[inline]
    pub fn write_length(&mut self, len: u32) -> Result<()> {
        self.out.put_u32(len)
    }

    /// Write raw bytes without head or length prefix
    #[inline]
    pub fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.out.put_bytes(bytes)
    }

    /// Get current position in the output
    #[inline]
    pub fn position(&self) -> usize {
        self.out.position()
    }

    /// Borrow the underlying sink
    #[inline]
    pub fn get_ref(&self) -> &W {
        self.out.get_ref()
    }

    /// Flush buffered output to the sink
    #[inline]
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()
    }

    /// Flush and return the underlying sink
    pub fn into_inner(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Endianness;

    fn encoded(f: impl FnOnce(&mut Encoder<Vec<u8>>) -> Result<()>) -> Vec<u8> {
        let mut enc = Encoder::new(Vec::new());
        f(&mut enc).unwrap();
        enc.into_inner().unwrap()
    }

    #[test]
    fn test_encoder_zero_values() {
        for tag in [0u8, 7, 14] {
            assert_eq!(encoded(|e| e.write_i64(0, tag)), vec![0xC0 | tag]);
            assert_eq!(encoded(|e| e.write_u32(0, tag)), vec![0xC0 | tag]);
            assert_eq!(encoded(|e| e.write_f32(0.0, tag)), vec![0xC0 | tag]);
            assert_eq!(encoded(|e| e.write_f64(0.0, tag)), vec![0xC0 | tag]);
        }
        assert_eq!(encoded(|e| e.write_i8(0, 200)), vec![0xCF, 200]);
    }

    #[test]
    fn test_encoder_narrowing() {
        assert_eq!(encoded(|e| e.write_i64(-1, 0)), vec![0x00, 0xFF]);
        assert_eq!(encoded(|e| e.write_i64(127, 1)), vec![0x01, 0x7F]);
        assert_eq!(encoded(|e| e.write_i64(128, 1)), vec![0x11, 0x00, 0x80]);
        assert_eq!(
            encoded(|e| e.write_i64(i16::MIN as i64 - 1, 2)),
            vec![0x22, 0xFF, 0xFF, 0x7F, 0xFF]
        );
        assert_eq!(
            encoded(|e| e.write_i64(i32::MAX as i64 + 1, 3)),
            vec![0x33, 0, 0, 0, 0, 0x80, 0, 0, 0]
        );
    }

    #[test]
    fn test_encoder_unsigned_reinterprets_bits() {
        // 255u8 is -1i8 on the wire
        assert_eq!(encoded(|e| e.write_u8(255, 0)), vec![0x00, 0xFF]);
        // 40000u16 does not fit i8, stays Short
        assert_eq!(encoded(|e| e.write_u16(40000, 0)), vec![0x10, 0x9C, 0x40]);
        assert_eq!(encoded(|e| e.write_u64(u64::MAX, 0)), vec![0x00, 0xFF]);
    }

    #[test]
    fn test_encoder_bool() {
        assert_eq!(encoded(|e| e.write_bool(true, 4)), vec![0x04, 0x01]);
        assert_eq!(encoded(|e| e.write_bool(false, 4)), vec![0xC4]);
    }

    #[test]
    fn test_encoder_double_not_narrowed() {
        let bytes = encoded(|e| e.write_f64(1.5, 0));
        assert_eq!(bytes[0], 0x50);
        assert_eq!(bytes.len(), 9);
        assert_eq!(&bytes[1..], &1.5f64.to_bits().to_be_bytes());
    }

    #[test]
    fn test_encoder_string_prefix_width() {
        let short = "x".repeat(255);
        let bytes = encoded(|e| e.write_string(&short, 1));
        assert_eq!(&bytes[..2], &[0x61, 255]);
        assert_eq!(bytes.len(), 2 + 255);

        let long = "y".repeat(256);
        let bytes = encoded(|e| e.write_string(&long, 1));
        assert_eq!(&bytes[..5], &[0x71, 0, 0, 1, 0]);
        assert_eq!(bytes.len(), 5 + 256);
    }

    #[test]
    fn test_encoder_bytes_blob() {
        assert_eq!(
            encoded(|e| e.write_bytes(&[1, 2, 3], 5)),
            vec![0xD5, 0x00, 0x00, 0x03, 1, 2, 3]
        );
        assert_eq!(
            encoded(|e| e.write_i8_slice(&[-1, 0], 0)),
            vec![0xD0, 0x00, 0x00, 0x02, 0xFF, 0x00]
        );
        assert_eq!(encoded(|e| e.write_bytes(&[], 0)), vec![0xD0, 0x00, 0xC0]);
    }

    #[test]
    fn test_encoder_struct_framing() {
        let bytes = encoded(|e| {
            e.begin_struct(20)?;
            e.write_i32(1, 0)?;
            e.end_struct()
        });
        assert_eq!(bytes, vec![0xAF, 20, 0x00, 0x01, 0xB0]);
    }

    #[test]
    fn test_encoder_little_endian() {
        let config = CodecConfig::new().with_endianness(Endianness::Little);
        let mut enc = Encoder::with_config(Vec::new(), config);
        enc.write_i32(0x01020304, 0).unwrap();
        enc.write_length(1).unwrap();
        assert_eq!(enc.position(), 9);
        assert_eq!(
            enc.into_inner().unwrap(),
            vec![0x20, 0x04, 0x03, 0x02, 0x01, 1, 0, 0, 0]
        );
    }
}
