//! Field decoder
//!
//! Fields are located by tag with a forward-only scan: heads with a smaller
//! tag are skipped, a larger tag or `StructEnd` means the field is absent and
//! the overshooting head is pushed back for the next lookup. This is what lets
//! old readers ignore fields added by newer writers.
//!
//! Readers accept any wire width narrower than or equal to their own and leave
//! the destination untouched when an optional field is absent.
//!
//! Structs, lists and maps are entered through [`Decoder::nested`], which
//! fails with `DepthLimitExceeded` past `CodecConfig::max_depth`.

use std::io::BufRead;

use tracing::{debug, trace};

use crate::config::CodecConfig;
use crate::cursor::ByteReader;
use crate::error::{Error, Result};
use crate::wire_type::{Head, WireType, TAG_ESCAPE};

/// Field decoder over any `BufRead` source
#[derive(Debug)]
pub struct Decoder<R> {
    input: ByteReader<R>,
    config: CodecConfig,
    depth: usize,
}

impl<'a> Decoder<&'a [u8]> {
    /// Create decoder over a byte slice with the default configuration
    #[inline]
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self::from_slice_with_config(buf, CodecConfig::default())
    }

    /// Create decoder over a byte slice with the given configuration
    ///
    /// The slice length bounds every decoded length prefix.
    #[inline]
    pub fn from_slice_with_config(buf: &'a [u8], config: CodecConfig) -> Self {
        Self {
            input: ByteReader::with_len(buf, config.endianness, buf.len()),
            config,
            depth: 0,
        }
    }
}

impl<R: BufRead> Decoder<R> {
    /// Create decoder over a stream with the default configuration
    #[inline]
    pub fn new(inner: R) -> Self {
        Self::with_config(inner, CodecConfig::default())
    }

    /// Create decoder over a stream with the given configuration
    #[inline]
    pub fn with_config(inner: R, config: CodecConfig) -> Self {
        Self {
            input: ByteReader::new(inner, config.endianness),
            config,
            depth: 0,
        }
    }

    /// Configuration this decoder was built with
    #[inline]
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.input.position()
    }

    /// Remaining input, when its length is known
    #[inline]
    pub fn remaining(&self) -> Option<usize> {
        self.input.remaining()
    }

    /// Current struct/list/map nesting level
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Run `f` one nesting level deeper
    pub fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let limit = self.config.max_depth;
        if self.depth >= limit {
            debug!(limit, "nesting limit exceeded");
            return Err(Error::DepthLimitExceeded { limit });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Unwrap the underlying source
    #[inline]
    pub fn into_inner(self) -> R {
        self.input.into_inner()
    }

    /// Read the next field head
    pub fn read_head(&mut self) -> Result<Head> {
        let first = self.input.get_u8()?;
        self.finish_head(first)
    }

    /// Read the next field head, or `None` at a clean end of input
    pub fn try_read_head(&mut self) -> Result<Option<Head>> {
        match self.input.try_get_u8()? {
            Some(first) => self.finish_head(first).map(Some),
            None => Ok(None),
        }
    }

    fn finish_head(&mut self, first: u8) -> Result<Head> {
        let (wire_type, nibble) = Head::split_first(first)?;
        let tag = if nibble == TAG_ESCAPE {
            self.input.get_u8()?
        } else {
            nibble
        };
        Ok(Head::new(wire_type, tag))
    }

    /// Push back a head that was just read
    pub fn unread_head(&mut self, head: Head) {
        let mut buf = [0u8; Head::MAX_SIZE];
        let n = head.encode(&mut buf);
        self.input.unread(&buf[..n]);
    }

    /// Scan forward to the field with `tag`
    ///
    /// Returns the wire type when found. Fields with smaller tags are skipped.
    /// A larger tag, `StructEnd`, or end of input means the field is absent:
    /// an error when `required`, otherwise `None` with the stream position
    /// restored.
    pub fn read_head_for(&mut self, tag: u8, required: bool) -> Result<Option<WireType>> {
        loop {
            let Some(head) = self.try_read_head()? else {
                return self.absent(tag, required);
            };
            if head.wire_type == WireType::StructEnd || head.tag > tag {
                self.unread_head(head);
                return self.absent(tag, required);
            }
            if head.tag == tag {
                return Ok(Some(head.wire_type));
            }
            trace!(tag = head.tag, wire_type = %head.wire_type, "skipping field");
            self.skip_field(head.wire_type)?;
        }
    }

    fn absent(&self, tag: u8, required: bool) -> Result<Option<WireType>> {
        if required {
            debug!(tag, "required field missing");
            return Err(Error::MissingRequiredField { tag });
        }
        Ok(None)
    }

    /// Scan to `tag` and require its wire type to be `expected`
    pub fn skip_to(&mut self, expected: WireType, tag: u8, required: bool) -> Result<bool> {
        match self.read_head_for(tag, required)? {
            Some(found) if found == expected => Ok(true),
            Some(found) => Err(Error::mismatch(tag, expected.name(), found)),
            None => Ok(false),
        }
    }

    /// Discard the payload of a field whose head was already read
    pub fn skip_field(&mut self, wire_type: WireType) -> Result<()> {
        if let Some(size) = wire_type.fixed_size() {
            return self.input.discard(size);
        }
        match wire_type {
            WireType::String1 => {
                let len = self.input.get_u8()? as usize;
                self.input.discard(len)
            }
            WireType::String4 => {
                let len = self.input.get_u32()? as usize;
                self.check_length(len)?;
                self.input.discard(len)
            }
            WireType::Map => {
                let count = self.read_count()?;
                self.nested(|dec| dec.skip_elements(count * 2))
            }
            WireType::List => {
                let count = self.read_count()?;
                self.nested(|dec| dec.skip_elements(count))
            }
            WireType::SimpleList => {
                let len = self.read_blob_len()?;
                self.input.discard(len)
            }
            WireType::StructBegin => self.nested(Self::skip_to_struct_end),
            _ => Ok(()),
        }
    }

    fn skip_elements(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            let head = self.read_head()?;
            self.skip_field(head.wire_type)?;
        }
        Ok(())
    }

    /// Skip every remaining field up to and including the next `StructEnd`
    pub fn skip_to_struct_end(&mut self) -> Result<()> {
        loop {
            let head = self.read_head()?;
            if head.wire_type == WireType::StructEnd {
                return Ok(());
            }
            trace!(tag = head.tag, wire_type = %head.wire_type, "skipping trailing field");
            self.skip_field(head.wire_type)?;
        }
    }

    /// Read a list or map element count (an i32 field at tag 0)
    pub fn read_count(&mut self) -> Result<usize> {
        let mut count = 0i32;
        self.read_i32(&mut count, 0, true)?;
        let len = usize::try_from(count).map_err(|_| Error::MalformedLength {
            length: count as i64,
        })?;
        self.check_length(len)?;
        // Every element takes at least one byte
        if let Some(remaining) = self.remaining() {
            if len > remaining {
                return Err(Error::MalformedLength { length: len as i64 });
            }
        }
        Ok(len)
    }

    fn check_length(&self, len: usize) -> Result<()> {
        if len > self.config.max_length {
            return Err(Error::MalformedLength { length: len as i64 });
        }
        Ok(())
    }

    fn read_blob_len(&mut self) -> Result<usize> {
        let inner = self.read_head()?;
        if inner.wire_type != WireType::Byte {
            return Err(Error::InvalidWireType(inner.wire_type.code()));
        }
        self.read_count()
    }

    /// Scan to `tag` and read an integer no wider than `widest`
    fn read_int(
        &mut self,
        tag: u8,
        required: bool,
        widest: WireType,
        expected: &'static str,
    ) -> Result<Option<i64>> {
        let Some(found) = self.read_head_for(tag, required)? else {
            return Ok(None);
        };
        let fits = found
            .fixed_size()
            .zip(widest.fixed_size())
            .is_some_and(|(width, limit)| width <= limit);
        let value = match found {
            WireType::ZeroTag => 0,
            WireType::Byte if fits => self.input.get_u8()? as i8 as i64,
            WireType::Short if fits => self.input.get_u16()? as i16 as i64,
            WireType::Int if fits => self.input.get_u32()? as i32 as i64,
            WireType::Long if fits => self.input.get_u64()? as i64,
            other => return Err(Error::mismatch(tag, expected, other)),
        };
        Ok(Some(value))
    }

    /// Read an i8 field
    pub fn read_i8(&mut self, data: &mut i8, tag: u8, required: bool) -> Result<()> {
        if let Some(v) = self.read_int(tag, required, WireType::Byte, "int8")? {
            *data = v as i8;
        }
        Ok(())
    }

    /// Read an i16 field
    pub fn read_i16(&mut self, data: &mut i16, tag: u8, required: bool) -> Result<()> {
        if let Some(v) = self.read_int(tag, required, WireType::Short, "int16")? {
            *data = v as i16;
        }
        Ok(())
    }

    /// Read an i32 field
    pub fn read_i32(&mut self, data: &mut i32, tag: u8, required: bool) -> Result<()> {
        if let Some(v) = self.read_int(tag, required, WireType::Int, "int32")? {
            *data = v as i32;
        }
        Ok(())
    }

    /// Read an i64 field
    pub fn read_i64(&mut self, data: &mut i64, tag: u8, required: bool) -> Result<()> {
        if let Some(v) = self.read_int(tag, required, WireType::Long, "int64")? {
            *data = v;
        }
        Ok(())
    }

    /// Read a u8 field (same bits as i8)
    pub fn read_u8(&mut self, data: &mut u8, tag: u8, required: bool) -> Result<()> {
        let mut n = *data as i8;
        self.read_i8(&mut n, tag, required)?;
        *data = n as u8;
        Ok(())
    }

    /// Read a u16 field (same bits as i16)
    pub fn read_u16(&mut self, data: &mut u16, tag: u8, required: bool) -> Result<()> {
        let mut n = *data as i16;
        self.read_i16(&mut n, tag, required)?;
        *data = n as u16;
        Ok(())
    }

    /// Read a u32 field (same bits as i32)
    pub fn read_u32(&mut self, data: &mut u32, tag: u8, required: bool) -> Result<()> {
        let mut n = *data as i32;
        self.read_i32(&mut n, tag, required)?;
        *data = n as u32;
        Ok(())
    }

    /// Read a u64 field (same bits as i64)
    pub fn read_u64(&mut self, data: &mut u64, tag: u8, required: bool) -> Result<()> {
        let mut n = *data as i64;
        self.read_i64(&mut n, tag, required)?;
        *data = n as u64;
        Ok(())
    }

    /// Read a bool field; any nonzero byte is `true`
    pub fn read_bool(&mut self, data: &mut bool, tag: u8, required: bool) -> Result<()> {
        if let Some(v) = self.read_int(tag, required, WireType::Byte, "bool")? {
            *data = v != 0;
        }
        Ok(())
    }

    /// Read an f32 field
    pub fn read_f32(&mut self, data: &mut f32, tag: u8, required: bool) -> Result<()> {
        match self.read_head_for(tag, required)? {
            None => {}
            Some(WireType::ZeroTag) => *data = 0.0,
            Some(WireType::Float) => *data = f32::from_bits(self.input.get_u32()?),
            Some(other) => return Err(Error::mismatch(tag, "float", other)),
        }
        Ok(())
    }

    /// Read an f64 field
    ///
    /// `Float` is rejected so a double never silently loses precision.
    pub fn read_f64(&mut self, data: &mut f64, tag: u8, required: bool) -> Result<()> {
        match self.read_head_for(tag, required)? {
            None => {}
            Some(WireType::ZeroTag) => *data = 0.0,
            Some(WireType::Double) => *data = f64::from_bits(self.input.get_u64()?),
            Some(other) => return Err(Error::mismatch(tag, "double", other)),
        }
        Ok(())
    }

    /// Read a string field
    pub fn read_string(&mut self, data: &mut String, tag: u8, required: bool) -> Result<()> {
        let len = match self.read_head_for(tag, required)? {
            None => return Ok(()),
            Some(WireType::String1) => self.input.get_u8()? as usize,
            Some(WireType::String4) => {
                let len = self.input.get_u32()? as usize;
                self.check_length(len)?;
                len
            }
            Some(other) => return Err(Error::mismatch(tag, "string", other)),
        };
        let bytes = self.input.get_bytes(len)?;
        *data = String::from_utf8(bytes).map_err(|_| Error::InvalidUtf8 { tag })?;
        Ok(())
    }

    /// Read a byte blob field
    pub fn read_bytes(&mut self, data: &mut Vec<u8>, tag: u8, required: bool) -> Result<()> {
        if let Some(bytes) = self.read_blob(tag, required)? {
            *data = bytes;
        }
        Ok(())
    }

    /// Read a signed byte blob field
    pub fn read_i8_vec(&mut self, data: &mut Vec<i8>, tag: u8, required: bool) -> Result<()> {
        if let Some(bytes) = self.read_blob(tag, required)? {
            *data = bytes.into_iter().map(|b| b as i8).collect();
        }
        Ok(())
    }

    fn read_blob(&mut self, tag: u8, required: bool) -> Result<Option<Vec<u8>>> {
        match self.read_head_for(tag, required)? {
            None => Ok(None),
            Some(WireType::SimpleList) => {
                let len = self.read_blob_len()?;
                Ok(Some(self.input.get_bytes(len)?))
            }
            Some(other) => Err(Error::mismatch(tag, "bytes", other)),
        }
    }

    /// Scan to the `StructBegin` head of a nested struct
    ///
    /// Returns false when an optional struct is absent.
    #[inline]
    pub fn begin_struct(&mut self, tag: u8, required: bool) -> Result<bool> {
        self.skip_to(WireType::StructBegin, tag, required)
    }

    /// Read a raw fixed 4-byte length word
    #[inline]
    pub fn read_length(&mut self) -> Result<u32> {
        self.input.get_u32()
    }

    /// Read `len` raw bytes without head or length prefix
    pub fn read_raw(&mut self, len: usize) -> Result<Vec<u8>> {
        self.check_length(len)?;
        self.input.get_bytes(len)
    }
}
