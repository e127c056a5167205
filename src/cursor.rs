//! Primitive byte cursors over an underlying stream
//!
//! [`ByteWriter`] and [`ByteReader`] move fixed-width words and raw byte runs
//! in the configured byte order. They know nothing about heads or tags.

use std::io::{BufRead, ErrorKind, Write};

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use crate::config::Endianness;
use crate::error::{Error, Result};
use crate::wire_type::Head;

/// Write cursor over any `Write` sink
#[derive(Debug)]
pub struct ByteWriter<W> {
    inner: W,
    endianness: Endianness,
    written: usize,
}

impl<W: Write> ByteWriter<W> {
    /// Create new writer with the given byte order
    #[inline]
    pub fn new(inner: W, endianness: Endianness) -> Self {
        Self {
            inner,
            endianness,
            written: 0,
        }
    }

    /// Write a u8 value
    #[inline]
    pub fn put_u8(&mut self, value: u8) -> Result<()> {
        self.inner.write_u8(value)?;
        self.written += 1;
        Ok(())
    }

    /// Write a u16 value
    #[inline]
    pub fn put_u16(&mut self, value: u16) -> Result<()> {
        match self.endianness {
            Endianness::Big => self.inner.write_u16::<BigEndian>(value)?,
            Endianness::Little => self.inner.write_u16::<LittleEndian>(value)?,
        }
        self.written += 2;
        Ok(())
    }

    /// Write a u32 value
    #[inline]
    pub fn put_u32(&mut self, value: u32) -> Result<()> {
        match self.endianness {
            Endianness::Big => self.inner.write_u32::<BigEndian>(value)?,
            Endianness::Little => self.inner.write_u32::<LittleEndian>(value)?,
        }
        self.written += 4;
        Ok(())
    }

    /// Write a u64 value
    #[inline]
    pub fn put_u64(&mut self, value: u64) -> Result<()> {
        match self.endianness {
            Endianness::Big => self.inner.write_u64::<BigEndian>(value)?,
            Endianness::Little => self.inner.write_u64::<LittleEndian>(value)?,
        }
        self.written += 8;
        Ok(())
    }

    /// Write raw bytes without length prefix
    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.written += bytes.len();
        Ok(())
    }

    /// Bytes written so far
    #[inline]
    pub fn position(&self) -> usize {
        self.written
    }

    /// Flush the underlying sink
    #[inline]
    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Borrow the underlying sink
    #[inline]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwrap the underlying sink
    #[inline]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// Read cursor over any `BufRead` source
///
/// Holds up to one pushed-back head so a field scan that overshoots can
/// restore the stream position.
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
    endianness: Endianness,
    pending: [u8; Head::MAX_SIZE],
    pending_len: usize,
    consumed: usize,
    total: Option<usize>,
}

impl<R: BufRead> ByteReader<R> {
    /// Create new reader with the given byte order
    #[inline]
    pub fn new(inner: R, endianness: Endianness) -> Self {
        Self {
            inner,
            endianness,
            pending: [0; Head::MAX_SIZE],
            pending_len: 0,
            consumed: 0,
            total: None,
        }
    }

    /// Create reader over a source whose total length is known
    #[inline]
    pub fn with_len(inner: R, endianness: Endianness, total: usize) -> Self {
        let mut reader = Self::new(inner, endianness);
        reader.total = Some(total);
        reader
    }

    /// Bytes consumed so far
    #[inline]
    pub fn position(&self) -> usize {
        self.consumed
    }

    /// Remaining bytes, when the source length is known
    #[inline]
    pub fn remaining(&self) -> Option<usize> {
        self.total.map(|t| t.saturating_sub(self.consumed))
    }

    /// Read a u8, or `None` on a clean end of input
    #[inline]
    pub fn try_get_u8(&mut self) -> Result<Option<u8>> {
        if let Some(b) = self.pop_pending() {
            return Ok(Some(b));
        }
        let buf = self.inner.fill_buf()?;
        let Some(&b) = buf.first() else {
            return Ok(None);
        };
        self.inner.consume(1);
        self.consumed += 1;
        Ok(Some(b))
    }

    /// Read a u8 value
    #[inline]
    pub fn get_u8(&mut self) -> Result<u8> {
        self.try_get_u8()?
            .ok_or_else(|| Error::Io(ErrorKind::UnexpectedEof.into()))
    }

    /// Read a u16 value
    #[inline]
    pub fn get_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.fill(&mut buf)?;
        Ok(match self.endianness {
            Endianness::Big => BigEndian::read_u16(&buf),
            Endianness::Little => LittleEndian::read_u16(&buf),
        })
    }

    /// Read a u32 value
    #[inline]
    pub fn get_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.fill(&mut buf)?;
        Ok(match self.endianness {
            Endianness::Big => BigEndian::read_u32(&buf),
            Endianness::Little => LittleEndian::read_u32(&buf),
        })
    }

    /// Read a u64 value
    #[inline]
    pub fn get_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.fill(&mut buf)?;
        Ok(match self.endianness {
            Endianness::Big => BigEndian::read_u64(&buf),
            Endianness::Little => LittleEndian::read_u64(&buf),
        })
    }

    /// Read exactly `len` bytes of a length-prefixed payload
    pub fn get_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.check_remaining(len)?;
        let mut buf = vec![0u8; len];
        self.fill(&mut buf).map_err(|e| truncated(e, len))?;
        Ok(buf)
    }

    /// Discard exactly `len` bytes
    pub fn discard(&mut self, len: usize) -> Result<()> {
        self.check_remaining(len)?;
        let mut left = len;
        while left > 0 && self.pop_pending().is_some() {
            left -= 1;
        }
        while left > 0 {
            let available = self.inner.fill_buf()?.len();
            if available == 0 {
                return Err(Error::MalformedLength { length: len as i64 });
            }
            let n = available.min(left);
            self.inner.consume(n);
            self.consumed += n;
            left -= n;
        }
        Ok(())
    }

    /// Push back bytes that were just read
    ///
    /// Only the bytes of the most recent head may be pushed back.
    pub fn unread(&mut self, bytes: &[u8]) {
        debug_assert!(self.pending_len + bytes.len() <= Head::MAX_SIZE);
        let n = bytes.len().min(Head::MAX_SIZE - self.pending_len);
        self.pending.copy_within(0..self.pending_len, n);
        self.pending[..n].copy_from_slice(&bytes[..n]);
        self.pending_len += n;
        self.consumed -= n;
    }

    /// Unwrap the underlying source
    #[inline]
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn pop_pending(&mut self) -> Option<u8> {
        if self.pending_len == 0 {
            return None;
        }
        let b = self.pending[0];
        self.pending.copy_within(1..self.pending_len, 0);
        self.pending_len -= 1;
        self.consumed += 1;
        Some(b)
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut start = 0;
        while start < buf.len() {
            match self.pop_pending() {
                Some(b) => {
                    buf[start] = b;
                    start += 1;
                }
                None => break,
            }
        }
        self.inner.read_exact(&mut buf[start..])?;
        self.consumed += buf.len() - start;
        Ok(())
    }

    fn check_remaining(&self, len: usize) -> Result<()> {
        match self.remaining() {
            Some(remaining) if len > remaining => Err(Error::MalformedLength { length: len as i64 }),
            _ => Ok(()),
        }
    }
}

fn truncated(err: Error, len: usize) -> Error {
    match err {
        Error::Io(e) if e.kind() == ErrorKind::UnexpectedEof => {
            Error::MalformedLength { length: len as i64 }
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writer_big_endian() {
        let mut w = ByteWriter::new(Vec::new(), Endianness::Big);
        w.put_u8(0xAB).unwrap();
        w.put_u16(0x0102).unwrap();
        w.put_u32(0x03040506).unwrap();
        assert_eq!(w.position(), 7);
        assert_eq!(w.into_inner(), vec![0xAB, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
    }

    #[test]
    fn test_writer_little_endian() {
        let mut w = ByteWriter::new(Vec::new(), Endianness::Little);
        w.put_u16(0x0102).unwrap();
        w.put_u64(1).unwrap();
        assert_eq!(w.into_inner(), vec![0x02, 0x01, 1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_reader_operations() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8];
        let mut r = ByteReader::with_len(&data[..], Endianness::Little, data.len());

        assert_eq!(r.remaining(), Some(8));
        assert_eq!(r.get_u16().unwrap(), 0x0201);
        assert_eq!(r.remaining(), Some(6));

        r.discard(2).unwrap();
        assert_eq!(r.position(), 4);

        assert_eq!(r.get_u32().unwrap(), 0x08070605);
        assert_eq!(r.try_get_u8().unwrap(), None);
    }

    #[test]
    fn test_reader_unread() {
        let data = [0x0F, 0x20, 0x7F];
        let mut r = ByteReader::new(&data[..], Endianness::Big);

        let a = r.get_u8().unwrap();
        let b = r.get_u8().unwrap();
        r.unread(&[a, b]);
        assert_eq!(r.position(), 0);

        assert_eq!(r.get_u16().unwrap(), 0x0F20);
        assert_eq!(r.get_u8().unwrap(), 0x7F);
    }

    #[test]
    fn test_reader_length_past_end() {
        let data = [1, 2, 3];
        let mut r = ByteReader::with_len(&data[..], Endianness::Big, data.len());
        assert!(matches!(
            r.get_bytes(4),
            Err(Error::MalformedLength { length: 4 })
        ));

        // Unknown length: the short read is still reported as a bad length
        let mut r = ByteReader::new(&data[..], Endianness::Big);
        assert!(matches!(
            r.get_bytes(10),
            Err(Error::MalformedLength { length: 10 })
        ));

        let mut r = ByteReader::new(&data[..], Endianness::Big);
        assert!(matches!(r.discard(5), Err(Error::MalformedLength { .. })));
    }

    #[test]
    fn test_reader_eof_is_io() {
        let data = [1];
        let mut r = ByteReader::new(&data[..], Endianness::Big);
        assert!(matches!(r.get_u32(), Err(Error::Io(_))));
    }
}
