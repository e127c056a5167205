//! Field kinds and the container encodings
//!
//! [`Field`] is implemented for every value that can sit at a tag: scalars,
//! strings, byte blobs, lists, maps and nested structs (see
//! [`Message`](crate::Message)).
//!
//! # Container layouts
//!
//! ```text
//! blob  (Vec<u8>/Vec<i8>): SimpleList | Head(Byte,0) | count(tag 0) | raw bytes
//! list  (Vec<T>):          List | count(tag 0) | element(tag 0)*
//! map   (HashMap/BTreeMap): Map | count(tag 0) | (key(tag 0) value(tag 1))*
//! ```
//!
//! Element types pick the list layout through [`Field::write_list`] and
//! [`Field::read_list`]; byte types override them with the blob layout.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::io::{BufRead, Write};

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::wire_type::WireType;

/// Upper bound on capacity reserved up front from a decoded count
const MAX_PREALLOC: usize = 1024;

/// A value that can be encoded at a tag
pub trait Field: Default {
    /// Write this value as the field `tag`
    fn write_field<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()>;

    /// Read the field `tag` into this value
    ///
    /// When the field is absent and not `required`, the value is left as is.
    fn read_field<R: BufRead>(&mut self, dec: &mut Decoder<R>, tag: u8, required: bool)
        -> Result<()>;

    /// Write a slice of this type as the field `tag`
    fn write_list<W: Write>(items: &[Self], enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        enc.write_head(WireType::List, tag)?;
        enc.write_count(items.len())?;
        for item in items {
            item.write_field(enc, 0)?;
        }
        Ok(())
    }

    /// Read a list of this type from the field `tag`
    fn read_list<R: BufRead>(
        items: &mut Vec<Self>,
        dec: &mut Decoder<R>,
        tag: u8,
        required: bool,
    ) -> Result<()> {
        if !dec.skip_to(WireType::List, tag, required)? {
            return Ok(());
        }
        let count = dec.read_count()?;
        *items = dec.nested(|dec| {
            let mut out = Vec::with_capacity(count.min(MAX_PREALLOC));
            for _ in 0..count {
                let mut item = Self::default();
                item.read_field(dec, 0, true)?;
                out.push(item);
            }
            Ok(out)
        })?;
        Ok(())
    }
}

macro_rules! scalar_field {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl Field for $ty {
                #[inline]
                fn write_field<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()> {
                    enc.$write(*self, tag)
                }

                #[inline]
                fn read_field<R: BufRead>(
                    &mut self,
                    dec: &mut Decoder<R>,
                    tag: u8,
                    required: bool,
                ) -> Result<()> {
                    dec.$read(self, tag, required)
                }
            }
        )*
    };
}

scalar_field! {
    bool => write_bool, read_bool;
    i16 => write_i16, read_i16;
    i32 => write_i32, read_i32;
    i64 => write_i64, read_i64;
    u16 => write_u16, read_u16;
    u32 => write_u32, read_u32;
    u64 => write_u64, read_u64;
    f32 => write_f32, read_f32;
    f64 => write_f64, read_f64;
}

impl Field for u8 {
    #[inline]
    fn write_field<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        enc.write_u8(*self, tag)
    }

    #[inline]
    fn read_field<R: BufRead>(&mut self, dec: &mut Decoder<R>, tag: u8, required: bool) -> Result<()> {
        dec.read_u8(self, tag, required)
    }

    fn write_list<W: Write>(items: &[Self], enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        enc.write_bytes(items, tag)
    }

    fn read_list<R: BufRead>(
        items: &mut Vec<Self>,
        dec: &mut Decoder<R>,
        tag: u8,
        required: bool,
    ) -> Result<()> {
        dec.read_bytes(items, tag, required)
    }
}

impl Field for i8 {
    #[inline]
    fn write_field<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        enc.write_i8(*self, tag)
    }

    #[inline]
    fn read_field<R: BufRead>(&mut self, dec: &mut Decoder<R>, tag: u8, required: bool) -> Result<()> {
        dec.read_i8(self, tag, required)
    }

    fn write_list<W: Write>(items: &[Self], enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        enc.write_i8_slice(items, tag)
    }

    fn read_list<R: BufRead>(
        items: &mut Vec<Self>,
        dec: &mut Decoder<R>,
        tag: u8,
        required: bool,
    ) -> Result<()> {
        dec.read_i8_vec(items, tag, required)
    }
}

impl Field for String {
    #[inline]
    fn write_field<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        enc.write_string(self, tag)
    }

    #[inline]
    fn read_field<R: BufRead>(&mut self, dec: &mut Decoder<R>, tag: u8, required: bool) -> Result<()> {
        dec.read_string(self, tag, required)
    }
}

impl<T: Field> Field for Vec<T> {
    #[inline]
    fn write_field<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        T::write_list(self, enc, tag)
    }

    #[inline]
    fn read_field<R: BufRead>(&mut self, dec: &mut Decoder<R>, tag: u8, required: bool) -> Result<()> {
        T::read_list(self, dec, tag, required)
    }
}

fn write_map<'a, K, V, W, I>(entries: I, len: usize, enc: &mut Encoder<W>, tag: u8) -> Result<()>
where
    K: Field + 'a,
    V: Field + 'a,
    W: Write,
    I: IntoIterator<Item = (&'a K, &'a V)>,
{
    enc.write_head(WireType::Map, tag)?;
    enc.write_count(len)?;
    for (key, value) in entries {
        key.write_field(enc, 0)?;
        value.write_field(enc, 1)?;
    }
    Ok(())
}

/// Decode map entries, handing each pair to `insert`
///
/// Returns false when an optional map is absent.
fn read_map<K, V, R, F>(
    dec: &mut Decoder<R>,
    tag: u8,
    required: bool,
    mut insert: F,
) -> Result<bool>
where
    K: Field,
    V: Field,
    R: BufRead,
    F: FnMut(K, V),
{
    if !dec.skip_to(WireType::Map, tag, required)? {
        return Ok(false);
    }
    let count = dec.read_count()?;
    dec.nested(|dec| {
        for _ in 0..count {
            let mut key = K::default();
            let mut value = V::default();
            key.read_field(dec, 0, true)?;
            value.read_field(dec, 1, true)?;
            insert(key, value);
        }
        Ok(true)
    })
}

impl<K, V, S> Field for HashMap<K, V, S>
where
    K: Field + Eq + Hash,
    V: Field,
    S: BuildHasher + Default,
{
    fn write_field<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        write_map(self.iter(), self.len(), enc, tag)
    }

    fn read_field<R: BufRead>(&mut self, dec: &mut Decoder<R>, tag: u8, required: bool) -> Result<()> {
        let mut out = HashMap::default();
        if read_map(dec, tag, required, |k, v| {
            out.insert(k, v);
        })? {
            *self = out;
        }
        Ok(())
    }
}

impl<K, V> Field for BTreeMap<K, V>
where
    K: Field + Ord,
    V: Field,
{
    fn write_field<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        write_map(self.iter(), self.len(), enc, tag)
    }

    fn read_field<R: BufRead>(&mut self, dec: &mut Decoder<R>, tag: u8, required: bool) -> Result<()> {
        let mut out = BTreeMap::new();
        if read_map(dec, tag, required, |k, v| {
            out.insert(k, v);
        })? {
            *self = out;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: Field>(value: &T, tag: u8) -> (Vec<u8>, T) {
        let mut enc = Encoder::new(Vec::new());
        value.write_field(&mut enc, tag).unwrap();
        let buf = enc.into_inner().unwrap();

        let mut out = T::default();
        let mut dec = Decoder::from_slice(&buf);
        out.read_field(&mut dec, tag, true).unwrap();
        assert_eq!(dec.remaining(), Some(0));
        (buf, out)
    }

    #[test]
    fn test_byte_vec_is_simple_list() {
        let (buf, out) = roundtrip(&vec![1u8, 2, 3], 5);
        assert_eq!(buf, vec![0xD5, 0x00, 0x00, 0x03, 1, 2, 3]);
        assert_eq!(out, vec![1, 2, 3]);

        let (buf, out) = roundtrip(&vec![-1i8, 2], 0);
        assert_eq!(buf[0], 0xD0);
        assert_eq!(out, vec![-1, 2]);
    }

    #[test]
    fn test_list_layout() {
        let (buf, out) = roundtrip(&vec![0i32, 300], 2);
        assert_eq!(buf, vec![0x92, 0x00, 0x02, 0xC0, 0x10, 0x01, 0x2C]);
        assert_eq!(out, vec![0, 300]);
    }

    #[test]
    fn test_empty_list() {
        let (buf, out) = roundtrip(&Vec::<String>::new(), 1);
        assert_eq!(buf, vec![0x91, 0xC0]);
        assert!(out.is_empty());
    }

    #[test]
    fn test_nested_lists() {
        let value = vec![
            vec!["a".to_string(), "bc".to_string()],
            vec![],
            vec!["x".repeat(300)],
        ];
        let (_, out) = roundtrip(&value, 3);
        assert_eq!(out, value);

        let blobs = vec![vec![1u8, 2], vec![], vec![255u8]];
        let (_, out) = roundtrip(&blobs, 0);
        assert_eq!(out, blobs);
    }

    #[test]
    fn test_map_layout() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), 7i64);
        let (buf, out) = roundtrip(&map, 0);
        assert_eq!(buf, vec![0x80, 0x00, 0x01, 0x60, 0x01, b'k', 0x01, 0x07]);
        assert_eq!(out, map);
    }

    #[test]
    fn test_hash_map_membership() {
        let map: HashMap<String, i32> = (0..5).map(|i| (format!("key{i}"), i * 1000)).collect();
        let (_, out) = roundtrip(&map, 9);
        assert_eq!(out, map);
    }

    #[test]
    fn test_map_of_lists() {
        let mut map = HashMap::new();
        map.insert(1u16, vec![1.5f64, 0.0, -2.25]);
        map.insert(40000u16, vec![]);
        let (_, out) = roundtrip(&map, 17);
        assert_eq!(out, map);
    }

    #[test]
    fn test_absent_container_keeps_value() {
        let buf = [0x05, 0x01];
        let mut list = vec![9i32];
        let mut map: BTreeMap<i32, i32> = [(1, 1)].into_iter().collect();
        let mut dec = Decoder::from_slice(&buf);
        list.read_field(&mut dec, 1, false).unwrap();
        map.read_field(&mut dec, 2, false).unwrap();
        assert_eq!(list, vec![9]);
        assert_eq!(map.len(), 1);
    }
}
