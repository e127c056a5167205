//! Struct encoding
//!
//! A [`Message`] is a record whose fields are written in ascending tag order.
//! Nested records are framed by `StructBegin`/`StructEnd` heads; a top-level
//! record is written without framing and ends with the input.
//!
//! # Decode states
//!
//! ```text
//! Start -> StructBegin found? -- no --> Done (destination untouched)
//!                |
//!               yes -> ResetDefaults -> ReadFields -> SkipToStructEnd -> Done
//! ```
//!
//! Fields unknown to the reader that trail the declared ones are skipped, so a
//! newer writer may add tags without breaking older readers.

use std::io::{BufRead, Write};

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Result;
use crate::field::Field;

/// A record encoded as a sequence of tagged fields
///
/// Implementations write their fields in ascending tag order and read them
/// back in the same order.
///
/// ```rust
/// use std::io::{BufRead, Write};
/// use tagwire::{Decoder, Encoder, Field, Message, Result};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Ping {
///     seq: u32,
///     note: String,
/// }
///
/// impl Message for Ping {
///     fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
///         self.seq.write_field(enc, 0)?;
///         self.note.write_field(enc, 1)
///     }
///
///     fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
///         self.seq.read_field(dec, 0, true)?;
///         self.note.read_field(dec, 1, false)
///     }
/// }
///
/// let bytes = tagwire::encode(&Ping { seq: 3, note: "hi".into() })?;
/// let mut out = Ping::default();
/// tagwire::decode(&bytes, &mut out)?;
/// assert_eq!(out.seq, 3);
/// # Ok::<(), tagwire::Error>(())
/// ```
pub trait Message: Default {
    /// Write every field in ascending tag order
    fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()>;

    /// Read the declared fields in ascending tag order
    fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()>;

    /// Reset every field to its default before a decode
    fn reset_default(&mut self) {
        *self = Self::default();
    }

    /// Write as a top-level record, without struct framing
    fn write_to<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
        self.write_fields(enc)
    }

    /// Read as a top-level record, without struct framing
    fn read_from<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
        self.reset_default();
        self.read_fields(dec)
    }

    /// Write as a nested struct at `tag`
    fn write_block<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        enc.begin_struct(tag)?;
        self.write_fields(enc)?;
        enc.end_struct()
    }

    /// Read a nested struct at `tag`
    ///
    /// An absent optional struct leaves `self` untouched.
    fn read_block<R: BufRead>(&mut self, dec: &mut Decoder<R>, tag: u8, required: bool) -> Result<()> {
        if !dec.begin_struct(tag, required)? {
            return Ok(());
        }
        dec.nested(|dec| {
            self.reset_default();
            self.read_fields(dec)?;
            dec.skip_to_struct_end()
        })
    }
}

impl<M: Message> Field for M {
    #[inline]
    fn write_field<W: Write>(&self, enc: &mut Encoder<W>, tag: u8) -> Result<()> {
        self.write_block(enc, tag)
    }

    #[inline]
    fn read_field<R: BufRead>(&mut self, dec: &mut Decoder<R>, tag: u8, required: bool) -> Result<()> {
        self.read_block(dec, tag, required)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    impl Message for Point {
        fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
            self.x.write_field(enc, 0)?;
            self.y.write_field(enc, 1)
        }

        fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
            self.x.read_field(dec, 0, true)?;
            self.y.read_field(dec, 1, true)
        }
    }

    /// Newer revision of `Point` with extra fields
    #[derive(Debug, Default, Clone, PartialEq)]
    struct Point3 {
        x: i32,
        y: i32,
        z: i32,
        label: String,
    }

    impl Message for Point3 {
        fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
            self.x.write_field(enc, 0)?;
            self.y.write_field(enc, 1)?;
            self.z.write_field(enc, 2)?;
            self.label.write_field(enc, 20)
        }

        fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
            self.x.read_field(dec, 0, true)?;
            self.y.read_field(dec, 1, true)?;
            self.z.read_field(dec, 2, false)?;
            self.label.read_field(dec, 20, false)
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Shape {
        origin: Point,
        corner: Point,
        name: String,
    }

    impl Message for Shape {
        fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
            self.origin.write_field(enc, 0)?;
            self.corner.write_field(enc, 1)?;
            self.name.write_field(enc, 2)
        }

        fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
            self.origin.read_field(dec, 0, true)?;
            self.corner.read_field(dec, 1, false)?;
            self.name.read_field(dec, 2, false)
        }
    }

    fn to_bytes<M: Message>(value: &M) -> Vec<u8> {
        let mut enc = Encoder::new(Vec::new());
        value.write_to(&mut enc).unwrap();
        enc.into_inner().unwrap()
    }

    #[test]
    fn test_block_framing() {
        let mut enc = Encoder::new(Vec::new());
        Point { x: 1, y: 0 }.write_block(&mut enc, 3).unwrap();
        assert_eq!(enc.into_inner().unwrap(), vec![0xA3, 0x00, 0x01, 0xC1, 0xB0]);
    }

    #[test]
    fn test_nested_roundtrip() {
        let shape = Shape {
            origin: Point { x: -4, y: 90_000 },
            corner: Point { x: 5, y: 6 },
            name: "box".into(),
        };
        let buf = to_bytes(&shape);

        let mut out = Shape::default();
        out.read_from(&mut Decoder::from_slice(&buf)).unwrap();
        assert_eq!(out, shape);
    }

    #[test]
    fn test_newer_writer_older_reader() {
        let newer = Shape3 {
            origin: Point3 {
                x: 1,
                y: 2,
                z: 3,
                label: "extra".into(),
            },
            name: "n".into(),
        };
        let buf = to_bytes(&newer);

        let mut out = Shape::default();
        out.read_from(&mut Decoder::from_slice(&buf)).unwrap();
        assert_eq!(out.origin, Point { x: 1, y: 2 });
        assert_eq!(out.corner, Point::default());
        assert_eq!(out.name, "n");
    }

    #[test]
    fn test_older_writer_newer_reader() {
        let mut enc = Encoder::new(Vec::new());
        Point { x: 8, y: 9 }.write_block(&mut enc, 0).unwrap();
        let buf = enc.into_inner().unwrap();

        let mut out = Point3 {
            z: 99,
            label: "stale".into(),
            ..Default::default()
        };
        out.read_block(&mut Decoder::from_slice(&buf), 0, true).unwrap();
        // present block resets defaults before reading
        assert_eq!(
            out,
            Point3 {
                x: 8,
                y: 9,
                z: 0,
                label: String::new()
            }
        );
    }

    #[test]
    fn test_optional_block_absent() {
        let buf = to_bytes(&Point { x: 1, y: 2 });
        let mut nested = Point { x: 7, y: 7 };
        let mut dec = Decoder::from_slice(&buf);
        nested.read_block(&mut dec, 5, false).unwrap();
        assert_eq!(nested, Point { x: 7, y: 7 });

        let err = Point::default()
            .read_block(&mut Decoder::from_slice(&buf), 5, true)
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField { tag: 5 }));
    }

    #[test]
    fn test_required_field_missing_inside_block() {
        // block at tag 0 holding only tag 1
        let buf = [0xA0, 0x01, 0x05, 0xB0];
        let err = Point::default()
            .read_block(&mut Decoder::from_slice(&buf), 0, true)
            .unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField { tag: 0 }));
    }

    #[test]
    fn test_list_of_structs() {
        let points = vec![
            Point { x: 1, y: 2 },
            Point::default(),
            Point { x: i32::MIN, y: i32::MAX },
        ];
        let mut enc = Encoder::new(Vec::new());
        points.write_field(&mut enc, 4).unwrap();
        let buf = enc.into_inner().unwrap();

        let mut out: Vec<Point> = Vec::new();
        out.read_field(&mut Decoder::from_slice(&buf), 4, true).unwrap();
        assert_eq!(out, points);
    }

    #[derive(Debug, Default, PartialEq)]
    struct Node {
        value: i32,
        children: Vec<Node>,
    }

    impl Message for Node {
        fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
            self.value.write_field(enc, 0)?;
            self.children.write_field(enc, 1)
        }

        fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
            self.value.read_field(dec, 0, true)?;
            self.children.read_field(dec, 1, false)
        }
    }

    fn chain(len: i32) -> Node {
        (1..len).rev().fold(Node { value: len, children: vec![] }, |child, value| Node {
            value,
            children: vec![child],
        })
    }

    #[test]
    fn test_recursive_message_depth() {
        // each link adds a list and a struct level
        let shallow = chain(20);
        let bytes = crate::encode(&shallow).unwrap();
        let mut out = Node::default();
        crate::decode(&bytes, &mut out).unwrap();
        assert_eq!(out, shallow);

        let deep = chain(40);
        let bytes = crate::encode(&deep).unwrap();
        let err = crate::decode(&bytes, &mut Node::default()).unwrap_err();
        assert!(matches!(err, Error::DepthLimitExceeded { limit: 64 }));
    }

    #[derive(Debug, Default, PartialEq)]
    struct Shape3 {
        origin: Point3,
        name: String,
    }

    impl Message for Shape3 {
        fn write_fields<W: Write>(&self, enc: &mut Encoder<W>) -> Result<()> {
            self.origin.write_field(enc, 0)?;
            self.name.write_field(enc, 2)
        }

        fn read_fields<R: BufRead>(&mut self, dec: &mut Decoder<R>) -> Result<()> {
            self.origin.read_field(dec, 0, true)?;
            self.name.read_field(dec, 2, false)
        }
    }
}
