//! Positionable, endianness-switchable byte cursor.
//!
//! Shapefiles mix big-endian record headers with little-endian geometry, and
//! dBase headers mix little-endian counts with single-byte fields, so the
//! byte order is a mutable mode of the cursor rather than a type parameter.
//! Callers flip it with [`BinaryCursorReader::set_endianness`] as they go.
//!
//! Every read is bounds-checked up front: a read that would cross the end of
//! the buffer returns [`GeoError::OutOfBounds`] and leaves the cursor where
//! it was.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use encoding_rs::Encoding;

use crate::error::{GeoError, Result};

/// Byte order used by the typed reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endianness {
    #[default]
    Big,
    Little,
}

/// Cursor over an owned byte buffer.
#[derive(Debug, Clone)]
pub struct BinaryCursorReader {
    buffer: Vec<u8>,
    offset: usize,
    endianness: Endianness,
    encoding: &'static Encoding,
}

macro_rules! read_ordered {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $width:expr, $read:ident) => {
        $(#[$doc])*
        pub fn $name(&mut self) -> Result<$ty> {
            let endianness = self.endianness;
            let bytes = self.take($width)?;
            Ok(match endianness {
                Endianness::Big => BigEndian::$read(bytes),
                Endianness::Little => LittleEndian::$read(bytes),
            })
        }
    };
}

impl BinaryCursorReader {
    /// Create a big-endian cursor at offset 0.
    pub fn new(buffer: Vec<u8>) -> Self {
        Self {
            buffer,
            offset: 0,
            endianness: Endianness::Big,
            encoding: encoding_rs::WINDOWS_1252,
        }
    }

    /// Replace the buffer and rewind to offset 0. The endianness is kept.
    pub fn set_buffer(&mut self, buffer: Vec<u8>) -> &mut Self {
        self.buffer = buffer;
        self.offset = 0;
        self
    }

    /// Switch the byte order of subsequent multi-byte reads.
    pub fn set_endianness(&mut self, endianness: Endianness) -> &mut Self {
        self.endianness = endianness;
        self
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    /// Set the encoding used by [`Self::read_string`].
    pub fn set_encoding(&mut self, encoding: &'static Encoding) -> &mut Self {
        self.encoding = encoding;
        self
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.offset
    }

    /// Total buffer length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Bytes left between the cursor and the end of the buffer.
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.offset
    }

    /// Whether the cursor sits at the end of the buffer.
    pub fn at_end(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    /// Advance by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.offset += n;
        Ok(())
    }

    /// Move to an absolute offset. Seeking exactly to the end is allowed.
    pub fn seek_to(&mut self, offset: usize) -> Result<()> {
        if offset > self.buffer.len() {
            return Err(GeoError::OutOfBounds {
                offset,
                requested: 0,
                length: self.buffer.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if n > self.remaining() {
            return Err(GeoError::OutOfBounds {
                offset: self.offset,
                requested: n,
                length: self.buffer.len(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&[u8]> {
        self.ensure(n)?;
        let start = self.offset;
        self.offset += n;
        Ok(&self.buffer[start..start + n])
    }

    /// Look at the next byte without consuming it.
    pub fn peek_u8(&self) -> Option<u8> {
        self.buffer.get(self.offset).copied()
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    /// Single byte interpreted as a Latin-1 character.
    pub fn read_char(&mut self) -> Result<char> {
        Ok(char::from(self.read_u8()?))
    }

    read_ordered!(read_i16, i16, 2, read_i16);
    read_ordered!(read_u16, u16, 2, read_u16);
    read_ordered!(read_i32, i32, 4, read_i32);
    read_ordered!(read_u32, u32, 4, read_u32);
    read_ordered!(read_f32, f32, 4, read_f32);
    read_ordered!(read_f64, f64, 8, read_f64);

    /// Copy `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    /// Fixed-length string of `n` bytes, cut at the first NUL and decoded
    /// with the cursor encoding.
    pub fn read_string(&mut self, n: usize) -> Result<String> {
        let encoding = self.encoding;
        let bytes = self.take(n)?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        let (text, _, _) = encoding.decode(&bytes[..end]);
        Ok(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endianness_switch() {
        let mut reader = BinaryCursorReader::new(vec![0x00, 0x00, 0x27, 0x0A, 0xE8, 0x03, 0x00, 0x00]);
        assert_eq!(reader.read_i32().unwrap(), 9994);
        reader.set_endianness(Endianness::Little);
        assert_eq!(reader.read_i32().unwrap(), 1000);
        assert!(reader.at_end());
    }

    #[test]
    fn test_int32_with_three_bytes_left() {
        let mut reader = BinaryCursorReader::new(vec![1, 2, 3, 4, 5, 6, 7]);
        reader.skip(4).unwrap();
        let err = reader.read_i32().unwrap_err();
        assert!(matches!(
            err,
            GeoError::OutOfBounds { offset: 4, requested: 4, length: 7 }
        ));
        // a failed read does not move the cursor
        assert_eq!(reader.position(), 4);
    }

    #[test]
    fn test_seek_and_skip_bounds() {
        let mut reader = BinaryCursorReader::new(vec![0; 10]);
        reader.seek_to(10).unwrap();
        assert!(reader.at_end());
        assert!(reader.seek_to(11).is_err());
        reader.seek_to(8).unwrap();
        assert!(reader.skip(3).is_err());
        reader.skip(2).unwrap();
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_read_string_stops_at_nul() {
        let mut reader = BinaryCursorReader::new(b"NAME\0\0\0\0\0\0\0C".to_vec());
        assert_eq!(reader.read_string(11).unwrap(), "NAME");
        assert_eq!(reader.read_char().unwrap(), 'C');
    }

    #[test]
    fn test_read_string_encoding() {
        let mut reader = BinaryCursorReader::new(vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(reader.read_string(4).unwrap(), "caf\u{e9}");
    }

    #[test]
    fn test_float_reads() {
        let mut data = Vec::new();
        data.extend_from_slice(&1.5f64.to_le_bytes());
        data.extend_from_slice(&(-2.25f32).to_be_bytes());
        let mut reader = BinaryCursorReader::new(data);
        reader.set_endianness(Endianness::Little);
        assert_eq!(reader.read_f64().unwrap(), 1.5);
        reader.set_endianness(Endianness::Big);
        assert_eq!(reader.read_f32().unwrap(), -2.25);
    }

    #[test]
    fn test_set_buffer_rewinds() {
        let mut reader = BinaryCursorReader::new(vec![1, 2]);
        reader.set_endianness(Endianness::Little);
        reader.skip(2).unwrap();
        reader.set_buffer(vec![3, 0]);
        assert_eq!(reader.position(), 0);
        assert_eq!(reader.read_u16().unwrap(), 3);
    }
}
