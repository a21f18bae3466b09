//! Record values and their per-type decoding.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{GeoError, Result};
use crate::io::binary_reader::{BinaryCursorReader, Endianness};

use super::field::{FieldDescriptor, FieldType};

/// Deleted-flag byte written by dBase.
pub const DELETED_FLAG: u8 = b'*';
/// Sentinel that also marks a record deleted (and the end of the data).
pub const DELETED_SENTINEL: u8 = 0x1A;
pub const ACTIVE_FLAG: u8 = b' ';

const SIGN_BIT_32: u32 = 0x8000_0000;
const SIGN_BIT_64: u64 = 0x8000_0000_0000_0000;

/// Decoded value of one field.
#[derive(Debug, Clone, PartialEq)]
pub enum DbfValue {
    Text(String),
    Integer(i64),
    Double(f64),
    Logical(bool),
    Null,
}

impl DbfValue {
    pub fn is_null(&self) -> bool {
        matches!(self, DbfValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DbfValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            DbfValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DbfValue::Double(v) => Some(*v),
            DbfValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DbfValue::Logical(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for DbfValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbfValue::Text(s) => write!(f, "{s}"),
            DbfValue::Integer(v) => write!(f, "{v}"),
            DbfValue::Double(v) => write!(f, "{v}"),
            DbfValue::Logical(b) => write!(f, "{}", if *b { "T" } else { "F" }),
            DbfValue::Null => write!(f, "NULL"),
        }
    }
}

/// One row: the deleted flag and the values keyed by field name, in
/// descriptor order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DbfRecord {
    pub deleted: bool,
    pub values: IndexMap<String, DbfValue>,
}

impl DbfRecord {
    pub fn get(&self, name: &str) -> Option<&DbfValue> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Binary number layout of `I`, `+` and `O` fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NumberEncoding {
    /// Plain little-endian two's complement / IEEE 754.
    LittleEndian,
    /// dBASE 7: big-endian with the sign bit flipped so that the bytes sort
    /// in numeric order.
    SortableBigEndian,
}

/// Decode one field at the cursor. The cursor may end anywhere inside the
/// field; the caller realigns to the field width.
pub(crate) fn decode_value(
    reader: &mut BinaryCursorReader,
    field: &FieldDescriptor,
    numbers: NumberEncoding,
    trim_strings: bool,
) -> Result<DbfValue> {
    let width = field.length as usize;
    match field.field_type {
        FieldType::Character | FieldType::Date | FieldType::Memo | FieldType::Ole => {
            let text = reader.read_string(width)?;
            Ok(DbfValue::Text(if trim_strings {
                text.trim_end_matches(' ').to_string()
            } else {
                text
            }))
        }
        FieldType::Numeric | FieldType::Binary | FieldType::Float => {
            let text = reader.read_string(width)?;
            Ok(parse_leading_integer(&text).map_or(DbfValue::Null, DbfValue::Integer))
        }
        FieldType::Logical => Ok(match reader.read_char()? {
            't' | 'T' | 'y' | 'Y' => DbfValue::Logical(true),
            'f' | 'F' | 'n' | 'N' => DbfValue::Logical(false),
            _ => DbfValue::Null,
        }),
        FieldType::Long | FieldType::Autoincrement => {
            Ok(DbfValue::Integer(read_long(reader, numbers)? as i64))
        }
        FieldType::Double => Ok(DbfValue::Double(read_double(reader, numbers)?)),
        FieldType::Timestamp => Err(GeoError::NotImplemented(format!(
            "timestamp field '{}'",
            field.name
        ))),
    }
}

fn read_long(reader: &mut BinaryCursorReader, numbers: NumberEncoding) -> Result<i32> {
    let previous = reader.endianness();
    let value = match numbers {
        NumberEncoding::LittleEndian => {
            reader.set_endianness(Endianness::Little);
            reader.read_i32()
        }
        NumberEncoding::SortableBigEndian => {
            reader.set_endianness(Endianness::Big);
            reader.read_u32().map(|raw| (raw ^ SIGN_BIT_32) as i32)
        }
    };
    reader.set_endianness(previous);
    value
}

fn read_double(reader: &mut BinaryCursorReader, numbers: NumberEncoding) -> Result<f64> {
    let previous = reader.endianness();
    let value = match numbers {
        NumberEncoding::LittleEndian => {
            reader.set_endianness(Endianness::Little);
            reader.read_f64()
        }
        NumberEncoding::SortableBigEndian => {
            reader.set_endianness(Endianness::Big);
            let bytes = reader.read_bytes(8);
            bytes.map(|b| {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&b);
                f64::from_bits(unflip_double(u64::from_be_bytes(raw)))
            })
        }
    };
    reader.set_endianness(previous);
    value
}

fn unflip_double(raw: u64) -> u64 {
    if raw & SIGN_BIT_64 != 0 {
        raw ^ SIGN_BIT_64
    } else {
        !raw
    }
}

fn flip_double(bits: u64) -> u64 {
    if bits & SIGN_BIT_64 != 0 {
        !bits
    } else {
        bits ^ SIGN_BIT_64
    }
}

/// Integer prefix of a numeric field: optional sign then digits, after
/// leading whitespace. Anything else gives `None`.
pub fn parse_leading_integer(text: &str) -> Option<i64> {
    let trimmed = text.trim_start();
    let bytes = trimmed.as_bytes();
    let sign_len = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let digits = bytes[sign_len..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    trimmed[..sign_len + digits].parse().ok()
}

/// Encode one value into exactly `field.length` bytes.
pub(crate) fn encode_value(
    field: &FieldDescriptor,
    value: &DbfValue,
    numbers: NumberEncoding,
    encoding: &'static encoding_rs::Encoding,
    out: &mut Vec<u8>,
) -> Result<()> {
    let width = field.length as usize;
    let start = out.len();

    match field.field_type {
        FieldType::Character | FieldType::Date | FieldType::Memo | FieldType::Ole => {
            let text = match value {
                DbfValue::Null => String::new(),
                other => other.to_string(),
            };
            let (bytes, _, _) = encoding.encode(&text);
            out.extend_from_slice(&bytes[..bytes.len().min(width)]);
        }
        FieldType::Numeric | FieldType::Binary | FieldType::Float => {
            let text = match value {
                DbfValue::Null => String::new(),
                DbfValue::Double(v) => {
                    let prec = field.decimal_count as usize;
                    format!("{v:>width$.prec$}")
                }
                other => format!("{:>width$}", other.to_string()),
            };
            out.extend_from_slice(&text.as_bytes()[..text.len().min(width)]);
        }
        FieldType::Logical => out.push(match value.as_bool() {
            Some(true) => b'T',
            Some(false) => b'F',
            None => b'?',
        }),
        FieldType::Long | FieldType::Autoincrement => {
            let v = value.as_i64().unwrap_or(0) as i32;
            match numbers {
                NumberEncoding::LittleEndian => out.extend_from_slice(&v.to_le_bytes()),
                NumberEncoding::SortableBigEndian => {
                    out.extend_from_slice(&((v as u32) ^ SIGN_BIT_32).to_be_bytes())
                }
            }
        }
        FieldType::Double => {
            let v = value.as_f64().unwrap_or(0.0);
            match numbers {
                NumberEncoding::LittleEndian => out.extend_from_slice(&v.to_le_bytes()),
                NumberEncoding::SortableBigEndian => {
                    out.extend_from_slice(&flip_double(v.to_bits()).to_be_bytes())
                }
            }
        }
        FieldType::Timestamp => {
            return Err(GeoError::NotImplemented(format!(
                "timestamp field '{}'",
                field.name
            )))
        }
    }

    // Pad or cut to the declared width.
    out.resize(start + width, b' ');
    Ok(())
}
