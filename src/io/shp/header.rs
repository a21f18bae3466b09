//! Shapefile main file header (100 bytes)

use crate::error::{GeoError, Result};
use crate::io::binary_reader::{BinaryCursorReader, Endianness};
use crate::types::{BoundingBox2D, Range, Vector2};

use super::shape_type::ShapeType;

/// Magic number at offset 0.
pub const FILE_CODE: i32 = 9994;
/// Smallest legal file length, in 16-bit words (the header alone).
pub const MIN_FILE_LENGTH: i32 = 50;
/// Versions below this may be parsed incorrectly.
pub const MIN_VERSION: i32 = 1000;
/// Size of the main file header in bytes.
pub const HEADER_SIZE: usize = 100;

/// Parsed main file header.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeHeader {
    pub file_code: i32,
    /// Total file length in 16-bit words.
    pub file_length: i32,
    pub version: i32,
    pub shape_type: ShapeType,
    pub bounding_box: BoundingBox2D,
    pub z_range: Range,
    pub m_range: Range,
}

impl ShapeHeader {
    /// Parse the header from the start of the cursor.
    ///
    /// Fails on a wrong file code, a file length below the header size, or a
    /// shape type the format does not define. The version is not checked here.
    pub fn parse(reader: &mut BinaryCursorReader) -> Result<Self> {
        reader.seek_to(0)?;
        reader.set_endianness(Endianness::Big);

        let file_code = reader.read_i32()?;
        reader.skip(20)?;
        let file_length = reader.read_i32()?;

        reader.set_endianness(Endianness::Little);
        let version = reader.read_i32()?;
        let raw_shape_type = reader.read_i32()?;

        let x_min = reader.read_f64()?;
        let y_min = reader.read_f64()?;
        let x_max = reader.read_f64()?;
        let y_max = reader.read_f64()?;
        let z_range = Range::new(reader.read_f64()?, reader.read_f64()?);
        let m_range = Range::new(reader.read_f64()?, reader.read_f64()?);

        if file_code != FILE_CODE {
            return Err(GeoError::InvalidHeader(format!(
                "invalid shape file code {file_code}, expected {FILE_CODE}"
            )));
        }
        if file_length < MIN_FILE_LENGTH {
            return Err(GeoError::InvalidHeader(format!(
                "shape file length of {file_length} words is below the header size"
            )));
        }
        let shape_type =
            ShapeType::from_i32(raw_shape_type).ok_or(GeoError::UnknownShapeType(raw_shape_type))?;

        Ok(Self {
            file_code,
            file_length,
            version,
            shape_type,
            bounding_box: BoundingBox2D::new(Vector2::new(x_min, y_min), Vector2::new(x_max, y_max)),
            z_range,
            m_range,
        })
    }

    /// File length in bytes as declared by the header.
    pub fn file_length_bytes(&self) -> usize {
        self.file_length.max(0) as usize * 2
    }
}
