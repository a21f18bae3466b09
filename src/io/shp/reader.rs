//! Shapefile (.shp) reader. Decodes the main file into shape records.
//!
//! # Usage
//!
//! ```rust,ignore
//! use geofile::io::shp::ShpReader;
//!
//! let file = ShpReader::from_file("parcels.shp")?.read()?;
//! for record in &file.records {
//!     println!("{} -> {:?}", record.record_number, record.shape.shape_type());
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::cancellation::{self, CancellationToken};
use crate::error::{ErrorKind, GeoError, Result};
use crate::io::binary_reader::{BinaryCursorReader, Endianness};
use crate::notification::NotificationCollection;
use crate::types::{BoundingBox2D, Range, Vector2};

use super::header::{ShapeHeader, HEADER_SIZE, MIN_VERSION};
use super::polygon::{assemble_polygons, part_slices};
use super::shape::{
    Measures, MultiPatchShape, MultiPointShape, PointShape, PolygonShape, PolylineShape, Shape,
    ShapeRecord,
};
use super::shape_type::{PatchPartType, ShapeFamily, ShapeType};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration options for the shapefile reader.
#[derive(Debug, Clone)]
pub struct ShpReaderConfiguration {
    /// When `true`, malformed records are reported as notifications and
    /// skipped. When `false` the first malformed record aborts the read.
    ///
    /// Default: `true`.
    pub failsafe: bool,

    /// Checked before every record.
    pub cancellation: Option<CancellationToken>,
}

impl Default for ShpReaderConfiguration {
    fn default() -> Self {
        Self {
            failsafe: true,
            cancellation: None,
        }
    }
}

/// Result of a successful read.
#[derive(Debug, Clone)]
pub struct ShapeFile {
    pub header: ShapeHeader,
    /// Decoded shapes in file order. Null shapes are not included.
    pub records: Vec<ShapeRecord>,
    pub notifications: NotificationCollection,
}

impl ShapeFile {
    /// Iterate over the shapes without their record numbers.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.records.iter().map(|r| &r.shape)
    }
}

// ---------------------------------------------------------------------------
// ShpReader
// ---------------------------------------------------------------------------

/// Shapefile reader over a fully loaded buffer.
///
/// The read pipeline is:
///
/// 1. Parse and validate the 100-byte header.
/// 2. Pick the record parser from the header shape type (once).
/// 3. For every record: big-endian record header, little-endian payload,
///    then jump to the end of the record whatever the payload parser did.
pub struct ShpReader {
    reader: BinaryCursorReader,
    config: ShpReaderConfiguration,
    notifications: NotificationCollection,
}

impl ShpReader {
    /// Open a shapefile by path.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load the whole source into memory.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self::from_bytes(buffer))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            reader: BinaryCursorReader::new(bytes),
            config: ShpReaderConfiguration::default(),
            notifications: NotificationCollection::new(),
        }
    }

    /// Set configuration options.
    pub fn with_configuration(mut self, config: ShpReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Decode the whole file.
    ///
    /// Header-level failures return an error and no shapes at all; they are
    /// also logged at error level.
    pub fn read(mut self) -> Result<ShapeFile> {
        match self.read_all() {
            Ok((header, records)) => Ok(ShapeFile {
                header,
                records,
                notifications: self.notifications,
            }),
            Err(e) => {
                log::error!("shapefile decode failed: {e}");
                Err(e)
            }
        }
    }

    fn read_all(&mut self) -> Result<(ShapeHeader, Vec<ShapeRecord>)> {
        let header = ShapeHeader::parse(&mut self.reader)?;

        if header.version < MIN_VERSION {
            self.notifications.warning(format!(
                "shape file version {} is below {MIN_VERSION} and could be incorrectly parsed",
                header.version
            ));
        }
        if header.file_length_bytes() != self.reader.len() {
            self.notifications.warning(format!(
                "header declares {} bytes but the buffer holds {}",
                header.file_length_bytes(),
                self.reader.len()
            ));
        }

        let family = header.shape_type.family();
        self.reader.seek_to(HEADER_SIZE)?;

        let mut records = Vec::new();
        let mut record_index = 0usize;
        while !self.reader.at_end() {
            cancellation::check(self.config.cancellation.as_ref())?;

            let (record_number, end_of_record) = self.read_record_header()?;

            match self.read_record_content(family, end_of_record, record_index) {
                Ok(shapes) => records.extend(shapes.into_iter().map(|shape| ShapeRecord {
                    record_number,
                    shape,
                })),
                Err(e) if e.kind() == ErrorKind::Record && self.config.failsafe => {
                    self.notifications
                        .error(format!("record {record_number} skipped: {e}"));
                }
                Err(e) => return Err(e),
            }

            self.reader.seek_to(end_of_record)?;
            record_index += 1;
        }

        Ok((header, records))
    }

    /// Returns the record number and the absolute end offset of the record.
    fn read_record_header(&mut self) -> Result<(i32, usize)> {
        self.reader.set_endianness(Endianness::Big);
        let record_number = self.reader.read_i32()?;
        let content_length = self.reader.read_i32()?;

        if content_length < 0 {
            return Err(GeoError::InvalidHeader(format!(
                "record {record_number} has a negative content length ({content_length})"
            )));
        }
        let start = self.reader.position();
        let end_of_record = start + content_length as usize * 2;
        if end_of_record > self.reader.len() {
            return Err(GeoError::OutOfBounds {
                offset: start,
                requested: content_length as usize * 2,
                length: self.reader.len(),
            });
        }

        self.reader.set_endianness(Endianness::Little);
        Ok((record_number, end_of_record))
    }

    /// Parse every shape stored before `end`. Null shapes yield nothing.
    fn read_record_content(
        &mut self,
        family: ShapeFamily,
        end: usize,
        index: usize,
    ) -> Result<Vec<Shape>> {
        let mut shapes = Vec::new();

        while self.reader.position() < end {
            let code = self.reader.read_i32()?;
            let shape_type = ShapeType::from_i32(code).ok_or_else(|| GeoError::InvalidRecord {
                index,
                message: format!("unknown shape type {code}"),
            })?;

            if shape_type == ShapeType::NullShape {
                continue;
            }
            if shape_type.family() != family {
                return Err(GeoError::InvalidRecord {
                    index,
                    message: format!("shape type {shape_type} does not match the file"),
                });
            }

            let mut payload = RecordPayload {
                reader: &mut self.reader,
                end,
                index,
            };
            let shape = match family {
                ShapeFamily::Point => Shape::Point(payload.point(shape_type)?),
                ShapeFamily::Polyline => Shape::Polyline(payload.polyline(shape_type)?),
                ShapeFamily::Polygon => Shape::Polygon(payload.polygon(shape_type)?),
                ShapeFamily::MultiPoint => Shape::MultiPoint(payload.multi_point(shape_type)?),
                ShapeFamily::MultiPatch => Shape::MultiPatch(payload.multi_patch()?),
                ShapeFamily::Null => continue,
            };
            shapes.push(shape);
        }

        Ok(shapes)
    }
}

/// Decode every shape of an in-memory shapefile with the default settings.
pub fn read_shapes(bytes: Vec<u8>) -> Result<Vec<ShapeRecord>> {
    Ok(ShpReader::from_bytes(bytes).read()?.records)
}

// ---------------------------------------------------------------------------
// Record payload parsing
// ---------------------------------------------------------------------------

/// Little-endian payload of one record, bounded by `end`.
struct RecordPayload<'a> {
    reader: &'a mut BinaryCursorReader,
    end: usize,
    index: usize,
}

impl RecordPayload<'_> {
    fn remaining(&self) -> usize {
        self.end.saturating_sub(self.reader.position())
    }

    fn invalid(&self, message: impl Into<String>) -> GeoError {
        GeoError::InvalidRecord {
            index: self.index,
            message: message.into(),
        }
    }

    /// Fail unless `bytes` more bytes fit in the record.
    fn require(&self, bytes: usize, what: &str) -> Result<()> {
        if bytes > self.remaining() {
            return Err(self.invalid(format!(
                "{what} needs {bytes} bytes but the record has {} left",
                self.remaining()
            )));
        }
        Ok(())
    }

    fn read_count(&mut self, what: &str) -> Result<usize> {
        let value = self.reader.read_i32()?;
        usize::try_from(value).map_err(|_| self.invalid(format!("negative {what} ({value})")))
    }

    fn bounding_box(&mut self) -> Result<BoundingBox2D> {
        let x_min = self.reader.read_f64()?;
        let y_min = self.reader.read_f64()?;
        let x_max = self.reader.read_f64()?;
        let y_max = self.reader.read_f64()?;
        Ok(BoundingBox2D::new(Vector2::new(x_min, y_min), Vector2::new(x_max, y_max)))
    }

    fn points(&mut self, count: usize) -> Result<Vec<Vector2>> {
        self.require(count * 16, "point array")?;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            let x = self.reader.read_f64()?;
            let y = self.reader.read_f64()?;
            points.push(Vector2::new(x, y));
        }
        Ok(points)
    }

    /// Part start indices; they must ascend and stay below `num_points`.
    fn parts(&mut self, num_parts: usize, num_points: usize) -> Result<Vec<usize>> {
        self.require(num_parts * 4, "part index array")?;
        let mut parts = Vec::with_capacity(num_parts);
        for _ in 0..num_parts {
            let start = self.read_count("part index")?;
            if start >= num_points || parts.last().is_some_and(|&prev| start < prev) {
                return Err(self.invalid(format!("part index {start} out of order or range")));
            }
            parts.push(start);
        }
        Ok(parts)
    }

    /// Range followed by one value per point.
    fn measures(&mut self, count: usize) -> Result<Measures> {
        self.require(16 + count * 8, "measure block")?;
        let range = Range::new(self.reader.read_f64()?, self.reader.read_f64()?);
        let mut values = Vec::with_capacity(count);
        for _ in 0..count {
            values.push(self.reader.read_f64()?);
        }
        Ok(Measures { range, values })
    }

    /// The M block is optional: read it only when the record still holds it.
    fn optional_measures(&mut self, shape_type: ShapeType, count: usize) -> Result<Option<Measures>> {
        if shape_type.may_have_m() && self.remaining() >= 16 + count * 8 {
            self.measures(count).map(Some)
        } else {
            Ok(None)
        }
    }

    fn z_and_m(
        &mut self,
        shape_type: ShapeType,
        count: usize,
    ) -> Result<(Option<Measures>, Option<Measures>)> {
        let z = if shape_type.has_z() {
            Some(self.measures(count)?)
        } else {
            None
        };
        let m = self.optional_measures(shape_type, count)?;
        Ok((z, m))
    }

    fn point(&mut self, shape_type: ShapeType) -> Result<PointShape> {
        self.require(16, "point")?;
        let point = Vector2::new(self.reader.read_f64()?, self.reader.read_f64()?);
        let z = if shape_type.has_z() {
            self.require(8, "point elevation")?;
            Some(self.reader.read_f64()?)
        } else {
            None
        };
        let m = if shape_type.may_have_m() && self.remaining() >= 8 {
            Some(self.reader.read_f64()?)
        } else {
            None
        };
        Ok(PointShape {
            shape_type,
            point,
            z,
            m,
        })
    }

    /// Shared layout of polylines and polygons.
    fn poly(
        &mut self,
        shape_type: ShapeType,
    ) -> Result<(BoundingBox2D, Vec<usize>, Vec<Vector2>, Option<Measures>, Option<Measures>)> {
        self.require(40, "poly header")?;
        let bounding_box = self.bounding_box()?;
        let num_parts = self.read_count("part count")?;
        let num_points = self.read_count("point count")?;
        let parts = self.parts(num_parts, num_points)?;
        let points = self.points(num_points)?;
        let (z, m) = self.z_and_m(shape_type, num_points)?;
        Ok((bounding_box, parts, points, z, m))
    }

    fn polyline(&mut self, shape_type: ShapeType) -> Result<PolylineShape> {
        let (bounding_box, parts, points, z, m) = self.poly(shape_type)?;
        Ok(PolylineShape {
            shape_type,
            bounding_box,
            parts,
            points,
            z,
            m,
        })
    }

    fn polygon(&mut self, shape_type: ShapeType) -> Result<PolygonShape> {
        let (bounding_box, parts, points, z, m) = self.poly(shape_type)?;
        let rings = part_slices(&points, &parts)
            .into_iter()
            .map(|ring| ring.to_vec())
            .collect();
        let polygons = assemble_polygons(rings);
        Ok(PolygonShape {
            shape_type,
            bounding_box,
            parts,
            points,
            z,
            m,
            polygons,
        })
    }

    fn multi_point(&mut self, shape_type: ShapeType) -> Result<MultiPointShape> {
        self.require(36, "multipoint header")?;
        let bounding_box = self.bounding_box()?;
        let num_points = self.read_count("point count")?;
        let points = self.points(num_points)?;
        let (z, m) = self.z_and_m(shape_type, num_points)?;
        Ok(MultiPointShape {
            shape_type,
            bounding_box,
            points,
            z,
            m,
        })
    }

    fn multi_patch(&mut self) -> Result<MultiPatchShape> {
        self.require(40, "multipatch header")?;
        let bounding_box = self.bounding_box()?;
        let num_parts = self.read_count("part count")?;
        let num_points = self.read_count("point count")?;
        let parts = self.parts(num_parts, num_points)?;

        self.require(num_parts * 4, "part type array")?;
        let mut part_types = Vec::with_capacity(num_parts);
        for _ in 0..num_parts {
            let code = self.reader.read_i32()?;
            let part_type = PatchPartType::from_i32(code)
                .ok_or_else(|| self.invalid(format!("unknown multipatch part type {code}")))?;
            part_types.push(part_type);
        }

        let points = self.points(num_points)?;
        let z = self.measures(num_points)?;
        let m = self.optional_measures(ShapeType::MultiPatch, num_points)?;
        Ok(MultiPatchShape {
            bounding_box,
            parts,
            part_types,
            points,
            z,
            m,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoError;

    fn header(shape_type: i32, file_length_words: i32) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&9994i32.to_be_bytes());
        data.extend_from_slice(&[0u8; 20]);
        data.extend_from_slice(&file_length_words.to_be_bytes());
        data.extend_from_slice(&1000i32.to_le_bytes());
        data.extend_from_slice(&shape_type.to_le_bytes());
        data.extend_from_slice(&[0u8; 64]);
        data
    }

    fn point_record(number: i32, x: f64, y: f64) -> Vec<u8> {
        let mut data = Vec::new();
        data.extend_from_slice(&number.to_be_bytes());
        data.extend_from_slice(&10i32.to_be_bytes());
        data.extend_from_slice(&1i32.to_le_bytes());
        data.extend_from_slice(&x.to_le_bytes());
        data.extend_from_slice(&y.to_le_bytes());
        data
    }

    #[test]
    fn test_header_only_file() {
        let file = ShpReader::from_bytes(header(1, 50)).read().unwrap();
        assert_eq!(file.header.shape_type, ShapeType::Point);
        assert!(file.records.is_empty());
        assert!(file.notifications.is_empty());
    }

    #[test]
    fn test_two_points() {
        let mut data = header(1, 50 + 28);
        data.extend(point_record(1, 1.0, 2.0));
        data.extend(point_record(2, -3.5, 4.25));
        let file = ShpReader::from_bytes(data).read().unwrap();
        assert_eq!(file.records.len(), 2);
        match &file.records[1].shape {
            Shape::Point(p) => {
                assert_eq!(p.point, Vector2::new(-3.5, 4.25));
                assert_eq!(p.z, None);
            }
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn test_unknown_header_shape_type() {
        let err = ShpReader::from_bytes(header(99, 50)).read().unwrap_err();
        assert!(matches!(err, GeoError::UnknownShapeType(99)));
    }

    #[test]
    fn test_bad_file_code() {
        let mut data = header(1, 50);
        data[3] = 0;
        assert!(matches!(
            ShpReader::from_bytes(data).read(),
            Err(GeoError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_truncated_header_is_out_of_bounds() {
        let data = header(1, 50)[..60].to_vec();
        assert!(matches!(
            ShpReader::from_bytes(data).read(),
            Err(GeoError::OutOfBounds { .. })
        ));
    }
}
