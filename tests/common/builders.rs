//! In-memory file builders for the integration tests.
//!
//! `ShpBuilder` lays out a complete shapefile (header, record headers and
//! little-endian payloads) from plain coordinates, so tests never need
//! fixture files on disk.

#![allow(dead_code)]

use byteorder::{BigEndian, LittleEndian, WriteBytesExt};
use geofile::io::dbf::{DbfValue, DbfVersion, DbfWriter, FieldDescriptor, FieldType, HeaderStrategy};

/// Shape type codes used by the builders.
pub mod codes {
    pub const NULL: i32 = 0;
    pub const POINT: i32 = 1;
    pub const POLYLINE: i32 = 3;
    pub const POLYGON: i32 = 5;
    pub const MULTI_POINT: i32 = 8;
    pub const POINT_Z: i32 = 11;
    pub const POLYLINE_Z: i32 = 13;
    pub const POLYGON_M: i32 = 25;
    pub const MULTI_PATCH: i32 = 31;
}

/// Builder for a shapefile byte buffer.
pub struct ShpBuilder {
    file_code: i32,
    version: i32,
    shape_type: i32,
    declared_length: Option<i32>,
    records: Vec<Vec<u8>>,
}

impl ShpBuilder {
    pub fn new(shape_type: i32) -> Self {
        Self {
            file_code: 9994,
            version: 1000,
            shape_type,
            declared_length: None,
            records: Vec::new(),
        }
    }

    pub fn file_code(mut self, code: i32) -> Self {
        self.file_code = code;
        self
    }

    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Override the file length (in 16-bit words) stored in the header.
    pub fn declared_length(mut self, words: i32) -> Self {
        self.declared_length = Some(words);
        self
    }

    /// Append a record with an already encoded payload.
    pub fn raw_record(mut self, payload: Vec<u8>) -> Self {
        self.records.push(payload);
        self
    }

    pub fn null(self) -> Self {
        let mut payload = Vec::new();
        payload.write_i32::<LittleEndian>(codes::NULL).unwrap();
        self.raw_record(payload)
    }

    pub fn point(self, x: f64, y: f64) -> Self {
        let mut payload = Vec::new();
        payload.write_i32::<LittleEndian>(codes::POINT).unwrap();
        write_xy(&mut payload, &[(x, y)]);
        self.raw_record(payload)
    }

    pub fn point_z(self, x: f64, y: f64, z: f64, m: f64) -> Self {
        let mut payload = Vec::new();
        payload.write_i32::<LittleEndian>(codes::POINT_Z).unwrap();
        write_xy(&mut payload, &[(x, y)]);
        payload.write_f64::<LittleEndian>(z).unwrap();
        payload.write_f64::<LittleEndian>(m).unwrap();
        self.raw_record(payload)
    }

    pub fn multi_point(self, points: &[(f64, f64)]) -> Self {
        let mut payload = Vec::new();
        payload.write_i32::<LittleEndian>(codes::MULTI_POINT).unwrap();
        write_bbox(&mut payload, points);
        payload.write_i32::<LittleEndian>(points.len() as i32).unwrap();
        write_xy(&mut payload, points);
        self.raw_record(payload)
    }

    /// Polyline or polygon record: one part per ring.
    pub fn poly(self, shape_type: i32, rings: &[&[(f64, f64)]]) -> Self {
        let payload = poly_payload(shape_type, rings);
        self.raw_record(payload)
    }

    /// PolylineZ record with a Z block and no M block.
    pub fn polyline_z(self, parts: &[&[(f64, f64, f64)]]) -> Self {
        let xy: Vec<Vec<(f64, f64)>> = parts
            .iter()
            .map(|p| p.iter().map(|&(x, y, _)| (x, y)).collect())
            .collect();
        let xy_refs: Vec<&[(f64, f64)]> = xy.iter().map(Vec::as_slice).collect();
        let mut payload = poly_payload(codes::POLYLINE_Z, &xy_refs);

        let zs: Vec<f64> = parts.iter().flat_map(|p| p.iter().map(|&(_, _, z)| z)).collect();
        write_measures(&mut payload, &zs);
        self.raw_record(payload)
    }

    /// PolygonM record: one part per ring, followed by the M block.
    pub fn polygon_m(self, rings: &[&[(f64, f64)]], measures: &[f64]) -> Self {
        let mut payload = poly_payload(codes::POLYGON_M, rings);
        write_measures(&mut payload, measures);
        self.raw_record(payload)
    }

    /// MultiPatch record: `(part type, xyz points)` per part, Z block, no M.
    pub fn multi_patch(self, parts: &[(i32, &[(f64, f64, f64)])]) -> Self {
        let xy: Vec<Vec<(f64, f64)>> = parts
            .iter()
            .map(|(_, p)| p.iter().map(|&(x, y, _)| (x, y)).collect())
            .collect();
        let all: Vec<(f64, f64)> = xy.iter().flatten().copied().collect();

        let mut payload = Vec::new();
        payload.write_i32::<LittleEndian>(codes::MULTI_PATCH).unwrap();
        write_bbox(&mut payload, &all);
        payload.write_i32::<LittleEndian>(parts.len() as i32).unwrap();
        payload.write_i32::<LittleEndian>(all.len() as i32).unwrap();
        let mut start = 0;
        for part in &xy {
            payload.write_i32::<LittleEndian>(start).unwrap();
            start += part.len() as i32;
        }
        for (part_type, _) in parts {
            payload.write_i32::<LittleEndian>(*part_type).unwrap();
        }
        write_xy(&mut payload, &all);

        let zs: Vec<f64> = parts.iter().flat_map(|(_, p)| p.iter().map(|&(_, _, z)| z)).collect();
        write_measures(&mut payload, &zs);
        self.raw_record(payload)
    }

    pub fn build(self) -> Vec<u8> {
        let body_len: usize = self.records.iter().map(|r| 8 + r.len()).sum();
        let total = 100 + body_len;

        let mut out = Vec::with_capacity(total);
        out.write_i32::<BigEndian>(self.file_code).unwrap();
        out.extend_from_slice(&[0; 20]);
        out.write_i32::<BigEndian>(self.declared_length.unwrap_or((total / 2) as i32))
            .unwrap();
        out.write_i32::<LittleEndian>(self.version).unwrap();
        out.write_i32::<LittleEndian>(self.shape_type).unwrap();
        for _ in 0..8 {
            out.write_f64::<LittleEndian>(0.0).unwrap();
        }

        for (i, payload) in self.records.iter().enumerate() {
            out.write_i32::<BigEndian>(i as i32 + 1).unwrap();
            out.write_i32::<BigEndian>((payload.len() / 2) as i32).unwrap();
            out.extend_from_slice(payload);
        }
        out
    }
}

fn poly_payload(shape_type: i32, rings: &[&[(f64, f64)]]) -> Vec<u8> {
    let all: Vec<(f64, f64)> = rings.iter().flat_map(|r| r.iter().copied()).collect();

    let mut payload = Vec::new();
    payload.write_i32::<LittleEndian>(shape_type).unwrap();
    write_bbox(&mut payload, &all);
    payload.write_i32::<LittleEndian>(rings.len() as i32).unwrap();
    payload.write_i32::<LittleEndian>(all.len() as i32).unwrap();
    let mut start = 0;
    for ring in rings {
        payload.write_i32::<LittleEndian>(start).unwrap();
        start += ring.len() as i32;
    }
    write_xy(&mut payload, &all);
    payload
}

fn write_xy(out: &mut Vec<u8>, points: &[(f64, f64)]) {
    for &(x, y) in points {
        out.write_f64::<LittleEndian>(x).unwrap();
        out.write_f64::<LittleEndian>(y).unwrap();
    }
}

fn write_bbox(out: &mut Vec<u8>, points: &[(f64, f64)]) {
    let min_x = points.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let min_y = points.iter().map(|p| p.1).fold(f64::INFINITY, f64::min);
    let max_x = points.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let max_y = points.iter().map(|p| p.1).fold(f64::NEG_INFINITY, f64::max);
    for v in [min_x, min_y, max_x, max_y] {
        out.write_f64::<LittleEndian>(if v.is_finite() { v } else { 0.0 }).unwrap();
    }
}

fn write_measures(out: &mut Vec<u8>, values: &[f64]) {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    out.write_f64::<LittleEndian>(min).unwrap();
    out.write_f64::<LittleEndian>(max).unwrap();
    for &v in values {
        out.write_f64::<LittleEndian>(v).unwrap();
    }
}

/// Clockwise square (an outer ring in y-up coordinates).
pub fn square_cw(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
    vec![
        (x, y),
        (x, y + size),
        (x + size, y + size),
        (x + size, y),
        (x, y),
    ]
}

/// Counter-clockwise square (a hole).
pub fn square_ccw(x: f64, y: f64, size: f64) -> Vec<(f64, f64)> {
    let mut ring = square_cw(x, y, size);
    ring.reverse();
    ring
}

// ===========================================================================
// DBF
// ===========================================================================

/// One field of every type the record decoder supports, except timestamps.
pub fn sample_fields() -> Vec<FieldDescriptor> {
    vec![
        FieldDescriptor::character("NAME", 16),
        FieldDescriptor::numeric("POP", 10, 0),
        FieldDescriptor::new("AREA", FieldType::Float, 12, 3),
        FieldDescriptor::logical("CAPITAL"),
        FieldDescriptor::new("FOUNDED", FieldType::Date, 8, 0),
        FieldDescriptor::new("ID", FieldType::Long, 4, 0),
        FieldDescriptor::new("RATIO", FieldType::Double, 8, 0),
    ]
}

pub fn sample_rows() -> Vec<Vec<DbfValue>> {
    vec![
        vec![
            DbfValue::Text("Ankara".into()),
            DbfValue::Integer(5_700_000),
            DbfValue::Integer(2516),
            DbfValue::Logical(true),
            DbfValue::Text("19231013".into()),
            DbfValue::Integer(6),
            DbfValue::Double(0.75),
        ],
        vec![
            DbfValue::Text("Bursa".into()),
            DbfValue::Integer(3_100_000),
            DbfValue::Null,
            DbfValue::Logical(false),
            DbfValue::Null,
            DbfValue::Integer(-16),
            DbfValue::Double(-1.5),
        ],
    ]
}

/// Encoded table with the sample fields and rows.
pub fn sample_dbf(version: DbfVersion, strategy: Option<HeaderStrategy>) -> Vec<u8> {
    let mut writer = DbfWriter::new(version, sample_fields());
    if let Some(strategy) = strategy {
        writer = writer.with_strategy(strategy);
    }
    for row in sample_rows() {
        writer.add_record(row);
    }
    writer.write().unwrap()
}

// ===========================================================================
// ASC
// ===========================================================================

/// `count` lines of a regular grid, `columns` values per line.
pub fn asc_grid(count: usize, columns: usize) -> String {
    let mut text = String::new();
    for i in 0..count {
        let x = (i % 100) as f64 * 0.5;
        let y = (i / 100) as f64 * 0.25;
        let z = (i % 7) as f64;
        let mut values = vec![x, y, z];
        for c in 3..columns {
            values.push(((i + c) % 256) as f64);
        }
        let line: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        text.push_str(&line.join(" "));
        text.push('\n');
    }
    text
}
