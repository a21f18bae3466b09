//! Shared test utilities for geofile integration tests.
//!
//! Byte builders live in [`builders`]; the helpers here wrap the readers
//! with the settings the tests use most.

#![allow(dead_code)]

pub mod builders;

use std::io::Cursor;

use geofile::io::asc::{AscCloud, AscReader, AscReaderConfiguration};
use geofile::io::dbf::{DbfReader, DbfReaderConfiguration, DbfTable, HeaderStrategy};
use geofile::io::shp::{ShapeFile, ShpReader};
use geofile::Vector3;

// ===========================================================================
// Read helpers
// ===========================================================================

pub fn read_shp(bytes: Vec<u8>) -> geofile::Result<ShapeFile> {
    ShpReader::from_bytes(bytes).read()
}

pub fn read_dbf(bytes: Vec<u8>, strategy_override: Option<HeaderStrategy>) -> geofile::Result<DbfTable> {
    DbfReader::from_bytes(bytes)
        .with_configuration(DbfReaderConfiguration {
            strategy_override,
            ..Default::default()
        })
        .read()
}

/// Reader settings with no offset, so positions come out as written.
pub fn asc_config(chunk_size: usize) -> AscReaderConfiguration {
    let mut config = AscReaderConfiguration {
        chunk_size,
        ..Default::default()
    };
    config.set_offset(Vector3::ZERO);
    config
}

pub fn read_asc(text: &str, config: AscReaderConfiguration) -> geofile::Result<AscCloud> {
    AscReader::new(Cursor::new(text.as_bytes().to_vec()))
        .with_configuration(config)
        .read()
}

/// All positions of a decoded cloud, batches concatenated.
pub fn all_positions(cloud: &AscCloud) -> Vec<f32> {
    cloud
        .batches
        .iter()
        .flat_map(|b| b.positions.iter().copied())
        .collect()
}
