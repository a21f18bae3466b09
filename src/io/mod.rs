//! I/O module for decoding Shapefile geometry, dBase tables and ASCII point clouds

pub mod asc;
pub mod binary_reader;
pub mod dbf;
pub mod shp;

pub use asc::{AscReader, AscReaderConfiguration};
pub use binary_reader::{BinaryCursorReader, Endianness};
pub use dbf::{DbfReader, DbfReaderConfiguration, DbfWriter};
pub use shp::{ShpReader, ShpReaderConfiguration};
