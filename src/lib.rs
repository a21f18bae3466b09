//! # geofile
//!
//! A pure Rust library for decoding geospatial files.
//!
//! ## Features
//!
//! - ESRI Shapefile (`.shp`) geometry: points, polylines, polygons with
//!   holes, multipoints and multipatches, including the Z and M variants
//! - dBase (`.dbf`) attribute tables across the dBASE II, III, III+ and 7
//!   header layouts, with a matching writer
//! - Streaming ASCII point clouds (`.asc`) of any size, decoded chunk by
//!   chunk into bounded point batches
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geofile::io::{dbf::DbfReader, shp::ShpReader};
//!
//! let shapes = ShpReader::from_file("parcels.shp")?.read()?;
//! let table = DbfReader::from_file("parcels.dbf")?.read()?;
//!
//! for (record, row) in shapes.records.iter().zip(&table.records) {
//!     println!("{:?}: {:?}", record.shape.shape_type(), row.get("NAME"));
//! }
//! # Ok::<(), geofile::error::GeoError>(())
//! ```
//!
//! ## Diagnostics
//!
//! Fatal problems (bad magic numbers, unknown versions, reads past the end
//! of the data) are returned as [`GeoError`]. Problems confined to a single
//! record or line are skipped and reported in the
//! [`NotificationCollection`] of the result, and forwarded to the `log`
//! facade.

#![allow(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod cancellation;
pub mod error;
pub mod io;
pub mod notification;
pub mod types;

// Re-export commonly used types
pub use cancellation::CancellationToken;
pub use error::{ErrorKind, GeoError, Result};
pub use notification::{Notification, NotificationCollection, NotificationType};
pub use types::{BoundingBox2D, BoundingBox3D, Range, Vector2, Vector3};

// Re-export I/O types
pub use io::asc::{AscReader, PointBatch, PointBatchSink};
pub use io::dbf::{DbfReader, DbfRecord, DbfValue, DbfWriter};
pub use io::shp::{Shape, ShapeRecord, ShapeType, ShpReader};
pub use io::BinaryCursorReader;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
