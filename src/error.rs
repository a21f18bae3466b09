//! Error types for the geofile library

use std::io;
use thiserror::Error;

/// Broad category of a [`GeoError`].
///
/// Structural and bounds errors abort a decode. Record errors only ever
/// describe a single record or line, which the decoders skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad magic number, version, shape type or field type.
    Structural,
    /// Malformed individual record or line.
    Record,
    /// Cursor read past the end of the buffer.
    Bounds,
    /// Failure of the underlying byte source.
    Io,
    /// The operation was cancelled through a [`crate::CancellationToken`].
    Cancelled,
}

/// Main error type for geofile operations
#[derive(Debug, Error)]
pub enum GeoError {
    /// IO error occurred while reading the byte source
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A read or seek went past the end of the buffer
    #[error("Out of bounds: {requested} byte(s) requested at offset {offset}, buffer length is {length}")]
    OutOfBounds {
        offset: usize,
        requested: usize,
        length: usize,
    },

    /// Invalid file header (magic number, length)
    #[error("Invalid file header: {0}")]
    InvalidHeader(String),

    /// Shape type code not defined by the shapefile format
    #[error("Unknown shape type: {0}")]
    UnknownShapeType(i32),

    /// Unsupported or unknown file version
    #[error("Unsupported version: {0:#04X}")]
    UnsupportedVersion(u8),

    /// Field type code not defined by the dBase format
    #[error("Invalid field type '{code}' for field '{field}'")]
    InvalidFieldType { field: String, code: char },

    /// Feature not yet implemented
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Reader configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A single record or line is malformed
    #[error("Invalid record {index}: {message}")]
    InvalidRecord { index: usize, message: String },

    /// Generic parse failure
    #[error("Parse error: {0}")]
    Parse(String),

    /// The decode was cancelled
    #[error("Operation cancelled")]
    Cancelled,
}

impl GeoError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GeoError::Io(_) => ErrorKind::Io,
            GeoError::OutOfBounds { .. } => ErrorKind::Bounds,
            GeoError::InvalidHeader(_)
            | GeoError::UnknownShapeType(_)
            | GeoError::UnsupportedVersion(_)
            | GeoError::InvalidFieldType { .. }
            | GeoError::NotImplemented(_)
            | GeoError::InvalidConfiguration(_) => ErrorKind::Structural,
            GeoError::InvalidRecord { .. } | GeoError::Parse(_) => ErrorKind::Record,
            GeoError::Cancelled => ErrorKind::Cancelled,
        }
    }

    /// Whether this error aborts the whole decode.
    pub fn is_fatal(&self) -> bool {
        self.kind() != ErrorKind::Record
    }
}

/// Result type alias for geofile operations
pub type Result<T> = std::result::Result<T, GeoError>;
