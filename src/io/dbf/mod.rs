//! dBase (.dbf) attribute tables
//!
//! The version byte selects one of four header layouts through a static
//! table; see [`HeaderStrategy`].

mod field;
mod header;
mod language_driver;
mod properties;
mod reader;
mod record;
mod version;
mod writer;

pub use field::{FieldDescriptor, FieldType};
pub use header::{
    write_field_descriptors, DbfDate, DbfHeader, HeaderFlags, HEADER_TERMINATOR, YEAR_OFFSET,
};
pub use language_driver::encoding_from_language_driver;
pub use properties::{
    CustomProperty, FieldProperties, ReferentialIntegrityProperty, StandardProperty,
};
pub use reader::{DbfReader, DbfReaderConfiguration, DbfTable};
pub use record::{parse_leading_integer, DbfRecord, DbfValue, DELETED_SENTINEL};
pub use version::{DbfVersion, HeaderStrategy};
pub use writer::DbfWriter;
