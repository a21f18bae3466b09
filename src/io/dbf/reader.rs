//! dBase (.dbf) reader.
//!
//! # Usage
//!
//! ```rust,ignore
//! use geofile::io::dbf::DbfReader;
//!
//! let table = DbfReader::from_file("parcels.dbf")?.read()?;
//! for record in table.active_records() {
//!     println!("{:?}", record.get("NAME"));
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use encoding_rs::Encoding;

use crate::cancellation::{self, CancellationToken};
use crate::error::Result;
use crate::io::binary_reader::BinaryCursorReader;
use crate::notification::NotificationCollection;

use super::header::DbfHeader;
use super::language_driver::encoding_from_language_driver;
use super::record::{decode_value, DbfRecord, NumberEncoding, DELETED_FLAG, DELETED_SENTINEL};
use super::version::HeaderStrategy;

/// Configuration options for the dBase reader.
#[derive(Debug, Clone)]
pub struct DbfReaderConfiguration {
    /// Text encoding. When `None` the language driver id of the header
    /// decides, falling back to Windows-1252.
    pub encoding: Option<&'static Encoding>,

    /// Strip the space padding from character fields.
    ///
    /// Default: `true`.
    pub trim_strings: bool,

    /// Force a header layout instead of the one the version byte selects.
    /// This is the only way to read the compact dBASE III+ layout.
    pub strategy_override: Option<HeaderStrategy>,

    /// Checked before every record.
    pub cancellation: Option<CancellationToken>,
}

impl Default for DbfReaderConfiguration {
    fn default() -> Self {
        Self {
            encoding: None,
            trim_strings: true,
            strategy_override: None,
            cancellation: None,
        }
    }
}

/// Result of a successful read.
#[derive(Debug, Clone)]
pub struct DbfTable {
    pub header: DbfHeader,
    /// All records, deleted ones included.
    pub records: Vec<DbfRecord>,
    pub notifications: NotificationCollection,
}

impl DbfTable {
    /// Records whose deleted flag is not set.
    pub fn active_records(&self) -> impl Iterator<Item = &DbfRecord> {
        self.records.iter().filter(|r| !r.deleted)
    }
}

/// dBase reader over a fully loaded buffer.
pub struct DbfReader {
    reader: BinaryCursorReader,
    config: DbfReaderConfiguration,
    notifications: NotificationCollection,
}

impl DbfReader {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buffer = Vec::new();
        reader.read_to_end(&mut buffer)?;
        Ok(Self::from_bytes(buffer))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            reader: BinaryCursorReader::new(bytes),
            config: DbfReaderConfiguration::default(),
            notifications: NotificationCollection::new(),
        }
    }

    pub fn with_configuration(mut self, config: DbfReaderConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Read the header only.
    pub fn read_header(mut self) -> Result<DbfHeader> {
        self.parse_header().inspect_err(|e| log::error!("dbf header decode failed: {e}"))
    }

    /// Read the header and every record.
    pub fn read(mut self) -> Result<DbfTable> {
        match self.read_all() {
            Ok((header, records)) => Ok(DbfTable {
                header,
                records,
                notifications: self.notifications,
            }),
            Err(e) => {
                log::error!("dbf decode failed: {e}");
                Err(e)
            }
        }
    }

    fn parse_header(&mut self) -> Result<DbfHeader> {
        DbfHeader::parse(
            &mut self.reader,
            self.config.strategy_override,
            &mut self.notifications,
        )
    }

    fn read_all(&mut self) -> Result<(DbfHeader, Vec<DbfRecord>)> {
        let header = self.parse_header()?;

        let encoding = self
            .config
            .encoding
            .or_else(|| {
                header
                    .flags
                    .and_then(|f| encoding_from_language_driver(f.language_driver_id))
            })
            .unwrap_or(encoding_rs::WINDOWS_1252);
        self.reader.set_encoding(encoding);
        log::debug!(
            "dbf {} via {:?}: {} records, {} fields, {}",
            header.version,
            header.strategy,
            header.record_count,
            header.fields.len(),
            encoding.name()
        );

        if let Some(flags) = header.flags {
            if flags.encryption != 0 {
                self.notifications
                    .info("table is flagged as encrypted, values are read as stored");
            }
            if flags.incomplete_transaction != 0 {
                self.notifications
                    .info("table is flagged with an incomplete transaction");
            }
        }

        // Skip the FoxPro backlink area and any padding.
        let data_start = header.header_length as usize;
        if data_start > self.reader.position() {
            self.reader.seek_to(data_start)?;
        }

        let records = self.read_records(&header)?;
        Ok((header, records))
    }

    fn read_records(&mut self, header: &DbfHeader) -> Result<Vec<DbfRecord>> {
        let numbers = if header.version.is_dbase_vii() {
            NumberEncoding::SortableBigEndian
        } else {
            NumberEncoding::LittleEndian
        };
        let record_length = match header.record_length as usize {
            0 => 1 + header.fields.iter().map(|f| f.length as usize).sum::<usize>(),
            declared => declared,
        };

        let mut records = Vec::with_capacity(header.record_count.min(1 << 20) as usize);
        for index in 0..header.record_count as usize {
            cancellation::check(self.config.cancellation.as_ref())?;

            if self.reader.remaining() < record_length {
                if self.reader.peek_u8() != Some(DELETED_SENTINEL) {
                    self.notifications.warning(format!(
                        "header declares {} records but the data ends after {}",
                        header.record_count, index
                    ));
                }
                break;
            }

            let record_start = self.reader.position();
            let flag = self.reader.read_u8()?;
            let mut record = DbfRecord {
                deleted: flag == DELETED_FLAG || flag == DELETED_SENTINEL,
                ..Default::default()
            };

            for field in &header.fields {
                let field_start = self.reader.position();
                let value = decode_value(&mut self.reader, field, numbers, self.config.trim_strings)?;
                record.values.insert(field.name.clone(), value);
                self.reader.seek_to(field_start + field.length as usize)?;
            }

            records.push(record);
            self.reader.seek_to(record_start + record_length)?;
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationType;
    use crate::error::GeoError;
    use crate::io::dbf::field::FieldDescriptor;
    use crate::io::dbf::record::DbfValue;
    use crate::io::dbf::version::DbfVersion;
    use crate::io::dbf::writer::DbfWriter;

    fn sample_table(version: DbfVersion) -> Vec<u8> {
        let mut writer = DbfWriter::new(
            version,
            vec![
                FieldDescriptor::character("NAME", 12),
                FieldDescriptor::numeric("POP", 8, 0),
                FieldDescriptor::logical("CAPITAL"),
            ],
        );
        writer.add_record(vec![
            DbfValue::Text("Ankara".into()),
            DbfValue::Integer(5_700_000),
            DbfValue::Logical(true),
        ]);
        writer.add_deleted_record(vec![
            DbfValue::Text("Izmir".into()),
            DbfValue::Null,
            DbfValue::Logical(false),
        ]);
        writer.write().unwrap()
    }

    #[test]
    fn test_read_records() {
        let table = DbfReader::from_bytes(sample_table(DbfVersion::DbaseIIIPlus))
            .read()
            .unwrap();
        assert_eq!(table.records.len(), 2);

        let first = &table.records[0];
        assert!(!first.deleted);
        assert_eq!(first.get("NAME"), Some(&DbfValue::Text("Ankara".into())));
        assert_eq!(first.get("POP"), Some(&DbfValue::Integer(5_700_000)));
        assert_eq!(first.get("CAPITAL"), Some(&DbfValue::Logical(true)));

        let second = &table.records[1];
        assert!(second.deleted);
        assert_eq!(second.get("POP"), Some(&DbfValue::Null));
        assert_eq!(table.active_records().count(), 1);
    }

    #[test]
    fn test_field_order_is_preserved() {
        let table = DbfReader::from_bytes(sample_table(DbfVersion::DbaseIIIPlus))
            .read()
            .unwrap();
        let names: Vec<_> = table.records[0].values.keys().cloned().collect();
        assert_eq!(names, ["NAME", "POP", "CAPITAL"]);
    }

    #[test]
    fn test_untrimmed_strings() {
        let config = DbfReaderConfiguration {
            trim_strings: false,
            ..Default::default()
        };
        let table = DbfReader::from_bytes(sample_table(DbfVersion::DbaseIIIPlus))
            .with_configuration(config)
            .read()
            .unwrap();
        assert_eq!(
            table.records[0].get("NAME"),
            Some(&DbfValue::Text("Ankara      ".into()))
        );
    }

    #[test]
    fn test_short_data_is_reported() {
        let mut bytes = sample_table(DbfVersion::DbaseIIIPlus);
        let record_length = 1 + 12 + 8 + 1;
        bytes.truncate(bytes.len() - record_length);

        let table = DbfReader::from_bytes(bytes).read().unwrap();
        assert_eq!(table.records.len(), 1);
        assert_eq!(table.notifications.len(), 1);
    }

    #[test]
    fn test_encryption_flag_is_noted() {
        let mut bytes = sample_table(DbfVersion::DbaseIIIPlus);
        bytes[15] = 1;

        let table = DbfReader::from_bytes(bytes).read().unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.notifications.count(NotificationType::Info), 1);
        assert!(table.header.flags.unwrap().encryption != 0);
    }

    #[test]
    fn test_timestamp_field_fails() {
        let mut writer = DbfWriter::new(
            DbfVersion::DbaseIIIPlus,
            vec![FieldDescriptor::character("TS", 8)],
        );
        writer.add_record(vec![DbfValue::Text("x".into())]);
        let mut bytes = writer.write().unwrap();
        // Retype the field as a timestamp.
        bytes[32 + 11] = b'@';

        let err = DbfReader::from_bytes(bytes).read().unwrap_err();
        assert!(matches!(err, GeoError::NotImplemented(_)));
    }

    #[test]
    fn test_read_header_only() {
        let header = DbfReader::from_bytes(sample_table(DbfVersion::FoxBase))
            .read_header()
            .unwrap();
        assert_eq!(header.version, DbfVersion::FoxBase);
        assert_eq!(header.record_count, 2);
        assert_eq!(header.fields.len(), 3);
    }
}
