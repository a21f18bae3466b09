//! dBase (.dbf) writer.
//!
//! Produces a complete file for any of the header layouts: header,
//! descriptors, terminator, the dBASE 7 field-properties block, records and
//! the trailing 0x1A end marker.

use std::io::Write;

use encoding_rs::Encoding;

use crate::error::Result;

use super::field::FieldDescriptor;
use super::header::{descriptor_size, fixed_header_size, DbfDate, DbfHeader, HeaderFlags};
use super::language_driver::encoding_from_language_driver;
use super::properties::FieldProperties;
use super::record::{
    encode_value, DbfValue, NumberEncoding, ACTIVE_FLAG, DELETED_FLAG, DELETED_SENTINEL,
};
use super::version::{DbfVersion, HeaderStrategy};

pub struct DbfWriter {
    version: DbfVersion,
    strategy: HeaderStrategy,
    fields: Vec<FieldDescriptor>,
    records: Vec<(bool, Vec<DbfValue>)>,
    last_update: DbfDate,
    language_driver_id: u8,
    language_driver_name: Option<String>,
}

impl DbfWriter {
    /// Writer for `version`, laid out with the strategy the version selects.
    pub fn new(version: DbfVersion, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            version,
            strategy: version.strategy(),
            fields,
            records: Vec::new(),
            last_update: DbfDate::new(2000, 1, 1),
            language_driver_id: 0,
            language_driver_name: None,
        }
    }

    /// Use another header layout than the version's own.
    pub fn with_strategy(mut self, strategy: HeaderStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_last_update(mut self, date: DbfDate) -> Self {
        self.last_update = date;
        self
    }

    /// Language driver id stored in the header; it also selects the encoding
    /// of character fields.
    pub fn with_language_driver(mut self, id: u8, name: Option<String>) -> Self {
        self.language_driver_id = id;
        self.language_driver_name = name;
        self
    }

    /// Append a record. Missing trailing values are written as null.
    pub fn add_record(&mut self, values: Vec<DbfValue>) {
        self.records.push((false, values));
    }

    pub fn add_deleted_record(&mut self, values: Vec<DbfValue>) {
        self.records.push((true, values));
    }

    /// The header that [`DbfWriter::write`] encodes.
    pub fn header(&self) -> DbfHeader {
        let field_properties = self.version.is_dbase_vii().then(FieldProperties::default);
        let properties_len = field_properties.as_ref().map_or(0, FieldProperties::encoded_len);
        let header_length = fixed_header_size(self.strategy)
            + descriptor_size(self.strategy) * self.fields.len()
            + 1
            + properties_len;
        let record_length = 1 + self.fields.iter().map(|f| f.length as usize).sum::<usize>();

        let has_flags = matches!(self.strategy, HeaderStrategy::DbaseIII | HeaderStrategy::DbaseVII);
        DbfHeader {
            version: self.version,
            strategy: self.strategy,
            last_update: self.last_update,
            record_count: self.records.len() as u32,
            header_length: header_length.min(u16::MAX as usize) as u16,
            record_length: record_length.min(u16::MAX as usize) as u16,
            flags: has_flags.then_some(HeaderFlags {
                language_driver_id: self.language_driver_id,
                ..Default::default()
            }),
            language_driver_name: (self.strategy == HeaderStrategy::DbaseVII)
                .then(|| self.language_driver_name.clone().unwrap_or_default()),
            fields: self.fields.clone(),
            field_properties,
        }
    }

    /// Encode the whole file.
    pub fn write(&self) -> Result<Vec<u8>> {
        let header = self.header();
        let mut out = Vec::with_capacity(
            header.header_length as usize + header.record_length as usize * self.records.len() + 1,
        );
        header.write(&mut out)?;

        let encoding: &'static Encoding =
            encoding_from_language_driver(self.language_driver_id).unwrap_or(encoding_rs::WINDOWS_1252);
        let numbers = if self.version.is_dbase_vii() {
            NumberEncoding::SortableBigEndian
        } else {
            NumberEncoding::LittleEndian
        };

        for (deleted, values) in &self.records {
            out.push(if *deleted { DELETED_FLAG } else { ACTIVE_FLAG });
            for (i, field) in self.fields.iter().enumerate() {
                let value = values.get(i).unwrap_or(&DbfValue::Null);
                encode_value(field, value, numbers, encoding, &mut out)?;
            }
        }

        out.push(DELETED_SENTINEL);
        Ok(out)
    }

    /// Encode the whole file into `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.write()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeoError;
    use crate::io::dbf::field::FieldType;

    #[test]
    fn test_header_lengths() {
        let fields = vec![FieldDescriptor::character("A", 5), FieldDescriptor::logical("B")];

        let iii = DbfWriter::new(DbfVersion::DbaseIIIPlus, fields.clone()).header();
        assert_eq!(iii.header_length, 32 + 64 + 1);
        assert_eq!(iii.record_length, 7);

        let vii = DbfWriter::new(DbfVersion::DbaseVII, fields.clone()).header();
        assert_eq!(vii.header_length, 68 + 96 + 1 + 16);

        let hi_per_six = DbfWriter::new(DbfVersion::HiPerSixMemo, fields).header();
        assert_eq!(hi_per_six.header_length, 68 + 96 + 1);
    }

    #[test]
    fn test_file_layout() {
        let mut writer = DbfWriter::new(DbfVersion::DbaseII, vec![FieldDescriptor::character("C", 3)]);
        writer.add_record(vec![DbfValue::Text("abcdef".into())]);
        let bytes = writer.write().unwrap();

        assert_eq!(bytes.len(), 8 + 16 + 1 + 4 + 1);
        assert_eq!(bytes[0], 0x02);
        assert_eq!(bytes[24], 0x0D);
        assert_eq!(&bytes[25..29], b" abc");
        assert_eq!(bytes[29], 0x1A);
    }

    #[test]
    fn test_timestamp_is_refused() {
        let mut writer = DbfWriter::new(
            DbfVersion::DbaseIIIPlus,
            vec![FieldDescriptor::new("TS", FieldType::Timestamp, 8, 0)],
        );
        writer.add_record(vec![DbfValue::Null]);
        assert!(matches!(writer.write(), Err(GeoError::NotImplemented(_))));
    }
}
