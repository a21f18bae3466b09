//! DBF header parsing and encoding, one routine pair per strategy.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{GeoError, Result};
use crate::io::binary_reader::{BinaryCursorReader, Endianness};
use crate::notification::NotificationCollection;

use super::field::{FieldDescriptor, FieldType};
use super::properties::FieldProperties;
use super::version::{DbfVersion, HeaderStrategy};

/// Marks the end of the descriptor array.
pub const HEADER_TERMINATOR: u8 = 0x0D;
/// Years are stored as an offset from this value.
pub const YEAR_OFFSET: u16 = 1900;
/// Upper bound of the dBASE II descriptor array.
pub const DBASE_II_MAX_FIELDS: usize = 32;
pub const DBASE_II_HEADER_SIZE: usize = 8;
pub const DBASE_II_DESCRIPTOR_SIZE: usize = 16;
pub const DBASE_III_HEADER_SIZE: usize = 32;
pub const DBASE_III_DESCRIPTOR_SIZE: usize = 32;
pub const DBASE_VII_HEADER_SIZE: usize = 68;
pub const DBASE_VII_DESCRIPTOR_SIZE: usize = 48;

/// Date of last update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DbfDate {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

impl DbfDate {
    pub fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    fn parse(reader: &mut BinaryCursorReader) -> Result<Self> {
        let year = YEAR_OFFSET + reader.read_u8()? as u16;
        let month = reader.read_u8()?;
        let day = reader.read_u8()?;
        Ok(Self { year, month, day })
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.push(self.year.saturating_sub(YEAR_OFFSET).min(u8::MAX as u16) as u8);
        out.push(self.month);
        out.push(self.day);
    }
}

impl std::fmt::Display for DbfDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

/// Flags stored by the 32-byte and 68-byte layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderFlags {
    pub incomplete_transaction: u8,
    pub encryption: u8,
    pub mdx: u8,
    pub language_driver_id: u8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DbfHeader {
    pub version: DbfVersion,
    pub strategy: HeaderStrategy,
    pub last_update: DbfDate,
    pub record_count: u32,
    /// Offset of the first record. dBASE II does not store it; the parser
    /// fills in the position after the terminator.
    pub header_length: u16,
    /// Bytes per record including the deleted flag.
    pub record_length: u16,
    /// `None` for the layouts that do not store flags.
    pub flags: Option<HeaderFlags>,
    pub language_driver_name: Option<String>,
    pub fields: Vec<FieldDescriptor>,
    pub field_properties: Option<FieldProperties>,
}

impl DbfHeader {
    /// Parse the header at the start of the cursor.
    ///
    /// The cursor ends positioned after the terminator (and the
    /// field-properties block for dBASE 7), not yet at `header_length`.
    pub fn parse(
        reader: &mut BinaryCursorReader,
        strategy_override: Option<HeaderStrategy>,
        notifications: &mut NotificationCollection,
    ) -> Result<Self> {
        reader.set_endianness(Endianness::Big);
        let version_byte = reader.read_u8()?;
        let version =
            DbfVersion::from_byte(version_byte).ok_or(GeoError::UnsupportedVersion(version_byte))?;
        let strategy = strategy_override.unwrap_or_else(|| version.strategy());

        reader.set_endianness(Endianness::Little);
        let parsed = match strategy {
            HeaderStrategy::DbaseII => parse_dbase_ii(reader, version),
            HeaderStrategy::DbaseIIIPlusShort => parse_dbase_iii_plus_short(reader, version),
            HeaderStrategy::DbaseIII => parse_dbase_iii(reader, version),
            HeaderStrategy::DbaseVII => parse_dbase_vii(reader, version),
        };
        reader.set_endianness(Endianness::Big);
        let mut header = parsed?;

        match reader.read_u8()? {
            HEADER_TERMINATOR => {}
            other => notifications.error(format!(
                "Expected header terminator 0x0D at offset {}, found {:#04X}",
                reader.position() - 1,
                other
            )),
        }

        if version.is_dbase_vii() {
            header.field_properties = Some(FieldProperties::parse(reader)?);
        }

        if strategy == HeaderStrategy::DbaseII {
            header.header_length = u16::try_from(reader.position()).unwrap_or(u16::MAX);
        }

        Ok(header)
    }

    /// Encode the header, descriptors and terminator, followed by the
    /// field-properties block for dBASE 7 (empty when not set). `header_length` and `record_length` are
    /// written as stored.
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.push(self.version.byte());
        let flags = self.flags.unwrap_or_default();

        match self.strategy {
            HeaderStrategy::DbaseII => {
                out.write_u16::<LittleEndian>(self.record_count.min(u16::MAX as u32) as u16)?;
                self.last_update.write(out);
                out.write_u16::<LittleEndian>(self.record_length)?;
            }
            HeaderStrategy::DbaseIIIPlusShort => {
                self.last_update.write(out);
                out.write_u32::<LittleEndian>(self.record_count)?;
                out.write_u16::<LittleEndian>(self.header_length)?;
                out.write_u16::<LittleEndian>(self.record_length)?;
                out.extend_from_slice(&[0; 20]);
            }
            HeaderStrategy::DbaseIII | HeaderStrategy::DbaseVII => {
                self.last_update.write(out);
                out.write_u32::<LittleEndian>(self.record_count)?;
                out.write_u16::<LittleEndian>(self.header_length)?;
                out.write_u16::<LittleEndian>(self.record_length)?;
                out.extend_from_slice(&[0; 2]);
                out.push(flags.incomplete_transaction);
                out.push(flags.encryption);
                out.extend_from_slice(&[0; 12]);
                out.push(flags.mdx);
                out.push(flags.language_driver_id);
                out.extend_from_slice(&[0; 2]);
                if self.strategy == HeaderStrategy::DbaseVII {
                    let name = self.language_driver_name.as_deref().unwrap_or("");
                    write_padded(out, name.as_bytes(), 32);
                    out.extend_from_slice(&[0; 4]);
                }
            }
        }

        write_field_descriptors(self.strategy, &self.fields, out)?;
        out.push(HEADER_TERMINATOR);

        if self.version.is_dbase_vii() {
            match &self.field_properties {
                Some(props) => props.write(out)?,
                None => FieldProperties::default().write(out)?,
            }
        }
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Byte size of the fixed header part of a layout, before the descriptors.
pub fn fixed_header_size(strategy: HeaderStrategy) -> usize {
    match strategy {
        HeaderStrategy::DbaseII => DBASE_II_HEADER_SIZE,
        HeaderStrategy::DbaseIIIPlusShort | HeaderStrategy::DbaseIII => DBASE_III_HEADER_SIZE,
        HeaderStrategy::DbaseVII => DBASE_VII_HEADER_SIZE,
    }
}

pub fn descriptor_size(strategy: HeaderStrategy) -> usize {
    match strategy {
        HeaderStrategy::DbaseII => DBASE_II_DESCRIPTOR_SIZE,
        HeaderStrategy::DbaseIIIPlusShort | HeaderStrategy::DbaseIII => DBASE_III_DESCRIPTOR_SIZE,
        HeaderStrategy::DbaseVII => DBASE_VII_DESCRIPTOR_SIZE,
    }
}

/// Encode the descriptor array in the layout of `strategy`, without the
/// terminator.
pub fn write_field_descriptors(
    strategy: HeaderStrategy,
    fields: &[FieldDescriptor],
    out: &mut Vec<u8>,
) -> Result<()> {
    for field in fields {
        let name_width = if strategy == HeaderStrategy::DbaseVII { 32 } else { 11 };
        write_padded(out, field.name.as_bytes(), name_width);
        out.push(field.field_type.code() as u8);

        match strategy {
            HeaderStrategy::DbaseII => {
                out.push(field.length);
                out.write_u16::<LittleEndian>(field.memory_address.unwrap_or(0) as u16)?;
                out.push(field.decimal_count);
            }
            HeaderStrategy::DbaseIIIPlusShort => {
                out.write_u32::<LittleEndian>(field.memory_address.unwrap_or(0))?;
                out.push(field.length);
                out.push(field.decimal_count);
                out.extend_from_slice(&[0; 2]);
                out.push(field.work_area_id.unwrap_or(0));
                out.extend_from_slice(&[0; 2]);
                out.push(field.mdx_flag.unwrap_or(0));
                out.extend_from_slice(&[0; 8]);
            }
            HeaderStrategy::DbaseIII => {
                out.extend_from_slice(&[0; 4]);
                out.push(field.length);
                out.push(field.decimal_count);
                out.extend_from_slice(&[0; 2]);
                out.push(field.work_area_id.unwrap_or(0));
                out.extend_from_slice(&[0; 10]);
                out.push(field.mdx_flag.unwrap_or(0));
            }
            HeaderStrategy::DbaseVII => {
                out.push(field.length);
                out.push(field.decimal_count);
                out.extend_from_slice(&[0; 2]);
                out.push(field.mdx_flag.unwrap_or(0));
                out.extend_from_slice(&[0; 2]);
                out.write_u32::<LittleEndian>(field.next_autoincrement.unwrap_or(0))?;
                out.extend_from_slice(&[0; 4]);
            }
        }
    }
    Ok(())
}

fn write_padded(out: &mut Vec<u8>, bytes: &[u8], width: usize) {
    // Keep one NUL so the name stays terminated.
    let len = bytes.len().min(width.saturating_sub(1));
    out.extend_from_slice(&bytes[..len]);
    out.resize(out.len() + width - len, 0);
}

fn read_field_type(reader: &mut BinaryCursorReader, name: &str) -> Result<FieldType> {
    let code = reader.read_char()?;
    FieldType::from_code(code).ok_or_else(|| GeoError::InvalidFieldType {
        field: name.to_string(),
        code,
    })
}

fn header_base(version: DbfVersion, strategy: HeaderStrategy) -> DbfHeader {
    DbfHeader {
        version,
        strategy,
        last_update: DbfDate::default(),
        record_count: 0,
        header_length: 0,
        record_length: 0,
        flags: None,
        language_driver_name: None,
        fields: Vec::new(),
        field_properties: None,
    }
}

fn parse_dbase_ii(reader: &mut BinaryCursorReader, version: DbfVersion) -> Result<DbfHeader> {
    let mut header = header_base(version, HeaderStrategy::DbaseII);
    header.record_count = reader.read_u16()? as u32;
    header.last_update = DbfDate::parse(reader)?;
    header.record_length = reader.read_u16()?;

    while header.fields.len() < DBASE_II_MAX_FIELDS {
        if reader.peek_u8() == Some(HEADER_TERMINATOR) {
            break;
        }
        let name = reader.read_string(11)?;
        let field_type = read_field_type(reader, &name)?;
        let length = reader.read_u8()?;
        let memory_address = reader.read_u16()? as u32;
        let decimal_count = reader.read_u8()?;
        header.fields.push(FieldDescriptor {
            memory_address: Some(memory_address),
            ..FieldDescriptor::new(name, field_type, length, decimal_count)
        });
    }
    Ok(header)
}

fn parse_dbase_iii_plus_short(
    reader: &mut BinaryCursorReader,
    version: DbfVersion,
) -> Result<DbfHeader> {
    let mut header = header_base(version, HeaderStrategy::DbaseIIIPlusShort);
    header.last_update = DbfDate::parse(reader)?;
    header.record_count = reader.read_u32()?;
    header.header_length = reader.read_u16()?;
    header.record_length = reader.read_u16()?;
    reader.skip(20)?;

    let count = (header.header_length as usize).saturating_sub(DBASE_III_HEADER_SIZE + 1)
        / DBASE_III_DESCRIPTOR_SIZE;
    for _ in 0..count {
        let name = reader.read_string(11)?;
        let field_type = read_field_type(reader, &name)?;
        let memory_address = reader.read_u32()?;
        let length = reader.read_u8()?;
        let decimal_count = reader.read_u8()?;
        reader.skip(2)?;
        let work_area_id = reader.read_u8()?;
        reader.skip(2)?;
        let mdx_flag = reader.read_u8()?;
        reader.skip(8)?;
        header.fields.push(FieldDescriptor {
            memory_address: Some(memory_address),
            work_area_id: Some(work_area_id),
            mdx_flag: Some(mdx_flag),
            ..FieldDescriptor::new(name, field_type, length, decimal_count)
        });
    }
    Ok(header)
}

/// Shared by the 32-byte and 68-byte layouts.
fn parse_common_prefix(reader: &mut BinaryCursorReader, header: &mut DbfHeader) -> Result<()> {
    header.last_update = DbfDate::parse(reader)?;
    header.record_count = reader.read_u32()?;
    header.header_length = reader.read_u16()?;
    header.record_length = reader.read_u16()?;
    reader.skip(2)?;
    let incomplete_transaction = reader.read_u8()?;
    let encryption = reader.read_u8()?;
    reader.skip(12)?;
    let mdx = reader.read_u8()?;
    let language_driver_id = reader.read_u8()?;
    reader.skip(2)?;
    header.flags = Some(HeaderFlags {
        incomplete_transaction,
        encryption,
        mdx,
        language_driver_id,
    });
    Ok(())
}

fn parse_dbase_iii(reader: &mut BinaryCursorReader, version: DbfVersion) -> Result<DbfHeader> {
    let mut header = header_base(version, HeaderStrategy::DbaseIII);
    parse_common_prefix(reader, &mut header)?;

    let descriptors_end = (header.header_length as usize).saturating_sub(1);
    while reader.position() < descriptors_end {
        let name = reader.read_string(11)?;
        let field_type = read_field_type(reader, &name)?;
        reader.skip(4)?;
        let length = reader.read_u8()?;
        let decimal_count = reader.read_u8()?;
        reader.skip(2)?;
        let work_area_id = reader.read_u8()?;
        reader.skip(10)?;
        let mdx_flag = reader.read_u8()?;
        header.fields.push(FieldDescriptor {
            work_area_id: Some(work_area_id),
            mdx_flag: Some(mdx_flag),
            ..FieldDescriptor::new(name, field_type, length, decimal_count)
        });
    }
    Ok(header)
}

fn parse_dbase_vii(reader: &mut BinaryCursorReader, version: DbfVersion) -> Result<DbfHeader> {
    let mut header = header_base(version, HeaderStrategy::DbaseVII);
    parse_common_prefix(reader, &mut header)?;
    header.language_driver_name = Some(reader.read_string(32)?);
    reader.skip(4)?;

    let count = (header.header_length as usize).saturating_sub(DBASE_VII_HEADER_SIZE)
        / DBASE_VII_DESCRIPTOR_SIZE;
    for _ in 0..count {
        if reader.peek_u8() == Some(HEADER_TERMINATOR) {
            break;
        }
        let name = reader.read_string(32)?;
        let field_type = read_field_type(reader, &name)?;
        let length = reader.read_u8()?;
        let decimal_count = reader.read_u8()?;
        reader.skip(2)?;
        let mdx_flag = reader.read_u8()?;
        reader.skip(2)?;
        let next_autoincrement = reader.read_u32()?;
        reader.skip(4)?;
        header.fields.push(FieldDescriptor {
            mdx_flag: Some(mdx_flag),
            next_autoincrement: Some(next_autoincrement),
            ..FieldDescriptor::new(name, field_type, length, decimal_count)
        });
    }
    Ok(header)
}
