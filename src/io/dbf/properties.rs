//! dBASE 7 field-properties block.
//!
//! Follows the descriptor terminator in version 0x04 files. It starts with
//! eight little-endian `i16` values (counts and offsets of the three
//! descriptor arrays, start of the property data, size of the structure),
//! followed by the standard, custom and referential-integrity descriptors.

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::Result;
use crate::io::binary_reader::{BinaryCursorReader, Endianness};

pub const STANDARD_DESCRIPTOR_SIZE: usize = 15;
pub const CUSTOM_DESCRIPTOR_SIZE: usize = 14;
pub const REFERENTIAL_INTEGRITY_DESCRIPTOR_SIZE: usize = 22;
/// Size of the eight leading counts and offsets.
pub const PROPERTIES_PREAMBLE_SIZE: usize = 16;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldProperties {
    pub standard_count: i16,
    pub standard_start: i16,
    pub custom_count: i16,
    pub custom_start: i16,
    pub referential_integrity_count: i16,
    pub referential_integrity_start: i16,
    pub start_of_data: i16,
    pub structure_size: i16,
    pub standard: Vec<StandardProperty>,
    pub custom: Vec<CustomProperty>,
    pub referential_integrity: Vec<ReferentialIntegrityProperty>,
}

/// Standard property (required, min, max, default, ...) of one field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardProperty {
    pub generational_number: i16,
    pub table_field_offset: i16,
    pub property_described: u8,
    pub property_type: u8,
    pub is_constraint: u8,
    pub data_offset: i16,
    pub data_width: i16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomProperty {
    pub generational_number: i16,
    pub table_field_offset: i16,
    pub property_type: u8,
    pub name_offset: i16,
    pub name_length: i16,
    pub data_offset: i16,
    pub data_length: i16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferentialIntegrityProperty {
    pub database_state: u8,
    pub sequential_number: i16,
    pub rule_name_offset: i16,
    pub rule_name_size: i16,
    pub foreign_table_name_offset: i16,
    pub foreign_table_name_size: i16,
    pub update_delete_behaviour: u8,
    pub linking_key_field_count: i16,
    pub local_tag_name_offset: i16,
    pub local_tag_name_size: i16,
    pub foreign_tag_name_offset: i16,
    pub foreign_tag_name_size: i16,
}

impl FieldProperties {
    /// Parse the block at the cursor. Counts below zero read as empty arrays.
    pub fn parse(reader: &mut BinaryCursorReader) -> Result<Self> {
        let previous = reader.endianness();
        reader.set_endianness(Endianness::Little);
        let result = Self::parse_little_endian(reader);
        reader.set_endianness(previous);
        result
    }

    fn parse_little_endian(reader: &mut BinaryCursorReader) -> Result<Self> {
        let mut props = FieldProperties {
            standard_count: reader.read_i16()?,
            standard_start: reader.read_i16()?,
            custom_count: reader.read_i16()?,
            custom_start: reader.read_i16()?,
            referential_integrity_count: reader.read_i16()?,
            referential_integrity_start: reader.read_i16()?,
            start_of_data: reader.read_i16()?,
            structure_size: reader.read_i16()?,
            ..Default::default()
        };

        for _ in 0..props.standard_count.max(0) {
            let generational_number = reader.read_i16()?;
            let table_field_offset = reader.read_i16()?;
            let property_described = reader.read_u8()?;
            let property_type = reader.read_u8()?;
            let is_constraint = reader.read_u8()?;
            reader.skip(4)?;
            props.standard.push(StandardProperty {
                generational_number,
                table_field_offset,
                property_described,
                property_type,
                is_constraint,
                data_offset: reader.read_i16()?,
                data_width: reader.read_i16()?,
            });
        }

        for _ in 0..props.custom_count.max(0) {
            let generational_number = reader.read_i16()?;
            let table_field_offset = reader.read_i16()?;
            let property_type = reader.read_u8()?;
            reader.skip(1)?;
            props.custom.push(CustomProperty {
                generational_number,
                table_field_offset,
                property_type,
                name_offset: reader.read_i16()?,
                name_length: reader.read_i16()?,
                data_offset: reader.read_i16()?,
                data_length: reader.read_i16()?,
            });
        }

        for _ in 0..props.referential_integrity_count.max(0) {
            props.referential_integrity.push(ReferentialIntegrityProperty {
                database_state: reader.read_u8()?,
                sequential_number: reader.read_i16()?,
                rule_name_offset: reader.read_i16()?,
                rule_name_size: reader.read_i16()?,
                foreign_table_name_offset: reader.read_i16()?,
                foreign_table_name_size: reader.read_i16()?,
                update_delete_behaviour: reader.read_u8()?,
                linking_key_field_count: reader.read_i16()?,
                local_tag_name_offset: reader.read_i16()?,
                local_tag_name_size: reader.read_i16()?,
                foreign_tag_name_offset: reader.read_i16()?,
                foreign_tag_name_size: reader.read_i16()?,
            });
        }

        Ok(props)
    }

    /// Encoded size of the block as written by [`FieldProperties::write`].
    pub fn encoded_len(&self) -> usize {
        PROPERTIES_PREAMBLE_SIZE
            + self.standard.len() * STANDARD_DESCRIPTOR_SIZE
            + self.custom.len() * CUSTOM_DESCRIPTOR_SIZE
            + self.referential_integrity.len() * REFERENTIAL_INTEGRITY_DESCRIPTOR_SIZE
    }

    /// Write the block. The counts are taken from the descriptor vectors.
    pub fn write(&self, out: &mut Vec<u8>) -> Result<()> {
        out.write_i16::<LittleEndian>(self.standard.len() as i16)?;
        out.write_i16::<LittleEndian>(self.standard_start)?;
        out.write_i16::<LittleEndian>(self.custom.len() as i16)?;
        out.write_i16::<LittleEndian>(self.custom_start)?;
        out.write_i16::<LittleEndian>(self.referential_integrity.len() as i16)?;
        out.write_i16::<LittleEndian>(self.referential_integrity_start)?;
        out.write_i16::<LittleEndian>(self.start_of_data)?;
        out.write_i16::<LittleEndian>(self.structure_size)?;

        for p in &self.standard {
            out.write_i16::<LittleEndian>(p.generational_number)?;
            out.write_i16::<LittleEndian>(p.table_field_offset)?;
            out.push(p.property_described);
            out.push(p.property_type);
            out.push(p.is_constraint);
            out.extend_from_slice(&[0; 4]);
            out.write_i16::<LittleEndian>(p.data_offset)?;
            out.write_i16::<LittleEndian>(p.data_width)?;
        }

        for p in &self.custom {
            out.write_i16::<LittleEndian>(p.generational_number)?;
            out.write_i16::<LittleEndian>(p.table_field_offset)?;
            out.push(p.property_type);
            out.push(0);
            out.write_i16::<LittleEndian>(p.name_offset)?;
            out.write_i16::<LittleEndian>(p.name_length)?;
            out.write_i16::<LittleEndian>(p.data_offset)?;
            out.write_i16::<LittleEndian>(p.data_length)?;
        }

        for p in &self.referential_integrity {
            out.push(p.database_state);
            out.write_i16::<LittleEndian>(p.sequential_number)?;
            out.write_i16::<LittleEndian>(p.rule_name_offset)?;
            out.write_i16::<LittleEndian>(p.rule_name_size)?;
            out.write_i16::<LittleEndian>(p.foreign_table_name_offset)?;
            out.write_i16::<LittleEndian>(p.foreign_table_name_size)?;
            out.push(p.update_delete_behaviour);
            out.write_i16::<LittleEndian>(p.linking_key_field_count)?;
            out.write_i16::<LittleEndian>(p.local_tag_name_offset)?;
            out.write_i16::<LittleEndian>(p.local_tag_name_size)?;
            out.write_i16::<LittleEndian>(p.foreign_tag_name_offset)?;
            out.write_i16::<LittleEndian>(p.foreign_tag_name_size)?;
        }

        Ok(())
    }
}
