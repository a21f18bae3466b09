//! Field descriptors

use std::fmt;

/// Field type code, as stored in the descriptor type byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Binary,
    Character,
    Date,
    Numeric,
    Logical,
    Memo,
    Timestamp,
    Long,
    Autoincrement,
    Float,
    Double,
    Ole,
}

impl FieldType {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'B' => Some(FieldType::Binary),
            'C' => Some(FieldType::Character),
            'D' => Some(FieldType::Date),
            'N' => Some(FieldType::Numeric),
            'L' => Some(FieldType::Logical),
            'M' => Some(FieldType::Memo),
            '@' => Some(FieldType::Timestamp),
            'I' => Some(FieldType::Long),
            '+' => Some(FieldType::Autoincrement),
            'F' => Some(FieldType::Float),
            'O' => Some(FieldType::Double),
            'G' => Some(FieldType::Ole),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            FieldType::Binary => 'B',
            FieldType::Character => 'C',
            FieldType::Date => 'D',
            FieldType::Numeric => 'N',
            FieldType::Logical => 'L',
            FieldType::Memo => 'M',
            FieldType::Timestamp => '@',
            FieldType::Long => 'I',
            FieldType::Autoincrement => '+',
            FieldType::Float => 'F',
            FieldType::Double => 'O',
            FieldType::Ole => 'G',
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One column of the table.
///
/// The optional members only exist in some header layouts and are `None`
/// when the layout does not store them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub field_type: FieldType,
    /// Width of the field in the record, in bytes.
    pub length: u8,
    pub decimal_count: u8,
    pub memory_address: Option<u32>,
    pub work_area_id: Option<u8>,
    pub mdx_flag: Option<u8>,
    pub next_autoincrement: Option<u32>,
}

impl FieldDescriptor {
    /// Descriptor with only the members every layout stores.
    pub fn new(name: impl Into<String>, field_type: FieldType, length: u8, decimal_count: u8) -> Self {
        Self {
            name: name.into(),
            field_type,
            length,
            decimal_count,
            memory_address: None,
            work_area_id: None,
            mdx_flag: None,
            next_autoincrement: None,
        }
    }

    pub fn character(name: impl Into<String>, length: u8) -> Self {
        Self::new(name, FieldType::Character, length, 0)
    }

    pub fn numeric(name: impl Into<String>, length: u8, decimal_count: u8) -> Self {
        Self::new(name, FieldType::Numeric, length, decimal_count)
    }

    pub fn logical(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Logical, 1, 0)
    }
}
