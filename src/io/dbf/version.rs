//! dBase version byte and header strategy table

use std::fmt;

/// Known values of the leading version byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DbfVersion {
    DbaseII = 0x02,
    DbaseIIIPlus = 0x03,
    DbaseVII = 0x04,
    FoxPro = 0x30,
    FoxProAutoincrement = 0x31,
    FoxProVar = 0x32,
    DbaseIVSqlTable = 0x43,
    DbaseIVSqlSystem = 0x63,
    DbaseIIIPlusMemo = 0x83,
    DbaseIVMemo = 0x8B,
    DbaseIVMemoSqlTable = 0xCB,
    HiPerSixMemo = 0xE5,
    FoxPro2x = 0xF5,
    FoxBase = 0xFB,
}

/// Header layout family.
///
/// Each strategy reads its own set of header fields and descriptor layout,
/// and bounds the descriptor array differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderStrategy {
    /// 8-byte header, 16-byte descriptors, at most 32 of them.
    DbaseII,
    /// Compact dBASE III+ layout: 20 reserved bytes, descriptor count taken
    /// from the header length. Only selected through an explicit override.
    DbaseIIIPlusShort,
    /// 32-byte header, 32-byte descriptors read up to `header_length - 1`.
    DbaseIII,
    /// 68-byte header with language driver name, 48-byte descriptors.
    DbaseVII,
}

impl DbfVersion {
    pub const ALL: [DbfVersion; 14] = [
        DbfVersion::DbaseII,
        DbfVersion::DbaseIIIPlus,
        DbfVersion::DbaseVII,
        DbfVersion::FoxPro,
        DbfVersion::FoxProAutoincrement,
        DbfVersion::FoxProVar,
        DbfVersion::DbaseIVSqlTable,
        DbfVersion::DbaseIVSqlSystem,
        DbfVersion::DbaseIIIPlusMemo,
        DbfVersion::DbaseIVMemo,
        DbfVersion::DbaseIVMemoSqlTable,
        DbfVersion::HiPerSixMemo,
        DbfVersion::FoxPro2x,
        DbfVersion::FoxBase,
    ];

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| *v as u8 == byte)
    }

    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Static version → strategy table.
    pub fn strategy(self) -> HeaderStrategy {
        match self {
            DbfVersion::DbaseII
            | DbfVersion::FoxPro
            | DbfVersion::FoxProAutoincrement
            | DbfVersion::FoxProVar => HeaderStrategy::DbaseII,

            DbfVersion::DbaseIIIPlus
            | DbfVersion::DbaseIIIPlusMemo
            | DbfVersion::DbaseIVSqlTable
            | DbfVersion::DbaseIVSqlSystem
            | DbfVersion::DbaseIVMemo
            | DbfVersion::DbaseIVMemoSqlTable
            | DbfVersion::FoxBase => HeaderStrategy::DbaseIII,

            DbfVersion::DbaseVII | DbfVersion::FoxPro2x | DbfVersion::HiPerSixMemo => {
                HeaderStrategy::DbaseVII
            }
        }
    }

    /// Only true dBASE 7 files carry the field-properties block and the
    /// big-endian sign-flipped binary number encoding.
    pub fn is_dbase_vii(self) -> bool {
        self == DbfVersion::DbaseVII
    }
}

impl fmt::Display for DbfVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({:#04X})", self, self.byte())
    }
}
