//! dBase language driver id to encoding mapping.
//!
//! The header stores a one-byte language driver id naming the code page of
//! the character data. Ids without an `encoding_rs` counterpart map to the
//! closest available encoding.

use encoding_rs::Encoding;

/// Get the `encoding_rs` encoding for a language driver id.
///
/// Returns `None` when the id is 0 (not set) or not recognized; callers then
/// fall back to their default encoding.
pub fn encoding_from_language_driver(id: u8) -> Option<&'static Encoding> {
    match id {
        // DOS code pages
        0x01 | 0x02 | 0x09 | 0x0A | 0x0B | 0x0D | 0x0E | 0x0F | 0x10 | 0x11 | 0x18 | 0x19
        | 0x1A | 0x1B | 0x1C | 0x1D | 0x25 | 0x37 | 0x40 | 0x67 | 0x6B => {
            Some(encoding_rs::WINDOWS_1252) // cp437/cp850/cp865 family
        }
        0x26 | 0x65 => Some(encoding_rs::IBM866),
        0x1F | 0x22 | 0x23 | 0x64 | 0x87 => Some(encoding_rs::WINDOWS_1250), // cp852
        0x6A | 0x86 => Some(encoding_rs::WINDOWS_1253), // cp737/cp869 Greek
        0x6C | 0x6D => Some(encoding_rs::WINDOWS_1252), // cp863/cp865

        // Asian encodings
        0x13 | 0x7B => Some(encoding_rs::SHIFT_JIS),
        0x4D | 0x7A => Some(encoding_rs::GBK),
        0x4E | 0x79 => Some(encoding_rs::EUC_KR),
        0x4F | 0x78 => Some(encoding_rs::BIG5),
        0x50 | 0x7C => Some(encoding_rs::WINDOWS_874),

        // Windows/ANSI code pages
        0x03 | 0x57 | 0x58 | 0x59 => Some(encoding_rs::WINDOWS_1252),
        0xC8 => Some(encoding_rs::WINDOWS_1250),
        0xC9 => Some(encoding_rs::WINDOWS_1251),
        0xCA => Some(encoding_rs::WINDOWS_1254),
        0xCB => Some(encoding_rs::WINDOWS_1253),
        0xCC => Some(encoding_rs::WINDOWS_1257),
        0x7D => Some(encoding_rs::WINDOWS_1255),
        0x7E => Some(encoding_rs::WINDOWS_1256),

        _ => None,
    }
}
