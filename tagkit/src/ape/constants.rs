// Keys that would be mistaken for other tags
pub(super) const INVALID_KEYS: [&str; 4] = ["ID3", "TAG", "OGGS", "MP+"];

// https://wiki.hydrogenaud.io/index.php?title=APE_Tags_Header
pub(crate) const APE_PREAMBLE: &[u8; 8] = b"APETAGEX";

pub(crate) const APE_HEADER_SIZE: usize = 32;

// Item types, stored in bits 1-2 of the item flags
pub(super) const ITEM_TYPE_TEXT: u32 = 0;
