use super::constants::{APE_HEADER_SIZE, APE_PREAMBLE};
use crate::error::Result;
use crate::macros::decode_err;

use byteorder::{ByteOrder, LittleEndian};

// Bit 31 set: tag contains a header
const FLAG_HAS_HEADER: u32 = 1 << 31;
// Bit 30 set: tag contains a footer
const FLAG_HAS_FOOTER: u32 = 1 << 30;
// Bit 29 set: this is the header
const FLAG_IS_HEADER: u32 = 1 << 29;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct ApeFooter {
	pub(crate) version: u32,
	/// The size of the items and footer, **excluding the header**
	pub(crate) size: u32,
	pub(crate) item_count: u32,
	pub(crate) flags: u32,
}

impl ApeFooter {
	/// Parses a tag footer, returning `None` if there is no preamble
	pub(crate) fn parse(footer: &[u8; APE_HEADER_SIZE]) -> Result<Option<Self>> {
		if &footer[..8] != APE_PREAMBLE {
			return Ok(None);
		}

		let size = LittleEndian::read_u32(&footer[12..16]);
		if (size as usize) < APE_HEADER_SIZE {
			// If the size is < 32, something went wrong during encoding
			// The size includes the footer and all items
			decode_err!(@BAIL "APE tag has an invalid size (< 32)");
		}

		Ok(Some(Self {
			version: LittleEndian::read_u32(&footer[8..12]),
			size,
			item_count: LittleEndian::read_u32(&footer[16..20]),
			flags: LittleEndian::read_u32(&footer[20..24]),
		}))
	}

	/// Whether a header precedes the items (APEv2 only)
	pub(crate) fn has_header(&self) -> bool {
		self.version == 2000 && self.flags & FLAG_HAS_HEADER == FLAG_HAS_HEADER
	}

	/// The size of the entire tag, header included
	pub(crate) fn full_size(&self) -> u64 {
		let header = if self.has_header() {
			APE_HEADER_SIZE as u64
		} else {
			0
		};

		u64::from(self.size) + header
	}
}

/// Encodes the header and footer of an APEv2 tag
pub(crate) fn encode_header_footer(
	items_size: u32,
	item_count: u32,
) -> ([u8; APE_HEADER_SIZE], [u8; APE_HEADER_SIZE]) {
	let mut footer = [0; APE_HEADER_SIZE];
	footer[..8].copy_from_slice(APE_PREAMBLE);
	// This is the APE tag version
	LittleEndian::write_u32(&mut footer[8..12], 2000);
	// The total size includes the 32 bytes of the footer
	LittleEndian::write_u32(&mut footer[12..16], items_size + APE_HEADER_SIZE as u32);
	LittleEndian::write_u32(&mut footer[16..20], item_count);
	LittleEndian::write_u32(&mut footer[20..24], FLAG_HAS_HEADER | FLAG_HAS_FOOTER);
	// The header/footer must end in 8 bytes of zeros

	// The header is exactly the same as the footer, except for the flags
	let mut header = footer;
	LittleEndian::write_u32(
		&mut header[20..24],
		FLAG_HAS_HEADER | FLAG_HAS_FOOTER | FLAG_IS_HEADER,
	);

	(header, footer)
}
