use super::constants::{Guid, OBJECT_HEADER_SIZE};
use crate::config::ParsingMode;
use crate::error::Result;
use crate::macros::{decode_err, err, parse_mode_choice};

use std::ops::Range;

use byteorder::{ByteOrder, LittleEndian};

/// The position of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct ObjectInfo {
	pub(super) guid: Guid,
	pub(super) start: u64,
	pub(super) size: u64,
}

impl ObjectInfo {
	/// Reads the object header at the start of `data`, which holds `start` onwards
	pub(super) fn parse(data: &[u8], start: u64) -> Result<Self> {
		if (data.len() as u64) < OBJECT_HEADER_SIZE {
			decode_err!(@BAIL Asf, "Object header is too short");
		}

		let mut guid = [0; 16];
		guid.copy_from_slice(&data[..16]);
		let size = LittleEndian::read_u64(&data[16..24]);

		if size < OBJECT_HEADER_SIZE {
			decode_err!(@BAIL Asf, "Found an object with an invalid size (< 24)");
		}

		Ok(Self {
			guid: Guid(guid),
			start,
			size,
		})
	}

	pub(super) fn end(&self) -> u64 {
		self.start + self.size
	}

	pub(super) fn range(&self) -> Range<usize> {
		self.start as usize..self.end() as usize
	}

	pub(super) fn content_range(&self) -> Range<usize> {
		(self.start + OBJECT_HEADER_SIZE) as usize..self.end() as usize
	}
}

/// Reads every object in `data`, offsetting their positions by `base`
pub(super) fn read_objects(
	data: &[u8],
	base: u64,
	parse_mode: ParsingMode,
) -> Result<Vec<ObjectInfo>> {
	let mut objects = Vec::new();
	let mut position = 0_usize;

	while position < data.len() {
		let remaining = &data[position..];
		if (remaining.len() as u64) < OBJECT_HEADER_SIZE {
			parse_mode_choice!(
				parse_mode,
				STRICT: decode_err!(@BAIL Asf, "Header Object has trailing bytes"),
				DEFAULT: {
					log::warn!("ASF: Ignoring {} trailing bytes in the Header Object", remaining.len());
					break;
				}
			);
		}

		let mut object = ObjectInfo::parse(remaining, 0)?;
		if object.size > remaining.len() as u64 {
			parse_mode_choice!(
				parse_mode,
				STRICT: err!(SizeMismatch),
				DEFAULT: {
					log::warn!("ASF: Encountered an object with an invalid size, stopping");
					break;
				}
			);
		}

		position += object.size as usize;

		object.start = base + (position as u64 - object.size);
		objects.push(object);
	}

	Ok(objects)
}

/// Encodes a full object
pub(super) fn encode_object(guid: Guid, content: &[u8]) -> Vec<u8> {
	let mut object = Vec::with_capacity(content.len() + OBJECT_HEADER_SIZE as usize);
	object.extend(guid.0);
	object.extend((content.len() as u64 + OBJECT_HEADER_SIZE).to_le_bytes());
	object.extend_from_slice(content);
	object
}
