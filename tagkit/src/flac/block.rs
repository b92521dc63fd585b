use crate::error::Result;
use crate::macros::{err, try_vec};

use std::io::{Read, Seek, SeekFrom};

use byteorder::{BigEndian, ReadBytesExt};

pub(crate) const BLOCK_ID_STREAMINFO: u8 = 0;
pub(crate) const BLOCK_ID_PADDING: u8 = 1;
pub(crate) const BLOCK_ID_VORBIS_COMMENTS: u8 = 4;

pub(crate) const BLOCK_HEADER_SIZE: u64 = 4;

// Block sizes are stored in 24 bits
pub(crate) const MAX_BLOCK_SIZE: u32 = (1 << 24) - 1;

pub(crate) struct Block {
	pub(crate) ty: u8,
	pub(crate) last: bool,
	pub(crate) content: Vec<u8>,
	/// The offset of the block header
	pub(crate) start: u64,
	pub(crate) end: u64,
}

impl Block {
	/// Reads a block, only keeping the content of the block types accepted by `predicate`
	pub(crate) fn read<R, P>(data: &mut R, mut predicate: P) -> Result<Self>
	where
		R: Read + Seek,
		P: FnMut(u8) -> bool,
	{
		let start = data.stream_position()?;

		let byte = data.read_u8()?;
		let last = (byte & 0x80) != 0;
		let ty = byte & 0x7F;

		let size = data.read_u24::<BigEndian>()?;
		log::trace!("Reading FLAC block, type: {ty}, size: {size}");

		let mut content;
		if predicate(ty) {
			content = try_vec![0; size as usize];
			data.read_exact(&mut content)?;
		} else {
			content = Vec::new();
			data.seek(SeekFrom::Current(i64::from(size)))?;
		}

		let end = data.stream_position()?;

		Ok(Self {
			ty,
			last,
			content,
			start,
			end,
		})
	}

	pub(crate) fn size(&self) -> u64 {
		self.end - self.start
	}
}

/// Encodes a block, including its header
pub(crate) fn encode_block(ty: u8, last: bool, content: &[u8]) -> Result<Vec<u8>> {
	let Some(size) = u32::try_from(content.len())
		.ok()
		.filter(|size| *size <= MAX_BLOCK_SIZE)
	else {
		err!(TooMuchData);
	};

	let mut block = Vec::with_capacity(content.len() + BLOCK_HEADER_SIZE as usize);
	block.push(if last { ty | 0x80 } else { ty });
	block.extend(&size.to_be_bytes()[1..]);
	block.extend(content);

	Ok(block)
}
