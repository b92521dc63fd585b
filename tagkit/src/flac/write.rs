use super::block::{
	BLOCK_HEADER_SIZE, BLOCK_ID_PADDING, BLOCK_ID_VORBIS_COMMENTS, Block, MAX_BLOCK_SIZE,
	encode_block,
};
use super::read::verify_flac;
use crate::config::WriteOptions;
use crate::error::Result;
use crate::file::{BlockKind, FormatLayout, WritePlan};
use crate::macros::encode_err;
use crate::ogg::comments::{DEFAULT_VENDOR, encode_comments};
use crate::tag::TagModel;

use std::io::{Cursor, Seek, SeekFrom};

/// Writes the `VORBIS_COMMENT` block of a FLAC file
///
/// Every other metadata block is kept as-is, any `PADDING` is merged into a single block at the
/// end of the metadata. When the new metadata fits in the old metadata region, the remainder
/// becomes padding and the audio stays where it is.
pub(crate) fn write_to(
	original: &[u8],
	layout: &FormatLayout,
	tag: &TagModel,
	write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let stream_start = layout.block(BlockKind::Id3v2).map_or(0, |block| block.end());

	let mut cursor = Cursor::new(original);
	cursor.seek(SeekFrom::Start(stream_start))?;

	let Ok(stream_info) = verify_flac(&mut cursor) else {
		encode_err!(@BAIL Flac, "The file no longer matches its layout (missing STREAMINFO)");
	};

	let blocks_start = stream_info.start;
	let mut is_last_block = stream_info.last;
	let mut has_comments = false;

	let mut kept_blocks = vec![(stream_info.ty, stream_info.content)];
	while !is_last_block {
		let block = Block::read(&mut cursor, |ty| {
			ty != BLOCK_ID_PADDING && ty != BLOCK_ID_VORBIS_COMMENTS
		})?;

		is_last_block = block.last;

		match block.ty {
			BLOCK_ID_PADDING => {},
			BLOCK_ID_VORBIS_COMMENTS => has_comments = true,
			ty => kept_blocks.push((ty, block.content)),
		}
	}

	let metadata_end = cursor.stream_position()?;
	if metadata_end != layout.audio_offset {
		encode_err!(@BAIL Flac, "The file no longer matches its layout (metadata size changed)");
	}

	let plan = WritePlan::new(layout.extensions(), tag);
	let has_new_comments = !plan.items.is_empty() || !plan.fields.is_empty();

	// Attempting to strip an already empty file
	if !has_comments && !has_new_comments {
		log::debug!("FLAC: Nothing to do");
		return Ok(original.to_vec());
	}

	if has_new_comments {
		let vendor = layout.vendor().unwrap_or(DEFAULT_VENDOR);
		kept_blocks.push((BLOCK_ID_VORBIS_COMMENTS, encode_comments(vendor, &plan, tag)?));
	}

	let metadata_size = kept_blocks
		.iter()
		.map(|(_, content)| BLOCK_HEADER_SIZE + content.len() as u64)
		.sum::<u64>();
	let available = metadata_end - blocks_start;

	let padding = match available.checked_sub(metadata_size) {
		Some(0) => None,
		Some(remaining) if remaining >= BLOCK_HEADER_SIZE && remaining - BLOCK_HEADER_SIZE <= u64::from(MAX_BLOCK_SIZE) => {
			log::debug!("FLAC: Writing in place, {} bytes of padding remain", remaining - BLOCK_HEADER_SIZE);
			Some((remaining - BLOCK_HEADER_SIZE) as u32)
		},
		_ => {
			log::debug!("FLAC: Metadata doesn't fit, relocating the audio");
			write_options
				.preferred_padding
				.map(|padding| padding.min(MAX_BLOCK_SIZE))
		},
	};

	let padding_content = padding.map(|size| vec![0; size as usize]);
	if let Some(padding_content) = padding_content {
		kept_blocks.push((BLOCK_ID_PADDING, padding_content));
	}

	let mut metadata = Vec::with_capacity(metadata_size as usize);
	let block_count = kept_blocks.len();
	for (idx, (ty, content)) in kept_blocks.into_iter().enumerate() {
		metadata.extend(encode_block(ty, idx + 1 == block_count, &content)?);
		log::trace!("Wrote a block (ty: {}, size: {})", ty, content.len());
	}

	let blocks_start = blocks_start as usize;
	let metadata_end = metadata_end as usize;

	let mut out = Vec::with_capacity(original.len() - (metadata_end - blocks_start) + metadata.len());
	out.extend_from_slice(&original[..blocks_start]);
	out.extend(metadata);
	out.extend_from_slice(&original[metadata_end..]);

	Ok(out)
}
