//! ID3 specific items
//!
//! ID3v2 is the primary tag of MPEG and TrueAudio files, with ID3v1 as a fallback. Both are shared
//! by the containers through [`read_id3_tags`] and [`write_to`].

pub(crate) mod v1;
pub(crate) mod v2;

use crate::config::{ParseOptions, ParsingMode, WriteOptions};
use crate::error::Result;
use crate::file::{BlockKind, FormatLayout, WritePlan};
use crate::macros::{encode_err, parse_mode_choice};
use crate::tag::TagModel;
use crate::util::io::{ReadExt, SeekStreamLen};
use v1::constants::{ID3V1_TAG_MARKER, ID3V1_TAG_SIZE};
use v2::header::{HEADER_SIZE, Id3v2Header, Id3v2Version};

use std::io::{Read, Seek, SeekFrom};

/// The region of a stream left after locating its ID3 tags
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct StreamBounds {
	pub(crate) start: u64,
	pub(crate) end: u64,
}

/// Searches for an ID3v2 tag at the current position
///
/// The tag is parsed into `tag` and recorded in `layout`. Afterwards, the reader is positioned
/// just past the tag (or where it started, if there is no tag).
pub(crate) fn find_id3v2<R>(
	reader: &mut R,
	parse_options: ParseOptions,
	tag: &mut TagModel,
	layout: &mut FormatLayout,
) -> Result<Option<Id3v2Header>>
where
	R: Read + Seek,
{
	let start = reader.stream_position()?;
	log::debug!("Searching for an ID3v2 tag at offset: {}", start);

	let mut header_bytes = [0; HEADER_SIZE];
	if reader.read_exact(&mut header_bytes).is_err() || &header_bytes[..3] != b"ID3" {
		reader.seek(SeekFrom::Start(start))?;
		return Ok(None);
	}

	let header = match Id3v2Header::parse(&header_bytes) {
		Ok(header) => header,
		Err(e) => {
			let parse_mode = parse_options.parsing_mode;
			parse_mode_choice!(
				parse_mode,
				STRICT: return Err(e),
				DEFAULT: {
					log::warn!("Ignoring an unreadable ID3v2 tag: {}", e);
					reader.seek(SeekFrom::Start(start))?;
					return Ok(None);
				}
			);
		},
	};

	let full_size = header.full_tag_size();
	layout.push_block(BlockKind::Id3v2, start, full_size);
	layout.id3v2_version = Some(header.version.major());

	let content = reader.read_bytes(header.size as usize)?;
	if header.flags.footer {
		reader.seek(SeekFrom::Current(10))?;
	}

	if Id3v2Header::is_v2_compressed(&header_bytes) {
		log::warn!("Encountered a compressed ID3v2.2 tag, its contents will be discarded");
		return Ok(Some(header));
	}

	let items = v2::read::parse_id3v2(&content, header, parse_options.parsing_mode, tag)?;
	for item in items {
		layout.push_extension(item);
	}

	Ok(Some(header))
}

/// Skips an ID3v2 tag at the current position without reading it
///
/// Used by containers that don't officially support ID3v2. The tag is recorded in `layout`, and
/// is kept as-is on write.
pub(crate) fn skip_id3v2<R>(reader: &mut R, layout: &mut FormatLayout) -> Result<()>
where
	R: Read + Seek,
{
	let start = reader.stream_position()?;

	let mut header_bytes = [0; HEADER_SIZE];
	let header = match reader.read_exact(&mut header_bytes) {
		Ok(()) => Id3v2Header::parse(&header_bytes).ok(),
		Err(_) => None,
	};

	let Some(header) = header else {
		reader.seek(SeekFrom::Start(start))?;
		return Ok(());
	};

	log::warn!("Skipping an ID3v2 tag, it will be kept as-is");

	let full_size = header.full_tag_size();
	layout.push_block(BlockKind::Id3v2, start, full_size);
	reader.seek(SeekFrom::Start(start + full_size))?;

	Ok(())
}

/// Searches for an ID3v1 tag at the end of the stream
///
/// Only fields still empty in `tag` are filled. Returns the offset of the tag.
pub(crate) fn find_id3v1<R>(
	reader: &mut R,
	parse_mode: ParsingMode,
	tag: &mut TagModel,
	layout: &mut FormatLayout,
) -> Result<Option<u64>>
where
	R: Read + Seek,
{
	let len = reader.stream_len_hack()?;
	if len < ID3V1_TAG_SIZE as u64 {
		return Ok(None);
	}

	let offset = len - ID3V1_TAG_SIZE as u64;
	reader.seek(SeekFrom::Start(offset))?;

	let mut id3v1 = [0; ID3V1_TAG_SIZE];
	reader.read_exact(&mut id3v1)?;

	if id3v1[..3] != ID3V1_TAG_MARKER {
		return Ok(None);
	}

	log::debug!("Found an ID3v1 tag at offset: {}", offset);
	layout.push_block(BlockKind::Id3v1, offset, ID3V1_TAG_SIZE as u64);

	v1::parse(&id3v1, parse_mode, tag)?;
	Ok(Some(offset))
}

/// Reads the ID3v2 tag at the start of the stream, and the ID3v1 tag at its end
///
/// Returns the region in between, which holds the audio.
pub(crate) fn read_id3_tags<R>(
	reader: &mut R,
	parse_options: ParseOptions,
	tag: &mut TagModel,
	layout: &mut FormatLayout,
) -> Result<StreamBounds>
where
	R: Read + Seek,
{
	reader.rewind()?;
	find_id3v2(reader, parse_options, tag, layout)?;
	let start = reader.stream_position()?;

	let end = match find_id3v1(reader, parse_options.parsing_mode, tag, layout)? {
		Some(id3v1_offset) if id3v1_offset >= start => id3v1_offset,
		_ => reader.stream_len_hack()?,
	};

	reader.seek(SeekFrom::Start(start))?;
	Ok(StreamBounds { start, end })
}

/// Writes the ID3 tags of an MPEG or TrueAudio file
///
/// An ID3v2 tag is always written, keeping the version of an existing ID3v2.3 tag and using
/// ID3v2.4 otherwise. An existing ID3v1 tag is refreshed, but one is never added.
pub(crate) fn write_to(
	original: &[u8],
	layout: &FormatLayout,
	tag: &TagModel,
	write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let existing = layout.block(BlockKind::Id3v2);
	if let Some(block) = existing {
		if block.end() > original.len() as u64
			|| original.get(block.range()).is_none_or(|tag| !tag.starts_with(b"ID3"))
		{
			encode_err!(@BAIL "The file no longer matches its layout (ID3v2 tag not found)");
		}
	}

	let version = match layout.id3v2_version {
		Some(3) => Id3v2Version::V3,
		_ => Id3v2Version::V4,
	};

	let plan = WritePlan::new(layout.extensions(), tag);
	let frames = v2::write::encode_frames(&plan, tag, version, write_options)?;
	let id3v2 = v2::write::build_tag(
		version,
		&frames,
		existing.map(|block| block.size()),
		write_options.padding(),
	)?;

	let id3v2_range = existing.map_or(0..0, |block| block.range());

	let mut out = Vec::with_capacity(original.len() + id3v2.len());
	out.extend_from_slice(&original[..id3v2_range.start]);
	out.extend_from_slice(&id3v2);

	match layout.block(BlockKind::Id3v1) {
		Some(block) if block.offset() >= id3v2_range.end as u64 => {
			let id3v1_range = block.range();
			if original.get(id3v1_range.clone()).is_none_or(|tag| tag[..3] != ID3V1_TAG_MARKER) {
				encode_err!(@BAIL "The file no longer matches its layout (ID3v1 tag not found)");
			}

			out.extend_from_slice(&original[id3v2_range.end..id3v1_range.start]);
			out.extend_from_slice(&v1::encode(tag));
			out.extend_from_slice(&original[id3v1_range.end..]);
		},
		_ => out.extend_from_slice(&original[id3v2_range.end..]),
	}

	Ok(out)
}
