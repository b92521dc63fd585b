//! APE specific items
//!
//! APEv2 is the native tag of Musepack and WavPack files. It is stored at the end of the file,
//! optionally followed by an ID3v1 tag which is only used to fill empty fields.
//!
//! ## File notes
//!
//! It is possible for these files to start with an `ID3v2` tag. For the sake of data preservation,
//! this tag will be kept as-is, but it is never read or written.
//!
//! ## Item storage
//!
//! Item keys are case-insensitive. The canonical fields use the keys `Title`, `Artist`, `Album`,
//! `Comment`, `Genre`, `Year` and `Track`. Binary and locator items are always kept verbatim.

mod constants;
mod header;
mod item;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{BlockKind, FormatLayout, WritePlan};
use crate::id3::v1::constants::ID3V1_TAG_MARKER;
use crate::id3::{self, StreamBounds};
use crate::macros::{decode_err, encode_err, err};
use crate::tag::TagModel;
use crate::util::io::{ReadExt, SeekStreamLen};
use constants::{APE_HEADER_SIZE, APE_PREAMBLE};
use header::ApeFooter;

use std::io::{Read, Seek, SeekFrom};

/// Reads the APE tag at the end of the stream, with an ID3v1 tag as a fallback
///
/// Returns the region that holds the audio.
pub(crate) fn read_ape_tags<R>(
	reader: &mut R,
	parse_options: ParseOptions,
	tag: &mut TagModel,
	layout: &mut FormatLayout,
) -> Result<StreamBounds>
where
	R: Read + Seek,
{
	reader.rewind()?;
	id3::skip_id3v2(reader, layout)?;
	let start = reader.stream_position()?;

	// The ID3v1 tag can only fill in what the APE tag leaves empty, so it's applied last
	let mut id3v1_tag = TagModel::new();
	let id3v1_offset =
		id3::find_id3v1(reader, parse_options.parsing_mode, &mut id3v1_tag, layout)?;
	let mut end = match id3v1_offset {
		Some(offset) if offset >= start => offset,
		_ => reader.stream_len_hack()?,
	};

	// Search for an APE tag footer
	//
	// Starts with ['A', 'P', 'E', 'T', 'A', 'G', 'E', 'X']
	// Exactly 32 bytes long
	// Strongly recommended to be at the end of the file
	if end >= start + APE_HEADER_SIZE as u64 {
		reader.seek(SeekFrom::Start(end - APE_HEADER_SIZE as u64))?;

		let mut footer = [0; APE_HEADER_SIZE];
		reader.read_exact(&mut footer)?;

		if let Some(footer) = ApeFooter::parse(&footer)? {
			let Some(tag_start) = end
				.checked_sub(footer.full_size())
				.filter(|tag_start| *tag_start >= start)
			else {
				decode_err!(@BAIL "APE tag has an invalid size (> file size)");
			};

			log::debug!("Found an APE tag at offset: {}", tag_start);

			let items_start = end - u64::from(footer.size);
			reader.seek(SeekFrom::Start(items_start))?;
			let items = reader.read_bytes(footer.size as usize - APE_HEADER_SIZE)?;

			for item in item::parse_items(&items, footer.item_count, parse_options.parsing_mode, tag)? {
				layout.push_extension(item);
			}

			layout.push_block(BlockKind::Ape, tag_start, footer.full_size());
			end = tag_start;
		}
	}

	for (key, value) in id3v1_tag.present() {
		tag.insert_parsed(key, value.clone());
	}

	reader.seek(SeekFrom::Start(start))?;
	Ok(StreamBounds { start, end })
}

/// Writes the APE tag of a Musepack or WavPack file
///
/// The tag replaces the existing one, or is placed at the end of the file, before any ID3v1 tag.
/// An existing ID3v1 tag is refreshed.
pub(crate) fn write_to(
	original: &[u8],
	layout: &FormatLayout,
	tag: &TagModel,
	_write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let id3v1 = layout.block(BlockKind::Id3v1);
	let ape_range = match layout.block(BlockKind::Ape) {
		Some(block) => {
			let range = block.range();
			let footer_matches = original.get(range.clone()).is_some_and(|ape| {
				ape.len() >= APE_HEADER_SIZE
					&& ape[ape.len() - APE_HEADER_SIZE..].starts_with(APE_PREAMBLE)
			});
			if !footer_matches {
				encode_err!(@BAIL "The file no longer matches its layout (APE tag not found)");
			}

			range
		},
		None => {
			let position = id3v1.map_or(original.len(), |block| block.range().start);
			position..position
		},
	};

	let new_tag = build_tag(&WritePlan::new(layout.extensions(), tag), tag)?;

	let mut out = Vec::with_capacity(original.len() + new_tag.len());
	out.extend_from_slice(&original[..ape_range.start]);
	out.extend_from_slice(&new_tag);

	match id3v1 {
		Some(block) if block.range().start >= ape_range.end => {
			let id3v1_range = block.range();
			if original.get(id3v1_range.clone()).is_none_or(|v1| v1[..3] != ID3V1_TAG_MARKER) {
				encode_err!(@BAIL "The file no longer matches its layout (ID3v1 tag not found)");
			}

			out.extend_from_slice(&original[ape_range.end..id3v1_range.start]);
			out.extend_from_slice(&id3::v1::encode(tag));
			out.extend_from_slice(&original[id3v1_range.end..]);
		},
		_ => out.extend_from_slice(&original[ape_range.end..]),
	}

	Ok(out)
}

// Unnecessary to write anything if there's no metadata
fn build_tag(plan: &WritePlan<'_>, tag: &TagModel) -> Result<Vec<u8>> {
	let mut items = Vec::new();
	let mut item_count = 0_u32;

	for item in &plan.items {
		items.extend_from_slice(item.raw());
		item_count += 1;
	}

	for field in &plan.fields {
		let value = tag.get(*field).to_text();
		items.extend(item::encode_text_item(item::field_item_key(*field), &value));
		item_count += 1;
	}

	if item_count == 0 {
		log::debug!("APE: No items to write, removing the tag");
		return Ok(Vec::new());
	}

	// The size in the footer includes the footer itself
	let Some(items_size) = u32::try_from(items.len())
		.ok()
		.filter(|size| size.checked_add(APE_HEADER_SIZE as u32).is_some())
	else {
		err!(TooMuchData);
	};

	let (header, footer) = header::encode_header_footer(items_size, item_count);

	let mut out = Vec::with_capacity(items.len() + APE_HEADER_SIZE * 2);
	out.extend_from_slice(&header);
	out.extend_from_slice(&items);
	out.extend_from_slice(&footer);

	Ok(out)
}
