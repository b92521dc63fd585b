use super::atom_info::{ATOM_HEADER_LEN, AtomInfo, encode_atom, read_atoms};
use super::ilst::build_ilst;
use super::moov::Moov;
use crate::config::{ParsingMode, WriteOptions};
use crate::error::Result;
use crate::file::{BlockKind, FormatLayout, WritePlan};
use crate::macros::{encode_err, err};
use crate::tag::TagModel;
use crate::util::io::splice;

use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};

// Version (1), flags (3), pre-defined (4), handler type (4), reserved (12), empty name (1)
pub(super) const HDLR_MDIR: &[u8] = b"\0\0\0\0\0\0\0\0mdirappl\0\0\0\0\0\0\0\0\0";

/// Writes the `ilst` atom of an MP4 file
///
/// The new `ilst` replaces the old one along with any `free` atoms directly following it. When it
/// fits in that region, the remainder becomes a `free` atom and nothing else moves. Otherwise the
/// sizes of the parent atoms and the chunk offset tables are updated.
pub(crate) fn write_to(
	original: &[u8],
	layout: &FormatLayout,
	tag: &TagModel,
	write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let parse_mode = ParsingMode::BestAttempt;

	let Some(moov) = read_atoms(original, 0, parse_mode)?
		.into_iter()
		.find(|atom| &atom.ident == b"moov")
	else {
		encode_err!(@BAIL Mp4, "The file no longer matches its layout (missing \"moov\" atom)");
	};

	let moov = Moov::parse(moov, original, 0, parse_mode)?;

	let expected_ilst = layout.block(BlockKind::Ilst).map(|block| (block.offset(), block.size()));
	if moov.ilst.map(|ilst| (ilst.start, ilst.len)) != expected_ilst {
		encode_err!(@BAIL Mp4, "The file no longer matches its layout (\"ilst\" atom moved)");
	}

	let plan = WritePlan::new(layout.extensions(), tag);
	if moov.ilst.is_none() && plan.items.is_empty() && plan.fields.is_empty() {
		log::debug!("MP4: Nothing to do");
		return Ok(original.to_vec());
	}

	let ilst = build_ilst(&plan, tag)?;
	let preferred_padding = write_options.preferred_padding;

	let (range, replacement, ancestors) = match (moov.udta, moov.meta, moov.ilst) {
		(Some(udta), Some(meta), Some(old_ilst)) => {
			let end = moov.padding.last().map_or(old_ilst.end(), AtomInfo::end);
			let range = old_ilst.start as usize..end as usize;

			let mut replacement = ilst;
			match range.len().checked_sub(replacement.len()) {
				Some(0) => log::debug!("MP4: New \"ilst\" is an exact fit"),
				Some(remaining) if remaining as u64 >= ATOM_HEADER_LEN => {
					log::debug!("MP4: Writing in place, {} bytes of padding remain", remaining);
					replacement.extend(free_atom(remaining as u64 - ATOM_HEADER_LEN)?);
				},
				_ => {
					log::debug!("MP4: New \"ilst\" doesn't fit, resizing parent atoms");
					replacement.extend(preferred_free_atom(preferred_padding)?);
				},
			}

			(range, replacement, vec![moov.atom, udta, meta])
		},
		(Some(udta), Some(meta), None) => {
			log::debug!("MP4: Inserting an \"ilst\" atom into the existing \"meta\"");

			let mut replacement = ilst;
			replacement.extend(preferred_free_atom(preferred_padding)?);

			let position = meta.end() as usize;
			(position..position, replacement, vec![moov.atom, udta, meta])
		},
		(Some(udta), None, _) => {
			log::debug!("MP4: Inserting a \"meta\" atom into the existing \"udta\"");

			let position = udta.end() as usize;
			let replacement = build_meta(ilst, preferred_padding)?;
			(position..position, replacement, vec![moov.atom, udta])
		},
		(None, ..) => {
			log::debug!("MP4: Creating a \"udta\" atom");

			let position = moov.atom.end() as usize;
			let replacement = encode_atom(*b"udta", &build_meta(ilst, preferred_padding)?)?;
			(position..position, replacement, vec![moov.atom])
		},
	};

	let delta = replacement.len() as i64 - range.len() as i64;
	let mut out = splice(original, range.clone(), &replacement);

	if delta == 0 {
		return Ok(out);
	}

	// Every ancestor starts before the modified region, so their positions are unchanged
	for atom in ancestors {
		update_atom_size(&mut out, &atom, delta)?;
	}

	for table in &moov.chunk_offsets {
		let mut table = *table;
		if table.start >= range.end as u64 {
			table.start = table.start.wrapping_add_signed(delta);
		}

		update_chunk_offsets(&mut out, &table, &range, delta)?;
	}

	Ok(out)
}

fn free_atom(size: u64) -> Result<Vec<u8>> {
	encode_atom(*b"free", &vec![0; size as usize])
}

fn preferred_free_atom(preferred_padding: Option<u32>) -> Result<Vec<u8>> {
	match preferred_padding {
		Some(padding) => free_atom(u64::from(padding)),
		None => Ok(Vec::new()),
	}
}

// meta > hdlr, ilst, free
fn build_meta(ilst: Vec<u8>, preferred_padding: Option<u32>) -> Result<Vec<u8>> {
	// Version (1), flags (3)
	let mut content = vec![0; 4];
	content.extend(encode_atom(*b"hdlr", HDLR_MDIR)?);
	content.extend(ilst);
	content.extend(preferred_free_atom(preferred_padding)?);

	encode_atom(*b"meta", &content)
}

fn update_atom_size(data: &mut [u8], atom: &AtomInfo, delta: i64) -> Result<()> {
	let start = atom.start as usize;
	let Some(new_len) = atom.len.checked_add_signed(delta) else {
		err!(TooMuchData);
	};

	if atom.extended {
		BigEndian::write_u64(&mut data[start + 8..start + 16], new_len);
		return Ok(());
	}

	let Ok(new_len) = u32::try_from(new_len) else {
		err!(TooMuchData);
	};

	BigEndian::write_u32(&mut data[start..start + 4], new_len);
	Ok(())
}

// Shift every chunk that lies after the modified region
fn update_chunk_offsets(
	data: &mut [u8],
	table: &AtomInfo,
	modified: &Range<usize>,
	delta: i64,
) -> Result<()> {
	let content = table.content_range();
	let Some(content) = data.get_mut(content) else {
		encode_err!(@BAIL Mp4, "Chunk offset table is out of bounds");
	};

	// Version (1), flags (3), entry count (4)
	if content.len() < 8 {
		return Ok(());
	}

	let entry_size = if &table.ident == b"co64" { 8 } else { 4 };
	let entry_count = BigEndian::read_u32(&content[4..8]) as usize;

	for entry in content[8..].chunks_exact_mut(entry_size).take(entry_count) {
		let offset = if entry_size == 8 {
			BigEndian::read_u64(entry)
		} else {
			u64::from(BigEndian::read_u32(entry))
		};

		if offset < modified.end as u64 {
			continue;
		}

		let Some(new_offset) = offset.checked_add_signed(delta) else {
			err!(TooMuchData);
		};

		if entry_size == 8 {
			BigEndian::write_u64(entry, new_offset);
			continue;
		}

		let Ok(new_offset) = u32::try_from(new_offset) else {
			err!(TooMuchData);
		};

		BigEndian::write_u32(entry, new_offset);
	}

	Ok(())
}
