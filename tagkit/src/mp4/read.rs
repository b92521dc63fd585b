use super::atom_info::{ATOM_HEADER_LEN, AtomInfo};
use super::ilst::parse_items;
use super::moov::Moov;
use super::properties::read_properties;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{BlockKind, Container, FormatLayout, ParsedFile};
use crate::macros::decode_err;
use crate::properties::AudioProperties;
use crate::tag::TagModel;
use crate::util::io::{ReadExt, SeekStreamLen};

use std::io::{Read, Seek, SeekFrom};

pub(super) fn verify_mp4<R>(data: &mut R, file_len: u64, parse_options: ParseOptions) -> Result<AtomInfo>
where
	R: Read + Seek,
{
	let atom = match AtomInfo::read(data, file_len, parse_options.parsing_mode) {
		Ok(Some(atom)) if &atom.ident == b"ftyp" => atom,
		_ => decode_err!(@BAIL Mp4, "MP4 file does not start with an \"ftyp\" atom"),
	};

	log::debug!("File verified to be MP4");
	Ok(atom)
}

pub(crate) fn read_from<R>(data: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	let mut tag = TagModel::new();
	let mut layout = FormatLayout::new(Container::Mp4);

	data.rewind()?;
	let file_len = data.stream_len_hack()?;

	let ftyp = verify_mp4(data, file_len, parse_options)?;
	data.seek(SeekFrom::Start(ftyp.end()))?;

	let mut moov = None;
	let mut mdat = None;

	loop {
		let remaining = file_len - data.stream_position()?;

		// Trailing bytes too small to hold an atom
		if remaining < ATOM_HEADER_LEN {
			if remaining > 0 {
				log::debug!("MP4: Ignoring {} trailing bytes", remaining);
			}

			break;
		}

		let Some(atom) = AtomInfo::read(data, remaining, parse_options.parsing_mode)? else {
			break;
		};

		match &atom.ident {
			b"moov" if moov.is_none() => {
				let content = data.read_bytes((atom.len - atom.header_size()) as usize)?;
				moov = Some((atom, content));
			},
			b"mdat" if mdat.is_none() => mdat = Some(atom),
			_ => {},
		}

		data.seek(SeekFrom::Start(atom.end()))?;
	}

	let Some((moov_atom, moov_content)) = moov else {
		decode_err!(@BAIL Mp4, "MP4 file does not contain a \"moov\" atom");
	};

	let moov = Moov::parse(
		moov_atom,
		&moov_content,
		moov_atom.start + moov_atom.header_size(),
		parse_options.parsing_mode,
	)?;

	if let Some(ilst) = moov.ilst {
		layout.push_block(BlockKind::Ilst, ilst.start, ilst.len);
		for free in &moov.padding {
			layout.push_block(BlockKind::Padding, free.start, free.len);
		}

		parse_items(&moov, &ilst, parse_options.parsing_mode, &mut tag, &mut layout)?;
	}

	if let Some(mdat) = mdat {
		layout.audio_offset = mdat.start + mdat.header_size();
		layout.audio_len = mdat.len - mdat.header_size();
	} else {
		log::warn!("MP4: File contains no \"mdat\" atom");
	}

	let mut properties = AudioProperties::default();
	if parse_options.read_properties {
		properties = read_properties(&moov, layout.audio_len)?;
	}

	Ok(ParsedFile::new(tag, properties, layout))
}
