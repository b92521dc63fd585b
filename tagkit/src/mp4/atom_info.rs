use crate::config::ParsingMode;
use crate::error::Result;
use crate::macros::{decode_err, err};

use std::io::{Cursor, Read, Seek, SeekFrom};
use std::ops::Range;

use byteorder::{BigEndian, ReadBytesExt};

pub(super) const ATOM_HEADER_LEN: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct AtomInfo {
	pub(super) start: u64,
	pub(super) len: u64,
	pub(super) extended: bool,
	pub(super) ident: [u8; 4],
}

// The MP4 format permits any characters to be used in atom identifiers. This doesn't
// leave us any room for error detection.
//
// TagLib has decided on a character set to consider valid, so we will do the same:
// <https://github.com/taglib/taglib/issues/1077#issuecomment-1440385838>
fn is_valid_identifier_byte(b: u8) -> bool {
	(b' '..=b'~').contains(&b) || b == b'\xA9'
}

impl AtomInfo {
	/// Reads an atom header, `reader_size` being the number of bytes left in the parent
	///
	/// Returns `None` when the rest of the parent can't be made sense of.
	pub(super) fn read<R>(
		data: &mut R,
		reader_size: u64,
		parse_mode: ParsingMode,
	) -> Result<Option<Self>>
	where
		R: Read + Seek,
	{
		let start = data.stream_position()?;

		let len_raw = u64::from(data.read_u32::<BigEndian>()?);

		let mut ident = [0; 4];
		data.read_exact(&mut ident)?;

		if !ident.iter().copied().all(is_valid_identifier_byte) {
			// The atom identifier contains invalid characters
			//
			// Seek to the end, since we can't recover from this
			data.seek(SeekFrom::End(0))?;

			match parse_mode {
				ParsingMode::Strict => {
					decode_err!(@BAIL Mp4, "Encountered an atom with invalid characters");
				},
				ParsingMode::BestAttempt | ParsingMode::Relaxed => {
					log::warn!("Encountered an atom with invalid characters, stopping");
					return Ok(None);
				},
			}
		}

		let (len, extended) = match len_raw {
			// The atom extends to the end of the parent
			0 => (reader_size, false),
			// There's an extended length
			1 => (data.read_u64::<BigEndian>()?, true),
			_ => (len_raw, false),
		};

		let header_size = if extended { ATOM_HEADER_LEN + 8 } else { ATOM_HEADER_LEN };
		if len < header_size {
			// Seek to the end, since we can't recover from this
			data.seek(SeekFrom::End(0))?;

			decode_err!(@BAIL Mp4, "Found an atom with a length smaller than its header");
		}

		if len > reader_size {
			log::warn!("Encountered an atom with an invalid length, stopping");

			// As with all formats, there's a good chance certain software won't know how to actually use padding.
			// If the file ends with an incorrectly sized padding atom, we can just ignore it.
			let skippable = (parse_mode != ParsingMode::Strict && ident == *b"free")
				|| parse_mode == ParsingMode::Relaxed;
			if skippable {
				data.seek(SeekFrom::End(0))?;
				return Ok(None);
			}

			err!(SizeMismatch);
		}

		Ok(Some(Self {
			start,
			len,
			extended,
			ident,
		}))
	}

	pub(super) fn header_size(&self) -> u64 {
		if !self.extended {
			return ATOM_HEADER_LEN;
		}

		ATOM_HEADER_LEN + 8
	}

	pub(super) fn end(&self) -> u64 {
		self.start + self.len
	}

	/// The range of the whole atom, header included
	pub(super) fn range(&self) -> Range<usize> {
		self.start as usize..self.end() as usize
	}

	/// The range of the atom's content
	pub(super) fn content_range(&self) -> Range<usize> {
		(self.start + self.header_size()) as usize..self.end() as usize
	}
}

/// Reads every atom in `data`, offsetting their positions by `base`
pub(super) fn read_atoms(data: &[u8], base: u64, parse_mode: ParsingMode) -> Result<Vec<AtomInfo>> {
	let mut atoms = Vec::new();
	let mut cursor = Cursor::new(data);

	loop {
		let remaining = data.len() as u64 - cursor.position();
		if remaining == 0 {
			break;
		}

		// Some muxers terminate containers with a 32-bit zero
		if remaining < ATOM_HEADER_LEN {
			log::debug!("MP4: Ignoring {} trailing bytes in a container", remaining);
			break;
		}

		let Some(mut atom) = AtomInfo::read(&mut cursor, remaining, parse_mode)? else {
			break;
		};

		cursor.seek(SeekFrom::Start(atom.end()))?;

		atom.start += base;
		atoms.push(atom);
	}

	Ok(atoms)
}

/// Encodes an atom header for content of `content_len` bytes
pub(super) fn encode_header(ident: [u8; 4], content_len: usize) -> Result<Vec<u8>> {
	let Some(len) = u32::try_from(content_len as u64 + ATOM_HEADER_LEN).ok() else {
		err!(TooMuchData);
	};

	let mut header = Vec::with_capacity(ATOM_HEADER_LEN as usize);
	header.extend(len.to_be_bytes());
	header.extend(ident);
	Ok(header)
}

/// Encodes a full atom
pub(super) fn encode_atom(ident: [u8; 4], content: &[u8]) -> Result<Vec<u8>> {
	let mut atom = encode_header(ident, content.len())?;
	atom.extend_from_slice(content);
	Ok(atom)
}
