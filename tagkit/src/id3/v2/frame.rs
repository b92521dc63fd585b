use super::header::Id3v2Version;
use super::synchsafe::{SynchsafeInteger, resynchronise};
use crate::config::ParsingMode;
use crate::error::{ErrorKind, Result, TagkitError};
use crate::macros::{err, parse_mode_choice};

use byteorder::{BigEndian, ByteOrder};

/// Per-frame flags, normalized across ID3v2.3 and ID3v2.4
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct FrameFlags {
	pub(crate) compression: bool,
	pub(crate) encryption: bool,
	pub(crate) grouping: bool,
	pub(crate) unsynchronisation: bool,
	pub(crate) data_length_indicator: bool,
}

impl FrameFlags {
	fn parse(flags: u16, version: Id3v2Version) -> Self {
		match version {
			Id3v2Version::V2 => Self::default(),
			// %abc00000 %ijk00000
			Id3v2Version::V3 => Self {
				compression: flags & 0x0080 == 0x0080,
				encryption: flags & 0x0040 == 0x0040,
				grouping: flags & 0x0020 == 0x0020,
				unsynchronisation: false,
				data_length_indicator: false,
			},
			// %0abc0000 %0h00kmnp
			Id3v2Version::V4 => Self {
				grouping: flags & 0x0040 == 0x0040,
				compression: flags & 0x0008 == 0x0008,
				encryption: flags & 0x0004 == 0x0004,
				unsynchronisation: flags & 0x0002 == 0x0002,
				data_length_indicator: flags & 0x0001 == 0x0001,
			},
		}
	}
}

/// A single frame, with its content decoded as far as possible
#[derive(Clone, Debug)]
pub(crate) struct Frame {
	pub(crate) id: String,
	pub(crate) flags: FrameFlags,
	/// The frame as found, header included
	pub(crate) raw: Vec<u8>,
	/// The decoded content, or `None` if it can't be decoded (encrypted, or unsupported compression)
	pub(crate) content: Option<Vec<u8>>,
}

pub(crate) enum ParsedFrame {
	Next(Frame),
	/// A frame that can't be used, but doesn't end the tag
	Skip,
	/// Padding or the end of the tag
	Eof,
}

fn frame_header_len(version: Id3v2Version) -> usize {
	match version {
		Id3v2Version::V2 => 6,
		Id3v2Version::V3 | Id3v2Version::V4 => 10,
	}
}

fn is_valid_frame_id(id: &[u8]) -> bool {
	id.iter()
		.all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
}

/// Reads the frame at the start of `reader`, advancing it past the frame
pub(crate) fn read_frame(
	reader: &mut &[u8],
	version: Id3v2Version,
	parse_mode: ParsingMode,
) -> Result<ParsedFrame> {
	let data: &[u8] = *reader;
	let header_len = frame_header_len(version);
	if data.len() < header_len {
		return Ok(ParsedFrame::Eof);
	}

	let (header, rest) = data.split_at(header_len);
	let id_len = if version == Id3v2Version::V2 { 3 } else { 4 };
	let id = &header[..id_len];

	// Padding
	if id[0] == 0 {
		return Ok(ParsedFrame::Eof);
	}

	if !is_valid_frame_id(id) {
		parse_mode_choice!(
			parse_mode,
			STRICT: err!(Id3v2("Encountered an invalid frame ID")),
			DEFAULT: {
				log::warn!("ID3v2: Encountered an invalid frame ID, ending the tag");
				return Ok(ParsedFrame::Eof);
			}
		);
	}

	let (size, flags) = match version {
		Id3v2Version::V2 => (
			u32::from_be_bytes([0, header[3], header[4], header[5]]),
			0,
		),
		Id3v2Version::V3 => (
			BigEndian::read_u32(&header[4..8]),
			BigEndian::read_u16(&header[8..]),
		),
		Id3v2Version::V4 => (
			BigEndian::read_u32(&header[4..8]).unsynch(),
			BigEndian::read_u16(&header[8..]),
		),
	};

	let size = size as usize;
	if size > rest.len() {
		parse_mode_choice!(
			parse_mode,
			STRICT: err!(Id3v2("Frame size exceeds the tag")),
			DEFAULT: {
				log::warn!("ID3v2: Frame size exceeds the tag, ending the tag");
				return Ok(ParsedFrame::Eof);
			}
		);
	}

	let (body, remaining) = rest.split_at(size);
	*reader = remaining;

	let id = String::from_utf8_lossy(id).into_owned();
	if size == 0 {
		log::debug!("ID3v2: Skipping empty frame `{}`", id);
		return Ok(ParsedFrame::Skip);
	}

	let flags = FrameFlags::parse(flags, version);
	let content = decode_content(body, flags, version)?;

	let mut raw = Vec::with_capacity(header_len + size);
	raw.extend_from_slice(header);
	raw.extend_from_slice(body);

	Ok(ParsedFrame::Next(Frame {
		id,
		flags,
		raw,
		content,
	}))
}

fn decode_content(
	body: &[u8],
	flags: FrameFlags,
	version: Id3v2Version,
) -> Result<Option<Vec<u8>>> {
	if flags.encryption {
		return Ok(None);
	}

	// The additional header bytes are stored in flag order
	let mut offset = 0;
	match version {
		Id3v2Version::V2 => {},
		Id3v2Version::V3 => {
			// Decompressed size (4)
			if flags.compression {
				offset += 4;
			}
			// Group ID (1)
			if flags.grouping {
				offset += 1;
			}
		},
		Id3v2Version::V4 => {
			// Group ID (1)
			if flags.grouping {
				offset += 1;
			}
			// Data length indicator (4)
			if flags.data_length_indicator {
				offset += 4;
			}
		},
	}

	let Some(content) = body.get(offset..) else {
		return Err(TagkitError::new(ErrorKind::Id3v2(
			"Frame is too small for its flags",
		)));
	};

	let content = if flags.unsynchronisation {
		resynchronise(content)
	} else {
		content.to_vec()
	};

	if flags.compression {
		return decompress(&content);
	}

	Ok(Some(content))
}

#[cfg(feature = "id3v2_compression_support")]
fn decompress(content: &[u8]) -> Result<Option<Vec<u8>>> {
	use std::io::Read;

	let mut decompressed = Vec::new();
	flate2::read::ZlibDecoder::new(content)
		.read_to_end(&mut decompressed)
		.map_err(|err| TagkitError::new(ErrorKind::Decompression(err)))?;

	Ok(Some(decompressed))
}

#[cfg(not(feature = "id3v2_compression_support"))]
fn decompress(_: &[u8]) -> Result<Option<Vec<u8>>> {
	log::warn!("ID3v2: Encountered a compressed frame, but compression support is disabled");
	Ok(None)
}

/// Encode a frame with the given ID and content
pub(crate) fn encode_frame(id: &str, content: &[u8], version: Id3v2Version) -> Result<Vec<u8>> {
	debug_assert!(version != Id3v2Version::V2, "ID3v2.2 frames are never written");

	let size = u32::try_from(content.len()).map_err(|_| TagkitError::new(ErrorKind::TooMuchData))?;
	let size = match version {
		Id3v2Version::V4 => size.synch()?,
		_ => size,
	};

	let mut frame = Vec::with_capacity(10 + content.len());
	frame.extend_from_slice(id.as_bytes());
	frame.extend_from_slice(&size.to_be_bytes());
	frame.extend_from_slice(&[0, 0]);
	frame.extend_from_slice(content);

	Ok(frame)
}
