//! Items for OGG container formats
//!
//! ## File notes
//!
//! Vorbis, Speex and FLAC streams are all tagged with Vorbis comments, stored in one of the
//! header packets:
//!
//! * Vorbis: the second packet, prefixed with `\x03vorbis` and followed by a framing bit
//! * Speex: the second packet, with no framing
//! * FLAC: a `VORBIS_COMMENT` metadata block packet
//!
//! When writing, only the header pages are rebuilt. The pages following them are renumbered,
//! but their content and granule positions are never touched.
//!
//! Only the first logical bitstream is read, multiplexed streams are not supported.

pub(crate) mod comments;
mod constants;
pub(crate) mod flac;
pub(crate) mod speex;
pub(crate) mod vorbis;

use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::file::{BlockKind, Container, FormatLayout, WritePlan};
use crate::flac::block::{BLOCK_ID_VORBIS_COMMENTS, encode_block};
use crate::macros::{decode_err, encode_err};
use crate::tag::TagModel;
use crate::util::io::{ReadExt, SeekStreamLen};
use comments::{DEFAULT_VENDOR, encode_comments, parse_comments};
use constants::{
	FLAC_MAPPING_HEAD, FLAC_MAPPING_SIZE, SPEEX_HEADER_SIZE, SPEEXHEADER, VORBIS_COMMENT_HEAD,
	VORBIS_IDENT_HEAD,
};

use std::io::{Cursor, Read, Seek, SeekFrom};

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use ogg_pager::{
	CONTAINS_FIRST_PAGE_OF_BITSTREAM, MAX_CONTENT_SIZE, MAX_SEGMENT_COUNT, PAGE_HEADER_SIZE,
	Packets, Page, PageHeader, paginate,
};

/// The header packets of a stream, along with its metadata
pub(super) struct OggStream {
	pub(super) headers: Packets,
	pub(super) tag: TagModel,
	pub(super) layout: FormatLayout,
}

impl OggStream {
	/// The identification packet, which always exists
	pub(super) fn ident(&self) -> &[u8] {
		self.headers.get(0).unwrap_or_default()
	}

	fn serial(&self) -> Option<u32> {
		self.headers.pages().first().map(|header| header.stream_serial)
	}
}

fn verify_signature(content: &[u8], sig: &[u8]) -> bool {
	content.len() >= sig.len() && &content[..sig.len()] == sig
}

/// Reads every header packet of the stream, leaving the reader at the first audio page
fn read_header_packets<R>(data: &mut R, container: Container) -> Result<Packets>
where
	R: Read + Seek,
{
	let start = data.stream_position()?;

	let Ok(first) = Packets::read_count(data, 1) else {
		decode_err!(@BAIL "OGG: File is missing its identification header");
	};
	let ident = first.get(0).unwrap_or_default();

	let packet_count = match container {
		Container::OggVorbis => {
			if !verify_signature(ident, VORBIS_IDENT_HEAD) {
				decode_err!(@BAIL OggVorbis, "File missing magic signature");
			}

			// Identification, comment, setup
			Some(3)
		},
		Container::Speex => {
			if !verify_signature(ident, SPEEXHEADER) || ident.len() < SPEEX_HEADER_SIZE {
				decode_err!(@BAIL Speex, "File missing magic signature");
			}

			// Header, comment, and any extra headers
			let extra_headers = LittleEndian::read_u32(&ident[68..72]) as usize;
			Some(2 + extra_headers)
		},
		Container::OggFlac => {
			if !verify_signature(ident, FLAC_MAPPING_HEAD)
				|| ident.len() < FLAC_MAPPING_SIZE
				|| &ident[9..13] != b"fLaC"
			{
				decode_err!(@BAIL OggFlac, "File missing magic signature");
			}

			// 0 means the number of header packets is unknown
			match BigEndian::read_u16(&ident[7..9]) {
				0 => None,
				count => Some(1 + usize::from(count)),
			}
		},
		_ => decode_err!(@BAIL "OGG: Unsupported codec"),
	};

	data.seek(SeekFrom::Start(start))?;

	if let Some(packet_count) = packet_count {
		return match Packets::read_count(data, packet_count) {
			Ok(packets) => Ok(packets),
			Err(_) => decode_err!(@BAIL "OGG: File is missing header packets"),
		};
	}

	// Keep reading until the last metadata block
	for packet_count in 2.. {
		data.seek(SeekFrom::Start(start))?;

		let Ok(packets) = Packets::read_count(data, packet_count) else {
			break;
		};

		let is_last = packets
			.get(packet_count - 1)
			.and_then(|packet| packet.first())
			.is_some_and(|block_header| block_header & 0x80 != 0);
		if is_last {
			return Ok(packets);
		}
	}

	decode_err!(@BAIL OggFlac, "File is missing its last metadata block");
}

/// Finds the comment packet, returning its index and the comment block it holds
fn comment_packet(container: Container, headers: &Packets) -> Result<(usize, &[u8])> {
	match container {
		Container::OggVorbis => match headers.get(1) {
			Some(packet) if verify_signature(packet, VORBIS_COMMENT_HEAD) => {
				Ok((1, &packet[VORBIS_COMMENT_HEAD.len()..]))
			},
			_ => decode_err!(@BAIL OggVorbis, "File missing comment header"),
		},
		Container::Speex => match headers.get(1) {
			Some(packet) => Ok((1, packet)),
			None => decode_err!(@BAIL Speex, "File missing comment header"),
		},
		Container::OggFlac => {
			let found = headers.iter().enumerate().skip(1).find(|(_, packet)| {
				packet.len() >= 4 && packet[0] & 0x7F == BLOCK_ID_VORBIS_COMMENTS
			});

			match found {
				Some((idx, packet)) => Ok((idx, &packet[4..])),
				None => decode_err!(@BAIL OggFlac, "File missing Vorbis Comments block"),
			}
		},
		_ => decode_err!(@BAIL "OGG: Unsupported codec"),
	}
}

/// Reads the header packets and the comments of a stream
pub(super) fn read_stream<R>(
	data: &mut R,
	container: Container,
	parse_options: ParseOptions,
) -> Result<OggStream>
where
	R: Read + Seek,
{
	data.rewind()?;

	let headers = read_header_packets(data, container)?;
	let headers_end = data.stream_position()?;

	let mut tag = TagModel::new();
	let mut layout = FormatLayout::new(container);

	let (_, comments) = comment_packet(container, &headers)?;
	parse_comments(comments, parse_options.parsing_mode, &mut tag, &mut layout)?;

	layout.push_block(BlockKind::OggHeaders, 0, headers_end);
	layout.audio_offset = headers_end;
	layout.audio_len = data.stream_len_hack()? - headers_end;

	Ok(OggStream {
		headers,
		tag,
		layout,
	})
}

/// Finds the absolute granule position of the last page of the stream
///
/// For every supported codec, this is the total number of samples.
pub(super) fn last_granule<R>(data: &mut R, stream: &OggStream) -> Result<Option<u64>>
where
	R: Read + Seek,
{
	// Large enough to hold the biggest possible page
	const WINDOW_SIZE: u64 = (PAGE_HEADER_SIZE + MAX_SEGMENT_COUNT + MAX_CONTENT_SIZE) as u64;

	let Some(serial) = stream.serial() else {
		return Ok(None);
	};

	let file_length = data.stream_len_hack()?;
	let window_start = file_length
		.saturating_sub(WINDOW_SIZE)
		.max(stream.layout.audio_offset);

	data.seek(SeekFrom::Start(window_start))?;
	let window = data.read_bytes((file_length - window_start) as usize)?;

	let candidates = window
		.windows(4)
		.enumerate()
		.rev()
		.filter(|(_, sig)| *sig == b"OggS")
		.map(|(pos, _)| pos);

	for pos in candidates {
		// False positives are just skipped
		let Ok(header) = PageHeader::read(&mut Cursor::new(&window[pos..])) else {
			continue;
		};

		let page_end = pos + header.size() + header.content_size();
		if page_end > window.len() || header.stream_serial != serial {
			continue;
		}

		// -1 means no packet finishes on the page
		if header.abgp == u64::MAX {
			continue;
		}

		log::debug!("OGG: Found the last page at offset {}", window_start + pos as u64);
		return Ok(Some(header.abgp));
	}

	log::warn!("OGG: Unable to find the last page of the stream");
	Ok(None)
}

/// Writes the comment packet of a Vorbis, Speex or FLAC stream
pub(crate) fn write_to(
	original: &[u8],
	layout: &FormatLayout,
	tag: &TagModel,
	_write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let container = layout.container;

	let mut cursor = Cursor::new(original);
	let Ok(headers) = read_header_packets(&mut cursor, container) else {
		encode_err!(@BAIL "The file no longer matches its layout (OGG header packets not found)");
	};

	let headers_end = cursor.position();
	if headers_end != layout.audio_offset {
		encode_err!(@BAIL "The file no longer matches its layout (OGG header pages changed)");
	}

	// The last header page can't be rebuilt if it also holds audio
	if headers.trailing_bytes() != 0 {
		encode_err!(@BAIL "OGG: The last header page is shared with the audio");
	}

	let Ok((comment_idx, _)) = comment_packet(container, &headers) else {
		encode_err!(@BAIL "The file no longer matches its layout (OGG comment packet not found)");
	};

	let plan = WritePlan::new(layout.extensions(), tag);
	let comments = encode_comments(layout.vendor().unwrap_or(DEFAULT_VENDOR), &plan, tag)?;

	let comment_packet = match container {
		Container::OggVorbis => {
			let mut packet = VORBIS_COMMENT_HEAD.to_vec();
			packet.extend(comments);
			// Framing bit
			packet.push(1);
			packet
		},
		Container::OggFlac => {
			let is_last = headers
				.get(comment_idx)
				.and_then(|packet| packet.first())
				.is_some_and(|block_header| block_header & 0x80 != 0);
			encode_block(BLOCK_ID_VORBIS_COMMENTS, is_last, &comments)?
		},
		_ => comments,
	};

	let Some(serial) = headers.pages().first().map(|header| header.stream_serial) else {
		encode_err!(@BAIL "OGG: File has no header pages");
	};

	// The identification header always sits alone on the first page
	let mut pages = paginate(headers.get(0), serial, 0, CONTAINS_FIRST_PAGE_OF_BITSTREAM)?;

	let remaining_packets = headers.iter().enumerate().skip(1).map(|(idx, packet)| {
		if idx == comment_idx {
			comment_packet.as_slice()
		} else {
			packet
		}
	});

	let first_page_count = pages.len() as u32;
	for mut page in paginate(remaining_packets, serial, 0, 0)? {
		page.header_mut().sequence_number += first_page_count;
		page.gen_crc();
		pages.push(page);
	}

	let mut out = Vec::with_capacity(original.len());
	for page in &pages {
		out.extend(page.as_bytes());
	}

	let sequence_shift = i64::from(pages.len() as u32) - headers.pages().len() as i64;
	if sequence_shift == 0 {
		out.extend_from_slice(&original[headers_end as usize..]);
		return Ok(out);
	}

	log::debug!("OGG: Header page count changed, shifting sequence numbers by {}", sequence_shift);

	cursor.seek(SeekFrom::Start(headers_end))?;
	while (cursor.position() as usize) < original.len() {
		let page_start = cursor.position() as usize;
		let Ok(mut page) = Page::read(&mut cursor) else {
			// Anything that isn't a page is kept as-is
			log::warn!("OGG: Found junk after the last page, keeping it as-is");
			out.extend_from_slice(&original[page_start..]);
			break;
		};

		if page.header().stream_serial == serial {
			let sequence_number = i64::from(page.header().sequence_number) + sequence_shift;
			page.header_mut().sequence_number = sequence_number as u32;
			page.gen_crc();
		}

		out.extend(page.as_bytes());
	}

	Ok(out)
}

/// Builds a stream from its header packets and audio packets, one audio packet per page
///
/// Every audio page but the last has a granule position of `samples / 2`.
#[cfg(test)]
fn build_stream(headers: &[&[u8]], audio: &[&[u8]], samples: u64) -> Vec<u8> {
	use ogg_pager::CONTAINS_LAST_PAGE_OF_BITSTREAM;

	const SERIAL: u32 = 1_759_377_061;

	let mut pages = paginate([headers[0]], SERIAL, 0, CONTAINS_FIRST_PAGE_OF_BITSTREAM).unwrap();
	if headers.len() > 1 {
		pages.extend(paginate(headers[1..].iter().copied(), SERIAL, 0, 0).unwrap());
	}

	for (idx, packet) in audio.iter().enumerate() {
		let (granule, flags) = if idx + 1 == audio.len() {
			(samples, CONTAINS_LAST_PAGE_OF_BITSTREAM)
		} else {
			(samples / 2, 0)
		};

		pages.extend(paginate([*packet], SERIAL, granule, flags).unwrap());
	}

	let mut stream = Vec::new();
	for (sequence_number, page) in pages.iter_mut().enumerate() {
		page.header_mut().sequence_number = sequence_number as u32;
		page.gen_crc();
		stream.extend(page.as_bytes());
	}

	stream
}

/// Reads every page of a stream, checking the sequence numbers and checksums
#[cfg(test)]
fn verify_pages(stream: &[u8]) -> Vec<Page> {
	let mut cursor = Cursor::new(stream);
	let mut pages = Vec::new();

	while (cursor.position() as usize) < stream.len() {
		let page = Page::read(&mut cursor).unwrap();
		assert_eq!(page.header().sequence_number, pages.len() as u32);

		let mut copy = page.clone();
		copy.gen_crc();
		assert_eq!(copy.header().checksum(), page.header().checksum());

		pages.push(page);
	}

	pages
}
