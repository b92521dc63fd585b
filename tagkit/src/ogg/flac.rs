//! OGG FLAC
//!
//! The first packet holds the mapping header followed by the `STREAMINFO` block, every other
//! header packet is a single metadata block.

use super::constants::FLAC_STREAMINFO_OFFSET;
use super::read_stream;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{Container, ParsedFile};
use crate::properties::AudioProperties;

use std::io::{Read, Seek};

pub(crate) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	let stream = read_stream(reader, Container::OggFlac, parse_options)?;

	let properties = if parse_options.read_properties {
		let stream_info = &stream.ident()[FLAC_STREAMINFO_OFFSET..];
		crate::flac::properties::read_properties(stream_info, stream.layout.audio_len)?
	} else {
		AudioProperties::default()
	};

	Ok(ParsedFile::new(stream.tag, properties, stream.layout))
}

#[cfg(test)]
mod tests {
	use super::read_from;
	use crate::config::{ParseOptions, WriteOptions};
	use crate::error::ErrorKind;
	use crate::flac::block::{BLOCK_ID_PADDING, BLOCK_ID_VORBIS_COMMENTS, encode_block};
	use crate::ogg::{build_stream, verify_pages};

	use std::io::Cursor;
	use std::time::Duration;

	fn mapping_header(header_packets: u16) -> Vec<u8> {
		let mut header = b"\x7FFLAC\x01\x00".to_vec();
		header.extend(header_packets.to_be_bytes());
		header.extend(b"fLaC\x00\x00\x00\x22");
		// 44.1 kHz stereo, 88200 samples
		header.extend([0x10, 0x00, 0x10, 0x00, 0, 0, 0, 0, 0, 0]);
		header.extend([0x0A, 0xC4, 0x42, 0xF0]);
		header.extend(88200_u32.to_be_bytes());
		header.extend([0; 16]);
		header
	}

	fn comments(comments: &[&str], last: bool) -> Vec<u8> {
		let mut block = 6_u32.to_le_bytes().to_vec();
		block.extend(b"vendor");
		block.extend((comments.len() as u32).to_le_bytes());
		for comment in comments {
			block.extend((comment.len() as u32).to_le_bytes());
			block.extend(comment.as_bytes());
		}

		encode_block(BLOCK_ID_VORBIS_COMMENTS, last, &block).unwrap()
	}

	#[test_log::test]
	fn properties() {
		let data = build_stream(
			&[&mapping_header(1), &comments(&["ALBUM=Foo album"], true)],
			&[&[0xFF; 100]],
			88200,
		);

		let parsed = read_from(&mut Cursor::new(data), ParseOptions::new()).unwrap();
		assert_eq!(parsed.tag().album(), "Foo album");

		let properties = parsed.properties();
		assert_eq!(properties.duration(), Duration::from_secs(2));
		assert_eq!(properties.samplerate_hz(), 44100);
		assert_eq!(properties.channels(), 2);
	}

	#[test_log::test]
	fn unknown_header_count() {
		let padding = encode_block(BLOCK_ID_PADDING, true, &[0; 16]).unwrap();
		let original = build_stream(
			&[&mapping_header(0), &comments(&["TITLE=Foo title"], false), &padding],
			&[&[0xFF; 100]],
			88200,
		);

		let mut parsed = read_from(&mut Cursor::new(&original), ParseOptions::new()).unwrap();
		assert_eq!(parsed.tag().title(), "Foo title");

		parsed.tag_mut().set_title("Bar title");
		let written = parsed.write(&original, WriteOptions::default()).unwrap();
		let pages = verify_pages(&written);

		// The comment block keeps its place in the chain
		assert_eq!(pages[1].content()[0], BLOCK_ID_VORBIS_COMMENTS);
		assert!(pages[1].content().ends_with(&padding));

		let reparsed = read_from(&mut Cursor::new(&written), ParseOptions::new()).unwrap();
		assert_eq!(reparsed.tag().title(), "Bar title");
	}

	#[test_log::test]
	fn missing_comment_block() {
		let padding = encode_block(BLOCK_ID_PADDING, true, &[0; 16]).unwrap();
		let data = build_stream(&[&mapping_header(1), &padding], &[&[0xFF; 100]], 88200);

		let err = read_from(&mut Cursor::new(data), ParseOptions::new()).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::CorruptContainer(_)));
	}
}
