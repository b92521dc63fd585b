//! Items for FLAC
//!
//! ## File notes
//!
//! The metadata of a FLAC stream is a chain of blocks after the `fLaC` marker. The only block
//! that is read or written is the `VORBIS_COMMENT` block, see [`crate::ogg`] for its item storage.
//! Every other block (`SEEKTABLE`, `PICTURE`, `CUESHEET`, ...) is kept byte-for-byte.
//!
//! It is possible for a FLAC stream to start with an `ID3v2` tag. It is kept as-is, but never
//! read or written.

pub(crate) mod block;
pub(crate) mod properties;
mod read;
mod write;

pub(crate) use read::read_from;
pub(crate) use write::write_to;

#[cfg(test)]
mod tests {
	use super::block::{BLOCK_ID_PADDING, BLOCK_ID_STREAMINFO, BLOCK_ID_VORBIS_COMMENTS, encode_block};
	use super::{read_from, write_to};
	use crate::config::{ParseOptions, ParsingMode, WriteOptions};
	use crate::error::ErrorKind;
	use crate::file::{BlockKind, ParsedFile};

	use std::io::Cursor;
	use std::time::Duration;

	const AUDIO: &[u8] = &[0xFF, 0xF8, 0xC9, 0x18, 0x00, 0xC2, 0x01, 0x02, 0x03, 0x04];
	const SEEKTABLE: u8 = 3;

	// 44.1 kHz stereo, 88200 samples
	fn stream_info() -> Vec<u8> {
		let mut info = vec![0x10, 0x00, 0x10, 0x00, 0, 0, 0, 0, 0, 0];
		info.extend([0x0A, 0xC4, 0x42, 0xF0]);
		info.extend(88200_u32.to_be_bytes());
		info.extend([0; 16]);
		info
	}

	fn comments(comments: &[&str]) -> Vec<u8> {
		let mut block = 6_u32.to_le_bytes().to_vec();
		block.extend(b"vendor");
		block.extend((comments.len() as u32).to_le_bytes());
		for comment in comments {
			block.extend((comment.len() as u32).to_le_bytes());
			block.extend(comment.as_bytes());
		}

		block
	}

	fn file(blocks: &[(u8, Vec<u8>)]) -> Vec<u8> {
		let mut file = b"fLaC".to_vec();
		for (idx, (ty, content)) in blocks.iter().enumerate() {
			file.extend(encode_block(*ty, idx + 1 == blocks.len(), content).unwrap());
		}

		file.extend(AUDIO);
		file
	}

	fn read(data: &[u8]) -> ParsedFile {
		read_from(&mut Cursor::new(data), ParseOptions::new()).unwrap()
	}

	fn write(parsed: &ParsedFile, original: &[u8]) -> Vec<u8> {
		write_to(original, parsed.layout(), parsed.tag(), WriteOptions::default()).unwrap()
	}

	#[test_log::test]
	fn properties() {
		let parsed = read(&file(&[(BLOCK_ID_STREAMINFO, stream_info())]));

		let properties = parsed.properties();
		assert_eq!(properties.duration(), Duration::from_secs(2));
		assert_eq!(properties.samplerate_hz(), 44100);
		assert_eq!(properties.channels(), 2);
		assert_eq!(parsed.layout().audio_len(), AUDIO.len() as u64);
	}

	#[test_log::test]
	fn missing_stream_info() {
		let data = file(&[(BLOCK_ID_PADDING, vec![0; 34])]);
		let err = read_from(&mut Cursor::new(data), ParseOptions::new()).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::CorruptContainer(_)));

		let err = read_from(&mut Cursor::new(b"fLaX".to_vec()), ParseOptions::new()).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::CorruptContainer(_)));
	}

	#[test_log::test]
	fn multiple_comment_blocks() {
		let data = file(&[
			(BLOCK_ID_STREAMINFO, stream_info()),
			(BLOCK_ID_VORBIS_COMMENTS, comments(&["TITLE=Foo title"])),
			(BLOCK_ID_VORBIS_COMMENTS, comments(&["TITLE=Bar title"])),
		]);

		assert_eq!(read(&data).tag().title(), "Foo title");

		let strict = ParseOptions::new().parsing_mode(ParsingMode::Strict);
		assert!(read_from(&mut Cursor::new(&data), strict).is_err());
	}

	#[test_log::test]
	fn relocate_with_padding() {
		let original = file(&[(BLOCK_ID_STREAMINFO, stream_info())]);
		let mut parsed = read(&original);
		parsed.tag_mut().set_title("Foo title");

		let written = write(&parsed, &original);
		assert!(written.ends_with(AUDIO));

		let reparsed = read(&written);
		assert_eq!(reparsed.tag().title(), "Foo title");

		let padding = reparsed.layout().block(BlockKind::Padding).unwrap();
		assert_eq!(padding.size(), 4 + 1024);
		assert_eq!(padding.end(), reparsed.layout().audio_offset());
	}

	#[test_log::test]
	fn relocate_without_padding() {
		let original = file(&[(BLOCK_ID_STREAMINFO, stream_info())]);
		let mut parsed = read(&original);
		parsed.tag_mut().set_title("Foo title");

		let write_options = WriteOptions::new().preferred_padding(0);
		let written = write_to(&original, parsed.layout(), parsed.tag(), write_options).unwrap();

		let reparsed = read(&written);
		assert!(reparsed.layout().block(BlockKind::Padding).is_none());
		assert_eq!(reparsed.tag().title(), "Foo title");
	}

	#[test_log::test]
	fn in_place_with_padding() {
		let original = file(&[
			(BLOCK_ID_STREAMINFO, stream_info()),
			(BLOCK_ID_VORBIS_COMMENTS, comments(&["TITLE=Foo title"])),
			(BLOCK_ID_PADDING, vec![0; 100]),
		]);

		let mut parsed = read(&original);
		let audio_offset = parsed.layout().audio_offset();
		parsed.tag_mut().set_title("A much longer title");
		parsed.tag_mut().set_track(5);

		let written = write(&parsed, &original);
		assert_eq!(written.len(), original.len());

		let reparsed = read(&written);
		assert_eq!(reparsed.layout().audio_offset(), audio_offset);
		assert_eq!(reparsed.tag().title(), "A much longer title");
		assert_eq!(reparsed.tag().track(), 5);
		assert_eq!(reparsed.layout().vendor(), Some("vendor"));
	}

	#[test_log::test]
	fn exact_fit_needs_no_padding() {
		let original = file(&[
			(BLOCK_ID_STREAMINFO, stream_info()),
			(BLOCK_ID_VORBIS_COMMENTS, comments(&["TITLE=Foo title"])),
		]);

		let mut parsed = read(&original);
		parsed.tag_mut().set_title("Bar title");

		let written = write(&parsed, &original);
		assert_eq!(written.len(), original.len());
		assert!(read(&written).layout().block(BlockKind::Padding).is_none());
	}

	#[test_log::test]
	fn other_blocks_are_kept() {
		let seektable = vec![0xAB; 18];
		let original = file(&[
			(BLOCK_ID_STREAMINFO, stream_info()),
			(SEEKTABLE, seektable.clone()),
			(BLOCK_ID_VORBIS_COMMENTS, comments(&["REPLAYGAIN_TRACK_GAIN=-6.00 dB", "ARTIST=Foo"])),
		]);

		let mut parsed = read(&original);
		parsed.tag_mut().set_artist("Bar artist");

		let written = write(&parsed, &original);
		let stream_info_end = 4 + 4 + 34;
		assert_eq!(written[stream_info_end], SEEKTABLE);
		assert_eq!(&written[stream_info_end + 4..][..18], &*seektable);

		let reparsed = read(&written);
		assert_eq!(reparsed.tag().artist(), "Bar artist");
		assert_eq!(reparsed.extensions()[0].raw(), b"REPLAYGAIN_TRACK_GAIN=-6.00 dB");
	}

	#[test_log::test]
	fn clearing_drops_the_comment_block() {
		let original = file(&[
			(BLOCK_ID_STREAMINFO, stream_info()),
			(BLOCK_ID_VORBIS_COMMENTS, comments(&["TITLE=Foo title"])),
		]);

		let mut parsed = read(&original);
		parsed.tag_mut().clear_all();

		let written = write(&parsed, &original);
		assert_eq!(written.len(), original.len());

		let reparsed = read(&written);
		assert!(reparsed.tag().is_empty());
		assert!(reparsed.layout().block(BlockKind::VorbisComments).is_none());
		assert!(reparsed.layout().block(BlockKind::Padding).is_some());

		// Nothing to strip
		let stripped = read(&written);
		assert_eq!(write(&stripped, &written), written);
	}

	#[test_log::test]
	fn leading_id3v2_is_kept() {
		let mut original = b"ID3\x04\x00\x00\x00\x00\x00\x0A".to_vec();
		original.extend([0; 10]);
		original.extend(file(&[(BLOCK_ID_STREAMINFO, stream_info())]));

		let mut parsed = read(&original);
		assert!(parsed.layout().block(BlockKind::Id3v2).is_some());
		parsed.tag_mut().set_album("Foo album");

		let written = write(&parsed, &original);
		assert_eq!(&written[..20], &original[..20]);
		assert_eq!(read(&written).tag().album(), "Foo album");
	}
}
