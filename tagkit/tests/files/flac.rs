use crate::util::{self, FLAC_BLOCK_PADDING, FLAC_BLOCK_STREAMINFO, FLAC_BLOCK_VORBIS_COMMENTS};

use tagkit::config::{ParseOptions, ParsingMode, WriteOptions};
use tagkit::file::{BlockKind, Container};

use std::time::Duration;

fn untagged() -> Vec<u8> {
	util::flac_file(&[(FLAC_BLOCK_STREAMINFO, util::flac_stream_info())])
}

#[test_log::test]
fn properties() {
	let parsed = util::read(&untagged());
	assert_eq!(parsed.container(), Container::Flac);

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(2));
	assert_eq!(properties.samplerate_hz(), 44100);
	assert_eq!(properties.channels(), 2);
	assert!(parsed.tag().is_empty());
}

#[test_log::test]
fn round_trip() {
	util::round_trip(&untagged(), Container::Flac);
}

#[test_log::test]
fn clear() {
	let original = util::flac_file(&[
		(FLAC_BLOCK_STREAMINFO, util::flac_stream_info()),
		(
			FLAC_BLOCK_VORBIS_COMMENTS,
			util::vorbis_comments(&["TITLE=Foo title", "DATE=2004"]),
		),
	]);

	util::clear_round_trip(&original);
}

#[test_log::test]
fn unknown_comments_survive() {
	let original = util::flac_file(&[
		(FLAC_BLOCK_STREAMINFO, util::flac_stream_info()),
		(
			FLAC_BLOCK_VORBIS_COMMENTS,
			util::vorbis_comments(&["TITLE=Foo title", "REPLAYGAIN_TRACK_GAIN=-6.00 dB"]),
		),
	]);

	let mut parsed = util::read(&original);
	parsed.tag_mut().set_title("Bar title");

	let written = util::write(&parsed, &original);
	let reparsed = util::read(&written);
	assert_eq!(reparsed.tag().title(), "Bar title");
	assert_eq!(reparsed.layout().vendor(), Some("vendor"));

	let extensions = reparsed.extensions();
	assert_eq!(extensions.len(), 2);
	assert_eq!(extensions[0].key(), "REPLAYGAIN_TRACK_GAIN");
	assert_eq!(extensions[0].raw(), b"REPLAYGAIN_TRACK_GAIN=-6.00 dB");
}

#[test_log::test]
fn in_place_with_padding() {
	let original = util::flac_file(&[
		(FLAC_BLOCK_STREAMINFO, util::flac_stream_info()),
		(FLAC_BLOCK_PADDING, vec![0; 2048]),
	]);

	let mut parsed = util::read(&original);
	util::set_all_fields(parsed.tag_mut());

	let written = util::write(&parsed, &original);
	assert_eq!(written.len(), original.len());

	let reparsed = util::read(&written);
	util::verify_all_fields(reparsed.tag());
	assert_eq!(reparsed.layout().audio_offset(), parsed.layout().audio_offset());
}

#[test_log::test]
fn relocation_keeps_audio() {
	let original = util::flac_file(&[
		(FLAC_BLOCK_STREAMINFO, util::flac_stream_info()),
		(FLAC_BLOCK_PADDING, vec![0; 16]),
	]);

	let mut parsed = util::read(&original);
	parsed.tag_mut().set_comment("Qux comment ".repeat(20));

	let written = util::write(&parsed, &original);
	let reparsed = util::read(&written);
	assert_eq!(reparsed.tag().comment(), "Qux comment ".repeat(20));

	let layout = reparsed.layout();
	assert!(layout.audio_offset() > parsed.layout().audio_offset());
	assert_eq!(layout.block(BlockKind::Padding).unwrap().end(), layout.audio_offset());
	assert_eq!(
		util::audio(&written, layout),
		util::audio(&original, parsed.layout())
	);
}

#[test_log::test]
fn relocation_without_padding() {
	let original = untagged();

	let mut parsed = util::read(&original);
	parsed.tag_mut().set_title("Foo title");

	let written = parsed
		.write(&original, WriteOptions::new().preferred_padding(0))
		.unwrap();

	let reparsed = util::read(&written);
	assert_eq!(reparsed.tag().title(), "Foo title");
	assert!(reparsed.layout().block(BlockKind::Padding).is_none());
}

#[test_log::test]
fn missing_stream_info() {
	let original = util::flac_file(&[(FLAC_BLOCK_PADDING, vec![0; 16])]);

	let strict = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	assert!(tagkit::read_from_bytes(&original, None, strict).is_err());
	assert!(tagkit::read_from_bytes(&original, None, ParseOptions::new()).is_err());
}

#[test_log::test]
fn unreadable_comments() {
	// The vendor string length runs past the end of the block
	let comments = vec![0xFF, 0xFF, 0, 0, b'a', b'b'];
	let original = util::flac_file(&[
		(FLAC_BLOCK_STREAMINFO, util::flac_stream_info()),
		(FLAC_BLOCK_VORBIS_COMMENTS, comments),
	]);

	let strict = ParseOptions::new().parsing_mode(ParsingMode::Strict);
	assert!(tagkit::read_from_bytes(&original, None, strict).is_err());

	// The comments are dropped, the stream is still usable
	let mut parsed = util::read(&original);
	assert!(parsed.tag().is_empty());
	assert!(parsed.layout().extensions().is_empty());
	assert_eq!(parsed.properties().samplerate_hz(), 44100);
	assert_eq!(parsed.properties().duration(), Duration::from_secs(2));

	// And get replaced on the next write
	parsed.tag_mut().set_title("Foo title");
	let written = util::write(&parsed, &original);

	let reparsed = util::read(&written);
	assert_eq!(reparsed.tag().title(), "Foo title");
	assert_eq!(reparsed.layout().extensions().len(), 1);
	assert_eq!(util::audio(&written, reparsed.layout()), util::audio(&original, parsed.layout()));
}
