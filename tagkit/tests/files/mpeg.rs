use crate::util;

use tagkit::config::{ParseOptions, WriteOptions};
use tagkit::error::ErrorKind;
use tagkit::file::{BlockKind, Container};

#[test_log::test]
fn three_minute_stream() {
	// 6891 frames of 1152 samples at 44.1 kHz
	let parsed = util::read(&util::mpeg_info_stream(6891));
	assert_eq!(parsed.container(), Container::Mpeg);

	let properties = parsed.properties();
	assert_eq!(properties.length_seconds(), 180);
	assert_eq!(properties.minutes(), 3);
	assert_eq!(properties.samplerate_hz(), 44100);
	assert_eq!(properties.channels(), 2);
	assert!(properties.bitrate_kbps() > 0);
}

#[test_log::test]
fn round_trip() {
	let written = util::round_trip(&util::mpeg_frames(20), Container::Mpeg);

	let parsed = util::read(&written);
	assert!(parsed.layout().block(BlockKind::Id3v2).is_some());
	assert!(!parsed.layout().has_id3v1());
}

#[test_log::test]
fn clear() {
	let mut original = util::id3v2_tag("Foo title", 256);
	original.extend(util::mpeg_frames(20));

	assert_eq!(util::read(&original).tag().title(), "Foo title");
	util::clear_round_trip(&original);
}

#[test_log::test]
fn in_place_with_padding() {
	let mut original = util::id3v2_tag("Foo title", 1024);
	original.extend(util::mpeg_frames(20));

	let mut parsed = util::read(&original);
	parsed.tag_mut().set_artist("Bar artist");

	let written = util::write(&parsed, &original);
	assert_eq!(written.len(), original.len());

	let reparsed = util::read(&written);
	assert_eq!(reparsed.tag().title(), "Foo title");
	assert_eq!(reparsed.tag().artist(), "Bar artist");
	assert_eq!(reparsed.layout().audio_offset(), parsed.layout().audio_offset());
}

#[test_log::test]
fn relocation_keeps_audio() {
	let mut original = util::id3v2_tag("Foo title", 16);
	original.extend(util::mpeg_frames(20));

	let mut parsed = util::read(&original);
	parsed.tag_mut().set_comment("Qux comment ".repeat(20));

	let written = parsed
		.write(&original, WriteOptions::new().preferred_padding(512))
		.unwrap();
	assert!(written.len() > original.len());

	let reparsed = util::read(&written);
	assert_eq!(reparsed.tag().comment(), "Qux comment ".repeat(20));
	assert!(reparsed.layout().audio_offset() > parsed.layout().audio_offset());
	assert_eq!(
		util::audio(&written, reparsed.layout()),
		util::audio(&original, parsed.layout())
	);
	assert_eq!(reparsed.properties(), parsed.properties());
}

#[test_log::test]
fn junk_limit() {
	let mut original = vec![0x42; 100];
	original.extend(util::mpeg_frames(20));

	let parsed =
		tagkit::read_from_bytes(&original, Some(Container::Mpeg), ParseOptions::new()).unwrap();
	assert_eq!(parsed.layout().audio_offset(), 100);

	let err = tagkit::read_from_bytes(
		&original,
		Some(Container::Mpeg),
		ParseOptions::new().max_junk_bytes(50),
	)
	.unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::CorruptContainer(_)));
}

#[test_log::test]
fn no_properties() {
	let parsed = tagkit::read_from_bytes(
		&util::mpeg_info_stream(6891),
		None,
		ParseOptions::new().read_properties(false),
	)
	.unwrap();

	assert!(parsed.properties().is_empty());
}
