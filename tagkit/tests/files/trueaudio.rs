use crate::util;

use tagkit::file::{BlockKind, Container};

use std::time::Duration;

#[test_log::test]
fn properties() {
	let parsed = util::read(&util::tta_file());
	assert_eq!(parsed.container(), Container::TrueAudio);

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(3));
	assert_eq!(properties.samplerate_hz(), 44100);
	assert_eq!(properties.channels(), 2);
}

#[test_log::test]
fn round_trip() {
	let written = util::round_trip(&util::tta_file(), Container::TrueAudio);

	// Tagged like MPEG, with the ID3v2 tag in front of the stream
	let parsed = util::read(&written);
	let id3v2 = parsed.layout().block(BlockKind::Id3v2).unwrap();
	assert_eq!(id3v2.offset(), 0);
	assert_eq!(id3v2.end(), parsed.layout().audio_offset());
}

#[test_log::test]
fn clear() {
	let mut original = util::id3v2_tag("Foo title", 64);
	original.extend(util::tta_file());

	assert_eq!(util::read(&original).tag().title(), "Foo title");
	util::clear_round_trip(&original);
}
