use crate::util::{self, ASF_PADDING};

use tagkit::file::{BlockKind, Container};

use std::time::Duration;

#[test_log::test]
fn properties() {
	let parsed = util::read(&util::asf_file(&[]));
	assert_eq!(parsed.container(), Container::Asf);

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(10));
	assert_eq!(properties.samplerate_hz(), 44100);
	assert_eq!(properties.channels(), 2);
	assert_eq!(properties.bitrate_kbps(), 128);
}

#[test_log::test]
fn content_description() {
	let original = util::asf_file(&[util::asf_content_description("Foo title", "Bar artist")]);

	let parsed = util::read(&original);
	assert_eq!(parsed.tag().title(), "Foo title");
	assert_eq!(parsed.tag().artist(), "Bar artist");
	assert!(parsed.layout().block(BlockKind::AsfHeader).is_some());
}

#[test_log::test]
fn round_trip() {
	let original = util::asf_file(&[]);
	let written = util::round_trip(&original, Container::Asf);

	assert!(written.len() > original.len());
	assert_eq!(util::asf_file_size(&written), written.len() as u64);
}

#[test_log::test]
fn clear() {
	let original = util::asf_file(&[util::asf_content_description("Foo title", "Bar artist")]);
	util::clear_round_trip(&original);
}

#[test_log::test]
fn in_place_with_padding() {
	let original = util::asf_file(&[util::asf_object(ASF_PADDING, &[0; 1024])]);

	let mut parsed = util::read(&original);
	util::set_all_fields(parsed.tag_mut());

	let written = util::write(&parsed, &original);
	assert_eq!(written.len(), original.len());
	assert_eq!(util::asf_file_size(&written), original.len() as u64);

	let reparsed = util::read(&written);
	util::verify_all_fields(reparsed.tag());
	assert_eq!(reparsed.layout().audio_offset(), parsed.layout().audio_offset());
}
