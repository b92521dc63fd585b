use crate::util;

use tagkit::file::{BlockKind, Container};

use std::time::Duration;

#[test_log::test]
fn properties() {
	let parsed = util::read(&util::wavpack_file());
	assert_eq!(parsed.container(), Container::WavPack);

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(10));
	assert_eq!(properties.samplerate_hz(), 44100);
	assert_eq!(properties.channels(), 2);
}

#[test_log::test]
fn round_trip() {
	let original = util::wavpack_file();
	let written = util::round_trip(&original, Container::WavPack);

	// The APE tag is appended to the stream
	assert!(written.starts_with(&original));
	let parsed = util::read(&written);
	assert_eq!(parsed.layout().block(BlockKind::Ape).unwrap().end(), written.len() as u64);
}

#[test_log::test]
fn clear() {
	let mut original = util::wavpack_file();
	original.extend(util::ape_tag(&[util::ape_item("Title", "Foo title")]));

	assert_eq!(util::read(&original).tag().title(), "Foo title");
	util::clear_round_trip(&original);
}
