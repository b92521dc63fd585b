use crate::util;

use tagkit::file::{BlockKind, Container};

use std::time::Duration;

#[test_log::test]
fn sv7_properties() {
	let parsed = util::read(&util::mpc_sv7_file());
	assert_eq!(parsed.container(), Container::Mpc);

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(32));
	assert_eq!(properties.samplerate_hz(), 44100);
	assert_eq!(properties.channels(), 2);
}

#[test_log::test]
fn sv8_properties() {
	let parsed = util::read(&util::mpc_sv8_file());
	assert_eq!(parsed.container(), Container::Mpc);

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(2));
	assert_eq!(properties.samplerate_hz(), 48000);
	assert_eq!(properties.channels(), 2);
}

#[test_log::test]
fn sv7_round_trip() {
	util::round_trip(&util::mpc_sv7_file(), Container::Mpc);
}

#[test_log::test]
fn sv8_round_trip() {
	util::round_trip(&util::mpc_sv8_file(), Container::Mpc);
}

#[test_log::test]
fn unknown_items_survive() {
	let mut original = util::mpc_sv8_file();
	original.extend(util::ape_tag(&[
		util::ape_item("Title", "Foo title"),
		util::ape_item("Mood", "Calm"),
	]));

	let mut parsed = util::read(&original);
	assert_eq!(parsed.tag().title(), "Foo title");
	assert_eq!(parsed.layout().block(BlockKind::Ape).unwrap().offset(), 30);

	parsed.tag_mut().clear_all();
	let written = util::write(&parsed, &original);

	let mut reparsed = util::read(&written);
	assert!(reparsed.tag().is_empty());
	assert_eq!(reparsed.extensions().len(), 1);
	assert_eq!(reparsed.extensions()[0].key(), "Mood");

	// Removing the last item drops the tag
	assert_eq!(reparsed.remove_extension("mood"), 1);
	let written = util::write(&reparsed, &written);
	assert_eq!(written, util::mpc_sv8_file());
}

#[test_log::test]
fn clear() {
	let mut original = util::mpc_sv7_file();
	original.extend(util::ape_tag(&[util::ape_item("Artist", "Foo artist")]));

	util::clear_round_trip(&original);
}
