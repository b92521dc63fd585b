use crate::util;

use tagkit::config::ParseOptions;
use tagkit::file::Container;

use std::time::Duration;

#[test_log::test]
fn vorbis_properties() {
	let parsed = util::read(&util::vorbis_file(&["ARTIST=Foo artist"]));
	assert_eq!(parsed.container(), Container::OggVorbis);
	assert_eq!(parsed.tag().artist(), "Foo artist");

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(10));
	assert_eq!(properties.samplerate_hz(), 44100);
	assert_eq!(properties.channels(), 2);
}

#[test_log::test]
fn vorbis_round_trip() {
	util::round_trip(&util::vorbis_file(&[]), Container::OggVorbis);
}

#[test_log::test]
fn vorbis_clear() {
	util::clear_round_trip(&util::vorbis_file(&["TITLE=Foo title", "TRACKNUMBER=3/12"]));
}

#[test_log::test]
fn vorbis_unknown_comments_survive() {
	let original = util::vorbis_file(&["TITLE=Foo title", "MOOD=Calm"]);

	let mut parsed = util::read(&original);
	parsed.tag_mut().remove_title();
	parsed.tag_mut().set_album("Foo album");

	let written = util::write(&parsed, &original);
	let reparsed = util::read(&written);
	assert_eq!(reparsed.tag().title(), "");
	assert_eq!(reparsed.tag().album(), "Foo album");
	assert_eq!(reparsed.layout().vendor(), Some("vendor"));

	let extensions = reparsed.extensions();
	assert!(extensions.iter().any(|item| item.raw() == b"MOOD=Calm"));
	assert!(!extensions.iter().any(|item| item.key() == "TITLE"));
}

#[test_log::test]
fn vorbis_no_tags() {
	let parsed = tagkit::read_from_bytes(
		&util::vorbis_file(&["TITLE=Foo title"]),
		None,
		ParseOptions::new().read_tags(false),
	)
	.unwrap();

	assert!(parsed.tag().is_empty());
	assert!(!parsed.properties().is_empty());
}

#[test_log::test]
fn speex_properties() {
	let parsed = util::read(&util::speex_file(&["TITLE=Foo title"]));
	assert_eq!(parsed.container(), Container::Speex);
	assert_eq!(parsed.tag().title(), "Foo title");

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(10));
	assert_eq!(properties.samplerate_hz(), 16000);
	assert_eq!(properties.channels(), 1);
}

#[test_log::test]
fn speex_round_trip() {
	util::round_trip(&util::speex_file(&[]), Container::Speex);
}

#[test_log::test]
fn speex_clear() {
	util::clear_round_trip(&util::speex_file(&["ARTIST=Foo artist"]));
}

#[test_log::test]
fn ogg_flac_properties() {
	let parsed = util::read(&util::ogg_flac_file(&["ALBUM=Foo album"]));
	assert_eq!(parsed.container(), Container::OggFlac);
	assert_eq!(parsed.tag().album(), "Foo album");

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(2));
	assert_eq!(properties.samplerate_hz(), 44100);
	assert_eq!(properties.channels(), 2);
}

#[test_log::test]
fn ogg_flac_round_trip() {
	util::round_trip(&util::ogg_flac_file(&[]), Container::OggFlac);
}

#[test_log::test]
fn ogg_flac_clear() {
	util::clear_round_trip(&util::ogg_flac_file(&["GENRE=Rock"]));
}
