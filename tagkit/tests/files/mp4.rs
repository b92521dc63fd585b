use crate::util;

use tagkit::config::ParseOptions;
use tagkit::error::ErrorKind;
use tagkit::file::{BlockKind, Container};

use std::time::Duration;

fn mdat_content_offset(file: &[u8]) -> u32 {
	file.windows(4).position(|window| window == b"mdat").unwrap() as u32 + 4
}

#[test_log::test]
fn properties() {
	let parsed = util::read(&util::mp4_file(None));
	assert_eq!(parsed.container(), Container::Mp4);

	let properties = parsed.properties();
	assert_eq!(properties.duration(), Duration::from_secs(10));
	assert_eq!(properties.samplerate_hz(), 44100);
	assert_eq!(properties.channels(), 2);
	assert_eq!(properties.bitrate_kbps(), 128);
}

#[test_log::test]
fn round_trip_creates_udta() {
	let original = util::mp4_file(None);
	let written = util::round_trip(&original, Container::Mp4);

	assert!(written.len() > original.len());
	assert_eq!(util::mp4_chunk_offset(&written), mdat_content_offset(&written));
	assert!(util::read(&written).layout().block(BlockKind::Ilst).is_some());
}

#[test_log::test]
fn round_trip_existing_ilst() {
	let udta = util::mp4_udta(&[util::mp4_item(b"\xA9nam", 1, b"Foo title")], 0);
	util::round_trip(&util::mp4_file(Some(udta)), Container::Mp4);
}

#[test_log::test]
fn clear() {
	let udta = util::mp4_udta(
		&[
			util::mp4_item(b"\xA9nam", 1, b"Foo title"),
			util::mp4_item(b"trkn", 0, &[0, 0, 0, 5, 0, 12, 0, 0]),
		],
		0,
	);

	let original = util::mp4_file(Some(udta));
	assert_eq!(util::read(&original).tag().track(), 5);
	util::clear_round_trip(&original);
}

#[test_log::test]
fn in_place_with_padding() {
	let udta = util::mp4_udta(&[util::mp4_item(b"\xA9nam", 1, b"Foo title")], 512);
	let original = util::mp4_file(Some(udta));

	let mut parsed = util::read(&original);
	util::set_all_fields(parsed.tag_mut());

	let written = util::write(&parsed, &original);
	assert_eq!(written.len(), original.len());
	assert_eq!(util::mp4_chunk_offset(&written), util::mp4_chunk_offset(&original));

	util::verify_all_fields(util::read(&written).tag());
}

#[test_log::test]
fn relocation_shifts_chunk_offsets() {
	let udta = util::mp4_udta(&[util::mp4_item(b"\xA9nam", 1, b"Foo title")], 8);
	let original = util::mp4_file(Some(udta));

	let mut parsed = util::read(&original);
	parsed.tag_mut().set_comment("Qux comment ".repeat(20));

	let written = util::write(&parsed, &original);
	assert!(written.len() > original.len());
	assert_eq!(util::mp4_chunk_offset(&written), mdat_content_offset(&written));

	let reparsed = util::read(&written);
	assert_eq!(reparsed.tag().title(), "Foo title");
	assert_eq!(reparsed.tag().comment(), "Qux comment ".repeat(20));
	assert_eq!(
		util::audio(&written, reparsed.layout()),
		util::audio(&original, parsed.layout())
	);
}

#[test_log::test]
fn freeform_items_survive() {
	let mut freeform = util::atom(b"mean", b"\0\0\0\0com.apple.iTunes");
	freeform.extend(util::atom(b"name", b"\0\0\0\0MOOD"));
	freeform.extend(util::atom(b"data", b"\0\0\0\x01\0\0\0\0Calm"));

	let udta = util::mp4_udta(&[util::atom(b"----", &freeform)], 0);
	let original = util::mp4_file(Some(udta));

	let mut parsed = util::read(&original);
	parsed.tag_mut().set_artist("Bar artist");

	let written = util::write(&parsed, &original);
	let reparsed = util::read(&written);
	assert_eq!(reparsed.tag().artist(), "Bar artist");
	assert!(
		reparsed
			.extensions()
			.iter()
			.any(|item| item.key() == "----:com.apple.iTunes:MOOD")
	);
}

#[test_log::test]
fn extended_size_smaller_than_header() {
	let mut file = util::atom(b"ftyp", b"M4A \0\0\0\0M4A isom");
	// A 64-bit size of 8 can't even hold the 16 byte header
	file.extend(1_u32.to_be_bytes());
	file.extend(b"moov");
	file.extend(8_u64.to_be_bytes());
	file.extend([0; 32]);

	for container in [None, Some(Container::Mp4)] {
		let err = tagkit::read_from_bytes(&file, container, ParseOptions::new()).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::CorruptContainer(_)));
	}
}
