use crate::util;

use tagkit::config::ParseOptions;
use tagkit::error::ErrorKind;
use tagkit::file::Container;

use std::io::Cursor;

#[test_log::test]
fn detect_every_container() {
	let files = [
		(util::mpeg_frames(10), Container::Mpeg),
		(util::vorbis_file(&[]), Container::OggVorbis),
		(
			util::flac_file(&[(util::FLAC_BLOCK_STREAMINFO, util::flac_stream_info())]),
			Container::Flac,
		),
		(util::mpc_sv7_file(), Container::Mpc),
		(util::mpc_sv8_file(), Container::Mpc),
		(util::ogg_flac_file(&[]), Container::OggFlac),
		(util::wavpack_file(), Container::WavPack),
		(util::speex_file(&[]), Container::Speex),
		(util::tta_file(), Container::TrueAudio),
		(util::mp4_file(None), Container::Mp4),
		(util::asf_file(&[]), Container::Asf),
	];

	for (data, container) in files {
		assert_eq!(Container::from_buffer(&data), Some(container));

		let parsed = tagkit::read_from(&mut Cursor::new(&data), ParseOptions::new()).unwrap();
		assert_eq!(parsed.container(), container);
		assert!(parsed.is_valid());
	}
}

#[test_log::test]
fn detect_after_id3v2() {
	let mut data = util::id3v2_tag("Foo title", 0);
	data.extend(util::tta_file());

	// The tag hides the signature from a plain buffer check
	assert_eq!(Container::from_buffer(&data), None);

	let parsed = util::read(&data);
	assert_eq!(parsed.container(), Container::TrueAudio);
	assert_eq!(parsed.tag().title(), "Foo title");
}

#[test_log::test]
fn unrecognized_format() {
	let data = b"This is not an audio file, just some text.".repeat(10);

	let err = tagkit::read_from_bytes(&data, None, ParseOptions::new()).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::UnrecognizedFormat));
	assert!(err.is_open_failure());
}

#[test_log::test]
fn wrong_container_hint() {
	let data = util::mp4_file(None);

	let err = tagkit::read_from_bytes(&data, Some(Container::Flac), ParseOptions::new()).unwrap_err();
	assert!(matches!(err.kind(), ErrorKind::CorruptContainer(_)));
}

#[test_log::test]
fn fractional_track_number() {
	let original = util::flac_file(&[(util::FLAC_BLOCK_STREAMINFO, util::flac_stream_info())]);

	let mut parsed = util::read(&original);
	parsed.tag_mut().set_track(5.9);
	parsed.tag_mut().set_year(2004.2_f32);
	assert_eq!(parsed.tag().track(), 5);

	let reparsed = util::read(&util::write(&parsed, &original));
	assert_eq!(reparsed.tag().track(), 5);
	assert_eq!(reparsed.tag().year(), 2004);
}
