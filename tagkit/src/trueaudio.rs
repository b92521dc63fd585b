//! TrueAudio specific items
//!
//! TrueAudio files are tagged just like MPEG files: ID3v2 at the start, with an optional ID3v1
//! tag at the end.

use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{Container, FormatLayout, ParsedFile};
use crate::id3::read_id3_tags;
use crate::macros::decode_err;
use crate::properties::{AudioProperties, bitrate_kbps, duration_from_samples};
use crate::tag::TagModel;

use std::io::{Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};

// "TTA1" + format (2) + channels (2) + bits per sample (2) + sample rate (4) + samples (4) + CRC (4)
const HEADER_SIZE: usize = 22;

pub(crate) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	let mut tag = TagModel::new();
	let mut layout = FormatLayout::new(Container::TrueAudio);

	let bounds = read_id3_tags(reader, parse_options, &mut tag, &mut layout)?;

	let mut header = [0; HEADER_SIZE];
	if bounds.end - bounds.start < HEADER_SIZE as u64 || reader.read_exact(&mut header).is_err() {
		decode_err!(@BAIL TrueAudio, "File is too small to hold a TTA1 header");
	}

	if &header[..4] != b"TTA1" {
		decode_err!(@BAIL TrueAudio, "Expected a \"TTA1\" header");
	}

	layout.audio_offset = bounds.start;
	layout.audio_len = bounds.end - bounds.start;

	let properties = if parse_options.read_properties {
		read_properties(&header[4..], layout.audio_len)?
	} else {
		AudioProperties::default()
	};

	Ok(ParsedFile::new(tag, properties, layout))
}

fn read_properties(mut header: &[u8], stream_len: u64) -> Result<AudioProperties> {
	let _format = header.read_u16::<LittleEndian>()?;
	let channels = header.read_u16::<LittleEndian>()?;
	let _bits_per_sample = header.read_u16::<LittleEndian>()?;
	let sample_rate = header.read_u32::<LittleEndian>()?;
	let samples = header.read_u32::<LittleEndian>()?;

	if sample_rate == 0 {
		log::warn!("TrueAudio: Sample rate is 0, properties will be empty");
		return Ok(AudioProperties::default());
	}

	let duration = duration_from_samples(u64::from(samples), sample_rate);
	Ok(AudioProperties::new(
		duration,
		bitrate_kbps(stream_len, duration),
		sample_rate,
		u8::try_from(channels).unwrap_or(u8::MAX),
	))
}

#[cfg(test)]
mod tests {
	use super::read_from;
	use crate::config::{ParseOptions, WriteOptions};
	use crate::error::ErrorKind;

	use std::io::Cursor;
	use std::time::Duration;

	fn tta_stream() -> Vec<u8> {
		let mut stream = b"TTA1".to_vec();
		stream.extend(1_u16.to_le_bytes());
		stream.extend(2_u16.to_le_bytes());
		stream.extend(16_u16.to_le_bytes());
		stream.extend(44100_u32.to_le_bytes());
		stream.extend((44100_u32 * 3).to_le_bytes());
		stream.extend([0; 4]);
		stream.extend([0xAB; 1000]);
		stream
	}

	#[test_log::test]
	fn properties() {
		let parsed = read_from(&mut Cursor::new(tta_stream()), ParseOptions::new()).unwrap();

		let properties = parsed.properties();
		assert_eq!(properties.duration(), Duration::from_secs(3));
		assert_eq!(properties.samplerate_hz(), 44100);
		assert_eq!(properties.channels(), 2);
		assert!(parsed.tag().is_empty());
	}

	#[test_log::test]
	fn tag_round_trip() {
		let stream = tta_stream();
		let mut parsed = read_from(&mut Cursor::new(&stream), ParseOptions::new()).unwrap();
		parsed.tag_mut().set_artist("Foo artist");
		parsed.tag_mut().set_track(7);

		let written = parsed.write(&stream, WriteOptions::default()).unwrap();
		assert!(written.ends_with(&stream));

		let reparsed = read_from(&mut Cursor::new(&written), ParseOptions::new()).unwrap();
		assert_eq!(reparsed.tag().artist(), "Foo artist");
		assert_eq!(reparsed.tag().track(), 7);
		assert_eq!(reparsed.properties(), parsed.properties());
	}

	#[test_log::test]
	fn missing_header() {
		let err = read_from(&mut Cursor::new(vec![0; 64]), ParseOptions::new()).unwrap_err();
		assert!(matches!(err.kind(), ErrorKind::CorruptContainer(_)));
	}
}
