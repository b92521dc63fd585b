//! Musepack specific items
//!
//! Both stream version 7 (`MP+`) and stream version 8 (`MPCK`) are supported. The metadata lives in
//! an APEv2 tag at the end of the file, see [`crate::ape`].
mod constants;
mod sv7;
mod sv8;

use crate::ape::read_ape_tags;
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::file::{Container, FormatLayout, ParsedFile};
use crate::macros::{decode_err, parse_mode_choice};
use crate::properties::{AudioProperties, bitrate_kbps, duration_from_samples};
use crate::tag::TagModel;

use std::io::{Read, Seek};

/// The version of the MPC stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MpcStreamVersion {
	Sv7,
	Sv8,
}

pub(crate) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	log::debug!("Attempting to read MPC file");

	let mut tag = TagModel::new();
	let mut layout = FormatLayout::new(Container::Mpc);

	let bounds = read_ape_tags(reader, parse_options, &mut tag, &mut layout)?;
	layout.audio_offset = bounds.start;
	layout.audio_len = bounds.end - bounds.start;

	let mut magic = [0; 4];
	if layout.audio_len < 4 || reader.read_exact(&mut magic).is_err() {
		decode_err!(@BAIL Mpc, "File is too small to hold a stream header");
	}

	let version = match &magic {
		b"MPCK" => MpcStreamVersion::Sv8,
		[b'M', b'P', b'+', _] => MpcStreamVersion::Sv7,
		_ => decode_err!(@BAIL Mpc, "File contains an unsupported stream version"),
	};

	log::debug!("MPC stream version determined to be {:?}", version);

	let mut properties = AudioProperties::default();
	if parse_options.read_properties {
		// Only the audio region can hold the stream header
		let mut stream = reader.by_ref().take(layout.audio_len - 4);

		properties = match version {
			MpcStreamVersion::Sv7 => {
				// The version is packed into the last byte of the magic
				let mut header = std::io::Read::chain(&magic[3..], &mut stream);
				sv7_properties(&mut header, layout.audio_len)?
			},
			MpcStreamVersion::Sv8 => {
				sv8_properties(&mut stream, layout.audio_len, parse_options.parsing_mode)?
			},
		};
	}

	Ok(ParsedFile::new(tag, properties, layout))
}

fn sv7_properties<R: Read>(reader: &mut R, stream_len: u64) -> Result<AudioProperties> {
	let header = sv7::StreamHeader::parse(reader)?;

	if header.sample_rate == 0 || header.frame_count == 0 {
		log::warn!("MPC: Sample rate or frame count is 0, unable to calculate duration and bitrate");
		return Ok(AudioProperties::default());
	}

	let duration = duration_from_samples(header.total_samples(), header.sample_rate);

	// SV7 is always stereo
	Ok(AudioProperties::new(
		duration,
		bitrate_kbps(stream_len, duration),
		header.sample_rate,
		2,
	))
}

fn sv8_properties<R: Read>(
	reader: &mut R,
	stream_len: u64,
	parse_mode: ParsingMode,
) -> Result<AudioProperties> {
	let header = match sv8::StreamHeader::find(reader)? {
		Some(header) => header,
		None => parse_mode_choice!(
			parse_mode,
			STRICT: decode_err!(@BAIL Mpc, "File is missing a Stream Header packet"),
			DEFAULT: {
				log::warn!("MPC: File is missing a Stream Header packet");
				return Ok(AudioProperties::default());
			}
		),
	};

	if header.beginning_silence > header.sample_count {
		parse_mode_choice!(
			parse_mode,
			STRICT: decode_err!(@BAIL Mpc, "Beginning silence is greater than the total sample count"),
			DEFAULT: {
				log::warn!("MPC: Beginning silence is greater than the total sample count");
				return Ok(AudioProperties::default());
			}
		);
	}

	let total_samples = header.sample_count - header.beginning_silence;
	if header.sample_rate == 0 || total_samples == 0 {
		log::warn!("MPC: Sample rate or sample count is 0, unable to calculate duration and bitrate");
		return Ok(AudioProperties::default());
	}

	let duration = duration_from_samples(total_samples, header.sample_rate);
	Ok(AudioProperties::new(
		duration,
		bitrate_kbps(stream_len, duration),
		header.sample_rate,
		header.channels,
	))
}
