//! OGG Speex
//!
//! The first packet is the 80 byte Speex header, the second holds the comments. The header may
//! announce extra header packets, which are kept as-is.

use super::{OggStream, last_granule, read_stream};
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{Container, ParsedFile};
use crate::properties::{AudioProperties, bitrate_kbps, duration_from_samples};

use std::io::{Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};

pub(crate) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	let stream = read_stream(reader, Container::Speex, parse_options)?;

	let properties = if parse_options.read_properties {
		read_properties(reader, &stream)?
	} else {
		AudioProperties::default()
	};

	Ok(ParsedFile::new(stream.tag, properties, stream.layout))
}

fn read_properties<R>(reader: &mut R, stream: &OggStream) -> Result<AudioProperties>
where
	R: Read + Seek,
{
	log::debug!("Reading Speex properties");

	// The content we need comes 28 bytes into the packet
	//
	// Skipping:
	// Speex string ("Speex   ", 8)
	// Speex version (20)
	let header = &mut &stream.ident()[28..];

	let version = header.read_u32::<LittleEndian>()?;
	if version > 1 {
		log::warn!("Speex: Unknown stream version {}, unable to read properties", version);
		return Ok(AudioProperties::default());
	}

	// Total size of the speex header
	let _header_size = header.read_u32::<LittleEndian>()?;

	let sample_rate = header.read_u32::<LittleEndian>()?;
	let _mode = header.read_u32::<LittleEndian>()?;

	// Version ID of the bitstream
	let _mode_bitstream_version = header.read_u32::<LittleEndian>()?;

	let channels = header.read_u32::<LittleEndian>()?;
	if channels != 1 && channels != 2 {
		log::warn!("Speex: Found invalid channel count, must be mono or stereo");
		return Ok(AudioProperties::default());
	}

	let nominal_bitrate = header.read_i32::<LittleEndian>()?;

	let duration = match last_granule(reader, stream)? {
		Some(total_samples) => duration_from_samples(total_samples, sample_rate),
		None => Default::default(),
	};

	let bitrate = if duration.is_zero() {
		u32::try_from(nominal_bitrate / 1000).unwrap_or(0)
	} else {
		bitrate_kbps(stream.layout.audio_len, duration)
	};

	Ok(AudioProperties::new(duration, bitrate, sample_rate, channels as u8))
}
