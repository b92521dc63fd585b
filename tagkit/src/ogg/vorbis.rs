//! OGG Vorbis
//!
//! The audio properties come from the identification header, and the duration from the
//! granule position of the last page.

use super::{OggStream, last_granule, read_stream};
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{Container, ParsedFile};
use crate::properties::{AudioProperties, bitrate_kbps, duration_from_samples};

use std::io::{Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};

// Signature (7), version (4), channels (1), sample rate (4), bitrates (12)
const IDENT_HEADER_MIN_SIZE: usize = 28;

pub(crate) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	let stream = read_stream(reader, Container::OggVorbis, parse_options)?;

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
	let ident = stream.ident();
	if ident.len() < IDENT_HEADER_MIN_SIZE {
		log::warn!("Vorbis: Identification header is too small, unable to read properties");
		return Ok(AudioProperties::default());
	}

	// Skip identification header
	let ident = &mut &ident[7..];

	let _version = ident.read_u32::<LittleEndian>()?;
	let channels = ident.read_u8()?;
	let sample_rate = ident.read_u32::<LittleEndian>()?;

	let _bitrate_maximum = ident.read_i32::<LittleEndian>()?;
	let bitrate_nominal = ident.read_i32::<LittleEndian>()?;

	if sample_rate == 0 {
		log::warn!("Vorbis: Sample rate = 0, unable to calculate length");
		return Ok(AudioProperties::new(Default::default(), 0, 0, channels));
	}

	let duration = match last_granule(reader, stream)? {
		Some(total_samples) => duration_from_samples(total_samples, sample_rate),
		None => Default::default(),
	};

	let bitrate = if duration.is_zero() {
		u32::try_from(bitrate_nominal / 1000).unwrap_or(0)
	} else {
		bitrate_kbps(stream.layout.audio_len, duration)
	};

	Ok(AudioProperties::new(duration, bitrate, sample_rate, channels))
}
