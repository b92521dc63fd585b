use crate::error::Result;
use crate::properties::{AudioProperties, bitrate_kbps, duration_from_samples};

use byteorder::{BigEndian, ReadBytesExt};

/// Reads the audio properties from a `STREAMINFO` block
///
/// Shared with OGG FLAC, which embeds the same block in its first packet.
pub(crate) fn read_properties(mut stream_info: &[u8], stream_length: u64) -> Result<AudioProperties> {
	// Skip 4 bytes
	// Minimum block size (2)
	// Maximum block size (2)
	stream_info.read_u32::<BigEndian>()?;

	// Skip 6 bytes
	// Minimum frame size (3)
	// Maximum frame size (3)
	stream_info.read_uint::<BigEndian>(6)?;

	// Read 4 bytes
	// Sample rate (20 bits)
	// Number of channels (3 bits)
	// Bits per sample (5 bits)
	// Total samples (first 4 bits)
	let info = stream_info.read_u32::<BigEndian>()?;

	let sample_rate = info >> 12;
	let channels = ((info >> 9) & 7) + 1;

	// Read the remaining 32 bits of the total samples
	let total_samples =
		u64::from(stream_info.read_u32::<BigEndian>()?) | (u64::from(info & 0xF) << 32);

	if sample_rate == 0 {
		log::warn!("FLAC: Sample rate is 0, properties will be empty");
		return Ok(AudioProperties::default());
	}

	// A sample count of 0 means the count is unknown
	let duration = duration_from_samples(total_samples, sample_rate);

	Ok(AudioProperties::new(
		duration,
		bitrate_kbps(stream_length, duration),
		sample_rate,
		channels as u8,
	))
}
