use crate::properties::{AudioProperties, bitrate_kbps};

use std::time::Duration;

use byteorder::{ByteOrder, LittleEndian};

// File ID (16), file size (8), creation date (8), data packets count (8), play duration (8),
// send duration (8), preroll (8), flags (4), min/max packet size (8), max bitrate (4)
const FILE_PROPERTIES_SIZE: usize = 80;

// Stream type (16), error correction type (16), time offset (8), type-specific data length (4),
// error correction data length (4), flags (2), reserved (4)
const TYPE_SPECIFIC_DATA_OFFSET: usize = 54;

// Format tag (2), channels (2), samples per second (4), average bytes per second (4),
// block align (2), bits per sample (2)
const WAVEFORMATEX_SIZE: usize = 16;

/// Reads the properties from the File Properties Object and the first audio stream
pub(super) fn read_properties(
	file_properties: Option<&[u8]>,
	stream_properties: Option<&[u8]>,
	stream_len: u64,
) -> AudioProperties {
	let mut duration = Duration::ZERO;
	match file_properties {
		Some(content) if content.len() >= FILE_PROPERTIES_SIZE => {
			// 100-nanosecond units, including the preroll
			let play_duration = LittleEndian::read_u64(&content[40..48]);
			let preroll_ms = LittleEndian::read_u64(&content[56..64]);

			let units = play_duration.saturating_sub(preroll_ms.saturating_mul(10_000));
			duration = Duration::new(units / 10_000_000, ((units % 10_000_000) * 100) as u32);
		},
		_ => log::warn!("ASF: File is missing a valid File Properties Object"),
	}

	let Some(format) = stream_properties
		.and_then(|content| content.get(TYPE_SPECIFIC_DATA_OFFSET..))
		.filter(|format| format.len() >= WAVEFORMATEX_SIZE)
	else {
		log::warn!("ASF: File contains no audio stream");
		return AudioProperties::new(duration, bitrate_kbps(stream_len, duration), 0, 0);
	};

	let channels = LittleEndian::read_u16(&format[2..4]);
	let sample_rate = LittleEndian::read_u32(&format[4..8]);
	let average_bytes = LittleEndian::read_u32(&format[8..12]);

	let bitrate = if average_bytes > 0 {
		(u64::from(average_bytes) * 8 / 1000) as u32
	} else {
		bitrate_kbps(stream_len, duration)
	};

	AudioProperties::new(
		duration,
		bitrate,
		sample_rate,
		u8::try_from(channels).unwrap_or(u8::MAX),
	)
}
