use crate::config::ParsingMode;
use crate::error::Result;
use crate::id3::StreamBounds;
use crate::macros::{decode_err, parse_mode_choice};
use crate::properties::{AudioProperties, bitrate_kbps, duration_from_samples};
use crate::util::io::ReadExt;

use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};

// https://wiki.multimedia.cx/index.php?title=WavPack#Block_structure

const BLOCK_HEADER_SIZE: u64 = 32;
const FLAG_INITIAL_BLOCK: u32 = 0x800;
const FLAG_MONO: u32 = 0x0004;
const FLAG_DSD: u32 = 0x8000_0000;

// https://wiki.multimedia.cx/index.php?title=WavPack#Metadata

const ID_FLAG_ODD_SIZE: u8 = 0x40;
const ID_FLAG_LARGE_SIZE: u8 = 0x80;

const ID_MULTICHANNEL: u8 = 0x0D;
const ID_DSD: u8 = 0x0E;
const ID_NON_STANDARD_SAMPLE_RATE: u8 = 0x27;

const MIN_STREAM_VERSION: u16 = 0x402;
const MAX_STREAM_VERSION: u16 = 0x410;

// According to the WavPack format documentation, the max block size is 1MB
const WV_BLOCK_MAX_SIZE: u32 = 1_048_576;

const UNKNOWN_SAMPLE_COUNT: u32 = u32::MAX;

const SAMPLE_RATES: [u32; 16] = [
	6000, 8000, 9600, 11025, 12000, 16000, 22050, 24000, 32000, 44100, 48000, 64000, 88200, 96000,
	192_000, 0,
];

#[derive(Debug)]
struct BlockHeader {
	version: u16,
	/// The size of the block, excluding the magic and this field
	block_size: u32,
	total_samples: u32,
	samples: u32,
	flags: u32,
}

impl BlockHeader {
	fn parse(header: &[u8; BLOCK_HEADER_SIZE as usize]) -> Result<Self> {
		if &header[..4] != b"wvpk" {
			decode_err!(@BAIL WavPack, "Expected a \"wvpk\" block");
		}

		let block_size = LittleEndian::read_u32(&header[4..8]);
		if !(24..=WV_BLOCK_MAX_SIZE).contains(&block_size) {
			decode_err!(@BAIL WavPack, "WavPack block has an invalid size");
		}

		// Skipped:
		//
		// Track number (1)
		// Track sub index (1)
		// Block index (4)
		// CRC (4)
		Ok(Self {
			version: LittleEndian::read_u16(&header[8..10]),
			block_size,
			total_samples: LittleEndian::read_u32(&header[12..16]),
			samples: LittleEndian::read_u32(&header[20..24]),
			flags: LittleEndian::read_u32(&header[24..28]),
		})
	}

	fn full_size(&self) -> u64 {
		u64::from(self.block_size) + 8
	}
}

/// Stream information that can only be found in the metadata sub-blocks
#[derive(Default)]
struct ExtendedInfo {
	sample_rate: Option<u32>,
	rate_shift: Option<u32>,
	channels: Option<u16>,
}

pub(super) fn read_properties<R>(
	reader: &mut R,
	bounds: StreamBounds,
	parse_mode: ParsingMode,
) -> Result<AudioProperties>
where
	R: Read + Seek,
{
	let mut offset = bounds.start;
	let header = loop {
		if offset + BLOCK_HEADER_SIZE > bounds.end {
			parse_mode_choice!(
				parse_mode,
				STRICT: decode_err!(@BAIL WavPack, "File contains no audio blocks"),
				DEFAULT: {
					log::warn!("WavPack: No block holds any samples, properties will be empty");
					return Ok(AudioProperties::default());
				}
			);
		}

		reader.seek(SeekFrom::Start(offset))?;

		let mut header_bytes = [0; BLOCK_HEADER_SIZE as usize];
		reader.read_exact(&mut header_bytes)?;

		let header = match BlockHeader::parse(&header_bytes) {
			Ok(header) => header,
			Err(e) if parse_mode == ParsingMode::Strict => return Err(e),
			Err(_) => {
				log::warn!("WavPack: Invalid block at offset {}, properties will be empty", offset);
				return Ok(AudioProperties::default());
			},
		};

		// Just skip any block with no samples
		if header.samples > 0 {
			break header;
		}

		offset += header.full_size();
	};

	if header.flags & FLAG_INITIAL_BLOCK == 0 {
		log::warn!("WavPack: First audio block is not an initial block");
	}

	if !(MIN_STREAM_VERSION..=MAX_STREAM_VERSION).contains(&header.version) {
		parse_mode_choice!(
			parse_mode,
			STRICT: decode_err!(@BAIL WavPack, "Unsupported stream version encountered"),
			DEFAULT: {
				log::warn!("WavPack: Unsupported stream version {:#X}", header.version);
				return Ok(AudioProperties::default());
			}
		);
	}

	let sample_rate_idx = ((header.flags >> 23) & 0xF) as usize;
	let mut sample_rate = SAMPLE_RATES[sample_rate_idx];
	let mut channels: u16 = if header.flags & FLAG_MONO == FLAG_MONO {
		1
	} else {
		2
	};

	let content_len = u64::from(header.block_size) - 24;
	if offset + BLOCK_HEADER_SIZE + content_len <= bounds.end {
		let content = reader.read_bytes(content_len as usize)?;
		match read_extended_info(&content) {
			Ok(info) => {
				if let Some(custom_rate) = info.sample_rate {
					sample_rate = custom_rate;
				}

				if let (Some(shift), true) = (info.rate_shift, header.flags & FLAG_DSD == FLAG_DSD) {
					sample_rate = sample_rate.wrapping_shl(shift);
				}

				if let Some(count) = info.channels {
					channels = count;
				}
			},
			Err(e) if parse_mode == ParsingMode::Strict => return Err(e),
			Err(_) => log::warn!("WavPack: Unable to read the block metadata"),
		}
	}

	// A sample rate index of 15 indicates a custom sample rate, which should have been found
	// in the metadata
	if sample_rate == 0 {
		parse_mode_choice!(
			parse_mode,
			STRICT: decode_err!(@BAIL WavPack, "Expected custom sample rate"),
			DEFAULT: {
				log::warn!("WavPack: Sample rate is unknown, properties will be empty");
				return Ok(AudioProperties::default());
			}
		);
	}

	let channels = u8::try_from(channels).unwrap_or(u8::MAX);

	if header.total_samples == UNKNOWN_SAMPLE_COUNT {
		log::warn!("WavPack: Unknown sample count, unable to calculate duration and bitrate");
		return Ok(AudioProperties::new(
			std::time::Duration::ZERO,
			0,
			sample_rate,
			channels,
		));
	}

	let duration = duration_from_samples(u64::from(header.total_samples), sample_rate);
	Ok(AudioProperties::new(
		duration,
		bitrate_kbps(bounds.end - bounds.start, duration),
		sample_rate,
		channels,
	))
}

fn read_extended_info(mut content: &[u8]) -> Result<ExtendedInfo> {
	let mut info = ExtendedInfo::default();

	while content.len() >= 2 {
		let id = content[0];

		// Sizes are stored in words
		let (mut size, header_len) = if id & ID_FLAG_LARGE_SIZE > 0 {
			if content.len() < 4 {
				decode_err!(@BAIL WavPack, "Block metadata is truncated");
			}

			(LittleEndian::read_u24(&content[1..4]) as usize * 2, 4)
		} else {
			(usize::from(content[1]) * 2, 2)
		};

		content = &content[header_len..];
		if size > content.len() {
			decode_err!(@BAIL WavPack, "Block metadata has an invalid size");
		}

		let (sub_block, rest) = content.split_at(size);
		content = rest;

		if id & ID_FLAG_ODD_SIZE > 0 {
			size = size.saturating_sub(1);
		}

		let data = &sub_block[..size];
		match id & 0x3F {
			ID_NON_STANDARD_SAMPLE_RATE => {
				if data.len() < 3 {
					decode_err!(@BAIL WavPack, "Encountered an invalid block size for non-standard sample rate");
				}

				info.sample_rate = Some(LittleEndian::read_u24(data));
			},
			ID_DSD => {
				let Some(&rate_shift) = data.first() else {
					decode_err!(@BAIL WavPack, "Encountered an invalid DSD block size");
				};

				if rate_shift > 30 {
					decode_err!(@BAIL WavPack, "Encountered an invalid sample rate multiplier");
				}

				info.rate_shift = Some(u32::from(rate_shift));
			},
			ID_MULTICHANNEL => {
				info.channels = match data {
					[] => decode_err!(@BAIL WavPack, "Unable to extract channel information"),
					// The extended format supports up to 4096 channels
					[low, high, _, _, _, ..] if data.len() >= 6 => {
						Some((u16::from(*low) | (u16::from(*high & 0xF) << 8)) + 1)
					},
					[count, ..] => Some(u16::from(*count)),
				};
			},
			_ => {},
		}
	}

	Ok(info)
}
