use super::atom_info::AtomInfo;
use super::moov::Moov;
use crate::error::Result;
use crate::properties::{AudioProperties, bitrate_kbps};

use std::time::Duration;

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};

// https://wiki.multimedia.cx/index.php?title=MPEG-4_Audio#Sampling_Frequencies
const SAMPLE_RATES: [u32; 13] = [
	96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

struct AudioMdia {
	mdhd: Option<AtomInfo>,
	stsd: Option<AtomInfo>,
}

/// The sample entry information of a stream
#[derive(Default)]
struct SampleEntry {
	sample_rate: u32,
	channels: u8,
	/// The average bitrate (bps), if specified
	bitrate: u32,
}

/// Reads the properties of the first audio track
pub(super) fn read_properties(moov: &Moov<'_>, mdat_len: u64) -> Result<AudioProperties> {
	let Some(audio) = find_audio_mdia(moov)? else {
		log::warn!("MP4: File contains no audio tracks");
		return Ok(AudioProperties::default());
	};

	// The track duration is preferred, the movie duration covers every track
	let mut duration = audio
		.mdhd
		.map(|mdhd| read_duration(moov.content(&mdhd, 0)))
		.transpose()?
		.unwrap_or_default();
	if duration.is_zero() {
		if let Some(mvhd) = moov.mvhd {
			duration = read_duration(moov.content(&mvhd, 0))?;
		}
	}

	let entry = match audio.stsd {
		Some(stsd) => read_stsd(moov, &stsd)?,
		None => None,
	};

	let Some(entry) = entry else {
		log::warn!("MP4: Unable to find a supported sample entry");
		return Ok(AudioProperties::new(duration, bitrate_kbps(mdat_len, duration), 0, 0));
	};

	let bitrate = if entry.bitrate > 0 {
		entry.bitrate / 1000
	} else {
		log::debug!("MP4: Estimating audio bitrate from 'mdat' size");
		bitrate_kbps(mdat_len, duration)
	};

	Ok(AudioProperties::new(
		duration,
		bitrate,
		entry.sample_rate,
		entry.channels,
	))
}

fn find_audio_mdia(moov: &Moov<'_>) -> Result<Option<AudioMdia>> {
	// We have to search through the traks with a mdia atom to find the audio track
	for mdia in &moov.mdias {
		let mut audio_track = false;
		let mut audio = AudioMdia {
			mdhd: None,
			stsd: None,
		};

		for atom in moov.children(mdia, 0)? {
			match &atom.ident {
				b"mdhd" => audio.mdhd = Some(atom),
				// Version (1), flags (3), pre-defined (4), handler type (4)
				b"hdlr" => audio_track = moov.content(&atom, 8).starts_with(b"soun"),
				b"minf" => {
					let stbl = moov.children(&atom, 0)?.into_iter().find(|a| &a.ident == b"stbl");
					if let Some(stbl) = stbl {
						audio.stsd = moov.children(&stbl, 0)?.into_iter().find(|a| &a.ident == b"stsd");
					}
				},
				_ => {},
			}
		}

		if audio_track {
			return Ok(Some(audio));
		}
	}

	Ok(None)
}

// `mdhd` and `mvhd` share the same layout up to the duration
fn read_duration(mut content: &[u8]) -> Result<Duration> {
	let version = content.read_u8()?;

	// Flags (3)
	content.read_uint::<BigEndian>(3)?;

	let (timescale, duration) = match version {
		1 => {
			// Creation time (8), modification time (8)
			content.read_u128::<BigEndian>()?;
			(
				content.read_u32::<BigEndian>()?,
				content.read_u64::<BigEndian>()?,
			)
		},
		_ => {
			// Creation time (4), modification time (4)
			content.read_u64::<BigEndian>()?;
			(
				content.read_u32::<BigEndian>()?,
				u64::from(content.read_u32::<BigEndian>()?),
			)
		},
	};

	if timescale == 0 {
		log::warn!("MP4: Timescale is 0, unable to calculate duration");
		return Ok(Duration::ZERO);
	}

	let secs = duration / u64::from(timescale);
	let nanos = (u128::from(duration % u64::from(timescale)) * 1_000_000_000) / u128::from(timescale);

	Ok(Duration::new(secs, nanos as u32))
}

fn read_stsd(moov: &Moov<'_>, stsd: &AtomInfo) -> Result<Option<SampleEntry>> {
	// Version (1), flags (3), entry count (4)
	for entry in moov.children(stsd, 8)? {
		let content = moov.content(&entry, 0);

		// Reserved (6), data reference index (2), version (2), revision level (2), vendor (4),
		// channels (2), sample size (2), compression ID (2), packet size (2), sample rate (4)
		if content.len() < 28 {
			continue;
		}

		// Later versions of the QuickTime sound sample description have extra fields
		let description_len = match BigEndian::read_u16(&content[8..10]) {
			1 => 44,
			2 => 64,
			_ => 28,
		};

		let mut sample_entry = SampleEntry {
			channels: BigEndian::read_u16(&content[16..18]) as u8,
			// 16.16 fixed point
			sample_rate: u32::from(BigEndian::read_u16(&content[24..26])),
			bitrate: 0,
		};

		let children = moov.children(&entry, description_len)?;
		match &entry.ident {
			b"mp4a" => {
				if let Some(esds) = children.iter().find(|atom| &atom.ident == b"esds") {
					read_esds(moov.content(esds, 0), &mut sample_entry);
				}
			},
			b"alac" => {
				if let Some(alac) = children.iter().find(|atom| &atom.ident == b"alac") {
					read_alac(moov.content(alac, 0), &mut sample_entry);
				}
			},
			_ => {
				log::warn!(
					"MP4: Found unsupported sample entry: {:?}",
					entry.ident.escape_ascii().to_string()
				);
				continue;
			},
		}

		// We only want to read the properties of the first stream
		// that we can actually recognize
		return Ok(Some(sample_entry));
	}

	Ok(None)
}

// An expandable size, 7 bits per byte
fn read_descriptor(content: &mut &[u8]) -> Option<(u8, usize)> {
	let tag = content.read_u8().ok()?;

	let mut size = 0_usize;
	for _ in 0..4 {
		let byte = content.read_u8().ok()?;
		size = (size << 7) | usize::from(byte & 0x7F);
		if byte & 0x80 == 0 {
			break;
		}
	}

	Some((tag, size))
}

// Anything malformed leaves the values from the sample entry in place
fn read_esds(content: &[u8], entry: &mut SampleEntry) {
	const ELEMENTARY_DESCRIPTOR_TAG: u8 = 0x03;
	const DECODER_CONFIG_TAG: u8 = 0x04;
	const DECODER_SPECIFIC_DESCRIPTOR_TAG: u8 = 0x05;

	// Version (1), flags (3)
	let Some(mut content) = content.get(4..) else {
		return;
	};

	let Some((ELEMENTARY_DESCRIPTOR_TAG, _)) = read_descriptor(&mut content) else {
		return;
	};

	// Elementary stream ID (2)
	let Some(&flags) = content.get(2) else {
		return;
	};
	content = &content[3..];

	// Stream dependence, URL and OCR stream flags
	let mut skip = 0;
	if flags & 0x80 != 0 {
		skip += 2;
	}
	if flags & 0x40 != 0 {
		skip += 1 + content.first().map_or(0, |len| usize::from(*len));
	}
	if flags & 0x20 != 0 {
		skip += 2;
	}

	let Some(rest) = content.get(skip..) else {
		return;
	};
	content = rest;

	let Some((DECODER_CONFIG_TAG, _)) = read_descriptor(&mut content) else {
		return;
	};

	// Object type (1), stream type (1), buffer size (3), max bitrate (4), average bitrate (4)
	if content.len() < 13 {
		return;
	}

	entry.bitrate = BigEndian::read_u32(&content[9..13]);
	content = &content[13..];

	let Some((DECODER_SPECIFIC_DESCRIPTOR_TAG, _)) = read_descriptor(&mut content) else {
		return;
	};

	// https://wiki.multimedia.cx/index.php?title=MPEG-4_Audio#Audio_Specific_Config
	//
	// 5 bits: object type
	// 4 bits: frequency index
	// if (frequency index == 15)
	//     24 bits: frequency
	// 4 bits: channel configuration
	let [byte_a, byte_b, ..] = *content else {
		return;
	};

	// Extended object types are rare, keep the sample entry values
	if byte_a >> 3 == 31 {
		return;
	}

	let frequency_index = ((byte_a & 0x07) << 1) | (byte_b >> 7);
	let channel_conf = match frequency_index {
		// The sample rate is stored in the next 24 bits
		0x0F => {
			let [_, _, byte_c, byte_d, byte_e, ..] = *content else {
				return;
			};

			let sample_rate = (u32::from(byte_b & 0x7F) << 17)
				| (u32::from(byte_c) << 9)
				| (u32::from(byte_d) << 1)
				| u32::from(byte_e >> 7);
			if sample_rate > 0 {
				entry.sample_rate = sample_rate;
			}

			(byte_e >> 3) & 0x0F
		},
		i => {
			if let Some(sample_rate) = SAMPLE_RATES.get(usize::from(i)) {
				entry.sample_rate = *sample_rate;
			}

			(byte_b >> 3) & 0x0F
		},
	};

	// The channel configuration isn't always set
	if channel_conf > 0 {
		entry.channels = channel_conf;
	}
}

fn read_alac(content: &[u8], entry: &mut SampleEntry) {
	// Version (4), samples per frame (4), compatible version (1), sample size (1),
	// rice history mult (1), rice initial history (1), rice parameter limit (1), channels (1),
	// max run (2), max frame size (4), average bitrate (4), sample rate (4)
	if content.len() < 28 {
		return;
	}

	entry.channels = content[13];
	entry.bitrate = BigEndian::read_u32(&content[20..24]);
	entry.sample_rate = BigEndian::read_u32(&content[24..28]);
}
