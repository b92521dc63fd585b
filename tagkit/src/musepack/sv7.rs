use super::constants::{FREQUENCY_TABLE, MPC_DECODER_SYNTH_DELAY, MPC_FRAME_LENGTH};
use crate::error::Result;
use crate::macros::decode_err;

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

// http://trac.musepack.net/musepack/wiki/SV7Specification

/// The parts of an SV7 stream header needed for the audio properties
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(super) struct StreamHeader {
	pub(super) frame_count: u32,
	pub(super) sample_rate: u32,
	pub(super) true_gapless: bool,
	pub(super) last_frame_length: u16,
}

impl StreamHeader {
	/// Parses the header, starting at the version byte that follows `MP+`
	pub(super) fn parse<R>(reader: &mut R) -> Result<Self>
	where
		R: Read,
	{
		let version = reader.read_u8()? & 0x0F;
		if version != 7 {
			decode_err!(@BAIL Mpc, "Expected stream version 7");
		}

		// The SV7 header is split into 6 32-bit sections

		// -- Section 1 --
		let frame_count = reader.read_u32::<LittleEndian>()?;

		// -- Section 2 --
		//
		// Intensity stereo (1), mid side stereo (1), max band (6), profile (4), link (2),
		// sample frequency (2) and max level (16)
		let chunk = reader.read_u32::<LittleEndian>()?;
		let sample_freq_index = ((chunk >> 16) & 0x03) as usize;

		// -- Sections 3 & 4 --
		//
		// Title and album ReplayGain
		let mut replay_gain = [0; 8];
		reader.read_exact(&mut replay_gain)?;

		// -- Section 5 --
		let chunk = reader.read_u32::<LittleEndian>()?;

		let true_gapless = (chunk >> 31) == 1;
		let last_frame_length = if true_gapless {
			((chunk >> 20) & 0x7FF) as u16
		} else {
			0
		};

		// -- Section 6 --
		let _encoder_version = reader.read_u8()?;

		if u64::from(last_frame_length) > MPC_FRAME_LENGTH {
			decode_err!(@BAIL Mpc, "Invalid last frame length");
		}

		Ok(Self {
			frame_count,
			sample_rate: FREQUENCY_TABLE[sample_freq_index],
			true_gapless,
			last_frame_length,
		})
	}

	/// The number of decoded samples in the stream
	pub(super) fn total_samples(&self) -> u64 {
		let frame_samples = u64::from(self.frame_count) * MPC_FRAME_LENGTH;
		if self.true_gapless {
			frame_samples.saturating_sub(MPC_FRAME_LENGTH - u64::from(self.last_frame_length))
		} else {
			frame_samples.saturating_sub(MPC_DECODER_SYNTH_DELAY)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::StreamHeader;

	fn header(frame_count: u32, gapless_last_frame: Option<u16>) -> Vec<u8> {
		let mut header = vec![0x07];
		header.extend(frame_count.to_le_bytes());
		// Profile "Standard", 44.1 kHz
		header.extend(0x00A0_0000_u32.to_le_bytes());
		header.extend([0; 8]);

		let section5 = match gapless_last_frame {
			Some(len) => (1_u32 << 31) | (u32::from(len) << 20),
			None => 0,
		};
		header.extend(section5.to_le_bytes());
		header.push(116);
		header
	}

	#[test_log::test]
	fn gapless() {
		let parsed = StreamHeader::parse(&mut &header(1225, Some(1152))[..]).unwrap();
		assert_eq!(parsed.sample_rate, 44100);
		assert_eq!(parsed.total_samples(), 1225 * 1152);
	}

	#[test_log::test]
	fn synth_delay() {
		let parsed = StreamHeader::parse(&mut &header(10, None)[..]).unwrap();
		assert_eq!(parsed.total_samples(), 10 * 1152 - 481);
	}

	#[test_log::test]
	fn wrong_version() {
		let mut data = header(10, None);
		data[0] = 0x06;
		assert!(StreamHeader::parse(&mut &data[..]).is_err());
	}
}
