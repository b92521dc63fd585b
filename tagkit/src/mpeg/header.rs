use super::constants::{BITRATES, PADDING_SIZES, SAMPLE_RATES, SAMPLES, SIDE_INFORMATION_SIZES};

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};

pub(crate) fn verify_frame_sync(frame_sync: [u8; 2]) -> bool {
	frame_sync[0] == 0xFF && frame_sync[1] >> 5 == 0b111
}

// Used to compare the versions, layers, and sample rates of two frame headers.
// If they aren't equal, something is broken.
pub(super) const HEADER_MASK: u32 = 0xFFFE_0C00;

/// MPEG Audio version
#[derive(Default, PartialEq, Eq, Copy, Clone, Debug)]
pub(crate) enum MpegVersion {
	#[default]
	V1,
	V2,
	V2_5,
}

/// MPEG layer
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Layer {
	Layer1 = 1,
	Layer2 = 2,
	#[default]
	Layer3 = 3,
}

#[derive(Default, Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum ChannelMode {
	#[default]
	Stereo = 0,
	JointStereo = 1,
	/// Two independent mono channels
	DualChannel = 2,
	SingleChannel = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Header {
	pub(crate) sample_rate: u32,
	pub(crate) len: u32,
	pub(crate) data_start: u32,
	pub(crate) samples: u16,
	pub(crate) bitrate: u32,
	pub(crate) version: MpegVersion,
	pub(crate) layer: Layer,
	pub(crate) channel_mode: ChannelMode,
}

impl Header {
	/// Parses a frame header, returning `None` if any of its fields are invalid
	pub(crate) fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
		if !verify_frame_sync([bytes[0], bytes[1]]) {
			return None;
		}

		Self::read(u32::from_be_bytes(bytes))
	}

	fn read(data: u32) -> Option<Self> {
		let version = match (data >> 19) & 0b11 {
			0b00 => MpegVersion::V2_5,
			0b10 => MpegVersion::V2,
			0b11 => MpegVersion::V1,
			_ => return None,
		};

		let version_index = if version == MpegVersion::V1 { 0 } else { 1 };

		let layer = match (data >> 17) & 0b11 {
			0b01 => Layer::Layer3,
			0b10 => Layer::Layer2,
			0b11 => Layer::Layer1,
			_ => {
				log::debug!("MPEG: Frame header uses a reserved layer");
				return None;
			},
		};

		let layer_index = (layer as usize).saturating_sub(1);

		// Free format streams are not supported
		let bitrate = BITRATES[version_index][layer_index][((data >> 12) & 0xF) as usize];
		if bitrate == 0 {
			return None;
		}

		let sample_rate = match (data >> 10) & 0b11 {
			0b11 => return None,
			sample_rate_index => SAMPLE_RATES[version as usize][sample_rate_index as usize],
		};

		let padding = if (data >> 9) & 1 == 1 {
			u32::from(PADDING_SIZES[layer_index])
		} else {
			0
		};

		let channel_mode = match (data >> 6) & 0b11 {
			0b00 => ChannelMode::Stereo,
			0b01 => ChannelMode::JointStereo,
			0b10 => ChannelMode::DualChannel,
			_ => ChannelMode::SingleChannel,
		};

		let samples = SAMPLES[layer_index][version_index];
		Some(Header {
			sample_rate,
			len: (u32::from(samples) * bitrate * 125 / sample_rate) + padding,
			data_start: SIDE_INFORMATION_SIZES[version_index][channel_mode as usize] + 4,
			samples,
			bitrate,
			version,
			layer,
			channel_mode,
		})
	}

	pub(crate) fn channels(&self) -> u8 {
		if self.channel_mode == ChannelMode::SingleChannel {
			1
		} else {
			2
		}
	}
}

/// Searches `buf` for the first valid frame header
///
/// When the frame following a candidate is within `buf`, its header has to agree with the
/// candidate, otherwise the candidate is assumed to be a false sync.
pub(crate) fn find_frame_in(buf: &[u8]) -> Option<(usize, Header)> {
	for (offset, window) in buf.windows(4).enumerate() {
		if window[0] != 0xFF {
			continue;
		}

		let bytes = [window[0], window[1], window[2], window[3]];
		let Some(header) = Header::from_bytes(bytes) else {
			continue;
		};

		let next = offset + header.len as usize;
		if let Some(next_bytes) = buf.get(next..next + 4) {
			let first = u32::from_be_bytes(bytes);
			if BigEndian::read_u32(next_bytes) & HEADER_MASK != first & HEADER_MASK {
				log::trace!("MPEG: Skipping false frame sync at {}", offset);
				continue;
			}
		}

		return Some((offset, header));
	}

	None
}

/// Searches the reader for the first valid frame header, consuming it
///
/// Returns the offset of the frame, relative to the reader's starting position.
pub(crate) fn find_frame<R>(reader: &mut R) -> std::io::Result<Option<(u64, Header)>>
where
	R: Read,
{
	let mut buf = Vec::new();
	reader.read_to_end(&mut buf)?;

	Ok(find_frame_in(&buf).map(|(offset, header)| (offset as u64, header)))
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum VbrHeaderType {
	Xing,
	Info,
	Vbri,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) struct VbrHeader {
	pub(super) ty: VbrHeaderType,
	pub(super) frames: u32,
	/// The stream size, or 0 if unknown
	pub(super) size: u32,
}

impl VbrHeader {
	// Xing/Info headers start right after the side information, VBRI headers are always 32 bytes in
	pub(super) fn read(frame: &[u8], header: &Header) -> Option<Self> {
		Self::read_xing(frame.get(header.data_start as usize..)?)
			.or_else(|| Self::read_vbri(frame.get(36..)?))
	}

	fn read_xing(data: &[u8]) -> Option<Self> {
		let ty = match data.get(..4)? {
			b"Xing" => VbrHeaderType::Xing,
			b"Info" => VbrHeaderType::Info,
			_ => return None,
		};

		let flags = BigEndian::read_u32(data.get(4..8)?);
		if flags & 0x01 == 0 {
			log::debug!("MPEG: Xing header doesn't store the frame count");
			return None;
		}

		let frames = BigEndian::read_u32(data.get(8..12)?);
		let size = if flags & 0x02 == 0x02 {
			BigEndian::read_u32(data.get(12..16)?)
		} else {
			0
		};

		Some(Self { ty, frames, size })
	}

	fn read_vbri(data: &[u8]) -> Option<Self> {
		if data.get(..4)? != b"VBRI" {
			return None;
		}

		// Version ID (2), delay (2), quality indicator (2)
		let size = BigEndian::read_u32(data.get(10..14)?);
		let frames = BigEndian::read_u32(data.get(14..18)?);

		Some(Self {
			ty: VbrHeaderType::Vbri,
			frames,
			size,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::{ChannelMode, Header, Layer, MpegVersion, VbrHeader, VbrHeaderType, find_frame_in};

	#[test_log::test]
	fn parse_header() {
		let header = Header::from_bytes([0xFF, 0xFB, 0x90, 0x64]).unwrap();
		assert_eq!(header.version, MpegVersion::V1);
		assert_eq!(header.layer, Layer::Layer3);
		assert_eq!(header.bitrate, 128);
		assert_eq!(header.sample_rate, 44100);
		assert_eq!(header.channel_mode, ChannelMode::JointStereo);
		assert_eq!(header.len, 417);
		assert_eq!(header.data_start, 36);
		assert_eq!(header.channels(), 2);

		// Padded, mono MPEG-2
		let header = Header::from_bytes([0xFF, 0xF3, 0x82, 0xC4]).unwrap();
		assert_eq!(header.version, MpegVersion::V2);
		assert_eq!(header.sample_rate, 22050);
		assert_eq!(header.samples, 576);
		assert_eq!(header.channels(), 1);
		assert_eq!(header.data_start, 13);
	}

	#[test_log::test]
	fn invalid_headers() {
		// No sync
		assert!(Header::from_bytes([0xFF, 0x1B, 0x90, 0x64]).is_none());
		// Reserved version
		assert!(Header::from_bytes([0xFF, 0xEB, 0x90, 0x64]).is_none());
		// Reserved layer
		assert!(Header::from_bytes([0xFF, 0xF9, 0x90, 0x64]).is_none());
		// Bad bitrate
		assert!(Header::from_bytes([0xFF, 0xFB, 0xF0, 0x64]).is_none());
		// Reserved sample rate
		assert!(Header::from_bytes([0xFF, 0xFB, 0x9C, 0x64]).is_none());
		assert!(Header::from_bytes([0xFF, 0xFF, 0xFF, 0xFF]).is_none());
	}

	#[test_log::test]
	fn false_sync_is_skipped() {
		let mut data = vec![0xFF, 0xFB, 0x90, 0x64, 0x00];
		let real_start = data.len();

		for _ in 0..2 {
			let mut frame = vec![0; 417];
			frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0x64]);
			data.extend(frame);
		}

		let (offset, _) = find_frame_in(&data).unwrap();
		assert_eq!(offset, real_start);
	}

	#[test_log::test]
	fn xing_header() {
		let header = Header::from_bytes([0xFF, 0xFB, 0x90, 0x64]).unwrap();

		let mut frame = vec![0; 417];
		frame[36..40].copy_from_slice(b"Info");
		frame[40..44].copy_from_slice(&3_u32.to_be_bytes());
		frame[44..48].copy_from_slice(&100_u32.to_be_bytes());
		frame[48..52].copy_from_slice(&41_700_u32.to_be_bytes());

		let vbr = VbrHeader::read(&frame, &header).unwrap();
		assert_eq!(vbr.ty, VbrHeaderType::Info);
		assert_eq!(vbr.frames, 100);
		assert_eq!(vbr.size, 41_700);

		// Missing the frame count
		frame[40..44].copy_from_slice(&2_u32.to_be_bytes());
		assert!(VbrHeader::read(&frame, &header).is_none());
	}

	#[test_log::test]
	fn vbri_header() {
		// Mono MPEG-1, so a Xing header would be at 21
		let header = Header::from_bytes([0xFF, 0xFB, 0x90, 0xC4]).unwrap();
		assert_eq!(header.data_start, 21);

		let mut frame = vec![0; 417];
		frame[36..40].copy_from_slice(b"VBRI");
		frame[46..50].copy_from_slice(&50_000_u32.to_be_bytes());
		frame[50..54].copy_from_slice(&120_u32.to_be_bytes());

		let vbr = VbrHeader::read(&frame, &header).unwrap();
		assert_eq!(vbr.ty, VbrHeaderType::Vbri);
		assert_eq!(vbr.frames, 120);
		assert_eq!(vbr.size, 50_000);
	}
}
