use super::constants::FREQUENCY_TABLE;
use crate::error::Result;
use crate::macros::{decode_err, err};

use std::io::Read;

use byteorder::{BigEndian, ReadBytesExt};

const STREAM_HEADER_KEY: [u8; 2] = *b"SH";
const STREAM_END_KEY: [u8; 2] = *b"SE";

/// Walks the packets of an SV8 stream
pub(super) struct PacketReader<R> {
	reader: R,
	capacity: u64,
}

impl<R: Read> PacketReader<R> {
	pub(super) fn new(reader: R) -> Self {
		Self {
			reader,
			capacity: 0,
		}
	}

	/// Move the reader to the next packet, returning the next packet key and size
	pub(super) fn next(&mut self) -> Result<([u8; 2], u64)> {
		// Discard the rest of the current packet
		std::io::copy(
			&mut self.reader.by_ref().take(self.capacity),
			&mut std::io::sink(),
		)?;

		// Packet format:
		//
		// Field 	| Size (bits)     | Value
		// Key 	    | 16              | "EX"
		// Size 	| n*8; 0 < n < 10 |	0x1A
		// Payload 	| Size * 8        | "example"

		let mut key = [0; 2];
		self.reader.read_exact(&mut key)?;

		if !key[0].is_ascii_uppercase() || !key[1].is_ascii_uppercase() {
			decode_err!(@BAIL Mpc, "Packet has an invalid key");
		}

		let (packet_size, packet_size_byte_count) = read_size(&mut self.reader)?;

		// The packet size contains the key (2) and the size (?, variable length <= 9)
		self.capacity = packet_size.saturating_sub(u64::from(2 + packet_size_byte_count));

		Ok((key, self.capacity))
	}
}

impl<R: Read> Read for PacketReader<R> {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		let bytes_read = self.reader.by_ref().take(self.capacity).read(buf)?;
		self.capacity = self.capacity.saturating_sub(bytes_read as u64);
		Ok(bytes_read)
	}
}

/// Read a variable-length size, returning the size and the number of bytes it took
fn read_size<R: Read>(reader: &mut R) -> Result<(u64, u8)> {
	let mut size = 0_u64;

	// bits, big-endian
	// 0xxx xxxx                                           - value 0 to  2^7-1
	// 1xxx xxxx  0xxx xxxx                                - value 0 to 2^14-1
	// 1xxx xxxx  1xxx xxxx  0xxx xxxx                     - value 0 to 2^21-1
	// 1xxx xxxx  1xxx xxxx  1xxx xxxx  0xxx xxxx          - value 0 to 2^28-1
	// ...

	let mut bytes_read = 0;
	loop {
		let current = reader.read_u8()?;
		bytes_read += 1;

		// Sizes cannot go above 9 bytes
		if bytes_read > 9 {
			err!(TooMuchData);
		}

		size = (size << 7) | u64::from(current & 0x7F);
		if current & 0x80 == 0 {
			break;
		}
	}

	Ok((size, bytes_read))
}

/// The parts of a Stream Header packet needed for the audio properties
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(super) struct StreamHeader {
	/// Number of samples in the stream. 0 = unknown
	pub(super) sample_count: u64,
	/// Number of samples to skip at the beginning of the stream
	pub(super) beginning_silence: u64,
	pub(super) sample_rate: u32,
	pub(super) channels: u8,
}

impl StreamHeader {
	fn parse<R: Read>(reader: &mut PacketReader<R>) -> Result<Self> {
		// StreamHeader format:
		//
		// Field              | Size (bits)     | Value | Comment
		// CRC                | 32              |       | CRC 32 of the block (this field excluded). 0 = invalid
		// Stream version     | 8               | 8     | Bitstream version
		// Sample count       | n*8; 0 < n < 10 |       | Number of samples in the stream. 0 = unknown
		// Beginning silence  | n*8; 0 < n < 10 |       | Number of samples to skip at the beginning of the stream
		// Sample frequency   | 3               | 0..7  | See table below
		// Max used bands     | 5               | 1..32 | Maximum number of bands used in the file
		// Channel count      | 4               | 1..16 | Number of channels in the stream
		// MS used            | 1               |       | True if Mid Side Stereo is enabled
		// Audio block frames | 3               | 0..7  | Number of frames per audio packet (4value=(1..16384))

		let _crc = reader.read_u32::<BigEndian>()?;
		let _stream_version = reader.read_u8()?;
		let (sample_count, _) = read_size(reader)?;
		let (beginning_silence, _) = read_size(reader)?;

		let sample_rate_and_bands = reader.read_u8()?;
		let sample_rate = FREQUENCY_TABLE[usize::from(sample_rate_and_bands >> 5)];

		let channels_and_flags = reader.read_u8()?;
		let channels = (channels_and_flags >> 4) + 1;

		Ok(Self {
			sample_count,
			beginning_silence,
			sample_rate,
			channels,
		})
	}

	/// Searches for the Stream Header packet, which comes before any audio
	///
	/// The reader is expected to be positioned right after `MPCK`.
	pub(super) fn find<R: Read>(reader: R) -> Result<Option<Self>> {
		let mut packet_reader = PacketReader::new(reader);

		while let Ok((key, _)) = packet_reader.next() {
			match key {
				STREAM_HEADER_KEY => return Self::parse(&mut packet_reader).map(Some),
				STREAM_END_KEY => break,
				_ => {},
			}
		}

		Ok(None)
	}
}
