use crate::error::{PageError, Result};

use std::io::{Read, Seek};

use byteorder::{LittleEndian, ReadBytesExt};

/// The size of a page header, excluding the segment table
pub const PAGE_HEADER_SIZE: usize = 27;

/// An OGG page header
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PageHeader {
	/// The position in the stream the page started at
	pub start: u64,
	pub(crate) header_type_flag: u8,
	/// The page's absolute granule position
	pub abgp: u64,
	/// The page's stream serial number
	pub stream_serial: u32,
	/// The page's sequence number
	pub sequence_number: u32,
	pub(crate) segments: Vec<u8>,
	pub(crate) checksum: u32,
}

impl PageHeader {
	/// Create a new `PageHeader` with an empty segment table
	pub fn new(header_type_flag: u8, abgp: u64, stream_serial: u32, sequence_number: u32) -> Self {
		Self {
			start: 0,
			header_type_flag,
			abgp,
			stream_serial,
			sequence_number,
			segments: Vec::new(),
			checksum: 0,
		}
	}

	/// Read a page header, leaving the reader at the start of the page content
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	/// * The page is missing its magic signature, has a nonzero version, or an empty segment table
	pub fn read<R>(data: &mut R) -> Result<Self>
	where
		R: Read + Seek,
	{
		let start = data.stream_position()?;

		let mut sig = [0; 4];
		data.read_exact(&mut sig)?;

		if &sig != b"OggS" {
			return Err(PageError::MissingMagic);
		}

		// Version, always 0
		let version = data.read_u8()?;
		if version != 0 {
			return Err(PageError::InvalidVersion);
		}

		let header_type_flag = data.read_u8()?;

		let abgp = data.read_u64::<LittleEndian>()?;
		let stream_serial = data.read_u32::<LittleEndian>()?;
		let sequence_number = data.read_u32::<LittleEndian>()?;
		let checksum = data.read_u32::<LittleEndian>()?;

		let segment_count = data.read_u8()?;
		if segment_count < 1 {
			return Err(PageError::BadSegmentCount);
		}

		let mut segments = vec![0; segment_count as usize];
		data.read_exact(&mut segments)?;

		Ok(Self {
			start,
			header_type_flag,
			abgp,
			stream_serial,
			sequence_number,
			segments,
			checksum,
		})
	}

	/// Returns the page's header type flag
	pub fn header_type_flag(&self) -> u8 {
		self.header_type_flag
	}

	/// Returns the page's checksum, as read or last generated
	pub fn checksum(&self) -> u32 {
		self.checksum
	}

	/// Returns the page's segment table
	pub fn segments(&self) -> &[u8] {
		&self.segments
	}

	/// The size of the page content described by the segment table
	pub fn content_size(&self) -> usize {
		self.segments.iter().map(|&b| usize::from(b)).sum()
	}

	/// The size of the header, including the segment table
	pub fn size(&self) -> usize {
		PAGE_HEADER_SIZE + self.segments.len()
	}

	/// Whether the last packet on this page continues onto the next page
	pub fn ends_mid_packet(&self) -> bool {
		self.segments.last().is_some_and(|&last| last == 255)
	}
}
