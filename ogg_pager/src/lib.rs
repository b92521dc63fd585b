//! A simple OGG page reader and writer

mod crc;
mod error;
mod header;
mod packets;
mod paginate;

use std::io::{Read, Seek};

pub use crc::crc32;
pub use error::{PageError, Result};
pub use header::{PAGE_HEADER_SIZE, PageHeader};
pub use packets::Packets;
pub use paginate::paginate;

/// The page's first packet is a continuation of the previous page's last packet
pub const CONTINUED_PACKET: u8 = 0x01;
/// The page is the first page of the logical bitstream
pub const CONTAINS_FIRST_PAGE_OF_BITSTREAM: u8 = 0x02;
/// The page is the last page of the logical bitstream
pub const CONTAINS_LAST_PAGE_OF_BITSTREAM: u8 = 0x04;

/// The maximum page content size
pub const MAX_CONTENT_SIZE: usize = 65025;
/// The maximum number of segments a page can contain
pub const MAX_SEGMENT_COUNT: usize = 255;

/// An OGG page
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Page {
	content: Vec<u8>,
	header: PageHeader,
	end: u64,
}

impl Page {
	/// Read a full page from a reader
	///
	/// # Errors
	///
	/// * [`std::io::Error`]
	/// * See [`PageHeader::read`]
	pub fn read<R>(data: &mut R) -> Result<Self>
	where
		R: Read + Seek,
	{
		let header = PageHeader::read(data)?;

		let mut content = vec![0; header.content_size()];
		data.read_exact(&mut content)?;

		let end = data.stream_position()?;

		Ok(Self {
			content,
			header,
			end,
		})
	}

	/// Returns the page's header
	pub fn header(&self) -> &PageHeader {
		&self.header
	}

	/// Returns a mutable reference to the page's header
	///
	/// NOTE: [`Page::gen_crc`] must be called after any changes
	pub fn header_mut(&mut self) -> &mut PageHeader {
		&mut self.header
	}

	/// Returns the page's content
	pub fn content(&self) -> &[u8] {
		&self.content
	}

	/// Consumes the page and returns its content
	pub fn take_content(self) -> Vec<u8> {
		self.content
	}

	/// The position in the stream the page ended
	pub fn end(&self) -> u64 {
		self.end
	}

	/// Convert the page to bytes for writing
	///
	/// NOTE: This will write the checksum as is. It is likely [`Page::gen_crc`] will have
	/// to be used prior.
	pub fn as_bytes(&self) -> Vec<u8> {
		let mut bytes = Vec::with_capacity(self.header.size() + self.content.len());

		bytes.extend(b"OggS");
		bytes.push(0); // Version
		bytes.push(self.header.header_type_flag);
		bytes.extend(self.header.abgp.to_le_bytes());
		bytes.extend(self.header.stream_serial.to_le_bytes());
		bytes.extend(self.header.sequence_number.to_le_bytes());
		bytes.extend(self.header.checksum.to_le_bytes());
		bytes.push(self.header.segments.len() as u8);
		bytes.extend(&self.header.segments);
		bytes.extend(&self.content);

		bytes
	}

	/// Generates the CRC checksum of the page
	pub fn gen_crc(&mut self) {
		self.header.checksum = 0;
		self.header.checksum = crc::crc32(&self.as_bytes());
	}
}
