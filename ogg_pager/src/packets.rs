use crate::error::{PageError, Result};
use crate::header::PageHeader;

use std::io::{Read, Seek};

/// A container for packets in an OGG file
#[derive(Default, Clone, PartialEq, Eq, Debug)]
pub struct Packets {
	content: Vec<u8>,
	packet_sizes: Vec<usize>,
	pages: Vec<PageHeader>,
	trailing: usize,
}

impl Packets {
	/// Read a specific number of complete packets from a reader
	///
	/// Reading stops at the end of the page on which the last requested packet finishes,
	/// so the reader is always left on a page boundary. Any packet data following the
	/// requested packets on that page is skipped, see [`Packets::trailing_bytes`].
	///
	/// # Errors
	///
	/// * Unable to read the specified number of packets
	/// * A page is malformed
	pub fn read_count<R>(data: &mut R, count: usize) -> Result<Self>
	where
		R: Read + Seek,
	{
		let mut packets = Self::default();
		if count == 0 {
			return Ok(packets);
		}

		let mut current_packet = Vec::new();

		'pages: loop {
			let header = PageHeader::read(data)?;

			let mut page_content = vec![0; header.content_size()];
			data.read_exact(&mut page_content)?;

			let mut offset = 0;
			for (idx, &segment) in header.segments.iter().enumerate() {
				let segment = usize::from(segment);
				current_packet.extend_from_slice(&page_content[offset..offset + segment]);
				offset += segment;

				if segment == 255 {
					continue;
				}

				packets.packet_sizes.push(current_packet.len());
				packets.content.append(&mut current_packet);

				if packets.packet_sizes.len() == count {
					packets.trailing = header.segments[idx + 1..]
						.iter()
						.map(|&b| usize::from(b))
						.sum();
					packets.pages.push(header);
					break 'pages;
				}
			}

			packets.pages.push(header);
		}

		if packets.packet_sizes.len() != count {
			return Err(PageError::NotEnoughData);
		}

		Ok(packets)
	}

	/// The number of packets
	pub fn len(&self) -> usize {
		self.packet_sizes.len()
	}

	/// Whether there are no packets
	pub fn is_empty(&self) -> bool {
		self.packet_sizes.is_empty()
	}

	/// Gets the packet at a specified index
	pub fn get(&self, idx: usize) -> Option<&[u8]> {
		let size = *self.packet_sizes.get(idx)?;
		let start: usize = self.packet_sizes[..idx].iter().sum();

		Some(&self.content[start..start + size])
	}

	/// Returns an iterator over the packets
	pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
		(0..self.len()).filter_map(|idx| self.get(idx))
	}

	/// The headers of every page the packets were read from
	pub fn pages(&self) -> &[PageHeader] {
		&self.pages
	}

	/// The number of content bytes following the final packet on the last page read
	///
	/// A nonzero value means the last page also holds the start of another packet.
	pub fn trailing_bytes(&self) -> usize {
		self.trailing
	}
}

#[cfg(test)]
mod tests {
	use super::Packets;
	use crate::paginate;

	use std::io::Cursor;

	#[test]
	fn read_across_pages() {
		let small = vec![1_u8; 30];
		let large = vec![2_u8; 70_000];
		let last = vec![3_u8; 10];

		let pages = paginate([small.as_slice(), large.as_slice(), last.as_slice()], 42, 0, 0).unwrap();
		assert!(pages.len() > 1);

		let mut bytes = Vec::new();
		for page in &pages {
			bytes.extend(page.as_bytes());
		}

		let packets = Packets::read_count(&mut Cursor::new(&bytes), 3).unwrap();
		assert_eq!(packets.len(), 3);
		assert_eq!(packets.get(0).unwrap(), small.as_slice());
		assert_eq!(packets.get(1).unwrap(), large.as_slice());
		assert_eq!(packets.get(2).unwrap(), last.as_slice());
		assert_eq!(packets.pages().len(), pages.len());
		assert_eq!(packets.trailing_bytes(), 0);
	}

	#[test]
	fn not_enough_packets() {
		let pages = paginate([[0_u8; 4].as_slice()], 1, 0, 0).unwrap();
		let bytes = pages[0].as_bytes();

		assert!(Packets::read_count(&mut Cursor::new(bytes), 2).is_err());
	}
}
