use crate::error::{PageError, Result};
use crate::header::PageHeader;
use crate::{
	CONTAINS_FIRST_PAGE_OF_BITSTREAM, CONTAINS_LAST_PAGE_OF_BITSTREAM, CONTINUED_PACKET,
	MAX_SEGMENT_COUNT, Page,
};

struct PaginateContext {
	pages: Vec<Page>,
	abgp: u64,
	stream_serial: u32,
	flags: u8,
	segments: Vec<u8>,
	content: Vec<u8>,
	packet_ended: bool,
	continued: bool,
}

impl PaginateContext {
	fn push_segment(&mut self, segment: &[u8]) {
		if self.segments.len() == MAX_SEGMENT_COUNT {
			self.flush_page();
		}

		self.segments.push(segment.len() as u8);
		self.content.extend_from_slice(segment);

		if segment.len() < 255 {
			self.packet_ended = true;
		}
	}

	fn flush_page(&mut self) {
		if self.segments.is_empty() {
			return;
		}

		let mut header_type_flag = 0;
		if self.continued {
			header_type_flag |= CONTINUED_PACKET;
		}

		if self.pages.is_empty() && self.flags & CONTAINS_FIRST_PAGE_OF_BITSTREAM != 0 {
			header_type_flag |= CONTAINS_FIRST_PAGE_OF_BITSTREAM;
		}

		// -1 in two's complement indicates that no packets finish on this page
		let abgp = if self.packet_ended {
			self.abgp
		} else {
			u64::MAX
		};

		let mut header = PageHeader::new(
			header_type_flag,
			abgp,
			self.stream_serial,
			self.pages.len() as u32,
		);

		self.continued = self.segments.last().is_some_and(|&last| last == 255);
		header.segments = std::mem::take(&mut self.segments);

		let content = std::mem::take(&mut self.content);
		let end = (header.size() + content.len()) as u64;

		self.pages.push(Page {
			content,
			header,
			end,
		});
		self.packet_ended = false;
	}
}

/// Create pages from a list of packets
///
/// Every packet starts on the page following the end of the previous one, sharing pages
/// where possible. The final page always ends on a packet boundary. Sequence numbers start at
/// 0 and checksums are generated, so the caller only needs to adjust sequence numbers
/// (and regenerate the checksums) when the pages do not start a stream.
///
/// # Errors
///
/// No packets are provided
pub fn paginate<'a, I>(packets: I, stream_serial: u32, abgp: u64, flags: u8) -> Result<Vec<Page>>
where
	I: IntoIterator<Item = &'a [u8]>,
{
	let mut ctx = PaginateContext {
		pages: Vec::new(),
		abgp,
		stream_serial,
		flags,
		segments: Vec::with_capacity(MAX_SEGMENT_COUNT),
		content: Vec::new(),
		packet_ended: false,
		continued: false,
	};

	let mut packet_count = 0;
	for packet in packets {
		packet_count += 1;

		let mut chunks = packet.chunks_exact(255);
		for chunk in chunks.by_ref() {
			ctx.push_segment(chunk);
		}

		// A packet always ends with a segment of less than 255 bytes, even if it's empty
		ctx.push_segment(chunks.remainder());
	}

	if packet_count == 0 {
		return Err(PageError::NotEnoughData);
	}

	ctx.flush_page();

	if flags & CONTAINS_LAST_PAGE_OF_BITSTREAM != 0 {
		if let Some(last) = ctx.pages.last_mut() {
			last.header.header_type_flag |= CONTAINS_LAST_PAGE_OF_BITSTREAM;
		}
	}

	for page in &mut ctx.pages {
		page.gen_crc();
	}

	Ok(ctx.pages)
}

#[cfg(test)]
mod tests {
	use crate::{CONTINUED_PACKET, paginate};

	#[test]
	fn paginate_large() {
		let packet = vec![0_u8; 200_000];

		let pages = paginate([packet.as_slice()], 1234, 0, 0).unwrap();
		let len = pages.len();

		// 200000 / 255 = 784 full segments + 1 final segment, 255 segments per page
		assert_eq!(len, 4);

		for (i, page) in pages.iter().enumerate() {
			let header = page.header();
			assert_eq!(header.stream_serial, 1234);
			assert_eq!(header.sequence_number, i as u32);

			if i + 1 == len {
				assert_eq!(header.abgp, 0);
				assert_eq!(*header.segments().last().unwrap() as usize, 200_000 % 255);
			} else {
				assert_eq!(header.abgp, u64::MAX);
				assert_eq!(header.segments().len(), 255);
			}

			if i == 0 {
				assert_eq!(header.header_type_flag(), 0);
			} else {
				assert_eq!(header.header_type_flag(), CONTINUED_PACKET);
			}
		}

		let total: usize = pages.iter().map(|p| p.content().len()).sum();
		assert_eq!(total, 200_000);
	}

	#[test]
	fn packets_share_pages() {
		let pages = paginate([[1_u8; 10].as_slice(), [2_u8; 20].as_slice()], 1, 0, 0).unwrap();

		assert_eq!(pages.len(), 1);
		assert_eq!(pages[0].header().segments(), &[10, 20]);
	}

	#[test]
	fn exact_multiple_of_255() {
		let pages = paginate([[0_u8; 510].as_slice()], 1, 0, 0).unwrap();

		assert_eq!(pages.len(), 1);
		assert_eq!(pages[0].header().segments(), &[255, 255, 0]);
	}
}
