use std::fmt::{self, Debug, Formatter};

/// A GUID, in its on-disk (mixed endian) byte order
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) struct Guid(pub(crate) [u8; 16]);

impl Guid {
	/// Builds a GUID from its textual form, `data1-data2-data3-data4`
	const fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
		let a = data1.to_le_bytes();
		let b = data2.to_le_bytes();
		let c = data3.to_le_bytes();

		Self([
			a[0], a[1], a[2], a[3], b[0], b[1], c[0], c[1], data4[0], data4[1], data4[2], data4[3],
			data4[4], data4[5], data4[6], data4[7],
		])
	}
}

impl Debug for Guid {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		let b = &self.0;
		f.debug_tuple("Guid")
			.field(&format_args!(
				"{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
				u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
				u16::from_le_bytes([b[4], b[5]]),
				u16::from_le_bytes([b[6], b[7]]),
				b[8],
				b[9],
				b[10],
				b[11],
				b[12],
				b[13],
				b[14],
				b[15]
			))
			.finish()
	}
}

pub(crate) const HEADER_OBJECT_GUID: Guid = Guid::new(
	0x75B2_2630,
	0x668E,
	0x11CF,
	[0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C],
);
pub(super) const DATA_OBJECT_GUID: Guid = Guid::new(
	0x75B2_2636,
	0x668E,
	0x11CF,
	[0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C],
);
pub(super) const FILE_PROPERTIES_GUID: Guid = Guid::new(
	0x8CAB_DCA1,
	0xA947,
	0x11CF,
	[0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65],
);
pub(super) const STREAM_PROPERTIES_GUID: Guid = Guid::new(
	0xB7DC_0791,
	0xA9B7,
	0x11CF,
	[0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65],
);
pub(super) const CONTENT_DESCRIPTION_GUID: Guid = Guid::new(
	0x75B2_2633,
	0x668E,
	0x11CF,
	[0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C],
);
pub(super) const EXTENDED_CONTENT_DESCRIPTION_GUID: Guid = Guid::new(
	0xD2D0_A440,
	0xE307,
	0x11D2,
	[0x97, 0xF0, 0x00, 0xA0, 0xC9, 0x5E, 0xA8, 0x50],
);
pub(super) const PADDING_GUID: Guid = Guid::new(
	0x1806_D474,
	0xCADF,
	0x4509,
	[0xA4, 0xBA, 0x9A, 0xAB, 0xCB, 0x96, 0xAA, 0xE8],
);
pub(super) const AUDIO_MEDIA_GUID: Guid = Guid::new(
	0xF869_9E40,
	0x5B4D,
	0x11CF,
	[0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B],
);

/// GUID (16), size (8)
pub(super) const OBJECT_HEADER_SIZE: u64 = 24;

/// Object header (24), number of header objects (4), reserved (2)
pub(super) const HEADER_OBJECT_PREFIX_SIZE: u64 = 30;

/// The five fixed fields of the Content Description Object
pub(super) const CONTENT_DESCRIPTION_NAMES: [&str; 5] =
	["Title", "Author", "Copyright", "Description", "Rating"];

// Extended content descriptor value types
pub(super) const TYPE_UNICODE: u16 = 0;
pub(super) const TYPE_BYTES: u16 = 1;
pub(super) const TYPE_BOOL: u16 = 2;
pub(super) const TYPE_DWORD: u16 = 3;
pub(super) const TYPE_QWORD: u16 = 4;
pub(super) const TYPE_WORD: u16 = 5;
