use super::synchsafe::SynchsafeInteger;
use crate::error::{ErrorKind, Result, TagkitError};
use crate::macros::err;

use byteorder::{BigEndian, ByteOrder};

pub(crate) const HEADER_SIZE: usize = 10;

/// The ID3v2 version
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub(crate) enum Id3v2Version {
	/// ID3v2.2
	V2,
	/// ID3v2.3
	V3,
	/// ID3v2.4
	V4,
}

impl Id3v2Version {
	pub(crate) fn from_major(major: u8) -> Option<Self> {
		match major {
			2 => Some(Self::V2),
			3 => Some(Self::V3),
			4 => Some(Self::V4),
			_ => None,
		}
	}

	pub(crate) fn major(self) -> u8 {
		match self {
			Self::V2 => 2,
			Self::V3 => 3,
			Self::V4 => 4,
		}
	}
}

/// Flags that apply to the entire tag
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Id3v2TagFlags {
	/// Whether all frames are unsynchronised
	pub(crate) unsynchronisation: bool,
	pub(crate) extended_header: bool,
	pub(crate) experimental: bool,
	/// A 10 byte footer follows the tag (ID3v2.4 only)
	pub(crate) footer: bool,
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Id3v2Header {
	pub(crate) version: Id3v2Version,
	pub(crate) flags: Id3v2TagFlags,
	/// The size of the tag contents (**DOES NOT INCLUDE THE HEADER/FOOTER**)
	pub(crate) size: u32,
}

impl Id3v2Header {
	pub(crate) fn parse(header: &[u8]) -> Result<Self> {
		if header.len() < HEADER_SIZE || &header[..3] != b"ID3" {
			err!(Id3v2("Missing the \"ID3\" marker"));
		}

		// Version is stored as [major, minor], we don't care about minor revisions
		let Some(version) = Id3v2Version::from_major(header[3]) else {
			log::debug!("ID3v2: Unsupported version 2.{}.{}", header[3], header[4]);
			err!(Id3v2("Unsupported version"));
		};

		let flags = header[5];
		let flags_parsed = Id3v2TagFlags {
			unsynchronisation: flags & 0x80 == 0x80,
			// In ID3v2.2, this bit marks the (never defined) compression scheme instead
			extended_header: version != Id3v2Version::V2 && flags & 0x40 == 0x40,
			experimental: version != Id3v2Version::V2 && flags & 0x20 == 0x20,
			footer: version == Id3v2Version::V4 && flags & 0x10 == 0x10,
		};

		let size_bytes = BigEndian::read_u32(&header[6..10]);
		if size_bytes & 0x8080_8080 != 0 {
			return Err(TagkitError::new(ErrorKind::Id3v2("Tag size is not synchsafe")));
		}

		Ok(Id3v2Header {
			version,
			flags: flags_parsed,
			size: size_bytes.unsynch(),
		})
	}

	/// Whether this is an ID3v2.2 tag using compression, which was never defined
	pub(crate) fn is_v2_compressed(header: &[u8]) -> bool {
		header[3] == 2 && header[5] & 0x40 == 0x40
	}

	/// The total size of the tag, including the header and footer
	pub(crate) fn full_tag_size(&self) -> u64 {
		u64::from(self.size) + HEADER_SIZE as u64 + if self.flags.footer { 10 } else { 0 }
	}
}

/// Encode a tag header for a tag with `size` bytes of content
pub(crate) fn encode_header(version: Id3v2Version, size: u32) -> Result<[u8; HEADER_SIZE]> {
	let mut header = [0; HEADER_SIZE];
	header[..3].copy_from_slice(b"ID3");
	header[3] = version.major();
	header[4] = 0;
	header[5] = 0;
	header[6..].copy_from_slice(&size.synch()?.to_be_bytes());

	Ok(header)
}
