//! Utilities for working with unsynchronised ID3v2 content
//!
//! Unsynchronisation keeps MPEG decoders from mistaking tag data for a frame sync: every
//! `0xFF` that is followed by a byte with its upper 3 bits set (or a `0x00`) gets a `0x00`
//! inserted after it. Sizes are stored as synchsafe integers, with only 7 bits per byte used.

use crate::error::Result;
use crate::macros::err;

/// An integer that can be converted to and from a synchsafe variant
pub(crate) trait SynchsafeInteger: Sized {
	/// Create a synchsafe integer
	///
	/// # Errors
	///
	/// `self` doesn't fit in 28 bits
	fn synch(self) -> Result<Self>;

	/// Decode a synchsafe integer
	fn unsynch(self) -> Self;
}

impl SynchsafeInteger for u32 {
	fn synch(self) -> Result<Self> {
		// 7 bits are available per byte
		const MAXIMUM_INTEGER: u32 = 0x0FFF_FFFF;

		if self > MAXIMUM_INTEGER {
			err!(TooMuchData);
		}

		Ok((self & 0x7F)
			| ((self & (0x7F << 7)) << 1)
			| ((self & (0x7F << 14)) << 2)
			| ((self & (0x7F << 21)) << 3))
	}

	fn unsynch(self) -> Self {
		((self & 0x7F00_0000) >> 3) | ((self & 0x7F_0000) >> 2) | ((self & 0x7F00) >> 1) | (self & 0x7F)
	}
}

/// Reverses unsynchronisation, dropping every `0x00` that directly follows an `0xFF`
pub(crate) fn resynchronise(content: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(content.len());

	let mut encountered_ff = false;
	for &byte in content {
		if encountered_ff && byte == 0 {
			encountered_ff = false;
			continue;
		}

		encountered_ff = byte == 0xFF;
		out.push(byte);
	}

	out
}
