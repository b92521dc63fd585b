//! Helpers for reading from and writing to file-like objects

use crate::error::Result;
use crate::macros::try_vec;

use std::io::{Read, Seek, SeekFrom};

// TODO: https://github.com/rust-lang/rust/issues/59359
pub(crate) trait SeekStreamLen: Seek {
	fn stream_len_hack(&mut self) -> Result<u64> {
		let current_pos = self.stream_position()?;
		let len = self.seek(SeekFrom::End(0))?;

		self.seek(SeekFrom::Start(current_pos))?;

		Ok(len)
	}
}

impl<T> SeekStreamLen for T where T: Seek {}

pub(crate) trait ReadExt: Read {
	/// Reads exactly `len` bytes, respecting the allocation limit
	fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
		let mut content = try_vec![0; len];
		self.read_exact(&mut content)?;

		Ok(content)
	}
}

impl<T> ReadExt for T where T: Read {}

/// Replaces `range` of `original` with `replacement`, returning the new buffer
pub(crate) fn splice(original: &[u8], range: std::ops::Range<usize>, replacement: &[u8]) -> Vec<u8> {
	let mut out = Vec::with_capacity(original.len() - range.len() + replacement.len());
	out.extend_from_slice(&original[..range.start]);
	out.extend_from_slice(replacement);
	out.extend_from_slice(&original[range.end..]);

	out
}
