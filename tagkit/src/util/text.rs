/// The text encoding for use in ID3v2 frames
///
/// The discriminants match the on-disk encoding byte.
#[derive(Debug, Clone, Eq, PartialEq, Copy, Hash)]
#[repr(u8)]
pub enum TextEncoding {
	/// ISO-8859-1
	Latin1 = 0,
	/// UTF-16 with a byte order mark
	UTF16 = 1,
	/// UTF-16 big endian
	UTF16BE = 2,
	/// UTF-8
	UTF8 = 3,
}

impl TextEncoding {
	/// Get a `TextEncoding` from a u8, must be 0-3 inclusive
	pub fn from_u8(byte: u8) -> Option<Self> {
		match byte {
			0 => Some(Self::Latin1),
			1 => Some(Self::UTF16),
			2 => Some(Self::UTF16BE),
			3 => Some(Self::UTF8),
			_ => None,
		}
	}

	pub(crate) fn verify_latin1(text: &str) -> bool {
		text.chars().all(|c| c as u32 <= 255)
	}

	/// ID3v2.4 introduced two new text encodings.
	///
	/// When writing ID3v2.3, we just substitute with UTF-16.
	pub(crate) fn to_id3v23(self) -> Self {
		match self {
			Self::UTF8 | Self::UTF16BE => {
				log::warn!(
					"Text encoding {:?} is not supported in ID3v2.3, substituting with UTF-16",
					self
				);
				Self::UTF16
			},
			_ => self,
		}
	}

	/// Latin-1 can't represent everything, fall back to UTF-16 when needed
	pub(crate) fn fitting(self, text: &str) -> Self {
		if self == Self::Latin1 && !Self::verify_latin1(text) {
			return Self::UTF16;
		}

		self
	}

	pub(crate) fn encode(self, text: &str, terminated: bool) -> Vec<u8> {
		let mut out = match self {
			TextEncoding::Latin1 => latin1_encode(text),
			TextEncoding::UTF16 => utf16_encode(text, u16::to_le_bytes, true),
			TextEncoding::UTF16BE => utf16_encode(text, u16::to_be_bytes, false),
			TextEncoding::UTF8 => text.as_bytes().to_vec(),
		};

		if terminated {
			out.extend_from_slice(self.terminator());
		}

		out
	}

	pub(crate) fn terminator(self) -> &'static [u8] {
		match self {
			TextEncoding::Latin1 | TextEncoding::UTF8 => &[0],
			TextEncoding::UTF16 | TextEncoding::UTF16BE => &[0, 0],
		}
	}
}

/// Decodes `bytes`, replacing anything undecodable
///
/// Trailing nulls are trimmed. UTF-16 without a byte order mark is assumed to be little endian.
pub(crate) fn decode_text(bytes: &[u8], encoding: TextEncoding) -> String {
	match encoding {
		TextEncoding::Latin1 => latin1_decode(bytes),
		TextEncoding::UTF8 => utf8_decode(bytes),
		TextEncoding::UTF16 => match bytes {
			[0xFE, 0xFF, rest @ ..] => utf16_decode_bytes(rest, u16::from_be_bytes),
			[0xFF, 0xFE, rest @ ..] => utf16_decode_bytes(rest, u16::from_le_bytes),
			_ => utf16_decode_bytes(bytes, u16::from_le_bytes),
		},
		TextEncoding::UTF16BE => utf16_decode_bytes(bytes, u16::from_be_bytes),
	}
}

/// Splits `bytes` at the first terminator of the given encoding
///
/// Returns the content before the terminator, and everything after it. If no terminator
/// exists, the entire input is returned as the content.
pub(crate) fn split_terminated(bytes: &[u8], encoding: TextEncoding) -> (&[u8], &[u8]) {
	match encoding {
		TextEncoding::Latin1 | TextEncoding::UTF8 => match bytes.iter().position(|&b| b == 0) {
			Some(pos) => (&bytes[..pos], &bytes[pos + 1..]),
			None => (bytes, &[]),
		},
		TextEncoding::UTF16 | TextEncoding::UTF16BE => {
			let pos = bytes
				.chunks_exact(2)
				.position(|c| c == [0, 0])
				.map(|p| p * 2);

			match pos {
				Some(pos) => (&bytes[..pos], &bytes[pos + 2..]),
				None => (bytes, &[]),
			}
		},
	}
}

pub(crate) fn latin1_decode(bytes: &[u8]) -> String {
	let mut text = bytes.iter().map(|c| *c as char).collect::<String>();
	trim_end_nulls(&mut text);
	text
}

/// Characters outside of Latin-1 are replaced with `?`
pub(crate) fn latin1_encode(s: &str) -> Vec<u8> {
	s.chars()
		.map(|c| if (c as u32) <= 255 { c as u8 } else { b'?' })
		.collect()
}

pub(crate) fn utf8_decode(bytes: &[u8]) -> String {
	let mut text = String::from_utf8_lossy(bytes).into_owned();
	trim_end_nulls(&mut text);
	text
}

pub(crate) fn utf16_decode_bytes(bytes: &[u8], endianness: fn([u8; 2]) -> u16) -> String {
	let words = bytes
		.chunks_exact(2)
		// Multiple strings joined by null may each carry their own BOM
		.filter_map(|c| match c {
			[0xFF, 0xFE] | [0xFE, 0xFF] => None,
			&[a, b] => Some(endianness([a, b])),
			_ => None,
		})
		.collect::<Vec<u16>>();

	let mut text = String::from_utf16_lossy(&words);
	trim_end_nulls(&mut text);
	text
}

pub(crate) fn utf16le_encode(text: &str, terminated: bool) -> Vec<u8> {
	let mut out = utf16_encode(text, u16::to_le_bytes, false);
	if terminated {
		out.extend_from_slice(&[0, 0]);
	}

	out
}

pub(crate) fn trim_end_nulls(text: &mut String) {
	if text.ends_with('\0') {
		let new_len = text.trim_end_matches('\0').len();
		text.truncate(new_len);
	}
}

fn utf16_encode(text: &str, endianness: fn(u16) -> [u8; 2], bom: bool) -> Vec<u8> {
	let mut encoded = Vec::<u8>::new();

	if bom {
		encoded.extend_from_slice(&endianness(0xFEFF_u16));
	}

	for ch in text.encode_utf16() {
		encoded.extend_from_slice(&endianness(ch));
	}

	encoded
}
