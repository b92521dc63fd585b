use super::frame::{Frame, ParsedFrame, read_frame};
use super::header::{Id3v2Header, Id3v2Version};
use super::synchsafe::{SynchsafeInteger, resynchronise};
use super::frame_field;
use crate::config::ParsingMode;
use crate::error::Result;
use crate::file::ExtensionItem;
use crate::id3::v1::constants::GENRES;
use crate::macros::{err, parse_mode_choice};
use crate::tag::{FieldKey, FieldValue, TagModel};
use crate::util::text::{TextEncoding, decode_text, split_terminated};

use std::borrow::Cow;

use byteorder::{BigEndian, ByteOrder};

/// Parses the contents of an ID3v2 tag (everything after the 10 byte header)
///
/// Canonical fields are filled in `tag`, and every frame is returned as an [`ExtensionItem`].
/// ID3v2.2 frames are only decoded, and never returned.
pub(crate) fn parse_id3v2(
	content: &[u8],
	header: Id3v2Header,
	parse_mode: ParsingMode,
	tag: &mut TagModel,
) -> Result<Vec<ExtensionItem>> {
	log::debug!(
		"Parsing ID3v2 tag, size: {}, version: {:?}",
		header.size,
		header.version
	);

	// ID3v2.4 unsynchronises each frame individually, with the tag flag being a hint
	let content = if header.flags.unsynchronisation && header.version != Id3v2Version::V4 {
		Cow::Owned(resynchronise(content))
	} else {
		Cow::Borrowed(content)
	};

	let mut frames = &content[skip_extended_header(&content, header)?..];
	let mut items = Vec::new();

	loop {
		match read_frame(&mut frames, header.version, parse_mode)? {
			ParsedFrame::Next(frame) => {
				let shadows = apply_frame(&frame, parse_mode, tag)?;
				if header.version != Id3v2Version::V2 {
					items.push(ExtensionItem::new(frame.id, shadows, frame.raw));
				}
			},
			ParsedFrame::Skip => {},
			ParsedFrame::Eof => break,
		}
	}

	Ok(items)
}

fn skip_extended_header(content: &[u8], header: Id3v2Header) -> Result<usize> {
	if !header.flags.extended_header {
		return Ok(0);
	}

	if content.len() < 4 {
		err!(Id3v2("Extended header is too small"));
	}

	let skip = match header.version {
		// The size excludes itself
		Id3v2Version::V3 => BigEndian::read_u32(&content[..4]) as usize + 4,
		// The size includes itself
		_ => BigEndian::read_u32(&content[..4]).unsynch() as usize,
	};

	if skip < 4 || skip > content.len() {
		err!(Id3v2("Extended header has an invalid size"));
	}

	log::trace!("Skipping {} byte extended header", skip);
	Ok(skip)
}

// Fills the canonical field backed by `frame`, returning it
fn apply_frame(frame: &Frame, parse_mode: ParsingMode, tag: &mut TagModel) -> Result<Option<FieldKey>> {
	let Some(field) = frame_field(&frame.id) else {
		return Ok(None);
	};

	// Encrypted frames still shadow their field, they just can't provide a value
	let Some(content) = frame.content.as_deref() else {
		log::debug!("ID3v2: Unable to decode frame `{}`, keeping it as-is", frame.id);
		return Ok(Some(field));
	};

	let Some((&encoding, data)) = content.split_first() else {
		return Ok(Some(field));
	};

	let Some(encoding) = TextEncoding::from_u8(encoding) else {
		parse_mode_choice!(
			parse_mode,
			STRICT: err!(TextDecode("Found invalid encoding")),
			DEFAULT: {
				log::warn!("ID3v2: Frame `{}` has an invalid text encoding", frame.id);
				return Ok(Some(field));
			}
		);
	};

	if field == FieldKey::Comment {
		return Ok(apply_comment(data, encoding, tag));
	}

	// Multiple values are separated by a terminator, only the first is used
	let (first, _) = split_terminated(data, encoding);
	let text = decode_text(first, encoding);

	let value = match field {
		FieldKey::Genre => resolve_genre(&text),
		_ => text,
	};

	tag.insert_parsed(field, FieldValue::Text(value));
	Ok(Some(field))
}

// COMM: encoding (1), language (3), description (terminated), text
fn apply_comment(data: &[u8], encoding: TextEncoding, tag: &mut TagModel) -> Option<FieldKey> {
	let Some(data) = data.get(3..) else {
		return None;
	};

	let (description, text) = split_terminated(data, encoding);
	if !decode_text(description, encoding).is_empty() {
		return None;
	}

	tag.insert_parsed(FieldKey::Comment, FieldValue::Text(decode_text(text, encoding)));
	Some(FieldKey::Comment)
}

/// Resolves ID3v1 genre references in a `TCON` frame
///
/// `"17"` and `"(17)"` both resolve to `"Rock"`, while `"(17)Rock & Roll"` prefers the refinement.
/// `(RX)` and `(CR)` are "Remix" and "Cover", and `((` escapes a literal parenthesis.
pub(crate) fn resolve_genre(text: &str) -> String {
	fn genre_name(reference: &str) -> Option<&'static str> {
		match reference {
			"RX" => Some("Remix"),
			"CR" => Some("Cover"),
			_ => reference
				.parse::<usize>()
				.ok()
				.and_then(|idx| GENRES.get(idx).copied()),
		}
	}

	if let Some(escaped) = text.strip_prefix("((") {
		return format!("({escaped}");
	}

	if let Some(rest) = text.strip_prefix('(') {
		if let Some((reference, refinement)) = rest.split_once(')') {
			if !refinement.is_empty() {
				return refinement.to_owned();
			}

			if let Some(name) = genre_name(reference) {
				return name.to_owned();
			}
		}

		return text.to_owned();
	}

	if text.bytes().all(|b| b.is_ascii_digit()) {
		if let Some(name) = genre_name(text) {
			return name.to_owned();
		}
	}

	text.to_owned()
}
