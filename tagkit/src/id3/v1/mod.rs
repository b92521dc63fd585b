//! ID3v1 items
//!
//! # ID3v1 notes
//!
//! ID3v1 is a fixed 128 byte tag at the end of the file, with Latin-1 fields of 30 bytes at most.
//! It is only used as a fallback for fields missing from the primary tag, and is refreshed when a
//! file that already has one is written. Values that don't fit are truncated.
//!
//! ## Genres
//!
//! The genre is stored as an index into [`GENRES`](constants::GENRES). A genre not found in the list
//! can't be stored.

pub(crate) mod constants;

use crate::config::ParsingMode;
use crate::error::Result;
use crate::macros::err;
use crate::tag::{FieldKey, FieldValue, TagModel};
use crate::util::text::{latin1_decode, latin1_encode};
use constants::{GENRES, ID3V1_TAG_MARKER, ID3V1_TAG_SIZE};

/// Reads an ID3v1 tag into `tag`, only filling fields that are still empty
pub(crate) fn parse(
	reader: &[u8; ID3V1_TAG_SIZE],
	parse_mode: ParsingMode,
	tag: &mut TagModel,
) -> Result<()> {
	if reader[..3] != ID3V1_TAG_MARKER {
		err!(TextDecode("ID3v1 tag is missing its marker"));
	}

	let reader = &reader[3..];

	for (key, range) in [
		(FieldKey::Title, 0..30),
		(FieldKey::Artist, 30..60),
		(FieldKey::Album, 60..90),
	] {
		if let Some(text) = decode_text(&reader[range]) {
			tag.insert_parsed(key, FieldValue::Text(text));
		}
	}

	if let Some(year) = try_parse_year(&reader[90..94], parse_mode)? {
		tag.insert_parsed(FieldKey::Year, FieldValue::Number(year));
	}

	// Determine the range of the comment (30 bytes for ID3v1 and 28 for ID3v1.1)
	// We check for the null terminator 28 bytes in, and for a non-zero track number after it.
	// A track number of 0 is invalid.
	let range = if reader[122] == 0 && reader[123] != 0 {
		tag.insert_parsed(FieldKey::Track, FieldValue::Number(u32::from(reader[123])));
		94_usize..122
	} else {
		94..124
	};

	if let Some(comment) = decode_text(&reader[range]) {
		tag.insert_parsed(FieldKey::Comment, FieldValue::Text(comment));
	}

	if let Some(genre) = GENRES.get(usize::from(reader[124])) {
		tag.insert_parsed(FieldKey::Genre, FieldValue::Text((*genre).to_owned()));
	}

	Ok(())
}

fn decode_text(data: &[u8]) -> Option<String> {
	let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
	if end < data.len() && data[end..].iter().any(|b| *b != 0) {
		log::warn!("ID3v1 text field contains trailing junk, skipping");
	}

	let text = latin1_decode(&data[..end]);
	let text = text.trim_end_matches(' ');
	if text.is_empty() {
		return None;
	}

	Some(text.to_owned())
}

fn try_parse_year(input: &[u8], parse_mode: ParsingMode) -> Result<Option<u32>> {
	let (num_digits, year) = input
		.iter()
		.take_while(|c| (**c).is_ascii_digit())
		.fold((0usize, 0u32), |(num_digits, year), c| {
			(num_digits + 1, year * 10 + u32::from(*c - b'0'))
		});
	if num_digits != 4 {
		// Most writers use "\0\0\0\0" for an empty year, rather than "0000"
		if parse_mode == ParsingMode::Strict && input.iter().any(|b| *b != 0) {
			err!(TextDecode(
				"ID3v1 year field contains non-ASCII digit characters"
			));
		}

		return Ok(None);
	}

	Ok(Some(year))
}

/// The index of `genre` in [`GENRES`], ignoring case
pub(crate) fn genre_index(genre: &str) -> Option<u8> {
	GENRES
		.iter()
		.position(|known| known.eq_ignore_ascii_case(genre.trim()))
		.map(|idx| idx as u8)
}

/// Encode the canonical fields of `tag` as an ID3v1.1 tag
pub(crate) fn encode(tag: &TagModel) -> [u8; ID3V1_TAG_SIZE] {
	fn write_text(dest: &mut [u8], text: &str) {
		let encoded = latin1_encode(text);
		let len = encoded.len().min(dest.len());
		dest[..len].copy_from_slice(&encoded[..len]);
	}

	let mut out = [0; ID3V1_TAG_SIZE];
	out[..3].copy_from_slice(&ID3V1_TAG_MARKER);

	write_text(&mut out[3..33], tag.title());
	write_text(&mut out[33..63], tag.artist());
	write_text(&mut out[63..93], tag.album());

	let year = tag.year();
	if year > 0 && year <= 9999 {
		out[93..97].copy_from_slice(format!("{year:04}").as_bytes());
	}

	// A track number takes the last 2 bytes of the comment
	let track = tag.track();
	if let Ok(track @ 1..=255) = u8::try_from(track) {
		write_text(&mut out[97..125], tag.comment());
		out[126] = track;
	} else {
		write_text(&mut out[97..127], tag.comment());
	}

	out[127] = genre_index(tag.genre()).unwrap_or(u8::MAX);

	out
}

#[cfg(test)]
mod tests {
	use super::{encode, genre_index, parse};
	use crate::config::ParsingMode;
	use crate::tag::TagModel;

	fn full_tag() -> TagModel {
		let mut tag = TagModel::new();
		tag.set_title("Foo title");
		tag.set_artist("Bar artist");
		tag.set_album("Baz album");
		tag.set_comment("Qux comment");
		tag.set_genre("Classical");
		tag.set_year(1984);
		tag.set_track(1);
		tag
	}

	#[test_log::test]
	fn encode_parse() {
		let encoded = encode(&full_tag());
		assert_eq!(&encoded[..3], b"TAG");
		assert_eq!(encoded[126], 1);
		assert_eq!(encoded[127], 32);

		let mut parsed = TagModel::new();
		parse(&encoded, ParsingMode::Strict, &mut parsed).unwrap();

		for (key, value) in full_tag().iter() {
			assert_eq!(parsed.get(key), value);
		}
	}

	#[test_log::test]
	fn fills_empty_fields_only() {
		let encoded = encode(&full_tag());

		let mut tag = TagModel::new();
		tag.insert_parsed(crate::tag::FieldKey::Title, "Primary title".into());
		parse(&encoded, ParsingMode::BestAttempt, &mut tag).unwrap();

		assert_eq!(tag.title(), "Primary title");
		assert_eq!(tag.artist(), "Bar artist");
	}

	#[test_log::test]
	fn truncated_fields() {
		let mut tag = TagModel::new();
		tag.set_title("A title that is far too long to fit in thirty bytes");
		tag.set_genre("Not a real genre");

		let encoded = encode(&tag);
		assert_eq!(&encoded[3..33], b"A title that is far too long t");
		assert_eq!(encoded[127], 255);
	}

	#[test_log::test]
	fn genres() {
		assert_eq!(genre_index("rock"), Some(17));
		assert_eq!(genre_index("Psybient"), Some(191));
		assert_eq!(genre_index("Nope"), None);
	}
}
