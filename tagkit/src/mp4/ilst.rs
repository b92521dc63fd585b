//! The `ilst` item codec
//!
//! Every item is an atom holding one or more `data` atoms. Only the first `data` atom of an item
//! is used for the canonical fields, the item itself is always kept verbatim.

use super::atom_info::{AtomInfo, encode_atom};
use super::moov::Moov;
use crate::config::ParsingMode;
use crate::error::Result;
use crate::file::{ExtensionItem, FormatLayout, WritePlan};
use crate::id3::v1::constants::GENRES;
use crate::macros::{decode_err, parse_mode_choice};
use crate::tag::{FieldKey, FieldValue, TagModel};
use crate::util::text::{latin1_decode, utf8_decode, utf16_decode_bytes};

use byteorder::{BigEndian, ByteOrder};

// https://developer.apple.com/library/archive/documentation/QuickTime/QTFF/Metadata/Metadata.html#//apple_ref/doc/uid/TP40000939-CH1-SW34
const RESERVED: u32 = 0;
const UTF8: u32 = 1;
const UTF16: u32 = 2;
const BE_SIGNED_INTEGER: u32 = 21;
const BE_UNSIGNED_INTEGER: u32 = 22;

/// The canonical field backed by an item
fn item_field(ident: &[u8; 4]) -> Option<FieldKey> {
	match ident {
		b"\xA9nam" => Some(FieldKey::Title),
		b"\xA9ART" => Some(FieldKey::Artist),
		b"\xA9alb" => Some(FieldKey::Album),
		b"\xA9cmt" => Some(FieldKey::Comment),
		b"\xA9gen" | b"gnre" => Some(FieldKey::Genre),
		b"\xA9day" => Some(FieldKey::Year),
		b"trkn" => Some(FieldKey::Track),
		_ => None,
	}
}

/// The item written for a canonical field
fn field_item(field: FieldKey) -> [u8; 4] {
	match field {
		FieldKey::Title => *b"\xA9nam",
		FieldKey::Artist => *b"\xA9ART",
		FieldKey::Album => *b"\xA9alb",
		FieldKey::Comment => *b"\xA9cmt",
		FieldKey::Genre => *b"\xA9gen",
		FieldKey::Year => *b"\xA9day",
		FieldKey::Track => *b"trkn",
	}
}

/// Parses every item of `ilst`, filling `tag` and recording the items in `layout`
pub(super) fn parse_items(
	moov: &Moov<'_>,
	ilst: &AtomInfo,
	parse_mode: ParsingMode,
	tag: &mut TagModel,
	layout: &mut FormatLayout,
) -> Result<()> {
	for item in moov.children(ilst, 0)? {
		if matches!(&item.ident, b"free" | b"skip") {
			continue;
		}

		let children = moov.children(&item, 0)?;
		let data = children
			.iter()
			.find(|atom| &atom.ident == b"data")
			.map(|data| moov.content(data, 0));

		let key = match &item.ident {
			b"----" => freeform_key(moov, &children),
			ident => latin1_decode(ident),
		};

		let shadows = item_field(&item.ident);
		if let Some(field) = shadows {
			match data.and_then(|data| decode_value(&item.ident, data)) {
				Some(value) => tag.insert_parsed(field, value),
				None => parse_mode_choice!(
					parse_mode,
					STRICT: decode_err!(@BAIL Mp4, "Found an item with invalid content"),
					DEFAULT: log::warn!("MP4: Item '{}' has invalid content, keeping it as-is", key)
				),
			}
		}

		layout.push_extension(ExtensionItem::new(key, shadows, moov.raw(&item).to_vec()));
	}

	Ok(())
}

// ----:com.apple.iTunes:MOOD
fn freeform_key(moov: &Moov<'_>, children: &[AtomInfo]) -> String {
	let mut key = String::from("----");

	for name in [b"mean", b"name"] {
		let Some(atom) = children.iter().find(|atom| &atom.ident == name) else {
			continue;
		};

		// Version (1)
		// Flags (3)
		key.push(':');
		key.push_str(&utf8_decode(moov.content(atom, 4)));
	}

	key
}

// Type indicator (4), locale (4)
fn decode_value(ident: &[u8; 4], data: &[u8]) -> Option<FieldValue> {
	if data.len() < 8 {
		return None;
	}

	// The first byte of the type indicator is reserved
	let data_type = BigEndian::read_u32(&data[..4]) & 0x00FF_FFFF;
	let value = &data[8..];

	match ident {
		// Reserved (2), track number (2), track total (2), reserved (2)
		b"trkn" if value.len() >= 4 => Some(FieldValue::Number(u32::from(
			BigEndian::read_u16(&value[2..4]),
		))),
		// A 1-based index into the ID3v1 genre list
		b"gnre" if value.len() >= 2 => {
			let index = usize::from(BigEndian::read_u16(&value[..2]));
			let genre = GENRES.get(index.checked_sub(1)?)?;
			Some(FieldValue::Text(String::from(*genre)))
		},
		b"trkn" | b"gnre" => None,
		_ => match data_type {
			UTF8 => Some(FieldValue::Text(utf8_decode(value))),
			UTF16 => Some(FieldValue::Text(utf16_decode_bytes(value, u16::from_be_bytes))),
			BE_SIGNED_INTEGER | BE_UNSIGNED_INTEGER if (1..=4).contains(&value.len()) => {
				let number = BigEndian::read_uint(value, value.len());
				Some(FieldValue::Number(number as u32))
			},
			_ => None,
		},
	}
}

fn encode_field(field: FieldKey, tag: &TagModel) -> Result<Vec<u8>> {
	let value = tag.get(field);

	let mut data = Vec::new();
	match field {
		FieldKey::Track => {
			let track = u16::try_from(value.as_number().unwrap_or_default()).unwrap_or(u16::MAX);

			data.extend(RESERVED.to_be_bytes());
			data.extend([0; 4]);
			data.extend([0, 0]);
			data.extend(track.to_be_bytes());
			data.extend([0; 4]);
		},
		_ => {
			data.extend(UTF8.to_be_bytes());
			data.extend([0; 4]);
			data.extend(value.to_text().as_bytes());
		},
	}

	encode_atom(field_item(field), &encode_atom(*b"data", &data)?)
}

/// Encodes a complete `ilst` atom
pub(super) fn build_ilst(plan: &WritePlan<'_>, tag: &TagModel) -> Result<Vec<u8>> {
	let mut content = Vec::new();

	for item in &plan.items {
		content.extend_from_slice(item.raw());
	}

	for field in &plan.fields {
		content.extend(encode_field(*field, tag)?);
	}

	encode_atom(*b"ilst", &content)
}
