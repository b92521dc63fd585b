use super::constants::{INVALID_KEYS, ITEM_TYPE_TEXT};
use crate::config::ParsingMode;
use crate::error::Result;
use crate::file::ExtensionItem;
use crate::macros::{decode_err, parse_mode_choice};
use crate::tag::{FieldKey, FieldValue, TagModel};
use crate::util::text::utf8_decode;

use byteorder::{LittleEndian, ReadBytesExt};

/// The canonical field backed by an item key, ignoring case
pub(super) fn item_field(key: &str) -> Option<FieldKey> {
	FieldKey::ALL
		.into_iter()
		.find(|field| field_item_key(*field).eq_ignore_ascii_case(key))
}

/// The item key written for a canonical field
pub(super) fn field_item_key(field: FieldKey) -> &'static str {
	match field {
		FieldKey::Title => "Title",
		FieldKey::Artist => "Artist",
		FieldKey::Album => "Album",
		FieldKey::Comment => "Comment",
		FieldKey::Genre => "Genre",
		FieldKey::Year => "Year",
		FieldKey::Track => "Track",
	}
}

/// Parses the items of a tag, filling the canonical fields in `tag`
///
/// Every item is returned verbatim, in file order.
pub(super) fn parse_items(
	mut data: &[u8],
	item_count: u32,
	parse_mode: ParsingMode,
	tag: &mut TagModel,
) -> Result<Vec<ExtensionItem>> {
	let mut items = Vec::new();

	for _ in 0..item_count {
		// Value size (4) + flags (4) + a key of at least 2 bytes + its terminator
		if data.len() < 11 {
			break;
		}

		let start = data;
		let value_size = data.read_u32::<LittleEndian>()? as usize;
		let flags = data.read_u32::<LittleEndian>()?;

		let Some(key_len) = data.iter().position(|b| *b == 0) else {
			decode_err!(@BAIL "APE tag item has an unterminated key");
		};

		let key = String::from_utf8_lossy(&data[..key_len]).into_owned();
		data = &data[key_len + 1..];

		if value_size > data.len() {
			decode_err!(@BAIL "APE tag item has an invalid size");
		}

		let (value, rest) = data.split_at(value_size);
		data = rest;

		let raw = &start[..start.len() - data.len()];

		if INVALID_KEYS.contains(&&*key.to_uppercase()) || !(2..=255).contains(&key.len()) {
			parse_mode_choice!(
				parse_mode,
				STRICT: decode_err!(@BAIL "APE tag item contains an illegal key"),
				DEFAULT: {
					log::warn!("APE: Skipping item with an illegal key '{}'", key);
					continue;
				}
			);
		}

		let item_type = (flags >> 1) & 3;
		let shadows = item_field(&key);

		match shadows {
			Some(field) if item_type == ITEM_TYPE_TEXT => {
				// Multiple values are separated by nulls, only the first is used
				let first = value.split(|b| *b == 0).next().unwrap_or_default();
				tag.insert_parsed(field, FieldValue::Text(utf8_decode(first)));
			},
			Some(_) => log::warn!("APE: Item '{}' is not text, keeping it as-is", key),
			None => {},
		}

		items.push(ExtensionItem::new(key, shadows, raw.to_vec()));
	}

	Ok(items)
}

/// Encodes a UTF-8 text item
pub(super) fn encode_text_item(key: &str, value: &str) -> Vec<u8> {
	let mut item = Vec::with_capacity(8 + key.len() + 1 + value.len());
	item.extend_from_slice(&(value.len() as u32).to_le_bytes());
	item.extend_from_slice(&(ITEM_TYPE_TEXT << 1).to_le_bytes());
	item.extend_from_slice(key.as_bytes());
	item.push(0);
	item.extend_from_slice(value.as_bytes());
	item
}
