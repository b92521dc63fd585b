//! The Content Description and Extended Content Description codec
//!
//! Every attribute is kept in the extended descriptor form (name, value type, value), including
//! the five fixed fields of the Content Description Object. On write, the fixed fields go back
//! to the Content Description Object and everything else becomes an extended descriptor.

use super::constants::{
	CONTENT_DESCRIPTION_NAMES, TYPE_BOOL, TYPE_BYTES, TYPE_DWORD, TYPE_QWORD, TYPE_UNICODE,
	TYPE_WORD,
};
use crate::config::ParsingMode;
use crate::error::Result;
use crate::file::{ExtensionItem, FormatLayout, WritePlan};
use crate::macros::{decode_err, err, parse_mode_choice};
use crate::tag::{FieldKey, FieldValue, TagModel};
use crate::util::leading_number;
use crate::util::text::{utf16_decode_bytes, utf16le_encode};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};

/// The attribute written for a canonical field
fn field_attribute(field: FieldKey) -> &'static str {
	match field {
		FieldKey::Title => "Title",
		FieldKey::Artist => "Author",
		FieldKey::Album => "WM/AlbumTitle",
		FieldKey::Comment => "Description",
		FieldKey::Genre => "WM/Genre",
		FieldKey::Year => "WM/Year",
		FieldKey::Track => "WM/TrackNumber",
	}
}

/// The canonical field backed by an attribute
fn attribute_field(name: &str) -> Option<FieldKey> {
	// Zero-based, superseded by `WM/TrackNumber`
	if name == "WM/Track" {
		return Some(FieldKey::Track);
	}

	FieldKey::ALL
		.into_iter()
		.find(|field| field_attribute(*field) == name)
}

struct Descriptor<'a> {
	name: String,
	value_type: u16,
	value: &'a [u8],
}

fn split<'a>(data: &mut &'a [u8], len: usize) -> Result<&'a [u8]> {
	if len > data.len() {
		err!(SizeMismatch);
	}

	let (content, rest) = data.split_at(len);
	*data = rest;
	Ok(content)
}

// Name length (2), name, value type (2), value length (2), value
fn read_descriptor<'a>(data: &mut &'a [u8]) -> Result<Descriptor<'a>> {
	let name_len = data.read_u16::<LittleEndian>()?;
	let name = utf16_decode_bytes(split(data, usize::from(name_len))?, u16::from_le_bytes);

	let value_type = data.read_u16::<LittleEndian>()?;
	let value_len = data.read_u16::<LittleEndian>()?;
	let value = split(data, usize::from(value_len))?;

	Ok(Descriptor {
		name,
		value_type,
		value,
	})
}

fn encode_descriptor(name: &str, value_type: u16, value: &[u8]) -> Result<Vec<u8>> {
	let name = utf16le_encode(name, true);

	let (Ok(name_len), Ok(value_len)) = (u16::try_from(name.len()), u16::try_from(value.len()))
	else {
		err!(TooMuchData);
	};

	let mut descriptor = Vec::with_capacity(name.len() + value.len() + 6);
	descriptor.extend(name_len.to_le_bytes());
	descriptor.extend(name);
	descriptor.extend(value_type.to_le_bytes());
	descriptor.extend(value_len.to_le_bytes());
	descriptor.extend_from_slice(value);
	Ok(descriptor)
}

fn descriptor_value(descriptor: &Descriptor<'_>) -> Option<FieldValue> {
	let value = descriptor.value;
	let value = match descriptor.value_type {
		TYPE_UNICODE => FieldValue::Text(utf16_decode_bytes(value, u16::from_le_bytes)),
		TYPE_WORD if value.len() == 2 => FieldValue::Number(u32::from(LittleEndian::read_u16(value))),
		TYPE_DWORD if value.len() == 4 => FieldValue::Number(LittleEndian::read_u32(value)),
		TYPE_QWORD if value.len() == 8 => {
			FieldValue::Number(u32::try_from(LittleEndian::read_u64(value)).unwrap_or(u32::MAX))
		},
		// Binary and boolean values can't back a field
		TYPE_BYTES | TYPE_BOOL => return None,
		ty => {
			log::debug!("ASF: Unable to use value of type {} for attribute '{}'", ty, descriptor.name);
			return None;
		},
	};

	if descriptor.name != "WM/Track" {
		return Some(value);
	}

	let track = match value {
		FieldValue::Text(text) => leading_number(&text),
		FieldValue::Number(number) => number,
	};

	Some(FieldValue::Number(track.saturating_add(1)))
}

fn push_attribute(
	descriptor: &Descriptor<'_>,
	raw: Vec<u8>,
	parse_mode: ParsingMode,
	tag: &mut TagModel,
	layout: &mut FormatLayout,
) -> Result<()> {
	let shadows = attribute_field(&descriptor.name);
	if let Some(field) = shadows {
		match descriptor_value(descriptor) {
			Some(value) => tag.insert_parsed(field, value),
			None => parse_mode_choice!(
				parse_mode,
				STRICT: decode_err!(@BAIL Asf, "Found an attribute with an invalid value"),
				DEFAULT: log::warn!("ASF: Attribute '{}' has an invalid value, keeping it as-is", descriptor.name)
			),
		}
	}

	layout.push_extension(ExtensionItem::new(descriptor.name.clone(), shadows, raw));
	Ok(())
}

/// Parses a Content Description Object, filling `tag` and recording its fields in `layout`
pub(super) fn parse_content_description(
	mut content: &[u8],
	parse_mode: ParsingMode,
	tag: &mut TagModel,
	layout: &mut FormatLayout,
) -> Result<()> {
	let mut lengths = [0_u16; 5];
	content.read_u16_into::<LittleEndian>(&mut lengths)?;

	for (name, len) in CONTENT_DESCRIPTION_NAMES.into_iter().zip(lengths) {
		let value = split(&mut content, usize::from(len))?;
		if value.is_empty() {
			continue;
		}

		let descriptor = Descriptor {
			name: String::from(name),
			value_type: TYPE_UNICODE,
			value,
		};

		let raw = encode_descriptor(name, TYPE_UNICODE, value)?;
		push_attribute(&descriptor, raw, parse_mode, tag, layout)?;
	}

	Ok(())
}

/// Parses an Extended Content Description Object, filling `tag` and recording every descriptor
/// in `layout`
pub(super) fn parse_extended_content_description(
	mut content: &[u8],
	parse_mode: ParsingMode,
	tag: &mut TagModel,
	layout: &mut FormatLayout,
) -> Result<()> {
	let count = content.read_u16::<LittleEndian>()?;

	for _ in 0..count {
		let start = content;
		let descriptor = read_descriptor(&mut content)?;
		let raw = &start[..start.len() - content.len()];

		if descriptor.name.is_empty() {
			parse_mode_choice!(
				parse_mode,
				STRICT: decode_err!(@BAIL Asf, "Found a descriptor with an empty name"),
				DEFAULT: {
					log::warn!("ASF: Discarding a descriptor with an empty name");
					continue;
				}
			);
		}

		push_attribute(&descriptor, raw.to_vec(), parse_mode, tag, layout)?;
	}

	Ok(())
}

/// The contents of the new description objects, `None` when an object has nothing to hold
pub(super) struct DescriptionObjects {
	pub(super) content_description: Option<Vec<u8>>,
	pub(super) extended_content_description: Option<Vec<u8>>,
}

pub(super) fn build_objects(plan: &WritePlan<'_>, tag: &TagModel) -> Result<DescriptionObjects> {
	let mut fixed: [Option<Vec<u8>>; 5] = Default::default();
	let mut descriptors = Vec::new();
	let mut count = 0_usize;

	for item in &plan.items {
		let mut raw = item.raw();
		let descriptor = read_descriptor(&mut raw)?;

		let slot = CONTENT_DESCRIPTION_NAMES
			.iter()
			.position(|name| *name == descriptor.name)
			.filter(|idx| descriptor.value_type == TYPE_UNICODE && fixed[*idx].is_none());
		match slot {
			Some(idx) => fixed[idx] = Some(descriptor.value.to_vec()),
			None => {
				descriptors.extend_from_slice(item.raw());
				count += 1;
			},
		}
	}

	for field in &plan.fields {
		let name = field_attribute(*field);
		let value = tag.get(*field);

		if *field == FieldKey::Track {
			let track = value.as_number().unwrap_or_default();
			descriptors.extend(encode_descriptor(name, TYPE_DWORD, &track.to_le_bytes())?);
			count += 1;
			continue;
		}

		let text = utf16le_encode(&value.to_text(), true);
		match CONTENT_DESCRIPTION_NAMES.iter().position(|n| *n == name) {
			Some(idx) if fixed[idx].is_none() => fixed[idx] = Some(text),
			_ => {
				descriptors.extend(encode_descriptor(name, TYPE_UNICODE, &text)?);
				count += 1;
			},
		}
	}

	let content_description = if fixed.iter().any(Option::is_some) {
		let mut lengths = Vec::with_capacity(10);
		let mut values = Vec::new();
		for value in fixed.iter().map(|value| value.as_deref().unwrap_or_default()) {
			let Ok(len) = u16::try_from(value.len()) else {
				err!(TooMuchData);
			};

			lengths.extend(len.to_le_bytes());
			values.extend_from_slice(value);
		}

		lengths.extend(values);
		Some(lengths)
	} else {
		None
	};

	let extended_content_description = if count > 0 {
		let Ok(count) = u16::try_from(count) else {
			err!(TooMuchData);
		};

		let mut content = count.to_le_bytes().to_vec();
		content.extend(descriptors);
		Some(content)
	} else {
		None
	};

	Ok(DescriptionObjects {
		content_description,
		extended_content_description,
	})
}
