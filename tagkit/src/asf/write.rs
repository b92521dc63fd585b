use super::attribute::build_objects;
use super::constants::{
	CONTENT_DESCRIPTION_GUID, EXTENDED_CONTENT_DESCRIPTION_GUID, FILE_PROPERTIES_GUID,
	HEADER_OBJECT_GUID, HEADER_OBJECT_PREFIX_SIZE, OBJECT_HEADER_SIZE, PADDING_GUID,
};
use super::object::{encode_object, read_objects};
use super::read::verify_header;
use crate::config::{ParsingMode, WriteOptions};
use crate::error::Result;
use crate::file::{BlockKind, FormatLayout, WritePlan};
use crate::macros::{encode_err, err};
use crate::tag::TagModel;

use byteorder::{ByteOrder, LittleEndian};

/// Writes the description objects of an ASF file
///
/// The Header Object is rebuilt with every other object kept as-is. Any Padding Object absorbs
/// the change in size. When the new objects don't fit, the header grows and the file size in
/// the File Properties Object is updated.
pub(crate) fn write_to(
	original: &[u8],
	layout: &FormatLayout,
	tag: &TagModel,
	write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let Some(block) = layout.block(BlockKind::AsfHeader) else {
		encode_err!(@BAIL Asf, "The file no longer matches its layout (no Header Object)");
	};

	let header_size = block.size();
	let header = match verify_header(original, original.len() as u64) {
		Ok((header, _)) if header.size == header_size => header,
		_ => encode_err!(@BAIL Asf, "The file no longer matches its layout (Header Object changed)"),
	};

	let prefix_size = HEADER_OBJECT_PREFIX_SIZE as usize;
	let objects = read_objects(
		&original[prefix_size..header.end() as usize],
		HEADER_OBJECT_PREFIX_SIZE,
		ParsingMode::BestAttempt,
	)?;

	let plan = WritePlan::new(layout.extensions(), tag);
	let has_descriptions = objects.iter().any(|object| {
		object.guid == CONTENT_DESCRIPTION_GUID || object.guid == EXTENDED_CONTENT_DESCRIPTION_GUID
	});

	if !has_descriptions && plan.items.is_empty() && plan.fields.is_empty() {
		log::debug!("ASF: Nothing to do");
		return Ok(original.to_vec());
	}

	let descriptions = build_objects(&plan, tag)?;

	let mut children = Vec::with_capacity(header_size as usize);
	let mut object_count = 0_u32;
	let mut file_size_offset = None;

	for object in &objects {
		match object.guid {
			CONTENT_DESCRIPTION_GUID | EXTENDED_CONTENT_DESCRIPTION_GUID | PADDING_GUID => continue,
			// File ID (16), file size (8)
			FILE_PROPERTIES_GUID if object.size >= OBJECT_HEADER_SIZE + 24 => {
				file_size_offset = Some(prefix_size + children.len() + OBJECT_HEADER_SIZE as usize + 16);
			},
			_ => {},
		}

		children.extend_from_slice(&original[object.range()]);
		object_count += 1;
	}

	if let Some(content) = descriptions.content_description {
		children.extend(encode_object(CONTENT_DESCRIPTION_GUID, &content));
		object_count += 1;
	}

	if let Some(content) = descriptions.extended_content_description {
		children.extend(encode_object(EXTENDED_CONTENT_DESCRIPTION_GUID, &content));
		object_count += 1;
	}

	let used = HEADER_OBJECT_PREFIX_SIZE + children.len() as u64;
	let padding = match header_size.checked_sub(used) {
		Some(0) => None,
		Some(remaining) if remaining >= OBJECT_HEADER_SIZE => {
			log::debug!("ASF: Writing in place, {} bytes of padding remain", remaining - OBJECT_HEADER_SIZE);
			Some(remaining - OBJECT_HEADER_SIZE)
		},
		_ => {
			log::debug!("ASF: Header doesn't fit, relocating the data");
			write_options.preferred_padding.map(u64::from)
		},
	};

	if let Some(padding) = padding {
		children.extend(encode_object(PADDING_GUID, &vec![0; padding as usize]));
		object_count += 1;
	}

	let new_size = HEADER_OBJECT_PREFIX_SIZE + children.len() as u64;

	let mut out = Vec::with_capacity(original.len() - header_size as usize + new_size as usize);
	out.extend(HEADER_OBJECT_GUID.0);
	out.extend(new_size.to_le_bytes());
	out.extend(object_count.to_le_bytes());
	// Reserved (2)
	out.extend_from_slice(&original[28..prefix_size]);
	out.extend(children);

	// The file size is invalid in broadcast streams, and left as 0
	let file_size_offset = file_size_offset
		.filter(|offset| LittleEndian::read_u64(&out[*offset..*offset + 8]) != 0);
	if let Some(offset) = file_size_offset.filter(|_| new_size != header_size) {
		let delta = new_size as i64 - header_size as i64;
		let file_size = LittleEndian::read_u64(&out[offset..offset + 8]);

		let Some(file_size) = file_size.checked_add_signed(delta) else {
			err!(TooMuchData);
		};

		LittleEndian::write_u64(&mut out[offset..offset + 8], file_size);
	}

	out.extend_from_slice(&original[header_size as usize..]);
	Ok(out)
}
