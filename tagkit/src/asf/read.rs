use super::attribute::{parse_content_description, parse_extended_content_description};
use super::constants::{
	AUDIO_MEDIA_GUID, CONTENT_DESCRIPTION_GUID, DATA_OBJECT_GUID,
	EXTENDED_CONTENT_DESCRIPTION_GUID, FILE_PROPERTIES_GUID, HEADER_OBJECT_GUID,
	HEADER_OBJECT_PREFIX_SIZE, OBJECT_HEADER_SIZE, PADDING_GUID, STREAM_PROPERTIES_GUID,
};
use super::object::{ObjectInfo, read_objects};
use super::properties::read_properties;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{BlockKind, Container, FormatLayout, ParsedFile};
use crate::macros::decode_err;
use crate::properties::AudioProperties;
use crate::tag::TagModel;
use crate::util::io::{ReadExt, SeekStreamLen};

use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, LittleEndian};

/// Verifies the Header Object, returning it and its object count
pub(super) fn verify_header(prefix: &[u8], file_len: u64) -> Result<(ObjectInfo, u32)> {
	let header = match ObjectInfo::parse(prefix, 0) {
		Ok(header) if header.guid == HEADER_OBJECT_GUID => header,
		_ => decode_err!(@BAIL Asf, "File does not start with a Header Object"),
	};

	if header.size < HEADER_OBJECT_PREFIX_SIZE || header.size > file_len {
		decode_err!(@BAIL Asf, "Header Object has an invalid size");
	}

	let Some(count) = prefix.get(24..28) else {
		decode_err!(@BAIL Asf, "Header Object is too short");
	};

	log::debug!("File verified to be ASF");
	Ok((header, LittleEndian::read_u32(count)))
}

// `content` holds the Header Object, without its prefix
fn object_content<'a>(content: &'a [u8], object: &ObjectInfo) -> &'a [u8] {
	let range = object.content_range();
	let offset = HEADER_OBJECT_PREFIX_SIZE as usize;
	&content[range.start - offset..range.end - offset]
}

pub(crate) fn read_from<R>(data: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	let parse_mode = parse_options.parsing_mode;

	let mut tag = TagModel::new();
	let mut layout = FormatLayout::new(Container::Asf);

	data.rewind()?;
	let file_len = data.stream_len_hack()?;

	let mut prefix = [0; HEADER_OBJECT_PREFIX_SIZE as usize];
	if data.read_exact(&mut prefix).is_err() {
		decode_err!(@BAIL Asf, "File is too small to hold a Header Object");
	}

	let (header, object_count) = verify_header(&prefix, file_len)?;
	let content = data.read_bytes((header.size - HEADER_OBJECT_PREFIX_SIZE) as usize)?;

	let objects = read_objects(&content, HEADER_OBJECT_PREFIX_SIZE, parse_mode)?;
	if objects.len() != object_count as usize {
		log::debug!(
			"ASF: Header Object claims {} objects, found {}",
			object_count,
			objects.len()
		);
	}

	layout.push_block(BlockKind::AsfHeader, 0, header.size);

	let mut content_description = None;
	let mut extended_content_description = None;
	let mut file_properties = None;
	let mut stream_properties = None;

	for object in &objects {
		match object.guid {
			CONTENT_DESCRIPTION_GUID if content_description.is_none() => {
				content_description = Some(object_content(&content, object));
			},
			EXTENDED_CONTENT_DESCRIPTION_GUID if extended_content_description.is_none() => {
				extended_content_description = Some(object_content(&content, object));
			},
			FILE_PROPERTIES_GUID => file_properties = Some(object_content(&content, object)),
			// Only the first audio stream is used
			STREAM_PROPERTIES_GUID if stream_properties.is_none() => {
				let content = object_content(&content, object);
				if content.starts_with(&AUDIO_MEDIA_GUID.0) {
					stream_properties = Some(content);
				}
			},
			PADDING_GUID => layout.push_block(BlockKind::Padding, object.start, object.size),
			guid => log::trace!("ASF: Skipping object {:?}", guid),
		}
	}

	// The Content Description Object takes precedence
	if let Some(content) = content_description {
		parse_content_description(content, parse_mode, &mut tag, &mut layout)?;
	}

	if let Some(content) = extended_content_description {
		parse_extended_content_description(content, parse_mode, &mut tag, &mut layout)?;
	}

	layout.audio_offset = header.size;
	layout.audio_len = file_len - header.size;

	let mut data_header = [0; OBJECT_HEADER_SIZE as usize];
	data.seek(SeekFrom::Start(header.size))?;
	match data.read_exact(&mut data_header) {
		Ok(()) if data_header[..16] == DATA_OBJECT_GUID.0 => {
			let data_object = ObjectInfo::parse(&data_header, header.size)?;
			layout.audio_len = data_object.size.min(layout.audio_len);
		},
		_ => log::warn!("ASF: No Data Object follows the Header Object"),
	}

	let mut properties = AudioProperties::default();
	if parse_options.read_properties {
		properties = read_properties(file_properties, stream_properties, layout.audio_len);
	}

	Ok(ParsedFile::new(tag, properties, layout))
}
