use super::field_frame;
use super::frame::encode_frame;
use super::header::{HEADER_SIZE, Id3v2Version, encode_header};
use crate::config::{WriteOptions, global_options};
use crate::error::{ErrorKind, Result, TagkitError};
use crate::file::WritePlan;
use crate::tag::{FieldKey, TagModel};

/// Encodes the frames of a tag, kept items first
pub(crate) fn encode_frames(
	plan: &WritePlan<'_>,
	tag: &TagModel,
	version: Id3v2Version,
	write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let mut encoding = write_options
		.id3v2_text_encoding
		.unwrap_or(global_options().id3v2_default_encoding);
	if version == Id3v2Version::V3 {
		encoding = encoding.to_id3v23();
	}

	let mut frames = Vec::new();
	for item in &plan.items {
		frames.extend_from_slice(item.raw());
	}

	for field in &plan.fields {
		let value = tag.get(*field).to_text();
		let encoding = encoding.fitting(&value);

		let mut content = vec![encoding as u8];
		if *field == FieldKey::Comment {
			// Unknown language, empty description
			content.extend_from_slice(b"XXX");
			content.extend(encoding.encode("", true));
		}
		content.extend(encoding.encode(&value, false));

		frames.extend(encode_frame(field_frame(*field, version), &content, version)?);
	}

	Ok(frames)
}

/// Builds a complete tag from `frames`
///
/// When the tag fits in `existing_size`, it is padded to that size so it can be replaced in place.
/// Otherwise, `padding` bytes are added.
///
/// Returns an empty `Vec` when there is nothing to write and no existing tag to replace.
pub(crate) fn build_tag(
	version: Id3v2Version,
	frames: &[u8],
	existing_size: Option<u64>,
	padding: u32,
) -> Result<Vec<u8>> {
	let needed = (HEADER_SIZE + frames.len()) as u64;
	let size = match existing_size {
		Some(existing) if needed <= existing => {
			log::debug!("ID3v2: Tag fits in the existing {} bytes", existing);
			existing
		},
		None if frames.is_empty() => return Ok(Vec::new()),
		_ => {
			log::debug!("ID3v2: Relocating tag, adding {} bytes of padding", padding);
			needed + u64::from(padding)
		},
	};

	let content_size = u32::try_from(size - HEADER_SIZE as u64)
		.map_err(|_| TagkitError::new(ErrorKind::TooMuchData))?;

	let mut tag = Vec::with_capacity(size as usize);
	tag.extend_from_slice(&encode_header(version, content_size)?);
	tag.extend_from_slice(frames);
	tag.resize(size as usize, 0);

	Ok(tag)
}
