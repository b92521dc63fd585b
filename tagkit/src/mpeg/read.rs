use super::header::{VbrHeader, find_frame_in};
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{Container, FormatLayout, ParsedFile};
use crate::id3::read_id3_tags;
use crate::macros::decode_err;
use crate::properties::AudioProperties;
use crate::tag::TagModel;

use std::io::{Read, Seek, SeekFrom};

// The largest possible frame (Layer II, 384 kbps at 32 kHz, padded), plus the next frame's header
const MAX_FRAME_LEN: u64 = 1729 + 4;

pub(crate) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	let mut tag = TagModel::new();
	let mut layout = FormatLayout::new(Container::Mpeg);

	let bounds = read_id3_tags(reader, parse_options, &mut tag, &mut layout)?;

	// Tags might be followed by junk bytes before the first MP3 frame begins
	let search_len =
		(bounds.end - bounds.start).min(parse_options.max_junk_bytes as u64 + MAX_FRAME_LEN);

	reader.seek(SeekFrom::Start(bounds.start))?;
	let mut search_window = Vec::new();
	reader.by_ref().take(search_len).read_to_end(&mut search_window)?;

	let first_frame = find_frame_in(&search_window)
		.filter(|(offset, _)| *offset <= parse_options.max_junk_bytes);

	let Some((relative_offset, first_frame)) = first_frame else {
		if layout.blocks().is_empty() {
			decode_err!(@BAIL Mpeg, "File contains no MPEG frames");
		}

		log::warn!("MPEG: No frames found, properties will be empty");
		layout.audio_offset = bounds.start;
		layout.audio_len = bounds.end - bounds.start;
		return Ok(ParsedFile::new(tag, AudioProperties::default(), layout));
	};

	if relative_offset > 0 {
		log::warn!("MPEG: Skipped {} bytes of junk before the first frame", relative_offset);
	}

	layout.audio_offset = bounds.start + relative_offset as u64;
	layout.audio_len = bounds.end - layout.audio_offset;

	let properties = if parse_options.read_properties {
		let vbr_header = VbrHeader::read(&search_window[relative_offset..], &first_frame);
		super::properties::read_properties(&first_frame, vbr_header, layout.audio_len)
	} else {
		AudioProperties::default()
	};

	Ok(ParsedFile::new(tag, properties, layout))
}
