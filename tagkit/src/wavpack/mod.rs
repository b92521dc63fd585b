//! WavPack specific items
//!
//! WavPack files are a sequence of `wvpk` blocks, followed by an APEv2 tag (and optionally an
//! ID3v1 tag). The audio properties come from the first block that holds samples.
mod properties;

use crate::ape::read_ape_tags;
use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{Container, FormatLayout, ParsedFile};
use crate::macros::decode_err;
use crate::properties::AudioProperties;
use crate::tag::TagModel;

use std::io::{Read, Seek};

pub(crate) fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	let mut tag = TagModel::new();
	let mut layout = FormatLayout::new(Container::WavPack);

	let bounds = read_ape_tags(reader, parse_options, &mut tag, &mut layout)?;
	layout.audio_offset = bounds.start;
	layout.audio_len = bounds.end - bounds.start;

	let mut magic = [0; 4];
	if layout.audio_len < 4 || reader.read_exact(&mut magic).is_err() || &magic != b"wvpk" {
		decode_err!(@BAIL WavPack, "File doesn't start with a \"wvpk\" block");
	}

	let properties = if parse_options.read_properties {
		properties::read_properties(reader, bounds, parse_options.parsing_mode)?
	} else {
		AudioProperties::default()
	};

	Ok(ParsedFile::new(tag, properties, layout))
}
