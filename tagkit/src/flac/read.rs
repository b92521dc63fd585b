use super::block::{BLOCK_ID_PADDING, BLOCK_ID_STREAMINFO, BLOCK_ID_VORBIS_COMMENTS, Block};
use crate::config::{ParseOptions, ParsingMode};
use crate::error::Result;
use crate::file::{BlockKind, Container, FormatLayout, ParsedFile};
use crate::id3;
use crate::macros::{decode_err, err};
use crate::ogg::comments::parse_comments;
use crate::properties::AudioProperties;
use crate::tag::TagModel;
use crate::util::io::SeekStreamLen;

use std::io::{Read, Seek};

// Minimum/maximum block size (4), minimum/maximum frame size (6), stream info (8), MD5 (16)
const STREAMINFO_SIZE: usize = 34;

pub(super) fn verify_flac<R>(data: &mut R) -> Result<Block>
where
	R: Read + Seek,
{
	let mut marker = [0; 4];
	data.read_exact(&mut marker)?;

	if &marker != b"fLaC" {
		decode_err!(@BAIL Flac, "File missing \"fLaC\" stream marker");
	}

	let block = Block::read(data, |_| true)?;

	if block.ty != BLOCK_ID_STREAMINFO {
		decode_err!(@BAIL Flac, "File missing mandatory STREAMINFO block");
	}

	if block.content.len() < STREAMINFO_SIZE {
		decode_err!(@BAIL Flac, "File has an invalid STREAMINFO block size (< 34)");
	}

	log::debug!("File verified to be FLAC");
	Ok(block)
}

pub(crate) fn read_from<R>(data: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	let mut tag = TagModel::new();
	let mut layout = FormatLayout::new(Container::Flac);

	// It is possible for a FLAC file to contain an ID3v2 tag
	data.rewind()?;
	id3::skip_id3v2(data, &mut layout)?;

	let stream_info = verify_flac(data)?;

	let mut last_block = stream_info.last;
	let mut found_comments = false;

	while !last_block {
		let block = Block::read(data, |block_type| block_type == BLOCK_ID_VORBIS_COMMENTS)?;
		last_block = block.last;

		match block.ty {
			BLOCK_ID_PADDING => layout.push_block(BlockKind::Padding, block.start, block.size()),
			BLOCK_ID_VORBIS_COMMENTS => {
				layout.push_block(BlockKind::VorbisComments, block.start, block.size());

				// NOTE: According to the FLAC format
				//
				// <https://xiph.org/flac/format.html#def_VORBIS_COMMENT>:
				// "There may be only one VORBIS_COMMENT block in a stream."
				//
				// Any others are discarded on write.
				if found_comments {
					if parse_options.parsing_mode == ParsingMode::Strict {
						decode_err!(@BAIL Flac, "Streams are only allowed one Vorbis Comments block per stream");
					}

					log::warn!("FLAC: Ignoring an extra Vorbis Comments block");
					continue;
				}

				log::debug!("Encountered a Vorbis Comments block, parsing");
				parse_comments(&block.content, parse_options.parsing_mode, &mut tag, &mut layout)?;
				found_comments = true;
			},
			_ => {},
		}
	}

	let audio_offset = data.stream_position()?;
	let file_length = data.stream_len_hack()?;

	// In the event that a block lies about its size, the current position could be
	// completely wrong.
	if audio_offset > file_length {
		err!(SizeMismatch);
	}

	layout.audio_offset = audio_offset;
	layout.audio_len = file_length - audio_offset;

	let properties = if parse_options.read_properties {
		super::properties::read_properties(&stream_info.content, layout.audio_len)?
	} else {
		AudioProperties::default()
	};

	Ok(ParsedFile::new(tag, properties, layout))
}
