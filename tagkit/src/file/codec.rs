//! Dispatch between the container-specific readers and writers

use super::{Container, FormatLayout, ParsedFile};
use crate::config::{ParseOptions, WriteOptions};
use crate::error::Result;
use crate::properties::AudioProperties;
use crate::tag::TagModel;

use std::io::{Read, Seek};

pub(crate) fn read_from<R>(
	reader: &mut R,
	container: Container,
	parse_options: ParseOptions,
) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	if !parse_options.read_tags && !parse_options.read_properties {
		log::warn!("Skipping both tag and property reading, file will be empty");
	}

	log::debug!("Reading {:?} file", container);

	let result = match container {
		Container::Mpeg => crate::mpeg::read_from(reader, parse_options),
		Container::OggVorbis => crate::ogg::vorbis::read_from(reader, parse_options),
		Container::Flac => crate::flac::read_from(reader, parse_options),
		Container::Mpc => crate::musepack::read_from(reader, parse_options),
		Container::OggFlac => crate::ogg::flac::read_from(reader, parse_options),
		Container::WavPack => crate::wavpack::read_from(reader, parse_options),
		Container::Speex => crate::ogg::speex::read_from(reader, parse_options),
		Container::TrueAudio => crate::trueaudio::read_from(reader, parse_options),
		Container::Mp4 => crate::mp4::read_from(reader, parse_options),
		Container::Asf => crate::asf::read_from(reader, parse_options),
	};

	let mut parsed = result.map_err(|err| err.truncation_as_corrupt(container))?;

	// The layout is always kept, so writing never loses the native items
	if !parse_options.read_tags {
		parsed.tag = TagModel::new();
	}

	if !parse_options.read_properties {
		parsed.properties = AudioProperties::default();
	}

	Ok(parsed)
}

pub(crate) fn write_to(
	original: &[u8],
	layout: &FormatLayout,
	tag: &TagModel,
	write_options: WriteOptions,
) -> Result<Vec<u8>> {
	let written = match layout.container {
		Container::Mpeg | Container::TrueAudio => {
			crate::id3::write_to(original, layout, tag, write_options)?
		},
		Container::OggVorbis | Container::Speex | Container::OggFlac => {
			crate::ogg::write_to(original, layout, tag, write_options)?
		},
		Container::Flac => crate::flac::write_to(original, layout, tag, write_options)?,
		Container::Mpc | Container::WavPack => {
			crate::ape::write_to(original, layout, tag, write_options)?
		},
		Container::Mp4 => crate::mp4::write_to(original, layout, tag, write_options)?,
		Container::Asf => crate::asf::write_to(original, layout, tag, write_options)?,
	};

	log::debug!(
		"Wrote {:?} file, {} -> {} bytes",
		layout.container,
		original.len(),
		written.len()
	);

	Ok(written)
}
