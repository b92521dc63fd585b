use super::codec;
use super::{Container, ExtensionItem, FormatLayout};
use crate::config::WriteOptions;
use crate::error::Result;
use crate::properties::AudioProperties;
use crate::tag::TagModel;

/// A parsed file, detached from any handle
///
/// This is what every parser produces. To bind a file on disk, see [`FileSession`](super::FileSession).
///
/// # Examples
///
/// ```rust
/// # fn main() -> tagkit::error::Result<()> {
/// use tagkit::config::{ParseOptions, WriteOptions};
/// use tagkit::file::Container;
///
/// // A minimal FLAC stream: the marker and a STREAMINFO block for 44.1 kHz stereo
/// let mut flac = b"fLaC\x80\x00\x00\x22".to_vec();
/// flac.extend([0x10, 0x00, 0x10, 0x00, 0, 0, 0, 0, 0, 0]);
/// flac.extend([0x0A, 0xC4, 0x42, 0xF0, 0, 0, 0, 0]);
/// flac.extend([0; 16]);
///
/// let mut parsed = tagkit::read_from_bytes(&flac, None, ParseOptions::new())?;
/// assert_eq!(parsed.container(), Container::Flac);
///
/// parsed.tag_mut().set_title("Foo title");
/// let written = parsed.write(&flac, WriteOptions::default())?;
///
/// let reparsed = tagkit::read_from_bytes(&written, None, ParseOptions::new())?;
/// assert_eq!(reparsed.tag().title(), "Foo title");
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct ParsedFile {
	pub(crate) tag: TagModel,
	pub(crate) properties: AudioProperties,
	pub(crate) layout: FormatLayout,
}

impl ParsedFile {
	pub(crate) fn new(tag: TagModel, properties: AudioProperties, layout: FormatLayout) -> Self {
		Self {
			tag,
			properties,
			layout,
		}
	}

	/// The container of the file
	pub fn container(&self) -> Container {
		self.layout.container
	}

	/// The file's metadata
	pub fn tag(&self) -> &TagModel {
		&self.tag
	}

	/// A mutable reference to the file's metadata
	pub fn tag_mut(&mut self) -> &mut TagModel {
		&mut self.tag
	}

	/// Consume the `ParsedFile`, returning its metadata
	pub fn into_tag(self) -> TagModel {
		self.tag
	}

	/// The audio properties of the stream
	pub fn properties(&self) -> &AudioProperties {
		&self.properties
	}

	/// The metadata and audio regions of the file
	pub fn layout(&self) -> &FormatLayout {
		&self.layout
	}

	/// The native items preserved from the file
	pub fn extensions(&self) -> &[ExtensionItem] {
		self.layout.extensions()
	}

	/// See [`FormatLayout::remove_extension`]
	pub fn remove_extension(&mut self, key: &str) -> usize {
		self.layout.remove_extension(key)
	}

	/// Whether the file holds any metadata or readable audio properties
	pub fn is_valid(&self) -> bool {
		!self.tag.is_empty() || !self.properties.is_empty() || !self.layout.blocks.is_empty()
	}

	/// Encode the current metadata into `original`, returning the new file contents
	///
	/// `original` must be the exact bytes this file was parsed from. It is never modified.
	///
	/// # Errors
	///
	/// * `original` no longer matches the layout
	/// * The metadata is too large for the container
	pub fn write(&self, original: &[u8], write_options: WriteOptions) -> Result<Vec<u8>> {
		log::debug!("Writing {:?} file", self.container());
		codec::write_to(original, &self.layout, &self.tag, write_options)
	}
}
