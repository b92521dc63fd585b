use super::Container;
use crate::tag::FieldKey;

use std::ops::Range;

/// The kind of a [`MetadataBlock`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum BlockKind {
	/// An ID3v2 tag, including its header, padding and footer
	Id3v2,
	/// The 128 byte ID3v1 tag
	Id3v1,
	/// An APEv2 tag, including its header and footer
	Ape,
	/// A FLAC `VORBIS_COMMENT` block
	VorbisComments,
	/// Space reserved for metadata growth (FLAC `PADDING`, MP4 `free`, ASF Padding Object)
	Padding,
	/// The pages holding the header packets of an OGG stream
	OggHeaders,
	/// The MP4 `ilst` atom
	Ilst,
	/// The ASF Header Object
	AsfHeader,
}

/// A region of the file holding metadata
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MetadataBlock {
	pub(crate) kind: BlockKind,
	pub(crate) offset: u64,
	pub(crate) size: u64,
}

impl MetadataBlock {
	pub(crate) fn new(kind: BlockKind, offset: u64, size: u64) -> Self {
		Self { kind, offset, size }
	}

	/// The kind of the block
	pub fn kind(&self) -> BlockKind {
		self.kind
	}

	/// The absolute offset of the block
	pub fn offset(&self) -> u64 {
		self.offset
	}

	/// The full size of the block, including any headers
	pub fn size(&self) -> u64 {
		self.size
	}

	/// The offset just past the end of the block
	pub fn end(&self) -> u64 {
		self.offset + self.size
	}

	pub(crate) fn range(&self) -> Range<usize> {
		self.offset as usize..self.end() as usize
	}
}

/// A natively encoded metadata unit, kept verbatim
///
/// Items that back a canonical field (such as an ID3v2 `TIT2` frame) *shadow* it. A shadowing item is
/// rewritten as-is until its field is modified, at which point the field is encoded from the
/// [`TagModel`](crate::tag::TagModel) instead. Every other item is always rewritten as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionItem {
	pub(crate) key: String,
	pub(crate) shadows: Option<FieldKey>,
	pub(crate) raw: Vec<u8>,
}

impl ExtensionItem {
	pub(crate) fn new(key: impl Into<String>, shadows: Option<FieldKey>, raw: Vec<u8>) -> Self {
		Self {
			key: key.into(),
			shadows,
			raw,
		}
	}

	/// The native key of the item
	///
	/// This is the frame ID for ID3v2, the field name for Vorbis comments, the item key for APEv2,
	/// the atom identifier for MP4, and the descriptor name for ASF.
	pub fn key(&self) -> &str {
		&self.key
	}

	/// The canonical field this item backs, if any
	pub fn shadows(&self) -> Option<FieldKey> {
		self.shadows
	}

	/// The item, as it is encoded in the file
	pub fn raw(&self) -> &[u8] {
		&self.raw
	}
}

/// A map of the metadata and audio regions of a file
///
/// This is produced by the parsers, and consumed by the writers to know what can be reused.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatLayout {
	pub(crate) container: Container,
	pub(crate) blocks: Vec<MetadataBlock>,
	pub(crate) audio_offset: u64,
	pub(crate) audio_len: u64,
	pub(crate) extensions: Vec<ExtensionItem>,
	pub(crate) id3v2_version: Option<u8>,
	pub(crate) vendor: Option<String>,
}

impl FormatLayout {
	pub(crate) fn new(container: Container) -> Self {
		Self {
			container,
			blocks: Vec::new(),
			audio_offset: 0,
			audio_len: 0,
			extensions: Vec::new(),
			id3v2_version: None,
			vendor: None,
		}
	}

	/// The container of the file
	pub fn container(&self) -> Container {
		self.container
	}

	/// Every metadata block found, in file order
	pub fn blocks(&self) -> &[MetadataBlock] {
		&self.blocks
	}

	/// The first block of the given kind
	pub fn block(&self, kind: BlockKind) -> Option<&MetadataBlock> {
		self.blocks.iter().find(|block| block.kind == kind)
	}

	/// The absolute offset of the audio data
	pub fn audio_offset(&self) -> u64 {
		self.audio_offset
	}

	/// The length of the audio data
	pub fn audio_len(&self) -> u64 {
		self.audio_len
	}

	/// The range of the audio data
	pub fn audio_range(&self) -> Range<u64> {
		self.audio_offset..self.audio_offset + self.audio_len
	}

	/// The preserved native items, in file order
	pub fn extensions(&self) -> &[ExtensionItem] {
		&self.extensions
	}

	/// The major version of the ID3v2 tag, if one exists
	pub fn id3v2_version(&self) -> Option<u8> {
		self.id3v2_version
	}

	/// The vendor string of the Vorbis comments, if any
	pub fn vendor(&self) -> Option<&str> {
		self.vendor.as_deref()
	}

	/// Whether the file ends with an ID3v1 tag
	pub fn has_id3v1(&self) -> bool {
		self.block(BlockKind::Id3v1).is_some()
	}

	/// Removes every item with the given key (case-insensitive) that doesn't back a canonical field
	///
	/// Canonical fields are reset through the [`TagModel`](crate::tag::TagModel) instead.
	///
	/// Returns the number of items removed.
	pub fn remove_extension(&mut self, key: &str) -> usize {
		let before = self.extensions.len();
		self.extensions
			.retain(|item| item.shadows.is_some() || !item.key.eq_ignore_ascii_case(key));

		let removed = before - self.extensions.len();
		if removed > 0 {
			log::debug!("Removed {} extension item(s) with key `{}`", removed, key);
		}

		removed
	}

	pub(crate) fn push_block(&mut self, kind: BlockKind, offset: u64, size: u64) {
		log::trace!("Found {:?} block at {} ({} bytes)", kind, offset, size);

		// Blocks are kept in file order, regardless of the order they're found in
		let idx = self.blocks.partition_point(|block| block.offset <= offset);
		self.blocks.insert(idx, MetadataBlock::new(kind, offset, size));
	}

	pub(crate) fn push_extension(&mut self, item: ExtensionItem) {
		self.extensions.push(item);
	}
}

/// Splits extension items into the ones to rewrite and the fields to encode
///
/// Shadowing items survive until their field is modified. A canonical field is freshly encoded
/// when it holds a value and no surviving item already represents it.
pub(crate) struct WritePlan<'a> {
	pub(crate) items: Vec<&'a ExtensionItem>,
	pub(crate) fields: Vec<FieldKey>,
}

impl<'a> WritePlan<'a> {
	pub(crate) fn new(extensions: &'a [ExtensionItem], tag: &crate::tag::TagModel) -> Self {
		let items: Vec<&ExtensionItem> = extensions
			.iter()
			.filter(|item| match item.shadows {
				Some(field) => !tag.is_field_modified(field),
				None => true,
			})
			.collect();

		let fields = FieldKey::ALL
			.into_iter()
			.filter(|field| !tag.get(*field).is_default())
			.filter(|field| !items.iter().any(|item| item.shadows == Some(*field)))
			.collect();

		Self { items, fields }
	}
}
