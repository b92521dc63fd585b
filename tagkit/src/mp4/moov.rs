use super::atom_info::{AtomInfo, read_atoms};
use crate::config::ParsingMode;
use crate::error::Result;

/// The atoms of a `moov` atom that hold metadata or audio information
///
/// Positions are absolute. `data` holds the bytes starting at position `base`, which must cover
/// the content of `moov`.
pub(super) struct Moov<'a> {
	data: &'a [u8],
	base: u64,
	parse_mode: ParsingMode,
	pub(super) atom: AtomInfo,
	pub(super) mvhd: Option<AtomInfo>,
	/// Every `trak.mdia` atom
	pub(super) mdias: Vec<AtomInfo>,
	/// Every `stco` and `co64` atom
	pub(super) chunk_offsets: Vec<AtomInfo>,
	pub(super) udta: Option<AtomInfo>,
	pub(super) meta: Option<AtomInfo>,
	pub(super) ilst: Option<AtomInfo>,
	/// The `free` atoms directly following `ilst`
	pub(super) padding: Vec<AtomInfo>,
}

impl<'a> Moov<'a> {
	/// Walks a `moov` atom
	pub(super) fn parse(
		atom: AtomInfo,
		data: &'a [u8],
		base: u64,
		parse_mode: ParsingMode,
	) -> Result<Self> {
		let mut moov = Self {
			data,
			base,
			parse_mode,
			atom,
			mvhd: None,
			mdias: Vec::new(),
			chunk_offsets: Vec::new(),
			udta: None,
			meta: None,
			ilst: None,
			padding: Vec::new(),
		};

		for child in moov.children(&atom, 0)? {
			match &child.ident {
				b"mvhd" => moov.mvhd = Some(child),
				b"trak" => moov.read_trak(&child)?,
				// Only the first `udta` is used
				b"udta" if moov.udta.is_none() => {
					moov.udta = Some(child);
					moov.read_udta(&child)?;
				},
				_ => {},
			}
		}

		Ok(moov)
	}

	/// The content of `atom`, skipping `skip` bytes
	pub(super) fn content(&self, atom: &AtomInfo, skip: u64) -> &'a [u8] {
		let range = atom.content_range();
		let start = (range.start as u64 + skip - self.base) as usize;
		let end = (range.end as u64 - self.base) as usize;

		self.data.get(start..end).unwrap_or_default()
	}

	/// The whole atom, header included
	pub(super) fn raw(&self, atom: &AtomInfo) -> &'a [u8] {
		let start = (atom.start - self.base) as usize;
		let end = (atom.end() - self.base) as usize;

		self.data.get(start..end).unwrap_or_default()
	}

	/// The children of `atom`, skipping `skip` bytes of its content
	pub(super) fn children(&self, atom: &AtomInfo, skip: u64) -> Result<Vec<AtomInfo>> {
		let base = atom.start + atom.header_size() + skip;
		read_atoms(self.content(atom, skip), base, self.parse_mode)
	}

	fn read_trak(&mut self, trak: &AtomInfo) -> Result<()> {
		let Some(mdia) = self.children(trak, 0)?.into_iter().find(|atom| &atom.ident == b"mdia")
		else {
			return Ok(());
		};

		self.mdias.push(mdia);

		// mdia.minf.stbl.(stco|co64)
		let mut containers = vec![mdia];
		while let Some(container) = containers.pop() {
			for child in self.children(&container, 0)? {
				match &child.ident {
					b"minf" | b"stbl" => containers.push(child),
					b"stco" | b"co64" => self.chunk_offsets.push(child),
					_ => {},
				}
			}
		}

		Ok(())
	}

	fn read_udta(&mut self, udta: &AtomInfo) -> Result<()> {
		let Some(meta) = self.children(udta, 0)?.into_iter().find(|atom| &atom.ident == b"meta")
		else {
			return Ok(());
		};

		self.meta = Some(meta);

		let mut children = self.children(&meta, meta_skip(self.content(&meta, 0)))?.into_iter();
		let Some(ilst) = children.find(|atom| &atom.ident == b"ilst") else {
			return Ok(());
		};

		self.ilst = Some(ilst);
		self.padding = children.take_while(|atom| &atom.ident == b"free").collect();

		Ok(())
	}
}

/// The number of bytes to skip before the children of `meta`
///
/// `meta` is a full atom, but some QuickTime files omit the version and flags.
pub(super) fn meta_skip(content: &[u8]) -> u64 {
	match content.get(4..8) {
		Some(b"hdlr") => 0,
		_ => 4,
	}
}
