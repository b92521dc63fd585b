use crate::asf::constants::HEADER_OBJECT_GUID;
use crate::id3::v2::synchsafe::SynchsafeInteger;
use crate::mpeg::header::Header;

use std::ffi::OsStr;
use std::path::Path;

/// Every extension recognized by [`Container::from_ext`]
pub const EXTENSIONS: &[&str] = &[
	// Also update `Container::from_ext()` below
	"mp3", "mp2", "mp1", "mpga", "ogg", "oga", "flac", "mpc", "mp+", "mpp", "wv", "spx", "tta",
	"m4a", "m4b", "m4p", "m4r", "m4v", "mp4", "3g2", "wma", "asf", "wmv",
];

/// The audio container of a file
///
/// The discriminants are stable, see [`Container::index`].
#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Container {
	/// MPEG audio (MP1/MP2/MP3), tagged with ID3v2 and ID3v1
	Mpeg = 0,
	/// Vorbis in an OGG stream, tagged with Vorbis comments
	OggVorbis = 1,
	/// Native FLAC, tagged with Vorbis comments
	Flac = 2,
	/// Musepack (SV7 and SV8), tagged with APEv2
	Mpc = 3,
	/// FLAC in an OGG stream, tagged with Vorbis comments
	OggFlac = 4,
	/// WavPack, tagged with APEv2
	WavPack = 5,
	/// Speex in an OGG stream, tagged with Vorbis comments
	Speex = 6,
	/// TrueAudio, tagged with ID3v2 and ID3v1
	TrueAudio = 7,
	/// MPEG-4 audio, tagged with an `ilst` atom
	Mp4 = 8,
	/// Advanced Systems Format (WMA), tagged with content description objects
	Asf = 9,
}

impl Container {
	/// Every container, ordered by index
	pub const ALL: [Container; 10] = [
		Container::Mpeg,
		Container::OggVorbis,
		Container::Flac,
		Container::Mpc,
		Container::OggFlac,
		Container::WavPack,
		Container::Speex,
		Container::TrueAudio,
		Container::Mp4,
		Container::Asf,
	];

	/// The stable numeric index of the container
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::file::Container;
	///
	/// assert_eq!(Container::Mpeg.index(), 0);
	/// assert_eq!(Container::Asf.index(), 9);
	/// ```
	pub fn index(self) -> u8 {
		self as u8
	}

	/// Get a `Container` from its stable numeric index
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::file::Container;
	///
	/// assert_eq!(Container::from_index(2), Some(Container::Flac));
	/// assert_eq!(Container::from_index(10), None);
	/// ```
	pub fn from_index(index: u8) -> Option<Self> {
		Self::ALL.get(usize::from(index)).copied()
	}

	/// Attempts to determine a `Container` from an extension
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::file::Container;
	///
	/// let extension = "mp3";
	/// assert_eq!(Container::from_ext(extension), Some(Container::Mpeg));
	/// ```
	pub fn from_ext<E>(ext: E) -> Option<Self>
	where
		E: AsRef<OsStr>,
	{
		let ext = ext.as_ref().to_str()?.to_ascii_lowercase();

		// Also update `EXTENSIONS` above
		match ext.as_str() {
			"mp3" | "mp2" | "mp1" | "mpga" => Some(Self::Mpeg),
			"ogg" | "oga" => Some(Self::OggVorbis),
			"flac" => Some(Self::Flac),
			"mpc" | "mp+" | "mpp" => Some(Self::Mpc),
			"wv" => Some(Self::WavPack),
			"spx" => Some(Self::Speex),
			"tta" => Some(Self::TrueAudio),
			"m4a" | "m4b" | "m4p" | "m4r" | "m4v" | "mp4" | "3g2" => Some(Self::Mp4),
			"wma" | "asf" | "wmv" => Some(Self::Asf),
			_ => None,
		}
	}

	/// Attempts to extract a `Container` from a path
	///
	/// # Examples
	///
	/// ```rust
	/// use std::path::Path;
	/// use tagkit::file::Container;
	///
	/// let path = Path::new("path/to/my.mpc");
	/// assert_eq!(Container::from_path(path), Some(Container::Mpc));
	/// ```
	pub fn from_path<P>(path: P) -> Option<Self>
	where
		P: AsRef<Path>,
	{
		let ext = path.as_ref().extension();
		ext.and_then(Self::from_ext)
	}

	/// Attempts to determine a `Container` from a buffer
	///
	/// NOTE: This is for use in [`Probe::guess_container`](crate::probe::Probe::guess_container), it
	/// is recommended to use it that way. This makes no attempt to search past an ID3v2 tag or junk.
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::file::Container;
	///
	/// assert_eq!(Container::from_buffer(b"fLaC\0\0\0\x22"), Some(Container::Flac));
	/// assert_eq!(Container::from_buffer(b"TTA1\x01\0"), Some(Container::TrueAudio));
	/// ```
	pub fn from_buffer(buf: &[u8]) -> Option<Self> {
		match Self::from_buffer_inner(buf) {
			Some(ContainerGuessResult::Determined(container)) => Some(container),
			_ => None,
		}
	}

	pub(crate) fn from_buffer_inner(buf: &[u8]) -> Option<ContainerGuessResult> {
		if buf.is_empty() {
			return None;
		}

		if let Some(container) = Self::quick_type_guess(buf) {
			return Some(ContainerGuessResult::Determined(container));
		}

		// The bare minimum size for an ID3v2 header is 10 bytes
		if buf.len() >= 10 && &buf[..3] == b"ID3" {
			let size = u32::from_be_bytes([buf[6], buf[7], buf[8], buf[9]]);
			let has_footer = buf[5] & 0x10 != 0;

			let mut tag_len = 10 + u64::from(size.unsynch());
			if has_footer {
				tag_len += 10;
			}

			return Some(ContainerGuessResult::MaybePrecededById3(tag_len));
		}

		Some(ContainerGuessResult::MaybePrecededByJunk)
	}

	/// Checks the signature of a stream that is known to start right at `buf`
	///
	/// Used both at the start of the file and right after an ID3v2 tag.
	pub(crate) fn quick_type_guess(buf: &[u8]) -> Option<Self> {
		match buf {
			[b'f', b'L', b'a', b'C', ..] => Some(Self::Flac),
			[b'M', b'P', b'C', b'K', ..] | [b'M', b'P', b'+', ..] => Some(Self::Mpc),
			[b'w', b'v', b'p', b'k', ..] => Some(Self::WavPack),
			[b'T', b'T', b'A', b'1', ..] => Some(Self::TrueAudio),
			[b'O', b'g', b'g', b'S', ..] => Self::guess_ogg(buf),
			_ if buf.len() >= 8 && &buf[4..8] == b"ftyp" => Some(Self::Mp4),
			_ if buf.len() >= 16 && buf[..16] == HEADER_OBJECT_GUID.0 => Some(Self::Asf),
			[0xFF, b1, b2, b3, ..] if Header::from_bytes([0xFF, *b1, *b2, *b3]).is_some() => {
				Some(Self::Mpeg)
			},
			_ => None,
		}
	}

	// The first packet identifies the codec, and sits right after the segment table of the first page
	fn guess_ogg(buf: &[u8]) -> Option<Self> {
		let segment_count = usize::from(*buf.get(26)?);
		let packet = buf.get(27 + segment_count..)?;

		if packet.starts_with(b"\x01vorbis") {
			return Some(Self::OggVorbis);
		}

		if packet.starts_with(b"\x7FFLAC") {
			return Some(Self::OggFlac);
		}

		if packet.starts_with(b"Speex   ") {
			return Some(Self::Speex);
		}

		None
	}
}

pub(crate) enum ContainerGuessResult {
	Determined(Container),
	/// The full size of the tag, including its header and footer
	MaybePrecededById3(u64),
	MaybePrecededByJunk,
}
