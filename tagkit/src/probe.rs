//! Format-agonostic file parsing tools

use crate::config::ParseOptions;
use crate::error::Result;
use crate::file::{Container, ContainerGuessResult, ParsedFile, codec};
use crate::macros::err;
use crate::mpeg::header::find_frame;

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, SeekFrom};
use std::path::Path;

// Enough to hold the first OGG page header with a full segment table, and the codec identifier after it
const GUESS_BUFFER_SIZE: u64 = 27 + 255 + 8;

/// A format agnostic reader
///
/// This provides a way to determine the [`Container`] of a reader, for when a concrete
/// type is not known.
///
/// ## Usage
///
/// When reading from a path, the [`Container`] will be inferred from the path, rather than the
/// open file.
///
/// ```rust,no_run
/// # fn main() -> tagkit::error::Result<()> {
/// use tagkit::file::Container;
/// use tagkit::probe::Probe;
///
/// let probe = Probe::open("path/to/my.mp3")?;
///
/// // Inferred from the `mp3` extension
/// assert_eq!(probe.container(), Some(Container::Mpeg));
/// # Ok(())
/// # }
/// ```
///
/// When a path isn't available, or is unreliable, content-based detection is also possible.
///
/// ```rust
/// # fn main() -> tagkit::error::Result<()> {
/// use std::io::Cursor;
/// use tagkit::file::Container;
/// use tagkit::probe::Probe;
///
/// static TTA_HEADER: &[u8; 4] = b"TTA1";
///
/// let probe = Probe::new(Cursor::new(TTA_HEADER)).guess_container()?;
///
/// // Inferred from the TrueAudio header
/// assert_eq!(probe.container(), Some(Container::TrueAudio));
/// # Ok(())
/// # }
/// ```
pub struct Probe<R: Read> {
	inner: R,
	options: Option<ParseOptions>,
	container: Option<Container>,
}

impl<R: Read> Probe<R> {
	/// Create a new `Probe`
	///
	/// Before creating a `Probe`, consider wrapping it in a [`BufReader`] for better
	/// performance.
	#[must_use]
	pub const fn new(reader: R) -> Self {
		Self {
			inner: reader,
			options: None,
			container: None,
		}
	}

	/// Create a new `Probe` with a specified [`Container`]
	///
	/// This skips detection entirely.
	pub fn with_container(reader: R, container: Container) -> Self {
		Self {
			inner: reader,
			options: None,
			container: Some(container),
		}
	}

	/// Returns the current [`Container`]
	pub fn container(&self) -> Option<Container> {
		self.container
	}

	/// Set the [`Container`] with which to read the file
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::file::Container;
	/// use tagkit::probe::Probe;
	///
	/// # let reader = std::io::Cursor::new(&[]);
	/// let probe = Probe::new(reader);
	/// assert_eq!(probe.container(), None);
	///
	/// let probe = probe.set_container(Container::Mpeg);
	/// assert_eq!(probe.container(), Some(Container::Mpeg));
	/// ```
	pub fn set_container(mut self, container: Container) -> Self {
		self.container = Some(container);
		self
	}

	/// Set the [`ParseOptions`] for the Probe
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::config::ParseOptions;
	/// use tagkit::probe::Probe;
	///
	/// # let reader = std::io::Cursor::new(&[]);
	/// // By default, properties will be read.
	/// // In this example, we want to turn this off.
	/// let options = ParseOptions::new().read_properties(false);
	///
	/// let probe = Probe::new(reader).options(options);
	/// ```
	#[must_use]
	pub fn options(mut self, options: ParseOptions) -> Self {
		self.options = Some(options);
		self
	}

	/// Extract the reader
	pub fn into_inner(self) -> R {
		self.inner
	}
}

impl Probe<BufReader<File>> {
	/// Opens a file for reading
	///
	/// This will initially guess the [`Container`] from the path, but
	/// this can be overwritten with [`Probe::guess_container`] or [`Probe::set_container`]
	///
	/// # Errors
	///
	/// * `path` does not exist
	pub fn open<P>(path: P) -> Result<Self>
	where
		P: AsRef<Path>,
	{
		let path = path.as_ref();
		log::debug!("Probe: Opening `{}` for reading", path.display());

		let container = Container::from_path(path);
		log::debug!("Probe: Guessed container `{:?}` from extension", container);

		Ok(Self {
			inner: BufReader::new(File::open(path)?),
			options: None,
			container,
		})
	}
}

impl<R: Read + Seek> Probe<R> {
	/// Attempts to get the [`Container`] based on the data in the reader
	///
	/// On success, the container will be replaced. If the content is inconclusive, the current
	/// container (possibly guessed from an extension) is kept. The reader is restored to its position.
	///
	/// NOTE: The chance for succeeding is influenced by [`ParseOptions`].
	/// Be sure to set it with [`Probe::options()`] prior to calling this method.
	/// Some MPEG files may require more than the default [`ParseOptions::DEFAULT_MAX_JUNK_BYTES`] to be detected successfully.
	///
	/// # Errors
	///
	/// All errors that occur within this function are [`std::io::Error`].
	/// If an error does occur, there is likely an issue with the provided
	/// reader, and the entire `Probe` should be discarded.
	pub fn guess_container(mut self) -> std::io::Result<Self> {
		let max_junk_bytes = self
			.options
			.map_or(ParseOptions::DEFAULT_MAX_JUNK_BYTES, |options| {
				options.max_junk_bytes
			});

		let starting_position = self.inner.stream_position()?;
		let guessed = self.guess_inner(starting_position, max_junk_bytes);
		self.inner.seek(SeekFrom::Start(starting_position))?;

		self.container = guessed?.or(self.container);
		log::debug!("Probe: Guessed container: {:?}", self.container);

		Ok(self)
	}

	fn read_prefix(&mut self) -> std::io::Result<Vec<u8>> {
		let mut buf = Vec::new();
		std::io::copy(
			&mut self.inner.by_ref().take(GUESS_BUFFER_SIZE),
			&mut Cursor::new(&mut buf),
		)?;

		Ok(buf)
	}

	fn guess_inner(
		&mut self,
		starting_position: u64,
		max_junk_bytes: usize,
	) -> std::io::Result<Option<Container>> {
		let buf = self.read_prefix()?;

		let Some(guess) = Container::from_buffer_inner(&buf) else {
			return Ok(None);
		};

		match guess {
			ContainerGuessResult::Determined(container) => Ok(Some(container)),
			// The file starts with an ID3v2 tag, this means other data can follow (e.g. FLAC or MPEG frames)
			ContainerGuessResult::MaybePrecededById3(id3_len) => {
				log::debug!("Probe: ID3v2 tag detected, skipping {} bytes", id3_len);

				let position_after_id3_block =
					self.inner.seek(SeekFrom::Start(starting_position + id3_len))?;

				let buf = self.read_prefix()?;
				if let Some(container) = Container::quick_type_guess(&buf) {
					return Ok(Some(container));
				}

				self.inner.seek(SeekFrom::Start(position_after_id3_block))?;
				self.check_mpeg(max_junk_bytes)
			},
			ContainerGuessResult::MaybePrecededByJunk => {
				log::debug!(
					"Probe: Possible junk bytes detected, searching up to {} bytes",
					max_junk_bytes
				);

				self.inner.seek(SeekFrom::Start(starting_position))?;
				self.check_mpeg(max_junk_bytes)
			},
		}
	}

	/// Searches for a valid MPEG frame header, which may be preceded by junk bytes
	fn check_mpeg(&mut self, max_junk_bytes: usize) -> std::io::Result<Option<Container>> {
		let mut restricted_reader = self.inner.by_ref().take(max_junk_bytes as u64 + 4);
		match find_frame(&mut restricted_reader)? {
			Some((offset, _)) => {
				log::debug!("Probe: Found MPEG frame header {} bytes in", offset);
				Ok(Some(Container::Mpeg))
			},
			None => Ok(None),
		}
	}

	/// Attempts to extract a [`ParsedFile`] from the reader
	///
	/// If `read_properties` is false, the properties will be zeroed out.
	///
	/// # Errors
	///
	/// * No container
	///     - This expects the container to have been set already, either with
	///       [`Probe::guess_container`] or [`Probe::set_container`]. When reading from
	///       paths, this is not necessary.
	/// * The reader contains invalid data
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::error::ErrorKind;
	/// use tagkit::probe::Probe;
	///
	/// let probe = Probe::new(std::io::Cursor::new(b"not audio")).guess_container().unwrap();
	///
	/// let err = probe.read().unwrap_err();
	/// assert!(matches!(err.kind(), ErrorKind::UnrecognizedFormat));
	/// ```
	pub fn read(self) -> Result<ParsedFile> {
		self.read_inner().map(|(parsed, _)| parsed)
	}

	pub(crate) fn read_inner(mut self) -> Result<(ParsedFile, R)> {
		let options = self.options.unwrap_or_default();

		let Some(container) = self.container else {
			err!(UnrecognizedFormat)
		};

		let parsed = codec::read_from(&mut self.inner, container, options)?;
		Ok((parsed, self.inner))
	}
}

/// Read a [`ParsedFile`] from a reader
///
/// The container is guessed from the content. Offsets in the resulting
/// [`FormatLayout`](crate::file::FormatLayout) are positions in `reader`.
///
/// # Errors
///
/// * [`ErrorKind::UnrecognizedFormat`](crate::error::ErrorKind::UnrecognizedFormat)
/// * The reader contains invalid data
pub fn read_from<R>(reader: &mut R, parse_options: ParseOptions) -> Result<ParsedFile>
where
	R: Read + Seek,
{
	Probe::new(reader)
		.options(parse_options)
		.guess_container()?
		.read()
}

/// Read a [`ParsedFile`] from a path
///
/// The container is guessed from the content, falling back to the extension.
///
/// # Errors
///
/// See [`read_from`]
pub fn read_from_path<P>(path: P) -> Result<ParsedFile>
where
	P: AsRef<Path>,
{
	Probe::open(path)?.guess_container()?.read()
}

/// Read a [`ParsedFile`] from an in-memory file
///
/// `container` skips detection when provided. See [`ParsedFile::write`] for writing back.
///
/// # Errors
///
/// See [`read_from`]
pub fn read_from_bytes(
	bytes: &[u8],
	container: Option<Container>,
	parse_options: ParseOptions,
) -> Result<ParsedFile> {
	let probe = Probe::new(Cursor::new(bytes)).options(parse_options);
	match container {
		Some(container) => probe.set_container(container).read(),
		None => probe.guess_container()?.read(),
	}
}
