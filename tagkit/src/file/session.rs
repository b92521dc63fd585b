use super::{Container, ExtensionItem, FormatLayout, ParsedFile};
use crate::config::{ParseOptions, WriteOptions};
use crate::error::{ErrorKind, Result, TagkitError};
use crate::macros::err;
use crate::probe::Probe;
use crate::properties::AudioProperties;
use crate::tag::TagModel;

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

struct OpenState {
	file: File,
	parsed: ParsedFile,
	parse_options: ParseOptions,
	// Set when extension items were removed, which the tag can't track
	extensions_dirty: bool,
}

/// An audio file opened for tag reading and writing
///
/// The session owns a read handle to the file and its parsed metadata. Changes made through
/// [`FileSession::tag_mut`] only reach the disk on [`FileSession::save`], which replaces the file
/// atomically.
///
/// Once [`FileSession::close`]d, every accessor fails with [`ErrorKind::UseAfterClose`].
///
/// # Examples
///
/// ```rust,no_run
/// # fn main() -> tagkit::error::Result<()> {
/// use tagkit::file::FileSession;
///
/// let mut session = FileSession::open("path/to/my.mp3")?;
///
/// println!("Length: {}s", session.properties()?.length_seconds());
///
/// session.tag_mut()?.set_title("Foo title");
/// session.save()?;
/// session.close();
/// # Ok(()) }
/// ```
pub struct FileSession {
	path: PathBuf,
	state: Option<OpenState>,
}

impl FileSession {
	/// Opens a file, detecting its container
	///
	/// The container is determined from the content, falling back to the extension.
	///
	/// # Errors
	///
	/// * [`ErrorKind::OpenError`]: `path` can't be opened or read
	/// * [`ErrorKind::UnrecognizedFormat`]: The container can't be determined
	/// * [`ErrorKind::CorruptContainer`]: The container is missing required structures
	pub fn open<P>(path: P) -> Result<Self>
	where
		P: AsRef<Path>,
	{
		Self::open_with(path, None, ParseOptions::new())
	}

	/// Opens a file, skipping detection
	///
	/// # Errors
	///
	/// See [`FileSession::open`]
	pub fn open_as<P>(path: P, container: Container) -> Result<Self>
	where
		P: AsRef<Path>,
	{
		Self::open_with(path, Some(container), ParseOptions::new())
	}

	/// Opens a file with an optional container hint and custom [`ParseOptions`]
	///
	/// # Errors
	///
	/// See [`FileSession::open`]
	pub fn open_with<P>(
		path: P,
		container: Option<Container>,
		parse_options: ParseOptions,
	) -> Result<Self>
	where
		P: AsRef<Path>,
	{
		let path = path.as_ref();
		log::debug!("Session: Opening `{}`", path.display());

		let (file, parsed) = Self::parse(path, container, parse_options)?;

		Ok(Self {
			path: path.to_path_buf(),
			state: Some(OpenState {
				file,
				parsed,
				parse_options,
				extensions_dirty: false,
			}),
		})
	}

	fn parse(
		path: &Path,
		container: Option<Container>,
		parse_options: ParseOptions,
	) -> Result<(File, ParsedFile)> {
		let file =
			File::open(path).map_err(|err| TagkitError::new(ErrorKind::OpenError(err)))?;

		let mut probe = Probe::new(BufReader::new(file)).options(parse_options);
		match container {
			Some(container) => probe = probe.set_container(container),
			None => {
				// The extension is only used if the content is inconclusive
				if let Some(container) = Container::from_path(path) {
					probe = probe.set_container(container);
				}

				probe = probe
					.guess_container()
					.map_err(|err| TagkitError::new(ErrorKind::OpenError(err)))?;
			},
		}

		let (parsed, reader) = probe.read_inner().map_err(TagkitError::into_open_error)?;
		Ok((reader.into_inner(), parsed))
	}

	fn state(&self) -> Result<&OpenState> {
		match self.state {
			Some(ref state) => Ok(state),
			None => err!(UseAfterClose),
		}
	}

	fn state_mut(&mut self) -> Result<&mut OpenState> {
		match self.state {
			Some(ref mut state) => Ok(state),
			None => err!(UseAfterClose),
		}
	}

	/// The path the session was opened with
	pub fn path(&self) -> &Path {
		&self.path
	}

	/// Whether the session is still open
	pub fn is_open(&self) -> bool {
		self.state.is_some()
	}

	/// Whether the session is open, and the file holds metadata or readable audio properties
	pub fn is_valid(&self) -> bool {
		self.state
			.as_ref()
			.is_some_and(|state| state.parsed.is_valid())
	}

	/// The container of the file
	///
	/// # Errors
	///
	/// [`ErrorKind::UseAfterClose`]
	pub fn container(&self) -> Result<Container> {
		Ok(self.state()?.parsed.container())
	}

	/// The file's metadata
	///
	/// # Errors
	///
	/// [`ErrorKind::UseAfterClose`]
	pub fn tag(&self) -> Result<&TagModel> {
		Ok(&self.state()?.parsed.tag)
	}

	/// A mutable reference to the file's metadata
	///
	/// # Errors
	///
	/// [`ErrorKind::UseAfterClose`]
	pub fn tag_mut(&mut self) -> Result<&mut TagModel> {
		Ok(&mut self.state_mut()?.parsed.tag)
	}

	/// The audio properties of the stream
	///
	/// # Errors
	///
	/// [`ErrorKind::UseAfterClose`]
	pub fn properties(&self) -> Result<&AudioProperties> {
		Ok(&self.state()?.parsed.properties)
	}

	/// The metadata and audio regions of the file, as of the last open or save
	///
	/// # Errors
	///
	/// [`ErrorKind::UseAfterClose`]
	pub fn layout(&self) -> Result<&FormatLayout> {
		Ok(&self.state()?.parsed.layout)
	}

	/// The native items preserved from the file
	///
	/// # Errors
	///
	/// [`ErrorKind::UseAfterClose`]
	pub fn extensions(&self) -> Result<&[ExtensionItem]> {
		Ok(self.state()?.parsed.extensions())
	}

	/// Removes every non-canonical item with the given key
	///
	/// The removal reaches the disk on the next [`FileSession::save`]. See
	/// [`FormatLayout::remove_extension`].
	///
	/// # Errors
	///
	/// [`ErrorKind::UseAfterClose`]
	pub fn remove_extension(&mut self, key: &str) -> Result<usize> {
		let state = self.state_mut()?;

		let removed = state.parsed.remove_extension(key);
		state.extensions_dirty |= removed > 0;

		Ok(removed)
	}

	/// Whether there are changes that haven't been saved
	///
	/// # Errors
	///
	/// [`ErrorKind::UseAfterClose`]
	pub fn is_modified(&self) -> Result<bool> {
		let state = self.state()?;
		Ok(state.extensions_dirty || state.parsed.tag.is_modified())
	}

	/// Saves the changes with the default [`WriteOptions`]
	///
	/// # Errors
	///
	/// See [`FileSession::save_with`]
	pub fn save(&mut self) -> Result<()> {
		self.save_with(WriteOptions::default())
	}

	/// Saves the changes
	///
	/// The file is written to a temporary file in the same directory, which then replaces the
	/// original. If anything fails, the original is left untouched. Afterwards, the layout is
	/// re-read from the new file.
	///
	/// Nothing is written if there are no changes.
	///
	/// # Errors
	///
	/// * [`ErrorKind::UseAfterClose`]
	/// * [`ErrorKind::Io`]: The file couldn't be read, or replaced
	/// * The metadata can't be encoded into the container
	pub fn save_with(&mut self, write_options: WriteOptions) -> Result<()> {
		let path = self.path.clone();
		let state = self.state_mut()?;

		if !state.extensions_dirty && !state.parsed.tag.is_modified() {
			log::debug!("Session: No changes to save");
			return Ok(());
		}

		let mut original = Vec::new();
		state.file.seek(SeekFrom::Start(0))?;
		state.file.read_to_end(&mut original)?;

		let written = state.parsed.write(&original, write_options)?;
		replace_file(&path, &written, &state.file)?;

		let (file, reparsed) = Self::parse(&path, Some(state.parsed.container()), state.parse_options)
			.map_err(|err| match err.kind {
				ErrorKind::OpenError(err) => TagkitError::new(ErrorKind::Io(err)),
				kind => TagkitError::new(kind),
			})?;

		log::debug!("Session: Saved `{}`", path.display());

		state.file = file;
		state.parsed.layout = reparsed.layout;
		state.parsed.properties = reparsed.properties;
		state.parsed.tag.mark_clean();
		state.extensions_dirty = false;

		Ok(())
	}

	/// Closes the session, releasing the file handle
	///
	/// Unsaved changes are discarded. Closing twice has no effect.
	pub fn close(&mut self) {
		if let Some(state) = self.state.take() {
			if state.extensions_dirty || state.parsed.tag.is_modified() {
				log::warn!(
					"Session: Closing `{}` with unsaved changes",
					self.path.display()
				);
			}

			log::debug!("Session: Closed `{}`", self.path.display());
		}
	}

	/// Opens a file, runs `f` on its metadata, then saves and closes it
	///
	/// The file is saved even if `f` fails or panics. An error from saving takes precedence over
	/// one returned by `f`.
	///
	/// # Errors
	///
	/// * See [`FileSession::open`]
	/// * See [`FileSession::save`]
	/// * Any error returned by `f`
	///
	/// # Examples
	///
	/// ```rust,no_run
	/// # fn main() -> tagkit::error::Result<()> {
	/// use tagkit::file::FileSession;
	///
	/// let seconds = FileSession::scoped("path/to/my.flac", |tag, properties| {
	/// 	tag.set_comment("Reviewed");
	/// 	Ok(properties.length_seconds())
	/// })?;
	/// # Ok(()) }
	/// ```
	pub fn scoped<P, F, T>(path: P, f: F) -> Result<T>
	where
		P: AsRef<Path>,
		F: FnOnce(&mut TagModel, &AudioProperties) -> Result<T>,
	{
		let mut guard = ScopeGuard {
			session: Self::open(path)?,
		};

		let state = guard.session.state_mut()?;
		let ret = f(&mut state.parsed.tag, &state.parsed.properties);

		let saved = guard.session.save();
		match (ret, saved) {
			(Ok(value), Ok(())) => Ok(value),
			(Err(err), Ok(())) => Err(err),
			(Ok(_), Err(save_err)) => Err(save_err),
			(Err(err), Err(save_err)) => {
				log::error!("Session: Scope failed with `{}`, and saving failed", err);
				Err(save_err)
			},
		}
	}
}

impl Drop for FileSession {
	fn drop(&mut self) {
		self.close();
	}
}

// Saves on unwind, closes in every case
struct ScopeGuard {
	session: FileSession,
}

impl Drop for ScopeGuard {
	fn drop(&mut self) {
		if std::thread::panicking() {
			if let Err(err) = self.session.save() {
				log::error!(
					"Session: Failed to save `{}` while unwinding: {}",
					self.session.path.display(),
					err
				);
			}
		}

		self.session.close();
	}
}

fn replace_file(path: &Path, contents: &[u8], original: &File) -> Result<()> {
	let dir = match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => parent,
		_ => Path::new("."),
	};

	let mut temp = tempfile::NamedTempFile::new_in(dir)?;
	temp.write_all(contents)?;
	temp.as_file().sync_all()?;

	if let Ok(metadata) = original.metadata() {
		temp.as_file().set_permissions(metadata.permissions())?;
	}

	log::trace!(
		"Session: Replacing `{}` with `{}`",
		path.display(),
		temp.path().display()
	);

	temp.persist(path).map_err(|err| err.error)?;
	Ok(())
}
