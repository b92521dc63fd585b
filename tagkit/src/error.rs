//! Contains the errors that can arise within tagkit
//!
//! The primary error is [`TagkitError`]. The type of error is determined by [`ErrorKind`],
//! which can be extended at any time.

use crate::file::Container;

use std::collections::TryReserveError;
use std::fmt::{Debug, Display, Formatter};

use ogg_pager::PageError;

/// Alias for `Result<T, TagkitError>`
pub type Result<T> = std::result::Result<T, TagkitError>;

/// The types of errors that can occur
#[derive(Debug)]
#[non_exhaustive]
pub enum ErrorKind {
	// Session related errors
	/// Unable to determine the container from either the content or the extension
	UnrecognizedFormat,
	/// The container's required structural markers could not be found
	CorruptContainer(FileDecodingError),
	/// The path could not be opened or read
	OpenError(std::io::Error),
	/// A tag or property accessor was used after the session was closed
	UseAfterClose,

	// File data related errors
	/// Attempting to read/write an abnormally large amount of data
	TooMuchData,
	/// Expected the data to be a different size than provided
	///
	/// This occurs when the size of an item is written as one value, but that size is either too
	/// big or small to be valid within the bounds of that item.
	SizeMismatch,
	/// Errors that occur while encoding a file
	Encoding(FileEncodingError),
	/// Errors that arise while decoding text
	TextDecode(&'static str),
	/// Errors that arise while reading an ID3v2 tag
	Id3v2(&'static str),
	/// A compressed ID3v2 frame could not be decompressed
	#[cfg(feature = "id3v2_compression_support")]
	Decompression(std::io::Error),

	// Conversions for external errors
	/// Errors that arise while parsing OGG pages
	OggPage(PageError),
	/// Represents all cases of [`std::io::Error`] that are not [`ErrorKind::OpenError`]
	Io(std::io::Error),
	/// Failure to allocate enough memory
	Alloc(TryReserveError),
}

/// An error that arises while decoding a file
pub struct FileDecodingError {
	format: Option<Container>,
	description: &'static str,
}

impl FileDecodingError {
	/// Create a `FileDecodingError` from a [`Container`] and description
	#[must_use]
	pub const fn new(format: Container, description: &'static str) -> Self {
		Self {
			format: Some(format),
			description,
		}
	}

	/// Create a `FileDecodingError` without binding it to a [`Container`]
	pub fn from_description(description: &'static str) -> Self {
		Self {
			format: None,
			description,
		}
	}

	/// Returns the associated [`Container`], if one exists
	pub fn format(&self) -> Option<Container> {
		self.format
	}

	/// Returns the error description
	pub fn description(&self) -> &str {
		self.description
	}
}

impl Debug for FileDecodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {:?}", format, self.description)
		} else {
			write!(f, "{:?}", self.description)
		}
	}
}

impl Display for FileDecodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {}", format, self.description)
		} else {
			write!(f, "{}", self.description)
		}
	}
}

/// An error that arises while encoding a file
pub struct FileEncodingError {
	format: Option<Container>,
	description: &'static str,
}

impl FileEncodingError {
	/// Create a `FileEncodingError` from a [`Container`] and description
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::error::FileEncodingError;
	/// use tagkit::file::Container;
	///
	/// // This error is bound to `Container::Mpeg`, which will be displayed when the error is formatted
	/// let mpeg_error =
	/// 	FileEncodingError::new(Container::Mpeg, "Something went wrong in the MPEG file!");
	/// assert_eq!(mpeg_error.format(), Some(Container::Mpeg));
	/// ```
	#[must_use]
	pub const fn new(format: Container, description: &'static str) -> Self {
		Self {
			format: Some(format),
			description,
		}
	}

	/// Create a `FileEncodingError` without binding it to a [`Container`]
	pub fn from_description(description: &'static str) -> Self {
		Self {
			format: None,
			description,
		}
	}

	/// Returns the associated [`Container`], if one exists
	pub fn format(&self) -> Option<Container> {
		self.format
	}

	/// Returns the error description
	pub fn description(&self) -> &str {
		self.description
	}
}

impl Debug for FileEncodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {:?}", format, self.description)
		} else {
			write!(f, "{:?}", self.description)
		}
	}
}

impl Display for FileEncodingError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		if let Some(format) = self.format {
			write!(f, "{:?}: {}", format, self.description)
		} else {
			write!(f, "{}", self.description)
		}
	}
}

/// Errors that could occur within tagkit
pub struct TagkitError {
	pub(crate) kind: ErrorKind,
}

impl TagkitError {
	/// Create a `TagkitError` from an [`ErrorKind`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::error::{ErrorKind, TagkitError};
	///
	/// let unknown_format = TagkitError::new(ErrorKind::UnrecognizedFormat);
	/// assert!(unknown_format.is_open_failure());
	/// ```
	#[must_use]
	pub const fn new(kind: ErrorKind) -> Self {
		Self { kind }
	}

	/// Returns the [`ErrorKind`]
	pub fn kind(&self) -> &ErrorKind {
		&self.kind
	}

	/// Whether this error prevents a file from being opened
	///
	/// This covers filesystem failures ([`ErrorKind::OpenError`]) as well as detection
	/// ([`ErrorKind::UnrecognizedFormat`]) and structural ([`ErrorKind::CorruptContainer`]) failures.
	pub fn is_open_failure(&self) -> bool {
		matches!(
			self.kind,
			ErrorKind::OpenError(_) | ErrorKind::UnrecognizedFormat | ErrorKind::CorruptContainer(_)
		)
	}

	// A file that ends in the middle of a structure is corrupt, not unreadable
	pub(crate) fn truncation_as_corrupt(self, container: Container) -> Self {
		match self.kind {
			ErrorKind::Io(ref err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
				FileDecodingError::new(container, "File ends unexpectedly").into()
			},
			_ => self,
		}
	}

	// Parsers report I/O errors as `Io`, which at open time really means the file couldn't be read
	pub(crate) fn into_open_error(self) -> Self {
		match self.kind {
			ErrorKind::Io(err) => Self::new(ErrorKind::OpenError(err)),
			kind => Self::new(kind),
		}
	}
}

impl std::error::Error for TagkitError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self.kind {
			ErrorKind::OpenError(ref err) | ErrorKind::Io(ref err) => Some(err),
			ErrorKind::OggPage(ref err) => Some(err),
			#[cfg(feature = "id3v2_compression_support")]
			ErrorKind::Decompression(ref err) => Some(err),
			_ => None,
		}
	}
}

impl Debug for TagkitError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{:?}", self.kind)
	}
}

impl From<FileDecodingError> for TagkitError {
	fn from(input: FileDecodingError) -> Self {
		Self {
			kind: ErrorKind::CorruptContainer(input),
		}
	}
}

impl From<FileEncodingError> for TagkitError {
	fn from(input: FileEncodingError) -> Self {
		Self {
			kind: ErrorKind::Encoding(input),
		}
	}
}

impl From<PageError> for TagkitError {
	fn from(input: PageError) -> Self {
		Self {
			kind: ErrorKind::OggPage(input),
		}
	}
}

impl From<std::io::Error> for TagkitError {
	fn from(input: std::io::Error) -> Self {
		Self {
			kind: ErrorKind::Io(input),
		}
	}
}

impl From<TryReserveError> for TagkitError {
	fn from(input: TryReserveError) -> Self {
		Self {
			kind: ErrorKind::Alloc(input),
		}
	}
}

impl Display for TagkitError {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.kind {
			// Conversions
			ErrorKind::OggPage(ref err) => write!(f, "{err}"),
			ErrorKind::Io(ref err) => write!(f, "{err}"),
			ErrorKind::Alloc(ref err) => write!(f, "{err}"),

			ErrorKind::UnrecognizedFormat => {
				write!(f, "No format could be determined from the provided file")
			},
			ErrorKind::CorruptContainer(ref file_decode_err) => write!(f, "{file_decode_err}"),
			ErrorKind::OpenError(ref err) => write!(f, "Unable to open file: {err}"),
			ErrorKind::UseAfterClose => write!(f, "Attempted to use a closed file"),

			ErrorKind::TextDecode(message) => write!(f, "Text decoding: {message}"),
			ErrorKind::Id3v2(message) => write!(f, "ID3v2: {message}"),
			#[cfg(feature = "id3v2_compression_support")]
			ErrorKind::Decompression(ref err) => write!(f, "ID3v2: Failed to decompress frame: {err}"),

			// Files
			ErrorKind::TooMuchData => write!(
				f,
				"Attempted to read/write an abnormally large amount of data"
			),
			ErrorKind::SizeMismatch => write!(
				f,
				"Encountered an invalid item size, either too big or too small to be valid"
			),
			ErrorKind::Encoding(ref file_encode_err) => write!(f, "{file_encode_err}"),
		}
	}
}
