//! Generic file handling utilities

pub(crate) mod codec;
mod container;
mod layout;
mod parsed;
mod session;

pub use container::{Container, EXTENSIONS};
pub use layout::{BlockKind, ExtensionItem, FormatLayout, MetadataBlock};
pub use parsed::ParsedFile;
pub use session::FileSession;

pub(crate) use container::ContainerGuessResult;
pub(crate) use layout::WritePlan;

use crate::config::WriteOptions;
use crate::error::Result;

/// Encode the metadata of `parsed` into `original`, returning the new file contents
///
/// Alias for [`ParsedFile::write`].
///
/// # Errors
///
/// See [`ParsedFile::write`]
pub fn write_to(
	original: &[u8],
	parsed: &ParsedFile,
	write_options: WriteOptions,
) -> Result<Vec<u8>> {
	parsed.write(original, write_options)
}
