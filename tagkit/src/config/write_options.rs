use crate::util::text::TextEncoding;

/// Options to control how tagkit writes to a file
///
/// This acts as a dumping ground for all sorts of format-specific settings. As such, this is best
/// used as an argument to [`FileSession::save_with`](crate::file::FileSession::save_with).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct WriteOptions {
	pub(crate) preferred_padding: Option<u32>,
	pub(crate) id3v2_text_encoding: Option<TextEncoding>,
}

impl WriteOptions {
	/// Default preferred padding size in bytes
	pub const DEFAULT_PREFERRED_PADDING: u32 = 1024;

	/// Create a new [`WriteOptions`], alias for `Default` implementation
	///
	/// See also: [`WriteOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::config::WriteOptions;
	///
	/// let write_options = WriteOptions::new();
	/// ```
	pub const fn new() -> Self {
		Self {
			preferred_padding: Some(Self::DEFAULT_PREFERRED_PADDING),
			id3v2_text_encoding: None,
		}
	}

	/// Set the preferred padding size in bytes
	///
	/// If the format supports padding, this will be used when a metadata block has to be
	/// relocated. Padding that already exists in the file is reused before any relocation.
	///
	/// NOTES:
	///
	/// * Not all formats support padding
	/// * The actual padding size may be different from this value, depending on tag size limitations
	/// * A value of `0` disables padding
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::config::WriteOptions;
	///
	/// // I really don't want my files rewritten, so I'll double the padding size!
	/// let options = WriteOptions::new().preferred_padding(2048);
	///
	/// // ...Or I don't want padding under any circumstances!
	/// let options = WriteOptions::new().preferred_padding(0);
	/// ```
	pub fn preferred_padding(mut self, preferred_padding: u32) -> Self {
		match preferred_padding {
			0 => self.preferred_padding = None,
			_ => self.preferred_padding = Some(preferred_padding),
		}
		self
	}

	/// The encoding for newly written ID3v2 text frames
	///
	/// When unset, the thread's [`GlobalOptions`](crate::config::GlobalOptions) default is used.
	pub fn id3v2_text_encoding(mut self, encoding: TextEncoding) -> Self {
		self.id3v2_text_encoding = Some(encoding);
		self
	}

	pub(crate) fn padding(self) -> u32 {
		self.preferred_padding.unwrap_or(0)
	}
}

impl Default for WriteOptions {
	/// The default implementation for `WriteOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// WriteOptions {
	/// 	preferred_padding: 1024,
	/// 	id3v2_text_encoding: None,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}
