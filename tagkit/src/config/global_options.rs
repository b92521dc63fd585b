use crate::util::text::TextEncoding;

use std::cell::Cell;

thread_local! {
	static GLOBAL_OPTIONS: Cell<GlobalOptions> = const { Cell::new(GlobalOptions::new()) };
}

pub(crate) fn global_options() -> GlobalOptions {
	GLOBAL_OPTIONS.with(Cell::get)
}

/// Options that control all interactions with tagkit for the current thread
///
/// # Examples
///
/// ```rust
/// use tagkit::config::{GlobalOptions, apply_global_options};
///
/// // I have files with gigantic comments, I'll double the allocation limit!
/// let global_options = GlobalOptions::new().allocation_limit(32 * 1024 * 1024);
/// apply_global_options(global_options);
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct GlobalOptions {
	pub(crate) allocation_limit: usize,
	pub(crate) unicode_strings: bool,
	pub(crate) id3v2_default_encoding: TextEncoding,
}

impl GlobalOptions {
	/// Default allocation limit for any single tag item
	pub const DEFAULT_ALLOCATION_LIMIT: usize = 16 * 1024 * 1024;

	/// Creates a new `GlobalOptions`, alias for `Default` implementation
	///
	/// See also: [`GlobalOptions::default`]
	#[must_use]
	pub const fn new() -> Self {
		Self {
			allocation_limit: Self::DEFAULT_ALLOCATION_LIMIT,
			unicode_strings: true,
			id3v2_default_encoding: TextEncoding::Latin1,
		}
	}

	/// The maximum number of bytes to allocate for any single tag item
	///
	/// This is a safety measure to prevent allocating too much memory for a single tag item. If a tag item
	/// exceeds this limit, the allocator will return [`ErrorKind::TooMuchData`](crate::error::ErrorKind::TooMuchData).
	pub fn allocation_limit(&mut self, allocation_limit: usize) -> Self {
		self.allocation_limit = allocation_limit;
		*self
	}

	/// Whether raw string bytes crossing the API are UTF-8 (`true`) or Latin-1 (`false`)
	///
	/// This affects [`TagModel::get_bytes`](crate::tag::TagModel::get_bytes) and the
	/// `set_*_bytes` setters. [`str`] based accessors are always UTF-8.
	pub fn unicode_strings(&mut self, unicode_strings: bool) -> Self {
		self.unicode_strings = unicode_strings;
		*self
	}

	/// The text encoding used for newly written ID3v2 text frames
	///
	/// This can be overridden per write with [`WriteOptions::id3v2_text_encoding`](crate::config::WriteOptions::id3v2_text_encoding).
	pub fn id3v2_default_encoding(&mut self, encoding: TextEncoding) -> Self {
		self.id3v2_default_encoding = encoding;
		*self
	}
}

impl Default for GlobalOptions {
	/// The default implementation for `GlobalOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// GlobalOptions {
	/// 	allocation_limit: Self::DEFAULT_ALLOCATION_LIMIT,
	/// 	unicode_strings: true,
	/// 	id3v2_default_encoding: TextEncoding::Latin1,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

/// Applies the given `GlobalOptions` to the current thread
pub fn apply_global_options(options: GlobalOptions) {
	GLOBAL_OPTIONS.with(|global_options| global_options.set(options));
}

/// Sets the default encoding for ID3v2 frames written on the current thread
///
/// # Examples
///
/// ```rust
/// use tagkit::config::set_default_text_encoding;
/// use tagkit::TextEncoding;
///
/// set_default_text_encoding(TextEncoding::UTF8);
/// ```
pub fn set_default_text_encoding(encoding: TextEncoding) {
	apply_global_options(global_options().id3v2_default_encoding(encoding));
}

/// Sets whether raw string bytes are treated as UTF-8 or Latin-1 on the current thread
///
/// See [`GlobalOptions::unicode_strings`]
pub fn set_strings_unicode(unicode: bool) {
	apply_global_options(global_options().unicode_strings(unicode));
}
