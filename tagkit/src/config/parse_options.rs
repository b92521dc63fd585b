/// Options to control how tagkit parses a file
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub struct ParseOptions {
	pub(crate) read_properties: bool,
	pub(crate) read_tags: bool,
	pub(crate) parsing_mode: ParsingMode,
	pub(crate) max_junk_bytes: usize,
}

impl Default for ParseOptions {
	/// The default implementation for `ParseOptions`
	///
	/// The defaults are as follows:
	///
	/// ```rust,ignore
	/// ParseOptions {
	/// 	read_properties: true,
	/// 	read_tags: true,
	/// 	parsing_mode: ParsingMode::BestAttempt,
	/// 	max_junk_bytes: 1024,
	/// }
	/// ```
	fn default() -> Self {
		Self::new()
	}
}

impl ParseOptions {
	/// Default parsing mode
	pub const DEFAULT_PARSING_MODE: ParsingMode = ParsingMode::BestAttempt;

	/// Default number of junk bytes to read
	pub const DEFAULT_MAX_JUNK_BYTES: usize = 1024;

	/// Creates a new `ParseOptions`, alias for `Default` implementation
	///
	/// See also: [`ParseOptions::default`]
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::config::ParseOptions;
	///
	/// let parsing_options = ParseOptions::new();
	/// ```
	#[must_use]
	pub const fn new() -> Self {
		Self {
			read_properties: true,
			read_tags: true,
			parsing_mode: Self::DEFAULT_PARSING_MODE,
			max_junk_bytes: Self::DEFAULT_MAX_JUNK_BYTES,
		}
	}

	/// Whether or not to read the audio properties
	///
	/// When disabled, [`AudioProperties::default`](crate::properties::AudioProperties::default)
	/// is reported.
	pub fn read_properties(&mut self, read_properties: bool) -> Self {
		self.read_properties = read_properties;
		*self
	}

	/// Whether or not to read the tags
	///
	/// When disabled, the [`TagModel`](crate::tag::TagModel) is left empty. The metadata blocks are
	/// still located, so saving remains safe.
	pub fn read_tags(&mut self, read_tags: bool) -> Self {
		self.read_tags = read_tags;
		*self
	}

	/// The parsing mode to use, see [`ParsingMode`] for details
	pub fn parsing_mode(&mut self, parsing_mode: ParsingMode) -> Self {
		self.parsing_mode = parsing_mode;
		*self
	}

	/// The maximum number of allowed junk bytes to search
	///
	/// Some information may be surrounded by junk bytes, such as an MPEG frame sync hiding behind
	/// a few stray bytes after an ID3v2 tag.
	pub fn max_junk_bytes(&mut self, max_junk_bytes: usize) -> Self {
		self.max_junk_bytes = max_junk_bytes;
		*self
	}
}

/// The parsing strictness mode
///
/// This can be set with [`ParseOptions::parsing_mode`].
///
/// # Examples
///
/// ```rust,no_run
/// use tagkit::config::{ParseOptions, ParsingMode};
/// use tagkit::file::FileSession;
///
/// # fn main() -> tagkit::error::Result<()> {
/// // We only want to read spec-compliant inputs
/// let parsing_options = ParseOptions::new().parsing_mode(ParsingMode::Strict);
/// let session = FileSession::open_with("foo.mp3", None, parsing_options)?;
/// # Ok(()) }
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
#[non_exhaustive]
pub enum ParsingMode {
	/// Will eagerly error on invalid input
	///
	/// Malformed tag items become errors instead of being skipped.
	Strict,
	/// Default mode, less eager to error on recoverably malformed input
	///
	/// Malformed tag items are skipped with a warning, and audio properties degrade to
	/// their zero values.
	#[default]
	BestAttempt,
	/// Least eager to error, may produce invalid/partial output
	///
	/// Same as [`ParsingMode::BestAttempt`], but will also tolerate truncated padding and
	/// oversized items by stopping at the damage.
	Relaxed,
}
