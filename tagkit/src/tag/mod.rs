//! The format-agnostic tag model
//!
//! Every container exposes its metadata through a [`TagModel`], a mapping from the seven
//! canonical [`FieldKey`]s to their [`FieldValue`]s. Fields are never absent: an unset text field
//! is an empty string, an unset number is `0`.
//!
//! Anything a container stores beyond these fields is preserved as
//! [`ExtensionItem`](crate::file::ExtensionItem)s in the file's [`FormatLayout`](crate::file::FormatLayout).

mod accessor;
mod number;

pub use number::TagNumber;

use crate::config::global_options;
use crate::util::text::{latin1_decode, latin1_encode};

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

/// The canonical fields of a [`TagModel`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
	/// The title of the track
	Title,
	/// The track artist
	Artist,
	/// The album title
	Album,
	/// A free-form comment
	Comment,
	/// The genre name
	Genre,
	/// The release year
	Year,
	/// The track number
	Track,
}

impl FieldKey {
	/// Every canonical field, in display order
	pub const ALL: [FieldKey; 7] = [
		FieldKey::Title,
		FieldKey::Artist,
		FieldKey::Album,
		FieldKey::Comment,
		FieldKey::Genre,
		FieldKey::Year,
		FieldKey::Track,
	];

	/// The lowercase name of the field
	pub fn name(self) -> &'static str {
		match self {
			FieldKey::Title => "title",
			FieldKey::Artist => "artist",
			FieldKey::Album => "album",
			FieldKey::Comment => "comment",
			FieldKey::Genre => "genre",
			FieldKey::Year => "year",
			FieldKey::Track => "track",
		}
	}

	/// Get a `FieldKey` from its name, ignoring case
	///
	/// # Examples
	///
	/// ```rust
	/// use tagkit::tag::FieldKey;
	///
	/// assert_eq!(FieldKey::from_name("Title"), Some(FieldKey::Title));
	/// assert_eq!(FieldKey::from_name("composer"), None);
	/// ```
	pub fn from_name(name: &str) -> Option<Self> {
		Self::ALL
			.into_iter()
			.find(|key| key.name().eq_ignore_ascii_case(name))
	}

	/// Whether the field holds a number rather than text
	pub fn is_numeric(self) -> bool {
		matches!(self, FieldKey::Year | FieldKey::Track)
	}

	/// The value an unset field holds
	pub fn default_value(self) -> FieldValue {
		if self.is_numeric() {
			FieldValue::Number(0)
		} else {
			FieldValue::Text(String::new())
		}
	}
}

impl Display for FieldKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.name())
	}
}

/// The value of a canonical field
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldValue {
	/// A UTF-8 string
	Text(String),
	/// A non-negative integer, `0` meaning unset
	Number(u32),
}

impl FieldValue {
	/// Returns the text, if this is a text value
	pub fn as_text(&self) -> Option<&str> {
		match self {
			FieldValue::Text(text) => Some(text),
			FieldValue::Number(_) => None,
		}
	}

	/// Returns the number, if this is a numeric value
	pub fn as_number(&self) -> Option<u32> {
		match self {
			FieldValue::Number(number) => Some(*number),
			FieldValue::Text(_) => None,
		}
	}

	/// Whether this is an empty string or `0`
	pub fn is_default(&self) -> bool {
		match self {
			FieldValue::Text(text) => text.is_empty(),
			FieldValue::Number(number) => *number == 0,
		}
	}

	/// The value as it would be written to a text-based format
	///
	/// Unset numbers produce an empty string.
	pub fn to_text(&self) -> Cow<'_, str> {
		match self {
			FieldValue::Text(text) => Cow::Borrowed(text),
			FieldValue::Number(0) => Cow::Borrowed(""),
			FieldValue::Number(number) => Cow::Owned(number.to_string()),
		}
	}

	// Coerce a value into the shape required by `key`
	fn coerce(self, key: FieldKey) -> Self {
		match (key.is_numeric(), self) {
			(true, FieldValue::Text(text)) => FieldValue::Number(crate::util::leading_number(&text)),
			(false, FieldValue::Number(0)) => FieldValue::Text(String::new()),
			(false, FieldValue::Number(number)) => FieldValue::Text(number.to_string()),
			(_, value) => value,
		}
	}
}

impl From<String> for FieldValue {
	fn from(value: String) -> Self {
		FieldValue::Text(value)
	}
}

impl From<&str> for FieldValue {
	fn from(value: &str) -> Self {
		FieldValue::Text(value.to_owned())
	}
}

impl From<u32> for FieldValue {
	fn from(value: u32) -> Self {
		FieldValue::Number(value)
	}
}

/// A uniform view of a file's metadata
///
/// The model always holds every [`FieldKey`]. Clearing a field resets it to its default rather than
/// removing it, and writing a cleared field removes it from the file's native tag.
///
/// # Examples
///
/// ```rust
/// use tagkit::tag::{FieldKey, TagModel};
///
/// let mut tag = TagModel::new();
/// tag.set_title("Foo title");
/// tag.set_track(3);
///
/// assert_eq!(tag.title(), "Foo title");
/// assert!(tag.is_modified());
///
/// tag.remove_title();
/// assert_eq!(tag.title(), "");
/// assert_eq!(tag.get(FieldKey::Title).as_text(), Some(""));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagModel {
	fields: BTreeMap<FieldKey, FieldValue>,
	modified: BTreeSet<FieldKey>,
}

impl Default for TagModel {
	fn default() -> Self {
		Self::new()
	}
}

impl TagModel {
	/// Create an empty `TagModel`, with every field set to its default
	pub fn new() -> Self {
		Self {
			fields: FieldKey::ALL
				.into_iter()
				.map(|key| (key, key.default_value()))
				.collect(),
			modified: BTreeSet::new(),
		}
	}

	/// Get the value of a field
	pub fn get(&self, key: FieldKey) -> &FieldValue {
		// Every key is inserted on creation and never removed
		static EMPTY_TEXT: FieldValue = FieldValue::Text(String::new());
		static ZERO: FieldValue = FieldValue::Number(0);

		self.fields.get(&key).unwrap_or(if key.is_numeric() {
			&ZERO
		} else {
			&EMPTY_TEXT
		})
	}

	/// Get a text field, numeric fields are returned as an empty string
	pub fn text(&self, key: FieldKey) -> &str {
		self.get(key).as_text().unwrap_or_default()
	}

	/// Get a numeric field, text fields are returned as `0`
	pub fn number(&self, key: FieldKey) -> u32 {
		self.get(key).as_number().unwrap_or_default()
	}

	/// Set the value of a field
	///
	/// The value is coerced to the field's type: text given to a numeric field is parsed from its
	/// leading digits, numbers given to a text field are formatted.
	///
	/// Returns `true` if the value changed.
	pub fn set(&mut self, key: FieldKey, value: impl Into<FieldValue>) -> bool {
		let value = value.into().coerce(key);
		if *self.get(key) == value {
			return false;
		}

		log::trace!("Setting field `{}`", key);

		self.fields.insert(key, value);
		self.modified.insert(key);
		true
	}

	/// Set a text field from raw bytes
	///
	/// When unicode strings are enabled (the default, see
	/// [`GlobalOptions::unicode_strings`](crate::config::GlobalOptions::unicode_strings)), the bytes
	/// are decoded as UTF-8 and every invalid sequence is replaced with `U+FFFD`. Otherwise, they are
	/// decoded as Latin-1. This never fails.
	pub fn set_bytes(&mut self, key: FieldKey, value: &[u8]) -> bool {
		let text = if global_options().unicode_strings {
			String::from_utf8_lossy(value).into_owned()
		} else {
			latin1_decode(value)
		};

		self.set(key, FieldValue::Text(text))
	}

	/// Get a field as raw bytes
	///
	/// This is the inverse of [`TagModel::set_bytes`]. Numbers are formatted as text. When unicode
	/// strings are disabled, characters outside of Latin-1 are replaced with `?`.
	pub fn get_bytes(&self, key: FieldKey) -> Vec<u8> {
		let text = self.get(key).to_text();
		if global_options().unicode_strings {
			text.into_owned().into_bytes()
		} else {
			latin1_encode(&text)
		}
	}

	/// Reset a field to its default value
	pub fn clear(&mut self, key: FieldKey) -> bool {
		self.set(key, key.default_value())
	}

	/// Reset every field to its default value
	pub fn clear_all(&mut self) {
		for key in FieldKey::ALL {
			self.clear(key);
		}
	}

	/// Whether every field holds its default value
	pub fn is_empty(&self) -> bool {
		self.fields.values().all(FieldValue::is_default)
	}

	/// Whether any field was changed since the file was parsed or saved
	pub fn is_modified(&self) -> bool {
		!self.modified.is_empty()
	}

	/// Whether `key` was changed since the file was parsed or saved
	pub fn is_field_modified(&self, key: FieldKey) -> bool {
		self.modified.contains(&key)
	}

	/// The fields changed since the file was parsed or saved
	pub fn modified_fields(&self) -> impl Iterator<Item = FieldKey> + '_ {
		self.modified.iter().copied()
	}

	/// Returns an iterator over every field
	pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &FieldValue)> {
		self.fields.iter().map(|(key, value)| (*key, value))
	}

	/// Returns an iterator over the fields that are set
	pub fn present(&self) -> impl Iterator<Item = (FieldKey, &FieldValue)> {
		self.iter().filter(|(_, value)| !value.is_default())
	}

	// Set a field while parsing, without marking it as modified
	//
	// The first non-empty value wins, later duplicates are left to the extension items.
	pub(crate) fn insert_parsed(&mut self, key: FieldKey, value: FieldValue) {
		let value = value.coerce(key);
		if value.is_default() || !self.get(key).is_default() {
			return;
		}

		self.fields.insert(key, value);
	}

	pub(crate) fn mark_clean(&mut self) {
		self.modified.clear();
	}
}
