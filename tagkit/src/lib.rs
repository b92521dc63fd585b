//! Read and write the metadata of audio files.
//!
//! tagkit exposes the tags of ten audio containers through one [`TagModel`](tag::TagModel),
//! and computes the basic [`AudioProperties`](properties::AudioProperties) of their streams.
//!
//! # Supported Formats
//!
//! | Container    | Extensions                                  | Tag format                      |
//! |--------------|---------------------------------------------|---------------------------------|
//! | MPEG         | `mp3`, `mp2`, `mp1`, `mpga`                 | ID3v2, ID3v1                    |
//! | OGG Vorbis   | `ogg`, `oga`                                | Vorbis comments                 |
//! | FLAC         | `flac`                                      | Vorbis comments                 |
//! | Musepack     | `mpc`, `mpp`, `mp+`                         | APEv2, ID3v1 (read only)        |
//! | OGG FLAC     | `ogg`, `oga`                                | Vorbis comments                 |
//! | WavPack      | `wv`                                        | APEv2, ID3v1 (read only)        |
//! | Speex        | `spx`                                       | Vorbis comments                 |
//! | TrueAudio    | `tta`                                       | ID3v2, ID3v1                    |
//! | MP4          | `m4a`, `m4b`, `m4p`, `m4r`, `m4v`, `mp4`, `3g2` | `ilst` atoms                |
//! | ASF          | `wma`, `asf`, `wmv`                         | Content description objects     |
//!
//! # Examples
//!
//! ## Using a session
//!
//! ```rust,no_run
//! # fn main() -> tagkit::error::Result<()> {
//! use tagkit::file::FileSession;
//!
//! // The container is guessed from the content, falling back to the extension
//! let mut session = FileSession::open("test.mp3")?;
//!
//! let properties = session.properties()?;
//! println!("{}:{:02}", properties.minutes(), properties.seconds());
//!
//! let tag = session.tag_mut()?;
//! tag.set_title("Foo title");
//! tag.set_track(3);
//!
//! // Written to a temporary file, which then replaces the original
//! session.save()?;
//! session.close();
//! # Ok(())
//! # }
//! ```
//!
//! ## Scoped access
//!
//! ```rust,no_run
//! # fn main() -> tagkit::error::Result<()> {
//! use tagkit::file::FileSession;
//!
//! // Saved and closed on exit, even if the closure fails
//! FileSession::scoped("test.flac", |tag, _properties| {
//! 	tag.remove_comment();
//! 	Ok(())
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using an existing reader
//!
//! ```rust,no_run
//! # fn main() -> tagkit::error::Result<()> {
//! use std::fs::File;
//! use tagkit::config::ParseOptions;
//!
//! let mut file = File::open("test.ogg")?;
//!
//! let parsed = tagkit::read_from(&mut file, ParseOptions::new())?;
//! println!("Artist: {}", parsed.tag().artist());
//! # Ok(())
//! # }
//! ```
//!
//! # Important format-specific notes
//!
//! * Only the seven canonical fields are exposed. Everything else a tag holds is kept as an
//!   [`ExtensionItem`](file::ExtensionItem) and written back untouched.
//! * ID3v2.2 tags are upgraded to ID3v2.4 when written.
//! * ID3v1 tags are only refreshed when the file already has one. When a field is present in
//!   both ID3v2 and ID3v1, the ID3v2 value is used.
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod error;
pub mod file;
pub(crate) mod macros;
pub mod probe;
pub mod properties;
pub mod tag;
mod util;

mod ape;
mod asf;
mod flac;
mod id3;
mod mp4;
mod mpeg;
mod musepack;
mod ogg;
mod trueaudio;
mod wavpack;

pub use crate::file::write_to;
pub use crate::probe::{read_from, read_from_bytes, read_from_path};

pub use util::text::TextEncoding;

pub mod prelude {
	//! A prelude for commonly used items in the library.
	//!
	//! This module is intended to be wildcard imported.
	//!
	//! ```rust
	//! use tagkit::prelude::*;
	//! ```

	pub use crate::file::{Container, FileSession, ParsedFile};
	pub use crate::properties::AudioProperties;
	pub use crate::tag::{FieldKey, FieldValue, TagModel, TagNumber};
}
