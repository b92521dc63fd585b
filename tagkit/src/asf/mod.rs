//! ASF specific items
//!
//! ## File notes
//!
//! An ASF file starts with a Header Object, holding the objects that describe the file, followed
//! by a Data Object. Only the Header Object is ever rewritten.
//!
//! ## Item storage
//!
//! The title, artist and comment are stored in the Content Description Object (`Title`, `Author`
//! and `Description`). The album, genre, year and track number are stored as Extended Content
//! Descriptors (`WM/AlbumTitle`, `WM/Genre`, `WM/Year` and `WM/TrackNumber`). The zero-based
//! `WM/Track` descriptor is read when `WM/TrackNumber` is missing.
//!
//! Attributes in the Header Extension Object (Metadata and Metadata Library Objects) are not
//! read, the object is kept as-is.
mod attribute;
pub(crate) mod constants;
mod object;
mod properties;
mod read;
mod write;

pub(crate) use read::read_from;
pub(crate) use write::write_to;
