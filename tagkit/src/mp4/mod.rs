//! MP4 specific items
//!
//! ## File notes
//!
//! The metadata of an MP4 file lives in `moov.udta.meta.ilst`. Only the first `udta` atom is
//! used, any others are kept as-is.
//!
//! ## Item storage
//!
//! The canonical fields use the `©nam`, `©ART`, `©alb`, `©cmt`, `©gen`, `©day` and `trkn` items.
//! A `gnre` item (an ID3v1 genre index) is read, but `©gen` is always written in its place. Every
//! item, including freeform (`----`) items, is kept verbatim unless the field it backs is modified.
mod atom_info;
mod ilst;
mod moov;
mod properties;
mod read;
mod write;

pub(crate) use read::read_from;
pub(crate) use write::write_to;
