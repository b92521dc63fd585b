//! MPEG audio (MP1, MP2, MP3)
//!
//! Tags are read from an ID3v2 tag at the start of the file, with an ID3v1 tag at the end filling
//! any empty fields. Properties come from the first frame, refined by a Xing/Info/VBRI header.

mod constants;
pub(crate) mod header;
mod properties;
mod read;

pub(crate) use read::read_from;
