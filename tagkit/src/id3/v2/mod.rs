//! ID3v2 items
//!
//! # ID3v2 notes
//!
//! Only the frames backing the canonical fields are decoded:
//!
//! | Field   | ID3v2.4 | ID3v2.3 | ID3v2.2 |
//! |---------|---------|---------|---------|
//! | title   | `TIT2`  | `TIT2`  | `TT2`   |
//! | artist  | `TPE1`  | `TPE1`  | `TP1`   |
//! | album   | `TALB`  | `TALB`  | `TAL`   |
//! | comment | `COMM`  | `COMM`  | `COM`   |
//! | genre   | `TCON`  | `TCON`  | `TCO`   |
//! | year    | `TDRC`  | `TYER`  | `TYE`   |
//! | track   | `TRCK`  | `TRCK`  | `TRK`   |
//!
//! Only a comment with an empty description is canonical. Every other frame is kept verbatim.
//!
//! ID3v2.2 frames have no counterpart in later versions, so ID3v2.2 tags are upgraded to ID3v2.4
//! on write, keeping only the canonical fields.

pub(crate) mod frame;
pub(crate) mod header;
pub(crate) mod read;
pub(crate) mod synchsafe;
pub(crate) mod write;

use crate::tag::FieldKey;
use header::Id3v2Version;

/// The canonical field backed by a frame
pub(crate) fn frame_field(id: &str) -> Option<FieldKey> {
	match id {
		"TIT2" | "TT2" => Some(FieldKey::Title),
		"TPE1" | "TP1" => Some(FieldKey::Artist),
		"TALB" | "TAL" => Some(FieldKey::Album),
		"COMM" | "COM" => Some(FieldKey::Comment),
		"TCON" | "TCO" => Some(FieldKey::Genre),
		"TDRC" | "TYER" | "TYE" => Some(FieldKey::Year),
		"TRCK" | "TRK" => Some(FieldKey::Track),
		_ => None,
	}
}

/// The frame written for a canonical field
pub(crate) fn field_frame(field: FieldKey, version: Id3v2Version) -> &'static str {
	match field {
		FieldKey::Title => "TIT2",
		FieldKey::Artist => "TPE1",
		FieldKey::Album => "TALB",
		FieldKey::Comment => "COMM",
		FieldKey::Genre => "TCON",
		FieldKey::Year if version == Id3v2Version::V3 => "TYER",
		FieldKey::Year => "TDRC",
		FieldKey::Track => "TRCK",
	}
}
