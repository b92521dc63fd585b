//! The Vorbis comment codec, shared by FLAC and the OGG formats
//!
//! A comment block is a vendor string followed by a list of `KEY=VALUE` comments. Keys are
//! case-insensitive and may repeat.

use crate::config::ParsingMode;
use crate::error::Result;
use crate::file::{ExtensionItem, FormatLayout, WritePlan};
use crate::macros::{decode_err, err, parse_mode_choice};
use crate::tag::{FieldKey, FieldValue, TagModel};
use crate::util::text::utf8_decode;

use byteorder::{LittleEndian, ReadBytesExt};

/// The vendor string of newly created comment blocks
pub(crate) const DEFAULT_VENDOR: &str = concat!("tagkit ", env!("CARGO_PKG_VERSION"));

/// The canonical field backed by a comment key, ignoring case
pub(crate) fn comment_field(key: &str) -> Option<FieldKey> {
	const KEYS: [(&str, FieldKey); 9] = [
		("TITLE", FieldKey::Title),
		("ARTIST", FieldKey::Artist),
		("ALBUM", FieldKey::Album),
		("COMMENT", FieldKey::Comment),
		("DESCRIPTION", FieldKey::Comment),
		("GENRE", FieldKey::Genre),
		("DATE", FieldKey::Year),
		("YEAR", FieldKey::Year),
		("TRACKNUMBER", FieldKey::Track),
	];

	KEYS.into_iter()
		.find(|(name, _)| name.eq_ignore_ascii_case(key))
		.map(|(_, field)| field)
}

/// The comment key written for a canonical field
pub(crate) fn field_comment_key(field: FieldKey) -> &'static str {
	match field {
		FieldKey::Title => "TITLE",
		FieldKey::Artist => "ARTIST",
		FieldKey::Album => "ALBUM",
		FieldKey::Comment => "COMMENT",
		FieldKey::Genre => "GENRE",
		FieldKey::Year => "DATE",
		FieldKey::Track => "TRACKNUMBER",
	}
}

// A case-insensitive field name that may consist of ASCII 0x20 through 0x7D, 0x3D ('=') excluded.
fn verify_key(key: &[u8]) -> bool {
	!key.is_empty()
		&& key
			.iter()
			.all(|byte| (0x20..=0x7D).contains(byte) && *byte != b'=')
}

// A fully read comment block, not yet applied to a tag
struct CommentBlock {
	vendor: String,
	fields: Vec<(FieldKey, String)>,
	items: Vec<ExtensionItem>,
}

/// Parses a comment block, filling `tag` and recording every comment in `layout`
///
/// The vendor string is kept in the layout, so it survives rewrites. Outside of
/// [`ParsingMode::Strict`], a block that can't be read is discarded, leaving `tag` and `layout`
/// untouched.
pub(crate) fn parse_comments(
	data: &[u8],
	parse_mode: ParsingMode,
	tag: &mut TagModel,
	layout: &mut FormatLayout,
) -> Result<()> {
	let block = match read_comment_block(data, parse_mode) {
		Ok(block) => block,
		Err(err) => parse_mode_choice!(
			parse_mode,
			STRICT: return Err(err),
			DEFAULT: {
				log::warn!("Vorbis comments: Discarding an unreadable comment block: {err}");
				return Ok(());
			}
		),
	};

	layout.vendor = Some(block.vendor);

	for (field, value) in block.fields {
		tag.insert_parsed(field, FieldValue::Text(value));
	}

	for item in block.items {
		layout.push_extension(item);
	}

	Ok(())
}

fn read_comment_block(mut data: &[u8], parse_mode: ParsingMode) -> Result<CommentBlock> {
	let vendor_len = data.read_u32::<LittleEndian>()? as usize;
	if vendor_len > data.len() {
		err!(SizeMismatch);
	}

	let (vendor, rest) = data.split_at(vendor_len);
	data = rest;

	if std::str::from_utf8(vendor).is_err() {
		parse_mode_choice!(
			parse_mode,
			STRICT: decode_err!(@BAIL "Vorbis comments have an invalid vendor string"),
			DEFAULT: log::warn!("Vorbis comments: Vendor string is not valid UTF-8")
		);
	}

	let mut block = CommentBlock {
		vendor: utf8_decode(vendor),
		fields: Vec::new(),
		items: Vec::new(),
	};

	let number_of_items = data.read_u32::<LittleEndian>()?;
	if number_of_items as usize > data.len() / 4 {
		err!(SizeMismatch);
	}

	for _ in 0..number_of_items {
		let comment_len = data.read_u32::<LittleEndian>()? as usize;
		if comment_len > data.len() {
			err!(SizeMismatch);
		}

		let (comment, rest) = data.split_at(comment_len);
		data = rest;

		// KEY=VALUE
		let Some(separator) = comment.iter().position(|b| *b == b'=') else {
			log::warn!("Vorbis comments: No separator found in field, discarding");
			continue;
		};

		let (key, value) = (&comment[..separator], &comment[separator + 1..]);
		if !verify_key(key) {
			parse_mode_choice!(
				parse_mode,
				STRICT: decode_err!(@BAIL "Vorbis comments contain an invalid key"),
				DEFAULT: {
					log::warn!("Vorbis comments: Discarding field with an invalid key");
					continue;
				}
			);
		}

		// Verified to be ASCII
		let key = String::from_utf8_lossy(key).into_owned();
		let shadows = comment_field(&key);

		if let Some(field) = shadows {
			block.fields.push((field, utf8_decode(value)));
		}

		block.items.push(ExtensionItem::new(key, shadows, comment.to_vec()));
	}

	Ok(block)
}

/// Encodes a comment block, without any framing
pub(crate) fn encode_comments(vendor: &str, plan: &WritePlan<'_>, tag: &TagModel) -> Result<Vec<u8>> {
	let mut comments = Vec::new();
	let mut count = 0_u32;

	let items = plan.items.iter().map(|item| item.raw().to_vec());
	let fields = plan.fields.iter().map(|field| {
		format!("{}={}", field_comment_key(*field), tag.get(*field).to_text()).into_bytes()
	});

	for comment in items.chain(fields) {
		let Ok(len) = u32::try_from(comment.len()) else {
			err!(TooMuchData);
		};

		comments.extend(len.to_le_bytes());
		comments.extend(comment);
		count += 1;
	}

	let Ok(vendor_len) = u32::try_from(vendor.len()) else {
		err!(TooMuchData);
	};

	let mut block = Vec::with_capacity(vendor.len() + comments.len() + 8);
	block.extend(vendor_len.to_le_bytes());
	block.extend(vendor.as_bytes());
	block.extend(count.to_le_bytes());
	block.extend(comments);

	Ok(block)
}

#[cfg(test)]
mod tests {
	use super::{encode_comments, parse_comments};
	use crate::config::ParsingMode;
	use crate::file::{Container, FormatLayout, WritePlan};
	use crate::tag::{FieldKey, TagModel};

	fn block(vendor: &str, comments: &[&[u8]]) -> Vec<u8> {
		let mut block = (vendor.len() as u32).to_le_bytes().to_vec();
		block.extend(vendor.as_bytes());
		block.extend((comments.len() as u32).to_le_bytes());
		for comment in comments {
			block.extend((comment.len() as u32).to_le_bytes());
			block.extend(*comment);
		}

		block
	}

	fn parse(data: &[u8], parse_mode: ParsingMode) -> crate::error::Result<(TagModel, FormatLayout)> {
		let mut tag = TagModel::new();
		let mut layout = FormatLayout::new(Container::Flac);
		parse_comments(data, parse_mode, &mut tag, &mut layout)?;
		Ok((tag, layout))
	}

	#[test_log::test]
	fn fields() {
		let data = block(
			"reference libFLAC 1.4.3",
			&[
				b"title=Foo title",
				b"DESCRIPTION=Foo comment",
				b"COMMENT=Bar comment",
				b"DATE=2004-05-01",
				b"TRACKNUMBER=5/12",
				b"REPLAYGAIN_TRACK_GAIN=-6.00 dB",
				b"no separator",
			],
		);

		let (tag, layout) = parse(&data, ParsingMode::Strict).unwrap();
		assert_eq!(tag.title(), "Foo title");
		assert_eq!(tag.comment(), "Foo comment");
		assert_eq!(tag.year(), 2004);
		assert_eq!(tag.track(), 5);
		assert_eq!(layout.vendor(), Some("reference libFLAC 1.4.3"));

		let extensions = layout.extensions();
		assert_eq!(extensions.len(), 6);
		assert_eq!(extensions[0].key(), "title");
		assert_eq!(extensions[2].shadows(), Some(FieldKey::Comment));
		assert_eq!(extensions[5].shadows(), None);
		assert_eq!(extensions[5].raw(), b"REPLAYGAIN_TRACK_GAIN=-6.00 dB");
	}

	#[test_log::test]
	fn invalid_keys() {
		let data = block("", &[b"TI~TLE=Foo", b"=Bar"]);

		assert!(parse(&data, ParsingMode::Strict).is_err());

		let (tag, layout) = parse(&data, ParsingMode::BestAttempt).unwrap();
		assert!(tag.is_empty());
		assert!(layout.extensions().is_empty());
	}

	#[test_log::test]
	fn bad_sizes() {
		let mut truncated = block("vendor", &[b"TITLE=Foo", b"ARTIST=Bar"]);
		let len = truncated.len();
		truncated.truncate(len - 2);

		// The vendor string length runs past the end
		let vendor = [0xFF, 0, 0, 0, b'a'];

		// Too many items for the block
		let mut count = block("vendor", &[]);
		count[10..14].copy_from_slice(&1000_u32.to_le_bytes());

		for data in [&truncated[..], &vendor, &count] {
			assert!(parse(data, ParsingMode::Strict).is_err());

			// Nothing from a partially read block is kept
			for parse_mode in [ParsingMode::BestAttempt, ParsingMode::Relaxed] {
				let (tag, layout) = parse(data, parse_mode).unwrap();
				assert!(tag.is_empty());
				assert!(layout.extensions().is_empty());
				assert_eq!(layout.vendor(), None);
			}
		}
	}

	#[test_log::test]
	fn modified_fields_replace_their_comments() {
		let data = block("vendor", &[b"DESCRIPTION=Foo", b"COMMENT=Bar", b"MOOD=Calm"]);
		let (mut tag, layout) = parse(&data, ParsingMode::Strict).unwrap();

		tag.set_comment("Baz");
		tag.set_track(3);

		let plan = WritePlan::new(layout.extensions(), &tag);
		let encoded = encode_comments("vendor", &plan, &tag).unwrap();
		assert_eq!(
			encoded,
			block("vendor", &[b"MOOD=Calm", b"COMMENT=Baz", b"TRACKNUMBER=3"])
		);
	}
}
