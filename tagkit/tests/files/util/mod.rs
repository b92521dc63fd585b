use tagkit::config::{ParseOptions, WriteOptions};
use tagkit::file::{Container, FormatLayout, ParsedFile};
use tagkit::tag::TagModel;

use ogg_pager::{CONTAINS_FIRST_PAGE_OF_BITSTREAM, CONTAINS_LAST_PAGE_OF_BITSTREAM, paginate};

/// Parse an in-memory file, detecting its container
pub fn read(data: &[u8]) -> ParsedFile {
	tagkit::read_from_bytes(data, None, ParseOptions::new()).unwrap()
}

/// Write the metadata of `parsed` into `original` with the default options
pub fn write(parsed: &ParsedFile, original: &[u8]) -> Vec<u8> {
	parsed.write(original, WriteOptions::default()).unwrap()
}

/// The audio region of `data`, according to `layout`
pub fn audio<'a>(data: &'a [u8], layout: &FormatLayout) -> &'a [u8] {
	let range = layout.audio_range();
	&data[range.start as usize..range.end as usize]
}

pub fn set_all_fields(tag: &mut TagModel) {
	tag.set_title("Foo title");
	tag.set_artist("Bar artist");
	tag.set_album("Baz album");
	tag.set_comment("Qux comment");
	tag.set_genre("Rock");
	tag.set_year(2004);
	tag.set_track(5);
}

pub fn verify_all_fields(tag: &TagModel) {
	assert_eq!(tag.title(), "Foo title");
	assert_eq!(tag.artist(), "Bar artist");
	assert_eq!(tag.album(), "Baz album");
	assert_eq!(tag.comment(), "Qux comment");
	assert_eq!(tag.genre(), "Rock");
	assert_eq!(tag.year(), 2004);
	assert_eq!(tag.track(), 5);
}

fn is_ogg(container: Container) -> bool {
	matches!(
		container,
		Container::OggVorbis | Container::OggFlac | Container::Speex
	)
}

/// Set every field of `original`, write it, and verify the result
///
/// Returns the written file.
pub fn round_trip(original: &[u8], container: Container) -> Vec<u8> {
	let mut parsed = read(original);
	assert_eq!(parsed.container(), container);

	set_all_fields(parsed.tag_mut());
	let written = write(&parsed, original);

	let reparsed = read(&written);
	assert_eq!(reparsed.container(), container);
	verify_all_fields(reparsed.tag());
	assert_eq!(reparsed.properties(), parsed.properties());

	// OGG audio pages are renumbered when the number of header pages changes
	if is_ogg(container) {
		assert_eq!(reparsed.layout().audio_len(), parsed.layout().audio_len());
	} else {
		assert_eq!(audio(&written, reparsed.layout()), audio(original, parsed.layout()));
	}

	// Writing an unchanged tag gives the same metadata
	let rewritten = write(&reparsed, &written);
	assert_eq!(read(&rewritten).tag(), reparsed.tag());

	written
}

/// Clear every field of `original`, write it, and verify that nothing remains
pub fn clear_round_trip(original: &[u8]) {
	let mut parsed = read(original);
	parsed.tag_mut().clear_all();

	let written = write(&parsed, original);
	let reparsed = read(&written);
	assert!(reparsed.tag().is_empty());
	assert_eq!(reparsed.tag().title(), "");
	assert_eq!(reparsed.tag().year(), 0);
}

// --- MPEG ---

/// MPEG-1 Layer III, 128 kbps, 44.1 kHz, joint stereo
pub const MPEG_FRAME_HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0x64];
pub const MPEG_FRAME_LEN: usize = 417;

pub fn mpeg_frames(count: usize) -> Vec<u8> {
	let mut frame = MPEG_FRAME_HEADER.to_vec();
	frame.resize(MPEG_FRAME_LEN, 0);
	frame.repeat(count)
}

/// A stream whose first frame holds an Info header with `frame_count` frames
///
/// Only a handful of frames actually follow it.
pub fn mpeg_info_stream(frame_count: u32) -> Vec<u8> {
	let mut stream = mpeg_frames(10);

	// Stereo MPEG-1, so the Info header follows 32 bytes of side information
	stream[36..40].copy_from_slice(b"Info");
	stream[40..44].copy_from_slice(&1_u32.to_be_bytes());
	stream[44..48].copy_from_slice(&frame_count.to_be_bytes());
	stream
}

/// An ID3v2.4 tag with a title, followed by `padding` bytes of padding
pub fn id3v2_tag(title: &str, padding: usize) -> Vec<u8> {
	let mut frame = b"TIT2".to_vec();
	let content_len = title.len() as u32 + 1;
	frame.extend(synchsafe(content_len));
	frame.extend([0, 0]);
	// UTF-8
	frame.push(3);
	frame.extend(title.as_bytes());

	let mut tag = b"ID3\x04\x00\x00".to_vec();
	tag.extend(synchsafe((frame.len() + padding) as u32));
	tag.extend(frame);
	tag.resize(tag.len() + padding, 0);
	tag
}

fn synchsafe(value: u32) -> [u8; 4] {
	[
		((value >> 21) & 0x7F) as u8,
		((value >> 14) & 0x7F) as u8,
		((value >> 7) & 0x7F) as u8,
		(value & 0x7F) as u8,
	]
}

// --- FLAC ---

pub const FLAC_BLOCK_STREAMINFO: u8 = 0;
pub const FLAC_BLOCK_PADDING: u8 = 1;
pub const FLAC_BLOCK_VORBIS_COMMENTS: u8 = 4;

/// 44.1 kHz stereo, 88200 samples
pub fn flac_stream_info() -> Vec<u8> {
	let mut info = vec![0x10, 0x00, 0x10, 0x00, 0, 0, 0, 0, 0, 0];
	info.extend([0x0A, 0xC4, 0x42, 0xF0]);
	info.extend(88200_u32.to_be_bytes());
	info.extend([0; 16]);
	info
}

pub fn flac_block(ty: u8, last: bool, content: &[u8]) -> Vec<u8> {
	let mut block = vec![if last { ty | 0x80 } else { ty }];
	block.extend(&(content.len() as u32).to_be_bytes()[1..]);
	block.extend(content);
	block
}

pub fn flac_file(blocks: &[(u8, Vec<u8>)]) -> Vec<u8> {
	let mut file = b"fLaC".to_vec();
	for (idx, (ty, content)) in blocks.iter().enumerate() {
		file.extend(flac_block(*ty, idx + 1 == blocks.len(), content));
	}

	file.extend([0xFF, 0xF8, 0xC9, 0x18, 0x00, 0xC2]);
	file.extend([0xAB; 1000]);
	file
}

/// A Vorbis comment block, without any framing
pub fn vorbis_comments(comments: &[&str]) -> Vec<u8> {
	let mut block = 6_u32.to_le_bytes().to_vec();
	block.extend(b"vendor");
	block.extend((comments.len() as u32).to_le_bytes());
	for comment in comments {
		block.extend((comment.len() as u32).to_le_bytes());
		block.extend(comment.as_bytes());
	}

	block
}

// --- OGG ---

/// Builds a logical bitstream: the first header on its own page, the rest of the headers together,
/// then one audio packet per page
pub fn ogg_stream(headers: &[&[u8]], audio: &[&[u8]], samples: u64) -> Vec<u8> {
	const SERIAL: u32 = 0x5EED_0001;

	let mut pages = paginate([headers[0]], SERIAL, 0, CONTAINS_FIRST_PAGE_OF_BITSTREAM).unwrap();
	if headers.len() > 1 {
		pages.extend(paginate(headers[1..].iter().copied(), SERIAL, 0, 0).unwrap());
	}

	for (idx, packet) in audio.iter().enumerate() {
		let (granule, flags) = if idx + 1 == audio.len() {
			(samples, CONTAINS_LAST_PAGE_OF_BITSTREAM)
		} else {
			(samples / 2, 0)
		};

		pages.extend(paginate([*packet], SERIAL, granule, flags).unwrap());
	}

	let mut stream = Vec::new();
	for (sequence_number, page) in pages.iter_mut().enumerate() {
		page.header_mut().sequence_number = sequence_number as u32;
		page.gen_crc();
		stream.extend(page.as_bytes());
	}

	stream
}

/// 10 seconds of 44.1 kHz stereo Vorbis
pub fn vorbis_file(comments: &[&str]) -> Vec<u8> {
	let mut ident = b"\x01vorbis".to_vec();
	ident.extend(0_u32.to_le_bytes());
	ident.push(2);
	ident.extend(44100_u32.to_le_bytes());
	ident.extend(0_i32.to_le_bytes());
	ident.extend(128_000_i32.to_le_bytes());
	ident.extend(0_i32.to_le_bytes());
	ident.extend([0xB8, 0x01]);

	let mut comment_header = b"\x03vorbis".to_vec();
	comment_header.extend(vorbis_comments(comments));
	comment_header.push(1);

	ogg_stream(
		&[&ident, &comment_header, b"\x05vorbis\x00\x01\x02"],
		&[&[0xAA; 1000], &[0xBB; 1000]],
		441_000,
	)
}

/// 10 seconds of 16 kHz mono Speex
pub fn speex_file(comments: &[&str]) -> Vec<u8> {
	let mut header = b"Speex   ".to_vec();
	header.extend(b"1.2.1\0\0\0\0\0\0\0\0\0\0\0\0\0\0\0");
	// Version, header size, sample rate, mode, mode bitstream version
	for value in [1_u32, 80, 16000, 1, 4] {
		header.extend(value.to_le_bytes());
	}

	header.extend(1_u32.to_le_bytes());
	header.extend(24_600_i32.to_le_bytes());
	// Frame size, VBR, frames per packet, extra headers
	for value in [320_u32, 0, 1, 0] {
		header.extend(value.to_le_bytes());
	}

	header.extend([0; 8]);

	ogg_stream(
		&[&header, &vorbis_comments(comments)],
		&[&[0xAA; 500], &[0xBB; 500]],
		160_000,
	)
}

/// 2 seconds of 44.1 kHz stereo FLAC, wrapped in OGG
pub fn ogg_flac_file(comments: &[&str]) -> Vec<u8> {
	let mut mapping = b"\x7FFLAC\x01\x00".to_vec();
	mapping.extend(1_u16.to_be_bytes());
	mapping.extend(b"fLaC");
	mapping.extend(flac_block(FLAC_BLOCK_STREAMINFO, false, &flac_stream_info()));

	let comments = flac_block(FLAC_BLOCK_VORBIS_COMMENTS, true, &vorbis_comments(comments));
	ogg_stream(&[&mapping, &comments], &[&[0xFF; 100]], 88200)
}

// --- APE based ---

/// 3 seconds of 16-bit 44.1 kHz stereo
pub fn tta_file() -> Vec<u8> {
	let mut stream = b"TTA1".to_vec();
	stream.extend(1_u16.to_le_bytes());
	stream.extend(2_u16.to_le_bytes());
	stream.extend(16_u16.to_le_bytes());
	stream.extend(44100_u32.to_le_bytes());
	stream.extend((44100_u32 * 3).to_le_bytes());
	stream.extend([0; 4]);
	stream.extend([0xAB; 1000]);
	stream
}

/// A single block of 16-bit 44.1 kHz stereo, holding 10 seconds
pub fn wavpack_file() -> Vec<u8> {
	const FLAGS: u32 = 1 | 0x800 | 0x1000 | (9 << 23);

	let mut stream = b"wvpk".to_vec();
	stream.extend((24_u32 + 4000).to_le_bytes());
	stream.extend(0x410_u16.to_le_bytes());
	stream.extend([0, 0]);
	stream.extend(441_000_u32.to_le_bytes());
	stream.extend(0_u32.to_le_bytes());
	stream.extend(441_000_u32.to_le_bytes());
	stream.extend(FLAGS.to_le_bytes());
	stream.extend([0; 4]);
	stream.extend([0xAB; 4000]);
	stream
}

/// 1225 SV7 frames, 32 seconds at 44.1 kHz
pub fn mpc_sv7_file() -> Vec<u8> {
	let mut stream = b"MP+\x07".to_vec();
	stream.extend(1225_u32.to_le_bytes());
	stream.extend(0x00A0_0000_u32.to_le_bytes());
	stream.extend([0; 8]);
	stream.extend(((1_u32 << 31) | (1152 << 20)).to_le_bytes());
	stream.push(116);
	stream.resize(40000, 0xAA);
	stream
}

/// 96000 samples at 48 kHz stereo
pub fn mpc_sv8_file() -> Vec<u8> {
	let mut stream = b"MPCK".to_vec();
	stream.extend(b"SH\x0F\x00\x00\x00\x00\x08\x80\x85\xEE\x00\x00");
	stream.extend([0x3F, 0x19]);
	stream.extend(b"AP\x08\xAA\xAA\xAA\xAA\xAA");
	stream.extend(b"SE\x03");
	stream
}

/// An APEv2 text item
pub fn ape_item(key: &str, value: &str) -> Vec<u8> {
	let mut item = (value.len() as u32).to_le_bytes().to_vec();
	item.extend(0_u32.to_le_bytes());
	item.extend(key.as_bytes());
	item.push(0);
	item.extend(value.as_bytes());
	item
}

/// An APEv2 tag with a header and a footer
pub fn ape_tag(items: &[Vec<u8>]) -> Vec<u8> {
	let items_data = items.concat();
	let size = items_data.len() as u32 + 32;

	let header_footer = |flags: u32| {
		let mut out = b"APETAGEX".to_vec();
		out.extend(2000_u32.to_le_bytes());
		out.extend(size.to_le_bytes());
		out.extend((items.len() as u32).to_le_bytes());
		out.extend(flags.to_le_bytes());
		out.extend([0; 8]);
		out
	};

	// Both have the "contains a header" flag, the first one is marked as the header
	let mut tag = header_footer(0xA000_0000);
	tag.extend(items_data);
	tag.extend(header_footer(0x8000_0000));
	tag
}

// --- MP4 ---

pub fn atom(ident: &[u8; 4], content: &[u8]) -> Vec<u8> {
	let mut atom = (content.len() as u32 + 8).to_be_bytes().to_vec();
	atom.extend(ident);
	atom.extend(content);
	atom
}

pub fn mp4_item(ident: &[u8; 4], data_type: u32, value: &[u8]) -> Vec<u8> {
	let mut data = data_type.to_be_bytes().to_vec();
	data.extend([0; 4]);
	data.extend(value);
	atom(ident, &atom(b"data", &data))
}

/// A `udta` holding `items`, followed by `padding` bytes of `free`
pub fn mp4_udta(items: &[Vec<u8>], padding: usize) -> Vec<u8> {
	let mut hdlr = vec![0; 8];
	hdlr.extend(b"mdirappl");
	hdlr.extend([0; 9]);

	let mut meta = vec![0; 4];
	meta.extend(atom(b"hdlr", &hdlr));
	meta.extend(atom(b"ilst", &items.concat()));
	if padding > 0 {
		meta.extend(atom(b"free", &vec![0; padding]));
	}

	atom(b"udta", &atom(b"meta", &meta))
}

/// 10 seconds of AAC LC at 44.1 kHz stereo, 128 kbps
pub fn mp4_file(udta: Option<Vec<u8>>) -> Vec<u8> {
	let mut mvhd = vec![0; 12];
	mvhd.extend(1000_u32.to_be_bytes());
	mvhd.extend(10_000_u32.to_be_bytes());
	mvhd.resize(100, 0);

	let mut mdhd = vec![0; 12];
	mdhd.extend(44100_u32.to_be_bytes());
	mdhd.extend(441_000_u32.to_be_bytes());
	mdhd.extend([0; 4]);

	let mut hdlr = vec![0; 8];
	hdlr.extend(b"soun");
	hdlr.extend([0; 13]);

	let mut esds = vec![0; 4];
	esds.extend([0x03, 25, 0x00, 0x01, 0x00]);
	esds.extend([0x04, 17, 0x40, 0x15, 0, 0, 0]);
	esds.extend(128_000_u32.to_be_bytes());
	esds.extend(128_000_u32.to_be_bytes());
	esds.extend([0x05, 2, 0x12, 0x10]);

	let mut mp4a = vec![0, 0, 0, 0, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0];
	mp4a.extend(2_u16.to_be_bytes());
	mp4a.extend(16_u16.to_be_bytes());
	mp4a.extend([0; 4]);
	mp4a.extend((44100_u32 << 16).to_be_bytes());
	mp4a.extend(atom(b"esds", &esds));

	let mut stsd = vec![0; 4];
	stsd.extend(1_u32.to_be_bytes());
	stsd.extend(atom(b"mp4a", &mp4a));

	let mut stco = vec![0; 4];
	stco.extend(1_u32.to_be_bytes());
	stco.extend(0_u32.to_be_bytes());

	let stbl = atom(b"stbl", &[atom(b"stsd", &stsd), atom(b"stco", &stco)].concat());
	let minf = atom(b"minf", &stbl);
	let mdia = atom(
		b"mdia",
		&[atom(b"mdhd", &mdhd), atom(b"hdlr", &hdlr), minf].concat(),
	);

	let mut moov = atom(b"mvhd", &mvhd);
	moov.extend(atom(b"trak", &mdia));
	moov.extend(udta.unwrap_or_default());

	let mut file = atom(b"ftyp", b"M4A \0\0\0\0M4A mp42isom");
	file.extend(atom(b"moov", &moov));

	let mdat_content = file.len() as u32 + 8;
	file.extend(atom(b"mdat", &[0xAA; 1000]));

	let pos = mp4_chunk_offset_position(&file);
	file[pos..pos + 4].copy_from_slice(&mdat_content.to_be_bytes());
	file
}

// stco > version (1), flags (3), entry count (4), entries
fn mp4_chunk_offset_position(file: &[u8]) -> usize {
	file.windows(4).position(|window| window == b"stco").unwrap() + 12
}

/// The first chunk offset, which must always point at the `mdat` content
pub fn mp4_chunk_offset(file: &[u8]) -> u32 {
	let pos = mp4_chunk_offset_position(file);
	u32::from_be_bytes(file[pos..pos + 4].try_into().unwrap())
}

// --- ASF ---

pub const fn guid(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> [u8; 16] {
	let a = data1.to_le_bytes();
	let b = data2.to_le_bytes();
	let c = data3.to_le_bytes();

	[
		a[0], a[1], a[2], a[3], b[0], b[1], c[0], c[1], data4[0], data4[1], data4[2], data4[3],
		data4[4], data4[5], data4[6], data4[7],
	]
}

const ASF_IDS: [u8; 8] = [0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C];
pub const ASF_HEADER_OBJECT: [u8; 16] = guid(0x75B2_2630, 0x668E, 0x11CF, ASF_IDS);
pub const ASF_DATA_OBJECT: [u8; 16] = guid(0x75B2_2636, 0x668E, 0x11CF, ASF_IDS);
pub const ASF_CONTENT_DESCRIPTION: [u8; 16] = guid(0x75B2_2633, 0x668E, 0x11CF, ASF_IDS);
pub const ASF_FILE_PROPERTIES: [u8; 16] = guid(
	0x8CAB_DCA1,
	0xA947,
	0x11CF,
	[0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65],
);
pub const ASF_STREAM_PROPERTIES: [u8; 16] = guid(
	0xB7DC_0791,
	0xA9B7,
	0x11CF,
	[0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65],
);
pub const ASF_PADDING: [u8; 16] = guid(
	0x1806_D474,
	0xCADF,
	0x4509,
	[0xA4, 0xBA, 0x9A, 0xAB, 0xCB, 0x96, 0xAA, 0xE8],
);
const ASF_AUDIO_MEDIA: [u8; 16] = guid(
	0xF869_9E40,
	0x5B4D,
	0x11CF,
	[0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B],
);

pub fn asf_object(guid: [u8; 16], content: &[u8]) -> Vec<u8> {
	let mut object = guid.to_vec();
	object.extend((content.len() as u64 + 24).to_le_bytes());
	object.extend(content);
	object
}

pub fn utf16le(text: &str) -> Vec<u8> {
	let mut out = text
		.encode_utf16()
		.flat_map(u16::to_le_bytes)
		.collect::<Vec<u8>>();
	out.extend([0, 0]);
	out
}

/// A Content Description Object with the title and author set
pub fn asf_content_description(title: &str, author: &str) -> Vec<u8> {
	let values = [utf16le(title), utf16le(author), Vec::new(), Vec::new(), Vec::new()];

	let mut content = Vec::new();
	for value in &values {
		content.extend((value.len() as u16).to_le_bytes());
	}

	content.extend(values.concat());
	asf_object(ASF_CONTENT_DESCRIPTION, &content)
}

/// 10 seconds of WMA at 44.1 kHz stereo, 128 kbps
///
/// `objects` are placed in the Header Object after the File and Stream Properties Objects.
pub fn asf_file(objects: &[Vec<u8>]) -> Vec<u8> {
	// 10 seconds of audio with 3 seconds of preroll
	let mut file_properties = vec![0; 16];
	file_properties.extend(0_u64.to_le_bytes());
	file_properties.extend(0_u64.to_le_bytes());
	file_properties.extend(1_u64.to_le_bytes());
	file_properties.extend(130_000_000_u64.to_le_bytes());
	file_properties.extend(100_000_000_u64.to_le_bytes());
	file_properties.extend(3000_u64.to_le_bytes());
	file_properties.extend(2_u32.to_le_bytes());
	file_properties.extend(1000_u32.to_le_bytes());
	file_properties.extend(1000_u32.to_le_bytes());
	file_properties.extend(128_000_u32.to_le_bytes());

	let mut stream_properties = ASF_AUDIO_MEDIA.to_vec();
	stream_properties.extend([0; 16]);
	stream_properties.extend(0_u64.to_le_bytes());
	stream_properties.extend(18_u32.to_le_bytes());
	stream_properties.extend(0_u32.to_le_bytes());
	stream_properties.extend(1_u16.to_le_bytes());
	stream_properties.extend(0_u32.to_le_bytes());
	// WAVEFORMATEX
	stream_properties.extend(0x0161_u16.to_le_bytes());
	stream_properties.extend(2_u16.to_le_bytes());
	stream_properties.extend(44100_u32.to_le_bytes());
	stream_properties.extend(16000_u32.to_le_bytes());
	stream_properties.extend(4_u16.to_le_bytes());
	stream_properties.extend(16_u16.to_le_bytes());
	stream_properties.extend(0_u16.to_le_bytes());

	let mut children = asf_object(ASF_FILE_PROPERTIES, &file_properties);
	children.extend(asf_object(ASF_STREAM_PROPERTIES, &stream_properties));
	children.extend(objects.concat());

	let mut file = ASF_HEADER_OBJECT.to_vec();
	file.extend((children.len() as u64 + 30).to_le_bytes());
	file.extend((objects.len() as u32 + 2).to_le_bytes());
	file.extend([0x01, 0x02]);
	file.extend(children);

	// File ID (16), total data packets (8), reserved (2)
	let mut data = vec![0; 24];
	data.extend([0x01, 0x01]);
	data.extend([0xAA; 1000]);
	file.extend(asf_object(ASF_DATA_OBJECT, &data));

	let total_len = file.len() as u64;
	let offset = asf_file_size_offset(&file);
	file[offset..offset + 8].copy_from_slice(&total_len.to_le_bytes());
	file
}

// Object header (24), file ID (16)
fn asf_file_size_offset(file: &[u8]) -> usize {
	let object = file
		.windows(16)
		.position(|window| window == ASF_FILE_PROPERTIES)
		.unwrap();

	object + 40
}

/// The file size stored in the File Properties Object
pub fn asf_file_size(file: &[u8]) -> u64 {
	let offset = asf_file_size_offset(file);
	u64::from_le_bytes(file[offset..offset + 8].try_into().unwrap())
}
