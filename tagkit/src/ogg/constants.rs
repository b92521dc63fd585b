// https://xiph.org/vorbis/doc/Vorbis_I_spec.html#x1-620004.2.1
pub(super) const VORBIS_IDENT_HEAD: &[u8] = b"\x01vorbis";
pub(super) const VORBIS_COMMENT_HEAD: &[u8] = b"\x03vorbis";

// https://www.speex.org/docs/manual/speex-manual/node8.html
pub(super) const SPEEXHEADER: &[u8] = b"Speex   ";
pub(super) const SPEEX_HEADER_SIZE: usize = 80;

// https://xiph.org/flac/ogg_mapping.html
pub(super) const FLAC_MAPPING_HEAD: &[u8] = b"\x7FFLAC";
// Mapping header (9), "fLaC" (4), STREAMINFO block header (4), STREAMINFO (34)
pub(super) const FLAC_MAPPING_SIZE: usize = 51;
pub(super) const FLAC_STREAMINFO_OFFSET: usize = 17;
