use super::header::{Header, VbrHeader, VbrHeaderType};
use crate::properties::{AudioProperties, bitrate_kbps, duration_from_samples};

use std::time::Duration;

/// Derives the properties of a stream from its first frame
///
/// A Xing/Info/VBRI header gives an exact frame count. Without one, the stream is assumed to be
/// CBR and the duration is estimated from its length.
pub(super) fn read_properties(
	first_frame: &Header,
	vbr_header: Option<VbrHeader>,
	stream_len: u64,
) -> AudioProperties {
	let sample_rate = first_frame.sample_rate;
	let channels = first_frame.channels();

	if let Some(vbr_header) = vbr_header.filter(|header| header.frames > 0) {
		log::debug!("MPEG: Valid {:?} header; using it to calculate duration", vbr_header.ty);

		let samples = u64::from(vbr_header.frames) * u64::from(first_frame.samples);
		let duration = duration_from_samples(samples, sample_rate);

		// http://gabriel.mp3-tech.org/mp3infotag.html:
		//
		// "In the Info Tag, the "Xing" identification string (mostly at 0x24) of the header is replaced by "Info" in case of a CBR file."
		let bitrate = match vbr_header.ty {
			VbrHeaderType::Info => first_frame.bitrate,
			_ if vbr_header.size > 0 => bitrate_kbps(u64::from(vbr_header.size), duration),
			_ => bitrate_kbps(stream_len, duration),
		};

		return AudioProperties::new(duration, bitrate, sample_rate, channels);
	}

	log::warn!("MPEG: Using bitrate to estimate duration");

	// kbps == bits per millisecond
	let duration = Duration::from_millis((stream_len * 8) / u64::from(first_frame.bitrate));
	AudioProperties::new(duration, first_frame.bitrate, sample_rate, channels)
}
