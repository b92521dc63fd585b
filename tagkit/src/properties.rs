//! Audio stream properties

use std::time::Duration;

/// Various *immutable* audio properties
///
/// These are derived from the stream headers once, when the file is parsed, and are unaffected by
/// any tag changes. If the headers are unreadable, every value is zero.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
#[non_exhaustive]
pub struct AudioProperties {
	pub(crate) duration: Duration,
	pub(crate) bitrate: u32,
	pub(crate) sample_rate: u32,
	pub(crate) channels: u8,
}

impl AudioProperties {
	/// Create a new `AudioProperties`
	///
	/// `bitrate` is in kbps, `sample_rate` in Hz.
	#[must_use]
	pub const fn new(duration: Duration, bitrate: u32, sample_rate: u32, channels: u8) -> Self {
		Self {
			duration,
			bitrate,
			sample_rate,
			channels,
		}
	}

	/// Duration of the audio
	pub fn duration(&self) -> Duration {
		self.duration
	}

	/// Duration of the audio in whole seconds
	pub fn length_seconds(&self) -> u64 {
		self.duration.as_secs()
	}

	/// The whole minutes of the duration
	///
	/// # Examples
	///
	/// ```rust
	/// use std::time::Duration;
	/// use tagkit::properties::AudioProperties;
	///
	/// let properties = AudioProperties::new(Duration::from_secs(200), 128, 44100, 2);
	/// assert_eq!(properties.minutes(), 3);
	/// assert_eq!(properties.seconds(), 20);
	/// ```
	pub fn minutes(&self) -> u64 {
		self.length_seconds() / 60
	}

	/// The seconds remaining after [`AudioProperties::minutes`]
	pub fn seconds(&self) -> u64 {
		self.length_seconds() % 60
	}

	/// Bitrate (kbps)
	pub fn bitrate_kbps(&self) -> u32 {
		self.bitrate
	}

	/// Sample rate (Hz)
	pub fn samplerate_hz(&self) -> u32 {
		self.sample_rate
	}

	/// Channel count
	pub fn channels(&self) -> u8 {
		self.channels
	}

	/// Whether no properties could be read
	pub fn is_empty(&self) -> bool {
		*self == Self::default()
	}
}

/// Average bitrate (kbps) of `stream_len` bytes played over `duration`
pub(crate) fn bitrate_kbps(stream_len: u64, duration: Duration) -> u32 {
	let millis = duration.as_millis();
	if millis == 0 {
		return 0;
	}

	// bits / ms == kbits / s
	((u128::from(stream_len) * 8) / millis).min(u128::from(u32::MAX)) as u32
}

/// Duration of `samples` at `sample_rate`
pub(crate) fn duration_from_samples(samples: u64, sample_rate: u32) -> Duration {
	if sample_rate == 0 {
		return Duration::ZERO;
	}

	let secs = samples / u64::from(sample_rate);
	let remainder = samples % u64::from(sample_rate);
	let nanos = (u128::from(remainder) * 1_000_000_000) / u128::from(sample_rate);

	Duration::new(secs, nanos as u32)
}
