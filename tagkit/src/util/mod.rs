pub(crate) mod alloc;
pub(crate) mod io;
pub(crate) mod text;

/// Parses the leading decimal digits of `text`
///
/// Used for numeric fields stored as text, such as `"2004-05-01"` or `"5/12"`.
pub(crate) fn leading_number(text: &str) -> u32 {
	let digits = text
		.trim_start()
		.bytes()
		.take_while(u8::is_ascii_digit)
		.fold(0_u64, |acc, b| {
			(acc * 10 + u64::from(b - b'0')).min(u64::from(u32::MAX))
		});

	digits as u32
}
