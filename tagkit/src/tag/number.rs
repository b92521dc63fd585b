/// A value that can be stored in a numeric tag field
///
/// Numeric fields only hold non-negative integers. Everything else is normalized at the boundary:
///
/// * Real numbers are truncated toward zero (`5.9` → `5`)
/// * Negative numbers, `NaN` and infinities become `0`
/// * Values larger than [`u32::MAX`] saturate
///
/// # Examples
///
/// ```rust
/// use tagkit::tag::TagModel;
///
/// let mut tag = TagModel::new();
///
/// tag.set_track(5.9);
/// assert_eq!(tag.track(), 5);
///
/// tag.set_year(-3);
/// assert_eq!(tag.year(), 0);
/// ```
pub trait TagNumber {
	/// Convert the value to a field value
	fn normalize(self) -> u32;
}

macro_rules! impl_unsigned {
	($($ty:ty),+) => {
		$(
			impl TagNumber for $ty {
				fn normalize(self) -> u32 {
					u32::try_from(self).unwrap_or(u32::MAX)
				}
			}
		)+
	};
}

macro_rules! impl_signed {
	($($ty:ty),+) => {
		$(
			impl TagNumber for $ty {
				fn normalize(self) -> u32 {
					if self <= 0 {
						return 0;
					}

					u32::try_from(self).unwrap_or(u32::MAX)
				}
			}
		)+
	};
}

macro_rules! impl_real {
	($($ty:ty),+) => {
		$(
			impl TagNumber for $ty {
				fn normalize(self) -> u32 {
					// `as` saturates, and maps NaN to 0
					self.trunc() as u32
				}
			}
		)+
	};
}

impl_unsigned!(u8, u16, u32, u64, u128, usize);
impl_signed!(i8, i16, i32, i64, i128, isize);
impl_real!(f32, f64);
