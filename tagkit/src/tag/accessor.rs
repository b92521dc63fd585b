use super::{FieldKey, FieldValue, TagModel, TagNumber};

// Generates the typed accessors of `TagModel`
//
// Usage:
//
// accessors! {
//     text: [field_name => FieldKey::Variant], ...;
//     number: [field_name => FieldKey::Variant], ...;
// }
//
// Text fields get `field_name()`, `set_field_name()`, `set_field_name_bytes()` and `remove_field_name()`.
// Number fields get `field_name()`, `set_field_name()` and `remove_field_name()`.
macro_rules! accessors {
	(
		text: $([$text_name:ident => $text_key:ident]),+;
		number: $([$num_name:ident => $num_key:ident]),+ $(;)?
	) => {
		impl TagModel {
			$(
				accessors! { @TEXT $text_name, $text_key }
			)+
			$(
				accessors! { @NUMBER $num_name, $num_key }
			)+
		}
	};
	(@TEXT $name:ident, $key:ident) => {
		paste::paste! {
			#[doc = "Returns the " $name ", or an empty string if unset"]
			pub fn $name(&self) -> &str {
				self.text(FieldKey::$key)
			}

			#[doc = "Sets the " $name]
			pub fn [<set_ $name>](&mut self, value: impl Into<String>) {
				self.set(FieldKey::$key, FieldValue::Text(value.into()));
			}

			#[doc = "Sets the " $name " from raw bytes"]
			#[doc = ""]
			#[doc = "The bytes are decoded leniently, see [`TagModel::set_bytes`]."]
			pub fn [<set_ $name _bytes>](&mut self, value: &[u8]) {
				self.set_bytes(FieldKey::$key, value);
			}

			#[doc = "Resets the " $name " to an empty string"]
			pub fn [<remove_ $name>](&mut self) {
				self.clear(FieldKey::$key);
			}
		}
	};
	(@NUMBER $name:ident, $key:ident) => {
		paste::paste! {
			#[doc = "Returns the " $name ", or 0 if unset"]
			pub fn $name(&self) -> u32 {
				self.number(FieldKey::$key)
			}

			#[doc = "Sets the " $name]
			#[doc = ""]
			#[doc = "Real numbers are truncated toward zero, see [`TagNumber`]. A value of 0 clears the field."]
			pub fn [<set_ $name>](&mut self, value: impl TagNumber) {
				self.set(FieldKey::$key, FieldValue::Number(value.normalize()));
			}

			#[doc = "Resets the " $name " to 0"]
			pub fn [<remove_ $name>](&mut self) {
				self.clear(FieldKey::$key);
			}
		}
	};
}

accessors! {
	text: [title => Title], [artist => Artist], [album => Album], [comment => Comment], [genre => Genre];
	number: [year => Year], [track => Track];
}
