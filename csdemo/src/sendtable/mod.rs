//! `SendTable` + `Property`: the declarative schema parsed out of
//! `CSVCMsg_SendTable` messages, before anything has been flattened into a
//! runtime `Type`.

pub mod property;

use crate::proto::CsvcMsgSendTable;

pub use property::{Property, PropertyKind, WireKind};

#[derive(Debug)]
pub struct SendTable {
	pub name: String,
	pub properties: Vec<Property>,
	pub excludes: Vec<(String, String)>,
	pub is_array: bool,
	/// Set once `ServerClass` binding runs; a plain index rather than a true
	/// `Weak<T>` since nothing here ever needs to upgrade-or-fail, only
	/// look the owner up by id in the client's server-class table.
	pub server_class_index: Option<u16>,
}

impl SendTable {
	/// Builds a `SendTable` from one non-terminator `CSVCMsg_SendTable`
	/// message. `INSIDE_ARRAY` properties are consumed by the preceding
	/// `ARRAY` property as its element and are not emitted as table members.
	pub fn from_wire(message: CsvcMsgSendTable) -> Self {
		let mut properties = Vec::with_capacity(message.props.len());
		let mut excludes = Vec::new();
		let mut pending_element: Option<Property> = None;

		for prop in message.props {
			let flags = crate::flags::PropertyFlags::from_bits_truncate(prop.flags as u32);
			if flags.contains(crate::flags::PropertyFlags::EXCLUDE) {
				excludes.push((prop.dt_name().to_owned(), prop.var_name().to_owned()));
				continue;
			}
			if flags.contains(crate::flags::PropertyFlags::INSIDE_ARRAY) {
				pending_element = Some(Property::from_wire(&prop, flags, None));
				continue;
			}
			let element = if WireKind::from_repr(prop.r#type) == Some(WireKind::Array) {
				pending_element.take().map(Box::new)
			} else {
				None
			};
			properties.push(Property::from_wire(&prop, flags, element));
		}

		let is_array = Self::detect_array(&properties);

		Self {
			name: message.net_table_name().to_owned(),
			properties,
			excludes,
			is_array,
			server_class_index: None,
		}
	}

	/// A table is an array data-table iff every non-`baseclass` property's
	/// name is its own 3-digit zero-padded index, and every property is
	/// structurally identical to the first (same kind, flags, parameters).
	fn detect_array(properties: &[Property]) -> bool {
		let mut candidates = properties.iter().filter(|p| p.name != "baseclass");
		let Some(first) = candidates.next() else {
			return false;
		};
		if !is_array_index(&first.name, 0) {
			return false;
		}
		for (i, prop) in candidates.enumerate() {
			if !is_array_index(&prop.name, i + 1) {
				return false;
			}
			if !first.kind.structurally_equal(&prop.kind) || first.flags != prop.flags {
				return false;
			}
		}
		true
	}
}

/// True iff `name` is the zero-padded 3-digit decimal representation of
/// `index` (`"000"` for 0, `"012"` for 12, `"1234"` for 1234 — padded to at
/// least 3 digits, not truncated above it).
pub fn is_array_index(name: &str, index: usize) -> bool {
	if name.is_empty() || !name.bytes().all(|b| b.is_ascii_digit()) {
		return false;
	}
	let expected = format!("{index:03}");
	name == expected
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn array_index_names() {
		assert!(is_array_index("000", 0));
		assert!(!is_array_index("0", 0));
		assert!(!is_array_index("00", 0));
		assert!(!is_array_index("", 0));
		assert!(!is_array_index("a00", 0));
		assert!(is_array_index("001", 1));
		assert!(is_array_index("012", 12));
		assert!(is_array_index("123", 123));
		assert!(is_array_index("1234", 1234));
	}
}
