//! `StringTable`: the create/update decoder behind both the network string
//! tables (`instancebaseline`, `modelprecache`, ...) and the special-cased
//! `userinfo` table that feeds the user registry.

use crate::bits::BitDecoder;
use crate::error::{GameError, GameResult};
use crate::user::User;

const HISTORY_SIZE: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct StringTableEntry {
	pub string: String,
	pub data: Option<Vec<u8>>,
}

#[derive(Debug)]
pub struct StringTable {
	pub name: String,
	pub max_entries: u32,
	pub user_data_fixed: bool,
	pub user_data_size_bits: u32,
	pub entries: Vec<Option<StringTableEntry>>,
}

impl StringTable {
	pub fn new(name: String, max_entries: u32, user_data_fixed: bool, user_data_size_bits: u32) -> Self {
		Self { name, max_entries, user_data_fixed, user_data_size_bits, entries: Vec::new() }
	}

	pub fn entry(&self, index: usize) -> Option<&StringTableEntry> {
		self.entries.get(index).and_then(|e| e.as_ref())
	}

	/// Looks an entry up by its string key — used to pull a server class's
	/// instance baseline bytes out of the `instancebaseline` table.
	pub fn find(&self, key: &str) -> Option<&StringTableEntry> {
		self.entries.iter().flatten().find(|e| e.string == key)
	}

	fn capacity_bits(&self) -> u32 {
		crate::sendtable::property::ceil_log2(self.max_entries.max(1) as u64).max(1)
	}

	/// Decodes `count` entries off `bits` (§4.5.1): a verification bit, then a
	/// 32-slot history ring used for substring compression, an `auto_index`
	/// cursor that can be reloaded mid-stream, and per-entry user data.
	/// `on_userinfo` is invoked once per entry when `self.name == "userinfo"`,
	/// with the entry's string parsed as a decimal client index.
	pub fn populate(&mut self, bits: &mut BitDecoder, count: u32, mut on_userinfo: impl FnMut(i32, &[u8]) -> GameResult<()>) -> GameResult<()> {
		let verification = bits.read_bool()?;
		if verification {
			return Err(GameError::malformed("string table verification bit was set"));
		}

		let mut history: Vec<String> = Vec::with_capacity(HISTORY_SIZE);
		let mut auto_index: u32 = 0;
		let capacity_bits = self.capacity_bits();

		for _ in 0..count {
			if !bits.read_bool()? {
				auto_index = bits.read(capacity_bits)?;
			}
			let index = auto_index as usize;

			// An update that doesn't re-send a field (has_string/has_data unset)
			// means "unchanged", not "cleared" — preserve whatever this slot
			// already held rather than overwriting it with empty/None.
			let existing = self.entries.get(index).and_then(|e| e.as_ref());
			let mut string = existing.map(|e| e.string.clone()).unwrap_or_default();
			let existing_data = existing.and_then(|e| e.data.clone());

			if bits.read_bool()? {
				string.clear();
				if bits.read_bool()? {
					let history_index: u32 = bits.read(5)?;
					let prefix_len: u32 = bits.read(5)?;
					if let Some(source) = history.get(history_index as usize) {
						string.push_str(&source[..(prefix_len as usize).min(source.len())]);
					}
				}
				let mut suffix = String::new();
				bits.read_string(&mut suffix)?;
				string.push_str(&suffix);
			}

			if history.len() == HISTORY_SIZE {
				history.remove(0);
			}
			// Push the entry's resulting string — preserved or freshly rebuilt —
			// not a blank placeholder, so later same-call substring refs see it.
			history.push(string.clone());

			let data = if bits.read_bool()? {
				if self.user_data_fixed {
					let mut bytes = Vec::with_capacity(((self.user_data_size_bits + 7) / 8) as usize);
					let mut remaining = self.user_data_size_bits;
					while remaining >= 8 {
						bytes.push(bits.read(8)?);
						remaining -= 8;
					}
					if remaining > 0 {
						bytes.push(bits.read(remaining)?);
					}
					Some(bytes)
				} else {
					let len: u32 = bits.read(14)?;
					let mut bytes = Vec::with_capacity(len as usize);
					for _ in 0..len {
						bytes.push(bits.read(8)?);
					}
					Some(bytes)
				}
			} else {
				existing_data
			};

			if self.name == "userinfo" {
				if let (Ok(client_index), Some(data)) = (string.parse::<i32>(), &data) {
					on_userinfo(client_index, data)?;
				}
			}

			if index == self.entries.len() {
				self.entries.push(Some(StringTableEntry { string, data }));
			} else if index < self.entries.len() {
				self.entries[index] = Some(StringTableEntry { string, data });
			} else {
				self.entries.resize_with(index, || None);
				self.entries.push(Some(StringTableEntry { string, data }));
			}

			auto_index += 1;
		}

		Ok(())
	}
}

/// Parses a raw `userinfo` blob (big-endian, per the sole exception to the
/// format's LSB-first/little-endian convention) into a `User`.
pub fn parse_userinfo(client_index: i32, data: &[u8]) -> GameResult<User> {
	User::parse(client_index, data)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn push_bits(buf: &mut Vec<u8>, cursor: &mut (usize, u8), value: u64, bits: u32) {
		for i in 0..bits {
			let bit = (value >> i) & 1;
			while buf.len() <= cursor.0 {
				buf.push(0);
			}
			buf[cursor.0] |= (bit as u8) << cursor.1;
			cursor.1 += 1;
			if cursor.1 == 8 {
				cursor.1 = 0;
				cursor.0 += 1;
			}
		}
	}

	#[test]
	fn history_substring_compression() {
		// Scenario 6: "player", then "play"+"ground" via history[0], prefix 4,
		// then "playground" again via history[1], prefix 10, empty suffix.
		let mut buf = Vec::new();
		let mut cursor = (0usize, 0u8);

		push_bits(&mut buf, &mut cursor, 0, 1); // verification bit

		// entry 0: "player", no substring, no user data.
		push_bits(&mut buf, &mut cursor, 1, 1); // keep auto_index
		push_bits(&mut buf, &mut cursor, 1, 1); // has string
		push_bits(&mut buf, &mut cursor, 0, 1); // no substring
		for byte in b"player" {
			push_bits(&mut buf, &mut cursor, *byte as u64, 8);
		}
		push_bits(&mut buf, &mut cursor, 0, 8); // NUL terminator
		push_bits(&mut buf, &mut cursor, 0, 1); // no user data

		// entry 1: substring from history[0] prefix 4 ("play") + "ground".
		push_bits(&mut buf, &mut cursor, 1, 1);
		push_bits(&mut buf, &mut cursor, 1, 1); // has string
		push_bits(&mut buf, &mut cursor, 1, 1); // has substring
		push_bits(&mut buf, &mut cursor, 0, 5); // history index 0
		push_bits(&mut buf, &mut cursor, 4, 5); // prefix length 4
		for byte in b"ground" {
			push_bits(&mut buf, &mut cursor, *byte as u64, 8);
		}
		push_bits(&mut buf, &mut cursor, 0, 8);
		push_bits(&mut buf, &mut cursor, 0, 1);

		// entry 2: substring from history[1] prefix 10, empty suffix.
		push_bits(&mut buf, &mut cursor, 1, 1);
		push_bits(&mut buf, &mut cursor, 1, 1);
		push_bits(&mut buf, &mut cursor, 1, 1);
		push_bits(&mut buf, &mut cursor, 1, 5); // history index 1
		push_bits(&mut buf, &mut cursor, 10, 5); // prefix length 10
		push_bits(&mut buf, &mut cursor, 0, 8); // empty suffix terminator
		push_bits(&mut buf, &mut cursor, 0, 1);

		let mut decoder = BitDecoder::new(&buf);
		let mut table = StringTable::new("modelprecache".into(), 64, false, 0);
		table.populate(&mut decoder, 3, |_, _| Ok(())).unwrap();

		assert_eq!(table.entry(0).unwrap().string, "player");
		assert_eq!(table.entry(1).unwrap().string, "playground");
		assert_eq!(table.entry(2).unwrap().string, "playground");
	}
}
