//! `User`: the fixed-layout `userinfo` record. The sole big-endian exception
//! to the format's little-endian/LSB-first convention (see design notes on
//! endianness); decoded with a plain byte cursor, not `BitDecoder`.

use crate::error::{GameError, GameResult};

const NAME_FIELD_LEN: usize = 128;
const GUID_FIELD_LEN: usize = 33;

/// A player's team affiliation. Not part of the `userinfo` record itself —
/// populated separately from `m_iTeamNum`-flavored entity properties — but
/// grouped here since it is meaningless without a `User` to attach it to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
	Unassigned,
	Spectator,
	Terrorist,
	CounterTerrorist,
}

impl Team {
	pub fn from_index(value: i32) -> GameResult<Self> {
		match value {
			0 => Ok(Self::Unassigned),
			1 => Ok(Self::Spectator),
			2 => Ok(Self::Terrorist),
			3 => Ok(Self::CounterTerrorist),
			other => Err(GameError::invariant(format!("unknown team index {other}"))),
		}
	}
}

#[derive(Debug, Clone)]
pub struct User {
	pub client_index: i32,
	pub version: u64,
	pub xuid: u64,
	pub name: String,
	pub id: i32,
	pub guid: String,
	pub friends_id: u32,
	pub friends_name: String,
	pub is_fake: bool,
	pub is_hltv: bool,
	pub custom_files: [u32; 4],
}

impl User {
	/// Parses one `userinfo` blob. `client_index` is the table entry's string
	/// key (the decimal client slot), supplied by the caller rather than
	/// present in `data` itself.
	pub fn parse(client_index: i32, data: &[u8]) -> GameResult<Self> {
		let mut reader = Cursor::new(data);
		let version = reader.u64_be()?;
		let xuid = reader.u64_be()?;
		let name = reader.terminated(NAME_FIELD_LEN)?;
		let id = reader.i32_be()?;
		let guid = reader.terminated(GUID_FIELD_LEN)?;
		let friends_id = reader.u32_be()?;
		let friends_name = reader.terminated(NAME_FIELD_LEN)?;
		let is_fake = reader.u8()? != 0;
		let is_hltv = reader.u8()? != 0;
		let custom_files = [reader.u32_le()?, reader.u32_le()?, reader.u32_le()?, reader.u32_le()?];

		Ok(Self { client_index, version, xuid, name, id, guid, friends_id, friends_name, is_fake, is_hltv, custom_files })
	}
}

struct Cursor<'l> {
	data: &'l [u8],
	position: usize,
}

impl<'l> Cursor<'l> {
	fn new(data: &'l [u8]) -> Self {
		Self { data, position: 0 }
	}

	fn take(&mut self, len: usize) -> GameResult<&'l [u8]> {
		let end = self.position + len;
		let slice = self.data.get(self.position..end).ok_or_else(|| GameError::unexpected_end("userinfo record"))?;
		self.position = end;
		Ok(slice)
	}

	fn u8(&mut self) -> GameResult<u8> {
		Ok(self.take(1)?[0])
	}

	fn u32_be(&mut self) -> GameResult<u32> {
		Ok(u32::from_be_bytes(self.take(4)?.try_into().unwrap()))
	}

	fn i32_be(&mut self) -> GameResult<i32> {
		Ok(i32::from_be_bytes(self.take(4)?.try_into().unwrap()))
	}

	fn u64_be(&mut self) -> GameResult<u64> {
		Ok(u64::from_be_bytes(self.take(8)?.try_into().unwrap()))
	}

	fn u32_le(&mut self) -> GameResult<u32> {
		Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
	}

	/// Consumes a fixed-size `len`-byte field and returns the NUL-terminated
	/// string within it (the remainder of the field is padding, discarded).
	fn terminated(&mut self, len: usize) -> GameResult<String> {
		let field = self.take(len)?;
		let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
		Ok(String::from_utf8_lossy(&field[..end]).into_owned())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fixed(s: &str, len: usize) -> Vec<u8> {
		let mut buf = s.as_bytes().to_vec();
		buf.resize(len, 0);
		buf
	}

	#[test]
	fn parses_fixed_record() {
		let mut data = Vec::new();
		data.extend_from_slice(&7u64.to_be_bytes()); // version
		data.extend_from_slice(&123456789u64.to_be_bytes()); // xuid
		data.extend(fixed("player one", NAME_FIELD_LEN));
		data.extend_from_slice(&42i32.to_be_bytes()); // id
		data.extend(fixed("STEAM_1:0:12345", GUID_FIELD_LEN));
		data.extend_from_slice(&9u32.to_be_bytes()); // friends_id
		data.extend(fixed("friend", NAME_FIELD_LEN));
		data.push(0); // is_fake
		data.push(1); // is_hltv
		data.extend_from_slice(&1u32.to_le_bytes());
		data.extend_from_slice(&2u32.to_le_bytes());
		data.extend_from_slice(&3u32.to_le_bytes());
		data.extend_from_slice(&4u32.to_le_bytes());

		let user = User::parse(3, &data).unwrap();
		assert_eq!(user.client_index, 3);
		assert_eq!(user.version, 7);
		assert_eq!(user.xuid, 123456789);
		assert_eq!(user.name, "player one");
		assert_eq!(user.id, 42);
		assert_eq!(user.guid, "STEAM_1:0:12345");
		assert_eq!(user.friends_id, 9);
		assert_eq!(user.friends_name, "friend");
		assert!(!user.is_fake);
		assert!(user.is_hltv);
		assert_eq!(user.custom_files, [1, 2, 3, 4]);
	}
}
