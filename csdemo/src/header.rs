//! The fixed 1072-byte prefix every demo file opens with. Parsed once and
//! kept immutable for the lifetime of the client.

use crate::error::{GameError, GameResult};

pub const MAGIC: &[u8; 8] = b"HL2DEMO\0";
const IDENTIFIER_LEN: usize = 260;
pub const HEADER_SIZE: usize = 8 + 4 + 4 + IDENTIFIER_LEN * 4 + 4 + 4 + 4 + 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Header {
	pub magic: String,
	pub demo_protocol: i32,
	pub network_protocol: i32,
	pub server_name: String,
	pub client_name: String,
	pub map_name: String,
	pub game_directory: String,
	pub playback_time: f32,
	pub playback_ticks: i32,
	pub playback_frames: i32,
	pub sign_on_length: i32,
}

impl Header {
	pub fn parse(data: &[u8]) -> GameResult<Self> {
		if data.len() < HEADER_SIZE {
			return Err(GameError::malformed(format!(
				"demo header truncated: need {HEADER_SIZE} bytes, got {}",
				data.len()
			)));
		}

		let mut cursor = Cursor::new(data);
		let magic = cursor.take(8);
		if magic != MAGIC {
			return Err(GameError::malformed(format!(
				"bad demo magic: {magic:?}"
			)));
		}
		let magic = nul_terminated_string(magic)?;

		let demo_protocol = cursor.i32_le();
		let network_protocol = cursor.i32_le();
		let server_name = nul_terminated_string(cursor.take(IDENTIFIER_LEN))?;
		let client_name = nul_terminated_string(cursor.take(IDENTIFIER_LEN))?;
		let map_name = nul_terminated_string(cursor.take(IDENTIFIER_LEN))?;
		let game_directory = nul_terminated_string(cursor.take(IDENTIFIER_LEN))?;
		let playback_time = cursor.f32_le();
		let playback_ticks = cursor.i32_le();
		let playback_frames = cursor.i32_le();
		let sign_on_length = cursor.i32_le();

		Ok(Self {
			magic,
			demo_protocol,
			network_protocol,
			server_name,
			client_name,
			map_name,
			game_directory,
			playback_time,
			playback_ticks,
			playback_frames,
			sign_on_length,
		})
	}
}

fn nul_terminated_string(bytes: &[u8]) -> GameResult<String> {
	let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
	std::str::from_utf8(&bytes[..end])
		.map(str::to_owned)
		.map_err(|_| GameError::malformed("header identifier is not valid UTF-8"))
}

/// Tiny byte-oriented cursor for the fixed-layout header; the bit-level
/// `BitDecoder` is the wrong tool here since nothing in the header is
/// sub-byte-packed.
struct Cursor<'l> {
	data: &'l [u8],
	position: usize,
}

impl<'l> Cursor<'l> {
	fn new(data: &'l [u8]) -> Self {
		Self { data, position: 0 }
	}

	fn take(&mut self, count: usize) -> &'l [u8] {
		let slice = &self.data[self.position..self.position + count];
		self.position += count;
		slice
	}

	fn i32_le(&mut self) -> i32 {
		i32::from_le_bytes(self.take(4).try_into().unwrap())
	}

	fn f32_le(&mut self) -> f32 {
		f32::from_le_bytes(self.take(4).try_into().unwrap())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fixed_identifier(name: &str) -> Vec<u8> {
		let mut bytes = vec![0u8; IDENTIFIER_LEN];
		bytes[..name.len()].copy_from_slice(name.as_bytes());
		bytes
	}

	#[test]
	fn parses_fixed_prefix() {
		let mut data = Vec::with_capacity(HEADER_SIZE);
		data.extend_from_slice(MAGIC);
		data.extend_from_slice(&4i32.to_le_bytes());
		data.extend_from_slice(&13769i32.to_le_bytes());
		for name in ["server", "client", "de_dust2", "csgo"] {
			data.extend_from_slice(&fixed_identifier(name));
		}
		data.extend_from_slice(&0.0f32.to_le_bytes());
		data.extend_from_slice(&0i32.to_le_bytes());
		data.extend_from_slice(&0i32.to_le_bytes());
		data.extend_from_slice(&0i32.to_le_bytes());
		assert_eq!(data.len(), HEADER_SIZE);

		let header = Header::parse(&data).unwrap();
		assert_eq!(header.magic, "HL2DEMO");
		assert_eq!(header.demo_protocol, 4);
		assert_eq!(header.network_protocol, 13769);
		assert_eq!(header.playback_ticks, 0);
		assert_eq!(header.playback_frames, 0);
		assert_eq!(header.sign_on_length, 0);
		assert_eq!(header.map_name, "de_dust2");
	}

	#[test]
	fn rejects_truncated_buffer() {
		assert!(Header::parse(&[0u8; 16]).is_err());
	}

	#[test]
	fn rejects_bad_magic() {
		let mut data = vec![0u8; HEADER_SIZE];
		data[..8].copy_from_slice(b"BADMAGIC");
		assert!(Header::parse(&data).is_err());
	}
}
