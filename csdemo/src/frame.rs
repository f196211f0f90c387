//! The frame dispatcher (§4.8): a small state machine over the demo's
//! top-level command stream, plus the nested net-message tag switch (§6)
//! that runs inside `SIGN_ON`/`PACKET` bodies.

use prost::Message as _;

use crate::client::Client;
use crate::error::{GameError, GameResult};
use crate::observer::Observer;
use crate::proto::{CsvcMsgCreateStringTable, CsvcMsgGameEvent, CsvcMsgGameEventList, CsvcMsgPacketEntities, CsvcMsgUpdateStringTable};
use crate::schema::Schema;
use crate::string_table::{parse_userinfo, StringTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
	AwaitingFrame,
	Stopped,
}

pub mod command {
	pub const SIGN_ON: u8 = 1;
	pub const PACKET: u8 = 2;
	pub const SYNC_TICK: u8 = 3;
	pub const CONSOLE_COMMAND: u8 = 4;
	pub const USER_COMMAND: u8 = 5;
	pub const DATA_TABLES: u8 = 6;
	pub const STOP: u8 = 7;
	pub const CUSTOM_DATA: u8 = 8;
	pub const STRING_TABLES: u8 = 9;
}

mod net_message {
	pub const SVC_SERVER_INFO: u64 = 8;
	pub const SVC_CREATE_STRING_TABLE: u64 = 12;
	pub const SVC_UPDATE_STRING_TABLE: u64 = 13;
	pub const SVC_GAME_EVENT: u64 = 25;
	pub const SVC_PACKET_ENTITIES: u64 = 26;
	pub const SVC_GAME_EVENT_LIST: u64 = 30;

	/// Every tag in the Source engine's NET_Messages/SVC_Messages enum this
	/// decoder doesn't need to decode: sign-on and console plumbing
	/// (net_NOP..net_SignonState), presentation-only SVC messages (voice,
	/// sounds, view/angle fixups, decals, menus, cvar queries, HLTV replay,
	/// ...), and net_PlayerAvatarData. Recognized, carries no decode
	/// operation, skipped rather than fatal. Tags outside both this set and
	/// the decoded set above (e.g. the 32/37/39..99 gaps) are not part of
	/// the enum and are fatal.
	pub const KNOWN_IGNORED: &[u64] = &[
		0, 1, 2, 3, 4, 5, 6, 7, // net_NOP .. net_SignonState
		9, 10, 11, // svc_SendTable, svc_ClassInfo, svc_SetPause
		14, 15, 16, 17, 18, 19, 20, 21, 22, // svc_VoiceInit .. svc_SplitScreen
		23, 24, // svc_UserMessage, svc_EntityMessage
		27, 28, 29, // svc_TempEntities, svc_Prefetch, svc_Menu
		31, // svc_GetCvarValue
		33, 34, 35, 36, // svc_PaintmapData .. svc_HltvReplay
		38, // svc_Broadcast_Command
		100, // net_PlayerAvatarData
	];
}

/// A plain byte cursor (distinct from [`crate::bits::BitDecoder`]): frame
/// headers, sizes, and the net-message tag/length wrapper are all
/// byte-aligned, never bit-packed.
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
		let slice = self.data.get(self.position..end).ok_or_else(|| GameError::unexpected_end("frame body"))?;
		self.position = end;
		Ok(slice)
	}

	fn u8(&mut self) -> GameResult<u8> {
		Ok(self.take(1)?[0])
	}

	fn u32_le(&mut self) -> GameResult<u32> {
		Ok(u32::from_le_bytes(self.take(4)?.try_into().unwrap()))
	}

	/// Standard protobuf-style LEB128 varint: 7 payload bits per byte, MSB
	/// is the continuation flag.
	fn varint(&mut self) -> GameResult<u64> {
		let mut result: u64 = 0;
		for group in 0..10 {
			let byte = self.u8()?;
			result |= ((byte & 0x7f) as u64) << (group * 7);
			if byte & 0x80 == 0 {
				return Ok(result);
			}
		}
		Err(GameError::malformed("varint longer than 10 bytes"))
	}

	fn is_at_end(&self) -> bool {
		self.position >= self.data.len()
	}
}

/// One parsed top-level frame: `{command, tick, player_slot}` plus the
/// command-specific body's byte range within the buffer it was read from.
/// The range (rather than a borrowed slice) lets a caller finish mutating
/// its own cursor position before slicing the body out.
#[derive(Debug, Clone)]
pub struct Frame {
	pub command: u8,
	pub tick: u32,
	pub player_slot: u8,
	pub body: std::ops::Range<usize>,
}

/// Reads one frame off `data` starting at `position`, returning the frame and
/// the position just past it. `CUSTOM_DATA` is reserved and always an error.
pub fn read_frame(data: &[u8], position: usize) -> GameResult<(Frame, usize)> {
	let mut cursor = Cursor::new(&data[position..]);
	let command = cursor.u8()?;
	let tick = cursor.u32_le()?;
	let player_slot = cursor.u8()?;

	let body_len = match command {
		command::SIGN_ON | command::PACKET => {
			cursor.take(160)?;
			cursor.u32_le()? as usize
		}
		command::DATA_TABLES | command::STRING_TABLES | command::CONSOLE_COMMAND => cursor.u32_le()? as usize,
		command::USER_COMMAND => {
			cursor.take(4)?;
			cursor.u32_le()? as usize
		}
		command::SYNC_TICK | command::STOP => 0,
		command::CUSTOM_DATA => return Err(GameError::malformed("CUSTOM_DATA command is reserved")),
		other => return Err(GameError::malformed(format!("unknown frame command {other}"))),
	};
	cursor.take(body_len)?;

	let body_start = position + (cursor.position - body_len);
	let body_end = body_start + body_len;
	Ok((Frame { command, tick, player_slot, body: body_start..body_end }, position + cursor.position))
}

/// Parses a `DATA_TABLES` frame body into a [`Schema`] (§4.3). Unlike
/// SIGN_ON/PACKET bodies, this is not a net-message tag+length stream: it is
/// a raw, homogeneous run of length-delimited `CSVCMsg_SendTable` messages
/// followed by the server-class directory, so it bypasses
/// [`dispatch_net_messages`] entirely.
pub fn ingest_data_tables(body: &[u8]) -> GameResult<Schema> {
	Schema::from_data_tables_body(body)
}

/// Dispatches every net-message in a SIGN_ON/PACKET body (§6): varint tag,
/// varint length, then that many bytes of one message.
pub fn dispatch_net_messages(body: &[u8], client: &Client, observer: &mut dyn Observer) -> GameResult<()> {
	let mut cursor = Cursor::new(body);
	while !cursor.is_at_end() {
		let tag = cursor.varint()?;
		let len = cursor.varint()? as usize;
		let payload = cursor.take(len)?;
		observer.before_packet(client, tag);
		dispatch_one(tag, payload, client, observer)?;
		observer.after_packet(client, tag);
	}
	Ok(())
}

fn dispatch_one(tag: u64, payload: &[u8], client: &Client, observer: &mut dyn Observer) -> GameResult<()> {
	match tag {
		net_message::SVC_CREATE_STRING_TABLE => {
			let message = CsvcMsgCreateStringTable::decode(payload).map_err(|e| GameError::malformed(e.to_string()))?;
			create_string_table(message, client, observer)
		}
		net_message::SVC_UPDATE_STRING_TABLE => {
			let message = CsvcMsgUpdateStringTable::decode(payload).map_err(|e| GameError::malformed(e.to_string()))?;
			update_string_table(message, client, observer)
		}
		net_message::SVC_PACKET_ENTITIES => {
			let message = CsvcMsgPacketEntities::decode(payload).map_err(|e| GameError::malformed(e.to_string()))?;
			let schema_ref = client.schema().borrow();
			let schema = schema_ref.as_ref().ok_or_else(|| GameError::invariant("PacketEntities before schema ingestion"))?;
			let mut bits = crate::bits::BitDecoder::new(message.entity_data());
			let string_tables = client.string_tables().borrow();
			let baseline = string_tables.iter().find(|t| t.name == "instancebaseline");
			client
				.entities()
				.borrow_mut()
				.apply_packet_entities(&mut bits, message.updated_entries() as u32, message.is_delta(), schema, baseline, client, observer)
		}
		net_message::SVC_GAME_EVENT_LIST => {
			let message = CsvcMsgGameEventList::decode(payload).map_err(|e| GameError::malformed(e.to_string()))?;
			for descriptor in &message.descriptors {
				observer.before_game_event_type_created(client, descriptor.name());
			}
			let created = client.game_events().borrow_mut().ingest(message)?;
			for event_type in &created {
				observer.after_game_event_type_created(client, event_type);
			}
			Ok(())
		}
		net_message::SVC_GAME_EVENT => {
			let message = CsvcMsgGameEvent::decode(payload).map_err(|e| GameError::malformed(e.to_string()))?;
			observer.before_game_event(client, message.eventid());
			let event = crate::game_event::decode(message, &client.game_events().borrow())?;
			observer.on_game_event(client, &event);
			Ok(())
		}
		net_message::SVC_SERVER_INFO => Ok(()),
		other if net_message::KNOWN_IGNORED.contains(&other) => Ok(()),
		other => Err(GameError::malformed(format!("unknown net message tag {other}"))),
	}
}

/// Parses and registers one `userinfo` entry, firing the creation hook for a
/// never-before-seen client index and the update hook otherwise.
fn register_user(client_index: i32, data: &[u8], client: &Client, observer: &mut dyn Observer) -> GameResult<()> {
	let existed = client.users().borrow().iter().any(|u| u.client_index == client_index);
	if existed {
		observer.before_user_updated(client, client_index);
	} else {
		observer.before_user_created(client, client_index);
	}
	let user = parse_userinfo(client_index, data)?;
	if existed {
		observer.on_user_updated(client, &user);
	} else {
		observer.on_user_created(client, &user);
	}
	client.users().borrow_mut().push(user);
	Ok(())
}

fn create_string_table(message: CsvcMsgCreateStringTable, client: &Client, observer: &mut dyn Observer) -> GameResult<()> {
	observer.before_string_table_created(client, message.name());
	let mut table = StringTable::new(message.name().to_owned(), message.max_entries() as u32, message.user_data_fixed_size(), message.user_data_size_bits() as u32);
	let mut bits = crate::bits::BitDecoder::new(message.string_data());
	let is_userinfo = table.name == "userinfo";
	table.populate(&mut bits, message.num_entries() as u32, |index, data| {
		if is_userinfo {
			register_user(index, data, client, observer)?;
		}
		Ok(())
	})?;
	for (i, entry) in table.entries.iter().enumerate() {
		if let Some(entry) = entry {
			observer.after_string_table_entry(client, &table.name, i, entry);
		}
	}
	observer.after_string_table_created(client, &table);
	client.string_tables().borrow_mut().push(table);
	Ok(())
}

fn update_string_table(message: CsvcMsgUpdateStringTable, client: &Client, observer: &mut dyn Observer) -> GameResult<()> {
	let mut string_tables = client.string_tables().borrow_mut();
	let table = string_tables
		.get_mut(message.table_id() as usize)
		.ok_or_else(|| GameError::lookup(format!("update for unknown string table id {}", message.table_id())))?;
	observer.before_string_table_update(client, &table.name);
	let mut bits = crate::bits::BitDecoder::new(message.string_data());
	let is_userinfo = table.name == "userinfo";
	let name = table.name.clone();
	table.populate(&mut bits, message.num_changed_entries() as u32, |index, data| {
		if is_userinfo {
			register_user(index, data, client, observer)?;
		}
		Ok(())
	})?;
	for (i, entry) in table.entries.iter().enumerate() {
		if let Some(entry) = entry {
			observer.after_string_table_entry(client, &name, i, entry);
		}
	}
	observer.after_string_table_update(client, table);
	Ok(())
}
