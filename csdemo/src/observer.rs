//! The observer interface: paired before/after hooks for every state
//! transition the engine makes. Every hook defaults to a no-op, so an
//! implementer only overrides the handful it cares about — the same shape
//! as the source's CRTP dispatch, minus the template machinery (see design
//! notes on observer dispatch).

use crate::client::Client;
use crate::entity::Entity;
use crate::entity_type::PrioritizedEntry;
use crate::game_event::{GameEvent, GameEventType};
use crate::header::Header;
use crate::sendtable::SendTable;
use crate::server_class::ServerClass;
use crate::string_table::{StringTable, StringTableEntry};
use crate::user::User;

/// Before/after hooks for every externally interesting transition `advance`
/// makes. Methods take `&mut self` so an implementer can accumulate state
/// (counts, an output buffer) across calls; the engine drives one observer
/// at a time and never calls back into it concurrently.
pub trait Observer {
	fn on_header(&mut self, _client: &Client, _header: &Header) {}

	fn before_frame(&mut self, _client: &Client, _command: u8, _tick: u32) {}
	fn after_frame(&mut self, _client: &Client, _command: u8, _tick: u32) {}

	fn before_packet(&mut self, _client: &Client, _tag: u64) {}
	fn after_packet(&mut self, _client: &Client, _tag: u64) {}

	fn before_data_table_created(&mut self, _client: &Client, _name: &str) {}
	fn after_data_table_created(&mut self, _client: &Client, _table: &SendTable) {}

	fn before_server_class_created(&mut self, _client: &Client, _name: &str) {}
	fn after_server_class_created(&mut self, _client: &Client, _class: &ServerClass) {}

	fn before_entity_created(&mut self, _client: &Client, _entity_id: i32, _class_index: u16) {}
	fn after_entity_created(&mut self, _client: &Client, _entity: &Entity) {}

	fn before_entity_updated(&mut self, _client: &Client, _entity_id: i32, _touched: &[PrioritizedEntry]) {}
	fn after_entity_updated(&mut self, _client: &Client, _entity: &Entity, _touched: &[PrioritizedEntry]) {}

	fn before_entity_deleted(&mut self, _client: &Client, _entity_id: i32) {}
	fn after_entity_deleted(&mut self, _client: &Client, _entity_id: i32) {}

	fn before_string_table_created(&mut self, _client: &Client, _name: &str) {}
	fn after_string_table_created(&mut self, _client: &Client, _table: &StringTable) {}

	fn before_string_table_update(&mut self, _client: &Client, _table_name: &str) {}
	fn after_string_table_update(&mut self, _client: &Client, _table: &StringTable) {}
	fn after_string_table_entry(&mut self, _client: &Client, _table_name: &str, _index: usize, _entry: &StringTableEntry) {}

	fn before_user_created(&mut self, _client: &Client, _client_index: i32) {}
	fn on_user_created(&mut self, _client: &Client, _user: &User) {}

	fn before_user_updated(&mut self, _client: &Client, _client_index: i32) {}
	fn on_user_updated(&mut self, _client: &Client, _user: &User) {}

	fn before_game_event_type_created(&mut self, _client: &Client, _name: &str) {}
	fn after_game_event_type_created(&mut self, _client: &Client, _event_type: &GameEventType) {}

	fn before_game_event(&mut self, _client: &Client, _event_id: i32) {}
	fn on_game_event(&mut self, _client: &Client, _event: &GameEvent) {}
}

/// A `Observer` that ignores everything; useful as a default when a caller
/// only wants `advance` to run for its side effects on `Client` state.
#[derive(Debug, Default)]
pub struct NullObserver;

impl Observer for NullObserver {}
