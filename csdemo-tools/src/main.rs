use std::time::SystemTime;

use csdemo::client::{Client, ParserOptions};
use csdemo::observer::Observer;

/// Tallies what a replay produces; this is a demonstration consumer, not the
/// `advance`/`generate`/`summary` CLI this repo leaves to other collaborators.
#[derive(Default)]
struct Tally {
	entities_created: u64,
	entities_updated: u64,
	entities_deleted: u64,
	string_table_entries: u64,
	game_events: u64,
	users_registered: u64,
	frames: u64,
}

impl Observer for Tally {
	fn after_entity_created(&mut self, _client: &Client, _entity: &csdemo::entity::Entity) {
		self.entities_created += 1;
	}

	fn after_entity_updated(&mut self, _client: &Client, _entity: &csdemo::entity::Entity, _touched: &[csdemo::entity_type::PrioritizedEntry]) {
		self.entities_updated += 1;
	}

	fn after_entity_deleted(&mut self, _client: &Client, _entity_id: i32) {
		self.entities_deleted += 1;
	}

	fn after_string_table_entry(&mut self, _client: &Client, _table_name: &str, _index: usize, _entry: &csdemo::string_table::StringTableEntry) {
		self.string_table_entries += 1;
	}

	fn on_game_event(&mut self, _client: &Client, _event: &csdemo::game_event::GameEvent) {
		self.game_events += 1;
	}

	fn on_user_created(&mut self, _client: &Client, _user: &csdemo::user::User) {
		self.users_registered += 1;
	}

	fn on_user_updated(&mut self, _client: &Client, _user: &csdemo::user::User) {
		self.users_registered += 1;
	}

	fn after_frame(&mut self, _client: &Client, _command: u8, _tick: u32) {
		self.frames += 1;
	}
}

fn main() {
	tracing_subscriber::fmt::init();

	let path = std::env::args().nth(1).unwrap_or_else(|| {
		eprintln!("usage: csdemo-tools <path-to-demo>");
		std::process::exit(1);
	});

	let start = SystemTime::now();
	let mut client = Client::from_path(&path, ParserOptions::new()).expect("failed to load demo");
	let mut tally = Tally::default();
	client.run(&mut tally).expect("replay failed");

	println!("loaded {path} in {:?}", start.elapsed().unwrap());
	println!("map: {}", client.header().map_name);
	println!("frames: {}", tally.frames);
	println!("entities created/updated/deleted: {}/{}/{}", tally.entities_created, tally.entities_updated, tally.entities_deleted);
	println!("string table entries: {}", tally.string_table_entries);
	println!("game events: {}", tally.game_events);
	println!("users registered: {}", tally.users_registered);
}
