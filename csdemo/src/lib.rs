//! A replication engine for Counter-Strike: Global Offensive demo files:
//! parses the wire's self-describing `SendTable`/`ServerClass` schema,
//! materializes it into a runtime type system, and replays `PacketEntities`
//! deltas, string-table updates, and game events against it.
//!
//! The entry point is [`client::Client`]; implement [`observer::Observer`]
//! and drive [`client::Client::run`] (or step [`client::Client::advance`]
//! one frame at a time) to consume what the replay produces.

pub mod bits;
pub mod client;
pub mod entity;
pub mod entity_type;
pub mod error;
pub mod flags;
pub mod frame;
pub mod game_event;
pub mod header;
pub mod observer;
pub mod proto;
pub mod schema;
pub mod sendtable;
pub mod server_class;
pub mod string_table;
pub mod types;
pub mod user;
pub mod value;

pub use client::{Client, ParserOptions};
pub use error::{GameError, GameResult};
pub use observer::{NullObserver, Observer};
