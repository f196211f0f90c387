//! GameEvent machinery (§4.6): `GameEventList` declares the shape of every
//! event kind as an `ObjectType`-like schema; each `GameEvent` message is
//! decoded against the previously announced descriptor and handed to the
//! observer, then discarded — events are ephemeral, unlike entities.

use std::rc::Rc;

use fxhash::FxHashMap;

use crate::error::{GameError, GameResult};
use crate::proto::{CsvcMsgGameEvent, CsvcMsgGameEventListDescriptorT, CsvcMsgGameEventList};
use crate::types::{Builder, Instance, Type, ValueType};
use crate::value::Value;

pub struct GameEventType {
	pub id: i32,
	pub name: String,
	pub object: Rc<crate::types::ObjectType>,
}

#[derive(Default)]
pub struct GameEventRegistry {
	types: FxHashMap<i32, Rc<GameEventType>>,
}

impl GameEventRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Consumes one `CSVCMsg_GameEventList`, building and registering a
	/// `GameEventType` per descriptor.
	pub fn ingest(&mut self, message: CsvcMsgGameEventList) -> GameResult<Vec<Rc<GameEventType>>> {
		let mut created = Vec::with_capacity(message.descriptors.len());
		for descriptor in message.descriptors {
			let game_event_type = Rc::new(build_type(descriptor));
			self.types.insert(game_event_type.id, game_event_type.clone());
			created.push(game_event_type);
		}
		Ok(created)
	}

	pub fn get(&self, id: i32) -> GameResult<&Rc<GameEventType>> {
		self.types.get(&id).ok_or_else(|| GameError::lookup(format!("unknown game event id {id}")))
	}
}

fn build_type(descriptor: CsvcMsgGameEventListDescriptorT) -> GameEventType {
	let mut builder = Builder::new(descriptor.name().to_owned());
	for key in &descriptor.keys {
		builder.member(key.name().to_owned(), key_value_type(key.r#type()));
	}
	GameEventType { id: descriptor.eventid(), name: descriptor.name().to_owned(), object: Rc::new(builder.build()) }
}

/// Maps the wire's 1..8 key-type code to the `ValueType` it decodes into.
fn key_value_type(code: i32) -> Type {
	match code {
		1 => Type::Value(ValueType::String),
		2 => Type::Value(ValueType::Float),
		3 => Type::Value(ValueType::Int32),
		4 => Type::Value(ValueType::Int16),
		5 => Type::Value(ValueType::Byte),
		6 => Type::Value(ValueType::Bool),
		7 => Type::Value(ValueType::UInt64),
		8 => Type::Value(ValueType::WString),
		_ => Type::Value(ValueType::Int32),
	}
}

pub struct GameEvent {
	pub id: i32,
	pub name: String,
	pub instance: Instance,
}

/// Decodes one `CSVCMsg_GameEvent` against its previously-registered type.
/// Keys are positional: the i-th key in the message sets the i-th member of
/// the descriptor, regardless of the key's own (redundant) type tag.
pub fn decode(message: CsvcMsgGameEvent, registry: &GameEventRegistry) -> GameResult<GameEvent> {
	let game_event_type = registry.get(message.eventid())?;
	let instance = Instance::new(Type::Object(game_event_type.object.clone()));

	for (index, key) in message.keys.iter().enumerate() {
		let Some(member) = game_event_type.object.members.get(index) else {
			break;
		};
		let value = match &member.ty {
			Type::Value(ValueType::String) => Value::String(key.val_string().to_owned()),
			Type::Value(ValueType::Float) => Value::Float(key.val_float()),
			Type::Value(ValueType::Int32) => Value::Int32(key.val_long()),
			Type::Value(ValueType::Int16) => Value::Int32(key.val_short()),
			Type::Value(ValueType::Byte) => Value::Int32(key.val_byte()),
			Type::Value(ValueType::Bool) => Value::Int32(key.val_bool() as i32),
			Type::Value(ValueType::UInt64) => Value::Int64(key.val_uint64() as i64),
			Type::Value(ValueType::WString) => {
				Value::String(String::from_utf16_lossy(&utf16_from_bytes(key.val_wstring())))
			}
			_ => continue,
		};

		let lens = instance.root_lens().member(&member.name)?;
		lens.apply(&instance)?.set(value);
	}

	Ok(GameEvent { id: game_event_type.id, name: game_event_type.name.clone(), instance })
}

fn utf16_from_bytes(bytes: &[u8]) -> Vec<u16> {
	bytes.chunks_exact(2).map(|pair| u16::from_le_bytes([pair[0], pair[1]])).collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::proto::CsvcMsgGameEventListKeyT;

	#[test]
	fn builds_type_and_decodes_positionally() {
		let descriptor = CsvcMsgGameEventListDescriptorT {
			eventid: Some(1),
			name: Some("round_start".into()),
			keys: vec![
				CsvcMsgGameEventListKeyT { r#type: Some(3), name: Some("timelimit".into()) },
				CsvcMsgGameEventListKeyT { r#type: Some(1), name: Some("objective".into()) },
			],
		};
		let mut registry = GameEventRegistry::new();
		registry.ingest(CsvcMsgGameEventList { descriptors: vec![descriptor] }).unwrap();

		let message = CsvcMsgGameEvent {
			event_name: None,
			eventid: Some(1),
			keys: vec![
				crate::proto::CsvcMsgGameEventKeyT { val_long: Some(90), ..Default::default() },
				crate::proto::CsvcMsgGameEventKeyT { val_string: Some("bomb".into()), ..Default::default() },
			],
		};

		let event = decode(message, &registry).unwrap();
		assert_eq!(event.name, "round_start");
		let lens = event.instance.root_lens().member("timelimit").unwrap();
		assert_eq!(lens.apply(&event.instance).unwrap().get(), Value::Int32(90));
		let lens = event.instance.root_lens().member("objective").unwrap();
		assert_eq!(lens.apply(&event.instance).unwrap().get(), Value::String("bomb".into()));
	}
}
