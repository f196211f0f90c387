//! `Entity` + `EntityDatabase`: the sparse runtime object store that
//! PacketEntities deltas mutate (§4.4), plus the delta decoder itself.

use std::rc::Rc;

use nohash_hasher::IntMap;

use crate::bits::BitDecoder;
use crate::client::Client;
use crate::entity_type::{materialize, EntityType, PrioritizedEntry};
use crate::error::{GameError, GameResult};
use crate::observer::Observer;
use crate::schema::Schema;
use crate::string_table::StringTable;
use crate::types::{Instance, Lens, Type};

pub struct Entity {
	pub id: i32,
	pub class_index: u16,
	pub serial_number: u16,
	pub entity_type: Rc<EntityType>,
	pub instance: Instance,
}

impl Entity {
	/// A `Lens` targeting `entry`'s field within this entity's instance.
	fn lens(&self, entry: &PrioritizedEntry) -> Lens {
		Lens { origin: self.instance.ty.clone(), view: entry.view() }
	}
}

#[derive(Default)]
pub struct EntityDatabase {
	entities: IntMap<i32, Entity>,
}

impl EntityDatabase {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, id: i32) -> Option<&Entity> {
		self.entities.get(&id)
	}

	/// Decodes one `CSVCMsg_PacketEntities` delta (§4.4) against `bits`,
	/// mutating `self` and firing the matching observer hooks around each
	/// create/update/delete.
	#[allow(clippy::too_many_arguments)]
	pub fn apply_packet_entities(
		&mut self,
		bits: &mut BitDecoder,
		updated_entries: u32,
		is_delta: bool,
		schema: &Schema,
		baseline: Option<&StringTable>,
		client: &Client,
		observer: &mut dyn Observer,
	) -> GameResult<()> {
		let server_class_count = schema.server_classes.len().max(1);
		let class_id_bits = ceil_log2(server_class_count as u64) + 1;

		let mut entity_id: i32 = -1;
		for _ in 0..updated_entries {
			let skip = bits.read_compressed_unsigned_32()?;
			entity_id += skip as i32 + 1;

			let enter = bits.read_bool()?;
			let leave = bits.read_bool()?;

			if leave {
				self.delete_entity(entity_id, client, observer)?;
			} else if enter {
				let class_index: u32 = bits.read(class_id_bits)?;
				let serial_number: u32 = bits.read(10)?;
				self.create_entity(entity_id, class_index as u16, serial_number as u16, schema, baseline, bits, client, observer)?;
			} else {
				self.update_entity(entity_id, bits, client, observer)?;
			}
		}

		let _ = is_delta;
		Ok(())
	}

	#[allow(clippy::too_many_arguments)]
	fn create_entity(
		&mut self,
		id: i32,
		class_index: u16,
		serial_number: u16,
		schema: &Schema,
		baseline: Option<&StringTable>,
		bits: &mut BitDecoder,
		client: &Client,
		observer: &mut dyn Observer,
	) -> GameResult<()> {
		observer.before_entity_created(client, id, class_index);

		let entity_type = materialize(schema, class_index)?;
		let instance = Instance::new(Type::Object(entity_type.object.clone()));
		let mut entity = Entity { id, class_index, serial_number, entity_type: entity_type.clone(), instance };

		if let Some(baseline_table) = baseline {
			if let Some(entry) = baseline_table.find(&class_index.to_string()) {
				if let Some(data) = &entry.data {
					let mut baseline_bits = BitDecoder::new(data);
					let touched = decode_update(&mut entity, &mut baseline_bits, &entity_type)?;
					let _ = touched;
				}
			}
		}

		let touched = decode_update(&mut entity, bits, &entity_type)?;
		self.entities.insert(id, entity);
		let entity = self.entities.get(&id).expect("just inserted");
		observer.after_entity_created(client, entity);
		observer.after_entity_updated(client, entity, &touched);
		Ok(())
	}

	fn update_entity(&mut self, id: i32, bits: &mut BitDecoder, client: &Client, observer: &mut dyn Observer) -> GameResult<()> {
		let entity_type = self
			.entities
			.get(&id)
			.map(|e| e.entity_type.clone())
			.ok_or_else(|| GameError::lookup(format!("update for unknown entity {id}")))?;

		let indices = read_index_run(bits)?;
		let entries: Vec<PrioritizedEntry> = indices
			.into_iter()
			.map(|i| entity_type.prioritized.get(i).cloned().ok_or_else(|| GameError::invariant(format!("prioritized index {i} out of bounds"))))
			.collect::<GameResult<Vec<_>>>()?;
		observer.before_entity_updated(client, id, &entries);

		let entity = self.entities.get_mut(&id).expect("looked up above");
		for entry in &entries {
			let value = entry.property.decode(bits)?;
			entity.lens(entry).apply(&entity.instance)?.set(value);
		}

		let entity = self.entities.get(&id).expect("looked up above");
		observer.after_entity_updated(client, entity, &entries);
		Ok(())
	}

	pub fn delete_entity(&mut self, id: i32, client: &Client, observer: &mut dyn Observer) -> GameResult<()> {
		observer.before_entity_deleted(client, id);
		if self.entities.remove(&id).is_none() && client.options().strict_entity_lifecycle {
			return Err(GameError::invariant(format!("delete for vacant entity slot {id}")));
		}
		observer.after_entity_deleted(client, id);
		Ok(())
	}
}

/// Applies one index-run-plus-field-decode update pass (shared by baseline
/// application and regular packet updates) and returns the touched entries.
fn decode_update(entity: &mut Entity, bits: &mut BitDecoder, entity_type: &EntityType) -> GameResult<Vec<PrioritizedEntry>> {
	let indices = read_index_run(bits)?;
	let entries: Vec<PrioritizedEntry> = indices
		.into_iter()
		.map(|i| entity_type.prioritized.get(i).cloned().ok_or_else(|| GameError::invariant(format!("prioritized index {i} out of bounds"))))
		.collect::<GameResult<Vec<_>>>()?;
	for entry in &entries {
		let value = entry.property.decode(bits)?;
		entity.lens(entry).apply(&entity.instance)?.set(value);
	}
	Ok(entries)
}

const INDEX_RUN_TERMINATOR: u32 = 0xFFF;

/// Decodes the prioritized-index run of §4.4.1: a `new_way` bit, then
/// repeated increments (literal 3-bit, compressed-u16, or the new_way
/// single-bit "next field" shortcut) terminated by `0xFFF`.
fn read_index_run(bits: &mut BitDecoder) -> GameResult<Vec<usize>> {
	let new_way = bits.read_bool()?;
	let mut cursor: i64 = -1;
	let mut out = Vec::new();

	loop {
		let value = if new_way && bits.read_bool()? {
			0
		} else if new_way {
			if bits.read_bool()? {
				bits.read::<u32>(3)?
			} else {
				bits.read_compressed_unsigned_16()?
			}
		} else {
			bits.read_compressed_unsigned_16()?
		};

		if value == INDEX_RUN_TERMINATOR {
			break;
		}

		cursor += value as i64 + 1;
		out.push(cursor as usize);
	}

	Ok(out)
}

fn ceil_log2(value: u64) -> u32 {
	crate::sendtable::property::ceil_log2(value)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::client::{Client, ParserOptions};
	use crate::header::{HEADER_SIZE, MAGIC};
	use crate::observer::NullObserver;

	fn minimal_demo_header() -> Vec<u8> {
		let mut data = vec![0u8; HEADER_SIZE];
		data[..8].copy_from_slice(MAGIC);
		data
	}

	#[test]
	fn delete_for_vacant_slot_errors_when_strict() {
		let client = Client::new(minimal_demo_header(), ParserOptions::new()).unwrap();
		let mut db = EntityDatabase::new();
		let mut observer = NullObserver;
		assert!(db.delete_entity(1, &client, &mut observer).is_err());
	}

	#[test]
	fn delete_for_vacant_slot_is_ignored_when_lenient() {
		let options = ParserOptions::new().with_strict_entity_lifecycle(false);
		let client = Client::new(minimal_demo_header(), options).unwrap();
		let mut db = EntityDatabase::new();
		let mut observer = NullObserver;
		assert!(db.delete_entity(1, &client, &mut observer).is_ok());
	}

	/// Packs bits LSB-first into bytes, the inverse of `BitDecoder::read`;
	/// local to this test since nothing outside it needs to construct bits.
	fn pack_lsb_first(bits: &[bool]) -> Vec<u8> {
		let mut bytes = vec![0u8; bits.len().div_ceil(8)];
		for (i, &bit) in bits.iter().enumerate() {
			if bit {
				bytes[i / 8] |= 1 << (i % 8);
			}
		}
		bytes
	}

	#[test]
	fn index_run_decodes_terminator_only() {
		// new_way=0, then a compressed-u16 value: 2-bit prefix `11` (16-bit
		// payload) followed by the 16-bit terminator 0xFFF, all LSB-first.
		let mut bits = vec![false]; // new_way
		bits.extend([true, true]); // prefix = 3 -> 16-bit width
		for i in 0..16 {
			bits.push((INDEX_RUN_TERMINATOR >> i) & 1 == 1);
		}
		let bytes = pack_lsb_first(&bits);
		let mut decoder = BitDecoder::new(&bytes);
		let indices = read_index_run(&mut decoder).unwrap();
		assert!(indices.is_empty());
	}
}
