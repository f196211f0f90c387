//! `EntityType` construction: flattens a server class's `SendTable` tree
//! (base tables, collapsible embeds, excludes, array data-tables) into an
//! `ObjectType`, then derives the *prioritized vector* PacketEntities deltas
//! are decoded against.

use std::collections::HashSet;
use std::rc::Rc;

use crate::error::{GameError, GameResult};
use crate::flags::PropertyFlags;
use crate::schema::Schema;
use crate::sendtable::{Property, PropertyKind, SendTable};
use crate::types::{ArrayType, Builder, ObjectType, PathSegment, Type, View, ValueType};

#[derive(Clone)]
pub struct PrioritizedEntry {
	pub offset: usize,
	pub path: Vec<PathSegment>,
	pub ty: Type,
	pub property: Rc<Property>,
	pub changes_often: bool,
}

impl PrioritizedEntry {
	/// The `View` this entry resolves to, rebuilt from its cached offset/path
	/// rather than re-walked — used to build a `Lens` against an entity's
	/// `Instance` without re-traversing the `SendTable` tree per field.
	pub fn view(&self) -> View {
		View { ty: self.ty.clone(), offset: self.offset, path: self.path.clone() }
	}
}

pub struct EntityType {
	pub object: Rc<ObjectType>,
	pub prioritized: Vec<PrioritizedEntry>,
}

/// Materializes (and caches, via each `ServerClass`'s `OnceCell`) the
/// `EntityType` for `index`, recursively materializing its base first.
pub fn materialize(schema: &Schema, index: u16) -> GameResult<Rc<EntityType>> {
	let class = schema.server_class(index)?;
	if let Some(cached) = class.entity_type.get() {
		return Ok(cached.clone());
	}

	let base_entity = match class.base {
		Some(base_index) => Some(materialize(schema, base_index)?),
		None => None,
	};

	let mut builder = Builder::new(class.name.clone());
	if let Some(base_entity) = &base_entity {
		builder = builder.with_base(base_entity.object.clone());
	}

	let mut excludes = HashSet::new();
	collect_excludes(&class.table, schema, &mut excludes, &mut HashSet::new())?;

	build_layout(&class.table, &mut builder, schema, &excludes, &class.table.name)?;
	let object = Rc::new(builder.build());

	let mut prioritized = base_entity.map(|base| base.prioritized.clone()).unwrap_or_default();
	let root_view = View::root(Type::Object(object.clone()));
	collect_prioritized(&class.table, &root_view, schema, &excludes, &class.table.name, &mut prioritized)?;
	let prioritized = priority_reorder(prioritized);

	let entity_type = Rc::new(EntityType { object, prioritized });
	let _ = class.entity_type.set(entity_type.clone());
	Ok(entity_type)
}

fn leaf_type(property: &Property) -> GameResult<Type> {
	Ok(match &property.kind {
		PropertyKind::Int32 { .. } => Type::Value(ValueType::Int32),
		PropertyKind::Int64 { .. } => Type::Value(ValueType::Int64),
		PropertyKind::Float { .. } => Type::Value(ValueType::Float),
		PropertyKind::Vector2 { .. } => Type::Value(ValueType::Vector2),
		PropertyKind::Vector3 { .. } => Type::Value(ValueType::Vector3),
		PropertyKind::String => Type::Value(ValueType::String),
		PropertyKind::Array { element, length } => Type::Array(Rc::new(ArrayType {
			element: leaf_type(element)?,
			length: *length as usize,
		})),
		PropertyKind::DataTable { table_name } => {
			return Err(GameError::invariant(format!("`{table_name}` has no leaf type; it is structural")));
		}
	})
}

/// Walks every `DataTable` edge reachable from `table` (regardless of
/// collapsible/array-ness — excludes are table-scoped, not edge-scoped) and
/// merges each visited table's own `excludes` into `out`.
fn collect_excludes(
	table: &SendTable,
	schema: &Schema,
	out: &mut HashSet<(String, String)>,
	visited: &mut HashSet<String>,
) -> GameResult<()> {
	if !visited.insert(table.name.clone()) {
		return Ok(());
	}
	out.extend(table.excludes.iter().cloned());
	for property in &table.properties {
		if let PropertyKind::DataTable { table_name } = &property.kind {
			let target = schema
				.tables
				.get(table_name)
				.ok_or_else(|| GameError::lookup(format!("unknown data table `{table_name}`")))?;
			collect_excludes(target, schema, out, visited)?;
		}
	}
	Ok(())
}

/// Builds the `ObjectType` layout: collapsible embeds merge inline, array
/// data-tables become a single `Array` member, everything else becomes a
/// named member (a nested `Object` for non-collapsible `DataTable`
/// properties, a `Value`/`Array` leaf otherwise).
fn build_layout(table: &SendTable, builder: &mut Builder, schema: &Schema, excludes: &HashSet<(String, String)>, owner: &str) -> GameResult<()> {
	for property in &table.properties {
		if property.name == "baseclass" {
			continue;
		}
		if excludes.contains(&(owner.to_owned(), property.name.clone())) {
			continue;
		}
		match &property.kind {
			PropertyKind::DataTable { table_name } => {
				let target = schema
					.tables
					.get(table_name)
					.ok_or_else(|| GameError::lookup(format!("unknown data table `{table_name}`")))?;
				if property.flags.contains(PropertyFlags::COLLAPSIBLE) {
					build_layout(target, builder, schema, excludes, table_name)?;
				} else if target.is_array {
					let first = target
						.properties
						.first()
						.ok_or_else(|| GameError::malformed(format!("array data table `{table_name}` has no properties")))?;
					let array_type = ArrayType { element: leaf_type(first)?, length: target.properties.len() };
					builder.member(property.name.clone(), Type::Array(Rc::new(array_type)));
				} else {
					let mut nested = Builder::new(target.name.clone());
					build_layout(target, &mut nested, schema, excludes, table_name)?;
					builder.member(property.name.clone(), Type::Object(Rc::new(nested.build())));
				}
			}
			_ => builder.member(property.name.clone(), leaf_type(property)?),
		}
	}
	Ok(())
}

/// Walks the (already built) `ObjectType` tree in lockstep with the
/// `SendTable` tree, via the same traversal `build_layout` used, collecting
/// one `PrioritizedEntry` per decodable leaf (each array element counts
/// separately).
fn collect_prioritized(
	table: &SendTable,
	view: &View,
	schema: &Schema,
	excludes: &HashSet<(String, String)>,
	owner: &str,
	out: &mut Vec<PrioritizedEntry>,
) -> GameResult<()> {
	for property in &table.properties {
		if property.name == "baseclass" {
			continue;
		}
		if excludes.contains(&(owner.to_owned(), property.name.clone())) {
			continue;
		}
		match &property.kind {
			PropertyKind::DataTable { table_name } => {
				let target = schema
					.tables
					.get(table_name)
					.ok_or_else(|| GameError::lookup(format!("unknown data table `{table_name}`")))?;
				if property.flags.contains(PropertyFlags::COLLAPSIBLE) {
					collect_prioritized(target, view, schema, excludes, table_name, out)?;
				} else if target.is_array {
					let member_view = view.member(&property.name)?;
					for (i, element_property) in target.properties.iter().enumerate() {
						let element_view = member_view.index(i)?;
						out.push(PrioritizedEntry {
							offset: element_view.offset,
							ty: element_view.ty.clone(),
							path: element_view.path,
							changes_often: element_property.flags.contains(PropertyFlags::CHANGES_OFTEN),
							property: Rc::new(element_property.clone()),
						});
					}
				} else {
					let member_view = view.member(&property.name)?;
					collect_prioritized(target, &member_view, schema, excludes, table_name, out)?;
				}
			}
			_ => {
				let member_view = view.member(&property.name)?;
				out.push(PrioritizedEntry {
					offset: member_view.offset,
					ty: member_view.ty.clone(),
					path: member_view.path,
					changes_often: property.flags.contains(PropertyFlags::CHANGES_OFTEN),
					property: Rc::new(property.clone()),
				});
			}
		}
	}
	Ok(())
}

/// Stable bucket reorder: for priority `p` from 0 to 63, move matching
/// entries to the front of the unsorted tail; at 64, also pull in every
/// `CHANGES_OFTEN`-flagged entry regardless of its own priority number; then
/// keep bucketing in ascending order past 64 until nothing remains, since a
/// property's priority isn't bounded at 64 (only `CHANGES_OFTEN` is pinned
/// there).
fn priority_reorder(entries: Vec<PrioritizedEntry>) -> Vec<PrioritizedEntry> {
	let mut remaining = entries;
	let mut result = Vec::with_capacity(remaining.len());
	for p in 0u16..=255 {
		let (matched, rest): (Vec<_>, Vec<_>) = remaining.into_iter().partition(|e| {
			if p < 64 {
				e.property.priority as u16 == p && !e.changes_often
			} else if p == 64 {
				e.property.priority as u16 == p || e.changes_often
			} else {
				e.property.priority as u16 == p
			}
		});
		result.extend(matched);
		remaining = rest;
		if remaining.is_empty() {
			break;
		}
	}
	result.extend(remaining);
	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::schema::Schema;
	use crate::sendtable::{Property, PropertyKind};

	fn int_property(name: &str, priority: u8, flags: PropertyFlags) -> Property {
		Property { name: name.into(), priority, flags, kind: PropertyKind::Int32 { num_bits: 8 } }
	}

	fn schema_with(tables: Vec<SendTable>, classes: Vec<(u16, &str, &str)>) -> Schema {
		let mut table_map = fxhash::FxHashMap::default();
		for table in tables {
			table_map.insert(table.name.clone(), Rc::new(table));
		}
		Schema::test_new(table_map, classes).unwrap()
	}

	#[test]
	fn excluded_property_is_omitted_from_prioritized_vector() {
		// Parent table `P` has `x:Int32` and excludes `(C, y)`; child `C` has
		// `x:Int32, y:Int32` — §8 scenario 5.
		let parent = SendTable {
			name: "P".into(),
			properties: vec![int_property("x", 0, PropertyFlags::empty())],
			excludes: vec![("C".into(), "y".into())],
			is_array: false,
			server_class_index: None,
		};
		let child = SendTable {
			name: "C".into(),
			properties: vec![
				Property { name: "base".into(), priority: 0, flags: PropertyFlags::COLLAPSIBLE, kind: PropertyKind::DataTable { table_name: "P".into() } },
				int_property("x", 0, PropertyFlags::empty()),
				int_property("y", 0, PropertyFlags::empty()),
			],
			excludes: vec![],
			is_array: false,
			server_class_index: None,
		};

		let schema = schema_with(vec![parent, child], vec![(0, "CChild", "C")]);
		let entity_type = materialize(&schema, 0).unwrap();

		let names: Vec<&str> = entity_type.prioritized.iter().map(|e| e.property.name.as_str()).collect();
		assert!(names.contains(&"x"));
		assert!(!names.contains(&"y"), "excluded property `y` must not survive flattening, got {names:?}");
	}

	#[test]
	fn priority_reorder_buckets_are_nondecreasing_and_changes_often_lands_at_64() {
		let entries = vec![
			("c", 5, false),
			("a", 0, false),
			("b", 5, false),
			("d", 2, true),
			("e", 63, false),
		];
		let entries: Vec<PrioritizedEntry> = entries
			.into_iter()
			.map(|(name, priority, changes_often)| PrioritizedEntry {
				offset: 0,
				path: vec![],
				ty: Type::Value(ValueType::Int32),
				property: Rc::new(int_property(name, priority, PropertyFlags::empty())),
				changes_often,
			})
			.collect();

		let reordered = priority_reorder(entries);
		let priorities: Vec<u16> = reordered
			.iter()
			.map(|e| if e.changes_often { 64 } else { e.property.priority as u16 })
			.collect();
		for pair in priorities.windows(2) {
			assert!(pair[0] <= pair[1], "priorities not nondecreasing: {priorities:?}");
		}
		// "d" has priority 2 but CHANGES_OFTEN, so it is pulled to the 64 bucket.
		let d_index = reordered.iter().position(|e| e.property.name == "d").unwrap();
		let e_index = reordered.iter().position(|e| e.property.name == "e").unwrap();
		assert!(d_index > e_index, "changes_often entry must land after priority-63 entries");
	}
}
