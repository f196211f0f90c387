//! `ServerClass`: binds a name/index to a `SendTable` and resolves the single
//! base-class inheritance edge via that table's `baseclass` property.

use std::cell::OnceCell;
use std::rc::Rc;

use crate::entity_type::EntityType;
use crate::sendtable::{PropertyKind, SendTable};

pub struct ServerClass {
	pub index: u16,
	pub name: String,
	pub table: Rc<SendTable>,
	pub base: Option<u16>,
	/// Materialized once per session by `EntityType` construction, then
	/// never rebuilt — resolution is cached exactly as the source caches its
	/// `baseclass` lookup.
	pub entity_type: OnceCell<Rc<EntityType>>,
}

impl ServerClass {
	pub fn new(index: u16, name: String, table: Rc<SendTable>) -> Self {
		Self { index, name, table, base: None, entity_type: OnceCell::new() }
	}

	/// Scans this class's table for a `DataTable` property named
	/// `"baseclass"`; `table_to_class` maps a data-table name to the server
	/// class index that owns it. At most one such property may exist.
	pub fn resolve_base(&mut self, table_to_class: &std::collections::HashMap<String, u16>) -> crate::error::GameResult<()> {
		let mut found = None;
		for property in &self.table.properties {
			if property.name != "baseclass" {
				continue;
			}
			let PropertyKind::DataTable { table_name } = &property.kind else {
				continue;
			};
			if found.is_some() {
				return Err(crate::error::GameError::invariant(format!(
					"server class `{}` has more than one `baseclass` property",
					self.name
				)));
			}
			found = table_to_class.get(table_name).copied();
		}
		self.base = found;
		Ok(())
	}
}

impl std::fmt::Debug for ServerClass {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ServerClass")
			.field("index", &self.index)
			.field("name", &self.name)
			.field("base", &self.base)
			.finish()
	}
}
