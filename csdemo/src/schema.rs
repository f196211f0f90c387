//! Schema ingestion: consumes the `DATA_TABLES` frame's `CSVCMsg_SendTable`
//! stream and the server-class directory that follows it, then binds
//! class↔table and resolves each class's `baseclass` edge.

use std::collections::HashMap;
use std::rc::Rc;

use fxhash::FxHashMap;
use prost::Message as _;

use crate::error::{GameError, GameResult};
use crate::proto::CsvcMsgSendTable;
use crate::sendtable::SendTable;
use crate::server_class::ServerClass;

pub struct Schema {
	pub tables: FxHashMap<String, Rc<SendTable>>,
	/// Table names in the order their `CSVCMsg_SendTable` messages arrived —
	/// `tables` itself is a hash map and doesn't preserve it, but observer
	/// hooks firing per data-table creation (§6) want wire order.
	pub table_order: Vec<String>,
	pub server_classes: Vec<ServerClass>,
	table_to_class: HashMap<String, u16>,
}

impl Schema {
	/// Parses a whole `DATA_TABLES` frame body (§4.3): a run of
	/// length-delimited `CSVCMsg_SendTable` messages terminated by one with
	/// `is_end = true`, followed by the server-class directory (`u16` count,
	/// then per entry `u16 id`, NUL-terminated name, NUL-terminated data
	/// table name).
	pub fn from_data_tables_body(body: &[u8]) -> GameResult<Self> {
		let mut cursor = ByteCursor::new(body);
		let mut tables = Vec::new();
		loop {
			let len = cursor.varint()? as usize;
			let payload = cursor.take(len)?;
			let message = CsvcMsgSendTable::decode(payload).map_err(|e| GameError::malformed(e.to_string()))?;
			let is_end = message.is_end();
			tables.push(message);
			if is_end {
				break;
			}
		}

		let class_count = cursor.u16_le()? as usize;
		let mut directory = Vec::with_capacity(class_count);
		for _ in 0..class_count {
			let id = cursor.u16_le()?;
			let name = cursor.nul_terminated()?;
			let data_table = cursor.nul_terminated()?;
			directory.push((id, name, data_table));
		}

		Self::ingest(tables, directory)
	}

	/// Reads `CSVCMsg_SendTable` messages from `tables` until (and including)
	/// the terminator (`is_end = true`), then binds `(id, name, data_table)`
	/// triples from `directory` and resolves base-class edges.
	pub fn ingest(tables: Vec<CsvcMsgSendTable>, directory: Vec<(u16, String, String)>) -> GameResult<Self> {
		let mut table_map = FxHashMap::default();
		let mut table_order = Vec::with_capacity(tables.len());
		for message in tables {
			let table = Rc::new(SendTable::from_wire(message));
			table_order.push(table.name.clone());
			table_map.insert(table.name.clone(), table);
		}

		let mut table_to_class = HashMap::new();
		let mut server_classes = Vec::with_capacity(directory.len());
		for (id, name, table_name) in directory {
			let table = table_map
				.get(&table_name)
				.ok_or_else(|| GameError::lookup(format!("server class `{name}` references unknown data table `{table_name}`")))?
				.clone();
			table_to_class.insert(table_name, id);
			server_classes.push(ServerClass::new(id, name, table));
		}

		let mut schema = Self { tables: table_map, table_order, server_classes, table_to_class };
		for index in 0..schema.server_classes.len() {
			let table_to_class = schema.table_to_class.clone();
			schema.server_classes[index].resolve_base(&table_to_class)?;
		}
		Ok(schema)
	}

	pub fn server_class(&self, index: u16) -> GameResult<&ServerClass> {
		self.server_classes
			.get(index as usize)
			.ok_or_else(|| GameError::lookup(format!("unknown server class index {index}")))
	}

	/// Test-only constructor for callers that already have `SendTable`s and
	/// a `(table_name, class_id)` directory in hand and don't need to go
	/// through the wire-protobuf parse in [`Self::ingest`].
	#[cfg(test)]
	pub(crate) fn test_new(tables: FxHashMap<String, Rc<SendTable>>, directory: Vec<(u16, &str, &str)>) -> GameResult<Self> {
		let table_order = tables.keys().cloned().collect();
		let mut table_to_class = HashMap::new();
		let mut server_classes = Vec::with_capacity(directory.len());
		for (id, name, table_name) in directory {
			let table = tables
				.get(table_name)
				.ok_or_else(|| GameError::lookup(format!("server class `{name}` references unknown data table `{table_name}`")))?
				.clone();
			table_to_class.insert(table_name.to_owned(), id);
			server_classes.push(ServerClass::new(id, name.to_owned(), table));
		}
		let mut schema = Self { tables, table_order, server_classes, table_to_class };
		for index in 0..schema.server_classes.len() {
			let table_to_class = schema.table_to_class.clone();
			schema.server_classes[index].resolve_base(&table_to_class)?;
		}
		Ok(schema)
	}
}

/// Byte-aligned reader for the directory that trails the `CSVCMsg_SendTable`
/// run in a `DATA_TABLES` body; distinct from [`crate::bits::BitDecoder`]
/// since nothing here is bit-packed.
struct ByteCursor<'l> {
	data: &'l [u8],
	position: usize,
}

impl<'l> ByteCursor<'l> {
	fn new(data: &'l [u8]) -> Self {
		Self { data, position: 0 }
	}

	fn take(&mut self, len: usize) -> GameResult<&'l [u8]> {
		let end = self.position + len;
		let slice = self.data.get(self.position..end).ok_or_else(|| GameError::unexpected_end("data tables body"))?;
		self.position = end;
		Ok(slice)
	}

	fn u16_le(&mut self) -> GameResult<u16> {
		Ok(u16::from_le_bytes(self.take(2)?.try_into().unwrap()))
	}

	/// Standard protobuf-style LEB128 varint, matching the length prefix
	/// each `CSVCMsg_SendTable` message carries in the raw stream.
	fn varint(&mut self) -> GameResult<u64> {
		let mut result: u64 = 0;
		for group in 0..10 {
			let byte = self.take(1)?[0];
			result |= ((byte & 0x7f) as u64) << (group * 7);
			if byte & 0x80 == 0 {
				return Ok(result);
			}
		}
		Err(GameError::malformed("varint longer than 10 bytes"))
	}

	fn nul_terminated(&mut self) -> GameResult<String> {
		let start = self.position;
		while *self.data.get(self.position).ok_or_else(|| GameError::unexpected_end("data tables body"))? != 0 {
			self.position += 1;
		}
		let s = String::from_utf8_lossy(&self.data[start..self.position]).into_owned();
		self.position += 1;
		Ok(s)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn encode_table(message: &CsvcMsgSendTable) -> Vec<u8> {
		let mut body = Vec::new();
		prost::encode_length_delimiter(message.encoded_len(), &mut body).unwrap();
		message.encode(&mut body).unwrap();
		body
	}

	#[test]
	fn parses_data_tables_body_and_binds_directory() {
		let table = CsvcMsgSendTable { net_table_name: Some("DT_Player".into()), is_end: None, needs_decoder: None, props: vec![] };
		let terminator = CsvcMsgSendTable { is_end: Some(true), net_table_name: None, needs_decoder: None, props: vec![] };

		let mut body = encode_table(&table);
		body.extend(encode_table(&terminator));
		body.extend(1u16.to_le_bytes());
		body.extend(40u16.to_le_bytes());
		body.extend(b"CPlayer\0");
		body.extend(b"DT_Player\0");

		let schema = Schema::from_data_tables_body(&body).unwrap();
		assert_eq!(schema.tables.len(), 1);
		assert!(schema.tables.contains_key("DT_Player"));
		assert_eq!(schema.server_classes.len(), 1);
		assert_eq!(schema.server_class(0).unwrap().name, "CPlayer");
	}

	#[test]
	fn rejects_unknown_data_table_reference() {
		let terminator = CsvcMsgSendTable { is_end: Some(true), net_table_name: None, needs_decoder: None, props: vec![] };
		let mut body = encode_table(&terminator);
		body.extend(1u16.to_le_bytes());
		body.extend(1u16.to_le_bytes());
		body.extend(b"CPlayer\0");
		body.extend(b"DT_Missing\0");

		assert!(Schema::from_data_tables_body(&body).is_err());
	}
}
