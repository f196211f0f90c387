//! Wire message definitions for the net-message protobufs this engine
//! consumes. Hand-written rather than generated by `prost-build` from a
//! `.proto` file (see DESIGN.md) — the field shapes mirror what `protoc`
//! would emit for the real `netmessages.proto`: `required` fields become
//! plain scalars, `optional` fields become `Option<T>` with a generated
//! default-value getter of the same name.

#![allow(clippy::derive_partial_eq_without_eq)]

/// One property entry of a `CSVCMsg_SendTable` message.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SendTablePropertyWire {
	#[prost(int32, tag = "1")]
	pub r#type: i32,
	#[prost(string, optional, tag = "2")]
	pub var_name: Option<String>,
	#[prost(int32, tag = "3")]
	pub flags: i32,
	#[prost(string, optional, tag = "4")]
	pub dt_name: Option<String>,
	#[prost(int32, optional, tag = "5")]
	pub num_bits: Option<i32>,
	#[prost(float, optional, tag = "6")]
	pub low_value: Option<f32>,
	#[prost(float, optional, tag = "7")]
	pub high_value: Option<f32>,
	#[prost(int32, optional, tag = "8")]
	pub num_elements: Option<i32>,
	#[prost(int32, optional, tag = "9")]
	pub priority: Option<i32>,
}

impl SendTablePropertyWire {
	pub fn var_name(&self) -> &str {
		self.var_name.as_deref().unwrap_or("")
	}

	pub fn dt_name(&self) -> &str {
		self.dt_name.as_deref().unwrap_or("")
	}

	pub fn num_bits(&self) -> i32 {
		self.num_bits.unwrap_or(0)
	}

	pub fn low_value(&self) -> f32 {
		self.low_value.unwrap_or(0.0)
	}

	pub fn high_value(&self) -> f32 {
		self.high_value.unwrap_or(1.0)
	}

	pub fn num_elements(&self) -> i32 {
		self.num_elements.unwrap_or(100)
	}

	pub fn priority(&self) -> i32 {
		self.priority.unwrap_or(64)
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgSendTable {
	#[prost(bool, optional, tag = "1")]
	pub is_end: Option<bool>,
	#[prost(string, optional, tag = "2")]
	pub net_table_name: Option<String>,
	#[prost(int32, optional, tag = "3")]
	pub needs_decoder: Option<i32>,
	#[prost(message, repeated, tag = "4")]
	pub props: Vec<SendTablePropertyWire>,
}

impl CsvcMsgSendTable {
	pub fn is_end(&self) -> bool {
		self.is_end.unwrap_or(false)
	}

	pub fn net_table_name(&self) -> &str {
		self.net_table_name.as_deref().unwrap_or("")
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgServerInfo {
	#[prost(int32, optional, tag = "1")]
	pub protocol: Option<i32>,
	#[prost(int32, optional, tag = "2")]
	pub server_count: Option<i32>,
	#[prost(int32, optional, tag = "3")]
	pub max_classes: Option<i32>,
	#[prost(string, optional, tag = "4")]
	pub map_name: Option<String>,
	#[prost(string, optional, tag = "5")]
	pub game_dir: Option<String>,
}

impl CsvcMsgServerInfo {
	pub fn max_classes(&self) -> i32 {
		self.max_classes.unwrap_or(0)
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgCreateStringTable {
	#[prost(string, optional, tag = "1")]
	pub name: Option<String>,
	#[prost(int32, optional, tag = "2")]
	pub max_entries: Option<i32>,
	#[prost(int32, optional, tag = "3")]
	pub num_entries: Option<i32>,
	#[prost(bool, optional, tag = "4")]
	pub user_data_fixed_size: Option<bool>,
	#[prost(int32, optional, tag = "5")]
	pub user_data_size: Option<i32>,
	#[prost(int32, optional, tag = "6")]
	pub user_data_size_bits: Option<i32>,
	#[prost(int32, optional, tag = "7")]
	pub flags: Option<i32>,
	#[prost(bytes = "vec", optional, tag = "8")]
	pub string_data: Option<Vec<u8>>,
}

impl CsvcMsgCreateStringTable {
	pub fn name(&self) -> &str {
		self.name.as_deref().unwrap_or("")
	}

	pub fn max_entries(&self) -> i32 {
		self.max_entries.unwrap_or(4096)
	}

	pub fn num_entries(&self) -> i32 {
		self.num_entries.unwrap_or(0)
	}

	pub fn user_data_fixed_size(&self) -> bool {
		self.user_data_fixed_size.unwrap_or(false)
	}

	pub fn user_data_size_bits(&self) -> i32 {
		self.user_data_size_bits.unwrap_or(0)
	}

	pub fn string_data(&self) -> &[u8] {
		self.string_data.as_deref().unwrap_or(&[])
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgUpdateStringTable {
	#[prost(int32, optional, tag = "1")]
	pub table_id: Option<i32>,
	#[prost(int32, optional, tag = "2")]
	pub num_changed_entries: Option<i32>,
	#[prost(bytes = "vec", optional, tag = "3")]
	pub string_data: Option<Vec<u8>>,
}

impl CsvcMsgUpdateStringTable {
	pub fn table_id(&self) -> i32 {
		self.table_id.unwrap_or(0)
	}

	pub fn num_changed_entries(&self) -> i32 {
		self.num_changed_entries.unwrap_or(0)
	}

	pub fn string_data(&self) -> &[u8] {
		self.string_data.as_deref().unwrap_or(&[])
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgPacketEntities {
	#[prost(int32, optional, tag = "1")]
	pub max_entries: Option<i32>,
	#[prost(int32, optional, tag = "2")]
	pub updated_entries: Option<i32>,
	#[prost(bool, optional, tag = "3")]
	pub is_delta: Option<bool>,
	#[prost(bool, optional, tag = "4")]
	pub update_baseline: Option<bool>,
	#[prost(int32, optional, tag = "5")]
	pub baseline: Option<i32>,
	#[prost(int32, optional, tag = "6")]
	pub delta_from: Option<i32>,
	#[prost(bytes = "vec", optional, tag = "7")]
	pub entity_data: Option<Vec<u8>>,
}

impl CsvcMsgPacketEntities {
	pub fn updated_entries(&self) -> i32 {
		self.updated_entries.unwrap_or(0)
	}

	pub fn is_delta(&self) -> bool {
		self.is_delta.unwrap_or(false)
	}

	pub fn entity_data(&self) -> &[u8] {
		self.entity_data.as_deref().unwrap_or(&[])
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgGameEventListKeyT {
	#[prost(int32, optional, tag = "1")]
	pub r#type: Option<i32>,
	#[prost(string, optional, tag = "2")]
	pub name: Option<String>,
}

impl CsvcMsgGameEventListKeyT {
	pub fn r#type(&self) -> i32 {
		self.r#type.unwrap_or(0)
	}

	pub fn name(&self) -> &str {
		self.name.as_deref().unwrap_or("")
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgGameEventListDescriptorT {
	#[prost(int32, optional, tag = "1")]
	pub eventid: Option<i32>,
	#[prost(string, optional, tag = "2")]
	pub name: Option<String>,
	#[prost(message, repeated, tag = "3")]
	pub keys: Vec<CsvcMsgGameEventListKeyT>,
}

impl CsvcMsgGameEventListDescriptorT {
	pub fn eventid(&self) -> i32 {
		self.eventid.unwrap_or(0)
	}

	pub fn name(&self) -> &str {
		self.name.as_deref().unwrap_or("")
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgGameEventList {
	#[prost(message, repeated, tag = "1")]
	pub descriptors: Vec<CsvcMsgGameEventListDescriptorT>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgGameEventKeyT {
	#[prost(int32, optional, tag = "1")]
	pub r#type: Option<i32>,
	#[prost(string, optional, tag = "2")]
	pub val_string: Option<String>,
	#[prost(float, optional, tag = "3")]
	pub val_float: Option<f32>,
	#[prost(int32, optional, tag = "4")]
	pub val_long: Option<i32>,
	#[prost(int32, optional, tag = "5")]
	pub val_short: Option<i32>,
	#[prost(int32, optional, tag = "6")]
	pub val_byte: Option<i32>,
	#[prost(bool, optional, tag = "7")]
	pub val_bool: Option<bool>,
	#[prost(uint64, optional, tag = "8")]
	pub val_uint64: Option<u64>,
	#[prost(bytes = "vec", optional, tag = "9")]
	pub val_wstring: Option<Vec<u8>>,
}

impl CsvcMsgGameEventKeyT {
	pub fn val_string(&self) -> &str {
		self.val_string.as_deref().unwrap_or("")
	}

	pub fn val_float(&self) -> f32 {
		self.val_float.unwrap_or(0.0)
	}

	pub fn val_long(&self) -> i32 {
		self.val_long.unwrap_or(0)
	}

	pub fn val_short(&self) -> i32 {
		self.val_short.unwrap_or(0)
	}

	pub fn val_byte(&self) -> i32 {
		self.val_byte.unwrap_or(0)
	}

	pub fn val_bool(&self) -> bool {
		self.val_bool.unwrap_or(false)
	}

	pub fn val_uint64(&self) -> u64 {
		self.val_uint64.unwrap_or(0)
	}

	pub fn val_wstring(&self) -> &[u8] {
		self.val_wstring.as_deref().unwrap_or(&[])
	}
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CsvcMsgGameEvent {
	#[prost(string, optional, tag = "1")]
	pub event_name: Option<String>,
	#[prost(int32, optional, tag = "2")]
	pub eventid: Option<i32>,
	#[prost(message, repeated, tag = "3")]
	pub keys: Vec<CsvcMsgGameEventKeyT>,
}

impl CsvcMsgGameEvent {
	pub fn eventid(&self) -> i32 {
		self.eventid.unwrap_or(0)
	}
}
