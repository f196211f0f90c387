//! The runtime type system: entity shapes are only known once a `SendTable`
//! has been parsed, so there is no compile-time struct to describe them.
//! `Type` is a small tagged sum (a leaf `ValueType`, an `ArrayType`, or an
//! `ObjectType`) that carries its own size/alignment and knows how to
//! construct/destroy/represent an instance of itself, the way the source's
//! dynamic-dispatch `Type` hierarchy does but exhaustively matchable.

pub mod view;

use std::collections::hash_map::Entry;
use std::rc::Rc;

use fxhash::FxHashMap;

use crate::value::{Value, Vector2, Vector3};

pub use view::{Instance, Lens, PathSegment, Reference, View};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
	Int32,
	Int64,
	Float,
	Vector2,
	Vector3,
	String,
	/// The remaining four are only ever produced by `GameEventType::build`
	/// (§4.6's 1..8 kind codes go beyond what `SendTable` properties use).
	Int16,
	Bool,
	UInt64,
	WString,
	/// Wire key-type 5 (`ByteType`): a single unsigned byte, distinct from
	/// the widened `Int32` member that key-type 3 decodes into.
	Byte,
}

impl ValueType {
	pub fn size(self) -> usize {
		match self {
			Self::Int32 => 4,
			Self::Int64 => 8,
			Self::Float => 4,
			Self::Vector2 => 8,
			Self::Vector3 => 12,
			Self::String => std::mem::size_of::<String>(),
			Self::Int16 => 2,
			Self::Bool => 1,
			Self::UInt64 => 8,
			Self::WString => std::mem::size_of::<String>(),
			Self::Byte => 1,
		}
	}

	pub fn alignment(self) -> usize {
		match self {
			Self::Int32 => 4,
			Self::Int64 => 8,
			Self::Float => 4,
			Self::Vector2 => 4,
			Self::Vector3 => 4,
			Self::String => std::mem::align_of::<String>(),
			Self::Int16 => 2,
			Self::Bool => 1,
			Self::UInt64 => 8,
			Self::WString => std::mem::align_of::<String>(),
			Self::Byte => 1,
		}
	}

	pub fn default_value(self) -> Value {
		match self {
			Self::Int32 => Value::Int32(0),
			Self::Int64 => Value::Int64(0),
			Self::Float => Value::Float(0.0),
			Self::Vector2 => Value::Vector2(Vector2 { x: 0.0, y: 0.0 }),
			Self::Vector3 => Value::Vector3(Vector3 { x: 0.0, y: 0.0, z: 0.0 }),
			Self::String => Value::String(String::new()),
			Self::Int16 => Value::Int32(0),
			Self::Bool => Value::Int32(0),
			Self::UInt64 => Value::Int64(0),
			Self::WString => Value::String(String::new()),
			Self::Byte => Value::Int32(0),
		}
	}

	pub fn represent(self) -> &'static str {
		match self {
			Self::Int32 => "Int32",
			Self::Int64 => "Int64",
			Self::Float => "Float",
			Self::Vector2 => "Vector2",
			Self::Vector3 => "Vector3",
			Self::String => "String",
			Self::Int16 => "Int16",
			Self::Bool => "Bool",
			Self::UInt64 => "UInt64",
			Self::WString => "WString",
			Self::Byte => "Byte",
		}
	}
}

#[derive(Debug)]
pub struct ArrayType {
	pub element: Type,
	pub length: usize,
}

impl ArrayType {
	pub fn size(&self) -> usize {
		self.element.size() * self.length
	}

	pub fn alignment(&self) -> usize {
		self.element.alignment()
	}

	pub fn default_value(&self) -> Value {
		Value::Array(vec![self.element.default_value(); self.length])
	}
}

#[derive(Debug, Clone)]
pub struct Member {
	pub name: String,
	pub ty: Type,
	pub offset: usize,
}

/// A member-addressable struct type. Built incrementally by [`Builder`], then
/// frozen; `base` holds the (weak-in-spirit, strong-in-practice — see
/// DESIGN.md) server-class chain this type embeds at offset 0.
#[derive(Debug)]
pub struct ObjectType {
	pub name: String,
	pub base: Option<Rc<ObjectType>>,
	pub members: Vec<Member>,
	pub lookup: FxHashMap<String, usize>,
	size: usize,
	alignment: usize,
}

impl ObjectType {
	pub fn size(&self) -> usize {
		self.size
	}

	pub fn alignment(&self) -> usize {
		self.alignment
	}

	pub fn member_index(&self, name: &str) -> Option<usize> {
		self.lookup.get(name).copied()
	}

	pub fn member(&self, name: &str) -> Option<&Member> {
		self.member_index(name).map(|idx| &self.members[idx])
	}

	pub fn default_value(&self) -> Value {
		Value::Object(self.members.iter().map(|m| m.ty.default_value()).collect())
	}

	pub fn represent(&self) -> String {
		format!("Object({})", self.name)
	}
}

impl PartialEq for ObjectType {
	fn eq(&self, other: &Self) -> bool {
		std::ptr::eq(self, other)
	}
}

#[derive(Debug, Clone)]
pub enum Type {
	Value(ValueType),
	Array(Rc<ArrayType>),
	Object(Rc<ObjectType>),
}

impl Type {
	pub fn size(&self) -> usize {
		match self {
			Self::Value(v) => v.size(),
			Self::Array(a) => a.size(),
			Self::Object(o) => o.size(),
		}
	}

	pub fn alignment(&self) -> usize {
		match self {
			Self::Value(v) => v.alignment(),
			Self::Array(a) => a.alignment(),
			Self::Object(o) => o.alignment(),
		}
	}

	/// Builds the zero/empty-valued instance this type describes. Reference
	/// storage never uses raw pointers (see DESIGN.md), so `construct` and
	/// [`Self::destroy`] are value-level rather than byte-level operations.
	pub fn construct(&self) -> Value {
		match self {
			Self::Value(v) => v.default_value(),
			Self::Array(a) => a.default_value(),
			Self::Object(o) => o.default_value(),
		}
	}

	/// A no-op: member values are owned by the `Value` tree and dropped by
	/// ordinary Rust scope rules. Kept as a named operation so call sites
	/// read the same way the source's explicit destructor chaining does.
	pub fn destroy(&self, _value: Value) {}

	pub fn represent(&self) -> String {
		match self {
			Self::Value(v) => v.represent().to_owned(),
			Self::Array(a) => format!("Array({}, {})", a.element.represent(), a.length),
			Self::Object(o) => o.represent(),
		}
	}

	/// Placeholder seam for the out-of-scope code-generation collaborator
	/// (target-language struct declarations from a materialized schema).
	pub fn emit_code(&self) -> String {
		format!("// {}", self.represent())
	}

	pub fn as_object(&self) -> Option<&Rc<ObjectType>> {
		match self {
			Self::Object(o) => Some(o),
			_ => None,
		}
	}

	pub fn as_array(&self) -> Option<&Rc<ArrayType>> {
		match self {
			Self::Array(a) => Some(a),
			_ => None,
		}
	}
}

impl PartialEq for Type {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Self::Value(a), Self::Value(b)) => a == b,
			(Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b) || (a.length == b.length && a.element == b.element),
			(Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
			_ => false,
		}
	}
}

fn round_up(value: usize, alignment: usize) -> usize {
	if alignment <= 1 {
		return value;
	}
	(value + alignment - 1) / alignment * alignment
}

/// Incrementally constructs an `ObjectType`. `embed` copies another object's
/// members at aligned offsets (used for `COLLAPSIBLE` properties and
/// array-data-table flattening); `member` adds a single named member, and
/// member addition always overwrites the name→index lookup so that later
/// (child) declarations shadow earlier (base) ones.
pub struct Builder {
	name: String,
	base: Option<Rc<ObjectType>>,
	members: Vec<Member>,
	lookup: FxHashMap<String, usize>,
	cursor: usize,
}

impl Builder {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			base: None,
			members: Vec::new(),
			lookup: FxHashMap::default(),
			cursor: 0,
		}
	}

	/// Seeds the builder with `base`'s members at offset 0, recording `base`
	/// so the resulting `ObjectType` can walk its server-class ancestry.
	pub fn with_base(mut self, base: Rc<ObjectType>) -> Self {
		for member in &base.members {
			self.push_member(member.name.clone(), member.ty.clone());
		}
		self.cursor = base.size();
		self.base = Some(base);
		self
	}

	/// Copies every member of `other` into `self` at freshly aligned offsets.
	pub fn embed(&mut self, other: &ObjectType) {
		for member in &other.members {
			self.member(member.name.clone(), member.ty.clone());
		}
	}

	pub fn member(&mut self, name: impl Into<String>, ty: Type) {
		self.push_member(name.into(), ty);
	}

	fn push_member(&mut self, name: String, ty: Type) {
		let offset = round_up(self.cursor, ty.alignment().max(1));
		let size = ty.size();
		let index = self.members.len();
		self.cursor = offset + size;
		self.members.push(Member { name: name.clone(), ty, offset });
		match self.lookup.entry(name) {
			Entry::Occupied(mut occupied) => {
				*occupied.get_mut() = index;
			}
			Entry::Vacant(vacant) => {
				vacant.insert(index);
			}
		}
	}

	pub fn build(self) -> ObjectType {
		let alignment = self.members.iter().map(|m| m.ty.alignment()).max().unwrap_or(1);
		ObjectType {
			name: self.name,
			base: self.base,
			members: self.members,
			lookup: self.lookup,
			size: self.cursor,
			alignment,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn leaf(kind: ValueType) -> Type {
		Type::Value(kind)
	}

	#[test]
	fn member_offsets_respect_alignment() {
		let mut builder = Builder::new("Example");
		builder.member("flag", leaf(ValueType::Int32));
		builder.member("position", leaf(ValueType::Vector3));
		let ty = builder.build();

		assert_eq!(ty.member("flag").unwrap().offset, 0);
		assert_eq!(ty.member("position").unwrap().offset, 4);
		assert_eq!(ty.size(), 16);
	}

	#[test]
	fn child_member_shadows_base_lookup() {
		let mut base_builder = Builder::new("Base");
		base_builder.member("health", leaf(ValueType::Int32));
		let base = Rc::new(base_builder.build());

		let mut child_builder = Builder::new("Child").with_base(base.clone());
		child_builder.member("health", leaf(ValueType::Float));
		let child = child_builder.build();

		assert_eq!(child.members.len(), 2);
		let shadowed = child.member("health").unwrap();
		assert_eq!(shadowed.ty, leaf(ValueType::Float));
		assert_eq!(shadowed.offset, base.size());
	}

	#[test]
	fn embed_copies_members_at_aligned_offsets() {
		let mut inner_builder = Builder::new("Inner");
		inner_builder.member("x", leaf(ValueType::Float));
		inner_builder.member("y", leaf(ValueType::Float));
		let inner = inner_builder.build();

		let mut outer_builder = Builder::new("Outer");
		outer_builder.member("tag", leaf(ValueType::Int32));
		outer_builder.embed(&inner);
		let outer = outer_builder.build();

		assert_eq!(outer.members.len(), 3);
		assert_eq!(outer.member("y").unwrap().offset, 8);
	}
}
