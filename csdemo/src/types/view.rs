//! `View`, `Lens`, and `Reference`: the indexing layer over [`Type`](super::Type).
//!
//! A `View` is a resolved `(type, offset)` pair reached by chaining
//! `[name]`/`[index]` lookups; its `path` additionally records which member
//! or element index was taken at each step, which is what lets a `Reference`
//! navigate the `Value` tree an `Instance` actually stores. Absolute `offset`
//! is retained purely so two `View`s rooted at the same type can be compared
//! by offset-interval containment, independent of the path that produced them.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{GameError, GameResult};
use crate::value::Value;

use super::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegment {
	Member(usize),
	Index(usize),
}

#[derive(Debug, Clone)]
pub struct View {
	pub ty: Type,
	pub offset: usize,
	pub path: Vec<PathSegment>,
}

impl View {
	pub fn root(ty: Type) -> Self {
		Self { ty, offset: 0, path: Vec::new() }
	}

	/// Looks up `name` as a member of `self`'s (necessarily `Object`) type
	/// and composes the offset/path onto `self`.
	pub fn member(&self, name: &str) -> GameResult<Self> {
		let object = self
			.ty
			.as_object()
			.ok_or_else(|| GameError::invariant(format!("`{name}` requested on non-object type {}", self.ty.represent())))?;
		let index = object
			.member_index(name)
			.ok_or_else(|| GameError::lookup(format!("no member named `{name}` on {}", object.represent())))?;
		let member = &object.members[index];
		let mut path = self.path.clone();
		path.push(PathSegment::Member(index));
		Ok(Self { ty: member.ty.clone(), offset: self.offset + member.offset, path })
	}

	/// Looks up `index` as an element of `self`'s (necessarily `Array`) type.
	pub fn index(&self, index: usize) -> GameResult<Self> {
		let array = self
			.ty
			.as_array()
			.ok_or_else(|| GameError::invariant(format!("index {index} requested on non-array type {}", self.ty.represent())))?;
		if index >= array.length {
			return Err(GameError::invariant(format!("index {index} out of bounds (length {})", array.length)));
		}
		let mut path = self.path.clone();
		path.push(PathSegment::Index(index));
		Ok(Self { ty: array.element.clone(), offset: self.offset + index * array.element.size(), path })
	}

	fn end(&self) -> usize {
		self.offset + self.ty.size()
	}

	/// `self ≤ other`: the region `self` names lies entirely within `other`'s.
	pub fn contained_in(&self, other: &Self) -> bool {
		other.offset <= self.offset && self.end() <= other.end()
	}

	/// `self < other`: a strict sub-region.
	pub fn strictly_contained_in(&self, other: &Self) -> bool {
		self.contained_in(other) && (self.offset != other.offset || self.end() != other.end())
	}

	pub fn overlaps(&self, other: &Self) -> bool {
		self.offset < other.end() && other.offset < self.end()
	}
}

/// A `View` anchored to the root `Type` it was resolved against; applying it
/// to an `Instance` checks that the instance's type matches `origin`.
#[derive(Debug, Clone)]
pub struct Lens {
	pub origin: Type,
	pub view: View,
}

impl Lens {
	pub fn new(origin: Type) -> Self {
		let view = View::root(origin.clone());
		Self { origin, view }
	}

	pub fn member(&self, name: &str) -> GameResult<Self> {
		Ok(Self { origin: self.origin.clone(), view: self.view.member(name)? })
	}

	pub fn index(&self, index: usize) -> GameResult<Self> {
		Ok(Self { origin: self.origin.clone(), view: self.view.index(index)? })
	}

	pub fn apply(&self, instance: &Instance) -> GameResult<Reference> {
		if instance.ty != self.origin {
			return Err(GameError::invariant("lens applied to an instance of the wrong type"));
		}
		Ok(Reference { lens: self.clone(), root: instance.data.clone() })
	}
}

/// An owned instance of an `ObjectType`: the type plus its shared, interior-
/// mutable data tree. Database entities and standalone event instances are
/// both `Instance`s.
#[derive(Debug, Clone)]
pub struct Instance {
	pub ty: Type,
	pub data: Rc<RefCell<Value>>,
}

impl Instance {
	pub fn new(ty: Type) -> Self {
		let data = ty.construct();
		Self { ty, data: Rc::new(RefCell::new(data)) }
	}

	pub fn root_lens(&self) -> Lens {
		Lens::new(self.ty.clone())
	}
}

/// A resolved, live pointer into an `Instance`'s data: `(Lens, shared data)`.
pub struct Reference {
	pub lens: Lens,
	root: Rc<RefCell<Value>>,
}

impl Reference {
	pub fn get(&self) -> Value {
		let root = self.root.borrow();
		navigate(&root, &self.lens.view.path).clone()
	}

	pub fn set(&self, value: Value) {
		let mut root = self.root.borrow_mut();
		*navigate_mut(&mut root, &self.lens.view.path) = value;
	}
}

fn navigate<'v>(root: &'v Value, path: &[PathSegment]) -> &'v Value {
	let mut current = root;
	for segment in path {
		current = match (segment, current) {
			(PathSegment::Member(i), Value::Object(members)) => &members[*i],
			(PathSegment::Index(i), Value::Array(elements)) => &elements[*i],
			_ => unreachable!("path segment does not match value shape"),
		};
	}
	current
}

fn navigate_mut<'v>(root: &'v mut Value, path: &[PathSegment]) -> &'v mut Value {
	let mut current = root;
	for segment in path {
		current = match (segment, current) {
			(PathSegment::Member(i), Value::Object(members)) => &mut members[*i],
			(PathSegment::Index(i), Value::Array(elements)) => &mut elements[*i],
			_ => unreachable!("path segment does not match value shape"),
		};
	}
	current
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::{Builder, ValueType};

	#[test]
	fn lens_roundtrips_through_instance() {
		let mut builder = Builder::new("Player");
		builder.member("health", Type::Value(ValueType::Int32));
		let ty = Type::Object(Rc::new(builder.build()));

		let instance = Instance::new(ty.clone());
		let lens = instance.root_lens().member("health").unwrap();
		let reference = lens.apply(&instance).unwrap();

		assert_eq!(reference.get(), Value::Int32(0));
		reference.set(Value::Int32(42));
		assert_eq!(reference.get(), Value::Int32(42));
	}

	#[test]
	fn lens_rejects_wrong_origin_type() {
		let mut a = Builder::new("A");
		a.member("x", Type::Value(ValueType::Int32));
		let a_ty = Type::Object(Rc::new(a.build()));

		let mut b = Builder::new("B");
		b.member("x", Type::Value(ValueType::Int32));
		let b_ty = Type::Object(Rc::new(b.build()));

		let instance = Instance::new(a_ty);
		let lens = Lens::new(b_ty);
		assert!(lens.apply(&instance).is_err());
	}

	#[test]
	fn view_offset_containment() {
		let mut builder = Builder::new("Outer");
		builder.member("a", Type::Value(ValueType::Int32));
		builder.member("b", Type::Value(ValueType::Int64));
		let ty = Type::Object(Rc::new(builder.build()));

		let root = View::root(ty);
		let a = root.member("a").unwrap();
		let b = root.member("b").unwrap();
		assert!(a.strictly_contained_in(&root));
		assert!(b.strictly_contained_in(&root));
		assert!(!a.overlaps(&b));
	}
}
