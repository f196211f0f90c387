//! [`Value`] is what a property decodes *to* before it is written into an
//! entity's raw byte buffer: a convenience sum type mirroring the wire's own
//! small closed set of leaf representations, one variant per `Property` kind.

#[derive(Debug, Clone, PartialEq)]
pub struct Vector3 {
	pub x: f32,
	pub y: f32,
	pub z: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Vector2 {
	pub x: f32,
	pub y: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	Int32(i32),
	Int64(i64),
	Float(f32),
	Vector2(Vector2),
	Vector3(Vector3),
	String(String),
	Array(Vec<Value>),
	/// An instance of an `ObjectType`: one slot per member, in declaration
	/// order. Not a wire-level representation — this is the in-memory shape
	/// `Type::construct` produces and `Reference` navigates.
	Object(Vec<Value>),
}

impl Value {
	pub fn as_i32(&self) -> Option<i32> {
		match self {
			Self::Int32(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_i64(&self) -> Option<i64> {
		match self {
			Self::Int64(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_f32(&self) -> Option<f32> {
		match self {
			Self::Float(v) => Some(*v),
			_ => None,
		}
	}

	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::String(v) => Some(v),
			_ => None,
		}
	}
}
