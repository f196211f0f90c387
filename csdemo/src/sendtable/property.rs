//! `Property`: one field of a `SendTable`. Modeled as a tagged sum
//! (`PropertyKind`) rather than the source's dynamic-dispatch subclass
//! hierarchy, per the design notes — the common operations (`decode`) become
//! exhaustive pattern matches instead of virtual calls.

use csdemo_derive::FromRepr;

use crate::bits::BitDecoder;
use crate::error::{GameError, GameResult};
use crate::flags::PropertyFlags;
use crate::proto::SendTablePropertyWire;
use crate::value::{Value, Vector2, Vector3};

/// Mirrors `SendTablePropertyType` in the wire protobuf: the discriminant of
/// `CSVCMsg_SendTable.Property.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRepr)]
#[repr(i32)]
pub enum WireKind {
	Int32 = 0,
	Float = 1,
	Vector3 = 2,
	Vector2 = 3,
	String = 4,
	Array = 5,
	DataTable = 6,
	Int64 = 7,
}

#[derive(Debug, Clone)]
pub enum PropertyKind {
	Int32 { num_bits: u32 },
	Int64 { num_bits: u32 },
	Float { low: f32, high: f32, num_bits: u32 },
	Vector2 { low: f32, high: f32, num_bits: u32 },
	Vector3 { low: f32, high: f32, num_bits: u32 },
	String,
	Array { element: Box<Property>, length: u32 },
	DataTable { table_name: String },
}

impl PropertyKind {
	/// Structural equality ignoring `name` — used by array-data-table
	/// detection, which requires every element to share kind and parameters.
	pub fn structurally_equal(&self, other: &Self) -> bool {
		use PropertyKind::*;
		match (self, other) {
			(Int32 { num_bits: a }, Int32 { num_bits: b }) => a == b,
			(Int64 { num_bits: a }, Int64 { num_bits: b }) => a == b,
			(Float { low: al, high: ah, num_bits: ab }, Float { low: bl, high: bh, num_bits: bb }) => {
				al == bl && ah == bh && ab == bb
			}
			(Vector2 { low: al, high: ah, num_bits: ab }, Vector2 { low: bl, high: bh, num_bits: bb }) => {
				al == bl && ah == bh && ab == bb
			}
			(Vector3 { low: al, high: ah, num_bits: ab }, Vector3 { low: bl, high: bh, num_bits: bb }) => {
				al == bl && ah == bh && ab == bb
			}
			(String, String) => true,
			(Array { element: a, length: al }, Array { element: b, length: bl }) => {
				al == bl && a.kind.structurally_equal(&b.kind) && a.flags == b.flags
			}
			(DataTable { table_name: a }, DataTable { table_name: b }) => a == b,
			_ => false,
		}
	}
}

#[derive(Debug, Clone)]
pub struct Property {
	pub name: String,
	pub priority: u8,
	pub flags: PropertyFlags,
	pub kind: PropertyKind,
}

impl Property {
	pub fn from_wire(wire: &SendTablePropertyWire, flags: PropertyFlags, element: Option<Box<Property>>) -> Self {
		let kind_code = WireKind::from_repr(wire.r#type).unwrap_or(WireKind::Int32);
		let kind = match kind_code {
			WireKind::Int32 => PropertyKind::Int32 { num_bits: wire.num_bits() as u32 },
			WireKind::Int64 => PropertyKind::Int64 { num_bits: wire.num_bits() as u32 },
			WireKind::Float => PropertyKind::Float {
				low: wire.low_value(),
				high: wire.high_value(),
				num_bits: wire.num_bits() as u32,
			},
			WireKind::Vector2 => PropertyKind::Vector2 {
				low: wire.low_value(),
				high: wire.high_value(),
				num_bits: wire.num_bits() as u32,
			},
			WireKind::Vector3 => PropertyKind::Vector3 {
				low: wire.low_value(),
				high: wire.high_value(),
				num_bits: wire.num_bits() as u32,
			},
			WireKind::String => PropertyKind::String,
			WireKind::Array => PropertyKind::Array {
				element: element.unwrap_or_else(|| {
					Box::new(Property {
						name: String::new(),
						priority: 0,
						flags: PropertyFlags::empty(),
						kind: PropertyKind::Int32 { num_bits: 32 },
					})
				}),
				length: wire.num_elements() as u32,
			},
			WireKind::DataTable => PropertyKind::DataTable { table_name: wire.dt_name().to_owned() },
		};

		Self {
			name: wire.var_name().to_owned(),
			priority: wire.priority() as u8,
			flags,
			kind,
		}
	}

	pub fn is_data_table(&self) -> bool {
		matches!(self.kind, PropertyKind::DataTable { .. })
	}

	/// Decodes one instance of this property's value off `bits`. Never
	/// called for `DataTable` properties: those are structural and never
	/// survive into an `EntityType`'s flattened, decodable field list.
	pub fn decode(&self, bits: &mut BitDecoder) -> GameResult<Value> {
		match &self.kind {
			PropertyKind::Int32 { num_bits } => Ok(Value::Int32(self.decode_int32(bits, *num_bits)?)),
			PropertyKind::Int64 { num_bits } => Ok(Value::Int64(self.decode_int64(bits, *num_bits)?)),
			PropertyKind::Float { low, high, num_bits } => {
				Ok(Value::Float(decode_float(bits, *low, *high, *num_bits, self.flags)?))
			}
			PropertyKind::Vector2 { low, high, num_bits } => {
				let x = decode_float(bits, *low, *high, *num_bits, self.flags)?;
				let y = decode_float(bits, *low, *high, *num_bits, self.flags)?;
				Ok(Value::Vector2(Vector2 { x, y }))
			}
			PropertyKind::Vector3 { low, high, num_bits } => Ok(Value::Vector3(self.decode_vector3(bits, *low, *high, *num_bits)?)),
			PropertyKind::String => Ok(Value::String(self.decode_string(bits)?)),
			PropertyKind::Array { element, length } => {
				let prefix_bits = ceil_log2(*length as u64 + 1).max(1);
				let count: u32 = bits.read(prefix_bits)?;
				let mut values = Vec::with_capacity(count as usize);
				for _ in 0..count {
					values.push(element.decode(bits)?);
				}
				Ok(Value::Array(values))
			}
			PropertyKind::DataTable { table_name } => Err(GameError::invariant(format!(
				"attempted to decode structural DataTable property `{table_name}`"
			))),
		}
	}

	fn decode_int32(&self, bits: &mut BitDecoder, num_bits: u32) -> GameResult<i32> {
		if self.flags.contains(PropertyFlags::VARIABLE_INT) {
			if self.flags.contains(PropertyFlags::UNSIGNED) {
				Ok(bits.read_variable_unsigned_32()? as i32)
			} else {
				bits.read_variable_signed_32()
			}
		} else if self.flags.contains(PropertyFlags::UNSIGNED) {
			Ok(bits.read::<u32>(num_bits)? as i32)
		} else {
			let raw: u32 = bits.read(num_bits)?;
			let shift = 32 - num_bits;
			Ok(((raw << shift) as i32) >> shift)
		}
	}

	fn decode_int64(&self, bits: &mut BitDecoder, num_bits: u32) -> GameResult<i64> {
		if self.flags.contains(PropertyFlags::VARIABLE_INT) {
			if self.flags.contains(PropertyFlags::UNSIGNED) {
				Ok(bits.read_variable_unsigned_64()? as i64)
			} else {
				bits.read_variable_signed_64()
			}
		} else {
			let sign = bits.read_bool()?;
			let magnitude: u64 = bits.read(num_bits.saturating_sub(1))?;
			Ok(if sign { -(magnitude as i64) } else { magnitude as i64 })
		}
	}

	fn decode_string(&self, bits: &mut BitDecoder) -> GameResult<String> {
		let len: u32 = bits.read(9)?;
		let mut bytes = Vec::with_capacity(len as usize);
		for _ in 0..len {
			bytes.push(bits.read::<u8>(8)?);
		}
		String::from_utf8(bytes).map_err(|_| GameError::malformed("property string is not valid UTF-8"))
	}

	/// `XYZ`-flagged Vector3 properties decode a unit-length direction: x/y
	/// as `bit_normal` components plus a sign bit, z's magnitude recovered
	/// from the quadrant identity `z = ±sqrt(1 - x^2 - y^2)`.
	fn decode_vector3(&self, bits: &mut BitDecoder, low: f32, high: f32, num_bits: u32) -> GameResult<Vector3> {
		if self.flags.contains(PropertyFlags::XYZ) {
			let x = bits.bit_normal()?;
			let y = bits.bit_normal()?;
			let sign = bits.read_bool()?;
			let magnitude_sq = 1.0 - x * x - y * y;
			let magnitude = if magnitude_sq > 0.0 { magnitude_sq.sqrt() } else { 0.0 };
			let z = if sign { -magnitude } else { magnitude };
			Ok(Vector3 { x, y, z })
		} else {
			let x = decode_float(bits, low, high, num_bits, self.flags)?;
			let y = decode_float(bits, low, high, num_bits, self.flags)?;
			let z = decode_float(bits, low, high, num_bits, self.flags)?;
			Ok(Vector3 { x, y, z })
		}
	}
}

/// Dispatches a `Float`-kind decode on flag bits, in the precedence the
/// schema's Float table declares: coord, then the `COORD_MP` family, then
/// `NO_SCALE`, then `NORMAL`, then the `CELL_COORD` family, falling back to
/// the generic scaled-quantization decoder.
fn decode_float(bits: &mut BitDecoder, low: f32, high: f32, num_bits: u32, flags: PropertyFlags) -> GameResult<f32> {
	if flags.contains(PropertyFlags::COORD) {
		bits.bit_coord()
	} else if flags.intersects(PropertyFlags::COORD_MP | PropertyFlags::COORD_MP_LOW_PRECISION | PropertyFlags::COORD_MP_INTEGRAL) {
		let integral = flags.contains(PropertyFlags::COORD_MP_INTEGRAL);
		let low_precision = flags.contains(PropertyFlags::COORD_MP_LOW_PRECISION);
		bits.bit_coord_multiplayer(integral, low_precision)
	} else if flags.contains(PropertyFlags::NO_SCALE) {
		bits.no_scale()
	} else if flags.contains(PropertyFlags::NORMAL) {
		bits.bit_normal()
	} else if flags.intersects(PropertyFlags::CELL_COORD | PropertyFlags::CELL_COORD_LOW_PRECISION | PropertyFlags::CELL_COORD_INTEGRAL) {
		let integral = flags.contains(PropertyFlags::CELL_COORD_INTEGRAL);
		let low_precision = flags.contains(PropertyFlags::CELL_COORD_LOW_PRECISION);
		bits.bit_cell_coord(num_bits, integral, low_precision)
	} else {
		bits.scaled(low, high, num_bits, flags.contains(PropertyFlags::ROUND_DOWN), flags.contains(PropertyFlags::ROUND_UP))
	}
}

pub(crate) fn ceil_log2(value: u64) -> u32 {
	u64::BITS - (value.saturating_sub(1)).leading_zeros()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn array_index_prefix_width() {
		// length=1 -> ceil(log2(2))=1, length=100 -> ceil(log2(101))=7.
		assert_eq!(ceil_log2(1 + 1), 1);
		assert_eq!(ceil_log2(100 + 1), 7);
	}

	#[test]
	fn fixed_width_signed_int32_sign_extends() {
		// 4-bit field, value 0b1000 (= -8 once sign-extended from 4 bits).
		let data = [0b0000_1000u8];
		let mut decoder = BitDecoder::new(&data);
		let prop = Property {
			name: "x".into(),
			priority: 0,
			flags: PropertyFlags::empty(),
			kind: PropertyKind::Int32 { num_bits: 4 },
		};
		assert_eq!(prop.decode_int32(&mut decoder, 4).unwrap(), -8);
	}
}
