//! Per-property flag bits parsed off `SendTableProperty`. These alter either
//! *decode* (which BitDecoder routine a property uses) or *layout* (whether a
//! property collapses into its parent or hides inside an array).

use bitflags::bitflags;

bitflags! {
	#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
	pub struct PropertyFlags: u32 {
		const UNSIGNED = 1 << 0;
		const COORD = 1 << 1;
		const NO_SCALE = 1 << 2;
		const ROUND_DOWN = 1 << 3;
		const ROUND_UP = 1 << 4;
		const NORMAL = 1 << 5;
		const EXCLUDE = 1 << 6;
		const XYZ = 1 << 7;
		const INSIDE_ARRAY = 1 << 8;
		const PROXY_ALWAYS_YES = 1 << 9;
		const IS_VECTOR_ELEMENT = 1 << 10;
		const COLLAPSIBLE = 1 << 11;
		const COORD_MP = 1 << 12;
		const COORD_MP_LOW_PRECISION = 1 << 13;
		const COORD_MP_INTEGRAL = 1 << 14;
		const CELL_COORD = 1 << 15;
		const CELL_COORD_LOW_PRECISION = 1 << 16;
		const CELL_COORD_INTEGRAL = 1 << 17;
		const CHANGES_OFTEN = 1 << 18;
		const VARIABLE_INT = 1 << 19;
	}
}

impl PropertyFlags {
	/// Layout-affecting flags never change how a value is *decoded*; they
	/// only change where a property lives in its owning table's structure.
	pub fn affects_layout_only(self) -> bool {
		self.intersects(Self::COLLAPSIBLE | Self::INSIDE_ARRAY)
	}
}
