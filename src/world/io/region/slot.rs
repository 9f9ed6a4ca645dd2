use std::fmt;

use super::super::SECTOR_BYTES;

/// Local chunk coordinates inside a region: two 5-bit axes addressing
/// the 32x32 slot grid. Out-of-range values wrap, so absolute chunk
/// coordinates are accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SlotCoord {
	cx: u8,
	cz: u8,
}

impl SlotCoord {
	pub fn new(cx: u8, cz: u8) -> Self {
		Self {
			cx: cx & 31,
			cz: cz & 31,
		}
	}

	pub fn cx(&self) -> u8 {
		self.cx
	}

	pub fn cz(&self) -> u8 {
		self.cz
	}

	/// Position of this slot in the 1024-entry header tables, which are
	/// laid out row by row with `cz` as the row.
	pub fn table_index(&self) -> usize {
		self.cz as usize * 32 + self.cx as usize
	}

	/// Every slot of the grid, in the optimizer's fixed walk order:
	/// `cx` outer, `cz` inner.
	pub fn all() -> impl Iterator<Item = SlotCoord> {
		(0..32u8).flat_map(|cx| (0..32u8).map(move |cz| SlotCoord::new(cx, cz)))
	}
}

impl fmt::Display for SlotCoord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "({}, {})", self.cx, self.cz)
	}
}

/// Where one slot's payload lives: a starting sector and a sector
/// count. On disk the pair is packed into a single big-endian u32 per
/// slot; in memory the two are kept apart and only packed at the io
/// boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotLocation {
	sector: u32,
	count: u8,
}

impl SlotLocation {
	pub fn new(sector: u32, count: u8) -> Self {
		Self { sector, count }
	}

	/// Splits a raw header entry into its sector index and count.
	pub fn unpack(raw: u32) -> Self {
		Self {
			sector: raw >> 8,
			count: (raw & 0xFF) as u8,
		}
	}

	/// The raw header entry for this location.
	pub fn pack(&self) -> u32 {
		(self.sector << 8) | self.count as u32
	}

	/// A zero entry marks a vacant slot.
	pub fn is_empty(&self) -> bool {
		self.sector == 0 && self.count == 0
	}

	pub fn sector_count(&self) -> u8 {
		self.count
	}

	/// File offset where the slot's payload begins.
	pub fn byte_offset(&self) -> u64 {
		self.sector as u64 * SECTOR_BYTES
	}

	/// Bytes the slot occupies on disk, padding included.
	pub fn byte_len(&self) -> u64 {
		self.count as u64 * SECTOR_BYTES
	}

	/// File offset just past the slot's last sector.
	pub fn byte_end(&self) -> u64 {
		self.byte_offset() + self.byte_len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn coord_wraps_and_indexes() {
		let slot = SlotCoord::new(32, 33);
		assert_eq!((slot.cx(), slot.cz()), (0, 1));
		assert_eq!(slot.table_index(), 32);
		assert_eq!(SlotCoord::new(5, 7).table_index(), 5 + 7 * 32);
		assert_eq!(SlotCoord::new(3, 4).to_string(), "(3, 4)");
	}

	#[test]
	fn all_walks_every_slot_cx_outer() {
		let slots: Vec<SlotCoord> = SlotCoord::all().collect();
		assert_eq!(slots.len(), 1024);
		assert_eq!(slots[0], SlotCoord::new(0, 0));
		assert_eq!(slots[1], SlotCoord::new(0, 1));
		assert_eq!(slots[32], SlotCoord::new(1, 0));
		assert_eq!(slots[1023], SlotCoord::new(31, 31));
	}

	#[test]
	fn location_packs_and_measures() {
		let location = SlotLocation::new(2, 3);
		assert_eq!(location.pack(), 0x0000_0203);
		assert_eq!(SlotLocation::unpack(0x0000_0203), location);
		assert_eq!(location.byte_offset(), 8192);
		assert_eq!(location.byte_len(), 12288);
		assert_eq!(location.byte_end(), 20480);
		assert!(!location.is_empty());
		assert!(SlotLocation::unpack(0).is_empty());
		assert_eq!(SlotLocation::unpack(0), SlotLocation::default());
	}
}
