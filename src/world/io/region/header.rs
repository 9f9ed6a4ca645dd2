use std::io::{Read, Write};

use crate::{
	TrimResult,
	ioext::{Readable, Writable, ReadExt, WriteExt},
};

use super::slot::{SlotCoord, SlotLocation};

/// Size of the header: one sector of locations, one of timestamps.
pub const HEADER_BYTES: u64 = 2 * 4096;

/// The 8KiB prologue of a region file: the packed location table and the
/// timestamp table. Both are kept in memory exactly as stored, as raw
/// u32 arrays, so reading and writing the header are straight loops and
/// locations are only unpacked at the accessor.
pub struct RegionHeader {
	locations: Box<[u32; 1024]>,
	timestamps: Box<[u32; 1024]>,
}

impl RegionHeader {
	/// A header with every slot vacant and every timestamp zero.
	pub fn empty() -> Self {
		Self {
			locations: Box::new([0u32; 1024]),
			timestamps: Box::new([0u32; 1024]),
		}
	}

	pub fn location(&self, slot: SlotCoord) -> SlotLocation {
		SlotLocation::unpack(self.locations[slot.table_index()])
	}

	pub fn set_location(&mut self, slot: SlotCoord, location: SlotLocation) {
		self.locations[slot.table_index()] = location.pack();
	}

	/// Unix seconds of the slot's last recorded modification.
	pub fn timestamp(&self, slot: SlotCoord) -> u32 {
		self.timestamps[slot.table_index()]
	}

	pub fn set_timestamp(&mut self, slot: SlotCoord, seconds: u32) {
		self.timestamps[slot.table_index()] = seconds;
	}
}

impl Default for RegionHeader {
	fn default() -> Self {
		Self::empty()
	}
}

impl Readable for RegionHeader {
	fn read_from<R: Read>(reader: &mut R) -> TrimResult<Self> {
		let mut header = Self::empty();
		for entry in header.locations.iter_mut() {
			*entry = reader.read_value()?;
		}
		for entry in header.timestamps.iter_mut() {
			*entry = reader.read_value()?;
		}
		Ok(header)
	}
}

impl Writable for RegionHeader {
	fn write_to<W: Write>(&self, writer: &mut W) -> TrimResult<usize> {
		for &entry in self.locations.iter() {
			writer.write_value(entry)?;
		}
		for &entry in self.timestamps.iter() {
			writer.write_value(entry)?;
		}
		Ok(HEADER_BYTES as usize)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn header_roundtrip() {
		let mut header = RegionHeader::empty();
		let slot = SlotCoord::new(5, 7);
		header.set_location(slot, SlotLocation::new(2, 1));
		header.set_timestamp(slot, 12345);

		let mut bytes = Vec::new();
		assert_eq!(header.write_to(&mut bytes).unwrap(), HEADER_BYTES as usize);
		assert_eq!(bytes.len(), HEADER_BYTES as usize);

		let reread = RegionHeader::read_from(&mut bytes.as_slice()).unwrap();
		assert_eq!(reread.location(slot), SlotLocation::new(2, 1));
		assert_eq!(reread.timestamp(slot), 12345);
		assert!(reread.location(SlotCoord::new(0, 0)).is_empty());
	}
}
