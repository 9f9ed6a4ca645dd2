use std::io::{
	Write,
	Seek, SeekFrom,
};

use crate::{
	TrimResult, TrimError,
	ioext::{Writable, WriteExt, SeekExt, WriteZeroes},
};

use super::super::{
	SECTOR_BYTES,
	sector_aligned,
	sector_padding,
	sectors_for,
};

use super::{
	header::{RegionHeader, HEADER_BYTES},
	slot::{SlotCoord, SlotLocation},
};

/// An abstraction for building a fresh region file slot by slot.
///
/// The header tables are kept in memory while payloads are appended to
/// the stream; `finish` flushes the tables into the first two sectors.
/// Every appended payload is padded so the next slot begins on a sector
/// boundary, which keeps the file a multiple of the sector size at all
/// times. A slot is therefore either fully present (header entry and
/// payload) or fully vacant (zero entry, no bytes).
pub struct RegionWriter<W: Write + Seek> {
	writer: W,
	header: RegionHeader,
}

impl<W: Write + Seek> RegionWriter<W> {
	/// Writes the 8KiB of zeroes where the header tables will land and
	/// positions the stream at the first data sector.
	pub fn create(mut writer: W) -> TrimResult<Self> {
		writer.seek(SeekFrom::Start(0))?;
		writer.write_zeroes(HEADER_BYTES)?;
		Ok(Self {
			writer,
			header: RegionHeader::empty(),
		})
	}

	/// Appends one slot payload: a 32-bit length, the payload bytes (the
	/// compression byte plus the compressed chunk stream), then pad
	/// zeroes up to the next sector boundary. The slot's header entries
	/// are recorded in memory. Returns the [SlotLocation] the payload
	/// landed in.
	pub fn write_sector(
		&mut self,
		slot: SlotCoord,
		payload: &[u8],
		timestamp: u32,
	) -> TrimResult<SlotLocation> {
		let position = self.writer.stream_position()?;
		if !sector_aligned(position) {
			return Err(TrimError::StreamSectorBoundaryError);
		}
		if !self.header.location(slot).is_empty() {
			return Err(TrimError::DuplicateChunk);
		}
		if payload.is_empty() {
			// The compression byte alone makes a payload at least one
			// byte long; a vacant slot is expressed by not writing it.
			return TrimError::custom(format!("slot {slot}: empty payload"));
		}
		let length = payload.len() as u32;
		self.writer.write_value(length)?;
		self.writer.write_all(payload)?;
		self.writer.write_zeroes(sector_padding(length as u64 + 4))?;
		let location = SlotLocation::new(
			(position / SECTOR_BYTES) as u32,
			// The 4 bytes holding the length count toward the slot.
			sectors_for(length + 4) as u8,
		);
		self.header.set_location(slot, location);
		self.header.set_timestamp(slot, timestamp);
		Ok(location)
	}

	/// Pads the stream with zeroes up to the next sector boundary.
	/// Appended slots are already padded, so this only writes when the
	/// stream was left mid-sector.
	pub fn pad_to_full_sector(&mut self) -> TrimResult<u64> {
		let position = self.writer.stream_position()?;
		let padding = sector_padding(position);
		self.writer.write_zeroes(padding)?;
		Ok(padding)
	}

	/// Flushes the header tables into the first two sectors and returns
	/// the inner writer, positioned at the end of the file.
	pub fn finish(mut self) -> TrimResult<W> {
		let end = self.writer.seek_return()?;
		self.writer.seek(SeekFrom::Start(0))?;
		self.header.write_to(&mut self.writer)?;
		self.writer.seek(end)?;
		self.writer.flush()?;
		Ok(self.writer)
	}
}

#[cfg(test)]
mod tests {
	use std::io::Cursor;

	use super::*;
	use super::super::reader::RegionReader;

	fn roundtrip(slots: &[((u8, u8), Vec<u8>)]) -> Vec<u8> {
		let mut writer = RegionWriter::create(Cursor::new(Vec::new())).unwrap();
		for (coord, payload) in slots {
			let slot = SlotCoord::new(coord.0, coord.1);
			writer.write_sector(slot, payload, 9).unwrap();
		}
		writer.pad_to_full_sector().unwrap();
		writer.finish().unwrap().into_inner()
	}

	#[test]
	fn written_slots_read_back() {
		let payload_a = vec![2u8, 10, 20, 30];
		let payload_b = vec![2u8; 5000];
		let file = roundtrip(&[((0, 0), payload_a.clone()), ((5, 7), payload_b.clone())]);
		assert!(sector_aligned(file.len() as u64));

		let mut reader = RegionReader::load(Cursor::new(file)).unwrap();
		assert!(reader.exist_sector(SlotCoord::new(0, 0)));
		assert!(reader.exist_sector(SlotCoord::new(5, 7)));
		assert!(!reader.exist_sector(SlotCoord::new(1, 0)));
		assert_eq!(reader.read_sector(SlotCoord::new(0, 0)).unwrap(), payload_a);
		assert_eq!(reader.read_sector(SlotCoord::new(5, 7)).unwrap(), payload_b);
		assert_eq!(reader.timestamp(SlotCoord::new(5, 7)), 9);
	}

	#[test]
	fn header_is_consistent_with_file() {
		let file = roundtrip(&[((0, 0), vec![2u8; 100]), ((1, 0), vec![2u8; 6000])]);
		let reader = RegionReader::load(Cursor::new(file.clone())).unwrap();
		for slot in SlotCoord::all() {
			let location = reader.header().location(slot);
			if location.is_empty() {
				continue;
			}
			assert!(location.byte_end() <= file.len() as u64);
			let at = location.byte_offset() as usize;
			let length = u32::from_be_bytes(file[at..at + 4].try_into().unwrap());
			assert_eq!(sectors_for(length + 4) as u8, location.sector_count());
		}
	}

	#[test]
	fn payload_sector_boundaries() {
		// 4092 payload bytes + the 4-byte length is exactly one sector;
		// one more byte spills into a second.
		let file = roundtrip(&[((0, 0), vec![2u8; 4092])]);
		let reader = RegionReader::load(Cursor::new(file)).unwrap();
		assert_eq!(reader.header().location(SlotCoord::new(0, 0)).sector_count(), 1);

		let file = roundtrip(&[((0, 0), vec![2u8; 4093])]);
		let reader = RegionReader::load(Cursor::new(file)).unwrap();
		assert_eq!(reader.header().location(SlotCoord::new(0, 0)).sector_count(), 2);
	}

	#[test]
	fn duplicate_slot_is_rejected() {
		let mut writer = RegionWriter::create(Cursor::new(Vec::new())).unwrap();
		let slot = SlotCoord::new(3, 3);
		writer.write_sector(slot, &[2, 1], 0).unwrap();
		let result = writer.write_sector(slot, &[2, 1], 0);
		assert!(matches!(result, Err(TrimError::DuplicateChunk)));
	}
}
