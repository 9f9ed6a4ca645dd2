use std::io::{
	Read,
	Seek, SeekFrom,
};

use crate::{
	TrimResult, TrimError,
	ioext::{Readable, ReadExt},
};

use super::{
	header::RegionHeader,
	slot::SlotCoord,
};

/// An abstraction for reading region files slot by slot.
///
/// The whole 8KiB header is parsed up front, so slot existence checks are
/// table lookups and never touch the stream. Payloads come back raw (the
/// compression byte plus the compressed chunk stream, exactly the length
/// the slot records); deciding what to do with those bytes is the chunk
/// codec's business, and forwarding them untouched into a fresh region
/// file must not disturb a single byte.
pub struct RegionReader<R: Read + Seek> {
	reader: R,
	header: RegionHeader,
}

impl<R: Read + Seek> RegionReader<R> {
	/// Reads the header tables and prepares the reader for slot access.
	pub fn load(mut reader: R) -> TrimResult<Self> {
		reader.seek(SeekFrom::Start(0))?;
		let header = RegionHeader::read_from(&mut reader)?;
		Ok(Self { reader, header })
	}

	pub fn header(&self) -> &RegionHeader {
		&self.header
	}

	/// Whether the slot holds a chunk.
	pub fn exist_sector(&self, slot: SlotCoord) -> bool {
		!self.header.location(slot).is_empty()
	}

	/// The recorded modification time of the slot, in unix seconds.
	pub fn timestamp(&self, slot: SlotCoord) -> u32 {
		self.header.timestamp(slot)
	}

	/// Reads the raw payload of the slot: the compression byte followed
	/// by the compressed chunk stream.
	///
	/// Fails with [TrimError::ChunkNotFound] for a vacant slot, and
	/// surfaces inconsistent header math as an error rather than
	/// attempting recovery.
	pub fn read_sector(&mut self, slot: SlotCoord) -> TrimResult<Vec<u8>> {
		let location = self.header.location(slot);
		if location.is_empty() {
			return Err(TrimError::ChunkNotFound);
		}
		self.reader.seek(SeekFrom::Start(location.byte_offset()))?;
		let length = self.reader.read_value::<u32>()? as u64;
		if length == 0 {
			return TrimError::custom(format!(
				"slot {slot} is marked present but holds no data"
			));
		}
		if length + 4 > location.byte_len() {
			return TrimError::custom(format!(
				"slot {slot} length {length} overflows its {} allocated sectors",
				location.sector_count()
			));
		}
		let mut payload = vec![0u8; length as usize];
		self.reader.read_exact(&mut payload)?;
		Ok(payload)
	}

	/// Finish reading and return the contained reader.
	pub fn finish(self) -> R {
		self.reader
	}
}
