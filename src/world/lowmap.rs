//! The per-world `lowmap.bin` digest file.
//!
//! Layout, all integers big-endian: a 32-bit entry count; for each entry
//! a 32-bit x and a 32-bit z; then, in the same order, each entry's
//! digest bytes. Entries are sorted by z first, x second, and every
//! digest must have the same length.

use std::collections::HashMap;

use crate::{
	TrimResult, TrimError,
	ioext::WriteExt,
	world::chunk::Chunk,
};

/// Absolute chunk coordinates, the key of the per-world low-map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkPos {
	pub x: i32,
	pub z: i32,
}

impl ChunkPos {
	pub fn new(x: i32, z: i32) -> Self {
		Self { x, z }
	}
}

/// The per-chunk digest hook. The file layout does not care what the
/// bytes mean, only that every chunk produces the same number of them.
pub type LowMapFn = fn(&Chunk) -> Vec<u8>;

/// Serializes a gathered low-map. Fails if digest lengths differ.
pub fn encode_low_map(lowmap: &HashMap<ChunkPos, Vec<u8>>) -> TrimResult<Vec<u8>> {
	let mut sorted: Vec<&ChunkPos> = lowmap.keys().collect();
	sorted.sort_by_key(|pos| (pos.z, pos.x));

	let digest_len = sorted.first().map_or(0, |pos| lowmap[*pos].len());
	let mut buffer = Vec::with_capacity(4 + sorted.len() * (8 + digest_len));
	buffer.write_value(sorted.len() as u32)?;
	for pos in sorted.iter() {
		buffer.write_value(pos.x as u32)?;
		buffer.write_value(pos.z as u32)?;
	}
	for pos in sorted.iter() {
		let digest = &lowmap[*pos];
		if digest.len() != digest_len {
			return Err(TrimError::Custom(format!(
				"low-map digest for chunk ({}, {}) is {} bytes, expected {}",
				pos.x, pos.z, digest.len(), digest_len
			)));
		}
		buffer.extend_from_slice(digest);
	}
	Ok(buffer)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entries_sorted_by_z_then_x() {
		let mut lowmap = HashMap::new();
		lowmap.insert(ChunkPos::new(1, 0), vec![0xAA]);
		lowmap.insert(ChunkPos::new(0, 1), vec![0xBB]);
		lowmap.insert(ChunkPos::new(0, 0), vec![0xCC]);

		let encoded = encode_low_map(&lowmap).unwrap();
		#[rustfmt::skip]
		assert_eq!(encoded, vec![
			0, 0, 0, 3,
			0, 0, 0, 0,  0, 0, 0, 0, // (0, 0)
			0, 0, 0, 1,  0, 0, 0, 0, // (1, 0)
			0, 0, 0, 0,  0, 0, 0, 1, // (0, 1)
			0xCC, 0xAA, 0xBB,
		]);
	}

	#[test]
	fn negative_coordinates_wrap_as_u32() {
		let mut lowmap = HashMap::new();
		lowmap.insert(ChunkPos::new(-1, -2), vec![0x11, 0x22]);
		let encoded = encode_low_map(&lowmap).unwrap();
		assert_eq!(&encoded[..4], &[0, 0, 0, 1]);
		assert_eq!(&encoded[4..8], &[0xFF, 0xFF, 0xFF, 0xFF]);
		assert_eq!(&encoded[8..12], &[0xFF, 0xFF, 0xFF, 0xFE]);
		assert_eq!(&encoded[12..], &[0x11, 0x22]);
	}

	#[test]
	fn mismatched_digest_lengths_are_rejected() {
		let mut lowmap = HashMap::new();
		lowmap.insert(ChunkPos::new(0, 0), vec![1, 2]);
		lowmap.insert(ChunkPos::new(1, 0), vec![3]);
		assert!(encode_low_map(&lowmap).is_err());
	}

	#[test]
	fn empty_low_map_is_just_a_count() {
		let encoded = encode_low_map(&HashMap::new()).unwrap();
		assert_eq!(encoded, vec![0, 0, 0, 0]);
	}
}
