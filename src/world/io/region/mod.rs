//! Region files pack up to 1024 chunks into one file of 4096-byte
//! sectors. The first two sectors are the header: 1024 big-endian u32
//! location entries (starting sector index in the high 24 bits, sector
//! count in the low 8, zero for a vacant slot), then 1024 u32 unix
//! timestamps. Each occupied slot starts on a sector boundary with a
//! u32 payload length, a compression byte, and the compressed chunk
//! NBT; the rest of its last sector is padding, and the file length is
//! always a whole number of sectors.

pub mod slot;
pub use slot::{SlotCoord, SlotLocation};
pub mod header;
pub use header::RegionHeader;
pub mod reader;
pub use reader::RegionReader;
pub mod writer;
pub use writer::RegionWriter;

use chrono::Utc;

/// The current wall clock as the u32 unix seconds a slot timestamp holds.
pub fn unix_now() -> u32 {
	Utc::now().timestamp() as u32
}
