//! A minimal binding to the named binary tag format: tag ids, big-endian
//! primitive io, and structural payload walkers. Chunks are streamed
//! straight through this module rather than decoded into a tag tree, which
//! is what lets opaque subtrees round-trip byte for byte.

pub mod tagid;
pub mod io;

pub use tagid::TagID;
