pub mod chunk;
pub mod io;
pub mod lowmap;
pub mod optimizer;

pub use chunk::{Chunk, ChunkCodec, Section};
pub use lowmap::ChunkPos;
pub use optimizer::WorldOptimizer;
