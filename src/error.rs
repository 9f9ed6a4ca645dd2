

use thiserror::Error;

pub type TrimResult<T> = Result<T, TrimError>;

/// The master error type.
#[derive(Debug, Error)]
pub enum TrimError {
	#[error("IO Error: {0}")]
	IoError(#[from] std::io::Error),
	#[error("Chunk not found.")]
	ChunkNotFound,
	#[error("Unknown compression value: {0}")]
	UnknownCompression(u8),
	#[error("Stream position is not on a 4KiB boundary.")]
	StreamSectorBoundaryError,
	#[error("Unsupported Tag ID: {0}")]
	UnsupportedTagId(u8),
	#[error("Encountered the End Tag ID marker.")]
	EndTagMarker,
	#[error("Failed to convert to UTF-8 string.")]
	FromUtf8Error(#[from] std::string::FromUtf8Error),
	#[error("Malformed chunk NBT: {0}")]
	MalformedNbt(&'static str),
	#[error("Attempted to save two chunks to the same location.")]
	DuplicateChunk,
	#[error("Zip error: {0}")]
	ZipError(#[from] zip::result::ZipError),
	#[error("{0}: not found")]
	NotFound(String),
	#[error("Operation not permitted: {0}")]
	NotPermitted(&'static str),
	#[error("Out of range error.")]
	OutOfRange,
	#[error("{0}")]
	Custom(String),
}

impl TrimError {

	pub fn custom<T, S: AsRef<str>>(msg: S) -> Result<T, Self> {
		Err(TrimError::Custom(msg.as_ref().to_owned()))
	}

	/// Prefixes positional context (a region path, a slot coordinate)
	/// onto an error as it crosses a pipeline boundary.
	pub fn context<S: AsRef<str>>(self, msg: S) -> Self {
		TrimError::Custom(format!("{}: {}", msg.as_ref(), self))
	}
}
