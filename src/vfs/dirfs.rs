use std::{
	fs,
	io,
	path::{Path, PathBuf},
};

use crate::{TrimResult, TrimError};

use super::{FsEntry, FsKind, SourceFs, base_name};

/// Read-only view over a directory tree on disk.
pub struct DirFs {
	root: PathBuf,
}

impl DirFs {
	pub fn new(root: impl AsRef<Path>) -> Self {
		Self {
			root: root.as_ref().to_owned(),
		}
	}

	fn resolve(&self, path: &str) -> PathBuf {
		let mut full = self.root.clone();
		for segment in path.split('/').filter(|s| !s.is_empty()) {
			full.push(segment);
		}
		full
	}
}

fn not_found(err: io::Error, path: &str) -> TrimError {
	if err.kind() == io::ErrorKind::NotFound {
		TrimError::NotFound(path.to_owned())
	} else {
		TrimError::IoError(err)
	}
}

impl SourceFs for DirFs {
	fn read_dir(&mut self, path: &str) -> TrimResult<Vec<FsEntry>> {
		let mut entries = Vec::new();
		for entry in fs::read_dir(self.resolve(path)).map_err(|e| not_found(e, path))? {
			let entry = entry?;
			let metadata = entry.metadata()?;
			// Anything that is neither a file nor a directory (sockets,
			// symlinks out of the tree) is invisible to the optimizer.
			let kind = if metadata.is_dir() {
				FsKind::Dir
			} else if metadata.is_file() {
				FsKind::File
			} else {
				continue;
			};
			entries.push(FsEntry {
				name: entry.file_name().to_string_lossy().into_owned(),
				kind,
				size: metadata.len(),
			});
		}
		entries.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(entries)
	}

	fn stat(&mut self, path: &str) -> TrimResult<FsEntry> {
		let metadata = fs::metadata(self.resolve(path)).map_err(|e| not_found(e, path))?;
		Ok(FsEntry {
			name: base_name(path).to_owned(),
			kind: if metadata.is_dir() { FsKind::Dir } else { FsKind::File },
			size: metadata.len(),
		})
	}

	fn read(&mut self, path: &str) -> TrimResult<Vec<u8>> {
		fs::read(self.resolve(path)).map_err(|e| not_found(e, path))
	}
}
