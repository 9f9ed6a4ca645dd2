use std::collections::HashSet;

use crate::{TrimResult, TrimError};

use super::{
	FsEntry, FsKind, MemFs, SourceFs,
	clean_path, join_path, path_has_prefix,
};

/// Copy-on-write view over a read-only backend.
///
/// Reads resolve from the staged changes first and fall back to the
/// source; writes always land in the staged changes. The source can never
/// be mutated, so deletions are bookkeeping: a set of deleted file paths
/// plus a list of deleted subtree prefixes, both consulted before any
/// path resolves.
pub struct OverlayFs {
	source: Box<dyn SourceFs>,
	changes: MemFs,
	deleted_files: HashSet<String>,
	deleted_prefixes: Vec<String>,
}

impl OverlayFs {
	pub fn new(source: Box<dyn SourceFs>) -> Self {
		Self {
			source,
			changes: MemFs::new(),
			deleted_files: HashSet::new(),
			deleted_prefixes: Vec::new(),
		}
	}

	/// True once anything has been staged or deleted.
	pub fn is_changed(&self) -> bool {
		!self.changes.is_empty()
			|| !self.deleted_files.is_empty()
			|| !self.deleted_prefixes.is_empty()
	}

	/// Whether `path` is shadowed by a recorded deletion.
	pub fn is_removed(&self, path: &str) -> bool {
		let path = clean_path(path);
		if self.deleted_files.contains(&path) {
			return true;
		}
		self.deleted_prefixes
			.iter()
			.any(|prefix| path_has_prefix(&path, prefix))
	}

	/// Lists a directory: the union of staged and source entries,
	/// deduplicated by name, minus anything shadowed by a deletion.
	pub fn read_dir(&mut self, path: &str) -> TrimResult<Vec<FsEntry>> {
		let path = clean_path(path);
		if self.is_removed(&path) {
			return Err(TrimError::NotFound(path));
		}
		let staged = self.changes.read_dir(&path);
		let underlying = self.source.read_dir(&path);
		let mut entries = match (staged, underlying) {
			(Err(_), Err(err)) => return Err(err),
			(Ok(staged), Err(_)) => staged,
			(Err(_), Ok(underlying)) => underlying,
			(Ok(staged), Ok(underlying)) => {
				let mut merged = staged;
				for entry in underlying {
					if !merged.iter().any(|e| e.name == entry.name) {
						merged.push(entry);
					}
				}
				merged
			}
		};
		entries.retain(|entry| !self.is_removed(&join_path(&path, &entry.name)));
		entries.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(entries)
	}

	pub fn stat(&mut self, path: &str) -> TrimResult<FsEntry> {
		let path = clean_path(path);
		if self.is_removed(&path) {
			return Err(TrimError::NotFound(path));
		}
		match self.changes.stat(&path) {
			Ok(entry) => Ok(entry),
			Err(_) => self.source.stat(&path),
		}
	}

	pub fn read(&mut self, path: &str) -> TrimResult<Vec<u8>> {
		let path = clean_path(path);
		if self.is_removed(&path) {
			return Err(TrimError::NotFound(path));
		}
		match self.changes.read(&path) {
			Ok(data) => Ok(data),
			Err(_) => self.source.read(&path),
		}
	}

	pub fn exists(&mut self, path: &str) -> bool {
		self.stat(path).is_ok()
	}

	pub fn is_dir(&mut self, path: &str) -> bool {
		matches!(self.stat(path), Ok(entry) if entry.is_dir())
	}

	/// Stages a file, clearing any earlier single-file deletion of the
	/// same path. Writing under a deleted prefix is not supported.
	pub fn create(&mut self, path: &str, data: Vec<u8>) {
		let path = clean_path(path);
		self.deleted_files.remove(&path);
		self.changes.create(&path, data);
	}

	/// Removes a single file from the merged view.
	pub fn remove(&mut self, path: &str) -> TrimResult<()> {
		let path = clean_path(path);
		let staged = self.changes.remove(&path);
		if self.source.exists(&path) {
			if self.is_removed(&path) {
				return Err(TrimError::NotFound(path));
			}
			self.deleted_files.insert(path);
			return Ok(());
		}
		if staged {
			Ok(())
		} else {
			Err(TrimError::NotFound(path))
		}
	}

	/// Removes a whole subtree. Idempotent; removing something that never
	/// existed is not an error.
	pub fn remove_all(&mut self, path: &str) -> TrimResult<()> {
		let path = clean_path(path);
		if self.source.exists(&path) && !self.deleted_prefixes.contains(&path) {
			self.deleted_prefixes.push(path.clone());
		}
		self.changes.remove_all(&path);
		Ok(())
	}

	pub fn rename(&mut self, _from: &str, _to: &str) -> TrimResult<()> {
		Err(TrimError::NotPermitted("rename"))
	}

	pub fn chmod(&mut self, _path: &str, _mode: u32) -> TrimResult<()> {
		Err(TrimError::NotPermitted("chmod"))
	}

	pub fn chown(&mut self, _path: &str, _uid: u32, _gid: u32) -> TrimResult<()> {
		Err(TrimError::NotPermitted("chown"))
	}

	pub fn chtimes(&mut self, _path: &str) -> TrimResult<()> {
		Err(TrimError::NotPermitted("chtimes"))
	}

	/// Depth-first enumeration of every live path in the merged view,
	/// directories before their contents. The root itself is omitted.
	pub fn walk(&mut self) -> TrimResult<Vec<(String, FsKind)>> {
		let mut collected = Vec::new();
		self.walk_dir("", &mut collected)?;
		Ok(collected)
	}

	fn walk_dir(&mut self, dir: &str, collected: &mut Vec<(String, FsKind)>) -> TrimResult<()> {
		for entry in self.read_dir(dir)? {
			let path = join_path(dir, &entry.name);
			collected.push((path.clone(), entry.kind));
			if entry.is_dir() {
				self.walk_dir(&path, collected)?;
			}
		}
		Ok(())
	}
}

/// The merged view is itself a readable backend, so discovery code can
/// walk a raw directory and an overlay with the same logic.
impl SourceFs for OverlayFs {
	fn read_dir(&mut self, path: &str) -> TrimResult<Vec<FsEntry>> {
		OverlayFs::read_dir(self, path)
	}

	fn stat(&mut self, path: &str) -> TrimResult<FsEntry> {
		OverlayFs::stat(self, path)
	}

	fn read(&mut self, path: &str) -> TrimResult<Vec<u8>> {
		OverlayFs::read(self, path)
	}
}
