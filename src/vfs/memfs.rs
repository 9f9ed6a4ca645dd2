use std::collections::{BTreeMap, BTreeSet};

use crate::{TrimResult, TrimError};

use super::{
	FsEntry, FsKind, SourceFs,
	base_name, parent_path, path_has_prefix,
};

/// The writable in-memory tree that backs an overlay's staged changes.
/// Directories exist only to host files; creating `a/b/c.mca` implies
/// `a` and `a/b`.
#[derive(Debug, Default)]
pub struct MemFs {
	files: BTreeMap<String, Vec<u8>>,
	dirs: BTreeSet<String>,
}

impl MemFs {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_empty(&self) -> bool {
		self.files.is_empty() && self.dirs.is_empty()
	}

	/// Creates or replaces a file, materializing its ancestor directories.
	pub fn create(&mut self, path: &str, data: Vec<u8>) {
		let mut dir = parent_path(path);
		while !dir.is_empty() {
			self.dirs.insert(dir.to_owned());
			dir = parent_path(dir);
		}
		self.files.insert(path.to_owned(), data);
	}

	/// Removes a single file. Returns whether anything was removed.
	pub fn remove(&mut self, path: &str) -> bool {
		self.files.remove(path).is_some()
	}

	/// Removes a subtree (or a single file).
	pub fn remove_all(&mut self, path: &str) {
		self.files.retain(|name, _| !path_has_prefix(name, path));
		self.dirs.retain(|name| !path_has_prefix(name, path));
	}

	pub fn contains_file(&self, path: &str) -> bool {
		self.files.contains_key(path)
	}

	fn contains_dir(&self, path: &str) -> bool {
		path.is_empty() || self.dirs.contains(path)
	}
}

impl SourceFs for MemFs {
	fn read_dir(&mut self, path: &str) -> TrimResult<Vec<FsEntry>> {
		if !self.contains_dir(path) {
			return Err(TrimError::NotFound(path.to_owned()));
		}
		let mut entries = Vec::new();
		for dir in self.dirs.iter() {
			if parent_path(dir) == path {
				entries.push(FsEntry {
					name: base_name(dir).to_owned(),
					kind: FsKind::Dir,
					size: 0,
				});
			}
		}
		for (file, data) in self.files.iter() {
			if parent_path(file) == path {
				entries.push(FsEntry {
					name: base_name(file).to_owned(),
					kind: FsKind::File,
					size: data.len() as u64,
				});
			}
		}
		entries.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(entries)
	}

	fn stat(&mut self, path: &str) -> TrimResult<FsEntry> {
		if let Some(data) = self.files.get(path) {
			Ok(FsEntry {
				name: base_name(path).to_owned(),
				kind: FsKind::File,
				size: data.len() as u64,
			})
		} else if self.contains_dir(path) {
			Ok(FsEntry {
				name: base_name(path).to_owned(),
				kind: FsKind::Dir,
				size: 0,
			})
		} else {
			Err(TrimError::NotFound(path.to_owned()))
		}
	}

	fn read(&mut self, path: &str) -> TrimResult<Vec<u8>> {
		self.files
			.get(path)
			.cloned()
			.ok_or_else(|| TrimError::NotFound(path.to_owned()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn create_implies_directories() {
		let mut fs = MemFs::new();
		fs.create("world/region/r.0.0.mca", vec![1, 2, 3]);
		let root = fs.read_dir("").unwrap();
		assert_eq!(root.len(), 1);
		assert_eq!(root[0].name, "world");
		assert!(root[0].is_dir());
		assert_eq!(fs.read("world/region/r.0.0.mca").unwrap(), vec![1, 2, 3]);
	}

	#[test]
	fn remove_all_clears_subtree() {
		let mut fs = MemFs::new();
		fs.create("world/region/r.0.0.mca", vec![]);
		fs.create("world/level.dat", vec![]);
		fs.remove_all("world/region");
		assert!(!fs.contains_file("world/region/r.0.0.mca"));
		assert!(fs.contains_file("world/level.dat"));
		assert!(fs.stat("world/region").is_err());
	}
}
