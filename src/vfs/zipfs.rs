use std::{
	collections::{BTreeMap, BTreeSet},
	fs::File,
	io::{BufReader, Read},
	path::Path,
};

use zip::ZipArchive;

use crate::{TrimResult, TrimError};

use super::{
	FsEntry, FsKind, SourceFs,
	base_name, clean_path, parent_path,
};

/// Read-only view over a zip archive. The central directory is indexed
/// once at open; file bodies are inflated on demand.
pub struct ZipFs {
	archive: ZipArchive<BufReader<File>>,
	/// Cleaned entry path -> archive index + size, files only.
	files: BTreeMap<String, (usize, u64)>,
	/// Cleaned directory paths, both explicit entries and implied parents.
	dirs: BTreeSet<String>,
}

impl ZipFs {
	pub fn open(path: impl AsRef<Path>) -> TrimResult<Self> {
		let file = File::open(path.as_ref())?;
		let mut archive = ZipArchive::new(BufReader::new(file))?;
		let mut files = BTreeMap::new();
		let mut dirs = BTreeSet::new();
		for index in 0..archive.len() {
			let entry = archive.by_index_raw(index)?;
			let name = clean_path(entry.name());
			if name.is_empty() {
				continue;
			}
			if entry.is_dir() {
				dirs.insert(name.clone());
			} else {
				files.insert(name.clone(), (index, entry.size()));
			}
			// Archives are not required to carry explicit directory
			// entries, so every ancestor is recorded as implied.
			let mut dir = parent_path(&name).to_owned();
			while !dir.is_empty() {
				dirs.insert(dir.clone());
				dir = parent_path(&dir).to_owned();
			}
		}
		Ok(Self { archive, files, dirs })
	}

	fn contains_dir(&self, path: &str) -> bool {
		path.is_empty() || self.dirs.contains(path)
	}
}

impl SourceFs for ZipFs {
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
		for (file, &(_, size)) in self.files.iter() {
			if parent_path(file) == path {
				entries.push(FsEntry {
					name: base_name(file).to_owned(),
					kind: FsKind::File,
					size,
				});
			}
		}
		entries.sort_by(|a, b| a.name.cmp(&b.name));
		Ok(entries)
	}

	fn stat(&mut self, path: &str) -> TrimResult<FsEntry> {
		if let Some(&(_, size)) = self.files.get(path) {
			Ok(FsEntry {
				name: base_name(path).to_owned(),
				kind: FsKind::File,
				size,
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
		let &(index, size) = self.files
			.get(path)
			.ok_or_else(|| TrimError::NotFound(path.to_owned()))?;
		let mut entry = self.archive.by_index(index)?;
		let mut data = Vec::with_capacity(size as usize);
		entry.read_to_end(&mut data)?;
		Ok(data)
	}
}
