use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};

use log::info;
use zip::{
	write::SimpleFileOptions,
	CompressionMethod, ZipWriter,
};

use crate::{
	TrimResult, TrimError,
	options::TrimOptions,
};

use super::{
	DirFs, FsKind, OverlayFs, ZipFs,
};

/// A mutable world container: a directory tree or a zip archive.
///
/// The capability set is deliberately small. `fs` hands out the overlay
/// that all mutation goes through; `save` materializes the overlay as a
/// new tree or archive (and, when overwriting, swaps it over the
/// original); `close` releases any underlying handle. `save` on an
/// unchanged overlay is a no-op, and a dry run simply never calls `save`.
pub trait Source {
	fn name(&self) -> &str;
	fn fs(&mut self) -> &mut OverlayFs;
	fn save(&mut self, options: &TrimOptions) -> TrimResult<()>;
	fn close(&mut self) -> TrimResult<()>;
}

/// A world stored as a plain directory tree.
pub struct DirSource {
	root: PathBuf,
	name: String,
	overlay: OverlayFs,
}

impl DirSource {
	pub fn new(root: impl AsRef<Path>) -> Self {
		let root = root.as_ref().to_owned();
		let name = root.display().to_string();
		let overlay = OverlayFs::new(Box::new(DirFs::new(&root)));
		Self { root, name, overlay }
	}

	/// Writes every live overlay entry under `dest`, which must already
	/// exist as a directory.
	fn materialize(&mut self, dest: &Path) -> TrimResult<()> {
		for (path, kind) in self.overlay.walk()? {
			let target = dest.join(&path);
			match kind {
				FsKind::Dir => fs::create_dir(&target)?,
				FsKind::File => {
					let data = self.overlay.read(&path)?;
					fs::write(&target, data)?;
				}
			}
		}
		Ok(())
	}
}

impl Source for DirSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn fs(&mut self) -> &mut OverlayFs {
		&mut self.overlay
	}

	fn save(&mut self, options: &TrimOptions) -> TrimResult<()> {
		if !self.overlay.is_changed() {
			return Ok(());
		}
		if options.overwrite {
			// Stage next to the original so the final rename never
			// crosses a filesystem boundary.
			let parent = self.root.parent().unwrap_or(Path::new("."));
			let staging = tempfile::Builder::new()
				.prefix("worldtrim-")
				.tempdir_in(parent)?;
			self.materialize(staging.path())?;
			let mode = fs::metadata(&self.root)?.permissions();
			fs::remove_dir_all(&self.root)?;
			fs::rename(staging.into_path(), &self.root)?;
			fs::set_permissions(&self.root, mode)?;
			info!("Replaced dir {}", self.root.display());
		} else {
			let out = PathBuf::from(format!("{}{}", self.root.display(), options.suffix));
			if out.exists() {
				fs::remove_dir_all(&out)?;
			}
			fs::create_dir_all(&out)?;
			self.materialize(&out)?;
			info!("Created dir {}", out.display());
		}
		Ok(())
	}

	fn close(&mut self) -> TrimResult<()> {
		Ok(())
	}
}

/// A world stored inside a zip archive.
pub struct ZipSource {
	file: PathBuf,
	name: String,
	/// `None` once closed; the archive handle lives inside the overlay's
	/// source backend and must be dropped before the file is replaced.
	overlay: Option<OverlayFs>,
}

impl ZipSource {
	pub fn open(file: impl AsRef<Path>) -> TrimResult<Self> {
		let file = file.as_ref().to_owned();
		let name = file.display().to_string();
		let overlay = OverlayFs::new(Box::new(ZipFs::open(&file)?));
		Ok(Self {
			file,
			name,
			overlay: Some(overlay),
		})
	}

	/// Writes every live overlay entry into a zip stream. Directories go
	/// in uncompressed with a trailing slash; files are deflated.
	fn materialize<W: Write + std::io::Seek>(&mut self, writer: W) -> TrimResult<()> {
		let mut zip = ZipWriter::new(writer);
		let dir_options = SimpleFileOptions::default()
			.compression_method(CompressionMethod::Stored);
		let file_options = SimpleFileOptions::default()
			.compression_method(CompressionMethod::Deflated);
		let overlay = match self.overlay.as_mut() {
			Some(overlay) => overlay,
			None => return TrimError::custom("zip source is closed"),
		};
		for (path, kind) in overlay.walk()? {
			match kind {
				FsKind::Dir => zip.add_directory(format!("{path}/"), dir_options)?,
				FsKind::File => {
					let data = overlay.read(&path)?;
					zip.start_file(path, file_options)?;
					zip.write_all(&data)?;
				}
			}
		}
		zip.finish()?;
		Ok(())
	}
}

impl Source for ZipSource {
	fn name(&self) -> &str {
		&self.name
	}

	fn fs(&mut self) -> &mut OverlayFs {
		self.overlay.as_mut().expect("zip source is closed")
	}

	fn save(&mut self, options: &TrimOptions) -> TrimResult<()> {
		match self.overlay.as_ref() {
			Some(overlay) if overlay.is_changed() => {}
			Some(_) => return Ok(()),
			None => return TrimError::custom("zip source is closed"),
		}
		if options.overwrite {
			let parent = self.file.parent().unwrap_or(Path::new("."));
			let staging = tempfile::Builder::new()
				.prefix("worldtrim-")
				.suffix(".zip")
				.tempfile_in(parent)?;
			self.materialize(staging.as_file())?;
			let mode = fs::metadata(&self.file)?.permissions();
			// The source archive holds the original open; release it
			// before renaming over the file.
			self.close()?;
			staging
				.persist(&self.file)
				.map_err(|e| TrimError::IoError(e.error))?;
			fs::set_permissions(&self.file, mode)?;
			info!("Replaced file {}", self.file.display());
		} else {
			let out = PathBuf::from(format!(
				"{}{}.zip",
				self.file.with_extension("").display(),
				options.suffix
			));
			let out_file = File::create(&out)?;
			self.materialize(out_file)?;
			info!("Created file {}", out.display());
		}
		Ok(())
	}

	fn close(&mut self) -> TrimResult<()> {
		self.overlay = None;
		Ok(())
	}
}
