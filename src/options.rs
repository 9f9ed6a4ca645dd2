/// Run configuration, threaded explicitly through the optimizer and the
/// source adapters. There is deliberately no process-global state; a test
/// can run two differently-configured passes side by side.
#[derive(Debug, Clone)]
pub struct TrimOptions {
	/// Replace the original world instead of writing a suffixed copy.
	pub overwrite: bool,
	/// Suffix for the output tree/archive when not overwriting.
	pub suffix: String,
	/// Analyze without writing anything to disk.
	pub dry_run: bool,
	/// Per-region progress lines.
	pub verbose: bool,
	/// Search the whole tree for worlds instead of only the given path.
	pub recursive: bool,
	/// Recompute per-column height maps.
	pub height_maps: bool,
	/// Emit the per-world `lowmap.bin` digest file.
	pub low_maps: bool,
	/// Candidate predicate: additionally require `uid.dat` next to
	/// `level.dat`. Off by default (the permissive rule).
	pub require_uid_dat: bool,
}

impl Default for TrimOptions {
	fn default() -> Self {
		Self {
			overwrite: false,
			suffix: "_opt".to_owned(),
			dry_run: false,
			verbose: false,
			recursive: false,
			height_maps: false,
			low_maps: false,
			require_uid_dat: false,
		}
	}
}
