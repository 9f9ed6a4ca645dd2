//! The per-world pipeline: find worlds inside a source, walk each region
//! file slot by slot, drop what is empty, rewrite what changed, and sweep
//! up the runtime-only files the game leaves behind.

use std::collections::{HashMap, HashSet};
use std::io::Cursor;

use log::{debug, info};

use crate::{
	TrimResult,
	options::TrimOptions,
	vfs::{join_path, Source, SourceFs},
	world::{
		chunk::{Chunk, ChunkCodec},
		io::region::{unix_now, RegionReader, RegionWriter, SlotCoord},
		lowmap::{self, ChunkPos, LowMapFn},
	},
};

pub struct WorldOptimizer<'a> {
	source: &'a mut dyn Source,
	options: &'a TrimOptions,
	codec: ChunkCodec,
	low_map_fn: LowMapFn,
	/// Whether any directory inside the source passed the candidate test.
	pub any_world_found: bool,
}

impl<'a> WorldOptimizer<'a> {
	pub fn new(source: &'a mut dyn Source, options: &'a TrimOptions) -> Self {
		Self {
			source,
			options,
			codec: ChunkCodec::new(),
			low_map_fn: Chunk::compute_low_map,
			any_world_found: false,
		}
	}

	/// Swaps in a different per-chunk low-map digest.
	pub fn with_low_map_fn(mut self, low_map_fn: LowMapFn) -> Self {
		self.low_map_fn = low_map_fn;
		self
	}

	/// Optimizes every world in the source. When `recursive`, the whole
	/// tree is searched for candidates; otherwise only the source root
	/// is considered.
	pub fn process(&mut self, recursive: bool) -> TrimResult<()> {
		if recursive {
			let candidates = find_world_dirs(self.source.fs(), &self.options.suffix)?;
			for dir in candidates {
				self.check_world_candidate(&dir)?;
			}
			Ok(())
		} else {
			self.check_world_candidate("")
		}
	}

	/// A path is a world iff its listing has a regular `level.dat` and a
	/// `region` subdirectory (plus `uid.dat` when the stricter predicate
	/// is configured).
	fn check_world_candidate(&mut self, dir: &str) -> TrimResult<()> {
		if !self.source.fs().is_dir(dir) {
			return Ok(());
		}
		let mut level_found = false;
		let mut region_found = false;
		let mut uid_found = false;
		for entry in self.source.fs().read_dir(dir)? {
			match entry.name.as_str() {
				"level.dat" if !entry.is_dir() => level_found = true,
				"uid.dat" if !entry.is_dir() => uid_found = true,
				"region" if entry.is_dir() => region_found = true,
				_ => {}
			}
		}
		if level_found && region_found && (uid_found || !self.options.require_uid_dat) {
			self.optimize(dir)?;
		}
		Ok(())
	}

	fn optimize(&mut self, dir: &str) -> TrimResult<()> {
		self.any_world_found = true;
		info!("{}: optimize...", self.world_label(dir));
		self.process_chunks(dir)?;
		self.delete_useless_files(dir)?;
		Ok(())
	}

	fn process_chunks(&mut self, dir: &str) -> TrimResult<()> {
		let mut world_size: u64 = 0;
		let mut new_world_size: u64 = 0;
		let mut lowmaps: HashMap<ChunkPos, Vec<u8>> = HashMap::new();

		let region_dir = join_path(dir, "region");
		let region_files = self.source.fs().read_dir(&region_dir)?;
		for file in region_files {
			if file.is_dir() {
				continue;
			}
			world_size += file.size;
			let path = join_path(&region_dir, &file.name);

			// Leftover pre-anvil region: delete it when its converted
			// sibling exists, keep it (untouched) when it does not.
			if let Some(base) = path.strip_suffix(".mcr") {
				if self.source.fs().exists(&format!("{base}.mca")) {
					debug!("{path}: stale .mcr removed");
					self.source.fs().remove(&path)?;
				} else {
					new_world_size += file.size;
				}
				continue;
			}
			if !path.ends_with(".mca") {
				new_world_size += file.size;
				continue;
			}

			let data = self.source.fs().read(&path)
				.map_err(|e| e.context(format!("{path} region file read")))?;
			let mut region = RegionReader::load(Cursor::new(data))
				.map_err(|e| e.context(format!("{path} region load")))?;

			let mut removed: HashSet<SlotCoord> = HashSet::new();
			let mut updated: HashMap<SlotCoord, Chunk> = HashMap::new();
			let mut num_chunks = 0usize;
			for slot in SlotCoord::all() {
				if !region.exist_sector(slot) {
					continue;
				}

				let payload = region.read_sector(slot)
					.map_err(|e| e.context(format!("{path} read sector {slot}")))?;
				let mut chunk = self.codec.decode(payload)
					.map_err(|e| e.context(format!("{path} read chunk {slot}")))?;
				num_chunks += 1;

				let mut chunk_updated = false;
				if chunk.is_empty() {
					removed.insert(slot);
					continue;
				}
				if chunk.optimize_sections() {
					if chunk.is_empty() {
						removed.insert(slot);
						continue;
					}
					chunk_updated = true;
				}

				if self.options.height_maps && chunk.compute_height_map() {
					chunk_updated = true;
				}

				if self.options.low_maps {
					let digest = (self.low_map_fn)(&chunk);
					lowmaps.insert(ChunkPos::new(chunk.x_pos, chunk.z_pos), digest);
				}

				if chunk_updated {
					updated.insert(slot, chunk);
				}
			}

			// Rewrite when something changed in place, or when some (but
			// not all) chunks disappeared. A fully emptied region is not
			// rewritten, it is deleted.
			if !updated.is_empty() || (num_chunks > removed.len() && !removed.is_empty()) {
				let out = self.rewrite_region(&path, &mut region, &removed, &updated)?;
				debug!(
					"{path}: updated, {} to {}",
					fmt_bytes(file.size),
					fmt_bytes(out.len() as u64)
				);
				new_world_size += out.len() as u64;
				self.source.fs().create(&path, out);
				continue;
			}

			if num_chunks == removed.len() {
				debug!("{path}: removed ({})", fmt_bytes(file.size));
				self.source.fs().remove(&path)?;
				continue;
			}

			new_world_size += file.size;
		}

		if world_size != new_world_size {
			let percent =
				(-(100.0 - 100.0 * new_world_size as f64 / world_size as f64)).round();
			info!(
				"{}: regions optimized {} => {} ({}%)",
				self.world_label(dir),
				fmt_bytes(world_size),
				fmt_bytes(new_world_size),
				percent
			);
		}

		if self.options.low_maps {
			self.save_low_map(dir, &lowmaps)?;
		}

		Ok(())
	}

	/// Builds the replacement region file: updated chunks are re-encoded,
	/// everything else is forwarded byte for byte so untouched slots keep
	/// their exact payloads (and their timestamps).
	fn rewrite_region(
		&mut self,
		path: &str,
		region: &mut RegionReader<Cursor<Vec<u8>>>,
		removed: &HashSet<SlotCoord>,
		updated: &HashMap<SlotCoord, Chunk>,
	) -> TrimResult<Vec<u8>> {
		let mut writer = RegionWriter::create(Cursor::new(Vec::new()))
			.map_err(|e| e.context(format!("{path} create region")))?;
		for slot in SlotCoord::all() {
			if !region.exist_sector(slot) || removed.contains(&slot) {
				continue;
			}

			if let Some(chunk) = updated.get(&slot) {
				let payload = self.codec.encode(chunk)
					.map_err(|e| e.context(format!("{path} write chunk {slot}")))?;
				writer.write_sector(slot, &payload, unix_now())
					.map_err(|e| e.context(format!("{path} write sector {slot}")))?;
			} else {
				let payload = region.read_sector(slot)
					.map_err(|e| e.context(format!("{path} read sector {slot}")))?;
				writer.write_sector(slot, &payload, region.timestamp(slot))
					.map_err(|e| e.context(format!("{path} write sector {slot}")))?;
			}
		}
		writer.pad_to_full_sector()?;
		Ok(writer.finish()?.into_inner())
	}

	fn save_low_map(&mut self, dir: &str, lowmaps: &HashMap<ChunkPos, Vec<u8>>) -> TrimResult<()> {
		let encoded = lowmap::encode_low_map(lowmaps)?;
		let dest = join_path(dir, "lowmap.bin");
		if self.source.fs().exists(&dest) {
			// no need to overwrite
			if self.source.fs().read(&dest)? == encoded {
				return Ok(());
			}
		}
		self.source.fs().create(&dest, encoded);
		Ok(())
	}

	/// Removes the runtime-only files the game regenerates anyway. The
	/// low-map digest is only kept when this run is producing it.
	fn delete_useless_files(&mut self, dir: &str) -> TrimResult<()> {
		self.remove_dir_if_exists(&join_path(dir, "playerdata"))?;
		self.remove_dir_if_exists(&join_path(dir, "stats"))?;
		self.remove_file_if_exists(&join_path(dir, "level.dat_old"))?;
		self.remove_file_if_exists(&join_path(dir, "session.lock"))?;
		if !self.options.low_maps {
			self.remove_file_if_exists(&join_path(dir, "lowmap.bin"))?;
		}
		Ok(())
	}

	fn remove_dir_if_exists(&mut self, path: &str) -> TrimResult<()> {
		if self.source.fs().is_dir(path) {
			debug!("{path}: dir removed");
			self.source.fs().remove_all(path)?;
		}
		Ok(())
	}

	fn remove_file_if_exists(&mut self, path: &str) -> TrimResult<()> {
		if matches!(self.source.fs().stat(path), Ok(entry) if !entry.is_dir()) {
			debug!("{path}: removed");
			self.source.fs().remove(path)?;
		}
		Ok(())
	}

	fn world_label(&self, dir: &str) -> String {
		if dir.is_empty() {
			self.source.name().to_owned()
		} else {
			format!("{}/{dir}", self.source.name())
		}
	}
}

/// Walks a tree for directories that hold a `region` subdirectory (the
/// cheap precursor to the full candidate test). `.git` and anything
/// already carrying the output suffix are skipped.
pub fn find_world_dirs(fs: &mut dyn SourceFs, suffix: &str) -> TrimResult<Vec<String>> {
	let mut found = Vec::new();
	walk_for_worlds(fs, "", suffix, &mut found)?;
	Ok(found)
}

fn walk_for_worlds(
	fs: &mut dyn SourceFs,
	dir: &str,
	suffix: &str,
	found: &mut Vec<String>,
) -> TrimResult<()> {
	for entry in fs.read_dir(dir)? {
		if !entry.is_dir() || entry.name == ".git" {
			continue;
		}
		if !suffix.is_empty() && entry.name.ends_with(suffix) {
			info!("Skip {} as optimized", join_path(dir, &entry.name));
			continue;
		}
		if entry.name == "region" && !found.iter().any(|f| f == dir) {
			found.push(dir.to_owned());
		}
		walk_for_worlds(fs, &join_path(dir, &entry.name), suffix, found)?;
	}
	Ok(())
}

/// Walks a tree for zip archives, skipping `.git` and any archive whose
/// name already carries the output suffix.
pub fn find_zip_files(fs: &mut dyn SourceFs, suffix: &str) -> TrimResult<Vec<String>> {
	let mut found = Vec::new();
	walk_for_zips(fs, "", suffix, &mut found)?;
	Ok(found)
}

fn walk_for_zips(
	fs: &mut dyn SourceFs,
	dir: &str,
	suffix: &str,
	found: &mut Vec<String>,
) -> TrimResult<()> {
	for entry in fs.read_dir(dir)? {
		let path = join_path(dir, &entry.name);
		if entry.is_dir() {
			if entry.name == ".git" {
				continue;
			}
			walk_for_zips(fs, &path, suffix, found)?;
		} else if entry.name.ends_with(".zip") {
			if !suffix.is_empty() && entry.name.ends_with(&format!("{suffix}.zip")) {
				info!("Skip {path} as optimized");
				continue;
			}
			found.push(path);
		}
	}
	Ok(())
}

/// SI-style byte formatting for the size report.
fn fmt_bytes(size: u64) -> String {
	const UNITS: [&str; 5] = ["B", "kB", "MB", "GB", "TB"];
	let mut value = size as f64;
	let mut unit = 0;
	while value >= 1000.0 && unit < UNITS.len() - 1 {
		value /= 1000.0;
		unit += 1;
	}
	if unit == 0 {
		format!("{size} B")
	} else {
		format!("{:.1} {}", value, UNITS[unit])
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ioext::WriteExt;
	use crate::vfs::{MemFs, OverlayFs};
	use crate::world::chunk::{RawList, Section};
	use crate::nbt::TagID;
	use crate::nbt::io::NbtWrite;

	/// An in-memory world container, enough to drive the optimizer
	/// without touching disk (materialization is the adapters' concern
	/// and has its own tests).
	struct MemSource {
		name: String,
		overlay: OverlayFs,
	}

	impl MemSource {
		fn new(backing: MemFs) -> Self {
			Self {
				name: "mem".to_owned(),
				overlay: OverlayFs::new(Box::new(backing)),
			}
		}
	}

	impl Source for MemSource {
		fn name(&self) -> &str {
			&self.name
		}

		fn fs(&mut self) -> &mut OverlayFs {
			&mut self.overlay
		}

		fn save(&mut self, _options: &TrimOptions) -> TrimResult<()> {
			Ok(())
		}

		fn close(&mut self) -> TrimResult<()> {
			Ok(())
		}
	}

	fn filled_section(y: u8, block: u8) -> Section {
		Section {
			y,
			sky_light: vec![0xFF; 2048],
			block_light: vec![0; 2048],
			blocks: vec![block; 4096],
			data: vec![0; 2048],
			add: Vec::new(),
		}
	}

	fn test_chunk(x_pos: i32, z_pos: i32, sections: Vec<Section>) -> Chunk {
		let mut chunk = Chunk::default();
		chunk.sections = sections;
		chunk.terrain_populated = 1;
		chunk.x_pos = x_pos;
		chunk.z_pos = z_pos;
		chunk.biomes = vec![1; 256];
		chunk.height_map = vec![0; 256];
		chunk
	}

	fn one_entity() -> RawList {
		let mut raw = Vec::new();
		TagID::Compound.nbt_write(&mut raw).unwrap();
		1i32.nbt_write(&mut raw).unwrap();
		TagID::End.nbt_write(&mut raw).unwrap();
		RawList::from_bytes(raw)
	}

	fn region_bytes(chunks: &[((u8, u8), Chunk)]) -> Vec<u8> {
		let mut codec = ChunkCodec::new();
		let mut writer = RegionWriter::create(Cursor::new(Vec::new())).unwrap();
		for (coord, chunk) in chunks {
			let payload = codec.encode(chunk).unwrap();
			let slot = SlotCoord::new(coord.0, coord.1);
			writer.write_sector(slot, &payload, 1).unwrap();
		}
		writer.pad_to_full_sector().unwrap();
		writer.finish().unwrap().into_inner()
	}

	fn world_fs(region: Vec<u8>) -> MemFs {
		let mut fs = MemFs::new();
		fs.create("level.dat", vec![0xCA, 0xFE]);
		fs.create("region/r.0.0.mca", region);
		fs
	}

	fn run(source: &mut MemSource, options: &TrimOptions) {
		let mut optimizer = WorldOptimizer::new(source, options);
		optimizer.process(false).unwrap();
		assert!(optimizer.any_world_found);
	}

	#[test]
	fn fully_empty_region_is_deleted() {
		// E1: one chunk, all-zero sections, empty entity lists.
		let chunk = test_chunk(0, 0, vec![filled_section(0, 0)]);
		let mut source = MemSource::new(world_fs(region_bytes(&[((0, 0), chunk)])));
		run(&mut source, &TrimOptions::default());
		assert!(source.fs().is_removed("region/r.0.0.mca"));
		assert!(!source.fs().exists("region/r.0.0.mca"));
	}

	#[test]
	fn empty_section_is_dropped_on_rewrite() {
		// E2: the retained chunk keeps exactly its populated section.
		let chunk = test_chunk(5, 7, vec![filled_section(3, 7), filled_section(4, 0)]);
		let mut source = MemSource::new(world_fs(region_bytes(&[((5, 7), chunk)])));
		run(&mut source, &TrimOptions::default());

		let rewritten = source.fs().read("region/r.0.0.mca").unwrap();
		let mut region = RegionReader::load(Cursor::new(rewritten)).unwrap();
		let mut codec = ChunkCodec::new();
		let payload = region.read_sector(SlotCoord::new(5, 7)).unwrap();
		let decoded = codec.decode(payload).unwrap();
		assert_eq!(decoded.sections.len(), 1);
		assert_eq!(decoded.sections[0].y, 3);
		assert_eq!((decoded.x_pos, decoded.z_pos), (5, 7));
	}

	#[test]
	fn untouched_region_stays_untouched() {
		let chunk = test_chunk(0, 0, vec![filled_section(0, 7)]);
		let mut source = MemSource::new(world_fs(region_bytes(&[((0, 0), chunk)])));
		run(&mut source, &TrimOptions::default());
		// Nothing was empty and nothing mutated, so the overlay is clean.
		assert!(!source.fs().is_changed());
	}

	#[test]
	fn auxiliary_files_are_cleaned_up() {
		// E3 (the real-pass half; dry-run never calls save at all).
		let chunk = test_chunk(0, 0, vec![filled_section(0, 7)]);
		let mut fs = world_fs(region_bytes(&[((0, 0), chunk)]));
		fs.create("playerdata/x.dat", vec![1]);
		fs.create("stats/y.json", vec![2]);
		fs.create("level.dat_old", vec![3]);
		fs.create("session.lock", vec![4]);
		fs.create("lowmap.bin", vec![5]);
		let mut source = MemSource::new(fs);
		run(&mut source, &TrimOptions::default());

		assert!(!source.fs().exists("playerdata/x.dat"));
		assert!(!source.fs().exists("stats"));
		assert!(!source.fs().exists("level.dat_old"));
		assert!(!source.fs().exists("session.lock"));
		assert!(!source.fs().exists("lowmap.bin"));
		assert!(source.fs().exists("level.dat"));
		assert!(source.fs().exists("region/r.0.0.mca"));
	}

	#[test]
	fn mixed_region_keeps_untouched_payloads_byte_identical() {
		// E5 at reduced scale: 50 chunks, 10 mutated, 5 of those emptied.
		let mut chunks = Vec::new();
		for i in 0..40u8 {
			chunks.push(((i % 32, i / 32), test_chunk(i as i32, 0, vec![filled_section(0, 7)])));
		}
		for i in 40..45u8 {
			// Mutates (drops the zero section) but stays populated.
			chunks.push((
				(i % 32, i / 32),
				test_chunk(i as i32, 1, vec![filled_section(0, 7), filled_section(1, 0)]),
			));
		}
		for i in 45..50u8 {
			// Only zero sections: optimizes down to empty.
			chunks.push(((i % 32, i / 32), test_chunk(i as i32, 2, vec![filled_section(0, 0)])));
		}
		let original = region_bytes(&chunks);
		let mut source = MemSource::new(world_fs(original.clone()));
		run(&mut source, &TrimOptions::default());

		let rewritten = source.fs().read("region/r.0.0.mca").unwrap();
		let mut old_region = RegionReader::load(Cursor::new(original)).unwrap();
		let mut new_region = RegionReader::load(Cursor::new(rewritten)).unwrap();

		let present = SlotCoord::all().filter(|&s| new_region.exist_sector(s)).count();
		assert_eq!(present, 45);
		for i in 45..50u8 {
			assert!(!new_region.exist_sector(SlotCoord::new(i % 32, i / 32)));
		}
		for i in 0..40u8 {
			let slot = SlotCoord::new(i % 32, i / 32);
			assert_eq!(
				old_region.read_sector(slot).unwrap(),
				new_region.read_sector(slot).unwrap(),
			);
			assert_eq!(old_region.timestamp(slot), new_region.timestamp(slot));
		}
	}

	#[test]
	fn second_pass_changes_nothing() {
		// E6: re-running over the optimized output is a no-op.
		let chunks = vec![
			((0u8, 0u8), test_chunk(0, 0, vec![filled_section(0, 7), filled_section(1, 0)])),
			((1u8, 0u8), test_chunk(1, 0, Vec::new())),
		];
		let mut fs = world_fs(region_bytes(&chunks));
		fs.create("session.lock", vec![1]);
		let mut source = MemSource::new(fs);
		run(&mut source, &TrimOptions::default());
		assert!(source.fs().is_changed());

		// Materialize the first pass into a fresh backing tree.
		let mut optimized = MemFs::new();
		for (path, kind) in source.fs().walk().unwrap() {
			if kind == crate::vfs::FsKind::File {
				let data = source.fs().read(&path).unwrap();
				optimized.create(&path, data);
			}
		}

		let mut second = MemSource::new(optimized);
		run(&mut second, &TrimOptions::default());
		assert!(!second.fs().is_changed());
	}

	#[test]
	fn height_maps_recomputed_when_enabled() {
		let mut section = filled_section(0, 7);
		for idx in 0..4096 {
			section.blocks[idx] = if idx < 256 { 7 } else { 0 };
		}
		let mut chunk = test_chunk(0, 0, vec![section]);
		chunk.height_map = vec![99; 256];
		let mut source = MemSource::new(world_fs(region_bytes(&[((0, 0), chunk)])));
		let options = TrimOptions {
			height_maps: true,
			..TrimOptions::default()
		};
		run(&mut source, &options);

		let rewritten = source.fs().read("region/r.0.0.mca").unwrap();
		let mut region = RegionReader::load(Cursor::new(rewritten)).unwrap();
		let mut codec = ChunkCodec::new();
		let payload = region.read_sector(SlotCoord::new(0, 0)).unwrap();
		let decoded = codec.decode(payload).unwrap();
		assert!(decoded.height_map.iter().all(|&h| h == 1));
	}

	#[test]
	fn low_map_is_emitted_and_stable() {
		let chunk = test_chunk(3, -2, vec![filled_section(0, 7)]);
		let mut source = MemSource::new(world_fs(region_bytes(&[((0, 0), chunk.clone())])));
		let options = TrimOptions {
			low_maps: true,
			..TrimOptions::default()
		};
		run(&mut source, &options);

		let lowmap = source.fs().read("lowmap.bin").unwrap();
		let mut expected = Vec::new();
		expected.write_value(1u32).unwrap();
		expected.write_value(3u32).unwrap();
		expected.write_value(-2i32 as u32).unwrap();
		expected.extend_from_slice(&chunk.compute_low_map());
		assert_eq!(lowmap, expected);

		// A second run over a tree already carrying that exact file
		// stages nothing.
		let mut fs = world_fs(region_bytes(&[((0, 0), chunk)]));
		fs.create("lowmap.bin", lowmap);
		let mut second = MemSource::new(fs);
		run(&mut second, &options);
		assert!(!second.fs().is_changed());
	}

	#[test]
	fn stale_mcr_is_deleted_only_with_mca_sibling() {
		let chunk = test_chunk(0, 0, vec![filled_section(0, 7)]);
		let mut fs = world_fs(region_bytes(&[((0, 0), chunk)]));
		fs.create("region/r.0.0.mcr", vec![1, 2, 3]);
		fs.create("region/r.9.9.mcr", vec![4, 5, 6]);
		let mut source = MemSource::new(fs);
		run(&mut source, &TrimOptions::default());
		assert!(!source.fs().exists("region/r.0.0.mcr"));
		assert!(source.fs().exists("region/r.9.9.mcr"));
	}

	#[test]
	fn candidate_predicate_is_configurable() {
		let chunk = test_chunk(0, 0, Vec::new());
		let fs = world_fs(region_bytes(&[((0, 0), chunk)]));
		let mut source = MemSource::new(fs);
		let options = TrimOptions {
			require_uid_dat: true,
			..TrimOptions::default()
		};
		let mut optimizer = WorldOptimizer::new(&mut source, &options);
		optimizer.process(false).unwrap();
		// level.dat + region/ alone no longer qualifies.
		assert!(!optimizer.any_world_found);
	}

	#[test]
	fn recursive_discovery_finds_nested_worlds() {
		let chunk = test_chunk(0, 0, vec![filled_section(0, 0)]);
		let mut fs = MemFs::new();
		fs.create("saves/alpha/level.dat", vec![1]);
		fs.create("saves/alpha/region/r.0.0.mca", region_bytes(&[((0, 0), chunk)]));
		fs.create("saves/alpha_opt/level.dat", vec![1]);
		fs.create("saves/alpha_opt/region/r.0.0.mca", vec![2]);
		fs.create("saves/.git/config", vec![3]);
		fs.create("saves/notaworld/readme.txt", vec![4]);
		let mut source = MemSource::new(fs);
		let opts = TrimOptions::default();
		let mut optimizer = WorldOptimizer::new(&mut source, &opts);
		optimizer.process(true).unwrap();
		assert!(optimizer.any_world_found);
		// The nested world was optimized; the suffixed copy was skipped
		// (its garbage region file would have errored otherwise).
		assert!(source.fs().is_removed("saves/alpha/region/r.0.0.mca"));
		assert!(source.fs().exists("saves/alpha_opt/region/r.0.0.mca"));
	}

	#[test]
	fn entities_keep_chunks_alive() {
		let mut chunk = test_chunk(0, 0, vec![filled_section(0, 0)]);
		chunk.entities = one_entity();
		let mut source = MemSource::new(world_fs(region_bytes(&[((0, 0), chunk)])));
		run(&mut source, &TrimOptions::default());
		// Sections were dropped but the entity keeps the chunk, so the
		// region is rewritten rather than deleted.
		let rewritten = source.fs().read("region/r.0.0.mca").unwrap();
		let region = RegionReader::load(Cursor::new(rewritten)).unwrap();
		assert!(region.exist_sector(SlotCoord::new(0, 0)));
	}

	#[test]
	fn byte_formatting() {
		assert_eq!(fmt_bytes(512), "512 B");
		assert_eq!(fmt_bytes(1500), "1.5 kB");
		assert_eq!(fmt_bytes(2_000_000), "2.0 MB");
	}
}
