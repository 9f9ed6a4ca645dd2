use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use worldtrim::{
	options::TrimOptions,
	vfs::{DirFs, DirSource, Source, ZipSource},
	world::optimizer::{find_world_dirs, find_zip_files, WorldOptimizer},
};

/// Shrinks 1.8.8-family world saves: drops empty chunks and sections,
/// optionally recomputes height maps, and deletes runtime-only files.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
	/// World directory, directory of worlds, or .zip archive
	path: PathBuf,

	/// Overwrite the original world in place
	#[arg(short = 'o', long)]
	overwrite: bool,

	/// Suffix for optimized copies when not overwriting
	#[arg(short = 's', long, default_value = "_opt")]
	suffix: String,

	/// Analyze only; write nothing to disk
	#[arg(long)]
	dry_run: bool,

	/// Per-region progress output
	#[arg(short = 'v', long)]
	verbose: bool,

	/// Search the whole tree for worlds and archives
	#[arg(short = 'r', long)]
	recursive: bool,

	/// Recompute per-column height maps
	#[arg(short = 'm', long)]
	height_maps: bool,

	/// Compute per-chunk low maps into lowmap.bin
	#[arg(short = 'l', long)]
	low_maps: bool,

	/// Only accept worlds that also carry uid.dat
	#[arg(long)]
	require_uid: bool,
}

fn main() -> Result<()> {
	let args = Args::parse();
	env_logger::builder()
		.filter_level(if args.verbose {
			LevelFilter::Debug
		} else {
			LevelFilter::Info
		})
		.format_timestamp(None)
		.parse_default_env()
		.init();

	let options = TrimOptions {
		overwrite: args.overwrite,
		suffix: args.suffix,
		dry_run: args.dry_run,
		verbose: args.verbose,
		recursive: args.recursive,
		height_maps: args.height_maps,
		low_maps: args.low_maps,
		require_uid_dat: args.require_uid,
	};

	let path_text = args.path.display().to_string();
	let mut found_any = false;

	if path_text.ends_with(".zip") {
		let mut source = ZipSource::open(&args.path)
			.with_context(|| format!("open zip file {path_text}"))?;
		found_any |= process(&mut source, true, &options)?;
	} else if options.recursive {
		let mut fs = DirFs::new(&args.path);
		for dir in find_world_dirs(&mut fs, &options.suffix)? {
			let mut source = DirSource::new(rel_join(&args.path, &dir));
			found_any |= process(&mut source, false, &options)?;
		}
		for file in find_zip_files(&mut fs, &options.suffix)? {
			let zip_path = rel_join(&args.path, &file);
			let mut source = ZipSource::open(&zip_path)
				.with_context(|| format!("open zip file {}", zip_path.display()))?;
			found_any |= process(&mut source, true, &options)?;
		}
	} else {
		let mut source = DirSource::new(&args.path);
		found_any |= process(&mut source, false, &options)?;
	}

	if !found_any {
		info!("No worlds found in {path_text}");
	}
	Ok(())
}

/// Runs one source through the optimizer, then saves (unless dry-run)
/// and closes it. Returns whether the source contained any world.
fn process(source: &mut dyn Source, recursive: bool, options: &TrimOptions) -> Result<bool> {
	let name = source.name().to_owned();
	let mut optimizer = WorldOptimizer::new(source, options);
	optimizer
		.process(recursive)
		.with_context(|| format!("optimize {name}"))?;
	let found = optimizer.any_world_found;
	if !options.dry_run {
		source.save(options).with_context(|| format!("save {name}"))?;
	}
	source.close().with_context(|| format!("close {name}"))?;
	Ok(found)
}

/// Appends a cleaned forward-slash relative path onto a base [PathBuf].
fn rel_join(base: &Path, relative: &str) -> PathBuf {
	let mut path = base.to_owned();
	for segment in relative.split('/').filter(|s| !s.is_empty()) {
		path.push(segment);
	}
	path
}
