//! The 1.8.8-family chunk codec.
//!
//! A chunk payload is `<method: u8><compressed NBT stream>` where method 1
//! is gzip and method 2 is zlib. The NBT root is a nameless compound with
//! a single `Level` compound inside. Chunks are streamed straight off the
//! decompressor into [Chunk]; the `Entities` and `TileEntities` subtrees
//! are never interpreted, their payload bytes are carried through verbatim.

use std::io::{
	Cursor,
	Read, Write,
};

use flate2::{
	read::GzDecoder,
	read::ZlibDecoder,
	write::ZlibEncoder,
	Compression,
};

use crate::{
	TrimResult, TrimError,
	ioext::{Readable, Writable},
	nbt::TagID,
	nbt::io::{
		NbtRead, NbtWrite,
		capture_payload, skip_payload,
		read_string, write_string,
	},
};

/// The framing byte in front of a slot payload. Old worlds still carry
/// gzip chunks; everything this tool writes is zlib. The 1.8.8 family
/// never produced anything else, so other values are surfaced as errors
/// rather than patched around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Framing {
	GZip,
	ZLib,
}

impl Framing {
	fn from_byte(byte: u8) -> TrimResult<Framing> {
		match byte {
			1 => Ok(Framing::GZip),
			2 => Ok(Framing::ZLib),
			unknown => Err(TrimError::UnknownCompression(unknown)),
		}
	}

	const fn byte(self) -> u8 {
		match self {
			Framing::GZip => 1,
			Framing::ZLib => 2,
		}
	}
}

/// One 16x16x16 block of a chunk. `add` and `sky_light` are optional in
/// the stream; absence is represented by an empty vec.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Section {
	pub y: u8,
	pub sky_light: Vec<u8>,
	pub block_light: Vec<u8>,
	pub blocks: Vec<u8>,
	pub data: Vec<u8>,
	pub add: Vec<u8>,
}

/// The exact payload bytes of a TAG_List: element-type byte, 32-bit
/// count, elements. A canonical empty list is 5 bytes, and that length
/// test is how chunk emptiness is decided; any non-trivial contents,
/// even an empty named compound inside the list, make it longer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawList(Vec<u8>);

impl RawList {
	pub fn empty() -> Self {
		// TAG_End element type, zero count.
		Self(vec![0u8; 5])
	}

	pub fn from_bytes(bytes: Vec<u8>) -> Self {
		Self(bytes)
	}

	pub fn as_bytes(&self) -> &[u8] {
		&self.0
	}

	pub fn is_canonical_empty(&self) -> bool {
		self.0.len() == 5
	}
}

impl Default for RawList {
	fn default() -> Self {
		Self::empty()
	}
}

/// One generated column of world: 16x16 blocks in the horizontal plane,
/// up to 16 vertical [Section]s. Field order mirrors the serialized
/// order so the encoder can walk the struct top to bottom.
#[derive(Debug, Clone)]
pub struct Chunk {
	pub entities: RawList,
	pub sections: Vec<Section>,
	pub tile_entities: RawList,
	pub inhabited_time: i64,
	pub last_update: i64,
	pub light_populated: u8,
	pub terrain_populated: u8,
	/// Schema version; omitted from the stream when zero.
	pub v: i32,
	pub x_pos: i32,
	pub z_pos: i32,
	pub biomes: Vec<u8>,
	/// 256 values, row-major `z * 16 + x`.
	pub height_map: Vec<i32>,

	/// Lazy `y -> sections index` lookup; rebuilt on first use after any
	/// structural change to `sections`.
	section_cache: Option<[Option<u16>; 16]>,
}

impl Default for Chunk {
	fn default() -> Self {
		Self {
			entities: RawList::empty(),
			sections: Vec::new(),
			tile_entities: RawList::empty(),
			inhabited_time: 0,
			last_update: 0,
			light_populated: 0,
			terrain_populated: 0,
			v: 0,
			x_pos: 0,
			z_pos: 0,
			biomes: Vec::new(),
			height_map: Vec::new(),
			section_cache: None,
		}
	}
}

impl PartialEq for Chunk {
	fn eq(&self, other: &Self) -> bool {
		// The section cache is derived state and irrelevant to equality.
		self.entities == other.entities
			&& self.sections == other.sections
			&& self.tile_entities == other.tile_entities
			&& self.inhabited_time == other.inhabited_time
			&& self.last_update == other.last_update
			&& self.light_populated == other.light_populated
			&& self.terrain_populated == other.terrain_populated
			&& self.v == other.v
			&& self.x_pos == other.x_pos
			&& self.z_pos == other.z_pos
			&& self.biomes == other.biomes
			&& self.height_map == other.height_map
	}
}

/// Low nibble at even index, high nibble at odd index, masked to 4 bits.
pub fn nibble_get(data: &[u8], idx: usize) -> u8 {
	(data[idx >> 1] >> ((idx & 1) * 4)) & 0xF
}

fn is_zero(data: &[u8]) -> bool {
	data.iter().all(|&b| b == 0)
}

impl Chunk {
	/// A chunk is empty iff it has no sections and both opaque subtrees
	/// are canonical empty lists. The length test is intentional: it
	/// avoids walking the subtrees and classifies anything non-trivial
	/// as non-empty.
	pub fn is_empty(&self) -> bool {
		self.sections.is_empty()
			&& self.entities.is_canonical_empty()
			&& self.tile_entities.is_canonical_empty()
	}

	/// Drops sections whose `blocks` are all zero and whose `add` is
	/// absent or all zero, scanning from the top section down. `data`
	/// and the light arrays are deliberately not consulted; their zero
	/// state does not make a section empty in this format.
	/// Returns whether any section was removed.
	pub fn optimize_sections(&mut self) -> bool {
		self.section_cache = None;
		let before = self.sections.len();
		for i in (0..self.sections.len()).rev() {
			if !is_zero(&self.sections[i].blocks) {
				continue;
			}
			if !is_zero(&self.sections[i].add) {
				continue;
			}
			self.sections.remove(i);
		}
		before != self.sections.len()
	}

	/// Rescans every column from the top retained section downward and
	/// records one above the first non-transparent block (0 for a column
	/// with none). A chunk without sections is left alone.
	/// Returns whether any cell changed.
	pub fn compute_height_map(&mut self) -> bool {
		let max_y = match self.sections.iter().map(|s| ((s.y as i32) << 4) + 16).max() {
			Some(max_y) => max_y,
			None => return false,
		};
		if self.height_map.len() != 256 {
			self.height_map = vec![0; 256];
		}
		let mut changed = false;
		for x in 0..16 {
			for z in 0..16 {
				let mut height = 0;
				for y in (0..max_y).rev() {
					let (id, _) = self.get_type(x, y, z);
					if !is_transparent(id) {
						height = y + 1;
						break;
					}
				}
				let cell = (z * 16 + x) as usize;
				if self.height_map[cell] != height {
					self.height_map[cell] = height;
					changed = true;
				}
			}
		}
		changed
	}

	/// Block id and data nibble at a chunk-local coordinate, `(0, 0)`
	/// when the column is out of range or the section is absent. The id
	/// is extended to 12 bits through `add` when present.
	pub fn get_type(&mut self, x: i32, y: i32, z: i32) -> (u16, u8) {
		if !(0..256).contains(&y) {
			return (0, 0);
		}
		if self.section_cache.is_none() {
			let mut cache = [None; 16];
			for (index, section) in self.sections.iter().enumerate() {
				if section.y < 16 {
					cache[section.y as usize] = Some(index as u16);
				}
			}
			self.section_cache = Some(cache);
		}
		let cache = match self.section_cache {
			Some(ref cache) => cache,
			None => return (0, 0),
		};
		let section = match cache[(y >> 4) as usize] {
			Some(index) => &self.sections[index as usize],
			None => return (0, 0),
		};
		let idx = (((y & 15) << 8) | ((z & 15) << 4) | (x & 15)) as usize;
		let mut id = section.blocks[idx] as u16;
		if !section.add.is_empty() {
			id |= (nibble_get(&section.add, idx) as u16) << 8;
		}
		(id, nibble_get(&section.data, idx))
	}

	/// Default per-column digest for the world low-map: 256 bytes in
	/// `z * 16 + x` order, the height-map value clamped to `0..=255`.
	pub fn compute_low_map(&self) -> Vec<u8> {
		(0..256)
			.map(|cell| {
				self.height_map
					.get(cell)
					.copied()
					.unwrap_or(0)
					.clamp(0, 255) as u8
			})
			.collect()
	}
}

// ========[ Transparency     ]========================

/// The light-opacity-zero block ids of the 1.8.8 id space. A column's
/// height is the first id from the top that is NOT in this table.
/// Liquids and snow layers register on the surface, so they are absent.
const TRANSPARENT_IDS: &[u16] = &[
	0,   // air
	6,   // sapling
	20,  // glass
	27,  // golden rail
	28,  // detector rail
	31,  // tallgrass
	32,  // dead bush
	37,  // yellow flower
	38,  // red flower
	39,  // brown mushroom
	40,  // red mushroom
	50,  // torch
	51,  // fire
	55,  // redstone wire
	59,  // wheat
	63,  // standing sign
	64,  // wooden door
	65,  // ladder
	66,  // rail
	68,  // wall sign
	69,  // lever
	70,  // stone pressure plate
	71,  // iron door
	72,  // wooden pressure plate
	75,  // unlit redstone torch
	76,  // redstone torch
	77,  // stone button
	83,  // reeds
	90,  // portal
	95,  // stained glass
	96,  // trapdoor
	101, // iron bars
	102, // glass pane
	104, // pumpkin stem
	105, // melon stem
	106, // vine
	107, // fence gate
	111, // waterlily
	115, // nether wart
	119, // end portal
	131, // tripwire hook
	132, // tripwire
	140, // flower pot
	141, // carrots
	142, // potatoes
	143, // wooden button
	144, // skull
	147, // light weighted pressure plate
	148, // heavy weighted pressure plate
	157, // activator rail
	160, // stained glass pane
	166, // barrier
	167, // iron trapdoor
	171, // carpet
	175, // double plant
	176, // standing banner
	177, // wall banner
	183, // spruce fence gate
	184, // birch fence gate
	185, // jungle fence gate
	186, // dark oak fence gate
	187, // acacia fence gate
	193, // spruce door
	194, // birch door
	195, // jungle door
	196, // acacia door
	197, // dark oak door
];

const fn build_transparent_table(ids: &[u16]) -> [bool; 4096] {
	let mut table = [false; 4096];
	let mut i = 0;
	while i < ids.len() {
		table[ids[i] as usize] = true;
		i += 1;
	}
	table
}

static TRANSPARENT: [bool; 4096] = build_transparent_table(TRANSPARENT_IDS);

pub fn is_transparent(id: u16) -> bool {
	TRANSPARENT[(id & 0xFFF) as usize]
}

// ========[ Decoding         ]========================

impl Readable for Chunk {
	fn read_from<R: Read>(reader: &mut R) -> TrimResult<Self> {
		let root_id = TagID::nbt_read(reader)?;
		if root_id == TagID::End {
			return Err(TrimError::EndTagMarker);
		}
		if root_id != TagID::Compound {
			return Err(TrimError::MalformedNbt("chunk root is not a compound"));
		}
		let _root_name = read_string(reader)?;
		let mut chunk = None;
		loop {
			let id = TagID::nbt_read(reader)?;
			if id == TagID::End {
				break;
			}
			let name = read_string(reader)?;
			if name == "Level" && id == TagID::Compound {
				chunk = Some(read_level(reader)?);
			} else {
				skip_payload(reader, id)?;
			}
		}
		chunk.ok_or(TrimError::MalformedNbt("chunk has no Level compound"))
	}
}

fn read_level<R: Read>(reader: &mut R) -> TrimResult<Chunk> {
	let mut chunk = Chunk::default();
	loop {
		let id = TagID::nbt_read(reader)?;
		if id == TagID::End {
			return Ok(chunk);
		}
		let name = read_string(reader)?;
		match (name.as_str(), id) {
			("xPos", TagID::Int) => chunk.x_pos = i32::nbt_read(reader)?,
			("zPos", TagID::Int) => chunk.z_pos = i32::nbt_read(reader)?,
			("LastUpdate", TagID::Long) => chunk.last_update = i64::nbt_read(reader)?,
			("InhabitedTime", TagID::Long) => chunk.inhabited_time = i64::nbt_read(reader)?,
			("LightPopulated", TagID::Byte) => chunk.light_populated = u8::nbt_read(reader)?,
			("TerrainPopulated", TagID::Byte) => chunk.terrain_populated = u8::nbt_read(reader)?,
			("V", TagID::Int) => chunk.v = i32::nbt_read(reader)?,
			("Biomes", TagID::ByteArray) => chunk.biomes = read_byte_array(reader)?,
			("HeightMap", TagID::IntArray) => chunk.height_map = read_int_array(reader)?,
			("Sections", TagID::List) => chunk.sections = read_sections(reader)?,
			("Entities", TagID::List) => {
				chunk.entities = RawList::from_bytes(capture_payload(reader, TagID::List)?);
			}
			("TileEntities", TagID::List) => {
				chunk.tile_entities = RawList::from_bytes(capture_payload(reader, TagID::List)?);
			}
			_ => {
				skip_payload(reader, id)?;
			}
		}
	}
}

fn read_byte_array<R: Read>(reader: &mut R) -> TrimResult<Vec<u8>> {
	let length = i32::nbt_read(reader)?;
	if length < 0 {
		return Err(TrimError::MalformedNbt("negative array length"));
	}
	let mut data = vec![0u8; length as usize];
	reader.read_exact(&mut data)?;
	Ok(data)
}

fn read_int_array<R: Read>(reader: &mut R) -> TrimResult<Vec<i32>> {
	let length = i32::nbt_read(reader)?;
	if length < 0 {
		return Err(TrimError::MalformedNbt("negative array length"));
	}
	(0..length).map(|_| i32::nbt_read(reader)).collect()
}

fn read_sections<R: Read>(reader: &mut R) -> TrimResult<Vec<Section>> {
	let element_id = TagID::nbt_read(reader)?;
	let count = i32::nbt_read(reader)?;
	if count < 0 {
		return Err(TrimError::MalformedNbt("negative section count"));
	}
	if count == 0 {
		return Ok(Vec::new());
	}
	if element_id != TagID::Compound {
		return Err(TrimError::MalformedNbt("Sections is not a list of compounds"));
	}
	(0..count).map(|_| read_section(reader)).collect()
}

fn read_section<R: Read>(reader: &mut R) -> TrimResult<Section> {
	let mut section = Section::default();
	loop {
		let id = TagID::nbt_read(reader)?;
		if id == TagID::End {
			break;
		}
		let name = read_string(reader)?;
		match (name.as_str(), id) {
			("Y", TagID::Byte) => section.y = u8::nbt_read(reader)?,
			("Blocks", TagID::ByteArray) => section.blocks = read_byte_array(reader)?,
			("Data", TagID::ByteArray) => section.data = read_byte_array(reader)?,
			("Add", TagID::ByteArray) => section.add = read_byte_array(reader)?,
			("BlockLight", TagID::ByteArray) => section.block_light = read_byte_array(reader)?,
			("SkyLight", TagID::ByteArray) => section.sky_light = read_byte_array(reader)?,
			_ => {
				skip_payload(reader, id)?;
			}
		}
	}
	if section.blocks.len() != 4096 {
		return Err(TrimError::MalformedNbt("section Blocks must hold 4096 bytes"));
	}
	if section.data.len() != 2048 || section.block_light.len() != 2048 {
		return Err(TrimError::MalformedNbt("section nibble array must hold 2048 bytes"));
	}
	if !section.add.is_empty() && section.add.len() != 2048 {
		return Err(TrimError::MalformedNbt("section Add must hold 2048 bytes"));
	}
	if !section.sky_light.is_empty() && section.sky_light.len() != 2048 {
		return Err(TrimError::MalformedNbt("section SkyLight must hold 2048 bytes"));
	}
	Ok(section)
}

// ========[ Encoding         ]========================

fn write_tag_header<W: Write>(writer: &mut W, id: TagID, name: &str) -> TrimResult<usize> {
	Ok(id.nbt_write(writer)? + write_string(writer, name)?)
}

fn write_byte_array<W: Write>(writer: &mut W, name: &str, data: &[u8]) -> TrimResult<usize> {
	let mut size = write_tag_header(writer, TagID::ByteArray, name)?;
	size += (data.len() as i32).nbt_write(writer)?;
	writer.write_all(data)?;
	Ok(size + data.len())
}

fn write_raw_list<W: Write>(writer: &mut W, name: &str, list: &RawList) -> TrimResult<usize> {
	let size = write_tag_header(writer, TagID::List, name)?;
	writer.write_all(list.as_bytes())?;
	Ok(size + list.as_bytes().len())
}

impl Writable for Section {
	fn write_to<W: Write>(&self, writer: &mut W) -> TrimResult<usize> {
		let mut size = 0;
		size += write_tag_header(writer, TagID::Byte, "Y")?;
		size += self.y.nbt_write(writer)?;
		if !self.sky_light.is_empty() {
			size += write_byte_array(writer, "SkyLight", &self.sky_light)?;
		}
		size += write_byte_array(writer, "BlockLight", &self.block_light)?;
		size += write_byte_array(writer, "Blocks", &self.blocks)?;
		size += write_byte_array(writer, "Data", &self.data)?;
		if !self.add.is_empty() {
			size += write_byte_array(writer, "Add", &self.add)?;
		}
		size += TagID::End.nbt_write(writer)?;
		Ok(size)
	}
}

impl Writable for Chunk {
	fn write_to<W: Write>(&self, writer: &mut W) -> TrimResult<usize> {
		let mut size = 0;
		size += write_tag_header(writer, TagID::Compound, "")?;
		size += write_tag_header(writer, TagID::Compound, "Level")?;

		size += write_raw_list(writer, "Entities", &self.entities)?;

		size += write_tag_header(writer, TagID::List, "Sections")?;
		if self.sections.is_empty() {
			size += TagID::End.nbt_write(writer)?;
			size += 0i32.nbt_write(writer)?;
		} else {
			size += TagID::Compound.nbt_write(writer)?;
			size += (self.sections.len() as i32).nbt_write(writer)?;
			for section in self.sections.iter() {
				size += section.write_to(writer)?;
			}
		}

		size += write_raw_list(writer, "TileEntities", &self.tile_entities)?;

		size += write_tag_header(writer, TagID::Long, "InhabitedTime")?;
		size += self.inhabited_time.nbt_write(writer)?;
		size += write_tag_header(writer, TagID::Long, "LastUpdate")?;
		size += self.last_update.nbt_write(writer)?;
		size += write_tag_header(writer, TagID::Byte, "LightPopulated")?;
		size += self.light_populated.nbt_write(writer)?;
		size += write_tag_header(writer, TagID::Byte, "TerrainPopulated")?;
		size += self.terrain_populated.nbt_write(writer)?;
		if self.v != 0 {
			size += write_tag_header(writer, TagID::Int, "V")?;
			size += self.v.nbt_write(writer)?;
		}
		size += write_tag_header(writer, TagID::Int, "xPos")?;
		size += self.x_pos.nbt_write(writer)?;
		size += write_tag_header(writer, TagID::Int, "zPos")?;
		size += self.z_pos.nbt_write(writer)?;
		size += write_byte_array(writer, "Biomes", &self.biomes)?;

		size += write_tag_header(writer, TagID::IntArray, "HeightMap")?;
		size += (self.height_map.len() as i32).nbt_write(writer)?;
		for value in self.height_map.iter() {
			size += value.nbt_write(writer)?;
		}

		size += TagID::End.nbt_write(writer)?; // close Level
		size += TagID::End.nbt_write(writer)?; // close root
		Ok(size)
	}
}

// ========[ Codec            ]========================

/// Decodes and encodes framed chunk payloads.
///
/// The zlib decompressor and compressor are built once and reset between
/// chunks; their internal buffers dominate per-chunk allocation and the
/// pipeline runs thousands of small chunks through them per region. Gzip
/// framing is rare enough that it gets a fresh decoder each time.
pub struct ChunkCodec {
	zlib_decoder: ZlibDecoder<Cursor<Vec<u8>>>,
	zlib_encoder: ZlibEncoder<Vec<u8>>,
}

impl ChunkCodec {
	pub fn new() -> Self {
		Self {
			zlib_decoder: ZlibDecoder::new(Cursor::new(Vec::new())),
			zlib_encoder: ZlibEncoder::new(Vec::new(), Compression::default()),
		}
	}

	/// Decodes a raw slot payload (compression byte + compressed stream).
	pub fn decode(&mut self, payload: Vec<u8>) -> TrimResult<Chunk> {
		let framing = match payload.first() {
			Some(&byte) => Framing::from_byte(byte)?,
			None => return Err(TrimError::MalformedNbt("empty chunk payload")),
		};
		match framing {
			Framing::GZip => {
				let mut decoder = GzDecoder::new(&payload[1..]);
				Chunk::read_from(&mut decoder)
			}
			Framing::ZLib => {
				let mut cursor = Cursor::new(payload);
				cursor.set_position(1);
				self.zlib_decoder.reset(cursor);
				Chunk::read_from(&mut self.zlib_decoder)
			}
		}
	}

	/// Encodes a chunk as a raw slot payload. Always emits zlib framing.
	pub fn encode(&mut self, chunk: &Chunk) -> TrimResult<Vec<u8>> {
		self.zlib_encoder.reset(vec![Framing::ZLib.byte()])?;
		chunk.write_to(&mut self.zlib_encoder)?;
		self.zlib_encoder.try_finish()?;
		Ok(self.zlib_encoder.reset(Vec::new())?)
	}
}

impl Default for ChunkCodec {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::nbt::io::write_string as nbt_write_string;

	pub(crate) fn filled_section(y: u8, block: u8) -> Section {
		Section {
			y,
			sky_light: vec![0xFF; 2048],
			block_light: vec![0; 2048],
			blocks: vec![block; 4096],
			data: vec![0; 2048],
			add: Vec::new(),
		}
	}

	pub(crate) fn test_chunk(x_pos: i32, z_pos: i32, sections: Vec<Section>) -> Chunk {
		Chunk {
			sections,
			last_update: 123,
			inhabited_time: 456,
			terrain_populated: 1,
			x_pos,
			z_pos,
			biomes: vec![1; 256],
			height_map: vec![0; 256],
			..Chunk::default()
		}
	}

	#[test]
	fn codec_roundtrip() {
		let mut codec = ChunkCodec::new();
		let chunk = test_chunk(-3, 7, vec![filled_section(0, 1), filled_section(3, 7)]);
		let payload = codec.encode(&chunk).unwrap();
		assert_eq!(payload[0], 2);
		let decoded = codec.decode(payload).unwrap();
		assert_eq!(decoded, chunk);
	}

	#[test]
	fn codec_rejects_unknown_compression() {
		let mut codec = ChunkCodec::new();
		assert!(matches!(
			codec.decode(vec![3, 0, 0]),
			Err(TrimError::UnknownCompression(3))
		));
	}

	#[test]
	fn entities_roundtrip_byte_identical() {
		// A list holding one empty compound: still "empty" to the eye,
		// but longer than the canonical 5 bytes and preserved verbatim.
		let mut raw = Vec::new();
		TagID::Compound.nbt_write(&mut raw).unwrap();
		1i32.nbt_write(&mut raw).unwrap();
		TagID::End.nbt_write(&mut raw).unwrap();

		let mut chunk = test_chunk(0, 0, vec![filled_section(0, 1)]);
		chunk.entities = RawList::from_bytes(raw.clone());

		let mut codec = ChunkCodec::new();
		let payload = codec.encode(&chunk).unwrap();
		let decoded = codec.decode(payload).unwrap();
		assert_eq!(decoded.entities.as_bytes(), raw.as_slice());
		assert!(!decoded.entities.is_canonical_empty());
	}

	#[test]
	fn unknown_level_fields_are_skipped() {
		// Splice an unrecognized field into an encoded chunk by hand:
		// re-decode must not fail and must keep the known fields.
		let mut body = Vec::new();
		write_tag_header_for_test(&mut body, TagID::Compound, "");
		write_tag_header_for_test(&mut body, TagID::Compound, "Level");
		write_tag_header_for_test(&mut body, TagID::Int, "xPos");
		5i32.nbt_write(&mut body).unwrap();
		write_tag_header_for_test(&mut body, TagID::String, "Mystery");
		nbt_write_string(&mut body, "???").unwrap();
		TagID::End.nbt_write(&mut body).unwrap();
		TagID::End.nbt_write(&mut body).unwrap();

		let chunk = Chunk::read_from(&mut body.as_slice()).unwrap();
		assert_eq!(chunk.x_pos, 5);
		assert!(chunk.is_empty());
	}

	fn write_tag_header_for_test(writer: &mut Vec<u8>, id: TagID, name: &str) {
		id.nbt_write(writer).unwrap();
		nbt_write_string(writer, name).unwrap();
	}

	#[test]
	fn empty_classification_boundary() {
		let mut chunk = test_chunk(0, 0, Vec::new());
		assert!(chunk.is_empty());
		// One entity tag flips it to non-empty.
		let mut raw = Vec::new();
		TagID::Compound.nbt_write(&mut raw).unwrap();
		1i32.nbt_write(&mut raw).unwrap();
		TagID::End.nbt_write(&mut raw).unwrap();
		chunk.entities = RawList::from_bytes(raw);
		assert!(!chunk.is_empty());
	}

	#[test]
	fn optimize_drops_zero_sections() {
		let mut zero_section = filled_section(4, 0);
		zero_section.sky_light = vec![0xFF; 2048]; // light alone keeps nothing alive
		let mut chunk = test_chunk(0, 0, vec![filled_section(3, 7), zero_section]);
		assert!(chunk.optimize_sections());
		assert_eq!(chunk.sections.len(), 1);
		assert_eq!(chunk.sections[0].y, 3);
		for section in chunk.sections.iter() {
			assert!(!is_zero(&section.blocks) || !is_zero(&section.add));
		}
		// Second run has nothing left to do.
		assert!(!chunk.optimize_sections());
	}

	#[test]
	fn optimize_keeps_add_only_sections() {
		let mut section = filled_section(0, 0);
		section.add = vec![0; 2048];
		section.add[0] = 0x01;
		let mut chunk = test_chunk(0, 0, vec![section]);
		assert!(!chunk.optimize_sections());
		assert_eq!(chunk.sections.len(), 1);
	}

	#[test]
	fn nibble_order() {
		let data = [0xAB, 0xCD];
		assert_eq!(nibble_get(&data, 0), 0xB);
		assert_eq!(nibble_get(&data, 1), 0xA);
		assert_eq!(nibble_get(&data, 2), 0xD);
		assert_eq!(nibble_get(&data, 3), 0xC);
	}

	#[test]
	fn get_type_reads_add_extension() {
		let mut section = filled_section(0, 0x34);
		section.add = vec![0x22; 2048];
		section.data = vec![0x77; 2048];
		let mut chunk = test_chunk(0, 0, vec![section]);
		let (id, data) = chunk.get_type(0, 0, 0);
		assert_eq!(id, 0x234);
		assert_eq!(data, 0x7);
		assert_eq!(chunk.get_type(0, 300, 0), (0, 0));
		assert_eq!(chunk.get_type(0, 16, 0), (0, 0)); // no section at y=1
	}

	#[test]
	fn section_cache_invalidated_by_optimize() {
		let mut chunk = test_chunk(0, 0, vec![filled_section(0, 0), filled_section(1, 9)]);
		assert_eq!(chunk.get_type(0, 16, 0).0, 9); // builds the cache
		chunk.optimize_sections(); // drops the zero section at y=0
		assert_eq!(chunk.get_type(0, 16, 0).0, 9);
		assert_eq!(chunk.get_type(0, 0, 0).0, 0);
	}

	#[test]
	fn height_map_tracks_highest_opaque_block() {
		let mut section = filled_section(3, 0);
		// One stone column up to y = 3*16 + 5.
		for y in 0..6 {
			section.blocks[y * 256] = 1;
		}
		// Torches above it must not register.
		section.blocks[6 * 256] = 50;
		let mut chunk = test_chunk(0, 0, vec![section]);
		assert!(chunk.compute_height_map());
		assert_eq!(chunk.height_map[0], 3 * 16 + 6);
		// Every other column is all air, so it stays 0.
		assert_eq!(chunk.height_map[1], 0);
		// Recomputing without changes reports no mutation.
		assert!(!chunk.compute_height_map());
	}

	#[test]
	fn low_map_digest_clamps_heights() {
		let mut chunk = test_chunk(0, 0, Vec::new());
		chunk.height_map = vec![0; 256];
		chunk.height_map[0] = 300;
		chunk.height_map[1] = 42;
		let digest = chunk.compute_low_map();
		assert_eq!(digest.len(), 256);
		assert_eq!(digest[0], 255);
		assert_eq!(digest[1], 42);
	}
}
