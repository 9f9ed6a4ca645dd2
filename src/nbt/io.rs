//! Big-endian primitive io plus the structural payload walkers.
//!
//! Everything in the tag format is big-endian. The walkers
//! ([copy_payload], [skip_payload], [capture_payload]) parse just enough
//! structure to know where a payload ends, moving its bytes verbatim.

use std::io::{
	self,
	Read, Write,
};

use crate::{
	TrimResult, TrimError,
};

use super::tagid::TagID;

/// A value that can be read from a tag stream.
pub trait NbtRead: Sized {
	fn nbt_read<R: Read>(reader: &mut R) -> TrimResult<Self>;
}

/// A value that can be written to a tag stream.
pub trait NbtWrite {
	fn nbt_write<W: Write>(&self, writer: &mut W) -> TrimResult<usize>;
}

/// Big-endian io for the primitive widths the chunk codec touches.
macro_rules! primitive_nbt_io {
	($($type:ty),+ $(,)?) => {
		$(
			impl NbtRead for $type {
				fn nbt_read<R: Read>(reader: &mut R) -> TrimResult<Self> {
					let mut buffer = [0u8; std::mem::size_of::<$type>()];
					reader.read_exact(&mut buffer)?;
					Ok(<$type>::from_be_bytes(buffer))
				}
			}

			impl NbtWrite for $type {
				fn nbt_write<W: Write>(&self, writer: &mut W) -> TrimResult<usize> {
					writer.write_all(&self.to_be_bytes())?;
					Ok(std::mem::size_of::<$type>())
				}
			}
		)+
	};
}

primitive_nbt_io!(u8, u16, u32, i32, i64);

impl NbtRead for TagID {
	fn nbt_read<R: Read>(reader: &mut R) -> TrimResult<Self> {
		TagID::try_from(u8::nbt_read(reader)?)
	}
}

impl NbtWrite for TagID {
	fn nbt_write<W: Write>(&self, writer: &mut W) -> TrimResult<usize> {
		self.value().nbt_write(writer)
	}
}

/// Reads a length-prefixed string (u16 length, then that many bytes of
/// UTF-8).
pub fn read_string<R: Read>(reader: &mut R) -> TrimResult<String> {
	let length = u16::nbt_read(reader)? as usize;
	let mut bytes = vec![0u8; length];
	reader.read_exact(&mut bytes)?;
	Ok(String::from_utf8(bytes)?)
}

/// Writes a length-prefixed string. Returns the number of bytes written.
pub fn write_string<W: Write>(writer: &mut W, value: &str) -> TrimResult<usize> {
	let bytes = value.as_bytes();
	if bytes.len() > u16::MAX as usize {
		return Err(TrimError::OutOfRange);
	}
	(bytes.len() as u16).nbt_write(writer)?;
	writer.write_all(bytes)?;
	Ok(2 + bytes.len())
}

/// Copies exactly `count` bytes from `reader` into `writer`.
fn copy_exact<R: Read, W: Write>(reader: &mut R, writer: &mut W, count: u64) -> TrimResult<u64> {
	let copied = io::copy(&mut reader.take(count), writer)?;
	if copied != count {
		return Err(TrimError::IoError(io::Error::new(
			io::ErrorKind::UnexpectedEof,
			"tag payload was truncated",
		)));
	}
	Ok(count)
}

/// Copies one tag payload of the given id from `reader` into `writer`,
/// byte for byte. The tag id byte itself and (for named tags) the name are
/// NOT part of a payload; callers handle those. Returns the payload size.
pub fn copy_payload<R: Read, W: Write>(reader: &mut R, writer: &mut W, id: TagID) -> TrimResult<u64> {
	Ok(match id {
		TagID::End => 0,
		TagID::Byte => copy_exact(reader, writer, 1)?,
		TagID::Short => copy_exact(reader, writer, 2)?,
		TagID::Int | TagID::Float => copy_exact(reader, writer, 4)?,
		TagID::Long | TagID::Double => copy_exact(reader, writer, 8)?,
		TagID::ByteArray => copy_sized_array(reader, writer, 1)?,
		TagID::IntArray => copy_sized_array(reader, writer, 4)?,
		TagID::LongArray => copy_sized_array(reader, writer, 8)?,
		TagID::String => {
			let length = u16::nbt_read(reader)?;
			length.nbt_write(writer)?;
			2 + copy_exact(reader, writer, length as u64)?
		}
		TagID::List => {
			let element_id = TagID::nbt_read(reader)?;
			element_id.nbt_write(writer)?;
			let count = i32::nbt_read(reader)?;
			count.nbt_write(writer)?;
			if count < 0 {
				return Err(TrimError::MalformedNbt("negative list length"));
			}
			if element_id == TagID::End && count > 0 {
				return Err(TrimError::MalformedNbt("non-empty list of End tags"));
			}
			let mut size = 5u64;
			for _ in 0..count {
				size += copy_payload(reader, writer, element_id)?;
			}
			size
		}
		TagID::Compound => {
			let mut size = 0u64;
			loop {
				let child_id = TagID::nbt_read(reader)?;
				child_id.nbt_write(writer)?;
				size += 1;
				if child_id == TagID::End {
					break size;
				}
				let name_length = u16::nbt_read(reader)?;
				name_length.nbt_write(writer)?;
				size += 2 + copy_exact(reader, writer, name_length as u64)?;
				size += copy_payload(reader, writer, child_id)?;
			}
		}
	})
}

/// Copies a length-prefixed array payload whose elements are
/// `element_size` bytes wide.
fn copy_sized_array<R: Read, W: Write>(reader: &mut R, writer: &mut W, element_size: u64) -> TrimResult<u64> {
	let length = i32::nbt_read(reader)?;
	length.nbt_write(writer)?;
	if length < 0 {
		return Err(TrimError::MalformedNbt("negative array length"));
	}
	Ok(4 + copy_exact(reader, writer, length as u64 * element_size)?)
}

/// Consumes one tag payload without keeping it.
pub fn skip_payload<R: Read>(reader: &mut R, id: TagID) -> TrimResult<u64> {
	copy_payload(reader, &mut io::sink(), id)
}

/// Reads one tag payload into an owned buffer, byte for byte.
pub fn capture_payload<R: Read>(reader: &mut R, id: TagID) -> TrimResult<Vec<u8>> {
	let mut buffer = Vec::new();
	copy_payload(reader, &mut buffer, id)?;
	Ok(buffer)
}
