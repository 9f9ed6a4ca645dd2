use std::io::{
	self,
	Write,
	Read,
	Seek, SeekFrom,
};

use crate::nbt::io::{
	NbtWrite,
	NbtRead,
};

pub trait Writable {
	fn write_to<W: Write>(&self, writer: &mut W) -> Result<usize, crate::TrimError>;
}

pub trait Readable: Sized {
	fn read_from<R: Read>(reader: &mut R) -> Result<Self, crate::TrimError>;
}

pub trait ReadExt: Read {
	fn read_value<T: NbtRead>(&mut self) -> Result<T, crate::TrimError>;
}

pub trait WriteExt: Write {
	fn write_value<T: NbtWrite>(&mut self, value: T) -> Result<usize, crate::TrimError>;
}

impl<R: Read> ReadExt for R {
	fn read_value<T: NbtRead>(&mut self) -> Result<T, crate::TrimError> {
		T::nbt_read(self)
	}
}

impl<W: Write> WriteExt for W {
	fn write_value<T: NbtWrite>(&mut self, value: T) -> Result<usize, crate::TrimError> {
		value.nbt_write(self)
	}
}

pub trait SeekExt: Seek {
	/// Returns a [SeekFrom] for the current stream position, so that the
	/// caller can come back after wandering off.
	fn seek_return(&mut self) -> io::Result<SeekFrom>;
}

impl<S: Seek> SeekExt for S {
	fn seek_return(&mut self) -> io::Result<SeekFrom> {
		Ok(SeekFrom::Start(self.stream_position()?))
	}
}

pub trait WriteZeroes {
	fn write_zeroes(&mut self, count: u64) -> io::Result<u64>;
}

impl<T: Write> WriteZeroes for T {
	fn write_zeroes(&mut self, count: u64) -> io::Result<u64> {
		const ZEROES: &'static [u8; 4096] = &[0u8; 4096];
		let mut remainder = count;
		while remainder >= ZEROES.len() as u64 {
			self.write_all(ZEROES)?;
			remainder -= ZEROES.len() as u64;
		}
		if remainder != 0 {
			self.write_all(&ZEROES[0..remainder as usize])?;
		}
		Ok(count)
	}
}

/// Copies bytes from a reader into a writer
pub fn copy_bytes<R: Read, W: Write>(reader: &mut R, writer: &mut W, count: u64) -> io::Result<u64> {
	std::io::copy(&mut reader.take(count), writer)
}
