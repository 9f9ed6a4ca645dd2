use crate::TrimError;

/// The 13 tag ids of the binary tag format.
/// `End` is a structural marker, not a value; it terminates compounds and
/// doubles as the element type of a canonical empty list.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagID {
	End = 0,
	Byte = 1,
	Short = 2,
	Int = 3,
	Long = 4,
	Float = 5,
	Double = 6,
	ByteArray = 7,
	String = 8,
	List = 9,
	Compound = 10,
	IntArray = 11,
	LongArray = 12,
}

impl TagID {
	pub fn value(self) -> u8 {
		self as u8
	}
}

impl TryFrom<u8> for TagID {
	type Error = TrimError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		Ok(match value {
			0 => TagID::End,
			1 => TagID::Byte,
			2 => TagID::Short,
			3 => TagID::Int,
			4 => TagID::Long,
			5 => TagID::Float,
			6 => TagID::Double,
			7 => TagID::ByteArray,
			8 => TagID::String,
			9 => TagID::List,
			10 => TagID::Compound,
			11 => TagID::IntArray,
			12 => TagID::LongArray,
			unsupported => return Err(TrimError::UnsupportedTagId(unsupported)),
		})
	}
}
