use core::fmt;
use std::error::Error;
use std::iter::FusedIterator;

use crate::rom::{CAP_CHUNK_DIR, CAP_INT_PTRS, CAP_RESERVED, CAP_WIDTH_MASK, CAP_WIDTH_SHIFT, ECID_SHORT_LEN, Ecid, BusWidth, ID_FIQ, ID_IRQ, ID_NOT_ACORN, ID_RESERVED, MAGIC, TERMINATOR_LEN, Trailer, TRAILER_CHECKSUM, TRAILER_LEN, TRAILER_MAGIC, TRAILER_SIZE};
use crate::rom::checksum::image_checksum;
use crate::rom::chunk::{ChunkEntry, ChunkKind, DeviceData, RiscOsType};

#[cfg(test)]
mod test;

const MODULE_TITLE: usize = 0x10;
const MODULE_HELP: usize = 0x14;

fn read_u32(src: &[u8], pos: usize) -> Option<u32>
{
	let word = src.get(pos..pos.checked_add(4)?)?;
	Some(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

impl Ecid
{
	pub fn read(src: &[u8]) -> Result<Self, ReadError>
	{
		if src.len() < ECID_SHORT_LEN
		{
			return Err(ReadError::Underflow{need: ECID_SHORT_LEN, have: src.len()});
		}
		if src[0] & ID_NOT_ACORN != 0
		{
			return Err(ReadError::NotConformant(src[0]));
		}
		if src[0] & ID_RESERVED != 0
		{
			return Err(ReadError::Reserved{pos: 0, value: src[0]});
		}
		if src[1] & CAP_RESERVED != 0
		{
			return Err(ReadError::Reserved{pos: 1, value: src[1]});
		}
		if src[2] != 0
		{
			return Err(ReadError::Reserved{pos: 2, value: src[2]});
		}
		let width = match (src[1] >> CAP_WIDTH_SHIFT) & CAP_WIDTH_MASK
		{
			0 => BusWidth::Byte,
			1 => BusWidth::Half,
			2 => BusWidth::Word,
			_ => return Err(ReadError::Reserved{pos: 1, value: src[1]}),
		};
		let ecid = Self
		{
			irq: src[0] & ID_IRQ != 0,
			fiq: src[0] & ID_FIQ != 0,
			chunk_dir: src[1] & CAP_CHUNK_DIR != 0,
			int_ptrs: src[1] & CAP_INT_PTRS != 0,
			width,
			product: u16::from_le_bytes([src[3], src[4]]),
			manufacturer: u16::from_le_bytes([src[5], src[6]]),
			country: src[7],
		};
		if src.len() < ecid.len()
		{
			return Err(ReadError::Underflow{need: ecid.len(), have: src.len()});
		}
		Ok(ecid)
	}
}

impl Trailer
{
	/// Reads the trailer if the image ends with the Extension ROM magic.
	pub fn read(src: &[u8]) -> Option<Self>
	{
		if src.len() < TRAILER_LEN
		{
			return None;
		}
		let base = src.len() - TRAILER_LEN;
		if src[base + TRAILER_MAGIC..] != MAGIC
		{
			return None;
		}
		Some(Self{size: read_u32(src, base + TRAILER_SIZE)?, checksum: read_u32(src, base + TRAILER_CHECKSUM)?})
	}

	pub fn verify(&self, src: &[u8]) -> Result<(), ReadError>
	{
		if self.size as usize != src.len()
		{
			return Err(ReadError::SizeMismatch{stored: self.size, have: src.len()});
		}
		let computed = image_checksum(src);
		if computed != self.checksum
		{
			return Err(ReadError::Checksum{stored: self.checksum, computed});
		}
		Ok(())
	}
}

/// A parsed image, borrowing the raw bytes.
#[derive(Clone, Copy, Debug)]
pub struct Image<'l>
{
	src: &'l [u8],
	pub ecid: Ecid,
	pub trailer: Option<Trailer>,
}

impl<'l> Image<'l>
{
	pub fn parse(src: &'l [u8]) -> Result<Self, ReadError>
	{
		let ecid = Ecid::read(src)?;
		Ok(Self{src, ecid, trailer: Trailer::read(src)})
	}

	pub fn len(&self) -> usize
	{
		self.src.len()
	}

	pub fn chunks(&self) -> Directory<'l>
	{
		Directory::new(self.src, &self.ecid)
	}

	pub fn verify(&self) -> Result<(), ReadError>
	{
		match &self.trailer
		{
			None => Err(ReadError::NoTrailer),
			Some(trailer) => trailer.verify(self.src),
		}
	}
}

/// Walks the chunk directory up to its terminator.
#[derive(Clone, Debug)]
pub struct Directory<'l>
{
	src: &'l [u8],
	pos: usize,
	index: usize,
	done: bool,
}

impl<'l> Directory<'l>
{
	pub fn new(src: &'l [u8], ecid: &Ecid) -> Self
	{
		// an image without a directory behaves like one that is immediately terminated
		Self{src, pos: ecid.len(), index: 0, done: !ecid.chunk_dir}
	}

	fn read_next(&mut self) -> Result<Option<Chunk<'l>>, ReadError>
	{
		let src = self.src;
		let pos = self.pos;
		let truncated = ReadError::Truncated{index: self.index, pos};
		let head = read_u32(src, pos).ok_or_else(|| truncated.clone())?;
		if head == 0
		{
			return Ok(None);
		}
		let addr = read_u32(src, pos + TERMINATOR_LEN).ok_or(truncated)?;
		let identity = head as u8;
		if identity & 0x80 == 0
		{
			return Err(ReadError::Identity{index: self.index, pos, value: identity});
		}
		let entry = ChunkEntry::from_identity(identity, head >> 8, addr);
		if entry.end() > src.len() as u64
		{
			return Err(ReadError::DataRange{index: self.index, addr: entry.addr, len: entry.len, have: src.len()});
		}
		let data = &src[entry.addr as usize..entry.end() as usize];
		self.pos += 8;
		self.index += 1;
		Ok(Some(Chunk{index: self.index - 1, entry, data}))
	}
}

impl<'l> Iterator for Directory<'l>
{
	type Item = Result<Chunk<'l>, ReadError>;

	fn next(&mut self) -> Option<Self::Item>
	{
		if self.done
		{
			return None;
		}
		match self.read_next()
		{
			Ok(Some(chunk)) => Some(Ok(chunk)),
			Ok(None) =>
			{
				self.done = true;
				None
			},
			Err(e) =>
			{
				self.done = true;
				Some(Err(e))
			},
		}
	}
}

impl<'l> FusedIterator for Directory<'l> {}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Chunk<'l>
{
	pub index: usize,
	pub entry: ChunkEntry,
	pub data: &'l [u8],
}

fn latin1(src: &[u8]) -> String
{
	let end = src.iter().position(|&b| b == 0).unwrap_or(src.len());
	src[..end].iter().map(|&b| b as char).collect()
}

impl<'l> Chunk<'l>
{
	pub fn kind(&self) -> ChunkKind
	{
		self.entry.kind()
	}

	/// Device data strings, up to their NUL terminator.
	pub fn text(&self) -> Option<String>
	{
		match self.kind()
		{
			ChunkKind::Device(dd) if dd.is_text() => Some(latin1(self.data)),
			_ => None,
		}
	}

	pub fn mac_address(&self) -> Option<[u8; 6]>
	{
		match self.kind()
		{
			ChunkKind::Device(DeviceData::MacAddress) => self.data.get(..6)?.try_into().ok(),
			_ => None,
		}
	}

	pub fn pcb_revision(&self) -> Option<u32>
	{
		match self.kind()
		{
			ChunkKind::Device(DeviceData::PcbRevision) => read_u32(self.data, 0),
			_ => None,
		}
	}

	/// Title and help strings of a relocatable module, where present.
	pub fn module_title(&self) -> Option<(Option<String>, Option<String>)>
	{
		if self.kind() != ChunkKind::RiscOs(RiscOsType::Module) || self.data.len() < MODULE_HELP + 4
		{
			return None;
		}
		let string = |field: usize|
		{
			match read_u32(self.data, field)? as usize
			{
				0 => None,
				off => self.data.get(off..).map(latin1),
			}
		};
		Some((string(MODULE_TITLE), string(MODULE_HELP)))
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadError
{
	Underflow{need: usize, have: usize},
	NotConformant(u8),
	Reserved{pos: usize, value: u8},
	Truncated{index: usize, pos: usize},
	Identity{index: usize, pos: usize, value: u8},
	DataRange{index: usize, addr: u32, len: u32, have: usize},
	NoTrailer,
	SizeMismatch{stored: u32, have: usize},
	Checksum{stored: u32, computed: u32},
}

impl fmt::Display for ReadError
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self
		{
			Self::Underflow{need, have} => write!(f, "image too short (need {need}, got {have})"),
			Self::NotConformant(id) => write!(f, "not an Acorn-conformant ECID (id byte &{id:02X})"),
			Self::Reserved{pos, value} => write!(f, "reserved bits set in ECID byte {pos} (&{value:02X})"),
			Self::Truncated{index, pos} => write!(f, "chunk directory truncated at entry {index} (&{pos:X})"),
			Self::Identity{index, pos, value} => write!(f, "invalid identity byte &{value:02X} for chunk {index} (&{pos:X})"),
			Self::DataRange{index, addr, len, have} => write!(f, "chunk {index} data (&{addr:X}, {len} bytes) exceeds image size {have}"),
			Self::NoTrailer => f.write_str("no Extension ROM trailer"),
			Self::SizeMismatch{stored, have} => write!(f, "trailer size {stored} does not match image size {have}"),
			Self::Checksum{stored, computed} => write!(f, "bad checksum (stored &{stored:08X}, calculated &{computed:08X})"),
		}
	}
}

impl Error for ReadError {}
