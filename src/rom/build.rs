use core::fmt;
use std::error::Error;

use tracing::debug;

use crate::rom::{CHECKSUM_EXCLUDED, ECID_LEN, Ecid, ENTRY_LEN, FILL_BYTE, HEADROOM, KIB, MAGIC, MAX_CHUNK_LEN, TERMINATOR_LEN, TRAILER_CHECKSUM, TRAILER_LEN, TRAILER_MAGIC, TRAILER_SIZE};
use crate::rom::checksum::image_checksum;
use crate::rom::chunk::ChunkEntry;


const MIN_SIZE: usize = ECID_LEN + TERMINATOR_LEN + TRAILER_LEN;

/// Lays out one ROM image in a fixed buffer.
///
/// The ECID and chunk directory are written upwards from the start (`head`) while chunk payloads
/// are allocated downwards from the trailer (`tail`). The two cursors never cross.
pub struct ImageBuilder
{
	buff: Vec<u8>,
	head: usize,
	tail: usize,
	count: usize,
}

impl ImageBuilder
{
	pub fn new(size: usize) -> Result<Self, NewError>
	{
		if size % 4 != 0
		{
			return Err(NewError::Alignment(size));
		}
		if size < MIN_SIZE
		{
			return Err(NewError::TooSmall{need: MIN_SIZE, have: size});
		}
		if u32::try_from(size).is_err()
		{
			return Err(NewError::TooLarge(size));
		}
		Ok(Self{buff: vec![FILL_BYTE; size], head: 0, tail: size - TRAILER_LEN, count: 0})
	}

	pub fn with_kib(kib: u32) -> Result<Self, NewError>
	{
		match (kib as usize).checked_mul(KIB)
		{
			Some(size) => Self::new(size),
			None => Err(NewError::TooLarge(usize::MAX)),
		}
	}

	pub fn len(&self) -> usize
	{
		self.buff.len()
	}

	pub fn head(&self) -> usize
	{
		self.head
	}

	pub fn tail(&self) -> usize
	{
		self.tail
	}

	pub fn count(&self) -> usize
	{
		self.count
	}

	pub fn as_slice(&self) -> &[u8]
	{
		&self.buff
	}

	fn check_write(&self, len: usize) -> Result<(), WriteError>
	{
		if self.tail - self.head < len
		{
			return Err(WriteError::Overflow{pos: self.head, need: len, have: self.tail - self.head});
		}
		Ok(())
	}

	fn put_u8(&mut self, value: u8) -> Result<(), WriteError>
	{
		self.check_write(1)?;
		self.buff[self.head] = value;
		self.head += 1;
		Ok(())
	}

	fn put_u16(&mut self, value: u16) -> Result<(), WriteError>
	{
		self.check_write(2)?;
		u16::to_le_bytes(value).into_iter().try_for_each(|b| self.put_u8(b))
	}

	fn put_u32(&mut self, value: u32) -> Result<(), WriteError>
	{
		self.check_write(4)?;
		u32::to_le_bytes(value).into_iter().try_for_each(|b| self.put_u8(b))
	}

	/// Writes the expansion card identity, must happen before any chunk is added.
	pub fn write_header(&mut self, ecid: &Ecid) -> Result<(), WriteError>
	{
		if self.head != 0
		{
			return Err(WriteError::Misplaced{pos: self.head});
		}
		self.put_u8(ecid.id_byte())?;
		self.put_u8(ecid.cap_byte())?;
		self.put_u8(0)?;
		self.put_u16(ecid.product)?;
		self.put_u16(ecid.manufacturer)?;
		self.put_u8(ecid.country)?;
		if ecid.int_ptrs
		{
			// no IRQ or FIQ status pointers
			self.put_u32(0)?;
			self.put_u32(0)?;
		}
		debug!("ECID written, directory starts at &{:X}", self.head);
		Ok(())
	}

	/// Stores `data` below the previous chunk and appends its directory entry.
	///
	/// The payload is preceded by its stored size (`data.len() + 4`) and padded up to a whole
	/// word. Padding keeps the fill byte. Nothing is written when the chunk does not fit.
	pub fn add_chunk(&mut self, os: u8, subtype: u8, data: &[u8]) -> Result<ChunkEntry, ChunkError>
	{
		let index = self.count;
		if data.is_empty() || data.len() > MAX_CHUNK_LEN
		{
			return Err(ChunkError::Size{index, len: data.len()});
		}
		let stored = data.len() + 4;
		let pad = match data.len() % 4
		{
			0 => 0,
			rem => 4 - rem,
		};
		// leave room for one more entry and the terminator
		let limit = self.head + HEADROOM;
		let tail = match self.tail.checked_sub(stored + pad)
		{
			Some(tail) if tail > limit => tail,
			attempt => return Err(ChunkError::Collision{index, addr: attempt.unwrap_or(0), limit}),
		};
		self.tail = tail;
		self.buff[tail..tail + 4].copy_from_slice(&u32::to_le_bytes(stored as u32));
		self.buff[tail + 4..tail + stored].copy_from_slice(data);

		let entry = ChunkEntry{os: os & 0x7, subtype: subtype & 0xF, len: data.len() as u32, addr: (tail + 4) as u32};
		// no bounds check needed, `tail > head + HEADROOM`
		self.buff[self.head..self.head + ENTRY_LEN].copy_from_slice(&entry.encode());
		self.head += ENTRY_LEN;
		self.count += 1;
		debug!("chunk {index} at &{:X}, {} bytes (padding = {pad}), directory ends at &{:X}", entry.addr, entry.len, self.head);
		Ok(entry)
	}

	/// Terminates the chunk directory and writes the trailer, returning the finished image.
	pub fn finish(mut self) -> Result<Vec<u8>, WriteError>
	{
		self.put_u32(0)?;
		let size = self.buff.len();
		let base = size - TRAILER_LEN;
		self.buff[base + TRAILER_SIZE..base + TRAILER_CHECKSUM].copy_from_slice(&u32::to_le_bytes(size as u32));
		self.buff[base + TRAILER_MAGIC..size].copy_from_slice(&MAGIC);
		// covers everything but itself and the magic, so it goes last
		let checksum = image_checksum(&self.buff);
		debug!("checksum &{checksum:08X} over {} bytes", size - CHECKSUM_EXCLUDED);
		self.buff[base + TRAILER_CHECKSUM..base + TRAILER_MAGIC].copy_from_slice(&u32::to_le_bytes(checksum));
		Ok(self.buff)
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NewError
{
	Alignment(usize),
	TooSmall{need: usize, have: usize},
	TooLarge(usize),
}

impl fmt::Display for NewError
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self
		{
			Self::Alignment(size) => write!(f, "image size is not a whole number of words ({size})"),
			Self::TooSmall{need, have} => write!(f, "image too small (need {need}, have {have})"),
			Self::TooLarge(size) => write!(f, "image too large for 32-bit addressing ({size})"),
		}
	}
}

impl Error for NewError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WriteError
{
	Overflow{pos: usize, need: usize, have: usize},
	Misplaced{pos: usize},
}

impl fmt::Display for WriteError
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self
		{
			Self::Overflow{pos, need, have} => write!(f, "header overflow at &{pos:X} (need {need}, have {have})"),
			Self::Misplaced{pos} => write!(f, "header must start the image (directory already at &{pos:X})"),
		}
	}
}

impl Error for WriteError {}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ChunkError
{
	Size{index: usize, len: usize},
	Collision{index: usize, addr: usize, limit: usize},
}

impl fmt::Display for ChunkError
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self
		{
			Self::Size{index, len} => write!(f, "invalid size for chunk {index} ({len}, must be 1 to {MAX_CHUNK_LEN})"),
			Self::Collision{index, addr, limit} =>
			{
				write!(f, "chunk {index} at &{addr:X} collides with the chunk directory (ends at &{limit:X}), ROM too small")
			},
		}
	}
}

impl Error for ChunkError {}
