//! Binary layout of 5th column expansion card ROMs.
//!
//! An image starts with the expansion card identity (ECID) and the chunk directory, which grows
//! upwards. Chunk payloads are allocated downwards from the trailer, which occupies the final 16
//! bytes and holds the image length, an additive checksum and the `ExtnROM0` magic.

pub mod build;
pub mod checksum;
pub mod chunk;
pub mod read;

pub const KIB: usize = 1024;
pub const FILL_BYTE: u8 = 0xFF;
pub const ECID_LEN: usize = 16;
pub const ECID_SHORT_LEN: usize = 8;
pub const ENTRY_LEN: usize = 8;
pub const TERMINATOR_LEN: usize = 4;
/// Space that must stay free between directory and payloads after every allocation.
pub const HEADROOM: usize = ENTRY_LEN + TERMINATOR_LEN;
pub const MAX_CHUNK_LEN: usize = 0xFFFFFE;
pub const TRAILER_LEN: usize = 16;
pub const MAGIC: [u8; 8] = *b"ExtnROM0";
// offsets from the start of the trailer
const TRAILER_SIZE: usize = 0x0;
const TRAILER_CHECKSUM: usize = 0x4;
const TRAILER_MAGIC: usize = 0x8;
/// Bytes at the end of the image not covered by the checksum (checksum and magic).
pub const CHECKSUM_EXCLUDED: usize = TRAILER_LEN - TRAILER_CHECKSUM;

pub const DEFAULT_PRODUCT: u16 = 0x87;

const ID_NOT_ACORN: u8 = 0x80;
const ID_FIQ: u8 = 0x04;
const ID_IRQ: u8 = 0x01;
const ID_RESERVED: u8 = 0x7A;
const CAP_CHUNK_DIR: u8 = 0x01;
const CAP_INT_PTRS: u8 = 0x02;
const CAP_WIDTH_SHIFT: u32 = 2;
const CAP_WIDTH_MASK: u8 = 0x03;
const CAP_RESERVED: u8 = 0xF0;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BusWidth
{
	Byte = 0,
	Half = 1,
	Word = 2,
}

impl BusWidth
{
	pub fn bits(self) -> u32
	{
		8 << self as u32
	}
}

/// Expansion card identity, the fixed header at the very start of the ROM.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Ecid
{
	pub irq: bool,
	pub fiq: bool,
	pub chunk_dir: bool,
	pub int_ptrs: bool,
	pub width: BusWidth,
	pub product: u16,
	pub manufacturer: u16,
	pub country: u8,
}

impl Ecid
{
	/// Identity of a byte-wide, interrupt-less card with a chunk directory.
	pub fn new(product: u16, manufacturer: u16, country: u8) -> Self
	{
		Self{irq: false, fiq: false, chunk_dir: true, int_ptrs: true, width: BusWidth::Byte, product, manufacturer, country}
	}

	pub fn id_byte(&self) -> u8
	{
		let mut id = 0;
		if self.fiq {id |= ID_FIQ;}
		if self.irq {id |= ID_IRQ;}
		id
	}

	pub fn cap_byte(&self) -> u8
	{
		let mut cap = (self.width as u8) << CAP_WIDTH_SHIFT;
		if self.chunk_dir {cap |= CAP_CHUNK_DIR;}
		if self.int_ptrs {cap |= CAP_INT_PTRS;}
		cap
	}

	/// Offset of the first chunk directory entry.
	pub fn len(&self) -> usize
	{
		if self.int_ptrs {ECID_LEN} else {ECID_SHORT_LEN}
	}
}

impl Default for Ecid
{
	fn default() -> Self
	{
		Self::new(DEFAULT_PRODUCT, 0, 0)
	}
}

/// The Extension ROM trailer occupying the last 16 bytes of an image.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Trailer
{
	pub size: u32,
	pub checksum: u32,
}
