use core::fmt;

use crate::macros::numeric_enum;

const IDENTITY_VALID: u8 = 0x80;
const OS_SHIFT: u32 = 4;
const OS_MASK: u8 = 0x07;
const SUBTYPE_MASK: u8 = 0x0F;
const LEN_SHIFT: u32 = 8;

numeric_enum!
{
	/// Operating system a chunk is meant for (3 bits of the identity byte).
	pub enum OsIdentity for u8 | OsIdentityError
	{
		RiscOs = 0,
		Unix = 2,
		Manufacturer = 6,
		DeviceData = 7,
	}
}

numeric_enum!
{
	pub enum RiscOsType for u8 | RiscOsTypeError
	{
		Loader = 0,
		Module = 1,
		BbcRom = 2,
		Sprite = 3,
	}
}

numeric_enum!
{
	/// Subtypes of [`OsIdentity::DeviceData`] chunks.
	pub enum DeviceData for u8 | DeviceDataError
	{
		Link = 0,
		Serial = 1,
		MfgDate = 2,
		ModStatus = 3,
		MfgPlace = 4,
		Description = 5,
		PartNumber = 6,
		MacAddress = 7,
		PcbRevision = 8,
		Empty = 15,
	}
}

impl DeviceData
{
	pub fn name(self) -> &'static str
	{
		match self
		{
			Self::Link => "Link to another chunk directory",
			Self::Serial => "Serial number",
			Self::MfgDate => "Date of manufacture",
			Self::ModStatus => "Modification status",
			Self::MfgPlace => "Place of manufacture",
			Self::Description => "Description",
			Self::PartNumber => "Part number",
			Self::MacAddress => "Ethernet MAC address",
			Self::PcbRevision => "PCB revision",
			Self::Empty => "Empty chunk",
		}
	}

	/// Whether the payload is a NUL-terminated string.
	pub fn is_text(self) -> bool
	{
		matches!(self, Self::Serial | Self::MfgDate | Self::ModStatus | Self::MfgPlace | Self::Description | Self::PartNumber)
	}
}

/// One entry of the chunk directory.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ChunkEntry
{
	pub os: u8,
	pub subtype: u8,
	/// Payload length, excluding the size prefix in front of the payload.
	pub len: u32,
	/// Address of the payload.
	pub addr: u32,
}

impl ChunkEntry
{
	pub fn identity_byte(&self) -> u8
	{
		IDENTITY_VALID | (self.os & OS_MASK) << OS_SHIFT | self.subtype & SUBTYPE_MASK
	}

	pub fn from_identity(identity: u8, len: u32, addr: u32) -> Self
	{
		Self{os: (identity >> OS_SHIFT) & OS_MASK, subtype: identity & SUBTYPE_MASK, len, addr}
	}

	pub fn encode(&self) -> [u8; 8]
	{
		let mut dst = [0u8; 8];
		dst[0..4].copy_from_slice(&u32::to_le_bytes(self.identity_byte() as u32 | self.len << LEN_SHIFT));
		dst[4..8].copy_from_slice(&u32::to_le_bytes(self.addr));
		dst
	}

	/// First address after the payload.
	pub fn end(&self) -> u64
	{
		self.addr as u64 + self.len as u64
	}

	pub fn kind(&self) -> ChunkKind
	{
		match OsIdentity::try_from(self.os)
		{
			Ok(OsIdentity::RiscOs) => match RiscOsType::try_from(self.subtype)
			{
				Ok(ty) => ChunkKind::RiscOs(ty),
				Err(..) => ChunkKind::Reserved{os: self.os, subtype: self.subtype},
			},
			Ok(OsIdentity::Unix) if self.subtype == 0 => ChunkKind::UnixLoader,
			Ok(OsIdentity::Manufacturer) => ChunkKind::Manufacturer(self.subtype),
			Ok(OsIdentity::DeviceData) => match DeviceData::try_from(self.subtype)
			{
				Ok(dd) => ChunkKind::Device(dd),
				Err(..) => ChunkKind::Reserved{os: self.os, subtype: self.subtype},
			},
			_ => ChunkKind::Reserved{os: self.os, subtype: self.subtype},
		}
	}
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChunkKind
{
	RiscOs(RiscOsType),
	UnixLoader,
	Manufacturer(u8),
	Device(DeviceData),
	Reserved{os: u8, subtype: u8},
}

impl fmt::Display for ChunkKind
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self
		{
			Self::RiscOs(RiscOsType::Loader) => f.write_str("RISC OS loader"),
			Self::RiscOs(RiscOsType::Module) => f.write_str("RISC OS relocatable module"),
			Self::RiscOs(RiscOsType::BbcRom) => f.write_str("RISC OS BBC ROM"),
			Self::RiscOs(RiscOsType::Sprite) => f.write_str("RISC OS sprite"),
			Self::UnixLoader => f.write_str("UNIX loader"),
			Self::Manufacturer(subtype) => write!(f, "Manufacturer-defined data (subtype {subtype})"),
			Self::Device(dd) => write!(f, "Device data: {}", dd.name()),
			Self::Reserved{os, subtype} => write!(f, "Reserved (type {os}, subtype {subtype})"),
		}
	}
}
