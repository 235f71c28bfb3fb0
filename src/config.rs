//! Build configuration, read from a YAML file.
//!
//! ```yaml
//! romsize: 32            # KiB
//! product: 0x87
//! manufacturer: 0
//! country: 0
//! filename: rom.bin
//! manufacturerData:
//!   serial: "AB12"
//!   description: "Test card"
//! modules:
//!   - module.mod
//! ```

use core::fmt;
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::rom::{DEFAULT_PRODUCT, Ecid, KIB};
use crate::rom::chunk::DeviceData;

pub const DEFAULT_FILENAME: &str = "rom.bin";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConfig
{
	romsize: Option<u32>,
	product: Option<u16>,
	manufacturer: Option<u16>,
	country: Option<u8>,
	filename: Option<PathBuf>,
	manufacturer_data: Option<ManufacturerData>,
	modules: Option<Vec<PathBuf>>,
}

/// Device data strings, stored as chunks in the order of [`ManufacturerData::fields`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ManufacturerData
{
	pub serial: Option<String>,
	pub mfg_date: Option<String>,
	pub mod_status: Option<String>,
	pub mfg_place: Option<String>,
	pub description: Option<String>,
	pub part_number: Option<String>,
}

impl ManufacturerData
{
	/// Fields that are present, with the device data subtype each is stored as.
	pub fn fields(&self) -> impl Iterator<Item = (DeviceData, &str)> + '_
	{
		[
			(DeviceData::Serial, &self.serial),
			(DeviceData::MfgDate, &self.mfg_date),
			(DeviceData::ModStatus, &self.mod_status),
			(DeviceData::MfgPlace, &self.mfg_place),
			(DeviceData::Description, &self.description),
			(DeviceData::PartNumber, &self.part_number),
		]
		.into_iter()
		.filter_map(|(kind, value)| value.as_deref().map(|v| (kind, v)))
	}
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config
{
	/// Image size in KiB.
	pub romsize: u32,
	pub product: u16,
	pub manufacturer: u16,
	pub country: u8,
	pub filename: PathBuf,
	pub manufacturer_data: Option<ManufacturerData>,
	pub modules: Vec<PathBuf>,
}

impl Config
{
	pub fn parse(src: &str) -> Result<Self, ConfigError>
	{
		let raw: RawConfig = serde_yaml::from_str(src).map_err(ConfigError::Parse)?;
		let romsize = raw.romsize.ok_or(ConfigError::Missing("romsize"))?;
		let modules = raw.modules.ok_or(ConfigError::Missing("modules"))?;
		if romsize == 0 || (romsize as u64) * (KIB as u64) > u32::MAX as u64
		{
			return Err(ConfigError::RomSize(romsize));
		}
		Ok(Self
		{
			romsize,
			product: raw.product.unwrap_or(DEFAULT_PRODUCT),
			manufacturer: raw.manufacturer.unwrap_or(0),
			country: raw.country.unwrap_or(0),
			filename: raw.filename.unwrap_or_else(|| PathBuf::from(DEFAULT_FILENAME)),
			manufacturer_data: raw.manufacturer_data,
			modules,
		})
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError>
	{
		let src = fs::read_to_string(path).map_err(|err| ConfigError::Io{path: path.to_path_buf(), err})?;
		Self::parse(&src)
	}

	/// Image size in bytes.
	pub fn size(&self) -> usize
	{
		self.romsize as usize * KIB
	}

	pub fn ecid(&self) -> Ecid
	{
		Ecid::new(self.product, self.manufacturer, self.country)
	}
}

#[derive(Debug)]
pub enum ConfigError
{
	Io{path: PathBuf, err: io::Error},
	Parse(serde_yaml::Error),
	Missing(&'static str),
	RomSize(u32),
}

impl fmt::Display for ConfigError
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self
		{
			Self::Io{path, ..} => write!(f, "could not read configuration {path:?}"),
			Self::Parse(..) => f.write_str("malformed configuration"),
			Self::Missing(field) => write!(f, "missing required field {field:?}"),
			Self::RomSize(size) => write!(f, "unsupported ROM size ({size} KiB)"),
		}
	}
}

impl Error for ConfigError
{
	fn source(&self) -> Option<&(dyn Error + 'static)>
	{
		match self
		{
			Self::Io{err, ..} => Some(err),
			Self::Parse(err) => Some(err),
			_ => None,
		}
	}
}

#[cfg(test)]
mod test
{
	use super::*;

	#[test]
	fn minimal()
	{
		let config = Config::parse("romsize: 4\nmodules:\n  - a.mod\n").unwrap();
		assert_eq!(config.romsize, 4);
		assert_eq!(config.size(), 4096);
		assert_eq!(config.product, 0x87);
		assert_eq!(config.manufacturer, 0);
		assert_eq!(config.country, 0);
		assert_eq!(config.filename, PathBuf::from("rom.bin"));
		assert_eq!(config.manufacturer_data, None);
		assert_eq!(config.modules, vec![PathBuf::from("a.mod")]);
		assert_eq!(config.ecid(), Ecid::default());
	}

	#[test]
	fn full()
	{
		let src = "\
romsize: 32
product: 0x123
manufacturer: 77
country: 1
filename: out/card.rom
manufacturerData:
  serial: AB12
  partNumber: PN-1
  description: Test card
modules:
  - one.mod
  - two.mod
";
		let config = Config::parse(src).unwrap();
		assert_eq!(config.product, 0x123);
		assert_eq!(config.manufacturer, 77);
		assert_eq!(config.country, 1);
		assert_eq!(config.filename, PathBuf::from("out/card.rom"));
		assert_eq!(config.modules.len(), 2);
		let md = config.manufacturer_data.unwrap();
		let fields: Vec<_> = md.fields().collect();
		// in subtype order, not file order
		assert_eq!(fields, vec![(DeviceData::Serial, "AB12"), (DeviceData::Description, "Test card"), (DeviceData::PartNumber, "PN-1")]);
	}

	#[test]
	fn empty_modules()
	{
		let config = Config::parse("romsize: 1\nmodules: []\n").unwrap();
		assert!(config.modules.is_empty());
	}

	#[test]
	fn missing()
	{
		assert!(matches!(Config::parse("modules: []\n"), Err(ConfigError::Missing("romsize"))));
		assert!(matches!(Config::parse("romsize: 4\n"), Err(ConfigError::Missing("modules"))));
	}

	#[test]
	fn bad_size()
	{
		assert!(matches!(Config::parse("romsize: 0\nmodules: []\n"), Err(ConfigError::RomSize(0))));
		assert!(matches!(Config::parse("romsize: 4194304\nmodules: []\n"), Err(ConfigError::RomSize(4194304))));
		assert!(matches!(Config::parse("romsize: 4194303\nmodules: []\n"), Ok(..)));
	}

	#[test]
	fn malformed()
	{
		assert!(matches!(Config::parse("romsize: [4\n"), Err(ConfigError::Parse(..))));
		assert!(matches!(Config::parse("romsize: big\nmodules: []\n"), Err(ConfigError::Parse(..))));
		assert!(matches!(Config::parse("romsize: 4\nproduct: 70000\nmodules: []\n"), Err(ConfigError::Parse(..))));
	}

	#[test]
	fn unreadable()
	{
		let err = Config::load(Path::new("/nonexistent/config.yml")).unwrap_err();
		assert!(matches!(err, ConfigError::Io{..}));
		assert!(err.source().is_some());
	}
}
