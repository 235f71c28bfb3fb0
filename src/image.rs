//! Builds a complete ROM image from a [`Config`].

use core::fmt;
use std::error::Error;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::{Config, ConfigError, ManufacturerData};
use crate::rom::build::{ChunkError, ImageBuilder, NewError, WriteError};
use crate::rom::chunk::{ChunkEntry, DeviceData, OsIdentity, RiscOsType};


/// A finished image and the directory entries written into it.
#[derive(Clone, Debug)]
pub struct Built
{
	pub data: Vec<u8>,
	pub chunks: Vec<ChunkEntry>,
}

/// Relative paths in a configuration are relative to the configuration file.
pub fn resolve(base: &Path, path: &Path) -> PathBuf
{
	if path.is_absolute() {path.to_path_buf()} else {base.join(path)}
}

pub fn build(config: &Config, base: &Path) -> Result<Built, BuildError>
{
	let mut rom = ImageBuilder::with_kib(config.romsize)?;
	rom.write_header(&config.ecid())?;
	let mut chunks = Vec::new();
	if let Some(md) = &config.manufacturer_data
	{
		chunks.extend(add_metadata(&mut rom, md)?);
	}
	chunks.extend(add_modules(&mut rom, &config.modules, base)?);
	debug!("{} bytes left between directory and chunks", rom.tail() - rom.head());
	let data = rom.finish()?;
	Ok(Built{data, chunks})
}

/// Text for a device data chunk: Latin-1 with a NUL terminator.
pub fn encode_text(field: DeviceData, value: &str) -> Result<Vec<u8>, BuildError>
{
	let mut data = Vec::with_capacity(value.len() + 1);
	for ch in value.chars()
	{
		match u8::try_from(ch)
		{
			Ok(b) => data.push(b),
			Err(..) => return Err(BuildError::Encoding{field, ch}),
		}
	}
	data.push(0);
	Ok(data)
}

pub fn add_metadata(rom: &mut ImageBuilder, md: &ManufacturerData) -> Result<Vec<ChunkEntry>, BuildError>
{
	let mut chunks = Vec::new();
	for (field, value) in md.fields()
	{
		info!("adding chunk {}: {value:?}", field.name());
		let data = encode_text(field, value)?;
		match rom.add_chunk(OsIdentity::DeviceData.into(), field.into(), &data)
		{
			Ok(entry) =>
			{
				info!("  at address &{:X}, length {}", entry.addr, entry.len);
				chunks.push(entry);
			},
			Err(err) => return Err(BuildError::Metadata{field, err}),
		}
	}
	Ok(chunks)
}

pub fn add_modules(rom: &mut ImageBuilder, modules: &[PathBuf], base: &Path) -> Result<Vec<ChunkEntry>, BuildError>
{
	let mut chunks = Vec::new();
	for module in modules
	{
		let path = resolve(base, module);
		info!("adding module {path:?}");
		let data = fs::read(&path).map_err(|err| BuildError::Module{path: path.clone(), err})?;
		match rom.add_chunk(OsIdentity::RiscOs.into(), RiscOsType::Module.into(), &data)
		{
			Ok(entry) =>
			{
				info!("  at address &{:X}, length {}", entry.addr, entry.len);
				chunks.push(entry);
			},
			Err(err) => return Err(BuildError::Chunk{path, err}),
		}
	}
	Ok(chunks)
}

/// Replaces `path` with `data` in one step, so a failed save leaves no partial file behind.
pub fn save(data: &[u8], path: &Path) -> Result<(), BuildError>
{
	let wrap = |err: io::Error| BuildError::Output{path: path.to_path_buf(), err};
	let dir = match path.parent()
	{
		Some(dir) if !dir.as_os_str().is_empty() => dir,
		_ => Path::new("."),
	};
	let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
	tmp.write_all(data).map_err(wrap)?;
	tmp.as_file().sync_all().map_err(wrap)?;
	tmp.persist(path).map_err(|e| wrap(e.error))?;
	Ok(())
}

/// Loads `config_path`, builds the image and writes it to `output` (or the configured filename).
pub fn run(config_path: &Path, output: Option<&Path>) -> Result<(PathBuf, Built), BuildError>
{
	let config = Config::load(config_path)?;
	let base = config_path.parent().unwrap_or(Path::new(""));
	let built = build(&config, base)?;
	let path = match output
	{
		Some(path) => path.to_path_buf(),
		None => resolve(base, &config.filename),
	};
	save(&built.data, &path)?;
	info!("saved {} bytes to {path:?}", built.data.len());
	Ok((path, built))
}

#[derive(Debug)]
pub enum BuildError
{
	Config(ConfigError),
	Size(NewError),
	Header(WriteError),
	Encoding{field: DeviceData, ch: char},
	Metadata{field: DeviceData, err: ChunkError},
	Module{path: PathBuf, err: io::Error},
	Chunk{path: PathBuf, err: ChunkError},
	Output{path: PathBuf, err: io::Error},
}

impl fmt::Display for BuildError
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
	{
		match self
		{
			Self::Config(..) => f.write_str("configuration error"),
			Self::Size(..) => f.write_str("invalid ROM size"),
			Self::Header(..) => f.write_str("could not write header"),
			Self::Encoding{field, ch} => write!(f, "{} contains {ch:?}, which is not Latin-1", field.name()),
			Self::Metadata{field, ..} => write!(f, "could not add {}", field.name()),
			Self::Module{path, ..} => write!(f, "could not read module {path:?}"),
			Self::Chunk{path, ..} => write!(f, "could not add module {path:?}"),
			Self::Output{path, ..} => write!(f, "could not write {path:?}"),
		}
	}
}

impl Error for BuildError
{
	fn source(&self) -> Option<&(dyn Error + 'static)>
	{
		match self
		{
			Self::Config(err) => Some(err),
			Self::Size(err) => Some(err),
			Self::Header(err) => Some(err),
			Self::Encoding{..} => None,
			Self::Metadata{err, ..} | Self::Chunk{err, ..} => Some(err),
			Self::Module{err, ..} | Self::Output{err, ..} => Some(err),
		}
	}
}

impl From<ConfigError> for BuildError
{
	fn from(value: ConfigError) -> Self
	{
		Self::Config(value)
	}
}

impl From<NewError> for BuildError
{
	fn from(value: NewError) -> Self
	{
		Self::Size(value)
	}
}

impl From<WriteError> for BuildError
{
	fn from(value: WriteError) -> Self
	{
		Self::Header(value)
	}
}
