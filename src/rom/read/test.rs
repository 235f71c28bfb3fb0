use super::*;

use crate::rom::build::ImageBuilder;

fn module(title: &str, help: &str) -> Vec<u8>
{
	let mut data = vec![0u8; 0x1C];
	let title_off = data.len();
	data.extend_from_slice(title.as_bytes());
	data.push(0);
	let help_off = data.len();
	data.extend_from_slice(help.as_bytes());
	data.push(0);
	data[MODULE_TITLE..MODULE_TITLE + 4].copy_from_slice(&u32::to_le_bytes(title_off as u32));
	data[MODULE_HELP..MODULE_HELP + 4].copy_from_slice(&u32::to_le_bytes(help_off as u32));
	data
}

fn sample() -> Vec<u8>
{
	let mut rom = ImageBuilder::with_kib(4).unwrap();
	rom.write_header(&Ecid::new(0x87, 0x55, 1)).unwrap();
	rom.add_chunk(7, 1, b"AB12\0").unwrap();
	rom.add_chunk(7, 7, &[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]).unwrap();
	rom.add_chunk(0, 1, &module("Podule", "Podule\t1.00 (01 Jan 2024)")).unwrap();
	rom.finish().unwrap()
}

#[test]
fn ecid()
{
	let image = sample();
	let ecid = Ecid::read(&image).unwrap();
	assert_eq!(ecid, Ecid::new(0x87, 0x55, 1));
	assert_eq!(ecid.width.bits(), 8);
	assert!(!ecid.irq && !ecid.fiq);
}

#[test]
fn ecid_invalid()
{
	assert_eq!(Ecid::read(&[0u8; 4]), Err(ReadError::Underflow{need: 8, have: 4}));
	assert_eq!(Ecid::read(&[0x80, 0x03, 0, 0, 0, 0, 0, 0]), Err(ReadError::NotConformant(0x80)));
	assert_eq!(Ecid::read(&[0x02, 0x03, 0, 0, 0, 0, 0, 0]), Err(ReadError::Reserved{pos: 0, value: 0x02}));
	assert_eq!(Ecid::read(&[0x00, 0x13, 0, 0, 0, 0, 0, 0]), Err(ReadError::Reserved{pos: 1, value: 0x13}));
	assert_eq!(Ecid::read(&[0x00, 0x0D, 0, 0, 0, 0, 0, 0]), Err(ReadError::Reserved{pos: 1, value: 0x0D}));
	assert_eq!(Ecid::read(&[0x00, 0x03, 1, 0, 0, 0, 0, 0]), Err(ReadError::Reserved{pos: 2, value: 1}));
	// interrupt pointers announced but missing
	assert_eq!(Ecid::read(&[0x00, 0x03, 0, 0, 0, 0, 0, 0]), Err(ReadError::Underflow{need: 16, have: 8}));
	let ecid = Ecid::read(&[0x05, 0x09, 0, 0x34, 0x12, 0, 0, 0]).unwrap();
	assert!(ecid.irq && ecid.fiq && ecid.chunk_dir && !ecid.int_ptrs);
	assert_eq!(ecid.width, BusWidth::Word);
	assert_eq!(ecid.product, 0x1234);
}

#[test]
fn directory()
{
	let image = sample();
	let parsed = Image::parse(&image).unwrap();
	let chunks = parsed.chunks().collect::<Result<Vec<_>, _>>().unwrap();
	assert_eq!(chunks.len(), 3);
	assert_eq!(chunks[0].index, 0);
	assert_eq!(chunks[0].kind(), ChunkKind::Device(DeviceData::Serial));
	assert_eq!(chunks[0].data, b"AB12\0");
	assert_eq!(chunks[0].text().as_deref(), Some("AB12"));
	assert_eq!(chunks[1].mac_address(), Some([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]));
	assert_eq!(chunks[1].text(), None);
	assert_eq!(chunks[2].kind(), ChunkKind::RiscOs(RiscOsType::Module));
	let (title, help) = chunks[2].module_title().unwrap();
	assert_eq!(title.as_deref(), Some("Podule"));
	assert_eq!(help.as_deref(), Some("Podule\t1.00 (01 Jan 2024)"));
	assert_eq!(chunks[0].module_title(), None);
	for chunk in &chunks
	{
		assert!(chunk.entry.end() <= (image.len() - TRAILER_LEN) as u64);
	}
}

#[test]
fn trailer()
{
	let image = sample();
	let trailer = Trailer::read(&image).unwrap();
	assert_eq!(trailer.size, 4096);
	assert_eq!(trailer.checksum, image_checksum(&image));
	assert_eq!(Image::parse(&image).unwrap().verify(), Ok(()));
}

#[test]
fn corrupted()
{
	let mut image = sample();
	image[2000] ^= 0x01;
	let trailer = Trailer::read(&image).unwrap();
	assert!(matches!(trailer.verify(&image), Err(ReadError::Checksum{..})));
	// a damaged magic hides the trailer
	let mut image = sample();
	image[4090] = b'e';
	assert_eq!(Trailer::read(&image), None);
	assert_eq!(Image::parse(&image).unwrap().verify(), Err(ReadError::NoTrailer));
}

#[test]
fn size_mismatch()
{
	let mut shifted = vec![0xFFu8; 1024];
	shifted.extend_from_slice(&sample());
	let trailer = Trailer::read(&shifted).unwrap();
	assert_eq!(trailer.verify(&shifted), Err(ReadError::SizeMismatch{stored: 4096, have: 5120}));
}

#[test]
fn directory_errors()
{
	let mut image = sample();
	// clear the MSB of the first identity byte
	image[16] = 0x71;
	let mut chunks = Image::parse(&image).unwrap().chunks();
	assert_eq!(chunks.next(), Some(Err(ReadError::Identity{index: 0, pos: 16, value: 0x71})));
	assert_eq!(chunks.next(), None);

	let mut image = sample();
	image[20..24].copy_from_slice(&u32::to_le_bytes(4094));
	let mut chunks = Image::parse(&image).unwrap().chunks();
	assert_eq!(chunks.next(), Some(Err(ReadError::DataRange{index: 0, addr: 4094, len: 5, have: 4096})));

	let mut image = vec![0xFFu8; 20];
	image[..16].copy_from_slice(&[0x00, 0x03, 0, 0x87, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);
	let mut chunks = Image::parse(&image).unwrap().chunks();
	assert_eq!(chunks.next(), Some(Err(ReadError::Truncated{index: 0, pos: 16})));
}

#[test]
fn no_directory()
{
	let mut image = sample();
	image[1] = 0x02;
	assert_eq!(Image::parse(&image).unwrap().chunks().count(), 0);
}

#[test]
fn pcb_revision()
{
	let mut rom = ImageBuilder::with_kib(1).unwrap();
	rom.write_header(&Ecid::default()).unwrap();
	rom.add_chunk(7, 8, &u32::to_le_bytes(3)).unwrap();
	let image = rom.finish().unwrap();
	let chunk = Image::parse(&image).unwrap().chunks().next().unwrap().unwrap();
	assert_eq!(chunk.kind().to_string(), "Device data: PCB revision");
	assert_eq!(chunk.pcb_revision(), Some(3));
}

#[test]
fn word_bounds()
{
	assert_eq!(read_u32(&[1, 2, 3, 4], 0), Some(0x04030201));
	assert_eq!(read_u32(&[1, 2, 3, 4], 1), None);
	assert_eq!(read_u32(&[1, 2, 3], 0), None);
	assert_eq!(read_u32(&[1, 2, 3, 4], usize::MAX - 1), None);
}

#[test]
fn short_payloads()
{
	let mut rom = ImageBuilder::with_kib(1).unwrap();
	rom.write_header(&Ecid::default()).unwrap();
	rom.add_chunk(7, 8, &[1, 2]).unwrap();
	rom.add_chunk(7, 7, &[1, 2, 3]).unwrap();
	let image = rom.finish().unwrap();
	let chunks = Image::parse(&image).unwrap().chunks().collect::<Result<Vec<_>, _>>().unwrap();
	assert_eq!(chunks[0].pcb_revision(), None);
	assert_eq!(chunks[1].mac_address(), None);
}
