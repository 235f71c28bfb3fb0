use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;

use podrom::print_err;
use podrom::rom::read::{Chunk, Image};

/// Describe a 5th column expansion card ROM image
#[derive(Parser)]
#[command(name = "podinfo", version)]
struct Args
{
	/// ROM image to inspect
	image: PathBuf,

	/// Save every chunk's data to DIR/NN.bin
	#[arg(short, long, value_name = "DIR")]
	extract: Option<PathBuf>,

	/// Log more details
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn print_chunk(chunk: &Chunk<'_>)
{
	let entry = &chunk.entry;
	println!("Chunk {}:", chunk.index + 1);
	println!("  Offset &{:X}, {} bytes (ends at &{:X})", entry.addr, entry.len, entry.end());
	println!("  {}", chunk.kind());
	if let Some(text) = chunk.text()
	{
		println!("    '{text}'");
	}
	if let Some(mac) = chunk.mac_address()
	{
		let mac = mac.iter().map(|b| format!("{b:02X}")).collect::<Vec<_>>().join("-");
		println!("    {mac}");
	}
	if let Some(rev) = chunk.pcb_revision()
	{
		println!("    {rev}");
	}
	if let Some((title, help)) = chunk.module_title()
	{
		if let Some(title) = title {println!("    {title}");}
		if let Some(help) = help {println!("    {help}");}
	}
}

fn extract(dir: &Path, chunk: &Chunk<'_>) -> std::io::Result<PathBuf>
{
	let path = dir.join(format!("{:02}.bin", chunk.index + 1));
	fs::write(&path, chunk.data)?;
	Ok(path)
}

pub fn main() -> ExitCode
{
	let args = Args::parse();
	podrom::init_logging(args.verbose, false);
	let buff = match fs::read(&args.image)
	{
		Ok(buff) => buff,
		Err(e) =>
		{
			print_err!(e, "Could not read {:?}", args.image);
			return ExitCode::FAILURE;
		},
	};
	let image = match Image::parse(&buff)
	{
		Ok(image) => image,
		Err(e) =>
		{
			print_err!(e, "Could not parse {:?}", args.image);
			return ExitCode::FAILURE;
		},
	};
	println!("{} bytes read", image.len());

	let ecid = &image.ecid;
	println!("--- EXPANSION CARD IDENTITY ---");
	println!("  Acorn-conformant {}, {}", if ecid.fiq {"w/FIQ"} else {"no FIQ"}, if ecid.irq {"w/IRQ"} else {"no IRQ"});
	println!("  Chunk directory  {}", if ecid.chunk_dir {"present"} else {"not present"});
	println!("  Interrupt ptrs   {}", if ecid.int_ptrs {"present"} else {"not present"});
	println!("  Bus width        {} bits", ecid.width.bits());
	println!("  Product ID       &{:04X}", ecid.product);
	println!("  Manufacturer ID  &{:04X}", ecid.manufacturer);
	println!("  Country code     &{:02X}", ecid.country);
	println!();

	let mut ok = true;
	if ecid.chunk_dir
	{
		println!("--- CHUNK DIRECTORY ---");
		for chunk in image.chunks()
		{
			match chunk
			{
				Ok(chunk) =>
				{
					print_chunk(&chunk);
					if let Some(dir) = &args.extract
					{
						match extract(dir, &chunk)
						{
							Ok(path) => println!("  Saved as {path:?}"),
							Err(e) =>
							{
								print_err!(e, "Could not extract chunk {}", chunk.index + 1);
								ok = false;
							},
						}
					}
					println!();
				},
				Err(e) =>
				{
					print_err!(e, "Bad chunk directory");
					ok = false;
				},
			}
		}
	}

	println!("--- EXTENSION ROM TRAILER ---");
	match &image.trailer
	{
		Some(trailer) =>
		{
			println!("  ROM size  {} bytes", trailer.size);
			println!("  Checksum  &{:08X}", trailer.checksum);
			match trailer.verify(&buff)
			{
				Ok(()) => println!("    OK"),
				Err(e) =>
				{
					println!("    BAD: {e}");
					ok = false;
				},
			}
		},
		None =>
		{
			println!("  not present");
			ok = false;
		},
	}
	if ok {ExitCode::SUCCESS} else {ExitCode::FAILURE}
}
