use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use podrom::image;
use podrom::print_err;

/// Build a 5th column expansion card ROM image
#[derive(Parser)]
#[command(name = "mkrom", version)]
struct Args
{
	/// ROM description (YAML)
	#[arg(default_value = "config.yml")]
	config: PathBuf,

	/// Output file, instead of the configured filename
	#[arg(short, long)]
	output: Option<PathBuf>,

	/// Log progress (twice for layout details)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,

	/// Only report errors
	#[arg(short, long, conflicts_with = "verbose")]
	quiet: bool,
}

pub fn main() -> ExitCode
{
	let args = Args::parse();
	podrom::init_logging(args.verbose, args.quiet);
	match image::run(&args.config, args.output.as_deref())
	{
		Ok((path, built)) =>
		{
			if !args.quiet
			{
				println!("Built {} ({} chunks, {} bytes)", path.display(), built.chunks.len(), built.data.len());
			}
			ExitCode::SUCCESS
		},
		Err(e) =>
		{
			print_err!(e, "Could not build ROM from {:?}", args.config);
			ExitCode::FAILURE
		},
	}
}
