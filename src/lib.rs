//! Builds and inspects 5th column expansion card ROM images ("podule ROMs").

use tracing_subscriber::EnvFilter;

pub mod config;
pub mod image;
pub(crate) mod macros;
pub mod rom;

/// Logs to stderr; each `verbose` step raises the default level, `quiet` lowers it to errors only.
/// `RUST_LOG` takes precedence.
pub fn init_logging(verbose: u8, quiet: bool)
{
	let level = match verbose
	{
		_ if quiet => "error",
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
	tracing_subscriber::fmt().with_env_filter(filter).with_target(false).with_writer(std::io::stderr).init();
}
