/// Prints an error and its chain of sources to stderr.
#[macro_export]
macro_rules!print_err
{
	($err:expr, $($print:expr),+) =>
	{
		{
			use std::error::Error;
			use std::io::Write;
			let err = &$err;
			let mut stderr = std::io::stderr().lock();
			let _ = write!(stderr, $($print),+);
			let _ = write!(stderr, ": {}\n", err);
			let mut source = err.source();
			while let Some(src) = source
			{
				let _ = write!(stderr, "\tsource: {src}\n");
				source = src.source();
			}
		}
	};
}
