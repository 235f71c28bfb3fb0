macro_rules!numeric_enum
{
	{
		$(#[$meta:meta])*
		$vis:vis enum $tname:ident for $numeric:ty | $error:ident
		{
			$($(#[$var_meta:meta])* $var_name:ident = $var_val:literal),+ $(,)?
		}
	} =>
	{
		$(#[$meta])*
		#[repr($numeric)]
		#[derive(Copy, Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
		$vis enum $tname
		{
			$($(#[$var_meta])* $var_name = $var_val,)+
		}

		impl TryFrom<$numeric> for $tname
		{
			type Error = $error;

			#[allow(non_upper_case_globals)]
			fn try_from(value: $numeric) -> Result<Self, $error>
			{
				$(const $var_name: $numeric = $tname::$var_name as $numeric;)+
				match value
				{
					$($var_name => Ok(Self::$var_name),)+
					_ => Err($error(value)),
				}
			}
		}

		impl From<$tname> for $numeric
		{
			fn from(value: $tname) -> $numeric
			{
				value as $numeric
			}
		}

		#[derive(Copy, Clone, Debug, Eq, PartialEq)]
		$vis struct $error(pub $numeric);

		impl core::fmt::Display for $error
		{
			fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result
			{
				write!(f, "no variant of {} for value {}", stringify!($tname), self.0)
			}
		}

		impl std::error::Error for $error {}
	};
}
pub(crate) use numeric_enum;
