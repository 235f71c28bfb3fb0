use crate::rom::CHECKSUM_EXCLUDED;

/// Wrapping 32-bit sum of little-endian words.
pub struct Checksum(u32);

impl Checksum
{
	pub fn new() -> Self
	{
		Self(0)
	}

	pub fn update(&mut self, word: u32)
	{
		self.0 = self.0.wrapping_add(word);
	}

	/// Adds every word of `value`, a trailing partial word is zero extended.
	pub fn update_slice(&mut self, value: &[u8])
	{
		let mut words = value.chunks_exact(4);
		for w in &mut words
		{
			self.update(u32::from_le_bytes([w[0], w[1], w[2], w[3]]));
		}
		let rest = words.remainder();
		if !rest.is_empty()
		{
			let mut tmp = [0u8; 4];
			tmp[..rest.len()].copy_from_slice(rest);
			self.update(u32::from_le_bytes(tmp));
		}
	}

	pub fn get_value(&self) -> u32
	{
		self.0
	}
}

impl Default for Checksum
{
	fn default() -> Self
	{
		Self::new()
	}
}

/// Checksum of a whole image: everything but the stored checksum and the magic.
pub fn image_checksum(image: &[u8]) -> u32
{
	let mut sum = Checksum::new();
	sum.update_slice(&image[..image.len().saturating_sub(CHECKSUM_EXCLUDED)]);
	sum.get_value()
}

#[cfg(test)]
mod test
{
	use super::*;

	#[test]
	fn words()
	{
		let mut sum = Checksum::new();
		sum.update_slice(&[0x01, 0x02, 0x03, 0x04, 0x10, 0x00, 0x00, 0x00]);
		assert_eq!(sum.get_value(), 0x04030211);
	}

	#[test]
	fn wraps()
	{
		let mut sum = Checksum::new();
		sum.update(0xFFFFFFFF);
		sum.update(0x00000002);
		assert_eq!(sum.get_value(), 1);
	}

	#[test]
	fn partial_word()
	{
		let mut sum = Checksum::default();
		sum.update_slice(&[0x01, 0x00, 0x00, 0x00, 0xAA, 0xBB]);
		assert_eq!(sum.get_value(), 0x0000BBAB);
	}

	#[test]
	fn skips_checksum_and_magic()
	{
		let mut image = [0u8; 32];
		image[0] = 5;
		// the stored size field is included
		image[16] = 7;
		// checksum and magic are not
		image[20..32].fill(0xFF);
		assert_eq!(image_checksum(&image), 12);
	}
}
