use std::io::{
	Read,
	Result
};

use crate::texture::Color;

pub trait ReadBinExt: Read {
	/// Reads exactly N bytes into a fixed-size array
	#[inline]
	fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
		let mut buf = [0; N];
		self.read_exact(&mut buf)?;

		Ok(buf)
	}

	/// Reads a color stored as four bytes in R, G, B, A order
	#[inline]
	fn read_rgba(&mut self) -> Result<Color> {
		Ok(Color::from_rgba(self.read_array::<4>()?))
	}
}

impl<R> ReadBinExt for R
where
	R: Read + ?Sized,
{
}

#[cfg(test)]
mod tests {
	use std::io::ErrorKind;

	use super::*;

	#[test]
	fn test_read_array() {
		let mut data = &b"\x01\x00\x03rest"[..];
		assert_eq!([1, 0, 3], data.read_array::<3>().unwrap());
		assert_eq!(data, b"rest");
	}

	#[test]
	fn test_read_rgba() {
		let mut data = &[10, 200, 0, 255, 1][..];
		assert_eq!(Color::new(10, 200, 0, 255), data.read_rgba().unwrap());
		assert_eq!(data.read_rgba().unwrap_err().kind(), ErrorKind::UnexpectedEof);
	}
}
