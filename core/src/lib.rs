#[cfg(feature = "io_ext")]
pub mod io_ext;

pub mod texture;

/// Converts a 4-byte string into a 32-bit big endian integer.
/// Byte strings longer than 4 bytes are truncated.
#[macro_export]
macro_rules! tag4 {
	($b4: literal) => {
		u32::from_be_bytes([$b4[0], $b4[1], $b4[2], $b4[3]])
	}
}

#[cfg(test)]
mod tests {
	#[test]
	fn test_tag4() {
		assert_eq!(tag4!(b"TIMP"), 0x54494D50);
		assert_eq!(tag4!(b"TIMPxx"), tag4!(b"TIMP"));
	}
}
