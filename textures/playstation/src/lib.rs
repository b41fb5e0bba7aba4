pub mod swizzle;
pub mod timp;

use std::{
	fs,
	io::Cursor,
	path::Path
};

use tipkit_core::texture::Texture;

use swizzle::unswizzle;
use timp::*;

/// Decodes an in-memory TIMP texture into an RGBA texture
#[cfg(feature = "import")]
pub fn decode_tip(data: &[u8]) -> Result<Texture, TIMPImportError> {
	decode_tip_info(data).map(|(texture, _)| texture)
}

/// Like [`decode_tip`], also returning the decode details
#[cfg(feature = "import")]
pub fn decode_tip_info(data: &[u8]) -> Result<(Texture, TIMPInfo), TIMPImportError> {
	let tex = TIMPTexture::read(&mut Cursor::new(data))?;

	let mut texture = Texture::new(tex.header.width as usize, tex.header.height as usize);
	unswizzle(&mut texture, tex.geometry.chunk_width, tex.geometry.chunk_height, tex.data.palette(),
		tex.data.indices());

	Ok((texture, tex.info()))
}

#[cfg(feature = "import")]
pub fn read_tip<P>(filepath: P) -> Result<Texture, TIMPImportError>
where
	P: AsRef<Path>,
{
	let input = fs::read(filepath)?;
	decode_tip(&input)
}

#[cfg(test)]
mod tests {
	use tipkit_core::texture::Color;

	use crate::timp::tests::{
		header,
		paletted
	};

	use super::*;

	const RED: Color = Color::new(255, 0, 0, 255);

	/// Packs 4 bpp indices, low nibble first
	fn pack_nibbles(indices: &[usize]) -> Vec<u8> {
		indices.chunks(2).map(|pair| (pair[0] | (pair[1] << 4)) as u8).collect()
	}

	#[test]
	fn test_single_tile_4bpp() {
		let mut palette: Vec<Color> = (0..16).map(|i| Color::new(i * 16, i * 16, 0, 255)).collect();
		palette[5] = RED;

		// one 32x8 tile, of which the texture shows the leftmost 4 columns
		let indices: Vec<usize> = (0..256).map(|i| (i * 7 + i / 3) % 16).collect();
		let data = paletted(4, 8, &palette, &pack_nibbles(&indices));

		let texture = decode_tip(&data).unwrap();
		assert_eq!((texture.width, texture.height), (4, 8));

		let mut expected = vec![];
		for y in 0..8 {
			for x in 0..4 {
				let index = indices[(y * 32) + x];
				assert_eq!(texture.pixel(x, y), Some(palette[index]));
				if index == 5 {
					expected.push((x, y));
				}
			}
		}

		assert!(!expected.is_empty());
		assert_eq!(texture.find_color(&RED), expected);
	}

	#[test]
	fn test_8bpp() {
		let palette: Vec<Color> = (0..64).map(|i| Color::new(i, 0, 0, 255)).collect();
		let pixels: Vec<u8> = (0..128).map(|i| i as u8).collect();

		let (texture, info) = decode_tip_info(&paletted(16, 8, &palette, &pixels)).unwrap();
		assert_eq!(info.geometry.chunk_width, 16);
		assert_eq!(info.num_indices, 128);

		for y in 0..8 {
			for x in 0..16 {
				let index = ((y * 16) + x).min(63);
				assert_eq!(texture.pixel(x, y), Some(palette[index]));
			}
		}
	}

	#[test]
	fn test_raster_size() {
		let palette = vec![RED; 16];

		for (width, height) in [(1, 1), (6, 3), (33, 9), (64, 16)] {
			let texture = decode_tip(&paletted(width, height, &palette, &[0x55; 300])).unwrap();
			assert_eq!((texture.width, texture.height), (width as usize, height as usize));
			assert_eq!(texture.pixels().len(), width as usize * height as usize);
		}
	}

	#[test]
	fn test_zero_sized() {
		let texture = decode_tip(&paletted(0, 0, &vec![RED; 16], &[0x55; 64])).unwrap();
		assert!(texture.pixels().is_empty());
	}

	#[test]
	fn test_inline() {
		let mut data = header(1, 1, 0, 0x10);
		data.extend_from_slice(&[10, 200, 0, 255]);

		let (texture, info) = decode_tip_info(&data).unwrap();
		assert_eq!(texture.pixel(0, 0), Some(Color::new(10, 200, 0, 255)));
		assert_eq!(info.num_indices, 1);
		assert_eq!(info.palette_colors, 0);
		assert_eq!(info.inline_palette_colors, Some(256));
	}

	#[test]
	fn test_inline_unaligned() {
		// 4x8 tiles over a 6x3 texture, colors numbered by stream position
		let mut data = header(6, 3, 0, 0x10);
		for i in 0..64u8 {
			data.extend_from_slice(&[i, 0, 0, 255]);
		}

		let texture = decode_tip(&data).unwrap();
		assert_eq!(texture.pixel(3, 2), Some(Color::new(11, 0, 0, 255)));
		assert_eq!(texture.pixel(5, 2), Some(Color::new(41, 0, 0, 255)));
	}

	#[test]
	fn test_failure_yields_no_texture() {
		let mut data = paletted(4, 8, &vec![RED; 16], &[0; 128]);
		data[0] = b'X';

		assert!(matches!(decode_tip(&data), Err(TIMPImportError::Format { field: "magic", .. })));
	}

	#[test]
	fn test_read_tip_missing_file() {
		assert!(matches!(read_tip("does/not/exist.tip"), Err(TIMPImportError::IO { .. })));
	}
}
