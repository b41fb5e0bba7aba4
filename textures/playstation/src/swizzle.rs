use tipkit_core::texture::{
	Color,
	Texture
};

/// Places a tile-major index stream onto the texture.
///
/// Tiles are `chunk_width` × `chunk_height`, walked left to right then top to bottom, pixels
/// row-major within a tile. Every slot of a tile consumes one index even when it falls outside the
/// texture, so textures that are not tile aligned stay in step with the encoder. Returns the
/// number of pixels written.
pub fn unswizzle(texture: &mut Texture, chunk_width: usize, chunk_height: usize, palette: &[Color],
	indices: &[usize]) -> usize
{
	let mut x = 0;
	let mut y = 0;
	let mut p = 0;
	let mut written = 0;

	while p < indices.len() {
		for ch in 0..chunk_height {
			for cw in 0..chunk_width {
				if (x + cw) < texture.width && (y + ch) < texture.height {
					// the last tile may be cut short by the end of the stream
					if let Some(color) = indices.get(p).and_then(|i| palette.get(*i)) {
						texture.set_pixel(x + cw, y + ch, *color);
						written += 1;
					}
				}

				p += 1;
			}
		}

		x += chunk_width;
		if x >= texture.width {
			x = 0;
			y += chunk_height;
		}
	}

	written
}

#[cfg(test)]
mod tests {
	use super::*;

	fn distinct_palette(len: usize) -> Vec<Color> {
		(0..len).map(|i| Color::new(i as u8, 0, 0, 255)).collect()
	}

	#[test]
	fn test_single_tile() {
		let palette = distinct_palette(8);
		let indices: Vec<usize> = (0..8).collect();
		let mut tex = Texture::new(4, 2);

		assert_eq!(unswizzle(&mut tex, 4, 2, &palette, &indices), 8);

		for y in 0..2 {
			for x in 0..4 {
				assert_eq!(tex.pixel(x, y), Some(palette[(y * 4) + x]));
			}
		}
	}

	#[test]
	fn test_tile_order() {
		// two 2x2 tiles side by side, then a second row of tiles
		let palette = distinct_palette(16);
		let indices: Vec<usize> = (0..16).collect();
		let mut tex = Texture::new(4, 4);

		unswizzle(&mut tex, 2, 2, &palette, &indices);

		let expected = [
			[0, 1, 4, 5],
			[2, 3, 6, 7],
			[8, 9, 12, 13],
			[10, 11, 14, 15],
		];

		for (y, row) in expected.iter().enumerate() {
			for (x, i) in row.iter().enumerate() {
				assert_eq!(tex.pixel(x, y), Some(palette[*i]));
			}
		}
	}

	#[test]
	fn test_unaligned_dimensions() {
		let palette = distinct_palette(64);
		let indices: Vec<usize> = (0..64).collect();
		let mut tex = Texture::new(6, 3);

		assert_eq!(unswizzle(&mut tex, 4, 8, &palette, &indices), 18);

		// first tile covers x 0..4, the second x 4..8 starting at stream position 32
		assert_eq!(tex.pixel(0, 0), Some(palette[0]));
		assert_eq!(tex.pixel(3, 2), Some(palette[11]));
		assert_eq!(tex.pixel(4, 0), Some(palette[32]));
		assert_eq!(tex.pixel(5, 2), Some(palette[41]));
		assert!(tex.pixels().iter().all(|c| *c != Color::TRANSPARENT));
	}

	#[test]
	fn test_overlong_stream() {
		let palette = distinct_palette(1);
		let indices = vec![0; 32 * 5];
		let mut tex = Texture::new(4, 8);

		assert_eq!(unswizzle(&mut tex, 4, 8, &palette, &indices), 32);
		assert_eq!(tex.find_color(&palette[0]).len(), 32);
	}

	#[test]
	fn test_short_stream() {
		let palette = distinct_palette(1);
		let mut tex = Texture::new(4, 8);

		assert_eq!(unswizzle(&mut tex, 4, 8, &palette, &[0; 6]), 6);
		assert_eq!(tex.pixel(1, 1), Some(palette[0]));
		assert_eq!(tex.pixel(2, 1), Some(Color::TRANSPARENT));
	}

	#[test]
	fn test_empty_stream() {
		let mut tex = Texture::new(4, 8);
		assert_eq!(unswizzle(&mut tex, 4, 8, &[], &[]), 0);
		assert_eq!(tex, Texture::new(4, 8));
	}
}
