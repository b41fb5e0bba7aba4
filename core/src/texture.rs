#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Color {
	pub red: u8,
	pub green: u8,
	pub blue: u8,
	pub alpha: u8,
}

impl Color {
	/// Fully transparent black, the initial value of every texture pixel
	pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

	pub const fn new(red: u8, green: u8, blue: u8, alpha: u8) -> Color {
		Color {
			red: red,
			green: green,
			blue: blue,
			alpha: alpha,
		}
	}

	/// Builds a color from bytes stored in R, G, B, A order
	pub const fn from_rgba(bytes: [u8; 4]) -> Color {
		Color::new(bytes[0], bytes[1], bytes[2], bytes[3])
	}

	pub const fn to_rgba(&self) -> [u8; 4] {
		[self.red, self.green, self.blue, self.alpha]
	}

	pub fn to_rgba8888(&self) -> u32 {
		u32::from_be_bytes(self.to_rgba())
	}

	/// Largest of the four channel values
	pub fn max_channel(&self) -> u8 {
		self.red.max(self.green).max(self.blue).max(self.alpha)
	}

	/// Returns a textual hex representation in the form of `#rrggbbaa`
	pub fn hex_rgba(&self) -> String {
		format!("#{:02x}{:02x}{:02x}{:02x}", self.red, self.green, self.blue, self.alpha)
	}
}

/// A width × height RGBA raster, row-major, starting out fully transparent.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
	pub width: usize,
	pub height: usize,
	pixels: Vec<Color>,
}

impl Texture {
	pub fn new(width: usize, height: usize) -> Texture {
		Texture {
			width: width,
			height: height,
			pixels: vec![Color::TRANSPARENT; width * height],
		}
	}

	/// Returns the color at (x, y), or `None` when outside the texture
	pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
		if x < self.width && y < self.height {
			Some(self.pixels[(y * self.width) + x])
		} else {
			None
		}
	}

	/// Writes a color at (x, y). Returns false, leaving the texture untouched, when (x, y) is
	/// outside the texture.
	pub fn set_pixel(&mut self, x: usize, y: usize, color: Color) -> bool {
		if x < self.width && y < self.height {
			self.pixels[(y * self.width) + x] = color;
			true
		} else {
			false
		}
	}

	pub fn pixels(&self) -> &[Color] {
		&self.pixels
	}

	/// Returns the (X, Y) coordinates of every instance of a specified color
	pub fn find_color(&self, color: &Color) -> Vec<(usize, usize)> {
		let mut coords = vec![];

		for y in 0..self.height {
			for x in 0..self.width {
				if self.pixels[(y * self.width) + x] == *color {
					coords.push((x, y));
				}
			}
		}

		coords
	}

	/// Flattens the texture into packed 8-bit RGBA bytes
	pub fn to_rgba_bytes(&self) -> Vec<u8> {
		self.pixels.iter().flat_map(|c| c.to_rgba()).collect()
	}
}
