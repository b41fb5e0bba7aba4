use byteorder::{
	BE,
	LE,
	ReadBytesExt
};

use log::debug;

use std::io::{
	self,
	Read,
	Seek,
	SeekFrom
};

use thiserror::Error;

use tipkit_core::{
	io_ext::ReadBinExt,
	tag4,
	texture::Color
};

pub const MAGIC: u32 = tag4!(b"TIMP");

/// Size of the fixed header, from the magic up to and including the padding
pub const HEADER_SIZE: u64 = 48;

/// A pixel offset of this value marks a texture without a palette table
pub const INLINE_PIXEL_OFFSET: u32 = 0x10;

pub const SENTINEL_A: [u8; 14] = [0x01, 0x00, 0x01, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
	0x18, 0x00];
pub const SENTINEL_B: [u8; 3] = [0x01, 0x00, 0x03];
pub const SENTINEL_C: [u8; 6] = [0x01, 0x01, 0x00, 0x00, 0x00, 0x00];
pub const PADDING: [u8; 8] = [0; 8];

#[cfg(feature = "import")]
#[derive(Debug, Error)]
pub enum TIMPImportError {
	#[error("Unexpected {field} value: expected {expected:02X?}, found {actual:02X?}")]
	Format {
		field: &'static str,
		expected: Vec<u8>,
		actual: Vec<u8>,
	},
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Layout mismatch: expected offset {expected:#X}, found {actual:#X}")]
	Layout {
		expected: u64,
		actual: u64,
	},
	#[error("Unsupported palette size: {0} colors")]
	UnsupportedGeometry(u32),
}

/// Reads a fixed-value block, failing when it differs from `expected`
#[cfg(feature = "import")]
fn expect_bytes<R, const N: usize>(buf: &mut R, field: &'static str, expected: &[u8; N])
	-> Result<(), TIMPImportError>
where
	R: ReadBytesExt,
{
	let actual = buf.read_array::<N>()?;
	if actual != *expected {
		return Err(TIMPImportError::Format {
			field: field,
			expected: expected.to_vec(),
			actual: actual.to_vec(),
		});
	}

	Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Header {
	pub magic: u32,
	pub width: u16,
	pub height: u16,
	pub palette_type: u8,
	pub offset_palette: u32,
	pub offset_pixels: u32,
}

impl Header {
	#[cfg(feature = "import")]
	fn read<R>(buf: &mut R) -> Result<Header, TIMPImportError>
	where
		R: ReadBytesExt,
	{
		let magic = buf.read_u32::<BE>()?;
		if magic != MAGIC {
			return Err(TIMPImportError::Format {
				field: "magic",
				expected: MAGIC.to_be_bytes().to_vec(),
				actual: magic.to_be_bytes().to_vec(),
			});
		}

		expect_bytes(buf, "sentinel A", &SENTINEL_A)?;
		let width = buf.read_u16::<LE>()?;
		let height = buf.read_u16::<LE>()?;
		expect_bytes(buf, "sentinel B", &SENTINEL_B)?;
		let palette_type = buf.read_u8()?;
		expect_bytes(buf, "sentinel C", &SENTINEL_C)?;
		let offset_palette = buf.read_u32::<LE>()?;
		let offset_pixels = buf.read_u32::<LE>()?;
		expect_bytes(buf, "padding", &PADDING)?;

		Ok(Header {
			magic: magic,
			width: width,
			height: height,
			palette_type: palette_type,
			offset_palette: offset_palette,
			offset_pixels: offset_pixels,
		})
	}

	/// True when the pixel offset carries the no-palette marker
	pub fn has_inline_marker(&self) -> bool {
		self.offset_pixels == INLINE_PIXEL_OFFSET
	}

	/// Number of palette entries implied by the gap between the palette and pixel offsets
	#[cfg(feature = "import")]
	pub fn palette_colors(&self) -> Result<u32, TIMPImportError> {
		if self.offset_palette == 0 || self.has_inline_marker() {
			return Ok(0);
		}

		match self.offset_pixels.checked_sub(self.offset_palette) {
			Some(gap) => Ok(gap / 4),
			None => Err(TIMPImportError::Layout {
				expected: self.offset_palette as u64,
				actual: self.offset_pixels as u64,
			}),
		}
	}

	/// Where inline color data starts. Offsets pointing inside the header fall back to the first
	/// byte after it.
	pub fn inline_payload_start(&self) -> u64 {
		(self.offset_pixels as u64).max(HEADER_SIZE)
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorMode {
	/// Indices into a palette table of the given size
	Paletted(u32),
	/// Every pixel slot stores its own RGBA color
	Inline,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Geometry {
	pub chunk_width: usize,
	pub chunk_height: usize,
	pub mode: ColorMode,
}

impl Geometry {
	/// Selects the swizzle tile size from the palette size
	#[cfg(feature = "import")]
	pub fn resolve(palette_colors: u32, inline_marker: bool) -> Result<Geometry, TIMPImportError> {
		let (chunk_width, chunk_height) = match palette_colors {
			0 => (4, 8),
			16 | 32 | 48 | 96 | 112 => (32, 8),
			64 | 236 | 256 => (16, 8),
			_ => return Err(TIMPImportError::UnsupportedGeometry(palette_colors)),
		};

		if palette_colors == 0 || inline_marker {
			return Ok(Geometry {
				chunk_width: 4,
				chunk_height: 8,
				mode: ColorMode::Inline,
			});
		}

		Ok(Geometry {
			chunk_width: chunk_width,
			chunk_height: chunk_height,
			mode: ColorMode::Paletted(palette_colors),
		})
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Depth {
	BPP4,
	BPP8,
}

impl Depth {
	pub fn for_palette(palette_colors: u32) -> Depth {
		if palette_colors == 64 || palette_colors >= 200 {
			Depth::BPP8
		} else {
			Depth::BPP4
		}
	}
}

/// Expands packed pixel bytes into one palette index per pixel slot.
///
/// 8 bpp indices past the end of the palette are clamped to its last entry. 4 bpp bytes yield the
/// low nibble first.
pub fn unpack_indices(data: &[u8], depth: Depth, palette_len: usize) -> Vec<usize> {
	match depth {
		Depth::BPP8 => {
			let last = palette_len.saturating_sub(1);
			data.iter().map(|b| (*b as usize).min(last)).collect()
		},
		Depth::BPP4 => data.iter()
			.flat_map(|b| [(b & 0xF) as usize, ((b >> 4) & 0xF) as usize])
			.collect(),
	}
}

/// Palette size the inline data would need, judged by its largest channel value. Informational
/// only; the decode has already been done by the time this is known.
pub fn classify_inline_palette(max_channel: u8) -> u32 {
	if max_channel >= 48 {
		256
	} else if max_channel >= 16 {
		48
	} else {
		16
	}
}

/// Palette entries that are pure black or white and either fully transparent or fully opaque
pub fn count_empty_colors(palette: &[Color]) -> usize {
	palette.iter().filter(|c| {
		let rgb = [c.red, c.green, c.blue];
		(rgb == [0x00; 3] || rgb == [0xFF; 3]) && (c.alpha == 0x00 || c.alpha == 0xFF)
	}).count()
}

#[derive(Clone, Debug, PartialEq)]
pub enum PixelData {
	Paletted {
		depth: Depth,
		palette: Vec<Color>,
		indices: Vec<usize>,
	},
	Inline {
		palette: Vec<Color>,
		indices: Vec<usize>,
		max_channel: u8,
	},
}

impl PixelData {
	pub fn paletted(palette: Vec<Color>, palette_colors: u32, payload: &[u8]) -> PixelData {
		let depth = Depth::for_palette(palette_colors);
		let indices = unpack_indices(payload, depth, palette.len());

		PixelData::Paletted {
			depth: depth,
			palette: palette,
			indices: indices,
		}
	}

	/// Turns each RGBA quadruple of the payload into its own palette entry
	pub fn inline(payload: &[u8]) -> PixelData {
		let mut palette = Vec::with_capacity(payload.len() / 4);
		let mut indices = Vec::with_capacity(payload.len() / 4);
		let mut max_channel = 0u8;

		for quad in payload.chunks_exact(4) {
			let color = Color::from_rgba([quad[0], quad[1], quad[2], quad[3]]);
			max_channel = max_channel.max(color.max_channel());

			palette.push(color);
			indices.push(palette.len() - 1);
		}

		PixelData::Inline {
			palette: palette,
			indices: indices,
			max_channel: max_channel,
		}
	}

	pub fn palette(&self) -> &[Color] {
		match self {
			PixelData::Paletted { palette, .. } | PixelData::Inline { palette, .. } => palette,
		}
	}

	pub fn indices(&self) -> &[usize] {
		match self {
			PixelData::Paletted { indices, .. } | PixelData::Inline { indices, .. } => indices,
		}
	}
}

/// Decode details callers may want to log
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TIMPInfo {
	pub header: Header,
	pub geometry: Geometry,
	pub palette_colors: u32,
	pub empty_colors: usize,
	pub used_bytes: usize,
	pub num_indices: usize,
	pub inline_max_channel: Option<u8>,
	pub inline_palette_colors: Option<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TIMPTexture {
	pub header: Header,
	pub geometry: Geometry,
	pub palette_colors: u32,
	pub used_bytes: usize,
	pub data: PixelData,
}

impl TIMPTexture {
	#[cfg(feature = "import")]
	pub fn read<R>(buf: &mut R) -> Result<TIMPTexture, TIMPImportError>
	where
		R: ReadBytesExt + Seek,
	{
		let header = Header::read(buf)?;
		debug!("TIMP {}x{}, palette type {}, palette at {:#010X}, pixels at {:#010X}",
			header.width, header.height, header.palette_type, header.offset_palette, header.offset_pixels);

		let palette_colors = header.palette_colors()?;
		let geometry = Geometry::resolve(palette_colors, header.has_inline_marker())?;
		debug!("{} palette colors, {:?}", palette_colors, geometry);

		let payload;
		let data = match geometry.mode {
			ColorMode::Paletted(colors) => {
				let palette = read_palette(buf, &header, colors)?;
				payload = read_payload(buf, header.offset_pixels as u64)?;
				PixelData::paletted(palette, colors, &payload)
			},
			ColorMode::Inline => {
				payload = read_payload(buf, header.inline_payload_start())?;
				PixelData::inline(&payload)
			},
		};
		debug!("{} payload bytes, {} pixel slots", payload.len(), data.indices().len());

		Ok(TIMPTexture {
			header: header,
			geometry: geometry,
			palette_colors: palette_colors,
			used_bytes: payload.len(),
			data: data,
		})
	}

	pub fn info(&self) -> TIMPInfo {
		let (empty_colors, inline_max_channel) = match self.data {
			PixelData::Paletted { ref palette, .. } => (count_empty_colors(palette), None),
			PixelData::Inline { max_channel, .. } => (0, Some(max_channel)),
		};

		TIMPInfo {
			header: self.header,
			geometry: self.geometry,
			palette_colors: self.palette_colors,
			empty_colors: empty_colors,
			used_bytes: self.used_bytes,
			num_indices: self.data.indices().len(),
			inline_max_channel: inline_max_channel,
			inline_palette_colors: inline_max_channel.map(classify_inline_palette),
		}
	}
}

/// Reads the palette table, which must start exactly where the header ends
#[cfg(feature = "import")]
fn read_palette<R>(buf: &mut R, header: &Header, colors: u32) -> Result<Vec<Color>, TIMPImportError>
where
	R: ReadBytesExt + Seek,
{
	let pos = buf.stream_position()?;
	if pos != header.offset_palette as u64 {
		return Err(TIMPImportError::Layout {
			expected: header.offset_palette as u64,
			actual: pos,
		});
	}

	let mut palette = Vec::with_capacity(colors as usize);
	for _ in 0..colors {
		palette.push(buf.read_rgba()?);
	}

	Ok(palette)
}

/// Reads everything from `start` to the end of the stream
#[cfg(feature = "import")]
fn read_payload<R>(buf: &mut R, start: u64) -> Result<Vec<u8>, TIMPImportError>
where
	R: ReadBytesExt + Seek,
{
	let end = buf.seek(SeekFrom::End(0))?;
	let mut payload = Vec::with_capacity(end.saturating_sub(start) as usize);

	if start < end {
		buf.seek(SeekFrom::Start(start))?;
		buf.read_to_end(&mut payload)?;
	}

	Ok(payload)
}
