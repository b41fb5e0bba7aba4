use bitflags::bitflags;

use glob::{
	GlobError,
	Pattern
};

use image::{
	ColorType,
	ImageFormat
};

use indicatif::{
	ProgressBar,
	ProgressStyle
};

use log::{
	debug,
	error,
	info,
	warn
};

use std::{
	fs,
	io,
	path::{
		Path,
		PathBuf
	}
};

use thiserror::Error;

use tipkit_textures_playstation::{
	decode_tip_info,
	timp::{
		TIMPImportError,
		TIMPInfo
	}
};

pub const TIP_EXTENSION: &str = "tip";
pub const PNG_EXTENSION: &str = "png";

const PROGRESS_TEMPLATE: &str = "{msg} [{wide_bar}] {pos}/{len} {percent:>3}% ETA {eta}";

bitflags! {
	pub struct ConvertFlag: u32 {
		const SKIP_EXISTING = 1;
		const VERBOSE = 2;
	}
}

impl Default for ConvertFlag {
	fn default() -> Self {
		ConvertFlag::empty()
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConvertCfg {
	pub flags: ConvertFlag,
	/// PNG file for a single input, or the folder mirroring an input folder
	pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Summary {
	pub converted: usize,
	pub skipped: usize,
	pub failed: usize,
}

impl Summary {
	pub fn total(&self) -> usize {
		self.converted + self.skipped + self.failed
	}
}

#[derive(Debug, Error)]
pub enum ConvertError {
	#[error("Failed to decode texture: {0}")]
	Decode(#[from] TIMPImportError),
	#[error("{failed} of {total} files failed to convert")]
	Failed {
		failed: usize,
		total: usize,
	},
	#[error("Failed to write PNG: {0}")]
	Image(#[from] image::ImageError),
	#[error("I/O error: {source}")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("File \"{}\" already exists", .0.display())]
	OutputExists(PathBuf),
	#[error("Invalid search pattern: {0}")]
	Pattern(#[from] glob::PatternError),
}

/// Output path for a single input: `output` when it names a PNG, otherwise the input with a
/// `.png` extension.
pub fn output_path(input: &Path, output: Option<&Path>) -> PathBuf {
	match output {
		Some(out) if out.extension().map_or(false, |e| e == PNG_EXTENSION) => out.to_path_buf(),
		_ => input.with_extension(PNG_EXTENSION),
	}
}

/// Output path for a texture found under `input_dir`. An existing output folder receives the
/// texture's relative location; otherwise the PNG lands next to the texture.
pub fn batch_output_path(input_dir: &Path, tip: &Path, output: Option<&Path>) -> PathBuf {
	match output {
		Some(out) if out.is_dir() => {
			let rel = tip.strip_prefix(input_dir).unwrap_or(tip);
			out.join(rel).with_extension(PNG_EXTENSION)
		},
		_ => tip.with_extension(PNG_EXTENSION),
	}
}

/// Lists the `.tip` files directly inside `dir`, sorted by name
pub fn find_tips(dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
	let pattern = format!("{}/*.{}", Pattern::escape(&dir.to_string_lossy()), TIP_EXTENSION);

	let mut tips = vec![];
	for entry in glob::glob(&pattern)? {
		tips.push(entry.map_err(GlobError::into_error)?);
	}

	Ok(tips)
}

/// Decodes one texture and writes it as a PNG
pub fn convert_file(input: &Path, output: &Path) -> Result<TIMPInfo, ConvertError> {
	let data = fs::read(input)?;
	let (texture, info) = decode_tip_info(&data)?;

	debug!("{}x{}, {} palette colors ({} empty), chunk {}x{}, {} bytes used, {} pixel slots",
		info.header.width, info.header.height, info.palette_colors, info.empty_colors,
		info.geometry.chunk_width, info.geometry.chunk_height, info.used_bytes, info.num_indices);
	if let Some(colors) = info.inline_palette_colors {
		debug!("Inline colors, max channel {:?}, would fit {} palette colors", info.inline_max_channel,
			colors);
	}

	if let Some(parent) = output.parent() {
		if !parent.as_os_str().is_empty() {
			fs::create_dir_all(parent)?;
		}
	}

	image::save_buffer_with_format(output, &texture.to_rgba_bytes(), texture.width as u32,
		texture.height as u32, ColorType::Rgba8, ImageFormat::Png)?;

	Ok(info)
}

/// Converts a single texture or every texture in a folder
pub fn run(input: &Path, cfg: &ConvertCfg) -> Result<Summary, ConvertError> {
	if input.is_dir() {
		return run_batch(input, cfg);
	}

	let output = output_path(input, cfg.output.as_deref());
	if cfg.flags.contains(ConvertFlag::SKIP_EXISTING) && output.is_file() {
		return Err(ConvertError::OutputExists(output));
	}

	convert_file(input, &output)?;
	info!("Wrote \"{}\"", output.display());

	Ok(Summary {
		converted: 1,
		..Summary::default()
	})
}

fn run_batch(input: &Path, cfg: &ConvertCfg) -> Result<Summary, ConvertError> {
	let tips = find_tips(input)?;
	let digits = tips.len().to_string().len();
	let mut summary = Summary::default();

	let progress = ProgressBar::new(tips.len() as u64);
	progress.set_style(ProgressStyle::with_template(PROGRESS_TEMPLATE)
		.unwrap_or_else(|_| ProgressStyle::default_bar()));
	progress.set_message("Converting");

	for (idx, tip) in tips.iter().enumerate() {
		let rel = tip.strip_prefix(input).unwrap_or(tip);
		let output = batch_output_path(input, tip, cfg.output.as_deref());
		info!("Processing {:0width$}: \"{}\"", idx + 1, rel.display(), width = digits);

		if cfg.flags.contains(ConvertFlag::SKIP_EXISTING) && output.is_file() {
			warn!("Already exists, skipping");
			summary.skipped += 1;
		} else {
			match convert_file(tip, &output) {
				Ok(_) => summary.converted += 1,
				Err(e) => {
					error!("\"{}\": {}", rel.display(), e);
					summary.failed += 1;
				},
			}
		}

		progress.inc(1);
	}

	progress.finish_and_clear();
	Ok(summary)
}
