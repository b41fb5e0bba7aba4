use std::{
	io::Write,
	path::PathBuf
};

use clap::Parser;
use log::LevelFilter;

use tipkit_tipconv::{
	run,
	ConvertCfg,
	ConvertError,
	ConvertFlag
};

/// Converts PlayStation Portable TIMP (.tip) textures to PNG
#[derive(Parser, Debug)]
#[command(name = "tipconv", version, about)]
struct Args {
	/// TIP image or folder path
	#[arg(value_name = "INPUT")]
	input: PathBuf,

	/// PNG image or folder path
	#[arg(short, long, value_name = "OUTPUT")]
	output: Option<PathBuf>,

	/// Skip existing png files
	#[arg(long)]
	skip_existing: bool,

	/// Verbose mode
	#[arg(short, long)]
	verbose: bool,
}

impl Args {
	fn cfg(&self) -> ConvertCfg {
		let mut flags = ConvertFlag::default();
		flags.set(ConvertFlag::SKIP_EXISTING, self.skip_existing);
		flags.set(ConvertFlag::VERBOSE, self.verbose);

		ConvertCfg {
			flags: flags,
			output: self.output.clone(),
		}
	}
}

fn init_logging(flags: ConvertFlag) {
	let level = if flags.contains(ConvertFlag::VERBOSE) {
		LevelFilter::Debug
	} else {
		LevelFilter::Warn
	};

	env_logger::Builder::new()
		.filter_level(level)
		.parse_default_env()
		.format(|buf, record| {
			writeln!(buf, "[{}] {}", record.level(), record.args())
		})
		.init();
}

fn main() -> Result<(), ConvertError> {
	let args = Args::parse();
	let cfg = args.cfg();
	init_logging(cfg.flags);

	let summary = run(&args.input, &cfg)?;
	if summary.failed > 0 {
		return Err(ConvertError::Failed {
			failed: summary.failed,
			total: summary.total(),
		});
	}

	Ok(())
}
