use clap::{ArgGroup, Parser};
use image::error::ImageError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quadtree_codec::node::render::{render, LeafShape};
use quadtree_codec::node::store::DEFAULT_SIDE;
use quadtree_codec::{
	load, save, ColorMode, Encoding, Format, QuadTree, RefineConfig, StoreError,
};

use std::path::{Path, PathBuf};

/// Helper function for `main`.
fn error_exit(msg: &str, code: i32) -> ! {
	eprintln!("{}", msg);
	std::process::exit(code)
}

/// Converts to and from quadtree files (QTC for color, QTN for monochrome).
///
/// Color mode and format are taken from the quadtree file's name when it
/// ends in `.qtc` or `.qtn` (a stem ending in `_minimized` means the
/// textual format), and from `--mono` / `--textual` otherwise.
#[derive(Debug, Parser)]
#[command(name = "quadtree_codec", version, author = "vkcz")]
#[command(group(ArgGroup::new("direction").required(true).args(["into", "from"])))]
struct Cli {
	/// Convert the input file from PNG or JFIF to a quadtree file
	#[arg(short, long)]
	into: bool,

	/// Convert the input quadtree file to PNG
	#[arg(short, long)]
	from: bool,

	/// Number of refinement steps (--into only)
	#[arg(short, long, default_value_t = 100)]
	budget: usize,

	/// Stop refining once no leaf's error exceeds this (--into only)
	#[arg(short, long)]
	threshold: Option<f64>,

	/// Merge identical sibling leaves before saving (--into only; implied by --textual)
	#[arg(short, long)]
	minimize: bool,

	/// Store one bit per leaf instead of RGBA
	#[arg(long)]
	mono: bool,

	/// Use the ID-indexed text format instead of the bit stream
	#[arg(long)]
	textual: bool,

	/// Canvas width (and height) of the stored tree; must be a power of two (--from only)
	#[arg(short, long, default_value_t = DEFAULT_SIDE)]
	width: u32,

	/// Draw leaves as circles instead of squares (--from only)
	#[arg(long)]
	circles: bool,

	/// Path to input file
	input: PathBuf,

	/// Path to output file; defaults to INPUT with a modified file extension
	output: Option<PathBuf>,
}

impl Cli {
	fn flag_encoding(&self) -> Encoding {
		Encoding::new(
			if self.textual { Format::Textual } else { Format::Binary },
			if self.mono { ColorMode::Monochrome } else { ColorMode::Rgba },
		)
	}
}

fn default_tree_path(input: &Path, encoding: Encoding) -> PathBuf {
	let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("out");
	let suffix = if encoding.format == Format::Textual { "_minimized" } else { "" };
	input.with_file_name(format!("{}{}.{}", stem, suffix, encoding.extension()))
}

fn store_exit(e: StoreError) -> ! {
	match e {
		StoreError::Io(e) => error_exit(&format!("File could not be accessed: {}", e), 3),
		StoreError::Decode(e) => error_exit(&format!("Invalid quadtree data: {}", e), 4),
	}
}

fn into_tree(cli: &Cli) {
	let source = match image::open(&cli.input) {
		Ok(i) => i,
		Err(e) => {
			let (msg, code) = match e {
				ImageError::Decoding(_) => ("Invalid image data", 4),
				ImageError::Limits(_) => ("Computation limits exceeded", 5),
				ImageError::IoError(_) => ("File not found or could not be read", 3),
				_ => ("An error occurred", 10),
			};
			error_exit(msg, code)
		}
	}.into_rgba8();
	let config = RefineConfig { budget: cli.budget, threshold: cli.threshold };
	let mut tree = match QuadTree::build(&source, &config) {
		Ok(t) => t,
		Err(e) => error_exit(&format!("Input image has invalid dimensions: {}", e), 4),
	};
	let encoding = cli.output.as_ref()
		.and_then(Encoding::from_path)
		.unwrap_or_else(|| cli.flag_encoding());
	if cli.minimize || encoding.format == Format::Textual {
		tree.minimize();
	}
	let out_path = cli.output.clone().unwrap_or_else(|| default_tree_path(&cli.input, encoding));
	if let Err(e) = save(&mut tree, &out_path, encoding) {
		store_exit(e)
	}
	info!(leaves = tree.leaf_count(), output = %out_path.display(), "conversion done");
}

fn from_tree(cli: &Cli) {
	if !cli.width.is_power_of_two() {
		error_exit("Output width must be a power of two", 2);
	}
	let encoding = Encoding::from_path(&cli.input).unwrap_or_else(|| cli.flag_encoding());
	let tree = match load(&cli.input, encoding, cli.width) {
		Ok(t) => t,
		Err(e) => store_exit(e),
	};
	let mut output = image::RgbaImage::new(cli.width, cli.width);
	let shape = if cli.circles { LeafShape::Circle } else { LeafShape::Square };
	if let Err(e) = render(&tree, &mut output, shape) {
		error_exit(&format!("Could not draw quadtree: {}", e), 10);
	}
	let out_path = cli.output.clone().unwrap_or_else(|| cli.input.with_extension("png"));
	if output.save(&out_path).is_err() {
		error_exit("Could not save output", 3);
	}
}

/// `clap`-based CLI for working with quadtree files.
///
/// May exit process with status code if there are errors:
///
/// 2: invalid arguments (`clap` usage errors also exit with 2)
///
/// 3: file I/O issues
///
/// 4: invalid image or quadtree data
///
/// 5: computation limits exceeded
///
/// 10: other, potentially unknown error
fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env()
			.unwrap_or_else(|_| EnvFilter::new("quadtree_codec=info")))
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	if cli.into {
		into_tree(&cli);
	} else {
		from_tree(&cli);
	}
}
