use std::fs;
use std::path::Path;

use tracing::info;

use super::error::{DecodeError, StoreError};
use super::{bitstream, table, QuadTree};

/// Canvas side assumed when reading files, which don't record it.
pub const DEFAULT_SIDE: u32 = 512;

/// Layout of a saved tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
	/// Pre-order bit stream.
	Binary,
	/// One text line per node, addressed by id.
	Textual,
}

/// How leaf colors are stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
	/// All four channels.
	Rgba,
	/// One bit per leaf, black or white.
	Monochrome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Encoding {
	pub format: Format,
	pub color: ColorMode,
}

impl Encoding {
	pub fn new(format: Format, color: ColorMode) -> Self {
		Encoding { format, color }
	}

	/// Guesses the encoding from a file name.
	///
	/// `.qtc` files hold color, `.qtn` files monochrome; a stem ending in
	/// `_minimized` marks the textual format. Returns `None` for any other
	/// extension. Nothing inside the file is looked at.
	pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
		let path = path.as_ref();
		let color = match path.extension()?.to_str()? {
			"qtc" => ColorMode::Rgba,
			"qtn" => ColorMode::Monochrome,
			_ => return None,
		};
		let minimized = path.file_stem()
			.and_then(|s| s.to_str())
			.map_or(false, |s| s.ends_with("_minimized"));
		let format = if minimized { Format::Textual } else { Format::Binary };
		Some(Encoding { format, color })
	}

	/// The file extension `from_path` maps back to this encoding's color
	/// mode.
	pub fn extension(&self) -> &'static str {
		match self.color {
			ColorMode::Rgba => "qtc",
			ColorMode::Monochrome => "qtn",
		}
	}
}

/// Writes `tree` to `path`.
///
/// The file is only created once encoding has succeeded. Textual saves
/// number the tree's nodes as a side effect.
pub fn save<P: AsRef<Path>>(tree: &mut QuadTree, path: P, encoding: Encoding) -> Result<(), StoreError> {
	let data = match encoding.format {
		Format::Binary => bitstream::encode(tree, encoding.color),
		Format::Textual => {
			let mut buf = Vec::new();
			table::write(tree, encoding.color, &mut buf)?;
			buf
		}
	};
	fs::write(path.as_ref(), &data)?;
	info!(path = %path.as_ref().display(), bytes = data.len(), ?encoding, "saved quadtree");
	Ok(())
}

/// Reads a tree covering a `side`-wide canvas from `path`.
///
/// `encoding` has to match what the file was saved with; a mismatch shows
/// up as a decode error or as a different tree.
pub fn load<P: AsRef<Path>>(path: P, encoding: Encoding, side: u32) -> Result<QuadTree, StoreError> {
	let data = fs::read(path.as_ref())?;
	let tree = match encoding.format {
		Format::Binary => bitstream::decode(&data, encoding.color, side)?,
		Format::Textual => {
			let text = std::str::from_utf8(&data).map_err(|e| DecodeError::MalformedLine {
				line: 0,
				content: e.to_string(),
			})?;
			table::read(text, encoding.color, side)?
		}
	};
	info!(path = %path.as_ref().display(), nodes = tree.node_count(), ?encoding, "loaded quadtree");
	Ok(tree)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn encoding_from_extension() {
		assert_eq!(Encoding::from_path("out/result.qtc"),
			Some(Encoding::new(Format::Binary, ColorMode::Rgba)));
		assert_eq!(Encoding::from_path("result.qtn"),
			Some(Encoding::new(Format::Binary, ColorMode::Monochrome)));
		assert_eq!(Encoding::from_path("result_minimized.qtn"),
			Some(Encoding::new(Format::Textual, ColorMode::Monochrome)));
		assert_eq!(Encoding::from_path("a/b_minimized.qtc"),
			Some(Encoding::new(Format::Textual, ColorMode::Rgba)));
		assert_eq!(Encoding::from_path("result.png"), None);
		assert_eq!(Encoding::from_path("result"), None);
	}

	#[test]
	fn extension_matches_color_mode() {
		for &color in [ColorMode::Rgba, ColorMode::Monochrome].iter() {
			let enc = Encoding::new(Format::Binary, color);
			let name = format!("x.{}", enc.extension());
			assert_eq!(Encoding::from_path(&name), Some(enc));
		}
	}
}
