use thiserror::Error;

/// Reason why an image couldn't be turned into a quadtree.
#[derive(Debug, Error)]
pub enum AnalyzeError {
	/// The image's dimensions are not equal; the image is not a square.
	#[error("image is {width}x{height}, not square")]
	NonSquare { width: u32, height: u32 },
	/// The image's side is not a power of two (zero included).
	#[error("image side {0} is not a power of two")]
	NonPowerOfTwo(u32),
}

/// Reason why a surface couldn't be drawn on.
#[derive(Debug, Error)]
pub enum DrawError {
	/// The surface is smaller than the canvas the tree covers.
	#[error("surface is {width}x{height} but the tree covers {side}x{side}")]
	TooSmall { width: u32, height: u32, side: u32 },
}

/// Reason why a quadtree encoding couldn't be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
	/// The bit stream ended in the middle of a node.
	#[error("bit stream ended before the tree was complete")]
	InsufficientData,
	/// Whole bytes remain after the last node of the tree.
	#[error("{0} unread bits after the end of the tree")]
	TrailingData(usize),
	/// An internal node was found where the region can no longer be split.
	#[error("internal node at region of size {0}, which cannot be split")]
	TooDeep(u32),
	/// The table refers to a node id it never defines.
	#[error("node {0} is referenced but not defined")]
	MissingNode(u32),
	/// A table line has none of the recognized shapes.
	#[error("line {line}: cannot parse {content:?}")]
	MalformedLine { line: usize, content: String },
	/// A leaf line belongs to the other color mode.
	#[error("line {line}: leaf is not in the requested color mode")]
	ModeMismatch { line: usize },
	/// The canvas side the caller supplied cannot hold a quadtree.
	#[error("canvas side {0} is not a power of two")]
	InvalidSide(u32),
}

/// Reason why a quadtree couldn't be saved to or loaded from a file.
#[derive(Debug, Error)]
pub enum StoreError {
	#[error("file I/O failed: {0}")]
	Io(#[from] std::io::Error),
	#[error("invalid quadtree data: {0}")]
	Decode(#[from] DecodeError),
}
