//! Line-per-node text encoding, addressed by pre-order node ids.
//!
//! Each line starts with a node id. Internal nodes list their children's
//! ids (`<id> <nw> <ne> <sw> <se>`), color leaves put an `f` right after
//! the id and then their channels (`<id>f <r> <g> <b> <a>`), and
//! monochrome leaves carry a single bit (`<id> <0|1>`). Lines come in
//! pre-order, so ids grow from top to bottom.

use std::collections::{HashMap, HashSet};
use std::io::{self, Write};

use tracing::debug;

use super::error::DecodeError;
use super::pixel::{self, Color};
use super::store::ColorMode;
use super::{QuadNode, QuadTree, Region};

/// Numbers `node` and its descendants in pre-order, starting from `*next`.
///
/// `*next` ends up one past the last id handed out.
pub fn assign_ids(node: &mut QuadNode, next: &mut u32) {
	node.id = Some(*next);
	*next += 1;
	if let Some(ref mut sects) = node.children {
		for section in sects.iter_mut() {
			assign_ids(section, next);
		}
	}
}

fn id_of(node: &QuadNode) -> io::Result<u32> {
	node.id.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "node has no id"))
}

fn write_node<W: Write>(node: &QuadNode, mode: ColorMode, out: &mut W) -> io::Result<()> {
	let id = id_of(node)?;
	match node.children {
		None => match mode {
			ColorMode::Rgba => {
				let [r, g, b, a] = node.color.0;
				writeln!(out, "{}f {} {} {} {}", id, r, g, b, a)
			}
			ColorMode::Monochrome => {
				writeln!(out, "{} {}", id, pixel::monochrome_bit(&node.color) as u8)
			}
		},
		Some(ref sects) => {
			writeln!(out, "{} {} {} {} {}", id,
				id_of(&sects[0])?, id_of(&sects[1])?, id_of(&sects[2])?, id_of(&sects[3])?)?;
			for section in sects.iter() {
				write_node(section, mode, out)?;
			}
			Ok(())
		}
	}
}

/// Numbers the tree's nodes from 0 and writes one line per node.
///
/// Meant for trees that have already been minimized, though any tree can
/// be written.
pub fn write<W: Write>(tree: &mut QuadTree, mode: ColorMode, out: &mut W) -> io::Result<()> {
	let mut next = 0;
	assign_ids(&mut tree.root, &mut next);
	write_node(&tree.root, mode, out)?;
	debug!(nodes = next, ?mode, "wrote quadtree table");
	Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Entry {
	Internal([u32; 4]),
	Leaf(Color),
	Bit(bool),
}

/// A parsed line, with where it came from for error reports.
struct Line<'a> {
	number: usize,
	text: &'a str,
	entry: Entry,
}

fn parse_line(text: &str) -> Option<(u32, Entry)> {
	let digits = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
	let id = text[..digits].parse().ok()?;
	let rest = &text[digits..];
	if let Some(channels) = rest.strip_prefix('f') {
		let channels = channels.split_whitespace()
			.map(str::parse::<u8>)
			.collect::<Result<Vec<_>, _>>()
			.ok()?;
		return match channels[..] {
			[r, g, b, a] => Some((id, Entry::Leaf(image::Rgba([r, g, b, a])))),
			_ => None,
		};
	}
	if !rest.starts_with(char::is_whitespace) {
		return None;
	}
	let nums = rest.split_whitespace()
		.map(str::parse::<u32>)
		.collect::<Result<Vec<_>, _>>()
		.ok()?;
	match nums[..] {
		[nw, ne, sw, se] => Some((id, Entry::Internal([nw, ne, sw, se]))),
		[0] => Some((id, Entry::Bit(false))),
		[1] => Some((id, Entry::Bit(true))),
		_ => None,
	}
}

/// Maps every id to the first line that carries it.
fn index(text: &str) -> Result<HashMap<u32, Line<'_>>, DecodeError> {
	let mut lines = HashMap::new();
	for (ind, raw) in text.lines().enumerate() {
		let trimmed = raw.trim();
		if trimmed.is_empty() {
			continue;
		}
		let (id, entry) = parse_line(trimmed).ok_or_else(|| DecodeError::MalformedLine {
			line: ind + 1,
			content: raw.to_owned(),
		})?;
		lines.entry(id).or_insert(Line { number: ind + 1, text: raw, entry });
	}
	Ok(lines)
}

impl QuadNode {
	/// Fills in this node from the line for `id`, recursing into the
	/// children an internal line names.
	///
	/// `claimed` holds every id some line has already named as a node; a
	/// child id that is in it again would share a subtree.
	fn resolve(
		&mut self,
		id: u32,
		lines: &HashMap<u32, Line<'_>>,
		mode: ColorMode,
		claimed: &mut HashSet<u32>,
	) -> Result<(), DecodeError> {
		let line = lines.get(&id).ok_or(DecodeError::MissingNode(id))?;
		self.id = Some(id);
		match (line.entry, mode) {
			(Entry::Leaf(color), ColorMode::Rgba) => self.color = color,
			(Entry::Bit(bit), ColorMode::Monochrome) => self.color = pixel::from_monochrome_bit(bit),
			(Entry::Leaf(_), _) | (Entry::Bit(_), _) => {
				return Err(DecodeError::ModeMismatch { line: line.number });
			}
			(Entry::Internal(kids), _) => {
				if self.region.size <= 1 {
					return Err(DecodeError::TooDeep(self.region.size));
				}
				if kids.iter().any(|&k| k <= id) {
					return Err(DecodeError::MalformedLine { line: line.number, content: line.text.to_owned() });
				}
				for &kid in kids.iter() {
					if !claimed.insert(kid) {
						return Err(DecodeError::MalformedLine { line: line.number, content: line.text.to_owned() });
					}
				}
				let quads = self.region.quadrants();
				let mut sects = [
					QuadNode::empty(quads[0]),
					QuadNode::empty(quads[1]),
					QuadNode::empty(quads[2]),
					QuadNode::empty(quads[3]),
				];
				for (section, &kid) in sects.iter_mut().zip(kids.iter()) {
					section.resolve(kid, lines, mode, claimed)?;
				}
				self.children = Some(Box::new(sects));
			}
		}
		Ok(())
	}
}

/// Rebuilds a tree covering a `side`-wide canvas from its table, starting
/// at node 0.
///
/// The whole table is indexed up front, so lookups don't depend on line
/// order beyond the first line for an id winning. Every id may be named as
/// a child at most once.
pub fn read(text: &str, mode: ColorMode, side: u32) -> Result<QuadTree, DecodeError> {
	if !side.is_power_of_two() {
		return Err(DecodeError::InvalidSide(side));
	}
	let lines = index(text)?;
	let mut root = QuadNode::empty(Region::new(0, 0, side));
	let mut claimed = HashSet::new();
	claimed.insert(0);
	root.resolve(0, &lines, mode, &mut claimed)?;
	let tree = QuadTree { root };
	debug!(nodes = tree.node_count(), lines = lines.len(), ?mode, "read quadtree table");
	Ok(tree)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::node::refine::{RefineConfig, Refiner};

	fn corners() -> QuadTree {
		let img = image::RgbaImage::from_fn(2, 2, |x, y| match (x, y) {
			(0, 0) => image::Rgba([255, 0, 0, 255]),
			(1, 0) => image::Rgba([0, 255, 0, 255]),
			(0, 1) => image::Rgba([0, 0, 255, 255]),
			_ => image::Rgba([255, 255, 255, 128]),
		});
		let mut refiner = Refiner::new(&img).unwrap();
		refiner.subdivide(&Region::new(0, 0, 2));
		refiner.finish()
	}

	fn written(tree: &mut QuadTree, mode: ColorMode) -> String {
		let mut out = Vec::new();
		write(tree, mode, &mut out).unwrap();
		String::from_utf8(out).unwrap()
	}

	#[test]
	fn ids_follow_preorder() {
		let mut tree = QuadTree::with_side(4);
		tree.root.children = Some(Box::new({
			let q = tree.root.region.quadrants();
			[QuadNode::empty(q[0]), QuadNode::empty(q[1]), QuadNode::empty(q[2]), QuadNode::empty(q[3])]
		}));
		let ne = &mut tree.root.children.as_mut().unwrap()[1];
		let q = ne.region.quadrants();
		ne.children = Some(Box::new(
			[QuadNode::empty(q[0]), QuadNode::empty(q[1]), QuadNode::empty(q[2]), QuadNode::empty(q[3])]));
		let mut next = 0;
		assign_ids(&mut tree.root, &mut next);
		assert_eq!(next, 9);
		let mut ids = Vec::new();
		fn collect(n: &QuadNode, ids: &mut Vec<Option<u32>>) {
			ids.push(n.id);
			if let Some(ref c) = n.children {
				c.iter().for_each(|s| collect(s, ids));
			}
		}
		collect(&tree.root, &mut ids);
		assert_eq!(ids, (0..9).map(Some).collect::<Vec<_>>());
		assert_eq!(tree.root.children.as_ref().unwrap()[2].id, Some(7));
	}

	#[test]
	fn color_table_layout() {
		let text = written(&mut corners(), ColorMode::Rgba);
		assert_eq!(text, "0 1 2 3 4\n1f 255 0 0 255\n2f 0 255 0 255\n3f 0 0 255 255\n4f 255 255 255 128\n");
	}

	#[test]
	fn monochrome_table_layout() {
		let text = written(&mut corners(), ColorMode::Monochrome);
		assert_eq!(text, "0 1 2 3 4\n1 0\n2 0\n3 0\n4 1\n");
	}

	#[test]
	fn reads_what_it_writes() {
		let img = image::RgbaImage::from_fn(16, 16, |x, y| {
			if x < 8 { image::Rgba([0, 0, 0, 255]) } else { image::Rgba([(x * y) as u8, 60, 90, 255]) }
		});
		let mut tree = QuadTree::build(&img, &RefineConfig { budget: 40, threshold: None }).unwrap();
		tree.minimize();

		let back = read(&written(&mut tree, ColorMode::Rgba), ColorMode::Rgba, 16).unwrap();
		assert!(back.same_partition(&tree));
		assert_eq!(back.root.id, Some(0));

		let back = read(&written(&mut tree, ColorMode::Monochrome), ColorMode::Monochrome, 16).unwrap();
		let mut expected = tree.clone();
		expected.to_monochrome();
		assert!(back.same_partition(&expected));
	}

	#[test]
	fn lookup_is_by_id_not_position() {
		let text = "0 1 2 3 4\n4f 4 4 4 4\n3f 3 3 3 3\n\n2f 2 2 2 2\n1f 1 1 1 1\n";
		let tree = read(text, ColorMode::Rgba, 2).unwrap();
		let sects = tree.root.children.as_ref().unwrap();
		for (ind, s) in sects.iter().enumerate() {
			let v = ind as u8 + 1;
			assert_eq!(s.color, image::Rgba([v, v, v, v]));
		}
	}

	#[test]
	fn missing_node_is_reported() {
		let err = read("0 1 2 3 4\n1 0\n2 1\n4 0\n", ColorMode::Monochrome, 4).unwrap_err();
		assert!(matches!(err, DecodeError::MissingNode(3)));
		assert!(matches!(read("", ColorMode::Monochrome, 4), Err(DecodeError::MissingNode(0))));
	}

	#[test]
	fn malformed_lines_are_reported() {
		for bad in ["0 1 2", "x 1", "0 2", "0f 1 2 3", "0f 1 2 3 300", "0g 1 2 3 4", "0 1 2 3 4 5"].iter() {
			match read(bad, ColorMode::Monochrome, 4) {
				Err(DecodeError::MalformedLine { line: 1, .. }) => (),
				other => panic!("{:?} gave {:?}", bad, other),
			}
		}
	}

	#[test]
	fn children_must_come_after_parent() {
		let err = read("0 0 1 2 3\n1 0\n2 0\n3 0\n", ColorMode::Monochrome, 4).unwrap_err();
		assert!(matches!(err, DecodeError::MalformedLine { line: 1, .. }));
	}

	#[test]
	fn child_ids_are_never_shared() {
		// Twice on one line
		let err = read("0 1 1 2 3\n1 0\n2 0\n3 0\n", ColorMode::Monochrome, 4).unwrap_err();
		assert!(matches!(err, DecodeError::MalformedLine { line: 1, .. }));
		// Under two parents
		let text = "0 1 2 3 4\n1 5 6 7 8\n2 5 6 7 8\n3 0\n4 0\n5 0\n6 0\n7 0\n8 0\n";
		let err = read(text, ColorMode::Monochrome, 4).unwrap_err();
		assert!(matches!(err, DecodeError::MalformedLine { line: 3, .. }));
	}

	#[test]
	fn chain_of_shared_children_is_rejected_up_front() {
		let mut text = String::new();
		for i in 0..10 {
			text.push_str(&format!("{} {} {} {} {}\n", i, i + 1, i + 1, i + 1, i + 1));
		}
		text.push_str("10 1\n");
		let err = read(&text, ColorMode::Monochrome, 1024).unwrap_err();
		assert!(matches!(err, DecodeError::MalformedLine { line: 1, .. }));
	}

	#[test]
	fn leaf_kind_must_match_mode() {
		assert!(matches!(read("0f 1 2 3 4\n", ColorMode::Monochrome, 4),
			Err(DecodeError::ModeMismatch { line: 1 })));
		assert!(matches!(read("0 1\n", ColorMode::Rgba, 4),
			Err(DecodeError::ModeMismatch { line: 1 })));
	}

	#[test]
	fn cannot_split_single_pixel() {
		let text = "0 1 2 3 4\n1 0\n2 0\n3 0\n4 0\n";
		assert!(matches!(read(text, ColorMode::Monochrome, 1), Err(DecodeError::TooDeep(1))));
	}
}
