pub mod error;
pub mod pixel;

use pixel::Color;

/// An axis-aligned square of the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Region {
	pub x: u32,
	pub y: u32,
	pub size: u32,
}

impl Region {
	pub fn new(x: u32, y: u32, size: u32) -> Self {
		Region { x, y, size }
	}

	pub fn area(&self) -> u64 {
		self.size as u64 * self.size as u64
	}

	/// The four halves of this region, in northwest, northeast, southwest,
	/// southeast order.
	///
	/// Every traversal in this crate (subdivision, both encodings, id
	/// assignment) visits children in this order.
	pub fn quadrants(&self) -> [Region; 4] {
		let half = self.size / 2;
		[
			Region::new(self.x, self.y, half),
			Region::new(self.x + half, self.y, half),
			Region::new(self.x, self.y + half, half),
			Region::new(self.x + half, self.y + half, half),
		]
	}

	/// Whether `other` lies entirely inside this region.
	pub fn encloses(&self, other: &Region) -> bool {
		other.x >= self.x && other.y >= self.y &&
			other.x + other.size <= self.x + self.size &&
			other.y + other.size <= self.y + self.size
	}

	/// Index into `quadrants()` of the quadrant containing point `(x, y)`.
	fn quadrant_index(&self, x: u32, y: u32) -> usize {
		let half = self.size / 2;
		let east = (x >= self.x + half) as usize;
		let south = (y >= self.y + half) as usize;
		east | (south << 1)
	}
}

/// Node in a quadtree partition of an image.
///
/// Has either no children (leaf node) or exactly four (internal node);
/// the boxed array makes any other count unrepresentable.
#[derive(Clone, Debug)]
pub struct QuadNode {
	pub region: Region,
	/// Average color of the region for nodes built from an image, or the
	/// stored color for decoded leaves. Decoded internal nodes carry none
	/// and keep the zero color.
	pub color: Color,
	/// Summed distance of every pixel from `color`.
	///
	/// Only meaningful while the node is a leaf built from pixel data; it is
	/// left untouched when the node is subdivided and is `None` on decoded
	/// nodes.
	pub error: Option<f64>,
	pub children: Option<Box<[QuadNode; 4]>>,
	/// Pre-order id, assigned right before a textual save.
	pub id: Option<u32>,
}

/// What the read-only walk reports about each node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeView {
	pub region: Region,
	pub color: Color,
	pub is_leaf: bool,
	pub depth: u32,
}

impl QuadNode {
	/// A childless node with no color yet, as the decoders create them.
	pub fn empty(region: Region) -> Self {
		QuadNode {
			region,
			color: image::Rgba([0; 4]),
			error: None,
			children: None,
			id: None,
		}
	}

	pub fn is_leaf(&self) -> bool {
		self.children.is_none()
	}

	/// Finds the node covering exactly `target`, if the tree has one.
	pub fn locate_mut(&mut self, target: &Region) -> Option<&mut QuadNode> {
		if self.region == *target {
			return Some(self);
		}
		if !self.region.encloses(target) {
			return None;
		}
		let ind = self.region.quadrant_index(target.x, target.y);
		self.children.as_mut()?[ind].locate_mut(target)
	}

	pub fn node_count(&self) -> usize {
		1 + self.children.as_ref()
			.map(|c| c.iter().map(QuadNode::node_count).sum())
			.unwrap_or(0)
	}

	pub fn leaf_count(&self) -> usize {
		match self.children {
			Some(ref c) => c.iter().map(QuadNode::leaf_count).sum(),
			None => 1,
		}
	}

	/// Checks that every internal node's children are the four quadrants
	/// of its region, in order.
	pub fn is_well_formed(&self) -> bool {
		match self.children {
			Some(ref c) => self.region.size > 1 &&
				c.iter().zip(self.region.quadrants().iter())
					.all(|(child, quad)| child.region == *quad && child.is_well_formed()),
			None => true,
		}
	}

	/// Whether both subtrees partition their regions identically and give
	/// identical colors to corresponding leaves.
	///
	/// Internal node colors are ignored; decoding never restores them.
	pub fn same_partition(&self, other: &QuadNode) -> bool {
		if self.region != other.region {
			return false;
		}
		match (&self.children, &other.children) {
			(None, None) => pixel::equal(&self.color, &other.color),
			(Some(a), Some(b)) => a.iter().zip(b.iter()).all(|(a, b)| a.same_partition(b)),
			_ => false,
		}
	}

	fn walk_inner<F: FnMut(NodeView)>(&self, depth: u32, visit: &mut F) {
		visit(NodeView {
			region: self.region,
			color: self.color,
			is_leaf: self.is_leaf(),
			depth,
		});
		if let Some(ref sects) = self.children {
			for section in sects.iter() {
				section.walk_inner(depth + 1, visit);
			}
		}
	}
}

/// A quadtree over a square canvas whose side is a power of two.
#[derive(Clone, Debug)]
pub struct QuadTree {
	pub root: QuadNode,
}

impl QuadTree {
	/// A tree that is a single uncolored leaf covering a `side`-wide canvas.
	pub fn with_side(side: u32) -> Self {
		QuadTree { root: QuadNode::empty(Region::new(0, 0, side)) }
	}

	pub fn side(&self) -> u32 {
		self.root.region.size
	}

	pub fn node_count(&self) -> usize {
		self.root.node_count()
	}

	pub fn leaf_count(&self) -> usize {
		self.root.leaf_count()
	}

	pub fn is_well_formed(&self) -> bool {
		self.root.is_well_formed()
	}

	pub fn same_partition(&self, other: &QuadTree) -> bool {
		self.root.same_partition(&other.root)
	}

	/// Visits every node in pre-order (node, then its northwest, northeast,
	/// southwest and southeast subtrees) without modifying anything.
	///
	/// Renderers use this; the tree itself never calls it.
	pub fn walk<F: FnMut(NodeView)>(&self, mut visit: F) {
		self.root.walk_inner(0, &mut visit);
	}

	/// Replaces every leaf color with what a monochrome encoding would
	/// store for it.
	pub fn to_monochrome(&mut self) {
		fn recurse(node: &mut QuadNode) {
			match node.children {
				Some(ref mut c) => c.iter_mut().for_each(recurse),
				None => node.color = pixel::to_monochrome(&node.color),
			}
		}
		recurse(&mut self.root);
	}
}

pub mod bitstream;
pub mod heap;
pub mod render;
pub mod refine;
pub mod store;
pub mod table;
