use super::error::DrawError;
use super::pixel::Color;
use super::{QuadTree, Region};

/// Read access to the pixels of a source image.
pub trait Raster {
	/// Width and height in pixels.
	fn dimensions(&self) -> (u32, u32);
	/// The four channels at `(x, y)`; coordinates are in bounds.
	fn pixel(&self, x: u32, y: u32) -> Color;
}

impl Raster for image::RgbaImage {
	fn dimensions(&self) -> (u32, u32) {
		image::RgbaImage::dimensions(self)
	}
	fn pixel(&self, x: u32, y: u32) -> Color {
		*self.get_pixel(x, y)
	}
}

/// Something a tree can be drawn on.
pub trait Surface {
	/// Width and height in pixels.
	fn dimensions(&self) -> (u32, u32);
	fn fill_rect(&mut self, region: &Region, color: Color);
	/// Fills the disc inscribed in `region`.
	fn fill_circle(&mut self, region: &Region, color: Color);
}

impl Surface for image::RgbaImage {
	fn dimensions(&self) -> (u32, u32) {
		image::RgbaImage::dimensions(self)
	}

	fn fill_rect(&mut self, region: &Region, color: Color) {
		for row in region.y..region.y + region.size {
			for col in region.x..region.x + region.size {
				self.put_pixel(col, row, color);
			}
		}
	}

	fn fill_circle(&mut self, region: &Region, color: Color) {
		let radius = region.size as f64 / 2.;
		let (cx, cy) = (region.x as f64 + radius, region.y as f64 + radius);
		for row in region.y..region.y + region.size {
			for col in region.x..region.x + region.size {
				let dx = col as f64 + 0.5 - cx;
				let dy = row as f64 + 0.5 - cy;
				if dx * dx + dy * dy <= radius * radius {
					self.put_pixel(col, row, color);
				}
			}
		}
	}
}

/// How leaves are drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeafShape {
	/// Each leaf fills its whole square.
	Square,
	/// Each leaf is a disc inscribed in its square, on a black background.
	Circle,
}

/// Draws the leaves of `tree` onto `surface`.
///
/// The surface must be at least as large as the tree's canvas; anything
/// outside the canvas is left alone.
pub fn render<S: Surface>(tree: &QuadTree, surface: &mut S, shape: LeafShape) -> Result<(), DrawError> {
	let (width, height) = surface.dimensions();
	let side = tree.side();
	if width < side || height < side {
		return Err(DrawError::TooSmall { width, height, side });
	}
	if shape == LeafShape::Circle {
		surface.fill_rect(&tree.root.region, image::Rgba([0, 0, 0, 255]));
	}
	tree.walk(|view| {
		if !view.is_leaf {
			return;
		}
		match shape {
			LeafShape::Square => surface.fill_rect(&view.region, view.color),
			LeafShape::Circle => surface.fill_circle(&view.region, view.color),
		}
	});
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::node::QuadNode;

	fn two_tone() -> QuadTree {
		let mut tree = QuadTree::with_side(4);
		let quads = tree.root.region.quadrants();
		let mut sects = [
			QuadNode::empty(quads[0]),
			QuadNode::empty(quads[1]),
			QuadNode::empty(quads[2]),
			QuadNode::empty(quads[3]),
		];
		for (ind, s) in sects.iter_mut().enumerate() {
			s.color = if ind % 3 == 0 { image::Rgba([255, 0, 0, 255]) } else { image::Rgba([0, 0, 255, 255]) };
		}
		tree.root.children = Some(Box::new(sects));
		tree
	}

	#[test]
	fn squares_cover_each_leaf() {
		let tree = two_tone();
		let mut out = image::RgbaImage::new(4, 4);
		render(&tree, &mut out, LeafShape::Square).unwrap();
		assert_eq!(*out.get_pixel(0, 0), image::Rgba([255, 0, 0, 255]));
		assert_eq!(*out.get_pixel(3, 0), image::Rgba([0, 0, 255, 255]));
		assert_eq!(*out.get_pixel(1, 3), image::Rgba([0, 0, 255, 255]));
		assert_eq!(*out.get_pixel(3, 3), image::Rgba([255, 0, 0, 255]));
	}

	#[test]
	fn circles_leave_black_corners() {
		let mut tree = QuadTree::with_side(8);
		tree.root.color = image::Rgba([0, 255, 0, 255]);
		let mut out = image::RgbaImage::new(8, 8);
		render(&tree, &mut out, LeafShape::Circle).unwrap();
		assert_eq!(*out.get_pixel(0, 0), image::Rgba([0, 0, 0, 255]));
		assert_eq!(*out.get_pixel(4, 4), image::Rgba([0, 255, 0, 255]));
		assert_eq!(*out.get_pixel(0, 4), image::Rgba([0, 255, 0, 255]));
	}

	#[test]
	fn surface_must_fit_the_canvas() {
		let tree = two_tone();
		let mut out = image::RgbaImage::new(2, 4);
		assert!(render(&tree, &mut out, LeafShape::Square).is_err());
	}
}
