use tracing::debug;

use super::error::AnalyzeError;
use super::heap::{MaxErrorQueue, Pending};
use super::pixel;
use super::render::Raster;
use super::{QuadNode, QuadTree, Region};

/// When the greedy refinement stops.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RefineConfig {
	/// Number of refinement steps; each pops one leaf and splits it if it
	/// can be split.
	pub budget: usize,
	/// If set, refinement ends as soon as the worst remaining leaf has an
	/// error no greater than this.
	pub threshold: Option<f64>,
}

impl Default for RefineConfig {
	fn default() -> Self {
		RefineConfig { budget: 100, threshold: None }
	}
}

/// Greedy builder that keeps splitting whichever leaf currently has the
/// largest error.
///
/// The queue belongs to one build and is dropped with the refiner.
#[derive(Debug)]
pub struct Refiner<'a, R: Raster> {
	image: &'a R,
	tree: QuadTree,
	queue: MaxErrorQueue,
	subdivisions: usize,
}

impl<'a, R: Raster> Refiner<'a, R> {
	/// Checks that `image` is a square with a power-of-two side and queues
	/// the root leaf covering all of it.
	pub fn new(image: &'a R) -> Result<Self, AnalyzeError> {
		let (width, height) = image.dimensions();
		if width != height {
			return Err(AnalyzeError::NonSquare { width, height });
		}
		if !width.is_power_of_two() {
			return Err(AnalyzeError::NonPowerOfTwo(width));
		}
		let mut queue = MaxErrorQueue::with_capacity(1024);
		let root = create_leaf(image, Region::new(0, 0, width), Some(&mut queue));
		Ok(Refiner {
			image,
			tree: QuadTree { root },
			queue,
			subdivisions: 0,
		})
	}

	pub fn tree(&self) -> &QuadTree {
		&self.tree
	}

	/// Number of leaves that have been split so far.
	pub fn subdivisions(&self) -> usize {
		self.subdivisions
	}

	/// Leaves still eligible for refinement.
	pub fn pending(&self) -> usize {
		self.queue.len()
	}

	/// Splits `region`'s leaf into its four quadrants, queueing each.
	///
	/// The leaf's own queue entry is taken out, so it won't be picked again.
	/// Returns `false` without changing anything if the leaf is a single
	/// pixel or `region` does not name a leaf of the tree.
	pub fn subdivide(&mut self, region: &Region) -> bool {
		if !self.split(region) {
			return false;
		}
		self.queue.remove(region);
		true
	}

	/// Splits a leaf whose queue entry has already been taken out.
	fn split(&mut self, region: &Region) -> bool {
		if region.size <= 1 {
			return false;
		}
		let image = self.image;
		let queue = &mut self.queue;
		let node = match self.tree.root.locate_mut(region) {
			Some(n) if n.is_leaf() => n,
			_ => return false,
		};
		let quads = region.quadrants();
		let sects = [
			create_leaf(image, quads[0], Some(&mut *queue)),
			create_leaf(image, quads[1], Some(&mut *queue)),
			create_leaf(image, quads[2], Some(&mut *queue)),
			create_leaf(image, quads[3], Some(&mut *queue)),
		];
		node.children = Some(Box::new(sects));
		self.subdivisions += 1;
		true
	}

	/// Pops the worst entry that still names a leaf of the tree.
	fn pop_leaf(&mut self) -> Option<Pending> {
		while let Some(p) = self.queue.extract_max() {
			if self.tree.root.locate_mut(&p.region).map_or(false, |n| n.is_leaf()) {
				return Some(p);
			}
		}
		None
	}

	/// Runs one refinement step.
	///
	/// Returns `false` once refinement cannot continue: the queue is
	/// exhausted or the threshold says the worst leaf is good enough.
	/// Popping a single-pixel leaf uses up the step but is otherwise a no-op.
	pub fn step(&mut self, threshold: Option<f64>) -> bool {
		let worst = match self.pop_leaf() {
			Some(p) => p,
			None => return false,
		};
		if let Some(limit) = threshold {
			if worst.error <= limit {
				return false;
			}
		}
		self.split(&worst.region);
		true
	}

	pub fn run(&mut self, config: &RefineConfig) {
		for _ in 0..config.budget {
			if !self.step(config.threshold) {
				break;
			}
		}
		debug!(
			subdivisions = self.subdivisions,
			nodes = 1 + 4 * self.subdivisions,
			pending = self.queue.len(),
			"refinement finished"
		);
	}

	pub fn finish(self) -> QuadTree {
		self.tree
	}
}

/// Makes a leaf over `region` colored with the region's average, with its
/// error computed, and queues it if a queue is given.
pub fn create_leaf<R: Raster>(image: &R, region: Region, queue: Option<&mut MaxErrorQueue>) -> QuadNode {
	let color = pixel::average(image, &region);
	let error = pixel::region_error(image, &region, &color);
	if let Some(queue) = queue {
		queue.insert(Pending { error, region });
	}
	QuadNode {
		region,
		color,
		error: Some(error),
		children: None,
		id: None,
	}
}

impl QuadTree {
	/// Analyzes an image into a quadtree by repeatedly splitting the leaf
	/// whose average color represents its pixels worst.
	pub fn build<R: Raster>(image: &R, config: &RefineConfig) -> Result<QuadTree, AnalyzeError> {
		let mut refiner = Refiner::new(image)?;
		refiner.run(config);
		Ok(refiner.finish())
	}
}
