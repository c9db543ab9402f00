use super::Region;

/// A leaf waiting to be refined.
///
/// The region is a handle to the leaf, not the leaf itself: within one tree
/// no two nodes share a region, so the refiner can find the node again
/// from it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pending {
	pub error: f64,
	pub region: Region,
}

/// Binary max-heap of pending leaves, keyed by error.
///
/// Each leaf goes in once when it is created and comes out at most once:
/// either when it is picked for subdivision or, if it gets split some other
/// way, through `remove`. Keys never change, so there is no decrease-key.
#[derive(Debug, Default)]
pub struct MaxErrorQueue {
	nodes: Vec<Pending>,
}

impl MaxErrorQueue {
	pub fn new() -> Self {
		Default::default()
	}

	pub fn with_capacity(capacity: usize) -> Self {
		MaxErrorQueue { nodes: Vec::with_capacity(capacity) }
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn insert(&mut self, entry: Pending) {
		if self.nodes.len() == self.nodes.capacity() {
			self.nodes.reserve_exact(self.nodes.capacity().max(1));
		}
		self.nodes.push(entry);
		self.sift_up(self.nodes.len() - 1);
	}

	/// Removes and returns the entry with the highest error, or `None` if
	/// the queue is empty.
	pub fn extract_max(&mut self) -> Option<Pending> {
		if self.nodes.is_empty() {
			return None;
		}
		let max = self.nodes.swap_remove(0);
		self.sift_down(0);
		Some(max)
	}

	/// Takes out the entry for `region`, wherever it sits in the heap.
	///
	/// Linear in the queue length.
	pub fn remove(&mut self, region: &Region) -> Option<Pending> {
		let pos = self.nodes.iter().position(|p| p.region == *region)?;
		let entry = self.nodes.swap_remove(pos);
		if pos < self.nodes.len() {
			// The moved-in last entry may belong above or below `pos`.
			self.sift_up(pos);
			self.sift_down(pos);
		}
		Some(entry)
	}

	fn sift_up(&mut self, mut curr: usize) {
		while curr > 0 {
			let parent = (curr - 1) / 2;
			if self.nodes[curr].error <= self.nodes[parent].error {
				break;
			}
			self.nodes.swap(curr, parent);
			curr = parent;
		}
	}

	fn sift_down(&mut self, mut curr: usize) {
		let len = self.nodes.len();
		loop {
			let (left, right) = (2 * curr + 1, 2 * curr + 2);
			let mut largest = curr;
			if left < len && self.nodes[left].error > self.nodes[largest].error {
				largest = left;
			}
			if right < len && self.nodes[right].error > self.nodes[largest].error {
				largest = right;
			}
			if largest == curr {
				break;
			}
			self.nodes.swap(curr, largest);
			curr = largest;
		}
	}
}
