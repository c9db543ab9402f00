pub mod node;

pub use node::*;

pub use node::error::{AnalyzeError, DecodeError, DrawError, StoreError};
pub use node::refine::RefineConfig;
pub use node::store::{load, save, ColorMode, Encoding, Format};

use tracing::debug;

impl node::QuadNode {
	/// Merges every group of four sibling leaves that share one color into
	/// their parent, from the bottom up.
	///
	/// Returns whether this node is now a leaf. A node whose children are
	/// not all leaves is never merged, even if its grandchildren are all
	/// the same color.
	pub fn minimize(&mut self) -> bool {
		let mergeable = match self.children {
			None => return true,
			Some(ref mut sects) => {
				// Every child gets minimized, even after one refuses to merge.
				let all_leaves = sects.iter_mut().fold(true, |acc, s| s.minimize() && acc);
				let first = sects[0].color;
				all_leaves && sects[1..].iter().all(|s| pixel::equal(&s.color, &first))
			}
		};
		if mergeable {
			if let Some(sects) = self.children.take() {
				self.color = sects[0].color;
			}
		}
		mergeable
	}
}

impl node::QuadTree {
	/// Collapses the tree in place; see `QuadNode::minimize`.
	///
	/// Running it twice changes nothing the second time.
	pub fn minimize(&mut self) -> bool {
		let before = self.node_count();
		let collapsed = self.root.minimize();
		debug!(before, after = self.node_count(), "minimized quadtree");
		collapsed
	}
}
