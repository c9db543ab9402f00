use bitvec::prelude::*;
use tracing::debug;

use super::error::DecodeError;
use super::pixel;
use super::store::ColorMode;
use super::{QuadNode, QuadTree, Region};

/// A `BitVec` variant ideal for encoding and decoding quadtrees.
type QuadtreeEncodeBitVec = BitVec<u8, Msb0>;

fn push_byte(buffer: &mut QuadtreeEncodeBitVec, byte: u8) {
	for bit_ind in 0..8 {
		buffer.push(byte & (1 << (7 - bit_ind)) != 0);
	}
}

/// Reads bits front to back out of a byte slice.
struct BitReader<'a> {
	bits: &'a BitSlice<u8, Msb0>,
	pos: usize,
}

impl<'a> BitReader<'a> {
	fn new(bytes: &'a [u8]) -> Self {
		BitReader { bits: bytes.view_bits::<Msb0>(), pos: 0 }
	}

	fn bit(&mut self) -> Result<bool, DecodeError> {
		if self.pos >= self.bits.len() {
			return Err(DecodeError::InsufficientData);
		}
		let b = self.bits[self.pos];
		self.pos += 1;
		Ok(b)
	}

	fn byte(&mut self) -> Result<u8, DecodeError> {
		let mut n = 0;
		for bit_ind in 0..8 {
			n |= (self.bit()? as u8) << (7 - bit_ind);
		}
		Ok(n)
	}

	fn remaining(&self) -> usize {
		self.bits.len() - self.pos
	}
}

impl QuadNode {
	/// Appends this node and its descendants to `buffer`, pre-order.
	///
	/// Each node starts with one bit, set for leaves. A leaf is followed by
	/// its color: one bit in monochrome mode, otherwise four bytes in red,
	/// blue, green, alpha order. Internal nodes have nothing after the flag;
	/// their four children follow in northwest, northeast, southwest,
	/// southeast order.
	fn encode_bits(&self, buffer: &mut QuadtreeEncodeBitVec, mode: ColorMode) {
		buffer.push(self.is_leaf());
		match self.children {
			None => match mode {
				ColorMode::Monochrome => buffer.push(pixel::monochrome_bit(&self.color)),
				ColorMode::Rgba => {
					let [r, g, b, a] = self.color.0;
					for &channel in [r, b, g, a].iter() {
						push_byte(buffer, channel);
					}
				}
			},
			Some(ref sects) => {
				for section in sects.iter() {
					section.encode_bits(buffer, mode);
				}
			}
		}
	}

	/// Reads this node's flag and payload, creating and filling in four
	/// children for an internal node.
	fn decode_bits(&mut self, reader: &mut BitReader<'_>, mode: ColorMode) -> Result<(), DecodeError> {
		if reader.bit()? {
			self.color = match mode {
				ColorMode::Monochrome => pixel::from_monochrome_bit(reader.bit()?),
				ColorMode::Rgba => {
					let r = reader.byte()?;
					let b = reader.byte()?;
					let g = reader.byte()?;
					let a = reader.byte()?;
					image::Rgba([r, g, b, a])
				}
			};
			return Ok(());
		}
		if self.region.size <= 1 {
			return Err(DecodeError::TooDeep(self.region.size));
		}
		let quads = self.region.quadrants();
		let mut sects = [
			QuadNode::empty(quads[0]),
			QuadNode::empty(quads[1]),
			QuadNode::empty(quads[2]),
			QuadNode::empty(quads[3]),
		];
		for section in sects.iter_mut() {
			section.decode_bits(reader, mode)?;
		}
		self.children = Some(Box::new(sects));
		Ok(())
	}
}

/// Encodes `tree` as a pre-order bit stream, most significant bit first.
///
/// The last byte is zero-padded at the low end. Nothing records the canvas
/// size or the color mode; a reader has to know both.
pub fn encode(tree: &QuadTree, mode: ColorMode) -> Vec<u8> {
	let mut buffer = QuadtreeEncodeBitVec::new();
	tree.root.encode_bits(&mut buffer, mode);
	let bits = buffer.len();
	while buffer.len() % 8 != 0 {
		buffer.push(false);
	}
	let bytes = buffer.into_vec();
	debug!(bits, bytes = bytes.len(), ?mode, "encoded quadtree bit stream");
	bytes
}

/// Reads a bit stream of the sort `encode` produces into a tree covering a
/// `side`-wide canvas.
///
/// Up to seven padding bits may follow the last node; anything more is an
/// error.
pub fn decode(bytes: &[u8], mode: ColorMode, side: u32) -> Result<QuadTree, DecodeError> {
	if !side.is_power_of_two() {
		return Err(DecodeError::InvalidSide(side));
	}
	let mut reader = BitReader::new(bytes);
	let mut root = QuadNode::empty(Region::new(0, 0, side));
	root.decode_bits(&mut reader, mode)?;
	if reader.remaining() >= 8 {
		return Err(DecodeError::TrailingData(reader.remaining()));
	}
	let tree = QuadTree { root };
	debug!(nodes = tree.node_count(), ?mode, "decoded quadtree bit stream");
	Ok(tree)
}
