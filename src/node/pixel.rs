use super::render::Raster;
use super::Region;

pub type Color = image::Rgba<u8>;
type BigColor = image::Rgba<u64>;

fn color_add_big(a: BigColor, b: &Color) -> BigColor {
	image::Rgba::<u64>([
		a.0[0] + b.0[0] as u64,
		a.0[1] + b.0[1] as u64,
		a.0[2] + b.0[2] as u64,
		a.0[3] + b.0[3] as u64,
	])
}

fn color_div(a: BigColor, b: u64) -> Color {
	image::Rgba::<u8>([
		(a.0[0] / b) as u8,
		(a.0[1] / b) as u8,
		(a.0[2] / b) as u8,
		(a.0[3] / b) as u8,
	])
}

fn vec4_len_squared(a: i32, b: i32, c: i32, d: i32) -> i32 {
	a * a + b * b + c * c + d * d
}

/// Iterates over every pixel of `region`, row by row.
fn region_pixels<'a, R: Raster>(raster: &'a R, region: &Region) -> impl Iterator<Item = Color> + 'a {
	let Region { x, y, size } = *region;
	(y..y + size).flat_map(move |row| (x..x + size).map(move |col| raster.pixel(col, row)))
}

/// Average color of a square window of the raster.
///
/// Each channel is summed and divided by the pixel count with truncating
/// integer division, so the result is reproducible bit for bit.
pub fn average<R: Raster>(raster: &R, region: &Region) -> Color {
	let total = region_pixels(raster, region)
		.fold(image::Rgba::<u64>([0; 4]), |acc, p| color_add_big(acc, &p));
	color_div(total, region.area())
}

/// Sum of the distances between every pixel of `region` and `mean`.
pub fn region_error<R: Raster>(raster: &R, region: &Region, mean: &Color) -> f64 {
	region_pixels(raster, region)
		.map(|p| distance(mean, &p))
		.sum()
}

/// Euclidean distance between two colors over all four channels.
pub fn distance(a: &Color, b: &Color) -> f64 {
	let d = |i: usize| a.0[i] as i32 - b.0[i] as i32;
	(vec4_len_squared(d(0), d(1), d(2), d(3)) as f64).sqrt()
}

/// Exact per-channel equality.
pub fn equal(a: &Color, b: &Color) -> bool {
	a.0 == b.0
}

/// Thresholds the gray level `(R + G + B) / 3` at 128.
///
/// Alpha is ignored.
pub fn monochrome_bit(c: &Color) -> bool {
	let gray = (c.0[0] as u32 + c.0[1] as u32 + c.0[2] as u32) / 3;
	gray / 128 == 1
}

/// Color a monochrome bit stands for: black or white, fully opaque.
pub fn from_monochrome_bit(bit: bool) -> Color {
	let v = if bit { 255 } else { 0 };
	image::Rgba([v, v, v, 255])
}

/// What a color becomes after passing through a monochrome encoding.
pub fn to_monochrome(c: &Color) -> Color {
	from_monochrome_bit(monochrome_bit(c))
}
