//! The drawing surface the avatar is sketched on.
//!
//! `Surface` is what the controller renders through. `PixmapSurface` is the
//! headless implementation used natively and in tests; the browser build
//! renders onto the page canvas instead (see `web::CanvasSurface`).

use std::{fmt, io::Cursor, str::FromStr};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{ImageFormat, RgbaImage, imageops::FilterType};
use tiny_skia::{IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke, Transform};

use crate::error::GameError;

/// A point in surface-local pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
	pub x: f32,
	pub y: f32,
}

impl Point {
	pub fn new(x: f32, y: f32) -> Self {
		Self { x, y }
	}
}

/// Straight (non-premultiplied) RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: u8,
}

impl Color {
	pub const BLACK: Color = Color::rgb(0, 0, 0);
	pub const WHITE: Color = Color::rgb(255, 255, 255);

	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 255 }
	}

	/// CSS form understood by the canvas `strokeStyle`/`fillStyle` setters.
	pub fn to_css(self) -> String {
		if self.a == 255 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a as f32 / 255.0)
		}
	}

	fn to_skia(self) -> tiny_skia::Color {
		tiny_skia::Color::from_rgba8(self.r, self.g, self.b, self.a)
	}
}

impl fmt::Display for Color {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.to_css())
	}
}

impl FromStr for Color {
	type Err = GameError;

	/// Parses the `#rrggbb` values produced by `<input type="color">`, plus
	/// the `#rgb` shorthand.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || GameError::InvalidColor(s.to_string());
		let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
		if !hex.is_ascii() {
			return Err(invalid());
		}
		let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());

		match hex.len() {
			6 => Ok(Color::rgb(channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
			3 => {
				// #abc == #aabbcc
				let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
				Ok(Color::rgb(short(0)?, short(1)?, short(2)?))
			},
			_ => Err(invalid()),
		}
	}
}

/// Raster drawing operations the controller needs from a display surface.
pub trait Surface {
	/// Width and height in pixels.
	fn size(&self) -> (u32, u32);

	/// Cover the whole surface with `color`.
	fn fill(&mut self, color: Color) -> Result<(), GameError>;

	/// Render one straight segment of a freehand stroke.
	fn stroke_segment(&mut self, from: Point, to: Point, color: Color, width: f32) -> Result<(), GameError>;

	/// Draw `image` stretched to exactly cover the surface, over whatever is
	/// already there.
	fn draw_image_scaled(&mut self, image: &RgbaImage) -> Result<(), GameError>;

	/// Export the current raster as a `data:image/png;base64,…` URL.
	fn snapshot(&self) -> Result<String, GameError>;
}

/// Decode an uploaded file with whatever codec its bytes identify.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, GameError> {
	Ok(image::load_from_memory(bytes)?.to_rgba8())
}

pub fn png_data_url(png: &[u8]) -> String {
	format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// In-memory surface backed by a tiny-skia pixmap.
pub struct PixmapSurface {
	pixmap: Pixmap,
}

impl PixmapSurface {
	/// A new surface filled white, like a fresh page canvas.
	pub fn new(width: u32, height: u32) -> Result<Self, GameError> {
		let mut pixmap = Pixmap::new(width, height).ok_or_else(|| GameError::Surface(format!("cannot allocate a {width}x{height} pixmap")))?;
		pixmap.fill(tiny_skia::Color::WHITE);
		Ok(Self { pixmap })
	}

	/// Straight-alpha colour of one pixel, `None` outside the surface.
	pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
		// tiny-skia only bounds-checks the flat index
		if x >= self.pixmap.width() || y >= self.pixmap.height() {
			return None;
		}
		let c = self.pixmap.pixel(x, y)?.demultiply();
		Some(Color {
			r: c.red(),
			g: c.green(),
			b: c.blue(),
			a: c.alpha(),
		})
	}

	pub fn to_png(&self) -> Result<Vec<u8>, GameError> {
		let (width, height) = self.size();
		let img = RgbaImage::from_fn(width, height, |x, y| {
			let c = self.pixel(x, y).unwrap_or(Color::WHITE);
			image::Rgba([c.r, c.g, c.b, c.a])
		});

		let mut buffer = Cursor::new(Vec::new());
		img.write_to(&mut buffer, ImageFormat::Png)
			.map_err(|e| GameError::Surface(format!("PNG export failed: {e}")))?;
		Ok(buffer.into_inner())
	}
}

impl Surface for PixmapSurface {
	fn size(&self) -> (u32, u32) {
		(self.pixmap.width(), self.pixmap.height())
	}

	fn fill(&mut self, color: Color) -> Result<(), GameError> {
		self.pixmap.fill(color.to_skia());
		Ok(())
	}

	fn stroke_segment(&mut self, from: Point, to: Point, color: Color, width: f32) -> Result<(), GameError> {
		let mut paint = Paint::default();
		paint.set_color(color.to_skia());
		paint.anti_alias = true;

		let stroke = Stroke {
			width,
			line_cap: LineCap::Round,
			line_join: LineJoin::Round,
			..Default::default()
		};

		let mut pb = PathBuilder::new();
		if from == to {
			// a click without movement still leaves a dot
			pb.push_circle(from.x, from.y, width.max(1.0) / 2.0);
		} else {
			pb.move_to(from.x, from.y);
			pb.line_to(to.x, to.y);
		}

		if let Some(path) = pb.finish() {
			self.pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
		}
		Ok(())
	}

	fn draw_image_scaled(&mut self, image: &RgbaImage) -> Result<(), GameError> {
		let (width, height) = self.size();
		let scaled = image::imageops::resize(image, width, height, FilterType::Triangle);

		// tiny-skia wants premultiplied alpha
		let mut data = scaled.into_raw();
		for px in data.chunks_exact_mut(4) {
			let a = px[3] as u16;
			for c in &mut px[..3] {
				*c = ((*c as u16 * a + 127) / 255) as u8;
			}
		}

		let size = IntSize::from_wh(width, height).ok_or_else(|| GameError::Surface(format!("invalid size {width}x{height}")))?;
		let layer = Pixmap::from_vec(data, size).ok_or_else(|| GameError::Surface("decoded image does not fit the surface".into()))?;
		self.pixmap.draw_pixmap(0, 0, layer.as_ref(), &PixmapPaint::default(), Transform::identity(), None);
		Ok(())
	}

	fn snapshot(&self) -> Result<String, GameError> {
		Ok(png_data_url(&self.to_png()?))
	}
}


#[cfg(test)]
mod tests {
	use base64::Engine as _;

	use super::*;

	fn png_of(img: &RgbaImage) -> Vec<u8> {
		let mut buffer = Cursor::new(Vec::new());
		img.write_to(&mut buffer, ImageFormat::Png).expect("encode png");
		buffer.into_inner()
	}

	fn all_white(surface: &PixmapSurface) -> bool {
		let (w, h) = surface.size();
		(0..h).all(|y| (0..w).all(|x| surface.pixel(x, y) == Some(Color::WHITE)))
	}

	#[test]
	fn parse_hex_colours() {
		assert_eq!("#ff8800".parse::<Color>().unwrap(), Color::rgb(255, 136, 0));
		assert_eq!("#000000".parse::<Color>().unwrap(), Color::BLACK);
		assert_eq!("#fff".parse::<Color>().unwrap(), Color::WHITE);
		assert_eq!("#1A2b3C".parse::<Color>().unwrap(), Color::rgb(0x1a, 0x2b, 0x3c));
	}

	#[test]
	fn reject_malformed_colours() {
		for bad in ["", "red", "ff0000", "#ff00", "#gg0000", "#ff00000", "#ééé"] {
			assert!(matches!(bad.parse::<Color>(), Err(GameError::InvalidColor(_))), "{bad:?}");
		}
	}

	#[test]
	fn css_round_trip_for_opaque_colours() {
		let c = Color::rgb(18, 52, 86);
		assert_eq!(c.to_css(), "#123456");
		assert_eq!(c.to_css().parse::<Color>().unwrap(), c);
	}

	#[test]
	fn new_surface_is_white() {
		let surface = PixmapSurface::new(16, 8).unwrap();
		assert_eq!(surface.size(), (16, 8));
		assert!(all_white(&surface));
		assert_eq!(surface.pixel(16, 0), None);
		assert_eq!(surface.pixel(0, 8), None);
		assert_eq!(surface.pixel(20, 7), None);
	}

	#[test]
	fn zero_sized_surface_is_an_error() {
		assert!(matches!(PixmapSurface::new(0, 10), Err(GameError::Surface(_))));
	}

	#[test]
	fn segment_marks_pixels_along_its_path_only() {
		let mut surface = PixmapSurface::new(20, 20).unwrap();
		surface
			.stroke_segment(Point::new(2.0, 10.0), Point::new(18.0, 10.0), Color::rgb(255, 0, 0), 2.0)
			.unwrap();

		let on_line = surface.pixel(10, 10).unwrap();
		assert_eq!(on_line.r, 255);
		assert!(on_line.g < 128 && on_line.b < 128, "{on_line:?}");
		assert_eq!(surface.pixel(10, 2), Some(Color::WHITE));
		assert_eq!(surface.pixel(10, 18), Some(Color::WHITE));
	}

	#[test]
	fn zero_length_segment_leaves_a_dot() {
		let mut surface = PixmapSurface::new(10, 10).unwrap();
		let at = Point::new(5.5, 5.5);
		surface.stroke_segment(at, at, Color::rgb(255, 0, 0), 1.0).unwrap();

		let dot = surface.pixel(5, 5).unwrap();
		assert!(dot.g < 255 && dot.b < 255, "{dot:?}");
		assert_eq!(surface.pixel(2, 2), Some(Color::WHITE));
	}

	#[test]
	fn fill_covers_everything() {
		let mut surface = PixmapSurface::new(8, 8).unwrap();
		surface.stroke_segment(Point::new(0.0, 0.0), Point::new(8.0, 8.0), Color::BLACK, 3.0).unwrap();
		assert!(!all_white(&surface));
		surface.fill(Color::WHITE).unwrap();
		assert!(all_white(&surface));
	}

	#[test]
	fn uploaded_image_is_stretched_over_the_surface() {
		let mut surface = PixmapSurface::new(10, 6).unwrap();
		let blue = RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 255, 255]));
		let decoded = decode_image(&png_of(&blue)).unwrap();

		surface.draw_image_scaled(&decoded).unwrap();
		for (x, y) in [(0, 0), (9, 0), (0, 5), (9, 5), (4, 3)] {
			assert_eq!(surface.pixel(x, y), Some(Color::rgb(0, 0, 255)), "({x}, {y})");
		}
	}

	#[test]
	fn transparent_upload_keeps_existing_content() {
		let mut surface = PixmapSurface::new(4, 4).unwrap();
		let clear = RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 0]));
		surface.draw_image_scaled(&clear).unwrap();
		assert!(all_white(&surface));
	}

	#[test]
	fn garbage_bytes_do_not_decode() {
		assert!(matches!(decode_image(b"definitely not an image"), Err(GameError::ImageDecode(_))));
		assert!(matches!(decode_image(&[]), Err(GameError::ImageDecode(_))));
	}

	#[test]
	fn snapshot_is_a_png_data_url() {
		let surface = PixmapSurface::new(4, 4).unwrap();
		let png = surface.to_png().unwrap();
		assert_eq!(&png[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);

		let url = surface.snapshot().unwrap();
		let encoded = url.strip_prefix("data:image/png;base64,").expect("data url prefix");
		assert_eq!(STANDARD.decode(encoded).unwrap(), png);
	}
}
