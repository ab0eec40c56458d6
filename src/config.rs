use crate::player::Position;
use crate::surface::Color;

/// Every tunable of a session. The defaults are the values the page was
/// designed around: a 750×550 map, 10 unit steps and a 200×200 avatar canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
	pub map_width: i32,
	pub map_height: i32,
	pub step: i32,
	pub start: Position,
	pub canvas_width: u32,
	pub canvas_height: u32,
	pub stroke_width: f32,
	pub stroke_color: Color,
}

impl Default for GameConfig {
	fn default() -> Self {
		Self {
			map_width: 750,
			map_height: 550,
			step: 10,
			start: Position { x: 400, y: 300 },
			canvas_width: 200,
			canvas_height: 200,
			stroke_width: 1.0,
			stroke_color: Color::BLACK,
		}
	}
}
