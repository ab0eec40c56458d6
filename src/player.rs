use crate::input::Direction;

/// Top-left corner of the avatar on the map, in map units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
	pub x: i32,
	pub y: i32,
}

impl Position {
	/// Move `step` units towards `dir`, staying inside `[0, max_x] × [0, max_y]`.
	pub fn stepped(self, dir: Direction, step: i32, max_x: i32, max_y: i32) -> Position {
		let Position { x, y } = self;
		let (x, y) = match dir {
			Direction::Up => (x, (y - step).max(0)),
			Direction::Down => (x, (y + step).min(max_y)),
			Direction::Left => ((x - step).max(0), y),
			Direction::Right => ((x + step).min(max_x), y),
		};
		Position { x, y }
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn steps_in_each_direction() {
		let p = Position { x: 400, y: 300 };
		assert_eq!(p.stepped(Direction::Up, 10, 750, 550), Position { x: 400, y: 290 });
		assert_eq!(p.stepped(Direction::Down, 10, 750, 550), Position { x: 400, y: 310 });
		assert_eq!(p.stepped(Direction::Left, 10, 750, 550), Position { x: 390, y: 300 });
		assert_eq!(p.stepped(Direction::Right, 10, 750, 550), Position { x: 410, y: 300 });
	}

	#[test]
	fn clamps_at_edges() {
		let corner = Position { x: 5, y: 545 };
		assert_eq!(corner.stepped(Direction::Left, 10, 750, 550).x, 0);
		assert_eq!(corner.stepped(Direction::Down, 10, 750, 550).y, 550);

		let far = Position { x: 745, y: 3 };
		assert_eq!(far.stepped(Direction::Right, 10, 750, 550).x, 750);
		assert_eq!(far.stepped(Direction::Up, 10, 750, 550).y, 0);
	}
}
