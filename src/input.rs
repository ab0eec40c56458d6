use crate::lessons::Subject;
use crate::surface::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
	Up,
	Down,
	Left,
	Right,
}

impl Direction {
	/// Map a `KeyboardEvent.key` identifier onto a direction. Anything other
	/// than the four arrow keys is not a movement key.
	pub fn from_key(key: &str) -> Option<Direction> {
		match key {
			"ArrowUp" => Some(Direction::Up),
			"ArrowDown" => Some(Direction::Down),
			"ArrowLeft" => Some(Direction::Left),
			"ArrowRight" => Some(Direction::Right),
			_ => None,
		}
	}
}

/// Platform-neutral events. Front ends translate whatever their platform
/// emits into these and hand them to `Controller::dispatch`.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
	/// Pointer pressed on the drawing surface, in surface-local coordinates.
	PointerDown(Point),
	PointerMove(Point),
	PointerUp,
	/// Value of the colour picker, e.g. `#ff8800`.
	ColorPicked(String),
	ClearRequested,
	/// Raw bytes of the selected file, `None` if the selection was emptied.
	FileSelected(Option<Vec<u8>>),
	/// Contents of the name field at the time start was pressed.
	StartRequested(Option<String>),
	KeyPressed(String),
	ClassroomClicked(Subject),
	CloseLesson,
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn arrow_keys_map_to_directions() {
		assert_eq!(Direction::from_key("ArrowUp"), Some(Direction::Up));
		assert_eq!(Direction::from_key("ArrowDown"), Some(Direction::Down));
		assert_eq!(Direction::from_key("ArrowLeft"), Some(Direction::Left));
		assert_eq!(Direction::from_key("ArrowRight"), Some(Direction::Right));
	}

	#[test]
	fn other_keys_are_ignored() {
		for key in ["w", "Enter", " ", "arrowup", "Up", ""] {
			assert_eq!(Direction::from_key(key), None, "{key:?}");
		}
	}
}
