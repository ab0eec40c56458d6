//! The page chrome around the drawing surface: screens, the map with its
//! avatar and classrooms, the lesson panel, and alerts.

use std::collections::HashSet;

use crate::error::GameError;
use crate::lessons::ClassroomMarker;
use crate::player::Position;

/// Top-level views the controller toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
	/// Avatar drawing and name entry.
	Start,
	/// The map with the avatar and classrooms.
	Game,
	/// The lesson overlay on top of the map.
	Lesson,
}

pub trait Shell {
	fn show(&mut self, view: View) -> Result<(), GameError>;
	fn hide(&mut self, view: View) -> Result<(), GameError>;

	/// Put the avatar element on the map, rendered from `avatar` (an image
	/// URL), at `position`. An avatar already on the map is replaced.
	fn place_player(&mut self, avatar: &str, position: Position) -> Result<(), GameError>;
	fn move_player(&mut self, position: Position) -> Result<(), GameError>;

	fn add_classroom(&mut self, marker: &ClassroomMarker) -> Result<(), GameError>;

	/// Replace the title and body of the lesson panel. Visibility is toggled
	/// separately through `show`/`hide`.
	fn set_lesson(&mut self, title: &str, body: &str) -> Result<(), GameError>;

	fn alert(&mut self, message: &str) -> Result<(), GameError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerElement {
	pub avatar: String,
	pub position: Position,
}

/// Shell that only remembers what a page would be showing.
#[derive(Debug)]
pub struct HeadlessShell {
	visible: HashSet<View>,
	/// Every `show`/`hide` call in order, `true` for show.
	transitions: Vec<(View, bool)>,
	players: Vec<PlayerElement>,
	classrooms: Vec<ClassroomMarker>,
	lesson_title: String,
	lesson_body: String,
	alerts: Vec<String>,
}

impl Default for HeadlessShell {
	fn default() -> Self {
		Self {
			// the page loads on the start screen, everything else is hidden
			visible: HashSet::from([View::Start]),
			transitions: Vec::new(),
			players: Vec::new(),
			classrooms: Vec::new(),
			lesson_title: String::new(),
			lesson_body: String::new(),
			alerts: Vec::new(),
		}
	}
}

impl HeadlessShell {
	pub fn is_visible(&self, view: View) -> bool {
		self.visible.contains(&view)
	}

	pub fn transitions(&self) -> &[(View, bool)] {
		&self.transitions
	}

	/// The avatar element, if one has been placed.
	pub fn player(&self) -> Option<&PlayerElement> {
		self.players.first()
	}

	/// Number of avatar elements on the map.
	pub fn player_count(&self) -> usize {
		self.players.len()
	}

	pub fn classrooms(&self) -> &[ClassroomMarker] {
		&self.classrooms
	}

	/// Title and body of the lesson panel while it is visible.
	pub fn lesson(&self) -> Option<(&str, &str)> {
		self.is_visible(View::Lesson).then_some((self.lesson_title.as_str(), self.lesson_body.as_str()))
	}

	pub fn alerts(&self) -> &[String] {
		&self.alerts
	}
}

impl Shell for HeadlessShell {
	fn show(&mut self, view: View) -> Result<(), GameError> {
		self.visible.insert(view);
		self.transitions.push((view, true));
		Ok(())
	}

	fn hide(&mut self, view: View) -> Result<(), GameError> {
		self.visible.remove(&view);
		self.transitions.push((view, false));
		Ok(())
	}

	fn place_player(&mut self, avatar: &str, position: Position) -> Result<(), GameError> {
		self.players.clear();
		self.players.push(PlayerElement {
			avatar: avatar.to_string(),
			position,
		});
		Ok(())
	}

	fn move_player(&mut self, position: Position) -> Result<(), GameError> {
		// mirrors `querySelector('.player')`: only the first avatar moves
		let player = self.players.first_mut().ok_or_else(|| GameError::Shell("no player element on the map".into()))?;
		player.position = position;
		Ok(())
	}

	fn add_classroom(&mut self, marker: &ClassroomMarker) -> Result<(), GameError> {
		self.classrooms.push(*marker);
		Ok(())
	}

	fn set_lesson(&mut self, title: &str, body: &str) -> Result<(), GameError> {
		self.lesson_title = title.to_string();
		self.lesson_body = body.to_string();
		Ok(())
	}

	fn alert(&mut self, message: &str) -> Result<(), GameError> {
		self.alerts.push(message.to_string());
		Ok(())
	}
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn starts_on_the_start_screen() {
		let shell = HeadlessShell::default();
		assert!(shell.is_visible(View::Start));
		assert!(!shell.is_visible(View::Game));
		assert!(!shell.is_visible(View::Lesson));
		assert!(shell.transitions().is_empty());
	}

	#[test]
	fn lesson_text_is_only_reported_while_visible() {
		let mut shell = HeadlessShell::default();
		shell.set_lesson("Math", "numbers").unwrap();
		assert_eq!(shell.lesson(), None);

		shell.show(View::Lesson).unwrap();
		assert_eq!(shell.lesson(), Some(("Math", "numbers")));

		shell.hide(View::Lesson).unwrap();
		assert_eq!(shell.lesson(), None);
		assert_eq!(shell.transitions(), [(View::Lesson, true), (View::Lesson, false)]);
	}

	#[test]
	fn moving_without_a_player_fails() {
		let mut shell = HeadlessShell::default();
		assert!(matches!(shell.move_player(Position { x: 1, y: 1 }), Err(GameError::Shell(_))));

		shell.place_player("data:", Position { x: 0, y: 0 }).unwrap();
		shell.move_player(Position { x: 5, y: 7 }).unwrap();
		assert_eq!(shell.player().unwrap().position, Position { x: 5, y: 7 });
	}

	#[test]
	fn placing_again_replaces_the_avatar() {
		let mut shell = HeadlessShell::default();
		shell.place_player("data:first", Position { x: 0, y: 0 }).unwrap();
		shell.place_player("data:second", Position { x: 3, y: 4 }).unwrap();
		assert_eq!(shell.player_count(), 1);
		assert_eq!(shell.player().unwrap().avatar, "data:second");
	}
}
