//! The lesson table and the classroom layout.
//!
//! Subjects are a closed enum so every classroom on the map always has a
//! lesson to show; there is no way to build a marker for a subject the table
//! does not know about.

use std::{fmt, str::FromStr};

use crate::error::GameError;
use crate::player::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
	Math,
	Science,
	English,
	History,
}

impl Subject {
	pub const ALL: [Subject; 4] = [Subject::Math, Subject::Science, Subject::English, Subject::History];

	pub fn name(self) -> &'static str {
		match self {
			Subject::Math => "Math",
			Subject::Science => "Science",
			Subject::English => "English",
			Subject::History => "History",
		}
	}

	pub fn description(self) -> &'static str {
		match self {
			Subject::Math => "Learn about basic arithmetic and algebra",
			Subject::Science => "Explore the natural world and scientific method",
			Subject::English => "Study language and literature",
			Subject::History => "Discover past events and their impact",
		}
	}
}

impl fmt::Display for Subject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Subject {
	type Err = GameError;

	/// Case-insensitive so the terminal front end can accept `math`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Subject::ALL
			.into_iter()
			.find(|subject| subject.name().eq_ignore_ascii_case(s.trim()))
			.ok_or_else(|| GameError::UnknownSubject(s.to_string()))
	}
}

/// A clickable classroom on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassroomMarker {
	pub subject: Subject,
	pub position: Position,
}

impl ClassroomMarker {
	/// The four classrooms, one per corner of the map.
	pub fn layout() -> [ClassroomMarker; 4] {
		let at = |subject, x, y| ClassroomMarker {
			subject,
			position: Position { x, y },
		};
		[
			at(Subject::Math, 100, 100),
			at(Subject::Science, 600, 100),
			at(Subject::English, 100, 400),
			at(Subject::History, 600, 400),
		]
	}
}
