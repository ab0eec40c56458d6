//! The interaction controller: one value that owns a whole game session.
//!
//! Front ends never touch the surface or the shell directly. They translate
//! their platform events into `InputEvent`s (or call the operations below)
//! and the controller decides what to render and what to show.
//!
//! Session flow:
//! * `Screen::Start`: the player sketches on the surface, may upload a
//!   picture, and types a name.
//! * `start_game` with a non-empty name snapshots the surface as the avatar,
//!   swaps to `Screen::Playing` and lays out the classrooms.
//! * arrow keys move the avatar; clicking a classroom opens its lesson panel
//!   until `close_lesson`.
//!
//! Uploads decode out-of-band in the browser, so they are split into
//! `begin_upload` and `finish_upload`. Each upload or clear advances a
//! generation counter and a decode that finishes for an older generation is
//! dropped, so a slow decode can never paint over a newer clear or upload.

use image::RgbaImage;
use log::{debug, info, warn};

use crate::config::GameConfig;
use crate::error::GameError;
use crate::input::{Direction, InputEvent};
use crate::lessons::{ClassroomMarker, Subject};
use crate::player::Position;
use crate::shell::{Shell, View};
use crate::surface::{Color, Point, Surface, decode_image};

const UNREADABLE_UPLOAD: &str = "That file could not be read as an image.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
	Start,
	Playing,
}

/// Identifies one upload. Only the most recent ticket is honoured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket(u64);

pub struct Controller<S, U> {
	config: GameConfig,
	surface: S,
	shell: U,
	screen: Screen,
	player: Position,
	player_name: Option<String>,
	avatar: Option<String>,
	// points of the stroke in progress; `None` between strokes
	stroke: Option<Vec<Point>>,
	stroke_color: Color,
	classrooms: Vec<ClassroomMarker>,
	lesson: Option<Subject>,
	upload_generation: u64,
}

impl<S: Surface, U: Shell> Controller<S, U> {
	/// Take ownership of a surface and shell and prepare a blank canvas.
	pub fn new(config: GameConfig, mut surface: S, shell: U) -> Result<Self, GameError> {
		surface.fill(Color::WHITE)?;
		Ok(Self {
			player: config.start,
			stroke_color: config.stroke_color,
			config,
			surface,
			shell,
			screen: Screen::Start,
			player_name: None,
			avatar: None,
			stroke: None,
			classrooms: Vec::new(),
			lesson: None,
			upload_generation: 0,
		})
	}

	// --------------------------------------------------
	// Accessors
	// --------------------------------------------------
	pub fn surface(&self) -> &S {
		&self.surface
	}

	pub fn shell(&self) -> &U {
		&self.shell
	}

	pub fn screen(&self) -> Screen {
		self.screen
	}

	pub fn position(&self) -> Position {
		self.player
	}

	pub fn player_name(&self) -> Option<&str> {
		self.player_name.as_deref()
	}

	/// The avatar snapshot taken when the game started.
	pub fn avatar(&self) -> Option<&str> {
		self.avatar.as_deref()
	}

	pub fn is_drawing(&self) -> bool {
		self.stroke.is_some()
	}

	pub fn stroke_color(&self) -> Color {
		self.stroke_color
	}

	pub fn classrooms(&self) -> &[ClassroomMarker] {
		&self.classrooms
	}

	/// Subject of the open lesson panel.
	pub fn lesson(&self) -> Option<Subject> {
		self.lesson
	}

	// --------------------------------------------------
	// Event dispatch
	// --------------------------------------------------
	pub fn dispatch(&mut self, event: InputEvent) -> Result<(), GameError> {
		match event {
			InputEvent::PointerDown(point) => {
				self.begin_stroke(point);
				Ok(())
			},
			InputEvent::PointerMove(point) => self.extend_stroke(point),
			InputEvent::PointerUp => {
				self.end_stroke();
				Ok(())
			},
			InputEvent::ColorPicked(value) => self.set_stroke_color(&value),
			InputEvent::ClearRequested => self.clear_surface(),
			InputEvent::FileSelected(bytes) => self.composite_uploaded_image(bytes.as_deref()),
			InputEvent::StartRequested(name) => self.start_game(name.as_deref()),
			InputEvent::KeyPressed(key) => self.handle_movement(&key),
			InputEvent::ClassroomClicked(subject) => self.enter_classroom(subject),
			InputEvent::CloseLesson => self.close_lesson(),
		}
	}

	// --------------------------------------------------
	// Drawing
	// --------------------------------------------------
	pub fn begin_stroke(&mut self, point: Point) {
		self.stroke = Some(vec![point]);
	}

	/// Extend the stroke in progress to `point`, rendering the new segment
	/// straight away. Without a stroke in progress this does nothing.
	pub fn extend_stroke(&mut self, point: Point) -> Result<(), GameError> {
		let Some(path) = self.stroke.as_mut() else { return Ok(()) };
		let Some(&last) = path.last() else { return Ok(()) };

		self.surface.stroke_segment(last, point, self.stroke_color, self.config.stroke_width)?;
		path.push(point);
		Ok(())
	}

	pub fn end_stroke(&mut self) {
		if let Some(path) = self.stroke.take() {
			debug!("Stroke finished with {} points", path.len());
		}
	}

	pub fn set_stroke_color(&mut self, value: &str) -> Result<(), GameError> {
		self.stroke_color = value.parse()?;
		debug!("Stroke colour set to {}", self.stroke_color);
		Ok(())
	}

	/// Wipe the surface back to white. Pending upload decodes are invalidated.
	pub fn clear_surface(&mut self) -> Result<(), GameError> {
		self.surface.fill(Color::WHITE)?;
		self.upload_generation += 1;
		Ok(())
	}

	/// Decode `file_bytes` and stretch the picture over the surface. `None`
	/// (no file chosen) is not an error.
	pub fn composite_uploaded_image(&mut self, file_bytes: Option<&[u8]>) -> Result<(), GameError> {
		let Some(bytes) = file_bytes else {
			debug!("Upload without a file, ignoring");
			return Ok(());
		};
		let ticket = self.begin_upload();
		self.finish_upload(ticket, decode_image(bytes)).map(|_| ())
	}

	/// Start an upload. Any earlier ticket becomes stale.
	pub fn begin_upload(&mut self) -> UploadTicket {
		self.upload_generation += 1;
		UploadTicket(self.upload_generation)
	}

	/// Apply a finished decode. Returns `Ok(false)` when the ticket went stale
	/// in the meantime; the result is then dropped, decode errors included.
	pub fn finish_upload(&mut self, ticket: UploadTicket, decoded: Result<RgbaImage, GameError>) -> Result<bool, GameError> {
		if ticket.0 != self.upload_generation {
			debug!("Dropping stale upload {} (current {})", ticket.0, self.upload_generation);
			return Ok(false);
		}

		let image = match decoded {
			Ok(image) => image,
			Err(err) => {
				if let Err(alert_err) = self.shell.alert(UNREADABLE_UPLOAD) {
					warn!("Could not tell the player about the upload: {alert_err}");
				}
				return Err(err);
			},
		};
		self.surface.draw_image_scaled(&image)?;
		info!("Composited {}x{} upload onto the canvas", image.width(), image.height());
		Ok(true)
	}

	// --------------------------------------------------
	// Game lifecycle
	// --------------------------------------------------
	pub fn start_game(&mut self, player_name: Option<&str>) -> Result<(), GameError> {
		if self.screen == Screen::Playing {
			warn!("Game already started, ignoring start request");
			return Ok(());
		}

		let name = match player_name {
			Some(name) if !name.is_empty() => name,
			_ => {
				self.shell.alert(&GameError::NameRequired.to_string())?;
				return Err(GameError::NameRequired);
			},
		};

		// build the map while it is still hidden; the start screen only goes
		// away once everything on it is in place
		let avatar = self.surface.snapshot()?;
		self.shell.place_player(&avatar, self.player)?;
		self.create_classrooms()?;

		self.shell.hide(View::Start)?;
		if let Err(err) = self.shell.show(View::Game) {
			if let Err(restore) = self.shell.show(View::Start) {
				warn!("Could not restore the start screen: {restore}");
			}
			return Err(err);
		}

		self.screen = Screen::Playing;
		self.avatar = Some(avatar);
		self.player_name = Some(name.to_string());
		info!("{name} started at ({}, {})", self.player.x, self.player.y);
		Ok(())
	}

	/// Lay out the four classrooms. Markers already on the map are left alone,
	/// so repeated calls only fill in whatever an earlier call did not finish.
	pub fn create_classrooms(&mut self) -> Result<&[ClassroomMarker], GameError> {
		for marker in ClassroomMarker::layout() {
			if self.classrooms.contains(&marker) {
				continue;
			}
			self.shell.add_classroom(&marker)?;
			self.classrooms.push(marker);
		}
		Ok(&self.classrooms)
	}

	// --------------------------------------------------
	// Movement
	// --------------------------------------------------
	pub fn handle_movement(&mut self, key: &str) -> Result<(), GameError> {
		if self.screen != Screen::Playing {
			return Ok(());
		}
		let Some(dir) = Direction::from_key(key) else { return Ok(()) };

		let next = self.player.stepped(dir, self.config.step, self.config.map_width, self.config.map_height);
		self.shell.move_player(next)?;
		self.player = next;
		Ok(())
	}

	// --------------------------------------------------
	// Lessons
	// --------------------------------------------------
	pub fn enter_classroom(&mut self, subject: Subject) -> Result<(), GameError> {
		if self.screen != Screen::Playing {
			return Ok(());
		}

		self.shell.set_lesson(subject.name(), subject.description())?;
		if self.lesson.is_none() {
			self.shell.show(View::Lesson)?;
		}
		self.lesson = Some(subject);
		info!("Entered the {subject} classroom");
		Ok(())
	}

	pub fn close_lesson(&mut self) -> Result<(), GameError> {
		if self.lesson.is_none() {
			return Ok(());
		}
		self.shell.hide(View::Lesson)?;
		self.lesson = None;
		Ok(())
	}
}
