//! Terminal front end: plays a session against the headless surface and
//! shell, one command per line on stdin.

use std::{
	fs,
	io::{self, BufRead, Write},
};

use anyhow::{Context, Result, anyhow, bail};
use classroom_quest::{Controller, GameConfig, GameError, HeadlessShell, InputEvent, PixmapSurface, Point, Screen, Subject, View};
use log::{debug, error};

type Game = Controller<PixmapSurface, HeadlessShell>;

const HELP: &str = "\
Drawing (start screen):
  press X Y | drag X Y | release    draw a freehand stroke
  color #rrggbb                     change the pen colour
  upload PATH                       stretch an image over the canvas
  clear                             wipe the canvas
  save PATH                         write the canvas as PNG
  start NAME                        begin the game
Playing:
  up | down | left | right          walk one step (or: key ArrowUp ...)
  enter SUBJECT                     open a classroom (Math, Science, English, History)
  close                             close the lesson
Other:
  look | help | quit";

#[derive(Debug, PartialEq)]
enum Command {
	Event(InputEvent),
	Save(String),
	Look,
	Help,
	Quit,
}

fn point(args: &[&str]) -> Result<Point> {
	let [x, y] = args else { bail!("expected two coordinates") };
	Ok(Point::new(x.parse().context("bad x coordinate")?, y.parse().context("bad y coordinate")?))
}

fn parse_command(line: &str) -> Result<Command> {
	let words: Vec<&str> = line.split_whitespace().collect();
	let Some((&verb, args)) = words.split_first() else { return Ok(Command::Look) };
	let rest = args.join(" ");

	let event = match verb.to_lowercase().as_str() {
		"press" => InputEvent::PointerDown(point(args)?),
		"drag" => InputEvent::PointerMove(point(args)?),
		"release" => InputEvent::PointerUp,
		"color" | "colour" => InputEvent::ColorPicked(rest),
		"clear" => InputEvent::ClearRequested,
		"upload" => {
			if rest.is_empty() {
				InputEvent::FileSelected(None)
			} else {
				InputEvent::FileSelected(Some(fs::read(&rest).with_context(|| format!("Failed to read {rest}"))?))
			}
		},
		"start" => InputEvent::StartRequested(Some(rest)),
		"up" => InputEvent::KeyPressed("ArrowUp".into()),
		"down" => InputEvent::KeyPressed("ArrowDown".into()),
		"left" => InputEvent::KeyPressed("ArrowLeft".into()),
		"right" => InputEvent::KeyPressed("ArrowRight".into()),
		"key" => InputEvent::KeyPressed(rest),
		"enter" => InputEvent::ClassroomClicked(rest.parse::<Subject>()?),
		"close" => InputEvent::CloseLesson,
		"save" if !rest.is_empty() => return Ok(Command::Save(rest)),
		"look" => return Ok(Command::Look),
		"help" | "?" => return Ok(Command::Help),
		"quit" | "exit" => return Ok(Command::Quit),
		_ => return Err(anyhow!("I don't understand '{line}'. Try 'help'.")),
	};
	Ok(Command::Event(event))
}

fn describe(game: &Game) {
	let shell = game.shell();
	println!();
	match game.screen() {
		Screen::Start => {
			println!("Draw your avatar, then 'start <name>'.");
			println!("Pen colour: {}", game.stroke_color());
		},
		Screen::Playing => {
			let pos = game.position();
			println!("{} is at ({}, {}).", game.player_name().unwrap_or("You"), pos.x, pos.y);
			print!("Classrooms: ");
			for (i, marker) in shell.classrooms().iter().enumerate() {
				if i > 0 {
					print!(", ");
				}
				print!("{} @ ({}, {})", marker.subject, marker.position.x, marker.position.y);
			}
			println!(".");
		},
	}
	if let Some((title, body)) = shell.lesson() {
		println!("== {title} ==");
		println!("{body}");
	}
	debug!("visible: start={} game={}", shell.is_visible(View::Start), shell.is_visible(View::Game));
}

fn read_line(input: &mut impl BufRead) -> Option<String> {
	print!(">> ");
	io::stdout().flush().ok()?;
	let mut buf = String::new();
	match input.read_line(&mut buf) {
		Ok(0) | Err(_) => None,
		Ok(_) => Some(buf.trim().to_string()),
	}
}

fn main() -> Result<()> {
	classroom_quest::init_logging()?;

	let config = GameConfig::default();
	let surface = PixmapSurface::new(config.canvas_width, config.canvas_height)?;
	let mut game = Controller::new(config, surface, HeadlessShell::default())?;

	describe(&game);
	let stdin = io::stdin();
	let mut input = stdin.lock();
	while let Some(line) = read_line(&mut input) {
		let command = match parse_command(&line) {
			Ok(command) => command,
			Err(err) => {
				println!("{err:#}");
				continue;
			},
		};

		match command {
			Command::Quit => {
				println!("Bye!");
				break;
			},
			Command::Help => println!("{HELP}"),
			Command::Look => describe(&game),
			Command::Save(path) => {
				let png = game.surface().to_png()?;
				fs::write(&path, png).with_context(|| format!("Failed to write {path}"))?;
				println!("Canvas saved to {path}.");
			},
			Command::Event(event) => {
				let moves = matches!(event, InputEvent::KeyPressed(_) | InputEvent::ClassroomClicked(_) | InputEvent::CloseLesson | InputEvent::StartRequested(_));
				match game.dispatch(event) {
					Ok(()) if moves => describe(&game),
					Ok(()) => {},
					Err(GameError::NameRequired) => println!("{}", GameError::NameRequired),
					Err(err) => error!("{err}"),
				}
			},
		}
	}

	Ok(())
}


#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn pointer_commands() {
		assert_eq!(parse_command("press 1 2").unwrap(), Command::Event(InputEvent::PointerDown(Point::new(1.0, 2.0))));
		assert_eq!(parse_command("drag 3.5 4").unwrap(), Command::Event(InputEvent::PointerMove(Point::new(3.5, 4.0))));
		assert_eq!(parse_command("release").unwrap(), Command::Event(InputEvent::PointerUp));
		assert!(parse_command("press 1").is_err());
		assert!(parse_command("drag a b").is_err());
	}

	#[test]
	fn movement_shortcuts_become_arrow_keys() {
		assert_eq!(parse_command("up").unwrap(), Command::Event(InputEvent::KeyPressed("ArrowUp".into())));
		assert_eq!(parse_command("RIGHT").unwrap(), Command::Event(InputEvent::KeyPressed("ArrowRight".into())));
		assert_eq!(parse_command("key Escape").unwrap(), Command::Event(InputEvent::KeyPressed("Escape".into())));
	}

	#[test]
	fn start_keeps_the_whole_name() {
		assert_eq!(
			parse_command("start Ada Lovelace").unwrap(),
			Command::Event(InputEvent::StartRequested(Some("Ada Lovelace".into())))
		);
		assert_eq!(parse_command("start").unwrap(), Command::Event(InputEvent::StartRequested(Some(String::new()))));
	}

	#[test]
	fn classrooms_by_name() {
		assert_eq!(parse_command("enter science").unwrap(), Command::Event(InputEvent::ClassroomClicked(Subject::Science)));
		assert!(parse_command("enter Art").is_err());
	}

	#[test]
	fn upload_without_a_path_selects_nothing() {
		assert_eq!(parse_command("upload").unwrap(), Command::Event(InputEvent::FileSelected(None)));
		assert!(parse_command("upload /definitely/not/here.png").is_err());
	}

	#[test]
	fn misc_commands() {
		assert_eq!(parse_command("").unwrap(), Command::Look);
		assert_eq!(parse_command("save out.png").unwrap(), Command::Save("out.png".into()));
		assert!(parse_command("save").is_err());
		assert_eq!(parse_command("quit").unwrap(), Command::Quit);
		assert!(parse_command("dance").is_err());
	}
}
