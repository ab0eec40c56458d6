mod config;
mod controller;
mod error;
mod input;
mod lessons;
mod player;
mod shell;
mod surface;
#[cfg(target_arch = "wasm32")]
mod web;

pub use config::GameConfig;
pub use controller::{Controller, Screen, UploadTicket};
pub use error::GameError;
pub use input::{Direction, InputEvent};
pub use lessons::{ClassroomMarker, Subject};
pub use player::Position;
pub use shell::{HeadlessShell, PlayerElement, Shell, View};
pub use surface::{Color, PixmapSurface, Point, Surface, decode_image, png_data_url};
#[cfg(target_arch = "wasm32")]
pub use web::{CanvasSurface, DomShell, mount};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;


#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start() {
	set_panic_hook();
	if let Err(err) = init_logging() {
		web_sys::console::error_1(&format!("Failed to initialise logging: {err}").into());
	}
	log::info!("Starting classroom quest...");
	if let Err(err) = web::mount() {
		log::error!("Failed to mount the game: {err:#}");
	}
}


pub fn set_panic_hook() {
	// When the `console_error_panic_hook` feature is enabled, we can call the
	// `set_panic_hook` function at least once during initialization, and then
	// we will get better error messages if our code ever panics.
	//
	// For more details see
	// https://github.com/rustwasm/console_error_panic_hook#readme
	#[cfg(feature = "console_error_panic_hook")]
	console_error_panic_hook::set_once();
}

/// Route `log` output to the browser console on wasm, stderr elsewhere.
pub fn init_logging() -> Result<(), log::SetLoggerError> {
	#[cfg(target_arch = "wasm32")]
	return console_log::init_with_level(log::Level::Debug);

	#[cfg(not(target_arch = "wasm32"))]
	return env_logger::Builder::from_default_env().filter_level(log::LevelFilter::Debug).try_init();
}
