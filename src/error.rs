use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
	#[error("Please enter your name!")]
	NameRequired,

	#[error("Could not decode uploaded image: {0}")]
	ImageDecode(#[from] image::ImageError),

	#[error("Invalid colour '{0}', expected #rrggbb")]
	InvalidColor(String),

	#[error("Unknown subject '{0}'")]
	UnknownSubject(String),

	#[error("Drawing surface error: {0}")]
	Surface(String),

	#[error("UI shell error: {0}")]
	Shell(String),
}
