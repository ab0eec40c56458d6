//! Browser front end. Binds the page's elements to a `Controller` that draws
//! on the `paintCanvas` element and toggles the page's screens.

use std::{cell::RefCell, rc::Rc};

use anyhow::{Context, Result, anyhow};
use image::RgbaImage;
use log::{error, info, warn};
use wasm_bindgen::{Clamped, JsCast, prelude::*};
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{CanvasRenderingContext2d, Document, Element, Event, File, HtmlCanvasElement, HtmlElement, HtmlInputElement, ImageData, KeyboardEvent, MouseEvent};

use crate::config::GameConfig;
use crate::controller::Controller;
use crate::error::GameError;
use crate::input::InputEvent;
use crate::lessons::{ClassroomMarker, Subject};
use crate::player::Position;
use crate::shell::{Shell, View};
use crate::surface::{Color, Point, Surface, decode_image};

mod html {
	pub const CANVAS: &str = "paintCanvas";
	pub const COLOR_PICKER: &str = "colorPicker";
	pub const IMAGE_UPLOAD: &str = "imageUpload";
	pub const CLEAR_BUTTON: &str = "clearCanvas";
	pub const START_BUTTON: &str = "startGame";
	pub const PLAYER_NAME: &str = "playerName";
	pub const START_SCREEN: &str = "startScreen";
	pub const GAME_SCREEN: &str = "gameScreen";
	pub const GAME_MAP: &str = "gameMap";
	pub const LESSON: &str = "lesson";
	pub const LESSON_TITLE: &str = "lessonTitle";
	pub const LESSON_CONTENT: &str = "lessonContent";
	pub const CLOSE_LESSON: &str = "closeLessonBtn";

	pub const PLAYER_CLASS: &str = "player";
	pub const CLASSROOM_CLASS: &str = "classroom";
	pub const SUBJECT_ATTR: &str = "data-subject";
}

type Game = Controller<CanvasSurface, DomShell>;
type SharedGame = Rc<RefCell<Game>>;

fn js_err(context: &str) -> impl Fn(JsValue) -> GameError + '_ {
	move |err| GameError::Shell(format!("{context}: {err:?}"))
}

fn document() -> Result<Document> {
	web_sys::window()
		.context("no global `window` exists")?
		.document()
		.context("window has no document")
}

fn element_by_id<T: JsCast>(document: &Document, id: &str) -> Result<T> {
	document
		.get_element_by_id(id)
		.with_context(|| format!("no element with id '{id}'"))?
		.dyn_into::<T>()
		.map_err(|element| anyhow!("element '{id}' has an unexpected type: {element:?}"))
}

// ---------------------------------------------------------------------------
// Canvas surface
// ---------------------------------------------------------------------------

/// Renders onto a page canvas through its 2d context.
pub struct CanvasSurface {
	canvas: HtmlCanvasElement,
	context: CanvasRenderingContext2d,
}

impl CanvasSurface {
	pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
		let context = canvas
			.get_context("2d")
			.map_err(|err| anyhow!("error getting 2d context: {err:?}"))?
			.context("canvas has no 2d context")?
			.dyn_into::<CanvasRenderingContext2d>()
			.map_err(|obj| anyhow!("error converting {obj:?} to CanvasRenderingContext2d"))?;
		Ok(Self { canvas, context })
	}
}

impl Surface for CanvasSurface {
	fn size(&self) -> (u32, u32) {
		(self.canvas.width(), self.canvas.height())
	}

	fn fill(&mut self, color: Color) -> Result<(), GameError> {
		let (width, height) = self.size();
		self.context.set_fill_style_str(&color.to_css());
		self.context.fill_rect(0.0, 0.0, width.into(), height.into());
		Ok(())
	}

	fn stroke_segment(&mut self, from: Point, to: Point, color: Color, width: f32) -> Result<(), GameError> {
		let ctx = &self.context;
		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(width.into());
		ctx.set_line_cap("round");
		ctx.begin_path();
		if from == to {
			// canvas drops zero-length lines, so draw the dot explicitly
			ctx.arc(from.x.into(), from.y.into(), (width.max(1.0) / 2.0).into(), 0.0, std::f64::consts::TAU)
				.map_err(js_err("arc"))?;
		} else {
			ctx.move_to(from.x.into(), from.y.into());
			ctx.line_to(to.x.into(), to.y.into());
		}
		ctx.stroke();
		Ok(())
	}

	fn draw_image_scaled(&mut self, image: &RgbaImage) -> Result<(), GameError> {
		// stage the pixels on a scratch canvas so drawImage can scale and
		// blend them like any other image
		let scratch = document()
			.map_err(|e| GameError::Surface(e.to_string()))?
			.create_element("canvas")
			.map_err(js_err("create scratch canvas"))?
			.dyn_into::<HtmlCanvasElement>()
			.map_err(|_| GameError::Surface("scratch element is not a canvas".into()))?;
		scratch.set_width(image.width());
		scratch.set_height(image.height());

		let scratch_ctx = scratch
			.get_context("2d")
			.map_err(js_err("scratch context"))?
			.and_then(|obj| obj.dyn_into::<CanvasRenderingContext2d>().ok())
			.ok_or_else(|| GameError::Surface("scratch canvas has no 2d context".into()))?;
		let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(image.as_raw().as_slice()), image.width(), image.height())
			.map_err(js_err("build ImageData"))?;
		scratch_ctx.put_image_data(&data, 0.0, 0.0).map_err(js_err("putImageData"))?;

		let (width, height) = self.size();
		self.context
			.draw_image_with_html_canvas_element_and_dw_and_dh(&scratch, 0.0, 0.0, width.into(), height.into())
			.map_err(js_err("drawImage"))
	}

	fn snapshot(&self) -> Result<String, GameError> {
		self.canvas.to_data_url().map_err(js_err("toDataURL"))
	}
}

// ---------------------------------------------------------------------------
// DOM shell
// ---------------------------------------------------------------------------

pub struct DomShell {
	document: Document,
}

impl DomShell {
	pub fn new(document: Document) -> Self {
		Self { document }
	}

	fn html_element(&self, id: &str) -> Result<HtmlElement, GameError> {
		element_by_id(&self.document, id).map_err(|e| GameError::Shell(e.to_string()))
	}

	fn set_display(&self, view: View, display: &str) -> Result<(), GameError> {
		let id = match view {
			View::Start => html::START_SCREEN,
			View::Game => html::GAME_SCREEN,
			View::Lesson => html::LESSON,
		};
		self.html_element(id)?
			.style()
			.set_property("display", display)
			.map_err(js_err("set display"))
	}

	fn player_element(&self) -> Result<HtmlElement, GameError> {
		self.document
			.query_selector(&format!(".{}", html::PLAYER_CLASS))
			.map_err(js_err("query player"))?
			.and_then(|el| el.dyn_into::<HtmlElement>().ok())
			.ok_or_else(|| GameError::Shell("no player element on the map".into()))
	}

	fn new_div(&self, class: &str) -> Result<HtmlElement, GameError> {
		let div = self
			.document
			.create_element("div")
			.map_err(js_err("create div"))?
			.dyn_into::<HtmlElement>()
			.map_err(|_| GameError::Shell("div is not an HtmlElement".into()))?;
		div.set_class_name(class);
		Ok(div)
	}

	fn append_to_map(&self, element: &HtmlElement) -> Result<(), GameError> {
		self.html_element(html::GAME_MAP)?
			.append_child(element)
			.map_err(js_err("append to map"))?;
		Ok(())
	}
}

fn set_position(element: &HtmlElement, position: Position) -> Result<(), GameError> {
	let style = element.style();
	style.set_property("left", &format!("{}px", position.x)).map_err(js_err("set left"))?;
	style.set_property("top", &format!("{}px", position.y)).map_err(js_err("set top"))
}

impl Shell for DomShell {
	fn show(&mut self, view: View) -> Result<(), GameError> {
		self.set_display(view, "block")
	}

	fn hide(&mut self, view: View) -> Result<(), GameError> {
		self.set_display(view, "none")
	}

	fn place_player(&mut self, avatar: &str, position: Position) -> Result<(), GameError> {
		if let Ok(old) = self.player_element() {
			old.remove();
		}
		let player = self.new_div(html::PLAYER_CLASS)?;
		let style = player.style();
		style.set_property("background-image", &format!("url({avatar})")).map_err(js_err("set avatar"))?;
		style.set_property("background-size", "cover").map_err(js_err("set avatar size"))?;
		set_position(&player, position)?;
		self.append_to_map(&player)
	}

	fn move_player(&mut self, position: Position) -> Result<(), GameError> {
		set_position(&self.player_element()?, position)
	}

	fn add_classroom(&mut self, marker: &ClassroomMarker) -> Result<(), GameError> {
		let classroom = self.new_div(html::CLASSROOM_CLASS)?;
		classroom.set_text_content(Some(marker.subject.name()));
		classroom
			.set_attribute(html::SUBJECT_ATTR, marker.subject.name())
			.map_err(js_err("tag classroom"))?;
		set_position(&classroom, marker.position)?;
		self.append_to_map(&classroom)
	}

	fn set_lesson(&mut self, title: &str, body: &str) -> Result<(), GameError> {
		self.html_element(html::LESSON_TITLE)?.set_text_content(Some(title));
		self.html_element(html::LESSON_CONTENT)?.set_text_content(Some(body));
		Ok(())
	}

	fn alert(&mut self, message: &str) -> Result<(), GameError> {
		web_sys::window()
			.ok_or_else(|| GameError::Shell("no global `window` exists".into()))?
			.alert_with_message(message)
			.map_err(js_err("alert"))
	}
}

// ---------------------------------------------------------------------------
// Event wiring
// ---------------------------------------------------------------------------

fn report(err: &GameError) {
	match err {
		// the shell already told the player
		GameError::NameRequired | GameError::ImageDecode(_) => warn!("{err}"),
		_ => error!("{err}"),
	}
}

fn send(game: &SharedGame, event: InputEvent) {
	// Listeners run one at a time on the event loop, so the borrow never
	// overlaps another handler.
	if let Err(err) = game.borrow_mut().dispatch(event) {
		report(&err);
	}
}

fn listen<E, F>(target: &web_sys::EventTarget, kind: &str, mut handler: F) -> Result<()>
where
	E: JsCast + 'static,
	F: FnMut(E) + 'static,
{
	let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| match event.dyn_into::<E>() {
		Ok(event) => handler(event),
		Err(event) => warn!("unexpected event type for listener: {event:?}"),
	});
	target
		.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
		.map_err(|err| anyhow!("could not listen for '{kind}': {err:?}"))?;
	// listeners live as long as the page
	closure.forget();
	Ok(())
}

fn pointer(event: &MouseEvent) -> Point {
	Point::new(event.offset_x() as f32, event.offset_y() as f32)
}

async fn read_file(file: &File) -> Result<Vec<u8>> {
	let buffer = JsFuture::from(file.array_buffer())
		.await
		.map_err(|err| anyhow!("error reading {}: {err:?}", file.name()))?;
	Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

fn upload(game: SharedGame, input: &HtmlInputElement) {
	// an emptied selection must not cancel a decode that is still running
	let Some(file) = input.files().and_then(|files| files.get(0)) else {
		send(&game, InputEvent::FileSelected(None));
		return;
	};

	let ticket = game.borrow_mut().begin_upload();
	spawn_local(async move {
		let bytes = match read_file(&file).await {
			Ok(bytes) => bytes,
			Err(err) => {
				error!("{err:#}");
				return;
			},
		};

		let result = game.borrow_mut().finish_upload(ticket, decode_image(&bytes));
		if let Err(err) = result {
			report(&err);
		}
	});
}

/// Build the controller and attach every listener the page needs.
pub fn mount() -> Result<()> {
	let document = document()?;
	let canvas: HtmlCanvasElement = element_by_id(&document, html::CANVAS)?;
	let surface = CanvasSurface::new(canvas.clone())?;
	let shell = DomShell::new(document.clone());
	let game: SharedGame = Rc::new(RefCell::new(Controller::new(GameConfig::default(), surface, shell)?));

	// drawing
	{
		let g = game.clone();
		listen(&canvas, "mousedown", move |e: MouseEvent| send(&g, InputEvent::PointerDown(pointer(&e))))?;
		let g = game.clone();
		listen(&canvas, "mousemove", move |e: MouseEvent| send(&g, InputEvent::PointerMove(pointer(&e))))?;
		let g = game.clone();
		listen(&canvas, "mouseup", move |_: MouseEvent| send(&g, InputEvent::PointerUp))?;
	}

	let picker: HtmlInputElement = element_by_id(&document, html::COLOR_PICKER)?;
	{
		let g = game.clone();
		let input = picker.clone();
		listen(&picker, "change", move |_: Event| send(&g, InputEvent::ColorPicked(input.value())))?;
	}

	let file_input: HtmlInputElement = element_by_id(&document, html::IMAGE_UPLOAD)?;
	{
		let g = game.clone();
		let input = file_input.clone();
		listen(&file_input, "change", move |_: Event| upload(g.clone(), &input))?;
	}

	let clear: HtmlElement = element_by_id(&document, html::CLEAR_BUTTON)?;
	{
		let g = game.clone();
		listen(&clear, "click", move |_: MouseEvent| send(&g, InputEvent::ClearRequested))?;
	}

	let start: HtmlElement = element_by_id(&document, html::START_BUTTON)?;
	let name_input: HtmlInputElement = element_by_id(&document, html::PLAYER_NAME)?;
	{
		let g = game.clone();
		listen(&start, "click", move |_: MouseEvent| send(&g, InputEvent::StartRequested(Some(name_input.value()))))?;
	}

	{
		let g = game.clone();
		listen(&document, "keydown", move |e: KeyboardEvent| send(&g, InputEvent::KeyPressed(e.key())))?;
	}

	// classrooms are created later, so clicks are picked up on the map itself
	let map: HtmlElement = element_by_id(&document, html::GAME_MAP)?;
	{
		let g = game.clone();
		listen(&map, "click", move |e: MouseEvent| {
			let subject = e
				.target()
				.and_then(|target| target.dyn_into::<Element>().ok())
				.and_then(|el| el.closest(&format!(".{}", html::CLASSROOM_CLASS)).ok().flatten())
				.and_then(|el| el.get_attribute(html::SUBJECT_ATTR))
				.and_then(|name| name.parse::<Subject>().ok());
			if let Some(subject) = subject {
				send(&g, InputEvent::ClassroomClicked(subject));
			}
		})?;
	}

	let close: HtmlElement = element_by_id(&document, html::CLOSE_LESSON)?;
	{
		let g = game.clone();
		listen(&close, "click", move |_: MouseEvent| send(&g, InputEvent::CloseLesson))?;
	}

	info!("Game mounted on #{}", html::CANVAS);
	Ok(())
}
