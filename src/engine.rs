use crate::browser;
use anyhow::{anyhow, Error, Result};
// wasm is single threaded, so Rc RefCell > Mutex
use async_trait::async_trait;
use futures::channel::oneshot::channel;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{
    // unchecked_ref (unsafe) cast from Javascript type to Rust type
    // - we create the closures and know their signatures
    JsCast,
    JsValue,
};
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use self::input::KeyState;
use futures::channel::mpsc::UnboundedReceiver;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, keystate: &KeyState);
    fn draw(&mut self, renderer: &Renderer);
}

// length of a frame in milliseconds
const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;
// a backgrounded tab can hand us seconds of delta, drop whatever exceeds this
const MAX_UPDATES_PER_FRAME: u32 = 8;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    pub async fn start(game: impl Game + 'static) -> Result<()> {
        let mut keyevent_receiver = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let renderer = Renderer {
            context: browser::context()?,
        };
        let mut keystate = KeyState::new();

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            input::process_input(&mut keystate, &mut keyevent_receiver);

            let updates = game_loop.advance(perf);
            for _ in 0..updates {
                game.update(&keystate);
                // presses only count for the first tick of a frame
                keystate.end_tick();
            }
            game.draw(&renderer);

            if let Some(next_frame) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(next_frame) {
                    error!("GameLoop: stopped : {:#?}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }

    /// Accumulate elapsed time and return how many fixed updates to run
    fn advance(&mut self, perf: f64) -> u32 {
        self.accumulated_delta += (perf - self.last_frame) as f32;
        self.last_frame = perf;

        let mut updates = 0;
        while self.accumulated_delta > FRAME_SIZE {
            self.accumulated_delta -= FRAME_SIZE;
            updates += 1;
            if updates == MAX_UPDATES_PER_FRAME {
                self.accumulated_delta = 0.0;
                break;
            }
        }
        updates
    }
}

// ==================== Geometry ====================
#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub const fn new_from_x_y(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect::new(Point { x, y }, Size { width, height })
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn left(&self) -> f32 {
        self.position.x
    }

    pub fn right(&self) -> f32 {
        self.position.x + self.size.width
    }

    pub fn top(&self) -> f32 {
        self.position.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y + self.size.height
    }

    /// Strict AABB overlap, touching edges do not count
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

// ==================== Rendering ====================
pub struct Renderer {
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn clear(&self, rect: &Rect) {
        self.context.clear_rect(
            rect.x().into(),
            rect.y().into(),
            rect.width().into(),
            rect.height().into(),
        );
    }

    pub fn fill_rect(&self, rect: &Rect, color: &str) {
        self.context.set_fill_style_str(color);
        self.context.fill_rect(
            rect.x().into(),
            rect.y().into(),
            rect.width().into(),
            rect.height().into(),
        );
    }

    /// Draw `frame` of a sprite sheet into `destination`
    /// - `flipped` mirrors the sprite around the destination's vertical axis
    pub fn draw_sprite(
        &self,
        image: &HtmlImageElement,
        frame: &Rect,
        destination: &Rect,
        flipped: bool,
    ) {
        self.context.save();
        let result = if flipped {
            // move origin to the right edge then mirror x, so the sprite
            // lands on the same destination box facing the other way
            self.context
                .translate(destination.right().into(), destination.y().into())
                .and_then(|_| self.context.scale(-1.0, 1.0))
                .and_then(|_| {
                    let mirrored = Rect::new(Point::default(), destination.size);
                    self.draw_frame(image, frame, &mirrored)
                })
        } else {
            self.draw_frame(image, frame, destination)
        };
        self.context.restore();

        if let Err(err) = result {
            error!("Renderer: could not draw sprite : {:#?}", err);
        }
    }

    pub fn draw_image(&self, image: &HtmlImageElement, destination: &Rect) {
        if let Err(err) = self
            .context
            .draw_image_with_html_image_element_and_dw_and_dh(
                image,
                destination.x().into(),
                destination.y().into(),
                destination.width().into(),
                destination.height().into(),
            )
        {
            error!("Renderer: could not draw image : {:#?}", err);
        }
    }

    fn draw_frame(
        &self,
        image: &HtmlImageElement,
        frame: &Rect,
        destination: &Rect,
    ) -> std::result::Result<(), JsValue> {
        self.context
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                image,
                frame.x().into(),
                frame.y().into(),
                frame.width().into(),
                frame.height().into(),
                destination.x().into(),
                destination.y().into(),
                destination.width().into(),
                destination.height().into(),
            )
    }

    #[cfg(debug_assertions)]
    fn stroke_rect(&self, rect: &Rect, color: &str) {
        self.context.set_stroke_style_str(color);
        self.context.stroke_rect(
            rect.x().into(),
            rect.y().into(),
            rect.width().into(),
            rect.height().into(),
        );
    }
}

/// Outline bounding boxes in debug builds
#[cfg(debug_assertions)]
pub trait DebugDraw {
    fn draw_debug(&self, renderer: &Renderer);
}

#[cfg(debug_assertions)]
impl DebugDraw for Rect {
    fn draw_debug(&self, renderer: &Renderer) {
        renderer.stroke_rect(self, "#FF0000");
    }
}

/// A static picture stretched into a fixed destination
pub struct Image {
    element: HtmlImageElement,
    destination: Rect,
}

impl Image {
    pub fn new(element: HtmlImageElement, destination: Rect) -> Self {
        Image {
            element,
            destination,
        }
    }

    pub fn draw(&self, renderer: &Renderer) {
        renderer.draw_image(&self.element, &self.destination);
    }
}

/// Asynchronously load an image from a given source path
/// # Arguments
/// * `source` - string slice to path/url
/// # Returns
/// * `Ok(HtmlImageElement)` - on load success
/// * `Err` - on load fail
pub async fn load_image(source: &str) -> Result<HtmlImageElement> {
    let image = browser::new_image()?;
    let (tx, rx) = channel::<Result<(), Error>>();
    let success_tx = Rc::new(RefCell::new(Some(tx)));
    let error_tx = success_tx.clone();

    let success_callback = browser::closure_once(move || {
        if let Some(tx) = success_tx.borrow_mut().take() {
            let _ = tx.send(Ok(()));
        }
    });

    let source_name = source.to_string();
    let error_callback = browser::closure_once(move |err: JsValue| {
        if let Some(tx) = error_tx.borrow_mut().take() {
            let _ = tx.send(Err(anyhow!(
                "Error loading image {} : {:#?}",
                source_name,
                err
            )));
        }
    });

    image.set_onload(Some(success_callback.as_ref().unchecked_ref()));
    image.set_onerror(Some(error_callback.as_ref().unchecked_ref()));
    image.set_src(source);

    // keep callbacks alive until image is loaded or errors
    success_callback.forget();
    error_callback.forget();

    // ?? - Result<Result<(), Error>, oneshot::Canceled>
    // - first ? : channel result
    // - second ? : image load result
    rx.await??;

    Ok(image)
}

// ==================== Input ====================
pub mod input {
    use super::*;
    use futures::channel::mpsc::unbounded;
    use std::collections::HashSet;

    pub const ARROW_LEFT: &str = "ArrowLeft";
    pub const ARROW_RIGHT: &str = "ArrowRight";
    pub const ARROW_UP: &str = "ArrowUp";
    pub const SPACE: &str = "Space";

    /// Keyboard event stripped down to what the game reads
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum KeyPress {
        KeyDown { code: String, repeat: bool },
        KeyUp { code: String },
    }

    /// Held keys plus keys that went down since the last tick
    #[derive(Debug, Default)]
    pub struct KeyState {
        pressed_keys: HashSet<String>,
        just_pressed: HashSet<String>,
    }

    impl KeyState {
        pub fn new() -> Self {
            KeyState::default()
        }

        pub fn is_pressed(&self, code: &str) -> bool {
            self.pressed_keys.contains(code)
        }

        /// True only on the first tick after the key went down
        pub fn was_just_pressed(&self, code: &str) -> bool {
            self.just_pressed.contains(code)
        }

        pub fn set_pressed(&mut self, code: &str, repeat: bool) {
            // auto repeat and already held keys are not new presses
            if !repeat && self.pressed_keys.insert(code.to_string()) {
                self.just_pressed.insert(code.to_string());
            }
        }

        pub fn set_released(&mut self, code: &str) {
            self.pressed_keys.remove(code);
        }

        pub fn end_tick(&mut self) {
            self.just_pressed.clear();
        }

        pub fn apply(&mut self, key_press: KeyPress) {
            match key_press {
                KeyPress::KeyDown { code, repeat } => self.set_pressed(&code, repeat),
                KeyPress::KeyUp { code } => self.set_released(&code),
            }
        }
    }

    pub fn prepare_input() -> Result<UnboundedReceiver<KeyPress>> {
        let (keydown_sender, keyevent_receiver) = unbounded();
        let keyup_sender = keydown_sender.clone();

        browser::listen_keyboard(
            move |event| {
                let _ = keydown_sender.unbounded_send(KeyPress::KeyDown {
                    code: event.code(),
                    repeat: event.repeat(),
                });
            },
            move |event| {
                let _ = keyup_sender.unbounded_send(KeyPress::KeyUp { code: event.code() });
            },
        )?;

        Ok(keyevent_receiver)
    }

    /// Drain every pending key event into `state`
    pub fn process_input(
        state: &mut KeyState,
        keyevent_receiver: &mut UnboundedReceiver<KeyPress>,
    ) {
        // stops once the queue is empty or the channel closed
        while let Ok(key_press) = keyevent_receiver.try_recv() {
            state.apply(key_press);
        }
    }
}
