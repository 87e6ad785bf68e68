// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
pub mod config;
pub mod engine;
mod game;
pub mod generator;
pub mod physics;
pub mod simulation;
pub mod sprite;

use engine::GameLoop;
use game::Platformer;

// ==================== Main Functions ====================
/// Main entry for the WebAssembly module
/// - installs the panic hook
/// - loads config and images
/// - starts the game loop
#[wasm_bindgen(start)]
pub fn main_js() -> Result<(), JsValue> {
    // readable panic messages in the browser console
    console_error_panic_hook::set_once();

    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(Platformer::new()).await {
            error!("Could not start the game : {:#}", err);
        }
    });

    Ok(())
}
