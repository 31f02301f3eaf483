/// Clip Window - browser extension that keeps video playback inside a saved start/end window
/// Built with Rust + WASM + Yew

mod chrome;
mod config;
mod content;
mod enforcer;
mod error;
mod navigation;
mod storage;
mod trim_data;
pub mod ui;
mod video_id;

use wasm_bindgen::prelude::*;

// Set up panic hook and logging for the console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::new(config::LOG_LEVEL));
}

// Re-export video ID resolution for JavaScript access
#[wasm_bindgen]
pub fn resolve_video_id(url: &str) -> Option<String> {
    video_id::resolve(url)
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start enforcement in the page the content script was injected into
#[wasm_bindgen]
pub fn start_content_script() {
    if let Err(e) = content::start() {
        log::warn!("Content script only partly wired: {:?}", e);
    }
}
