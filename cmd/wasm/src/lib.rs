mod api;
mod client;
mod loader;
mod log;

use wasm_bindgen::prelude::*;

pub use worker_engine::server::ClassifierServer;

use crate::log::setup_logger;

#[wasm_bindgen(start)]
pub fn start() {
    setup_logger();
}
