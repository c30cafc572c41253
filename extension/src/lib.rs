//! Spindle background worker
//!
//! Event handlers for the extension's service worker: default state on
//! install, weekly/monthly stats resets, message routing between surfaces,
//! and content script injection on shopping sites.

use wasm_bindgen::prelude::*;

pub mod background;
pub mod config;
pub mod handlers;
pub mod services;
pub mod state;

pub use config::Config;
pub use services::MemoryPlatform;

#[wasm_bindgen(start)]
pub fn run() {
    let (config, failure) = config::init();
    wasm_logger::init(wasm_logger::Config::new(config.logging.level()));

    if let Some(e) = failure {
        log::warn!("Using default settings: {:#}", e);
    }
    log::info!("Spindle background worker started");
}
