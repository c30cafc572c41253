// Background service worker entry points
// All business logic in Rust, JavaScript is just glue to Chrome APIs
// (see static/background.js). Entry points never throw: handler errors are
// logged and the returned promise resolves.

use chrono::Local;
use wasm_bindgen::prelude::*;

use crate::config;
use crate::handlers::{self, Request, TabUpdate};
use crate::services::js::{from_js, to_js};
use crate::services::ChromePlatform;

/// Handle extension installation or update
#[wasm_bindgen]
pub async fn handle_install() {
    handlers::handle_installed(&ChromePlatform, config::current(), &Local::now()).await;
}

/// Handle a fired alarm
#[wasm_bindgen]
pub async fn handle_alarm(name: String) {
    if let Err(e) = handlers::handle_alarm(&ChromePlatform, &name).await {
        log::error!("Failed to handle alarm {}: {:#}", name, e);
    }
}

/// Whether `handle_message` will produce a reply for this request.
/// The listener returns this synchronously to keep `sendResponse` alive.
#[wasm_bindgen]
pub fn expects_response(request: JsValue) -> bool {
    from_js(&request)
        .map(Request::parse)
        .is_ok_and(|request| request.expects_response())
}

/// Handle message from another extension surface.
/// Resolves to the response object, or `undefined` when no reply is due.
#[wasm_bindgen]
pub async fn handle_message(request: JsValue) -> JsValue {
    let request = match from_js(&request) {
        Ok(value) => Request::parse(value),
        Err(e) => {
            log::warn!("Unreadable message: {:#}", e);
            return JsValue::UNDEFINED;
        }
    };

    let response = match handlers::handle_message(&ChromePlatform, request).await {
        Ok(Some(response)) => response,
        Ok(None) => return JsValue::UNDEFINED,
        Err(e) => {
            log::error!("Failed to handle message: {:#}", e);
            return JsValue::UNDEFINED;
        }
    };

    serde_json::to_value(&response)
        .map_err(anyhow::Error::from)
        .and_then(|value| to_js(&value))
        .unwrap_or_else(|e| {
            log::error!("Failed to encode response: {:#}", e);
            JsValue::UNDEFINED
        })
}

/// Handle extension icon click
#[wasm_bindgen]
pub async fn handle_icon_click() {
    if let Err(e) = handlers::open_main_page(&ChromePlatform, &config::current().pages).await {
        log::error!("Failed to open main page: {:#}", e);
    }
}

/// Handle a tab update. `status` is `changeInfo.status`, `url` is `tab.url`.
#[wasm_bindgen]
pub async fn handle_tab_updated(tab_id: i32, status: Option<String>, url: Option<String>) {
    let update = TabUpdate { tab_id, status, url };
    handlers::handle_tab_updated(&ChromePlatform, config::current(), &update).await;
}
