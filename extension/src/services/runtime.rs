// chrome.runtime / chrome.tabs / chrome.scripting integration

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::ChromePlatform;
use super::js::{js_error, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = sendMessage, catch)]
    fn send_message(message: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getURL)]
    fn get_url(path: &str) -> String;

    #[wasm_bindgen(js_namespace = ["chrome", "tabs"], js_name = create, catch)]
    fn create_tab(properties: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "scripting"], js_name = executeScript, catch)]
    fn execute_script(injection: JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// Messaging between extension surfaces (popup, debug page, background)
#[async_trait(?Send)]
pub trait MessageBus {
    /// Send to every listening surface. Fails when nobody is listening.
    async fn broadcast(&self, message: Value) -> Result<()>;
}

/// Browser tab operations
#[async_trait(?Send)]
pub trait TabHost {
    /// Absolute URL of a page packaged with the extension
    fn extension_url(&self, path: &str) -> String;

    async fn open_tab(&self, url: &str) -> Result<()>;

    async fn inject_script(&self, tab_id: i32, files: &[String]) -> Result<()>;
}

#[async_trait(?Send)]
impl MessageBus for ChromePlatform {
    async fn broadcast(&self, message: Value) -> Result<()> {
        let promise = send_message(to_js(&message)?).map_err(js_error)?;
        JsFuture::from(promise)
            .await
            .map_err(js_error)
            .context("chrome.runtime.sendMessage failed")?;
        Ok(())
    }
}

#[async_trait(?Send)]
impl TabHost for ChromePlatform {
    fn extension_url(&self, path: &str) -> String {
        get_url(path)
    }

    async fn open_tab(&self, url: &str) -> Result<()> {
        let promise = create_tab(to_js(&json!({ "url": url }))?).map_err(js_error)?;
        JsFuture::from(promise)
            .await
            .map_err(js_error)
            .context("chrome.tabs.create failed")?;
        Ok(())
    }

    async fn inject_script(&self, tab_id: i32, files: &[String]) -> Result<()> {
        let injection = to_js(&json!({
            "target": { "tabId": tab_id },
            "files": files,
        }))?;

        let promise = execute_script(injection).map_err(js_error)?;
        JsFuture::from(promise)
            .await
            .map_err(js_error)
            .with_context(|| format!("chrome.scripting.executeScript on tab {} failed", tab_id))?;
        Ok(())
    }
}
