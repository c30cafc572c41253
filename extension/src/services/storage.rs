// Chrome Storage API Integration
// Values are stored as plain JSON, readable by the popup and content script

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::ChromePlatform;
use super::js::{from_js, js_error, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], catch)]
    fn get(keys: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"], catch)]
    fn set(items: JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// Key-value access to the extension's persisted state.
///
/// No transactions: a get followed by a set can lose a concurrent write.
#[async_trait(?Send)]
pub trait KeyValueStore {
    /// Fetch the given keys. Missing keys are absent from the returned map.
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Write all items in one call
    async fn set(&self, items: Map<String, Value>) -> Result<()>;
}

#[async_trait(?Send)]
impl KeyValueStore for ChromePlatform {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        let list = js_sys::Array::new();
        for key in keys {
            list.push(&JsValue::from_str(key));
        }

        let promise = get(list.into()).map_err(js_error)?;
        let result = JsFuture::from(promise)
            .await
            .map_err(js_error)
            .context("chrome.storage.local.get failed")?;

        match from_js(&result)? {
            Value::Object(items) => Ok(items),
            Value::Null => Ok(Map::new()),
            other => bail!("chrome.storage.local.get returned {}", other),
        }
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        let promise = set(to_js(&Value::Object(items))?).map_err(js_error)?;
        JsFuture::from(promise)
            .await
            .map_err(js_error)
            .context("chrome.storage.local.set failed")?;
        Ok(())
    }
}
