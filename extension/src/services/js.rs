// JsValue <-> serde_json bridge
// Goes through JSON.stringify/parse; storage values are plain JSON anyway.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use wasm_bindgen::JsValue;

pub fn js_error(err: JsValue) -> anyhow::Error {
    match err.as_string() {
        Some(message) => anyhow!(message),
        None => anyhow!("{:?}", err),
    }
}

pub fn to_js(value: &Value) -> Result<JsValue> {
    let text = serde_json::to_string(value).context("Serialization error")?;
    js_sys::JSON::parse(&text).map_err(js_error)
}

pub fn from_js(value: &JsValue) -> Result<Value> {
    if value.is_undefined() {
        return Ok(Value::Null);
    }
    let text: String = js_sys::JSON::stringify(value).map_err(js_error)?.into();
    serde_json::from_str(&text).context("Parse error")
}
