// chrome.alarms integration

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::ChromePlatform;
use super::js::{js_error, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "alarms"], js_name = create, catch)]
    fn create_alarm(name: &str, info: JsValue) -> Result<js_sys::Promise, JsValue>;
}

/// First fire time and repeat interval of a recurring alarm
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlarmSpec {
    pub when: DateTime<Utc>,
    pub period_in_minutes: u32,
}

#[async_trait(?Send)]
pub trait AlarmScheduler {
    /// Register a named alarm, replacing any existing alarm with that name
    async fn create(&self, name: &str, spec: &AlarmSpec) -> Result<()>;
}

#[async_trait(?Send)]
impl AlarmScheduler for ChromePlatform {
    async fn create(&self, name: &str, spec: &AlarmSpec) -> Result<()> {
        let info = to_js(&json!({
            "when": spec.when.timestamp_millis(),
            "periodInMinutes": spec.period_in_minutes,
        }))?;

        let promise = create_alarm(name, info).map_err(js_error)?;
        JsFuture::from(promise)
            .await
            .map_err(js_error)
            .with_context(|| format!("chrome.alarms.create({}) failed", name))?;
        Ok(())
    }
}
