// Message routing between popup, content script and debug page

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::services::{KeyValueStore, MessageBus};
use crate::state::{self, USER_STATS};

/// Incoming `{ action, message? }` request
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    GetStats,
    LogInfo {
        #[serde(default)]
        message: Value,
    },
    LogDebug {
        #[serde(default)]
        message: Value,
    },
    /// Any action this worker does not answer
    #[serde(other)]
    Unsupported,
}

impl Request {
    /// Requests without a recognizable `action` are unsupported
    pub fn parse(value: Value) -> Self {
        serde_json::from_value(value).unwrap_or(Request::Unsupported)
    }

    /// Whether a reply will be sent. Known synchronously so the listener
    /// can keep the response channel open.
    pub fn expects_response(&self) -> bool {
        !matches!(self, Request::Unsupported)
    }
}

#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum Response {
    Stats { stats: Value },
    Ack { success: bool },
}

/// Strings log without quotes, anything else as JSON
fn display(message: &Value) -> String {
    match message {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Handle `runtime.onMessage`. `None` means no reply is sent.
pub async fn handle_message<P>(platform: &P, request: Request) -> Result<Option<Response>>
where
    P: KeyValueStore + MessageBus,
{
    log::debug!("Message received in background: {:?}", request);

    match request {
        Request::GetStats => {
            let mut data = platform.get(&[USER_STATS]).await?;
            // Any falsy stored value (null, 0, false, "") answers as an empty record
            let stats = match data.remove(USER_STATS) {
                Some(stats) if state::is_truthy(&stats) => stats,
                _ => Value::Object(Map::new()),
            };
            log::debug!("Sending stats to popup: {}", stats);
            Ok(Some(Response::Stats { stats }))
        }
        Request::LogInfo { message } => {
            log::info!("Content script: {}", display(&message));
            Ok(Some(Response::Ack { success: true }))
        }
        Request::LogDebug { message } => {
            log::info!("Debug: {}", display(&message));

            let mut forward = json!({ "action": "logDebug" });
            if !message.is_null() {
                forward["message"] = message;
            }
            // Debug page is usually closed; nobody listening is fine
            if let Err(e) = platform.broadcast(forward).await {
                log::debug!("Debug message not forwarded: {:#}", e);
            }

            Ok(Some(Response::Ack { success: true }))
        }
        Request::Unsupported => Ok(None),
    }
}
