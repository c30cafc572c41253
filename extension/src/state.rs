// Persisted extension state
// Keys shared with the popup and content script via chrome.storage.local

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub const PURCHASE_RECORDS: &str = "purchaseRecords";
pub const USER_STATS: &str = "userStats";
pub const EXTENSION_ENABLED: &str = "extensionEnabled";

/// Aggregate counters. The content script increments them, the alarm
/// handler zeroes the weekly/monthly windows.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_impulses_stopped: u64,
    #[serde(default)]
    pub total_money_saved: f64,
    #[serde(default)]
    pub weekly_impulses_stopped: u64,
    #[serde(default)]
    pub weekly_money_saved: f64,
    #[serde(default)]
    pub monthly_impulses_stopped: u64,
    #[serde(default)]
    pub monthly_money_saved: f64,

    // Fields added by other surfaces survive a read-modify-write
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Rolling counter windows that get reset on a schedule
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatsWindow {
    Weekly,
    Monthly,
}

impl StatsWindow {
    pub const ALL: [StatsWindow; 2] = [StatsWindow::Weekly, StatsWindow::Monthly];

    /// Name of the recurring alarm that resets this window
    pub fn alarm_name(self) -> &'static str {
        match self {
            StatsWindow::Weekly => "resetWeeklyStats",
            StatsWindow::Monthly => "resetMonthlyStats",
        }
    }

    pub fn from_alarm_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.alarm_name() == name)
    }

    /// Storage field names of the two counters in this window
    pub fn counter_keys(self) -> [&'static str; 2] {
        match self {
            StatsWindow::Weekly => ["weeklyImpulsesStopped", "weeklyMoneySaved"],
            StatsWindow::Monthly => ["monthlyImpulsesStopped", "monthlyMoneySaved"],
        }
    }

    /// Zero this window's counters in a stored `userStats` record.
    /// Every other field is left exactly as stored.
    pub fn reset(self, stats: &mut Map<String, Value>) {
        for key in self.counter_keys() {
            stats.insert(key.to_string(), Value::from(0));
        }
    }
}

/// Missing and `null` both count as "not initialized"
pub fn is_present(data: &Map<String, Value>, key: &str) -> bool {
    data.get(key).is_some_and(|v| !v.is_null())
}

/// JavaScript truthiness: `null`, `false`, `0` and `""` are falsy.
/// Objects and arrays are truthy even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn default_purchase_records() -> Value {
    Value::Array(Vec::new())
}

pub fn default_user_stats() -> Value {
    json!({
        "totalImpulsesStopped": 0,
        "totalMoneySaved": 0,
        "weeklyImpulsesStopped": 0,
        "weeklyMoneySaved": 0,
        "monthlyImpulsesStopped": 0,
        "monthlyMoneySaved": 0
    })
}

pub fn default_extension_enabled() -> Value {
    Value::Bool(true)
}
