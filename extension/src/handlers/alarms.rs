// Alarm handling: zero the rolling stats windows

use anyhow::Result;
use serde_json::{Map, Value};

use crate::services::KeyValueStore;
use crate::state::{StatsWindow, USER_STATS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmOutcome {
    Reset(StatsWindow),
    /// `userStats` has not been initialized, nothing written
    NoStats,
    /// Not one of our alarms
    Ignored,
}

/// Handle `alarms.onAlarm`
pub async fn handle_alarm(store: &impl KeyValueStore, name: &str) -> Result<AlarmOutcome> {
    log::info!("Alarm triggered: {}", name);

    let Some(window) = StatsWindow::from_alarm_name(name) else {
        log::debug!("Ignoring unknown alarm {}", name);
        return Ok(AlarmOutcome::Ignored);
    };

    let mut data = store.get(&[USER_STATS]).await?;
    let mut stats = match data.remove(USER_STATS) {
        Some(Value::Object(stats)) => stats,
        Some(Value::Null) | None => return Ok(AlarmOutcome::NoStats),
        Some(other) => {
            log::warn!("Stored userStats is not a record, skipping reset: {}", other);
            return Ok(AlarmOutcome::NoStats);
        }
    };

    window.reset(&mut stats);

    let mut update = Map::new();
    update.insert(USER_STATS.to_string(), Value::Object(stats));
    store.set(update).await?;

    match window {
        StatsWindow::Weekly => log::info!("Weekly stats reset"),
        StatsWindow::Monthly => log::info!("Monthly stats reset"),
    }
    Ok(AlarmOutcome::Reset(window))
}
