// Install / update handling
// Seeds persisted defaults, then (re)registers the reset alarms

use anyhow::Result;
use chrono::{DateTime, TimeZone};
use serde_json::Map;
use std::fmt::Display;

use super::schedule::{schedule_resets, ResetSchedule};
use crate::config::Config;
use crate::services::{AlarmScheduler, KeyValueStore};
use crate::state::{self, EXTENSION_ENABLED, PURCHASE_RECORDS, USER_STATS};

/// Write defaults for every key that is not initialized yet.
///
/// Existing values are never overwritten. All defaults go out in a single
/// `set`, and nothing is written when every key already exists. Returns the
/// keys that were seeded.
pub async fn initialize_defaults(store: &impl KeyValueStore) -> Result<Vec<&'static str>> {
    let data = store
        .get(&[PURCHASE_RECORDS, USER_STATS, EXTENSION_ENABLED])
        .await?;

    let mut updates = Map::new();

    if !state::is_present(&data, PURCHASE_RECORDS) {
        updates.insert(PURCHASE_RECORDS.to_string(), state::default_purchase_records());
        log::info!("Initializing empty purchase records");
    }

    if !state::is_present(&data, USER_STATS) {
        updates.insert(USER_STATS.to_string(), state::default_user_stats());
        log::info!("Initializing default user stats");
    }

    // An explicit `false` (or null) is the user's choice, only a missing key is seeded
    if !data.contains_key(EXTENSION_ENABLED) {
        updates.insert(EXTENSION_ENABLED.to_string(), state::default_extension_enabled());
        log::info!("Setting extension to enabled by default");
    }

    let seeded: Vec<&'static str> = [PURCHASE_RECORDS, USER_STATS, EXTENSION_ENABLED]
        .into_iter()
        .filter(|key| updates.contains_key(*key))
        .collect();

    if !updates.is_empty() {
        store.set(updates).await?;
        log::info!("Default values initialized successfully");
    }

    Ok(seeded)
}

/// Outcome of one install/update event
#[derive(Debug)]
pub struct InstallReport {
    pub seeded: Result<Vec<&'static str>>,
    pub schedule: Result<ResetSchedule>,
}

/// Handle `runtime.onInstalled`.
///
/// Seeding and scheduling are independent: a storage failure does not stop
/// the alarms from being registered.
pub async fn handle_installed<P, Tz>(platform: &P, config: &Config, now: &DateTime<Tz>) -> InstallReport
where
    P: KeyValueStore + AlarmScheduler,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    log::info!("Extension installed or updated");

    let seeded = initialize_defaults(platform).await;
    if let Err(e) = &seeded {
        log::warn!("Failed to initialize default values: {:#}", e);
    }

    let schedule = schedule_resets(platform, &config.schedule, now).await;
    if let Err(e) = &schedule {
        log::warn!("Failed to schedule stats resets: {:#}", e);
    }

    InstallReport { seeded, schedule }
}
