// In-memory platform
// Backs every service trait with local state and records side effects

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde_json::{Map, Value};

use super::{AlarmScheduler, AlarmSpec, KeyValueStore, MessageBus, TabHost};

const EXTENSION_ORIGIN: &str = "chrome-extension://spindle";

#[derive(Default)]
pub struct MemoryPlatform {
    store: RefCell<Map<String, Value>>,
    store_writes: Cell<usize>,
    store_fails: Cell<bool>,

    alarms: RefCell<BTreeMap<String, AlarmSpec>>,

    broadcasts: RefCell<Vec<Value>>,
    broadcast_fails: Cell<bool>,

    opened_tabs: RefCell<Vec<String>>,
    injections: RefCell<Vec<(i32, Vec<String>)>>,
    injection_fails: Cell<bool>,
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with pre-populated storage
    pub fn with_store(items: Map<String, Value>) -> Self {
        let platform = Self::default();
        *platform.store.borrow_mut() = items;
        platform
    }

    /// Copy of everything currently stored
    pub fn stored(&self) -> Map<String, Value> {
        self.store.borrow().clone()
    }

    /// Number of successful `set` calls
    pub fn store_writes(&self) -> usize {
        self.store_writes.get()
    }

    pub fn alarms(&self) -> BTreeMap<String, AlarmSpec> {
        self.alarms.borrow().clone()
    }

    pub fn broadcasts(&self) -> Vec<Value> {
        self.broadcasts.borrow().clone()
    }

    pub fn opened_tabs(&self) -> Vec<String> {
        self.opened_tabs.borrow().clone()
    }

    pub fn injections(&self) -> Vec<(i32, Vec<String>)> {
        self.injections.borrow().clone()
    }

    /// Make every storage call fail
    pub fn fail_store(&self, fail: bool) {
        self.store_fails.set(fail);
    }

    /// Behave as if no other surface is listening
    pub fn fail_broadcasts(&self, fail: bool) {
        self.broadcast_fails.set(fail);
    }

    pub fn fail_injections(&self, fail: bool) {
        self.injection_fails.set(fail);
    }
}

#[async_trait(?Send)]
impl KeyValueStore for MemoryPlatform {
    async fn get(&self, keys: &[&str]) -> Result<Map<String, Value>> {
        if self.store_fails.get() {
            bail!("storage unavailable");
        }
        let store = self.store.borrow();
        Ok(keys
            .iter()
            .filter_map(|key| store.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: Map<String, Value>) -> Result<()> {
        if self.store_fails.get() {
            bail!("storage unavailable");
        }
        self.store.borrow_mut().extend(items);
        self.store_writes.set(self.store_writes.get() + 1);
        Ok(())
    }
}

#[async_trait(?Send)]
impl AlarmScheduler for MemoryPlatform {
    async fn create(&self, name: &str, spec: &AlarmSpec) -> Result<()> {
        self.alarms.borrow_mut().insert(name.to_string(), spec.clone());
        Ok(())
    }
}

#[async_trait(?Send)]
impl MessageBus for MemoryPlatform {
    async fn broadcast(&self, message: Value) -> Result<()> {
        if self.broadcast_fails.get() {
            bail!("Could not establish connection. Receiving end does not exist.");
        }
        self.broadcasts.borrow_mut().push(message);
        Ok(())
    }
}

#[async_trait(?Send)]
impl TabHost for MemoryPlatform {
    fn extension_url(&self, path: &str) -> String {
        format!("{}/{}", EXTENSION_ORIGIN, path.trim_start_matches('/'))
    }

    async fn open_tab(&self, url: &str) -> Result<()> {
        self.opened_tabs.borrow_mut().push(url.to_string());
        Ok(())
    }

    async fn inject_script(&self, tab_id: i32, files: &[String]) -> Result<()> {
        if self.injection_fails.get() {
            bail!("Cannot access contents of the page");
        }
        self.injections.borrow_mut().push((tab_id, files.to_vec()));
        Ok(())
    }
}
