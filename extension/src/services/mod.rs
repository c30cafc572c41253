// Platform services used by the background handlers
// Each capability is a trait so handlers run against chrome.* in the
// service worker and against MemoryPlatform in tests.

pub mod alarms;
pub(crate) mod js;
pub mod memory;
pub mod runtime;
pub mod storage;

pub use alarms::{AlarmScheduler, AlarmSpec};
pub use memory::MemoryPlatform;
pub use runtime::{MessageBus, TabHost};
pub use storage::KeyValueStore;

/// The real extension APIs: chrome.storage.local, chrome.alarms,
/// chrome.runtime, chrome.tabs and chrome.scripting
#[derive(Clone, Copy, Debug, Default)]
pub struct ChromePlatform;
