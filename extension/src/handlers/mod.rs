// Background event handlers
// One module per platform event; they share state only through the store.

pub mod alarms;
pub mod install;
pub mod messages;
pub mod schedule;
pub mod tabs;

pub use alarms::{handle_alarm, AlarmOutcome};
pub use install::{handle_installed, initialize_defaults, InstallReport};
pub use messages::{handle_message, Request, Response};
pub use schedule::{next_monthly_reset, next_weekly_reset, schedule_resets, ResetSchedule};
pub use tabs::{handle_tab_updated, is_shopping_url, open_main_page, InjectionOutcome, TabUpdate};
