//! Outbound notifications (Telegram) and the failure-streak gate.

pub mod gate;
pub mod telegram;
pub mod traits;

pub use gate::{NotificationGate, failure_message};
pub use telegram::{TelegramNotifier, report_startup_failure};
pub use traits::Notifier;
