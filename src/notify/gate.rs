//! Failure-streak gate for outbound notifications.
//!
//! A sustained outage produces exactly one failure message at its onset.
//! The next successful cycle clears the gate without sending anything.

use crate::error::WatchError;
use crate::notify::traits::Notifier;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Chat text announcing a failure.
#[must_use]
pub fn failure_message(failure: &WatchError) -> String {
    format!("Сбой в работе программы: {failure}")
}

/// Dispatches chat messages and remembers whether the current failure
/// streak has already been reported.
pub struct NotificationGate {
    notifier: Arc<dyn Notifier>,
    already_notified: bool,
}

impl NotificationGate {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            notifier,
            already_notified: false,
        }
    }

    /// Clear the failure streak. Sends nothing.
    pub fn record_success(&mut self) {
        if self.already_notified {
            debug!("failure streak ended");
        }
        self.already_notified = false;
    }

    /// Whether a failure right now would be sent to the chat.
    #[must_use]
    pub fn should_escalate(&self) -> bool {
        !self.already_notified
    }

    /// Report a failure once per streak. Later failures are only logged.
    pub async fn report_failure(&mut self, failure: &WatchError) {
        if !self.should_escalate() {
            debug!(error = %failure, "failure already reported in this streak, not sending");
            return;
        }
        self.already_notified = true;
        if let Err(e) = self.notifier.send(&failure_message(failure)).await {
            error!(channel = self.notifier.id(), error = %e, "cannot report failure");
        }
    }

    /// Deliver a status message. Delivery errors are logged, never propagated,
    /// and open a failure streak.
    pub async fn deliver(&mut self, message: &str) {
        match self.notifier.send(message).await {
            Ok(()) => debug!(channel = self.notifier.id(), text = message, "message sent"),
            Err(e) => {
                error!(channel = self.notifier.id(), error = %e, "message delivery failed");
                if self.already_notified {
                    warn!("delivery failed during an already reported failure streak");
                }
                self.already_notified = true;
            }
        }
    }
}
