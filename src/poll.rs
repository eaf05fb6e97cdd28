//! Poll loop: fetch, validate, detect, persist, notify, sleep.
//!
//! Each cycle runs to completion before the next one starts. A cycle's
//! visible effects (one upsert, one message) are issued only after the
//! response has been fully validated.
//!
//! # Policy
//!
//! - A homework seen for the first time is reported like any other change.
//! - The snapshot is persisted before the message is sent, so a failed send
//!   is never retried and never reported twice.
//! - The `from_date` cursor is fixed at construction; the state store alone
//!   deduplicates statuses across cycles.
//! - Cancellation interrupts an in-flight cycle as well as the sleep. A cycle
//!   cut off after its upsert loses the message, like a failed send.

use crate::config::WatchConfig;
use crate::detector::has_changed;
use crate::error::{Result, Severity, WatchError};
use crate::homework::StatusRecord;
use crate::notify::{NotificationGate, Notifier};
use crate::source::StatusSource;
use crate::store::StateStore;
use crate::validator::validate;
use crate::verdict::status_message;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Result of one poll cycle.
#[derive(Debug)]
pub enum PollOutcome {
    /// Nothing to report.
    NoChange,
    /// A new status was persisted and `message` should be sent.
    Changed { homework_id: String, message: String },
    /// The cycle aborted.
    Failed { error: WatchError, severity: Severity },
}

/// Periodic homework status watcher.
pub struct PollLoop {
    source: Arc<dyn StatusSource>,
    store: StateStore,
    gate: NotificationGate,
    from_date: i64,
    retry_period: Duration,
}

impl PollLoop {
    pub fn new(
        config: &WatchConfig,
        source: Arc<dyn StatusSource>,
        store: StateStore,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            source,
            store,
            gate: NotificationGate::new(notifier),
            from_date: config.resolved_from_date(),
            retry_period: config.retry_period(),
        }
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run one cycle without sending anything.
    ///
    /// Debug-level conditions (empty list, no new status) end as
    /// [`PollOutcome::NoChange`].
    pub async fn run_cycle(&self) -> PollOutcome {
        match self.check().await {
            Ok(Some((homework_id, message))) => PollOutcome::Changed {
                homework_id,
                message,
            },
            Ok(None) => PollOutcome::NoChange,
            Err(error) => match error.severity() {
                Severity::Debug => {
                    debug!("{error}");
                    PollOutcome::NoChange
                }
                severity => PollOutcome::Failed { error, severity },
            },
        }
    }

    async fn check(&self) -> Result<Option<(String, String)>> {
        let raw = self.source.fetch(self.from_date).await?;
        let homeworks = validate(&raw)?;
        let Some(first) = homeworks.first() else {
            return Err(WatchError::EmptyList);
        };
        let record = StatusRecord::from_value(first)?;

        let stored = self.store.get(&record.id)?;
        if !has_changed(&record, stored.as_ref()) {
            return Err(WatchError::NoNewStatus);
        }

        let message = status_message(&record)?;
        self.store.upsert(&record.snapshot())?;
        info!(
            homework_id = %record.id,
            status = %record.status,
            previous = stored.as_ref().map(|s| s.status.as_str()).unwrap_or("<none>"),
            "homework status changed"
        );
        Ok(Some((record.id, message)))
    }

    /// Apply the user-visible effects of `outcome`.
    ///
    /// # Errors
    ///
    /// Returns the error of a fatal outcome; the loop must stop.
    pub async fn handle_outcome(&mut self, outcome: PollOutcome) -> Result<()> {
        match outcome {
            PollOutcome::NoChange => self.gate.record_success(),
            PollOutcome::Changed { message, .. } => {
                self.gate.record_success();
                self.gate.deliver(&message).await;
            }
            PollOutcome::Failed {
                error,
                severity: Severity::Fatal,
            } => {
                error!(error = %error, "fatal error, stopping poll loop");
                return Err(error);
            }
            PollOutcome::Failed {
                error,
                severity: Severity::Debug,
            } => {
                debug!("{error}");
                self.gate.record_success();
            }
            PollOutcome::Failed {
                error,
                severity: Severity::Reportable,
            } => {
                error!(error = %error, "poll cycle failed");
                self.gate.report_failure(&error).await;
            }
        }
        Ok(())
    }

    async fn step(&mut self) -> Result<()> {
        let outcome = self.run_cycle().await;
        self.handle_outcome(outcome).await
    }

    /// Poll until `cancel` fires or a fatal error occurs.
    ///
    /// # Errors
    ///
    /// Returns the fatal error that stopped the loop.
    pub async fn run(mut self, cancel: CancellationToken) -> Result<()> {
        info!(
            from_date = self.from_date,
            retry_period_secs = self.retry_period.as_secs(),
            "poll loop started"
        );
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("poll loop cancelled during a cycle");
                    break;
                }
                result = self.step() => result?,
            }

            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("poll loop cancelled");
                    break;
                }
                _ = tokio::time::sleep(self.retry_period) => {}
            }
        }
        Ok(())
    }
}
