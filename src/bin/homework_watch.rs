//! Homework status watcher binary.
//!
//! Reads secrets from the environment, polls the status API every
//! `retry_period_secs` and reports changes to a Telegram chat. Stops on
//! Ctrl+C or on a fatal configuration error.

use homework_watch::notify::{TelegramNotifier, report_startup_failure};
use homework_watch::source::PracticumClient;
use homework_watch::{Credentials, PollLoop, StateStore, WatchConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = WatchConfig::load()?;
    let _log_guard = init_tracing(&config);

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            error!(error = %e, "cannot start");
            report_startup_failure(&config, |name| std::env::var(name).ok(), &e).await;
            return Err(anyhow::anyhow!("homework-watch failed to start: {e}"));
        }
    };

    let store = StateStore::open(&config.db_path)?;
    let source = PracticumClient::new(&config, &credentials.practicum_token)?;
    let notifier = TelegramNotifier::from_config(&config, &credentials)?;
    let poll = PollLoop::new(&config, Arc::new(source), store, Arc::new(notifier));

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received Ctrl+C, shutting down...");
            cancel_clone.cancel();
        }
    });

    poll.run(cancel).await.map_err(|e| {
        error!(error = %e, "homework-watch exited with error");
        anyhow::anyhow!("homework-watch failed: {e}")
    })?;

    info!("homework-watch shut down cleanly");
    Ok(())
}

/// Install the stdout subscriber plus an optional file copy of the log.
///
/// The returned guard flushes the file writer on drop.
fn init_tracing(config: &WatchConfig) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("homework_watch=debug,reqwest=warn,hyper=warn"));

    let (file_layer, guard) = match config.log_file.as_deref() {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .map_or_else(|| "homework-watch.log".into(), |n| n.to_os_string());
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();

    guard
}
