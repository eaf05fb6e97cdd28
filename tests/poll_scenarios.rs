//! End-to-end poll loop scenarios with scripted source and chat.

use async_trait::async_trait;
use homework_watch::notify::{Notifier, TelegramNotifier};
use homework_watch::source::StatusSource;
use homework_watch::{
    PollLoop, PollOutcome, Result, StateStore, StoredSnapshot, WatchConfig, WatchError,
};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Returns scripted responses in order, repeating the last one forever.
struct ScriptedSource {
    responses: Mutex<VecDeque<Result<Value>>>,
    last: Mutex<Option<Value>>,
    calls: Mutex<Vec<i64>>,
}

impl ScriptedSource {
    fn new(responses: Vec<Result<Value>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            last: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<i64> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl StatusSource for ScriptedSource {
    async fn fetch(&self, from_date: i64) -> Result<Value> {
        self.calls.lock().expect("calls lock").push(from_date);
        let next = self.responses.lock().expect("responses lock").pop_front();
        match next {
            Some(Ok(body)) => {
                *self.last.lock().expect("last lock") = Some(body.clone());
                Ok(body)
            }
            Some(Err(e)) => Err(e),
            None => self
                .last
                .lock()
                .expect("last lock")
                .clone()
                .ok_or_else(|| WatchError::Transport("script exhausted".to_owned())),
        }
    }
}

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<String> {
        self.sent.lock().expect("sent lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn id(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, text: &str) -> Result<()> {
        self.sent.lock().expect("sent lock").push(text.to_owned());
        if self.fail {
            return Err(WatchError::Delivery("chat unreachable".to_owned()));
        }
        Ok(())
    }
}

fn homework(status: &str, updated: &str) -> Value {
    json!({"homeworks": [{
        "id": "1",
        "status": status,
        "homework_name": "X",
        "date_updated": updated,
    }]})
}

fn test_config() -> WatchConfig {
    WatchConfig {
        retry_period_secs: 0,
        from_date: Some(1_700_000_000),
        ..WatchConfig::default()
    }
}

fn build(source: &Arc<ScriptedSource>, notifier: &Arc<RecordingNotifier>) -> PollLoop {
    PollLoop::new(
        &test_config(),
        Arc::clone(source) as Arc<dyn StatusSource>,
        StateStore::open_in_memory().expect("store"),
        Arc::clone(notifier) as Arc<dyn Notifier>,
    )
}

async fn cycle(poll: &mut PollLoop) {
    let outcome = poll.run_cycle().await;
    poll.handle_outcome(outcome).await.expect("not fatal");
}

#[tokio::test]
async fn scenario_a_first_observation_is_reported_and_persisted() {
    let source = ScriptedSource::new(vec![Ok(homework("reviewing", "t1"))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let mut poll = build(&source, &notifier);

    cycle(&mut poll).await;

    assert_eq!(
        notifier.sent(),
        vec![
            "Изменился статус проверки работы \"X\". Работа взята на проверку ревьюером."
                .to_owned()
        ]
    );
    assert_eq!(
        poll.store().get("1").expect("get"),
        Some(StoredSnapshot {
            id: "1".to_owned(),
            status: "reviewing".to_owned(),
            updated_at: "t1".to_owned(),
        })
    );
}

#[tokio::test]
async fn scenario_b_unchanged_record_sends_nothing() {
    let source = ScriptedSource::new(vec![
        Ok(homework("reviewing", "t1")),
        Ok(homework("reviewing", "t1")),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let mut poll = build(&source, &notifier);

    cycle(&mut poll).await;
    let second = poll.run_cycle().await;

    assert!(matches!(second, PollOutcome::NoChange));
    poll.handle_outcome(second).await.expect("not fatal");
    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(poll.store().len().expect("len"), 1);
}

#[tokio::test]
async fn status_transition_is_reported_once() {
    let source = ScriptedSource::new(vec![
        Ok(homework("reviewing", "t1")),
        Ok(homework("approved", "t2")),
        Ok(homework("approved", "t2")),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let mut poll = build(&source, &notifier);

    for _ in 0..3 {
        cycle(&mut poll).await;
    }

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[1].ends_with("Работа проверена: ревьюеру всё понравилось. Ура!"));
    assert_eq!(
        poll.store().get("1").expect("get").map(|s| s.status),
        Some("approved".to_owned())
    );
}

#[tokio::test]
async fn scenario_c_unknown_status_reported_once_and_not_persisted() {
    let source = ScriptedSource::new(vec![
        Ok(homework("archived", "t1")),
        Ok(homework("archived", "t1")),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let mut poll = build(&source, &notifier);

    let first = poll.run_cycle().await;
    assert!(matches!(
        first,
        PollOutcome::Failed {
            error: WatchError::UnknownStatus(_),
            ..
        }
    ));
    poll.handle_outcome(first).await.expect("not fatal");
    cycle(&mut poll).await;

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].contains("archived"));
    assert!(poll.store().is_empty().expect("is_empty"));
}

#[tokio::test]
async fn outage_then_recovery_then_outage_sends_two_failure_messages() {
    let source = ScriptedSource::new(vec![
        Err(WatchError::BadStatus {
            endpoint: "e".to_owned(),
            status: 500,
        }),
        Ok(json!({"unexpected": true})),
        Ok(json!({"homeworks": []})),
        Err(WatchError::Transport("reset".to_owned())),
    ]);
    let notifier = Arc::new(RecordingNotifier::default());
    let mut poll = build(&source, &notifier);

    for _ in 0..4 {
        cycle(&mut poll).await;
    }

    let sent = notifier.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent[0].contains("500"));
    assert!(sent[1].contains("reset"));
}

#[tokio::test]
async fn delivery_failure_does_not_resend_or_stop() {
    let source = ScriptedSource::new(vec![Ok(homework("rejected", "t1"))]);
    let notifier = Arc::new(RecordingNotifier {
        fail: true,
        ..Default::default()
    });
    let mut poll = build(&source, &notifier);

    cycle(&mut poll).await;
    cycle(&mut poll).await;

    assert_eq!(notifier.sent().len(), 1);
    assert_eq!(
        poll.store().get("1").expect("get").map(|s| s.status),
        Some("rejected".to_owned())
    );
}

#[tokio::test]
async fn cursor_is_not_advanced_between_cycles() {
    let source = ScriptedSource::new(vec![Ok(homework("reviewing", "t1"))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let mut poll = build(&source, &notifier);

    cycle(&mut poll).await;
    cycle(&mut poll).await;

    assert_eq!(source.calls(), vec![1_700_000_000, 1_700_000_000]);
}

#[tokio::test]
async fn run_stops_when_cancelled() {
    let source = ScriptedSource::new(vec![Ok(homework("reviewing", "t1"))]);
    let notifier = Arc::new(RecordingNotifier::default());
    let poll = PollLoop::new(
        &WatchConfig {
            retry_period_secs: 3600,
            from_date: Some(0),
            ..WatchConfig::default()
        },
        Arc::clone(&source) as Arc<dyn StatusSource>,
        StateStore::open_in_memory().expect("store"),
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(poll.run(cancel.clone()));

    tokio::time::sleep(Duration::from_millis(100)).await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("loop should stop promptly")
        .expect("task should not panic");
    assert!(result.is_ok());
    assert_eq!(source.calls().len(), 1);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn run_stops_when_cancelled_during_stalled_delivery() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .set_delay(Duration::from_secs(3600)),
        )
        .mount(&mock_server)
        .await;

    let source = ScriptedSource::new(vec![Ok(homework("reviewing", "t1"))]);
    let notifier = TelegramNotifier::new(
        &mock_server.uri(),
        "bot-token",
        "4242",
        Duration::from_secs(3600),
    )
    .expect("build notifier");
    let store = StateStore::open_in_memory().expect("store");
    let poll = PollLoop::new(
        &test_config(),
        Arc::clone(&source) as Arc<dyn StatusSource>,
        store,
        Arc::new(notifier) as Arc<dyn Notifier>,
    );
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(poll.run(cancel.clone()));

    tokio::time::sleep(Duration::from_millis(300)).await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(15), handle)
        .await
        .expect("loop should stop while the send is stalled")
        .expect("task should not panic");
    assert!(result.is_ok());
    assert_eq!(source.calls().len(), 1);
}
