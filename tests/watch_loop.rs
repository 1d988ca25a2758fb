use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use log_monitor::app::ports::{LogSearchPort, MetricSinkPort};
use log_monitor::app::recorder::MetricRecorder;
use log_monitor::app::tracker::{PendingTracker, Thresholds};
use log_monitor::app::watch::Watcher;
use log_monitor::clock::{Clock, ManualClock};
use log_monitor::error::{MonitorError, Result};
use log_monitor::infra::log_search::parse_search_body;
use log_monitor::types::{Channel, LogEvent, MetricSample, Outcome, PendingMarker};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;

/// Serves queued search bodies, then empty results.
#[derive(Default)]
struct ScriptedSearch {
    bodies: Mutex<VecDeque<String>>,
}

impl ScriptedSearch {
    async fn push(&self, body: impl Into<String>) {
        self.bodies.lock().await.push_back(body.into());
    }

    async fn push_events(&self, events: &[LogEvent]) {
        let body = serde_json::json!({ "events": events }).to_string();
        self.push(body).await;
    }
}

#[async_trait]
impl LogSearchPort for ScriptedSearch {
    async fn search(&self, _system_id: &str) -> Result<Vec<LogEvent>> {
        let body = self
            .bodies
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| r#"{"events":[]}"#.to_string());
        Ok(parse_search_body(&body)?.events)
    }
}

#[derive(Default)]
struct CapturingSink {
    samples: Mutex<Vec<MetricSample>>,
}

#[async_trait]
impl MetricSinkPort for CapturingSink {
    async fn write(&self, sample: &MetricSample) -> Result<()> {
        self.samples.lock().await.push(sample.clone());
        Ok(())
    }
}

/// Counts events logged at ERROR level.
struct ErrorCounter(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

struct Harness {
    clock: Arc<ManualClock>,
    search: Arc<ScriptedSearch>,
    sink: Arc<CapturingSink>,
    registry: log_monitor::app::tracker::MarkerRegistry,
    watcher: Watcher,
}

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

fn harness(timeout_on_search_secs: u64, time_to_failure_secs: u64) -> Harness {
    let clock = Arc::new(ManualClock::new(t0()));
    let search = Arc::new(ScriptedSearch::default());
    let sink = Arc::new(CapturingSink::default());
    let (tracker, registry) = PendingTracker::new();
    let watcher = Watcher::new(
        tracker,
        search.clone(),
        MetricRecorder::new("my-app", sink.clone()),
        clock.clone(),
        Thresholds { timeout_on_search_secs, time_to_failure_secs },
        false,
    );
    Harness { clock, search, sink, registry, watcher }
}

#[tokio::test]
async fn marker_found_within_threshold_is_a_success() {
    let mut h = harness(3600, 60);
    h.registry.register(Channel::App, PendingMarker::new("42", t0())).unwrap();
    h.search
        .push_events(&[LogEvent::new("log line containing 42", t0() + Duration::seconds(30))])
        .await;
    h.clock.advance(Duration::seconds(35));

    let resolved = h.watcher.watch_once().await.unwrap();

    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].1.outcome, Outcome::Delivered);
    assert!(h.watcher.pending(Channel::App).is_empty());
    let samples = h.sink.samples.lock().await;
    assert_eq!(samples.as_slice(), &[MetricSample::new("my-app", Channel::App, true, 30.0)]);
}

#[tokio::test]
async fn marker_found_late_is_a_failure() {
    let mut h = harness(3600, 60);
    h.registry.register(Channel::Http, PendingMarker::new("/samples/9", t0())).unwrap();
    h.search
        .push_events(&[LogEvent::new("GET /samples/9 200", t0() + Duration::seconds(90))])
        .await;
    h.clock.advance(Duration::seconds(95));

    h.watcher.watch_once().await.unwrap();

    let samples = h.sink.samples.lock().await;
    assert_eq!(samples.len(), 1);
    assert!(!samples[0].successful);
    assert_eq!(samples[0].channel, Channel::Http);
    assert_eq!(samples[0].drift_secs, 95.0);
}

#[tokio::test]
async fn unseen_marker_fails_exactly_once_after_timeout() {
    let mut h = harness(3600, 60);
    h.registry.register(Channel::App, PendingMarker::new("7", t0())).unwrap();

    // every watch pass sees no events; step in 10 minute increments
    for _ in 0..6 {
        h.clock.advance(Duration::seconds(600));
        h.watcher.watch_once().await.unwrap();
        assert_eq!(h.watcher.pending(Channel::App).len(), 1);
    }
    assert!(h.sink.samples.lock().await.is_empty());

    h.clock.set(t0() + Duration::seconds(3601));
    h.watcher.watch_once().await.unwrap();
    assert!(h.watcher.pending(Channel::App).is_empty());

    for _ in 0..3 {
        h.clock.advance(Duration::seconds(5));
        h.watcher.watch_once().await.unwrap();
    }

    let samples = h.sink.samples.lock().await;
    assert_eq!(samples.len(), 1);
    assert!(!samples[0].successful);
    assert_eq!(samples[0].drift_secs, 3601.0);
}

#[tokio::test]
async fn malformed_response_leaves_pending_sets_untouched() {
    let mut h = harness(3600, 60);
    h.registry.register(Channel::App, PendingMarker::new("1", t0())).unwrap();
    h.registry.register(Channel::Http, PendingMarker::new("/samples/2", t0())).unwrap();
    h.clock.advance(Duration::seconds(5));
    h.watcher.watch_once().await.unwrap();

    let app_before = h.watcher.pending(Channel::App).to_vec();
    let http_before = h.watcher.pending(Channel::Http).to_vec();

    // even a timed-out marker must survive a skipped pass
    h.clock.advance(Duration::seconds(7200));
    h.search.push(r#"{"message":"rate limited"}"#).await;
    let err = h.watcher.watch_once().await.unwrap_err();

    assert!(matches!(err, MonitorError::MalformedSearchResponse { .. }));
    assert_eq!(h.watcher.pending(Channel::App), app_before.as_slice());
    assert_eq!(h.watcher.pending(Channel::Http), http_before.as_slice());
    assert!(h.sink.samples.lock().await.is_empty());
}

#[tokio::test]
async fn malformed_response_is_logged_as_an_error() {
    let errors = Arc::new(AtomicUsize::new(0));
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::registry().with(ErrorCounter(errors.clone())),
    );
    let mut h = harness(3600, 60);

    h.watcher.watch_once().await.unwrap();
    assert_eq!(errors.load(Ordering::SeqCst), 0);

    h.search.push("<html>502 Bad Gateway</html>").await;
    assert!(h.watcher.watch_once().await.is_err());
    assert_eq!(errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn both_channels_are_reconciled_from_one_fetch() {
    let mut h = harness(3600, 60);
    h.registry.register(Channel::App, PendingMarker::new("111", t0())).unwrap();
    h.registry.register(Channel::Http, PendingMarker::new("/samples/222", t0())).unwrap();
    h.registry.register(Channel::Http, PendingMarker::new("/samples/333", t0())).unwrap();
    h.search
        .push_events(&[
            LogEvent::new("id 111 time: now", t0() + Duration::seconds(3)),
            LogEvent::new("at=info method=GET path=\"/samples/222\"", t0() + Duration::seconds(4)),
        ])
        .await;
    h.clock.advance(Duration::seconds(6));

    let resolved = h.watcher.watch_once().await.unwrap();

    let channels: Vec<Channel> = resolved.iter().map(|(c, _)| *c).collect();
    assert_eq!(channels, vec![Channel::App, Channel::Http]);
    assert_eq!(
        h.watcher.pending(Channel::Http),
        &[PendingMarker::new("/samples/333", t0())]
    );
    let samples = h.sink.samples.lock().await;
    assert_eq!(samples[0], MetricSample::new("my-app", Channel::App, true, 3.0));
    assert_eq!(samples[1], MetricSample::new("my-app", Channel::Http, true, 4.0));
}

#[tokio::test]
async fn clock_skew_is_recorded_as_zero_drift() {
    let mut h = harness(3600, 60);
    h.registry.register(Channel::App, PendingMarker::new("55", t0())).unwrap();
    h.search
        .push_events(&[LogEvent::new("55", t0() - Duration::seconds(4))])
        .await;
    h.clock.advance(Duration::seconds(1));

    h.watcher.watch_once().await.unwrap();

    let samples = h.sink.samples.lock().await;
    assert_eq!(samples[0].drift_secs, 0.0);
    assert!(samples[0].successful);
    assert_eq!(h.clock.now(), t0() + Duration::seconds(1));
}
