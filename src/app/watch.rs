use crate::app::ports::LogSearchPort;
use crate::app::recorder::MetricRecorder;
use crate::app::tracker::{PendingTracker, Thresholds};
use crate::clock::Clock;
use crate::error::{MonitorError, Result};
use crate::observability::metrics;
use crate::scheduler::PeriodicTask;
use crate::types::{Channel, Outcome, PendingMarker, Resolution};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Periodically fetches recent log events and resolves pending markers.
pub struct Watcher {
    tracker: PendingTracker,
    search: Arc<dyn LogSearchPort>,
    recorder: MetricRecorder,
    clock: Arc<dyn Clock>,
    thresholds: Thresholds,
    dry_run: bool,
}

impl Watcher {
    pub fn new(
        tracker: PendingTracker,
        search: Arc<dyn LogSearchPort>,
        recorder: MetricRecorder,
        clock: Arc<dyn Clock>,
        thresholds: Thresholds,
        dry_run: bool,
    ) -> Self {
        Self {
            tracker,
            search,
            recorder,
            clock,
            thresholds,
            dry_run,
        }
    }

    pub fn pending(&self, channel: Channel) -> &[PendingMarker] {
        self.tracker.pending(channel)
    }

    /// One watch pass. A failed or malformed search leaves both sets untouched.
    pub async fn watch_once(&mut self) -> Result<Vec<(Channel, Resolution)>> {
        self.tracker.drain_intake();
        if self.dry_run {
            info!(
                "-- Looking through logs, before {} {}",
                self.pending(Channel::App).len(),
                self.pending(Channel::Http).len()
            );
        }

        info!(system = %self.recorder.system(), "Searching logs...");
        let events = match self.search.search(self.recorder.system()).await {
            Ok(events) => events,
            Err(e) => {
                metrics::search::error();
                if let MonitorError::MalformedSearchResponse { body } = &e {
                    error!(%body, "Malformed response from log search, skipping this pass");
                }
                return Err(e);
            }
        };
        metrics::search::events_fetched(events.len());

        let mut resolved = Vec::new();
        for channel in Channel::ALL {
            let now = self.clock.now();
            for resolution in self.tracker.reconcile(channel, &events, now, &self.thresholds) {
                self.report(channel, &resolution).await;
                resolved.push((channel, resolution));
            }
        }

        if self.dry_run {
            info!(
                "-- Looked through logs, after {} {}",
                self.pending(Channel::App).len(),
                self.pending(Channel::Http).len()
            );
        }
        Ok(resolved)
    }

    async fn report(&self, channel: Channel, resolution: &Resolution) {
        let marker = &resolution.marker;
        match resolution.outcome {
            Outcome::TimedOut => {
                warn!(%channel, id = %marker.id, emitted_at = %marker.emitted_at, "Failed to receive")
            }
            Outcome::Slow => {
                warn!(%channel, id = %marker.id, emitted_at = %marker.emitted_at, "Slow to receive (failure)")
            }
            Outcome::Delivered => {}
        }

        if let Err(e) = self
            .recorder
            .record(channel, resolution.outcome.is_success(), resolution.drift_secs)
            .await
        {
            error!(%channel, id = %marker.id, error = %e, "failed to record measurement");
        }
    }
}

#[async_trait]
impl PeriodicTask for Watcher {
    fn name(&self) -> &'static str {
        "log_watcher"
    }

    async fn tick(&mut self) -> Result<()> {
        self.watch_once().await.map(|_| ())
    }
}
