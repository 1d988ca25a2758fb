//! Pending-marker bookkeeping and reconciliation against fetched log events.
//!
//! Emitters never touch the pending sets directly. They hand markers to a
//! [`MarkerRegistry`], and the single [`PendingTracker`] owner pulls them in
//! before each reconciliation pass.

use crate::error::{MonitorError, Result};
use crate::types::{seconds_between, Channel, LogEvent, Outcome, PendingMarker, Resolution};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::debug;

/// Cutoffs applied while reconciling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    /// Give up on a marker that has not been seen after this many seconds.
    pub timeout_on_search_secs: u64,
    /// A marker received later than this is reported as a failure.
    pub time_to_failure_secs: u64,
}

/// Result of one pass over a pending set.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reconciliation {
    pub retained: Vec<PendingMarker>,
    pub resolved: Vec<Resolution>,
}

/// Match every pending marker (in insertion order) against `events`.
///
/// A marker older than `timeout_on_search` is resolved as timed out without
/// being scanned. Otherwise the first event whose message contains the
/// marker id resolves it; later matches in the same batch are ignored.
/// Markers that are neither expired nor found are retained.
pub fn reconcile(
    pending: Vec<PendingMarker>,
    events: &[LogEvent],
    now: DateTime<Utc>,
    thresholds: &Thresholds,
) -> Reconciliation {
    let mut out = Reconciliation::default();

    for marker in pending {
        let elapsed = seconds_between(marker.emitted_at, now);

        if elapsed > thresholds.timeout_on_search_secs as f64 {
            out.resolved.push(Resolution {
                marker,
                outcome: Outcome::TimedOut,
                drift_secs: elapsed,
            });
            continue;
        }

        let received_at = events
            .iter()
            .filter(|event| event.message.contains(marker.id.as_str()))
            .find_map(LogEvent::received_at);

        match received_at {
            Some(received_at) => {
                let recorded = seconds_between(marker.emitted_at, received_at);
                let resolution = if recorded > thresholds.time_to_failure_secs as f64 {
                    Resolution { marker, outcome: Outcome::Slow, drift_secs: elapsed }
                } else {
                    Resolution { marker, outcome: Outcome::Delivered, drift_secs: recorded }
                };
                out.resolved.push(resolution);
            }
            None => out.retained.push(marker),
        }
    }

    out
}

type Registration = (Channel, PendingMarker);

/// Cloneable handle emitters use to register new markers.
#[derive(Debug, Clone)]
pub struct MarkerRegistry {
    tx: mpsc::UnboundedSender<Registration>,
}

impl MarkerRegistry {
    pub fn register(&self, channel: Channel, marker: PendingMarker) -> Result<()> {
        self.tx
            .send((channel, marker))
            .map_err(|_| MonitorError::IntakeClosed)
    }
}

/// Sole owner of the app and http pending sets.
#[derive(Debug)]
pub struct PendingTracker {
    app: Vec<PendingMarker>,
    http: Vec<PendingMarker>,
    intake: mpsc::UnboundedReceiver<Registration>,
}

impl PendingTracker {
    pub fn new() -> (Self, MarkerRegistry) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tracker = Self {
            app: Vec::new(),
            http: Vec::new(),
            intake: rx,
        };
        (tracker, MarkerRegistry { tx })
    }

    /// Move every marker registered since the last call into its set.
    pub fn drain_intake(&mut self) -> usize {
        let mut drained = 0;
        while let Ok((channel, marker)) = self.intake.try_recv() {
            self.set_mut(channel).push(marker);
            drained += 1;
        }
        if drained > 0 {
            debug!(drained, "pulled newly registered markers");
        }
        drained
    }

    pub fn pending(&self, channel: Channel) -> &[PendingMarker] {
        match channel {
            Channel::App => &self.app,
            Channel::Http => &self.http,
        }
    }

    /// Reconcile one channel and keep only the markers still outstanding.
    pub fn reconcile(
        &mut self,
        channel: Channel,
        events: &[LogEvent],
        now: DateTime<Utc>,
        thresholds: &Thresholds,
    ) -> Vec<Resolution> {
        let pending = std::mem::take(self.set_mut(channel));
        let Reconciliation { retained, resolved } = reconcile(pending, events, now, thresholds);
        *self.set_mut(channel) = retained;
        resolved
    }

    fn set_mut(&mut self, channel: Channel) -> &mut Vec<PendingMarker> {
        match channel {
            Channel::App => &mut self.app,
            Channel::Http => &mut self.http,
        }
    }
}
