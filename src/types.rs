use crate::constants;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The log channel a marker travels through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Lines written to the process's standard output.
    App,
    /// Access-log lines produced by requests against the monitored service.
    Http,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::App, Channel::Http];

    /// Metric label for this channel (`type=` tag in the store).
    pub fn label(&self) -> &'static str {
        match self {
            Channel::App => constants::APP_LOGS_LABEL,
            Channel::Http => constants::HTTP_LOGS_LABEL,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A marker that has been emitted and is waiting to show up in search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMarker {
    pub id: String,
    pub emitted_at: DateTime<Utc>,
}

impl PendingMarker {
    pub fn new(id: impl Into<String>, emitted_at: DateTime<Utc>) -> Self {
        Self { id: id.into(), emitted_at }
    }
}

/// One event returned by the log search API. Only `message` and
/// `received_at` are used; everything else in the payload is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub received_at: Option<String>,
}

impl LogEvent {
    pub fn new(message: impl Into<String>, received_at: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            received_at: Some(received_at.to_rfc3339()),
        }
    }

    /// Receipt timestamp assigned by the log pipeline, if it parses.
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        self.received_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Body of a successful search call.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub events: Vec<LogEvent>,
}

/// How a pending marker was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Found within `time_to_failure` of emission.
    Delivered,
    /// Found, but received later than `time_to_failure`.
    Slow,
    /// Never found within `timeout_on_search`.
    TimedOut,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Delivered)
    }
}

/// A resolved marker together with the drift to report for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub marker: PendingMarker,
    pub outcome: Outcome,
    pub drift_secs: f64,
}

/// One measurement destined for the time-series store.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub system: String,
    pub channel: Channel,
    pub successful: bool,
    pub drift_secs: f64,
}

impl MetricSample {
    /// Builds a sample; negative drift (clock skew) is clamped to zero.
    pub fn new(system: impl Into<String>, channel: Channel, successful: bool, drift_secs: f64) -> Self {
        Self {
            system: system.into(),
            channel,
            successful,
            drift_secs: if drift_secs < 0.0 { 0.0 } else { drift_secs },
        }
    }

    /// Line-protocol body: `logs,type=<label>,successful=<bool>,host=<name> drift=<secs>`
    pub fn line_protocol(&self) -> String {
        format!(
            "{},type={},successful={},host={} drift={}",
            constants::METRIC_MEASUREMENT,
            self.channel.label(),
            self.successful,
            self.system,
            self.drift_secs
        )
    }
}

/// Elapsed seconds from `from` to `to`, millisecond precision.
pub fn seconds_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 1000.0
}
