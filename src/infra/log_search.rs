use crate::app::ports::LogSearchPort;
use crate::constants::{SEARCH_PATH, SEARCH_TOKEN_HEADER};
use crate::error::{MonitorError, Result};
use crate::observability::metrics;
use crate::types::{LogEvent, SearchResponse};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

/// Client for the hosted log search API (`/api/v1/events/search.json`).
pub struct PapertrailSearch {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl PapertrailSearch {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_PATH)
    }
}

#[async_trait]
impl LogSearchPort for PapertrailSearch {
    #[instrument(skip(self))]
    async fn search(&self, system_id: &str) -> Result<Vec<LogEvent>> {
        let resp = self
            .client
            .get(self.search_url())
            .query(&[("system_id", system_id)])
            .header(SEARCH_TOKEN_HEADER, &self.token)
            .send()
            .await?;
        let status = resp.status();
        let body = resp.text().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "search response received");

        let events = parse_search_body(&body)?.events;
        Ok(events)
    }
}

/// Parse a search body. Anything that is not JSON with an `events` array is
/// reported as malformed, carrying the raw text.
pub fn parse_search_body(body: &str) -> Result<SearchResponse> {
    let malformed = || {
        metrics::search::malformed();
        MonitorError::MalformedSearchResponse { body: truncate(body, 512) }
    };

    let value: Value = serde_json::from_str(body).map_err(|_| malformed())?;
    if !value.get("events").map(Value::is_array).unwrap_or(false) {
        return Err(malformed());
    }
    serde_json::from_value(value).map_err(|_| malformed())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}
