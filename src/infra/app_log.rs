use crate::app::ports::AppLogPort;
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;

/// Prints marker lines straight to stdout so log filtering never hides them.
#[derive(Debug, Default)]
pub struct StdoutAppLog;

pub fn marker_line(id: &str, emitted_at: DateTime<Utc>) -> String {
    format!("id {} time: {}", id, emitted_at.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl AppLogPort for StdoutAppLog {
    fn write_marker(&self, id: &str, emitted_at: DateTime<Utc>) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", marker_line(id, emitted_at))?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn line_carries_id_and_time() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert_eq!(marker_line("4242", at), "id 4242 time: 2024-03-01T12:00:00.000Z");
    }
}
