//! Time window for a run: absolute bounds plus the backend step and
//! range-vector window, both kept in Prometheus duration grammar.

use crate::{Error, Result};

use chrono::{DateTime, Duration, SecondsFormat, Utc};

/// The time range and resolution of one export.
///
/// `step` is the query_range resolution; `window` is substituted into
/// `increase(...)`/`max_over_time(...)` range selectors in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub step: String,
    pub window: String,
}

impl TimeWindow {
    /// Build a validated window. `start` must not be after `end`, and both
    /// durations must be positive and in the backend's grammar (e.g. `60s`,
    /// `1m`).
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: impl Into<String>,
        window: impl Into<String>,
    ) -> Result<Self> {
        if start > end {
            return Err(Error::Config(format!(
                "time window start {} is after end {}",
                start, end
            )));
        }
        let step = step.into();
        let window = window.into();
        validate_duration("step", &step)?;
        validate_duration("window", &window)?;
        Ok(Self {
            start,
            end,
            step,
            window,
        })
    }

    /// Window from optional bounds: both given uses them as-is, neither given
    /// defaults to the last hour ending now. Giving only one is an error.
    pub fn infer(
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        step: impl Into<String>,
        window: impl Into<String>,
    ) -> Result<Self> {
        let (start, end) = match (start, end) {
            (Some(s), Some(e)) => (s, e),
            (None, None) => {
                let now = Utc::now();
                (now - Duration::hours(1), now)
            }
            _ => {
                return Err(Error::Config(
                    "either give both --start and --end or neither".to_string(),
                ))
            }
        };
        Self::new(start, end, step, window)
    }

    /// ISO-8601 UTC start bound for the query_range request.
    pub fn start_iso(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// ISO-8601 UTC end bound for the query_range request.
    pub fn end_iso(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Parse an ISO-8601 UTC timestamp as given on the command line
/// (e.g. `2025-12-02T18:44:15Z`).
pub fn parse_utc(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Config(format!("invalid timestamp '{raw}': {e}")))
}

fn validate_duration(what: &str, raw: &str) -> Result<()> {
    let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
    let unit = &raw[digits.len()..];
    let count: u64 = digits
        .parse()
        .map_err(|_| Error::Config(format!("invalid {what} duration '{raw}'")))?;
    if count == 0 || !matches!(unit, "s" | "m" | "h" | "d" | "w") {
        return Err(Error::Config(format!(
            "invalid {what} duration '{raw}', expected e.g. 60s or 1m"
        )));
    }
    Ok(())
}
