//! Blocking client for the Prometheus HTTP query_range API.

use crate::window::TimeWindow;
use crate::{Error, Result};

use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

/// Response envelope: `status` plus the data payload.
#[derive(Debug, Deserialize)]
pub struct PromResponse {
    pub status: String,
    #[serde(default)]
    pub data: Option<PromData>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Data payload of a range query.
#[derive(Debug, Deserialize)]
pub struct PromData {
    #[serde(rename = "resultType")]
    pub result_type: String,
    pub result: Vec<PromSeries>,
}

/// One matched series: its label set and `[timestamp, value]` sample pairs.
/// Timestamps are fractional seconds since epoch; values arrive as strings.
#[derive(Debug, Deserialize)]
pub struct PromSeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<(f64, String)>,
}

/// Blocking Prometheus client for one backend URL.
pub struct PromClient {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl PromClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Issue one range query over the window, at the window's step.
    ///
    /// The backend may legitimately match several series; all are returned and
    /// the caller decides what to keep.
    pub fn query_range(&self, query: &str, window: &TimeWindow) -> Result<Vec<PromSeries>> {
        let url = format!("{}/api/v1/query_range", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("query", query),
                ("start", &window.start_iso()),
                ("end", &window.end_iso()),
                ("step", &window.step),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::Backend(format!(
                "query_range returned HTTP {status}: {body}"
            )));
        }

        let envelope: PromResponse = response.json()?;
        if envelope.status != "success" {
            return Err(Error::Backend(format!(
                "query_range status '{}': {}",
                envelope.status,
                envelope.error.unwrap_or_else(|| "no error detail".to_string())
            )));
        }

        let data = envelope
            .data
            .ok_or_else(|| Error::Backend("success response without data".to_string()))?;
        Ok(data.result)
    }
}
