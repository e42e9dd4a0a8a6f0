//! Event source port and the CTFtime adapter.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::constants::USER_AGENT;
use crate::error::{CoreError, CoreResult};
use crate::event::RawEvent;

/// Time window `[start, finish)` to query, with a result cap.
#[derive(Debug, Clone)]
pub struct FetchWindow {
    pub start: DateTime<Utc>,
    pub finish: DateTime<Utc>,
    pub limit: u32,
}

impl FetchWindow {
    pub fn ahead(now: DateTime<Utc>, horizon_days: u32, limit: u32) -> Self {
        FetchWindow {
            start: now,
            finish: now + chrono::Duration::days(i64::from(horizon_days)),
            limit,
        }
    }
}

#[async_trait]
pub trait EventSource: Send + Sync {
    async fn fetch(&self, window: &FetchWindow) -> CoreResult<Vec<RawEvent>>;
}

/// Queries the public CTFtime events API.
pub struct CtftimeSource {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl CtftimeSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> CoreResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Source(e.to_string()))?;

        Ok(CtftimeSource {
            client,
            url: url.into(),
            timeout,
        })
    }

    pub fn from_config(config: &AppConfig) -> CoreResult<Self> {
        Self::new(
            config.ctftime_api_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }
}

#[async_trait]
impl EventSource for CtftimeSource {
    async fn fetch(&self, window: &FetchWindow) -> CoreResult<Vec<RawEvent>> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("limit", window.limit.to_string()),
                ("start", window.start.timestamp().to_string()),
                ("finish", window.finish.timestamp().to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CoreError::SourceTimeout(self.timeout.as_secs())
                } else {
                    CoreError::Source(e.to_string())
                }
            })?
            .error_for_status()
            .map_err(|e| CoreError::Source(e.to_string()))?;

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| CoreError::Source(format!("Failed to parse response: {e}")))?;

        let records = decode_records(body)?;
        debug!(count = records.len(), "Fetched CTFtime events");
        Ok(records)
    }
}

/// Decode a response body record by record; a malformed record is skipped
/// rather than failing the whole batch.
pub fn decode_records(body: serde_json::Value) -> CoreResult<Vec<RawEvent>> {
    let serde_json::Value::Array(items) = body else {
        return Err(CoreError::Source("expected a JSON array of events".into()));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<RawEvent>(item) {
            Ok(raw) => Some(raw),
            Err(e) => {
                warn!(error = %e, "Skipping undecodable event record");
                None
            }
        })
        .collect())
}
