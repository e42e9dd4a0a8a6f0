//! CTFtime event types.
//!
//! `RawEvent` mirrors one record of the CTFtime events API as loosely as
//! possible so provider schema drift doesn't break decoding. `Event` is the
//! validated form the engine and renderer work with.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One record as returned by the event source, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub starts: Option<String>,
    #[serde(default)]
    pub finish: Option<String>,
    #[serde(default)]
    pub finishes: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub onsite: Option<bool>,
    #[serde(default)]
    pub organizers: Option<Vec<RawOrganizer>>,
    #[serde(default)]
    pub ctftime_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// CTFtime ids are numbers, but some mirrors send them as strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawOrganizer {
    #[serde(default)]
    pub name: Option<String>,
}

/// Whether the event is held in person or online.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventFormat {
    Onsite,
    Online,
}

impl fmt::Display for EventFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventFormat::Onsite => write!(f, "Onsite"),
            EventFormat::Online => write!(f, "Online"),
        }
    }
}

/// A validated event: bounds parsed to UTC and `start <= end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub weight: f64,
    pub format: EventFormat,
    pub organizers: Vec<String>,
    pub ctftime_url: String,
    /// The organizer's own website, when it differs from the CTFtime page.
    pub website: Option<String>,
}

impl TryFrom<RawEvent> for Event {
    type Error = CoreError;

    fn try_from(raw: RawEvent) -> CoreResult<Self> {
        let id = match raw.id {
            Some(RawId::Number(n)) => n.to_string(),
            Some(RawId::Text(s)) if !s.trim().is_empty() => s.trim().to_string(),
            _ => return Err(CoreError::InvalidEvent("record has no id".into())),
        };

        // Older API revisions used `starts`/`finishes`.
        let start_str = raw
            .start
            .or(raw.starts)
            .ok_or_else(|| CoreError::InvalidEvent(format!("event {id} has no start")))?;
        let end_str = raw
            .finish
            .or(raw.finishes)
            .ok_or_else(|| CoreError::InvalidEvent(format!("event {id} has no finish")))?;

        let start = parse_timestamp(&start_str)
            .map_err(|e| CoreError::InvalidEvent(format!("event {id}: {e}")))?;
        let end = parse_timestamp(&end_str)
            .map_err(|e| CoreError::InvalidEvent(format!("event {id}: {e}")))?;

        if end < start {
            return Err(CoreError::InvalidEvent(format!(
                "event {id} ends before it starts"
            )));
        }

        let weight = raw.weight.filter(|w| w.is_finite()).unwrap_or(0.0);

        let organizers = raw
            .organizers
            .unwrap_or_default()
            .into_iter()
            .filter_map(|o| o.name)
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .collect();

        let ctftime_url = raw.ctftime_url.unwrap_or_default();
        let website = raw
            .url
            .filter(|u| !u.is_empty() && *u != ctftime_url);

        Ok(Event {
            id,
            title: raw
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            start,
            end,
            weight,
            format: if raw.onsite.unwrap_or(false) {
                EventFormat::Onsite
            } else {
                EventFormat::Online
            },
            organizers,
            ctftime_url,
            website,
        })
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.title, self.id)
    }
}

/// Parse an ISO-8601 timestamp into UTC. Offset-less values are taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("invalid timestamp '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(json: serde_json::Value) -> RawEvent {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn decodes_ctftime_record() {
        let event = Event::try_from(raw(serde_json::json!({
            "id": 2431,
            "title": "Example CTF 2025",
            "start": "2025-03-20T12:00:00+00:00",
            "finish": "2025-03-22T12:00:00+00:00",
            "weight": 24.5,
            "onsite": false,
            "organizers": [{"id": 1, "name": "pwners"}, {"id": 2, "name": ""}],
            "ctftime_url": "https://ctftime.org/event/2431/",
            "url": "https://example.org"
        })))
        .unwrap();

        assert_eq!(event.id, "2431");
        assert_eq!(event.start, Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap());
        assert_eq!(event.weight, 24.5);
        assert_eq!(event.format, EventFormat::Online);
        assert_eq!(event.organizers, vec!["pwners".to_string()]);
        assert_eq!(event.website.as_deref(), Some("https://example.org"));
    }

    #[test]
    fn accepts_alternate_bound_names() {
        let event = Event::try_from(raw(serde_json::json!({
            "id": "77",
            "starts": "2025-03-20T12:00:00Z",
            "finishes": "2025-03-20T18:00:00Z",
        })))
        .unwrap();

        assert_eq!(event.id, "77");
        assert_eq!(event.title, "Untitled");
        assert_eq!(event.end, Utc.with_ymd_and_hms(2025, 3, 20, 18, 0, 0).unwrap());
    }

    #[test]
    fn primary_field_wins_over_alternate() {
        let event = Event::try_from(raw(serde_json::json!({
            "id": 1,
            "start": "2025-03-20T12:00:00Z",
            "starts": "2030-01-01T00:00:00Z",
            "finish": "2025-03-21T12:00:00Z",
        })))
        .unwrap();
        assert_eq!(event.start, Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap());
    }

    #[test]
    fn null_weight_is_zero() {
        let event = Event::try_from(raw(serde_json::json!({
            "id": 1,
            "weight": null,
            "start": "2025-03-20T12:00:00Z",
            "finish": "2025-03-21T12:00:00Z",
        })))
        .unwrap();
        assert_eq!(event.weight, 0.0);
    }

    #[test]
    fn website_equal_to_ctftime_url_is_dropped() {
        let event = Event::try_from(raw(serde_json::json!({
            "id": 1,
            "start": "2025-03-20T12:00:00Z",
            "finish": "2025-03-21T12:00:00Z",
            "ctftime_url": "https://ctftime.org/event/1/",
            "url": "https://ctftime.org/event/1/",
        })))
        .unwrap();
        assert!(event.website.is_none());
    }

    #[test]
    fn rejects_inverted_bounds() {
        let result = Event::try_from(raw(serde_json::json!({
            "id": 1,
            "start": "2025-03-21T12:00:00Z",
            "finish": "2025-03-20T12:00:00Z",
        })));
        assert!(matches!(result, Err(CoreError::InvalidEvent(_))));
    }

    #[test]
    fn rejects_missing_id_or_bounds() {
        assert!(Event::try_from(raw(serde_json::json!({
            "start": "2025-03-20T12:00:00Z",
            "finish": "2025-03-21T12:00:00Z",
        })))
        .is_err());
        let no_finish = raw(serde_json::json!({"id": 5, "start": "2025-03-20T12:00:00Z"}));
        assert!(Event::try_from(no_finish).is_err());
    }

    #[test]
    fn naive_timestamps_are_utc() {
        let dt = parse_timestamp("2025-03-20T12:00:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap());
        assert!(parse_timestamp("next tuesday").is_err());
    }
}
