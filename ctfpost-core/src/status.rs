//! Event lifecycle derived from wall-clock time.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an event relative to a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Upcoming,
    Running,
    Ended,
}

impl EventStatus {
    /// Resolve the status of `[start, end)` at `now`.
    ///
    /// `now == start` is running and `now == end` is ended, so the three
    /// branches partition the timeline.
    pub fn resolve(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start {
            EventStatus::Upcoming
        } else if now < end {
            EventStatus::Running
        } else {
            EventStatus::Ended
        }
    }

    /// Upcoming and running events are still worth announcing.
    pub fn is_live(self) -> bool {
        matches!(self, EventStatus::Upcoming | EventStatus::Running)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Running => "running",
            EventStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
