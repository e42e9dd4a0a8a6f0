//! The durable document: channel registry, settings and per-event sync state.
//!
//! The whole document is the unit of durability. Every field carries a serde
//! default so documents written by older versions (or edited by hand) load
//! with missing sections filled in.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_HORIZON_DAYS, DEFAULT_INTERVAL_SECS};
use crate::event::Event;
use crate::setting::Setting;
use crate::status::EventStatus;

/// Identifier of a destination chat, e.g. `-1001234567890`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        ChannelId(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChannelId {
    fn from(s: &str) -> Self {
        ChannelId::new(s)
    }
}

/// Opaque reference to a posted message, used to target later edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageHandle(pub i64);

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub interval_sec: u64,
    pub horizon_days: u32,
    pub min_weight: f64,
    pub disable_web_preview: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            interval_sec: DEFAULT_INTERVAL_SECS,
            horizon_days: DEFAULT_HORIZON_DAYS,
            min_weight: 0.0,
            disable_web_preview: false,
        }
    }
}

/// What has been communicated to channels about one event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSyncState {
    #[serde(default)]
    pub status: EventStatus,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub messages: BTreeMap<ChannelId, MessageHandle>,
}

impl EventSyncState {
    pub fn new(event: &Event, status: EventStatus) -> Self {
        EventSyncState {
            status,
            starts_at: event.start,
            ends_at: event.end,
            messages: BTreeMap::new(),
        }
    }

    /// Refresh the bounds snapshot and the communicated status.
    pub fn record(&mut self, event: &Event, status: EventStatus) {
        self.status = status;
        self.starts_at = event.start;
        self.ends_at = event.end;
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncState {
    /// Whether the scheduler should perform cycles.
    pub running: bool,
    pub last_run: Option<DateTime<Utc>>,
    /// Keyed by event id. Entries are never removed.
    pub events: BTreeMap<String, EventSyncState>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub channels: Vec<ChannelId>,
    pub admins: Vec<i64>,
    pub settings: Settings,
    pub state: SyncState,
}

impl Document {
    /// Bring a freshly loaded document back to its invariants: no duplicate
    /// channels, no message handles for channels outside the registry.
    pub fn normalize(&mut self) {
        let mut seen = HashSet::new();
        self.channels
            .retain(|c| !c.as_str().is_empty() && seen.insert(c.clone()));

        let registered: HashSet<&ChannelId> = self.channels.iter().collect();
        for sync in self.state.events.values_mut() {
            sync.messages.retain(|channel, _| registered.contains(channel));
        }
    }

    pub fn has_channel(&self, channel: &ChannelId) -> bool {
        self.channels.contains(channel)
    }

    /// Append a channel to the registry. Returns false if it was already there.
    pub fn add_channel(&mut self, channel: ChannelId) -> bool {
        if channel.as_str().is_empty() || self.has_channel(&channel) {
            return false;
        }
        self.channels.push(channel);
        true
    }

    /// Remove a channel and forget every message handle it held.
    pub fn remove_channel(&mut self, channel: &ChannelId) -> bool {
        let Some(pos) = self.channels.iter().position(|c| c == channel) else {
            return false;
        };
        self.channels.remove(pos);

        for sync in self.state.events.values_mut() {
            sync.messages.remove(channel);
        }
        true
    }

    /// The first caller becomes the admin when nobody has claimed it yet.
    pub fn claim_admin(&mut self, user_id: i64) -> bool {
        if !self.admins.is_empty() {
            return false;
        }
        self.admins.push(user_id);
        true
    }

    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admins.contains(&user_id)
    }

    pub fn apply_setting(&mut self, setting: Setting) {
        match setting {
            Setting::Interval(secs) => self.settings.interval_sec = secs,
            Setting::Horizon(days) => self.settings.horizon_days = days,
            Setting::MinWeight(weight) => self.settings.min_weight = weight,
            Setting::DisableWebPreview(disabled) => self.settings.disable_web_preview = disabled,
        }
    }

    pub fn tracked_events(&self) -> usize {
        self.state.events.len()
    }
}
