//! Validation of user-supplied settings values.

use std::fmt;
use std::str::FromStr;

use crate::constants::{MIN_HORIZON_DAYS, MIN_INTERVAL_SECS};
use crate::error::{CoreError, CoreResult};

/// The settings keys that can be changed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    Interval,
    Horizon,
    MinWeight,
    Preview,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::Interval,
        SettingKey::Horizon,
        SettingKey::MinWeight,
        SettingKey::Preview,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SettingKey::Interval => "interval",
            SettingKey::Horizon => "horizon",
            SettingKey::MinWeight => "min-weight",
            SettingKey::Preview => "preview",
        }
    }

    fn usage(self) -> &'static str {
        match self {
            SettingKey::Interval => "interval <seconds>",
            SettingKey::Horizon => "horizon <days>",
            SettingKey::MinWeight => "min-weight <weight> (e.g. 0, 10, 69.5)",
            SettingKey::Preview => "preview <on|off>",
        }
    }
}

impl FromStr for SettingKey {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let key = s.trim().to_ascii_lowercase().replace('_', "-");
        SettingKey::ALL
            .into_iter()
            .find(|k| k.name() == key)
            .ok_or_else(|| {
                let known: Vec<_> = SettingKey::ALL.iter().map(|k| k.name()).collect();
                CoreError::InvalidSetting(format!(
                    "unknown setting '{s}'. Available: {}",
                    known.join(", ")
                ))
            })
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated settings change, ready to apply to the document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setting {
    Interval(u64),
    Horizon(u32),
    MinWeight(f64),
    DisableWebPreview(bool),
}

impl Setting {
    /// Validate `raw` for `key`. Integer settings below their floor are
    /// raised to it; anything unparseable is rejected.
    pub fn parse(key: SettingKey, raw: &str) -> CoreResult<Self> {
        let raw = raw.trim();
        let invalid = || CoreError::InvalidSetting(format!("usage: set {}", key.usage()));

        match key {
            SettingKey::Interval => {
                let secs: u64 = raw.parse().map_err(|_| invalid())?;
                Ok(Setting::Interval(secs.max(MIN_INTERVAL_SECS)))
            }
            SettingKey::Horizon => {
                let days: u32 = raw.parse().map_err(|_| invalid())?;
                Ok(Setting::Horizon(days.max(MIN_HORIZON_DAYS)))
            }
            SettingKey::MinWeight => {
                let weight: f64 = raw.parse().map_err(|_| invalid())?;
                if !weight.is_finite() || weight < 0.0 {
                    return Err(invalid());
                }
                Ok(Setting::MinWeight(weight))
            }
            SettingKey::Preview => match raw.to_ascii_lowercase().as_str() {
                "on" | "true" | "yes" => Ok(Setting::DisableWebPreview(false)),
                "off" | "false" | "no" => Ok(Setting::DisableWebPreview(true)),
                _ => Err(invalid()),
            },
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Setting::Interval(secs) => write!(f, "Interval set to {secs} seconds"),
            Setting::Horizon(days) => write!(f, "Horizon set to {days} days"),
            Setting::MinWeight(w) => write!(f, "Minimum weight set to {w}"),
            Setting::DisableWebPreview(true) => write!(f, "Web previews disabled"),
            Setting::DisableWebPreview(false) => write!(f, "Web previews enabled"),
        }
    }
}
