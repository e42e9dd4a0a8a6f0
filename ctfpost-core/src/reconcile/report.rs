use std::fmt;

/// Counters for one reconciliation cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Records returned by the event source.
    pub fetched: usize,
    /// Records that could not be normalized into an event.
    pub invalid: usize,
    /// Events below the minimum weight.
    pub filtered: usize,
    /// Events seen for the first time and now tracked.
    pub tracked: usize,
    /// Tracked events whose status changed.
    pub transitions: usize,
    pub posted: usize,
    pub edited: usize,
    /// Handles dropped because the message was gone.
    pub forgotten: usize,
    /// Posts or edits that failed transiently.
    pub failed: usize,
}

impl CycleReport {
    pub fn is_quiet(&self) -> bool {
        self.posted == 0 && self.edited == 0 && self.forgotten == 0 && self.failed == 0
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} fetched, {} filtered, {} invalid; {} posted, {} edited, {} forgotten, {} failed",
            self.fetched,
            self.filtered,
            self.invalid,
            self.posted,
            self.edited,
            self.forgotten,
            self.failed
        )
    }
}
