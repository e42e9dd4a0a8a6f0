use std::time::Duration;

/// Default polling interval in seconds.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Smallest interval accepted from a `set interval` command.
pub const MIN_INTERVAL_SECS: u64 = 30;

/// Default number of days ahead to fetch.
pub const DEFAULT_HORIZON_DAYS: u32 = 14;

/// Smallest horizon accepted from a `set horizon` command.
pub const MIN_HORIZON_DAYS: u32 = 1;

/// The scheduler never sleeps less than this between ticks.
pub const SCHEDULER_MIN_SLEEP: Duration = Duration::from_secs(5);

/// Sleep after a cycle fails before trying again.
pub const SCHEDULER_ERROR_BACKOFF: Duration = Duration::from_secs(10);

/// Upper bound for a single post or edit call.
pub const PUBLISH_TIMEOUT: Duration = Duration::from_secs(20);

/// Default cap on events returned by one CTFtime query.
pub const DEFAULT_FETCH_LIMIT: u32 = 100;

/// Default timeout for outbound HTTP requests, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;

pub const DEFAULT_CTFTIME_API_URL: &str = "https://ctftime.org/api/v1/events/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

pub const USER_AGENT: &str = concat!("ctfpost/", env!("CARGO_PKG_VERSION"));
