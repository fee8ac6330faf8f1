//! Scheduler constants for the periodic all-accounts refresh.

/// Default cadence of the background refresh: twice a day.
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 60 * 60 * 12;

/// Maximum jitter (seconds) added to each refresh interval.
pub const REFRESH_INTERVAL_JITTER_SECS: u64 = 30;

/// Delay before the first scheduled refresh after startup.
pub const INITIAL_REFRESH_DELAY_SECS: u64 = 60;
