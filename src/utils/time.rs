// src/utils/time.rs

use chrono::{DateTime, Utc};

/// Service for handling time-related operations.
#[derive(Debug, Clone)]
pub struct TimeService;

impl TimeService {
    pub fn new() -> Self {
        TimeService
    }

    pub fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    pub fn current_timestamp_ms(&self) -> u64 {
        Utc::now().timestamp_millis() as u64
    }

    /// Current calendar day as YYYY-MM-DD, the snapshot-date granularity.
    pub fn current_date(&self) -> String {
        Utc::now().date_naive().format("%Y-%m-%d").to_string()
    }
}

impl Default for TimeService {
    fn default() -> Self {
        Self::new()
    }
}

/// Current timestamp in milliseconds since Unix epoch (standalone helper).
pub fn current_timestamp_ms() -> u64 {
    Utc::now().timestamp_millis() as u64
}

pub const MINUTE_MS: u64 = 60_000;
pub const DAY_MS: u64 = 86_400_000;
