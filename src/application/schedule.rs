//! Cadence alignment and the minimum-interval entry gate.

use std::time::Duration;

use chrono::{DateTime, Utc};

fn period_millis(interval_secs: u64) -> i64 {
    i64::try_from(interval_secs.saturating_mul(1000))
        .unwrap_or(i64::MAX)
        .max(1)
}

/// Time to sleep until the next wall-clock multiple of `interval_secs`.
///
/// Always in `(0, interval]`: landing exactly on a boundary waits a full
/// interval, so a wake-up never fires twice for the same boundary.
#[must_use]
pub fn cadence_delay(now: DateTime<Utc>, interval_secs: u64) -> Duration {
    let period = period_millis(interval_secs);
    let remaining = (-now.timestamp_millis()).rem_euclid(period);
    let wait = if remaining == 0 { period } else { remaining };
    Duration::from_millis(wait.unsigned_abs())
}

/// The most recent boundary at or before `now`.
#[must_use]
pub fn boundary_floor(now: DateTime<Utc>, interval_secs: u64) -> DateTime<Utc> {
    let period = period_millis(interval_secs);
    let millis = now.timestamp_millis();
    DateTime::from_timestamp_millis(millis - millis.rem_euclid(period)).unwrap_or(now)
}

/// Permits at most one entry per `minimum_interval`-second bucket.
///
/// Entry is permitted when the current bucket is strictly greater than the
/// bucket of the last entry.
#[derive(Debug, Clone)]
pub struct EntryGate {
    minimum_interval: u64,
    last_entry: DateTime<Utc>,
}

impl EntryGate {
    #[must_use]
    pub const fn new(minimum_interval: u64, last_entry: DateTime<Utc>) -> Self {
        Self {
            minimum_interval,
            last_entry,
        }
    }

    fn bucket(&self, at: DateTime<Utc>) -> i64 {
        let width = i64::try_from(self.minimum_interval).unwrap_or(i64::MAX);
        at.timestamp().div_euclid(width)
    }

    #[must_use]
    pub fn permits(&self, now: DateTime<Utc>) -> bool {
        if self.minimum_interval == 0 {
            return true;
        }
        self.bucket(now) > self.bucket(self.last_entry)
    }

    pub fn record(&mut self, now: DateTime<Utc>) {
        self.last_entry = now;
    }

    #[must_use]
    pub const fn last_entry(&self) -> DateTime<Utc> {
        self.last_entry
    }
}
