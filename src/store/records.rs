use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted throttle window. Never mutated, only replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    pub started_at: DateTime<Utc>,
    pub duration_secs: u64,
}

impl Cooldown {
    /// `None` for a zero-length window, which would be meaningless
    pub fn new(started_at: DateTime<Utc>, duration_secs: u64) -> Option<Self> {
        (duration_secs > 0).then_some(Self {
            started_at,
            duration_secs,
        })
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let secs = i64::try_from(self.duration_secs).unwrap_or(i64::MAX);
        self.started_at
            .checked_add_signed(chrono::Duration::seconds(secs))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at()
    }

    /// Whole seconds left at `now`, rounded to nearest (half up), never negative
    pub fn remaining_at(&self, now: DateTime<Utc>) -> u64 {
        let left_ms = self
            .expires_at()
            .signed_duration_since(now)
            .num_milliseconds();
        if left_ms <= 0 {
            0
        } else {
            (left_ms as u64 + 500) / 1000
        }
    }
}

/// Lifetime totals across all runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    #[serde(alias = "uses")]
    pub runs: u64,
    pub deleted: u64,
}

impl UsageStats {
    /// Totals after one more run that deleted `delta` items
    pub fn with_run(self, delta: u64) -> Self {
        Self {
            runs: self.runs.saturating_add(1),
            deleted: self.deleted.saturating_add(delta),
        }
    }
}

/// One timestamped line of the user-facing activity log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub time: DateTime<Utc>,
    pub message: String,
}

impl LogEntry {
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            time: Utc::now(),
            message: message.into(),
        }
    }

    /// Short wall-clock stamp for display, e.g. `14:05`
    pub fn stamp(&self) -> String {
        self.time
            .with_timezone(&chrono::Local)
            .format("%H:%M")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64, millis: u32) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, millis * 1_000_000).unwrap()
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        assert!(Cooldown::new(at(0, 0), 0).is_none());
        assert!(Cooldown::new(at(0, 0), 1).is_some());
    }

    #[test]
    fn test_remaining_rounds_and_clamps() {
        let cooldown = Cooldown::new(at(1_000, 0), 30).unwrap();

        assert_eq!(cooldown.remaining_at(at(1_000, 0)), 30);
        assert_eq!(cooldown.remaining_at(at(1_010, 400)), 20);
        assert_eq!(cooldown.remaining_at(at(1_010, 500)), 20);
        assert_eq!(cooldown.remaining_at(at(1_010, 600)), 19);
        assert_eq!(cooldown.remaining_at(at(1_029, 600)), 0);
        assert_eq!(cooldown.remaining_at(at(1_030, 0)), 0);
        assert_eq!(cooldown.remaining_at(at(5_000, 0)), 0);
    }

    #[test]
    fn test_remaining_is_non_increasing() {
        let cooldown = Cooldown::new(at(0, 0), 45).unwrap();
        let mut previous = u64::MAX;
        for step in 0..200 {
            let now = at(step / 4, ((step % 4) * 250) as u32);
            let remaining = cooldown.remaining_at(now);
            assert!(remaining <= previous);
            previous = remaining;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_activity_window() {
        let cooldown = Cooldown::new(at(100, 0), 10).unwrap();
        assert!(cooldown.is_active_at(at(109, 999)));
        assert!(!cooldown.is_active_at(at(110, 0)));
    }

    #[test]
    fn test_usage_accepts_legacy_field_name() {
        let usage: UsageStats = serde_json::from_str(r#"{"uses": 4, "deleted": 120}"#).unwrap();
        assert_eq!(usage, UsageStats { runs: 4, deleted: 120 });
        assert_eq!(usage.with_run(3), UsageStats { runs: 5, deleted: 123 });
    }
}
