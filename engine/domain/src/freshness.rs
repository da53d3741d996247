use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Matches the scheduled refresh cadence.
pub const DEFAULT_FRESHNESS_WINDOW_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Initializing,
    Fresh,
    Stale,
}

impl Freshness {
    /// Classifies a snapshot by the age of its last successful update.
    ///
    /// A timestamp in the future (clock skew between writers) counts as fresh.
    pub fn classify(
        last_updated: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
        window: Duration,
    ) -> Self {
        match last_updated {
            None => Freshness::Initializing,
            Some(updated_at) if now.signed_duration_since(updated_at) <= window => Freshness::Fresh,
            Some(_) => Freshness::Stale,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Freshness::Initializing => "initializing",
            Freshness::Fresh => "fresh",
            Freshness::Stale => "stale",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, minute, second).unwrap()
    }

    #[test]
    fn test_initializing_before_first_update() {
        let state = Freshness::classify(None, at(0, 0), Duration::minutes(5));
        assert_eq!(state, Freshness::Initializing);
    }

    #[test]
    fn test_fresh_within_window_inclusive() {
        let window = Duration::minutes(5);
        assert_eq!(Freshness::classify(Some(at(0, 0)), at(4, 59), window), Freshness::Fresh);
        assert_eq!(Freshness::classify(Some(at(0, 0)), at(5, 0), window), Freshness::Fresh);
    }

    #[test]
    fn test_stale_beyond_window() {
        let state = Freshness::classify(Some(at(0, 0)), at(5, 1), Duration::minutes(5));
        assert_eq!(state, Freshness::Stale);
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let state = Freshness::classify(Some(at(10, 0)), at(0, 0), Duration::minutes(5));
        assert_eq!(state, Freshness::Fresh);
    }
}
