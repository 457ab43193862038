//! Read-side aggregation queries behind the dashboards: case statistics,
//! heatmap clustering, disease trends, and district medicine demand.
//!
//! All functions are pure reads over a borrowed connection; the handlers
//! re-run them on a polling interval independent of the broadcast channel.

pub mod demand;
pub mod heatmap;
pub mod summary;
pub mod trends;

pub use demand::*;
pub use heatmap::*;
pub use summary::*;
pub use trends::*;

use chrono::{DateTime, Duration, Utc};

/// Lookback window for case statistics and the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeRange {
    Last24Hours,
    #[default]
    Last7Days,
    Last30Days,
}

impl TimeRange {
    /// Parse a query-string token (`24h`, `7d`, `30d`). Unknown tokens fall
    /// back to the 7-day default, matching the lenient source behavior.
    pub fn from_token(token: &str) -> Self {
        match token {
            "24h" => TimeRange::Last24Hours,
            "30d" => TimeRange::Last30Days,
            _ => TimeRange::Last7Days,
        }
    }

    pub fn as_token(&self) -> &'static str {
        match self {
            TimeRange::Last24Hours => "24h",
            TimeRange::Last7Days => "7d",
            TimeRange::Last30Days => "30d",
        }
    }

    /// Inclusive lower bound of the window, evaluated against `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeRange::Last24Hours => now - Duration::hours(24),
            TimeRange::Last7Days => now - Duration::days(7),
            TimeRange::Last30Days => now - Duration::days(30),
        }
    }
}
