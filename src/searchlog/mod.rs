//! Search log pipeline: entry construction and the two durable sinks
pub mod audit;
pub mod document;
pub mod entry;
pub mod writer;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use audit::AuditLog;
pub use document::{Document, DocumentStore, FsCollection, MemoryDocumentStore};
pub use entry::{LogEntry, SearchStatus, FAILED_RESULT_COUNT};
pub use writer::{DualSinkWriter, SinkKind, WriteOutcome};

/// Half-open time window, `from` inclusive and `to` exclusive. Missing ends
/// are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        Self { from, to }
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| ts >= from) && self.to.map_or(true, |to| ts < to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_range_is_half_open() {
        let from = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let to = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let range = TimeRange::new(Some(from), Some(to));

        assert!(range.contains(from));
        assert!(!range.contains(to));
        assert!(TimeRange::all().contains(to));
        assert!(TimeRange::all().is_unbounded());
        assert!(!range.is_unbounded());
    }
}
