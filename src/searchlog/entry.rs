//! The immutable per-search log record
use crate::error::{MovieSearchError, Result};
use crate::query::SearchQuery;
use crate::search::SearchResult;
use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use super::document::Document;

/// `result_count` written for a search whose executor failed. Always paired
/// with `SearchStatus::Failed`; readers should branch on the status.
pub const FAILED_RESULT_COUNT: i64 = -1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    #[default]
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub query: SearchQuery,
    pub result_count: i64,
    pub elapsed_ms: f64,
    #[serde(default)]
    pub status: SearchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl LogEntry {
    /// Entry for a search that completed, including empty results.
    pub fn build(
        query: &SearchQuery,
        result: &SearchResult,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp: to_millis(started_at),
            query: query.clone(),
            result_count: i64::try_from(result.result_count).unwrap_or(i64::MAX),
            elapsed_ms: elapsed_ms(started_at, finished_at),
            status: SearchStatus::Success,
            error: None,
        }
    }

    /// Sentinel entry for a search whose executor returned an error.
    pub fn build_failed(
        query: &SearchQuery,
        error: &MovieSearchError,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            timestamp: to_millis(started_at),
            query: query.clone(),
            result_count: FAILED_RESULT_COUNT,
            elapsed_ms: elapsed_ms(started_at, finished_at),
            status: SearchStatus::Failed,
            error: Some(error.to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == SearchStatus::Failed
    }

    pub fn to_document(&self) -> Result<Document> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(MovieSearchError::Other(format!(
                "log entry serialized to a non-object: {other}"
            ))),
        }
    }

    pub fn from_document(document: &Document) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::Value::Object(
            document.clone(),
        ))?)
    }

    /// Single-line JSON form used by the audit file.
    pub fn to_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_line(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

fn to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

fn elapsed_ms(started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> f64 {
    let delta = finished_at - started_at;
    let ms = delta
        .num_microseconds()
        .map(|us| us as f64 / 1000.0)
        .unwrap_or_else(|| delta.num_milliseconds() as f64);
    if ms < 0.0 {
        warn!("Clock went backwards by {:.3}ms while timing a search; recording 0ms", -ms);
        return 0.0;
    }
    ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PageSpec;
    use chrono::{Duration, TimeZone};

    fn result(count: usize) -> SearchResult {
        SearchResult {
            movies: vec![],
            result_count: count,
            elapsed_ms: 1.0,
            page: PageSpec::first(10),
        }
    }

    #[test]
    fn test_build_measures_elapsed() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let end = start + Duration::microseconds(12_500);
        let entry = LogEntry::build(&SearchQuery::by_keyword("matrix"), &result(5), start, end);

        assert_eq!(entry.result_count, 5);
        assert_eq!(entry.elapsed_ms, 12.5);
        assert_eq!(entry.status, SearchStatus::Success);
        assert_eq!(entry.timestamp, start);
        assert!(entry.error.is_none());
    }

    #[test]
    fn test_timestamp_truncated_to_millis() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
            + Duration::nanoseconds(123_456_789);
        let entry = LogEntry::build(&SearchQuery::by_keyword("x"), &result(0), start, start);
        assert_eq!(entry.timestamp.timestamp_subsec_nanos(), 123_000_000);
    }

    #[test]
    fn test_negative_elapsed_is_clamped_with_warning() {
        testing_logger::setup();
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let end = start - Duration::milliseconds(3);
        let entry = LogEntry::build(&SearchQuery::by_keyword("x"), &result(1), start, end);

        assert_eq!(entry.elapsed_ms, 0.0);
        testing_logger::validate(|captured| {
            assert_eq!(captured.len(), 1);
            assert_eq!(captured[0].level, log::Level::Warn);
            assert!(captured[0].body.contains("Clock went backwards"));
        });
    }

    #[test]
    fn test_failed_entry_uses_sentinel() {
        let start = Utc::now();
        let error = MovieSearchError::CatalogUnavailable("connection refused".to_string());
        let entry = LogEntry::build_failed(&SearchQuery::by_keyword("x"), &error, start, start);

        assert_eq!(entry.result_count, FAILED_RESULT_COUNT);
        assert!(entry.is_failed());
        assert!(entry.error.unwrap().contains("connection refused"));
    }

    #[test]
    fn test_document_shape() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let entry = LogEntry::build(&SearchQuery::by_keyword("dune"), &result(2), start, start);
        let document = entry.to_document().unwrap();

        assert_eq!(document["query"]["type"], "keyword");
        assert_eq!(document["status"], "success");
        assert_eq!(document["timestamp"], "2024-05-01T12:00:00Z");
        assert!(!document.contains_key("error"));
        assert_eq!(LogEntry::from_document(&document).unwrap(), entry);
    }

    #[test]
    fn test_missing_status_defaults_to_success() {
        let line = r#"{"timestamp":"2024-05-01T12:00:00Z","query":{"type":"keyword","keyword":"dune"},"result_count":3,"elapsed_ms":1.5}"#;
        let entry = LogEntry::from_line(line).unwrap();
        assert_eq!(entry.status, SearchStatus::Success);
        assert!(!entry.to_line().unwrap().contains('\n'));
    }
}
