//! Usage statistics derived from the search log
pub mod bucket;

use crate::error::{MovieSearchError, Result};
use crate::searchlog::{
    AuditLog, DocumentStore, FsCollection, LogEntry, MemoryDocumentStore, TimeRange,
};
use clap::ValueEnum;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use bucket::BucketWidth;

/// Where aggregation reads its entries from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogSource {
    /// The document store, authoritative for statistics.
    #[default]
    Documents,
    /// The flat audit file, for reconciling against the document store.
    Audit,
}

/// Anything log entries can be read back from.
pub trait LogEntrySource {
    fn read_entries(&self, filter: &TimeRange) -> Result<Vec<LogEntry>>;
}

fn entries_from_documents(store: &dyn DocumentStore, filter: &TimeRange) -> Result<Vec<LogEntry>> {
    let documents = store.find(filter)?;
    let mut entries = Vec::with_capacity(documents.len());
    for document in &documents {
        match LogEntry::from_document(document) {
            Ok(entry) => entries.push(entry),
            Err(e) => warn!("Skipping document that is not a log entry: {e}"),
        }
    }
    Ok(entries)
}

impl LogEntrySource for dyn DocumentStore {
    fn read_entries(&self, filter: &TimeRange) -> Result<Vec<LogEntry>> {
        entries_from_documents(self, filter)
    }
}

impl LogEntrySource for FsCollection {
    fn read_entries(&self, filter: &TimeRange) -> Result<Vec<LogEntry>> {
        entries_from_documents(self, filter)
    }
}

impl LogEntrySource for MemoryDocumentStore {
    fn read_entries(&self, filter: &TimeRange) -> Result<Vec<LogEntry>> {
        entries_from_documents(self, filter)
    }
}

impl LogEntrySource for AuditLog {
    fn read_entries(&self, filter: &TimeRange) -> Result<Vec<LogEntry>> {
        AuditLog::read_entries(self, filter)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsReport {
    pub top_keywords: Vec<(String, usize)>,
    pub top_genres: Vec<(String, usize)>,
    pub interval_histogram: BTreeMap<String, usize>,
    pub bucket: BucketWidth,
    pub total_searches: usize,
    pub failed_searches: usize,
}

impl StatisticsReport {
    pub fn empty(bucket: BucketWidth) -> Self {
        Self {
            top_keywords: Vec::new(),
            top_genres: Vec::new(),
            interval_histogram: BTreeMap::new(),
            bucket,
            total_searches: 0,
            failed_searches: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total_searches == 0
    }

    /// Copy with both rankings cut to `limit` rows.
    pub fn truncated(&self, limit: usize) -> Self {
        let mut report = self.clone();
        report.top_keywords.truncate(limit);
        report.top_genres.truncate(limit);
        report
    }
}

/// Counts occurrences case-insensitively, remembering the first spelling
/// seen and the order keys first appeared in.
#[derive(Default)]
struct Counter {
    counts: IndexMap<String, (String, usize)>,
}

impl Counter {
    fn add(&mut self, value: &str) {
        let slot = self
            .counts
            .entry(value.to_lowercase())
            .or_insert_with(|| (value.to_string(), 0));
        slot.1 += 1;
    }

    /// Descending by count. The sort is stable, so ties keep first-seen order.
    fn ranked(self) -> Vec<(String, usize)> {
        let mut ranked: Vec<(String, usize)> = self.counts.into_values().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Lowercase alphanumeric tokens of a keyword.
pub fn tokenize(keyword: &str) -> impl Iterator<Item = String> + '_ {
    keyword
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    bucket: BucketWidth,
}

impl Aggregator {
    pub fn new(bucket: BucketWidth) -> Self {
        Self { bucket }
    }

    /// Reads every entry in `filter` (everything when `None`) and builds a
    /// fresh report. Nothing is cached between calls.
    pub fn aggregate<S: LogEntrySource + ?Sized>(
        &self,
        source: &S,
        filter: Option<&TimeRange>,
    ) -> Result<StatisticsReport> {
        let range = filter.copied().unwrap_or_default();
        let entries = source.read_entries(&range).map_err(unavailable)?;
        debug!("Aggregating {} log entries", entries.len());
        Ok(self.summarize(&entries))
    }

    pub fn summarize(&self, entries: &[LogEntry]) -> StatisticsReport {
        let mut keywords = Counter::default();
        let mut genres = Counter::default();
        let mut report = StatisticsReport::empty(self.bucket);

        for entry in entries {
            report.total_searches += 1;
            *report
                .interval_histogram
                .entry(self.bucket.label(entry.timestamp))
                .or_insert(0) += 1;

            if entry.is_failed() {
                report.failed_searches += 1;
                continue;
            }
            if let Some(keyword) = entry.query.keyword() {
                for token in tokenize(keyword) {
                    keywords.add(&token);
                }
            }
            for genre in entry.query.genres() {
                let genre = genre.trim();
                if !genre.is_empty() {
                    genres.add(genre);
                }
            }
        }

        report.top_keywords = keywords.ranked();
        report.top_genres = genres.ranked();
        report
    }
}

fn unavailable(error: MovieSearchError) -> MovieSearchError {
    match error {
        MovieSearchError::SourceUnavailable(_) => error,
        other => MovieSearchError::SourceUnavailable(other.to_string()),
    }
}

/// The `limit` most recent entries, newest first.
pub fn recent<S: LogEntrySource + ?Sized>(source: &S, limit: usize) -> Result<Vec<LogEntry>> {
    let mut entries = source.read_entries(&TimeRange::all()).map_err(unavailable)?;
    entries.reverse();
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    entries.truncate(limit);
    Ok(entries)
}
