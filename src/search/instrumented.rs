use crate::error::Result;
use crate::query::{PageSpec, SearchQuery};
use crate::searchlog::{DualSinkWriter, LogEntry, WriteOutcome};
use chrono::Utc;
use log::{info, warn};
use std::sync::Arc;

use super::{SearchResult, Searcher};

/// Outcome of one logged search: the search result exactly as the inner
/// searcher produced it, plus how the log write went.
#[derive(Debug)]
pub struct LoggedSearch {
    pub result: Result<SearchResult>,
    pub write: WriteOutcome,
}

impl LoggedSearch {
    pub fn into_result(self) -> Result<SearchResult> {
        self.result
    }
}

/// Wraps any searcher so every execution is timed and recorded in both log
/// sinks. Logging never changes what the caller gets back.
pub struct InstrumentedSearcher<S> {
    inner: S,
    writer: Arc<DualSinkWriter>,
}

impl<S: Searcher> InstrumentedSearcher<S> {
    pub fn new(inner: S, writer: Arc<DualSinkWriter>) -> Self {
        Self { inner, writer }
    }

    /// The undecorated searcher, for follow-up pages that must not be logged
    /// again.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn execute_instrumented(&self, query: &SearchQuery, page: PageSpec) -> LoggedSearch {
        let metrics = self.writer.metrics();
        let started_at = Utc::now();
        let result = self.inner.execute(query, page);
        let finished_at = Utc::now();
        metrics.searches_total.inc();

        let entry = match &result {
            Ok(found) => LogEntry::build(query, found, started_at, finished_at),
            Err(e) => {
                metrics.searches_failed.inc();
                warn!("Search for {query} failed: {e}");
                LogEntry::build_failed(query, e, started_at, finished_at)
            }
        };

        let outcome = self.writer.write(&entry);
        if outcome.all_ok() {
            info!(
                "Logged {query}: {} results in {:.2}ms",
                entry.result_count, entry.elapsed_ms
            );
        }
        LoggedSearch {
            result,
            write: outcome,
        }
    }
}

impl<S: Searcher> Searcher for InstrumentedSearcher<S> {
    fn execute(&self, query: &SearchQuery, page: PageSpec) -> Result<SearchResult> {
        self.execute_instrumented(query, page).into_result()
    }
}
