//! Best-effort fan-out of one log entry to both sinks
use crate::error::{MovieSearchError, Result};
use crate::metrics::Metrics;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use log::{debug, warn};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::{AuditLog, DocumentStore, LogEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    DocumentStore,
    AuditFile,
}

impl SinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SinkKind::DocumentStore => "document store",
            SinkKind::AuditFile => "audit file",
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-sink result of a single write. Failures are reported here and in the
/// diagnostic log, never as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WriteOutcome {
    pub doc_store_ok: bool,
    pub file_ok: bool,
}

impl WriteOutcome {
    pub fn all_ok(&self) -> bool {
        self.doc_store_ok && self.file_ok
    }

    pub fn failed_sinks(&self) -> Vec<SinkKind> {
        let mut failed = Vec::new();
        if !self.doc_store_ok {
            failed.push(SinkKind::DocumentStore);
        }
        if !self.file_ok {
            failed.push(SinkKind::AuditFile);
        }
        failed
    }
}

pub struct DualSinkWriter {
    documents: Arc<dyn DocumentStore>,
    audit: Arc<AuditLog>,
    timeout: Duration,
    metrics: Arc<Metrics>,
}

impl DualSinkWriter {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        audit: Arc<AuditLog>,
        timeout: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            documents,
            audit,
            timeout,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Writes `entry` to the document store and the audit file at the same
    /// time, each on its own thread, and waits at most `timeout` for both.
    /// A sink that errors or misses the deadline is reported as failed; the
    /// other sink is unaffected. Nothing is retried.
    pub fn write(&self, entry: &LogEntry) -> WriteOutcome {
        let deadline = Instant::now() + self.timeout;

        let doc_rx = match entry.to_document() {
            Ok(document) => {
                let documents = Arc::clone(&self.documents);
                spawn_sink(SinkKind::DocumentStore, move || documents.insert(document))
            }
            Err(e) => failed_sink(e),
        };
        let file_rx = match entry.to_line() {
            Ok(line) => {
                let audit = Arc::clone(&self.audit);
                spawn_sink(SinkKind::AuditFile, move || audit.append(&line))
            }
            Err(e) => failed_sink(e),
        };

        let outcome = WriteOutcome {
            doc_store_ok: self.collect(SinkKind::DocumentStore, &doc_rx, deadline),
            file_ok: self.collect(SinkKind::AuditFile, &file_rx, deadline),
        };
        debug!("Logged {} -> {:?}", entry.query, outcome);
        outcome
    }

    fn collect(&self, sink: SinkKind, rx: &Receiver<Result<()>>, deadline: Instant) -> bool {
        let reason = match rx.recv_deadline(deadline) {
            Ok(Ok(())) => return true,
            Ok(Err(e)) => e.to_string(),
            Err(RecvTimeoutError::Timeout) => {
                self.metrics.sink_timeouts.inc();
                format!("no response within {:?}", self.timeout)
            }
            Err(RecvTimeoutError::Disconnected) => "writer thread exited early".to_string(),
        };
        match sink {
            SinkKind::DocumentStore => self.metrics.doc_store_failures.inc(),
            SinkKind::AuditFile => self.metrics.audit_failures.inc(),
        }
        let failure = MovieSearchError::SinkWrite {
            sink: sink.as_str(),
            reason,
        };
        warn!("Search log entry dropped. {failure}");
        false
    }
}

fn spawn_sink<F>(sink: SinkKind, write: F) -> Receiver<Result<()>>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    let (tx, rx) = bounded(1);
    let spawned = thread::Builder::new()
        .name(format!("searchlog-{}", sink.as_str().replace(' ', "-")))
        .spawn(move || {
            // Err only when the writer already returned without this sink.
            let _ = tx.send(write());
        });
    if let Err(e) = spawned {
        warn!("Could not start {sink} writer thread: {e}");
    }
    rx
}

fn failed_sink(error: MovieSearchError) -> Receiver<Result<()>> {
    let (tx, rx) = bounded(1);
    let _ = tx.send(Err(error));
    rx
}
