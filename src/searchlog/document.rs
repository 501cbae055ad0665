//! Schema-less document store for log entries
use crate::error::{MovieSearchError, Result};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use super::TimeRange;

pub type Document = Map<String, Value>;

/// Insert-only document collection. `find` filters on the `timestamp`
/// field and returns documents in insertion order.
#[cfg_attr(test, mockall::automock)]
pub trait DocumentStore: Send + Sync {
    /// Stores one new document. Never overwrites or merges.
    fn insert(&self, document: Document) -> Result<()>;

    fn find(&self, filter: &TimeRange) -> Result<Vec<Document>>;
}

fn document_timestamp(document: &Document) -> Option<DateTime<Utc>> {
    document
        .get("timestamp")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

fn in_range(document: &Document, filter: &TimeRange) -> bool {
    if filter.is_unbounded() {
        return true;
    }
    document_timestamp(document).is_some_and(|ts| filter.contains(ts))
}

/// Process-local collection, used for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<Vec<Document>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn insert(&self, document: Document) -> Result<()> {
        self.documents.lock().push(document);
        Ok(())
    }

    fn find(&self, filter: &TimeRange) -> Result<Vec<Document>> {
        Ok(self
            .documents
            .lock()
            .iter()
            .filter(|d| in_range(d, filter))
            .cloned()
            .collect())
    }
}

/// Collection stored as a directory with one JSON file per document.
///
/// File names start with the zero-padded insertion time in milliseconds and
/// a per-process sequence number, so a lexical sort of the directory is the
/// insertion order. Files are created with `create_new`, which makes an
/// accidental overwrite an error instead of an upsert.
#[derive(Debug)]
pub struct FsCollection {
    root: PathBuf,
    sequence: AtomicU64,
}

impl FsCollection {
    /// Handle to `data_dir/collection`. Nothing is touched on disk until the
    /// first insert, so an unreachable directory only affects logging.
    pub fn open(data_dir: &Path, collection: &str) -> Self {
        Self {
            root: data_dir.join(collection),
            sequence: AtomicU64::new(0),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ordering relies on the wall clock. The sequence restarts at 0 in each
    /// process, so if the clock steps backwards between inserts (an NTP
    /// correction, say), later documents sort before earlier ones. Directory
    /// order then stops being insertion order, and so do first-seen tie-breaks
    /// in aggregation.
    fn next_file_name(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!(
            "{:013}-{:08}-{}.json",
            Utc::now().timestamp_millis(),
            seq,
            std::process::id()
        )
    }
}

impl DocumentStore for FsCollection {
    fn insert(&self, document: Document) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.root.join(self.next_file_name());
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        serde_json::to_writer(&mut file, &document)?;
        file.flush()?;
        debug!("Inserted document {}", path.display());
        Ok(())
    }

    fn find(&self, filter: &TimeRange) -> Result<Vec<Document>> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let listing = fs::read_dir(&self.root).map_err(|e| {
            MovieSearchError::SourceUnavailable(format!("{}: {e}", self.root.display()))
        })?;

        let mut paths: Vec<PathBuf> = listing
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let parsed = fs::read_to_string(&path)
                .map_err(MovieSearchError::from)
                .and_then(|content| Ok(serde_json::from_str::<Document>(&content)?));
            match parsed {
                Ok(document) if in_range(&document, filter) => documents.push(document),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable document {}: {e}", path.display()),
            }
        }
        Ok(documents)
    }
}
