//! Append-only flat audit file, one JSON log entry per line
use crate::error::{MovieSearchError, Result};
use log::warn;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use super::{LogEntry, TimeRange};

#[derive(Debug, Clone)]
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends a single line. The file is opened in append mode for every
    /// call, so earlier content is never rewritten. The line and its
    /// newline go out in one write so an abandoned writer cannot leave a
    /// line unterminated for the next append.
    pub fn append(&self, line: &str) -> Result<()> {
        if line.contains('\n') {
            return Err(MovieSearchError::Other(
                "audit lines must not contain newlines".to_string(),
            ));
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(format!("{line}\n").as_bytes())?;
        file.flush()?;
        Ok(())
    }

    pub fn append_entry(&self, entry: &LogEntry) -> Result<()> {
        self.append(&entry.to_line()?)
    }

    /// Raw lines in file order.
    pub fn lines(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = fs::File::open(&self.path)?;
        BufReader::new(file)
            .lines()
            .map(|line| line.map_err(MovieSearchError::from))
            .collect()
    }

    /// Parses entries back out of the file, skipping lines that are not
    /// log entries.
    pub fn read_entries(&self, filter: &TimeRange) -> Result<Vec<LogEntry>> {
        let lines = self.lines().map_err(|e| {
            MovieSearchError::SourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        let mut entries = Vec::with_capacity(lines.len());
        for (number, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match LogEntry::from_line(line) {
                Ok(entry) if filter.contains(entry.timestamp) => entries.push(entry),
                Ok(_) => {}
                Err(e) => warn!(
                    "Skipping malformed audit line {} in {}: {e}",
                    number + 1,
                    self.path.display()
                ),
            }
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_append_creates_parent_and_keeps_order() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("nested/audit.log"));
        log.append("one").unwrap();
        log.append("two").unwrap();

        assert_eq!(log.lines().unwrap(), vec!["one", "two"]);
    }

    #[test]
    fn test_every_appended_line_is_terminated() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));
        log.append("one").unwrap();
        log.append("two").unwrap();

        let raw = fs::read_to_string(log.path()).unwrap();
        assert_eq!(raw, "one\ntwo\n");
    }

    #[test]
    fn test_append_rejects_embedded_newline() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));
        assert!(log.append("a\nb").is_err());
        assert!(log.lines().unwrap().is_empty());
    }

    #[test]
    fn test_unwritable_path_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();
        let log = AuditLog::new(blocker.join("audit.log"));

        assert!(log.append("line").is_err());
    }

    #[test]
    fn test_read_entries_skips_garbage() {
        let dir = tempdir().unwrap();
        let log = AuditLog::new(dir.path().join("audit.log"));
        log.append("2024-01-01 plain text from an older format").unwrap();
        log.append(r#"{"timestamp":"2024-05-01T12:00:00Z","query":{"type":"keyword","keyword":"dune"},"result_count":3,"elapsed_ms":1.5,"status":"success"}"#)
            .unwrap();

        let entries = log.read_entries(&TimeRange::all()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query.keyword(), Some("dune"));
    }
}
