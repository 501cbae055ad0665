mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    catalog: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let catalog = common::write_catalog(dir.path(), &common::sample_movies());
        Self { dir, catalog }
    }

    fn data_dir(&self) -> PathBuf {
        self.dir.path().join("data")
    }

    fn audit_log(&self) -> PathBuf {
        self.dir.path().join("logs/search_log.jsonl")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("moviesearch").unwrap();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("share"))
            .env_remove("MOVIESEARCH_CATALOG")
            .env_remove("MOVIESEARCH_DATA_DIR")
            .env_remove("MOVIESEARCH_AUDIT_LOG")
            .env_remove("RUST_LOG")
            .arg("--catalog")
            .arg(&self.catalog)
            .arg("--data-dir")
            .arg(self.data_dir())
            .arg("--audit-log")
            .arg(self.audit_log());
        cmd
    }

    fn audit_lines(&self) -> Vec<String> {
        read_lines(&self.audit_log())
    }

    fn document_count(&self) -> usize {
        match fs::read_dir(self.data_dir().join("search_logs")) {
            Ok(listing) => listing.count(),
            Err(_) => 0,
        }
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|content| content.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

#[test]
fn test_keyword_search_prints_first_page_and_logs() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();

    ws.cmd()
        .args(["keyword", "matrix", "--page-size", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Found"))
        .stdout(predicate::str::contains("page 1 of 3"))
        .stdout(predicate::str::contains("The Matrix Reloaded"))
        .stdout(predicate::str::contains("The Animatrix").not());

    let lines = ws.audit_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(r#""keyword":"matrix""#));
    assert!(lines[0].contains(r#""result_count":5"#));
    assert_eq!(ws.document_count(), 1);
    Ok(())
}

#[test]
fn test_json_output() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();

    ws.cmd()
        .args(["--format", "json", "keyword", "matrix", "--page-size", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""result_count": 5"#));
    Ok(())
}

#[test]
fn test_all_pages_logged_once() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();

    ws.cmd()
        .args(["keyword", "matrix", "--page-size", "2", "--all"])
        .assert()
        .success()
        .stdout(predicate::str::contains("page 3 of 3, showing 5-5"));

    assert_eq!(ws.audit_lines().len(), 1);
    Ok(())
}

#[test]
fn test_page_far_past_the_end() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();

    ws.cmd()
        .args(["keyword", "matrix", "--page", "18446744073709551615", "--page-size", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("past the end"));

    assert_eq!(ws.audit_lines().len(), 1);
    Ok(())
}

#[test]
fn test_genre_range_without_matches() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();

    ws.cmd()
        .args(["genre", "--genre", "Horror", "--from", "2003", "--to", "2010"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No movies found"));

    let lines = ws.audit_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(r#""type":"genre_year""#));
    assert!(lines[0].contains(r#""result_count":0"#));
    Ok(())
}

#[test]
fn test_invalid_input_is_rejected_without_logging() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();

    ws.cmd()
        .args(["genre", "--genre", "Drama", "--from", "2020", "--to", "2005"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("after end year"));

    ws.cmd()
        .args(["keyword", "?!*"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("keyword"));

    assert!(ws.audit_lines().is_empty());
    assert_eq!(ws.document_count(), 0);
    Ok(())
}

#[test]
fn test_missing_catalog_fails_and_logs_sentinel() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();
    fs::remove_file(&ws.catalog)?;

    ws.cmd()
        .args(["keyword", "matrix"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Catalog unavailable"));

    let lines = ws.audit_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains(r#""result_count":-1"#));
    assert!(lines[0].contains(r#""status":"failed""#));
    Ok(())
}

#[test]
fn test_unwritable_audit_file_warns() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();
    fs::write(ws.dir.path().join("logs"), "not a directory")?;

    ws.cmd()
        .args(["keyword", "dune"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Dune"))
        .stderr(predicate::str::contains("not recorded in the audit file"));

    assert_eq!(ws.document_count(), 1);
    Ok(())
}

#[test]
fn test_stats_after_searches() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();
    for _ in 0..3 {
        ws.cmd().args(["genre", "--genre", "Comedy", "--year", "2007"]).assert().success();
    }
    ws.cmd().args(["genre", "--genre", "Drama", "--year", "2016"]).assert().success();
    ws.cmd().args(["keyword", "dune"]).assert().success();

    ws.cmd()
        .args(["stats", "--bucket", "daily"])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 searches (0 failed)"))
        .stdout(predicate::str::contains("Comedy"))
        .stdout(predicate::str::contains("dune"));

    ws.cmd()
        .args(["--format", "json", "stats", "--source", "audit", "--top", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""Comedy""#))
        .stdout(predicate::str::contains(r#""Drama""#).not());
    Ok(())
}

#[test]
fn test_stats_with_no_history() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();
    ws.cmd()
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("No searches logged yet"));
    Ok(())
}

#[test]
fn test_recent_and_genres() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();
    ws.cmd().args(["keyword", "heat"]).assert().success();
    ws.cmd().args(["keyword", "dune"]).assert().success();

    ws.cmd()
        .args(["recent", "--limit", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("keyword 'dune'"))
        .stdout(predicate::str::contains("keyword 'heat'").not());

    ws.cmd()
        .arg("genres")
        .assert()
        .success()
        .stdout(predicate::str::contains("1. Action"))
        .stdout(predicate::str::contains("Sci-Fi"));
    Ok(())
}

#[test]
fn test_metrics_flag() -> Result<(), Box<dyn std::error::Error>> {
    let ws = Workspace::new();
    ws.cmd()
        .args(["--metrics", "keyword", "matrix"])
        .assert()
        .success()
        .stderr(predicate::str::contains("searches_total 1"));
    Ok(())
}

#[test]
fn test_completions() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("moviesearch")?
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("moviesearch"));
    Ok(())
}
