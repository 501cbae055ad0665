#![allow(dead_code)]

use moviesearch::metrics::Metrics;
use moviesearch::{
    AuditLog, CatalogStore, DocumentStore, DualSinkWriter, FsCollection, InstrumentedSearcher,
    MemoryCatalog, Movie, QueryExecutor,
};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub fn movie(id: u32, title: &str, year: i32, genres: &[&str]) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        description: format!("{title} description"),
        release_year: year,
        rating: Some("PG-13".to_string()),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        actors: vec!["Someone Famous".to_string()],
    }
}

/// Five "matrix" titles, a couple of comedies and dramas, one horror film
/// outside the 1990s.
pub fn sample_movies() -> Vec<Movie> {
    vec![
        movie(1, "The Matrix", 1999, &["Action", "Sci-Fi"]),
        movie(2, "The Matrix Reloaded", 2003, &["Action", "Sci-Fi"]),
        movie(3, "The Matrix Revolutions", 2003, &["Action", "Sci-Fi"]),
        movie(4, "The Animatrix", 2003, &["Animation"]),
        movie(5, "The Matrix Resurrections", 2021, &["Action"]),
        movie(6, "Superbad", 2007, &["Comedy"]),
        movie(7, "Moonlight", 2016, &["Drama"]),
        movie(8, "Get Out", 2017, &["Horror"]),
        movie(9, "Dune", 2021, &["Sci-Fi", "Drama"]),
    ]
}

pub fn write_catalog(dir: &Path, movies: &[Movie]) -> PathBuf {
    let path = dir.join("catalog.json");
    let content = json!({ "movies": movies });
    fs::write(&path, serde_json::to_string_pretty(&content).unwrap()).unwrap();
    path
}

pub struct Harness {
    pub dir: TempDir,
    pub documents: Arc<FsCollection>,
    pub audit: Arc<AuditLog>,
    pub metrics: Arc<Metrics>,
    pub searcher: InstrumentedSearcher<QueryExecutor>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(MemoryCatalog::new(sample_movies())))
    }

    pub fn with_catalog(catalog: Arc<dyn CatalogStore>) -> Self {
        let dir = TempDir::new().unwrap();
        let documents = Arc::new(FsCollection::open(dir.path(), "search_logs"));
        let audit = Arc::new(AuditLog::new(dir.path().join("search_log.jsonl")));
        Self::assemble(dir, documents, audit, catalog)
    }

    pub fn assemble(
        dir: TempDir,
        documents: Arc<FsCollection>,
        audit: Arc<AuditLog>,
        catalog: Arc<dyn CatalogStore>,
    ) -> Self {
        let metrics = Arc::new(Metrics::new());
        let store: Arc<dyn DocumentStore> = documents.clone();
        let writer = Arc::new(DualSinkWriter::new(
            store,
            audit.clone(),
            Duration::from_secs(5),
            metrics.clone(),
        ));
        Self {
            dir,
            documents,
            audit,
            metrics,
            searcher: InstrumentedSearcher::new(QueryExecutor::new(catalog), writer),
        }
    }
}
