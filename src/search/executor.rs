use crate::catalog::{CatalogPage, CatalogStore};
use crate::error::Result;
use crate::query::{PageSpec, SearchQuery};
use log::debug;
use std::sync::Arc;
use std::time::Instant;

use super::{SearchResult, Searcher};

/// Runs queries against the catalog. Knows nothing about logging.
#[derive(Clone)]
pub struct QueryExecutor {
    catalog: Arc<dyn CatalogStore>,
}

impl QueryExecutor {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }
}

impl Searcher for QueryExecutor {
    fn execute(&self, query: &SearchQuery, page: PageSpec) -> Result<SearchResult> {
        query.validate()?;
        page.validate()?;

        let started = Instant::now();
        let CatalogPage { movies, total } = self.catalog.search(query, page)?;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        debug!(
            "{query}: {total} matches, {} on page {} ({elapsed_ms:.2}ms)",
            movies.len(),
            page.number()
        );
        Ok(SearchResult {
            movies,
            result_count: total,
            elapsed_ms,
            page,
        })
    }
}
