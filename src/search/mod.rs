//! Catalog search: plain executor, logging decorator and pagination
pub mod executor;
pub mod instrumented;
pub mod pagination;

use crate::catalog::Movie;
use crate::error::Result;
use crate::query::{PageSpec, SearchQuery};
use serde::Serialize;
use std::sync::Arc;

pub use executor::QueryExecutor;
pub use instrumented::{InstrumentedSearcher, LoggedSearch};
pub use pagination::{Page, Pagination};

/// One page of matching movies with the total across all pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub movies: Vec<Movie>,
    pub result_count: usize,
    pub elapsed_ms: f64,
    pub page: PageSpec,
}

impl SearchResult {
    pub fn is_empty(&self) -> bool {
        self.result_count == 0
    }

    /// Whether rows exist past this page.
    pub fn has_more(&self) -> bool {
        !self.movies.is_empty() && self.page.offset + self.movies.len() < self.result_count
    }

    /// One-based positions of the first and last row shown.
    pub fn shown_range(&self) -> Option<(usize, usize)> {
        if self.movies.is_empty() {
            return None;
        }
        Some((self.page.offset + 1, self.page.offset + self.movies.len()))
    }
}

pub trait Searcher {
    fn execute(&self, query: &SearchQuery, page: PageSpec) -> Result<SearchResult>;
}

impl<S: Searcher + ?Sized> Searcher for &S {
    fn execute(&self, query: &SearchQuery, page: PageSpec) -> Result<SearchResult> {
        (**self).execute(query, page)
    }
}

impl<S: Searcher + ?Sized> Searcher for Arc<S> {
    fn execute(&self, query: &SearchQuery, page: PageSpec) -> Result<SearchResult> {
        (**self).execute(query, page)
    }
}
