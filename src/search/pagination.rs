use crate::error::Result;
use crate::query::{PageSpec, SearchQuery};
use crate::searchlog::WriteOutcome;

use super::{InstrumentedSearcher, SearchResult, Searcher};

/// One page handed to the presentation layer.
#[derive(Debug)]
pub struct Page {
    pub result: SearchResult,
    /// Set on the first page only; later pages are not logged.
    pub write: Option<WriteOutcome>,
}

/// Walks the pages of a single user search. The first page goes through the
/// logging decorator, the rest through the plain searcher, so one search
/// produces one log entry however many pages are viewed.
pub struct Pagination<'a, S> {
    searcher: &'a InstrumentedSearcher<S>,
    query: SearchQuery,
    next: Option<PageSpec>,
    logged: bool,
}

impl<'a, S: Searcher> Pagination<'a, S> {
    pub fn new(searcher: &'a InstrumentedSearcher<S>, query: SearchQuery, page_size: usize) -> Self {
        Self {
            searcher,
            query,
            next: Some(PageSpec::first(page_size)),
            logged: false,
        }
    }

    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }

    pub fn next_page(&mut self) -> Option<Result<Page>> {
        let spec = self.next.take()?;

        let (result, write) = if self.logged {
            (self.searcher.inner().execute(&self.query, spec), None)
        } else {
            self.logged = true;
            let logged = self.searcher.execute_instrumented(&self.query, spec);
            (logged.result, Some(logged.write))
        };

        Some(result.map(|result| {
            if result.has_more() {
                self.next = Some(spec.next());
            }
            Page { result, write }
        }))
    }
}

impl<S: Searcher> Iterator for Pagination<'_, S> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_page()
    }
}
