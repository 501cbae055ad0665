//! Read-only movie catalog access
use crate::error::{MovieSearchError, Result};
use crate::query::{PageSpec, SearchQuery};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub release_year: i32,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub actors: Vec<String>,
}

impl Movie {
    fn matches(&self, query: &SearchQuery) -> bool {
        match query {
            SearchQuery::Keyword { keyword } => self
                .title
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            SearchQuery::GenreYearRange { .. } | SearchQuery::GenreYear { .. } => {
                let in_years = query
                    .years()
                    .is_some_and(|(from, to)| (from..=to).contains(&self.release_year));
                in_years && self.has_any_genre(query.genres())
            }
        }
    }

    fn has_any_genre(&self, wanted: &[String]) -> bool {
        self.genres.iter().any(|g| {
            let g = g.to_lowercase();
            wanted.iter().any(|w| w.trim().to_lowercase() == g)
        })
    }
}

/// A numbered genre, as offered to the operator for selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// One page of matches plus the total across all pages.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogPage {
    pub movies: Vec<Movie>,
    pub total: usize,
}

/// Backing store for movie lookups.
pub trait CatalogStore: Send + Sync {
    fn search(&self, query: &SearchQuery, page: PageSpec) -> Result<CatalogPage>;

    /// Distinct genres in use, numbered alphabetically from 1.
    fn genres(&self) -> Result<Vec<Genre>>;

    /// Earliest and latest release year, `None` for an empty catalog.
    fn year_range(&self) -> Result<Option<(i32, i32)>>;
}

/// Catalog held in memory, ordered by movie id.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalog {
    movies: Vec<Movie>,
}

impl MemoryCatalog {
    pub fn new(mut movies: Vec<Movie>) -> Self {
        movies.sort_by_key(|m| m.id);
        Self { movies }
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }
}

impl CatalogStore for MemoryCatalog {
    fn search(&self, query: &SearchQuery, page: PageSpec) -> Result<CatalogPage> {
        let matching: Vec<&Movie> = self.movies.iter().filter(|m| m.matches(query)).collect();
        let total = matching.len();
        let movies = matching
            .into_iter()
            .skip(page.offset)
            .take(page.limit)
            .cloned()
            .collect();
        Ok(CatalogPage { movies, total })
    }

    fn genres(&self) -> Result<Vec<Genre>> {
        let names: BTreeSet<&str> = self
            .movies
            .iter()
            .flat_map(|m| m.genres.iter().map(String::as_str))
            .collect();
        Ok(names
            .into_iter()
            .zip(1..)
            .map(|(name, id)| Genre {
                id,
                name: name.to_string(),
            })
            .collect())
    }

    fn year_range(&self) -> Result<Option<(i32, i32)>> {
        let min = self.movies.iter().map(|m| m.release_year).min();
        let max = self.movies.iter().map(|m| m.release_year).max();
        Ok(min.zip(max))
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    movies: Vec<Movie>,
}

/// Catalog backed by a JSON file (`{"movies": [...]}`), re-read on every
/// request so an unreachable file surfaces as `CatalogUnavailable` at
/// query time.
#[derive(Debug, Clone)]
pub struct JsonCatalog {
    path: PathBuf,
}

impl JsonCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<MemoryCatalog> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            MovieSearchError::CatalogUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        let file: CatalogFile = serde_json::from_str(&content).map_err(|e| {
            MovieSearchError::CatalogUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        debug!(
            "Loaded {} movies from {}",
            file.movies.len(),
            self.path.display()
        );
        Ok(MemoryCatalog::new(file.movies))
    }
}

impl CatalogStore for JsonCatalog {
    fn search(&self, query: &SearchQuery, page: PageSpec) -> Result<CatalogPage> {
        self.load()?.search(query, page)
    }

    fn genres(&self) -> Result<Vec<Genre>> {
        self.load()?.genres()
    }

    fn year_range(&self) -> Result<Option<(i32, i32)>> {
        self.load()?.year_range()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn movie(id: u32, title: &str, year: i32, genres: &[&str]) -> Movie {
        Movie {
            id,
            title: title.to_string(),
            description: String::new(),
            release_year: year,
            rating: Some("PG".to_string()),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            actors: vec![],
        }
    }

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![
            movie(3, "Scream", 1996, &["Horror"]),
            movie(1, "The Matrix", 1999, &["Action", "Sci-Fi"]),
            movie(2, "Matrix Reloaded", 2003, &["Action"]),
            movie(4, "Amelie", 2001, &["Comedy", "Romance"]),
        ])
    }

    #[test]
    fn test_keyword_is_case_insensitive_substring() {
        let page = catalog()
            .search(&SearchQuery::by_keyword("MATRIX"), PageSpec::first(10))
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.movies[0].id, 1);
        assert_eq!(page.movies[1].id, 2);
    }

    #[test]
    fn test_page_window_and_total() {
        let page = catalog()
            .search(&SearchQuery::by_keyword("matrix"), PageSpec::new(1, 1))
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.movies.len(), 1);
        assert_eq!(page.movies[0].title, "Matrix Reloaded");
    }

    #[test]
    fn test_genre_range_and_exact_year() {
        let catalog = catalog();
        let range = SearchQuery::by_genre_range(["action", "Horror"], 1995, 2000);
        let page = catalog.search(&range, PageSpec::first(10)).unwrap();
        let ids: Vec<u32> = page.movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 3]);

        let exact = SearchQuery::by_genre_year(["Comedy"], 2001);
        assert_eq!(catalog.search(&exact, PageSpec::first(10)).unwrap().total, 1);

        let none = SearchQuery::by_genre_range(["Horror"], 2000, 2010);
        let page = catalog.search(&none, PageSpec::first(10)).unwrap();
        assert_eq!(page.total, 0);
        assert!(page.movies.is_empty());
    }

    #[test]
    fn test_genres_are_numbered_alphabetically() {
        let genres = catalog().genres().unwrap();
        let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Action", "Comedy", "Horror", "Romance", "Sci-Fi"]);
        assert_eq!(genres[0].id, 1);
        assert_eq!(genres[4].id, 5);
    }

    #[test]
    fn test_year_range() {
        assert_eq!(catalog().year_range().unwrap(), Some((1996, 2003)));
        assert_eq!(MemoryCatalog::default().year_range().unwrap(), None);
    }

    #[test]
    fn test_json_catalog_reads_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(
            &path,
            r#"{"movies": [{"id": 7, "title": "Dune", "release_year": 2021, "genres": ["Sci-Fi"]}]}"#,
        )
        .unwrap();

        let catalog = JsonCatalog::new(&path);
        let page = catalog
            .search(&SearchQuery::by_keyword("dune"), PageSpec::first(5))
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.movies[0].rating, None);
    }

    #[test]
    fn test_json_catalog_missing_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let catalog = JsonCatalog::new(dir.path().join("missing.json"));
        let err = catalog
            .search(&SearchQuery::by_keyword("dune"), PageSpec::first(5))
            .unwrap_err();
        assert!(matches!(err, MovieSearchError::CatalogUnavailable(_)));
    }
}
