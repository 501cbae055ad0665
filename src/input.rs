//! Raw operator input to validated search parameters
use crate::catalog::Genre;
use crate::query::SearchQuery;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty or invalid keyword")]
    EmptyKeyword,

    #[error("'{0}' is not a valid year")]
    NotAYear(String),

    #[error("year {year} is outside the catalog range {min}-{max}")]
    YearOutOfRange { year: i32, min: i32, max: i32 },

    #[error("start year {from} is after end year {to}")]
    InvertedRange { from: i32, to: i32 },

    #[error("either --year or both --from and --to are required")]
    MissingYears,

    #[error("no genre selected")]
    NoGenres,

    #[error("'{0}' is not a comma-separated list of genre numbers")]
    NotANumberList(String),

    #[error("unknown genre number(s): {0}")]
    UnknownGenreIds(String),

    #[error("'{0}' is not a date (YYYY-MM-DD) or RFC 3339 timestamp")]
    NotATimestamp(String),
}

fn keyword_noise() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| Regex::new(r"[^\w\s\-]").expect("static pattern is valid"))
}

/// Strips everything except word characters, whitespace and hyphens.
pub fn sanitize_keyword(raw: &str) -> Result<String, ValidationError> {
    let cleaned = keyword_noise().replace_all(raw, "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ValidationError::EmptyKeyword);
    }
    Ok(cleaned.to_string())
}

/// Parses a year, optionally bounded by the catalog's `(min, max)`.
pub fn parse_year(raw: &str, bounds: Option<(i32, i32)>) -> Result<i32, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::NotAYear(trimmed.to_string()));
    }
    let year: i32 = trimmed
        .parse()
        .map_err(|_| ValidationError::NotAYear(trimmed.to_string()))?;
    if let Some((min, max)) = bounds {
        if year < min || year > max {
            return Err(ValidationError::YearOutOfRange { year, min, max });
        }
    }
    Ok(year)
}

/// Trims genre names and drops blanks.
pub fn clean_genres<S: AsRef<str>>(raw: &[S]) -> Result<Vec<String>, ValidationError> {
    let genres: Vec<String> = raw
        .iter()
        .map(|g| g.as_ref().trim())
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect();
    if genres.is_empty() {
        return Err(ValidationError::NoGenres);
    }
    Ok(genres)
}

/// Resolves a comma-separated list of genre ids; `0` selects every genre.
pub fn select_genres(raw: &str, catalog: &[Genre]) -> Result<Vec<String>, ValidationError> {
    let ids = raw
        .split(',')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ValidationError::NotANumberList(raw.trim().to_string()))?;

    if ids == [0] {
        return clean_genres(&catalog.iter().map(|g| g.name.as_str()).collect::<Vec<_>>());
    }

    let unknown: Vec<String> = ids
        .iter()
        .filter(|id| !catalog.iter().any(|g| g.id == **id))
        .map(u32::to_string)
        .collect();
    if !unknown.is_empty() {
        return Err(ValidationError::UnknownGenreIds(unknown.join(", ")));
    }

    let selected: Vec<&str> = catalog
        .iter()
        .filter(|g| ids.contains(&g.id))
        .map(|g| g.name.as_str())
        .collect();
    clean_genres(&selected)
}

/// Builds a keyword query from raw input.
pub fn keyword_query(raw: &str) -> Result<SearchQuery, ValidationError> {
    Ok(SearchQuery::by_keyword(sanitize_keyword(raw)?))
}

/// Builds a structured query. An exact year wins over a range; a range
/// needs both ends.
pub fn genre_query<S: AsRef<str>>(
    genres: &[S],
    year: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    bounds: Option<(i32, i32)>,
) -> Result<SearchQuery, ValidationError> {
    let genres = clean_genres(genres)?;
    match (year, from, to) {
        (Some(year), _, _) => Ok(SearchQuery::by_genre_year(genres, parse_year(year, bounds)?)),
        (None, Some(from), Some(to)) => {
            let from = parse_year(from, bounds)?;
            let to = parse_year(to, bounds)?;
            if from > to {
                return Err(ValidationError::InvertedRange { from, to });
            }
            Ok(SearchQuery::by_genre_range(genres, from, to))
        }
        _ => Err(ValidationError::MissingYears),
    }
}

/// Accepts `YYYY-MM-DD` (midnight UTC) or a full RFC 3339 timestamp.
pub fn parse_time_bound(raw: &str) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ValidationError::NotATimestamp(trimmed.to_string()))
}
