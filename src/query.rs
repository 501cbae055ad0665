//! Search query variants and page specification
use crate::error::{MovieSearchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated catalog search. The serialized `type` tag is what the log
/// stores use to tell the variants apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SearchQuery {
    #[serde(rename = "keyword")]
    Keyword { keyword: String },

    #[serde(rename = "genre_year")]
    GenreYearRange {
        genres: Vec<String>,
        year_from: i32,
        year_to: i32,
    },

    #[serde(rename = "genre_exact_year")]
    GenreYear { genres: Vec<String>, year: i32 },
}

impl SearchQuery {
    pub fn by_keyword(keyword: impl Into<String>) -> Self {
        Self::Keyword {
            keyword: keyword.into(),
        }
    }

    pub fn by_genre_range<S: Into<String>>(
        genres: impl IntoIterator<Item = S>,
        year_from: i32,
        year_to: i32,
    ) -> Self {
        Self::GenreYearRange {
            genres: genres.into_iter().map(Into::into).collect(),
            year_from,
            year_to,
        }
    }

    pub fn by_genre_year<S: Into<String>>(genres: impl IntoIterator<Item = S>, year: i32) -> Self {
        Self::GenreYear {
            genres: genres.into_iter().map(Into::into).collect(),
            year,
        }
    }

    /// Short variant name, matching the serialized tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Keyword { .. } => "keyword",
            Self::GenreYearRange { .. } => "genre_year",
            Self::GenreYear { .. } => "genre_exact_year",
        }
    }

    pub fn keyword(&self) -> Option<&str> {
        match self {
            Self::Keyword { keyword } => Some(keyword),
            _ => None,
        }
    }

    /// Genres carried by the structured variants; empty for keyword searches.
    pub fn genres(&self) -> &[String] {
        match self {
            Self::Keyword { .. } => &[],
            Self::GenreYearRange { genres, .. } | Self::GenreYear { genres, .. } => genres,
        }
    }

    /// Inclusive year bounds for structured variants.
    pub fn years(&self) -> Option<(i32, i32)> {
        match self {
            Self::Keyword { .. } => None,
            Self::GenreYearRange {
                year_from, year_to, ..
            } => Some((*year_from, *year_to)),
            Self::GenreYear { year, .. } => Some((*year, *year)),
        }
    }

    /// Checks the invariants the input validator is expected to have
    /// enforced already.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Keyword { keyword } => {
                if keyword.trim().is_empty() {
                    return Err(MovieSearchError::InvalidQuery(
                        "keyword must not be empty".to_string(),
                    ));
                }
            }
            Self::GenreYearRange {
                genres,
                year_from,
                year_to,
            } => {
                check_genres(genres)?;
                if year_from > year_to {
                    return Err(MovieSearchError::InvalidQuery(format!(
                        "year range {year_from}-{year_to} is inverted"
                    )));
                }
            }
            Self::GenreYear { genres, .. } => check_genres(genres)?,
        }
        Ok(())
    }
}

fn check_genres(genres: &[String]) -> Result<()> {
    if genres.is_empty() || genres.iter().any(|g| g.trim().is_empty()) {
        return Err(MovieSearchError::InvalidQuery(
            "at least one non-blank genre is required".to_string(),
        ));
    }
    Ok(())
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword { keyword } => write!(f, "keyword '{keyword}'"),
            Self::GenreYearRange {
                genres,
                year_from,
                year_to,
            } => write!(
                f,
                "genres {} | years {year_from}-{year_to}",
                genres.join(", ")
            ),
            Self::GenreYear { genres, year } => {
                write!(f, "genres {} | year {year}", genres.join(", "))
            }
        }
    }
}

/// Window into an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    pub offset: usize,
    pub limit: usize,
}

impl PageSpec {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    pub fn first(limit: usize) -> Self {
        Self::new(0, limit)
    }

    /// One-based page number to page spec. Page 0 is treated as page 1;
    /// pages past `usize::MAX` rows clamp there and come back empty.
    pub fn numbered(number: usize, limit: usize) -> Self {
        Self::new(number.saturating_sub(1).saturating_mul(limit), limit)
    }

    pub fn next(&self) -> Self {
        Self::new(self.offset.saturating_add(self.limit), self.limit)
    }

    pub fn number(&self) -> usize {
        if self.limit == 0 {
            return 1;
        }
        (self.offset / self.limit).saturating_add(1)
    }

    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(MovieSearchError::InvalidQuery(
                "page limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
