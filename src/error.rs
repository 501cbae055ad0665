use std::io;
use thiserror::Error;

use crate::input::ValidationError;

#[derive(Error, Debug)]
pub enum MovieSearchError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    #[error("Failed to write to {sink}: {reason}")]
    SinkWrite { sink: &'static str, reason: String },

    #[error("Search log unavailable: {0}")]
    SourceUnavailable(String),

    #[error("An unexpected error occurred: {0}")]
    Other(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, MovieSearchError>;
