pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod input;
mod interactive;
pub mod metrics;
pub mod output;
mod progress;
pub mod query;
pub mod search;
pub mod searchlog;
pub mod stats;

pub use app::{App, LogStores};
pub use catalog::{CatalogStore, Genre, JsonCatalog, MemoryCatalog, Movie};
pub use clap::Parser;
pub use cli::{Cli, Commands, OutputFormat};
pub use config::{Config, Overrides};
pub use error::{MovieSearchError, Result};
pub use query::{PageSpec, SearchQuery};
pub use search::{InstrumentedSearcher, LoggedSearch, QueryExecutor, SearchResult, Searcher};
pub use searchlog::{
    AuditLog, DocumentStore, DualSinkWriter, FsCollection, LogEntry, MemoryDocumentStore,
    SearchStatus, TimeRange, WriteOutcome,
};
pub use stats::{Aggregator, BucketWidth, LogEntrySource, LogSource, StatisticsReport};
