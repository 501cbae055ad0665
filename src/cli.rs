use crate::stats::{BucketWidth, LogSource};
use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Search a movie catalog and report on past searches", long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default search path
    #[clap(long, global = true, value_parser)]
    pub config: Option<PathBuf>,

    /// Movie catalog JSON file
    #[clap(long, global = true, value_parser, env = "MOVIESEARCH_CATALOG")]
    pub catalog: Option<PathBuf>,

    /// Directory holding the search log document store
    #[clap(long, global = true, value_parser, env = "MOVIESEARCH_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Append-only audit file for the search log
    #[clap(long, global = true, value_parser, env = "MOVIESEARCH_AUDIT_LOG")]
    pub audit_log: Option<PathBuf>,

    #[clap(long, global = true, value_parser, default_value_t = false)]
    pub verbose: bool,

    /// Write diagnostic logs to this file instead of stderr
    #[clap(long, global = true, value_parser)]
    pub log: Option<PathBuf>,

    /// Print session counters on exit
    #[clap(long, global = true, value_parser, default_value_t = false)]
    pub metrics: bool,

    #[clap(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PageArgs {
    /// Rows per page (defaults to display.page_size)
    #[clap(long, value_parser)]
    pub page_size: Option<usize>,

    /// One-based page to show
    #[clap(long, value_parser, default_value_t = 1)]
    pub page: usize,

    /// Print every page without prompting
    #[clap(long, value_parser, default_value_t = false)]
    pub all: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search movie titles by keyword
    Keyword {
        keyword: String,

        #[clap(flatten)]
        paging: PageArgs,
    },
    /// Search by genre and release year or year range
    Genre {
        /// Genre name, repeatable or comma-separated
        #[clap(short, long = "genre", value_parser, value_delimiter = ',')]
        genres: Vec<String>,

        /// Genre numbers as listed by `genres`; 0 selects all
        #[clap(long, value_parser, conflicts_with = "genres")]
        ids: Option<String>,

        /// Exact release year
        #[clap(long, value_parser, conflicts_with_all = ["from", "to"])]
        year: Option<String>,

        /// First year of the range
        #[clap(long, value_parser, requires = "to")]
        from: Option<String>,

        /// Last year of the range
        #[clap(long, value_parser, requires = "from")]
        to: Option<String>,

        #[clap(flatten)]
        paging: PageArgs,
    },
    /// Popular keywords and genres, and searches over time
    Stats {
        #[clap(long, value_enum, default_value_t = LogSource::Documents)]
        source: LogSource,

        /// Histogram bucket width (defaults to stats.bucket)
        #[clap(long, value_enum)]
        bucket: Option<BucketWidth>,

        /// Only entries at or after this date or timestamp
        #[clap(long, value_parser)]
        since: Option<String>,

        /// Only entries before this date or timestamp
        #[clap(long, value_parser)]
        until: Option<String>,

        /// Rows per ranking (defaults to stats.top_limit)
        #[clap(long, value_parser)]
        top: Option<usize>,
    },
    /// Most recent searches, newest first
    Recent {
        #[clap(long, value_enum, default_value_t = LogSource::Documents)]
        source: LogSource,

        #[clap(long, value_parser)]
        limit: Option<usize>,
    },
    /// List the catalog's genres with their numbers
    Genres,
    /// Menu-driven session
    Interactive,
    /// Generate shell completion scripts
    Completions {
        #[clap(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
