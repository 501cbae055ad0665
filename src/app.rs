//! Main application structure and command handling
use crate::catalog::{CatalogStore, Genre, JsonCatalog};
use crate::cli::{Cli, Commands, OutputFormat, PageArgs};
use crate::config::Config;
use crate::error::Result;
use crate::input;
use crate::interactive;
use crate::metrics::Metrics;
use crate::output;
use crate::progress::SearchSpinner;
use crate::query::{PageSpec, SearchQuery};
use crate::search::{InstrumentedSearcher, LoggedSearch, Page, Pagination, QueryExecutor, SearchResult};
use crate::searchlog::{AuditLog, DocumentStore, DualSinkWriter, FsCollection, LogEntry, TimeRange};
use crate::stats::{self, Aggregator, BucketWidth, LogSource, StatisticsReport};
use dialoguer::Confirm;
use is_terminal::IsTerminal;
use log::{debug, info};
use std::sync::Arc;

/// Handles to both log sinks, opened once and shared by the writer and the
/// aggregator for the life of the process.
#[derive(Clone)]
pub struct LogStores {
    pub documents: Arc<dyn DocumentStore>,
    pub audit: Arc<AuditLog>,
}

impl LogStores {
    pub fn open(config: &Config) -> Self {
        let documents = FsCollection::open(&config.log_store.data_dir, &config.log_store.collection);
        let audit = AuditLog::new(config.audit_path());
        info!(
            "Search log: documents in {}, audit file {}",
            documents.root().display(),
            audit.path().display()
        );
        Self {
            documents: Arc::new(documents),
            audit: Arc::new(audit),
        }
    }

    pub fn new(documents: Arc<dyn DocumentStore>, audit: Arc<AuditLog>) -> Self {
        Self { documents, audit }
    }
}

/// Main application struct that coordinates all components
pub struct App {
    config: Config,
    catalog: Arc<dyn CatalogStore>,
    stores: LogStores,
    searcher: InstrumentedSearcher<QueryExecutor>,
    metrics: Arc<Metrics>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let catalog: Arc<dyn CatalogStore> = Arc::new(JsonCatalog::new(config.catalog.path.clone()));
        let stores = LogStores::open(&config);
        Self::with_parts(config, catalog, stores, Arc::new(Metrics::new()))
    }

    pub fn with_parts(
        config: Config,
        catalog: Arc<dyn CatalogStore>,
        stores: LogStores,
        metrics: Arc<Metrics>,
    ) -> Self {
        let writer = Arc::new(DualSinkWriter::new(
            Arc::clone(&stores.documents),
            Arc::clone(&stores.audit),
            config.sink_timeout(),
            Arc::clone(&metrics),
        ));
        let searcher = InstrumentedSearcher::new(QueryExecutor::new(Arc::clone(&catalog)), writer);
        Self {
            config,
            catalog,
            stores,
            searcher,
            metrics,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn searcher(&self) -> &InstrumentedSearcher<QueryExecutor> {
        &self.searcher
    }

    /// Runs one logged search.
    pub fn search(&self, query: &SearchQuery, page: PageSpec) -> LoggedSearch {
        let spinner = SearchSpinner::start(format!("Searching {query}..."));
        let logged = self.searcher.execute_instrumented(query, page);
        spinner.finish();
        logged
    }

    /// Pages through one search, logging it once.
    pub fn paginate(&self, query: SearchQuery, page_size: usize) -> Pagination<'_, QueryExecutor> {
        Pagination::new(&self.searcher, query, page_size)
    }

    pub fn genres(&self) -> Result<Vec<Genre>> {
        self.catalog.genres()
    }

    pub fn year_range(&self) -> Result<Option<(i32, i32)>> {
        self.catalog.year_range()
    }

    /// Catalog year bounds for input validation. An unreachable catalog
    /// leaves years unbounded so the search itself reports the failure.
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        match self.year_range() {
            Ok(bounds) => bounds,
            Err(e) => {
                debug!("No year bounds available: {e}");
                None
            }
        }
    }

    pub fn statistics(
        &self,
        source: LogSource,
        filter: Option<&TimeRange>,
        bucket: Option<BucketWidth>,
    ) -> Result<StatisticsReport> {
        let aggregator = Aggregator::new(bucket.unwrap_or(self.config.stats.bucket));
        match source {
            LogSource::Documents => aggregator.aggregate(&*self.stores.documents, filter),
            LogSource::Audit => aggregator.aggregate(&*self.stores.audit, filter),
        }
    }

    pub fn recent(&self, source: LogSource, limit: usize) -> Result<Vec<LogEntry>> {
        match source {
            LogSource::Documents => stats::recent(&*self.stores.documents, limit),
            LogSource::Audit => stats::recent(&*self.stores.audit, limit),
        }
    }

    /// Run the application with the given CLI arguments
    pub fn run(&self, cli: &Cli) -> Result<()> {
        match &cli.command {
            Commands::Keyword { keyword, paging } => {
                let query = input::keyword_query(keyword)?;
                self.handle_search(query, paging, cli.format)
            }
            Commands::Genre {
                genres,
                ids,
                year,
                from,
                to,
                paging,
            } => {
                let names = match ids {
                    Some(ids) => input::select_genres(ids, &self.genres()?)?,
                    None => genres.clone(),
                };
                let query = input::genre_query(
                    &names,
                    year.as_deref(),
                    from.as_deref(),
                    to.as_deref(),
                    self.year_bounds(),
                )?;
                self.handle_search(query, paging, cli.format)
            }
            Commands::Stats {
                source,
                bucket,
                since,
                until,
                top,
            } => self.handle_stats(*source, *bucket, since.as_deref(), until.as_deref(), *top, cli.format),
            Commands::Recent { source, limit } => {
                let limit = limit.unwrap_or(self.config.stats.recent_limit);
                let entries = self.recent(*source, limit)?;
                match cli.format {
                    OutputFormat::Json => println!("{}", output::to_json(&entries)?),
                    OutputFormat::Text => print!("{}", output::render_recent(&entries)),
                }
                Ok(())
            }
            Commands::Genres => {
                let genres = self.genres()?;
                match cli.format {
                    OutputFormat::Json => println!("{}", output::to_json(&genres)?),
                    OutputFormat::Text => {
                        print!("{}", output::render_genres(&genres, self.config.display.genre_columns))
                    }
                }
                Ok(())
            }
            Commands::Interactive => interactive::run(self),
            // Generated in main before the app is built.
            Commands::Completions { .. } => Ok(()),
        }
    }

    fn handle_search(&self, query: SearchQuery, paging: &PageArgs, format: OutputFormat) -> Result<()> {
        let page_size = paging.page_size.unwrap_or(self.config.display.page_size);

        if paging.page > 1 {
            let logged = self.search(&query, PageSpec::numbered(paging.page, page_size));
            if let Some(warning) = output::write_warning(&logged.write) {
                eprintln!("{warning}");
            }
            return self.print_result(&logged.result?, format);
        }

        let prompt = !paging.all && format == OutputFormat::Text && std::io::stdout().is_terminal();
        let mut pages = self.paginate(query, page_size);
        let mut collected: Vec<SearchResult> = Vec::new();
        while let Some(page) = pages.next_page() {
            let Page { result, write } = page?;
            if let Some(warning) = write.as_ref().and_then(output::write_warning) {
                eprintln!("{warning}");
            }
            match format {
                OutputFormat::Json => collected.push(result),
                OutputFormat::Text => self.print_result(&result, format)?,
            }
            if !pages.has_more() || !(paging.all || (prompt && confirm_next_page())) {
                break;
            }
        }

        if format == OutputFormat::Json {
            match collected.len() {
                1 => println!("{}", output::to_json(&collected[0])?),
                _ => println!("{}", output::to_json(&collected)?),
            }
        }
        Ok(())
    }

    fn print_result(&self, result: &SearchResult, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => println!("{}", output::to_json(result)?),
            OutputFormat::Text => print!(
                "{}",
                output::render_movies(result, self.config.display.show_timing)
            ),
        }
        Ok(())
    }

    fn handle_stats(
        &self,
        source: LogSource,
        bucket: Option<BucketWidth>,
        since: Option<&str>,
        until: Option<&str>,
        top: Option<usize>,
        format: OutputFormat,
    ) -> Result<()> {
        let from = since.map(input::parse_time_bound).transpose()?;
        let to = until.map(input::parse_time_bound).transpose()?;
        let range = TimeRange::new(from, to);
        let filter = (!range.is_unbounded()).then_some(&range);

        let spinner = SearchSpinner::start("Aggregating search log...");
        let report = self.statistics(source, filter, bucket);
        spinner.finish();
        let report = report?.truncated(top.unwrap_or(self.config.stats.top_limit));

        match format {
            OutputFormat::Json => println!("{}", output::to_json(&report)?),
            OutputFormat::Text => print!("{}", output::render_report(&report)),
        }
        Ok(())
    }
}

fn confirm_next_page() -> bool {
    Confirm::new()
        .with_prompt("Show next page?")
        .default(true)
        .interact()
        .unwrap_or(false)
}
