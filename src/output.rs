//! Terminal and JSON rendering of search results and reports
use crate::catalog::Genre;
use crate::error::Result;
use crate::search::SearchResult;
use crate::searchlog::{LogEntry, WriteOutcome};
use crate::stats::StatisticsReport;
use colored::*;
use serde::Serialize;
use std::fmt::Write as _;

const TITLE_WIDTH: usize = 30;
const GENRE_WIDTH: usize = 22;
const ACTORS_WIDTH: usize = 60;
const BAR_WIDTH: usize = 40;

/// Shortens `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("...");
    cut
}

pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn page_header(result: &SearchResult) -> String {
    let limit = result.page.limit.max(1);
    let pages = result.result_count.div_ceil(limit).max(1);
    match result.shown_range() {
        Some((first, last)) => format!(
            "{} {} {} (page {} of {}, showing {}-{})",
            "Found".green(),
            result.result_count,
            if result.result_count == 1 { "movie" } else { "movies" },
            result.page.number(),
            pages,
            first,
            last
        ),
        None if result.is_empty() => "No movies found".yellow().to_string(),
        None => format!(
            "{} {} movies, page {} is past the end",
            "Found".green(),
            result.result_count,
            result.page.number()
        ),
    }
}

pub fn render_movies(result: &SearchResult, show_timing: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", page_header(result));
    if !result.movies.is_empty() {
        let header = format!(
            "{:>4}  {:<TITLE_WIDTH$}  {:>4}  {:<GENRE_WIDTH$}  {:<6}  {}",
            "#", "Title", "Year", "Genre", "Rating", "Actors"
        );
        let _ = writeln!(out, "{}", header.bold());
        for (i, movie) in result.movies.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:>4}  {:<TITLE_WIDTH$}  {:>4}  {:<GENRE_WIDTH$}  {:<6}  {}",
                result.page.offset + i + 1,
                truncate(&movie.title, TITLE_WIDTH),
                movie.release_year,
                truncate(&movie.genres.join(", "), GENRE_WIDTH),
                movie.rating.as_deref().unwrap_or("-"),
                truncate(&movie.actors.join(", "), ACTORS_WIDTH)
            );
        }
    }
    if show_timing {
        let _ = writeln!(out, "{}", format!("Query took {:.2}ms", result.elapsed_ms).dimmed());
    }
    out
}

/// Numbered genres laid out column-major in `columns` columns.
pub fn render_genres(genres: &[Genre], columns: usize) -> String {
    if genres.is_empty() {
        return format!("{}\n", "The catalog has no genres".yellow());
    }
    let columns = columns.max(1);
    let rows = genres.len().div_ceil(columns);
    let width = genres
        .iter()
        .map(|g| g.name.chars().count() + g.id.to_string().len() + 2)
        .max()
        .unwrap_or(0);

    let mut out = String::new();
    for row in 0..rows {
        let mut line = String::new();
        for col in 0..columns {
            if let Some(genre) = genres.get(col * rows + row) {
                let cell = format!("{}. {}", genre.id, genre.name);
                let _ = write!(line, "{cell:<width$}   ");
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

fn render_ranking(out: &mut String, title: &str, ranking: &[(String, usize)]) {
    let _ = writeln!(out, "\n{}", title.green().bold());
    if ranking.is_empty() {
        let _ = writeln!(out, "  (none)");
        return;
    }
    for (i, (name, count)) in ranking.iter().enumerate() {
        let _ = writeln!(out, "  {:>2}. {:<24} {}", i + 1, name, count);
    }
}

pub fn render_report(report: &StatisticsReport) -> String {
    let mut out = String::new();
    if report.is_empty() {
        let _ = writeln!(out, "{}", "No searches logged yet".yellow());
        return out;
    }
    let _ = writeln!(
        out,
        "{} {} searches ({} failed)",
        "Statistics:".green().bold(),
        report.total_searches,
        report.failed_searches
    );
    render_ranking(&mut out, "Top keywords", &report.top_keywords);
    render_ranking(&mut out, "Top genres", &report.top_genres);

    let _ = writeln!(
        out,
        "\n{}",
        format!("Searches per {} bucket", report.bucket).green().bold()
    );
    let peak = report.interval_histogram.values().copied().max().unwrap_or(0).max(1);
    let label_width = report
        .interval_histogram
        .keys()
        .map(|k| k.len())
        .max()
        .unwrap_or(0);
    for (label, count) in &report.interval_histogram {
        let bar_len = (count * BAR_WIDTH).div_ceil(peak);
        let _ = writeln!(
            out,
            "  {label:<label_width$}  {} {count}",
            "#".repeat(bar_len).cyan()
        );
    }
    out
}

pub fn render_recent(entries: &[LogEntry]) -> String {
    if entries.is_empty() {
        return format!("{}\n", "No searches logged yet".yellow());
    }
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Recent searches:".green().bold());
    for entry in entries {
        let outcome = if entry.is_failed() {
            "failed".red().to_string()
        } else {
            format!("{} results", entry.result_count)
        };
        let _ = writeln!(
            out,
            "  {}  {:<48} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            truncate(&entry.query.to_string(), 48),
            outcome
        );
    }
    out
}

/// Warning line for sinks that did not take the entry, if any.
pub fn write_warning(outcome: &WriteOutcome) -> Option<String> {
    if outcome.all_ok() {
        return None;
    }
    let failed: Vec<&str> = outcome.failed_sinks().iter().map(|s| s.as_str()).collect();
    Some(format!(
        "{} search was not recorded in the {}",
        "Warning:".yellow().bold(),
        failed.join(" or ")
    ))
}
