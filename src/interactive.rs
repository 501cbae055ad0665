//! Menu-driven terminal session
use crate::app::App;
use crate::error::{MovieSearchError, Result};
use crate::input;
use crate::output;
use crate::query::SearchQuery;
use crate::stats::LogSource;
use colored::*;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use log::{info, warn};
use std::fmt;
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Keyword,
    GenreRange,
    GenreYear,
    Statistics,
    Recent,
    Counters,
    Exit,
}

impl MenuChoice {
    pub const ALL: [MenuChoice; 7] = [
        MenuChoice::Keyword,
        MenuChoice::GenreRange,
        MenuChoice::GenreYear,
        MenuChoice::Statistics,
        MenuChoice::Recent,
        MenuChoice::Counters,
        MenuChoice::Exit,
    ];
}

impl fmt::Display for MenuChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuChoice::Keyword => "Search by keyword",
            MenuChoice::GenreRange => "Search by genre and year range",
            MenuChoice::GenreYear => "Search by genre and year",
            MenuChoice::Statistics => "Popular searches",
            MenuChoice::Recent => "Recent searches",
            MenuChoice::Counters => "Session counters",
            MenuChoice::Exit => "Exit",
        })
    }
}

/// Prompt failures (closed stdin, no terminal) end the session; everything
/// else is reported and the menu comes back.
pub fn run(app: &App) -> Result<()> {
    if let Err(e) = ctrlc::set_handler(|| {
        println!("\n{}", "Goodbye!".green());
        std::process::exit(0);
    }) {
        warn!("Could not install Ctrl-C handler: {e}");
    }
    info!("Starting interactive session");
    let theme = ColorfulTheme::default();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(&MenuChoice::ALL)
            .default(0)
            .interact()
            .map_err(prompt_error)?;

        let choice = MenuChoice::ALL[selection];
        if choice == MenuChoice::Exit {
            println!("{}", "Goodbye!".green());
            return Ok(());
        }
        match handle(app, &theme, choice) {
            Ok(()) => {}
            Err(e @ MovieSearchError::Io(_)) => return Err(e),
            Err(e) => eprintln!("{} {e}", "Error:".red().bold()),
        }
    }
}

fn prompt_error(e: dialoguer::Error) -> MovieSearchError {
    MovieSearchError::Io(io::Error::from(e))
}

fn ask(theme: &ColorfulTheme, prompt: &str) -> Result<String> {
    Input::<String>::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)
}

fn handle(app: &App, theme: &ColorfulTheme, choice: MenuChoice) -> Result<()> {
    match choice {
        MenuChoice::Keyword => {
            let raw = ask(theme, "Keyword")?;
            show_pages(app, theme, input::keyword_query(&raw)?)
        }
        MenuChoice::GenreRange | MenuChoice::GenreYear => {
            let genres = app.genres()?;
            print!(
                "{}",
                output::render_genres(&genres, app.config().display.genre_columns)
            );
            let raw = ask(theme, "Genre numbers (comma-separated, 0 for all)")?;
            let names = input::select_genres(&raw, &genres)?;
            let bounds = app.year_bounds();
            if let Some((min, max)) = bounds {
                println!("Years available: {min}-{max}");
            }
            let query = if choice == MenuChoice::GenreYear {
                let year = ask(theme, "Year")?;
                input::genre_query(&names, Some(year.as_str()), None, None, bounds)?
            } else {
                let from = ask(theme, "From year")?;
                let to = ask(theme, "To year")?;
                input::genre_query(&names, None, Some(from.as_str()), Some(to.as_str()), bounds)?
            };
            show_pages(app, theme, query)
        }
        MenuChoice::Statistics => {
            let report = app
                .statistics(LogSource::Documents, None, None)?
                .truncated(app.config().stats.top_limit);
            print!("{}", output::render_report(&report));
            Ok(())
        }
        MenuChoice::Recent => {
            let entries = app.recent(LogSource::Documents, app.config().stats.recent_limit)?;
            print!("{}", output::render_recent(&entries));
            Ok(())
        }
        MenuChoice::Counters => {
            print!("{}", app.metrics().gather());
            Ok(())
        }
        MenuChoice::Exit => Ok(()),
    }
}

fn show_pages(app: &App, theme: &ColorfulTheme, query: SearchQuery) -> Result<()> {
    let mut pages = app.paginate(query, app.config().display.page_size);
    while let Some(page) = pages.next_page() {
        let page = page?;
        if let Some(warning) = page.write.as_ref().and_then(output::write_warning) {
            eprintln!("{warning}");
        }
        print!(
            "{}",
            output::render_movies(&page.result, app.config().display.show_timing)
        );
        if !pages.has_more() {
            break;
        }
        let more = Confirm::with_theme(theme)
            .with_prompt("Show next page?")
            .default(true)
            .interact()
            .map_err(prompt_error)?;
        if !more {
            break;
        }
    }
    Ok(())
}
