use clap::{CommandFactory, Parser};
use colored::*;
use env_logger::{Builder, Env, Target};
use log::info;
use moviesearch::{App, Cli, Commands, Config, MovieSearchError, Overrides, Result};
use std::fs;
use std::process;
use std::time::Instant;

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("{} {e}", "Error:".red().bold());
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "moviesearch", &mut std::io::stdout());
        return Ok(());
    }
    setup_logging(&cli)?;

    let start_time = Instant::now();
    info!("Application started with command: {:?}", cli.command);

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply(Overrides {
        catalog: cli.catalog.clone(),
        data_dir: cli.data_dir.clone(),
        audit_log: cli.audit_log.clone(),
    })?;

    let app = App::new(config);
    let outcome = app.run(&cli);

    if cli.metrics {
        eprint!("{}", app.metrics().gather());
    }
    info!("Finished in {:.2?}", start_time.elapsed());
    outcome
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let default_filter = if cli.verbose { "info" } else { "warn" };
    let mut builder = Builder::from_env(Env::default().default_filter_or(default_filter));

    builder.format(|buf, record| {
        use std::io::Write;
        writeln!(
            buf,
            "{} [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.module_path().unwrap_or("unknown"),
            record.args()
        )
    });

    if let Some(log_path) = &cli.log {
        if let Some(parent_dir) = log_path.parent() {
            if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
                fs::create_dir_all(parent_dir)?;
            }
        }
        let log_file = fs::File::create(log_path)?;
        builder.target(Target::Pipe(Box::new(log_file)));
    } else {
        builder.target(Target::Stderr);
    }

    builder
        .try_init()
        .map_err(|e| MovieSearchError::Other(e.to_string()))?;
    Ok(())
}
