mod availability;
mod config;
mod models;
mod notifier;
mod pipeline;
mod scraper;
mod storage;
mod utils;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::availability::{build_room_names, list_available};
use crate::config::AppConfig;
use crate::pipeline::{check_line, error_line};
use crate::scraper::{ReserveSiteScraper, SavedPage, VacancySource};

#[derive(Parser)]
#[command(name = "vacancy-watch", about = "Reservation vacancy watcher with LINE alerts", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Date to watch, in the site's own format (overrides TARGET_DATE)
    #[arg(long, global = true)]
    target_date: Option<String>,

    /// Directory holding default.toml / local.toml
    #[arg(long, default_value = "config", global = true)]
    config_dir: PathBuf,

    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Check once and notify on the first vacancy (default)
    Check,

    /// Print room names and vacancies without logging or notifying
    Inspect {
        /// Read a saved page instead of fetching the live site
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "vacancy_watch=info,warn",
        1 => "vacancy_watch=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match cli.command {
        None | Some(Command::Check) => {
            // `check` always exits zero; a failure is only the error line.
            let _t = utils::Timer::start("Vacancy check");
            let now = utils::local_now();
            let line = match load_config(&cli.config_dir, cli.target_date) {
                Ok(config) => check_line(&config, now).await,
                Err(e) => error_line(now, &e),
            };
            println!("{}", line);
        }

        Some(Command::Inspect { file }) => {
            inspect(&cli.config_dir, cli.target_date, file).await?;
        }
    }

    Ok(())
}

fn load_config(dir: &Path, target_date: Option<String>) -> Result<AppConfig> {
    let mut config = AppConfig::load_from(dir)?;
    if target_date.is_some() {
        config.target_date = target_date;
    }
    Ok(config)
}

async fn inspect(
    config_dir: &Path,
    target_date: Option<String>,
    file: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_dir, target_date)?;

    let source: Box<dyn VacancySource> = match file {
        Some(path) => Box::new(SavedPage::new(path, config.source.plan_url()?)),
        None => Box::new(ReserveSiteScraper::new(&config.source).context("Failed to build scraper")?),
    };
    let payload = source.fetch_payload().await?;

    let names = build_room_names(&payload);
    let mut named: Vec<_> = names.iter().map(|(id, name)| (id.to_string(), name)).collect();
    named.sort();

    println!("Source : {}", source.page_url());
    println!("Groups : {}", payload.calendar_rooms.len());
    println!("Rooms  : {}", named.len());
    for (id, name) in &named {
        println!("  {:>6}  {}", id, name);
    }

    if let Ok(date) = config.target_date() {
        let rooms = list_available(&payload, date);
        if rooms.is_empty() {
            println!("{}: no vacancy", date);
        } else {
            println!("{}: {}", date, rooms.join(" / "));
        }
    }

    Ok(())
}
