use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::config::{Settings, DEFAULT_CONFIG_PATH};
use crate::db::init_db;
use crate::errors::WatchResult;
use crate::mailer::SmtpMailer;
use crate::monitor::{Monitor, Scheduler};
use crate::scraper::{HttpFetcher, ListingExtractor};

mod config;
mod db;
mod domain;
mod errors;
mod logging;
mod mailer;
mod monitor;
mod scraper;

#[cfg(test)]
mod tests;

/// Watch a listing page and mail when the newest posting changes.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML settings file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Poll once and exit instead of looping.
    #[arg(long)]
    once: bool,
}

fn main() {
    let cli = Cli::parse();

    // 1️⃣ Settings (logging isn't up yet, so report on stderr)
    let settings = match Settings::load(&cli.config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    // 2️⃣ Logging
    let _guard = match settings
        .level_filter()
        .and_then(|level| logging::init_logging(&settings.log_dir, level))
    {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    info!("STARTED");

    // 3️⃣ Watch until killed or the store breaks
    if let Err(e) = run(&settings, cli.once) {
        error!(error = %e, "watcher stopped");
        std::process::exit(1);
    }
}

fn run(settings: &Settings, once: bool) -> WatchResult<()> {
    let db = init_db(&settings.db_path)?;
    let fetcher = HttpFetcher::new(settings.url.clone(), settings.http_timeout())?;
    let extractor = ListingExtractor::new(&settings.base_url)?;
    let mailer = SmtpMailer::new(&settings.mail)?;

    let mut scheduler = Scheduler::new(settings.refresh_interval());
    if once {
        scheduler = scheduler.with_max_runs(1);
    }

    // Ctrl-C ends the current wait instead of killing a poll midway.
    let stop = scheduler.stop_handle();
    if let Err(e) = ctrlc::set_handler(move || stop.stop()) {
        warn!(error = %e, "could not install Ctrl-C handler");
    }

    info!(
        url = %fetcher.url(),
        db = %db.path(),
        interval_secs = settings.refresh_time_secs,
        "watching listing"
    );

    let monitor = Monitor::new(fetcher, extractor, mailer, db);
    let runs = monitor.run(&scheduler)?;
    info!(runs, "watcher finished");
    Ok(())
}
