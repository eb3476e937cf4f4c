//! # Diário Watch
//!
//! Looks for the day's official gazettes of Ceará, downloads the PDFs and
//! emails them to a fixed recipient. Meant to be started by an external
//! scheduler (cron, systemd timer) once or a few times a day.
//!
//! ## Sources
//!
//! - **DOE**: Diário Oficial do Estado, listed on the CGE portal
//! - **ALCE**: Diário da Assembleia Legislativa
//!
//! ## Pipeline
//!
//! 1. **Discovery**: each source is asked for today's edition, then
//!    yesterday's if today's is not listed yet
//! 2. **Download**: every discovered PDF is fetched; failures are skipped
//! 3. **Screening**: optional keyword filter over the PDF text
//! 4. **Notification**: one email with every surviving PDF attached
//!
//! The process always exits successfully once it has started; partial
//! failures are reported in the logs only.
//!
//! ## Configuration
//!
//! Read from the environment, or from a `.env` file in the working directory.
//! See [`config`] for the variables. Log verbosity follows `RUST_LOG`.

use chrono::Local;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod config;
mod discovery;
mod download;
mod errors;
mod fetch;
mod filter;
mod models;
mod notify;
mod pipeline;
mod sources;
mod utils;

use config::Settings;
use fetch::HttpFetcher;
use notify::SmtpMailer;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "diario_watch starting up");

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => debug!("No .env file; using process environment"),
        Err(e) => warn!(error = %e, "Ignoring unreadable .env file"),
    }
    let settings = Settings::from_env();
    debug!(mail = ?settings.mail, keywords = ?settings.keywords, "Loaded settings");

    let sources = sources::default_sources()?;
    let fetcher = HttpFetcher::new()?;
    let mailer = SmtpMailer::default();

    let today = Local::now().date_naive();
    let report = pipeline::run(&fetcher, &mailer, &sources, &settings, today).await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        discovered = report.discovered,
        downloaded = report.downloaded,
        attached = report.attached,
        outcome = ?report.outcome,
        "Execution complete"
    );

    Ok(())
}
