//! One complete run: discover, download, screen, notify.
//!
//! Every stage ends the run early, and quietly, when it has nothing to hand to
//! the next one. Nothing in here returns an error: failures are logged where
//! they happen and summarised in the returned [`RunReport`].

use crate::config::Settings;
use crate::discovery::discover_all;
use crate::download::fetch_all;
use crate::fetch::Fetcher;
use crate::filter::screen;
use crate::notify::{GREETING, Mailer, send};
use crate::sources::PublicationSource;
use chrono::NaiveDate;
use tracing::{error, info, instrument};

/// How far a run got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No source had a publication for today or yesterday.
    NothingFound,
    /// Publications were found but none could be downloaded.
    NothingDownloaded,
    /// Downloads succeeded but no gazette contained a keyword.
    NothingMatched,
    /// The email went out.
    Sent,
    /// The email could not be sent.
    NotSent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub discovered: usize,
    pub downloaded: usize,
    pub attached: usize,
    pub outcome: Outcome,
}

impl RunReport {
    fn stopped(outcome: Outcome, discovered: usize, downloaded: usize) -> Self {
        Self {
            discovered,
            downloaded,
            attached: 0,
            outcome,
        }
    }
}

#[instrument(level = "info", skip_all, fields(%today))]
pub async fn run<F: Fetcher, M: Mailer>(
    fetcher: &F,
    mailer: &M,
    sources: &[PublicationSource],
    settings: &Settings,
    today: NaiveDate,
) -> RunReport {
    let discoveries = discover_all(fetcher, sources, today).await;
    if discoveries.is_empty() {
        info!("No gazette found for today or yesterday; nothing to send");
        return RunReport::stopped(Outcome::NothingFound, 0, 0);
    }

    let artifacts = fetch_all(fetcher, &discoveries, sources, today).await;
    if artifacts.is_empty() {
        info!(discovered = discoveries.len(), "Every download failed; nothing to send");
        return RunReport::stopped(Outcome::NothingDownloaded, discoveries.len(), 0);
    }
    let downloaded = artifacts.len();

    let screened = screen(artifacts, &settings.keywords, GREETING.to_string());
    if screened.artifacts.is_empty() {
        info!(downloaded, "No gazette matched the keywords; nothing to send");
        return RunReport::stopped(Outcome::NothingMatched, discoveries.len(), downloaded);
    }

    let outcome = match send(mailer, &settings.mail, &screened.artifacts, &screened.body, today).await {
        Ok(()) => Outcome::Sent,
        Err(e) => {
            error!(error = %e, "Could not send email");
            Outcome::NotSent
        }
    };

    RunReport {
        discovered: discoveries.len(),
        downloaded,
        attached: screened.artifacts.len(),
        outcome,
    }
}
