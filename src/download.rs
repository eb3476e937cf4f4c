//! Download of discovered publications.
//!
//! Every discovered URL is fetched with the long download timeout and the
//! TLS setting of the source it came from. A failure only costs that source
//! its attachment; the rest of the batch carries on.

use crate::fetch::{FetchOptions, Fetcher};
use crate::models::{Artifact, Discoveries};
use crate::sources::PublicationSource;
use chrono::NaiveDate;
use tracing::{error, info, instrument, warn};

/// Download every entry of `discoveries`, naming artifacts after the source
/// and `run_date`.
#[instrument(level = "info", skip_all, fields(count = discoveries.len(), %run_date))]
pub async fn fetch_all<F: Fetcher>(
    fetcher: &F,
    discoveries: &Discoveries,
    sources: &[PublicationSource],
    run_date: NaiveDate,
) -> Vec<Artifact> {
    let mut artifacts = Vec::with_capacity(discoveries.len());

    for (name, url) in discoveries {
        let options = sources
            .iter()
            .find(|s| &s.name == name)
            .map(PublicationSource::download_options)
            .unwrap_or_else(|| FetchOptions::download(true));

        info!(source = %name, %url, "Downloading publication");
        match fetcher.get(url, &options).await {
            Ok(content) if content.is_empty() => {
                warn!(source = %name, %url, "Download returned an empty body; skipping");
            }
            Ok(content) => {
                let artifact = Artifact::new(name, run_date, content);
                info!(
                    source = %name,
                    filename = %artifact.filename,
                    bytes = artifact.content.len(),
                    "Downloaded publication"
                );
                artifacts.push(artifact);
            }
            Err(e) => {
                error!(source = %name, %url, error = %e, "Download failed; skipping source");
            }
        }
    }

    info!(downloaded = artifacts.len(), "Downloads finished");
    artifacts
}
