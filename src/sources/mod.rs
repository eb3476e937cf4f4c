//! Publication sources and their extraction strategies.
//!
//! A [`PublicationSource`] is a named portal with an ordered list of
//! [`ExtractionStrategy`] values. Portals keep changing their layout, so each
//! known layout is its own strategy and [`PublicationSource::resolve`] tries
//! them in order until one yields a URL.
//!
//! # Supported Sources
//!
//! | Source | Module | Strategies |
//! |--------|--------|------------|
//! | Diário Oficial do Estado | [`doe`] | anchor text `DD/MM/YYYY`, then table rows |
//! | Diário da Assembleia Legislativa | [`alce`] | JSON API, then anchor titles with long dates |
//!
//! # Failure handling
//!
//! `resolve` never returns an error. Network and parse failures are logged
//! and the strategy is skipped; when nothing matches the result is
//! [`Resolution::NotFound`] tagged with [`Miss::Degraded`] if anything went
//! wrong along the way, [`Miss::NoMatch`] otherwise.

pub mod alce;
pub mod dates;
pub mod doe;
pub mod html;
pub mod json;

use crate::errors::{ConfigError, ParseError};
use crate::fetch::{FetchOptions, Fetcher};
use crate::models::{Miss, Resolution};
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// One way of reading a portal.
///
/// Implementations are pure over the fetched body; fetching is done by the
/// owning [`PublicationSource`].
pub trait ExtractionStrategy: fmt::Debug + Send + Sync {
    /// Short name for logs.
    fn label(&self) -> &str;

    /// Page or API endpoint this strategy reads.
    fn endpoint(&self) -> &Url;

    /// Look for the publication of `date` in the decoded listing `body`.
    ///
    /// Returns the first match in document order, or `None`.
    fn extract(&self, body: &str, date: NaiveDate) -> Result<Option<Url>, ParseError>;
}

/// A gazette portal.
#[derive(Debug)]
pub struct PublicationSource {
    pub name: String,
    pub strategies: Vec<Box<dyn ExtractionStrategy>>,
    /// Some portals serve an incomplete certificate chain.
    pub verify_tls: bool,
    pub listing_timeout: Duration,
}

impl PublicationSource {
    pub fn new(name: &str, verify_tls: bool) -> Self {
        Self {
            name: name.to_string(),
            strategies: Vec::new(),
            verify_tls,
            listing_timeout: crate::fetch::LISTING_TIMEOUT,
        }
    }

    pub fn with_strategy(mut self, strategy: impl ExtractionStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    pub fn listing_options(&self) -> FetchOptions {
        FetchOptions {
            verify_tls: self.verify_tls,
            timeout: self.listing_timeout,
        }
    }

    pub fn download_options(&self) -> FetchOptions {
        FetchOptions::download(self.verify_tls)
    }

    /// Find the download URL of this source's publication for `date`.
    ///
    /// Each distinct endpoint is fetched at most once per call, even when
    /// several strategies read it.
    #[instrument(level = "info", skip_all, fields(source = %self.name, %date))]
    pub async fn resolve<F: Fetcher>(&self, fetcher: &F, date: NaiveDate) -> Resolution {
        let options = self.listing_options();
        let mut bodies: HashMap<Url, Option<String>> = HashMap::new();
        let mut degraded = false;

        for strategy in &self.strategies {
            let endpoint = strategy.endpoint();
            if !bodies.contains_key(endpoint) {
                let fetched = match fetcher.get_text(endpoint, &options).await {
                    Ok(body) => Some(body),
                    Err(e) => {
                        warn!(strategy = strategy.label(), error = %e, "Could not fetch listing");
                        None
                    }
                };
                bodies.insert(endpoint.clone(), fetched);
            }
            let Some(body) = bodies.get(endpoint).and_then(Option::as_ref) else {
                degraded = true;
                continue;
            };

            match strategy.extract(body, date) {
                Ok(Some(url)) if matches!(url.scheme(), "http" | "https") => {
                    info!(strategy = strategy.label(), %url, "Publication found");
                    return Resolution::Found(url);
                }
                Ok(Some(url)) => {
                    warn!(strategy = strategy.label(), %url, "Ignoring non-HTTP link");
                }
                Ok(None) => {
                    debug!(strategy = strategy.label(), "Strategy found nothing");
                }
                Err(e) => {
                    degraded = true;
                    warn!(
                        strategy = strategy.label(),
                        error = %e,
                        body_preview = %truncate_for_log(body, 200),
                        "Listing did not parse"
                    );
                }
            }
        }

        let miss = if degraded { Miss::Degraded } else { Miss::NoMatch };
        info!(reason = %miss, "No publication for date");
        Resolution::NotFound(miss)
    }
}

/// The portals queried on every run, in order.
pub fn default_sources() -> Result<Vec<PublicationSource>, ConfigError> {
    Ok(vec![doe::source()?, alce::source()?])
}

pub(crate) fn parse_url(raw: &str) -> Result<Url, ConfigError> {
    Url::parse(raw).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}
