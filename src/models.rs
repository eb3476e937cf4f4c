//! Data models shared across discovery, download and notification.
//!
//! - [`Resolution`]: outcome of probing one source for one date
//! - [`Miss`]: why a lookup came back empty (for logging only)
//! - [`Discoveries`]: per-run mapping of source name to download URL
//! - [`Artifact`]: a downloaded gazette ready to be attached to the email

use chrono::NaiveDate;
use indexmap::IndexMap;
use std::fmt;
use url::Url;

/// Source name → resolved absolute download URL.
///
/// Only sources that resolved are present. Iteration follows the order in
/// which sources were configured.
pub type Discoveries = IndexMap<String, Url>;

/// Outcome of asking a source for the publication of a given date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// An absolute `http(s)` URL pointing at the publication.
    Found(Url),
    /// Nothing usable was found for that date.
    NotFound(Miss),
}

/// Why a source returned [`Resolution::NotFound`].
///
/// Both variants take the same path through the pipeline. They are kept apart
/// so that an unreachable portal does not look like a quiet day in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Miss {
    /// Every strategy read its endpoint and none matched the date.
    NoMatch,
    /// At least one strategy could not fetch or parse its endpoint.
    Degraded,
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Miss::NoMatch => f.write_str("no_match"),
            Miss::Degraded => f.write_str("degraded"),
        }
    }
}

/// A downloaded publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Name of the source that produced it (`"DOE"`, `"ALCE"`).
    pub source: String,
    /// Attachment filename, unique within a run.
    pub filename: String,
    /// Raw PDF bytes.
    pub content: Vec<u8>,
}

impl Artifact {
    /// Build an artifact named `<SOURCE>_<YYYY-MM-DD>.pdf`.
    pub fn new(source: &str, run_date: NaiveDate, content: Vec<u8>) -> Self {
        Self {
            source: source.to_string(),
            filename: artifact_filename(source, run_date),
            content,
        }
    }
}

/// Deterministic attachment name for a source on a given run date.
pub fn artifact_filename(source: &str, run_date: NaiveDate) -> String {
    format!("{}_{}.pdf", source, run_date.format("%Y-%m-%d"))
}
