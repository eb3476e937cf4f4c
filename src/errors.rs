//! Error taxonomy for the pipeline.
//!
//! Each concern gets its own enum so that the boundaries stay visible:
//! network and parse failures never leave a source strategy, download
//! failures never leave the downloader, and notification failures are
//! logged by the pipeline without touching the exit status.
//!
//! "No publication today" is deliberately absent from this module. It is a
//! normal outcome and is modelled as [`crate::models::Resolution::NotFound`].

use thiserror::Error;

/// Failure of a single HTTP GET.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout or body read failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered, but not with a 2xx status.
    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    /// The underlying HTTP client could not be built.
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Malformed or unusable upstream payload.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid CSS selector `{0}`")]
    Selector(String),

    #[error("could not extract text from PDF: {0}")]
    Pdf(String),
}

/// Problems with the runtime configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// One or more required environment variables are unset or blank.
    #[error("missing environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid URL `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

/// Failure of the notification step.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid mailbox `{address}`: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),

    #[error("invalid content type: {0}")]
    ContentType(String),

    #[error("mail submission failed: {0}")]
    Transport(String),
}
