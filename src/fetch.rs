//! HTTP fetching behind a small trait.
//!
//! The rest of the crate only knows about [`Fetcher`], so listings and
//! downloads can be served from memory in tests. [`HttpFetcher`] is the
//! production implementation on top of `reqwest`.
//!
//! Every request carries an explicit timeout taken from [`FetchOptions`];
//! there is no retry here. Some portals ship a broken certificate chain, so
//! TLS verification can be switched off per request.

use crate::errors::FetchError;
use reqwest::{Client, Response};
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

/// User agent sent with every request. Several portals reject the default
/// `reqwest` agent.
pub const USER_AGENT: &str = "Mozilla/5.0";

/// Timeout for listing pages and API endpoints.
pub const LISTING_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for PDF downloads, which are considerably larger than listings.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// Per-request network options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Verify the server certificate chain.
    pub verify_tls: bool,
    /// Upper bound for the whole request, body included.
    pub timeout: Duration,
}

impl FetchOptions {
    pub fn download(verify_tls: bool) -> Self {
        Self {
            verify_tls,
            timeout: DOWNLOAD_TIMEOUT,
        }
    }
}

/// Something that can GET a URL and hand back the body.
///
/// Implementations must treat non-2xx statuses as errors.
pub trait Fetcher {
    /// Raw body bytes, for PDF downloads.
    async fn get(&self, url: &Url, options: &FetchOptions) -> Result<Vec<u8>, FetchError>;

    /// Body decoded to text using the charset the server declares in
    /// `Content-Type`, UTF-8 when none is given. Used for listings, where
    /// portals still serve ISO-8859-1 pages.
    async fn get_text(&self, url: &Url, options: &FetchOptions) -> Result<String, FetchError>;
}

/// `reqwest`-backed [`Fetcher`].
///
/// Holds two clients so that disabling verification for one source never
/// leaks into requests for another.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    verifying: Client,
    lenient: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, FetchError> {
        let verifying = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        let lenient = Client::builder()
            .user_agent(USER_AGENT)
            .danger_accept_invalid_certs(true)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { verifying, lenient })
    }

    fn client(&self, verify_tls: bool) -> &Client {
        if verify_tls {
            &self.verifying
        } else {
            &self.lenient
        }
    }
}

impl HttpFetcher {
    async fn send(&self, url: &Url, options: &FetchOptions) -> Result<Response, FetchError> {
        let response = self
            .client(options.verify_tls)
            .get(url.clone())
            .timeout(options.timeout)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Non-success status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url, verify_tls = options.verify_tls))]
    async fn get(&self, url: &Url, options: &FetchOptions) -> Result<Vec<u8>, FetchError> {
        let t0 = Instant::now();
        let body = self
            .send(url, options)
            .await?
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched"
        );
        Ok(body.to_vec())
    }

    #[instrument(level = "debug", skip_all, fields(%url, verify_tls = options.verify_tls))]
    async fn get_text(&self, url: &Url, options: &FetchOptions) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let text = self
            .send(url, options)
            .await?
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;
        debug!(
            chars = text.chars().count(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched text"
        );
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    //! In-memory [`Fetcher`] for tests.

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned bodies keyed by URL. Unknown URLs answer 404, and URLs
    /// registered with [`FakeFetcher::fail`] answer 503.
    #[derive(Debug, Default)]
    pub struct FakeFetcher {
        bodies: HashMap<String, Vec<u8>>,
        failing: Vec<String>,
        calls: Mutex<Vec<(String, FetchOptions)>>,
    }

    impl FakeFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, url: &str, body: impl Into<Vec<u8>>) -> Self {
            self.bodies.insert(url.to_string(), body.into());
            self
        }

        pub fn fail(mut self, url: &str) -> Self {
            self.failing.push(url.to_string());
            self
        }

        pub fn calls(&self) -> Vec<(String, FetchOptions)> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self, url: &str) -> usize {
            self.calls().iter().filter(|(u, _)| u == url).count()
        }
    }

    impl Fetcher for FakeFetcher {
        async fn get(&self, url: &Url, options: &FetchOptions) -> Result<Vec<u8>, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), *options));
            if self.failing.iter().any(|u| u == url.as_str()) {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: 503,
                });
            }
            self.bodies
                .get(url.as_str())
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }

        /// Canned bodies are written as UTF-8 by the tests.
        async fn get_text(&self, url: &Url, options: &FetchOptions) -> Result<String, FetchError> {
            let body = self.get(url, options).await?;
            Ok(String::from_utf8_lossy(&body).into_owned())
        }
    }
}
