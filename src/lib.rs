//! A web server answering keyword research queries with Naver blog post counts and DataLab search
//! trends.

pub mod api;
pub mod config;
pub mod naver;

use std::sync::Arc;

pub use api::routes::router;
use config::Config;

/// The state shared by every request handler.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The gateway's configuration.
    pub config: Arc<Config>,

    /// The HTTP client for outbound requests. Its connection pool is shared between clones.
    pub http: reqwest::Client,
}

impl AppState {
    /// Creates the state, building an HTTP client that times out per the configuration.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client can't be initialized (for example, if no TLS backend is available).
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            config: Arc::new(config),
            http,
        })
    }

    /// Gets a Naver API client authenticated with the configured credentials.
    ///
    /// # Errors
    ///
    /// Returns [`api::Error::CredentialsMissing`] if either credential isn't configured.
    pub fn naver(&self) -> Result<naver::Client<'_>, api::Error> {
        naver::Client::new(&self.http, &self.config).ok_or_else(|| {
            tracing::warn!("rejecting request because Naver credentials aren't configured");
            api::Error::CredentialsMissing
        })
    }
}
