//! Process configuration, read once at startup and shared with every request handler.

use std::{net::SocketAddr, num::ParseIntError, time::Duration};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// The Naver blog search endpoint, used for blog post counts.
pub const DEFAULT_BLOG_SEARCH_URL: &str = "https://openapi.naver.com/v1/search/blog.json";

/// The Naver DataLab integrated search trend endpoint.
pub const DEFAULT_DATALAB_SEARCH_URL: &str = "https://openapi.naver.com/v1/datalab/search";

/// The address to listen on when `ADDRESS` isn't set.
const DEFAULT_ADDRESS: &str = "127.0.0.1:3000";

/// The outbound request timeout when `UPSTREAM_TIMEOUT_SECS` isn't set.
const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// The gateway's configuration.
///
/// Missing Naver credentials are allowed here so the server can still start; requests that need them
/// fail with a server configuration error instead.
#[derive(Debug)]
pub struct Config {
    /// The socket address the server listens on.
    pub address: SocketAddr,

    /// The Naver Open API client ID.
    pub client_id: Option<String>,

    /// The Naver Open API client secret.
    pub client_secret: Option<SecretString>,

    /// The blog search endpoint.
    pub blog_search_url: Url,

    /// The DataLab search trend endpoint.
    pub datalab_search_url: Url,

    /// How long an outbound request may take before it's abandoned.
    pub upstream_timeout: Duration,

    /// How log events are formatted.
    pub log_format: LogFormat,
}

/// A borrowed pair of Naver Open API credentials.
#[derive(Clone, Copy, Debug)]
pub struct Credentials<'a> {
    /// The client ID, sent as `X-Naver-Client-Id`.
    pub client_id: &'a str,

    /// The client secret, sent as `X-Naver-Client-Secret`.
    pub client_secret: &'a SecretString,
}

/// How log events are written to stdout.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,

    /// One JSON object per event.
    Json,
}

/// An error reading the [`Config`] from the environment.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// `ADDRESS` isn't a socket address.
    #[error("environment variable `ADDRESS` should be a socket address, found {value:?}")]
    Address {
        /// The value that failed to parse.
        value: String,

        /// Why it failed to parse.
        #[source]
        source: std::net::AddrParseError,
    },

    /// An endpoint variable isn't a URL.
    #[error("environment variable `{name}` should be a URL, found {value:?}")]
    Url {
        /// The variable's name.
        name: &'static str,

        /// The value that failed to parse.
        value: String,

        /// Why it failed to parse.
        #[source]
        source: url::ParseError,
    },

    /// `UPSTREAM_TIMEOUT_SECS` isn't a whole number of seconds.
    #[error("environment variable `UPSTREAM_TIMEOUT_SECS` should be a whole number, found {value:?}")]
    Timeout {
        /// The value that failed to parse.
        value: String,

        /// Why it failed to parse.
        #[source]
        source: ParseIntError,
    },

    /// `LOG_FORMAT` isn't a known format.
    #[error("environment variable `LOG_FORMAT` should be `json` or `pretty`, found {0:?}")]
    LogFormat(String),
}

impl Config {
    /// Reads the configuration from the process environment, loading a `.env` file first if there is
    /// one.
    ///
    /// # Errors
    ///
    /// Fails if a set variable has a malformed value. See [`Error`].
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| dotenvy::var(key).ok())
    }

    /// Reads the configuration through a function that looks up variables by name.
    ///
    /// Empty values are treated the same as unset ones.
    ///
    /// # Errors
    ///
    /// Fails if a set variable has a malformed value. See [`Error`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let address = var("ADDRESS").unwrap_or_else(|| DEFAULT_ADDRESS.into());
        let address: SocketAddr = address
            .parse()
            .map_err(|source| Error::Address { value: address, source })?;

        let upstream_timeout = match var("UPSTREAM_TIMEOUT_SECS") {
            Some(value) => Duration::from_secs(
                value
                    .parse()
                    .map_err(|source| Error::Timeout { value, source })?,
            ),
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        let log_format = match var("LOG_FORMAT").as_deref() {
            None | Some("pretty") => LogFormat::Pretty,
            Some("json") => LogFormat::Json,
            Some(other) => return Err(Error::LogFormat(other.into())),
        };

        Ok(Self {
            address,
            client_id: var("NAVER_CLIENT_ID"),
            client_secret: var("NAVER_CLIENT_SECRET").map(SecretString::from),
            blog_search_url: url_var(&var, "NAVER_BLOG_SEARCH_URL", DEFAULT_BLOG_SEARCH_URL)?,
            datalab_search_url: url_var(
                &var,
                "NAVER_DATALAB_SEARCH_URL",
                DEFAULT_DATALAB_SEARCH_URL,
            )?,
            upstream_timeout,
            log_format,
        })
    }

    /// Returns the Naver credentials, or `None` if either half is missing.
    pub fn credentials(&self) -> Option<Credentials<'_>> {
        Some(Credentials {
            client_id: self.client_id.as_deref()?,
            client_secret: self.client_secret.as_ref()?,
        })
    }
}

/// Parses a URL variable, falling back to a default when it's unset.
fn url_var<F>(var: &F, name: &'static str, default: &str) -> Result<Url, Error>
where
    F: Fn(&str) -> Option<String>,
{
    let value = var(name).unwrap_or_else(|| default.into());

    Url::parse(&value).map_err(|source| Error::Url {
        name,
        value,
        source,
    })
}
