//! A client for the Naver Open API endpoints the gateway proxies: blog search, for how many posts
//! mention a keyword, and DataLab search trends, for how much a keyword is searched.

use axum::http::StatusCode;
use reqwest::RequestBuilder;
use secrecy::ExposeSecret;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    api::validation::{Keyword, TimeUnit, TrendDate},
    config::{Config, Credentials},
};

/// The header carrying the client ID.
const CLIENT_ID_HEADER: &str = "X-Naver-Client-Id";

/// The header carrying the client secret.
const CLIENT_SECRET_HEADER: &str = "X-Naver-Client-Secret";

/// A DataLab search trend request body.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrendRequest {
    /// The first day of the period series.
    pub start_date: TrendDate,

    /// The last day of the period series.
    pub end_date: TrendDate,

    /// How the series is bucketed.
    pub time_unit: TimeUnit,

    /// The groups of keywords to get a series for.
    pub keyword_groups: Vec<KeywordGroup>,
}

impl TrendRequest {
    /// Builds a request with one [`KeywordGroup`] per keyword.
    pub fn new(
        start_date: TrendDate,
        end_date: TrendDate,
        time_unit: TimeUnit,
        keywords: &[Keyword],
    ) -> Self {
        Self {
            start_date,
            end_date,
            time_unit,
            keyword_groups: keywords.iter().map(KeywordGroup::single).collect(),
        }
    }
}

/// A set of keywords DataLab sums into one series.
#[derive(Serialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct KeywordGroup {
    /// The series' label.
    pub group_name: String,

    /// The keywords whose searches count toward the series.
    pub keywords: Vec<String>,
}

impl KeywordGroup {
    /// A group containing only one keyword, named after it.
    pub fn single(keyword: &Keyword) -> Self {
        Self {
            group_name: keyword.to_string(),
            keywords: vec![keyword.to_string()],
        }
    }
}

/// A DataLab search trend response body.
#[derive(Deserialize, Clone, PartialEq, Debug)]
pub struct TrendResponse {
    /// One series per requested keyword group, in request order.
    #[serde(default)]
    pub results: Vec<TrendSeries>,
}

/// The series for one keyword group.
#[derive(Deserialize, Clone, PartialEq, Debug)]
pub struct TrendSeries {
    /// The keyword group's name.
    #[serde(default)]
    pub title: String,

    /// The keyword group's keywords.
    #[serde(default)]
    pub keywords: Vec<String>,

    /// The points of the series, oldest first.
    #[serde(default)]
    pub data: Vec<TrendPoint>,
}

/// One period of a trend series.
#[derive(Deserialize, Clone, PartialEq, Debug)]
pub struct TrendPoint {
    /// The first day of the period, as `yyyy-mm-dd`.
    pub period: String,

    /// The period's search volume relative to the series' busiest period, from 0 to 100. Missing
    /// means 0.
    #[serde(default)]
    pub ratio: f64,
}

impl TrendResponse {
    /// Gets the ratio of the most recent period of the first series, or 0 if there is no such
    /// period.
    ///
    /// # Errors
    ///
    /// Fails if the series' periods aren't in chronological order, in which case the last one can't
    /// be assumed to be the most recent.
    pub fn latest_ratio(&self) -> Result<f64, Error> {
        let Some(series) = self.results.first() else {
            return Ok(0.0);
        };

        if let Some(pair) = series
            .data
            .windows(2)
            .find(|pair| pair[0].period > pair[1].period)
        {
            return Err(Error::Unordered {
                earlier: pair[0].period.clone(),
                later: pair[1].period.clone(),
            });
        }

        Ok(series.data.last().map_or(0.0, |point| point.ratio))
    }
}

/// A blog search response body. Only the total is read.
#[derive(Deserialize, Debug)]
struct BlogSearchResponse {
    /// How many blog posts match the query.
    #[serde(default)]
    total: u64,
}

/// The body Naver sends with an error status.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct ErrorResponse {
    /// Naver's error code, like `"024"`.
    error_code: Option<Value>,

    /// Naver's description of the error.
    error_message: Option<String>,
}

/// An error calling the Naver Open API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The request couldn't be sent or its response couldn't be read.
    #[error("request to the Naver API failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Naver responded with an error status.
    #[error("{code}: {message}")]
    Status {
        /// The response status.
        status: StatusCode,

        /// Naver's error code, or the status code if Naver didn't send one.
        code: String,

        /// Naver's error message, or the status' canonical reason if Naver didn't send one.
        message: String,
    },

    /// Naver responded successfully, but not with the expected JSON.
    #[error("unexpected response from the Naver API: {0}")]
    Decode(#[from] serde_json::Error),

    /// A trend series' periods weren't in chronological order.
    #[error("trend periods out of order: {later} came after {earlier}")]
    Unordered {
        /// The period that came first.
        earlier: String,

        /// The period that came second, despite being earlier.
        later: String,
    },
}

impl Error {
    /// Gets the status Naver responded with, if this error is from an error status.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// An authenticated Naver Open API client.
#[derive(Clone, Copy, Debug)]
pub struct Client<'a> {
    /// The HTTP client requests are sent through.
    http: &'a reqwest::Client,

    /// Where the endpoints are.
    config: &'a Config,

    /// The credentials every request is sent with.
    credentials: Credentials<'a>,
}

impl<'a> Client<'a> {
    /// Creates a client, or returns `None` if the configuration is missing credentials.
    pub fn new(http: &'a reqwest::Client, config: &'a Config) -> Option<Self> {
        Some(Self {
            http,
            config,
            credentials: config.credentials()?,
        })
    }

    /// Gets the total number of blog posts matching a keyword.
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub async fn blog_total(&self, keyword: &str) -> Result<u64, Error> {
        tracing::debug!(keyword, "requesting blog search total");

        let request = self
            .http
            .get(self.config.blog_search_url.clone())
            // Only the total is needed, so the smallest page is requested.
            .query(&[("query", keyword), ("display", "1"), ("start", "1")]);

        let response: BlogSearchResponse = self.send(request).await?;

        Ok(response.total)
    }

    /// Gets DataLab's search trend series for a request. The response is deserialized as `T`, so
    /// callers can take it typed as [`TrendResponse`] or raw as [`Value`].
    ///
    /// # Errors
    ///
    /// See [`Error`].
    pub async fn search_trend<T: DeserializeOwned>(
        &self,
        trend_request: &TrendRequest,
    ) -> Result<T, Error> {
        tracing::debug!(
            groups = trend_request.keyword_groups.len(),
            start_date = %trend_request.start_date,
            end_date = %trend_request.end_date,
            "requesting search trend"
        );

        let request = self
            .http
            .post(self.config.datalab_search_url.clone())
            .json(trend_request);

        self.send(request).await
    }

    /// Authenticates and sends a request, then reads its JSON response.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let response = request
            .header(CLIENT_ID_HEADER, self.credentials.client_id)
            .header(
                CLIENT_SECRET_HEADER,
                self.credentials.client_secret.expose_secret(),
            )
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let error = status_error(status, &body);
            tracing::warn!(%status, %error, "Naver API responded with an error");
            return Err(error);
        }

        Ok(serde_json::from_slice(&body)?)
    }
}

/// Builds an [`Error::Status`] from an error response, using Naver's error code and message if the
/// body has them.
fn status_error(status: StatusCode, body: &[u8]) -> Error {
    let (code, message) = match serde_json::from_slice::<ErrorResponse>(body) {
        Ok(response) => (response.error_code, response.error_message),
        Err(_) => (None, None),
    };

    let code = match code {
        Some(Value::String(code)) => code,
        Some(Value::Null) | None => status.as_str().into(),
        Some(code) => code.to_string(),
    };

    let message = message
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown Status").into());

    Error::Status {
        status,
        code,
        message,
    }
}
