//! The HTTP API. Every response body is JSON, and every error body has the form `{ "error": "..." }`.

pub mod routes;
pub mod validation;

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
};
use axum_macros::FromRequest;
use serde::Serialize;
use strum_macros::IntoStaticStr;
use thiserror::Error;

use crate::{api::validation::TrendDate, naver};

/// An API error, sent to the client as a JSON error body with the appropriate status.
#[derive(Error, IntoStaticStr, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The request body was missing, wasn't JSON, or failed validation.
    #[error("{0}")]
    BodyInvalid(String),

    /// A date range started after it ended.
    #[error("startDate {start} must not be later than endDate {end}")]
    DateRangeReversed {
        /// The requested start date.
        start: TrendDate,

        /// The requested end date.
        end: TrendDate,
    },

    /// The route doesn't support the request method.
    #[error("method not allowed, only POST is supported")]
    MethodNotAllowed,

    /// No route matches the request path.
    #[error("no API route matches this path")]
    RouteNotFound,

    /// The server has no Naver credentials to call upstream with.
    #[error("Server configuration error: the Naver API credentials (NAVER_CLIENT_ID and NAVER_CLIENT_SECRET) are not set")]
    CredentialsMissing,

    /// A Naver API call failed. An error status from Naver is forwarded to the client.
    #[error("{0}")]
    Upstream(naver::Error),

    /// A Naver API call failed. The client always gets status 500, whatever Naver responded with.
    #[error("an error occurred calling the Naver API: {0}")]
    UpstreamFailed(naver::Error),
}

impl Error {
    /// Gets the HTTP response status code for the error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BodyInvalid(_) | Self::DateRangeReversed { .. } => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::Upstream(error) => error.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Self::CredentialsMissing | Self::UpstreamFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::BodyInvalid(rejection.body_text())
    }
}

/// A JSON error response body.
#[derive(Serialize, Debug)]
struct ErrorBody {
    /// A human-readable description of what went wrong.
    error: String,
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let kind: &'static str = (&self).into();

        if status.is_server_error() {
            tracing::error!(kind, error = %self, "request failed");
        } else {
            tracing::debug!(kind, error = %self, "request rejected");
        }

        let allow = matches!(self, Self::MethodNotAllowed);

        let mut response = (
            status,
            axum::Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response();

        if allow {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }

        response
    }
}

/// Equivalent to [`axum::Json`], but rejections become an [`Error`] with a JSON body.
#[derive(FromRequest, Clone, Copy, Default, Debug)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> axum::response::Response {
        axum::Json(self.0).into_response()
    }
}

/// The return type of an API route handler.
pub type Response<T> = Result<(StatusCode, Json<T>), Error>;
