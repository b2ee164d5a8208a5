//! Search trend series for one or more keywords over a requested date range.

use axum::{extract::State, http::StatusCode};
use axum_macros::debug_handler;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    api::{
        self,
        validation::{Keywords, TimeUnit, TrendDate},
        Json, Response,
    },
    naver::TrendRequest,
    AppState,
};

/// A `POST` request body for this API route.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    /// The keywords to get a series for, each in its own group.
    pub keywords: Keywords,

    /// How the series are bucketed. Unrecognized values fall back to daily.
    #[serde(default, deserialize_with = "TimeUnit::deserialize_or_default")]
    pub time_unit: TimeUnit,

    /// The first day of the series.
    pub start_date: TrendDate,

    /// The last day of the series.
    pub end_date: TrendDate,
}

/// Gets DataLab's search trend series for the requested keywords, passing the response through
/// unmodified.
///
/// # Errors
///
/// See [`crate::api::Error`]. Missing credentials take precedence over an invalid body, and an error
/// status from DataLab is forwarded to the client.
#[debug_handler]
pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<PostRequest>, api::Error>,
) -> Response<Value> {
    let naver = state.naver()?;
    let Json(body) = body?;

    if body.start_date > body.end_date {
        return Err(api::Error::DateRangeReversed {
            start: body.start_date,
            end: body.end_date,
        });
    }

    let trend_request = TrendRequest::new(
        body.start_date,
        body.end_date,
        body.time_unit,
        &body.keywords,
    );

    let trends: Value = naver
        .search_trend(&trend_request)
        .await
        .map_err(api::Error::Upstream)?;

    tracing::info!(
        keywords = body.keywords.len(),
        start_date = %body.start_date,
        end_date = %body.end_date,
        time_unit = ?body.time_unit,
        "fetched search trends"
    );

    Ok((StatusCode::OK, Json(trends)))
}
