//! Analysis of a single keyword: how many blog posts mention it, how much it's currently searched,
//! and the ratio between the two.

use std::slice;

use axum::{extract::State, http::StatusCode};
use axum_macros::debug_handler;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

use crate::{
    api::{
        self,
        validation::{Keyword, TimeUnit},
        Json, Response,
    },
    naver::{TrendRequest, TrendResponse},
    AppState,
};

/// How far back the search volume lookup reaches.
const SEARCH_VOLUME_WINDOW: Duration = Duration::days(90);

/// A `POST` request body for this API route.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostRequest {
    /// The keyword to analyze.
    pub keyword: Keyword,
}

/// Looks up a keyword's blog post count and current search volume, and computes their ratio.
///
/// # Errors
///
/// See [`crate::api::Error`]. Missing credentials take precedence over an invalid body, and any
/// failed Naver API call results in status 500.
#[debug_handler]
pub async fn post(
    State(state): State<AppState>,
    body: Result<Json<PostRequest>, api::Error>,
) -> Response<PostResponse> {
    let naver = state.naver()?;
    let Json(body) = body?;

    let trend_request = search_volume_request(&body.keyword, OffsetDateTime::now_utc().date());

    let (blog_count, trend) = tokio::try_join!(
        naver.blog_total(&body.keyword),
        naver.search_trend::<TrendResponse>(&trend_request),
    )
    .map_err(api::Error::UpstreamFailed)?;

    let search_volume = trend.latest_ratio().map_err(api::Error::UpstreamFailed)?;
    let ratio = derived_ratio(search_volume, blog_count);

    tracing::info!(
        keyword = %body.keyword,
        blog_count,
        search_volume,
        ratio,
        "analyzed keyword"
    );

    Ok((
        StatusCode::OK,
        Json(PostResponse {
            keyword: body.keyword,
            blog_count,
            search_volume,
            ratio,
        }),
    ))
}

/// A `POST` response body for this API route.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    /// The analyzed keyword.
    pub keyword: Keyword,

    /// How many blog posts mention the keyword.
    pub blog_count: u64,

    /// The keyword's relative search volume over the most recent month.
    pub search_volume: f64,

    /// `search_volume / blog_count`, rounded to 4 decimal places, or 0 if there are no blog posts.
    pub ratio: f64,
}

/// Builds the trend request for a keyword's monthly search volume over the trailing window ending
/// `today`.
fn search_volume_request(keyword: &Keyword, today: Date) -> TrendRequest {
    TrendRequest::new(
        today.saturating_sub(SEARCH_VOLUME_WINDOW).into(),
        today.into(),
        TimeUnit::Month,
        slice::from_ref(keyword),
    )
}

/// Divides search volume by blog post count, rounded to 4 decimal places. A keyword nobody has
/// blogged about has a ratio of 0.
fn derived_ratio(search_volume: f64, blog_count: u64) -> f64 {
    if blog_count == 0 {
        return 0.0;
    }

    let ratio = search_volume / blog_count as f64;

    // Scaling by 10,000 first can carry the value across a rounding boundary, so this rounds the
    // exact binary value through its decimal formatting instead.
    format!("{ratio:.4}").parse().unwrap_or(ratio)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::macros::date;

    use super::*;

    /// Asserts two ratios are equal within floating point error.
    fn assert_ratio(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected ratio {expected}, found {actual}"
        );
    }

    #[test]
    fn ratio_is_rounded_to_four_places() {
        assert_ratio(derived_ratio(37.5, 1500), 0.025);
        assert_ratio(derived_ratio(100.0, 3), 33.3333);
        assert_ratio(derived_ratio(1.0, 3), 0.3333);
        assert_ratio(derived_ratio(2.0, 3), 0.6667);
        assert_ratio(derived_ratio(1.0, 1_000_000), 0.0);
        assert_ratio(derived_ratio(0.0, 50), 0.0);
    }

    #[test]
    fn ratio_rounds_the_exact_quotient() {
        // 0.7 / 2000 is just below 0.00035, and 1.3 / 2000 is just below 0.00065.
        assert_ratio(derived_ratio(0.7, 2000), 0.0003);
        assert_ratio(derived_ratio(1.3, 2000), 0.0006);
    }

    #[test]
    fn ratio_is_zero_without_blog_posts() {
        for search_volume in [0.0, 1.0, 37.5, 100.0] {
            assert_ratio(derived_ratio(search_volume, 0), 0.0);
        }
    }

    #[test]
    fn search_volume_covers_the_trailing_window_by_month() -> anyhow::Result<()> {
        let keyword: Keyword = serde_json::from_value(json!("coffee"))?;
        let request = search_volume_request(&keyword, date!(2024 - 05 - 15));

        assert_eq!(
            serde_json::to_value(&request)?,
            json!({
                "startDate": "2024-02-15",
                "endDate": "2024-05-15",
                "timeUnit": "month",
                "keywordGroups": [{ "groupName": "coffee", "keywords": ["coffee"] }],
            })
        );

        Ok(())
    }

    #[test]
    fn response_uses_camel_case() -> anyhow::Result<()> {
        let response = PostResponse {
            keyword: serde_json::from_value(json!("coffee"))?,
            blog_count: 1500,
            search_volume: 37.5,
            ratio: 0.025,
        };

        assert_eq!(
            serde_json::to_value(&response)?,
            json!({ "keyword": "coffee", "blogCount": 1500, "searchVolume": 37.5, "ratio": 0.025 })
        );

        Ok(())
    }
}
