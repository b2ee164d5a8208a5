//! All routes for the HTTP API.

use axum::{routing::post, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{api, AppState};

pub mod analyze_keyword;
pub mod analyze_trends;

/// Builds the API router.
///
/// Each route is served both at the root and under `/api/`, where the gateway's serverless
/// deployment exposed it.
pub fn router(state: AppState) -> Router {
    let routes = Router::new()
        .route(
            "/analyze-keyword",
            post(analyze_keyword::post).fallback(|| async { api::Error::MethodNotAllowed }),
        )
        .route(
            "/analyze-trends",
            post(analyze_trends::post).fallback(|| async { api::Error::MethodNotAllowed }),
        );

    Router::new()
        .merge(routes.clone())
        .nest("/api", routes)
        .fallback(|| async { api::Error::RouteNotFound })
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
