//! The keyword gateway's web server.

use keyword_gateway::{
    config::{Config, LogFormat},
    router, AppState,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// The log filter used when `RUST_LOG` isn't set.
const DEFAULT_LOG_FILTER: &str = "keyword_gateway=info,tower_http=info";

/// # Errors
///
/// See implementation.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    if config.credentials().is_none() {
        tracing::warn!(
            "`NAVER_CLIENT_ID` or `NAVER_CLIENT_SECRET` isn't set, so analysis requests will fail"
        );
    }

    let address = config.address;
    let state = AppState::new(config)?;

    let listener = TcpListener::bind(address).await?;

    tracing::info!(%address, "listening");

    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Installs the global tracing subscriber, filtered by `RUST_LOG`.
fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }
}
