//! HTTP surface: metrics endpoint, health probe, and a small landing page.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use color_eyre::eyre::Result;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::exporter::{EXPOSITION_CONTENT_TYPE, Exporter};

pub struct Deps {
    pub exporter: Arc<Exporter>,
    pub metrics_path: String,
    pub signal_rate_secs: u64,
}

pub fn router(deps: Deps) -> Router {
    let metrics_path = deps.metrics_path.clone();
    Router::new()
        .route("/", get(landing))
        .route("/health", get(health))
        .route(&metrics_path, get(metrics))
        .with_state(Arc::new(deps))
}

/// Serve until the token is cancelled, then finish in-flight requests.
pub async fn run(
    listener: TcpListener,
    deps: Deps,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("listening on http://{addr}");

    axum::serve(listener, router(deps))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    Ok(())
}

async fn metrics(State(deps): State<Arc<Deps>>) -> impl IntoResponse {
    let body = deps.exporter.scrape_text().await;
    ([(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)], body)
}

/// Liveness only; says nothing about whether ModemManager is reachable.
async fn health() -> &'static str {
    "OK\n"
}

async fn landing(State(deps): State<Arc<Deps>>) -> Html<String> {
    let manager_version = deps.exporter.manager_version().await;
    Html(format!(
        "<html>\n\
         <head><title>ModemManager Exporter</title></head>\n\
         <body>\n\
         <h1>ModemManager Exporter</h1>\n\
         <p>Version: {version}</p>\n\
         <p>ModemManager version: {manager_version}</p>\n\
         <p>Signal refresh rate: {rate}s</p>\n\
         <p><a href=\"{path}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        version = env!("CARGO_PKG_VERSION"),
        rate = deps.signal_rate_secs,
        path = deps.metrics_path,
    ))
}
