//! HTTP surface tests, driving the router in-memory with `oneshot`.


use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use fixture::{FakeManager, FakeModem};
use http_body_util::BodyExt as _;
use mm_exporter::Exporter;
use mm_exporter::server::{Deps, router};
use tower::ServiceExt as _; // for `oneshot`

fn app(manager: FakeManager, metrics_path: &str) -> axum::Router {
    router(Deps {
        exporter: Arc::new(Exporter::new(Arc::new(manager))),
        metrics_path: metrics_path.to_owned(),
        signal_rate_secs: 5,
    })
}

async fn get(app: axum::Router, uri: &str) -> (StatusCode, Option<String>, String) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .expect("failed to get response");

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_owned());
    let body = response.into_body().collect().await.expect("body collect");
    (status, content_type, String::from_utf8(body.to_bytes().to_vec()).unwrap())
}

#[tokio::test]
async fn it_serves_the_exposition_with_the_prometheus_content_type() {
    let app = app(
        FakeManager::with_modems(vec![FakeModem::healthy("modem-a")]),
        "/metrics",
    );

    let (status, content_type, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        content_type.as_deref(),
        Some("text/plain; version=0.0.4; charset=utf-8")
    );
    assert!(body.contains("# HELP modemmanager_scrape_success"));
    assert!(body.contains("modemmanager_scrape_success 1"));
    assert!(body.contains("modemmanager_info{version=\"1.20.6\"} 1"));
}

#[tokio::test]
async fn it_serves_metrics_under_a_custom_path() {
    let app = app(FakeManager::with_modems(vec![]), "/mm");

    let (status, _, body) = get(app.clone(), "/mm").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("modemmanager_scrape_success 1"));

    let (status, _, _) = get(app, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn it_reports_healthy_even_when_the_manager_is_unreachable() {
    let app = app(FakeManager::default(), "/metrics");

    let (status, _, body) = get(app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK\n");
}

#[tokio::test]
async fn it_still_scrapes_when_the_manager_is_unreachable() {
    let app = app(FakeManager::default(), "/metrics");

    let (status, _, body) = get(app, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("modemmanager_scrape_success 0"));
    assert!(body.contains("modemmanager_scrape_errors_total"));
}

#[tokio::test]
async fn it_serves_a_landing_page_with_the_configured_surface() {
    let app = app(
        FakeManager::with_modems(vec![FakeModem::healthy("modem-a")]),
        "/metrics",
    );

    let (status, content_type, body) = get(app, "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(body.contains("ModemManager Exporter"));
    assert!(body.contains("ModemManager version: 1.20.6"));
    assert!(body.contains("Signal refresh rate: 5s"));
    assert!(body.contains("href=\"/metrics\""));
}

#[tokio::test]
async fn it_labels_an_unreachable_manager_as_unknown_on_the_landing_page() {
    let app = app(FakeManager::default(), "/metrics");

    let (_, _, body) = get(app, "/").await;

    assert!(body.contains("ModemManager version: unknown"));
}
