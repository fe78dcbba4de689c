//! Exporter regression tests.
//!
//! Drives the full router → collector → coordinator → fetcher → deriver
//! chain against an in-memory Collins backend.

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tower::ServiceExt;

use collins_api::build_router;
use collins_client::{AssetRecord, AssetStatus, InMemoryFinder};
use collins_metrics::{Collector, FetchOptions, ScrapeCoordinator};

fn inventory() -> Vec<AssetRecord> {
    vec![
        AssetRecord {
            tag: "ABCD1234".to_string(),
            status: AssetStatus::Unallocated,
            state: 5,
            nodeclass: "web-server".to_string(),
            ipmi_address: String::new(),
            addresses: Vec::new(),
        },
        AssetRecord {
            tag: "EFGH5678".to_string(),
            status: AssetStatus::Allocated,
            state: 2,
            nodeclass: "db".to_string(),
            ipmi_address: "10.1.0.2".to_string(),
            addresses: vec!["10.0.0.2".to_string(), "10.0.0.3".to_string()],
        },
        AssetRecord {
            tag: "IJKL9012".to_string(),
            status: AssetStatus::Maintenance,
            state: 0,
            nodeclass: "db".to_string(),
            ipmi_address: "10.1.0.3".to_string(),
            addresses: vec!["10.0.0.4".to_string()],
        },
    ]
}

/// Router backed by `finder`, one asset per page.
fn exporter(finder: InMemoryFinder) -> (Router, watch::Sender<bool>) {
    let (tx, rx) = watch::channel(false);
    let options = FetchOptions {
        page_size: 1,
        ..FetchOptions::default()
    };
    let (coordinator, _handle) = ScrapeCoordinator::spawn(finder, options, rx);
    (build_router(Collector::new(coordinator), "/metrics"), tx)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, String) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn sample(body: &str, series: &str) -> Option<f64> {
    body.lines()
        .filter(|l| !l.starts_with('#'))
        .find_map(|l| l.strip_prefix(series)?.strip_prefix(' ')?.parse().ok())
}

#[tokio::test]
async fn metrics_endpoint_exports_every_asset() {
    let (router, _tx) = exporter(InMemoryFinder::new(inventory()));

    let (status, body) = get(&router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(
        sample(&body, "collins_asset_status{tag=\"ABCD1234\",status=\"Unallocated\"}"),
        Some(1.0)
    );
    assert_eq!(
        sample(&body, "collins_asset_status{tag=\"ABCD1234\",status=\"Allocated\"}"),
        Some(0.0)
    );
    assert_eq!(sample(&body, "collins_asset_state{tag=\"ABCD1234\"}"), Some(5.0));
    assert_eq!(
        sample(
            &body,
            "collins_asset_details{tag=\"ABCD1234\",nodeclass=\"web-server\",ipmi_address=\"\",primary_address=\"\"}"
        ),
        Some(1.0)
    );
    assert_eq!(
        sample(
            &body,
            "collins_asset_details{tag=\"EFGH5678\",nodeclass=\"db\",ipmi_address=\"10.1.0.2\",primary_address=\"10.0.0.2\"}"
        ),
        Some(1.0)
    );
    assert_eq!(sample(&body, "collins_up"), Some(1.0));
    assert_eq!(sample(&body, "collins_scrapes_total"), Some(1.0));
    assert_eq!(sample(&body, "collins_scrape_failures_total"), Some(0.0));

    // 3 assets × 9 statuses, exactly one set per asset.
    let status_lines: Vec<_> = body
        .lines()
        .filter(|l| l.starts_with("collins_asset_status{"))
        .collect();
    assert_eq!(status_lines.len(), 27);
    assert_eq!(status_lines.iter().filter(|l| l.ends_with(" 1")).count(), 3);
}

#[tokio::test]
async fn backend_failure_mid_pagination_reports_down() {
    let finder = InMemoryFinder::new(inventory());
    let (router, _tx) = exporter(finder.clone());

    let (_, healthy) = get(&router, "/metrics").await;
    assert_eq!(sample(&healthy, "collins_up"), Some(1.0));

    finder.fail_on_page(Some(1));
    let (status, body) = get(&router, "/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sample(&body, "collins_up"), Some(0.0));
    assert_eq!(sample(&body, "collins_scrapes_total"), Some(2.0));
    assert_eq!(sample(&body, "collins_scrape_failures_total"), Some(1.0));
    assert!(!body.contains("collins_asset_status{"));
    assert!(!body.contains("collins_asset_details{"));

    finder.fail_on_page(None);
    let (_, recovered) = get(&router, "/metrics").await;
    assert_eq!(sample(&recovered, "collins_up"), Some(1.0));
    assert_eq!(sample(&recovered, "collins_scrapes_total"), Some(3.0));
    assert_eq!(sample(&recovered, "collins_scrape_failures_total"), Some(1.0));
}

#[tokio::test]
async fn concurrent_scrapes_are_coalesced() {
    let finder = InMemoryFinder::new(inventory()).with_delay(Duration::from_millis(50));
    let (router, _tx) = exporter(finder.clone());

    let mut scrapes = JoinSet::new();
    for _ in 0..8 {
        let router = router.clone();
        scrapes.spawn(async move { get(&router, "/metrics").await });
    }

    let mut totals = Vec::new();
    while let Some(res) = scrapes.join_next().await {
        let (status, body) = res.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(sample(&body, "collins_up"), Some(1.0));
        totals.push(sample(&body, "collins_scrapes_total").unwrap());
    }

    // 8 scrapes, far fewer Collins fetches.
    let pages = finder.pages(1);
    assert!(finder.calls() >= pages);
    assert!(finder.calls() <= 2 * pages, "calls: {}", finder.calls());
    assert!(totals.iter().all(|t| *t <= 2.0));
}

#[tokio::test]
async fn landing_page_links_to_telemetry_path() {
    let (tx, rx) = watch::channel(false);
    let (coordinator, _handle) =
        ScrapeCoordinator::spawn(InMemoryFinder::new(Vec::new()), FetchOptions::default(), rx);
    let router = build_router(Collector::new(coordinator), "probe/metrics");

    let (status, body) = get(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("<a href='/probe/metrics'>Metrics</a>"));

    let (status, _) = get(&router, "/probe/metrics").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&router, "/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    drop(tx);
}

#[tokio::test]
async fn shutdown_turns_metrics_into_503() {
    let (router, tx) = exporter(InMemoryFinder::new(inventory()));
    tx.send(true).unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;

    let (status, body) = get(&router, "/metrics").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body.contains("not running"));
}
