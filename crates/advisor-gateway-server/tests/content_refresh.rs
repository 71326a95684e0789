// SPDX-License-Identifier: Apache-2.0

mod support;

use advisor_gateway_model::RuleVisibility;
use advisor_gateway_server::{ContentRefresher, GatewayConfig};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use support::{body_json, get, rule, spawn_gateway};

/// Drives the full background path: the refresh loop fetches from the
/// content backend and running request handlers pick up each new snapshot
/// without any per-request upstream call.
#[tokio::test]
async fn running_server_picks_up_refreshed_snapshots() {
    let gateway = spawn_gateway(GatewayConfig::default()).await;
    gateway.content_backend.archive.lock().await.rules =
        vec![rule("a.rules.one", RuleVisibility::External, 1)];

    let refresher = ContentRefresher::new();
    refresher
        .start(
            Duration::from_millis(20),
            gateway.content_backend.clone(),
            Arc::clone(&gateway.store),
        )
        .await;

    // First tick fires immediately; wait for it to land.
    tokio::time::sleep(Duration::from_millis(60)).await;
    let response = get(gateway.addr, "/rules", None).await;
    assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
    assert_eq!(body_json(&response)["rules"], json!(["a.rules.one"]));

    // A new catalog publication reaches request handlers on the next tick.
    gateway.content_backend.archive.lock().await.rules = vec![
        rule("a.rules.one", RuleVisibility::External, 1),
        rule("a.rules.two", RuleVisibility::External, 2),
    ];
    tokio::time::sleep(Duration::from_millis(80)).await;
    let response = get(gateway.addr, "/rules", None).await;
    assert_eq!(
        body_json(&response)["rules"],
        json!(["a.rules.one", "a.rules.two"])
    );

    // A content outage keeps the last good snapshot serving.
    gateway.content_backend.fail.store(true, Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(80)).await;
    let response = get(gateway.addr, "/rules", None).await;
    assert_eq!(
        body_json(&response)["rules"],
        json!(["a.rules.one", "a.rules.two"])
    );

    refresher.stop().await;
    let calls_at_stop = gateway.content_backend.fetch_calls.load(Ordering::Relaxed);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(
        gateway.content_backend.fetch_calls.load(Ordering::Relaxed),
        calls_at_stop,
        "stop() leaves no detached refresh work behind"
    );
}
