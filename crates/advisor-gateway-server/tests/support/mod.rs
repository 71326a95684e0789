// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code)]

use advisor_gateway_model::{
    ClusterId, ErrorKey, OrgId, Report, RuleContent, RuleHit, RuleModuleId, RuleVisibility,
};
use advisor_gateway_server::content::refresh::refresh_once;
use advisor_gateway_server::{
    build_router, AppState, ContentStore, FakeContentBackend, FakeResultsBackend, GatewayConfig,
    InternalOrganizationsConfig,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub fn rule(module: &str, visibility: RuleVisibility, total_risk: u8) -> RuleContent {
    RuleContent {
        module: RuleModuleId::parse(module).expect("module id"),
        title: format!("title:{module}"),
        generic: "generic".to_string(),
        description: "node {node} is degraded".to_string(),
        reason: "reason".to_string(),
        resolution: "resolution".to_string(),
        total_risk,
        likelihood: 2,
        impact: 2,
        publish_date: "2020-04-08 16:31:00".to_string(),
        visibility,
    }
}

pub fn hit(module: &str, key: &str, details: Value) -> RuleHit {
    RuleHit {
        component: RuleModuleId::parse(module).expect("module id"),
        key: ErrorKey::parse(key).expect("error key"),
        details,
    }
}

pub fn cluster(raw: &str) -> ClusterId {
    ClusterId::parse(raw).expect("cluster id")
}

pub fn bearer_token(org_id: u64, user_id: &str) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let claims = URL_SAFE_NO_PAD.encode(
        json!({"org_id": org_id, "user_id": user_id})
            .to_string()
            .as_bytes(),
    );
    format!("{header}.{claims}.signature")
}

pub fn gated_config(allowlist: &[u64]) -> GatewayConfig {
    GatewayConfig {
        internal_organizations: InternalOrganizationsConfig {
            enabled: true,
            org_allowlist: allowlist.iter().copied().map(OrgId).collect(),
        },
        ..GatewayConfig::default()
    }
}

pub struct TestGateway {
    pub addr: SocketAddr,
    pub store: Arc<ContentStore>,
    pub results: Arc<FakeResultsBackend>,
    pub content_backend: Arc<FakeContentBackend>,
}

/// Spawns the gateway over fake backends. The content store starts
/// unpopulated; `prime_rules` stands in for the refresh loop's first tick.
pub async fn spawn_gateway(config: GatewayConfig) -> TestGateway {
    let results = Arc::new(FakeResultsBackend::default());
    let content_backend = Arc::new(FakeContentBackend::default());
    let store = Arc::new(ContentStore::new());
    let state = AppState::new(&config, results.clone(), Arc::clone(&store));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve app");
    });
    TestGateway {
        addr,
        store,
        results,
        content_backend,
    }
}

pub async fn prime_rules(gateway: &TestGateway, rules: Vec<RuleContent>) {
    gateway.content_backend.archive.lock().await.rules = rules;
    assert!(refresh_once(gateway.content_backend.as_ref(), &gateway.store).await);
}

pub async fn seed_report(gateway: &TestGateway, cluster_id: &str, hits: Vec<RuleHit>) {
    gateway
        .results
        .reports
        .lock()
        .await
        .insert(cluster(cluster_id), Report { hits });
}

pub async fn get(addr: SocketAddr, path: &str, token: Option<&str>) -> String {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let auth_line = token
        .map(|t| format!("Authorization: Bearer {t}\r\n"))
        .unwrap_or_default();
    let request =
        format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\n{auth_line}Connection: close\r\n\r\n");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    response
}

pub fn status_line(response: &str) -> &str {
    response.lines().next().unwrap_or_default()
}

pub fn body_json(response: &str) -> Value {
    let body = response
        .split("\r\n\r\n")
        .nth(1)
        .expect("response has a body");
    serde_json::from_str(body).expect("body is JSON")
}
