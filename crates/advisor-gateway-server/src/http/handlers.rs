// SPDX-License-Identifier: Apache-2.0

use crate::auth::{auth_context_from_headers, AuthContext};
use crate::error::GatewayError;
use crate::AppState;
use advisor_gateway_model::{is_rule_visible, ClusterId, RuleModuleId};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::atomic::Ordering;
use tracing::{info, warn};

pub(crate) fn make_request_id(state: &AppState) -> String {
    let id = state.request_id_seed.fetch_add(1, Ordering::Relaxed);
    format!("req-{id:016x}")
}

pub(crate) fn propagated_request_id(headers: &HeaderMap, state: &AppState) -> String {
    if let Some(raw) = headers.get("x-request-id").and_then(|v| v.to_str().ok()) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    make_request_id(state)
}

pub(crate) fn with_request_id(mut response: Response, request_id: &str) -> Response {
    if let Ok(v) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert("x-request-id", v);
    }
    response
}

fn ok_response(request_id: &str, body: serde_json::Value) -> Response {
    with_request_id(Json(body).into_response(), request_id)
}

fn error_response(request_id: &str, err: &GatewayError) -> Response {
    let status = err.status();
    if status.is_server_error() {
        warn!(request_id = %request_id, status = status.as_u16(), error = %err, "request failed");
    }
    let resp = (status, Json(json!({"status": err.to_string()}))).into_response();
    with_request_id(resp, request_id)
}

/// Identity for endpoints that cannot answer without one.
fn require_auth(headers: &HeaderMap) -> Result<AuthContext, GatewayError> {
    auth_context_from_headers(headers)
        .ok_or_else(|| GatewayError::Unauthorized("authentication required".to_string()))
}

pub(crate) async fn healthz_handler() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub(crate) async fn readyz_handler(State(state): State<AppState>) -> Response {
    match state.content.get() {
        Some(snapshot) => Json(json!({
            "status": "ok",
            "content_generation": snapshot.generation(),
            "rules": snapshot.len(),
        }))
        .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "rule content not loaded yet"})),
        )
            .into_response(),
    }
}

pub(crate) async fn report_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(cluster_id): Path<String>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/report/{cluster_id}", "request start");
    let auth = match require_auth(&headers) {
        Ok(auth) => auth,
        Err(e) => return error_response(&request_id, &e),
    };
    let cluster = match ClusterId::parse(&cluster_id) {
        Ok(cluster) => cluster,
        Err(e) => {
            return error_response(&request_id, &GatewayError::Validation(e.to_string()));
        }
    };
    match state
        .enricher
        .enriched_report(auth.org_id, &cluster, &auth.user_id)
        .await
    {
        Ok(report) => ok_response(
            &request_id,
            json!({
                "status": "ok",
                "report": {
                    "meta": {"count": report.len()},
                    "data": report.entries,
                }
            }),
        ),
        Err(e) => error_response(&request_id, &e),
    }
}

pub(crate) async fn content_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/content", "request start");
    let caller_org = auth_context_from_headers(&headers).map(|auth| auth.org_id);
    let Some(snapshot) = state.content.get() else {
        return error_response(&request_id, &GatewayError::ContentNotReady);
    };
    let visible: Vec<_> = snapshot
        .iter()
        .filter(|(_, content)| {
            is_rule_visible(content.visibility, caller_org, state.enricher.policy())
        })
        .map(|(_, content)| content)
        .collect();
    ok_response(
        &request_id,
        json!({
            "status": "ok",
            "content": visible,
        }),
    )
}

pub(crate) async fn overview_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/overview", "request start");
    let auth = match require_auth(&headers) {
        Ok(auth) => auth,
        Err(e) => return error_response(&request_id, &e),
    };
    match state.enricher.overview(auth.org_id, &auth.user_id).await {
        Ok(summary) => ok_response(
            &request_id,
            json!({"status": "ok", "overview": summary}),
        ),
        Err(e) => error_response(&request_id, &e),
    }
}

pub(crate) async fn rules_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    info!(request_id = %request_id, route = "/rules", "request start");
    let caller = auth_context_from_headers(&headers);
    // With gating enabled the listing depends on who asks; an unidentified
    // caller gets 403, not a silently shortened list.
    if state.enricher.policy().internal_gating_enabled && caller.is_none() {
        return error_response(
            &request_id,
            &GatewayError::Forbidden("authentication required to list rules".to_string()),
        );
    }
    let Some(snapshot) = state.content.get() else {
        return error_response(&request_id, &GatewayError::ContentNotReady);
    };
    let caller_org = caller.map(|auth| auth.org_id);
    let rules: Vec<&str> = snapshot
        .iter()
        .filter(|(_, content)| {
            is_rule_visible(content.visibility, caller_org, state.enricher.policy())
        })
        .map(|(module, _)| module.as_str())
        .collect();
    ok_response(&request_id, json!({"rules": rules, "status": "ok"}))
}

pub(crate) async fn rule_content_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(rule_module_id): Path<String>,
) -> Response {
    let request_id = propagated_request_id(&headers, &state);
    info!(
        request_id = %request_id,
        route = "/rules/{rule_module_id}/content",
        "request start"
    );
    let module = match RuleModuleId::parse(&rule_module_id) {
        Ok(module) => module,
        Err(e) => {
            return error_response(&request_id, &GatewayError::Validation(e.to_string()));
        }
    };
    let Some(snapshot) = state.content.get() else {
        return error_response(&request_id, &GatewayError::ContentNotReady);
    };
    let Some(content) = snapshot.get(&module) else {
        return error_response(
            &request_id,
            &GatewayError::NotFound(format!("unknown rule module {module}")),
        );
    };
    let caller_org = auth_context_from_headers(&headers).map(|auth| auth.org_id);
    if !is_rule_visible(content.visibility, caller_org, state.enricher.policy()) {
        return error_response(
            &request_id,
            &GatewayError::Forbidden(format!(
                "organization is not permitted to view rule {module}"
            )),
        );
    }
    ok_response(&request_id, json!({"status": "ok", "content": content}))
}
