#![forbid(unsafe_code)]

//! Aggregation gateway in front of the results and content backends: joins
//! per-cluster rule hits with a periodically refreshed rule catalog and
//! enforces organization-scoped visibility of internal rules.

use axum::routing::get;
use axum::Router;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod content;
pub mod enrich;
pub mod error;
pub mod http;
pub mod upstream;

pub use config::{validate_startup_config, GatewayConfig, InternalOrganizationsConfig};
pub use content::{ContentRefresher, ContentStore};
pub use enrich::ReportEnricher;
pub use error::GatewayError;
pub use upstream::{
    ContentBackend, FakeContentBackend, FakeResultsBackend, HttpContentBackend,
    HttpResultsBackend, ResultsBackend,
};

pub const CRATE_NAME: &str = "advisor-gateway-server";

#[derive(Clone)]
pub struct AppState {
    pub content: Arc<ContentStore>,
    pub enricher: Arc<ReportEnricher>,
    pub(crate) request_id_seed: Arc<AtomicU64>,
}

impl AppState {
    /// Wires the request-path components. The content store is shared with
    /// the refresh loop the entry point owns; no hidden process-wide state.
    #[must_use]
    pub fn new(
        config: &GatewayConfig,
        results: Arc<dyn ResultsBackend>,
        content: Arc<ContentStore>,
    ) -> Self {
        let enricher = Arc::new(ReportEnricher::new(
            results,
            Arc::clone(&content),
            config.org_policy(),
        ));
        Self {
            content,
            enricher,
            request_id_seed: Arc::new(AtomicU64::new(1)),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(http::handlers::healthz_handler))
        .route("/readyz", get(http::handlers::readyz_handler))
        .route("/report/:cluster_id", get(http::handlers::report_handler))
        .route("/content", get(http::handlers::content_handler))
        .route("/overview", get(http::handlers::overview_handler))
        .route("/rules", get(http::handlers::rules_handler))
        .route(
            "/rules/:rule_module_id/content",
            get(http::handlers::rule_content_handler),
        )
        .with_state(state)
}
