#![forbid(unsafe_code)]

use advisor_gateway_model::OrgId;
use advisor_gateway_server::{
    build_router, validate_startup_config, AppState, ContentRefresher, ContentStore,
    GatewayConfig, HttpContentBackend, HttpResultsBackend, InternalOrganizationsConfig,
};
use std::collections::BTreeSet;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_duration_secs(name: &str, default_secs: u64) -> Duration {
    Duration::from_secs(env_u64(name, default_secs))
}

fn env_org_allowlist(name: &str) -> BTreeSet<OrgId> {
    env::var(name)
        .unwrap_or_default()
        .split(',')
        .filter_map(|s| s.trim().parse::<u64>().ok())
        .map(OrgId)
        .collect()
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let defaults = GatewayConfig::default();
    let config = GatewayConfig {
        aggregator_base_endpoint: env::var("ADVISOR_AGGREGATOR_ENDPOINT")
            .unwrap_or(defaults.aggregator_base_endpoint),
        content_base_endpoint: env::var("ADVISOR_CONTENT_ENDPOINT")
            .unwrap_or(defaults.content_base_endpoint),
        internal_organizations: InternalOrganizationsConfig {
            enabled: env_bool("ADVISOR_INTERNAL_ORGS_ENABLED", false),
            org_allowlist: env_org_allowlist("ADVISOR_INTERNAL_ORGS_ALLOWLIST"),
        },
        refresh_interval: env_duration_secs("ADVISOR_REFRESH_INTERVAL_SECS", 300),
        upstream_timeout: env_duration_secs("ADVISOR_UPSTREAM_TIMEOUT_SECS", 10),
        listen_addr: env::var("ADVISOR_LISTEN_ADDR").unwrap_or(defaults.listen_addr),
    };
    validate_startup_config(&config)?;

    let results = Arc::new(HttpResultsBackend::new(
        &config.aggregator_base_endpoint,
        config.upstream_timeout,
    ));
    let content_backend = Arc::new(HttpContentBackend::new(
        &config.content_base_endpoint,
        config.upstream_timeout,
    ));
    let store = Arc::new(ContentStore::new());
    let refresher = ContentRefresher::new();
    refresher
        .start(
            config.refresh_interval,
            content_backend,
            Arc::clone(&store),
        )
        .await;

    let state = AppState::new(&config, results, store);
    let app = build_router(state);

    let listener = TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| format!("bind {} failed: {e}", config.listen_addr))?;
    info!("advisor-gateway listening on {}", config.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))?;

    // Serve returned: tear the refresh loop down before exiting so no
    // background fetch outlives the process's useful life.
    refresher.stop().await;
    Ok(())
}
