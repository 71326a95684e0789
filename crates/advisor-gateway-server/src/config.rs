use advisor_gateway_model::{OrgId, OrgPolicy};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize)]
pub struct InternalOrganizationsConfig {
    pub enabled: bool,
    pub org_allowlist: BTreeSet<OrgId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayConfig {
    /// Base URL of the results backend (aggregator), without trailing slash.
    pub aggregator_base_endpoint: String,
    /// Base URL of the content backend, without trailing slash.
    pub content_base_endpoint: String,
    pub internal_organizations: InternalOrganizationsConfig,
    /// Interval between content snapshot refresh attempts.
    pub refresh_interval: Duration,
    /// Per-call deadline for outbound backend requests.
    pub upstream_timeout: Duration,
    pub listen_addr: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            aggregator_base_endpoint: "http://localhost:8080/api/v1".to_string(),
            content_base_endpoint: "http://localhost:8082/api/v1".to_string(),
            internal_organizations: InternalOrganizationsConfig::default(),
            refresh_interval: Duration::from_secs(300),
            upstream_timeout: Duration::from_secs(10),
            listen_addr: "0.0.0.0:8089".to_string(),
        }
    }
}

impl GatewayConfig {
    /// The policy value object handed to the enrichment engine; the rest of
    /// the config never reaches visibility decisions.
    #[must_use]
    pub fn org_policy(&self) -> OrgPolicy {
        OrgPolicy {
            internal_gating_enabled: self.internal_organizations.enabled,
            allowed_orgs: self.internal_organizations.org_allowlist.clone(),
        }
    }
}

pub fn validate_startup_config(cfg: &GatewayConfig) -> Result<(), String> {
    if cfg.aggregator_base_endpoint.trim().is_empty() {
        return Err("aggregator base endpoint must not be empty".to_string());
    }
    if cfg.content_base_endpoint.trim().is_empty() {
        return Err("content base endpoint must not be empty".to_string());
    }
    if cfg.refresh_interval.is_zero() {
        return Err("refresh interval must be > 0".to_string());
    }
    if cfg.upstream_timeout.is_zero() {
        return Err("upstream timeout must be > 0".to_string());
    }
    if cfg.internal_organizations.enabled && cfg.internal_organizations.org_allowlist.is_empty() {
        return Err(
            "internal organizations enabled requires a non-empty org allowlist".to_string(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_validation_rejects_zero_durations() {
        let cfg = GatewayConfig {
            refresh_interval: Duration::ZERO,
            ..GatewayConfig::default()
        };
        let err = validate_startup_config(&cfg).expect_err("zero refresh interval");
        assert!(err.contains("refresh interval"));

        let cfg = GatewayConfig {
            upstream_timeout: Duration::ZERO,
            ..GatewayConfig::default()
        };
        let err = validate_startup_config(&cfg).expect_err("zero timeout");
        assert!(err.contains("timeout"));
    }

    #[test]
    fn startup_validation_enforces_allowlist_contract() {
        let cfg = GatewayConfig {
            internal_organizations: InternalOrganizationsConfig {
                enabled: true,
                org_allowlist: BTreeSet::new(),
            },
            ..GatewayConfig::default()
        };
        let err = validate_startup_config(&cfg).expect_err("empty allowlist");
        assert!(err.contains("allowlist"));

        let cfg = GatewayConfig {
            internal_organizations: InternalOrganizationsConfig {
                enabled: true,
                org_allowlist: [OrgId(1)].into_iter().collect(),
            },
            ..GatewayConfig::default()
        };
        validate_startup_config(&cfg).expect("valid config");
    }

    #[test]
    fn org_policy_mirrors_internal_organizations_config() {
        let cfg = GatewayConfig {
            internal_organizations: InternalOrganizationsConfig {
                enabled: true,
                org_allowlist: [OrgId(7), OrgId(9)].into_iter().collect(),
            },
            ..GatewayConfig::default()
        };
        let policy = cfg.org_policy();
        assert!(policy.internal_gating_enabled);
        assert!(policy.allowed_orgs.contains(&OrgId(7)));
        assert!(!policy.allowed_orgs.contains(&OrgId(8)));
    }
}
