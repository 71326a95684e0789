//! The join between raw rule hits and the current content snapshot, and the
//! per-organization overview fold built on top of it.

use crate::content::ContentStore;
use crate::error::GatewayError;
use crate::upstream::ResultsBackend;
use advisor_gateway_model::{
    is_rule_visible, render_template, ClusterId, EnrichedReport, EnrichedRuleHit, OrgId,
    OrgPolicy, OverviewSummary, RuleModuleId, UserId,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct ReportEnricher {
    results: Arc<dyn ResultsBackend>,
    content: Arc<ContentStore>,
    policy: OrgPolicy,
}

impl ReportEnricher {
    #[must_use]
    pub fn new(
        results: Arc<dyn ResultsBackend>,
        content: Arc<ContentStore>,
        policy: OrgPolicy,
    ) -> Self {
        Self {
            results,
            content,
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> &OrgPolicy {
        &self.policy
    }

    /// Joins a cluster's raw report against the current snapshot. The whole
    /// join runs against one pinned snapshot; output order equals the
    /// results backend's order. Hits without a catalog entry and hits the
    /// policy hides are dropped, never errors.
    pub async fn enriched_report(
        &self,
        org: OrgId,
        cluster: &ClusterId,
        user: &UserId,
    ) -> Result<EnrichedReport, GatewayError> {
        let directory = self.content.get().ok_or(GatewayError::ContentNotReady)?;
        let report = self.results.report(org, cluster, user).await?;

        let mut entries = Vec::with_capacity(report.hits.len());
        for hit in report.hits {
            let Some(content) = directory.get(&hit.component) else {
                debug!(module = %hit.component, "rule hit without catalog entry dropped");
                continue;
            };
            if !is_rule_visible(content.visibility, Some(org), &self.policy) {
                continue;
            }
            entries.push(EnrichedRuleHit {
                rule_id: hit.component,
                key: hit.key,
                title: content.title.clone(),
                description: render_template(&content.description, &hit.details),
                total_risk: content.total_risk,
                details: hit.details,
            });
        }
        Ok(EnrichedReport { entries })
    }

    /// Folds every cluster of an organization into one summary. A failing
    /// cluster is logged and excluded; the request fails only when every
    /// cluster of a non-empty list fails. The fold is a commutative set
    /// union, so fan-out order cannot change the result.
    pub async fn overview(
        &self,
        org: OrgId,
        user: &UserId,
    ) -> Result<OverviewSummary, GatewayError> {
        if self.content.get().is_none() {
            return Err(GatewayError::ContentNotReady);
        }
        let clusters = self.results.clusters_for_organization(org).await?;

        let mut failed = 0usize;
        let mut clusters_hit = 0usize;
        let mut rules_hit: BTreeSet<RuleModuleId> = BTreeSet::new();
        let mut rules_by_risk: BTreeMap<u8, BTreeSet<RuleModuleId>> = BTreeMap::new();
        for cluster in &clusters {
            match self.enriched_report(org, cluster, user).await {
                Ok(report) => {
                    if !report.is_empty() {
                        clusters_hit += 1;
                    }
                    for entry in report.entries {
                        rules_by_risk
                            .entry(entry.total_risk)
                            .or_default()
                            .insert(entry.rule_id.clone());
                        rules_hit.insert(entry.rule_id);
                    }
                }
                Err(e) => {
                    failed += 1;
                    warn!(cluster = %cluster, error = %e, "cluster excluded from overview");
                }
            }
        }
        if !clusters.is_empty() && failed == clusters.len() {
            return Err(GatewayError::UpstreamUnavailable(format!(
                "all {failed} clusters failed"
            )));
        }
        Ok(OverviewSummary {
            clusters_hit,
            distinct_rules_hit: rules_hit.len(),
            hit_by_risk: rules_by_risk
                .into_iter()
                .map(|(risk, rules)| (risk, rules.len()))
                .collect(),
        })
    }
}
