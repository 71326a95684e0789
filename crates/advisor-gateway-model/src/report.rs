use crate::types::{ErrorKey, RuleModuleId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One entry in a results-backend report: a rule that fired for a cluster.
/// Produced externally, read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    pub component: RuleModuleId,
    pub key: ErrorKey,
    #[serde(default)]
    pub details: Value,
}

/// Ordered rule hits for one (organization, cluster) pair, in the order the
/// results backend reported them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub hits: Vec<RuleHit>,
}

/// A rule hit joined with its catalog entry, as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedRuleHit {
    pub rule_id: RuleModuleId,
    pub key: ErrorKey,
    pub title: String,
    pub description: String,
    pub total_risk: u8,
    pub details: Value,
}

/// Caller-visible join result; preserves the input report's order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedReport {
    pub entries: Vec<EnrichedRuleHit>,
}

impl EnrichedReport {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Organization-level aggregate over enriched cluster reports. Counters are
/// keyed by organization, not cluster, and fold commutatively.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewSummary {
    pub clusters_hit: usize,
    pub distinct_rules_hit: usize,
    pub hit_by_risk: BTreeMap<u8, usize>,
}

/// Substitutes `{name}` placeholders in a description template from the
/// hit's details object. Strings are inserted verbatim, other values in
/// their compact JSON form. Unknown placeholders stay verbatim so broken
/// content is visible instead of silently blanked.
#[must_use]
pub fn render_template(template: &str, params: &Value) -> String {
    let Some(map) = params.as_object() else {
        return template.to_string();
    };
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match map.get(name) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(other) => out.push_str(&other.to_string()),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
