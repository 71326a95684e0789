use crate::content::RuleVisibility;
use crate::types::OrgId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Process-wide internal-rule gating policy. When `internal_gating_enabled`
/// is false the allowlist is ignored entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgPolicy {
    pub internal_gating_enabled: bool,
    pub allowed_orgs: BTreeSet<OrgId>,
}

impl OrgPolicy {
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn allowlist(orgs: impl IntoIterator<Item = OrgId>) -> Self {
        Self {
            internal_gating_enabled: true,
            allowed_orgs: orgs.into_iter().collect(),
        }
    }
}

/// The single visibility decision. `caller_org` is `None` when the request
/// carried no authenticated identity; an anonymous caller is never granted
/// internal visibility.
#[must_use]
pub fn is_rule_visible(
    visibility: RuleVisibility,
    caller_org: Option<OrgId>,
    policy: &OrgPolicy,
) -> bool {
    if !policy.internal_gating_enabled {
        return true;
    }
    match visibility {
        RuleVisibility::External => true,
        RuleVisibility::Internal => {
            caller_org.is_some_and(|org| policy.allowed_orgs.contains(&org))
        }
    }
}
