use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError(pub String);

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ValidationError {}

pub const RULE_MODULE_MAX_LEN: usize = 256;
pub const ERROR_KEY_MAX_LEN: usize = 64;
pub const CLUSTER_ID_MAX_LEN: usize = 64;
pub const USER_ID_MAX_LEN: usize = 128;

/// Dotted module path naming one diagnostic rule, e.g.
/// `ccx_rules_ocp.external.rules.node_installer_degraded`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct RuleModuleId(String);

impl RuleModuleId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("rule module must not be empty".to_string()));
        }
        if s.len() > RULE_MODULE_MAX_LEN {
            return Err(ValidationError(format!(
                "rule module exceeds max length {RULE_MODULE_MAX_LEN}"
            )));
        }
        for segment in s.split('.') {
            if segment.is_empty() {
                return Err(ValidationError(
                    "rule module must not contain empty segments".to_string(),
                ));
            }
            if !segment
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            {
                return Err(ValidationError(
                    "rule module segments must match [a-z0-9_]+".to_string(),
                ));
            }
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for RuleModuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sub-case discriminator within a rule module, e.g. `NODE_INSTALLER_DEGRADED`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct ErrorKey(String);

impl ErrorKey {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("error key must not be empty".to_string()));
        }
        if s.len() > ERROR_KEY_MAX_LEN {
            return Err(ValidationError(format!(
                "error key exceeds max length {ERROR_KEY_MAX_LEN}"
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(ValidationError(
                "error key must match [A-Z0-9_]+".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ErrorKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tenant identifier under which clusters and users are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
pub struct OrgId(pub u64);

impl Display for OrgId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(transparent)]
#[non_exhaustive]
pub struct ClusterId(String);

impl ClusterId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("cluster id must not be empty".to_string()));
        }
        if s.len() > CLUSTER_ID_MAX_LEN {
            return Err(ValidationError(format!(
                "cluster id exceeds max length {CLUSTER_ID_MAX_LEN}"
            )));
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ValidationError(
                "cluster id must match [a-z0-9-]+".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClusterId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[non_exhaustive]
pub struct UserId(String);

impl UserId {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(ValidationError("user id must not be empty".to_string()));
        }
        if s.len() > USER_ID_MAX_LEN {
            return Err(ValidationError(format!(
                "user id exceeds max length {USER_ID_MAX_LEN}"
            )));
        }
        if s.chars().any(char::is_whitespace) {
            return Err(ValidationError(
                "user id must not contain whitespace".to_string(),
            ));
        }
        Ok(Self(s.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_module_id_accepts_dotted_lowercase_paths() {
        let id = RuleModuleId::parse("ccx_rules_ocp.external.rules.node_installer_degraded")
            .expect("valid module id");
        assert_eq!(
            id.as_str(),
            "ccx_rules_ocp.external.rules.node_installer_degraded"
        );
    }

    #[test]
    fn rule_module_id_rejects_bad_input() {
        assert!(RuleModuleId::parse("").is_err());
        assert!(RuleModuleId::parse("foo..bar").is_err());
        assert!(RuleModuleId::parse(".leading").is_err());
        assert!(RuleModuleId::parse("trailing.").is_err());
        assert!(RuleModuleId::parse("Upper.Case").is_err());
        assert!(RuleModuleId::parse("spa ce.rules").is_err());
    }

    #[test]
    fn rule_module_id_orders_lexicographically() {
        let a = RuleModuleId::parse("ccx_rules_ocp.external.rules.a").expect("a");
        let b = RuleModuleId::parse("foo.rules.internal.bar").expect("b");
        assert!(a < b);
    }

    #[test]
    fn error_key_requires_uppercase_identifier() {
        assert!(ErrorKey::parse("NODE_INSTALLER_DEGRADED").is_ok());
        assert!(ErrorKey::parse("lowercase").is_err());
        assert!(ErrorKey::parse("").is_err());
    }

    #[test]
    fn cluster_id_accepts_uuid_shaped_input() {
        let id = ClusterId::parse("34c3ecc5-624a-49a5-bab8-4fdc5e51a266").expect("uuid cluster");
        assert_eq!(id.as_str(), "34c3ecc5-624a-49a5-bab8-4fdc5e51a266");
        assert!(ClusterId::parse("NOT VALID").is_err());
        assert!(ClusterId::parse("").is_err());
    }
}
