//! Rule catalog snapshot model: the wire archive the content backend emits
//! and the immutable directory built from it.

use crate::types::RuleModuleId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleVisibility {
    External,
    Internal,
}

/// One catalog entry. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleContent {
    pub module: RuleModuleId,
    pub title: String,
    pub generic: String,
    pub description: String,
    pub reason: String,
    pub resolution: String,
    pub total_risk: u8,
    pub likelihood: u8,
    pub impact: u8,
    pub publish_date: String,
    pub visibility: RuleVisibility,
}

/// Wire type for the content backend's "all content" endpoint. The backend
/// serializes this with a compact binary encoding; the layout is an external
/// contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentArchive {
    pub rules: Vec<RuleContent>,
}

/// Full catalog snapshot keyed by rule module id. Built wholesale from one
/// fetch, never mutated in place; superseded snapshots are dropped once the
/// last reader releases them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleContentDirectory {
    rules: BTreeMap<RuleModuleId, RuleContent>,
    generation: String,
}

impl RuleContentDirectory {
    /// Builds a directory from a flat rule list. Duplicate module ids keep
    /// the last entry; callers compare `len()` against the input length to
    /// detect duplicates worth logging. `generation` identifies the source
    /// payload for observability only.
    #[must_use]
    pub fn from_rules(rules: Vec<RuleContent>, generation: String) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| (rule.module.clone(), rule))
            .collect();
        Self { rules, generation }
    }

    #[must_use]
    pub fn get(&self, module: &RuleModuleId) -> Option<&RuleContent> {
        self.rules.get(module)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Module ids in ascending order.
    pub fn module_ids(&self) -> impl Iterator<Item = &RuleModuleId> {
        self.rules.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RuleModuleId, &RuleContent)> {
        self.rules.iter()
    }

    #[must_use]
    pub fn generation(&self) -> &str {
        &self.generation
    }
}
