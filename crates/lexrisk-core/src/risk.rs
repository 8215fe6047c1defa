//! Risk levels and per-jurisdiction risk rules.
//!
//! A clause starts at the base level its jurisdiction assigns to the
//! predicted clause type and is raised one step per elevating risk-factor
//! match, saturating at High.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Risk level for a clause or a whole contract.
///
/// Total order: `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Next level up, saturating at High.
    pub fn step_up(self) -> Self {
        match self {
            Self::Low => Self::Medium,
            Self::Medium | Self::High => Self::High,
        }
    }
}

/// A named risk factor matched against clause text by case-insensitive
/// keyword search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    /// Keywords checked against lowercased clause text.
    pub keywords: Vec<String>,
    /// Whether a match raises the clause risk by one step.
    #[serde(default = "default_elevates")]
    pub elevates: bool,
}

fn default_elevates() -> bool {
    true
}

impl RiskFactor {
    /// Whether any keyword occurs in `text_lower`. The caller lowercases
    /// the clause text once per scan.
    pub fn matches(&self, text_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|kw| text_lower.contains(kw.to_lowercase().as_str()))
    }
}

/// Risk rules for one jurisdiction: a base level per clause type plus
/// keyword risk factors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskRules {
    /// clause type → base risk level. Unlisted types default to Low.
    #[serde(default)]
    pub base: BTreeMap<String, RiskLevel>,
    #[serde(default)]
    pub factors: Vec<RiskFactor>,
}

impl RiskRules {
    /// Base risk level for a clause type, Low if unlisted.
    pub fn base_level(&self, clause_type: &str) -> RiskLevel {
        self.base.get(clause_type).copied().unwrap_or_default()
    }
}
