//! Externally-supplied configuration: analysis thresholds and jurisdiction
//! profile specs, loaded from JSON at process start.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::profile::BackendBinding;
use crate::risk::RiskRules;

/// Tunable thresholds for the analysis pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum top confidence for accepting a predicted label; below it the
    /// prediction becomes Uncategorized.
    pub acceptance_threshold: f32,
    /// Below this confidence a clause's risk is capped at Medium.
    pub low_confidence_threshold: f32,
    /// Fragments shorter than this merge into the following fragment.
    pub min_clause_len: usize,
    /// Paragraphs longer than this split at sentence boundaries.
    pub long_paragraph_len: usize,
    pub advisory: AdvisoryConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: 0.5,
            low_confidence_threshold: 0.4,
            min_clause_len: 50,
            long_paragraph_len: 500,
            advisory: AdvisoryConfig::default(),
        }
    }
}

/// Advisory boundary settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryConfig {
    /// Base URL of the narrative service; empty disables remote calls.
    pub endpoint: String,
    pub timeout_secs: u64,
    pub per_minute_budget: u32,
}

impl Default for AdvisoryConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_secs: 30,
            per_minute_budget: 20,
        }
    }
}

/// One jurisdiction profile as written in configuration.
///
/// Validated into a [`JurisdictionProfile`](crate::profile::JurisdictionProfile)
/// at registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSpec {
    pub id: String,
    pub clause_types: Vec<String>,
    #[serde(default)]
    pub mandatory: Vec<String>,
    #[serde(default)]
    pub risk_rules: RiskRules,
    #[serde(default)]
    pub backend: BackendBinding,
}

/// Top-level shape of the profiles JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfilesFile {
    pub profiles: Vec<ProfileSpec>,
    /// Lexicon for the shared fallback backend.
    #[serde(default)]
    pub fallback_lexicon: BTreeMap<String, Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;

    #[test]
    fn analysis_config_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.acceptance_threshold, 0.5);
        assert_eq!(config.low_confidence_threshold, 0.4);
        assert_eq!(config.min_clause_len, 50);
        assert_eq!(config.long_paragraph_len, 500);
        assert_eq!(config.advisory.timeout_secs, 30);
        assert_eq!(config.advisory.per_minute_budget, 20);
        assert!(config.advisory.endpoint.is_empty());
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"acceptance_threshold": 0.6}"#).unwrap();
        assert_eq!(config.acceptance_threshold, 0.6);
        assert_eq!(config.min_clause_len, 50);
    }

    #[test]
    fn profiles_file_parses() {
        let json = r#"{
            "profiles": [
                {
                    "id": "us",
                    "clause_types": ["Termination", "Payment", "Liability"],
                    "mandatory": ["Payment"],
                    "risk_rules": {
                        "base": {"Liability": "high", "Termination": "medium"},
                        "factors": [
                            {"name": "unlimited liability", "keywords": ["unlimited liability"]}
                        ]
                    },
                    "backend": {
                        "kind": "lexicon",
                        "lexicon": {"Termination": ["terminate"], "Payment": ["payment"]}
                    }
                }
            ],
            "fallback_lexicon": {"Payment": ["invoice", "payment"]}
        }"#;

        let file: ProfilesFile = serde_json::from_str(json).unwrap();
        assert_eq!(file.profiles.len(), 1);
        let spec = &file.profiles[0];
        assert_eq!(spec.id, "us");
        assert_eq!(spec.risk_rules.base_level("Liability"), RiskLevel::High);
        assert_eq!(spec.risk_rules.factors.len(), 1);
        assert!(matches!(spec.backend, BackendBinding::Lexicon { .. }));
        assert_eq!(file.fallback_lexicon["Payment"].len(), 2);
    }

    #[test]
    fn fallback_lexicon_defaults_empty() {
        let file: ProfilesFile = serde_json::from_str(r#"{"profiles": []}"#).unwrap();
        assert!(file.profiles.is_empty());
        assert!(file.fallback_lexicon.is_empty());
    }
}
