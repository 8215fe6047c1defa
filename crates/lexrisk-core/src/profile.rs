//! Jurisdiction profiles and the startup-time profile registry.
//!
//! A profile carries everything jurisdiction-specific: the clause-type
//! taxonomy, the mandatory clause list, risk rules, and the classification
//! backend binding. Profiles are registered once at process start from
//! configuration and never mutated afterwards; the registry is shared
//! read-only across requests.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::ProfileSpec;
use crate::risk::RiskRules;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("duplicate jurisdiction: {0}")]
    DuplicateJurisdiction(String),

    #[error("unknown jurisdiction: {0}")]
    UnknownJurisdiction(String),

    #[error("jurisdiction {id}: empty clause-type taxonomy")]
    EmptyTaxonomy { id: String },

    #[error("jurisdiction {id}: duplicate clause type {label:?}")]
    DuplicateClauseType { id: String, label: String },

    #[error("jurisdiction {id}: mandatory type {label:?} not in taxonomy")]
    MandatoryNotInTaxonomy { id: String, label: String },

    #[error("jurisdiction {id}: lexicon label {label:?} not in taxonomy")]
    LexiconLabelNotInTaxonomy { id: String, label: String },
}

/// Binding from a jurisdiction to its classification backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendBinding {
    /// Built-in keyword backend over a label → keywords lexicon.
    Lexicon {
        lexicon: BTreeMap<String, Vec<String>>,
    },
    /// ONNX sentence-embedding backend with per-label centroid vectors.
    Semantic {
        model_dir: PathBuf,
        centroids: PathBuf,
    },
    /// No dedicated backend; the shared fallback serves this jurisdiction.
    #[default]
    Fallback,
}

/// The taxonomy, mandatory-clause set, and risk rules governing one legal
/// system, plus its classification backend binding.
///
/// Immutable after registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionProfile {
    pub id: String,
    /// Ordered, unique clause-type labels.
    pub clause_types: Vec<String>,
    /// Clause types a contract is expected to contain.
    pub mandatory: Vec<String>,
    pub risk_rules: RiskRules,
    pub backend: BackendBinding,
}

impl JurisdictionProfile {
    /// Validate a configuration spec into a profile.
    pub fn from_spec(spec: ProfileSpec) -> Result<Self, ProfileError> {
        let ProfileSpec {
            id,
            clause_types,
            mandatory,
            risk_rules,
            backend,
        } = spec;

        if clause_types.is_empty() {
            return Err(ProfileError::EmptyTaxonomy { id });
        }

        let mut seen = HashSet::new();
        for label in &clause_types {
            if !seen.insert(label.as_str()) {
                return Err(ProfileError::DuplicateClauseType {
                    id,
                    label: label.clone(),
                });
            }
        }

        for label in &mandatory {
            if !seen.contains(label.as_str()) {
                return Err(ProfileError::MandatoryNotInTaxonomy {
                    id,
                    label: label.clone(),
                });
            }
        }

        if let BackendBinding::Lexicon { lexicon } = &backend {
            for label in lexicon.keys() {
                if !seen.contains(label.as_str()) {
                    return Err(ProfileError::LexiconLabelNotInTaxonomy {
                        id,
                        label: label.clone(),
                    });
                }
            }
        }

        Ok(Self {
            id,
            clause_types,
            mandatory,
            risk_rules,
            backend,
        })
    }

    pub fn knows_label(&self, label: &str) -> bool {
        self.clause_types.iter().any(|l| l == label)
    }
}

/// Registry of jurisdiction profiles, read-only after startup.
#[derive(Debug, Default)]
pub struct ProfileRegistry {
    profiles: HashMap<String, Arc<JurisdictionProfile>>,
    order: Vec<String>,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and register a whole configuration.
    pub fn from_specs(specs: Vec<ProfileSpec>) -> Result<Self, ProfileError> {
        let mut registry = Self::new();
        for spec in specs {
            registry.register(JurisdictionProfile::from_spec(spec)?)?;
        }
        Ok(registry)
    }

    /// Register a profile. Fails if the id is already present.
    pub fn register(&mut self, profile: JurisdictionProfile) -> Result<(), ProfileError> {
        if self.profiles.contains_key(&profile.id) {
            return Err(ProfileError::DuplicateJurisdiction(profile.id));
        }
        info!(
            jurisdiction = %profile.id,
            clause_types = profile.clause_types.len(),
            mandatory = profile.mandatory.len(),
            "registered jurisdiction profile"
        );
        self.order.push(profile.id.clone());
        self.profiles.insert(profile.id.clone(), Arc::new(profile));
        Ok(())
    }

    /// Look up a profile by jurisdiction id.
    pub fn get(&self, id: &str) -> Result<&Arc<JurisdictionProfile>, ProfileError> {
        self.profiles
            .get(id)
            .ok_or_else(|| ProfileError::UnknownJurisdiction(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    /// Registered jurisdiction ids in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Profiles in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<JurisdictionProfile>> {
        self.order.iter().filter_map(|id| self.profiles.get(id))
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(id: &str, clause_types: &[&str], mandatory: &[&str]) -> ProfileSpec {
        ProfileSpec {
            id: id.to_string(),
            clause_types: clause_types.iter().map(|s| s.to_string()).collect(),
            mandatory: mandatory.iter().map(|s| s.to_string()).collect(),
            risk_rules: RiskRules::default(),
            backend: BackendBinding::Fallback,
        }
    }

    #[test]
    fn from_spec_accepts_valid_profile() {
        let profile =
            JurisdictionProfile::from_spec(spec("us", &["Termination", "Payment"], &["Payment"]))
                .unwrap();
        assert_eq!(profile.id, "us");
        assert!(profile.knows_label("Termination"));
        assert!(!profile.knows_label("Stamp Duty"));
    }

    #[test]
    fn from_spec_rejects_empty_taxonomy() {
        let err = JurisdictionProfile::from_spec(spec("us", &[], &[])).unwrap_err();
        assert!(matches!(err, ProfileError::EmptyTaxonomy { .. }));
    }

    #[test]
    fn from_spec_rejects_duplicate_clause_type() {
        let err = JurisdictionProfile::from_spec(spec("us", &["Payment", "Payment"], &[]))
            .unwrap_err();
        assert!(matches!(err, ProfileError::DuplicateClauseType { .. }));
    }

    #[test]
    fn from_spec_rejects_mandatory_outside_taxonomy() {
        let err = JurisdictionProfile::from_spec(spec("us", &["Payment"], &["Liability"]))
            .unwrap_err();
        assert!(matches!(err, ProfileError::MandatoryNotInTaxonomy { .. }));
    }

    #[test]
    fn from_spec_rejects_lexicon_label_outside_taxonomy() {
        let mut s = spec("us", &["Payment"], &[]);
        let mut lexicon = BTreeMap::new();
        lexicon.insert("Liability".to_string(), vec!["liable".to_string()]);
        s.backend = BackendBinding::Lexicon { lexicon };
        let err = JurisdictionProfile::from_spec(s).unwrap_err();
        assert!(matches!(err, ProfileError::LexiconLabelNotInTaxonomy { .. }));
    }

    #[test]
    fn register_rejects_duplicate_jurisdiction() {
        let mut registry = ProfileRegistry::new();
        registry
            .register(JurisdictionProfile::from_spec(spec("us", &["Payment"], &[])).unwrap())
            .unwrap();
        let err = registry
            .register(JurisdictionProfile::from_spec(spec("us", &["Payment"], &[])).unwrap())
            .unwrap_err();
        assert!(matches!(err, ProfileError::DuplicateJurisdiction(id) if id == "us"));
    }

    #[test]
    fn get_unknown_jurisdiction_fails() {
        let registry = ProfileRegistry::new();
        let err = registry.get("mars").unwrap_err();
        assert!(matches!(err, ProfileError::UnknownJurisdiction(id) if id == "mars"));
    }

    #[test]
    fn ids_keep_registration_order() {
        let registry = ProfileRegistry::from_specs(vec![
            spec("us", &["Payment"], &[]),
            spec("in", &["Payment"], &[]),
            spec("uk", &["Payment"], &[]),
        ])
        .unwrap();
        let ids: Vec<&str> = registry.ids().collect();
        assert_eq!(ids, vec!["us", "in", "uk"]);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn backend_binding_defaults_to_fallback() {
        let json = r#"{"id": "us", "clause_types": ["Payment"]}"#;
        let parsed: ProfileSpec = serde_json::from_str(json).unwrap();
        assert!(matches!(parsed.backend, BackendBinding::Fallback));
    }
}
