//! Per-jurisdiction backend dispatch with shared fallback.
//!
//! The registry binds one backend per jurisdiction plus one generic
//! fallback. When a jurisdiction has no usable backend — never bound,
//! failed to build, or erroring at call time — the fallback serves the
//! request and the result is tagged degraded. Degraded mode carries no
//! accuracy guarantee.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use lexrisk_core::{
    BackendBinding, ClassificationResult, JurisdictionProfile, LabelScore, ProfileRegistry,
    UNCATEGORIZED,
};
use tracing::{debug, warn};

use crate::backend::ClauseBackend;
use crate::keyword::KeywordBackend;

/// Uniform classify dispatch over per-jurisdiction backends.
pub struct ClassifierRegistry {
    backends: HashMap<String, Arc<dyn ClauseBackend>>,
    /// jurisdiction → its taxonomy; predictions outside it become the
    /// Uncategorized sentinel.
    taxonomies: HashMap<String, HashSet<String>>,
    fallback: Arc<dyn ClauseBackend>,
    acceptance_threshold: f32,
}

impl ClassifierRegistry {
    pub fn new(fallback: Arc<dyn ClauseBackend>, acceptance_threshold: f32) -> Self {
        Self {
            backends: HashMap::new(),
            taxonomies: HashMap::new(),
            fallback,
            acceptance_threshold,
        }
    }

    /// Build a backend for every registered profile from its binding.
    ///
    /// A binding that cannot be built is logged and skipped; that
    /// jurisdiction is served by the fallback at classify time.
    pub fn from_profiles(
        profiles: &ProfileRegistry,
        fallback: Arc<dyn ClauseBackend>,
        acceptance_threshold: f32,
    ) -> Self {
        let mut registry = Self::new(fallback, acceptance_threshold);
        for profile in profiles.iter() {
            registry.taxonomies.insert(
                profile.id.clone(),
                profile.clause_types.iter().cloned().collect(),
            );
            match build_backend(profile) {
                Ok(Some(backend)) => {
                    debug!(jurisdiction = %profile.id, backend = backend.name(), "bound backend");
                    registry.bind(profile.id.clone(), backend);
                }
                Ok(None) => {}
                Err(reason) => warn!(
                    jurisdiction = %profile.id,
                    %reason,
                    "backend unavailable, jurisdiction will use fallback"
                ),
            }
        }
        registry
    }

    /// Bind a jurisdiction to a dedicated backend. The backend's label set
    /// becomes the jurisdiction's taxonomy unless one is already recorded.
    pub fn bind(&mut self, jurisdiction: impl Into<String>, backend: Arc<dyn ClauseBackend>) {
        let jurisdiction = jurisdiction.into();
        self.taxonomies
            .entry(jurisdiction.clone())
            .or_insert_with(|| backend.labels().iter().cloned().collect());
        self.backends.insert(jurisdiction, backend);
    }

    pub fn has_backend(&self, jurisdiction: &str) -> bool {
        self.backends.contains_key(jurisdiction)
    }

    /// Classify one clause under one jurisdiction.
    ///
    /// Never fails: backend errors fall back to the shared backend, and a
    /// failing fallback yields an Uncategorized result with zero
    /// confidence. A top confidence below the acceptance threshold
    /// replaces the label with the sentinel while keeping the numeric
    /// confidence for observability.
    pub fn classify(&self, text: &str, jurisdiction: &str, position: usize) -> ClassificationResult {
        let (scores, degraded) = match self.backends.get(jurisdiction) {
            Some(backend) => match backend.classify(text) {
                Ok(scores) => (scores, false),
                Err(err) => {
                    warn!(
                        jurisdiction,
                        backend = backend.name(),
                        %err,
                        "backend call failed, falling back"
                    );
                    (self.fallback_scores(text, jurisdiction), true)
                }
            },
            None => (self.fallback_scores(text, jurisdiction), true),
        };

        let (label, confidence) = match scores.first() {
            Some(top) if top.confidence >= self.acceptance_threshold => {
                (top.label.clone(), top.confidence)
            }
            Some(top) => (UNCATEGORIZED.to_string(), top.confidence),
            None => (UNCATEGORIZED.to_string(), 0.0),
        };

        // A fallback prediction may name a type this jurisdiction does not
        // recognise; only taxonomy labels and the sentinel ever surface.
        let label = match self.taxonomies.get(jurisdiction) {
            Some(taxonomy) if label != UNCATEGORIZED && !taxonomy.contains(&label) => {
                UNCATEGORIZED.to_string()
            }
            _ => label,
        };

        ClassificationResult {
            jurisdiction: jurisdiction.to_string(),
            position,
            label,
            confidence: confidence.clamp(0.0, 1.0),
            scores,
            degraded,
        }
    }

    fn fallback_scores(&self, text: &str, jurisdiction: &str) -> Vec<LabelScore> {
        match self.fallback.classify(text) {
            Ok(scores) => scores,
            Err(err) => {
                warn!(jurisdiction, backend = self.fallback.name(), %err, "fallback backend failed");
                Vec::new()
            }
        }
    }
}

fn build_backend(
    profile: &JurisdictionProfile,
) -> Result<Option<Arc<dyn ClauseBackend>>, String> {
    match &profile.backend {
        BackendBinding::Fallback => Ok(None),
        BackendBinding::Lexicon { lexicon } => {
            let name = format!("lexicon:{}", profile.id);
            let backend = KeywordBackend::new(name, &profile.clause_types, lexicon)
                .map_err(|e| e.to_string())?;
            Ok(Some(Arc::new(backend)))
        }
        #[cfg(feature = "onnx")]
        BackendBinding::Semantic {
            model_dir,
            centroids,
        } => {
            let backend = crate::semantic::SemanticBackend::load(model_dir, centroids)
                .map_err(|e| e.to_string())?;
            Ok(Some(Arc::new(backend)))
        }
        #[cfg(not(feature = "onnx"))]
        BackendBinding::Semantic { .. } => {
            Err("semantic backend requires the onnx feature".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendError;
    use std::collections::BTreeMap;

    struct FailingBackend {
        labels: Vec<String>,
    }

    impl ClauseBackend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }

        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn classify(&self, _text: &str) -> Result<Vec<LabelScore>, BackendError> {
            Err(BackendError::Inference {
                name: "failing".into(),
                reason: "model not loaded".into(),
            })
        }
    }

    fn lexicon_backend(name: &str) -> Arc<dyn ClauseBackend> {
        let labels = vec!["Termination".to_string(), "Payment".to_string()];
        let mut lexicon = BTreeMap::new();
        lexicon.insert("Termination".to_string(), vec!["terminate".to_string()]);
        lexicon.insert("Payment".to_string(), vec!["payment".to_string()]);
        Arc::new(KeywordBackend::new(name, &labels, &lexicon).unwrap())
    }

    #[test]
    fn dedicated_backend_is_not_degraded() {
        let mut registry = ClassifierRegistry::new(lexicon_backend("fallback"), 0.5);
        registry.bind("us", lexicon_backend("lexicon:us"));

        let result = registry.classify("either party may terminate", "us", 0);
        assert!(!result.degraded);
        assert_eq!(result.label, "Termination");
        assert_eq!(result.jurisdiction, "us");
    }

    #[test]
    fn unbound_jurisdiction_uses_fallback_and_degrades() {
        let registry = ClassifierRegistry::new(lexicon_backend("fallback"), 0.5);

        let result = registry.classify("either party may terminate", "in", 2);
        assert!(result.degraded);
        assert_eq!(result.label, "Termination");
        assert_eq!(result.position, 2);
    }

    #[test]
    fn erroring_backend_falls_back_and_degrades() {
        let mut registry = ClassifierRegistry::new(lexicon_backend("fallback"), 0.5);
        registry.bind(
            "us",
            Arc::new(FailingBackend {
                labels: vec!["Termination".to_string(), "Payment".to_string()],
            }),
        );

        let result = registry.classify("payment due on invoice", "us", 0);
        assert!(result.degraded);
        assert_eq!(result.label, "Payment");
    }

    #[test]
    fn fallback_prediction_outside_taxonomy_becomes_uncategorized() {
        let mut registry = ClassifierRegistry::new(lexicon_backend("fallback"), 0.5);
        // The jurisdiction only knows Payment; the fallback also predicts
        // Termination.
        registry.bind(
            "us",
            Arc::new(FailingBackend {
                labels: vec!["Payment".to_string()],
            }),
        );

        let result = registry.classify("either party may terminate", "us", 0);
        assert!(result.degraded);
        assert_eq!(result.label, UNCATEGORIZED);
        // The fallback's numeric confidence is retained for observability.
        assert!(result.confidence > 0.5);
    }

    #[test]
    fn below_threshold_becomes_uncategorized_with_confidence_kept() {
        let mut registry = ClassifierRegistry::new(lexicon_backend("fallback"), 0.9);
        registry.bind("us", lexicon_backend("lexicon:us"));

        // One hit each: 0.5 per label, below the 0.9 threshold.
        let result = registry.classify("terminate upon late payment", "us", 0);
        assert_eq!(result.label, UNCATEGORIZED);
        assert!((result.confidence - 0.5).abs() < 1e-5);
        assert!(!result.scores.is_empty());
    }

    #[test]
    fn failing_fallback_yields_empty_uncategorized() {
        let registry = ClassifierRegistry::new(
            Arc::new(FailingBackend {
                labels: vec!["Termination".to_string()],
            }),
            0.5,
        );

        let result = registry.classify("anything", "us", 0);
        assert!(result.degraded);
        assert_eq!(result.label, UNCATEGORIZED);
        assert_eq!(result.confidence, 0.0);
        assert!(result.scores.is_empty());
    }

    #[test]
    fn confidence_always_in_unit_interval() {
        let mut registry = ClassifierRegistry::new(lexicon_backend("fallback"), 0.5);
        registry.bind("us", lexicon_backend("lexicon:us"));

        for text in ["", "terminate", "payment payment payment", "unrelated text"] {
            let result = registry.classify(text, "us", 0);
            assert!((0.0..=1.0).contains(&result.confidence), "text {text:?}");
        }
    }

    #[test]
    fn from_profiles_binds_lexicon_and_skips_fallback_bindings() {
        use lexrisk_core::{ProfileSpec, RiskRules};

        let mut lexicon = BTreeMap::new();
        lexicon.insert("Payment".to_string(), vec!["payment".to_string()]);

        let profiles = ProfileRegistry::from_specs(vec![
            ProfileSpec {
                id: "us".into(),
                clause_types: vec!["Payment".into()],
                mandatory: vec![],
                risk_rules: RiskRules::default(),
                backend: BackendBinding::Lexicon { lexicon },
            },
            ProfileSpec {
                id: "in".into(),
                clause_types: vec!["Payment".into()],
                mandatory: vec![],
                risk_rules: RiskRules::default(),
                backend: BackendBinding::Fallback,
            },
        ])
        .unwrap();

        let registry = ClassifierRegistry::from_profiles(&profiles, lexicon_backend("fallback"), 0.5);
        assert!(registry.has_backend("us"));
        assert!(!registry.has_backend("in"));

        let result = registry.classify("payment is due", "in", 0);
        assert!(result.degraded);
    }
}
