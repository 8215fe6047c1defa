//! Pipeline facade: the analysis operations exposed to callers.
//!
//! Each request runs the pipeline independently over the shared immutable
//! registries; no cross-request state exists, so requests may run in
//! parallel without coordination.

use std::collections::BTreeMap;
use std::sync::Arc;

use lexrisk_ai::ClassifierRegistry;
use lexrisk_core::{
    AnalysisConfig, ClassificationResult, ComparisonResult, ContractSummary, EXCERPT_LEN,
    JurisdictionProfile, ProfileRegistry, ScoredClause, excerpt,
};
use tracing::debug;

use crate::aggregate::aggregate;
use crate::compare::compare;
use crate::error::AnalysisError;
use crate::score::RiskScorer;
use crate::segment::Segmenter;

/// A registered jurisdiction id, or every registered jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JurisdictionSelector {
    All,
    One(String),
}

impl JurisdictionSelector {
    /// `"all"` (case-insensitive) selects every registered jurisdiction;
    /// anything else is a jurisdiction id.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::One(s.to_string())
        }
    }
}

/// The classification-and-risk pipeline over immutable registries.
pub struct Analyzer {
    profiles: Arc<ProfileRegistry>,
    classifiers: ClassifierRegistry,
    segmenter: Segmenter,
    scorer: RiskScorer,
}

impl Analyzer {
    pub fn new(
        profiles: Arc<ProfileRegistry>,
        classifiers: ClassifierRegistry,
        config: &AnalysisConfig,
    ) -> Self {
        Self {
            profiles,
            classifiers,
            segmenter: Segmenter::from_config(config),
            scorer: RiskScorer::from_config(config),
        }
    }

    /// Jurisdictions selected for a request. An unknown id is rejected
    /// here, before any pipeline stage runs.
    fn select(
        &self,
        selector: &JurisdictionSelector,
    ) -> Result<Vec<Arc<JurisdictionProfile>>, AnalysisError> {
        match selector {
            JurisdictionSelector::One(id) => Ok(vec![self.profiles.get(id)?.clone()]),
            JurisdictionSelector::All => Ok(self.profiles.iter().cloned().collect()),
        }
    }

    /// Classify a single clause under the selected jurisdictions.
    pub fn classify_clause(
        &self,
        text: &str,
        selector: &JurisdictionSelector,
    ) -> Result<BTreeMap<String, ClassificationResult>, AnalysisError> {
        let profiles = self.select(selector)?;
        Ok(profiles
            .iter()
            .map(|p| (p.id.clone(), self.classifiers.classify(text, &p.id, 0)))
            .collect())
    }

    /// Run the full pipeline over raw contract text: segment, classify,
    /// score, aggregate — once per selected jurisdiction.
    pub fn analyze_contract(
        &self,
        contract_id: &str,
        text: &str,
        selector: &JurisdictionSelector,
    ) -> Result<BTreeMap<String, ContractSummary>, AnalysisError> {
        let profiles = self.select(selector)?;
        let clauses = self.segmenter.segment(contract_id, text);

        let mut summaries = BTreeMap::new();
        for profile in profiles {
            let scored: Vec<ScoredClause> = clauses
                .iter()
                .map(|clause| {
                    let classification =
                        self.classifiers
                            .classify(&clause.text, &profile.id, clause.position);
                    let (risk, matched_factors) = self.scorer.score(
                        &profile,
                        &classification.label,
                        classification.confidence,
                        &clause.text,
                    );
                    ScoredClause {
                        classification,
                        risk,
                        matched_factors,
                        excerpt: excerpt(&clause.text, EXCERPT_LEN),
                    }
                })
                .collect();

            let summary = aggregate(&profile, contract_id, scored);
            debug!(
                jurisdiction = %profile.id,
                clauses = summary.clause_count(),
                overall = summary.overall_risk.as_str(),
                "analyzed contract"
            );
            summaries.insert(profile.id.clone(), summary);
        }
        Ok(summaries)
    }

    /// Diff two summaries of the same contract.
    pub fn compare_jurisdictions(
        &self,
        a: &ContractSummary,
        b: &ContractSummary,
    ) -> Result<ComparisonResult, AnalysisError> {
        compare(a, b)
    }
}
