//! Deterministic risk scoring.

use lexrisk_core::{AnalysisConfig, JurisdictionProfile, RiskLevel};

/// Scores a classified clause against its jurisdiction's risk rules.
///
/// The base level for the predicted clause type is raised one step per
/// elevating risk-factor match, saturating at High; multiple matches never
/// stack beyond that. Below the low-confidence threshold the result is
/// capped at Medium — an uncertain label never drives a High verdict.
#[derive(Debug, Clone)]
pub struct RiskScorer {
    low_confidence_threshold: f32,
}

impl RiskScorer {
    pub fn new(low_confidence_threshold: f32) -> Self {
        Self {
            low_confidence_threshold,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.low_confidence_threshold)
    }

    /// Score one clause, returning the risk level and the names of every
    /// matched risk factor in rule order.
    pub fn score(
        &self,
        profile: &JurisdictionProfile,
        clause_type: &str,
        confidence: f32,
        text: &str,
    ) -> (RiskLevel, Vec<String>) {
        let text_lower = text.to_lowercase();
        let mut level = profile.risk_rules.base_level(clause_type);
        let mut matched = Vec::new();

        for factor in &profile.risk_rules.factors {
            if factor.matches(&text_lower) {
                if factor.elevates {
                    level = level.step_up();
                }
                matched.push(factor.name.clone());
            }
        }

        if confidence < self.low_confidence_threshold {
            level = level.min(RiskLevel::Medium);
        }

        (level, matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexrisk_core::{BackendBinding, ProfileSpec, RiskFactor, RiskRules};
    use std::collections::BTreeMap;

    fn profile() -> JurisdictionProfile {
        let mut base = BTreeMap::new();
        base.insert("Liability".to_string(), RiskLevel::High);
        base.insert("Termination".to_string(), RiskLevel::Medium);
        base.insert("Payment".to_string(), RiskLevel::Medium);

        let factors = vec![
            RiskFactor {
                name: "abrupt termination".into(),
                keywords: vec!["without notice".into()],
                elevates: true,
            },
            RiskFactor {
                name: "unlimited liability".into(),
                keywords: vec!["unlimited liability".into()],
                elevates: true,
            },
            RiskFactor {
                name: "auto-renewal".into(),
                keywords: vec!["automatically renew".into()],
                elevates: false,
            },
        ];

        JurisdictionProfile::from_spec(ProfileSpec {
            id: "us".into(),
            clause_types: vec![
                "Termination".into(),
                "Payment".into(),
                "Liability".into(),
                "Deliverables".into(),
            ],
            mandatory: vec![],
            risk_rules: RiskRules { base, factors },
            backend: BackendBinding::Fallback,
        })
        .unwrap()
    }

    fn scorer() -> RiskScorer {
        RiskScorer::new(0.4)
    }

    #[test]
    fn unlisted_type_defaults_to_low() {
        let (level, matched) = scorer().score(&profile(), "Deliverables", 0.9, "deliverables due monthly");
        assert_eq!(level, RiskLevel::Low);
        assert!(matched.is_empty());
    }

    #[test]
    fn base_level_applies_without_factor_matches() {
        let (level, _) = scorer().score(&profile(), "Liability", 0.9, "each party is responsible");
        assert_eq!(level, RiskLevel::High);
    }

    #[test]
    fn elevating_factor_raises_medium_to_high() {
        let (level, matched) = scorer().score(
            &profile(),
            "Termination",
            0.8,
            "either party may terminate without notice",
        );
        assert_eq!(level, RiskLevel::High);
        assert_eq!(matched, vec!["abrupt termination".to_string()]);
    }

    #[test]
    fn multiple_factors_saturate_at_high() {
        let (level, matched) = scorer().score(
            &profile(),
            "Liability",
            0.9,
            "unlimited liability applies and either party may end this without notice",
        );
        assert_eq!(level, RiskLevel::High);
        assert_eq!(matched.len(), 2);
    }

    #[test]
    fn non_elevating_factor_is_recorded_but_does_not_raise() {
        let (level, matched) = scorer().score(
            &profile(),
            "Deliverables",
            0.9,
            "this order shall automatically renew each year",
        );
        assert_eq!(level, RiskLevel::Low);
        assert_eq!(matched, vec!["auto-renewal".to_string()]);
    }

    #[test]
    fn low_confidence_caps_at_medium() {
        let (level, _) = scorer().score(
            &profile(),
            "Liability",
            0.2,
            "unlimited liability without notice",
        );
        assert_eq!(level, RiskLevel::Medium);
    }

    #[test]
    fn low_confidence_does_not_raise_low() {
        let (level, _) = scorer().score(&profile(), "Deliverables", 0.1, "deliverables due monthly");
        assert_eq!(level, RiskLevel::Low);
    }

    #[test]
    fn confidence_at_threshold_is_not_capped() {
        let (level, _) = scorer().score(&profile(), "Liability", 0.4, "liability clause");
        assert_eq!(level, RiskLevel::High);
    }
}
