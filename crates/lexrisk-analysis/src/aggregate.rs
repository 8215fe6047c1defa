//! Contract-level aggregation of scored clauses.

use std::collections::BTreeMap;

use lexrisk_core::{
    ContractSummary, JurisdictionProfile, RiskDistribution, RiskLevel, ScoredClause,
};

/// Fold scored clauses into a per-jurisdiction contract summary.
///
/// Overall risk is the maximum clause risk — a single High-risk clause
/// makes the contract High-risk; risk is not diluted by volume. Mandatory
/// clause types with no classified clause are reported missing, so an
/// empty contract reports the profile's full mandatory set.
pub fn aggregate(
    profile: &JurisdictionProfile,
    contract_id: &str,
    clauses: Vec<ScoredClause>,
) -> ContractSummary {
    let mut clause_type_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut risk_distribution = RiskDistribution::default();
    let mut overall_risk = RiskLevel::Low;

    for clause in &clauses {
        *clause_type_counts
            .entry(clause.clause_type().to_string())
            .or_insert(0) += 1;
        risk_distribution.record(clause.risk);
        overall_risk = overall_risk.max(clause.risk);
    }

    let missing_mandatory = profile
        .mandatory
        .iter()
        .filter(|m| !clause_type_counts.contains_key(m.as_str()))
        .cloned()
        .collect();

    ContractSummary {
        contract_id: contract_id.to_string(),
        jurisdiction: profile.id.clone(),
        clauses,
        overall_risk,
        missing_mandatory,
        clause_type_counts,
        risk_distribution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexrisk_core::{BackendBinding, ClassificationResult, ProfileSpec, RiskRules};

    fn profile() -> JurisdictionProfile {
        JurisdictionProfile::from_spec(ProfileSpec {
            id: "us".into(),
            clause_types: vec!["Termination".into(), "Payment".into(), "Liability".into()],
            mandatory: vec!["Payment".into(), "Liability".into()],
            risk_rules: RiskRules::default(),
            backend: BackendBinding::Fallback,
        })
        .unwrap()
    }

    fn scored(position: usize, label: &str, risk: RiskLevel) -> ScoredClause {
        ScoredClause {
            classification: ClassificationResult {
                jurisdiction: "us".into(),
                position,
                label: label.into(),
                confidence: 0.8,
                scores: vec![],
                degraded: false,
            },
            risk,
            matched_factors: vec![],
            excerpt: format!("{label} clause"),
        }
    }

    #[test]
    fn empty_contract_is_low_risk_with_full_mandatory_missing() {
        let summary = aggregate(&profile(), "c1", vec![]);
        assert_eq!(summary.clause_count(), 0);
        assert_eq!(summary.overall_risk, RiskLevel::Low);
        assert_eq!(summary.missing_mandatory, vec!["Payment", "Liability"]);
        assert_eq!(summary.risk_distribution.total(), 0);
    }

    #[test]
    fn frequency_counts_sum_to_clause_count() {
        let summary = aggregate(
            &profile(),
            "c1",
            vec![
                scored(0, "Payment", RiskLevel::Low),
                scored(1, "Payment", RiskLevel::Medium),
                scored(2, "Termination", RiskLevel::Low),
            ],
        );
        let sum: usize = summary.clause_type_counts.values().sum();
        assert_eq!(sum, summary.clause_count());
        assert_eq!(summary.clause_type_counts["Payment"], 2);
        assert_eq!(summary.clause_type_counts["Termination"], 1);
    }

    #[test]
    fn risk_distribution_sums_to_clause_count() {
        let summary = aggregate(
            &profile(),
            "c1",
            vec![
                scored(0, "Payment", RiskLevel::High),
                scored(1, "Payment", RiskLevel::Low),
                scored(2, "Liability", RiskLevel::Low),
            ],
        );
        assert_eq!(summary.risk_distribution.total(), 3);
        assert_eq!(summary.risk_distribution.high, 1);
        assert_eq!(summary.risk_distribution.low, 2);
    }

    #[test]
    fn single_high_clause_makes_contract_high_risk() {
        let summary = aggregate(
            &profile(),
            "c1",
            vec![
                scored(0, "Payment", RiskLevel::Low),
                scored(1, "Liability", RiskLevel::High),
                scored(2, "Termination", RiskLevel::Low),
            ],
        );
        assert_eq!(summary.overall_risk, RiskLevel::High);
    }

    #[test]
    fn present_mandatory_types_are_not_reported_missing() {
        let summary = aggregate(
            &profile(),
            "c1",
            vec![scored(0, "Payment", RiskLevel::Low)],
        );
        assert_eq!(summary.missing_mandatory, vec!["Liability"]);
    }

    #[test]
    fn clauses_keep_segmentation_order() {
        let summary = aggregate(
            &profile(),
            "c1",
            vec![
                scored(0, "Payment", RiskLevel::Low),
                scored(1, "Liability", RiskLevel::Low),
            ],
        );
        let positions: Vec<usize> = summary.clauses.iter().map(|c| c.position()).collect();
        assert_eq!(positions, vec![0, 1]);
    }
}
