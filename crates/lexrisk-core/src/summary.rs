//! Contract-level summaries and cross-jurisdiction comparison results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clause::ScoredClause;
use crate::risk::RiskLevel;

/// Clause counts per risk level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskDistribution {
    pub fn record(&mut self, level: RiskLevel) {
        match level {
            RiskLevel::High => self.high += 1,
            RiskLevel::Medium => self.medium += 1,
            RiskLevel::Low => self.low += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

/// Per-jurisdiction analysis of one contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractSummary {
    pub contract_id: String,
    pub jurisdiction: String,
    /// Scored clauses in segmentation order.
    pub clauses: Vec<ScoredClause>,
    /// Maximum clause risk; Low for an empty contract.
    pub overall_risk: RiskLevel,
    /// Mandatory clause types with no classified clause, in profile order.
    pub missing_mandatory: Vec<String>,
    /// clause type → number of clauses classified as that type.
    pub clause_type_counts: BTreeMap<String, usize>,
    pub risk_distribution: RiskDistribution,
}

impl ContractSummary {
    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    /// High-risk clauses in position order.
    pub fn high_risk_clauses(&self) -> impl Iterator<Item = &ScoredClause> {
        self.clauses.iter().filter(|c| c.risk == RiskLevel::High)
    }
}

/// One difference between two summaries of the same contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Delta {
    /// Clause in the second summary with no counterpart in the first.
    Added { position: usize, clause_type: String },
    /// Clause in the first summary with no counterpart in the second.
    Missing { position: usize, clause_type: String },
    /// Matched clauses classified as different types.
    TypeMismatch {
        position_a: usize,
        position_b: usize,
        type_a: String,
        type_b: String,
    },
    /// Matched clauses of the same type with different risk levels.
    RiskDelta {
        position_a: usize,
        position_b: usize,
        clause_type: String,
        risk_a: RiskLevel,
        risk_b: RiskLevel,
    },
}

/// Diff of two summaries of the same contract under different jurisdictions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub contract_id: String,
    pub jurisdiction_a: String,
    pub jurisdiction_b: String,
    /// Ordered by the first summary's clauses, with unmatched second-summary
    /// clauses appended.
    pub deltas: Vec<Delta>,
}
