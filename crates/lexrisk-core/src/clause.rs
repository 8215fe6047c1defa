//! Clause and per-clause classification types.

use serde::{Deserialize, Serialize};

use crate::risk::RiskLevel;

/// Sentinel label for classifications whose top confidence falls below the
/// acceptance threshold.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Maximum excerpt length carried on a scored clause.
pub const EXCERPT_LEN: usize = 200;

/// A contiguous text span within a contract, assigned a stable 0-based
/// position at segmentation time. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    pub contract_id: String,
    pub position: usize,
    pub text: String,
}

/// One ranked (label, confidence) entry from a classification backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    /// In [0,1].
    pub confidence: f32,
}

/// Outcome of classifying one clause under one jurisdiction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub jurisdiction: String,
    pub position: usize,
    /// A label from the jurisdiction's taxonomy, or [`UNCATEGORIZED`].
    pub label: String,
    /// Confidence of the top-ranked label, retained even when the label is
    /// replaced by the sentinel.
    pub confidence: f32,
    /// Full ranked score list, confidence descending.
    pub scores: Vec<LabelScore>,
    /// True when the shared fallback backend served this request.
    pub degraded: bool,
}

/// A classified clause with its assigned risk level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredClause {
    pub classification: ClassificationResult,
    pub risk: RiskLevel,
    /// Names of the risk factors matched in the clause text, in rule order.
    pub matched_factors: Vec<String>,
    /// Leading clause text, truncated for display and narratives.
    pub excerpt: String,
}

impl ScoredClause {
    pub fn clause_type(&self) -> &str {
        &self.classification.label
    }

    pub fn position(&self) -> usize {
        self.classification.position
    }
}

/// Truncate text to at most `max` characters, appending an ellipsis when
/// shortened. Cuts on character boundaries.
pub fn excerpt(text: &str, max: usize) -> String {
    let mut indices = text.char_indices().skip(max);
    match indices.next() {
        None => text.to_string(),
        Some((byte_end, _)) => format!("{}...", text[..byte_end].trim_end()),
    }
}
