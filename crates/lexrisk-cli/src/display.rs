//! Card-style terminal rendering for analysis results.

use std::fmt::Write;

use lexrisk_core::{ClassificationResult, ComparisonResult, ContractSummary, Delta};

const MAX_SCORE_ROWS: usize = 5;

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out, "── {title} ──");
}

/// Render a single-clause classification.
pub fn classification_card(result: &ClassificationResult) -> String {
    let mut out = String::new();
    section(&mut out, &format!("Classification [{}]", result.jurisdiction));
    let _ = writeln!(out, "  label       {}", result.label);
    let _ = writeln!(out, "  confidence  {:.3}", result.confidence);
    if result.degraded {
        let _ = writeln!(out, "  degraded    served by fallback backend");
    }
    if !result.scores.is_empty() {
        let _ = writeln!(out, "  top scores");
        for score in result.scores.iter().take(MAX_SCORE_ROWS) {
            let _ = writeln!(out, "    {:<24} {:.3}", score.label, score.confidence);
        }
    }
    out
}

/// Render a per-jurisdiction contract summary.
pub fn summary_card(summary: &ContractSummary) -> String {
    let mut out = String::new();
    let dist = &summary.risk_distribution;

    section(
        &mut out,
        &format!(
            "Contract {} [{}]",
            summary.contract_id, summary.jurisdiction
        ),
    );
    let _ = writeln!(out, "  clauses       {}", summary.clause_count());
    let _ = writeln!(
        out,
        "  overall risk  {}",
        summary.overall_risk.as_str().to_uppercase()
    );
    let _ = writeln!(
        out,
        "  distribution  high {} / medium {} / low {}",
        dist.high, dist.medium, dist.low
    );
    if !summary.missing_mandatory.is_empty() {
        let _ = writeln!(
            out,
            "  missing       {}",
            summary.missing_mandatory.join(", ")
        );
    }

    if !summary.clause_type_counts.is_empty() {
        let _ = writeln!(out, "  clause types");
        for (clause_type, count) in &summary.clause_type_counts {
            let _ = writeln!(out, "    {clause_type:<24} {count}");
        }
    }

    for clause in &summary.clauses {
        let degraded = if clause.classification.degraded {
            " (degraded)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  [{}] {} — {} risk, confidence {:.3}{degraded}",
            clause.position(),
            clause.clause_type(),
            clause.risk.as_str(),
            clause.classification.confidence,
        );
        if !clause.matched_factors.is_empty() {
            let _ = writeln!(out, "      factors: {}", clause.matched_factors.join(", "));
        }
        let _ = writeln!(out, "      {}", clause.excerpt);
    }
    out
}

/// Render a jurisdiction comparison.
pub fn comparison_card(result: &ComparisonResult) -> String {
    let mut out = String::new();
    section(
        &mut out,
        &format!(
            "Comparison {} vs {} [{}]",
            result.jurisdiction_a, result.jurisdiction_b, result.contract_id
        ),
    );

    if result.deltas.is_empty() {
        let _ = writeln!(out, "  no differences");
        return out;
    }

    for delta in &result.deltas {
        match delta {
            Delta::Added {
                position,
                clause_type,
            } => {
                let _ = writeln!(
                    out,
                    "  added     [{position}] {clause_type} (only under {})",
                    result.jurisdiction_b
                );
            }
            Delta::Missing {
                position,
                clause_type,
            } => {
                let _ = writeln!(
                    out,
                    "  missing   [{position}] {clause_type} (only under {})",
                    result.jurisdiction_a
                );
            }
            Delta::TypeMismatch {
                position_a,
                position_b,
                type_a,
                type_b,
            } => {
                let _ = writeln!(
                    out,
                    "  mismatch  [{position_a}/{position_b}] {type_a} vs {type_b}"
                );
            }
            Delta::RiskDelta {
                position_a,
                position_b,
                clause_type,
                risk_a,
                risk_b,
            } => {
                let _ = writeln!(
                    out,
                    "  risk      [{position_a}/{position_b}] {clause_type}: {} vs {}",
                    risk_a.as_str(),
                    risk_b.as_str()
                );
            }
        }
    }
    out
}
