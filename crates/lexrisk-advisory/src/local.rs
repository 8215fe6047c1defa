//! Rule-based narrative fallback used when the remote service is
//! unavailable. Produces plain-text assessments from the analysis alone.

use std::fmt::Write;

use lexrisk_core::{ComparisonResult, ContractSummary, Delta};

/// High-risk clauses highlighted per assessment, at most.
const MAX_HIGHLIGHTED_CLAUSES: usize = 3;

/// Rule-based risk assessment text for one contract summary.
pub fn assessment(summary: &ContractSummary) -> String {
    let mut out = String::new();
    let dist = &summary.risk_distribution;

    let _ = writeln!(
        out,
        "Risk assessment for jurisdiction {}:",
        summary.jurisdiction
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Overall risk level: {}",
        summary.overall_risk.as_str().to_uppercase()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Risk distribution across {} clauses:", dist.total());
    let _ = writeln!(out, "- High risk: {} clauses", dist.high);
    let _ = writeln!(out, "- Medium risk: {} clauses", dist.medium);
    let _ = writeln!(out, "- Low risk: {} clauses", dist.low);

    if !summary.missing_mandatory.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Expected clause types not found: {}",
            summary.missing_mandatory.join(", ")
        );
    }

    let highlighted: Vec<_> = summary
        .high_risk_clauses()
        .take(MAX_HIGHLIGHTED_CLAUSES)
        .collect();
    if !highlighted.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "High risk clauses requiring attention:");
        for clause in highlighted {
            let _ = writeln!(
                out,
                "- Clause {} ({}): {}",
                clause.position(),
                clause.clause_type(),
                clause.excerpt
            );
        }
    }

    out
}

/// Rule-based comparison text from a jurisdiction diff.
pub fn comparison(result: &ComparisonResult) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Comparison of {} against {} for contract {}:",
        result.jurisdiction_a, result.jurisdiction_b, result.contract_id
    );
    let _ = writeln!(out);

    if result.deltas.is_empty() {
        let _ = writeln!(
            out,
            "No differences found; both jurisdictions classify and score the contract identically."
        );
        return out;
    }

    let mut added = 0usize;
    let mut missing = 0usize;
    let mut type_mismatches = 0usize;
    let mut risk_deltas = 0usize;
    for delta in &result.deltas {
        match delta {
            Delta::Added { .. } => added += 1,
            Delta::Missing { .. } => missing += 1,
            Delta::TypeMismatch { .. } => type_mismatches += 1,
            Delta::RiskDelta { .. } => risk_deltas += 1,
        }
    }

    let _ = writeln!(out, "{} difference(s) found:", result.deltas.len());
    if missing > 0 {
        let _ = writeln!(
            out,
            "- {missing} clause(s) present under {} only",
            result.jurisdiction_a
        );
    }
    if added > 0 {
        let _ = writeln!(
            out,
            "- {added} clause(s) present under {} only",
            result.jurisdiction_b
        );
    }
    if type_mismatches > 0 {
        let _ = writeln!(out, "- {type_mismatches} clause(s) classified differently");
    }
    if risk_deltas > 0 {
        let _ = writeln!(out, "- {risk_deltas} clause(s) scored at different risk levels");
    }

    let _ = writeln!(out);
    for delta in &result.deltas {
        match delta {
            Delta::Added {
                position,
                clause_type,
            } => {
                let _ = writeln!(
                    out,
                    "Clause {position} ({clause_type}) appears only under {}.",
                    result.jurisdiction_b
                );
            }
            Delta::Missing {
                position,
                clause_type,
            } => {
                let _ = writeln!(
                    out,
                    "Clause {position} ({clause_type}) appears only under {}.",
                    result.jurisdiction_a
                );
            }
            Delta::TypeMismatch {
                position_a,
                type_a,
                type_b,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "Clause {position_a} reads as {type_a} under {} but {type_b} under {}.",
                    result.jurisdiction_a, result.jurisdiction_b
                );
            }
            Delta::RiskDelta {
                position_a,
                clause_type,
                risk_a,
                risk_b,
                ..
            } => {
                let _ = writeln!(
                    out,
                    "Clause {position_a} ({clause_type}) is {} risk under {} but {} risk under {}.",
                    risk_a.as_str(),
                    result.jurisdiction_a,
                    risk_b.as_str(),
                    result.jurisdiction_b
                );
            }
        }
    }

    out
}
