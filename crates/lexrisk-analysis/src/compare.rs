//! Cross-jurisdiction diff of two summaries of the same contract.

use lexrisk_core::{ComparisonResult, ContractSummary, Delta, ScoredClause};

use crate::error::AnalysisError;

/// Diff two summaries produced for the same contract under different
/// jurisdictions.
///
/// Summaries of equal clause count are matched position-by-position;
/// otherwise each first-summary clause consumes the nearest unmatched
/// second-summary clause of the same predicted type. Deltas follow the
/// first summary's clause order, with unmatched second-summary clauses
/// appended as Added.
pub fn compare(
    a: &ContractSummary,
    b: &ContractSummary,
) -> Result<ComparisonResult, AnalysisError> {
    if a.contract_id != b.contract_id {
        return Err(AnalysisError::ComparisonMismatch {
            a: a.contract_id.clone(),
            b: b.contract_id.clone(),
        });
    }

    let deltas = if a.clause_count() == b.clause_count() {
        positional_deltas(a, b)
    } else {
        type_matched_deltas(a, b)
    };

    Ok(ComparisonResult {
        contract_id: a.contract_id.clone(),
        jurisdiction_a: a.jurisdiction.clone(),
        jurisdiction_b: b.jurisdiction.clone(),
        deltas,
    })
}

fn positional_deltas(a: &ContractSummary, b: &ContractSummary) -> Vec<Delta> {
    a.clauses
        .iter()
        .zip(&b.clauses)
        .filter_map(|(ca, cb)| delta_for_pair(ca, cb))
        .collect()
}

fn delta_for_pair(ca: &ScoredClause, cb: &ScoredClause) -> Option<Delta> {
    if ca.clause_type() != cb.clause_type() {
        Some(Delta::TypeMismatch {
            position_a: ca.position(),
            position_b: cb.position(),
            type_a: ca.clause_type().to_string(),
            type_b: cb.clause_type().to_string(),
        })
    } else if ca.risk != cb.risk {
        Some(Delta::RiskDelta {
            position_a: ca.position(),
            position_b: cb.position(),
            clause_type: ca.clause_type().to_string(),
            risk_a: ca.risk,
            risk_b: cb.risk,
        })
    } else {
        None
    }
}

fn type_matched_deltas(a: &ContractSummary, b: &ContractSummary) -> Vec<Delta> {
    let mut taken = vec![false; b.clauses.len()];
    let mut deltas = Vec::new();

    for ca in &a.clauses {
        let nearest = b
            .clauses
            .iter()
            .enumerate()
            .filter(|(i, cb)| !taken[*i] && cb.clause_type() == ca.clause_type())
            .min_by_key(|(_, cb)| ca.position().abs_diff(cb.position()));

        match nearest {
            Some((i, cb)) => {
                taken[i] = true;
                if ca.risk != cb.risk {
                    deltas.push(Delta::RiskDelta {
                        position_a: ca.position(),
                        position_b: cb.position(),
                        clause_type: ca.clause_type().to_string(),
                        risk_a: ca.risk,
                        risk_b: cb.risk,
                    });
                }
            }
            None => deltas.push(Delta::Missing {
                position: ca.position(),
                clause_type: ca.clause_type().to_string(),
            }),
        }
    }

    for (i, cb) in b.clauses.iter().enumerate() {
        if !taken[i] {
            deltas.push(Delta::Added {
                position: cb.position(),
                clause_type: cb.clause_type().to_string(),
            });
        }
    }

    deltas
}
