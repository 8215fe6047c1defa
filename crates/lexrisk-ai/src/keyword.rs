//! Lexicon-backed classification.
//!
//! Scores each label by counting case-insensitive keyword hits in the
//! clause text and normalising hit counts into a confidence distribution.

use std::collections::BTreeMap;

use lexrisk_core::LabelScore;

use crate::backend::{BackendError, ClauseBackend};

/// Keyword-lexicon classification backend.
///
/// With no keyword hits at all, every label receives the uniform confidence
/// `1 / labels`, which falls below any useful acceptance threshold and
/// surfaces downstream as an Uncategorized prediction.
#[derive(Debug)]
pub struct KeywordBackend {
    name: String,
    labels: Vec<String>,
    /// Lowercased keyword lists, parallel to `labels`.
    lexicon: Vec<Vec<String>>,
}

impl KeywordBackend {
    /// Build from a label → keywords lexicon.
    ///
    /// `labels` fixes the taxonomy order; labels missing from the lexicon
    /// get an empty keyword list and can never win on hits.
    pub fn new(
        name: impl Into<String>,
        labels: &[String],
        lexicon: &BTreeMap<String, Vec<String>>,
    ) -> Result<Self, BackendError> {
        let name = name.into();
        if labels.is_empty() {
            return Err(BackendError::NoLabels(name));
        }

        let lexicon = labels
            .iter()
            .map(|label| {
                lexicon
                    .get(label)
                    .map(|kws| kws.iter().map(|kw| kw.to_lowercase()).collect())
                    .unwrap_or_default()
            })
            .collect();

        Ok(Self {
            name,
            labels: labels.to_vec(),
            lexicon,
        })
    }

    fn hits(&self, text_lower: &str) -> Vec<usize> {
        self.lexicon
            .iter()
            .map(|kws| {
                kws.iter()
                    .filter(|kw| text_lower.contains(kw.as_str()))
                    .count()
            })
            .collect()
    }
}

impl ClauseBackend for KeywordBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, BackendError> {
        let text_lower = text.to_lowercase();
        let hits = self.hits(&text_lower);
        let total: usize = hits.iter().sum();

        let mut scores: Vec<LabelScore> = self
            .labels
            .iter()
            .zip(&hits)
            .map(|(label, &h)| {
                let confidence = if total == 0 {
                    1.0 / self.labels.len() as f32
                } else {
                    h as f32 / total as f32
                };
                LabelScore {
                    label: label.clone(),
                    confidence,
                }
            })
            .collect();

        // Stable sort keeps taxonomy order between equal confidences.
        scores.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> KeywordBackend {
        let labels = vec![
            "Termination".to_string(),
            "Payment".to_string(),
            "Liability".to_string(),
        ];
        let mut lexicon = BTreeMap::new();
        lexicon.insert(
            "Termination".to_string(),
            vec!["terminate".to_string(), "termination".to_string()],
        );
        lexicon.insert(
            "Payment".to_string(),
            vec![
                "payment".to_string(),
                "invoice".to_string(),
                "fee".to_string(),
            ],
        );
        lexicon.insert(
            "Liability".to_string(),
            vec!["liable".to_string(), "liability".to_string()],
        );
        KeywordBackend::new("lexicon:test", &labels, &lexicon).unwrap()
    }

    #[test]
    fn empty_label_set_is_rejected() {
        let err = KeywordBackend::new("lexicon:empty", &[], &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, BackendError::NoLabels(_)));
    }

    #[test]
    fn dominant_keyword_wins() {
        let scores = backend()
            .classify("Either party may terminate this agreement; termination takes effect in 30 days.")
            .unwrap();
        assert_eq!(scores[0].label, "Termination");
        assert!(scores[0].confidence > 0.5);
    }

    #[test]
    fn confidences_are_a_distribution() {
        let scores = backend()
            .classify("payment of the fee is due on invoice; late payment makes the client liable")
            .unwrap();
        let sum: f32 = scores.iter().map(|s| s.confidence).sum();
        assert!((sum - 1.0).abs() < 1e-5, "expected sum 1.0, got {sum}");
        for s in &scores {
            assert!((0.0..=1.0).contains(&s.confidence), "{s:?} out of range");
        }
    }

    #[test]
    fn scores_sorted_descending() {
        let scores = backend()
            .classify("payment payment invoice fee, but may also terminate")
            .unwrap();
        for pair in scores.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
        assert_eq!(scores[0].label, "Payment");
    }

    #[test]
    fn no_hits_yield_uniform_scores() {
        let scores = backend().classify("lorem ipsum dolor sit amet").unwrap();
        for s in &scores {
            assert!((s.confidence - 1.0 / 3.0).abs() < 1e-5);
        }
        // Uniform top confidence stays below a 0.5 acceptance threshold.
        assert!(scores[0].confidence < 0.5);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let scores = backend().classify("TERMINATION FOR CONVENIENCE").unwrap();
        assert_eq!(scores[0].label, "Termination");
    }

    #[test]
    fn every_score_label_is_in_taxonomy() {
        let b = backend();
        let scores = b.classify("terminate for payment liability").unwrap();
        for s in &scores {
            assert!(b.labels().contains(&s.label));
        }
        assert_eq!(scores.len(), b.labels().len());
    }
}
