//! Clause segmentation.
//!
//! Contracts arrive as encoding-normalised plain text. Segmentation splits
//! on blank-line paragraph boundaries, drops recital boilerplate and bare
//! section markers, splits overlong paragraphs at sentence boundaries, and
//! merges fragments shorter than the minimum clause length into the
//! following fragment so spurious micro-clauses never reach the
//! classifier. Positions are assigned 0-based in document order.

use lexrisk_core::{AnalysisConfig, Clause};
use tracing::debug;

/// Line prefixes treated as recital/boilerplate headers, not clauses.
const HEADER_PREFIXES: &[&str] = &["whereas", "this agreement", "the parties", "page ", "exhibit"];

/// Deterministic clause segmenter.
#[derive(Debug, Clone)]
pub struct Segmenter {
    min_clause_len: usize,
    long_paragraph_len: usize,
}

impl Segmenter {
    pub fn new(min_clause_len: usize, long_paragraph_len: usize) -> Self {
        Self {
            min_clause_len,
            long_paragraph_len,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(config.min_clause_len, config.long_paragraph_len)
    }

    /// Split raw contract text into an ordered sequence of clauses.
    ///
    /// Empty or whitespace-only input yields an empty sequence, not an
    /// error; downstream stages produce a valid empty summary from it.
    pub fn segment(&self, contract_id: &str, text: &str) -> Vec<Clause> {
        let text = text.replace("\r\n", "\n");

        let mut fragments = Vec::new();
        for paragraph in text.split("\n\n") {
            let paragraph = paragraph.trim().replace('\n', " ");
            if paragraph.is_empty() || is_header(&paragraph) || is_section_marker(&paragraph) {
                continue;
            }

            if paragraph.chars().count() > self.long_paragraph_len {
                fragments.extend(split_sentences(&paragraph));
            } else {
                fragments.push(paragraph);
            }
        }

        let merged = self.merge_short_fragments(fragments);
        debug!(contract_id, clauses = merged.len(), "segmented contract text");

        merged
            .into_iter()
            .enumerate()
            .map(|(position, text)| Clause {
                contract_id: contract_id.to_string(),
                position,
                text,
            })
            .collect()
    }

    /// Merge fragments shorter than the minimum clause length into the
    /// following fragment; a trailing short fragment merges backward.
    fn merge_short_fragments(&self, fragments: Vec<String>) -> Vec<String> {
        let mut merged: Vec<String> = Vec::with_capacity(fragments.len());
        let mut carry = String::new();

        for fragment in fragments {
            let fragment = if carry.is_empty() {
                fragment
            } else {
                let mut joined = std::mem::take(&mut carry);
                joined.push(' ');
                joined.push_str(&fragment);
                joined
            };

            if fragment.chars().count() < self.min_clause_len {
                carry = fragment;
            } else {
                merged.push(fragment);
            }
        }

        if !carry.is_empty() {
            match merged.last_mut() {
                Some(last) => {
                    last.push(' ');
                    last.push_str(&carry);
                }
                None => merged.push(carry),
            }
        }

        merged
    }
}

fn is_header(paragraph: &str) -> bool {
    let lower = paragraph.to_lowercase();
    HEADER_PREFIXES.iter().any(|p| lower.starts_with(p))
}

/// A bare numbered section marker like `3.` or `12)` with no content.
fn is_section_marker(paragraph: &str) -> bool {
    let bytes = paragraph.as_bytes();
    let digit_end = bytes
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    digit_end > 0 && matches!(&bytes[digit_end..], b"." | b")")
}

/// Split at `.` followed by whitespace and an uppercase letter.
fn split_sentences(paragraph: &str) -> Vec<String> {
    let bytes = paragraph.as_bytes();
    let mut parts = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'.' {
            let mut j = i + 1;
            while j < bytes.len() && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j > i + 1 && j < bytes.len() && bytes[j].is_ascii_uppercase() {
                let sentence = paragraph[start..=i].trim();
                if !sentence.is_empty() {
                    parts.push(sentence.to_string());
                }
                start = j;
                i = j;
                continue;
            }
        }
        i += 1;
    }

    let tail = paragraph[start..].trim();
    if !tail.is_empty() {
        parts.push(tail.to_string());
    }
    parts
}
