//! The contract analysis pipeline: segmentation, classification dispatch,
//! risk scoring, aggregation, and cross-jurisdiction comparison.

mod aggregate;
mod analyzer;
mod compare;
mod error;
mod score;
mod segment;

pub use aggregate::aggregate;
pub use analyzer::{Analyzer, JurisdictionSelector};
pub use compare::compare;
pub use error::AnalysisError;
pub use score::RiskScorer;
pub use segment::Segmenter;
