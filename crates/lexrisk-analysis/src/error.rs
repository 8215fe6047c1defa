use lexrisk_core::ProfileError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Profile(#[from] ProfileError),

    #[error("summaries compare different contracts: {a:?} vs {b:?}")]
    ComparisonMismatch { a: String, b: String },
}
