//! The classification backend contract.

use lexrisk_core::LabelScore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend {name}: {reason}")]
    Inference { name: String, reason: String },

    #[error("backend {0} has an empty label set")]
    NoLabels(String),
}

/// A classification backend: a pure function from clause text to ranked
/// label scores.
///
/// Backends never mutate shared state on classify; implementations must be
/// safe for concurrent calls from any number of requests.
pub trait ClauseBackend: Send + Sync {
    /// Backend name, for logs and diagnostics.
    fn name(&self) -> &str;

    /// The labels this backend can predict.
    fn labels(&self) -> &[String];

    /// Rank every label for the given text, confidence descending.
    ///
    /// Confidences are in [0,1].
    fn classify(&self, text: &str) -> Result<Vec<LabelScore>, BackendError>;
}
