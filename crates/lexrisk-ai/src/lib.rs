//! Classification backends: keyword lexicons, optional ONNX inference, and
//! the per-jurisdiction classifier registry with shared fallback.

mod backend;
mod keyword;
mod registry;

pub use backend::{BackendError, ClauseBackend};
pub use keyword::KeywordBackend;
pub use registry::ClassifierRegistry;

#[cfg(feature = "onnx")]
mod semantic;
#[cfg(feature = "onnx")]
pub use semantic::SemanticBackend;
