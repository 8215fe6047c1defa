//! Advisory narrative boundary.
//!
//! Calls an external text-generation service for narrative explanations of
//! an analysis, degrading to a local rule-based narrative when the call
//! fails. Advisory failure is never fatal to classification/risk output.

mod client;
mod local;

pub use client::{AdvisoryClient, AdvisoryError, AdvisoryOutcome};
