//! Error handling types and utilities.

use std::path::PathBuf;
use thiserror::Error;

/// A specialized Result type for kitmatch operations.
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Fatal pipeline errors callers are expected to match on.
///
/// `NoOverlap` is deliberately not here: an empty intersection between the kit
/// and the content corpus is a valid terminal state, modeled as
/// [`crate::rank::RankOutcome::NoOverlap`] rather than an error.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A required backing dataset is absent.
    #[error("missing {what}: {path}")]
    MissingResource { what: &'static str, path: PathBuf },

    /// The uploaded kit lacks a required column after alias resolution.
    #[error("invalid kit input: {0}")]
    InvalidInput(String),
}
