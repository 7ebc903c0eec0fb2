//! Error handling for reduction-pipeline
//!
//! This module defines the application-level error type and a Result alias.
//! Failures inside a run are `PipelineError`s and convert into
//! `ReductionError::Pipeline`.

use crate::pipeline::PipelineError;
use thiserror::Error;

/// Main error type for reduction-pipeline operations
#[derive(Error, Debug)]
pub enum ReductionError {
    /// Errors raised while wiring or running the pipeline
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ReductionError>,
    },
}

impl ReductionError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ReductionError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for reduction-pipeline operations
pub type Result<T> = std::result::Result<T, ReductionError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
