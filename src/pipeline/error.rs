//! Pipeline-specific error types.

use crate::pipeline::id::{EdgeKind, StageId};
use thiserror::Error;

/// Errors that can occur while wiring or running the pipeline.
///
/// Every variant is fatal for the run: the chain's result depends on each
/// stage completing its single pass.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid topology: {process_count} process(es), expected at least 2 and at most u32::MAX")]
    InvalidTopology { process_count: usize },

    #[error("Sequence length {len} exceeds the supported maximum of {max}")]
    SequenceTooLong { len: usize, max: usize },

    #[error("{stage}: send on {edge} failed (peer disconnected)")]
    Send { stage: StageId, edge: EdgeKind },

    #[error("{stage}: receive on {edge} failed (peer disconnected)")]
    Recv { stage: StageId, edge: EdgeKind },

    #[error("Frame decode error: {0}")]
    Decode(String),

    #[error("{stage}: protocol violation: {message}")]
    ProtocolViolation { stage: StageId, message: String },

    #[error("{0} panicked")]
    StagePanicked(StageId),

    #[error("{stage}: failed to spawn thread")]
    Spawn {
        stage: StageId,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Whether this error only reflects a neighbour going away.
    ///
    /// When one stage fails, its peers observe disconnected channels; those
    /// derived errors rank below the stage's own failure.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, PipelineError::Send { .. } | PipelineError::Recv { .. })
    }

    /// The stage this error is attributed to, if any.
    pub fn stage(&self) -> Option<StageId> {
        match self {
            PipelineError::Send { stage, .. }
            | PipelineError::Recv { stage, .. }
            | PipelineError::ProtocolViolation { stage, .. }
            | PipelineError::Spawn { stage, .. }
            | PipelineError::StagePanicked(stage) => Some(*stage),
            _ => None,
        }
    }
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
