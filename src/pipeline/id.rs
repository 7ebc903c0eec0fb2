//! Identity types for the pipeline.
//!
//! A `StageId` is the position of a stage in the linear chain. Stage 0 is
//! always the source; the last stage is always the sink.

use std::fmt;

/// Position of a stage in the chain (the "rank" of its process).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct StageId(pub u32);

impl StageId {
    pub const SOURCE: StageId = StageId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_source(self) -> bool {
        self == Self::SOURCE
    }

    /// 0-based position among the worker (non-source) stages.
    ///
    /// Returns `None` for the source.
    #[inline]
    pub fn worker_index(self) -> Option<usize> {
        self.index().checked_sub(1)
    }

    #[inline]
    pub fn next(self) -> StageId {
        StageId(self.0 + 1)
    }
}

impl fmt::Debug for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StageId({})", self.0)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {}", self.0)
    }
}

/// The two kinds of directed edge in the topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Stage `i` → stage `i + 1`, carrying `PipelineMessage` frames.
    Data,
    /// Sink → source, carrying the single acknowledgment token.
    Ack,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Data => write!(f, "data edge"),
            EdgeKind::Ack => write!(f, "ack edge"),
        }
    }
}
