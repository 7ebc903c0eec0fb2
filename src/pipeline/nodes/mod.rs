//! The three kinds of stage process.
//!
//! Each node owns the endpoints of its edges and runs a blocking
//! receive → process → send loop on its own thread. Intermediate and sink
//! nodes delegate all accumulator logic to `Stage`.

pub mod relay;
pub mod sink;
pub mod source;

pub use relay::RelayNode;
pub use sink::{SinkNode, SinkOutcome};
pub use source::{clock_resolution, generate_sequence, SourceNode, SourceOutcome};
