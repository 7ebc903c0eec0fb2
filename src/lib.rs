//! # reduction-pipeline: message-passing reductions
//!
//! Computes the sum, negated sum and product of the sequence `1..=N` with a
//! chain of cooperating stages that share no memory and talk only through
//! channels.
//!
//! ## Architecture
//!
//! - **Source** (stage 0): generates the sequence, streams one message per
//!   element plus a sentinel, and times the run until the sink acknowledges.
//! - **Intermediates** (stages 1..P-2): update the accumulator fields they
//!   own and forward every message.
//! - **Sink** (stage P-1): finalizes and prints the totals, then sends the
//!   acknowledgment back to the source.
//! - **Communication**: one crossbeam channel per directed edge, rendezvous
//!   by default so the chain moves in lockstep.
//!
//! ## Example
//!
//! ```no_run
//! use reduction_pipeline::pipeline::{ConsoleReporter, Pipeline, Topology};
//!
//! fn main() -> reduction_pipeline::Result<()> {
//!     let pipeline = Pipeline::new(Topology::new(4)?, 10)?;
//!     let report = pipeline.run(ConsoleReporter)?;
//!     assert_eq!(report.totals.sum, 55);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;

// Re-export commonly used types
pub use config::PipelineConfig;
pub use error::{ReductionError, Result};
pub use pipeline::{Pipeline, PipelineError, RunReport, Topology, Totals};
