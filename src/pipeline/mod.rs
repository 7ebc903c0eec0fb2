//! Streaming reduction pipeline.
//!
//! A linear chain of stages, one thread each, connected only by channels.
//! Every element of the sequence flows through every stage exactly once,
//! followed by a single sentinel. Stages owning an operator fold the element
//! into their accumulator and write it into the message before forwarding.
//!
//! # Architecture
//!
//! ```text
//! [Source] ──► [Relay 1] ──► … ──► [Relay K-1] ──► [Sink]
//!    ▲                                               │
//!    └────────────────────── ack ────────────────────┘
//! ```
//!
//! # Design
//!
//! - **Pure role policy**: `role::assign_role` maps (worker index, worker
//!   count) to the owned operators and is tested on its own.
//! - **Explicit state machine**: `stage::Stage` goes RUNNING → DONE and does
//!   no I/O.
//! - **Typed edges**: every data edge and the ack edge is its own channel;
//!   there are no message tags.
//! - **Owned state**: accumulators live inside the stage thread and are only
//!   ever exposed through the message fields the stage overwrites.

pub mod error;
pub mod executor;
pub mod id;
pub mod message;
pub mod nodes;
pub mod report;
pub mod role;
pub mod stage;
pub mod topology;
pub mod transport;

pub use error::{PipelineError, PipelineResult};
pub use executor::{Pipeline, RunReport};
pub use id::{EdgeKind, StageId};
pub use message::{
    Element, PipelineMessage, WireFrame, ACK_TOKEN, MAX_SEQUENCE_LEN, WIRE_BYTES, WIRE_FIELDS,
};
pub use nodes::{generate_sequence, RelayNode, SinkNode, SourceNode};
pub use report::{ConsoleReporter, Reporter};
pub use role::{assign_role, Operator, Role};
pub use stage::{Stage, StageKind, StagePhase, StageState, StageSummary, Totals, Transition};
pub use topology::{Topology, MAX_PROCESS_COUNT, MIN_PROCESS_COUNT};
