//! Relay node: an intermediate stage that updates its owned fields and forwards.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::stage::{Stage, StageSummary, Transition};
use crate::pipeline::transport::{DataReceiver, DataSender};

pub struct RelayNode {
    stage: Stage,
    upstream: DataReceiver,
    downstream: DataSender,
}

impl RelayNode {
    pub fn new(stage: Stage, upstream: DataReceiver, downstream: DataSender) -> Self {
        Self {
            stage,
            upstream,
            downstream,
        }
    }

    /// Receive, step, send until the sentinel has been relayed.
    pub fn run(mut self) -> PipelineResult<StageSummary> {
        let id = self.stage.id();
        tracing::info!(stage = %id, role = %self.stage.role(), "Relay started");

        while !self.stage.is_done() {
            let msg = self.upstream.recv()?;
            match self.stage.on_message(msg)? {
                Transition::Forward(out) => {
                    tracing::debug!(stage = %id, value = out.value, "Forwarding element");
                    self.downstream.send(&out)?;
                }
                Transition::Relay(sentinel) => {
                    tracing::debug!(stage = %id, "Relaying sentinel");
                    self.downstream.send(&sentinel)?;
                }
                other => {
                    return Err(PipelineError::ProtocolViolation {
                        stage: id,
                        message: format!("intermediate stage produced {other:?}"),
                    })
                }
            }
        }

        let summary = self.stage.summary();
        tracing::info!(stage = %id, elements = summary.elements_seen, "Relay finished");
        Ok(summary)
    }
}
