//! Sink node: the last stage. Absorbs elements, reports the totals and
//! acknowledges the source.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::report::Reporter;
use crate::pipeline::stage::{Stage, StageSummary, Totals, Transition};
use crate::pipeline::transport::{AckSender, DataReceiver};

/// What the sink hands back once the run has drained.
#[derive(Debug, Clone, Copy)]
pub struct SinkOutcome {
    pub totals: Totals,
    pub summary: StageSummary,
}

pub struct SinkNode<R: Reporter> {
    stage: Stage,
    upstream: DataReceiver,
    ack: AckSender,
    reporter: R,
}

impl<R: Reporter> SinkNode<R> {
    pub fn new(stage: Stage, upstream: DataReceiver, ack: AckSender, reporter: R) -> Self {
        Self {
            stage,
            upstream,
            ack,
            reporter,
        }
    }

    pub fn run(mut self) -> PipelineResult<SinkOutcome> {
        let id = self.stage.id();
        tracing::info!(stage = %id, role = %self.stage.role(), "Sink started");

        loop {
            let msg = self.upstream.recv()?;
            match self.stage.on_message(msg)? {
                Transition::Consumed => {
                    tracing::debug!(stage = %id, value = msg.value, "Absorbed element");
                }
                Transition::Complete(totals) => {
                    // Results are out before the source stops its clock.
                    self.reporter.totals(id, &totals);
                    self.ack.send()?;
                    tracing::info!(stage = %id, %totals, "Sink finished");
                    return Ok(SinkOutcome {
                        totals,
                        summary: self.stage.summary(),
                    });
                }
                other => {
                    return Err(PipelineError::ProtocolViolation {
                        stage: id,
                        message: format!("sink stage produced {other:?}"),
                    })
                }
            }
        }
    }
}
