//! Pipeline executor: wires the edges, spawns one thread per worker stage,
//! runs the source on the calling thread and joins everything.
//!
//! A run either completes the full element → sentinel → acknowledgment
//! protocol or fails as a whole. When a stage fails it drops its endpoints;
//! its neighbours then see disconnected edges and unwind in turn, so no
//! thread is left blocked.

use crate::config::PipelineConfig;
use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::StageId;
use crate::pipeline::message::{Element, MAX_SEQUENCE_LEN};
use crate::pipeline::nodes::{generate_sequence, RelayNode, SinkNode, SinkOutcome, SourceNode};
use crate::pipeline::report::Reporter;
use crate::pipeline::stage::{Stage, StageKind, StageSummary, Totals};
use crate::pipeline::topology::Topology;
use crate::pipeline::transport::{ack_edge, data_edge};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Everything observed by a completed run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub process_count: usize,
    pub sequence: Vec<Element>,
    pub totals: Totals,
    pub elapsed: Duration,
    /// One entry per worker stage, in chain order.
    pub stages: Vec<StageSummary>,
}

/// A validated pipeline, ready to run any number of times.
#[derive(Debug, Clone)]
pub struct Pipeline {
    topology: Topology,
    sequence_len: usize,
    channel_capacity: usize,
}

impl Pipeline {
    pub fn new(topology: Topology, sequence_len: usize) -> PipelineResult<Self> {
        if sequence_len > MAX_SEQUENCE_LEN {
            return Err(PipelineError::SequenceTooLong {
                len: sequence_len,
                max: MAX_SEQUENCE_LEN,
            });
        }
        Ok(Self {
            topology,
            sequence_len,
            channel_capacity: 0,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        let topology = Topology::new(config.topology.process_count)?;
        Ok(Self::new(topology, config.sequence.length)?
            .with_channel_capacity(config.transport.channel_capacity))
    }

    /// Buffer size of every edge. `0` (the default) makes sends synchronous.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn sequence_len(&self) -> usize {
        self.sequence_len
    }

    /// Run the chain once to completion.
    ///
    /// `reporter` is cloned into the sink thread; the source keeps the
    /// original.
    pub fn run<R>(&self, reporter: R) -> PipelineResult<RunReport>
    where
        R: Reporter + Clone + 'static,
    {
        let topology = self.topology;
        let capacity = self.channel_capacity;
        let sink_id = topology.sink();
        let sequence = generate_sequence(self.sequence_len);

        tracing::info!(
            processes = topology.process_count(),
            elements = sequence.len(),
            capacity,
            "Starting pipeline run"
        );

        let (source_tx, mut upstream) = data_edge(StageId::SOURCE, StageId::SOURCE.next(), capacity);
        let (ack_tx, ack_rx) = ack_edge(sink_id, StageId::SOURCE, capacity);

        let mut relay_handles: Vec<(StageId, JoinHandle<PipelineResult<StageSummary>>)> =
            Vec::with_capacity(topology.worker_count().saturating_sub(1));

        let mut spawned = Ok(());
        for id in topology.intermediates() {
            let (downstream, next_upstream) = data_edge(id, id.next(), capacity);
            let stage = Stage::new(id, StageKind::Intermediate, topology.role_for(id));
            let node = RelayNode::new(stage, upstream, downstream);
            upstream = next_upstream;
            match spawn_stage(id, move || node.run()) {
                Ok(handle) => relay_handles.push((id, handle)),
                Err(e) => {
                    spawned = Err(e);
                    break;
                }
            }
        }

        let sink_reporter = reporter.clone();
        let sink_handle = match spawned.and_then(|()| {
            let sink_stage = Stage::new(sink_id, StageKind::Sink, topology.role_for(sink_id));
            let sink = SinkNode::new(sink_stage, upstream, ack_tx, sink_reporter);
            spawn_stage(sink_id, move || sink.run())
        }) {
            Ok(handle) => handle,
            Err(e) => {
                // Closing the first edge unwinds every relay already running.
                drop(source_tx);
                return Err(unwind_spawned(e, relay_handles));
            }
        };

        let source_result = SourceNode::new(sequence.clone(), source_tx, ack_rx, reporter).run();

        let mut errors = Vec::new();
        let mut stages = Vec::with_capacity(topology.worker_count());

        let source = match source_result {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                errors.push(e);
                None
            }
        };

        for (id, handle) in relay_handles {
            match join_stage(id, handle) {
                Ok(summary) => stages.push(summary),
                Err(e) => errors.push(e),
            }
        }

        let sink: Option<SinkOutcome> = match join_stage(sink_id, sink_handle) {
            Ok(outcome) => {
                stages.push(outcome.summary);
                Some(outcome)
            }
            Err(e) => {
                errors.push(e);
                None
            }
        };

        if let Some(err) = root_cause(errors) {
            tracing::error!(error = %err, "Pipeline run failed");
            return Err(err);
        }

        match (source, sink) {
            (Some(source), Some(sink)) => {
                tracing::info!(totals = %sink.totals, elapsed = ?source.elapsed, "Pipeline run complete");
                Ok(RunReport {
                    process_count: topology.process_count(),
                    sequence,
                    totals: sink.totals,
                    elapsed: source.elapsed,
                    stages,
                })
            }
            _ => Err(PipelineError::ProtocolViolation {
                stage: sink_id,
                message: "run ended without both source and sink completing".to_string(),
            }),
        }
    }
}

fn spawn_stage<T, F>(id: StageId, body: F) -> PipelineResult<JoinHandle<PipelineResult<T>>>
where
    T: Send + 'static,
    F: FnOnce() -> PipelineResult<T> + Send + 'static,
{
    thread::Builder::new()
        .name(format!("stage-{}", id.0))
        .spawn(body)
        .map_err(|source| PipelineError::Spawn { stage: id, source })
}

fn join_stage<T>(id: StageId, handle: JoinHandle<PipelineResult<T>>) -> PipelineResult<T> {
    handle
        .join()
        .map_err(|_| PipelineError::StagePanicked(id))?
}

/// Join the stages started before a spawn failure and hand back that failure.
///
/// The caller must already have dropped the sending end feeding the first
/// relay, otherwise the join blocks.
fn unwind_spawned(
    err: PipelineError,
    relays: Vec<(StageId, JoinHandle<PipelineResult<StageSummary>>)>,
) -> PipelineError {
    tracing::error!(error = %err, started = relays.len(), "Stage spawn failed, unwinding");
    for (id, handle) in relays {
        if let Err(e) = join_stage(id, handle) {
            tracing::debug!(stage = %id, error = %e, "Stage unwound");
        }
    }
    err
}

/// Pick the error that started the failure.
///
/// Disconnect errors are usually a consequence of another stage failing, so
/// the first error of any other kind wins.
fn root_cause(errors: Vec<PipelineError>) -> Option<PipelineError> {
    let mut derived = None;
    for err in errors {
        if !err.is_disconnect() {
            return Some(err);
        }
        derived.get_or_insert(err);
    }
    derived
}
