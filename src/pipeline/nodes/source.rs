//! Source node: generates the sequence, times the run, starts termination.

use crate::pipeline::error::PipelineResult;
use crate::pipeline::message::{Element, PipelineMessage};
use crate::pipeline::report::Reporter;
use crate::pipeline::transport::{AckReceiver, DataSender};
use std::time::{Duration, Instant};

/// Number of clock samples taken when estimating the timer resolution.
const RESOLUTION_SAMPLES: usize = 1_000;

/// `element[i] = i + 1` for `i` in `0..n`.
pub fn generate_sequence(n: usize) -> Vec<Element> {
    (1..=n as Element).collect()
}

/// Smallest non-zero step observed between consecutive `Instant` readings.
pub fn clock_resolution() -> Duration {
    let mut best: Option<Duration> = None;
    for _ in 0..RESOLUTION_SAMPLES {
        let a = Instant::now();
        let mut b = Instant::now();
        while b == a {
            b = Instant::now();
        }
        let step = b - a;
        best = Some(best.map_or(step, |cur| cur.min(step)));
    }
    best.unwrap_or(Duration::from_nanos(1))
}

/// What the source learned from a completed run.
#[derive(Debug, Clone, Copy)]
pub struct SourceOutcome {
    /// Time from the first send until the sink's acknowledgment arrived.
    pub elapsed: Duration,
    pub messages_sent: usize,
}

/// Stage 0 of the chain.
pub struct SourceNode<R: Reporter> {
    sequence: Vec<Element>,
    downstream: DataSender,
    ack: AckReceiver,
    reporter: R,
}

impl<R: Reporter> SourceNode<R> {
    pub fn new(sequence: Vec<Element>, downstream: DataSender, ack: AckReceiver, reporter: R) -> Self {
        Self {
            sequence,
            downstream,
            ack,
            reporter,
        }
    }

    /// Stream every element then the sentinel, and wait for the acknowledgment.
    pub fn run(mut self) -> PipelineResult<SourceOutcome> {
        let stage = self.downstream.stage();
        self.reporter.sequence(&self.sequence);
        self.reporter.timer_resolution(clock_resolution());

        tracing::info!(%stage, elements = self.sequence.len(), "Source started");
        let start = Instant::now();

        for &value in &self.sequence {
            self.downstream.send(&PipelineMessage::element(value))?;
            tracing::debug!(%stage, value, "Sent element");
        }
        self.downstream.send(&PipelineMessage::sentinel())?;
        tracing::debug!(%stage, "Sent sentinel");

        self.ack.recv()?;
        let elapsed = start.elapsed();

        self.reporter.elapsed(elapsed);
        tracing::info!(%stage, ?elapsed, "Acknowledgment received");

        Ok(SourceOutcome {
            elapsed,
            messages_sent: self.sequence.len() + 1,
        })
    }
}
