//! Per-stage state machine.
//!
//! A `Stage` is driven one message at a time through `on_message` and never
//! touches a channel itself, so the termination condition and the
//! single-sentinel invariant can be checked without threads. The node loops
//! in `pipeline::nodes` feed it from their upstream endpoint.
//!
//! ```text
//!            element                 sentinel
//!   RUNNING ─────────► RUNNING   RUNNING ─────────► DONE
//! ```

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::StageId;
use crate::pipeline::message::{Element, PipelineMessage};
use crate::pipeline::role::{Operator, Role};
use std::fmt;

/// Where a worker sits in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    /// Forwards every message to its successor.
    Intermediate,
    /// Last stage: absorbs elements, reports totals, acknowledges the source.
    Sink,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagePhase {
    Running,
    Done,
}

/// Accumulator triple owned by one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageState {
    pub sum_acc: i64,
    pub sub_acc: i64,
    pub mul_acc: i64,
}

impl Default for StageState {
    fn default() -> Self {
        Self {
            sum_acc: Operator::Sum.identity(),
            sub_acc: Operator::Sub.identity(),
            mul_acc: Operator::Mul.identity(),
        }
    }
}

impl StageState {
    fn slot(&mut self, op: Operator) -> &mut i64 {
        match op {
            Operator::Sum => &mut self.sum_acc,
            Operator::Sub => &mut self.sub_acc,
            Operator::Mul => &mut self.mul_acc,
        }
    }

    pub fn get(&self, op: Operator) -> i64 {
        match op {
            Operator::Sum => self.sum_acc,
            Operator::Sub => self.sub_acc,
            Operator::Mul => self.mul_acc,
        }
    }

    /// Fold `value` into every accumulator `role` owns.
    pub fn apply(&mut self, role: Role, value: Element) {
        for op in role.operators() {
            let acc = self.slot(op);
            *acc = op.apply(*acc, value);
        }
    }

    /// Overwrite the owned fields of `msg` with this state's accumulators.
    pub fn write_owned(&self, role: Role, msg: &mut PipelineMessage) {
        for op in role.operators() {
            *message_field(msg, op) = self.get(op);
        }
    }

    /// Take over upstream aggregates for operators this stage does not own.
    ///
    /// A field still at its identity value is treated as "not computed yet".
    /// This assumes each operator has at most one owner upstream.
    pub fn adopt_upstream(&mut self, role: Role, msg: &PipelineMessage) {
        for op in Operator::ALL {
            if role.owns(op) {
                continue;
            }
            let carried = message_field_value(msg, op);
            if carried != op.identity() {
                *self.slot(op) = carried;
            }
        }
    }

    pub fn totals(&self) -> Totals {
        Totals {
            sum: self.sum_acc,
            negated_sum: self.sub_acc,
            product: self.mul_acc,
        }
    }
}

fn message_field(msg: &mut PipelineMessage, op: Operator) -> &mut i64 {
    match op {
        Operator::Sum => &mut msg.sum_acc,
        Operator::Sub => &mut msg.sub_acc,
        Operator::Mul => &mut msg.mul_acc,
    }
}

fn message_field_value(msg: &PipelineMessage, op: Operator) -> i64 {
    match op {
        Operator::Sum => msg.sum_acc,
        Operator::Sub => msg.sub_acc,
        Operator::Mul => msg.mul_acc,
    }
}

/// Final values reported by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub sum: i64,
    pub negated_sum: i64,
    pub product: i64,
}

impl Totals {
    /// Expected totals for the sequence `1..=n`.
    pub fn closed_form(n: usize) -> Self {
        let n = n as i64;
        let sum = n * (n + 1) / 2;
        Self {
            sum,
            negated_sum: -sum,
            product: (1..=n).product(),
        }
    }
}

impl fmt::Display for Totals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sum={} negated_sum={} product={}",
            self.sum, self.negated_sum, self.product
        )
    }
}

/// What the node loop must do after one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Send this message downstream and keep running.
    Forward(PipelineMessage),
    /// Element absorbed by the sink; nothing to send.
    Consumed,
    /// Sentinel reached an intermediate stage: relay it unchanged and stop.
    Relay(PipelineMessage),
    /// Sentinel reached the sink: report these totals and stop.
    Complete(Totals),
}

/// Per-worker counters returned when a stage thread finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    pub stage: StageId,
    pub kind: StageKind,
    pub role: Role,
    pub elements_seen: usize,
    pub sentinels_seen: usize,
}

/// A worker stage's state machine.
#[derive(Debug, Clone)]
pub struct Stage {
    id: StageId,
    kind: StageKind,
    role: Role,
    state: StageState,
    phase: StagePhase,
    elements_seen: usize,
    sentinels_seen: usize,
}

impl Stage {
    pub fn new(id: StageId, kind: StageKind, role: Role) -> Self {
        Self {
            id,
            kind,
            role,
            state: StageState::default(),
            phase: StagePhase::Running,
            elements_seen: 0,
            sentinels_seen: 0,
        }
    }

    pub fn id(&self) -> StageId {
        self.id
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    pub fn state(&self) -> &StageState {
        &self.state
    }

    pub fn is_done(&self) -> bool {
        self.phase == StagePhase::Done
    }

    /// Advance the state machine by one incoming message.
    pub fn on_message(&mut self, mut msg: PipelineMessage) -> PipelineResult<Transition> {
        if self.is_done() {
            return Err(PipelineError::ProtocolViolation {
                stage: self.id,
                message: "message received after the sentinel".to_string(),
            });
        }

        if msg.is_end {
            self.sentinels_seen += 1;
            self.phase = StagePhase::Done;
            return Ok(match self.kind {
                StageKind::Intermediate => Transition::Relay(msg),
                StageKind::Sink => Transition::Complete(self.state.totals()),
            });
        }

        self.elements_seen += 1;
        self.state.apply(self.role, msg.value);

        match self.kind {
            StageKind::Intermediate => {
                self.state.write_owned(self.role, &mut msg);
                Ok(Transition::Forward(msg))
            }
            StageKind::Sink => {
                self.state.adopt_upstream(self.role, &msg);
                Ok(Transition::Consumed)
            }
        }
    }

    pub fn summary(&self) -> StageSummary {
        StageSummary {
            stage: self.id,
            kind: self.kind,
            role: self.role,
            elements_seen: self.elements_seen,
            sentinels_seen: self.sentinels_seen,
        }
    }
}
