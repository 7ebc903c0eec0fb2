//! Static linear arrangement of the stages.
//!
//! ```text
//! stage 0 ──► stage 1 ──► … ──► stage P-1
//! (source)   (intermediates)     (sink)
//!    ▲                              │
//!    └──────────── ack ─────────────┘
//! ```

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::StageId;
use crate::pipeline::role::{assign_role, Role};
use crate::pipeline::stage::StageKind;

/// Smallest supported process count: one source plus one sink.
pub const MIN_PROCESS_COUNT: usize = 2;

/// Largest process count: stage ids are `u32`.
pub const MAX_PROCESS_COUNT: usize = u32::MAX as usize;

/// Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Topology {
    process_count: usize,
}

impl Topology {
    pub fn new(process_count: usize) -> PipelineResult<Self> {
        if !(MIN_PROCESS_COUNT..=MAX_PROCESS_COUNT).contains(&process_count) {
            return Err(PipelineError::InvalidTopology { process_count });
        }
        Ok(Self { process_count })
    }

    pub fn process_count(&self) -> usize {
        self.process_count
    }

    /// Number of non-source stages (K).
    pub fn worker_count(&self) -> usize {
        self.process_count - 1
    }

    pub fn sink(&self) -> StageId {
        StageId(self.worker_count() as u32)
    }

    /// Stages strictly between the source and the sink, in chain order.
    pub fn intermediates(&self) -> impl Iterator<Item = StageId> {
        (1..self.worker_count() as u32).map(StageId)
    }

    /// `None` for the source and for ids outside the chain.
    pub fn kind_of(&self, stage: StageId) -> Option<StageKind> {
        if stage.is_source() || stage.index() >= self.process_count {
            None
        } else if stage == self.sink() {
            Some(StageKind::Sink)
        } else {
            Some(StageKind::Intermediate)
        }
    }

    /// Operators owned by `stage`. The source owns nothing.
    pub fn role_for(&self, stage: StageId) -> Role {
        stage
            .worker_index()
            .map(|idx| assign_role(idx, self.worker_count()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::role::Operator;

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_rejects_count_beyond_stage_ids() {
        let too_many = MAX_PROCESS_COUNT + 1;
        assert!(matches!(
            Topology::new(too_many),
            Err(PipelineError::InvalidTopology { process_count }) if process_count == too_many
        ));
        let widest = Topology::new(MAX_PROCESS_COUNT).unwrap();
        assert_eq!(widest.sink(), StageId(u32::MAX - 1));
    }

    #[test]
    fn test_rejects_single_process() {
        assert!(matches!(
            Topology::new(1),
            Err(PipelineError::InvalidTopology { process_count: 1 })
        ));
        assert!(Topology::new(0).is_err());
    }

    #[test]
    fn test_two_processes_is_source_and_sink() {
        let topo = Topology::new(2).unwrap();
        assert_eq!(topo.worker_count(), 1);
        assert_eq!(topo.sink(), StageId(1));
        assert_eq!(topo.intermediates().count(), 0);
        assert_eq!(topo.role_for(StageId(1)), Role::all());
    }

    #[test]
    fn test_stage_kinds() {
        let topo = Topology::new(5).unwrap();
        assert_eq!(topo.kind_of(StageId(0)), None);
        assert_eq!(topo.kind_of(StageId(1)), Some(StageKind::Intermediate));
        assert_eq!(topo.kind_of(StageId(3)), Some(StageKind::Intermediate));
        assert_eq!(topo.kind_of(StageId(4)), Some(StageKind::Sink));
        assert_eq!(topo.kind_of(StageId(5)), None);
        assert_eq!(
            topo.intermediates().collect::<Vec<_>>(),
            vec![StageId(1), StageId(2), StageId(3)]
        );
    }

    #[test]
    fn test_roles_follow_worker_index() {
        let topo = Topology::new(6).unwrap();
        assert!(topo.role_for(StageId::SOURCE).is_forwarder());
        assert_eq!(topo.role_for(StageId(1)), Role::only(Operator::Sum));
        assert_eq!(topo.role_for(StageId(2)), Role::only(Operator::Sub));
        assert_eq!(topo.role_for(StageId(3)), Role::only(Operator::Mul));
        assert!(topo.role_for(StageId(4)).is_forwarder());
        assert!(topo.role_for(StageId(5)).is_forwarder());
    }
}
