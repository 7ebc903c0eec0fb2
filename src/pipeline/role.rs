//! Operator ownership per stage.
//!
//! The assignment is a fixed, asymmetric table rather than a load-balancing
//! rule:
//!
//! | workers | worker 0 | worker 1  | worker 2 | worker ≥ 3 |
//! |---------|----------|-----------|----------|------------|
//! | 1       | all      |           |          |            |
//! | 2       | sum      | sub, mul  |          |            |
//! | ≥ 3     | sum      | sub       | mul      | forwarder  |

use std::fmt;

/// A reduction operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Sum,
    Sub,
    Mul,
}

impl Operator {
    pub const ALL: [Operator; 3] = [Operator::Sum, Operator::Sub, Operator::Mul];

    /// Starting value of the accumulator for this operator.
    #[inline]
    pub fn identity(self) -> i64 {
        match self {
            Operator::Sum | Operator::Sub => 0,
            Operator::Mul => 1,
        }
    }

    #[inline]
    pub fn apply(self, acc: i64, value: i64) -> i64 {
        match self {
            Operator::Sum => acc + value,
            Operator::Sub => acc - value,
            Operator::Mul => acc * value,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Operator::Sum => "sum",
            Operator::Sub => "sub",
            Operator::Mul => "mul",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of operators owned by one stage. Computed once, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Role {
    pub do_sum: bool,
    pub do_sub: bool,
    pub do_mul: bool,
}

impl Role {
    pub const fn none() -> Self {
        Self {
            do_sum: false,
            do_sub: false,
            do_mul: false,
        }
    }

    pub const fn all() -> Self {
        Self {
            do_sum: true,
            do_sub: true,
            do_mul: true,
        }
    }

    pub fn only(op: Operator) -> Self {
        Self::none().with(op)
    }

    pub fn with(mut self, op: Operator) -> Self {
        match op {
            Operator::Sum => self.do_sum = true,
            Operator::Sub => self.do_sub = true,
            Operator::Mul => self.do_mul = true,
        }
        self
    }

    #[inline]
    pub fn owns(&self, op: Operator) -> bool {
        match op {
            Operator::Sum => self.do_sum,
            Operator::Sub => self.do_sub,
            Operator::Mul => self.do_mul,
        }
    }

    pub fn operators(&self) -> impl Iterator<Item = Operator> + '_ {
        Operator::ALL.into_iter().filter(|op| self.owns(*op))
    }

    /// A stage owning nothing only relays messages.
    pub fn is_forwarder(&self) -> bool {
        *self == Self::none()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_forwarder() {
            return f.write_str("{}");
        }
        let names: Vec<_> = self.operators().map(Operator::name).collect();
        write!(f, "{{{}}}", names.join(", "))
    }
}

/// Operators owned by worker `stage_index` (0-based) out of `worker_count`.
///
/// Out-of-range indices and an empty worker set yield the empty role.
pub fn assign_role(stage_index: usize, worker_count: usize) -> Role {
    if stage_index >= worker_count {
        return Role::none();
    }
    match (worker_count, stage_index) {
        (1, _) => Role::all(),
        (2, 0) => Role::only(Operator::Sum),
        (2, _) => Role::only(Operator::Sub).with(Operator::Mul),
        (_, 0) => Role::only(Operator::Sum),
        (_, 1) => Role::only(Operator::Sub),
        (_, 2) => Role::only(Operator::Mul),
        _ => Role::none(),
    }
}
