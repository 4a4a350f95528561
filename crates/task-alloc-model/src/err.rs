// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::id::{AgentId, TaskId};
use std::fmt::Display;
use task_alloc_core::minutes::Minutes;

/// Which kind of inbound record an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Task,
    Agent,
}

impl Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Task => write!(f, "Task"),
            RecordKind::Agent => write!(f, "Agent"),
        }
    }
}

/// Identifies a record by its id when present, otherwise by its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordRef {
    kind: RecordKind,
    position: usize,
    id: Option<u64>,
}

impl RecordRef {
    #[inline]
    pub fn new(kind: RecordKind, position: usize, id: Option<u64>) -> Self {
        Self { kind, position, id }
    }

    #[inline]
    pub fn kind(&self) -> RecordKind {
        self.kind
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn id(&self) -> Option<u64> {
        self.id
    }
}

impl Display for RecordRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "{} {} (#{})", self.kind, id, self.position),
            None => write!(f, "{} #{}", self.kind, self.position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MissingFieldError {
    record: RecordRef,
    fields: Vec<&'static str>,
}

impl MissingFieldError {
    #[inline]
    pub fn new(record: RecordRef, fields: Vec<&'static str>) -> Self {
        Self { record, fields }
    }

    #[inline]
    pub fn record(&self) -> RecordRef {
        self.record
    }

    #[inline]
    pub fn fields(&self) -> &[&'static str] {
        &self.fields
    }
}

impl Display for MissingFieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} is missing required fields: {}",
            self.record,
            self.fields.join(", ")
        )
    }
}

impl std::error::Error for MissingFieldError {}

#[derive(Debug, Clone, PartialEq)]
pub struct MalformedLocationError {
    record: RecordRef,
    values: Vec<f64>,
}

impl MalformedLocationError {
    #[inline]
    pub fn new(record: RecordRef, values: Vec<f64>) -> Self {
        Self { record, values }
    }

    #[inline]
    pub fn record(&self) -> RecordRef {
        self.record
    }

    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

impl Display for MalformedLocationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} has location {:?}, expected [latitude, longitude] within [-90, 90] x [-180, 180]",
            self.record, self.values
        )
    }
}

impl std::error::Error for MalformedLocationError {}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NegativeQuantityError {
    record: RecordRef,
    field: &'static str,
    value: i64,
}

impl NegativeQuantityError {
    #[inline]
    pub fn new(record: RecordRef, field: &'static str, value: i64) -> Self {
        Self {
            record,
            field,
            value,
        }
    }

    #[inline]
    pub fn record(&self) -> RecordRef {
        self.record
    }

    #[inline]
    pub fn field(&self) -> &'static str {
        self.field
    }

    #[inline]
    pub fn value(&self) -> i64 {
        self.value
    }
}

impl Display for NegativeQuantityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} has negative {}: {}",
            self.record, self.field, self.value
        )
    }
}

impl std::error::Error for NegativeQuantityError {}

/// Rejection of an inbound request before any computation runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The task list was absent or empty.
    NoTasks,
    /// The agent list was absent or empty.
    NoAgents,
    MissingField(MissingFieldError),
    MalformedLocation(MalformedLocationError),
    NegativeQuantity(NegativeQuantityError),
    DuplicateTaskId(TaskId),
    DuplicateAgentId(AgentId),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NoTasks => {
                write!(f, "Tasks and agents cannot be empty or null: no tasks given")
            }
            ValidationError::NoAgents => {
                write!(f, "Tasks and agents cannot be empty or null: no agents given")
            }
            ValidationError::MissingField(e) => write!(f, "{e}"),
            ValidationError::MalformedLocation(e) => write!(f, "{e}"),
            ValidationError::NegativeQuantity(e) => write!(f, "{e}"),
            ValidationError::DuplicateTaskId(id) => write!(f, "Duplicate task id: {}", id.value()),
            ValidationError::DuplicateAgentId(id) => {
                write!(f, "Duplicate agent id: {}", id.value())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<MissingFieldError> for ValidationError {
    fn from(value: MissingFieldError) -> Self {
        ValidationError::MissingField(value)
    }
}

impl From<MalformedLocationError> for ValidationError {
    fn from(value: MalformedLocationError) -> Self {
        ValidationError::MalformedLocation(value)
    }
}

impl From<NegativeQuantityError> for ValidationError {
    fn from(value: NegativeQuantityError) -> Self {
        ValidationError::NegativeQuantity(value)
    }
}

/// Failure while computing the distance matrix. No partial matrix survives it.
#[derive(Debug, Clone, PartialEq)]
pub enum ComputationError {
    /// The distance kernel produced a non-finite value.
    NonFiniteDistance { row: usize, column: usize, value: f64 },
    /// The worker computing `row` panicked.
    WorkerPanicked { row: usize, message: String },
    /// The worker pool could not be created.
    PoolUnavailable(String),
}

impl Display for ComputationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComputationError::NonFiniteDistance { row, column, value } => write!(
                f,
                "Distance between locations {row} and {column} is not finite: {value}"
            ),
            ComputationError::WorkerPanicked { row, message } => {
                write!(f, "Worker computing distance row {row} failed: {message}")
            }
            ComputationError::PoolUnavailable(reason) => {
                write!(f, "Worker pool unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for ComputationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CapacityExceededError {
    agent: AgentId,
    assigned: Minutes,
    availability: Minutes,
}

impl CapacityExceededError {
    #[inline]
    pub fn new(agent: AgentId, assigned: Minutes, availability: Minutes) -> Self {
        Self {
            agent,
            assigned,
            availability,
        }
    }

    #[inline]
    pub fn agent(&self) -> AgentId {
        self.agent
    }

    #[inline]
    pub fn assigned(&self) -> Minutes {
        self.assigned
    }

    #[inline]
    pub fn availability(&self) -> Minutes {
        self.availability
    }
}

impl Display for CapacityExceededError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Agent {} is assigned {} of work but only has {} available",
            self.agent.value(),
            self.assigned,
            self.availability
        )
    }
}

impl std::error::Error for CapacityExceededError {}

/// A solution that breaks one of the allocation invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum SolutionValidationError {
    UnknownAgent(AgentId),
    UnknownTask(TaskId),
    /// The task appears more than once across routes and the unassigned list.
    DuplicateTask(TaskId),
    /// The task appears neither in a route nor in the unassigned list.
    MissingTask(TaskId),
    IneligibleAgent { agent: AgentId, task: TaskId },
    CapacityExceeded(CapacityExceededError),
    RouteDistanceMismatch {
        agent: AgentId,
        reported: f64,
        recomputed: f64,
    },
    TotalDistanceMismatch { reported: f64, sum_of_agents: f64 },
}

impl Display for SolutionValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolutionValidationError::UnknownAgent(id) => {
                write!(f, "Unknown agent {} in solution", id.value())
            }
            SolutionValidationError::UnknownTask(id) => {
                write!(f, "Unknown task {} in solution", id.value())
            }
            SolutionValidationError::DuplicateTask(id) => {
                write!(f, "Task {} appears more than once", id.value())
            }
            SolutionValidationError::MissingTask(id) => {
                write!(f, "Task {} is neither assigned nor unassigned", id.value())
            }
            SolutionValidationError::IneligibleAgent { agent, task } => write!(
                f,
                "Agent {} lacks the skill or pincode for task {}",
                agent.value(),
                task.value()
            ),
            SolutionValidationError::CapacityExceeded(e) => write!(f, "{e}"),
            SolutionValidationError::RouteDistanceMismatch {
                agent,
                reported,
                recomputed,
            } => write!(
                f,
                "Agent {} reports {reported} km but its route measures {recomputed} km",
                agent.value()
            ),
            SolutionValidationError::TotalDistanceMismatch {
                reported,
                sum_of_agents,
            } => write!(
                f,
                "Total distance {reported} km differs from the agents' sum {sum_of_agents} km"
            ),
        }
    }
}

impl std::error::Error for SolutionValidationError {}

impl From<CapacityExceededError> for SolutionValidationError {
    fn from(value: CapacityExceededError) -> Self {
        SolutionValidationError::CapacityExceeded(value)
    }
}
