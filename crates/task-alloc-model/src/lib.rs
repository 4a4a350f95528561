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

//! # Task Allocation Model (`task-alloc-model`)
//!
//! The data side of assigning tasks to mobile agents: what arrives over the
//! wire, what a validated instance looks like, how far everything is from
//! everything else, and what an answer looks like.
//!
//! ## Key Data Structures
//!
//! - **`TaskRecord` / `AgentRecord`**: inbound records with every attribute
//!   optional. [`req::validate_input`] is the single place they are checked
//!   and turned into typed values.
//! - **`Task`**: id, required skill, location, pincode and duration.
//! - **`Agent`**: id, skill set, start/end location, availability (the
//!   capacity in minutes) and the pincodes the agent may work in.
//! - **`Problem`**: a validated instance. Its node layout puts the agents'
//!   anchors first and the tasks after them, both in input order.
//! - **`DistanceMatrix`**: haversine distances between all nodes, built row
//!   by row on a [`matrix::WorkerPool`].
//! - **`AssignmentSolution`**: per-agent routes, unassigned tasks and the
//!   total distance covered; [`sol::AssignmentOutcome`] adds the
//!   "no solution" terminal result.

pub mod err;
pub mod generator;
pub mod id;
pub mod matrix;
pub mod problem;
pub mod req;
pub mod sol;
pub mod task;

pub mod prelude {
    pub use crate::err::{
        CapacityExceededError, ComputationError, MalformedLocationError, MissingFieldError,
        NegativeQuantityError, RecordKind, RecordRef, SolutionValidationError, ValidationError,
    };
    pub use crate::generator::{
        InstanceGenConfig, InstanceGenConfigBuildError, InstanceGenConfigBuilder, InstanceGenerator,
    };
    pub use crate::id::{AgentId, Pincode, TaskId};
    pub use crate::matrix::{DEFAULT_POOL_SIZE, DistanceMatrix, DistanceMatrixBuilder, WorkerPool};
    pub use crate::problem::{Problem, ProblemBuilder};
    pub use crate::req::{AgentRecord, AssignmentRequest, TaskRecord, validate_input};
    pub use crate::sol::{
        AgentAssignment, AssignmentOutcome, AssignmentSolution, NO_SOLUTION_MESSAGE, NoSolution,
    };
    pub use crate::task::{Agent, Task};
}
