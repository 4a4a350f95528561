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

use crate::{
    index::{IndexManagerError, RoutingIndexManager},
    model::{DimensionId, ModelError, RoutingModel},
};
use std::fmt::Display;
use task_alloc_model::{matrix::DistanceMatrix, problem::Problem};
use tracing::{debug, info, instrument};

pub const DEFAULT_PENALTY: i64 = 10_000;
pub const AVAILABILITY_DIMENSION: &str = "Availability";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildModelError {
    MatrixSizeMismatch { matrix: usize, locations: usize },
    NegativePenalty(i64),
    Index(IndexManagerError),
    Model(ModelError),
}

impl Display for BuildModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildModelError::MatrixSizeMismatch { matrix, locations } => write!(
                f,
                "Distance matrix covers {matrix} locations, problem has {locations}"
            ),
            BuildModelError::NegativePenalty(p) => write!(f, "Drop penalty {p} is negative"),
            BuildModelError::Index(e) => write!(f, "{e}"),
            BuildModelError::Model(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for BuildModelError {}

impl From<IndexManagerError> for BuildModelError {
    fn from(value: IndexManagerError) -> Self {
        BuildModelError::Index(value)
    }
}

impl From<ModelError> for BuildModelError {
    fn from(value: ModelError) -> Self {
        BuildModelError::Model(value)
    }
}

/// Encodes a [`Problem`] as a routing model: one vehicle per agent anchored
/// at the agent's own node, one optional visit per task.
///
/// Arc costs are rounded kilometres. Task durations accumulate in the
/// [`AVAILABILITY_DIMENSION`] against each agent's availability; the two
/// quantities are never mixed.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentModelBuilder<'p> {
    problem: &'p Problem,
    matrix: &'p DistanceMatrix,
    penalty: i64,
}

impl<'p> AssignmentModelBuilder<'p> {
    pub fn new(problem: &'p Problem, matrix: &'p DistanceMatrix) -> Self {
        Self {
            problem,
            matrix,
            penalty: DEFAULT_PENALTY,
        }
    }

    pub fn with_penalty(mut self, penalty: i64) -> Self {
        self.penalty = penalty;
        self
    }

    #[inline]
    pub fn penalty(&self) -> i64 {
        self.penalty
    }

    /// Node `i < agents` is agent `i`; task `t` is node `agents + t`.
    pub fn index_manager(&self) -> Result<RoutingIndexManager, BuildModelError> {
        let locations = self.problem.num_locations();
        if self.matrix.size() != locations {
            return Err(BuildModelError::MatrixSizeMismatch {
                matrix: self.matrix.size(),
                locations,
            });
        }
        Ok(RoutingIndexManager::with_self_anchored_vehicles(
            locations,
            self.problem.num_agents(),
        )?)
    }

    #[instrument(skip_all, fields(
        tasks = self.problem.num_tasks(),
        agents = self.problem.num_agents(),
        penalty = self.penalty,
    ), err(Display))]
    pub fn build<'m>(
        &self,
        manager: &'m RoutingIndexManager,
    ) -> Result<RoutingModel<'m>, BuildModelError>
    where
        'p: 'm,
    {
        if self.penalty < 0 {
            return Err(BuildModelError::NegativePenalty(self.penalty));
        }
        let problem = self.problem;
        let matrix = self.matrix;
        let mut model = RoutingModel::new(manager);

        let distance = model.register_transit_callback(move |from, to| {
            matrix
                .arc_cost(manager.index_to_node(from), manager.index_to_node(to))
                .value()
        });
        model.set_arc_cost_evaluator_of_all_vehicles(distance)?;

        let service = model.register_unary_transit_callback(move |from| {
            problem
                .task_at_node(manager.index_to_node(from))
                .map_or(0, |t| t.duration().value())
        });
        let availabilities: Vec<i64> = problem
            .agents()
            .iter()
            .map(|a| a.availability().value())
            .collect();
        let dimension: DimensionId = model.add_dimension_with_vehicle_capacity(
            service,
            0,
            availabilities,
            true,
            AVAILABILITY_DIMENSION,
        )?;
        debug!(dimension = dimension.value(), "Availability dimension added");

        let mut pruned = 0usize;
        let mut unservable = 0usize;
        for (pos, task) in problem.tasks().iter().enumerate() {
            let index = manager
                .node_to_index(problem.task_node(pos))
                .ok_or(ModelError::IndexOutOfRange {
                    index: problem.task_node(pos),
                    num_indices: manager.num_indices(),
                })?;
            let mut eligible = 0usize;
            for (vehicle, agent) in problem.agents().iter().enumerate() {
                if agent.can_serve(task) {
                    eligible += 1;
                } else {
                    model.remove_vehicle_from_node(index, vehicle)?;
                    pruned += 1;
                }
            }
            if eligible == 0 {
                unservable += 1;
                debug!(task = %task.id(), "No agent can serve task");
            }
            model.add_disjunction(&[index], self.penalty)?;
        }

        info!(pruned, unservable, "Routing model initialized");
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use task_alloc_core::{geo::GeoPoint, minutes::Minutes};
    use task_alloc_model::{
        id::{AgentId, Pincode, TaskId},
        matrix::{DistanceMatrixBuilder, WorkerPool},
        problem::ProblemBuilder,
        task::{Agent, Task},
    };

    fn problem() -> Problem {
        let mut pb = ProblemBuilder::new();
        pb.add_agent(Agent::new(
            AgentId::new(1),
            ["plumbing"],
            GeoPoint::new(12.97, 77.59),
            Minutes::new(60),
            [Pincode::new(560001)],
        ))
        .unwrap();
        pb.add_agent(Agent::new(
            AgentId::new(2),
            ["electrical"],
            GeoPoint::new(12.93, 77.62),
            Minutes::new(30),
            [Pincode::new(560001)],
        ))
        .unwrap();
        pb.add_task(Task::new(
            TaskId::new(10),
            "plumbing",
            GeoPoint::new(12.96, 77.60),
            Pincode::new(560001),
            Minutes::new(20),
        ))
        .unwrap();
        pb.add_task(Task::new(
            TaskId::new(11),
            "welding",
            GeoPoint::new(12.95, 77.61),
            Pincode::new(560001),
            Minutes::new(20),
        ))
        .unwrap();
        pb.build().unwrap()
    }

    fn matrix(problem: &Problem) -> DistanceMatrix {
        let pool = WorkerPool::new(2).unwrap();
        DistanceMatrixBuilder::new(&pool)
            .build(&problem.locations())
            .unwrap()
    }

    #[test]
    fn test_model_prunes_ineligible_agents() {
        let p = problem();
        let m = matrix(&p);
        let builder = AssignmentModelBuilder::new(&p, &m);
        let manager = builder.index_manager().unwrap();
        let model = builder.build(&manager).unwrap();

        let plumbing = manager.node_to_index(p.task_node(0)).unwrap();
        let welding = manager.node_to_index(p.task_node(1)).unwrap();
        assert!(model.is_vehicle_allowed_for_index(0, plumbing));
        assert!(!model.is_vehicle_allowed_for_index(1, plumbing));
        assert!(!model.is_vehicle_allowed_for_index(0, welding));
        assert!(!model.is_vehicle_allowed_for_index(1, welding));

        assert!(model.disjunction_of(plumbing).is_some());
        assert!(model.disjunction_of(welding).is_some());
        assert!(model.dimension(AVAILABILITY_DIMENSION).is_some());
        assert_eq!(model.vehicles(), 2);
        assert_eq!(manager.index_to_node(model.start(1)), 1);
        assert_eq!(manager.index_to_node(model.end(1)), 1);
    }

    #[test]
    fn test_matrix_size_checked() {
        let p = problem();
        let pool = WorkerPool::new(1).unwrap();
        let small = DistanceMatrixBuilder::new(&pool)
            .build(&p.locations()[..2])
            .unwrap();
        let err = AssignmentModelBuilder::new(&p, &small)
            .index_manager()
            .unwrap_err();
        assert_eq!(
            err,
            BuildModelError::MatrixSizeMismatch {
                matrix: 2,
                locations: 4
            }
        );
    }

    #[test]
    fn test_negative_penalty_rejected() {
        let p = problem();
        let m = matrix(&p);
        let builder = AssignmentModelBuilder::new(&p, &m).with_penalty(-1);
        let manager = builder.index_manager().unwrap();
        assert!(matches!(
            builder.build(&manager),
            Err(BuildModelError::NegativePenalty(-1))
        ));
    }
}
