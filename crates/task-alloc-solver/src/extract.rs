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

use crate::{assignment::Assignment, model::RoutingModel};
use task_alloc_model::{
    id::TaskId,
    matrix::DistanceMatrix,
    problem::Problem,
    sol::{AgentAssignment, AssignmentOutcome, AssignmentSolution},
};
use tracing::{info, instrument, warn};

/// Reads the engine's routes back into agent assignments.
#[derive(Debug, Clone, Copy)]
pub struct SolutionExtractor<'p> {
    problem: &'p Problem,
    matrix: &'p DistanceMatrix,
}

impl<'p> SolutionExtractor<'p> {
    pub fn new(problem: &'p Problem, matrix: &'p DistanceMatrix) -> Self {
        Self { problem, matrix }
    }

    #[instrument(skip_all, fields(solved = assignment.is_some()))]
    pub fn extract(
        &self,
        model: &RoutingModel<'_>,
        assignment: Option<&Assignment>,
    ) -> AssignmentOutcome {
        let Some(assignment) = assignment else {
            warn!("No solution found");
            return AssignmentOutcome::no_solution();
        };

        let agent_assignments: Vec<AgentAssignment> = (0..model.vehicles())
            .map(|vehicle| self.agent_route(model, assignment, vehicle))
            .collect();
        let unassigned = self.unassigned(model, assignment);
        if !unassigned.is_empty() {
            let ids: Vec<u64> = unassigned.iter().map(|t| t.value()).collect();
            info!(count = ids.len(), tasks = ?ids, "Unassigned tasks");
        }

        AssignmentSolution::new(agent_assignments, unassigned).into()
    }

    fn agent_route(
        &self,
        model: &RoutingModel<'_>,
        assignment: &Assignment,
        vehicle: usize,
    ) -> AgentAssignment {
        let manager = model.manager();
        let agent = &self.problem.agents()[vehicle];
        let mut tasks: Vec<TaskId> = Vec::new();
        let mut total_distance = 0.0;
        let mut last_location = None;

        let mut index = model.start(vehicle);
        // bounded walk; a well-formed route visits every index at most once
        for _ in 0..manager.num_indices() {
            if model.is_end(index) {
                break;
            }
            let next = assignment.value(model.next_var(index));
            if !model.is_end(next) {
                let from = manager.index_to_node(index);
                let to = manager.index_to_node(next);
                total_distance += self.matrix.km(from, to);
                if let Some(task) = self.problem.task_at_node(to) {
                    tasks.push(task.id());
                    last_location = Some(task.location());
                }
            }
            index = next;
        }

        let ids: Vec<u64> = tasks.iter().map(|t| t.value()).collect();
        info!(
            agent = %agent.id(),
            tasks = ?ids,
            total_distance_km = total_distance,
            "Agent assignment"
        );
        AgentAssignment::new(agent.id(), tasks, total_distance, last_location)
    }

    fn unassigned(&self, model: &RoutingModel<'_>, assignment: &Assignment) -> Vec<TaskId> {
        let manager = model.manager();
        self.problem
            .tasks()
            .iter()
            .enumerate()
            .filter(|(pos, _)| {
                manager
                    .node_to_index(self.problem.task_node(*pos))
                    .is_some_and(|index| assignment.value(model.next_var(index)) == index)
            })
            .map(|(_, t)| t.id())
            .collect()
    }
}
