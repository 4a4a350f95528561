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
    assignment::Assignment,
    builder::{AssignmentModelBuilder, BuildModelError, DEFAULT_PENALTY},
    extract::SolutionExtractor,
    params::SearchParameters,
};
use task_alloc_model::{matrix::DistanceMatrix, problem::Problem, sol::AssignmentOutcome};
use tracing::{info, instrument};

/// Wraps the engine call, e.g. to observe resources while it runs.
pub trait EngineScope {
    fn run<R>(&self, engine: impl FnOnce() -> R) -> R;
}

/// Runs the engine as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unscoped;

impl EngineScope for Unscoped {
    #[inline]
    fn run<R>(&self, engine: impl FnOnce() -> R) -> R {
        engine()
    }
}

/// Model construction, engine call and extraction for one problem.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentSolver {
    penalty: i64,
    params: SearchParameters,
}

impl Default for AssignmentSolver {
    fn default() -> Self {
        Self::new(DEFAULT_PENALTY, SearchParameters::default())
    }
}

impl AssignmentSolver {
    pub fn new(penalty: i64, params: SearchParameters) -> Self {
        Self { penalty, params }
    }

    #[inline]
    pub fn penalty(&self) -> i64 {
        self.penalty
    }

    #[inline]
    pub fn params(&self) -> &SearchParameters {
        &self.params
    }

    pub fn solve(
        &self,
        problem: &Problem,
        matrix: &DistanceMatrix,
    ) -> Result<AssignmentOutcome, BuildModelError> {
        self.solve_scoped(problem, matrix, &Unscoped)
    }

    #[instrument(skip_all, fields(tasks = problem.num_tasks(), agents = problem.num_agents()), err(Display))]
    pub fn solve_scoped<S: EngineScope>(
        &self,
        problem: &Problem,
        matrix: &DistanceMatrix,
        scope: &S,
    ) -> Result<AssignmentOutcome, BuildModelError> {
        let builder = AssignmentModelBuilder::new(problem, matrix).with_penalty(self.penalty);
        let manager = builder.index_manager()?;
        let model = builder.build(&manager)?;

        let assignment: Option<Assignment> =
            scope.run(|| model.solve_with_parameters(&self.params));

        let outcome = SolutionExtractor::new(problem, matrix).extract(&model, assignment.as_ref());
        if let (Some(a), Some(s)) = (&assignment, outcome.solution()) {
            info!(
                objective = a.objective().value(),
                assigned = s.assigned_task_count(),
                dropped = s.unassigned_tasks().len(),
                total_distance_km = s.total_distance_covered(),
                "Assignment solved"
            );
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, time::Duration};
    use task_alloc_core::{geo::GeoPoint, minutes::Minutes};
    use task_alloc_model::{
        id::{AgentId, Pincode, TaskId},
        matrix::{DistanceMatrixBuilder, WorkerPool},
        problem::ProblemBuilder,
        task::{Agent, Task},
    };

    struct Counting(Cell<usize>);

    impl EngineScope for Counting {
        fn run<R>(&self, engine: impl FnOnce() -> R) -> R {
            self.0.set(self.0.get() + 1);
            engine()
        }
    }

    #[test]
    fn test_scope_wraps_engine_once() {
        let mut pb = ProblemBuilder::new();
        pb.add_agent(Agent::new(
            AgentId::new(1),
            ["a"],
            GeoPoint::new(0.0, 0.0),
            Minutes::new(10),
            [Pincode::new(1)],
        ))
        .unwrap();
        pb.add_task(Task::new(
            TaskId::new(2),
            "a",
            GeoPoint::new(0.0, 0.01),
            Pincode::new(1),
            Minutes::new(5),
        ))
        .unwrap();
        let p = pb.build().unwrap();
        let pool = WorkerPool::new(1).unwrap();
        let m = DistanceMatrixBuilder::new(&pool).build(&p.locations()).unwrap();

        let solver = AssignmentSolver::new(
            100,
            SearchParameters::default()
                .with_time_limit(Duration::from_millis(50))
                .with_iteration_limit(50),
        );
        let scope = Counting(Cell::new(0));
        let outcome = solver.solve_scoped(&p, &m, &scope).unwrap();
        assert_eq!(scope.0.get(), 1);
        let s = outcome.solution().unwrap();
        assert_eq!(s.agent_for(TaskId::new(2)), Some(AgentId::new(1)));
        s.validate(&p).unwrap();
    }
}
