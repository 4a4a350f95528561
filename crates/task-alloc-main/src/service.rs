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

use crate::{config::AppConfig, error::ServiceError, monitor::ResourceMonitor};
use std::time::Duration;
use task_alloc_model::{
    matrix::{DistanceMatrixBuilder, WorkerPool},
    req::AssignmentRequest,
    sol::AssignmentOutcome,
};
use task_alloc_solver::solve::AssignmentSolver;
use tracing::{info, instrument};

/// Runs allocation requests: validate, build the distance matrix, solve
/// under the resource monitor, extract.
///
/// Owns the worker pool for the lifetime of the service; dropping the
/// service releases it.
#[derive(Debug)]
pub struct AssignmentService {
    pool: WorkerPool,
    solver: AssignmentSolver,
    monitor: ResourceMonitor,
}

impl AssignmentService {
    pub fn new(pool: WorkerPool, solver: AssignmentSolver, monitor: ResourceMonitor) -> Self {
        Self {
            pool,
            solver,
            monitor,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ServiceError> {
        let pool = WorkerPool::new(config.routing.thread_pool_size)?;
        let solver = AssignmentSolver::new(config.routing.penalty, config.search_parameters());
        let monitor = ResourceMonitor::new(
            config.monitor.enabled,
            Duration::from_millis(config.monitor.interval_ms),
        );
        info!(
            workers = pool.size(),
            penalty = solver.penalty(),
            params = %solver.params(),
            monitor = monitor.is_enabled(),
            "Assignment service ready"
        );
        Ok(Self::new(pool, solver, monitor))
    }

    #[inline]
    pub fn solver(&self) -> &AssignmentSolver {
        &self.solver
    }

    #[inline]
    pub fn monitor(&self) -> &ResourceMonitor {
        &self.monitor
    }

    #[instrument(skip_all)]
    pub fn assign(&self, request: &AssignmentRequest) -> Result<AssignmentOutcome, ServiceError> {
        let problem = request.validate()?;
        let matrix = DistanceMatrixBuilder::new(&self.pool).build(&problem.locations())?;
        let outcome = self.solver.solve_scoped(&problem, &matrix, &self.monitor)?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;
    use task_alloc_model::{
        err::ValidationError,
        id::TaskId,
        req::{AgentRecord, TaskRecord},
    };
    use task_alloc_solver::params::SearchParameters;

    assert_impl_all!(AssignmentService: Send, Sync);

    fn service() -> AssignmentService {
        AssignmentService::new(
            WorkerPool::new(2).unwrap(),
            AssignmentSolver::new(
                10_000,
                SearchParameters::default()
                    .with_time_limit(Duration::from_millis(300))
                    .with_iteration_limit(200),
            ),
            ResourceMonitor::disabled(),
        )
    }

    fn task(id: u64, skill: &str, pincode: i64, duration: i64) -> TaskRecord {
        TaskRecord {
            id: Some(id),
            skill: Some(skill.to_string()),
            location: Some(vec![12.97, 77.59]),
            pincode: Some(pincode),
            duration: Some(duration),
        }
    }

    fn agent(id: u64, skill: &str, pincode: i64, availability: i64) -> AgentRecord {
        AgentRecord {
            id: Some(id),
            skills: Some(vec![skill.to_string()]),
            location: Some(vec![12.96, 77.60]),
            availability: Some(availability),
            allowed_locations: Some(vec![pincode]),
        }
    }

    #[test]
    fn test_assign_end_to_end() {
        let request = AssignmentRequest::new(
            vec![task(1, "plumbing", 560001, 30), task(2, "welding", 560001, 30)],
            vec![agent(10, "plumbing", 560001, 60)],
        );
        let outcome = service().assign(&request).unwrap();
        let s = outcome.solution().unwrap();
        assert_eq!(s.unassigned_tasks(), &[TaskId::new(2)]);
        assert_eq!(s.assigned_task_count(), 1);
    }

    #[test]
    fn test_validation_failure_surfaces() {
        let request = AssignmentRequest::new(vec![], vec![agent(10, "plumbing", 560001, 60)]);
        let err = service().assign(&request).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ValidationError::NoTasks)));
    }
}
