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
    err::{CapacityExceededError, SolutionValidationError},
    id::{AgentId, TaskId},
    problem::Problem,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;
use task_alloc_core::{geo::GeoPoint, minutes::Minutes};

pub const NO_SOLUTION_MESSAGE: &str = "No solution found";

/// Absolute tolerance, in kilometres, for distance comparisons.
pub const DISTANCE_TOLERANCE_KM: f64 = 1e-6;

/// The route of one agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentAssignment {
    agent_id: AgentId,
    tasks: Vec<TaskId>,
    total_distance: f64,
    last_location: Option<GeoPoint>,
}

impl AgentAssignment {
    #[inline]
    pub fn new(
        agent_id: AgentId,
        tasks: Vec<TaskId>,
        total_distance: f64,
        last_location: Option<GeoPoint>,
    ) -> Self {
        Self {
            agent_id,
            tasks,
            total_distance,
            last_location,
        }
    }

    #[inline]
    pub fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Task ids in visiting order.
    #[inline]
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    /// Kilometres from the agent's start through its last task.
    #[inline]
    pub fn total_distance(&self) -> f64 {
        self.total_distance
    }

    #[inline]
    pub fn last_location(&self) -> Option<GeoPoint> {
        self.last_location
    }
}

impl Display for AgentAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<u64> = self.tasks.iter().map(|t| t.value()).collect();
        write!(
            f,
            "Agent {} -> {:?} ({:.3} km)",
            self.agent_id.value(),
            ids,
            self.total_distance
        )
    }
}

/// A complete allocation: every task is either on exactly one route or
/// unassigned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentSolution {
    agent_assignments: Vec<AgentAssignment>,
    unassigned_tasks: Vec<TaskId>,
    total_distance_covered: f64,
}

impl AssignmentSolution {
    /// Builds a solution; the total distance is the sum over all agents.
    pub fn new(agent_assignments: Vec<AgentAssignment>, unassigned_tasks: Vec<TaskId>) -> Self {
        let total_distance_covered = agent_assignments.iter().map(|a| a.total_distance).sum();
        Self {
            agent_assignments,
            unassigned_tasks,
            total_distance_covered,
        }
    }

    #[inline]
    pub fn agent_assignments(&self) -> &[AgentAssignment] {
        &self.agent_assignments
    }

    #[inline]
    pub fn unassigned_tasks(&self) -> &[TaskId] {
        &self.unassigned_tasks
    }

    #[inline]
    pub fn total_distance_covered(&self) -> f64 {
        self.total_distance_covered
    }

    pub fn assigned_task_count(&self) -> usize {
        self.agent_assignments.iter().map(|a| a.tasks.len()).sum()
    }

    /// The agent serving `task`, if any.
    pub fn agent_for(&self, task: TaskId) -> Option<AgentId> {
        self.agent_assignments
            .iter()
            .find(|a| a.tasks.contains(&task))
            .map(|a| a.agent_id)
    }

    /// Checks the allocation invariants against `problem`: complete
    /// partition of the tasks, skill and pincode eligibility, capacity, and
    /// distances consistent with the agents' routes.
    pub fn validate(&self, problem: &Problem) -> Result<(), SolutionValidationError> {
        let mut seen: HashSet<TaskId> = HashSet::with_capacity(problem.num_tasks());

        for a in &self.agent_assignments {
            let agent = problem
                .agent_by_id(a.agent_id)
                .ok_or(SolutionValidationError::UnknownAgent(a.agent_id))?;

            let mut used = Minutes::zero();
            let mut here = agent.location();
            let mut travelled = 0.0;

            for &tid in &a.tasks {
                let task = problem
                    .task_by_id(tid)
                    .ok_or(SolutionValidationError::UnknownTask(tid))?;
                if !seen.insert(tid) {
                    return Err(SolutionValidationError::DuplicateTask(tid));
                }
                if !agent.can_serve(task) {
                    return Err(SolutionValidationError::IneligibleAgent {
                        agent: a.agent_id,
                        task: tid,
                    });
                }
                used += task.duration();
                travelled += here.haversine_km(&task.location());
                here = task.location();
            }

            if used > agent.availability() {
                return Err(
                    CapacityExceededError::new(a.agent_id, used, agent.availability()).into(),
                );
            }
            if (travelled - a.total_distance).abs() > DISTANCE_TOLERANCE_KM {
                return Err(SolutionValidationError::RouteDistanceMismatch {
                    agent: a.agent_id,
                    reported: a.total_distance,
                    recomputed: travelled,
                });
            }
        }

        for &tid in &self.unassigned_tasks {
            if problem.task_by_id(tid).is_none() {
                return Err(SolutionValidationError::UnknownTask(tid));
            }
            if !seen.insert(tid) {
                return Err(SolutionValidationError::DuplicateTask(tid));
            }
        }

        if let Some(t) = problem.tasks().iter().find(|t| !seen.contains(&t.id())) {
            return Err(SolutionValidationError::MissingTask(t.id()));
        }

        let sum: f64 = self.agent_assignments.iter().map(|a| a.total_distance).sum();
        if (sum - self.total_distance_covered).abs() > DISTANCE_TOLERANCE_KM {
            return Err(SolutionValidationError::TotalDistanceMismatch {
                reported: self.total_distance_covered,
                sum_of_agents: sum,
            });
        }
        Ok(())
    }
}

impl Display for AssignmentSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solution:")?;
        for a in &self.agent_assignments {
            writeln!(f, "  {a}")?;
        }
        let ids: Vec<u64> = self.unassigned_tasks.iter().map(|t| t.value()).collect();
        writeln!(f, "  Unassigned: {ids:?}")?;
        write!(f, "  Total distance: {:.3} km", self.total_distance_covered)
    }
}

/// Terminal result when the engine produced no solution within its budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoSolution {
    message: String,
    agent_assignments: Vec<AgentAssignment>,
    unassigned_tasks: Vec<TaskId>,
}

impl Default for NoSolution {
    fn default() -> Self {
        Self {
            message: NO_SOLUTION_MESSAGE.to_string(),
            agent_assignments: Vec::new(),
            unassigned_tasks: Vec::new(),
        }
    }
}

impl NoSolution {
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// What an allocation request resolves to when it does not fail.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssignmentOutcome {
    Solved(AssignmentSolution),
    NoSolution(NoSolution),
}

impl AssignmentOutcome {
    #[inline]
    pub fn no_solution() -> Self {
        AssignmentOutcome::NoSolution(NoSolution::default())
    }

    #[inline]
    pub fn solution(&self) -> Option<&AssignmentSolution> {
        match self {
            AssignmentOutcome::Solved(s) => Some(s),
            AssignmentOutcome::NoSolution(_) => None,
        }
    }

    #[inline]
    pub fn is_solved(&self) -> bool {
        matches!(self, AssignmentOutcome::Solved(_))
    }
}

impl From<AssignmentSolution> for AssignmentOutcome {
    fn from(value: AssignmentSolution) -> Self {
        AssignmentOutcome::Solved(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        id::Pincode,
        problem::ProblemBuilder,
        task::{Agent, Task},
    };
    use serde_json::json;

    fn problem() -> Problem {
        let mut pb = ProblemBuilder::new();
        pb.add_agent(Agent::new(
            AgentId::new(1),
            ["a"],
            GeoPoint::new(0.0, 0.0),
            Minutes::new(60),
            [Pincode::new(1)],
        ))
        .unwrap();
        pb.add_agent(Agent::new(
            AgentId::new(2),
            ["b"],
            GeoPoint::new(0.0, 1.0),
            Minutes::new(60),
            [Pincode::new(1)],
        ))
        .unwrap();
        pb.add_task(Task::new(
            TaskId::new(10),
            "a",
            GeoPoint::new(0.0, 0.1),
            Pincode::new(1),
            Minutes::new(30),
        ))
        .unwrap();
        pb.add_task(Task::new(
            TaskId::new(11),
            "a",
            GeoPoint::new(0.0, 0.2),
            Pincode::new(1),
            Minutes::new(30),
        ))
        .unwrap();
        pb.add_task(Task::new(
            TaskId::new(12),
            "b",
            GeoPoint::new(0.0, 0.9),
            Pincode::new(1),
            Minutes::new(45),
        ))
        .unwrap();
        pb.build().unwrap()
    }

    fn route(p: &Problem, agent: u64, tasks: &[u64]) -> AgentAssignment {
        let a = p.agent_by_id(AgentId::new(agent)).unwrap();
        let mut here = a.location();
        let mut d = 0.0;
        let mut last = None;
        for &t in tasks {
            let loc = p.task_by_id(TaskId::new(t)).unwrap().location();
            d += here.haversine_km(&loc);
            here = loc;
            last = Some(loc);
        }
        AgentAssignment::new(
            AgentId::new(agent),
            tasks.iter().copied().map(TaskId::new).collect(),
            d,
            last,
        )
    }

    #[test]
    fn test_valid_solution_passes() {
        let p = problem();
        let s = AssignmentSolution::new(
            vec![route(&p, 1, &[10, 11]), route(&p, 2, &[12])],
            vec![],
        );
        s.validate(&p).unwrap();
        assert_eq!(s.assigned_task_count(), 3);
        assert_eq!(s.agent_for(TaskId::new(12)), Some(AgentId::new(2)));
        let sum = s.agent_assignments()[0].total_distance() + s.agent_assignments()[1].total_distance();
        assert!((s.total_distance_covered() - sum).abs() < 1e-12);
    }

    #[test]
    fn test_missing_and_duplicate_tasks_detected() {
        let p = problem();
        let s = AssignmentSolution::new(vec![route(&p, 1, &[10])], vec![TaskId::new(12)]);
        assert_eq!(
            s.validate(&p).unwrap_err(),
            SolutionValidationError::MissingTask(TaskId::new(11))
        );

        let s = AssignmentSolution::new(
            vec![route(&p, 1, &[10, 11])],
            vec![TaskId::new(11), TaskId::new(12)],
        );
        assert_eq!(
            s.validate(&p).unwrap_err(),
            SolutionValidationError::DuplicateTask(TaskId::new(11))
        );
    }

    #[test]
    fn test_ineligible_and_over_capacity_detected() {
        let p = problem();
        let s = AssignmentSolution::new(
            vec![route(&p, 1, &[12])],
            vec![TaskId::new(10), TaskId::new(11)],
        );
        assert!(matches!(
            s.validate(&p).unwrap_err(),
            SolutionValidationError::IneligibleAgent { .. }
        ));

        let mut p2 = ProblemBuilder::new();
        p2.add_agent(Agent::new(
            AgentId::new(1),
            ["a"],
            GeoPoint::new(0.0, 0.0),
            Minutes::new(50),
            [Pincode::new(1)],
        ))
        .unwrap();
        for id in [10, 11] {
            p2.add_task(Task::new(
                TaskId::new(id),
                "a",
                GeoPoint::new(0.0, 0.1),
                Pincode::new(1),
                Minutes::new(30),
            ))
            .unwrap();
        }
        let p2 = p2.build().unwrap();
        let s = AssignmentSolution::new(vec![route(&p2, 1, &[10, 11])], vec![]);
        assert!(matches!(
            s.validate(&p2).unwrap_err(),
            SolutionValidationError::CapacityExceeded(e) if e.assigned() == Minutes::new(60)
        ));
    }

    #[test]
    fn test_route_distance_mismatch_detected() {
        let p = problem();
        let mut r = route(&p, 1, &[10, 11]);
        r.total_distance += 1.0;
        let s = AssignmentSolution::new(vec![r, route(&p, 2, &[12])], vec![]);
        assert!(matches!(
            s.validate(&p).unwrap_err(),
            SolutionValidationError::RouteDistanceMismatch { .. }
        ));
    }

    #[test]
    fn test_solution_serializes_to_wire_shape() {
        let a = AgentAssignment::new(
            AgentId::new(1),
            vec![TaskId::new(10)],
            2.5,
            Some(GeoPoint::new(1.0, 2.0)),
        );
        let idle = AgentAssignment::new(AgentId::new(2), vec![], 0.0, None);
        let outcome: AssignmentOutcome =
            AssignmentSolution::new(vec![a, idle], vec![TaskId::new(11)]).into();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "agent_assignments": [
                    {"agent_id": 1, "tasks": [10], "total_distance": 2.5, "last_location": [1.0, 2.0]},
                    {"agent_id": 2, "tasks": [], "total_distance": 0.0, "last_location": null}
                ],
                "unassigned_tasks": [11],
                "total_distance_covered": 2.5
            })
        );
    }

    #[test]
    fn test_no_solution_serializes_to_wire_shape() {
        let outcome = AssignmentOutcome::no_solution();
        assert!(!outcome.is_solved());
        assert!(outcome.solution().is_none());
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({
                "message": "No solution found",
                "agent_assignments": [],
                "unassigned_tasks": []
            })
        );
    }
}
