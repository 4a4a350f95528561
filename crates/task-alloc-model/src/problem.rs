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
    err::ValidationError,
    id::{AgentId, TaskId},
    task::{Agent, Task},
};
use std::collections::HashSet;
use std::fmt::Display;
use task_alloc_core::geo::GeoPoint;

/// A validated allocation instance.
///
/// Node indices follow one fixed layout: `0..num_agents` are the agents'
/// start/end anchors, `num_agents..num_locations` are the tasks in their
/// original order.
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    tasks: Vec<Task>,
    agents: Vec<Agent>,
}

impl Problem {
    #[inline]
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    #[inline]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    #[inline]
    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn num_locations(&self) -> usize {
        self.agents.len() + self.tasks.len()
    }

    /// Agent locations in order, followed by task locations in order.
    pub fn locations(&self) -> Vec<GeoPoint> {
        self.agents
            .iter()
            .map(Agent::location)
            .chain(self.tasks.iter().map(Task::location))
            .collect()
    }

    #[inline]
    pub fn task_node(&self, task_position: usize) -> usize {
        self.agents.len() + task_position
    }

    /// The task at `node`, or `None` for an agent anchor.
    #[inline]
    pub fn task_at_node(&self, node: usize) -> Option<&Task> {
        node.checked_sub(self.agents.len())
            .and_then(|i| self.tasks.get(i))
    }

    #[inline]
    pub fn is_agent_node(&self, node: usize) -> bool {
        node < self.agents.len()
    }

    pub fn task_by_id(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id() == id)
    }

    pub fn agent_by_id(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id() == id)
    }

    /// Positions of the agents that have the task's skill and pincode.
    pub fn eligible_agents<'a>(&'a self, task: &'a Task) -> impl Iterator<Item = usize> + 'a {
        self.agents
            .iter()
            .enumerate()
            .filter(move |(_, a)| a.can_serve(task))
            .map(|(i, _)| i)
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Problem:")?;
        for a in &self.agents {
            writeln!(f, "  {a}")?;
        }
        for t in &self.tasks {
            writeln!(f, "  {t}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    tasks: Vec<Task>,
    agents: Vec<Agent>,
    task_ids: HashSet<TaskId>,
    agent_ids: HashSet<AgentId>,
}

impl ProblemBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task(&mut self, task: Task) -> Result<&mut Self, ValidationError> {
        if !self.task_ids.insert(task.id()) {
            return Err(ValidationError::DuplicateTaskId(task.id()));
        }
        self.tasks.push(task);
        Ok(self)
    }

    pub fn add_agent(&mut self, agent: Agent) -> Result<&mut Self, ValidationError> {
        if !self.agent_ids.insert(agent.id()) {
            return Err(ValidationError::DuplicateAgentId(agent.id()));
        }
        self.agents.push(agent);
        Ok(self)
    }

    pub fn build(self) -> Result<Problem, ValidationError> {
        if self.tasks.is_empty() {
            return Err(ValidationError::NoTasks);
        }
        if self.agents.is_empty() {
            return Err(ValidationError::NoAgents);
        }
        Ok(Problem {
            tasks: self.tasks,
            agents: self.agents,
        })
    }
}
