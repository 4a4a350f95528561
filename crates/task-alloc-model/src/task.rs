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

use crate::id::{AgentId, Pincode, TaskId};
use std::collections::BTreeSet;
use std::fmt::Display;
use task_alloc_core::{geo::GeoPoint, minutes::Minutes};

/// A unit of work at a fixed place, requiring one skill.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    skill: String,
    location: GeoPoint,
    pincode: Pincode,
    duration: Minutes,
}

impl Task {
    #[inline]
    pub fn new(
        id: TaskId,
        skill: impl Into<String>,
        location: GeoPoint,
        pincode: Pincode,
        duration: Minutes,
    ) -> Self {
        Self {
            id,
            skill: skill.into(),
            location,
            pincode,
            duration,
        }
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.id
    }

    #[inline]
    pub fn skill(&self) -> &str {
        &self.skill
    }

    #[inline]
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    #[inline]
    pub fn pincode(&self) -> Pincode {
        self.pincode
    }

    #[inline]
    pub fn duration(&self) -> Minutes {
        self.duration
    }
}

impl Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Task({}, skill={}, at={}, pincode={}, duration={})",
            self.id.value(),
            self.skill,
            self.location,
            self.pincode.value(),
            self.duration
        )
    }
}

/// A mobile worker that starts and ends its route at `location`.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: AgentId,
    skills: BTreeSet<String>,
    location: GeoPoint,
    availability: Minutes,
    allowed_locations: BTreeSet<Pincode>,
}

impl Agent {
    pub fn new<S, P>(
        id: AgentId,
        skills: S,
        location: GeoPoint,
        availability: Minutes,
        allowed_locations: P,
    ) -> Self
    where
        S: IntoIterator,
        S::Item: Into<String>,
        P: IntoIterator<Item = Pincode>,
    {
        Self {
            id,
            skills: skills.into_iter().map(Into::into).collect(),
            location,
            availability,
            allowed_locations: allowed_locations.into_iter().collect(),
        }
    }

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    #[inline]
    pub fn skills(&self) -> &BTreeSet<String> {
        &self.skills
    }

    #[inline]
    pub fn location(&self) -> GeoPoint {
        self.location
    }

    #[inline]
    pub fn availability(&self) -> Minutes {
        self.availability
    }

    #[inline]
    pub fn allowed_locations(&self) -> &BTreeSet<Pincode> {
        &self.allowed_locations
    }

    #[inline]
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.contains(skill)
    }

    #[inline]
    pub fn covers(&self, pincode: Pincode) -> bool {
        self.allowed_locations.contains(&pincode)
    }

    /// Whether the agent has the task's skill and may work in its pincode.
    ///
    /// Capacity is not considered here.
    #[inline]
    pub fn can_serve(&self, task: &Task) -> bool {
        self.has_skill(task.skill()) && self.covers(task.pincode())
    }
}

impl Display for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Agent({}, skills={:?}, at={}, availability={})",
            self.id.value(),
            self.skills,
            self.location,
            self.availability
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plumber() -> Agent {
        Agent::new(
            AgentId::new(1),
            ["plumbing", "electrical"],
            GeoPoint::new(12.97, 77.59),
            Minutes::new(480),
            [Pincode::new(560001), Pincode::new(560002)],
        )
    }

    fn task(skill: &str, pincode: i64) -> Task {
        Task::new(
            TaskId::new(10),
            skill,
            GeoPoint::new(12.98, 77.60),
            Pincode::new(pincode),
            Minutes::new(60),
        )
    }

    #[test]
    fn test_can_serve_requires_skill_and_pincode() {
        let agent = plumber();
        assert!(agent.can_serve(&task("plumbing", 560001)));
        assert!(!agent.can_serve(&task("carpentry", 560001)));
        assert!(!agent.can_serve(&task("plumbing", 999999)));
        assert!(!agent.can_serve(&task("carpentry", 999999)));
    }

    #[test]
    fn test_agent_collects_sets() {
        let agent = Agent::new(
            AgentId::new(2),
            vec!["a".to_string(), "a".to_string()],
            GeoPoint::default(),
            Minutes::zero(),
            vec![Pincode::new(1), Pincode::new(1)],
        );
        assert_eq!(agent.skills().len(), 1);
        assert_eq!(agent.allowed_locations().len(), 1);
    }
}
