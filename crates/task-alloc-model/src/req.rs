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

//! Inbound records as they arrive over the wire, and their validation into
//! a typed [`Problem`].
//!
//! Every attribute is optional at this layer so that an incomplete record
//! surfaces as a [`ValidationError`] naming the missing fields rather than as
//! an opaque parse failure.

use crate::{
    err::{
        MalformedLocationError, MissingFieldError, NegativeQuantityError, RecordKind, RecordRef,
        ValidationError,
    },
    id::{AgentId, Pincode, TaskId},
    problem::{Problem, ProblemBuilder},
    task::{Agent, Task},
};
use serde::{Deserialize, Serialize};
use task_alloc_core::{geo::GeoPoint, minutes::Minutes};
use tracing::{debug, info};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: Option<u64>,
    pub skill: Option<String>,
    pub location: Option<Vec<f64>>,
    pub pincode: Option<i64>,
    pub duration: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    pub id: Option<u64>,
    pub skills: Option<Vec<String>>,
    pub location: Option<Vec<f64>>,
    pub availability: Option<i64>,
    #[serde(rename = "allowedLocations", alias = "allowed_locations")]
    pub allowed_locations: Option<Vec<i64>>,
}

/// The body of an assignment request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRequest {
    pub tasks: Option<Vec<TaskRecord>>,
    pub agents: Option<Vec<AgentRecord>>,
}

impl AssignmentRequest {
    pub fn new(tasks: Vec<TaskRecord>, agents: Vec<AgentRecord>) -> Self {
        Self {
            tasks: Some(tasks),
            agents: Some(agents),
        }
    }

    #[inline]
    pub fn validate(&self) -> Result<Problem, ValidationError> {
        validate_input(self.tasks.as_deref(), self.agents.as_deref())
    }
}

fn parse_location(record: RecordRef, values: &[f64]) -> Result<GeoPoint, MalformedLocationError> {
    match values {
        [lat, lon] => GeoPoint::try_new(*lat, *lon)
            .map_err(|_| MalformedLocationError::new(record, values.to_vec())),
        _ => Err(MalformedLocationError::new(record, values.to_vec())),
    }
}

fn non_negative(
    record: RecordRef,
    field: &'static str,
    value: i64,
) -> Result<Minutes, NegativeQuantityError> {
    if value < 0 {
        Err(NegativeQuantityError::new(record, field, value))
    } else {
        Ok(Minutes::new(value))
    }
}

impl TaskRecord {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.is_none() {
            missing.push("id");
        }
        if self.skill.is_none() {
            missing.push("skill");
        }
        if self.location.is_none() {
            missing.push("location");
        }
        if self.pincode.is_none() {
            missing.push("pincode");
        }
        if self.duration.is_none() {
            missing.push("duration");
        }
        missing
    }

    pub fn to_task(&self, position: usize) -> Result<Task, ValidationError> {
        let record = RecordRef::new(RecordKind::Task, position, self.id);
        let (Some(id), Some(skill), Some(location), Some(pincode), Some(duration)) = (
            self.id,
            self.skill.as_deref(),
            self.location.as_deref(),
            self.pincode,
            self.duration,
        ) else {
            return Err(MissingFieldError::new(record, self.missing_fields()).into());
        };

        Ok(Task::new(
            TaskId::new(id),
            skill,
            parse_location(record, location)?,
            Pincode::new(pincode),
            non_negative(record, "duration", duration)?,
        ))
    }
}

impl AgentRecord {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.id.is_none() {
            missing.push("id");
        }
        if self.skills.is_none() {
            missing.push("skills");
        }
        if self.location.is_none() {
            missing.push("location");
        }
        if self.availability.is_none() {
            missing.push("availability");
        }
        if self.allowed_locations.is_none() {
            missing.push("allowedLocations");
        }
        missing
    }

    pub fn to_agent(&self, position: usize) -> Result<Agent, ValidationError> {
        let record = RecordRef::new(RecordKind::Agent, position, self.id);
        let (Some(id), Some(skills), Some(location), Some(availability), Some(allowed)) = (
            self.id,
            self.skills.as_deref(),
            self.location.as_deref(),
            self.availability,
            self.allowed_locations.as_deref(),
        ) else {
            return Err(MissingFieldError::new(record, self.missing_fields()).into());
        };

        Ok(Agent::new(
            AgentId::new(id),
            skills.iter().cloned(),
            parse_location(record, location)?,
            non_negative(record, "availability", availability)?,
            allowed.iter().copied().map(Pincode::new),
        ))
    }
}

/// Checks the structural completeness of the inbound records and converts
/// them into a [`Problem`].
///
/// Fails when either list is absent or empty, when any record lacks one of
/// its required attributes, or when a value is out of range or duplicated.
/// Completeness of every record is checked before any value is interpreted.
pub fn validate_input(
    tasks: Option<&[TaskRecord]>,
    agents: Option<&[AgentRecord]>,
) -> Result<Problem, ValidationError> {
    info!("Validating input data...");

    let tasks = tasks.filter(|t| !t.is_empty()).ok_or(ValidationError::NoTasks)?;
    let agents = agents
        .filter(|a| !a.is_empty())
        .ok_or(ValidationError::NoAgents)?;

    for (position, t) in tasks.iter().enumerate() {
        let missing = t.missing_fields();
        if !missing.is_empty() {
            let record = RecordRef::new(RecordKind::Task, position, t.id);
            return Err(MissingFieldError::new(record, missing).into());
        }
    }
    for (position, a) in agents.iter().enumerate() {
        let missing = a.missing_fields();
        if !missing.is_empty() {
            let record = RecordRef::new(RecordKind::Agent, position, a.id);
            return Err(MissingFieldError::new(record, missing).into());
        }
    }

    let mut builder = ProblemBuilder::new();
    for (position, a) in agents.iter().enumerate() {
        builder.add_agent(a.to_agent(position)?)?;
    }
    for (position, t) in tasks.iter().enumerate() {
        builder.add_task(t.to_task(position)?)?;
    }
    let problem = builder.build()?;

    debug!(
        tasks = problem.num_tasks(),
        agents = problem.num_agents(),
        "Input records converted"
    );
    info!("Input data validation completed successfully.");
    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task_record(id: u64) -> TaskRecord {
        TaskRecord {
            id: Some(id),
            skill: Some("plumbing".into()),
            location: Some(vec![12.97, 77.59]),
            pincode: Some(560001),
            duration: Some(60),
        }
    }

    fn agent_record(id: u64) -> AgentRecord {
        AgentRecord {
            id: Some(id),
            skills: Some(vec!["plumbing".into()]),
            location: Some(vec![12.90, 77.50]),
            availability: Some(480),
            allowed_locations: Some(vec![560001]),
        }
    }

    #[test]
    fn test_valid_input_converts_in_order() {
        let tasks = vec![task_record(1), task_record(2)];
        let agents = vec![agent_record(7)];
        let p = validate_input(Some(&tasks), Some(&agents)).unwrap();
        assert_eq!(p.num_tasks(), 2);
        assert_eq!(p.num_agents(), 1);
        assert_eq!(p.tasks()[1].id(), TaskId::new(2));
        assert_eq!(p.agents()[0].availability(), Minutes::new(480));
        assert!(p.agents()[0].can_serve(&p.tasks()[0]));
    }

    #[test]
    fn test_empty_or_absent_lists_rejected() {
        let agents = vec![agent_record(1)];
        let tasks = vec![task_record(1)];
        assert_eq!(
            validate_input(None, Some(&agents)).unwrap_err(),
            ValidationError::NoTasks
        );
        assert_eq!(
            validate_input(Some(&[]), Some(&agents)).unwrap_err(),
            ValidationError::NoTasks
        );
        assert_eq!(
            validate_input(Some(&tasks), None).unwrap_err(),
            ValidationError::NoAgents
        );
        assert_eq!(
            validate_input(Some(&tasks), Some(&[])).unwrap_err(),
            ValidationError::NoAgents
        );
    }

    #[test]
    fn test_every_missing_task_field_is_reported() {
        let cases: [(&str, fn(&mut TaskRecord)); 5] = [
            ("id", |t| t.id = None),
            ("skill", |t| t.skill = None),
            ("location", |t| t.location = None),
            ("pincode", |t| t.pincode = None),
            ("duration", |t| t.duration = None),
        ];
        let agents = vec![agent_record(1)];
        for (field, strip) in cases {
            let mut t = task_record(5);
            strip(&mut t);
            let tasks = vec![task_record(4), t];
            match validate_input(Some(&tasks), Some(&agents)).unwrap_err() {
                ValidationError::MissingField(e) => {
                    assert_eq!(e.fields(), &[field]);
                    assert_eq!(e.record().kind(), RecordKind::Task);
                    assert_eq!(e.record().position(), 1);
                }
                other => panic!("expected missing field, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_every_missing_agent_field_is_reported() {
        let cases: [(&str, fn(&mut AgentRecord)); 5] = [
            ("id", |a| a.id = None),
            ("skills", |a| a.skills = None),
            ("location", |a| a.location = None),
            ("availability", |a| a.availability = None),
            ("allowedLocations", |a| a.allowed_locations = None),
        ];
        let tasks = vec![task_record(1)];
        for (field, strip) in cases {
            let mut a = agent_record(9);
            strip(&mut a);
            match validate_input(Some(&tasks), Some(&[a])).unwrap_err() {
                ValidationError::MissingField(e) => {
                    assert_eq!(e.fields(), &[field]);
                    assert_eq!(e.record().kind(), RecordKind::Agent);
                }
                other => panic!("expected missing field, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_missing_fields_checked_before_values() {
        // The first task has a bad location, the agent misses a field:
        // completeness wins.
        let mut bad_location = task_record(1);
        bad_location.location = Some(vec![500.0, 0.0]);
        let mut incomplete = agent_record(1);
        incomplete.skills = None;
        let err = validate_input(Some(&[bad_location]), Some(&[incomplete])).unwrap_err();
        assert!(matches!(err, ValidationError::MissingField(_)));
    }

    #[test]
    fn test_malformed_location_rejected() {
        let agents = vec![agent_record(1)];
        for loc in [vec![1.0], vec![1.0, 2.0, 3.0], vec![95.0, 0.0], vec![0.0, 200.0]] {
            let mut t = task_record(1);
            t.location = Some(loc);
            let err = validate_input(Some(&[t]), Some(&agents)).unwrap_err();
            assert!(
                matches!(err, ValidationError::MalformedLocation(_)),
                "got {err:?}"
            );
        }
    }

    #[test]
    fn test_negative_quantities_rejected() {
        let mut t = task_record(1);
        t.duration = Some(-5);
        let err = validate_input(Some(&[t]), Some(&[agent_record(1)])).unwrap_err();
        assert!(matches!(err, ValidationError::NegativeQuantity(ref e) if e.field() == "duration"));

        let mut a = agent_record(1);
        a.availability = Some(-1);
        let err = validate_input(Some(&[task_record(1)]), Some(&[a])).unwrap_err();
        assert!(
            matches!(err, ValidationError::NegativeQuantity(ref e) if e.field() == "availability")
        );
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let err = validate_input(Some(&[task_record(1), task_record(1)]), Some(&[agent_record(1)]))
            .unwrap_err();
        assert_eq!(err, ValidationError::DuplicateTaskId(TaskId::new(1)));
    }

    #[test]
    fn test_request_json_with_camel_and_snake_case_pincodes() {
        let camel = r#"{
            "tasks": [{"id": 1, "skill": "s", "location": [1.0, 2.0], "pincode": 10, "duration": 5}],
            "agents": [{"id": 2, "skills": ["s"], "location": [1.0, 2.0], "availability": 10, "allowedLocations": [10]}]
        }"#;
        let snake = camel.replace("allowedLocations", "allowed_locations");
        for body in [camel.to_string(), snake] {
            let req: AssignmentRequest = serde_json::from_str(&body).unwrap();
            let p = req.validate().unwrap();
            assert!(p.agents()[0].can_serve(&p.tasks()[0]));
        }
    }

    #[test]
    fn test_request_json_missing_field_becomes_validation_error() {
        let body = r#"{
            "tasks": [{"id": 1, "skill": "s", "location": [1.0, 2.0], "duration": 5}],
            "agents": [{"id": 2, "skills": ["s"], "location": [1.0, 2.0], "availability": 10, "allowedLocations": [10]}]
        }"#;
        let req: AssignmentRequest = serde_json::from_str(body).unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Task 1 (#0) is missing required fields: pincode"
        );
    }
}
