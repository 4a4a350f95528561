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

//! Seeded synthetic instances for benches and property tests.

use crate::{
    id::{AgentId, Pincode, TaskId},
    problem::{Problem, ProblemBuilder},
    task::{Agent, Task},
};
use rand::{Rng, SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::fmt::Display;
use task_alloc_core::{geo::GeoPoint, minutes::Minutes};

/// Parameters of a synthetic instance.
///
/// Locations are scattered normally around `center` with a standard
/// deviation of `spread_deg` degrees in both axes.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceGenConfig {
    pub(crate) amount_agents: usize,
    pub(crate) amount_tasks: usize,
    pub(crate) center: GeoPoint,
    pub(crate) spread_deg: f64,
    pub(crate) skills: Vec<String>,
    pub(crate) skills_per_agent: usize,
    pub(crate) pincodes: Vec<i64>,
    pub(crate) pincodes_per_agent: usize,
    pub(crate) min_duration: Minutes,
    pub(crate) max_duration: Minutes,
    pub(crate) min_availability: Minutes,
    pub(crate) max_availability: Minutes,
    pub(crate) seed: u64,
}

impl Default for InstanceGenConfig {
    fn default() -> Self {
        Self {
            amount_agents: 5,
            amount_tasks: 40,
            center: GeoPoint::new(12.9716, 77.5946),
            spread_deg: 0.08,
            skills: ["plumbing", "electrical", "carpentry", "painting"]
                .into_iter()
                .map(String::from)
                .collect(),
            skills_per_agent: 2,
            pincodes: vec![560001, 560002, 560003, 560004, 560005],
            pincodes_per_agent: 3,
            min_duration: Minutes::new(15),
            max_duration: Minutes::new(90),
            min_availability: Minutes::new(120),
            max_availability: Minutes::new(480),
            seed: 42,
        }
    }
}

impl InstanceGenConfig {
    #[inline]
    pub fn amount_agents(&self) -> usize {
        self.amount_agents
    }

    #[inline]
    pub fn amount_tasks(&self) -> usize {
        self.amount_tasks
    }

    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InstanceGenConfigBuildError {
    NoAgents,
    NoTasks,
    EmptyVocabulary(&'static str),
    InvertedRange(&'static str),
    NegativeMinutes(&'static str),
    InvalidSpread(f64),
}

impl Display for InstanceGenConfigBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceGenConfigBuildError::NoAgents => write!(f, "amount_agents must be > 0"),
            InstanceGenConfigBuildError::NoTasks => write!(f, "amount_tasks must be > 0"),
            InstanceGenConfigBuildError::EmptyVocabulary(what) => {
                write!(f, "{what} must not be empty")
            }
            InstanceGenConfigBuildError::InvertedRange(what) => {
                write!(f, "{what}: minimum exceeds maximum")
            }
            InstanceGenConfigBuildError::NegativeMinutes(what) => {
                write!(f, "{what} must not be negative")
            }
            InstanceGenConfigBuildError::InvalidSpread(s) => {
                write!(f, "spread must be finite and non-negative, got {s}")
            }
        }
    }
}

impl std::error::Error for InstanceGenConfigBuildError {}

#[derive(Debug, Clone, Default)]
pub struct InstanceGenConfigBuilder {
    config: InstanceGenConfig,
}

impl InstanceGenConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount_agents(mut self, n: usize) -> Self {
        self.config.amount_agents = n;
        self
    }

    pub fn amount_tasks(mut self, n: usize) -> Self {
        self.config.amount_tasks = n;
        self
    }

    pub fn center(mut self, center: GeoPoint) -> Self {
        self.config.center = center;
        self
    }

    pub fn spread_deg(mut self, spread: f64) -> Self {
        self.config.spread_deg = spread;
        self
    }

    pub fn skills<I, S>(mut self, skills: I, per_agent: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.skills = skills.into_iter().map(Into::into).collect();
        self.config.skills_per_agent = per_agent;
        self
    }

    pub fn pincodes(mut self, pincodes: impl IntoIterator<Item = i64>, per_agent: usize) -> Self {
        self.config.pincodes = pincodes.into_iter().collect();
        self.config.pincodes_per_agent = per_agent;
        self
    }

    pub fn durations(mut self, min: Minutes, max: Minutes) -> Self {
        self.config.min_duration = min;
        self.config.max_duration = max;
        self
    }

    pub fn availabilities(mut self, min: Minutes, max: Minutes) -> Self {
        self.config.min_availability = min;
        self.config.max_availability = max;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    pub fn build(self) -> Result<InstanceGenConfig, InstanceGenConfigBuildError> {
        let c = self.config;
        if c.amount_agents == 0 {
            return Err(InstanceGenConfigBuildError::NoAgents);
        }
        if c.amount_tasks == 0 {
            return Err(InstanceGenConfigBuildError::NoTasks);
        }
        if c.skills.is_empty() {
            return Err(InstanceGenConfigBuildError::EmptyVocabulary("skills"));
        }
        if c.pincodes.is_empty() {
            return Err(InstanceGenConfigBuildError::EmptyVocabulary("pincodes"));
        }
        if c.min_duration.is_negative() {
            return Err(InstanceGenConfigBuildError::NegativeMinutes("duration"));
        }
        if c.min_availability.is_negative() {
            return Err(InstanceGenConfigBuildError::NegativeMinutes("availability"));
        }
        if c.min_duration > c.max_duration {
            return Err(InstanceGenConfigBuildError::InvertedRange("duration"));
        }
        if c.min_availability > c.max_availability {
            return Err(InstanceGenConfigBuildError::InvertedRange("availability"));
        }
        if !c.spread_deg.is_finite() || c.spread_deg < 0.0 {
            return Err(InstanceGenConfigBuildError::InvalidSpread(c.spread_deg));
        }
        Ok(c)
    }
}

pub struct InstanceGenerator {
    config: InstanceGenConfig,
    rng: ChaCha8Rng,
}

impl From<InstanceGenConfig> for InstanceGenerator {
    fn from(config: InstanceGenConfig) -> Self {
        InstanceGenerator::new(config)
    }
}

impl InstanceGenerator {
    pub fn new(config: InstanceGenConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self { config, rng }
    }

    #[inline]
    pub fn config(&self) -> &InstanceGenConfig {
        &self.config
    }

    fn sample_point(&mut self) -> GeoPoint {
        let c = self.config.center;
        let (lat, lon) = match Normal::new(0.0, self.config.spread_deg) {
            Ok(n) => (n.sample(&mut self.rng), n.sample(&mut self.rng)),
            Err(_) => (0.0, 0.0),
        };
        GeoPoint::new(
            (c.latitude() + lat).clamp(-90.0, 90.0),
            (c.longitude() + lon).clamp(-180.0, 180.0),
        )
    }

    fn sample_minutes(&mut self, min: Minutes, max: Minutes) -> Minutes {
        Minutes::new(self.rng.random_range(min.value()..=max.value()))
    }

    fn sample_subset<T: Clone>(&mut self, items: &[T], k: usize) -> Vec<T> {
        let mut pool = items.to_vec();
        pool.shuffle(&mut self.rng);
        pool.truncate(k.clamp(1, items.len()));
        pool
    }

    /// Draws the next instance; repeated calls yield different instances.
    pub fn generate(&mut self) -> Problem {
        let mut builder = ProblemBuilder::new();
        let skills = self.config.skills.clone();
        let pincodes = self.config.pincodes.clone();

        for i in 0..self.config.amount_agents {
            let location = self.sample_point();
            let availability =
                self.sample_minutes(self.config.min_availability, self.config.max_availability);
            let agent_skills = self.sample_subset(&skills, self.config.skills_per_agent);
            let agent_pincodes = self.sample_subset(&pincodes, self.config.pincodes_per_agent);
            builder
                .add_agent(Agent::new(
                    AgentId::new(i as u64 + 1),
                    agent_skills,
                    location,
                    availability,
                    agent_pincodes.into_iter().map(Pincode::new),
                ))
                .expect("generated agent ids are unique");
        }

        for i in 0..self.config.amount_tasks {
            let location = self.sample_point();
            let duration = self.sample_minutes(self.config.min_duration, self.config.max_duration);
            let skill = skills[self.rng.random_range(0..skills.len())].clone();
            let pincode = pincodes[self.rng.random_range(0..pincodes.len())];
            builder
                .add_task(Task::new(
                    TaskId::new(1000 + i as u64),
                    skill,
                    location,
                    Pincode::new(pincode),
                    duration,
                ))
                .expect("generated task ids are unique");
        }

        builder
            .build()
            .expect("a built config has at least one agent and one task")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_bad_configs() {
        assert_eq!(
            InstanceGenConfigBuilder::new().amount_agents(0).build(),
            Err(InstanceGenConfigBuildError::NoAgents)
        );
        assert_eq!(
            InstanceGenConfigBuilder::new().amount_tasks(0).build(),
            Err(InstanceGenConfigBuildError::NoTasks)
        );
        assert_eq!(
            InstanceGenConfigBuilder::new()
                .durations(Minutes::new(10), Minutes::new(5))
                .build(),
            Err(InstanceGenConfigBuildError::InvertedRange("duration"))
        );
        assert_eq!(
            InstanceGenConfigBuilder::new()
                .skills(Vec::<String>::new(), 1)
                .build(),
            Err(InstanceGenConfigBuildError::EmptyVocabulary("skills"))
        );
    }

    #[test]
    fn test_generate_respects_config() {
        let cfg = InstanceGenConfigBuilder::new()
            .amount_agents(3)
            .amount_tasks(25)
            .durations(Minutes::new(10), Minutes::new(20))
            .availabilities(Minutes::new(60), Minutes::new(60))
            .seed(7)
            .build()
            .unwrap();
        let problem = InstanceGenerator::new(cfg).generate();

        assert_eq!(problem.num_agents(), 3);
        assert_eq!(problem.num_tasks(), 25);
        for t in problem.tasks() {
            assert!((10..=20).contains(&t.duration().value()));
            assert!(t.location().is_finite());
        }
        for a in problem.agents() {
            assert_eq!(a.availability(), Minutes::new(60));
            assert_eq!(a.skills().len(), 2);
            assert_eq!(a.allowed_locations().len(), 3);
        }
    }

    #[test]
    fn test_generate_is_deterministic_per_seed() {
        let cfg = InstanceGenConfigBuilder::new().seed(99).build().unwrap();
        let a = InstanceGenerator::new(cfg.clone()).generate();
        let b = InstanceGenerator::from(cfg).generate();
        assert_eq!(a, b);
    }
}
