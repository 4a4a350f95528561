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

//! Benchmark report: a ramp of generated instances from small to big, each
//! solved once with greedy descent and once with guided local search.

use serde::Serialize;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    time::{Duration, Instant},
};
use task_alloc_model::{
    err::{ComputationError, SolutionValidationError},
    generator::{InstanceGenConfigBuildError, InstanceGenConfigBuilder, InstanceGenerator},
    matrix::{DistanceMatrix, DistanceMatrixBuilder, WorkerPool},
    problem::Problem,
    sol::AssignmentOutcome,
};
use task_alloc_solver::{
    builder::{BuildModelError, DEFAULT_PENALTY},
    params::{LocalSearchMetaheuristic, SearchParameters},
    solve::AssignmentSolver,
};
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum BenchmarkError {
    #[error("Invalid instance configuration: {0}")]
    InstanceConfig(#[from] InstanceGenConfigBuildError),

    #[error(transparent)]
    Computation(#[from] ComputationError),

    #[error(transparent)]
    Build(#[from] BuildModelError),

    #[error("Solver returned an invalid solution for instance {idx}: {source}")]
    InvalidSolution {
        idx: usize,
        source: SolutionValidationError,
    },

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkConfig {
    pub instances: usize,
    pub min_agents: usize,
    pub max_agents: usize,
    pub min_tasks: usize,
    pub max_tasks: usize,
    pub base_seed: u64,
    pub time_limit: Duration,
    pub penalty: i64,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            instances: 10,
            min_agents: 2,
            max_agents: 20,
            min_tasks: 10,
            max_tasks: 150,
            base_seed: 42,
            time_limit: Duration::from_secs(10),
            penalty: DEFAULT_PENALTY,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstanceInfo {
    pub idx: usize,
    pub seed: u64,
    pub agents: usize,
    pub tasks: usize,
    pub total_task_minutes: i64,
    pub total_availability_minutes: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SolveResult {
    pub assigned: usize,
    pub unassigned: usize,
    pub total_distance_km: f64,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub instance: InstanceInfo,
    pub descent: SolveResult,
    pub guided: SolveResult,
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkReport {
    pub description: String,
    pub instances: Vec<RunResult>,
}

impl BenchmarkReport {
    pub fn write_json(&self, path: &Path) -> Result<(), BenchmarkError> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        Ok(())
    }
}

fn interpolate(val0: usize, val1: usize, step: usize, steps: usize) -> usize {
    if steps <= 1 {
        return val1;
    }
    let num = (val1 as isize - val0 as isize) * step as isize;
    (val0 as isize + num / (steps as isize - 1)).max(0) as usize
}

fn instance_info(idx: usize, seed: u64, problem: &Problem) -> InstanceInfo {
    InstanceInfo {
        idx,
        seed,
        agents: problem.num_agents(),
        tasks: problem.num_tasks(),
        total_task_minutes: problem.tasks().iter().map(|t| t.duration().value()).sum(),
        total_availability_minutes: problem
            .agents()
            .iter()
            .map(|a| a.availability().value())
            .sum(),
    }
}

fn solve_once(
    idx: usize,
    problem: &Problem,
    matrix: &DistanceMatrix,
    solver: &AssignmentSolver,
) -> Result<SolveResult, BenchmarkError> {
    let t0 = Instant::now();
    let outcome = solver.solve(problem, matrix)?;
    let elapsed = t0.elapsed();
    match outcome {
        AssignmentOutcome::Solved(s) => {
            s.validate(problem)
                .map_err(|source| BenchmarkError::InvalidSolution { idx, source })?;
            Ok(SolveResult {
                assigned: s.assigned_task_count(),
                unassigned: s.unassigned_tasks().len(),
                total_distance_km: s.total_distance_covered(),
                elapsed_ms: elapsed.as_millis(),
            })
        }
        AssignmentOutcome::NoSolution(_) => Ok(SolveResult {
            assigned: 0,
            unassigned: problem.num_tasks(),
            total_distance_km: 0.0,
            elapsed_ms: elapsed.as_millis(),
        }),
    }
}

pub fn run_benchmark(
    config: &BenchmarkConfig,
    pool: &WorkerPool,
) -> Result<BenchmarkReport, BenchmarkError> {
    let mut results = Vec::with_capacity(config.instances);

    for i in 0..config.instances {
        let agents = interpolate(config.min_agents, config.max_agents, i, config.instances);
        let tasks = interpolate(config.min_tasks, config.max_tasks, i, config.instances);
        let seed = config.base_seed + i as u64;

        let gen_config = InstanceGenConfigBuilder::new()
            .amount_agents(agents)
            .amount_tasks(tasks)
            .seed(seed)
            .build()?;
        let problem = InstanceGenerator::new(gen_config).generate();
        let matrix = DistanceMatrixBuilder::new(pool).build(&problem.locations())?;

        let params = SearchParameters::default()
            .with_time_limit(config.time_limit)
            .with_seed(seed);
        let descent = AssignmentSolver::new(
            config.penalty,
            params
                .clone()
                .with_metaheuristic(LocalSearchMetaheuristic::GreedyDescent),
        );
        let guided = AssignmentSolver::new(
            config.penalty,
            params.with_metaheuristic(LocalSearchMetaheuristic::GuidedLocalSearch),
        );

        let run = RunResult {
            instance: instance_info(i, seed, &problem),
            descent: solve_once(i, &problem, &matrix, &descent)?,
            guided: solve_once(i, &problem, &matrix, &guided)?,
        };
        info!(
            idx = i,
            agents,
            tasks,
            descent_unassigned = run.descent.unassigned,
            guided_unassigned = run.guided.unassigned,
            descent_km = run.descent.total_distance_km,
            guided_km = run.guided.total_distance_km,
            "Benchmark instance done"
        );
        results.push(run);
    }

    Ok(BenchmarkReport {
        description: format!(
            "Task allocation benchmark: {} instances from small to big; greedy descent vs guided local search ({}s).",
            config.instances,
            config.time_limit.as_secs()
        ),
        instances: results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_ramp() {
        assert_eq!(interpolate(10, 100, 0, 10), 10);
        assert_eq!(interpolate(10, 100, 9, 10), 100);
        assert_eq!(interpolate(10, 100, 3, 4), 100);
        assert_eq!(interpolate(5, 50, 0, 1), 50);
    }

    #[test]
    fn test_small_benchmark_writes_report() {
        let config = BenchmarkConfig {
            instances: 2,
            min_agents: 1,
            max_agents: 2,
            min_tasks: 3,
            max_tasks: 5,
            base_seed: 7,
            time_limit: Duration::from_millis(100),
            penalty: 10_000,
        };
        let pool = WorkerPool::new(1).unwrap();
        let report = run_benchmark(&config, &pool).unwrap();
        assert_eq!(report.instances.len(), 2);
        assert_eq!(report.instances[0].instance.agents, 1);
        assert_eq!(report.instances[1].instance.tasks, 5);
        for run in &report.instances {
            let n = run.instance.tasks;
            assert_eq!(run.descent.assigned + run.descent.unassigned, n);
            assert_eq!(run.guided.assigned + run.guided.unassigned, n);
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.write_json(&path).unwrap();
        let v: serde_json::Value =
            serde_json::from_reader(File::open(&path).unwrap()).unwrap();
        assert_eq!(v["instances"].as_array().unwrap().len(), 2);
    }
}
