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

use std::{fmt::Display, time::Duration};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FirstSolutionStrategy {
    /// Extend each route from its last visit along the cheapest feasible arc.
    #[default]
    PathCheapestArc,
}

impl Display for FirstSolutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FirstSolutionStrategy::PathCheapestArc => write!(f, "PATH_CHEAPEST_ARC"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LocalSearchMetaheuristic {
    /// Penalize the arcs of each local optimum and keep searching until a
    /// limit is hit.
    #[default]
    GuidedLocalSearch,
    /// Stop at the first local optimum.
    GreedyDescent,
}

impl Display for LocalSearchMetaheuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocalSearchMetaheuristic::GuidedLocalSearch => write!(f, "GUIDED_LOCAL_SEARCH"),
            LocalSearchMetaheuristic::GreedyDescent => write!(f, "GREEDY_DESCENT"),
        }
    }
}

pub const DEFAULT_TIME_LIMIT: Duration = Duration::from_secs(5);
pub const DEFAULT_SEED: u64 = 0x5EED_CAFE;
pub const DEFAULT_GLS_LAMBDA_COEFFICIENT: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    pub first_solution_strategy: FirstSolutionStrategy,
    pub local_search_metaheuristic: LocalSearchMetaheuristic,
    pub time_limit: Duration,
    /// Upper bound on search steps, if any.
    pub iteration_limit: Option<u64>,
    pub seed: u64,
    pub guided_local_search_lambda_coefficient: f64,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            first_solution_strategy: FirstSolutionStrategy::default(),
            local_search_metaheuristic: LocalSearchMetaheuristic::default(),
            time_limit: DEFAULT_TIME_LIMIT,
            iteration_limit: None,
            seed: DEFAULT_SEED,
            guided_local_search_lambda_coefficient: DEFAULT_GLS_LAMBDA_COEFFICIENT,
        }
    }
}

impl SearchParameters {
    pub fn with_first_solution_strategy(mut self, strategy: FirstSolutionStrategy) -> Self {
        self.first_solution_strategy = strategy;
        self
    }

    pub fn with_metaheuristic(mut self, metaheuristic: LocalSearchMetaheuristic) -> Self {
        self.local_search_metaheuristic = metaheuristic;
        self
    }

    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit = time_limit;
        self
    }

    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Display for SearchParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchParameters(first_solution: {}, metaheuristic: {}, time_limit: {:?}, seed: {})",
            self.first_solution_strategy,
            self.local_search_metaheuristic,
            self.time_limit,
            self.seed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let p = SearchParameters::default();
        assert_eq!(p.first_solution_strategy, FirstSolutionStrategy::PathCheapestArc);
        assert_eq!(
            p.local_search_metaheuristic,
            LocalSearchMetaheuristic::GuidedLocalSearch
        );
        assert_eq!(p.time_limit, Duration::from_secs(5));
        assert_eq!(p.iteration_limit, None);
    }

    #[test]
    fn test_builder_methods() {
        let p = SearchParameters::default()
            .with_time_limit(Duration::from_millis(10))
            .with_iteration_limit(3)
            .with_seed(1)
            .with_metaheuristic(LocalSearchMetaheuristic::GreedyDescent);
        assert_eq!(p.time_limit, Duration::from_millis(10));
        assert_eq!(p.iteration_limit, Some(3));
        assert_eq!(p.seed, 1);
        assert!(p.to_string().contains("GREEDY_DESCENT"));
    }
}
