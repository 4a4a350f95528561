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
    framework::{
        compiled::CompiledModel,
        state::{ConstructiveSolver, RouteState, Solver},
    },
    meta::{
        config::MetaConfig,
        oplib::{Operator, Proposal, SearchContext, default_operators},
        penalty::ArcPenalties,
    },
    params::LocalSearchMetaheuristic,
};
use rand::{SeedableRng, seq::SliceRandom};
use rand_chacha::ChaCha8Rng;
use std::{fmt::Display, time::Instant};
use tracing::{debug, info, instrument, trace};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperatorStats {
    pub attempts: u64,
    pub accepted: u64,
    pub total_delta: i64,
}

impl OperatorStats {
    #[inline]
    pub fn on_attempt(&mut self) {
        self.attempts += 1;
    }

    #[inline]
    pub fn on_accept(&mut self, delta: i64) {
        self.accepted += 1;
        self.total_delta = self.total_delta.saturating_add(delta);
    }
}

pub struct OperatorRecord {
    operator: Box<dyn Operator<ChaCha8Rng>>,
    stats: OperatorStats,
}

impl OperatorRecord {
    pub fn new(operator: Box<dyn Operator<ChaCha8Rng>>) -> Self {
        Self {
            operator,
            stats: OperatorStats::default(),
        }
    }

    pub fn operator(&self) -> &dyn Operator<ChaCha8Rng> {
        self.operator.as_ref()
    }

    pub fn stats(&self) -> &OperatorStats {
        &self.stats
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaEngineError<E> {
    Construction(E),
}

impl<E: Display> Display for MetaEngineError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetaEngineError::Construction(e) => write!(f, "Construction failed: {e}"),
        }
    }
}

impl<E: std::fmt::Debug + Display> std::error::Error for MetaEngineError<E> {}

/// Summary of the last run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub iterations: u64,
    pub moves: u64,
    pub local_optima: u64,
    pub initial_objective: i64,
    pub best_objective: i64,
}

/// Local search over a constructed first solution.
///
/// With guided local search, every local optimum penalizes its arcs of
/// maximal utility and the descent continues on the augmented costs until
/// the time or iteration limit. The best solution under the real objective
/// is returned.
pub struct MetaEngine<S> {
    config: MetaConfig,
    construction_solver: S,
    operators: Vec<OperatorRecord>,
    rng: ChaCha8Rng,
    last_stats: SearchStats,
}

impl<S> MetaEngine<S> {
    pub fn new(config: MetaConfig, construction_solver: S) -> Self {
        let operators = default_operators()
            .into_iter()
            .map(OperatorRecord::new)
            .collect();
        Self::with_operators(config, construction_solver, operators)
    }

    pub fn with_operators(
        config: MetaConfig,
        construction_solver: S,
        operators: Vec<OperatorRecord>,
    ) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            construction_solver,
            operators,
            rng,
            last_stats: SearchStats::default(),
        }
    }

    pub fn config(&self) -> &MetaConfig {
        &self.config
    }

    pub fn construction_solver(&self) -> &S {
        &self.construction_solver
    }

    pub fn operator_records(&self) -> &[OperatorRecord] {
        &self.operators
    }

    pub fn last_stats(&self) -> &SearchStats {
        &self.last_stats
    }

    /// One descent step: the first operator, in random order, that finds an
    /// improving move has it applied.
    fn step(
        &mut self,
        model: &CompiledModel,
        state: &mut RouteState,
        penalties: &ArcPenalties,
        lambda: i64,
    ) -> Option<(usize, Proposal)> {
        let mut order: Vec<usize> = (0..self.operators.len()).collect();
        order.shuffle(&mut self.rng);

        let found = {
            let ctx = SearchContext::new(model, state, penalties, lambda);
            let mut found = None;
            for k in order {
                let record = &mut self.operators[k];
                record.stats.on_attempt();
                if let Some(p) = record.operator.propose(&mut self.rng, &ctx) {
                    found = Some((k, p));
                    break;
                }
            }
            found
        };

        if let Some((k, p)) = found {
            state.apply(model, &p.mv);
            self.operators[k].stats.on_accept(p.delta);
            trace!(op = self.operators[k].operator.name(), delta = p.delta, "Applied move");
        }
        found
    }

    fn initial_lambda(&self, model: &CompiledModel, state: &RouteState) -> i64 {
        let arcs = state.performed_count()
            + state.routes().iter().filter(|r| !r.is_empty()).count();
        if arcs == 0 {
            return 1;
        }
        let per_arc = state.routing_cost(model).value() as f64 / arcs as f64;
        ((self.config.lambda_coefficient * per_arc).round() as i64).max(1)
    }
}

impl<S> Solver for MetaEngine<S>
where
    S: ConstructiveSolver,
    S::BuildError: Display,
{
    type SolveError = MetaEngineError<S::BuildError>;

    #[instrument(skip_all, fields(
        time_limit_ms = self.config.time_limit.as_millis() as u64,
        metaheuristic = %self.config.metaheuristic,
    ), err(Display))]
    fn solve(&mut self, model: &CompiledModel) -> Result<RouteState, Self::SolveError> {
        let t0 = Instant::now();
        let mut state = self
            .construction_solver
            .build_state(model)
            .map_err(MetaEngineError::Construction)?;

        let initial_objective = state.objective(model);
        let mut best = state.clone();
        let mut best_objective = initial_objective;
        let mut penalties = ArcPenalties::new(model.num_indices());
        let mut lambda: i64 = 0;
        let mut stats = SearchStats {
            initial_objective: initial_objective.value(),
            ..SearchStats::default()
        };
        let mut stalled: u64 = 0;

        loop {
            if t0.elapsed() >= self.config.time_limit {
                debug!("Time limit reached");
                break;
            }
            if self
                .config
                .iteration_limit
                .is_some_and(|limit| stats.iterations >= limit)
            {
                debug!("Iteration limit reached");
                break;
            }
            stats.iterations += 1;

            if self.step(model, &mut state, &penalties, lambda).is_some() {
                stats.moves += 1;
                stalled = 0;
                let objective = state.objective(model);
                if objective < best_objective {
                    best_objective = objective;
                    best = state.clone();
                    debug!(
                        objective = objective.value(),
                        iteration = stats.iterations,
                        "New best solution"
                    );
                }
                continue;
            }

            stats.local_optima += 1;
            stalled += 1;
            if self.config.metaheuristic == LocalSearchMetaheuristic::GreedyDescent {
                break;
            }
            if stalled > self.config.stall_limit {
                debug!(stalled, "Neighborhoods exhausted");
                break;
            }
            if lambda == 0 {
                lambda = self.initial_lambda(model, &state);
                debug!(lambda, "Guided penalty weight set");
            }
            if penalties.penalize_max_utility(model, &state) == 0 {
                break;
            }
        }

        stats.best_objective = best_objective.value();
        for record in &self.operators {
            debug!(
                op = record.operator.name(),
                attempts = record.stats.attempts,
                accepted = record.stats.accepted,
                "Operator stats"
            );
        }
        info!(
            iterations = stats.iterations,
            moves = stats.moves,
            local_optima = stats.local_optima,
            initial = initial_objective.value(),
            best = best_objective.value(),
            improvement = (initial_objective - best_objective).value(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Meta solve finished",
        );
        self.last_stats = stats;
        Ok(best)
    }
}
