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

use crate::framework::{
    compiled::CompiledModel,
    state::{ConstructiveSolver, RouteState, Slot},
};
use std::fmt::Display;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathCheapestArcError {
    /// A mandatory visit could not be appended to any route.
    Unroutable { index: usize },
}

impl Display for PathCheapestArcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathCheapestArcError::Unroutable { index } => {
                write!(f, "Mandatory index {index} could not be routed")
            }
        }
    }
}

impl std::error::Error for PathCheapestArcError {}

/// Builds routes one vehicle at a time, always appending the unvisited
/// index reachable by the cheapest feasible arc from the route's tail.
/// Optional visits left over stay unperformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathCheapestArcSolver;

impl PathCheapestArcSolver {
    pub fn new() -> Self {
        Self
    }

    fn cheapest_extension(
        model: &CompiledModel,
        state: &RouteState,
        vehicle: usize,
        scratch: &mut Vec<usize>,
    ) -> Option<usize> {
        let route = state.route(vehicle);
        let tail = route.last().copied().unwrap_or(model.start(vehicle));
        let mut best: Option<(i64, usize)> = None;

        for i in model.visits() {
            if !state.can_activate(model, i) || !model.allows(vehicle, i) {
                continue;
            }
            let cost = model.arc(tail, i);
            if best.is_some_and(|(c, _)| c <= cost) {
                continue;
            }
            scratch.clear();
            scratch.extend_from_slice(route);
            scratch.push(i);
            if model.route_feasible(vehicle, scratch) {
                best = Some((cost, i));
            }
        }
        best.map(|(_, i)| i)
    }
}

impl ConstructiveSolver for PathCheapestArcSolver {
    type BuildError = PathCheapestArcError;

    #[instrument(skip_all, fields(vehicles = model.num_vehicles()), err(Display))]
    fn build_state(&self, model: &CompiledModel) -> Result<RouteState, Self::BuildError> {
        let mut state = RouteState::empty(model);
        let mut scratch = Vec::new();

        for vehicle in 0..model.num_vehicles() {
            while let Some(i) = Self::cheapest_extension(model, &state, vehicle, &mut scratch) {
                let pos = state.route(vehicle).len();
                state.insert(model, Slot::new(vehicle, pos), i);
            }
            debug!(vehicle, visits = state.route(vehicle).len(), "Route closed");
        }

        if let Some(index) = state
            .unperformed(model)
            .find(|&i| model.is_mandatory(i))
        {
            return Err(PathCheapestArcError::Unroutable { index });
        }

        debug!(
            performed = state.performed_count(),
            objective = state.objective(model).value(),
            "First solution built"
        );
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::compiled::tests::toy_model;

    #[test]
    fn test_first_vehicle_takes_cheapest_chain() {
        let m = toy_model(None, None);
        let s = PathCheapestArcSolver::new().build_state(&m).unwrap();
        // from position 0: 1, then 2, then 9
        assert_eq!(s.route(0), &[0, 1, 2]);
        assert!(s.route(1).is_empty());
    }

    #[test]
    fn test_capacity_spills_to_next_vehicle() {
        // each visit loads 1, vehicle 0 holds 2
        let m = toy_model(Some((vec![1, 1, 1, 0, 0, 0, 0], vec![2, 5])), None);
        let s = PathCheapestArcSolver::new().build_state(&m).unwrap();
        assert_eq!(s.route(0), &[0, 1]);
        assert_eq!(s.route(1), &[2]);
    }

    #[test]
    fn test_optional_overflow_stays_unperformed() {
        let m = toy_model(Some((vec![1, 1, 1, 0, 0, 0, 0], vec![1, 1])), Some(10));
        let s = PathCheapestArcSolver::new().build_state(&m).unwrap();
        assert_eq!(s.performed_count(), 2);
        assert_eq!(s.unperformed(&m).count(), 1);
    }

    #[test]
    fn test_mandatory_overflow_fails() {
        let m = toy_model(Some((vec![1, 1, 1, 0, 0, 0, 0], vec![1, 1])), None);
        assert!(matches!(
            PathCheapestArcSolver::new().build_state(&m),
            Err(PathCheapestArcError::Unroutable { .. })
        ));
    }
}
