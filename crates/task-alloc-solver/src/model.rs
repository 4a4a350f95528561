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
    assignment::Assignment,
    framework::{
        compiled::{CompiledDimension, CompiledModel, Transit},
        state::Solver,
    },
    greedy::{PathCheapestArcError, PathCheapestArcSolver},
    index::RoutingIndexManager,
    meta::{
        config::MetaConfig,
        engine::{MetaEngine, MetaEngineError},
    },
    params::{FirstSolutionStrategy, SearchParameters},
};
use std::{collections::BTreeMap, fmt::Display, time::Instant};
use tracing::{debug, info, instrument, warn};

type BinaryTransit<'a> = Box<dyn Fn(usize, usize) -> i64 + Send + Sync + 'a>;
type UnaryTransit<'a> = Box<dyn Fn(usize) -> i64 + Send + Sync + 'a>;

enum TransitCallback<'a> {
    Binary(BinaryTransit<'a>),
    Unary(UnaryTransit<'a>),
}

impl TransitCallback<'_> {
    #[inline]
    fn eval(&self, from: usize, to: usize) -> i64 {
        match self {
            TransitCallback::Binary(f) => f(from, to),
            TransitCallback::Unary(f) => f(from),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitCallbackId(usize);

impl TransitCallbackId {
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(usize);

impl DimensionId {
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisjunctionId(usize);

impl DisjunctionId {
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

/// Successor variable of a start or visit index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NextVar(usize);

impl NextVar {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownCallback(TransitCallbackId),
    DuplicateDimension(String),
    CapacityCountMismatch {
        dimension: String,
        expected: usize,
        got: usize,
    },
    NegativeCapacity {
        dimension: String,
        vehicle: usize,
        capacity: i64,
    },
    NegativeSlack {
        dimension: String,
        slack_max: i64,
    },
    IndexOutOfRange { index: usize, num_indices: usize },
    AnchorNotAllowed(usize),
    VehicleOutOfRange { vehicle: usize, num_vehicles: usize },
    EmptyDisjunction,
    NegativePenalty(i64),
    AlreadyInDisjunction { index: usize, disjunction: DisjunctionId },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelError::UnknownCallback(id) => {
                write!(f, "Transit callback {} is not registered", id.value())
            }
            ModelError::DuplicateDimension(name) => {
                write!(f, "Dimension '{name}' already exists")
            }
            ModelError::CapacityCountMismatch {
                dimension,
                expected,
                got,
            } => write!(
                f,
                "Dimension '{dimension}' needs {expected} vehicle capacities, got {got}"
            ),
            ModelError::NegativeCapacity {
                dimension,
                vehicle,
                capacity,
            } => write!(
                f,
                "Dimension '{dimension}' has negative capacity {capacity} for vehicle {vehicle}"
            ),
            ModelError::NegativeSlack {
                dimension,
                slack_max,
            } => write!(
                f,
                "Dimension '{dimension}' has negative slack bound {slack_max}"
            ),
            ModelError::IndexOutOfRange { index, num_indices } => {
                write!(f, "Index {index} is outside 0..{num_indices}")
            }
            ModelError::AnchorNotAllowed(index) => {
                write!(f, "Index {index} is a vehicle start or end")
            }
            ModelError::VehicleOutOfRange {
                vehicle,
                num_vehicles,
            } => write!(f, "Vehicle {vehicle} is outside 0..{num_vehicles}"),
            ModelError::EmptyDisjunction => write!(f, "A disjunction needs at least one index"),
            ModelError::NegativePenalty(p) => write!(f, "Disjunction penalty {p} is negative"),
            ModelError::AlreadyInDisjunction { index, disjunction } => write!(
                f,
                "Index {index} already belongs to disjunction {}",
                disjunction.value()
            ),
        }
    }
}

impl std::error::Error for ModelError {}

/// Why a solve returned nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// A mandatory index has no vehicle allowed to visit it.
    Infeasible { index: usize },
    Construction(PathCheapestArcError),
}

impl Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Infeasible { index } => {
                write!(f, "Mandatory index {index} cannot be visited by any vehicle")
            }
            SearchError::Construction(e) => write!(f, "First solution failed: {e}"),
        }
    }
}

impl std::error::Error for SearchError {}

impl From<MetaEngineError<PathCheapestArcError>> for SearchError {
    fn from(value: MetaEngineError<PathCheapestArcError>) -> Self {
        match value {
            MetaEngineError::Construction(e) => SearchError::Construction(e),
        }
    }
}

struct Dimension {
    name: String,
    transit: TransitCallbackId,
    slack_max: i64,
    capacities: Vec<i64>,
    fix_start_cumul_to_zero: bool,
}

struct Disjunction {
    indices: Vec<usize>,
    penalty: i64,
}

/// A vehicle routing model over the indices of a [`RoutingIndexManager`].
///
/// Callbacks receive solver indices, not nodes. Every visit index that is
/// not part of a disjunction must be performed; a disjunction lets at most
/// one of its indices be performed and charges its penalty when none is.
pub struct RoutingModel<'a> {
    manager: &'a RoutingIndexManager,
    callbacks: Vec<TransitCallback<'a>>,
    arc_cost: Option<TransitCallbackId>,
    dimensions: Vec<Dimension>,
    dimension_names: BTreeMap<String, DimensionId>,
    disjunctions: Vec<Disjunction>,
    disjunction_of: Vec<Option<DisjunctionId>>,
    allowed: Vec<bool>,
}

impl<'a> RoutingModel<'a> {
    pub fn new(manager: &'a RoutingIndexManager) -> Self {
        let n = manager.num_indices();
        Self {
            manager,
            callbacks: Vec::new(),
            arc_cost: None,
            dimensions: Vec::new(),
            dimension_names: BTreeMap::new(),
            disjunctions: Vec::new(),
            disjunction_of: vec![None; n],
            allowed: vec![true; n * manager.num_vehicles()],
        }
    }

    #[inline]
    pub fn manager(&self) -> &'a RoutingIndexManager {
        self.manager
    }

    #[inline]
    pub fn vehicles(&self) -> usize {
        self.manager.num_vehicles()
    }

    /// Number of indices that own a successor variable.
    #[inline]
    pub fn size(&self) -> usize {
        self.manager.num_indices() - self.manager.num_vehicles()
    }

    pub fn register_transit_callback<F>(&mut self, callback: F) -> TransitCallbackId
    where
        F: Fn(usize, usize) -> i64 + Send + Sync + 'a,
    {
        self.callbacks
            .push(TransitCallback::Binary(Box::new(callback)));
        TransitCallbackId(self.callbacks.len() - 1)
    }

    /// Registers a callback whose value depends on the origin index only.
    pub fn register_unary_transit_callback<F>(&mut self, callback: F) -> TransitCallbackId
    where
        F: Fn(usize) -> i64 + Send + Sync + 'a,
    {
        self.callbacks.push(TransitCallback::Unary(Box::new(callback)));
        TransitCallbackId(self.callbacks.len() - 1)
    }

    pub fn set_arc_cost_evaluator_of_all_vehicles(
        &mut self,
        callback: TransitCallbackId,
    ) -> Result<(), ModelError> {
        self.check_callback(callback)?;
        self.arc_cost = Some(callback);
        Ok(())
    }

    /// Adds a cumulative quantity along each route. Each cumul must stay
    /// within `0..=capacities[vehicle]`; `slack_max` bounds the free amount
    /// that may be added at a visit.
    pub fn add_dimension_with_vehicle_capacity(
        &mut self,
        callback: TransitCallbackId,
        slack_max: i64,
        capacities: Vec<i64>,
        fix_start_cumul_to_zero: bool,
        name: impl Into<String>,
    ) -> Result<DimensionId, ModelError> {
        let name = name.into();
        self.check_callback(callback)?;
        if self.dimension_names.contains_key(&name) {
            return Err(ModelError::DuplicateDimension(name));
        }
        if capacities.len() != self.vehicles() {
            return Err(ModelError::CapacityCountMismatch {
                dimension: name,
                expected: self.vehicles(),
                got: capacities.len(),
            });
        }
        if let Some((vehicle, &capacity)) = capacities.iter().enumerate().find(|(_, c)| **c < 0) {
            return Err(ModelError::NegativeCapacity {
                dimension: name,
                vehicle,
                capacity,
            });
        }
        if slack_max < 0 {
            return Err(ModelError::NegativeSlack {
                dimension: name,
                slack_max,
            });
        }

        let id = DimensionId(self.dimensions.len());
        debug!(dimension = %name, slack_max, "Added dimension");
        self.dimension_names.insert(name.clone(), id);
        self.dimensions.push(Dimension {
            name,
            transit: callback,
            slack_max,
            capacities,
            fix_start_cumul_to_zero,
        });
        Ok(id)
    }

    pub fn dimension(&self, name: &str) -> Option<DimensionId> {
        self.dimension_names.get(name).copied()
    }

    pub fn dimension_name(&self, id: DimensionId) -> Option<&str> {
        self.dimensions.get(id.0).map(|d| d.name.as_str())
    }

    /// Forbids `vehicle` from visiting `index`.
    pub fn remove_vehicle_from_node(
        &mut self,
        index: usize,
        vehicle: usize,
    ) -> Result<(), ModelError> {
        self.check_visit_index(index)?;
        if vehicle >= self.vehicles() {
            return Err(ModelError::VehicleOutOfRange {
                vehicle,
                num_vehicles: self.vehicles(),
            });
        }
        let v = self.vehicles();
        self.allowed[index * v + vehicle] = false;
        Ok(())
    }

    #[inline]
    pub fn is_vehicle_allowed_for_index(&self, vehicle: usize, index: usize) -> bool {
        self.allowed
            .get(index * self.vehicles() + vehicle)
            .copied()
            .unwrap_or(false)
    }

    pub fn add_disjunction(
        &mut self,
        indices: &[usize],
        penalty: i64,
    ) -> Result<DisjunctionId, ModelError> {
        if indices.is_empty() {
            return Err(ModelError::EmptyDisjunction);
        }
        if penalty < 0 {
            return Err(ModelError::NegativePenalty(penalty));
        }
        for &index in indices {
            self.check_visit_index(index)?;
            if let Some(disjunction) = self.disjunction_of[index] {
                return Err(ModelError::AlreadyInDisjunction { index, disjunction });
            }
        }

        let id = DisjunctionId(self.disjunctions.len());
        for &index in indices {
            self.disjunction_of[index] = Some(id);
        }
        self.disjunctions.push(Disjunction {
            indices: indices.to_vec(),
            penalty,
        });
        Ok(id)
    }

    #[inline]
    pub fn disjunction_of(&self, index: usize) -> Option<DisjunctionId> {
        self.disjunction_of.get(index).copied().flatten()
    }

    pub fn disjunction_indices(&self, id: DisjunctionId) -> Option<&[usize]> {
        self.disjunctions.get(id.0).map(|d| d.indices.as_slice())
    }

    #[inline]
    pub fn start(&self, vehicle: usize) -> usize {
        self.manager.start(vehicle)
    }

    #[inline]
    pub fn end(&self, vehicle: usize) -> usize {
        self.manager.end(vehicle)
    }

    #[inline]
    pub fn is_start(&self, index: usize) -> bool {
        self.manager.is_start(index)
    }

    #[inline]
    pub fn is_end(&self, index: usize) -> bool {
        self.manager.is_end(index)
    }

    #[inline]
    pub fn next_var(&self, index: usize) -> NextVar {
        NextVar::new(index)
    }

    /// Solves the model; `None` when no feasible solution was found.
    pub fn solve_with_parameters(&self, params: &SearchParameters) -> Option<Assignment> {
        match self.solve_detailed(params) {
            Ok(assignment) => Some(assignment),
            Err(e) => {
                warn!(error = %e, "No solution found");
                None
            }
        }
    }

    #[instrument(skip_all, fields(
        indices = self.manager.num_indices(),
        vehicles = self.vehicles(),
        time_limit_ms = params.time_limit.as_millis() as u64,
    ), err(Display))]
    pub fn solve_detailed(&self, params: &SearchParameters) -> Result<Assignment, SearchError> {
        let t0 = Instant::now();
        let compiled = self.compile();
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Model compiled");

        if let Some(index) = compiled.first_unservable_mandatory() {
            return Err(SearchError::Infeasible { index });
        }

        let constructor = match params.first_solution_strategy {
            FirstSolutionStrategy::PathCheapestArc => PathCheapestArcSolver::new(),
        };
        let mut engine = MetaEngine::new(MetaConfig::from(params), constructor);
        let state = engine.solve(&compiled)?;
        let assignment = Assignment::from_state(&compiled, &state);

        info!(
            objective = assignment.objective().value(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Routing solve finished"
        );
        Ok(assignment)
    }

    /// Evaluates every callback into dense tables.
    pub(crate) fn compile(&self) -> CompiledModel {
        let n = self.manager.num_indices();
        let arc = match self.arc_cost.and_then(|id| self.callbacks.get(id.0)) {
            Some(cb) => dense(n, cb),
            None => vec![0; n * n],
        };
        let dimensions = self
            .dimensions
            .iter()
            .map(|d| {
                let transit = match &self.callbacks[d.transit.0] {
                    TransitCallback::Unary(f) => Transit::PerIndex((0..n).map(f).collect()),
                    cb @ TransitCallback::Binary(_) => Transit::PerArc(dense(n, cb)),
                };
                CompiledDimension::new(
                    transit,
                    d.slack_max,
                    d.capacities.clone(),
                    d.fix_start_cumul_to_zero,
                )
            })
            .collect();
        let disjunction_of = self
            .disjunction_of
            .iter()
            .map(|d| d.map(|d| d.0))
            .collect();
        let penalties = self.disjunctions.iter().map(|d| d.penalty).collect();

        CompiledModel::new(
            n,
            self.manager.starts().to_vec(),
            self.manager.ends().to_vec(),
            arc,
            dimensions,
            self.allowed.clone(),
            disjunction_of,
            penalties,
        )
    }

    fn check_callback(&self, id: TransitCallbackId) -> Result<(), ModelError> {
        if id.0 < self.callbacks.len() {
            Ok(())
        } else {
            Err(ModelError::UnknownCallback(id))
        }
    }

    fn check_visit_index(&self, index: usize) -> Result<(), ModelError> {
        let num_indices = self.manager.num_indices();
        if index >= num_indices {
            return Err(ModelError::IndexOutOfRange { index, num_indices });
        }
        if self.manager.is_start(index) || self.manager.is_end(index) {
            return Err(ModelError::AnchorNotAllowed(index));
        }
        Ok(())
    }
}

fn dense(n: usize, cb: &TransitCallback<'_>) -> Vec<i64> {
    let mut out = Vec::with_capacity(n * n);
    for from in 0..n {
        for to in 0..n {
            out.push(if from == to { 0 } else { cb.eval(from, to) });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn params() -> SearchParameters {
        SearchParameters::default()
            .with_time_limit(Duration::from_millis(200))
            .with_seed(7)
    }

    // Nodes on a line: vehicle anchors at 0 and 10, visits at 1, 2, 9.
    fn line_manager() -> (RoutingIndexManager, Vec<i64>) {
        let positions = vec![0, 10, 1, 2, 9];
        let m = RoutingIndexManager::with_self_anchored_vehicles(positions.len(), 2).unwrap();
        (m, positions)
    }

    #[test]
    fn test_registration_errors() {
        let (m, _) = line_manager();
        let mut model = RoutingModel::new(&m);
        let cb = model.register_unary_transit_callback(|_| 1);

        assert_eq!(
            model.set_arc_cost_evaluator_of_all_vehicles(TransitCallbackId(9)),
            Err(ModelError::UnknownCallback(TransitCallbackId(9)))
        );
        assert!(matches!(
            model.add_dimension_with_vehicle_capacity(cb, 0, vec![1], true, "Load"),
            Err(ModelError::CapacityCountMismatch { expected: 2, got: 1, .. })
        ));
        assert!(matches!(
            model.add_dimension_with_vehicle_capacity(cb, 0, vec![1, -1], true, "Load"),
            Err(ModelError::NegativeCapacity { vehicle: 1, .. })
        ));
        let dim = model
            .add_dimension_with_vehicle_capacity(cb, 0, vec![1, 1], true, "Load")
            .unwrap();
        assert_eq!(model.dimension("Load"), Some(dim));
        assert_eq!(model.dimension_name(dim), Some("Load"));
        assert!(matches!(
            model.add_dimension_with_vehicle_capacity(cb, 0, vec![1, 1], true, "Load"),
            Err(ModelError::DuplicateDimension(_))
        ));
    }

    #[test]
    fn test_disjunction_errors() {
        let (m, _) = line_manager();
        let mut model = RoutingModel::new(&m);
        assert_eq!(model.add_disjunction(&[], 1), Err(ModelError::EmptyDisjunction));
        assert_eq!(model.add_disjunction(&[0], -1), Err(ModelError::NegativePenalty(-1)));
        assert_eq!(
            model.add_disjunction(&[m.start(0)], 1),
            Err(ModelError::AnchorNotAllowed(m.start(0)))
        );
        let d = model.add_disjunction(&[0], 5).unwrap();
        assert_eq!(model.disjunction_of(0), Some(d));
        assert_eq!(model.disjunction_indices(d), Some(&[0usize][..]));
        assert!(matches!(
            model.add_disjunction(&[1, 0], 5),
            Err(ModelError::AlreadyInDisjunction { index: 0, .. })
        ));
        assert!(model.remove_vehicle_from_node(0, 5).is_err());
    }

    #[test]
    fn test_solves_line_with_nearest_vehicles() {
        let (m, pos) = line_manager();
        let mut model = RoutingModel::new(&m);
        let mgr = &m;
        let dist = model.register_transit_callback(move |a, b| {
            (pos[mgr.index_to_node(a)] - pos[mgr.index_to_node(b)]).abs()
        });
        model.set_arc_cost_evaluator_of_all_vehicles(dist).unwrap();

        let assignment = model.solve_with_parameters(&params()).unwrap();

        // vehicle 0 (at 0) serves 1 and 2, vehicle 1 (at 10) serves 9
        let v0 = assignment.route(0);
        let v1 = assignment.route(1);
        let mut nodes0: Vec<usize> = v0.iter().map(|&i| m.index_to_node(i)).collect();
        let nodes1: Vec<usize> = v1.iter().map(|&i| m.index_to_node(i)).collect();
        nodes0.sort_unstable();
        assert_eq!(nodes0, vec![2, 3]);
        assert_eq!(nodes1, vec![4]);
        // 0->1->2->0 plus 10->9->10
        assert_eq!(assignment.objective().value(), 4 + 2);
    }

    #[test]
    fn test_unservable_mandatory_index_yields_none() {
        let (m, _) = line_manager();
        let mut model = RoutingModel::new(&m);
        model.remove_vehicle_from_node(0, 0).unwrap();
        model.remove_vehicle_from_node(0, 1).unwrap();
        assert!(model.solve_with_parameters(&params()).is_none());
        assert_eq!(
            model.solve_detailed(&params()),
            Err(SearchError::Infeasible { index: 0 })
        );
    }

    #[test]
    fn test_capacity_forces_drop_of_optional_index() {
        let (m, _) = line_manager();
        let mut model = RoutingModel::new(&m);
        let visits = m.num_visit_indices();
        let load = model.register_unary_transit_callback(move |i| if i < visits { 1 } else { 0 });
        model
            .add_dimension_with_vehicle_capacity(load, 0, vec![1, 1], true, "Load")
            .unwrap();
        for i in 0..visits {
            model.add_disjunction(&[i], 100).unwrap();
        }

        let assignment = model.solve_with_parameters(&params()).unwrap();
        let performed = (0..visits).filter(|&i| assignment.is_performed(i)).count();
        assert_eq!(performed, 2);
        assert_eq!(assignment.objective().value(), 100);
        for i in (0..visits).filter(|&i| !assignment.is_performed(i)) {
            assert_eq!(assignment.value(model.next_var(i)), i);
        }
    }
}
