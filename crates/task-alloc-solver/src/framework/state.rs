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

use crate::framework::compiled::CompiledModel;
use task_alloc_core::cost::Cost;

/// A position inside the route of `vehicle`; `pos == len` is the slot
/// before the end anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub vehicle: usize,
    pub pos: usize,
}

impl Slot {
    #[inline]
    pub fn new(vehicle: usize, pos: usize) -> Self {
        Self { vehicle, pos }
    }
}

/// A neighborhood move. Positions refer to the routes as they are before
/// the move, except `Relocate::to`, which refers to the target route after
/// the visit has been taken out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    Relocate { from: Slot, to: Slot },
    Exchange { a: Slot, b: Slot },
    /// Reverses `route[from..=to]`.
    TwoOpt { vehicle: usize, from: usize, to: usize },
    Insert { index: usize, at: Slot },
    Drop { at: Slot },
    SwapActive { at: Slot, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteState {
    routes: Vec<Vec<usize>>,
    vehicle_of: Vec<Option<usize>>,
    active: Vec<u32>,
}

impl RouteState {
    pub fn empty(model: &CompiledModel) -> Self {
        Self {
            routes: vec![Vec::new(); model.num_vehicles()],
            vehicle_of: vec![None; model.num_indices()],
            active: vec![0; model.num_disjunctions()],
        }
    }

    #[inline]
    pub fn routes(&self) -> &[Vec<usize>] {
        &self.routes
    }

    #[inline]
    pub fn route(&self, vehicle: usize) -> &[usize] {
        &self.routes[vehicle]
    }

    #[inline]
    pub fn vehicle_of(&self, index: usize) -> Option<usize> {
        self.vehicle_of[index]
    }

    #[inline]
    pub fn is_performed(&self, index: usize) -> bool {
        self.vehicle_of[index].is_some()
    }

    pub fn performed_count(&self) -> usize {
        self.routes.iter().map(Vec::len).sum()
    }

    /// Whether `index` may be added without breaking its disjunction.
    pub fn can_activate(&self, model: &CompiledModel, index: usize) -> bool {
        !model.is_anchor(index)
            && !self.is_performed(index)
            && model
                .disjunction_of(index)
                .is_none_or(|d| self.active[d] == 0)
    }

    pub fn unperformed<'a>(
        &'a self,
        model: &'a CompiledModel,
    ) -> impl Iterator<Item = usize> + 'a {
        model.visits().filter(|&i| !self.is_performed(i))
    }

    pub fn insert(&mut self, model: &CompiledModel, at: Slot, index: usize) {
        self.routes[at.vehicle].insert(at.pos, index);
        self.vehicle_of[index] = Some(at.vehicle);
        if let Some(d) = model.disjunction_of(index) {
            self.active[d] += 1;
        }
    }

    pub fn remove(&mut self, model: &CompiledModel, at: Slot) -> usize {
        let index = self.routes[at.vehicle].remove(at.pos);
        self.vehicle_of[index] = None;
        if let Some(d) = model.disjunction_of(index) {
            self.active[d] -= 1;
        }
        index
    }

    pub fn routing_cost(&self, model: &CompiledModel) -> Cost<i64> {
        self.routes
            .iter()
            .enumerate()
            .map(|(v, r)| Cost::new(model.route_cost(v, r)))
            .sum()
    }

    /// Penalties of disjunctions with no performed index.
    pub fn penalty_cost(&self, model: &CompiledModel) -> Cost<i64> {
        self.active
            .iter()
            .enumerate()
            .filter(|(_, a)| **a == 0)
            .map(|(d, _)| Cost::new(model.penalty(d)))
            .sum()
    }

    #[inline]
    pub fn objective(&self, model: &CompiledModel) -> Cost<i64> {
        self.routing_cost(model) + self.penalty_cost(model)
    }

    /// Penalty change when `index` stops being performed.
    pub fn drop_penalty(&self, model: &CompiledModel, index: usize) -> i64 {
        match model.disjunction_of(index) {
            Some(d) if self.active[d] == 1 => model.penalty(d),
            _ => 0,
        }
    }

    /// Penalty change when `index` becomes performed.
    pub fn activate_penalty(&self, model: &CompiledModel, index: usize) -> i64 {
        match model.disjunction_of(index) {
            Some(d) if self.active[d] == 0 => -model.penalty(d),
            _ => 0,
        }
    }

    pub fn apply(&mut self, model: &CompiledModel, mv: &Move) {
        match *mv {
            Move::Relocate { from, to } => {
                let index = self.remove(model, from);
                self.insert(model, to, index);
            }
            Move::Exchange { a, b } => {
                let x = self.routes[a.vehicle][a.pos];
                let y = self.routes[b.vehicle][b.pos];
                self.routes[a.vehicle][a.pos] = y;
                self.routes[b.vehicle][b.pos] = x;
                self.vehicle_of[x] = Some(b.vehicle);
                self.vehicle_of[y] = Some(a.vehicle);
            }
            Move::TwoOpt { vehicle, from, to } => {
                self.routes[vehicle][from..=to].reverse();
            }
            Move::Insert { index, at } => self.insert(model, at, index),
            Move::Drop { at } => {
                self.remove(model, at);
            }
            Move::SwapActive { at, index } => {
                self.remove(model, at);
                self.insert(model, at, index);
            }
        }
    }

    /// Successor of every index; unperformed visits and end anchors point
    /// to themselves.
    pub fn successors(&self, model: &CompiledModel) -> Vec<usize> {
        let mut next: Vec<usize> = (0..model.num_indices()).collect();
        for (v, route) in self.routes.iter().enumerate() {
            let mut prev = model.start(v);
            for &i in route {
                next[prev] = i;
                prev = i;
            }
            next[prev] = model.end(v);
        }
        next
    }
}

pub trait ConstructiveSolver {
    type BuildError;

    fn build_state(&self, model: &CompiledModel) -> Result<RouteState, Self::BuildError>;
}

pub trait Solver {
    type SolveError;

    fn solve(&mut self, model: &CompiledModel) -> Result<RouteState, Self::SolveError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::compiled::tests::toy_model;

    #[test]
    fn test_insert_remove_track_disjunctions() {
        let m = toy_model(None, Some(50));
        let mut s = RouteState::empty(&m);
        assert_eq!(s.objective(&m).value(), 150);
        assert!(s.can_activate(&m, 0));
        assert!(!s.can_activate(&m, 3));

        s.insert(&m, Slot::new(0, 0), 0);
        assert!(s.is_performed(0));
        assert!(!s.can_activate(&m, 0));
        assert_eq!(s.drop_penalty(&m, 0), 50);
        assert_eq!(s.activate_penalty(&m, 1), -50);
        assert_eq!(s.objective(&m).value(), 2 + 100);
        assert_eq!(s.routing_cost(&m), Cost::new(2));
        assert_eq!(s.penalty_cost(&m), Cost::new(100));
        assert_eq!(s.unperformed(&m).collect::<Vec<_>>(), vec![1, 2]);

        assert_eq!(s.remove(&m, Slot::new(0, 0)), 0);
        assert_eq!(s.objective(&m).value(), 150);
    }

    #[test]
    fn test_apply_moves() {
        let m = toy_model(None, Some(50));
        let mut s = RouteState::empty(&m);
        s.insert(&m, Slot::new(0, 0), 0);
        s.insert(&m, Slot::new(0, 1), 2);
        s.insert(&m, Slot::new(0, 2), 1);
        assert_eq!(s.route(0), &[0, 2, 1]);

        s.apply(&m, &Move::TwoOpt { vehicle: 0, from: 1, to: 2 });
        assert_eq!(s.route(0), &[0, 1, 2]);

        s.apply(
            &m,
            &Move::Relocate {
                from: Slot::new(0, 2),
                to: Slot::new(1, 0),
            },
        );
        assert_eq!(s.route(0), &[0, 1]);
        assert_eq!(s.route(1), &[2]);
        assert_eq!(s.vehicle_of(2), Some(1));

        s.apply(
            &m,
            &Move::Exchange {
                a: Slot::new(0, 1),
                b: Slot::new(1, 0),
            },
        );
        assert_eq!(s.route(0), &[0, 2]);
        assert_eq!(s.route(1), &[1]);
        assert_eq!(s.vehicle_of(1), Some(1));

        s.apply(&m, &Move::Drop { at: Slot::new(1, 0) });
        assert!(!s.is_performed(1));
        s.apply(
            &m,
            &Move::SwapActive {
                at: Slot::new(0, 1),
                index: 1,
            },
        );
        assert_eq!(s.route(0), &[0, 1]);
        assert!(!s.is_performed(2));
    }

    #[test]
    fn test_successors() {
        let m = toy_model(None, Some(50));
        let mut s = RouteState::empty(&m);
        s.insert(&m, Slot::new(1, 0), 2);
        let next = s.successors(&m);
        assert_eq!(next[3], 5);
        assert_eq!(next[4], 2);
        assert_eq!(next[2], 6);
        assert_eq!(next[0], 0);
        assert_eq!(next[6], 6);
    }
}
