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
        state::{Move, RouteState, Slot},
    },
    meta::penalty::ArcPenalties,
};
use rand::{Rng, seq::SliceRandom};

pub mod drop;
pub mod exchange;
pub mod insert;
pub mod relocate;
pub mod swap_active;
pub mod two_opt;

pub use drop::DropOperator;
pub use exchange::ExchangeOperator;
pub use insert::InsertUnperformedOperator;
pub use relocate::RelocateOperator;
pub use swap_active::SwapActiveOperator;
pub use two_opt::TwoOptOperator;

/// An improving move together with its change of the guided objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    pub mv: Move,
    pub delta: i64,
}

impl Proposal {
    #[inline]
    pub fn new(mv: Move, delta: i64) -> Self {
        Self { mv, delta }
    }
}

/// Read-only view handed to operators for one search step.
///
/// Arc costs seen through the context include the guided penalty term
/// `lambda * penalty(arc)`; disjunction penalties are taken as they are.
pub struct SearchContext<'a> {
    model: &'a CompiledModel,
    state: &'a RouteState,
    penalties: &'a ArcPenalties,
    lambda: i64,
    route_costs: Vec<i64>,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        model: &'a CompiledModel,
        state: &'a RouteState,
        penalties: &'a ArcPenalties,
        lambda: i64,
    ) -> Self {
        let mut ctx = Self {
            model,
            state,
            penalties,
            lambda,
            route_costs: Vec::new(),
        };
        ctx.route_costs = (0..model.num_vehicles())
            .map(|v| ctx.path_cost(v, state.route(v)))
            .collect();
        ctx
    }

    #[inline]
    pub fn model(&self) -> &'a CompiledModel {
        self.model
    }

    #[inline]
    pub fn state(&self) -> &'a RouteState {
        self.state
    }

    #[inline]
    pub fn arc(&self, from: usize, to: usize) -> i64 {
        let guided = self
            .lambda
            .saturating_mul(self.penalties.get(from, to) as i64);
        self.model.arc(from, to).saturating_add(guided)
    }

    pub fn path_cost(&self, vehicle: usize, visits: &[usize]) -> i64 {
        let mut prev = self.model.start(vehicle);
        let mut total: i64 = 0;
        for &i in visits {
            total = total.saturating_add(self.arc(prev, i));
            prev = i;
        }
        total.saturating_add(self.arc(prev, self.model.end(vehicle)))
    }

    /// Guided cost of the current route of `vehicle`.
    #[inline]
    pub fn route_cost(&self, vehicle: usize) -> i64 {
        self.route_costs[vehicle]
    }

    #[inline]
    pub fn feasible(&self, vehicle: usize, visits: &[usize]) -> bool {
        self.model.route_feasible(vehicle, visits)
    }

    /// Index before slot `pos` of `vehicle`'s route.
    #[inline]
    pub fn before(&self, vehicle: usize, pos: usize) -> usize {
        match pos {
            0 => self.model.start(vehicle),
            p => self.state.route(vehicle)[p - 1],
        }
    }

    /// Index after the visit at `pos`, or the end anchor.
    #[inline]
    pub fn after(&self, vehicle: usize, pos: usize) -> usize {
        self.state
            .route(vehicle)
            .get(pos + 1)
            .copied()
            .unwrap_or(self.model.end(vehicle))
    }

    /// Guided cost change of inserting `index` before `route[pos]`.
    pub fn insertion_delta(&self, vehicle: usize, pos: usize, index: usize) -> i64 {
        let prev = self.before(vehicle, pos);
        let next = self
            .state
            .route(vehicle)
            .get(pos)
            .copied()
            .unwrap_or(self.model.end(vehicle));
        self.arc(prev, index) + self.arc(index, next) - self.arc(prev, next)
    }

    /// Guided cost change of putting `index` in place of the visit at `at`.
    pub fn replacement_delta(&self, at: Slot, index: usize) -> i64 {
        let prev = self.before(at.vehicle, at.pos);
        let next = self.after(at.vehicle, at.pos);
        let old = self.state.route(at.vehicle)[at.pos];
        self.arc(prev, index) + self.arc(index, next) - self.arc(prev, old) - self.arc(old, next)
    }

    pub fn shuffled_vehicles<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut v: Vec<usize> = (0..self.model.num_vehicles()).collect();
        v.shuffle(rng);
        v
    }

    /// Every performed visit, in random order.
    pub fn shuffled_slots<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Slot> {
        let mut slots: Vec<Slot> = self
            .state
            .routes()
            .iter()
            .enumerate()
            .flat_map(|(v, r)| (0..r.len()).map(move |p| Slot::new(v, p)))
            .collect();
        slots.shuffle(rng);
        slots
    }

    /// Unperformed visits that may be activated, in random order.
    pub fn shuffled_unperformed<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
        let mut out: Vec<usize> = self
            .state
            .unperformed(self.model)
            .filter(|&i| self.state.can_activate(self.model, i))
            .collect();
        out.shuffle(rng);
        out
    }
}

pub trait Operator<R>: Send + Sync
where
    R: Rng + ?Sized,
{
    fn name(&self) -> &'static str;

    /// Returns the first feasible move found that lowers the guided
    /// objective, scanning the neighborhood in random order.
    fn propose(&self, rng: &mut R, ctx: &SearchContext<'_>) -> Option<Proposal>;
}

/// The neighborhoods searched by default.
pub fn default_operators<R: Rng + ?Sized>() -> Vec<Box<dyn Operator<R>>> {
    vec![
        Box::new(RelocateOperator),
        Box::new(ExchangeOperator),
        Box::new(TwoOptOperator),
        Box::new(InsertUnperformedOperator),
        Box::new(DropOperator),
        Box::new(SwapActiveOperator),
    ]
}

pub(crate) fn copy_without(buf: &mut Vec<usize>, route: &[usize], pos: usize) {
    buf.clear();
    buf.extend_from_slice(&route[..pos]);
    buf.extend_from_slice(&route[pos + 1..]);
}

pub(crate) fn copy_with(buf: &mut Vec<usize>, route: &[usize], pos: usize, index: usize) {
    buf.clear();
    buf.extend_from_slice(&route[..pos]);
    buf.push(index);
    buf.extend_from_slice(&route[pos..]);
}

pub(crate) fn copy_replaced(buf: &mut Vec<usize>, route: &[usize], pos: usize, index: usize) {
    buf.clear();
    buf.extend_from_slice(route);
    buf[pos] = index;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::framework::compiled::tests::toy_model;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    pub(crate) fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(11)
    }

    pub(crate) fn state_with(model: &CompiledModel, routes: &[&[usize]]) -> RouteState {
        let mut s = RouteState::empty(model);
        for (v, r) in routes.iter().enumerate() {
            for (p, &i) in r.iter().enumerate() {
                s.insert(model, Slot::new(v, p), i);
            }
        }
        s
    }

    #[test]
    fn test_context_costs_follow_penalties() {
        let m = toy_model(None, None);
        let s = state_with(&m, &[&[0, 1], &[2]]);
        let mut pen = ArcPenalties::new(m.num_indices());
        let plain = SearchContext::new(&m, &s, &pen, 3);
        assert_eq!(plain.route_cost(0), 4);
        assert_eq!(plain.route_cost(1), 2);
        assert_eq!(plain.before(0, 0), 3);
        assert_eq!(plain.after(0, 1), 5);
        // visit 2 between 0 and 1: 8 + 7 - 1
        assert_eq!(plain.insertion_delta(0, 1, 2), 14);
        assert_eq!(plain.replacement_delta(Slot::new(1, 0), 1), 16 - 2);

        pen.increment(3, 0);
        let guided = SearchContext::new(&m, &s, &pen, 3);
        assert_eq!(guided.arc(3, 0), 1 + 3);
        assert_eq!(guided.route_cost(0), 7);
    }

    #[test]
    fn test_buffer_helpers() {
        let mut buf = Vec::new();
        copy_without(&mut buf, &[1, 2, 3], 1);
        assert_eq!(buf, vec![1, 3]);
        copy_with(&mut buf, &[1, 2, 3], 3, 9);
        assert_eq!(buf, vec![1, 2, 3, 9]);
        copy_replaced(&mut buf, &[1, 2, 3], 0, 9);
        assert_eq!(buf, vec![9, 2, 3]);
    }
}
