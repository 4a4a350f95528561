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
    framework::state::{Move, Slot},
    meta::oplib::{Operator, Proposal, SearchContext, copy_with},
};
use rand::Rng;

/// Activates an unperformed visit at some position of some route.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertUnperformedOperator;

impl<R> Operator<R> for InsertUnperformedOperator
where
    R: Rng + ?Sized,
{
    fn name(&self) -> &'static str {
        "InsertUnperformed"
    }

    fn propose(&self, rng: &mut R, ctx: &SearchContext<'_>) -> Option<Proposal> {
        let model = ctx.model();
        let state = ctx.state();
        let mut candidate = Vec::new();

        for index in ctx.shuffled_unperformed(rng) {
            let gain = state.activate_penalty(model, index);
            for vehicle in ctx.shuffled_vehicles(rng) {
                if !model.allows(vehicle, index) {
                    continue;
                }
                let route = state.route(vehicle);
                for pos in 0..=route.len() {
                    let delta = ctx.insertion_delta(vehicle, pos, index) + gain;
                    if delta >= 0 {
                        continue;
                    }
                    copy_with(&mut candidate, route, pos, index);
                    if ctx.feasible(vehicle, &candidate) {
                        let mv = Move::Insert {
                            index,
                            at: Slot::new(vehicle, pos),
                        };
                        return Some(Proposal::new(mv, delta));
                    }
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        framework::{compiled::tests::toy_model, state::RouteState},
        meta::{oplib::tests::rng, penalty::ArcPenalties},
    };

    #[test]
    fn test_inserts_when_penalty_outweighs_detour() {
        let m = toy_model(None, Some(100));
        let mut s = RouteState::empty(&m);
        let pen = ArcPenalties::new(m.num_indices());
        let p = {
            let ctx = SearchContext::new(&m, &s, &pen, 0);
            InsertUnperformedOperator.propose(&mut rng(), &ctx).unwrap()
        };
        let before = s.objective(&m).value();
        s.apply(&m, &p.mv);
        assert_eq!(s.objective(&m).value(), before + p.delta);
        assert_eq!(s.performed_count(), 1);
    }

    #[test]
    fn test_cheap_penalty_keeps_visit_out() {
        // every detour costs at least 2
        let m = toy_model(None, Some(1));
        let s = RouteState::empty(&m);
        let pen = ArcPenalties::new(m.num_indices());
        let ctx = SearchContext::new(&m, &s, &pen, 0);
        assert!(InsertUnperformedOperator.propose(&mut rng(), &ctx).is_none());
    }
}
