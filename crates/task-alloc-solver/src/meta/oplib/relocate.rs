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
    meta::oplib::{Operator, Proposal, SearchContext, copy_with, copy_without},
};
use rand::Rng;

/// Moves one visit to another position, on its own route or another one.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelocateOperator;

impl<R> Operator<R> for RelocateOperator
where
    R: Rng + ?Sized,
{
    fn name(&self) -> &'static str {
        "Relocate"
    }

    fn propose(&self, rng: &mut R, ctx: &SearchContext<'_>) -> Option<Proposal> {
        let model = ctx.model();
        let state = ctx.state();
        let mut reduced = Vec::new();
        let mut candidate = Vec::new();

        for from in ctx.shuffled_slots(rng) {
            let v1 = from.vehicle;
            let route1 = state.route(v1);
            let x = route1[from.pos];
            copy_without(&mut reduced, route1, from.pos);
            let removal = ctx.path_cost(v1, &reduced) - ctx.route_cost(v1);

            for v2 in ctx.shuffled_vehicles(rng) {
                if !model.allows(v2, x) {
                    continue;
                }
                if v2 == v1 {
                    for q in (0..=reduced.len()).filter(|&q| q != from.pos) {
                        copy_with(&mut candidate, &reduced, q, x);
                        let delta = ctx.path_cost(v1, &candidate) - ctx.route_cost(v1);
                        if delta < 0 && ctx.feasible(v1, &candidate) {
                            let mv = Move::Relocate {
                                from,
                                to: Slot::new(v1, q),
                            };
                            return Some(Proposal::new(mv, delta));
                        }
                    }
                    continue;
                }

                let route2 = state.route(v2);
                for q in 0..=route2.len() {
                    let delta = removal + ctx.insertion_delta(v2, q, x);
                    if delta >= 0 {
                        continue;
                    }
                    copy_with(&mut candidate, route2, q, x);
                    if ctx.feasible(v2, &candidate) && ctx.feasible(v1, &reduced) {
                        let mv = Move::Relocate {
                            from,
                            to: Slot::new(v2, q),
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
        framework::compiled::tests::toy_model,
        meta::{
            oplib::tests::{rng, state_with},
            penalty::ArcPenalties,
        },
    };

    #[test]
    fn test_moves_far_visit_to_closer_vehicle() {
        let m = toy_model(None, None);
        let mut s = state_with(&m, &[&[0, 1, 2], &[]]);
        let pen = ArcPenalties::new(m.num_indices());
        let before = s.objective(&m).value();

        let p = {
            let ctx = SearchContext::new(&m, &s, &pen, 0);
            RelocateOperator.propose(&mut rng(), &ctx).unwrap()
        };
        s.apply(&m, &p.mv);
        assert_eq!(s.objective(&m).value(), before + p.delta);
        assert!(p.delta < 0);
    }

    #[test]
    fn test_optimal_routes_have_no_relocation() {
        let m = toy_model(None, None);
        let s = state_with(&m, &[&[0, 1], &[2]]);
        let pen = ArcPenalties::new(m.num_indices());
        let ctx = SearchContext::new(&m, &s, &pen, 0);
        assert!(RelocateOperator.propose(&mut rng(), &ctx).is_none());
    }

    #[test]
    fn test_respects_capacity() {
        // vehicle 1 can take nothing
        let m = toy_model(Some((vec![1, 1, 1, 0, 0, 0, 0], vec![3, 0])), None);
        let s = state_with(&m, &[&[0, 1, 2], &[]]);
        let pen = ArcPenalties::new(m.num_indices());
        let ctx = SearchContext::new(&m, &s, &pen, 0);
        assert!(RelocateOperator.propose(&mut rng(), &ctx).is_none());
    }
}
