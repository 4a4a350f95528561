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
    framework::state::Move,
    meta::oplib::{Operator, Proposal, SearchContext, copy_replaced},
};
use rand::Rng;

/// Swaps the positions of two visits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExchangeOperator;

impl<R> Operator<R> for ExchangeOperator
where
    R: Rng + ?Sized,
{
    fn name(&self) -> &'static str {
        "Exchange"
    }

    fn propose(&self, rng: &mut R, ctx: &SearchContext<'_>) -> Option<Proposal> {
        let model = ctx.model();
        let state = ctx.state();
        let slots = ctx.shuffled_slots(rng);
        let mut cand_a = Vec::new();
        let mut cand_b = Vec::new();

        for (k, &a) in slots.iter().enumerate() {
            let x = state.route(a.vehicle)[a.pos];
            for &b in &slots[k + 1..] {
                let y = state.route(b.vehicle)[b.pos];

                if a.vehicle == b.vehicle {
                    copy_replaced(&mut cand_a, state.route(a.vehicle), a.pos, y);
                    cand_a[b.pos] = x;
                    let delta = ctx.path_cost(a.vehicle, &cand_a) - ctx.route_cost(a.vehicle);
                    if delta < 0 && ctx.feasible(a.vehicle, &cand_a) {
                        return Some(Proposal::new(Move::Exchange { a, b }, delta));
                    }
                    continue;
                }

                if !model.allows(a.vehicle, y) || !model.allows(b.vehicle, x) {
                    continue;
                }
                let delta = ctx.replacement_delta(a, y) + ctx.replacement_delta(b, x);
                if delta >= 0 {
                    continue;
                }
                copy_replaced(&mut cand_a, state.route(a.vehicle), a.pos, y);
                copy_replaced(&mut cand_b, state.route(b.vehicle), b.pos, x);
                if ctx.feasible(a.vehicle, &cand_a) && ctx.feasible(b.vehicle, &cand_b) {
                    return Some(Proposal::new(Move::Exchange { a, b }, delta));
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
    fn test_swaps_crossed_assignment() {
        let m = toy_model(None, None);
        // visit 2 (at 9) on vehicle 0, visit 1 (at 2) on vehicle 1
        let mut s = state_with(&m, &[&[0, 2], &[1]]);
        let pen = ArcPenalties::new(m.num_indices());
        let p = {
            let ctx = SearchContext::new(&m, &s, &pen, 0);
            ExchangeOperator.propose(&mut rng(), &ctx).unwrap()
        };
        let before = s.objective(&m).value();
        s.apply(&m, &p.mv);
        assert_eq!(s.objective(&m).value(), before + p.delta);
        assert_eq!(s.objective(&m).value(), 6);
        assert_eq!(s.route(1), &[2]);
    }

    #[test]
    fn test_exchange_between_single_visit_routes() {
        let m = toy_model(None, None);
        let s = state_with(&m, &[&[2], &[0]]);
        let pen = ArcPenalties::new(m.num_indices());
        let ctx = SearchContext::new(&m, &s, &pen, 0);
        let p = ExchangeOperator.propose(&mut rng(), &ctx).unwrap();
        assert!(matches!(p.mv, Move::Exchange { .. }));
        assert_eq!(p.delta, 4 - 36);
    }
}
