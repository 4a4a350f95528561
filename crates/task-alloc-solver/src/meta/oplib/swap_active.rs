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

/// Replaces an optional visit by an unperformed one at the same position.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwapActiveOperator;

impl<R> Operator<R> for SwapActiveOperator
where
    R: Rng + ?Sized,
{
    fn name(&self) -> &'static str {
        "SwapActive"
    }

    fn propose(&self, rng: &mut R, ctx: &SearchContext<'_>) -> Option<Proposal> {
        let model = ctx.model();
        let state = ctx.state();
        let mut candidate = Vec::new();

        let outside: Vec<usize> = {
            let mut v: Vec<usize> = state.unperformed(model).collect();
            v.sort_unstable();
            v
        };
        if outside.is_empty() {
            return None;
        }

        for at in ctx.shuffled_slots(rng) {
            let route = state.route(at.vehicle);
            let old = route[at.pos];
            if model.is_mandatory(old) {
                continue;
            }
            let first = rng.random_range(0..outside.len());
            for &index in outside[first..].iter().chain(&outside[..first]) {
                if !model.allows(at.vehicle, index) {
                    continue;
                }
                let same_disjunction = model.disjunction_of(index) == model.disjunction_of(old);
                let penalty = if same_disjunction {
                    0
                } else if state.can_activate(model, index) {
                    state.drop_penalty(model, old) + state.activate_penalty(model, index)
                } else {
                    continue;
                };
                let delta = ctx.replacement_delta(at, index) + penalty;
                if delta >= 0 {
                    continue;
                }
                copy_replaced(&mut candidate, route, at.pos, index);
                if ctx.feasible(at.vehicle, &candidate) {
                    return Some(Proposal::new(Move::SwapActive { at, index }, delta));
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
    fn test_swaps_in_closer_visit_under_capacity() {
        // one visit per vehicle; vehicle 0 serves the far visit
        let m = toy_model(Some((vec![1, 1, 1, 0, 0, 0, 0], vec![1, 0])), Some(10));
        let mut s = state_with(&m, &[&[2], &[]]);
        let pen = ArcPenalties::new(m.num_indices());
        let p = {
            let ctx = SearchContext::new(&m, &s, &pen, 0);
            SwapActiveOperator.propose(&mut rng(), &ctx).unwrap()
        };
        let before = s.objective(&m).value();
        s.apply(&m, &p.mv);
        assert_eq!(s.objective(&m).value(), before + p.delta);
        assert_eq!(s.performed_count(), 1);
        assert!(!s.is_performed(2));
    }

    #[test]
    fn test_nothing_outside() {
        let m = toy_model(None, Some(10));
        let s = state_with(&m, &[&[0, 1], &[2]]);
        let pen = ArcPenalties::new(m.num_indices());
        let ctx = SearchContext::new(&m, &s, &pen, 0);
        assert!(SwapActiveOperator.propose(&mut rng(), &ctx).is_none());
    }
}
