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
    meta::oplib::{Operator, Proposal, SearchContext, copy_without},
};
use rand::Rng;

/// Deactivates an optional visit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DropOperator;

impl<R> Operator<R> for DropOperator
where
    R: Rng + ?Sized,
{
    fn name(&self) -> &'static str {
        "Drop"
    }

    fn propose(&self, rng: &mut R, ctx: &SearchContext<'_>) -> Option<Proposal> {
        let model = ctx.model();
        let state = ctx.state();
        let mut reduced = Vec::new();

        for at in ctx.shuffled_slots(rng) {
            let route = state.route(at.vehicle);
            let index = route[at.pos];
            if model.is_mandatory(index) {
                continue;
            }
            let prev = ctx.before(at.vehicle, at.pos);
            let next = ctx.after(at.vehicle, at.pos);
            let delta = ctx.arc(prev, next) - ctx.arc(prev, index) - ctx.arc(index, next)
                + state.drop_penalty(model, index);
            if delta >= 0 {
                continue;
            }
            copy_without(&mut reduced, route, at.pos);
            if ctx.feasible(at.vehicle, &reduced) {
                return Some(Proposal::new(Move::Drop { at }, delta));
            }
        }
        None
    }
}
