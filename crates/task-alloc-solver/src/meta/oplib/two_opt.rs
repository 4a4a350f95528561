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
    meta::oplib::{Operator, Proposal, SearchContext},
};
use rand::Rng;

/// Reverses a segment of one route.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwoOptOperator;

impl<R> Operator<R> for TwoOptOperator
where
    R: Rng + ?Sized,
{
    fn name(&self) -> &'static str {
        "TwoOpt"
    }

    fn propose(&self, rng: &mut R, ctx: &SearchContext<'_>) -> Option<Proposal> {
        let state = ctx.state();
        let mut candidate = Vec::new();

        for vehicle in ctx.shuffled_vehicles(rng) {
            let route = state.route(vehicle);
            let len = route.len();
            if len < 2 {
                continue;
            }
            let first = rng.random_range(0..len);
            for from in (first..len).chain(0..first) {
                let prev = ctx.before(vehicle, from);
                // inner cost of route[from..=to], forward and reversed
                let mut forward: i64 = 0;
                let mut backward: i64 = 0;
                for to in from + 1..len {
                    forward += ctx.arc(route[to - 1], route[to]);
                    backward += ctx.arc(route[to], route[to - 1]);
                    let next = ctx.after(vehicle, to);
                    let delta = ctx.arc(prev, route[to]) + backward + ctx.arc(route[from], next)
                        - ctx.arc(prev, route[from])
                        - forward
                        - ctx.arc(route[to], next);
                    if delta >= 0 {
                        continue;
                    }
                    candidate.clear();
                    candidate.extend_from_slice(route);
                    candidate[from..=to].reverse();
                    if ctx.feasible(vehicle, &candidate) {
                        let mv = Move::TwoOpt { vehicle, from, to };
                        return Some(Proposal::new(mv, delta));
                    }
                }
            }
        }
        None
    }
}
