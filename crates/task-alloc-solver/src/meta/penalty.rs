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

use crate::framework::{compiled::CompiledModel, state::RouteState};

/// Guided local search penalty counts per arc.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArcPenalties {
    n: usize,
    counts: Vec<u32>,
}

impl ArcPenalties {
    pub fn new(num_indices: usize) -> Self {
        Self {
            n: num_indices,
            counts: vec![0; num_indices * num_indices],
        }
    }

    #[inline]
    pub fn get(&self, from: usize, to: usize) -> u32 {
        self.counts[from * self.n + to]
    }

    #[inline]
    pub fn increment(&mut self, from: usize, to: usize) {
        let c = &mut self.counts[from * self.n + to];
        *c = c.saturating_add(1);
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Penalizes every arc of `state` whose utility `cost / (1 + penalty)`
    /// is maximal. Returns the number of arcs penalized.
    pub fn penalize_max_utility(&mut self, model: &CompiledModel, state: &RouteState) -> usize {
        let arcs: Vec<(usize, usize)> = state
            .routes()
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_empty())
            .flat_map(|(v, r)| {
                std::iter::once(model.start(v))
                    .chain(r.iter().copied())
                    .zip(r.iter().copied().chain(std::iter::once(model.end(v))))
            })
            .collect();

        let utility = |(a, b): (usize, usize)| model.arc(a, b) as f64 / (1.0 + self.get(a, b) as f64);
        let Some(max) = arcs.iter().map(|&a| utility(a)).reduce(f64::max) else {
            return 0;
        };
        let chosen: Vec<(usize, usize)> = arcs
            .into_iter()
            .filter(|&a| utility(a) >= max)
            .collect();
        for &(a, b) in &chosen {
            self.increment(a, b);
        }
        chosen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{framework::compiled::tests::toy_model, meta::oplib::tests::state_with};

    #[test]
    fn test_penalizes_longest_arc_first() {
        let m = toy_model(None, None);
        let s = state_with(&m, &[&[0, 2], &[1]]);
        let mut pen = ArcPenalties::new(m.num_indices());

        // arcs: 3->0 (1), 0->2 (8), 2->5 (9), 4->1 (8), 1->6 (8)
        assert_eq!(pen.penalize_max_utility(&m, &s), 1);
        assert_eq!(pen.get(2, 5), 1);

        // 2->5 now has utility 4.5, the three arcs of cost 8 tie
        assert_eq!(pen.penalize_max_utility(&m, &s), 3);
        assert_eq!(pen.get(0, 2), 1);
        assert_eq!(pen.get(4, 1), 1);
        assert_eq!(pen.total(), 4);
    }

    #[test]
    fn test_nothing_to_penalize_on_empty_routes() {
        let m = toy_model(None, None);
        let s = RouteState::empty(&m);
        let mut pen = ArcPenalties::new(m.num_indices());
        assert_eq!(pen.penalize_max_utility(&m, &s), 0);
    }
}
