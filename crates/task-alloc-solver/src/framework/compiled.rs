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

//! Dense, callback-free view of a routing model used by the search.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transit {
    /// Quantity consumed when leaving an index.
    PerIndex(Vec<i64>),
    /// Quantity consumed on an arc, row-major `num_indices x num_indices`.
    PerArc(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledDimension {
    transit: Transit,
    slack_max: i64,
    capacities: Vec<i64>,
    fix_start_cumul_to_zero: bool,
}

impl CompiledDimension {
    pub fn new(
        transit: Transit,
        slack_max: i64,
        capacities: Vec<i64>,
        fix_start_cumul_to_zero: bool,
    ) -> Self {
        Self {
            transit,
            slack_max,
            capacities,
            fix_start_cumul_to_zero,
        }
    }

    #[inline]
    fn transit(&self, n: usize, from: usize, to: usize) -> i64 {
        match &self.transit {
            Transit::PerIndex(t) => t[from],
            Transit::PerArc(t) => t[from * n + to],
        }
    }

    /// Walks `path` and checks that every cumul fits in `0..=capacity`.
    ///
    /// Slack is only taken to lift a cumul back to zero. A free start cumul
    /// is placed at the lowest value that keeps every cumul non-negative.
    fn admits(&self, n: usize, vehicle: usize, path: &[usize]) -> bool {
        let capacity = self.capacities[vehicle];
        let mut cumul: i64 = 0;
        let mut peak: i64 = 0;
        for w in path.windows(2) {
            cumul = cumul.saturating_add(self.transit(n, w[0], w[1]));
            if cumul < 0 {
                let mut deficit = -cumul;
                let lift = deficit.min(self.slack_max);
                cumul += lift;
                deficit -= lift;
                if deficit > 0 {
                    if self.fix_start_cumul_to_zero {
                        return false;
                    }
                    cumul += deficit;
                    peak = peak.saturating_add(deficit);
                }
            }
            peak = peak.max(cumul);
            if peak > capacity {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledModel {
    num_indices: usize,
    starts: Vec<usize>,
    ends: Vec<usize>,
    is_anchor: Vec<bool>,
    arc: Vec<i64>,
    dimensions: Vec<CompiledDimension>,
    allowed: Vec<bool>,
    disjunction_of: Vec<Option<usize>>,
    penalties: Vec<i64>,
}

impl CompiledModel {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        num_indices: usize,
        starts: Vec<usize>,
        ends: Vec<usize>,
        arc: Vec<i64>,
        dimensions: Vec<CompiledDimension>,
        allowed: Vec<bool>,
        disjunction_of: Vec<Option<usize>>,
        penalties: Vec<i64>,
    ) -> Self {
        debug_assert_eq!(arc.len(), num_indices * num_indices);
        debug_assert_eq!(allowed.len(), num_indices * starts.len());
        let mut is_anchor = vec![false; num_indices];
        for &i in starts.iter().chain(&ends) {
            is_anchor[i] = true;
        }
        Self {
            num_indices,
            starts,
            ends,
            is_anchor,
            arc,
            dimensions,
            allowed,
            disjunction_of,
            penalties,
        }
    }

    #[inline]
    pub fn num_indices(&self) -> usize {
        self.num_indices
    }

    #[inline]
    pub fn num_vehicles(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    pub fn start(&self, vehicle: usize) -> usize {
        self.starts[vehicle]
    }

    #[inline]
    pub fn end(&self, vehicle: usize) -> usize {
        self.ends[vehicle]
    }

    #[inline]
    pub fn is_anchor(&self, index: usize) -> bool {
        self.is_anchor[index]
    }

    /// Indices that can be visited, in ascending order.
    pub fn visits(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_indices).filter(|&i| !self.is_anchor[i])
    }

    #[inline]
    pub fn arc(&self, from: usize, to: usize) -> i64 {
        self.arc[from * self.num_indices + to]
    }

    #[inline]
    pub fn allows(&self, vehicle: usize, index: usize) -> bool {
        self.allowed[index * self.num_vehicles() + vehicle]
    }

    #[inline]
    pub fn disjunction_of(&self, index: usize) -> Option<usize> {
        self.disjunction_of[index]
    }

    #[inline]
    pub fn num_disjunctions(&self) -> usize {
        self.penalties.len()
    }

    #[inline]
    pub fn penalty(&self, disjunction: usize) -> i64 {
        self.penalties[disjunction]
    }

    #[inline]
    pub fn is_mandatory(&self, index: usize) -> bool {
        !self.is_anchor[index] && self.disjunction_of[index].is_none()
    }

    /// Real cost of `start -> visits.. -> end` for `vehicle`.
    pub fn route_cost(&self, vehicle: usize, visits: &[usize]) -> i64 {
        let mut prev = self.start(vehicle);
        let mut total: i64 = 0;
        for &i in visits {
            total = total.saturating_add(self.arc(prev, i));
            prev = i;
        }
        total.saturating_add(self.arc(prev, self.end(vehicle)))
    }

    /// Whether `vehicle` may serve `visits` in this order.
    pub fn route_feasible(&self, vehicle: usize, visits: &[usize]) -> bool {
        if !visits.iter().all(|&i| self.allows(vehicle, i)) {
            return false;
        }
        if self.dimensions.is_empty() {
            return true;
        }
        let mut path = Vec::with_capacity(visits.len() + 2);
        path.push(self.start(vehicle));
        path.extend_from_slice(visits);
        path.push(self.end(vehicle));
        self.dimensions
            .iter()
            .all(|d| d.admits(self.num_indices, vehicle, &path))
    }

    /// A visit that must be performed but that no vehicle may serve alone.
    pub fn first_unservable_mandatory(&self) -> Option<usize> {
        self.visits().find(|&i| {
            self.is_mandatory(i)
                && !(0..self.num_vehicles()).any(|v| self.route_feasible(v, &[i]))
        })
    }
}
