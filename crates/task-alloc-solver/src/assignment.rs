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
    framework::{compiled::CompiledModel, state::RouteState},
    model::NextVar,
};
use task_alloc_core::cost::Cost;

/// A solved routing model: one successor per index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    next: Vec<usize>,
    vehicle_of: Vec<Option<usize>>,
    starts: Vec<usize>,
    ends: Vec<usize>,
    objective: Cost<i64>,
}

impl Assignment {
    pub(crate) fn from_state(model: &CompiledModel, state: &RouteState) -> Self {
        let mut vehicle_of: Vec<Option<usize>> = (0..model.num_indices())
            .map(|i| state.vehicle_of(i))
            .collect();
        let starts: Vec<usize> = (0..model.num_vehicles()).map(|v| model.start(v)).collect();
        let ends: Vec<usize> = (0..model.num_vehicles()).map(|v| model.end(v)).collect();
        for (v, (&s, &e)) in starts.iter().zip(&ends).enumerate() {
            vehicle_of[s] = Some(v);
            vehicle_of[e] = Some(v);
        }
        Self {
            next: state.successors(model),
            vehicle_of,
            starts,
            ends,
            objective: state.objective(model),
        }
    }

    /// Successor index. An unperformed visit is its own successor.
    #[inline]
    pub fn value(&self, var: NextVar) -> usize {
        self.next[var.index()]
    }

    #[inline]
    pub fn objective(&self) -> Cost<i64> {
        self.objective
    }

    #[inline]
    pub fn is_performed(&self, index: usize) -> bool {
        self.vehicle_of[index].is_some()
    }

    #[inline]
    pub fn vehicle(&self, index: usize) -> Option<usize> {
        self.vehicle_of[index]
    }

    /// Visits of `vehicle` in order, anchors excluded.
    pub fn route(&self, vehicle: usize) -> Vec<usize> {
        let end = self.ends[vehicle];
        let mut out = Vec::new();
        let mut i = self.next[self.starts[vehicle]];
        while i != end {
            out.push(i);
            i = self.next[i];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{compiled::tests::toy_model, state::Slot};

    #[test]
    fn test_assignment_from_state() {
        let m = toy_model(None, Some(7));
        let mut s = RouteState::empty(&m);
        s.insert(&m, Slot::new(0, 0), 1);
        s.insert(&m, Slot::new(0, 1), 0);
        let a = Assignment::from_state(&m, &s);

        assert_eq!(a.route(0), vec![1, 0]);
        assert!(a.route(1).is_empty());
        assert_eq!(a.value(NextVar::new(3)), 1);
        assert_eq!(a.value(NextVar::new(0)), 5);
        assert_eq!(a.value(NextVar::new(2)), 2);
        assert!(!a.is_performed(2));
        assert_eq!(a.vehicle(0), Some(0));
        // 0 -> 2 -> 1 -> 0 plus one penalty
        assert_eq!(a.objective(), Cost::new(4 + 7));
    }
}
