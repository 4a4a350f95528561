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

use crate::params::{LocalSearchMetaheuristic, SearchParameters};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct MetaConfig {
    pub time_limit: Duration,
    pub iteration_limit: Option<u64>,
    pub seed: u64,
    pub metaheuristic: LocalSearchMetaheuristic,
    pub lambda_coefficient: f64,
    /// Consecutive local optima without an applied move after which the
    /// guided search gives up before its limits.
    pub stall_limit: u64,
}

impl Default for MetaConfig {
    fn default() -> Self {
        MetaConfig::from(&SearchParameters::default())
    }
}

impl From<&SearchParameters> for MetaConfig {
    fn from(p: &SearchParameters) -> Self {
        Self {
            time_limit: p.time_limit,
            iteration_limit: p.iteration_limit,
            seed: p.seed,
            metaheuristic: p.local_search_metaheuristic,
            lambda_coefficient: p.guided_local_search_lambda_coefficient,
            stall_limit: 10_000,
        }
    }
}
