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

//! Routing engine for agent task allocation.
//!
//! [`model::RoutingModel`] is a small vehicle routing model in the shape of
//! a constraint-programming routing library: transit callbacks, capacity
//! dimensions, vehicle restrictions and optional visits through
//! disjunctions. It is solved by a path-cheapest-arc construction followed
//! by guided local search ([`meta::engine::MetaEngine`]).
//!
//! [`builder::AssignmentModelBuilder`] encodes a validated problem as such
//! a model and [`extract::SolutionExtractor`] turns the solved routes back
//! into agent assignments. [`solve::AssignmentSolver`] chains the three.

pub mod assignment;
pub mod builder;
pub mod extract;
pub mod framework;
pub mod greedy;
pub mod index;
pub mod meta;
pub mod model;
pub mod params;
pub mod solve;

pub mod prelude {
    pub use crate::assignment::Assignment;
    pub use crate::builder::{
        AVAILABILITY_DIMENSION, AssignmentModelBuilder, BuildModelError, DEFAULT_PENALTY,
    };
    pub use crate::extract::SolutionExtractor;
    pub use crate::index::{IndexManagerError, RoutingIndexManager};
    pub use crate::model::{
        DimensionId, DisjunctionId, ModelError, NextVar, RoutingModel, SearchError,
        TransitCallbackId,
    };
    pub use crate::params::{FirstSolutionStrategy, LocalSearchMetaheuristic, SearchParameters};
    pub use crate::solve::{AssignmentSolver, EngineScope, Unscoped};
}
