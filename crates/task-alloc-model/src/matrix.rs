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

//! Pairwise great-circle distances between all agent and task locations.
//!
//! Rows are independent units of work and are computed in parallel on a
//! [`WorkerPool`]. The pool is an owned handle: it is created once by the
//! service, lent to every [`DistanceMatrixBuilder`], and its threads are
//! released when the handle is dropped.

use crate::err::ComputationError;
use rayon::prelude::*;
use std::panic::{AssertUnwindSafe, catch_unwind};
use task_alloc_core::{cost::Cost, geo::GeoPoint};
use tracing::{debug, info, instrument};

pub const DEFAULT_POOL_SIZE: usize = 4;

/// A bounded pool of worker threads for distance computations.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    size: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .finish()
    }
}

impl WorkerPool {
    pub fn new(size: usize) -> Result<Self, ComputationError> {
        if size == 0 {
            return Err(ComputationError::PoolUnavailable(
                "pool size must be at least 1".into(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(size)
            .thread_name(|i| format!("distance-worker-{i}"))
            .build()
            .map_err(|e| ComputationError::PoolUnavailable(e.to_string()))?;
        info!(size, "Worker pool started");
        Ok(Self { pool, size })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Runs `op` inside the pool and blocks until it returns.
    #[inline]
    pub fn install<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        self.pool.install(op)
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        info!(size = self.size, "Shutting down worker pool");
    }
}

/// Square, symmetric matrix of distances in kilometres with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    km: Vec<f64>,
}

impl DistanceMatrix {
    fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let size = rows.len();
        let km = rows.into_iter().flatten().collect();
        Self { size, km }
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from location `from` to location `to` in kilometres.
    #[inline]
    pub fn km(&self, from: usize, to: usize) -> f64 {
        self.km[from * self.size + to]
    }

    /// The distance rounded to the nearest integer, used as an arc cost.
    #[inline]
    pub fn arc_cost(&self, from: usize, to: usize) -> Cost<i64> {
        Cost::from_rounded(self.km(from, to))
    }

    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.km[i * self.size..(i + 1) * self.size]
    }

    pub fn is_symmetric(&self) -> bool {
        (0..self.size).all(|i| (i..self.size).all(|j| self.km(i, j) == self.km(j, i)))
    }

    pub fn has_zero_diagonal(&self) -> bool {
        (0..self.size).all(|i| self.km(i, i) == 0.0)
    }
}

/// Builds a [`DistanceMatrix`] on a borrowed [`WorkerPool`].
#[derive(Debug, Clone, Copy)]
pub struct DistanceMatrixBuilder<'p> {
    pool: &'p WorkerPool,
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

impl<'p> DistanceMatrixBuilder<'p> {
    #[inline]
    pub fn new(pool: &'p WorkerPool) -> Self {
        Self { pool }
    }

    /// Haversine distances between every pair of `locations`.
    pub fn build(&self, locations: &[GeoPoint]) -> Result<DistanceMatrix, ComputationError> {
        self.build_with(locations, |a, b| a.haversine_km(&b))
    }

    /// Distances between every pair of `locations` under `kernel`.
    ///
    /// Blocks until every row is done. The first failing row aborts the
    /// build; no partial matrix is returned.
    #[instrument(skip_all, fields(locations = locations.len(), workers = self.pool.size()))]
    pub fn build_with<K>(
        &self,
        locations: &[GeoPoint],
        kernel: K,
    ) -> Result<DistanceMatrix, ComputationError>
    where
        K: Fn(GeoPoint, GeoPoint) -> f64 + Sync,
    {
        info!("Building distance matrix...");
        let n = locations.len();

        let compute_row = |i: usize| -> Result<Vec<f64>, ComputationError> {
            let origin = locations[i];
            let row = catch_unwind(AssertUnwindSafe(|| {
                locations
                    .iter()
                    .enumerate()
                    .map(|(j, &dest)| if i == j { 0.0 } else { kernel(origin, dest) })
                    .collect::<Vec<f64>>()
            }))
            .map_err(|payload| ComputationError::WorkerPanicked {
                row: i,
                message: panic_message(payload.as_ref()),
            })?;

            if let Some((column, &value)) = row.iter().enumerate().find(|(_, d)| !d.is_finite()) {
                return Err(ComputationError::NonFiniteDistance {
                    row: i,
                    column,
                    value,
                });
            }
            Ok(row)
        };

        let rows = self.pool.install(|| {
            (0..n)
                .into_par_iter()
                .map(compute_row)
                .collect::<Result<Vec<Vec<f64>>, ComputationError>>()
        })?;

        debug!(rows = rows.len(), "All distance rows computed");
        info!("Distance matrix built successfully.");
        Ok(DistanceMatrix::from_rows(rows))
    }
}
