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

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc::{self, RecvTimeoutError},
    },
    thread,
    time::Duration,
};
use sysinfo::System;
use task_alloc_solver::solve::EngineScope;
use tracing::{info, warn};

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResourceSample {
    pub cpu_percent: f32,
    pub free_memory_mb: u64,
}

impl ResourceSample {
    fn read(sys: &mut System) -> Self {
        sys.refresh_cpu_usage();
        sys.refresh_memory();
        Self {
            cpu_percent: sys.global_cpu_usage(),
            free_memory_mb: sys.free_memory() / 1024 / 1024,
        }
    }
}

/// Logs CPU load and free memory while the engine runs.
///
/// The sampler lives in a scoped thread and is stopped and joined when the
/// engine call returns or unwinds.
#[derive(Debug, Clone)]
pub struct ResourceMonitor {
    enabled: bool,
    interval: Duration,
    samples: Arc<AtomicU64>,
}

impl Default for ResourceMonitor {
    fn default() -> Self {
        Self::new(true, DEFAULT_INTERVAL)
    }
}

impl ResourceMonitor {
    pub fn new(enabled: bool, interval: Duration) -> Self {
        Self {
            enabled,
            interval,
            samples: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn disabled() -> Self {
        Self::new(false, DEFAULT_INTERVAL)
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Samples taken since creation, across all runs.
    pub fn samples_taken(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    fn sample_until_stopped(stop: mpsc::Receiver<()>, interval: Duration, samples: &AtomicU64) {
        let mut sys = System::new();
        sys.refresh_cpu_usage();
        loop {
            match stop.recv_timeout(interval) {
                Err(RecvTimeoutError::Timeout) => {
                    let s = ResourceSample::read(&mut sys);
                    samples.fetch_add(1, Ordering::Relaxed);
                    info!(
                        cpu_percent = s.cpu_percent,
                        free_memory_mb = s.free_memory_mb,
                        "CPU Load: {:.2}%, Free Memory: {} MB",
                        s.cpu_percent,
                        s.free_memory_mb
                    );
                }
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("Resource monitor stopped");
    }
}

impl EngineScope for ResourceMonitor {
    fn run<R>(&self, engine: impl FnOnce() -> R) -> R {
        if !self.enabled {
            return engine();
        }
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let interval = self.interval;
        let samples = &*self.samples;

        thread::scope(|scope| {
            // dropping the sender on any exit path stops the sampler
            let _stop = stop_tx;
            let spawned = thread::Builder::new()
                .name("resource-monitor".to_string())
                .spawn_scoped(scope, move || {
                    Self::sample_until_stopped(stop_rx, interval, samples)
                });
            if let Err(e) = spawned {
                warn!(error = %e, "Resource monitor could not start");
            }
            engine()
        })
    }
}
