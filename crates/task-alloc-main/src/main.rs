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

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, sync::Arc, time::Duration};
use task_alloc_main::{
    config::AppConfig,
    http,
    logging::init_tracing,
    report::{BenchmarkConfig, run_benchmark},
    service::AssignmentService,
};
use task_alloc_model::matrix::WorkerPool;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "task-alloc", version, about = "Assigns tasks to mobile agents")]
struct Cli {
    /// TOML configuration file; `TASK_ALLOC_*` variables override it.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve,
    /// Solve a ramp of generated instances and write a JSON report.
    Benchmark {
        #[arg(long, default_value_t = 10)]
        instances: usize,
        #[arg(long, default_value_t = 10)]
        time_limit_seconds: u64,
        #[arg(long, default_value = "bench_results.json")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&config.logging).map_err(|e| anyhow::anyhow!(e))?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config),
        Command::Benchmark {
            instances,
            time_limit_seconds,
            output,
        } => {
            let bench = BenchmarkConfig {
                instances,
                time_limit: Duration::from_secs(time_limit_seconds),
                penalty: config.routing.penalty,
                ..BenchmarkConfig::default()
            };
            let pool = WorkerPool::new(config.routing.thread_pool_size)?;
            let report = run_benchmark(&bench, &pool)?;
            report.write_json(&output)?;
            info!(path = %output.display(), "Benchmark report written");
            Ok(())
        }
    }
}

fn serve(config: AppConfig) -> anyhow::Result<()> {
    let addr = config.bind_address()?;
    let service = Arc::new(AssignmentService::from_config(&config)?);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building tokio runtime")?;

    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("binding {addr}"))?;
        info!(%addr, "Listening");
        axum::serve(listener, http::router(service))
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("Shutdown signal received");
            })
            .await
            .context("serving HTTP")
    })
}
