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

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, net::SocketAddr, path::Path, time::Duration};
use task_alloc_solver::{builder::DEFAULT_PENALTY, params::SearchParameters};

pub const ENV_PREFIX: &str = "TASK_ALLOC";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Configuration file not found: {0}")]
    MissingFile(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Objective cost charged for each unassigned task.
    pub penalty: i64,
    pub time_limit_seconds: u64,
    pub thread_pool_size: usize,
    pub seed: u64,
    pub iteration_limit: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub enabled: bool,
    pub interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub routing: RoutingConfig,
    pub server: ServerConfig,
    pub monitor: MonitorConfig,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            routing: RoutingConfig {
                penalty: DEFAULT_PENALTY,
                time_limit_seconds: 5,
                thread_pool_size: 4,
                seed: SearchParameters::default().seed,
                iteration_limit: None,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            monitor: MonitorConfig {
                enabled: true,
                interval_ms: 1000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json: false,
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then the TOML file at `path`, then `TASK_ALLOC_*`
    /// environment variables (`__` separates nested keys, e.g.
    /// `TASK_ALLOC_ROUTING__PENALTY`).
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`AppConfig::load`], reading variables from `env` instead of the
    /// process environment when given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let d = AppConfig::default();
        let mut builder = Config::builder()
            .set_default("routing.penalty", d.routing.penalty)?
            .set_default("routing.time_limit_seconds", d.routing.time_limit_seconds)?
            .set_default("routing.thread_pool_size", d.routing.thread_pool_size as u64)?
            .set_default("routing.seed", d.routing.seed)?
            .set_default("server.host", d.server.host)?
            .set_default("server.port", d.server.port as u64)?
            .set_default("monitor.enabled", d.monitor.enabled)?
            .set_default("monitor.interval_ms", d.monitor.interval_ms)?
            .set_default("logging.level", d.logging.level)?
            .set_default("logging.json", d.logging.json)?;

        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.display().to_string()));
            }
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routing.thread_pool_size < 1 {
            return Err(ConfigError::Invalid(
                "routing.thread_pool_size must be at least 1".to_string(),
            ));
        }
        if self.routing.time_limit_seconds < 1 {
            return Err(ConfigError::Invalid(
                "routing.time_limit_seconds must be at least 1".to_string(),
            ));
        }
        if self.routing.penalty < 0 {
            return Err(ConfigError::Invalid(
                "routing.penalty must not be negative".to_string(),
            ));
        }
        if self.monitor.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "monitor.interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn search_parameters(&self) -> SearchParameters {
        let params = SearchParameters::default()
            .with_time_limit(Duration::from_secs(self.routing.time_limit_seconds))
            .with_seed(self.routing.seed);
        match self.routing.iteration_limit {
            Some(limit) => params.with_iteration_limit(limit),
            None => params,
        }
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| {
                ConfigError::Invalid(format!(
                    "server address {}:{} is invalid: {e}",
                    self.server.host, self.server.port
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let c = AppConfig::load_with_env(None, Some(HashMap::new())).unwrap();
        assert_eq!(c, AppConfig::default());
        assert_eq!(c.routing.penalty, 10_000);
        assert_eq!(c.routing.time_limit_seconds, 5);
        assert_eq!(c.routing.thread_pool_size, 4);
        assert_eq!(c.bind_address().unwrap().port(), 8080);
        assert_eq!(c.search_parameters().time_limit, Duration::from_secs(5));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut f = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            f,
            "[routing]\npenalty = 500\ntime_limit_seconds = 2\n\n[server]\nport = 9000"
        )
        .unwrap();

        let c = AppConfig::load_with_env(Some(f.path()), Some(HashMap::new())).unwrap();
        assert_eq!(c.routing.penalty, 500);
        assert_eq!(c.routing.time_limit_seconds, 2);
        assert_eq!(c.routing.thread_pool_size, 4);
        assert_eq!(c.server.port, 9000);
    }

    #[test]
    fn test_env_overrides_file() {
        let env = HashMap::from([
            ("TASK_ALLOC_ROUTING__PENALTY".to_string(), "42".to_string()),
            ("TASK_ALLOC_LOGGING__JSON".to_string(), "true".to_string()),
        ]);
        let c = AppConfig::load_with_env(None, Some(env)).unwrap();
        assert_eq!(c.routing.penalty, 42);
        assert!(c.logging.json);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let env = HashMap::from([(
            "TASK_ALLOC_ROUTING__THREAD_POOL_SIZE".to_string(),
            "0".to_string(),
        )]);
        assert!(matches!(
            AppConfig::load_with_env(None, Some(env)),
            Err(ConfigError::Invalid(_))
        ));

        let mut c = AppConfig::default();
        c.routing.time_limit_seconds = 0;
        assert!(c.validate().is_err());
        c.routing.time_limit_seconds = 1;
        c.routing.penalty = -5;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_missing_file_reported() {
        let err = AppConfig::load_with_env(
            Some(Path::new("/definitely/not/here.toml")),
            Some(HashMap::new()),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile(_)));
    }
}
