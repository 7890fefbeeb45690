use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::decode::ValidationPolicy;
use crate::qubo::{BuilderParams, InvalidConfigError};
use crate::solver::{SolverBackend, SolverConfig};

/// How a batch reacts to [`SolverUnavailableError`](crate::solver::SolverUnavailableError).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total solve attempts, including the first.
    pub max_attempts: u32,
    /// Backends tried in order after the configured one fails. When the list
    /// runs out the last entry (or the configured backend) is reused.
    pub fallback_backends: Vec<SolverBackend>,
    /// Factor applied to the time limit on every retry.
    pub time_limit_growth: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            fallback_backends: Vec::new(),
            time_limit_growth: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_fallback(mut self, backend: SolverBackend) -> Self {
        self.fallback_backends.push(backend);
        self
    }

    /// Solver config for attempt `attempt` (0 = first try).
    pub fn config_for_attempt(&self, base: &SolverConfig, attempt: u32) -> SolverConfig {
        let mut config = base.clone();
        if attempt == 0 {
            return config;
        }
        let fallback = self
            .fallback_backends
            .get(attempt as usize - 1)
            .or_else(|| self.fallback_backends.last());
        if let Some(backend) = fallback {
            config.backend = backend.clone();
        }
        if let Some(limit) = base.time_limit_ms {
            let factor = self.time_limit_growth.max(1.0).powi(attempt as i32);
            config.time_limit_ms = Some((limit as f64 * factor).round() as u64);
        }
        config
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub builder: BuilderParams,
    pub solver: SolverConfig,
    pub retry: RetryPolicy,
    pub validation: ValidationPolicy,
    /// Drop requests no vehicle can serve and rebuild instead of failing.
    pub drop_unservable: bool,
}

impl BatchConfig {
    pub fn with_builder(mut self, builder: BuilderParams) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_validation(mut self, validation: ValidationPolicy) -> Self {
        self.validation = validation;
        self
    }

    pub fn with_drop_unservable(mut self, drop_unservable: bool) -> Self {
        self.drop_unservable = drop_unservable;
        self
    }

    pub fn from_json_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: BatchConfig = serde_json::from_str(&contents)?;
        config.builder.validate()?;
        if config.retry.time_limit_growth.is_nan() || config.retry.time_limit_growth < 1.0 {
            return Err(InvalidConfigError::new("time_limit_growth must be at least 1").into());
        }
        Ok(config)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(InvalidConfigError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "failed to read batch config: {}", err),
            ConfigError::Json(err) => write!(f, "failed to parse batch config: {}", err),
            ConfigError::Invalid(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Json(err) => Some(err),
            ConfigError::Invalid(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}

impl From<InvalidConfigError> for ConfigError {
    fn from(err: InvalidConfigError) -> Self {
        ConfigError::Invalid(err)
    }
}
