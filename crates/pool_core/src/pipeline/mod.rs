//! End-to-end processing of one batch: build, solve with retries, decode,
//! rank and plan routes.
//!
//! Batches share no state, so callers may run many of them in parallel.

pub mod config;
pub mod metrics;

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::decode::{decode_samples, Candidate};
use crate::model::{Request, RequestId, Vehicle};
use crate::qubo::{build, BuildError, QuboModel, ScaleReport};
use crate::routes::{plan_routes, total_route_km, VehicleRoute};
use crate::solver::{solve, Sample, SolverUnavailableError};

pub use config::{BatchConfig, ConfigError, RetryPolicy};
pub use metrics::{feasibility_rate, BatchMetrics};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    InvalidConfig,
    EmptyCandidateSet,
    SolverUnavailable,
    Decode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BatchStatus {
    /// The best assignment is feasible.
    Completed,
    /// Only infeasible samples came back; the least-bad one is kept.
    CompletedInfeasible,
    /// No sample could be produced.
    Failed { error_kind: ErrorKind, message: String },
}

impl BatchStatus {
    fn failed(error_kind: ErrorKind, error: impl std::fmt::Display) -> Self {
        BatchStatus::Failed {
            error_kind,
            message: error.to_string(),
        }
    }

    pub fn is_completed(&self) -> bool {
        !matches!(self, BatchStatus::Failed { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            BatchStatus::Completed => "completed",
            BatchStatus::CompletedInfeasible => "completed_infeasible",
            BatchStatus::Failed { .. } => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub status: BatchStatus,
    /// Best-ranked candidate, present whenever the batch completed.
    pub best: Option<Candidate>,
    /// All decoded candidates, best first.
    pub candidates: Vec<Candidate>,
    pub routes: Vec<VehicleRoute>,
    pub dropped: Vec<RequestId>,
    pub scale: Option<ScaleReport>,
    pub metrics: BatchMetrics,
}

impl BatchOutcome {
    fn failed(status: BatchStatus, dropped: Vec<RequestId>, metrics: BatchMetrics) -> Self {
        Self {
            status,
            best: None,
            candidates: Vec::new(),
            routes: Vec::new(),
            dropped,
            scale: None,
            metrics,
        }
    }
}

/// Build the model, removing unservable requests once when allowed.
fn build_model(
    requests: &[Request],
    vehicles: &[Vehicle],
    config: &BatchConfig,
) -> Result<(QuboModel, Vec<RequestId>), BuildError> {
    match build(requests, vehicles, &config.builder) {
        Err(BuildError::EmptyCandidateSet(err)) if config.drop_unservable => {
            let dropped = err.requests().to_vec();
            tracing::warn!(
                dropped = dropped.len(),
                requests = %err,
                "dropping unservable requests and rebuilding"
            );
            let remaining: Vec<Request> = requests
                .iter()
                .filter(|r| !dropped.contains(&r.id))
                .cloned()
                .collect();
            if remaining.is_empty() {
                return Err(BuildError::EmptyCandidateSet(err));
            }
            let model = build(&remaining, vehicles, &config.builder)?;
            Ok((model, dropped))
        }
        other => other.map(|model| (model, Vec::new())),
    }
}

/// Solve with the retry policy. Returns the samples, attempts made, backend
/// label and total solve time.
fn solve_with_retry(
    model: &QuboModel,
    config: &BatchConfig,
) -> (Result<Vec<Sample>, SolverUnavailableError>, u32, &'static str, u64) {
    let max_attempts = config.retry.max_attempts.max(1);
    let mut solve_time_ms = 0;
    let mut last_error = SolverUnavailableError::EmptyResponse;
    let mut backend = config.solver.backend.label();

    for attempt in 0..max_attempts {
        let solver_config = config.retry.config_for_attempt(&config.solver, attempt);
        backend = solver_config.backend.label();
        let started = Instant::now();
        let result = solve(model, &solver_config);
        solve_time_ms += started.elapsed().as_millis() as u64;
        match result {
            Ok(samples) => return (Ok(samples), attempt + 1, backend, solve_time_ms),
            Err(err) => {
                tracing::warn!(
                    attempt = attempt + 1,
                    max_attempts,
                    backend,
                    error = %err,
                    "solver unavailable"
                );
                last_error = err;
            }
        }
    }

    (Err(last_error), max_attempts, backend, solve_time_ms)
}

/// Run one batch to completion. Never panics on bad input: every failure is
/// reported through [`BatchStatus::Failed`] with its error kind.
pub fn run_batch(requests: &[Request], vehicles: &[Vehicle], config: &BatchConfig) -> BatchOutcome {
    let mut metrics = BatchMetrics {
        num_requests: requests.len(),
        num_vehicles: vehicles.len(),
        ..BatchMetrics::default()
    };

    let (model, dropped) = match build_model(requests, vehicles, config) {
        Ok(built) => built,
        Err(err) => {
            let kind = match err {
                BuildError::InvalidConfig(_) => ErrorKind::InvalidConfig,
                BuildError::EmptyCandidateSet(_) => ErrorKind::EmptyCandidateSet,
            };
            tracing::info!(error = %err, "batch failed to build");
            return BatchOutcome::failed(BatchStatus::failed(kind, err), Vec::new(), metrics);
        }
    };
    metrics.dropped = dropped.len();
    metrics.num_variables = model.num_variables();
    metrics.num_terms = model.matrix.num_terms();
    metrics.penalty_ratio = model.scale.penalty_ratio;

    let (samples, attempts, backend, solve_time_ms) = solve_with_retry(&model, config);
    metrics.attempts = attempts;
    metrics.solve_time_ms = solve_time_ms;
    let samples = match samples {
        Ok(samples) => samples,
        Err(err) => {
            tracing::info!(error = %err, attempts, "batch failed: solver unavailable");
            return BatchOutcome::failed(
                BatchStatus::failed(ErrorKind::SolverUnavailable, err),
                dropped,
                metrics,
            );
        }
    };
    metrics.backend = Some(backend.to_string());

    let candidates = match decode_samples(samples, &model.variables, &config.validation) {
        Ok(candidates) => candidates,
        Err(err) => {
            return BatchOutcome::failed(BatchStatus::failed(ErrorKind::Decode, err), dropped, metrics);
        }
    };

    let Some(best) = candidates.first().cloned() else {
        return BatchOutcome::failed(
            BatchStatus::failed(ErrorKind::SolverUnavailable, SolverUnavailableError::EmptyResponse),
            dropped,
            metrics,
        );
    };

    let status = if best.is_feasible() {
        BatchStatus::Completed
    } else {
        BatchStatus::CompletedInfeasible
    };
    let routes = plan_routes(
        &best.assignment,
        &model.variables,
        config.builder.detour_model,
        config.builder.avg_speed_mps,
    );

    metrics.best_energy = Some(best.sample.energy);
    metrics.feasibility_rate = feasibility_rate(&candidates);
    metrics.pooling_rate = best.assignment.pooling_rate();
    metrics.assigned = best.assignment.assigned_count();
    metrics.unassigned = best.assignment.unassigned().count();
    metrics.vehicle_km = total_route_km(&routes);
    metrics.total_detour_km = best.assignment.total_detour_km();

    tracing::info!(
        status = status.label(),
        requests = requests.len(),
        variables = metrics.num_variables,
        attempts,
        backend,
        best_energy = best.sample.energy,
        pooling_rate = metrics.pooling_rate,
        "batch finished"
    );

    BatchOutcome {
        status,
        best: Some(best),
        candidates,
        routes,
        dropped,
        scale: Some(model.scale),
        metrics,
    }
}
