//! Solver adapter: a uniform sampling interface over interchangeable
//! backends.

pub mod algorithm;
pub mod annealing;
pub mod error;
pub mod exact;
#[cfg(feature = "remote")]
pub mod remote;
pub mod types;

use std::time::Instant;

use crate::qubo::QuboModel;

pub use algorithm::QuboSolver;
pub use annealing::SimulatedAnnealingSolver;
pub use error::SolverUnavailableError;
pub use exact::{ExactSolver, MAX_EXACT_VARIABLES};
pub use types::{Sample, SolverBackend, SolverConfig};

/// Construct a boxed solver from a [`SolverBackend`] value.
pub fn build_solver(backend: &SolverBackend) -> Box<dyn QuboSolver> {
    match backend {
        SolverBackend::SimulatedAnnealing => Box::new(SimulatedAnnealingSolver::new()),
        SolverBackend::ExactBruteForce => Box::new(ExactSolver::new()),
        #[cfg(feature = "remote")]
        SolverBackend::Remote { endpoint } => Box::new(remote::RemoteSolver::new(endpoint)),
    }
}

/// Sample `model` with the backend named in `config`.
pub fn solve(model: &QuboModel, config: &SolverConfig) -> Result<Vec<Sample>, SolverUnavailableError> {
    let solver = build_solver(&config.backend);
    let started = Instant::now();
    let samples = solver.solve(model, config)?;
    if samples.is_empty() {
        return Err(SolverUnavailableError::EmptyResponse);
    }
    tracing::debug!(
        solver = solver.name(),
        samples = samples.len(),
        best_energy = samples[0].energy,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "solve finished"
    );
    Ok(samples)
}
