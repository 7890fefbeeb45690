//! Simulated annealing over the QUBO energy landscape.
//!
//! Each read starts from a random state and performs Metropolis single-bit
//! flips while the inverse temperature β grows geometrically from `beta_start`
//! (the largest possible move is accepted half of the time) to `beta_end`
//! (the smallest non-zero move is accepted 1% of the time).

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::qubo::{QuboAdjacency, QuboModel};

use super::algorithm::{collect_samples, QuboSolver};
use super::error::SolverUnavailableError;
use super::types::{Sample, SolverConfig};

#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedAnnealingSolver;

impl SimulatedAnnealingSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Start and end inverse temperatures for the given coefficients.
fn beta_range(adjacency: &QuboAdjacency) -> (f64, f64) {
    let mut max_field: f64 = 0.0;
    let mut min_step = f64::INFINITY;
    for (i, linear) in adjacency.linear.iter().enumerate() {
        let mut field = linear.abs();
        if linear.abs() > 0.0 {
            min_step = min_step.min(linear.abs());
        }
        for (_, value) in &adjacency.neighbours[i] {
            field += value.abs();
            if value.abs() > 0.0 {
                min_step = min_step.min(value.abs());
            }
        }
        max_field = max_field.max(field);
    }
    if max_field == 0.0 || !min_step.is_finite() {
        return (1.0, 1.0);
    }
    let beta_start = 2f64.ln() / max_field;
    let beta_end = (100f64.ln() / min_step).max(beta_start);
    (beta_start, beta_end)
}

/// One annealing read. Returns `None` when the deadline passed before the
/// read could start; a deadline hit mid-read ends the schedule early.
fn anneal(
    adjacency: &QuboAdjacency,
    sweeps: usize,
    betas: (f64, f64),
    seed: u64,
    deadline: Option<Instant>,
) -> Option<Vec<u8>> {
    if deadline.is_some_and(|d| Instant::now() >= d) {
        return None;
    }

    let n = adjacency.linear.len();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut bits: Vec<u8> = (0..n).map(|_| rng.gen_range(0..=1)).collect();

    let (beta_start, beta_end) = betas;
    let sweeps = sweeps.max(1);
    let ratio = if sweeps > 1 {
        (beta_end / beta_start).powf(1.0 / (sweeps - 1) as f64)
    } else {
        1.0
    };

    let mut beta = beta_start;
    for _ in 0..sweeps {
        for i in 0..n {
            let delta = adjacency.flip_delta(&bits, i);
            if delta <= 0.0 || rng.gen::<f64>() < (-beta * delta).exp() {
                bits[i] ^= 1;
            }
        }
        beta *= ratio;
        if deadline.is_some_and(|d| Instant::now() >= d) {
            break;
        }
    }
    Some(bits)
}

impl QuboSolver for SimulatedAnnealingSolver {
    fn name(&self) -> &'static str {
        "simulated_annealing"
    }

    fn solve(
        &self,
        model: &QuboModel,
        config: &SolverConfig,
    ) -> Result<Vec<Sample>, SolverUnavailableError> {
        let adjacency = model.matrix.adjacency();
        let betas = beta_range(&adjacency);
        let deadline = config
            .time_limit_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms));

        let reads: Vec<Vec<u8>> = (0..config.num_reads.max(1))
            .into_par_iter()
            .filter_map(|read| {
                anneal(
                    &adjacency,
                    config.sweeps,
                    betas,
                    config.seed.wrapping_add(read as u64),
                    deadline,
                )
            })
            .collect();

        if reads.is_empty() {
            return Err(SolverUnavailableError::Timeout {
                limit_ms: config.time_limit_ms.unwrap_or(0),
            });
        }

        tracing::debug!(
            reads = reads.len(),
            variables = model.num_variables(),
            beta_start = betas.0,
            beta_end = betas.1,
            "annealing finished"
        );

        collect_samples(model, reads.into_iter().map(|bits| (bits, 1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::two_request_pool_model;

    #[test]
    fn finds_pooled_ground_state() {
        let model = two_request_pool_model();
        let config = SolverConfig::default().with_num_reads(20).with_sweeps(200);
        let samples = SimulatedAnnealingSolver::new()
            .solve(&model, &config)
            .expect("samples");

        let best = &samples[0];
        assert_eq!(best.bits, vec![1, 1]);
        assert!(samples.windows(2).all(|w| w[0].energy <= w[1].energy));
        let total: u32 = samples.iter().map(|s| s.num_occurrences).sum();
        assert_eq!(total, 20);
    }

    #[test]
    fn same_seed_gives_same_samples() {
        let model = two_request_pool_model();
        let config = SolverConfig::default().with_num_reads(8).with_sweeps(50).with_seed(7);
        let solver = SimulatedAnnealingSolver::new();
        let first = solver.solve(&model, &config).expect("first");
        let second = solver.solve(&model, &config).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn zero_time_limit_times_out() {
        let model = two_request_pool_model();
        let config = SolverConfig::default().with_time_limit_ms(0);
        let error = SimulatedAnnealingSolver::new()
            .solve(&model, &config)
            .expect_err("no read can start");
        assert_eq!(error, SolverUnavailableError::Timeout { limit_ms: 0 });
    }
}
