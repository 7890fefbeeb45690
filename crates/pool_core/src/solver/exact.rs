//! Exhaustive enumeration for small models.
//!
//! Walks all 2^n states in Gray-code order so consecutive states differ by a
//! single bit and the energy can be updated in O(degree).

use std::time::{Duration, Instant};

use crate::qubo::QuboModel;

use super::algorithm::{collect_samples, QuboSolver};
use super::error::SolverUnavailableError;
use super::types::{Sample, SolverConfig};

/// Largest model the enumeration accepts.
pub const MAX_EXACT_VARIABLES: usize = 24;

/// Steps between deadline checks.
const DEADLINE_CHECK_INTERVAL: u64 = 1 << 16;

#[derive(Debug, Default, Clone, Copy)]
pub struct ExactSolver;

impl ExactSolver {
    pub fn new() -> Self {
        Self
    }
}

/// Keeps the `capacity` lowest-energy states seen so far, sorted ascending.
struct LowestStates {
    capacity: usize,
    states: Vec<(f64, u32)>,
}

impl LowestStates {
    fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            states: Vec::new(),
        }
    }

    fn offer(&mut self, energy: f64, state: u32) {
        if self.states.len() == self.capacity {
            match self.states.last() {
                Some(&(worst, worst_state))
                    if energy.total_cmp(&worst).then(state.cmp(&worst_state)).is_ge() =>
                {
                    return
                }
                _ => {}
            }
        }
        let position = self
            .states
            .partition_point(|&(e, s)| e.total_cmp(&energy).then(s.cmp(&state)).is_lt());
        self.states.insert(position, (energy, state));
        self.states.truncate(self.capacity);
    }
}

fn state_bits(state: u32, n: usize) -> Vec<u8> {
    (0..n).map(|i| ((state >> i) & 1) as u8).collect()
}

impl QuboSolver for ExactSolver {
    fn name(&self) -> &'static str {
        "exact"
    }

    fn solve(
        &self,
        model: &QuboModel,
        config: &SolverConfig,
    ) -> Result<Vec<Sample>, SolverUnavailableError> {
        let n = model.num_variables();
        if n > MAX_EXACT_VARIABLES {
            return Err(SolverUnavailableError::TooLarge {
                num_variables: n,
                max_variables: MAX_EXACT_VARIABLES,
            });
        }

        let started = Instant::now();
        let limit = config.time_limit_ms.map(Duration::from_millis);
        let adjacency = model.matrix.adjacency();

        let mut bits = vec![0u8; n];
        let mut state: u32 = 0;
        let mut energy = model.matrix.offset();
        let mut lowest = LowestStates::new(config.num_reads);
        lowest.offer(energy, state);

        for step in 1..(1u64 << n) {
            if step % DEADLINE_CHECK_INTERVAL == 0 {
                if let Some(limit) = limit {
                    if started.elapsed() >= limit {
                        return Err(SolverUnavailableError::Timeout {
                            limit_ms: limit.as_millis() as u64,
                        });
                    }
                }
            }
            let flip = step.trailing_zeros() as usize;
            energy += adjacency.flip_delta(&bits, flip);
            bits[flip] ^= 1;
            state ^= 1 << flip;
            lowest.offer(energy, state);
        }

        tracing::debug!(
            variables = n,
            kept = lowest.states.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "exhaustive enumeration finished"
        );

        collect_samples(
            model,
            lowest
                .states
                .into_iter()
                .map(|(_, state)| (state_bits(state, n), 1)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::two_request_pool_model;

    #[test]
    fn returns_all_states_in_energy_order() {
        let model = two_request_pool_model();
        let config = SolverConfig::default().with_num_reads(10);
        let samples = ExactSolver::new().solve(&model, &config).expect("samples");

        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].bits, vec![1, 1]);
        for sample in &samples {
            assert_eq!(sample.energy, model.energy(&sample.bits));
        }
        assert!(samples.windows(2).all(|w| w[0].energy <= w[1].energy));
    }

    #[test]
    fn keeps_only_requested_number_of_states() {
        let model = two_request_pool_model();
        let config = SolverConfig::default().with_num_reads(1);
        let samples = ExactSolver::new().solve(&model, &config).expect("samples");
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].bits, vec![1, 1]);
    }

    #[test]
    fn lowest_states_breaks_ties_by_state() {
        let mut lowest = LowestStates::new(2);
        lowest.offer(1.0, 3);
        lowest.offer(1.0, 1);
        lowest.offer(0.5, 2);
        assert_eq!(lowest.states, vec![(0.5, 2), (1.0, 1)]);
    }
}
