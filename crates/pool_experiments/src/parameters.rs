//! Parameter variation framework for exploring the pooling parameter space.
//!
//! A [`ParameterSpace`] lists candidate values per dimension; unset
//! dimensions fall back to the base scenario and batch config. Grid search
//! takes the Cartesian product, random sampling draws unique combinations.

use std::collections::HashSet;

use pool_core::pipeline::BatchConfig;
use pool_core::scenario::ScenarioParams;
use pool_core::solver::SolverBackend;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// One runnable experiment configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSet {
    pub scenario: ScenarioParams,
    pub batch: BatchConfig,
    /// Unique experiment ID for this parameter configuration.
    pub experiment_id: String,
    /// Replicate index within the experiment.
    pub run_id: usize,
    /// Seed for both the synthetic batch and the solver.
    pub seed: u64,
}

impl ParameterSet {
    pub fn new(
        scenario: ScenarioParams,
        batch: BatchConfig,
        experiment_id: String,
        run_id: usize,
        seed: u64,
    ) -> Self {
        let scenario = scenario.with_seed(seed);
        let mut batch = batch;
        batch.solver.seed = seed;
        Self {
            scenario,
            batch,
            experiment_id,
            run_id,
            seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Combination {
    num_requests: usize,
    num_vehicles: usize,
    pooling_bonus: f64,
    assignment_penalty: f64,
    capacity_penalty: f64,
    backend: SolverBackend,
}

#[derive(Debug, Clone)]
pub struct ParameterSpace {
    base_scenario: ScenarioParams,
    base_batch: BatchConfig,
    num_requests: Vec<usize>,
    num_vehicles: Vec<usize>,
    pooling_bonus: Vec<f64>,
    assignment_penalty: Vec<f64>,
    capacity_penalty: Vec<f64>,
    backends: Vec<SolverBackend>,
    runs_per_combination: usize,
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}

fn or_default<T: Clone>(values: &[T], default: T) -> Vec<T> {
    if values.is_empty() {
        vec![default]
    } else {
        values.to_vec()
    }
}

fn seed_for(experiment: usize, run: usize) -> u64 {
    (experiment as u64)
        .wrapping_mul(0x9e37_79b9)
        .wrapping_add(run as u64)
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self {
            base_scenario: ScenarioParams::default(),
            base_batch: BatchConfig::default(),
            num_requests: Vec::new(),
            num_vehicles: Vec::new(),
            pooling_bonus: Vec::new(),
            assignment_penalty: Vec::new(),
            capacity_penalty: Vec::new(),
            backends: Vec::new(),
            runs_per_combination: 1,
        }
    }

    /// Start a grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    pub fn with_base_scenario(mut self, scenario: ScenarioParams) -> Self {
        self.base_scenario = scenario;
        self
    }

    pub fn with_base_batch(mut self, batch: BatchConfig) -> Self {
        self.base_batch = batch;
        self
    }

    pub fn num_requests(mut self, counts: Vec<usize>) -> Self {
        self.num_requests = counts;
        self
    }

    pub fn num_vehicles(mut self, counts: Vec<usize>) -> Self {
        self.num_vehicles = counts;
        self
    }

    pub fn pooling_bonus(mut self, values: Vec<f64>) -> Self {
        self.pooling_bonus = values;
        self
    }

    pub fn assignment_penalty(mut self, values: Vec<f64>) -> Self {
        self.assignment_penalty = values;
        self
    }

    pub fn capacity_penalty(mut self, values: Vec<f64>) -> Self {
        self.capacity_penalty = values;
        self
    }

    pub fn backend(mut self, backends: Vec<SolverBackend>) -> Self {
        self.backends = backends;
        self
    }

    /// Replicates per combination, each with its own seed.
    pub fn runs(mut self, runs: usize) -> Self {
        self.runs_per_combination = runs.max(1);
        self
    }

    fn combinations(&self) -> Vec<Combination> {
        let builder = &self.base_batch.builder;
        let num_requests = or_default(&self.num_requests, self.base_scenario.num_requests);
        let num_vehicles = or_default(&self.num_vehicles, self.base_scenario.num_vehicles);
        let pooling_bonus = or_default(&self.pooling_bonus, builder.pooling_bonus);
        let assignment_penalty =
            or_default(&self.assignment_penalty, builder.assignment_penalty_weight);
        let capacity_penalty = or_default(&self.capacity_penalty, builder.capacity_penalty_weight);
        let backends = or_default(&self.backends, self.base_batch.solver.backend.clone());

        let mut combinations = Vec::new();
        for &num_requests in &num_requests {
            for &num_vehicles in &num_vehicles {
                for &pooling_bonus in &pooling_bonus {
                    for &assignment_penalty in &assignment_penalty {
                        for &capacity_penalty in &capacity_penalty {
                            for backend in &backends {
                                combinations.push(Combination {
                                    num_requests,
                                    num_vehicles,
                                    pooling_bonus,
                                    assignment_penalty,
                                    capacity_penalty,
                                    backend: backend.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
        combinations
    }

    fn parameter_set(&self, experiment: usize, run: usize, combo: &Combination) -> ParameterSet {
        let scenario = self
            .base_scenario
            .clone()
            .with_requests(combo.num_requests)
            .with_vehicles(combo.num_vehicles);
        let mut batch = self.base_batch.clone();
        batch.builder = batch
            .builder
            .with_pooling_bonus(combo.pooling_bonus)
            .with_assignment_penalty(combo.assignment_penalty)
            .with_capacity_penalty(combo.capacity_penalty);
        batch.solver.backend = combo.backend.clone();
        ParameterSet::new(
            scenario,
            batch,
            format!("exp_{}", experiment),
            run,
            seed_for(experiment, run),
        )
    }

    /// All combinations (Cartesian product), each repeated `runs` times.
    pub fn generate(&self) -> Vec<ParameterSet> {
        self.combinations()
            .iter()
            .enumerate()
            .flat_map(|(experiment, combo)| {
                (0..self.runs_per_combination).map(move |run| (experiment, run, combo))
            })
            .map(|(experiment, run, combo)| self.parameter_set(experiment, run, combo))
            .collect()
    }

    /// Up to `count` distinct combinations drawn at random.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        let combinations = self.combinations();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut seen = HashSet::new();
        let mut sets = Vec::new();

        while sets.len() < count.min(combinations.len()) {
            let experiment = rng.gen_range(0..combinations.len());
            if seen.insert(experiment) {
                sets.push(self.parameter_set(experiment, 0, &combinations[experiment]));
            }
        }
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_cartesian_product() {
        let sets = ParameterSpace::grid()
            .num_requests(vec![4, 8])
            .pooling_bonus(vec![0.5, 1.0, 2.0])
            .backend(vec![SolverBackend::SimulatedAnnealing, SolverBackend::ExactBruteForce])
            .generate();

        assert_eq!(sets.len(), 12);
        assert_eq!(sets[0].scenario.num_requests, 4);
        assert_eq!(sets[0].batch.builder.pooling_bonus, 0.5);
        assert_eq!(sets[1].batch.solver.backend, SolverBackend::ExactBruteForce);
        assert_eq!(sets[11].scenario.num_requests, 8);
        let ids: HashSet<&str> = sets.iter().map(|s| s.experiment_id.as_str()).collect();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn unset_dimensions_use_base_values() {
        let sets = ParameterSpace::grid().generate();
        assert_eq!(sets.len(), 1);
        assert_eq!(sets[0].scenario.num_requests, ScenarioParams::default().num_requests);
        assert_eq!(sets[0].batch.builder, BatchConfig::default().builder);
    }

    #[test]
    fn runs_get_distinct_seeds() {
        let sets = ParameterSpace::grid().runs(3).generate();
        assert_eq!(sets.len(), 3);
        let seeds: HashSet<u64> = sets.iter().map(|s| s.seed).collect();
        assert_eq!(seeds.len(), 3);
        assert!(sets.iter().all(|s| s.scenario.seed == s.seed && s.batch.solver.seed == s.seed));
    }

    #[test]
    fn random_sampling_is_unique_and_bounded() {
        let space = ParameterSpace::grid()
            .num_requests(vec![4, 6, 8])
            .num_vehicles(vec![2, 3]);
        let sets = space.sample_random(4, 7);
        assert_eq!(sets.len(), 4);
        let ids: HashSet<&str> = sets.iter().map(|s| s.experiment_id.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(space.sample_random(100, 7).len(), 6);
    }
}
