use serde::{Deserialize, Serialize};

/// Which solver backend to use. Stored in [`SolverConfig`] so it serializes
/// into batch and experiment configuration files.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub enum SolverBackend {
    /// In-process simulated annealing, always available.
    #[default]
    SimulatedAnnealing,
    /// Exhaustive Gray-code enumeration for small models.
    ExactBruteForce,
    /// Remote annealing service (e.g. `"http://localhost:8080/solve"`).
    #[cfg(feature = "remote")]
    Remote { endpoint: String },
}

impl SolverBackend {
    pub fn label(&self) -> &'static str {
        match self {
            SolverBackend::SimulatedAnnealing => "simulated_annealing",
            SolverBackend::ExactBruteForce => "exact",
            #[cfg(feature = "remote")]
            SolverBackend::Remote { .. } => "remote",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Independent reads (annealing runs) or lowest states returned.
    pub num_reads: usize,
    /// Wall-clock budget for one solve call.
    pub time_limit_ms: Option<u64>,
    pub backend: SolverBackend,
    pub seed: u64,
    /// Metropolis sweeps per annealing read.
    pub sweeps: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            num_reads: 100,
            time_limit_ms: None,
            backend: SolverBackend::SimulatedAnnealing,
            seed: 42,
            sweeps: 1000,
        }
    }
}

impl SolverConfig {
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_num_reads(mut self, num_reads: usize) -> Self {
        self.num_reads = num_reads;
        self
    }

    pub fn with_time_limit_ms(mut self, time_limit_ms: u64) -> Self {
        self.time_limit_ms = Some(time_limit_ms);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_sweeps(mut self, sweeps: usize) -> Self {
        self.sweeps = sweeps;
        self
    }
}

/// One returned solution vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// One 0/1 entry per decision variable.
    pub bits: Vec<u8>,
    pub energy: f64,
    /// How many reads ended in this exact bitstring.
    pub num_occurrences: u32,
    /// Position after ranking, 0 = best. Unset until ranked.
    #[serde(default)]
    pub rank: Option<usize>,
}

impl Sample {
    pub fn new(bits: Vec<u8>, energy: f64, num_occurrences: u32) -> Self {
        Self {
            bits,
            energy,
            num_occurrences,
            rank: None,
        }
    }
}
