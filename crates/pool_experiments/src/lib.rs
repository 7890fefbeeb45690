//! Parallel experimentation framework for ride-pooling parameter sweeps.
//!
//! Runs many synthetic batches through the pooling pipeline with varying
//! fleet sizes, QUBO weights and solver backends, compares every pooled
//! result against a greedy one-rider-per-trip baseline, and exports the
//! metrics.
//!
//! # Quick Start
//!
//! ```no_run
//! use pool_experiments::{find_best_result_index, run_parallel_experiments, ParameterSpace};
//!
//! let space = ParameterSpace::grid()
//!     .num_requests(vec![6, 10])
//!     .num_vehicles(vec![2, 3])
//!     .pooling_bonus(vec![0.5, 1.0, 2.0]);
//!
//! let parameter_sets = space.generate();
//! let results = run_parallel_experiments(parameter_sets, None);
//! let best_idx = find_best_result_index(&results).unwrap();
//! ```
//!
//! # Architecture
//!
//! - [`parameters`]: parameter grid and random sampling
//! - [`runner`]: parallel batch execution using rayon
//! - [`baseline`]: greedy non-pooled dispatch for comparison
//! - [`metrics`]: per-run results and sweep summaries
//! - [`export`]: JSON/CSV export and best-result selection

pub mod baseline;
pub mod export;
pub mod metrics;
pub mod parameters;
pub mod runner;

pub use baseline::{greedy_baseline, BaselineResult};
pub use export::{export_to_csv, export_to_json, find_best_parameters, find_best_result_index};
pub use metrics::{summarize, ExperimentResult, SweepSummary};
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{run_parallel_experiments, run_single_experiment};
