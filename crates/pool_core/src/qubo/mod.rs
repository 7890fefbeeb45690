//! QUBO formulation of the pooling assignment problem.
//!
//! A model couples a [`VariableTable`] (which variable means which
//! request/vehicle/slot) with the [`QuboMatrix`] coefficients built from it.

pub mod builder;
pub mod detour;
pub mod error;
pub mod matrix;
pub mod params;
pub mod variables;

use serde::{Deserialize, Serialize};

pub use builder::{build, build_with_detour};
pub use detour::{pooled_detour_km, DetourCost};
pub use error::{BuildError, EmptyCandidateSetError, InvalidConfigError};
pub use matrix::{QuboAdjacency, QuboMatrix};
pub use params::{BuilderParams, DetourModel};
pub use variables::{DecisionVariable, PoolingPair, VariableTable};

/// Magnitudes of the normalised objective and penalty terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleReport {
    /// Raw objective magnitude that maps to 1.0 in the matrix.
    pub objective_scale: f64,
    pub max_objective_term: f64,
    pub max_penalty_term: f64,
    /// `max_penalty_term / max_objective_term`; `None` when every objective
    /// term is zero.
    pub penalty_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuboModel {
    pub variables: VariableTable,
    pub matrix: QuboMatrix,
    pub scale: ScaleReport,
    pub params: BuilderParams,
}

impl QuboModel {
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// Energy of a 0/1 vector under this model.
    pub fn energy(&self, bits: &[u8]) -> f64 {
        self.matrix.energy(bits)
    }
}
