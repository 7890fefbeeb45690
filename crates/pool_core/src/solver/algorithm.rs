use std::collections::BTreeMap;

use crate::qubo::QuboModel;

use super::error::SolverUnavailableError;
use super::types::{Sample, SolverConfig};

/// Trait for QUBO samplers. Implementations must be `Send + Sync` so one
/// solver can serve batches running on different threads.
pub trait QuboSolver: Send + Sync {
    fn name(&self) -> &'static str;

    /// Sample low-energy 0/1 vectors for `model`.
    ///
    /// Returns at least one sample or an error. Every sample has one bit per
    /// variable and an energy recomputed from the model.
    fn solve(
        &self,
        model: &QuboModel,
        config: &SolverConfig,
    ) -> Result<Vec<Sample>, SolverUnavailableError>;
}

/// Turn raw backend output into samples: checks shape, merges identical
/// bitstrings, recomputes energies and sorts by energy.
pub(crate) fn collect_samples(
    model: &QuboModel,
    raw: impl IntoIterator<Item = (Vec<u8>, u32)>,
) -> Result<Vec<Sample>, SolverUnavailableError> {
    let n = model.num_variables();
    let mut counts: BTreeMap<Vec<u8>, u32> = BTreeMap::new();
    for (bits, occurrences) in raw {
        if bits.len() != n {
            return Err(SolverUnavailableError::Backend(format!(
                "sample has {} bits, model has {} variables",
                bits.len(),
                n
            )));
        }
        if let Some(bad) = bits.iter().find(|&&b| b > 1) {
            return Err(SolverUnavailableError::Backend(format!(
                "sample contains non-binary value {}",
                bad
            )));
        }
        *counts.entry(bits).or_insert(0) += occurrences.max(1);
    }

    if counts.is_empty() {
        return Err(SolverUnavailableError::EmptyResponse);
    }

    let mut samples: Vec<Sample> = counts
        .into_iter()
        .map(|(bits, occurrences)| {
            let energy = model.energy(&bits);
            Sample::new(bits, energy, occurrences)
        })
        .collect();
    samples.sort_by(|a, b| a.energy.total_cmp(&b.energy).then_with(|| a.bits.cmp(&b.bits)));
    Ok(samples)
}
