//! Best-of-N selection over decoded samples.
//!
//! Order: feasible before infeasible, then energy ascending, then total
//! detour ascending, then the bitstring itself. The last key makes the
//! order total, so the result does not depend on input order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::qubo::VariableTable;
use crate::solver::Sample;

use super::assignment::Assignment;
use super::validate::{ValidationPolicy, ViolationReport};
use super::{decode_with_policy, DecodeError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub sample: Sample,
    pub assignment: Assignment,
    pub report: ViolationReport,
}

impl Candidate {
    pub fn from_sample(
        sample: Sample,
        variables: &VariableTable,
        policy: &ValidationPolicy,
    ) -> Result<Self, DecodeError> {
        let (assignment, report) = decode_with_policy(&sample.bits, variables, policy)?;
        Ok(Self {
            sample,
            assignment,
            report,
        })
    }

    pub fn is_feasible(&self) -> bool {
        self.report.is_feasible()
    }
}

fn compare(a: &Candidate, b: &Candidate) -> Ordering {
    b.is_feasible()
        .cmp(&a.is_feasible())
        .then_with(|| a.sample.energy.total_cmp(&b.sample.energy))
        .then_with(|| {
            a.assignment
                .total_detour_km()
                .total_cmp(&b.assignment.total_detour_km())
        })
        .then_with(|| a.sample.bits.cmp(&b.sample.bits))
}

/// Sort candidates best first and record each one's rank on its sample.
pub fn rank_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    candidates.sort_by(compare);
    for (rank, candidate) in candidates.iter_mut().enumerate() {
        candidate.sample.rank = Some(rank);
    }
    candidates
}

pub fn select_best(candidates: Vec<Candidate>) -> Option<Candidate> {
    rank_candidates(candidates).into_iter().next()
}

/// Decode every sample and rank the results.
pub fn decode_samples(
    samples: Vec<Sample>,
    variables: &VariableTable,
    policy: &ValidationPolicy,
) -> Result<Vec<Candidate>, DecodeError> {
    let candidates = samples
        .into_iter()
        .map(|sample| Candidate::from_sample(sample, variables, policy))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rank_candidates(candidates))
}
