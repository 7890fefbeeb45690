//! Decoding solver samples back into assignments and checking them.

pub mod assignment;
pub mod ranking;
pub mod validate;

use std::collections::{BTreeMap, BTreeSet};

use crate::model::RequestId;
use crate::qubo::{DecisionVariable, VariableTable};

pub use assignment::{Assignment, Placement};
pub use ranking::{decode_samples, rank_candidates, select_best, Candidate};
pub use validate::{validate, ValidationPolicy, Violation, ViolationReport};

/// The sample does not fit the variable table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    LengthMismatch { expected: usize, actual: usize },
    NonBinary { index: usize, value: u8 },
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::LengthMismatch { expected, actual } => write!(
                f,
                "sample has {} entries but the table has {} variables",
                actual, expected
            ),
            DecodeError::NonBinary { index, value } => {
                write!(f, "sample entry {} is {}, expected 0 or 1", index, value)
            }
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode with the default policy (unassigned requests are allowed).
pub fn decode(
    bits: &[u8],
    variables: &VariableTable,
) -> Result<(Assignment, ViolationReport), DecodeError> {
    decode_with_policy(bits, variables, &ValidationPolicy::default())
}

pub fn decode_with_policy(
    bits: &[u8],
    variables: &VariableTable,
    policy: &ValidationPolicy,
) -> Result<(Assignment, ViolationReport), DecodeError> {
    if bits.len() != variables.len() {
        return Err(DecodeError::LengthMismatch {
            expected: variables.len(),
            actual: bits.len(),
        });
    }
    if let Some((index, &value)) = bits.iter().enumerate().find(|(_, &b)| b > 1) {
        return Err(DecodeError::NonBinary { index, value });
    }

    let selected: Vec<DecisionVariable> = variables
        .iter()
        .filter(|v| bits[v.index] == 1)
        .copied()
        .collect();

    let mut placements: BTreeMap<RequestId, Placement> = variables
        .requests()
        .iter()
        .map(|r| (r.id, Placement::Unassigned))
        .collect();
    for variable in &selected {
        let placement = placements.entry(variable.request).or_insert(Placement::Unassigned);
        if placement.is_assigned() {
            continue;
        }
        // Only riders that form a pooling pair share the vehicle; same-slot
        // riders with disjoint pickup windows are served one after another.
        let pooled_with: BTreeSet<RequestId> = selected
            .iter()
            .filter(|other| {
                other.request != variable.request
                    && variables.detour_between(variable.index, other.index).is_some()
            })
            .map(|other| other.request)
            .collect();
        *placement = Placement::Assigned {
            vehicle: variable.vehicle,
            slot: variable.slot,
            pooled_with,
        };
    }

    let mut total_detour_km = 0.0;
    for (pos, a) in selected.iter().enumerate() {
        for b in &selected[pos + 1..] {
            if let Some(detour) = variables.detour_between(a.index, b.index) {
                total_detour_km += detour;
            }
        }
    }

    let report = validate(&selected, variables, policy);
    Ok((Assignment::new(placements, total_detour_km), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridPoint;
    use crate::model::{Request, Vehicle, VehicleId};
    use crate::qubo::{build, BuilderParams};
    use crate::test_helpers::{
        oversized_parties_model, two_request_pool_model, two_vehicle_model, DEPOT,
    };

    #[test]
    fn pooled_pair_decodes_feasible() {
        let model = two_request_pool_model();
        let (assignment, report) = decode(&[1, 1], &model.variables).expect("decode");

        assert!(report.is_feasible());
        assert_eq!(assignment.assigned_count(), 2);
        assert_eq!(assignment.pooling_rate(), 1.0);
        match assignment.placement(RequestId(0)) {
            Some(Placement::Assigned { pooled_with, .. }) => {
                assert!(pooled_with.contains(&RequestId(1)));
            }
            other => panic!("unexpected placement {:?}", other),
        }
    }

    #[test]
    fn disjoint_windows_in_one_slot_are_not_pooled() {
        let requests = vec![
            Request::new(0, DEPOT, GridPoint::new(2, 0)).with_window(0, 100),
            Request::new(1, DEPOT, GridPoint::new(2, 0)).with_window(400, 500),
        ];
        let vehicles = vec![Vehicle::new(0, 2, DEPOT)];
        let model = build(&requests, &vehicles, &BuilderParams::default()).expect("build");
        assert!(model.variables.pooling_pairs().is_empty());

        let (assignment, report) = decode(&[1, 1], &model.variables).expect("decode");
        assert!(report.is_feasible());
        assert_eq!(assignment.assigned_count(), 2);
        assert_eq!(assignment.pooled_count(), 0);
        assert_eq!(assignment.pooling_rate(), 0.0);
        assert_eq!(assignment.total_detour_km(), 0.0);
    }

    #[test]
    fn double_selection_names_the_request() {
        let model = two_vehicle_model();
        let bits: Vec<u8> = model
            .variables
            .iter()
            .map(|v| u8::from(v.request == RequestId(0)))
            .collect();
        let (_, report) = decode(&bits, &model.variables).expect("decode");

        assert!(!report.is_feasible());
        assert!(report.violations().iter().any(|v| matches!(
            v,
            Violation::MultipleAssignment { request, vehicles }
                if *request == RequestId(0) && vehicles.len() == 2
        )));
    }

    #[test]
    fn oversized_parties_exceed_capacity() {
        let model = oversized_parties_model();
        let (_, report) = decode(&[1, 1], &model.variables).expect("decode");
        assert_eq!(
            report.violations(),
            &[Violation::CapacityExceeded {
                vehicle: VehicleId(0),
                slot: 0,
                requests: vec![RequestId(0), RequestId(1)],
                occupancy: 4,
                capacity: 2,
            }]
        );
    }

    #[test]
    fn strict_policy_reports_unassigned() {
        let model = two_request_pool_model();
        let (assignment, lenient) = decode(&[1, 0], &model.variables).expect("decode");
        assert!(lenient.is_feasible());
        assert_eq!(assignment.unassigned().collect::<Vec<_>>(), vec![RequestId(1)]);

        let (_, strict) =
            decode_with_policy(&[1, 0], &model.variables, &ValidationPolicy::strict()).expect("decode");
        assert_eq!(
            strict.violations(),
            &[Violation::Unassigned {
                request: RequestId(1)
            }]
        );
    }

    #[test]
    fn rejects_malformed_samples() {
        let model = two_request_pool_model();
        assert_eq!(
            decode(&[1], &model.variables).expect_err("short"),
            DecodeError::LengthMismatch {
                expected: 2,
                actual: 1
            }
        );
        assert_eq!(
            decode(&[1, 2], &model.variables).expect_err("non-binary"),
            DecodeError::NonBinary { index: 1, value: 2 }
        );
    }
}
