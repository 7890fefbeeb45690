//! Combinatorial feasibility checks on decoded samples.
//!
//! Penalty terms are soft, so feasibility is decided here from the selected
//! variables alone, never from the energy.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{RequestId, VehicleId};
use crate::qubo::{DecisionVariable, VariableTable};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicy {
    /// Report requests without any placement as violations.
    pub require_all_assigned: bool,
}

impl ValidationPolicy {
    pub fn strict() -> Self {
        Self {
            require_all_assigned: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    /// The request was selected on more than one vehicle slot.
    MultipleAssignment {
        request: RequestId,
        vehicles: Vec<(VehicleId, u32)>,
    },
    /// Riders whose pickup windows overlap need more seats than the vehicle has.
    CapacityExceeded {
        vehicle: VehicleId,
        slot: u32,
        requests: Vec<RequestId>,
        occupancy: u32,
        capacity: u32,
    },
    Unassigned { request: RequestId },
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::MultipleAssignment { request, vehicles } => {
                let slots = vehicles
                    .iter()
                    .map(|(vehicle, slot)| format!("{}@{}", vehicle, slot))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "request {} assigned {} times ({})", request, vehicles.len(), slots)
            }
            Violation::CapacityExceeded {
                vehicle,
                slot,
                requests,
                occupancy,
                capacity,
            } => {
                let ids = requests
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "vehicle {} slot {} carries {} riders over capacity {} ({})",
                    vehicle, slot, occupancy, capacity, ids
                )
            }
            Violation::Unassigned { request } => write!(f, "request {} is unassigned", request),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationReport {
    violations: Vec<Violation>,
}

impl ViolationReport {
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check the selected variables against one-hot and capacity constraints.
pub fn validate(
    selected: &[DecisionVariable],
    variables: &VariableTable,
    policy: &ValidationPolicy,
) -> ViolationReport {
    let mut violations = Vec::new();

    let mut by_request: BTreeMap<RequestId, Vec<(VehicleId, u32)>> = BTreeMap::new();
    for variable in selected {
        by_request
            .entry(variable.request)
            .or_default()
            .push((variable.vehicle, variable.slot));
    }
    for (request, vehicles) in &by_request {
        if vehicles.len() > 1 {
            violations.push(Violation::MultipleAssignment {
                request: *request,
                vehicles: vehicles.clone(),
            });
        }
    }

    let mut by_slot: BTreeMap<(VehicleId, u32), Vec<RequestId>> = BTreeMap::new();
    for variable in selected {
        by_slot
            .entry((variable.vehicle, variable.slot))
            .or_default()
            .push(variable.request);
    }
    for ((vehicle, slot), requests) in by_slot {
        if let Some(violation) = capacity_sweep(vehicle, slot, &requests, variables) {
            violations.push(violation);
        }
    }

    if policy.require_all_assigned {
        for request in variables.requests() {
            if !by_request.contains_key(&request.id) {
                violations.push(Violation::Unassigned { request: request.id });
            }
        }
    }

    ViolationReport { violations }
}

/// Sweep over pickup windows of the riders sharing one vehicle slot and
/// report the first instant of peak occupancy if it exceeds capacity.
fn capacity_sweep(
    vehicle: VehicleId,
    slot: u32,
    requests: &[RequestId],
    variables: &VariableTable,
) -> Option<Violation> {
    let capacity = variables.vehicle(vehicle)?.capacity;

    // (time, kind, request) with kind 0 = window opens, 1 = window closes, so
    // windows touching at one instant count as overlapping.
    let mut events: Vec<(u32, u8, RequestId, u32)> = Vec::with_capacity(requests.len() * 2);
    for id in requests {
        let request = variables.request(*id)?;
        events.push((request.earliest_pickup_s, 0, *id, request.party_size));
        events.push((request.latest_pickup_s, 1, *id, request.party_size));
    }
    events.sort();

    let mut onboard: Vec<RequestId> = Vec::new();
    let mut occupancy = 0u32;
    let mut peak: Option<(u32, Vec<RequestId>)> = None;
    for (_, kind, id, party) in events {
        if kind == 0 {
            onboard.push(id);
            occupancy += party;
            if occupancy > capacity && peak.as_ref().map_or(true, |(best, _)| occupancy > *best) {
                peak = Some((occupancy, onboard.clone()));
            }
        } else {
            onboard.retain(|other| *other != id);
            occupancy -= party;
        }
    }

    peak.map(|(occupancy, mut requests)| {
        requests.sort();
        Violation::CapacityExceeded {
            vehicle,
            slot,
            requests,
            occupancy,
            capacity,
        }
    })
}
