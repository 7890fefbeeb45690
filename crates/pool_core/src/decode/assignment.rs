use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::model::{RequestId, VehicleId};

/// Where one request ended up in a decoded sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Unassigned,
    Assigned {
        vehicle: VehicleId,
        slot: u32,
        /// Other requests sharing the same vehicle slot.
        pooled_with: BTreeSet<RequestId>,
    },
}

impl Placement {
    pub fn is_assigned(&self) -> bool {
        matches!(self, Placement::Assigned { .. })
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self, Placement::Assigned { pooled_with, .. } if !pooled_with.is_empty())
    }
}

/// Request to vehicle-slot mapping decoded from one sample.
///
/// A request selected on several vehicles keeps its lowest-index placement
/// here; the violation report lists all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    placements: BTreeMap<RequestId, Placement>,
    total_detour_km: f64,
}

impl Assignment {
    pub(crate) fn new(placements: BTreeMap<RequestId, Placement>, total_detour_km: f64) -> Self {
        Self {
            placements,
            total_detour_km,
        }
    }

    pub fn placement(&self, request: RequestId) -> Option<&Placement> {
        self.placements.get(&request)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RequestId, &Placement)> {
        self.placements.iter()
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Sum of the recorded detours over every pooled pair in the sample.
    pub fn total_detour_km(&self) -> f64 {
        self.total_detour_km
    }

    pub fn assigned_count(&self) -> usize {
        self.placements.values().filter(|p| p.is_assigned()).count()
    }

    pub fn unassigned(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.placements
            .iter()
            .filter(|(_, p)| !p.is_assigned())
            .map(|(id, _)| *id)
    }

    pub fn pooled_count(&self) -> usize {
        self.placements.values().filter(|p| p.is_pooled()).count()
    }

    /// Share of assigned requests that ride with someone else.
    pub fn pooling_rate(&self) -> f64 {
        let assigned = self.assigned_count();
        if assigned == 0 {
            0.0
        } else {
            self.pooled_count() as f64 / assigned as f64
        }
    }

    /// Requests grouped by the vehicle slot they ride in.
    pub fn vehicle_groups(&self) -> BTreeMap<(VehicleId, u32), BTreeSet<RequestId>> {
        let mut groups: BTreeMap<(VehicleId, u32), BTreeSet<RequestId>> = BTreeMap::new();
        for (request, placement) in &self.placements {
            if let Placement::Assigned { vehicle, slot, .. } = placement {
                groups.entry((*vehicle, *slot)).or_default().insert(*request);
            }
        }
        groups
    }
}
