//! Decision variable arena and its (request, vehicle, slot) lookup table.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Request, RequestId, Vehicle, VehicleId};

/// Binary variable `x = 1` iff `request` rides in `vehicle` during `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DecisionVariable {
    pub index: usize,
    pub request: RequestId,
    pub vehicle: VehicleId,
    pub slot: u32,
}

/// Two variables that share a vehicle slot and may be pooled, with the
/// detour (km) recorded at build time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoolingPair {
    pub a: usize,
    pub b: usize,
    pub detour_km: f64,
}

/// Bijection between contiguous variable indices and feasible
/// (request, vehicle, slot) triples.
///
/// Also carries the batch inputs and pooling detours so a persisted table can
/// be decoded and validated without rebuilding the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "VariableTableData", into = "VariableTableData")]
pub struct VariableTable {
    variables: Vec<DecisionVariable>,
    requests: Vec<Request>,
    vehicles: Vec<Vehicle>,
    pooling_pairs: Vec<PoolingPair>,
    lookup: HashMap<(RequestId, VehicleId, u32), usize>,
    request_pos: HashMap<RequestId, usize>,
    vehicle_pos: HashMap<VehicleId, usize>,
    pair_pos: HashMap<(usize, usize), usize>,
}

#[derive(Serialize, Deserialize)]
struct VariableTableData {
    variables: Vec<DecisionVariable>,
    requests: Vec<Request>,
    vehicles: Vec<Vehicle>,
    pooling_pairs: Vec<PoolingPair>,
}

impl From<VariableTable> for VariableTableData {
    fn from(table: VariableTable) -> Self {
        Self {
            variables: table.variables,
            requests: table.requests,
            vehicles: table.vehicles,
            pooling_pairs: table.pooling_pairs,
        }
    }
}

impl TryFrom<VariableTableData> for VariableTable {
    type Error = String;

    fn try_from(data: VariableTableData) -> Result<Self, Self::Error> {
        let mut table = VariableTable::new(data.requests, data.vehicles);
        for (position, variable) in data.variables.iter().enumerate() {
            if variable.index != position {
                return Err(format!(
                    "variable indices must be contiguous: expected {position}, found {}",
                    variable.index
                ));
            }
            if !table.request_pos.contains_key(&variable.request) {
                return Err(format!("variable {position} references unknown request {}", variable.request));
            }
            if !table.vehicle_pos.contains_key(&variable.vehicle) {
                return Err(format!("variable {position} references unknown vehicle {}", variable.vehicle));
            }
            if table
                .push(variable.request, variable.vehicle, variable.slot)
                .is_none()
            {
                return Err(format!(
                    "duplicate variable for ({}, {}, slot {})",
                    variable.request, variable.vehicle, variable.slot
                ));
            }
        }
        for pair in data.pooling_pairs {
            if pair.a >= table.len() || pair.b >= table.len() {
                return Err(format!("pooling pair ({}, {}) out of range", pair.a, pair.b));
            }
            table.add_pooling_pair(pair.a, pair.b, pair.detour_km);
        }
        Ok(table)
    }
}

impl VariableTable {
    pub(crate) fn new(requests: Vec<Request>, vehicles: Vec<Vehicle>) -> Self {
        let request_pos = requests
            .iter()
            .enumerate()
            .map(|(pos, r)| (r.id, pos))
            .collect();
        let vehicle_pos = vehicles
            .iter()
            .enumerate()
            .map(|(pos, v)| (v.id, pos))
            .collect();
        Self {
            variables: Vec::new(),
            requests,
            vehicles,
            pooling_pairs: Vec::new(),
            lookup: HashMap::new(),
            request_pos,
            vehicle_pos,
            pair_pos: HashMap::new(),
        }
    }

    /// Allocate the next index for a triple. Returns `None` for a duplicate.
    pub(crate) fn push(&mut self, request: RequestId, vehicle: VehicleId, slot: u32) -> Option<usize> {
        let key = (request, vehicle, slot);
        if self.lookup.contains_key(&key) {
            return None;
        }
        let index = self.variables.len();
        self.variables.push(DecisionVariable {
            index,
            request,
            vehicle,
            slot,
        });
        self.lookup.insert(key, index);
        Some(index)
    }

    pub(crate) fn add_pooling_pair(&mut self, a: usize, b: usize, detour_km: f64) {
        let key = (a.min(b), a.max(b));
        self.pair_pos.insert(key, self.pooling_pairs.len());
        self.pooling_pairs.push(PoolingPair {
            a: key.0,
            b: key.1,
            detour_km,
        });
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&DecisionVariable> {
        self.variables.get(index)
    }

    pub fn index_of(&self, request: RequestId, vehicle: VehicleId, slot: u32) -> Option<usize> {
        self.lookup.get(&(request, vehicle, slot)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionVariable> {
        self.variables.iter()
    }

    /// Variables that would place `request` somewhere, in index order.
    pub fn candidates_for(&self, request: RequestId) -> impl Iterator<Item = &DecisionVariable> {
        self.variables.iter().filter(move |v| v.request == request)
    }

    pub fn requests(&self) -> &[Request] {
        &self.requests
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn request(&self, id: RequestId) -> Option<&Request> {
        self.request_pos.get(&id).map(|&pos| &self.requests[pos])
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicle_pos.get(&id).map(|&pos| &self.vehicles[pos])
    }

    pub fn pooling_pairs(&self) -> &[PoolingPair] {
        &self.pooling_pairs
    }

    /// Detour recorded for two pooled variables, if they form a pooling pair.
    pub fn detour_between(&self, a: usize, b: usize) -> Option<f64> {
        self.pair_pos
            .get(&(a.min(b), a.max(b)))
            .map(|&pos| self.pooling_pairs[pos].detour_km)
    }
}
