use std::collections::HashSet;

use crate::geometry::{manhattan_km, travel_time_s};
use crate::model::{Request, Vehicle};

use super::detour::DetourCost;
use super::error::{BuildError, EmptyCandidateSetError, InvalidConfigError};
use super::matrix::QuboMatrix;
use super::params::BuilderParams;
use super::variables::VariableTable;
use super::{QuboModel, ScaleReport};

/// Penalty-to-objective ratios outside this band are logged.
const RECOMMENDED_PENALTY_RATIO: (f64, f64) = (1.0, 10.0);

/// Build the pooling QUBO using the detour model named in `params`.
pub fn build(
    requests: &[Request],
    vehicles: &[Vehicle],
    params: &BuilderParams,
) -> Result<QuboModel, BuildError> {
    let detour = params.detour_model;
    build_with_detour(requests, vehicles, params, &detour)
}

/// Build the pooling QUBO with a caller-supplied detour function.
pub fn build_with_detour(
    requests: &[Request],
    vehicles: &[Vehicle],
    params: &BuilderParams,
    detour: &dyn DetourCost,
) -> Result<QuboModel, BuildError> {
    validate_inputs(requests, vehicles, params)?;

    let mut variables = VariableTable::new(requests.to_vec(), vehicles.to_vec());
    let mut base_costs = Vec::new();
    let mut unservable = Vec::new();

    for request in requests {
        let mut candidates = 0;
        for vehicle in vehicles {
            let Some(base_cost) = candidate_cost(request, vehicle, params) else {
                continue;
            };
            for slot in 0..params.slots_per_vehicle {
                let (slot_start, slot_end) = params.slot_window(slot);
                let earliest = request.earliest_pickup_s.max(arrival_s(request, vehicle, params));
                if earliest > slot_end || slot_start > request.latest_pickup_s {
                    continue;
                }
                variables
                    .push(request.id, vehicle.id, slot)
                    .ok_or_else(|| InvalidConfigError::new("duplicate decision variable"))?;
                base_costs.push(base_cost);
                candidates += 1;
            }
        }
        if candidates == 0 {
            unservable.push(request.id);
        }
    }

    if !unservable.is_empty() {
        return Err(EmptyCandidateSetError::new(unservable).into());
    }

    // Pooling candidates: same vehicle slot, different requests, overlapping windows.
    let allocated: Vec<_> = variables.iter().copied().collect();
    let mut pooling = Vec::new();
    for (a, va) in allocated.iter().enumerate() {
        for (b, vb) in allocated.iter().enumerate().skip(a + 1) {
            if va.vehicle != vb.vehicle || va.slot != vb.slot || va.request == vb.request {
                continue;
            }
            let (Some(ra), Some(rb), Some(vehicle)) = (
                variables.request(va.request),
                variables.request(vb.request),
                variables.vehicle(va.vehicle),
            ) else {
                continue;
            };
            if !ra.window_overlaps(rb) {
                continue;
            }
            let detour_km = detour.detour_km(ra, rb, vehicle).max(0.0);
            let over_capacity = ra.party_size + rb.party_size > vehicle.capacity;
            pooling.push((a, b, detour_km, over_capacity));
        }
    }
    for &(a, b, detour_km, _) in &pooling {
        variables.add_pooling_pair(a, b, detour_km);
    }

    // Objective normalisation: the largest objective magnitude becomes 1.
    let max_raw_objective = base_costs
        .iter()
        .copied()
        .chain(
            pooling
                .iter()
                .map(|&(_, _, detour_km, _)| detour_km - params.pooling_bonus),
        )
        .map(f64::abs)
        .fold(0.0, f64::max);
    let objective_scale = if max_raw_objective > 0.0 {
        max_raw_objective
    } else {
        1.0
    };

    let lambda_one = params.assignment_penalty_weight;
    let lambda_cap = params.capacity_penalty_weight;
    let mut matrix = QuboMatrix::new(variables.len());
    let mut max_penalty_term: f64 = 0.0;

    for (index, cost) in base_costs.iter().enumerate() {
        matrix.add_linear(index, cost / objective_scale);
    }

    // One-hot: λ(1 - Σx)² = λ - λΣx + 2λΣ_{i<j} x_i x_j
    for request in requests {
        let candidates: Vec<usize> = variables
            .candidates_for(request.id)
            .map(|v| v.index)
            .collect();
        matrix.add_offset(lambda_one);
        for (pos, &i) in candidates.iter().enumerate() {
            matrix.add_linear(i, -lambda_one);
            for &j in &candidates[pos + 1..] {
                matrix.add(i, j, 2.0 * lambda_one);
            }
        }
        if candidates.len() > 1 {
            max_penalty_term = max_penalty_term.max(2.0 * lambda_one);
        } else {
            max_penalty_term = max_penalty_term.max(lambda_one);
        }
    }

    for &(a, b, detour_km, over_capacity) in &pooling {
        matrix.add(a, b, (detour_km - params.pooling_bonus) / objective_scale);
        if over_capacity {
            matrix.add(a, b, lambda_cap);
            max_penalty_term = max_penalty_term.max(lambda_cap);
        }
    }

    let max_objective_term = max_raw_objective / objective_scale;
    let penalty_ratio = (max_objective_term > 0.0).then(|| max_penalty_term / max_objective_term);
    if let Some(ratio) = penalty_ratio {
        let (low, high) = RECOMMENDED_PENALTY_RATIO;
        if ratio < low || ratio > high {
            tracing::warn!(
                ratio,
                low,
                high,
                "penalty-to-objective ratio outside recommended band"
            );
        }
    }

    let scale = ScaleReport {
        objective_scale,
        max_objective_term,
        max_penalty_term,
        penalty_ratio,
    };

    tracing::debug!(
        requests = requests.len(),
        vehicles = vehicles.len(),
        variables = variables.len(),
        terms = matrix.num_terms(),
        pooling_pairs = pooling.len(),
        objective_scale,
        "built pooling QUBO"
    );

    Ok(QuboModel {
        variables,
        matrix,
        scale,
        params: params.clone(),
    })
}

fn arrival_s(request: &Request, vehicle: &Vehicle, params: &BuilderParams) -> u32 {
    let seconds = travel_time_s(manhattan_km(vehicle.start, request.origin), params.avg_speed_mps);
    seconds.ceil().min(u32::MAX as f64) as u32
}

/// Solo service cost for a compatible (request, vehicle) pair, `None` when the
/// vehicle can never serve the request.
fn candidate_cost(request: &Request, vehicle: &Vehicle, params: &BuilderParams) -> Option<f64> {
    if request.party_size > vehicle.capacity {
        return None;
    }
    let pickup_km = manhattan_km(vehicle.start, request.origin);
    if params.max_pickup_km.is_some_and(|max_km| pickup_km > max_km) {
        return None;
    }
    let arrival = arrival_s(request, vehicle, params);
    if arrival > request.latest_pickup_s {
        return None;
    }
    let wait_minutes = arrival.saturating_sub(request.earliest_pickup_s) as f64 / 60.0;
    Some(pickup_km + request.trip_km() + wait_minutes * params.wait_cost_per_minute)
}

fn validate_inputs(
    requests: &[Request],
    vehicles: &[Vehicle],
    params: &BuilderParams,
) -> Result<(), InvalidConfigError> {
    params.validate()?;

    if requests.is_empty() {
        return Err(InvalidConfigError::new("requests cannot be empty"));
    }
    if vehicles.is_empty() {
        return Err(InvalidConfigError::new("vehicles cannot be empty"));
    }

    let mut seen_requests = HashSet::new();
    for request in requests {
        if !seen_requests.insert(request.id) {
            return Err(InvalidConfigError::new(format!(
                "duplicate request id {}",
                request.id
            )));
        }
        if request.party_size == 0 {
            return Err(InvalidConfigError::new(format!(
                "request {} has party size 0",
                request.id
            )));
        }
        if request.latest_pickup_s < request.earliest_pickup_s {
            return Err(InvalidConfigError::new(format!(
                "request {} has latest pickup before earliest pickup",
                request.id
            )));
        }
    }

    let mut seen_vehicles = HashSet::new();
    for vehicle in vehicles {
        if !seen_vehicles.insert(vehicle.id) {
            return Err(InvalidConfigError::new(format!(
                "duplicate vehicle id {}",
                vehicle.id
            )));
        }
        if vehicle.capacity < 1 {
            return Err(InvalidConfigError::new(format!(
                "vehicle {} has capacity {}; capacity must be at least 1",
                vehicle.id, vehicle.capacity
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GridPoint;
    use crate::model::{RequestId, VehicleId};
    use crate::qubo::DetourModel;

    fn depot() -> GridPoint {
        GridPoint::new(0, 0)
    }

    #[test]
    fn one_hot_expansion_matches_penalty_formula() {
        let requests = vec![Request::new(0, depot(), GridPoint::new(1, 0))];
        let vehicles = vec![
            Vehicle::new(0, 4, depot()),
            Vehicle::new(1, 4, depot()),
        ];
        let params = BuilderParams::default().with_pooling_bonus(0.0);
        let model = build(&requests, &vehicles, &params).expect("build");

        assert_eq!(model.variables.len(), 2);
        assert_eq!(model.matrix.offset(), params.assignment_penalty_weight);
        assert_eq!(
            model.matrix.coefficient(0, 1),
            2.0 * params.assignment_penalty_weight
        );
        // Both candidates cost the same, so after normalisation each is 1 - λ.
        assert_eq!(
            model.matrix.coefficient(0, 0),
            1.0 - params.assignment_penalty_weight
        );
    }

    #[test]
    fn vehicles_too_small_are_filtered_out() {
        let requests = vec![Request::new(0, depot(), GridPoint::new(1, 0)).with_party_size(3)];
        let vehicles = vec![
            Vehicle::new(0, 2, depot()),
            Vehicle::new(1, 4, depot()),
        ];
        let model = build(&requests, &vehicles, &BuilderParams::default()).expect("build");
        assert_eq!(model.variables.len(), 1);
        assert_eq!(model.variables.index_of(RequestId(0), VehicleId(1), 0), Some(0));
        assert_eq!(model.variables.index_of(RequestId(0), VehicleId(0), 0), None);
    }

    #[test]
    fn unreachable_vehicles_are_filtered_out() {
        // 10 grid units = 5 km = 500 s at 10 m/s, beyond the 300 s deadline.
        let requests = vec![Request::new(0, GridPoint::new(10, 0), GridPoint::new(11, 0))
            .with_window(0, 300)];
        let vehicles = vec![
            Vehicle::new(0, 4, depot()),
            Vehicle::new(1, 4, GridPoint::new(9, 0)),
        ];
        let model = build(&requests, &vehicles, &BuilderParams::default()).expect("build");
        assert_eq!(model.variables.len(), 1);
        assert_eq!(model.variables.get(0).map(|v| v.vehicle), Some(VehicleId(1)));
    }

    #[test]
    fn slots_follow_request_windows() {
        let requests = vec![
            Request::new(0, depot(), GridPoint::new(1, 0)).with_window(0, 100),
            Request::new(1, depot(), GridPoint::new(1, 0)).with_window(400, 500),
        ];
        let vehicles = vec![Vehicle::new(0, 4, depot())];
        let params = BuilderParams::default().with_slots(2, 600);
        let model = build(&requests, &vehicles, &params).expect("build");

        assert_eq!(model.variables.index_of(RequestId(0), VehicleId(0), 0), Some(0));
        assert_eq!(model.variables.index_of(RequestId(0), VehicleId(0), 1), None);
        assert_eq!(model.variables.index_of(RequestId(1), VehicleId(0), 1), Some(1));
        assert!(model.variables.pooling_pairs().is_empty());
    }

    #[test]
    fn rejects_zero_capacity_vehicle() {
        let requests = vec![Request::new(0, depot(), GridPoint::new(1, 0))];
        let vehicles = vec![Vehicle::new(3, 0, depot())];
        let error = build(&requests, &vehicles, &BuilderParams::default())
            .expect_err("capacity 0 should fail");
        assert!(matches!(error, BuildError::InvalidConfig(_)));
        assert!(error.to_string().contains("capacity must be at least 1"));
    }

    #[test]
    fn custom_detour_function_is_recorded() {
        let requests = vec![
            Request::new(0, depot(), GridPoint::new(1, 0)),
            Request::new(1, depot(), GridPoint::new(0, 1)),
        ];
        let vehicles = vec![Vehicle::new(0, 2, depot())];
        let flat = |_: &Request, _: &Request, _: &Vehicle| 0.25;
        let model = build_with_detour(&requests, &vehicles, &BuilderParams::default(), &flat)
            .expect("build");
        assert_eq!(model.variables.detour_between(0, 1), Some(0.25));
    }

    #[test]
    fn max_pickup_distance_drops_far_vehicles() {
        let requests = vec![Request::new(0, GridPoint::new(4, 0), GridPoint::new(4, 1))];
        let vehicles = vec![
            Vehicle::new(0, 4, depot()),
            Vehicle::new(1, 4, GridPoint::new(3, 0)),
        ];
        // Vehicle 0 is 2 km away, vehicle 1 is 0.5 km away.
        let params = BuilderParams::default().with_max_pickup_km(1.0);
        let model = build(&requests, &vehicles, &params).expect("build");
        assert_eq!(model.variables.len(), 1);
        assert_eq!(model.variables.index_of(RequestId(0), VehicleId(1), 0), Some(0));

        let error = build(&requests, &vehicles[..1], &params).expect_err("no vehicle in range");
        assert!(matches!(error, BuildError::EmptyCandidateSet(_)));
    }

    #[test]
    fn straight_line_detours_are_shorter_than_manhattan() {
        let requests = vec![
            Request::new(0, depot(), GridPoint::new(4, 0)),
            Request::new(1, depot(), GridPoint::new(0, 4)),
        ];
        let vehicles = vec![Vehicle::new(0, 2, depot())];

        let manhattan = build(&requests, &vehicles, &BuilderParams::default()).expect("build");
        let straight = build(
            &requests,
            &vehicles,
            &BuilderParams::default().with_detour_model(DetourModel::StraightLine),
        )
        .expect("build");

        assert_eq!(manhattan.variables.detour_between(0, 1), Some(4.0));
        let detour = straight.variables.detour_between(0, 1).expect("pooling pair");
        // The second rider crosses the 4x4 diagonal: 2 * sqrt(2) km.
        assert!((detour - 2.0 * std::f64::consts::SQRT_2).abs() < 1e-12);
    }
}
