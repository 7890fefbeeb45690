//! Stop sequencing for decoded assignments.
//!
//! Each vehicle serves its slots in order. Within a slot the next stop is the
//! nearest eligible one (any pickup not yet made, or the dropoff of a rider
//! already on board), so every pickup precedes its dropoff. Later slots start
//! where the previous slot ended. Legs are measured with the same metric the
//! model used for its detours.

use serde::{Deserialize, Serialize};

use crate::decode::Assignment;
use crate::geometry::{travel_time_s, GridPoint};
use crate::model::{Request, RequestId, VehicleId};
use crate::qubo::{DetourModel, VariableTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StopKind {
    Pickup,
    Dropoff,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub kind: StopKind,
    pub request: RequestId,
    pub location: GridPoint,
    /// Distance from the previous stop (or the route start).
    pub leg_km: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleRoute {
    pub vehicle: VehicleId,
    pub slot: u32,
    pub start: GridPoint,
    pub stops: Vec<RouteStop>,
    pub total_km: f64,
    pub estimated_time_s: f64,
}

impl VehicleRoute {
    pub fn riders(&self) -> impl Iterator<Item = RequestId> + '_ {
        self.stops
            .iter()
            .filter(|s| s.kind == StopKind::Pickup)
            .map(|s| s.request)
    }
}

/// Plan one route per occupied vehicle slot, ordered by vehicle then slot.
pub fn plan_routes(
    assignment: &Assignment,
    variables: &VariableTable,
    metric: DetourModel,
    speed_mps: f64,
) -> Vec<VehicleRoute> {
    let mut routes = Vec::new();
    let mut position: Option<(VehicleId, GridPoint)> = None;

    for ((vehicle_id, slot), riders) in assignment.vehicle_groups() {
        let Some(vehicle) = variables.vehicle(vehicle_id) else {
            continue;
        };
        let start = match position {
            Some((previous, end)) if previous == vehicle_id => end,
            _ => vehicle.start,
        };
        let requests: Vec<&Request> = riders.iter().filter_map(|id| variables.request(*id)).collect();
        let route = sequence_stops(vehicle_id, slot, start, &requests, metric, speed_mps);
        let end = route.stops.last().map_or(start, |s| s.location);
        position = Some((vehicle_id, end));
        routes.push(route);
    }

    routes
}

fn sequence_stops(
    vehicle: VehicleId,
    slot: u32,
    start: GridPoint,
    requests: &[&Request],
    metric: DetourModel,
    speed_mps: f64,
) -> VehicleRoute {
    let mut picked = vec![false; requests.len()];
    let mut dropped = vec![false; requests.len()];
    let mut current = start;
    let mut stops = Vec::with_capacity(requests.len() * 2);
    let mut total_km = 0.0;

    loop {
        let mut next: Option<(f64, StopKind, RequestId, usize)> = None;
        for (i, request) in requests.iter().enumerate() {
            let candidate = if !picked[i] {
                (StopKind::Pickup, request.origin)
            } else if !dropped[i] {
                (StopKind::Dropoff, request.destination)
            } else {
                continue;
            };
            let km = metric.distance_km(current, candidate.1);
            let better = match next {
                None => true,
                Some((best_km, best_kind, best_id, _)) => {
                    km.total_cmp(&best_km)
                        .then(candidate.0.cmp(&best_kind))
                        .then(request.id.cmp(&best_id))
                        .is_lt()
                }
            };
            if better {
                next = Some((km, candidate.0, request.id, i));
            }
        }

        let Some((leg_km, kind, request, i)) = next else {
            break;
        };
        let location = match kind {
            StopKind::Pickup => {
                picked[i] = true;
                requests[i].origin
            }
            StopKind::Dropoff => {
                dropped[i] = true;
                requests[i].destination
            }
        };
        total_km += leg_km;
        current = location;
        stops.push(RouteStop {
            kind,
            request,
            location,
            leg_km,
        });
    }

    VehicleRoute {
        vehicle,
        slot,
        start,
        stops,
        total_km,
        estimated_time_s: travel_time_s(total_km, speed_mps),
    }
}

/// Vehicle-km over all routes.
pub fn total_route_km(routes: &[VehicleRoute]) -> f64 {
    routes.iter().map(|r| r.total_km).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::decode;
    use crate::model::Vehicle;
    use crate::qubo::{build, BuilderParams};
    use crate::test_helpers::{two_request_pool_model, two_vehicle_model};

    #[test]
    fn pooled_riders_share_one_route() {
        let model = two_request_pool_model();
        let (assignment, _) = decode(&[1, 1], &model.variables).expect("decode");
        let routes = plan_routes(&assignment, &model.variables, DetourModel::Manhattan, 10.0);

        assert_eq!(routes.len(), 1);
        let route = &routes[0];
        let kinds: Vec<StopKind> = route.stops.iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![StopKind::Pickup, StopKind::Pickup, StopKind::Dropoff, StopKind::Dropoff]
        );
        assert_eq!(route.total_km, 1.0);
        assert_eq!(route.estimated_time_s, 100.0);
        assert_eq!(route.riders().collect::<Vec<_>>(), vec![RequestId(0), RequestId(1)]);
    }

    #[test]
    fn legs_follow_the_model_metric() {
        let requests = vec![
            Request::new(0, GridPoint::new(0, 0), GridPoint::new(3, 4)),
            Request::new(1, GridPoint::new(0, 0), GridPoint::new(3, 4)),
        ];
        let vehicles = vec![Vehicle::new(0, 2, GridPoint::new(0, 0))];
        let params = BuilderParams::default().with_detour_model(DetourModel::StraightLine);
        let model = build(&requests, &vehicles, &params).expect("build");
        let (assignment, _) = decode(&[1, 1], &model.variables).expect("decode");

        let straight = plan_routes(&assignment, &model.variables, DetourModel::StraightLine, 10.0);
        let manhattan = plan_routes(&assignment, &model.variables, DetourModel::Manhattan, 10.0);
        // 5 grid units on the diagonal, 7 along the streets.
        assert_eq!(total_route_km(&straight), 2.5);
        assert_eq!(total_route_km(&manhattan), 3.5);
    }

    #[test]
    fn every_pickup_precedes_its_dropoff() {
        let model = two_vehicle_model();
        let bits: Vec<u8> = model
            .variables
            .iter()
            .map(|v| u8::from(v.vehicle == VehicleId(1)))
            .collect();
        let (assignment, _) = decode(&bits, &model.variables).expect("decode");
        for route in plan_routes(&assignment, &model.variables, DetourModel::Manhattan, 10.0) {
            for (pos, stop) in route.stops.iter().enumerate() {
                if stop.kind == StopKind::Dropoff {
                    assert!(route.stops[..pos]
                        .iter()
                        .any(|s| s.kind == StopKind::Pickup && s.request == stop.request));
                }
            }
        }
    }
}
