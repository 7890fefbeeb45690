//! Greedy non-pooled dispatch used as the comparison baseline.
//!
//! Requests are served in pickup order, one rider party per trip. Each goes to
//! the nearest vehicle (from wherever that vehicle last dropped off) with
//! enough seats. Distances use the same metric as the pooled routes so the
//! two vehicle-km totals compare like for like.

use pool_core::geometry::GridPoint;
use pool_core::model::{Request, RequestId, Vehicle};
use pool_core::qubo::DetourModel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineResult {
    /// Total driven distance: empty pickup legs plus occupied trips.
    pub vehicle_km: f64,
    pub assigned: usize,
    /// Requests no vehicle had room for.
    pub unassigned: Vec<RequestId>,
}

pub fn greedy_baseline(
    requests: &[Request],
    vehicles: &[Vehicle],
    metric: DetourModel,
) -> BaselineResult {
    let mut positions: Vec<GridPoint> = vehicles.iter().map(|v| v.start).collect();
    let mut order: Vec<&Request> = requests.iter().collect();
    order.sort_by_key(|r| (r.earliest_pickup_s, r.id));

    let mut vehicle_km = 0.0;
    let mut assigned = 0;
    let mut unassigned = Vec::new();

    for request in order {
        let nearest = vehicles
            .iter()
            .enumerate()
            .filter(|(_, v)| v.capacity >= request.party_size)
            .map(|(i, _)| (i, metric.distance_km(positions[i], request.origin)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        match nearest {
            Some((i, pickup_km)) => {
                vehicle_km += pickup_km + metric.distance_km(request.origin, request.destination);
                positions[i] = request.destination;
                assigned += 1;
            }
            None => unassigned.push(request.id),
        }
    }

    BaselineResult {
        vehicle_km,
        assigned,
        unassigned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_vehicle_serves_each_request() {
        let requests = vec![
            Request::new(0, GridPoint::new(0, 0), GridPoint::new(2, 0)).with_window(0, 300),
            Request::new(1, GridPoint::new(4, 4), GridPoint::new(4, 2)).with_window(10, 300),
        ];
        let vehicles = vec![
            Vehicle::new(0, 4, GridPoint::new(0, 0)),
            Vehicle::new(1, 4, GridPoint::new(4, 4)),
        ];
        let result = greedy_baseline(&requests, &vehicles, DetourModel::Manhattan);
        assert_eq!(result.assigned, 2);
        assert_eq!(result.vehicle_km, 2.0);
        assert!(result.unassigned.is_empty());
    }

    #[test]
    fn vehicles_continue_from_last_dropoff() {
        let requests = vec![
            Request::new(0, GridPoint::new(0, 0), GridPoint::new(2, 0)).with_window(0, 300),
            Request::new(1, GridPoint::new(2, 0), GridPoint::new(2, 2)).with_window(30, 300),
        ];
        let vehicles = vec![Vehicle::new(0, 2, GridPoint::new(0, 0))];
        let result = greedy_baseline(&requests, &vehicles, DetourModel::Manhattan);
        // 1 km trip, no empty leg, 1 km trip.
        assert_eq!(result.vehicle_km, 2.0);
    }

    #[test]
    fn straight_line_metric_shortens_diagonal_trips() {
        let requests =
            vec![Request::new(0, GridPoint::new(0, 0), GridPoint::new(3, 4)).with_window(0, 300)];
        let vehicles = vec![Vehicle::new(0, 2, GridPoint::new(0, 0))];
        let straight = greedy_baseline(&requests, &vehicles, DetourModel::StraightLine);
        let manhattan = greedy_baseline(&requests, &vehicles, DetourModel::Manhattan);
        assert_eq!(straight.vehicle_km, 2.5);
        assert_eq!(manhattan.vehicle_km, 3.5);
    }

    #[test]
    fn oversized_parties_stay_unassigned() {
        let requests =
            vec![Request::new(3, GridPoint::new(0, 0), GridPoint::new(1, 0)).with_party_size(5)];
        let vehicles = vec![Vehicle::new(0, 4, GridPoint::new(0, 0))];
        let result = greedy_baseline(&requests, &vehicles, DetourModel::Manhattan);
        assert_eq!(result.unassigned, vec![RequestId(3)]);
        assert_eq!(result.vehicle_km, 0.0);
    }
}
