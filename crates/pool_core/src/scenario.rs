//! Seeded synthetic batches on a small city grid.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::geometry::GridPoint;
use crate::model::{Request, Vehicle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioParams {
    pub num_requests: usize,
    pub num_vehicles: usize,
    /// Side length of the square grid; nodes are `0..grid_size` on each axis.
    pub grid_size: i32,
    pub vehicle_capacity: u32,
    /// Requests depart uniformly in `[0, request_window_s]`.
    pub request_window_s: u32,
    /// Longest a rider accepts to wait past departure.
    pub max_wait_s: u32,
    pub max_party_size: u32,
    pub seed: u64,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            num_requests: 10,
            num_vehicles: 3,
            grid_size: 4,
            vehicle_capacity: 4,
            request_window_s: 300,
            max_wait_s: 600,
            max_party_size: 1,
            seed: 42,
        }
    }
}

impl ScenarioParams {
    pub fn with_requests(mut self, num_requests: usize) -> Self {
        self.num_requests = num_requests;
        self
    }

    pub fn with_vehicles(mut self, num_vehicles: usize) -> Self {
        self.num_vehicles = num_vehicles;
        self
    }

    pub fn with_grid_size(mut self, grid_size: i32) -> Self {
        self.grid_size = grid_size;
        self
    }

    pub fn with_vehicle_capacity(mut self, vehicle_capacity: u32) -> Self {
        self.vehicle_capacity = vehicle_capacity;
        self
    }

    pub fn with_request_window_s(mut self, request_window_s: u32) -> Self {
        self.request_window_s = request_window_s;
        self
    }

    pub fn with_max_wait_s(mut self, max_wait_s: u32) -> Self {
        self.max_wait_s = max_wait_s;
        self
    }

    pub fn with_max_party_size(mut self, max_party_size: u32) -> Self {
        self.max_party_size = max_party_size;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Central node where every vehicle starts.
    pub fn depot(&self) -> GridPoint {
        GridPoint::new(self.grid_size / 2, self.grid_size / 2)
    }
}

fn random_node(rng: &mut StdRng, grid_size: i32) -> GridPoint {
    GridPoint::new(rng.gen_range(0..grid_size), rng.gen_range(0..grid_size))
}

/// Generate a reproducible batch: the same params always give the same
/// requests and vehicles.
pub fn generate_batch(params: &ScenarioParams) -> (Vec<Request>, Vec<Vehicle>) {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let grid_size = params.grid_size.max(1);
    let max_party = params.max_party_size.max(1);

    let requests = (0..params.num_requests)
        .map(|i| {
            let origin = random_node(&mut rng, grid_size);
            let mut destination = random_node(&mut rng, grid_size);
            while grid_size > 1 && destination == origin {
                destination = random_node(&mut rng, grid_size);
            }
            let depart = rng.gen_range(0..=params.request_window_s);
            let party = rng.gen_range(1..=max_party);
            Request::new(i as u32, origin, destination)
                .with_window(depart, depart.saturating_add(params.max_wait_s))
                .with_party_size(party)
        })
        .collect();

    let depot = params.depot();
    let vehicles = (0..params.num_vehicles)
        .map(|i| Vehicle::new(i as u32, params.vehicle_capacity.max(1), depot))
        .collect();

    (requests, vehicles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_batch() {
        let params = ScenarioParams::default().with_requests(12).with_seed(9);
        assert_eq!(generate_batch(&params), generate_batch(&params));
        let other = params.clone().with_seed(10);
        assert_ne!(generate_batch(&params).0, generate_batch(&other).0);
    }

    #[test]
    fn requests_stay_on_grid_and_in_window() {
        let params = ScenarioParams::default()
            .with_requests(50)
            .with_max_party_size(3);
        let (requests, vehicles) = generate_batch(&params);

        assert_eq!(requests.len(), 50);
        assert_eq!(vehicles.len(), 3);
        for request in &requests {
            for point in [request.origin, request.destination] {
                assert!((0..4).contains(&point.x) && (0..4).contains(&point.y));
            }
            assert_ne!(request.origin, request.destination);
            assert!(request.earliest_pickup_s <= 300);
            assert_eq!(request.latest_pickup_s - request.earliest_pickup_s, 600);
            assert!((1..=3).contains(&request.party_size));
        }
        assert!(vehicles.iter().all(|v| v.start == GridPoint::new(2, 2)));
    }
}
