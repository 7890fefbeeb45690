use pool_core::geometry::GridPoint;
use pool_core::model::{Request, Vehicle};
use pool_core::scenario::{generate_batch, ScenarioParams};

pub const DEPOT: GridPoint = GridPoint::new(0, 0);

pub fn point(x: i32, y: i32) -> GridPoint {
    GridPoint::new(x, y)
}

/// Two parties going the same way with overlapping windows.
pub fn pooling_pair(party_size: u32) -> Vec<Request> {
    vec![
        Request::new(0, DEPOT, point(2, 0))
            .with_window(0, 300)
            .with_party_size(party_size),
        Request::new(1, DEPOT, point(2, 0))
            .with_window(60, 360)
            .with_party_size(party_size),
    ]
}

pub fn single_vehicle(capacity: u32) -> Vec<Vehicle> {
    vec![Vehicle::new(0, capacity, DEPOT)]
}

/// Seeded batch on the default 4x4 grid.
pub fn synthetic_batch(num_requests: usize, num_vehicles: usize, seed: u64) -> (Vec<Request>, Vec<Vehicle>) {
    generate_batch(
        &ScenarioParams::default()
            .with_requests(num_requests)
            .with_vehicles(num_vehicles)
            .with_seed(seed),
    )
}

/// Every 0/1 vector of length `n`, lowest bit first.
pub fn all_bitstrings(n: usize) -> Vec<Vec<u8>> {
    (0..1u32 << n)
        .map(|state| (0..n).map(|i| ((state >> i) & 1) as u8).collect())
        .collect()
}
