//! Test helpers for common batch setups.
//!
//! The small scenarios here are shared by unit tests, integration tests and
//! benches so they all agree on which variable is which.

use crate::geometry::GridPoint;
use crate::model::{Request, Vehicle};
use crate::qubo::{build, BuilderParams, QuboModel};

/// Vehicle depot used by the helper scenarios.
pub const DEPOT: GridPoint = GridPoint::new(0, 0);

/// Two single riders going the same way, one vehicle with two seats.
pub fn two_request_pool_batch() -> (Vec<Request>, Vec<Vehicle>) {
    let requests = vec![
        Request::new(0, DEPOT, GridPoint::new(2, 0)).with_window(0, 300),
        Request::new(1, DEPOT, GridPoint::new(2, 0)).with_window(60, 360),
    ];
    let vehicles = vec![Vehicle::new(0, 2, DEPOT)];
    (requests, vehicles)
}

/// Variables: `0 = (r0, v0, 0)`, `1 = (r1, v0, 0)`.
///
/// # Panics
///
/// Panics if the scenario stops building, which would be a builder bug.
pub fn two_request_pool_model() -> QuboModel {
    let (requests, vehicles) = two_request_pool_batch();
    build(&requests, &vehicles, &BuilderParams::default()).expect("two-request scenario builds")
}

/// Two parties of two riders each and one vehicle with two seats.
///
/// # Panics
///
/// Panics if the scenario stops building.
pub fn oversized_parties_model() -> QuboModel {
    let (requests, vehicles) = two_request_pool_batch();
    let requests = requests.into_iter().map(|r| r.with_party_size(2)).collect::<Vec<_>>();
    build(&requests, &vehicles, &BuilderParams::default()).expect("oversized scenario builds")
}

/// Two riders and two vehicles: variables `(r0, v0)`, `(r0, v1)`, `(r1, v0)`,
/// `(r1, v1)` in that order.
///
/// # Panics
///
/// Panics if the scenario stops building.
pub fn two_vehicle_model() -> QuboModel {
    let (requests, _) = two_request_pool_batch();
    let vehicles = vec![Vehicle::new(0, 2, DEPOT), Vehicle::new(1, 2, GridPoint::new(1, 1))];
    build(&requests, &vehicles, &BuilderParams::default()).expect("two-vehicle scenario builds")
}
