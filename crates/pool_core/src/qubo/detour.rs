//! Detour cost of pooling two requests into one vehicle.
//!
//! The shared route starts at the vehicle and serves both riders with every
//! pickup before its dropoff. Of the four valid stop orders the shortest route
//! is chosen; the detour is the extra distance the two riders spend in the
//! vehicle compared with riding alone.

use crate::geometry::GridPoint;
use crate::model::{Request, Vehicle};

use super::params::DetourModel;

/// Maps a pooled pair on a vehicle to an added detour cost (km).
pub trait DetourCost: Send + Sync {
    fn detour_km(&self, a: &Request, b: &Request, vehicle: &Vehicle) -> f64;
}

impl<F> DetourCost for F
where
    F: Fn(&Request, &Request, &Vehicle) -> f64 + Send + Sync,
{
    fn detour_km(&self, a: &Request, b: &Request, vehicle: &Vehicle) -> f64 {
        self(a, b, vehicle)
    }
}

impl DetourCost for DetourModel {
    fn detour_km(&self, a: &Request, b: &Request, vehicle: &Vehicle) -> f64 {
        pooled_detour_km(a, b, vehicle.start, self.metric())
    }
}

#[derive(Clone, Copy)]
enum Stop {
    Pickup(usize),
    Dropoff(usize),
}

const STOP_ORDERS: [[Stop; 4]; 4] = [
    [Stop::Pickup(0), Stop::Pickup(1), Stop::Dropoff(0), Stop::Dropoff(1)],
    [Stop::Pickup(0), Stop::Pickup(1), Stop::Dropoff(1), Stop::Dropoff(0)],
    [Stop::Pickup(1), Stop::Pickup(0), Stop::Dropoff(0), Stop::Dropoff(1)],
    [Stop::Pickup(1), Stop::Pickup(0), Stop::Dropoff(1), Stop::Dropoff(0)],
];

/// Detour (km) of the shortest shared route serving `a` and `b` from `start`.
pub fn pooled_detour_km(
    a: &Request,
    b: &Request,
    start: GridPoint,
    metric: fn(GridPoint, GridPoint) -> f64,
) -> f64 {
    let riders = [a, b];
    let direct = [
        metric(a.origin, a.destination),
        metric(b.origin, b.destination),
    ];

    let mut best: Option<(f64, f64)> = None;
    for order in STOP_ORDERS {
        let mut position = start;
        let mut travelled = 0.0;
        let mut boarded_at = [0.0; 2];
        let mut in_vehicle = [0.0; 2];

        for stop in order {
            let next = match stop {
                Stop::Pickup(rider) => riders[rider].origin,
                Stop::Dropoff(rider) => riders[rider].destination,
            };
            travelled += metric(position, next);
            position = next;
            match stop {
                Stop::Pickup(rider) => boarded_at[rider] = travelled,
                Stop::Dropoff(rider) => in_vehicle[rider] = travelled - boarded_at[rider],
            }
        }

        let detour = (in_vehicle[0] - direct[0]).max(0.0) + (in_vehicle[1] - direct[1]).max(0.0);
        let better = match best {
            None => true,
            Some((best_len, best_detour)) => {
                travelled < best_len || (travelled == best_len && detour < best_detour)
            }
        };
        if better {
            best = Some((travelled, detour));
        }
    }

    best.map_or(0.0, |(_, detour)| detour)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(id: u32, from: (i32, i32), to: (i32, i32)) -> Request {
        Request::new(id, GridPoint::new(from.0, from.1), GridPoint::new(to.0, to.1))
    }

    #[test]
    fn identical_trips_pool_without_detour() {
        let a = request(0, (0, 0), (3, 0));
        let b = request(1, (0, 0), (3, 0));
        let vehicle = Vehicle::new(0, 4, GridPoint::new(0, 0));
        assert_eq!(DetourModel::Manhattan.detour_km(&a, &b, &vehicle), 0.0);
    }

    #[test]
    fn diverging_trips_incur_detour() {
        let a = request(0, (0, 0), (4, 0));
        let b = request(1, (0, 0), (0, 4));
        let vehicle = Vehicle::new(0, 4, GridPoint::new(0, 0));
        let detour = DetourModel::Manhattan.detour_km(&a, &b, &vehicle);
        // Whoever is dropped second rides the other leg first: 4 km extra.
        assert_eq!(detour, 4.0);
    }

    #[test]
    fn closures_act_as_detour_functions() {
        let a = request(0, (0, 0), (1, 0));
        let b = request(1, (0, 0), (1, 0));
        let vehicle = Vehicle::new(0, 2, GridPoint::new(0, 0));
        let flat = |_: &Request, _: &Request, _: &Vehicle| 0.75;
        assert_eq!(flat.detour_km(&a, &b, &vehicle), 0.75);
    }
}
