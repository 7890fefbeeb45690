//! Grid geometry: city grid nodes and distance calculations.
//!
//! Requests and vehicles live on an integer grid (the synthetic 4x4 grid or the
//! 20x20 grid the NYC zones are mapped onto). One grid unit is [`GRID_TO_KM`]
//! kilometres. Road distance is approximated with the Manhattan metric; a
//! straight-line metric is available for comparison runs.

use serde::{Deserialize, Serialize};

/// Kilometres per grid unit.
pub const GRID_TO_KM: f64 = 0.5;

/// Default average vehicle speed in metres per second.
pub const DEFAULT_AVG_SPEED_MPS: f64 = 10.0;

/// A node on the city grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Manhattan distance between two grid points in kilometres.
pub fn manhattan_km(a: GridPoint, b: GridPoint) -> f64 {
    let dx = (a.x - b.x).unsigned_abs() as f64;
    let dy = (a.y - b.y).unsigned_abs() as f64;
    (dx + dy) * GRID_TO_KM
}

/// Euclidean distance between two grid points in kilometres.
pub fn straight_line_km(a: GridPoint, b: GridPoint) -> f64 {
    let dx = (a.x - b.x) as f64;
    let dy = (a.y - b.y) as f64;
    dx.hypot(dy) * GRID_TO_KM
}

/// Travel time in seconds for a distance at a constant speed.
pub fn travel_time_s(distance_km: f64, speed_mps: f64) -> f64 {
    if distance_km <= 0.0 {
        return 0.0;
    }
    distance_km * 1000.0 / speed_mps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_scales_grid_units() {
        let a = GridPoint::new(0, 0);
        let b = GridPoint::new(3, -1);
        assert_eq!(manhattan_km(a, b), 2.0);
        assert_eq!(manhattan_km(b, a), 2.0);
    }

    #[test]
    fn straight_line_never_exceeds_manhattan() {
        let a = GridPoint::new(1, 2);
        let b = GridPoint::new(4, 6);
        assert_eq!(straight_line_km(a, b), 2.5);
        assert!(straight_line_km(a, b) <= manhattan_km(a, b));
    }

    #[test]
    fn travel_time_uses_speed() {
        // 1 km at 10 m/s
        assert_eq!(travel_time_s(1.0, 10.0), 100.0);
        assert_eq!(travel_time_s(0.0, 10.0), 0.0);
    }
}
