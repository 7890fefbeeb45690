//! Batch inputs: ride requests and vehicles.
//!
//! Both are immutable for the lifetime of one optimization batch. Times are
//! seconds relative to the start of the batch.

use serde::{Deserialize, Serialize};

use crate::geometry::{manhattan_km, GridPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u32);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(pub u32);

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A ride request with its pickup time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub origin: GridPoint,
    pub destination: GridPoint,
    pub earliest_pickup_s: u32,
    pub latest_pickup_s: u32,
    pub party_size: u32,
}

impl Request {
    pub fn new(id: u32, origin: GridPoint, destination: GridPoint) -> Self {
        Self {
            id: RequestId(id),
            origin,
            destination,
            earliest_pickup_s: 0,
            latest_pickup_s: 600,
            party_size: 1,
        }
    }

    pub fn with_window(mut self, earliest_pickup_s: u32, latest_pickup_s: u32) -> Self {
        self.earliest_pickup_s = earliest_pickup_s;
        self.latest_pickup_s = latest_pickup_s;
        self
    }

    pub fn with_party_size(mut self, party_size: u32) -> Self {
        self.party_size = party_size;
        self
    }

    /// Direct trip length from origin to destination.
    pub fn trip_km(&self) -> f64 {
        manhattan_km(self.origin, self.destination)
    }

    /// True when both pickup windows share at least one instant.
    pub fn window_overlaps(&self, other: &Request) -> bool {
        self.earliest_pickup_s <= other.latest_pickup_s
            && other.earliest_pickup_s <= self.latest_pickup_s
    }

    /// True when the pickup window intersects `[start_s, end_s]`.
    pub fn window_intersects(&self, start_s: u32, end_s: u32) -> bool {
        self.earliest_pickup_s <= end_s && start_s <= self.latest_pickup_s
    }
}

/// A pooling vehicle available for the batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub capacity: u32,
    pub start: GridPoint,
}

impl Vehicle {
    pub fn new(id: u32, capacity: u32, start: GridPoint) -> Self {
        Self {
            id: VehicleId(id),
            capacity,
            start,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_overlap_at_shared_boundary() {
        let a = Request::new(0, GridPoint::new(0, 0), GridPoint::new(1, 1)).with_window(0, 100);
        let b = Request::new(1, GridPoint::new(0, 0), GridPoint::new(1, 1)).with_window(100, 200);
        let c = Request::new(2, GridPoint::new(0, 0), GridPoint::new(1, 1)).with_window(201, 300);
        assert!(a.window_overlaps(&b));
        assert!(b.window_overlaps(&a));
        assert!(!a.window_overlaps(&c));
    }

    #[test]
    fn trip_km_is_manhattan() {
        let r = Request::new(0, GridPoint::new(0, 0), GridPoint::new(2, 2));
        assert_eq!(r.trip_km(), 2.0);
    }
}
