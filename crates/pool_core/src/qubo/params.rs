use serde::{Deserialize, Serialize};

use crate::geometry::{manhattan_km, straight_line_km, GridPoint, DEFAULT_AVG_SPEED_MPS};

use super::error::InvalidConfigError;

/// How the detour of a pooled pair is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetourModel {
    /// Manhattan distance on the city grid (approximates the road network).
    #[default]
    Manhattan,
    /// Euclidean distance between grid points.
    StraightLine,
}

impl DetourModel {
    /// Distance between two grid points under this metric.
    pub fn distance_km(self, a: GridPoint, b: GridPoint) -> f64 {
        self.metric()(a, b)
    }

    pub fn metric(self) -> fn(GridPoint, GridPoint) -> f64 {
        match self {
            DetourModel::Manhattan => manhattan_km,
            DetourModel::StraightLine => straight_line_km,
        }
    }
}

/// Weights and limits for building a pooling QUBO.
///
/// Penalty weights are expressed in units of the normalised objective: after
/// the builder divides every objective term by the largest one, a weight of
/// `2.0` makes a single constraint violation cost twice the most expensive
/// assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderParams {
    /// Reward for every pair of requests pooled into the same vehicle slot.
    pub pooling_bonus: f64,
    /// λ_cap: penalty for a pooled pair whose combined party exceeds capacity.
    pub capacity_penalty_weight: f64,
    /// λ_one: weight of the one-hot constraint per request.
    pub assignment_penalty_weight: f64,
    pub detour_model: DetourModel,
    /// Cost per minute a rider waits past the start of their pickup window.
    pub wait_cost_per_minute: f64,
    /// Number of consecutive dispatch waves per vehicle within the horizon.
    pub slots_per_vehicle: u32,
    /// Batch horizon in seconds, split evenly across slots.
    pub horizon_s: u32,
    pub avg_speed_mps: f64,
    /// Vehicles further than this from a pickup are not candidates.
    pub max_pickup_km: Option<f64>,
}

impl Default for BuilderParams {
    fn default() -> Self {
        Self {
            pooling_bonus: 1.0,
            capacity_penalty_weight: 2.0,
            assignment_penalty_weight: 2.0,
            detour_model: DetourModel::Manhattan,
            wait_cost_per_minute: 0.1,
            slots_per_vehicle: 1,
            horizon_s: 600,
            avg_speed_mps: DEFAULT_AVG_SPEED_MPS,
            max_pickup_km: None,
        }
    }
}

impl BuilderParams {
    pub fn with_pooling_bonus(mut self, pooling_bonus: f64) -> Self {
        self.pooling_bonus = pooling_bonus;
        self
    }

    pub fn with_capacity_penalty(mut self, weight: f64) -> Self {
        self.capacity_penalty_weight = weight;
        self
    }

    pub fn with_assignment_penalty(mut self, weight: f64) -> Self {
        self.assignment_penalty_weight = weight;
        self
    }

    pub fn with_detour_model(mut self, detour_model: DetourModel) -> Self {
        self.detour_model = detour_model;
        self
    }

    pub fn with_wait_cost_per_minute(mut self, cost: f64) -> Self {
        self.wait_cost_per_minute = cost;
        self
    }

    pub fn with_slots(mut self, slots_per_vehicle: u32, horizon_s: u32) -> Self {
        self.slots_per_vehicle = slots_per_vehicle;
        self.horizon_s = horizon_s;
        self
    }

    pub fn with_max_pickup_km(mut self, max_pickup_km: f64) -> Self {
        self.max_pickup_km = Some(max_pickup_km);
        self
    }

    /// Time window `[start_s, end_s]` covered by `slot`. The last slot stays
    /// open so late requests still have a wave to join.
    pub fn slot_window(&self, slot: u32) -> (u32, u32) {
        let width = self.horizon_s / self.slots_per_vehicle.max(1);
        let start = slot.saturating_mul(width);
        if slot + 1 >= self.slots_per_vehicle {
            (start, u32::MAX)
        } else {
            (start, start.saturating_add(width))
        }
    }

    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        let weights = [
            ("pooling_bonus", self.pooling_bonus),
            ("capacity_penalty_weight", self.capacity_penalty_weight),
            ("assignment_penalty_weight", self.assignment_penalty_weight),
            ("wait_cost_per_minute", self.wait_cost_per_minute),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                return Err(InvalidConfigError::new(format!("{name} must be finite")));
            }
            if value < 0.0 {
                return Err(InvalidConfigError::new(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }
        if self.slots_per_vehicle == 0 {
            return Err(InvalidConfigError::new(
                "slots_per_vehicle must be a positive integer",
            ));
        }
        if self.horizon_s == 0 {
            return Err(InvalidConfigError::new("horizon_s must be positive"));
        }
        if !(self.avg_speed_mps.is_finite() && self.avg_speed_mps > 0.0) {
            return Err(InvalidConfigError::new("avg_speed_mps must be positive"));
        }
        if let Some(max_km) = self.max_pickup_km {
            if !(max_km.is_finite() && max_km >= 0.0) {
                return Err(InvalidConfigError::new(
                    "max_pickup_km must be a non-negative distance",
                ));
            }
        }
        Ok(())
    }
}
