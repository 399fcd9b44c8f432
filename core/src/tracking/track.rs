use serde::{Deserialize, Serialize};

use crate::prelude::{Position, Velocity};

/// Kinematic record for one tracked drone.
///
/// Position and velocity vectors are replaced whole (by dead-reckoning or by
/// hub corrections), never component-by-component across writers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneTrack {
    pub drone_id: String,
    pub position: Position,
    pub velocity: Velocity,
    /// Seconds since epoch of the last advance or correction.
    pub last_updated: f64,
}

impl DroneTrack {
    pub fn new(drone_id: impl Into<String>, position: Position, velocity: Velocity, now: f64) -> Self {
        Self {
            drone_id: drone_id.into(),
            position,
            velocity,
            last_updated: now,
        }
    }

    /// Dead-reckon the position forward by `dt` seconds. No bounds checks;
    /// simulated drones are free to leave detection range.
    pub fn advance(&mut self, dt: f64, now: f64) {
        self.position = Position {
            x: self.position.x + self.velocity.vx * dt,
            y: self.position.y + self.velocity.vy * dt,
            altitude: self.position.altitude + self.velocity.climb_rate * dt,
        };
        self.last_updated = now;
    }
}
