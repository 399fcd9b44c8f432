use crate::classify::ActivityState;
use crate::prelude::{RelativePosition, Velocity};

/// Below this ground speed the drone is treated as hovering regardless of
/// climb rate.
const HOVER_SPEED_FLOOR: f64 = 1.0;
/// Climb-rate magnitude separating takeoff/departure from level flight, m/s.
const CLIMB_THRESHOLD: f64 = 3.0;
/// Closing-speed magnitude separating approach/departure from loitering, m/s.
const CLOSING_THRESHOLD: f64 = 5.0;

/// Kinematic activity classifier used in simulation mode.
pub struct StateEstimator;

impl StateEstimator {
    /// Infer the activity state from the drone's position relative to the
    /// sensor and its velocity. Pure; rules are ordered and the first match
    /// wins.
    pub fn estimate(rel: &RelativePosition, velocity: &Velocity) -> ActivityState {
        if velocity.speed() < HOVER_SPEED_FLOOR {
            return ActivityState::Hover;
        }
        if velocity.climb_rate > CLIMB_THRESHOLD {
            return ActivityState::Takeoff;
        }
        if velocity.climb_rate < -CLIMB_THRESHOLD {
            return ActivityState::Depart;
        }

        // Positive closing speed means the drone is approaching the sensor.
        // The range floor guards the overhead (zero-distance) case.
        let closing_speed =
            -(rel.dx * velocity.vx + rel.dy * velocity.vy) / rel.range().max(1.0);
        if closing_speed > CLOSING_THRESHOLD {
            ActivityState::Approach
        } else if closing_speed < -CLOSING_THRESHOLD {
            ActivityState::Depart
        } else {
            ActivityState::Hover
        }
    }
}
