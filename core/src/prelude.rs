use serde::{Deserialize, Serialize};

use crate::classify::ActivityState;

/// Absolute position of a drone or the sensor reference point, in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub altitude: f64,
}

impl Position {
    pub fn new(x: f64, y: f64, altitude: f64) -> Self {
        Self { x, y, altitude }
    }

    /// Offset of `self` relative to `reference`.
    pub fn offset_from(&self, reference: &Position) -> RelativePosition {
        RelativePosition {
            dx: self.x - reference.x,
            dy: self.y - reference.y,
            dz: self.altitude - reference.altitude,
        }
    }
}

/// Velocity in m/s; `climb_rate` is the vertical component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Velocity {
    pub vx: f64,
    pub vy: f64,
    #[serde(rename = "climbRate")]
    pub climb_rate: f64,
}

impl Velocity {
    pub fn new(vx: f64, vy: f64, climb_rate: f64) -> Self {
        Self {
            vx,
            vy,
            climb_rate,
        }
    }

    /// Horizontal ground speed.
    pub fn speed(&self) -> f64 {
        self.vx.hypot(self.vy)
    }
}

/// Drone position expressed in the sensor's frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RelativePosition {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl RelativePosition {
    pub fn new(dx: f64, dy: f64, dz: f64) -> Self {
        Self { dx, dy, dz }
    }

    /// Slant range to the sensor, in meters.
    pub fn range(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy + self.dz * self.dz).sqrt()
    }

    /// True bearing from the sensor in degrees, wrapped into [0, 360).
    pub fn bearing_deg(&self) -> f64 {
        self.dx.atan2(self.dy).to_degrees().rem_euclid(360.0)
    }
}

/// Abstract acoustic inference capability.
///
/// The simulation path classifies from kinematics instead; this seam exists
/// so a trained network can replace the placeholder without touching the
/// rest of the node.
pub trait ActivityClassifier {
    fn predict(&mut self, audio: &[f32]) -> (ActivityState, f64);
}
