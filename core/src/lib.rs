//! Acoustic inference and C2 streaming core for the sensor-node platform.
//!
//! The modules mirror the legacy acoustic-model pipeline while providing
//! typed kinematics, an explicit random source, and a framed C2 channel.

pub mod c2_interface;
pub mod classify;
pub mod detection;
pub mod prelude;
pub mod telemetry;
pub mod tracking;

pub use prelude::{ActivityClassifier, Position, RelativePosition, Velocity};
