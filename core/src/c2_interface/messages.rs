use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::classify::ActivityState;
use crate::detection::DetectionResult;
use crate::prelude::{Position, Velocity};

/// Seconds since the Unix epoch, as used in event timestamps.
pub fn epoch_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Detection event emitted to the C2 hub.
///
/// Measurements are rounded for the wire: confidence to two decimals,
/// distance and bearing to one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename = "audio_detection")]
pub struct DetectionEvent {
    pub timestamp: f64,
    pub drone_id: String,
    pub state: ActivityState,
    pub confidence: f64,
    pub estimated_distance: Option<f64>,
    pub estimated_bearing: Option<f64>,
}

impl DetectionEvent {
    pub fn from_result(result: &DetectionResult, timestamp: f64) -> Self {
        Self {
            timestamp,
            drone_id: result.drone_id.clone(),
            state: result.state,
            confidence: round_to(result.confidence, 2),
            estimated_distance: Some(round_to(result.estimated_distance, 1)),
            estimated_bearing: Some(round_to(result.estimated_bearing, 1)),
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Messages pushed down from the hub. Unrecognized `type` tags land in
/// `Unknown` so new control-plane messages never break the node.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum InboundMessage {
    #[serde(rename = "drone_state_update")]
    DroneStateUpdate {
        drone_id: String,
        #[serde(default)]
        position: Option<Position>,
        #[serde(default)]
        velocity: Option<Velocity>,
    },
    #[serde(other)]
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::DetectionResult;

    fn sample_result() -> DetectionResult {
        DetectionResult {
            drone_id: "AUDIO-SIM-001".into(),
            state: ActivityState::Approach,
            confidence: 0.8567,
            estimated_distance: 123.456,
            estimated_bearing: 212.34,
        }
    }

    #[test]
    fn event_rounds_measurements_for_the_wire() {
        let event = DetectionEvent::from_result(&sample_result(), 100.0);
        assert_eq!(event.confidence, 0.86);
        assert_eq!(event.estimated_distance, Some(123.5));
        assert_eq!(event.estimated_bearing, Some(212.3));
    }

    #[test]
    fn event_serializes_with_type_tag_and_state_name() {
        let event = DetectionEvent::from_result(&sample_result(), 100.0);
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(value["type"], "audio_detection");
        assert_eq!(value["state"], "APPROACH");
        assert_eq!(value["drone_id"], "AUDIO-SIM-001");
    }

    #[test]
    fn correction_with_only_velocity_parses_partially() {
        let raw = r#"{"type":"drone_state_update","drone_id":"AUDIO-SIM-002",
                      "velocity":{"vx":1.5,"vy":-2.0,"climbRate":0.5}}"#;
        match serde_json::from_str::<InboundMessage>(raw).unwrap() {
            InboundMessage::DroneStateUpdate {
                drone_id,
                position,
                velocity,
            } => {
                assert_eq!(drone_id, "AUDIO-SIM-002");
                assert!(position.is_none());
                let velocity = velocity.unwrap();
                assert_eq!(velocity.climb_rate, 0.5);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn missing_vector_components_default_to_zero() {
        let raw = r#"{"type":"drone_state_update","drone_id":"D","position":{"x":5.0}}"#;
        match serde_json::from_str::<InboundMessage>(raw).unwrap() {
            InboundMessage::DroneStateUpdate { position, .. } => {
                let position = position.unwrap();
                assert_eq!(position.x, 5.0);
                assert_eq!(position.y, 0.0);
                assert_eq!(position.altitude, 0.0);
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn unrecognized_type_parses_as_unknown() {
        let raw = r#"{"type":"scenario_reset","payload":{"nested":true}}"#;
        assert!(matches!(
            serde_json::from_str::<InboundMessage>(raw).unwrap(),
            InboundMessage::Unknown
        ));
    }
}
