use serde::{Deserialize, Serialize};

/// Drone activity classes reported to the C2 hub.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityState {
    Noise,
    Idle,
    Takeoff,
    Hover,
    Approach,
    Depart,
}

impl ActivityState {
    /// All classes, in the classifier's output order.
    pub const ALL: [ActivityState; 6] = [
        ActivityState::Noise,
        ActivityState::Idle,
        ActivityState::Takeoff,
        ActivityState::Hover,
        ActivityState::Approach,
        ActivityState::Depart,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityState::Noise => "NOISE",
            ActivityState::Idle => "IDLE",
            ActivityState::Takeoff => "TAKEOFF",
            ActivityState::Hover => "HOVER",
            ActivityState::Approach => "APPROACH",
            ActivityState::Depart => "DEPART",
        }
    }
}
