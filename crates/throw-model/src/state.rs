//! Acquisition controller states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle of one live acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionState {
    /// Waiting for the athlete's ready posture.
    #[default]
    Idle,
    /// Ready posture held; tracking is about to start.
    Armed,
    /// Appending hammer detections to the trajectory.
    Tracking,
    /// Throw finished; analysis is being produced or reported.
    Completing,
}

impl AcquisitionState {
    /// Whether hammer detections are accepted in this state.
    pub fn accepts_detections(&self) -> bool {
        matches!(self, AcquisitionState::Tracking)
    }
}

impl fmt::Display for AcquisitionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcquisitionState::Idle => "idle",
            AcquisitionState::Armed => "armed",
            AcquisitionState::Tracking => "tracking",
            AcquisitionState::Completing => "completing",
        };
        f.write_str(name)
    }
}
