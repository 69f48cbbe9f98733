//! Error types shared across HammerTrack crates.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What kind of input ran short when an analysis could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataKind {
    /// Detected hammer positions in the trajectory.
    TrajectoryPoints,
    /// Direction reversals found by the turning-point detector.
    TurningPoints,
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataKind::TrajectoryPoints => f.write_str("trajectory points"),
            DataKind::TurningPoints => f.write_str("turning points"),
        }
    }
}

/// Why a throw analysis could not be produced.
///
/// These are expected outcomes of the pipeline, not faults: the controller
/// reports them to the host and returns to idle for the next throw.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum AnalysisUnavailable {
    #[error("Insufficient data: found {found} {kind}, need at least {required}")]
    InsufficientData {
        kind: DataKind,
        found: usize,
        required: usize,
    },

    #[error("No motion detected: horizontal position never changes")]
    NoMotionDetected,
}

impl AnalysisUnavailable {
    pub fn too_few_points(found: usize, required: usize) -> Self {
        Self::InsufficientData {
            kind: DataKind::TrajectoryPoints,
            found,
            required,
        }
    }

    pub fn too_few_turning_points(found: usize, required: usize) -> Self {
        Self::InsufficientData {
            kind: DataKind::TurningPoints,
            found,
            required,
        }
    }
}

/// Top-level error type for HammerTrack operations.
#[derive(Debug, thiserror::Error)]
pub enum HammertrackError {
    #[error("Analysis unavailable: {0}")]
    Unavailable(#[from] AnalysisUnavailable),

    #[error("Stale result from generation {generation} (current generation is {current})")]
    StaleResult { generation: u64, current: u64 },

    #[error("Invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Out-of-order detection: frame {frame_number} after frame {last_frame}")]
    OutOfOrder { frame_number: u64, last_frame: u64 },

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using HammertrackError.
pub type HammertrackResult<T> = Result<T, HammertrackError>;

impl HammertrackError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: msg.into(),
        }
    }

    pub fn parse(line: usize, msg: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }

    /// Whether the error is a recoverable "no analysis for this throw" outcome.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::StaleResult { .. })
    }
}
