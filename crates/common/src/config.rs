//! Application configuration.
//!
//! Every tunable of the analysis pipeline and the acquisition controller is a
//! named field here so hosts can override it. Sections validate themselves;
//! invalid values are rejected at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HammertrackError, HammertrackResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Trajectory analysis pipeline parameters.
    pub analysis: AnalysisConfig,

    /// Live acquisition controller parameters.
    pub acquisition: AcquisitionConfig,

    /// Input stream defaults.
    pub capture: CaptureDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Parameters for smoothing, turning-point detection, and aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Run the Gaussian smoother before turning-point detection.
    pub smoothing_enabled: bool,

    /// Gaussian kernel standard deviation, in samples.
    pub smoothing_sigma: f64,

    /// Sequences shorter than this are passed through unsmoothed.
    pub min_smoothing_points: usize,

    /// Minimum trajectory length for an analysis to be attempted.
    pub min_trajectory_points: usize,

    /// Minimum turning points (including the start marker) for one revolution.
    pub min_turning_points: usize,

    /// Below this displacement on both axes a revolution has no tilt.
    pub motion_epsilon: f64,
}

/// Parameters for the live acquisition state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Detections below this confidence count as misses.
    pub confidence_threshold: f32,

    /// How long the ready posture must hold before tracking starts (seconds).
    pub dwell_secs: f64,

    /// Consecutive missed detections that end a throw.
    pub max_missed_detections: u32,

    /// Minimum wrist confidence for the arm-raised posture.
    pub posture_min_confidence: f32,

    /// Stay in `Completing` until the host acknowledges its feedback.
    pub await_feedback_ack: bool,
}

/// Defaults describing the incoming frame stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureDefaults {
    /// Nominal camera/video frame rate (Hz).
    pub frame_rate_hz: f64,

    /// Run the detectors on every N-th frame.
    pub detector_frame_interval: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "hammertrack=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            smoothing_enabled: true,
            smoothing_sigma: 0.5,
            min_smoothing_points: 6,
            min_trajectory_points: 21,
            min_turning_points: 3,
            motion_epsilon: 0.001,
        }
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.3,
            dwell_secs: 0.2,
            max_missed_detections: 7,
            posture_min_confidence: 0.3,
            await_feedback_ack: false,
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            frame_rate_hz: 30.0,
            detector_frame_interval: 3,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AnalysisConfig {
    /// Reject parameter combinations the pipeline cannot work with.
    pub fn validate(&self) -> HammertrackResult<()> {
        if !self.smoothing_sigma.is_finite() || self.smoothing_sigma <= 0.0 {
            return Err(HammertrackError::invalid_config(format!(
                "smoothing_sigma must be a positive number, got {}",
                self.smoothing_sigma
            )));
        }
        if self.min_turning_points < 3 {
            return Err(HammertrackError::invalid_config(format!(
                "min_turning_points must be at least 3, got {}",
                self.min_turning_points
            )));
        }
        if self.min_trajectory_points < 3 {
            return Err(HammertrackError::invalid_config(format!(
                "min_trajectory_points must be at least 3, got {}",
                self.min_trajectory_points
            )));
        }
        if !self.motion_epsilon.is_finite() || self.motion_epsilon < 0.0 {
            return Err(HammertrackError::invalid_config(format!(
                "motion_epsilon must be a non-negative number, got {}",
                self.motion_epsilon
            )));
        }
        Ok(())
    }
}

impl AcquisitionConfig {
    /// Reject parameter combinations the controller cannot work with.
    pub fn validate(&self) -> HammertrackResult<()> {
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold <= 1.0) {
            return Err(HammertrackError::invalid_config(format!(
                "confidence_threshold must be in (0, 1], got {}",
                self.confidence_threshold
            )));
        }
        if !self.dwell_secs.is_finite() || self.dwell_secs < 0.0 {
            return Err(HammertrackError::invalid_config(format!(
                "dwell_secs must be a non-negative number, got {}",
                self.dwell_secs
            )));
        }
        if self.max_missed_detections == 0 {
            return Err(HammertrackError::invalid_config(
                "max_missed_detections must be at least 1",
            ));
        }
        if !(0.0..=1.0).contains(&self.posture_min_confidence) {
            return Err(HammertrackError::invalid_config(format!(
                "posture_min_confidence must be in [0, 1], got {}",
                self.posture_min_confidence
            )));
        }
        Ok(())
    }
}

impl CaptureDefaults {
    pub fn validate(&self) -> HammertrackResult<()> {
        if !self.frame_rate_hz.is_finite() || self.frame_rate_hz <= 0.0 {
            return Err(HammertrackError::invalid_config(format!(
                "frame_rate_hz must be positive, got {}",
                self.frame_rate_hz
            )));
        }
        if self.detector_frame_interval == 0 {
            return Err(HammertrackError::invalid_config(
                "detector_frame_interval must be at least 1",
            ));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load and parse a config file at an explicit path.
    pub fn load_from(path: &Path) -> HammertrackResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Validate every section.
    pub fn validate(&self) -> HammertrackResult<()> {
        self.analysis.validate()?;
        self.acquisition.validate()?;
        self.capture.validate()
    }

    /// Save config to the standard location, returning the path written.
    pub fn save(&self) -> HammertrackResult<PathBuf> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, json)?;
        Ok(config_path)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("hammertrack").join("config.json")
}
