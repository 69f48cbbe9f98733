//! Posture signals: the ready condition, its dwell timer, and knee angles.

use serde::{Deserialize, Serialize};

use hammertrack_model::posture::{BodySide, PostureSample};

/// Geometric condition on a posture sample that signals "ready to throw".
pub trait ReadyCondition: Send + Sync {
    fn is_ready(&self, sample: &PostureSample) -> bool;

    /// Condition name for logging.
    fn name(&self) -> &str;
}

/// Right arm raised: wrist above elbow above shoulder.
#[derive(Debug, Clone, Copy)]
pub struct ArmRaised {
    min_confidence: f32,
}

impl ArmRaised {
    pub fn new(min_confidence: f32) -> Self {
        Self { min_confidence }
    }
}

impl ReadyCondition for ArmRaised {
    fn is_ready(&self, sample: &PostureSample) -> bool {
        sample.joints.arm_raised(self.min_confidence)
    }

    fn name(&self) -> &str {
        "arm_raised"
    }
}

/// Absorbs float rounding in sample timestamps (e.g. 6 × 1/30 s vs 0.2 s).
const DWELL_TOLERANCE_SECS: f64 = 1e-9;

/// Tracks how long a condition has held, on sample timestamps.
#[derive(Debug, Clone)]
pub struct DwellTimer {
    dwell_secs: f64,
    since: Option<f64>,
}

impl DwellTimer {
    pub fn new(dwell_secs: f64) -> Self {
        Self {
            dwell_secs,
            since: None,
        }
    }

    /// Feed one observation. Returns true once the condition has held for
    /// the full dwell; the timer then clears itself.
    pub fn observe(&mut self, holds: bool, timestamp: f64) -> bool {
        if !holds {
            self.since = None;
            return false;
        }

        let since = match self.since {
            Some(since) if since <= timestamp => since,
            // first sample, or the stream jumped backwards
            _ => {
                self.since = Some(timestamp);
                timestamp
            }
        };

        if timestamp - since + DWELL_TOLERANCE_SECS >= self.dwell_secs {
            self.since = None;
            return true;
        }
        false
    }

    /// When the current run of the condition began, if it holds.
    pub fn since(&self) -> Option<f64> {
        self.since
    }

    pub fn reset(&mut self) {
        self.since = None;
    }
}

/// Running min/max/mean of an angle series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleSummary {
    pub samples: usize,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl AngleSummary {
    fn first(angle: f64) -> Self {
        Self {
            samples: 1,
            average: angle,
            min: angle,
            max: angle,
        }
    }

    fn add(&mut self, angle: f64) {
        self.samples += 1;
        self.average += (angle - self.average) / self.samples as f64;
        self.min = self.min.min(angle);
        self.max = self.max.max(angle);
    }
}

/// Knee angles observed while a throw was tracked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KneeAngleStats {
    pub left: Option<AngleSummary>,
    pub right: Option<AngleSummary>,
}

impl KneeAngleStats {
    /// Record both knees of a sample; joints under `min_confidence` are skipped.
    pub fn record_sample(&mut self, sample: &PostureSample, min_confidence: f32) {
        for side in [BodySide::Left, BodySide::Right] {
            if let Some(angle) = sample.joints.knee_angle(side, min_confidence) {
                self.record(side, angle);
            }
        }
    }

    pub fn record(&mut self, side: BodySide, angle: f64) {
        let slot = match side {
            BodySide::Left => &mut self.left,
            BodySide::Right => &mut self.right,
        };
        match slot {
            Some(summary) => summary.add(angle),
            None => *slot = Some(AngleSummary::first(angle)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}
