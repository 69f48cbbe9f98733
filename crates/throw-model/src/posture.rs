//! Athlete posture samples from an external pose estimator.
//!
//! Joint positions use the same normalized image coordinates as detections:
//! `y = 0` is the top of the frame, so "higher" means a smaller `y`.

use serde::{Deserialize, Serialize};

use crate::geometry::Point2D;

/// A single recognised body joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Joint {
    pub x: f64,
    pub y: f64,
    pub confidence: f32,
}

impl Joint {
    pub fn new(x: f64, y: f64, confidence: f32) -> Self {
        Self { x, y, confidence }
    }

    pub fn position(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }
}

/// Which leg a knee measurement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodySide {
    Left,
    Right,
}

/// Joints used by the acquisition controller. Unrecognised joints are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skeleton {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_wrist: Option<Joint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_elbow: Option<Joint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_shoulder: Option<Joint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_hip: Option<Joint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_knee: Option<Joint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_ankle: Option<Joint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_hip: Option<Joint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_knee: Option<Joint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub right_ankle: Option<Joint>,
}

impl Skeleton {
    /// Right arm raised: wrist above elbow above shoulder, with a confident wrist.
    pub fn arm_raised(&self, min_confidence: f32) -> bool {
        match (self.right_wrist, self.right_elbow, self.right_shoulder) {
            (Some(wrist), Some(elbow), Some(shoulder)) => {
                wrist.y < elbow.y && elbow.y < shoulder.y && wrist.confidence > min_confidence
            }
            _ => false,
        }
    }

    /// Interior knee angle in degrees (180 = straight leg).
    ///
    /// `None` unless hip, knee and ankle are all above `min_confidence`.
    pub fn knee_angle(&self, side: BodySide, min_confidence: f32) -> Option<f64> {
        let (hip, knee, ankle) = match side {
            BodySide::Left => (self.left_hip?, self.left_knee?, self.left_ankle?),
            BodySide::Right => (self.right_hip?, self.right_knee?, self.right_ankle?),
        };
        if [hip, knee, ankle]
            .iter()
            .any(|joint| joint.confidence <= min_confidence)
        {
            return None;
        }
        Some(joint_angle(
            hip.position(),
            knee.position(),
            ankle.position(),
        ))
    }
}

/// Angle at `vertex` between the segments to `a` and `b`, in degrees.
/// Degenerate segments give 0.
pub fn joint_angle(a: Point2D, vertex: Point2D, b: Point2D) -> f64 {
    let (v1x, v1y) = (a.x - vertex.x, a.y - vertex.y);
    let (v2x, v2y) = (b.x - vertex.x, b.y - vertex.y);
    let m1 = v1x.hypot(v1y);
    let m2 = v2x.hypot(v2y);
    if m1 <= 0.0 || m2 <= 0.0 {
        return 0.0;
    }
    let cosine = ((v1x * v2x + v1y * v2y) / (m1 * m2)).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// Pose observed on one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostureSample {
    #[serde(rename = "frame")]
    pub frame_number: u64,

    /// Stream timestamp in seconds.
    #[serde(rename = "t")]
    pub timestamp: f64,

    pub joints: Skeleton,
}

impl PostureSample {
    pub fn new(frame_number: u64, timestamp: f64, joints: Skeleton) -> Self {
        Self {
            frame_number,
            timestamp,
            joints,
        }
    }
}
