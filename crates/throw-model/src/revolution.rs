//! Turning points and revolutions ("ellipses") of a throw.
//!
//! A revolution is bounded by three consecutive turning points: the start,
//! the first horizontal reversal, and the end. The end of one revolution is
//! the start of the next.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::detection::DetectedPoint;
use crate::geometry::{Bounds, Point2D};

/// A sample where the hammer's horizontal motion reverses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TurningPoint {
    /// Position within the trajectory (not the video frame number).
    pub index: usize,

    /// Position at the reversal.
    pub position: Point2D,

    /// True when rightward motion ended here (a maximum in x).
    pub is_maximum: bool,
}

impl TurningPoint {
    pub fn new(index: usize, position: Point2D, is_maximum: bool) -> Self {
        Self {
            index,
            position,
            is_maximum,
        }
    }
}

/// Side toward which a revolution tilts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TiltDirection {
    Left,
    Right,
    None,
}

impl fmt::Display for TiltDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TiltDirection::Left => f.write_str("left"),
            TiltDirection::Right => f.write_str("right"),
            TiltDirection::None => f.write_str("none"),
        }
    }
}

/// Spatial and temporal extent of one revolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RevolutionGeometry {
    /// Frame number of the start turning point.
    pub first_frame: u64,

    /// Frame number of the end turning point.
    pub last_frame: u64,

    /// Time from start to end turning point (seconds).
    pub duration_secs: f64,

    /// Horizontal span of the path (normalized).
    pub width: f64,

    /// Vertical span of the path (normalized).
    pub height: f64,

    /// Centre of the path's bounding box.
    pub center: Point2D,
}

impl RevolutionGeometry {
    /// Measure the detections between a revolution's start and end points.
    pub fn measure(points: &[DetectedPoint]) -> Self {
        let (first, last) = match (points.first(), points.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Self {
                    first_frame: 0,
                    last_frame: 0,
                    duration_secs: 0.0,
                    width: 0.0,
                    height: 0.0,
                    center: Point2D::default(),
                }
            }
        };

        let (width, height, center) = match Bounds::enclosing(points.iter().map(|p| &p.position)) {
            Some(bounds) => (bounds.width(), bounds.height(), bounds.center()),
            None => (0.0, 0.0, first.position),
        };

        Self {
            first_frame: first.frame_number,
            last_frame: last.frame_number,
            duration_secs: last.timestamp - first.timestamp,
            width,
            height,
            center,
        }
    }
}

/// One full revolution of the hammer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revolution {
    /// 1-indexed position within the throw.
    pub number: usize,

    pub start_point: TurningPoint,
    pub reversal_point: TurningPoint,
    pub end_point: TurningPoint,

    /// Tilt magnitude in degrees, in `[0, 90]`.
    pub angle: f64,

    pub direction: TiltDirection,

    pub geometry: RevolutionGeometry,
}

impl Revolution {
    /// Tilt as a signed angle: positive for left, negative for right.
    pub fn signed_angle(&self) -> f64 {
        match self.direction {
            TiltDirection::Left => self.angle,
            TiltDirection::Right => -self.angle,
            TiltDirection::None => 0.0,
        }
    }

    /// Video frames covered by this revolution.
    pub fn frame_range(&self) -> RangeInclusive<u64> {
        self.geometry.first_frame..=self.geometry.last_frame
    }

    pub fn contains_frame(&self, frame_number: u64) -> bool {
        self.frame_range().contains(&frame_number)
    }

    /// Short human-readable description, e.g. `12.3° left`.
    pub fn describe(&self) -> String {
        match self.direction {
            TiltDirection::None => format!("{:.1}°", self.angle),
            direction => format!("{:.1}° {direction}", self.angle),
        }
    }
}
