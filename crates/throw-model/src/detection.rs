//! Detected hammer positions and the trajectory they form.
//!
//! Detections come from an external object detector, one per processed
//! frame. They are immutable once created; a [`Trajectory`] is the ordered
//! sequence of detections for one throw.

use serde::{Deserialize, Serialize};

use hammertrack_common::clock::FrameClock;
use hammertrack_common::error::{HammertrackError, HammertrackResult};

use crate::geometry::Point2D;

/// A single hammer position reported by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedPoint {
    /// Source video/camera frame number.
    #[serde(rename = "frame")]
    pub frame_number: u64,

    /// Stream timestamp in seconds.
    #[serde(rename = "t")]
    pub timestamp: f64,

    /// Centre of the detected hammer, normalized to `[0.0, 1.0]`.
    #[serde(flatten)]
    pub position: Point2D,

    /// Detector confidence in `[0.0, 1.0]`.
    #[serde(default = "full_confidence")]
    pub confidence: f32,
}

fn full_confidence() -> f32 {
    1.0
}

impl DetectedPoint {
    pub fn new(frame_number: u64, timestamp: f64, x: f64, y: f64, confidence: f32) -> Self {
        Self {
            frame_number,
            timestamp,
            position: Point2D::new(x, y),
            confidence,
        }
    }
}

/// Ordered detections of one throw, non-decreasing by frame number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DetectedPoint>", into = "Vec<DetectedPoint>")]
pub struct Trajectory {
    points: Vec<DetectedPoint>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Build a trajectory from points already in frame order.
    pub fn from_points(points: Vec<DetectedPoint>) -> HammertrackResult<Self> {
        let mut trajectory = Self::with_capacity(points.len());
        for point in points {
            trajectory.push(point)?;
        }
        Ok(trajectory)
    }

    /// Build a trajectory from points in any order, sorting them by frame.
    pub fn from_unsorted(mut points: Vec<DetectedPoint>) -> Self {
        points.sort_by_key(|p| p.frame_number);
        Self { points }
    }

    /// Append a detection. Frames may repeat but never go backwards.
    pub fn push(&mut self, point: DetectedPoint) -> HammertrackResult<()> {
        if let Some(last) = self.points.last() {
            if point.frame_number < last.frame_number {
                return Err(HammertrackError::OutOfOrder {
                    frame_number: point.frame_number,
                    last_frame: last.frame_number,
                });
            }
        }
        self.points.push(point);
        Ok(())
    }

    pub fn points(&self) -> &[DetectedPoint] {
        &self.points
    }

    /// Positions in trajectory order.
    pub fn positions(&self) -> Vec<Point2D> {
        self.points.iter().map(|p| p.position).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&DetectedPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&DetectedPoint> {
        self.points.last()
    }

    /// Time between the first and last detection.
    pub fn duration_secs(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.timestamp - first.timestamp,
            _ => 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}

impl TryFrom<Vec<DetectedPoint>> for Trajectory {
    type Error = HammertrackError;

    fn try_from(points: Vec<DetectedPoint>) -> Result<Self, Self::Error> {
        Self::from_points(points)
    }
}

impl From<Trajectory> for Vec<DetectedPoint> {
    fn from(trajectory: Trajectory) -> Self {
        trajectory.points
    }
}

/// Parse detections from CSV content.
///
/// Columns are `Frame,X,Y[,Confidence[,Timestamp]]`. A header line and
/// `#` comments are skipped. A missing confidence is taken as `1.0`; a
/// missing timestamp is derived from the frame number using `clock`.
pub fn parse_detections_csv(content: &str, clock: &FrameClock) -> HammertrackResult<Trajectory> {
    let mut points = Vec::new();
    let mut seen_data = false;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let frame_number = match fields[0].parse::<u64>() {
            Ok(frame) => frame,
            Err(_) if !seen_data => {
                // Header row.
                seen_data = true;
                continue;
            }
            Err(e) => {
                return Err(HammertrackError::parse(
                    line_no,
                    format!("invalid frame number {:?}: {e}", fields[0]),
                ))
            }
        };
        seen_data = true;

        if fields.len() < 3 || fields.len() > 5 {
            return Err(HammertrackError::parse(
                line_no,
                format!("expected 3 to 5 columns, found {}", fields.len()),
            ));
        }

        let x = parse_float(fields[1], "x", line_no)?;
        let y = parse_float(fields[2], "y", line_no)?;
        let confidence = match fields.get(3) {
            Some(field) => parse_confidence(field, line_no)?,
            None => 1.0,
        };
        let timestamp = match fields.get(4) {
            Some(field) => parse_float(field, "timestamp", line_no)?,
            None => clock.frame_to_secs(frame_number),
        };

        points.push(DetectedPoint::new(frame_number, timestamp, x, y, confidence));
    }

    Ok(Trajectory::from_unsorted(points))
}

/// Parse detections from JSONL content (one [`DetectedPoint`] per line).
pub fn parse_detections_jsonl(content: &str) -> HammertrackResult<Trajectory> {
    let mut points = Vec::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let point: DetectedPoint = serde_json::from_str(line)
            .map_err(|e| HammertrackError::parse(idx + 1, e.to_string()))?;
        if !(0.0..=1.0).contains(&point.confidence) {
            return Err(HammertrackError::parse(
                idx + 1,
                format!("confidence {} outside [0, 1]", point.confidence),
            ));
        }
        points.push(point);
    }
    Ok(Trajectory::from_unsorted(points))
}

/// Parse a detection file, choosing JSONL or CSV from its first data line.
pub fn parse_detections(content: &str, clock: &FrameClock) -> HammertrackResult<Trajectory> {
    let first = content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'));
    match first {
        Some(line) if line.starts_with('{') => parse_detections_jsonl(content),
        _ => parse_detections_csv(content, clock),
    }
}

fn parse_float(field: &str, name: &str, line_no: usize) -> HammertrackResult<f64> {
    let value: f64 = field
        .parse()
        .map_err(|e| HammertrackError::parse(line_no, format!("invalid {name} {field:?}: {e}")))?;
    if !value.is_finite() {
        return Err(HammertrackError::parse(
            line_no,
            format!("{name} must be finite"),
        ));
    }
    Ok(value)
}

fn parse_confidence(field: &str, line_no: usize) -> HammertrackResult<f32> {
    let value = parse_float(field, "confidence", line_no)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(HammertrackError::parse(
            line_no,
            format!("confidence {value} outside [0, 1]"),
        ));
    }
    Ok(value as f32)
}
