//! Horizontal direction-reversal detection.
//!
//! The detector follows the hammer's `x` coordinate like a spring: every
//! non-zero step sets the current direction, and the sample before a step in
//! the opposite direction is a turning point. There is no dead zone; jitter
//! must be smoothed out beforehand.

use std::cmp::Ordering;

use hammertrack_common::error::AnalysisUnavailable;
use hammertrack_model::geometry::Point2D;
use hammertrack_model::revolution::TurningPoint;

/// Fewest positions the detector will scan.
pub const MIN_DETECTION_POINTS: usize = 3;

/// Find turning points in an ordered position sequence.
///
/// The first position is always returned as a start marker with
/// `is_maximum = false`. Sequences shorter than [`MIN_DETECTION_POINTS`]
/// yield no turning points.
pub fn detect_turning_points(positions: &[Point2D]) -> Vec<TurningPoint> {
    if positions.len() < MIN_DETECTION_POINTS {
        return Vec::new();
    }

    let mut turning_points = vec![TurningPoint::new(0, positions[0], false)];
    let mut direction: Option<Ordering> = None;

    for (i, pair) in positions.windows(2).enumerate() {
        let step = match pair[1].x.partial_cmp(&pair[0].x) {
            Some(Ordering::Equal) | None => continue,
            Some(step) => step,
        };

        match direction {
            Some(current) if current != step => {
                // `pair[0]` is where the previous run ended.
                turning_points.push(TurningPoint::new(
                    i,
                    pair[0],
                    current == Ordering::Greater,
                ));
                direction = Some(step);
            }
            Some(_) => {}
            None => direction = Some(step),
        }
    }

    turning_points
}

/// Like [`detect_turning_points`], but reports why nothing usable was found.
///
/// Fails with `InsufficientData` for too-short input and with
/// `NoMotionDetected` when `x` never changes.
pub fn detect_turning_points_checked(
    positions: &[Point2D],
) -> Result<Vec<TurningPoint>, AnalysisUnavailable> {
    if positions.len() < MIN_DETECTION_POINTS {
        return Err(AnalysisUnavailable::too_few_points(
            positions.len(),
            MIN_DETECTION_POINTS,
        ));
    }
    let has_motion = positions.windows(2).any(|pair| pair[1].x != pair[0].x);
    if !has_motion {
        return Err(AnalysisUnavailable::NoMotionDetected);
    }
    Ok(detect_turning_points(positions))
}
