//! Grouping turning points into revolutions.
//!
//! Revolutions are overlapping triples `(i, i+1, i+2)` with `i` advancing
//! by two, so each revolution's end point is the next one's start point.

use hammertrack_model::detection::DetectedPoint;
use hammertrack_model::revolution::{Revolution, RevolutionGeometry, TurningPoint};

use crate::tilt::tilt_angle;

/// Split turning points into revolutions.
///
/// Angles come from each triple's start and reversal points. Geometry is
/// measured over `points[start.index..=end.index]`; pass the detections the
/// turning points were found in. Fewer than three turning points give no
/// revolutions.
pub fn segment_revolutions(
    turning_points: &[TurningPoint],
    points: &[DetectedPoint],
    motion_epsilon: f64,
) -> Vec<Revolution> {
    let mut revolutions = Vec::new();
    let mut i = 0;

    while i + 2 < turning_points.len() {
        let start_point = turning_points[i];
        let reversal_point = turning_points[i + 1];
        let end_point = turning_points[i + 2];

        let (angle, direction) =
            tilt_angle(start_point.position, reversal_point.position, motion_epsilon);

        let span = points
            .get(start_point.index..=end_point.index)
            .unwrap_or_default();

        revolutions.push(Revolution {
            number: revolutions.len() + 1,
            start_point,
            reversal_point,
            end_point,
            angle,
            direction,
            geometry: RevolutionGeometry::measure(span),
        });

        i += 2;
    }

    revolutions
}

#[cfg(test)]
mod tests {
    use super::*;
    use hammertrack_model::geometry::Point2D;
    use hammertrack_model::revolution::TiltDirection;
    use proptest::prelude::*;

    fn turning_points(n: usize) -> Vec<TurningPoint> {
        (0..n)
            .map(|i| {
                let x = if i % 2 == 0 { 0.2 } else { 0.8 };
                let y = 0.4 + i as f64 * 0.01;
                TurningPoint::new(i * 5, Point2D::new(x, y), i % 2 == 1)
            })
            .collect()
    }

    fn detections(n: usize) -> Vec<DetectedPoint> {
        (0..n)
            .map(|i| DetectedPoint::new(100 + i as u64, i as f64 / 30.0, 0.5, 0.5, 0.9))
            .collect()
    }

    #[test]
    fn test_five_turning_points_make_two_revolutions() {
        let tps = turning_points(5);
        let revolutions = segment_revolutions(&tps, &detections(25), 0.001);
        assert_eq!(revolutions.len(), 2);
        assert_eq!(revolutions[0].number, 1);
        assert_eq!(revolutions[1].number, 2);
        assert_eq!(revolutions[0].end_point, tps[2]);
        assert_eq!(revolutions[1].start_point, tps[2]);
    }

    #[test]
    fn test_fewer_than_three_turning_points() {
        for n in 0..3 {
            assert!(segment_revolutions(&turning_points(n), &detections(20), 0.001).is_empty());
        }
        assert_eq!(
            segment_revolutions(&turning_points(3), &detections(20), 0.001).len(),
            1
        );
        // a trailing pair cannot close a revolution
        assert_eq!(
            segment_revolutions(&turning_points(4), &detections(20), 0.001).len(),
            1
        );
    }

    #[test]
    fn test_angle_uses_start_and_reversal() {
        let tps = vec![
            TurningPoint::new(0, Point2D::new(0.2, 0.40), false),
            TurningPoint::new(4, Point2D::new(0.8, 0.46), true),
            TurningPoint::new(8, Point2D::new(0.2, 0.90), false),
        ];
        let revolution = &segment_revolutions(&tps, &detections(9), 0.001)[0];
        let expected = (0.06f64).atan2(0.6).to_degrees();
        assert!((revolution.angle - expected).abs() < 1e-9);
        assert_eq!(revolution.direction, TiltDirection::Left);
    }

    #[test]
    fn test_geometry_spans_start_to_end() {
        let tps = turning_points(3);
        let revolution = &segment_revolutions(&tps, &detections(20), 0.001)[0];
        assert_eq!(revolution.geometry.first_frame, 100);
        assert_eq!(revolution.geometry.last_frame, 110);
        assert!(revolution.contains_frame(105));
    }

    proptest! {
        #[test]
        fn prop_revolutions_tile_turning_points(n in 0usize..40) {
            let tps = turning_points(n);
            let revolutions = segment_revolutions(&tps, &detections(n * 5 + 1), 0.001);
            let expected = if n < 3 { 0 } else { (n - 1) / 2 };
            prop_assert_eq!(revolutions.len(), expected);
            for pair in revolutions.windows(2) {
                prop_assert_eq!(pair[0].end_point, pair[1].start_point);
                prop_assert_eq!(pair[0].number + 1, pair[1].number);
            }
        }
    }
}
