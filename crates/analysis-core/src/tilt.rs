//! Revolution tilt angle.
//!
//! The tilt is the angle between the horizontal and the line from a
//! revolution's start point to its reversal point. Image coordinates grow
//! downward, so a start point above the reversal point (`p1.y < p2.y`)
//! tilts the revolution to the left.

use hammertrack_model::geometry::Point2D;
use hammertrack_model::revolution::TiltDirection;

/// Tilt magnitude in degrees (`[0, 90]`) and side.
///
/// When both displacements are below `epsilon` the points coincide and
/// there is no tilt: `(0.0, TiltDirection::None)`.
pub fn tilt_angle(p1: Point2D, p2: Point2D, epsilon: f64) -> (f64, TiltDirection) {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;

    if dx.abs() < epsilon && dy.abs() < epsilon {
        return (0.0, TiltDirection::None);
    }

    let angle = dy.abs().atan2(dx.abs()).to_degrees();
    let direction = if p1.y < p2.y {
        TiltDirection::Left
    } else {
        TiltDirection::Right
    };
    (angle, direction)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 0.001;

    #[test]
    fn test_horizontal_line_has_zero_angle() {
        let a = Point2D::new(0.2, 0.5);
        let b = Point2D::new(0.8, 0.5);
        assert_eq!(tilt_angle(a, b, EPS).0, 0.0);
        assert_eq!(tilt_angle(b, a, EPS).0, 0.0);
    }

    #[test]
    fn test_vertical_line_is_ninety_degrees() {
        let (angle, direction) = tilt_angle(Point2D::new(0.5, 0.2), Point2D::new(0.5, 0.6), EPS);
        assert!((angle - 90.0).abs() < 1e-9);
        assert_eq!(direction, TiltDirection::Left);

        // below epsilon on x still counts as vertical
        let (angle, _) = tilt_angle(Point2D::new(0.5, 0.2), Point2D::new(0.5005, 0.6), EPS);
        assert!((angle - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_direction_follows_vertical_order() {
        let (angle, direction) = tilt_angle(Point2D::new(0.2, 0.4), Point2D::new(0.8, 0.5), EPS);
        assert_eq!(direction, TiltDirection::Left);
        assert!((angle - (0.1f64).atan2(0.6).to_degrees()).abs() < 1e-9);

        let (_, direction) = tilt_angle(Point2D::new(0.8, 0.5), Point2D::new(0.2, 0.4), EPS);
        assert_eq!(direction, TiltDirection::Right);
    }

    #[test]
    fn test_coincident_points_have_no_tilt() {
        let p = Point2D::new(0.5, 0.5);
        assert_eq!(tilt_angle(p, p, EPS), (0.0, TiltDirection::None));
        assert_eq!(
            tilt_angle(p, Point2D::new(0.5009, 0.4995), EPS),
            (0.0, TiltDirection::None)
        );
    }

    #[test]
    fn test_angle_is_symmetric_in_sign_of_dx() {
        let (left, _) = tilt_angle(Point2D::new(0.5, 0.4), Point2D::new(0.9, 0.6), EPS);
        let (right, _) = tilt_angle(Point2D::new(0.5, 0.4), Point2D::new(0.1, 0.6), EPS);
        assert!((left - right).abs() < 1e-12);
        assert!(left > 0.0 && left < 90.0);
    }
}
