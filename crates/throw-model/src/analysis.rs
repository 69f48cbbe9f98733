//! Result of analysing one throw.

use std::fmt;

use serde::{Deserialize, Serialize};

use hammertrack_common::error::AnalysisUnavailable;

use crate::revolution::{Revolution, TiltDirection};

/// Per-throw summary produced by the analysis pipeline.
///
/// Created once from a finished trajectory and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowAnalysis {
    /// Revolutions in throw order, numbered from 1.
    pub revolutions: Vec<Revolution>,

    /// Number of detections in the analysed trajectory.
    pub total_frames: usize,

    /// Mean unsigned tilt across revolutions (degrees).
    pub average_angle: f64,

    /// Turning points found, including the start marker.
    pub turning_point_count: usize,

    /// Time spanned by the trajectory (seconds).
    pub duration_secs: f64,
}

impl ThrowAnalysis {
    pub fn revolution_count(&self) -> usize {
        self.revolutions.len()
    }

    /// Revolution at a 0-based position.
    pub fn revolution(&self, index: usize) -> Option<&Revolution> {
        self.revolutions.get(index)
    }

    /// First revolution whose frame range covers `frame_number`.
    pub fn revolution_containing(&self, frame_number: u64) -> Option<&Revolution> {
        self.revolutions
            .iter()
            .find(|rev| rev.contains_frame(frame_number))
    }

    /// Majority tilt side. `None` when left and right are tied.
    pub fn dominant_direction(&self) -> TiltDirection {
        let left = self.count_direction(TiltDirection::Left);
        let right = self.count_direction(TiltDirection::Right);
        match left.cmp(&right) {
            std::cmp::Ordering::Greater => TiltDirection::Left,
            std::cmp::Ordering::Less => TiltDirection::Right,
            std::cmp::Ordering::Equal => TiltDirection::None,
        }
    }

    /// How evenly tilted the revolutions are, in `[0, 1]`.
    ///
    /// One minus the coefficient of variation of the angles (sample
    /// standard deviation). A throw without revolutions scores 0.
    pub fn consistency_score(&self) -> f64 {
        if self.revolutions.is_empty() {
            return 0.0;
        }
        let mean = self.average_angle;
        if mean <= 0.0 {
            return 1.0;
        }
        let cv = sample_std_dev(self.revolutions.iter().map(|r| r.angle)) / mean;
        (1.0 - cv).clamp(0.0, 1.0)
    }

    /// Mean revolution duration (seconds), 0 without revolutions.
    pub fn average_revolution_secs(&self) -> f64 {
        if self.revolutions.is_empty() {
            return 0.0;
        }
        let total: f64 = self
            .revolutions
            .iter()
            .map(|r| r.geometry.duration_secs)
            .sum();
        total / self.revolutions.len() as f64
    }

    fn count_direction(&self, direction: TiltDirection) -> usize {
        self.revolutions
            .iter()
            .filter(|r| r.direction == direction)
            .count()
    }
}

fn sample_std_dev(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let n = values.clone().count();
    if n < 2 {
        return 0.0;
    }
    let mean = values.clone().sum::<f64>() / n as f64;
    let variance = values.map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    variance.sqrt()
}

impl fmt::Display for ThrowAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Revolutions:      {}", self.revolution_count())?;
        writeln!(f, "Average tilt:     {:.1}°", self.average_angle)?;
        writeln!(f, "Dominant side:    {}", self.dominant_direction())?;
        writeln!(f, "Consistency:      {:.2}", self.consistency_score())?;
        writeln!(f, "Duration:         {:.2}s", self.duration_secs)?;
        write!(f, "Per revolution:   {:.2}s", self.average_revolution_secs())
    }
}

/// Differences between two analysed throws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThrowComparison {
    pub revolution_difference: usize,
    /// Absolute difference of the average tilt, in degrees.
    pub average_angle_difference: f64,
    /// Absolute difference of the throw durations, in seconds.
    pub duration_difference: f64,
    /// `second − first` tilt for each revolution number present in both throws.
    pub revolution_angle_deltas: Vec<f64>,
}

impl ThrowComparison {
    pub fn new(first: &ThrowAnalysis, second: &ThrowAnalysis) -> Self {
        Self {
            revolution_difference: first.revolution_count().abs_diff(second.revolution_count()),
            average_angle_difference: (first.average_angle - second.average_angle).abs(),
            duration_difference: (first.duration_secs - second.duration_secs).abs(),
            revolution_angle_deltas: first
                .revolutions
                .iter()
                .zip(&second.revolutions)
                .map(|(a, b)| b.angle - a.angle)
                .collect(),
        }
    }
}

impl fmt::Display for ThrowComparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Revolution difference: {}", self.revolution_difference)?;
        writeln!(f, "Tilt difference:       {:.1}°", self.average_angle_difference)?;
        write!(f, "Duration difference:   {:.2}s", self.duration_difference)?;
        for (i, delta) in self.revolution_angle_deltas.iter().enumerate() {
            write!(f, "\n  #{:<2} {:+.1}°", i + 1, delta)?;
        }
        Ok(())
    }
}

/// What the pipeline produced for one acquisition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisOutcome {
    Ready(ThrowAnalysis),
    Unavailable(AnalysisUnavailable),
}

impl AnalysisOutcome {
    pub fn analysis(&self) -> Option<&ThrowAnalysis> {
        match self {
            AnalysisOutcome::Ready(analysis) => Some(analysis),
            AnalysisOutcome::Unavailable(_) => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AnalysisOutcome::Ready(_))
    }
}

impl From<Result<ThrowAnalysis, AnalysisUnavailable>> for AnalysisOutcome {
    fn from(result: Result<ThrowAnalysis, AnalysisUnavailable>) -> Self {
        match result {
            Ok(analysis) => AnalysisOutcome::Ready(analysis),
            Err(reason) => AnalysisOutcome::Unavailable(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2D;
    use crate::revolution::{RevolutionGeometry, TurningPoint};

    fn rev(number: usize, angle: f64, direction: TiltDirection, frames: (u64, u64)) -> Revolution {
        let tp = |index| TurningPoint::new(index, Point2D::new(0.5, 0.5), false);
        Revolution {
            number,
            start_point: tp(0),
            reversal_point: tp(1),
            end_point: tp(2),
            angle,
            direction,
            geometry: RevolutionGeometry {
                first_frame: frames.0,
                last_frame: frames.1,
                duration_secs: (frames.1 - frames.0) as f64 / 30.0,
                width: 0.5,
                height: 0.1,
                center: Point2D::new(0.5, 0.5),
            },
        }
    }

    fn analysis(revolutions: Vec<Revolution>) -> ThrowAnalysis {
        let average_angle = if revolutions.is_empty() {
            0.0
        } else {
            revolutions.iter().map(|r| r.angle).sum::<f64>() / revolutions.len() as f64
        };
        ThrowAnalysis {
            revolutions,
            total_frames: 60,
            average_angle,
            turning_point_count: 7,
            duration_secs: 2.0,
        }
    }

    #[test]
    fn test_dominant_direction() {
        let a = analysis(vec![
            rev(1, 10.0, TiltDirection::Left, (0, 20)),
            rev(2, 12.0, TiltDirection::Left, (20, 40)),
            rev(3, 4.0, TiltDirection::Right, (40, 60)),
        ]);
        assert_eq!(a.dominant_direction(), TiltDirection::Left);

        let tied = analysis(vec![
            rev(1, 10.0, TiltDirection::Left, (0, 20)),
            rev(2, 12.0, TiltDirection::Right, (20, 40)),
        ]);
        assert_eq!(tied.dominant_direction(), TiltDirection::None);
        assert_eq!(analysis(vec![]).dominant_direction(), TiltDirection::None);
    }

    #[test]
    fn test_consistency_score() {
        let identical = analysis(vec![
            rev(1, 10.0, TiltDirection::Left, (0, 20)),
            rev(2, 10.0, TiltDirection::Left, (20, 40)),
        ]);
        assert!((identical.consistency_score() - 1.0).abs() < 1e-12);

        // mean 10, sample std dev 10 -> cv 1
        let spread = analysis(vec![
            rev(1, 0.0, TiltDirection::None, (0, 20)),
            rev(2, 10.0, TiltDirection::Left, (20, 40)),
            rev(3, 20.0, TiltDirection::Left, (40, 60)),
        ]);
        assert!(spread.consistency_score().abs() < 1e-12);

        assert_eq!(analysis(vec![]).consistency_score(), 0.0);
    }

    #[test]
    fn test_revolution_lookup() {
        let a = analysis(vec![
            rev(1, 10.0, TiltDirection::Left, (0, 20)),
            rev(2, 12.0, TiltDirection::Left, (20, 40)),
        ]);
        assert_eq!(a.revolution(1).map(|r| r.number), Some(2));
        assert!(a.revolution(2).is_none());
        assert_eq!(a.revolution_containing(25).map(|r| r.number), Some(2));
        // shared boundary belongs to the earlier revolution
        assert_eq!(a.revolution_containing(20).map(|r| r.number), Some(1));
        assert!(a.revolution_containing(41).is_none());
    }

    #[test]
    fn test_display_summary() {
        let a = analysis(vec![rev(1, 12.25, TiltDirection::Right, (0, 20))]);
        let text = a.to_string();
        assert!(text.contains("Revolutions:      1"));
        assert!(text.contains("12.2°") || text.contains("12.3°"));
        assert!(text.contains("right"));
    }

    #[test]
    fn test_average_revolution_secs() {
        let a = analysis(vec![
            rev(1, 10.0, TiltDirection::Left, (0, 20)),
            rev(2, 12.0, TiltDirection::Left, (20, 40)),
            rev(3, 4.0, TiltDirection::Right, (40, 70)),
        ]);
        assert!((a.average_revolution_secs() - 70.0 / 90.0).abs() < 1e-12);
        assert_eq!(analysis(vec![]).average_revolution_secs(), 0.0);

        let single = analysis(vec![rev(1, 10.0, TiltDirection::Left, (0, 20))]);
        assert!(single.to_string().contains("Per revolution:   0.67s"));
    }

    #[test]
    fn test_throw_comparison() {
        let first = analysis(vec![
            rev(1, 10.0, TiltDirection::Left, (0, 20)),
            rev(2, 12.0, TiltDirection::Left, (20, 40)),
        ]);
        let mut second = analysis(vec![
            rev(1, 14.0, TiltDirection::Left, (0, 20)),
            rev(2, 9.0, TiltDirection::Left, (20, 40)),
            rev(3, 7.0, TiltDirection::Right, (40, 60)),
        ]);
        second.duration_secs = 2.5;

        let comparison = ThrowComparison::new(&first, &second);
        assert_eq!(comparison.revolution_difference, 1);
        assert!((comparison.average_angle_difference - 1.0).abs() < 1e-12);
        assert!((comparison.duration_difference - 0.5).abs() < 1e-12);
        assert_eq!(comparison.revolution_angle_deltas, vec![4.0, -3.0]);

        // symmetric apart from the per-revolution sign
        let reversed = ThrowComparison::new(&second, &first);
        assert_eq!(reversed.revolution_difference, 1);
        assert_eq!(reversed.revolution_angle_deltas, vec![-4.0, 3.0]);

        let text = comparison.to_string();
        assert!(text.contains("Revolution difference: 1"));
        assert!(text.contains("Tilt difference:       1.0°"));
        assert!(text.contains("Duration difference:   0.50s"));
        assert!(text.contains("#2  -3.0°"));
    }

    #[test]
    fn test_outcome_from_result() {
        let outcome: AnalysisOutcome =
            Err::<ThrowAnalysis, _>(AnalysisUnavailable::NoMotionDetected).into();
        assert!(!outcome.is_ready());
        assert!(outcome.analysis().is_none());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["unavailable"]["reason"], "no_motion_detected");
    }
}
