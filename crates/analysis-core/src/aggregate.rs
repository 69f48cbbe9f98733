//! Whole-throw analysis.
//!
//! [`ThrowAnalyzer`] runs the pipeline stages in order (smoothing, turning
//! points, segmentation with tilt) and folds the revolutions into a
//! [`ThrowAnalysis`]. Missing preconditions are reported as
//! [`AnalysisUnavailable`] values.

use serde::Serialize;

use hammertrack_common::config::AnalysisConfig;
use hammertrack_common::error::{AnalysisUnavailable, HammertrackResult};
use hammertrack_model::analysis::{AnalysisOutcome, ThrowAnalysis};
use hammertrack_model::detection::Trajectory;
use hammertrack_model::geometry::Point2D;
use hammertrack_model::revolution::{Revolution, TurningPoint};

use crate::segmentation::segment_revolutions;
use crate::smoothing::GaussianSmoother;
use crate::turning_points::detect_turning_points_checked;

/// Configured analysis pipeline.
#[derive(Debug, Clone)]
pub struct ThrowAnalyzer {
    config: AnalysisConfig,
    smoother: Option<GaussianSmoother>,
}

/// Intermediate pipeline data alongside the outcome, for display.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisDiagnostics {
    /// Positions the turning-point scan ran on (smoothed when enabled).
    pub positions: Vec<Point2D>,
    /// Turning points, positioned on the raw detections.
    pub turning_points: Vec<TurningPoint>,
    pub outcome: AnalysisOutcome,
}

impl ThrowAnalyzer {
    /// Build an analyzer, rejecting invalid configuration.
    pub fn new(config: AnalysisConfig) -> HammertrackResult<Self> {
        config.validate()?;
        let smoother = if config.smoothing_enabled {
            Some(GaussianSmoother::from_config(&config)?)
        } else {
            None
        };
        Ok(Self { config, smoother })
    }

    /// Analyzer with default parameters.
    pub fn with_defaults() -> Self {
        Self {
            config: AnalysisConfig::default(),
            smoother: Some(GaussianSmoother::default()),
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyse a finished trajectory.
    pub fn analyze(&self, trajectory: &Trajectory) -> Result<ThrowAnalysis, AnalysisUnavailable> {
        self.run(trajectory).outcome
    }

    /// Analyse a trajectory and keep the intermediate results.
    pub fn analyze_with_diagnostics(&self, trajectory: &Trajectory) -> AnalysisDiagnostics {
        let run = self.run(trajectory);
        AnalysisDiagnostics {
            positions: run.positions,
            turning_points: run.turning_points,
            outcome: run.outcome.into(),
        }
    }

    fn run(&self, trajectory: &Trajectory) -> PipelineRun {
        let raw = trajectory.positions();
        let positions = match &self.smoother {
            Some(smoother) => smoother.smooth(&raw),
            None => raw,
        };

        if trajectory.len() < self.config.min_trajectory_points {
            tracing::debug!(
                points = trajectory.len(),
                required = self.config.min_trajectory_points,
                "Trajectory too short to analyse"
            );
            return PipelineRun::unavailable(
                positions,
                Vec::new(),
                AnalysisUnavailable::too_few_points(
                    trajectory.len(),
                    self.config.min_trajectory_points,
                ),
            );
        }

        let turning_points = match detect_turning_points_checked(&positions) {
            Ok(turning_points) => at_detections(turning_points, trajectory),
            Err(reason) => return PipelineRun::unavailable(positions, Vec::new(), reason),
        };

        if turning_points.len() < self.config.min_turning_points {
            tracing::debug!(
                turning_points = turning_points.len(),
                required = self.config.min_turning_points,
                "Too few turning points for a revolution"
            );
            let reason = AnalysisUnavailable::too_few_turning_points(
                turning_points.len(),
                self.config.min_turning_points,
            );
            return PipelineRun::unavailable(positions, turning_points, reason);
        }

        let revolutions = segment_revolutions(
            &turning_points,
            trajectory.points(),
            self.config.motion_epsilon,
        );
        let analysis = aggregate(trajectory, turning_points.len(), revolutions);

        tracing::debug!(
            points = analysis.total_frames,
            turning_points = analysis.turning_point_count,
            revolutions = analysis.revolution_count(),
            average_angle = analysis.average_angle,
            "Throw analysed"
        );

        PipelineRun {
            positions,
            turning_points,
            outcome: Ok(analysis),
        }
    }
}

impl Default for ThrowAnalyzer {
    fn default() -> Self {
        Self::with_defaults()
    }
}

struct PipelineRun {
    positions: Vec<Point2D>,
    turning_points: Vec<TurningPoint>,
    outcome: Result<ThrowAnalysis, AnalysisUnavailable>,
}

impl PipelineRun {
    fn unavailable(
        positions: Vec<Point2D>,
        turning_points: Vec<TurningPoint>,
        reason: AnalysisUnavailable,
    ) -> Self {
        Self {
            positions,
            turning_points,
            outcome: Err(reason),
        }
    }
}

/// Move turning points found on smoothed positions back onto the detections
/// at the same indices. Smoothing only decides where the reversals are.
fn at_detections(turning_points: Vec<TurningPoint>, trajectory: &Trajectory) -> Vec<TurningPoint> {
    turning_points
        .into_iter()
        .map(|tp| match trajectory.points().get(tp.index) {
            Some(point) => TurningPoint {
                position: point.position,
                ..tp
            },
            None => tp,
        })
        .collect()
}

/// Fold revolutions into the per-throw summary.
pub fn aggregate(
    trajectory: &Trajectory,
    turning_point_count: usize,
    revolutions: Vec<Revolution>,
) -> ThrowAnalysis {
    let average_angle = if revolutions.is_empty() {
        0.0
    } else {
        revolutions.iter().map(|r| r.angle).sum::<f64>() / revolutions.len() as f64
    };

    ThrowAnalysis {
        revolutions,
        total_frames: trajectory.len(),
        average_angle,
        turning_point_count,
        duration_secs: trajectory.duration_secs(),
    }
}
