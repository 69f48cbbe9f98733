//! Analyse a captured trajectory file.

use std::path::PathBuf;

use hammertrack_analysis::ThrowAnalyzer;
use hammertrack_common::clock::FrameClock;
use hammertrack_common::config::{AnalysisConfig, AppConfig};
use hammertrack_model::analysis::AnalysisOutcome;
use hammertrack_model::detection::parse_detections;

pub fn run(
    path: PathBuf,
    config: &AppConfig,
    sigma: Option<f64>,
    no_smoothing: bool,
    min_points: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;

    let clock = FrameClock::new(config.capture.frame_rate_hz);
    let trajectory = parse_detections(&content, &clock)
        .map_err(|e| anyhow::anyhow!("Failed to parse detections: {e}"))?;

    let analysis_config = AnalysisConfig {
        smoothing_enabled: config.analysis.smoothing_enabled && !no_smoothing,
        smoothing_sigma: sigma.unwrap_or(config.analysis.smoothing_sigma),
        min_trajectory_points: min_points.unwrap_or(config.analysis.min_trajectory_points),
        ..config.analysis.clone()
    };
    let analyzer = ThrowAnalyzer::new(analysis_config)
        .map_err(|e| anyhow::anyhow!("Invalid analysis parameters: {e}"))?;

    let diagnostics = analyzer.analyze_with_diagnostics(&trajectory);
    tracing::debug!(
        points = trajectory.len(),
        turning_points = diagnostics.turning_points.len(),
        "Analysis finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&diagnostics.outcome)?);
        return Ok(());
    }

    println!("Analyzing trajectory at: {}", path.display());
    println!("  Loaded {} detections", trajectory.len());
    println!(
        "  Smoothing: {}",
        if analyzer.config().smoothing_enabled {
            format!("gaussian (sigma={})", analyzer.config().smoothing_sigma)
        } else {
            "off".to_string()
        }
    );
    println!("  Turning points: {}", diagnostics.turning_points.len());
    println!();

    match &diagnostics.outcome {
        AnalysisOutcome::Ready(analysis) => {
            println!("{analysis}");
            println!();
            for revolution in &analysis.revolutions {
                println!(
                    "  #{:<2} {:>12}  frames {:>4}-{:<4} {:.2}s",
                    revolution.number,
                    revolution.describe(),
                    revolution.geometry.first_frame,
                    revolution.geometry.last_frame,
                    revolution.geometry.duration_secs
                );
            }
        }
        AnalysisOutcome::Unavailable(reason) => {
            println!("No analysis: {reason}");
        }
    }

    Ok(())
}
