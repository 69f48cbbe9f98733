//! Compare two captured throws.

use std::path::{Path, PathBuf};

use hammertrack_analysis::ThrowAnalyzer;
use hammertrack_common::clock::FrameClock;
use hammertrack_common::config::AppConfig;
use hammertrack_model::analysis::{ThrowAnalysis, ThrowComparison};
use hammertrack_model::detection::parse_detections;

pub fn run(first: PathBuf, second: PathBuf, config: &AppConfig, json: bool) -> anyhow::Result<()> {
    let analyzer = ThrowAnalyzer::new(config.analysis.clone())
        .map_err(|e| anyhow::anyhow!("Invalid analysis parameters: {e}"))?;
    let clock = FrameClock::new(config.capture.frame_rate_hz);

    let a = analyze_file(&first, &analyzer, &clock)?;
    let b = analyze_file(&second, &analyzer, &clock)?;
    let comparison = ThrowComparison::new(&a, &b);

    if json {
        println!("{}", serde_json::to_string_pretty(&comparison)?);
        return Ok(());
    }

    println!("Comparing throws:");
    println!(
        "  A: {} ({} revolutions, {:.1}° avg)",
        first.display(),
        a.revolution_count(),
        a.average_angle
    );
    println!(
        "  B: {} ({} revolutions, {:.1}° avg)",
        second.display(),
        b.revolution_count(),
        b.average_angle
    );
    println!();
    println!("{comparison}");

    Ok(())
}

fn analyze_file(
    path: &Path,
    analyzer: &ThrowAnalyzer,
    clock: &FrameClock,
) -> anyhow::Result<ThrowAnalysis> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let trajectory = parse_detections(&content, clock)
        .map_err(|e| anyhow::anyhow!("Failed to parse {}: {e}", path.display()))?;
    analyzer
        .analyze(&trajectory)
        .map_err(|reason| anyhow::anyhow!("No analysis for {}: {reason}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throw_compared_with_itself() {
        let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("fixtures")
            .join("captured-throw.csv");
        let analyzer = ThrowAnalyzer::with_defaults();
        let clock = FrameClock::new(30.0);

        let a = analyze_file(&path, &analyzer, &clock).unwrap();
        let comparison = ThrowComparison::new(&a, &a);
        assert_eq!(comparison.revolution_difference, 0);
        assert_eq!(comparison.average_angle_difference, 0.0);
        assert_eq!(comparison.revolution_angle_deltas.len(), a.revolution_count());
        assert!(comparison.revolution_angle_deltas.iter().all(|d| *d == 0.0));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let analyzer = ThrowAnalyzer::with_defaults();
        let err = analyze_file(Path::new("/nonexistent/throw.csv"), &analyzer, &FrameClock::new(30.0))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
