//! Check a trajectory or session file.

use std::path::PathBuf;

use hammertrack_common::clock::FrameClock;
use hammertrack_common::config::AppConfig;
use hammertrack_model::detection::{parse_detections, Trajectory};
use hammertrack_model::session::{parse_session, RecordedSession, SessionRecord};

pub fn run(path: PathBuf, config: &AppConfig) -> anyhow::Result<()> {
    println!("Validating file at: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;

    let issues = if looks_like_session(&content) {
        let session = parse_session(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse session: {e}"))?;
        check_session(&session)
    } else {
        let clock = FrameClock::new(config.capture.frame_rate_hz);
        let trajectory = parse_detections(&content, &clock)
            .map_err(|e| anyhow::anyhow!("Failed to parse detections: {e}"))?;
        check_trajectory(&trajectory, config.analysis.min_trajectory_points)
    };

    if issues.is_empty() {
        println!("\nFile is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!("\n{} issue(s) found.", issues.len());
    }

    Ok(())
}

/// Session files carry a `type` tag on every record.
fn looks_like_session(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| line.starts_with('{') && line.contains("\"type\""))
        .unwrap_or(false)
}

fn check_trajectory(trajectory: &Trajectory, min_points: usize) -> Vec<String> {
    println!("  Kind: trajectory");
    println!("  Detections: {}", trajectory.len());
    if let (Some(first), Some(last)) = (trajectory.first(), trajectory.last()) {
        println!(
            "  Frames: {}-{} ({:.2}s)",
            first.frame_number,
            last.frame_number,
            trajectory.duration_secs()
        );
    }

    let mut issues = Vec::new();
    if trajectory.len() < min_points {
        issues.push(format!(
            "only {} detections, analysis needs {min_points}",
            trajectory.len()
        ));
    }
    for pair in trajectory.points().windows(2) {
        if pair[0].frame_number == pair[1].frame_number {
            issues.push(format!("duplicate frame {}", pair[1].frame_number));
        }
    }
    for point in trajectory.points() {
        if !point.position.is_normalized() {
            issues.push(format!(
                "frame {}: position ({}, {}) outside the unit square",
                point.frame_number, point.position.x, point.position.y
            ));
        }
    }
    issues
}

fn check_session(session: &RecordedSession) -> Vec<String> {
    println!("  Kind: session");
    match &session.header {
        Some(header) => println!(
            "  Schema: {} ({} Hz)",
            header.schema_version, header.frame_rate_hz
        ),
        None => println!("  Schema: (no header)"),
    }

    let mut detections = 0usize;
    let mut postures = 0usize;
    let mut commands = 0usize;
    for record in &session.records {
        match record {
            SessionRecord::Detection(_) => detections += 1,
            SessionRecord::Posture(_) => postures += 1,
            SessionRecord::Command { .. } => commands += 1,
            SessionRecord::Miss { .. } => {}
        }
    }
    println!("  Records: {}", session.records.len());
    println!("  Detector attempts: {}", session.detector_attempts());
    println!("  Detections: {detections}");
    println!("  Posture samples: {postures}");
    println!("  Commands: {commands}");

    let mut issues = Vec::new();
    let mut last_frame: Option<u64> = None;
    for record in &session.records {
        let Some(frame) = record.frame_number() else {
            continue;
        };
        if let Some(last) = last_frame {
            if frame < last {
                issues.push(format!("frame {frame} recorded after frame {last}"));
            }
        }
        last_frame = Some(last_frame.map_or(frame, |last| last.max(frame)));
    }
    if commands == 0 {
        issues.push("no commands: the controller will never start".to_string());
    }
    issues
}
