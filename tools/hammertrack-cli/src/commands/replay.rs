//! Replay a recorded live session through the acquisition controller.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hammertrack_acquisition::{run_feed, AcquisitionController, AcquisitionEvent, ReplayFeed};
use hammertrack_common::config::AppConfig;
use hammertrack_model::analysis::AnalysisOutcome;
use hammertrack_model::session::parse_session;

pub async fn run(
    path: PathBuf,
    config: &AppConfig,
    throttle: Option<u64>,
    json: bool,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let session =
        parse_session(&content).map_err(|e| anyhow::anyhow!("Failed to parse session: {e}"))?;

    let frame_interval = throttle.unwrap_or(config.capture.detector_frame_interval);
    if !json {
        println!("Replaying session at: {}", path.display());
        if let Some(header) = &session.header {
            println!("  Recorded: {}", header.recorded_at);
            println!("  Frame rate: {} Hz", header.frame_rate_hz);
            if let Some(source) = &header.source {
                println!("  Source: {source}");
            }
        }
        println!("  Records: {}", session.records.len());
        println!("  Detector interval: every {frame_interval} frame(s)");
        println!();
    }

    let controller = AcquisitionController::new(
        config.acquisition.clone(),
        config.analysis.clone(),
    )
    .map_err(|e| anyhow::anyhow!("Failed to create controller: {e}"))?
    .shared();

    let events = controller.subscribe();
    let printer = tokio::spawn(print_events(events, json));

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                stop.store(true, Ordering::Relaxed);
            }
        });
    }

    let mut feed = ReplayFeed::new(session);
    let stats = run_feed(controller.clone(), &mut feed, frame_interval, stop).await?;

    // Dropping the last handle closes the event channel.
    drop(controller);
    printer.await?;

    if json {
        println!("{}", serde_json::to_string(&stats)?);
    } else {
        println!();
        println!(
            "Replay complete: {} records, {} throttled, {} stale, {} throw(s)",
            stats.records, stats.throttled, stats.stale, stats.completed
        );
    }

    Ok(())
}

async fn print_events(
    mut events: tokio::sync::mpsc::UnboundedReceiver<AcquisitionEvent>,
    json: bool,
) {
    while let Some(event) = events.recv().await {
        if json {
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => tracing::warn!(error = %e, "Failed to serialize event"),
            }
            continue;
        }

        match event {
            AcquisitionEvent::StateChanged {
                generation,
                from,
                to,
            } => println!("  [gen {generation}] {from} -> {to}"),
            AcquisitionEvent::Completed {
                generation,
                trajectory,
                outcome,
                knee_angles,
                ..
            } => {
                println!(
                    "  [gen {generation}] Throw complete: {} detections",
                    trajectory.len()
                );
                match outcome {
                    AnalysisOutcome::Ready(analysis) => {
                        for line in analysis.to_string().lines() {
                            println!("    {line}");
                        }
                        for revolution in &analysis.revolutions {
                            println!("    #{} {}", revolution.number, revolution.describe());
                        }
                    }
                    AnalysisOutcome::Unavailable(reason) => {
                        println!("    No analysis: {reason}");
                    }
                }
                if let Some(left) = knee_angles.left {
                    println!(
                        "    Left knee:  {:.0}° avg ({:.0}°-{:.0}°)",
                        left.average, left.min, left.max
                    );
                }
                if let Some(right) = knee_angles.right {
                    println!(
                        "    Right knee: {:.0}° avg ({:.0}°-{:.0}°)",
                        right.average, right.min, right.max
                    );
                }
            }
        }
    }
}
