//! Feeding detector and pose results into a controller.
//!
//! A [`DetectionFeed`] is anything that produces session records: a replayed
//! recording or an adapter around live detectors. [`run_feed`] drives a feed
//! into an [`AcquisitionController`] until the feed runs dry or the stop
//! flag is set, handing only every N-th frame to the controller the way a
//! live detector would be throttled.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use hammertrack_common::clock::FrameThrottle;
use hammertrack_common::error::HammertrackResult;
use hammertrack_model::session::{Command, RecordedSession, SessionRecord};

use crate::controller::{AcquisitionController, Disposition};

/// Source of detector and pose results.
pub trait DetectionFeed: Send {
    /// Next record, or `None` if nothing is available right now.
    fn poll(&mut self) -> HammertrackResult<Option<SessionRecord>>;

    /// Whether the feed will never produce another record.
    fn is_exhausted(&self) -> bool;

    /// Feed name for logging.
    fn name(&self) -> &str;
}

/// Replays a recorded session, record by record.
pub struct ReplayFeed {
    records: VecDeque<SessionRecord>,
}

impl ReplayFeed {
    pub fn new(session: RecordedSession) -> Self {
        Self {
            records: session.records.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.records.len()
    }
}

impl DetectionFeed for ReplayFeed {
    fn poll(&mut self) -> HammertrackResult<Option<SessionRecord>> {
        Ok(self.records.pop_front())
    }

    fn is_exhausted(&self) -> bool {
        self.records.is_empty()
    }

    fn name(&self) -> &str {
        "replay"
    }
}

/// Counters from one [`run_feed`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FeedStats {
    /// Records read from the feed.
    pub records: u64,
    /// Frames skipped by the throttle.
    pub throttled: u64,
    /// Detector results dropped as stale.
    pub stale: u64,
    /// Throws that reached completion.
    pub completed: u64,
}

/// Drive `feed` into `controller` until it is exhausted or `stop` is set.
///
/// Detector records (detections and misses) and posture samples are each
/// throttled to one frame in `frame_interval`.
pub async fn run_feed(
    controller: Arc<AcquisitionController>,
    feed: &mut dyn DetectionFeed,
    frame_interval: u64,
    stop: Arc<AtomicBool>,
) -> HammertrackResult<FeedStats> {
    let mut detector_throttle = FrameThrottle::new(frame_interval);
    let mut pose_throttle = FrameThrottle::new(frame_interval);
    let mut stats = FeedStats::default();

    tracing::info!(
        feed = feed.name(),
        frame_interval = detector_throttle.interval(),
        "Feed started"
    );

    while !stop.load(Ordering::Relaxed) {
        let record = match feed.poll() {
            Ok(Some(record)) => record,
            Ok(None) if feed.is_exhausted() => break,
            Ok(None) => {
                tokio::time::sleep(tokio::time::Duration::from_millis(1)).await;
                continue;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Feed error");
                continue;
            }
        };
        stats.records += 1;

        // Let subscribers and other producers run during long replays.
        if stats.records % 256 == 0 {
            tokio::task::yield_now().await;
        }

        let disposition = match record {
            SessionRecord::Detection(point) => {
                if !detector_throttle.should_process(point.frame_number) {
                    stats.throttled += 1;
                    continue;
                }
                let generation = controller.current_generation();
                controller.on_detection(generation, point)
            }
            SessionRecord::Miss { frame_number } => {
                if !detector_throttle.should_process(frame_number) {
                    stats.throttled += 1;
                    continue;
                }
                let generation = controller.current_generation();
                controller.on_missed_detection(generation, frame_number)
            }
            SessionRecord::Posture(sample) => {
                if !pose_throttle.should_process(sample.frame_number) {
                    stats.throttled += 1;
                    continue;
                }
                controller.on_posture(&sample)
            }
            SessionRecord::Command { command } => {
                apply_command(&controller, command);
                if matches!(command, Command::Start | Command::Stop | Command::Reset) {
                    detector_throttle.reset();
                    pose_throttle.reset();
                }
                continue;
            }
        };

        match disposition.into_result() {
            Ok(Disposition::Completed { .. }) => stats.completed += 1,
            Ok(_) => {}
            Err(e) if e.is_recoverable() => {
                tracing::debug!(error = %e, "Detector result dropped");
                stats.stale += 1;
            }
            Err(e) => return Err(e),
        }
    }

    tracing::info!(
        records = stats.records,
        throttled = stats.throttled,
        completed = stats.completed,
        "Feed stopped"
    );
    Ok(stats)
}

fn apply_command(controller: &AcquisitionController, command: Command) {
    tracing::debug!(?command, "Host command");
    match command {
        Command::Start => controller.start(),
        Command::Stop => controller.stop(),
        Command::Reset => controller.reset(),
        Command::Acknowledge => {
            controller.acknowledge();
        }
    }
}
