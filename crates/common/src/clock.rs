//! Frame-based timing utilities.
//!
//! HammerTrack measures time in frames wherever it can so that behaviour is
//! reproducible regardless of how fast the detectors run. This module provides:
//! - Conversion between frame numbers and stream timestamps
//! - Detector throttling (run inference on every N-th frame)

/// Maps frame numbers to timestamps for a stream with a fixed nominal rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameClock {
    frame_rate_hz: f64,
}

impl FrameClock {
    /// Create a clock for the given frame rate. Non-positive rates fall back to 30 Hz.
    pub fn new(frame_rate_hz: f64) -> Self {
        let frame_rate_hz = if frame_rate_hz.is_finite() && frame_rate_hz > 0.0 {
            frame_rate_hz
        } else {
            30.0
        };
        Self { frame_rate_hz }
    }

    /// Nominal frame rate.
    pub fn frame_rate_hz(&self) -> f64 {
        self.frame_rate_hz
    }

    /// Duration of one frame in seconds.
    pub fn frame_interval_secs(&self) -> f64 {
        1.0 / self.frame_rate_hz
    }

    /// Timestamp of a frame relative to frame 0.
    pub fn frame_to_secs(&self, frame_number: u64) -> f64 {
        frame_number as f64 / self.frame_rate_hz
    }

    /// Frame that is being shown at the given timestamp.
    pub fn secs_to_frame(&self, secs: f64) -> u64 {
        if secs <= 0.0 {
            return 0;
        }
        (secs * self.frame_rate_hz).floor() as u64
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new(30.0)
    }
}

/// Decides which frames are handed to a detector.
///
/// Detection is far slower than capture, so only every N-th frame is
/// processed. Frame numbers rather than wall-clock time drive the decision.
#[derive(Debug)]
pub struct FrameThrottle {
    interval: u64,
    last_processed: Option<u64>,
}

impl FrameThrottle {
    /// Create a throttle passing one frame out of every `interval`.
    pub fn new(interval: u64) -> Self {
        Self {
            interval: interval.max(1),
            last_processed: None,
        }
    }

    /// Check whether the frame should be processed.
    /// Returns true and updates internal state if so.
    /// The first call always returns true.
    pub fn should_process(&mut self, frame_number: u64) -> bool {
        match self.last_processed {
            None => {
                self.last_processed = Some(frame_number);
                true
            }
            Some(last) if frame_number >= last + self.interval => {
                self.last_processed = Some(frame_number);
                true
            }
            Some(last) if frame_number < last => {
                // Stream restarted; follow it.
                self.last_processed = Some(frame_number);
                true
            }
            _ => false,
        }
    }

    /// Frames between processed frames.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// Forget the last processed frame.
    pub fn reset(&mut self) {
        self.last_processed = None;
    }
}
