//! Live acquisition state machine.
//!
//! The controller decides when a throw starts (the ready posture has been
//! held for the dwell time) and when it ends (too many consecutive missed
//! detections), then runs the analysis pipeline on the collected
//! trajectory.
//!
//! Detectors and pose estimators call in from their own tasks. All state
//! lives behind a single mutex and every call holds it for its whole
//! read-modify-write, so an append can never interleave with a timeout
//! check or a reset. Each acquisition has a generation id; producers read
//! [`AcquisitionController::current_generation`] before running inference
//! and pass it back with the result, and results from an older generation
//! are dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

use hammertrack_analysis::ThrowAnalyzer;
use hammertrack_common::config::{AcquisitionConfig, AnalysisConfig};
use hammertrack_common::error::{HammertrackError, HammertrackResult};
use hammertrack_model::analysis::AnalysisOutcome;
use hammertrack_model::detection::{DetectedPoint, Trajectory};
use hammertrack_model::posture::PostureSample;
use hammertrack_model::state::AcquisitionState;

use crate::posture::{ArmRaised, DwellTimer, KneeAngleStats, ReadyCondition};

/// Monotonic acquisition id.
pub type Generation = u64;

/// Notifications sent to subscribers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AcquisitionEvent {
    StateChanged {
        generation: Generation,
        from: AcquisitionState,
        to: AcquisitionState,
    },

    /// A throw finished and the pipeline ran.
    Completed {
        generation: Generation,
        /// The frozen trajectory the outcome was computed from.
        #[serde(skip)]
        trajectory: Arc<Trajectory>,
        outcome: AnalysisOutcome,
        knee_angles: KneeAngleStats,
        completed_at: DateTime<Utc>,
    },
}

/// What the controller did with one input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Detection added to the trajectory.
    Appended { points: usize },
    /// Counted as a missed detection.
    Missed { consecutive: u32 },
    /// This input ended the throw.
    Completed { generation: Generation },
    /// Ready posture held long enough; tracking started.
    Armed { generation: Generation },
    /// Posture sample consumed without a transition.
    Observed,
    /// Not relevant in the current state.
    Ignored,
    /// Result from an earlier acquisition, dropped.
    Stale {
        generation: Generation,
        current: Generation,
    },
}

impl Disposition {
    /// Turn a stale drop into [`HammertrackError::StaleResult`] for callers
    /// that propagate errors.
    pub fn into_result(self) -> HammertrackResult<Self> {
        match self {
            Disposition::Stale {
                generation,
                current,
            } => Err(HammertrackError::StaleResult {
                generation,
                current,
            }),
            other => Ok(other),
        }
    }
}

/// Point-in-time view of the controller for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcquisitionSnapshot {
    pub state: AcquisitionState,
    pub generation: Generation,
    pub started: bool,
    pub points: usize,
    pub consecutive_misses: u32,
}

struct Inner {
    state: AcquisitionState,
    started: bool,
    generation: Generation,
    trajectory: Trajectory,
    consecutive_misses: u32,
    dwell: DwellTimer,
    knee_angles: KneeAngleStats,
    subscribers: Vec<mpsc::UnboundedSender<AcquisitionEvent>>,
}

impl Inner {
    fn set_state(&mut self, to: AcquisitionState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        tracing::debug!(generation = self.generation, %from, %to, "Acquisition state changed");
        self.emit(AcquisitionEvent::StateChanged {
            generation: self.generation,
            from,
            to,
        });
    }

    fn emit(&mut self, event: AcquisitionEvent) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn discard(&mut self) {
        self.trajectory.clear();
        self.consecutive_misses = 0;
        self.dwell.reset();
        self.knee_angles = KneeAngleStats::default();
    }

    fn snapshot(&self) -> AcquisitionSnapshot {
        AcquisitionSnapshot {
            state: self.state,
            generation: self.generation,
            started: self.started,
            points: self.trajectory.len(),
            consecutive_misses: self.consecutive_misses,
        }
    }
}

/// Decides the acquisition window for each throw and analyses it.
pub struct AcquisitionController {
    config: AcquisitionConfig,
    analyzer: ThrowAnalyzer,
    ready: Box<dyn ReadyCondition>,
    inner: Mutex<Inner>,
}

impl AcquisitionController {
    /// Create a controller using the arm-raised ready condition.
    pub fn new(config: AcquisitionConfig, analysis: AnalysisConfig) -> HammertrackResult<Self> {
        let ready = ArmRaised::new(config.posture_min_confidence);
        Self::with_ready_condition(config, analysis, Box::new(ready))
    }

    /// Create a controller with a custom ready condition.
    pub fn with_ready_condition(
        config: AcquisitionConfig,
        analysis: AnalysisConfig,
        ready: Box<dyn ReadyCondition>,
    ) -> HammertrackResult<Self> {
        config.validate()?;
        let analyzer = ThrowAnalyzer::new(analysis)?;

        tracing::debug!(
            ready_condition = ready.name(),
            dwell_secs = config.dwell_secs,
            max_missed = config.max_missed_detections,
            "Acquisition controller created"
        );

        Ok(Self {
            inner: Mutex::new(Inner {
                state: AcquisitionState::Idle,
                started: false,
                generation: 0,
                trajectory: Trajectory::new(),
                consecutive_misses: 0,
                dwell: DwellTimer::new(config.dwell_secs),
                knee_angles: KneeAngleStats::default(),
                subscribers: Vec::new(),
            }),
            config,
            analyzer,
            ready,
        })
    }

    /// Wrap in an `Arc` for sharing with producer tasks.
    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State stays consistent across a panicking subscriber send.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive state changes and completed throws.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<AcquisitionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().subscribers.push(tx);
        rx
    }

    pub fn state(&self) -> AcquisitionState {
        self.lock().state
    }

    pub fn current_generation(&self) -> Generation {
        self.lock().generation
    }

    pub fn snapshot(&self) -> AcquisitionSnapshot {
        self.lock().snapshot()
    }

    /// Copy of the trajectory collected so far.
    pub fn trajectory(&self) -> Trajectory {
        self.lock().trajectory.clone()
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    /// Begin watching posture samples for the ready condition.
    pub fn start(&self) {
        let mut inner = self.lock();
        if inner.started {
            return;
        }
        inner.started = true;
        inner.generation += 1;
        inner.discard();
        tracing::info!(generation = inner.generation, "Live analysis started");
    }

    /// Stop watching and abandon any acquisition in progress.
    pub fn stop(&self) {
        let mut inner = self.lock();
        inner.started = false;
        self.abandon(&mut inner, "stop");
    }

    /// Abandon any acquisition in progress and wait for the next throw.
    pub fn reset(&self) {
        let mut inner = self.lock();
        self.abandon(&mut inner, "reset");
    }

    fn abandon(&self, inner: &mut Inner, reason: &'static str) {
        let discarded = inner.trajectory.len();
        inner.generation += 1;
        inner.discard();
        inner.set_state(AcquisitionState::Idle);
        tracing::info!(
            generation = inner.generation,
            discarded_points = discarded,
            reason,
            "Acquisition abandoned"
        );
    }

    /// The host finished presenting a completed throw.
    pub fn acknowledge(&self) -> Disposition {
        let mut inner = self.lock();
        if inner.state != AcquisitionState::Completing {
            return Disposition::Ignored;
        }
        inner.set_state(AcquisitionState::Idle);
        Disposition::Observed
    }

    /// Handle one pose-estimator result.
    pub fn on_posture(&self, sample: &PostureSample) -> Disposition {
        let mut inner = self.lock();
        if !inner.started {
            return Disposition::Ignored;
        }

        match inner.state {
            AcquisitionState::Idle => {
                let ready = self.ready.is_ready(sample);
                if !inner.dwell.observe(ready, sample.timestamp) {
                    return Disposition::Observed;
                }
                inner.set_state(AcquisitionState::Armed);
                self.begin_tracking(&mut inner, sample.frame_number);
                Disposition::Armed {
                    generation: inner.generation,
                }
            }
            AcquisitionState::Tracking => {
                inner
                    .knee_angles
                    .record_sample(sample, self.config.posture_min_confidence);
                Disposition::Observed
            }
            AcquisitionState::Armed | AcquisitionState::Completing => Disposition::Ignored,
        }
    }

    fn begin_tracking(&self, inner: &mut Inner, frame_number: u64) {
        inner.generation += 1;
        inner.discard();
        inner.set_state(AcquisitionState::Tracking);
        tracing::info!(
            generation = inner.generation,
            frame = frame_number,
            "Ready posture held, tracking hammer"
        );
    }

    /// Handle one hammer detection computed for `generation`.
    pub fn on_detection(&self, generation: Generation, point: DetectedPoint) -> Disposition {
        let mut inner = self.lock();
        if let Some(stale) = Self::check_generation(&inner, generation) {
            return stale;
        }
        if inner.state != AcquisitionState::Tracking {
            return Disposition::Ignored;
        }

        if point.confidence < self.config.confidence_threshold {
            tracing::trace!(
                frame = point.frame_number,
                confidence = point.confidence,
                "Low-confidence detection counted as miss"
            );
            return self.count_miss(&mut inner);
        }

        if let Err(e) = inner.trajectory.push(point) {
            tracing::warn!(error = %e, "Dropping detection");
            return Disposition::Ignored;
        }
        inner.consecutive_misses = 0;
        Disposition::Appended {
            points: inner.trajectory.len(),
        }
    }

    /// Handle a detector run that found no hammer.
    pub fn on_missed_detection(&self, generation: Generation, frame_number: u64) -> Disposition {
        let mut inner = self.lock();
        if let Some(stale) = Self::check_generation(&inner, generation) {
            return stale;
        }
        if inner.state != AcquisitionState::Tracking {
            return Disposition::Ignored;
        }
        tracing::trace!(frame = frame_number, "No hammer detected");
        self.count_miss(&mut inner)
    }

    fn check_generation(inner: &Inner, generation: Generation) -> Option<Disposition> {
        if generation == inner.generation {
            return None;
        }
        tracing::debug!(
            generation,
            current = inner.generation,
            "Dropping stale detector result"
        );
        Some(Disposition::Stale {
            generation,
            current: inner.generation,
        })
    }

    fn count_miss(&self, inner: &mut Inner) -> Disposition {
        inner.consecutive_misses += 1;
        if inner.consecutive_misses < self.config.max_missed_detections {
            return Disposition::Missed {
                consecutive: inner.consecutive_misses,
            };
        }
        self.complete(inner);
        Disposition::Completed {
            generation: inner.generation,
        }
    }

    fn complete(&self, inner: &mut Inner) {
        inner.set_state(AcquisitionState::Completing);

        let trajectory = Arc::new(std::mem::take(&mut inner.trajectory));
        let knee_angles = std::mem::take(&mut inner.knee_angles);
        let outcome: AnalysisOutcome = self.analyzer.analyze(&trajectory).into();

        match &outcome {
            AnalysisOutcome::Ready(analysis) => tracing::info!(
                generation = inner.generation,
                points = trajectory.len(),
                revolutions = analysis.revolution_count(),
                average_angle = analysis.average_angle,
                "Throw analysed"
            ),
            AnalysisOutcome::Unavailable(reason) => tracing::info!(
                generation = inner.generation,
                points = trajectory.len(),
                %reason,
                "No analysis for throw"
            ),
        }

        let generation = inner.generation;
        inner.emit(AcquisitionEvent::Completed {
            generation,
            trajectory,
            outcome,
            knee_angles,
            completed_at: Utc::now(),
        });

        inner.consecutive_misses = 0;
        inner.dwell.reset();
        if !self.config.await_feedback_ack {
            inner.set_state(AcquisitionState::Idle);
        }
    }
}
