//! HammerTrack Acquisition
//!
//! Decides, from a live stream of pose and hammer detections, when a throw
//! starts and ends, and analyses each completed throw:
//! - **Controller:** The `Idle → Armed → Tracking → Completing` state machine
//! - **Posture:** Ready condition, dwell timing, and knee-angle statistics
//! - **Feed:** Async driver pulling detector results into the controller
//!
//! Events are delivered over channels; the controller never calls back into
//! its host.

pub mod controller;
pub mod feed;
pub mod posture;

pub use controller::{
    AcquisitionController, AcquisitionEvent, AcquisitionSnapshot, Disposition, Generation,
};
pub use feed::{run_feed, DetectionFeed, FeedStats, ReplayFeed};
pub use posture::{ArmRaised, KneeAngleStats, ReadyCondition};
