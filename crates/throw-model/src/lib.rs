//! HammerTrack Throw Model
//!
//! Defines the data contracts shared by the analysis pipeline, the live
//! acquisition controller and the CLI:
//! - **Detections:** Hammer positions and the trajectory they form
//! - **Revolutions:** Turning points, tilt and per-revolution geometry
//! - **Analysis:** The per-throw summary and its outcome
//! - **Posture / sessions:** Pose samples and recorded live sessions
//!
//! All coordinates are normalized to `[0.0, 1.0]` relative to the video
//! frame, with `y` growing downward.

pub mod analysis;
pub mod detection;
pub mod geometry;
pub mod posture;
pub mod revolution;
pub mod session;
pub mod state;

pub use analysis::*;
pub use detection::*;
pub use geometry::*;
pub use posture::*;
pub use revolution::*;
pub use session::*;
pub use state::*;
