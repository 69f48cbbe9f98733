//! HammerTrack Analysis Core
//!
//! Turns a finished hammer trajectory into a per-throw analysis:
//! - **Smoothing:** Gaussian filter over detector jitter
//! - **Turning points:** Horizontal direction reversals ("spring" scan)
//! - **Segmentation:** Overlapping turning-point triples as revolutions
//! - **Tilt:** Angle and side of each revolution
//! - **Aggregate:** Summary statistics for the throw
//!
//! This crate is pure computation: no I/O, no clocks, no shared state.

pub mod aggregate;
pub mod segmentation;
pub mod smoothing;
pub mod tilt;
pub mod turning_points;

pub use aggregate::{AnalysisDiagnostics, ThrowAnalyzer};
pub use smoothing::GaussianSmoother;
