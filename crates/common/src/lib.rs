//! HammerTrack Common Utilities
//!
//! Shared infrastructure for all HammerTrack crates:
//! - Error types and result aliases
//! - Frame clock and detector throttling
//! - Tracing/logging initialization
//! - Configuration loading and validation

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
