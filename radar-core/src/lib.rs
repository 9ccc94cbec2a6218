//! Core types for the Prediction Market Edge Radar
//!
//! This crate defines the shared data structures used across the radar,
//! including market representations, trading signals, and run results.

pub mod edge;
pub mod error;
pub mod market;
pub mod platform;
pub mod run;
pub mod signal;

pub use edge::{Direction, Edge, RankedEdge, Severity, Urgency};
pub use error::{RadarError, RadarResult};
pub use market::Market;
pub use platform::Platform;
pub use run::{PipelineStage, RunError, RunResult, RunStats};
pub use signal::Signal;
