//! Built-in detectors
//!
//! Detection heuristics are plug-ins; most live outside this crate. The
//! cross-venue spread detector ships here because its inputs are exactly
//! the canonical market universe the pipeline already builds.

pub mod cross_venue;

pub use cross_venue::{CrossVenueConfig, CrossVenueDetector};
