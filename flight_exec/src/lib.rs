//! # Flight library
//!
//! This library allows other crates in the workspace (and the benchmarks) to
//! access the steering core defined inside the flight crate.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Pose module - positions, attitudes and the targets the craft steers to
pub mod pose;

/// Craft module - the steerable craft's control surface and kinematic integrator
pub mod craft;

/// Steering control module - flies the craft to a target pose and aligns it
pub mod steering_ctrl;

/// Parameters for the flight executable
pub mod params;
