//! # Steering control module
//!
//! Steering control drives a [`Craft`](crate::craft::Craft) to the pose of a
//! [`Target`](crate::pose::Target). Each tick the controller reads the craft
//! and target poses, runs the algorithm for its current [`NavState`] and
//! writes the resulting linear and angular inputs to the craft.
//!
//! The craft first flies to the target position while turning to face it
//! (`Moving`), then matches the target's yaw, pitch and roll one axis at a
//! time before stopping.
//!
//! The algorithms themselves ([`arrive`], [`face`] and [`align_axis`]) are
//! pure functions of a [`CraftSnapshot`] and the parameters, so they can be
//! tested and benchmarked without a controller.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod align;
mod arrive;
mod cmd;
mod face;
mod observer;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use crate::craft::Craft;
use crate::pose::Pose;
pub use align::*;
pub use arrive::*;
pub use cmd::*;
pub use face::*;
pub use observer::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The craft quantities steering reads on a tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct CraftSnapshot {
    pub pose: Pose,

    /// Units: meters/second
    pub velocity_ms: Vector3<f64>,

    /// Units: meters/second
    pub min_speed_ms: f64,

    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Units: meters/second^2
    pub max_accel_mss: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The navigation state of the steering controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NavState {
    Stopped,
    Moving,
    AligningYaw,
    AligningPitch,
    AligningRoll,
}

/// Possible errors that can occur during steering control.
#[derive(Debug, thiserror::Error)]
pub enum SteeringCtrlError {
    #[error("No target is set, or the target no longer exists")]
    MissingTarget,

    #[error("No craft is possessed, or the craft no longer exists")]
    MissingCraft,

    #[error("Could not load the steering parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Invalid steering parameters: {0}")]
    InvalidParams(String),

    #[error("Could not create the steering archive: {0}")]
    ArchiveError(util::archive::ArchiveError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CraftSnapshot {
    /// Read the current state of a craft.
    pub fn from_craft(craft: &dyn Craft) -> Self {
        Self {
            pose: craft.pose(),
            velocity_ms: craft.velocity(),
            min_speed_ms: craft.min_speed(),
            max_speed_ms: craft.max_speed(),
            max_accel_mss: craft.max_acceleration(),
        }
    }
}

impl Default for NavState {
    fn default() -> Self {
        NavState::Stopped
    }
}

impl std::fmt::Display for NavState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NavState::Stopped => "Stopped",
            NavState::Moving => "Moving",
            NavState::AligningYaw => "AligningYaw",
            NavState::AligningPitch => "AligningPitch",
            NavState::AligningRoll => "AligningRoll",
        };

        write!(f, "{}", name)
    }
}
