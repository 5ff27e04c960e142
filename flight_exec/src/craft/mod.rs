//! # Craft module
//!
//! The craft is the thing being steered. Steering only talks to it through
//! the [`Craft`] trait: it reads the pose, velocity and limits, and writes
//! linear and angular inputs which the craft's integrator applies on its next
//! step.
//!
//! [`KinematicCraft`] is the kinematic implementation used by the simulation
//! executable.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::{UnitQuaternion, Vector3};
use std::cell::RefCell;
use std::rc::Weak;

// Internal
use crate::pose::{Pose, Target};
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// The control surface of a steerable craft.
pub trait Craft {
    /// Current pose of the craft in the world frame.
    fn pose(&self) -> Pose;

    fn position(&self) -> Vector3<f64> {
        self.pose().position_m
    }

    fn attitude(&self) -> UnitQuaternion<f64> {
        self.pose().attitude_q
    }

    fn forward(&self) -> Vector3<f64> {
        self.pose().forward()
    }

    /// Current linear velocity in the world frame.
    ///
    /// Units: meters/second
    fn velocity(&self) -> Vector3<f64>;

    /// Units: meters/second
    fn min_speed(&self) -> f64;

    /// Units: meters/second
    fn max_speed(&self) -> f64;

    /// Units: meters/second^2
    fn max_acceleration(&self) -> f64;

    /// Units: degrees/second
    fn max_roll_speed(&self) -> f64;

    /// Units: degrees/second
    fn max_yaw_speed(&self) -> f64;

    /// Units: degrees/second
    fn max_pitch_speed(&self) -> f64;

    /// Command a linear acceleration in the world frame.
    fn set_linear_input(&mut self, input_mss: Vector3<f64>);

    /// Command a rotation, expressed in the body frame.
    fn set_angular_input(&mut self, input_q: UnitQuaternion<f64>);

    /// Zero the linear input and the velocity.
    fn stop_linear_movement(&mut self);

    /// Reset the angular input to the identity.
    fn stop_angular_movement(&mut self);

    fn stop_all_movement(&mut self) {
        self.stop_linear_movement();
        self.stop_angular_movement();
    }

    /// A target the craft wants to be steered to when first possessed.
    fn default_target(&self) -> Option<Weak<RefCell<dyn Target>>> {
        None
    }
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur in the craft module.
#[derive(Debug, thiserror::Error)]
pub enum CraftError {
    #[error("Could not load the craft parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Could not create the craft archive: {0}")]
    ArchiveError(util::archive::ArchiveError),

    #[error("Invalid integration time step: {0} s")]
    InvalidTimeStep(f64),
}
