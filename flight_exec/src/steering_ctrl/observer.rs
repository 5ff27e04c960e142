//! Observers which steering control reports its working to

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, warn};
use nalgebra::Vector3;
use serde::Serialize;

// Internal
use super::NavState;
use util::{
    archive::{ArchiveError, Archiver},
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A snapshot of the controller's working on one tick.
#[derive(Debug, Clone, Copy)]
pub struct SteeringDebug {
    /// Simulation time accumulated by the controller.
    ///
    /// Units: seconds
    pub sim_time_s: f64,

    pub nav_state: NavState,

    pub position_m: Vector3<f64>,

    /// The craft's current forward axis.
    pub forward: Vector3<f64>,

    /// The forward axis with the commanded rotation applied.
    pub steered_forward: Vector3<f64>,

    pub velocity_ms: Vector3<f64>,

    /// Units: meters/second
    pub current_speed_ms: f64,

    /// Magnitude of the commanded steering velocity.
    pub desired_speed_ms: f64,

    /// The rotation vectors should be reported.
    pub show_rotation: bool,

    /// The speed should be reported.
    pub show_movement: bool,
}

/// Writes steering debug reports through the logger.
#[derive(Debug, Default)]
pub struct LogObserver;

/// Archives steering debug reports and state changes as csv.
#[derive(Default)]
pub struct ArchiveObserver {
    arch_ticks: Archiver,
    arch_transitions: Archiver,
}

#[derive(Serialize)]
struct TickRecord {
    sim_time_s: f64,
    nav_state: NavState,
    pos_x_m: f64,
    pos_y_m: f64,
    pos_z_m: f64,
    fwd_x: f64,
    fwd_y: f64,
    fwd_z: f64,
    steered_fwd_x: f64,
    steered_fwd_y: f64,
    steered_fwd_z: f64,
    current_speed_ms: f64,
    desired_speed_ms: f64,
}

#[derive(Serialize)]
struct TransitionRecord {
    from: NavState,
    to: NavState,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Something which wants to see what steering is doing.
pub trait SteeringObserver {
    /// Called once per tick while the controller is not stopped.
    fn on_tick(&mut self, report: &SteeringDebug);

    /// Called when the navigation state changes.
    fn on_state_change(&mut self, _from: NavState, _to: NavState) {}
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteeringObserver for LogObserver {
    fn on_tick(&mut self, report: &SteeringDebug) {
        if report.show_rotation {
            debug!(
                "Forward: {:?}, steered forward: {:?}",
                report.forward.as_slice(),
                report.steered_forward.as_slice()
            );
        }

        if report.show_movement {
            debug!(
                "Current Speed: {:.2}, Desired Speed : {:.2}",
                report.current_speed_ms, report.desired_speed_ms
            );
        }
    }
}

impl ArchiveObserver {
    /// Create a new observer archiving into the session's `steering_ctrl`
    /// folder.
    pub fn new(session: &Session) -> Result<Self, ArchiveError> {
        Ok(Self {
            arch_ticks: Archiver::from_path(session, "steering_ctrl/debug.csv")?,
            arch_transitions: Archiver::from_path(session, "steering_ctrl/transitions.csv")?,
        })
    }
}

impl SteeringObserver for ArchiveObserver {
    fn on_tick(&mut self, report: &SteeringDebug) {
        let record = TickRecord {
            sim_time_s: report.sim_time_s,
            nav_state: report.nav_state,
            pos_x_m: report.position_m.x,
            pos_y_m: report.position_m.y,
            pos_z_m: report.position_m.z,
            fwd_x: report.forward.x,
            fwd_y: report.forward.y,
            fwd_z: report.forward.z,
            steered_fwd_x: report.steered_forward.x,
            steered_fwd_y: report.steered_forward.y,
            steered_fwd_z: report.steered_forward.z,
            current_speed_ms: report.current_speed_ms,
            desired_speed_ms: report.desired_speed_ms,
        };

        if let Err(e) = self.arch_ticks.serialise(record) {
            warn!("Could not archive the steering debug report: {}", e);
        }
    }

    fn on_state_change(&mut self, from: NavState, to: NavState) {
        if let Err(e) = self.arch_transitions.serialise(TransitionRecord { from, to }) {
            warn!("Could not archive the steering state change: {}", e);
        }
    }
}
