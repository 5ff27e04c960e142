//! Steering control module state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info, trace, warn};
use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

// Internal
use super::*;
use crate::craft::Craft;
use crate::pose::{BodyAxis, Pose, Target};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The steering controller.
///
/// Holds non-owning references to the craft it steers and the target it
/// steers to. If either goes away the controller stops safely.
pub struct SteeringCtrl {
    pub(crate) params: Params,

    nav_state: NavState,

    /// Acceleration demand for this tick, in the world frame.
    steering_velocity: Vector3<f64>,

    /// Rotation demand for this tick, in the body frame.
    steering_rotation: UnitQuaternion<f64>,

    /// Set when the controller should start moving on the next tick.
    target_moved: bool,

    craft: Option<Weak<RefCell<dyn Craft>>>,
    target: Option<Weak<RefCell<dyn Target>>>,

    observers: Vec<Box<dyn SteeringObserver>>,

    /// The craft as read on the last tick.
    snapshot: Option<CraftSnapshot>,

    sim_time_s: f64,

    report: StatusReport,
    arch_report: Archiver,
}

/// Input data to steering control.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Units: seconds
    pub dt_s: f64,
}

/// The commands steering control wrote to the craft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputData {
    pub nav_state: NavState,

    /// Units: meters/second^2
    pub steering_velocity: Vector3<f64>,

    pub steering_rotation: UnitQuaternion<f64>,
}

/// Status report for steering control processing.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusReport {
    pub sim_time_s: f64,

    pub nav_state: NavState,

    /// The navigation state changed this tick.
    pub state_changed: bool,

    /// No target was available this tick.
    pub missing_target: bool,

    /// No craft was available this tick.
    pub missing_craft: bool,

    /// Units: meters
    pub distance_m: f64,

    /// Units: meters/second
    pub target_speed_ms: f64,

    pub accel_limited: bool,

    pub facing: bool,

    /// Units: degrees
    pub align_error_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for StatusReport {
    fn default() -> Self {
        Self {
            sim_time_s: 0.0,
            nav_state: NavState::Stopped,
            state_changed: false,
            missing_target: false,
            missing_craft: false,
            distance_m: 0.0,
            target_speed_ms: 0.0,
            accel_limited: false,
            facing: false,
            align_error_deg: 0.0,
        }
    }
}

impl Default for SteeringCtrl {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl SteeringCtrl {
    /// Create a new controller with no craft or target.
    ///
    /// The controller starts `Stopped` but armed, so it begins moving on the
    /// first tick that has both a craft and a target.
    pub fn new(params: Params) -> Self {
        Self {
            params,
            nav_state: NavState::Stopped,
            steering_velocity: Vector3::zeros(),
            steering_rotation: UnitQuaternion::identity(),
            target_moved: true,
            craft: None,
            target: None,
            observers: Vec::new(),
            snapshot: None,
            sim_time_s: 0.0,
            report: StatusReport::default(),
            arch_report: Archiver::default(),
        }
    }

    /// Take control of a craft, adopting its default target.
    pub fn possess(&mut self, craft: Weak<RefCell<dyn Craft>>) {
        self.target = None;

        if let Some(c) = craft.upgrade() {
            let default_target = c.borrow().default_target();
            self.target = default_target;
        }

        self.craft = Some(craft);

        info!(
            "Possessed craft (default target: {})",
            if self.target.is_some() { "yes" } else { "no" }
        );
    }

    /// Release the craft and target, leaving the craft as it is.
    pub fn unpossess(&mut self) {
        self.craft = None;
        self.target = None;
        self.snapshot = None;
        self.steering_velocity = Vector3::zeros();
        self.steering_rotation = UnitQuaternion::identity();
        self.set_nav_state(NavState::Stopped);

        info!("Released craft");
    }

    /// Steer to a new target.
    ///
    /// Any movement is stopped immediately, the controller starts moving to
    /// the new target on the next tick.
    pub fn set_target(&mut self, target: Weak<RefCell<dyn Target>>) {
        self.target = Some(target);
        self.target_moved = true;
        self.stop_movement();

        debug!("New target set");
    }

    /// Forget the current target and stop.
    pub fn drop_target(&mut self) {
        self.target = None;
        self.stop_movement();

        debug!("Target dropped");
    }

    /// Start moving to the current target again on the next tick.
    pub fn start(&mut self) {
        self.target_moved = true;
    }

    /// Stop all movement of the craft and return to `Stopped`.
    pub fn stop_movement(&mut self) {
        self.set_nav_state(NavState::Stopped);
        self.steering_velocity = Vector3::zeros();
        self.steering_rotation = UnitQuaternion::identity();

        if let Some(craft) = self.upgrade_craft() {
            craft.borrow_mut().stop_all_movement();
        }
    }

    /// Add an observer to report to.
    pub fn add_observer(&mut self, observer: Box<dyn SteeringObserver>) {
        self.observers.push(observer);
    }

    /// Run one control cycle.
    ///
    /// Missing references are not errors for the caller: the controller
    /// stops and flags them in the returned report.
    pub fn tick(&mut self, dt_s: f64) -> StatusReport {
        let prev_report = self.report;

        self.sim_time_s += dt_s;
        self.report = StatusReport {
            sim_time_s: self.sim_time_s,
            ..Default::default()
        };

        let prev_state = self.nav_state;

        if let Err(e) = self.update_state() {
            let already_reported = match e {
                SteeringCtrlError::MissingTarget => prev_report.missing_target,
                SteeringCtrlError::MissingCraft => prev_report.missing_craft,
                _ => false,
            };
            if !already_reported {
                warn!("Steering stopped: {}", e);
            }

            self.stop_movement();
        }

        if self.nav_state != NavState::Stopped {
            if self.params.debug_enabled() && !self.observers.is_empty() {
                self.notify_tick();
            }

            if let Some(craft) = self.upgrade_craft() {
                let mut craft = craft.borrow_mut();
                craft.set_linear_input(self.steering_velocity);
                craft.set_angular_input(self.steering_rotation);
            }

            trace!(
                "Steering {}: velocity {:?}, rotation {:.2} deg",
                self.nav_state,
                self.steering_velocity.as_slice(),
                self.steering_rotation.angle().to_degrees()
            );
        }

        self.report.nav_state = self.nav_state;
        self.report.state_changed = self.nav_state != prev_state;

        self.report
    }

    pub fn nav_state(&self) -> NavState {
        self.nav_state
    }

    pub fn steering_velocity(&self) -> Vector3<f64> {
        self.steering_velocity
    }

    pub fn steering_rotation(&self) -> UnitQuaternion<f64> {
        self.steering_rotation
    }

    pub fn target_moved(&self) -> bool {
        self.target_moved
    }

    pub fn has_craft(&self) -> bool {
        self.upgrade_craft().is_some()
    }

    pub fn has_target(&self) -> bool {
        self.upgrade_target().is_some()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Run the work of the current state and transition if it is done.
    fn update_state(&mut self) -> Result<(), SteeringCtrlError> {
        let target = self.upgrade_target();
        let craft = self.upgrade_craft();

        self.report.missing_target = target.is_none();
        self.report.missing_craft = craft.is_none();

        let target = target.ok_or(SteeringCtrlError::MissingTarget)?;
        let craft = craft.ok_or(SteeringCtrlError::MissingCraft)?;

        let target_pose = target.borrow().pose();
        let snapshot = CraftSnapshot::from_craft(&*craft.borrow());
        self.snapshot = Some(snapshot);

        if self.nav_state == NavState::Stopped && self.target_moved {
            self.target_moved = false;
            self.set_nav_state(NavState::Moving);
        }

        match self.nav_state {
            NavState::Stopped => (),
            NavState::Moving => {
                if self.move_to(&target_pose, &snapshot, &craft) {
                    self.set_nav_state(NavState::AligningYaw);
                }
            }
            NavState::AligningYaw => {
                if self.align(&target_pose, &snapshot, BodyAxis::Up) {
                    self.set_nav_state(NavState::AligningPitch);
                }
            }
            NavState::AligningPitch => {
                if self.align(&target_pose, &snapshot, BodyAxis::Right) {
                    self.set_nav_state(NavState::AligningRoll);
                }
            }
            NavState::AligningRoll => {
                if self.align(&target_pose, &snapshot, BodyAxis::Forward) {
                    self.stop_movement();
                }
            }
        }

        Ok(())
    }

    /// Fly towards the target, returns true once arrived.
    fn move_to(
        &mut self,
        target_pose: &Pose,
        snapshot: &CraftSnapshot,
        craft: &Rc<RefCell<dyn Craft>>,
    ) -> bool {
        let out = arrive(&target_pose.position_m, snapshot, &self.params);

        self.report.distance_m = out.distance_m;
        self.report.target_speed_ms = out.target_speed_ms;
        self.report.accel_limited = out.accel_limited;

        if out.arrived {
            self.steering_velocity = Vector3::zeros();
            self.steering_rotation = UnitQuaternion::identity();
            craft.borrow_mut().stop_linear_movement();

            return true;
        }

        self.steering_velocity = out.steering_velocity;

        if let Some(face_out) = out.face {
            self.steering_rotation = face_out.steering_rotation;
            self.report.facing = face_out.facing;

            if face_out.facing {
                craft.borrow_mut().stop_angular_movement();
            }
        }

        false
    }

    /// Align one axis with the target, returns true once aligned.
    fn align(&mut self, target_pose: &Pose, snapshot: &CraftSnapshot, axis: BodyAxis) -> bool {
        self.steering_velocity = Vector3::zeros();

        let out = align_attitude_axis(
            &snapshot.pose.attitude_q,
            &target_pose.attitude_q,
            axis,
            self.params.target_angle_reached_tolerance_deg,
        );

        self.steering_rotation = out.steering_rotation;
        self.report.align_error_deg = out.error_deg;

        out.aligned
    }

    fn set_nav_state(&mut self, new_state: NavState) {
        let old_state = self.nav_state;

        if old_state == new_state {
            return;
        }

        self.nav_state = new_state;

        info!("Steering state {} -> {}", old_state, new_state);

        for observer in self.observers.iter_mut() {
            observer.on_state_change(old_state, new_state);
        }
    }

    fn notify_tick(&mut self) {
        let snapshot = match self.snapshot {
            Some(s) => s,
            None => return,
        };

        let forward = snapshot.pose.forward();

        let report = SteeringDebug {
            sim_time_s: self.sim_time_s,
            nav_state: self.nav_state,
            position_m: snapshot.pose.position_m,
            forward,
            steered_forward: snapshot.pose.attitude_q * (self.steering_rotation * Vector3::x()),
            velocity_ms: snapshot.velocity_ms,
            current_speed_ms: snapshot.velocity_ms.norm(),
            desired_speed_ms: self.steering_velocity.norm(),
            show_rotation: self.params.debug_all || self.params.debug_rotation,
            show_movement: (self.params.debug_all || self.params.debug_movement)
                && self.steering_velocity.norm_squared() > 0.0,
        };

        for observer in self.observers.iter_mut() {
            observer.on_tick(&report);
        }
    }

    fn upgrade_craft(&self) -> Option<Rc<RefCell<dyn Craft>>> {
        self.craft.as_ref().and_then(Weak::upgrade)
    }

    fn upgrade_target(&self) -> Option<Rc<RefCell<dyn Target>>> {
        self.target.as_ref().and_then(Weak::upgrade)
    }
}

impl State for SteeringCtrl {
    type InitData = &'static str;
    type InitError = SteeringCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = SteeringCtrlError;

    /// Initialise the steering controller.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        let params: Params = params::load(init_data).map_err(SteeringCtrlError::ParamLoadError)?;
        params.validate()?;
        self.params = params;

        self.arch_report = Archiver::from_path(session, "steering_ctrl/status_report.csv")
            .map_err(SteeringCtrlError::ArchiveError)?;

        Ok(())
    }

    /// Perform one cycle of steering control.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let report = self.tick(input_data.dt_s);

        let output = OutputData {
            nav_state: self.nav_state,
            steering_velocity: self.steering_velocity,
            steering_rotation: self.steering_rotation,
        };

        Ok((output, report))
    }
}

impl Archived for SteeringCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
