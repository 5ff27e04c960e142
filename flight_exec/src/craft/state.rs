//! Kinematic craft state and integrator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::trace;
use nalgebra::{UnitQuaternion, Vector3};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Weak;

// Internal
use super::{Craft, CraftError, Params};
use crate::pose::{clamp_norm, EulerDeg, Pose, Target};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::clamp,
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Linear inputs smaller than this are treated as zero.
///
/// Units: meters/second^2
const LINEAR_INPUT_EPSILON_MSS: f64 = 1e-6;

/// Angular inputs with a smaller angle than this are treated as the identity.
///
/// Units: radians
const ANGULAR_INPUT_EPSILON_RAD: f64 = 1e-9;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A craft which integrates its commanded inputs kinematically.
#[derive(Default)]
pub struct KinematicCraft {
    pub(crate) params: Params,

    pose: Pose,

    /// Units: meters/second
    velocity_ms: Vector3<f64>,

    /// Commanded acceleration in the world frame.
    ///
    /// Units: meters/second^2
    linear_input_mss: Vector3<f64>,

    /// Commanded rotation in the body frame.
    angular_input_q: UnitQuaternion<f64>,

    thrust: ThrustIndicators,

    default_target: Option<Weak<RefCell<dyn Target>>>,

    /// Integrated time since the craft was created.
    sim_time_s: f64,

    report: StatusReport,
    arch_state: Archiver,
}

/// Input data to the craft's cyclic processing.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputData {
    /// Time step to integrate over.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// The thrusters shown while the craft is accelerating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ThrustIndicators {
    pub left: bool,
    pub right: bool,
}

/// Status report for craft integration.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct StatusReport {
    /// The velocity magnitude was capped at the maximum speed.
    pub velocity_limited: bool,

    pub roll_rate_limited: bool,
    pub pitch_rate_limited: bool,
    pub yaw_rate_limited: bool,

    /// The linear input was non-zero this step.
    pub thrusting: bool,
}

/// A flat archive record of the craft state.
#[derive(Serialize)]
struct CraftRecord {
    sim_time_s: f64,
    pos_x_m: f64,
    pos_y_m: f64,
    pos_z_m: f64,
    roll_deg: f64,
    pitch_deg: f64,
    yaw_deg: f64,
    vel_x_ms: f64,
    vel_y_ms: f64,
    vel_z_ms: f64,
    speed_ms: f64,
    velocity_limited: bool,
    thrusting: bool,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl KinematicCraft {
    /// Create a new craft at rest at the given pose.
    pub fn new(params: Params, pose: Pose) -> Self {
        Self {
            params,
            pose,
            ..Default::default()
        }
    }

    /// Move the craft to a new pose without integrating.
    pub fn set_pose(&mut self, pose: Pose) {
        self.pose = pose;
    }

    /// Set the target steering should adopt when it possesses this craft.
    pub fn set_default_target(&mut self, target: Weak<RefCell<dyn Target>>) {
        self.default_target = Some(target);
    }

    pub fn linear_input(&self) -> Vector3<f64> {
        self.linear_input_mss
    }

    pub fn angular_input(&self) -> UnitQuaternion<f64> {
        self.angular_input_q
    }

    pub fn thrust_indicators(&self) -> ThrustIndicators {
        self.thrust
    }

    pub fn thrusting(&self) -> bool {
        self.thrust.left || self.thrust.right
    }

    pub fn sim_time_s(&self) -> f64 {
        self.sim_time_s
    }

    /// Advance the craft by `dt_s` seconds using the current inputs.
    pub fn integrate(&mut self, dt_s: f64) -> StatusReport {
        let mut report = StatusReport::default();

        let thrusting = self.linear_input_mss.norm() > LINEAR_INPUT_EPSILON_MSS;

        // The craft coasts on its current velocity, only thrust changes it.
        self.pose.position_m += self.velocity_ms * dt_s;

        if thrusting {
            let (velocity_ms, limited) = clamp_norm(
                self.velocity_ms + self.linear_input_mss * dt_s,
                self.params.max_speed_ms,
            );
            self.velocity_ms = velocity_ms;
            report.velocity_limited = limited;
        }

        if self.angular_input_q.angle() > ANGULAR_INPUT_EPSILON_RAD {
            let demand = EulerDeg::from_quat(&self.angular_input_q);

            let (roll, roll_limited) =
                limit_rate(demand.roll, self.params.max_roll_rate_degs, dt_s);
            let (pitch, pitch_limited) =
                limit_rate(demand.pitch, self.params.max_pitch_rate_degs, dt_s);
            let (yaw, yaw_limited) =
                limit_rate(demand.yaw, self.params.max_yaw_rate_degs, dt_s);

            report.roll_rate_limited = roll_limited;
            report.pitch_rate_limited = pitch_limited;
            report.yaw_rate_limited = yaw_limited;

            let step = EulerDeg::new(roll, pitch, yaw).to_quat();

            self.pose.attitude_q = self.pose.attitude_q * step;
            self.pose.attitude_q.renormalize();
        }

        self.thrust = ThrustIndicators {
            left: thrusting,
            right: thrusting,
        };
        report.thrusting = thrusting;

        self.sim_time_s += dt_s;

        trace!(
            "Craft at {:?}, velocity {:?} ({:.2} m/s)",
            self.pose.position_m.as_slice(),
            self.velocity_ms.as_slice(),
            self.velocity_ms.norm()
        );

        self.report = report;

        report
    }
}

impl Craft for KinematicCraft {
    fn pose(&self) -> Pose {
        self.pose
    }

    fn velocity(&self) -> Vector3<f64> {
        self.velocity_ms
    }

    fn min_speed(&self) -> f64 {
        self.params.min_speed_ms
    }

    fn max_speed(&self) -> f64 {
        self.params.max_speed_ms
    }

    fn max_acceleration(&self) -> f64 {
        self.params.max_accel_mss
    }

    fn max_roll_speed(&self) -> f64 {
        self.params.max_roll_rate_degs
    }

    fn max_yaw_speed(&self) -> f64 {
        self.params.max_yaw_rate_degs
    }

    fn max_pitch_speed(&self) -> f64 {
        self.params.max_pitch_rate_degs
    }

    fn set_linear_input(&mut self, input_mss: Vector3<f64>) {
        self.linear_input_mss = clamp_norm(input_mss, self.params.max_accel_mss).0;
    }

    fn set_angular_input(&mut self, input_q: UnitQuaternion<f64>) {
        self.angular_input_q = input_q;
    }

    fn stop_linear_movement(&mut self) {
        self.linear_input_mss = Vector3::zeros();
        self.velocity_ms = Vector3::zeros();
    }

    fn stop_angular_movement(&mut self) {
        self.angular_input_q = UnitQuaternion::identity();
    }

    fn default_target(&self) -> Option<Weak<RefCell<dyn Target>>> {
        self.default_target.clone()
    }
}

impl State for KinematicCraft {
    type InitData = &'static str;
    type InitError = CraftError;

    type InputData = InputData;
    type OutputData = Pose;
    type StatusReport = StatusReport;
    type ProcError = CraftError;

    /// Initialise the craft.
    ///
    /// Expected init data is the path to the parameter file.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.params = params::load(init_data).map_err(CraftError::ParamLoadError)?;

        self.arch_state =
            Archiver::from_path(session, "craft/state.csv").map_err(CraftError::ArchiveError)?;

        Ok(())
    }

    /// Integrate the craft over one cycle.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !input_data.dt_s.is_finite() || input_data.dt_s < 0.0 {
            return Err(CraftError::InvalidTimeStep(input_data.dt_s));
        }

        let report = self.integrate(input_data.dt_s);

        Ok((self.pose, report))
    }
}

impl Archived for KinematicCraft {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let euler = self.pose.euler_deg();

        self.arch_state.serialise(CraftRecord {
            sim_time_s: self.sim_time_s,
            pos_x_m: self.pose.position_m.x,
            pos_y_m: self.pose.position_m.y,
            pos_z_m: self.pose.position_m.z,
            roll_deg: euler.roll,
            pitch_deg: euler.pitch,
            yaw_deg: euler.yaw,
            vel_x_ms: self.velocity_ms.x,
            vel_y_ms: self.velocity_ms.y,
            vel_z_ms: self.velocity_ms.z,
            speed_ms: self.velocity_ms.norm(),
            velocity_limited: self.report.velocity_limited,
            thrusting: self.report.thrusting,
        })
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Limit a per-axis angular demand to the axis rate and scale it to one step.
fn limit_rate(demand_deg: f64, max_rate_degs: f64, dt_s: f64) -> (f64, bool) {
    let limited = clamp(demand_deg, -max_rate_degs, max_rate_degs);

    (limited * dt_s, limited != demand_deg)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_params() -> Params {
        Params {
            min_speed_ms: 1.0,
            max_speed_ms: 10.0,
            max_accel_mss: 100.0,
            max_roll_rate_degs: 10.0,
            max_pitch_rate_degs: 10.0,
            max_yaw_rate_degs: 10.0,
        }
    }

    #[test]
    fn test_linear_input_clamped() {
        let mut craft = KinematicCraft::new(test_params(), Pose::default());

        craft.set_linear_input(Vector3::new(300.0, 400.0, 0.0));
        assert!((craft.linear_input().norm() - 100.0).abs() < 1e-9);

        craft.set_linear_input(Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(craft.linear_input(), Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_velocity_limited() {
        let mut craft = KinematicCraft::new(test_params(), Pose::default());

        craft.set_linear_input(Vector3::new(100.0, 0.0, 0.0));
        let report = craft.integrate(1.0);

        assert!(report.velocity_limited);
        assert!(report.thrusting);
        assert!(craft.thrusting());
        assert!((craft.velocity().norm() - 10.0).abs() < 1e-9);

        // Position moves on the velocity held at the start of the step
        assert_eq!(craft.position(), Vector3::zeros());
    }

    #[test]
    fn test_coasting() {
        let mut craft = KinematicCraft::new(test_params(), Pose::default());

        craft.set_linear_input(Vector3::new(5.0, 0.0, 0.0));
        craft.integrate(1.0);
        assert!((craft.velocity().x - 5.0).abs() < 1e-9);

        // With no thrust the velocity is held and the craft keeps moving
        craft.set_linear_input(Vector3::zeros());
        let report = craft.integrate(2.0);

        assert!(!report.thrusting);
        assert!(!craft.thrusting());
        assert!((craft.velocity().x - 5.0).abs() < 1e-9);
        assert!((craft.position().x - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_stop_movement() {
        let mut craft = KinematicCraft::new(test_params(), Pose::default());

        craft.set_linear_input(Vector3::new(5.0, 0.0, 0.0));
        craft.set_angular_input(EulerDeg::new(0.0, 0.0, 5.0).to_quat());
        craft.integrate(1.0);

        craft.stop_all_movement();

        assert_eq!(craft.velocity(), Vector3::zeros());
        assert_eq!(craft.linear_input(), Vector3::zeros());
        assert_eq!(craft.angular_input(), UnitQuaternion::identity());

        let position = craft.position();
        let attitude = craft.attitude();
        craft.integrate(1.0);

        assert_eq!(craft.position(), position);
        assert_eq!(craft.attitude(), attitude);
    }

    #[test]
    fn test_angular_rate_limited() {
        let mut craft = KinematicCraft::new(test_params(), Pose::default());

        craft.set_angular_input(EulerDeg::new(0.0, 0.0, 90.0).to_quat());
        let report = craft.integrate(0.5);

        assert!(report.yaw_rate_limited);
        assert!(!report.pitch_rate_limited);
        assert!(!report.roll_rate_limited);

        let euler = craft.pose().euler_deg();
        assert!((euler.yaw - 5.0).abs() < 1e-6);
        assert!(euler.pitch.abs() < 1e-6);
        assert!(euler.roll.abs() < 1e-6);
    }

    #[test]
    fn test_angular_step_in_body_frame() {
        let start = Pose::from_euler_deg(Vector3::zeros(), EulerDeg::new(0.0, 0.0, 90.0));
        let mut craft = KinematicCraft::new(test_params(), start);

        // A small pitch demand below the rate limit
        craft.set_angular_input(EulerDeg::new(0.0, 4.0, 0.0).to_quat());
        let report = craft.integrate(0.5);

        assert!(!report.pitch_rate_limited);

        let euler = craft.pose().euler_deg();
        assert!((euler.yaw - 90.0).abs() < 1e-6);
        assert!((euler.pitch - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_proc_rejects_bad_time_step() {
        let mut craft = KinematicCraft::new(test_params(), Pose::default());

        assert!(matches!(
            craft.proc(&InputData { dt_s: -0.1 }),
            Err(CraftError::InvalidTimeStep(_))
        ));
        assert!(matches!(
            craft.proc(&InputData { dt_s: std::f64::NAN }),
            Err(CraftError::InvalidTimeStep(_))
        ));

        let (pose, _) = match craft.proc(&InputData { dt_s: 0.1 }) {
            Ok(o) => o,
            Err(e) => panic!("Unexpected error: {}", e),
        };
        assert_eq!(pose, Pose::default());
        assert!((craft.sim_time_s() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_default_params() {
        let p = Params::default();

        assert_eq!(p.min_speed_ms, 5.0);
        assert_eq!(p.max_speed_ms, 4000.0);
        assert_eq!(p.max_accel_mss, 500.0);
        assert_eq!(p.max_yaw_rate_degs, 10.0);
    }
}
