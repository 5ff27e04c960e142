//! # Pose module
//!
//! Positions and attitudes of the craft and its targets.
//!
//! All frames are right handed. The body frame has X forward, Y to the left
//! and Z up, so the body's right axis is -Y. Attitudes are quaternions that
//! rotate a vector from the body frame into the world frame.
//!
//! Euler angles are exposed in degrees through [`EulerDeg`]:
//!
//! - `yaw` about the world up axis, positive turning left,
//! - `pitch` about the yawed right axis, positive nose up,
//! - `roll` about the body forward axis, positive right wing down,
//!
//! applied in the order roll, pitch, yaw (intrinsic Z-Y-X).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The pose (position and attitude in the world frame) of a body.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Pose {
    /// The position in the world frame
    pub position_m: Vector3<f64>,

    /// The attitude of the body in the world frame. This quaternion rotates a
    /// vector from the body frame into the world frame.
    pub attitude_q: UnitQuaternion<f64>,
}

/// An attitude expressed as Euler angles in degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EulerDeg {
    pub roll: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// An axis of the body frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyAxis {
    Forward,
    Right,
    Up,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A pose provider the craft is steered towards.
///
/// Targets are owned by the environment; steering only reads them.
pub trait Target {
    /// Current pose of the target.
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

    /// Velocity of the target, static targets don't move.
    fn velocity(&self) -> Vector3<f64> {
        Vector3::zeros()
    }
}

/// A fixed point in space with an attitude, the simplest [`Target`].
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct TargetPoint {
    pub pose: Pose,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Pose {
    pub fn new(position_m: Vector3<f64>, attitude_q: UnitQuaternion<f64>) -> Self {
        Self {
            position_m,
            attitude_q,
        }
    }

    /// Build a pose from a position and Euler angles in degrees.
    pub fn from_euler_deg(position_m: Vector3<f64>, euler: EulerDeg) -> Self {
        Self {
            position_m,
            attitude_q: euler.to_quat(),
        }
    }

    /// Attitude as Euler angles in degrees.
    pub fn euler_deg(&self) -> EulerDeg {
        EulerDeg::from_quat(&self.attitude_q)
    }

    /// The body forward axis in the world frame.
    pub fn forward(&self) -> Vector3<f64> {
        self.axis(BodyAxis::Forward)
    }

    /// The body right axis in the world frame.
    pub fn right(&self) -> Vector3<f64> {
        self.axis(BodyAxis::Right)
    }

    /// The body up axis in the world frame.
    pub fn up(&self) -> Vector3<f64> {
        self.axis(BodyAxis::Up)
    }

    /// Get one of the body axes in the world frame.
    pub fn axis(&self, axis: BodyAxis) -> Vector3<f64> {
        self.attitude_q * axis.unit().into_inner()
    }

    /// Express a world frame direction in the body frame.
    pub fn to_body(&self, world_vec: &Vector3<f64>) -> Vector3<f64> {
        self.attitude_q.inverse() * world_vec
    }
}

impl EulerDeg {
    pub fn new(roll: f64, pitch: f64, yaw: f64) -> Self {
        Self { roll, pitch, yaw }
    }

    /// Convert to a quaternion.
    ///
    /// Pitch is about the right axis (-Y), hence the sign flip going into
    /// nalgebra's (roll, pitch, yaw) about (X, Y, Z) convention.
    pub fn to_quat(&self) -> UnitQuaternion<f64> {
        UnitQuaternion::from_euler_angles(
            self.roll.to_radians(),
            -self.pitch.to_radians(),
            self.yaw.to_radians(),
        )
    }

    /// Convert from a quaternion.
    ///
    /// Pitch is returned in [-90, 90], roll and yaw in [-180, 180].
    pub fn from_quat(q: &UnitQuaternion<f64>) -> Self {
        let (roll, pitch, yaw) = q.euler_angles();

        Self {
            roll: roll.to_degrees(),
            pitch: -pitch.to_degrees(),
            yaw: yaw.to_degrees(),
        }
    }

    /// Get the angle about a particular body axis.
    pub fn get(&self, axis: BodyAxis) -> f64 {
        match axis {
            BodyAxis::Forward => self.roll,
            BodyAxis::Right => self.pitch,
            BodyAxis::Up => self.yaw,
        }
    }
}

impl BodyAxis {
    /// Unit vector of this axis in the body frame.
    pub fn unit(&self) -> Unit<Vector3<f64>> {
        match self {
            BodyAxis::Forward => Vector3::x_axis(),
            BodyAxis::Right => Unit::new_unchecked(-Vector3::y()),
            BodyAxis::Up => Vector3::z_axis(),
        }
    }
}

impl TargetPoint {
    pub fn new(pose: Pose) -> Self {
        Self { pose }
    }
}

impl Target for TargetPoint {
    fn pose(&self) -> Pose {
        self.pose
    }
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Limit the magnitude of a vector, keeping its direction.
///
/// Returns the limited vector and true if the limit was applied.
pub fn clamp_norm(vec: Vector3<f64>, max_norm: f64) -> (Vector3<f64>, bool) {
    let norm = vec.norm();

    if norm > max_norm {
        if norm > 0.0 && max_norm > 0.0 {
            (vec * (max_norm / norm), true)
        } else {
            (Vector3::zeros(), true)
        }
    } else {
        (vec, false)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn vec_close(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn test_identity_axes() {
        let pose = Pose::default();

        assert!(vec_close(&pose.forward(), &Vector3::x()));
        assert!(vec_close(&pose.right(), &-Vector3::y()));
        assert!(vec_close(&pose.up(), &Vector3::z()));
    }

    #[test]
    fn test_euler_senses() {
        // Positive yaw turns the nose left (towards +Y)
        let yawed = Pose::from_euler_deg(Vector3::zeros(), EulerDeg::new(0.0, 0.0, 90.0));
        assert!(vec_close(&yawed.forward(), &Vector3::y()));

        // Positive pitch raises the nose
        let pitched = Pose::from_euler_deg(Vector3::zeros(), EulerDeg::new(0.0, 90.0, 0.0));
        assert!(vec_close(&pitched.forward(), &Vector3::z()));

        // Positive roll drops the right wing
        let rolled = Pose::from_euler_deg(Vector3::zeros(), EulerDeg::new(90.0, 0.0, 0.0));
        assert!(vec_close(&rolled.right(), &-Vector3::z()));
    }

    #[test]
    fn test_euler_quat_conversion() {
        let euler = EulerDeg::new(20.0, -35.0, 150.0);
        let back = EulerDeg::from_quat(&euler.to_quat());

        assert!(close(back.roll, euler.roll));
        assert!(close(back.pitch, euler.pitch));
        assert!(close(back.yaw, euler.yaw));

        assert!(close(back.get(BodyAxis::Forward), 20.0));
        assert!(close(back.get(BodyAxis::Right), -35.0));
        assert!(close(back.get(BodyAxis::Up), 150.0));
    }

    #[test]
    fn test_to_body() {
        let pose = Pose::from_euler_deg(Vector3::new(1.0, 2.0, 3.0), EulerDeg::new(0.0, 0.0, 90.0));

        // World +Y is straight ahead of a craft yawed 90 deg left
        assert!(vec_close(&pose.to_body(&Vector3::y()), &Vector3::x()));
    }

    #[test]
    fn test_clamp_norm() {
        let (v, limited) = clamp_norm(Vector3::new(3.0, 4.0, 0.0), 2.5);
        assert!(limited);
        assert!(close(v.norm(), 2.5));
        assert!(vec_close(&v, &Vector3::new(1.5, 2.0, 0.0)));

        let (v, limited) = clamp_norm(Vector3::new(0.1, 0.0, 0.0), 2.5);
        assert!(!limited);
        assert_eq!(v, Vector3::new(0.1, 0.0, 0.0));

        let (v, limited) = clamp_norm(Vector3::new(1.0, 0.0, 0.0), 0.0);
        assert!(limited);
        assert_eq!(v, Vector3::zeros());
    }

    #[test]
    fn test_target_point() {
        let pose = Pose::from_euler_deg(Vector3::new(10.0, 0.0, 0.0), EulerDeg::new(0.0, 0.0, 45.0));
        let target = TargetPoint::new(pose);

        assert_eq!(target.position(), Vector3::new(10.0, 0.0, 0.0));
        assert_eq!(target.velocity(), Vector3::zeros());
        assert!(vec_close(&target.forward(), &pose.forward()));
    }
}
