//! Face: turn the craft towards a direction

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{UnitQuaternion, Vector3};
use std::f64::consts::PI;

use super::{FaceMode, Params};
use crate::pose::BodyAxis;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Forward and the direction are coincident if the cosine of the angle
/// between them is at least this (about 1 degree).
pub const FACING_COS_THRESHOLD: f64 = 0.999845;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceOutput {
    /// The craft already faces the direction.
    pub facing: bool,

    /// Rotation to command, in the body frame.
    pub steering_rotation: UnitQuaternion<f64>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the rotation which turns a craft with the given attitude to face
/// along `direction` (a unit vector in the world frame).
pub fn face(attitude: &UnitQuaternion<f64>, direction: &Vector3<f64>, params: &Params) -> FaceOutput {
    let forward = attitude * Vector3::x();

    if forward.dot(direction) >= FACING_COS_THRESHOLD {
        return FaceOutput {
            facing: true,
            steering_rotation: UnitQuaternion::identity(),
        };
    }

    let local_dir = attitude.inverse() * direction;

    let steering_rotation = match params.face_mode {
        FaceMode::Banked => banked_rotation(&local_dir, params),
        FaceMode::Direct => direct_rotation(&local_dir),
    };

    FaceOutput {
        facing: false,
        steering_rotation,
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Yaw about up then pitch about right, with an optional bank about forward.
fn banked_rotation(local_dir: &Vector3<f64>, params: &Params) -> UnitQuaternion<f64> {
    let yaw_rad = local_dir.y.atan2(local_dir.x);
    let pitch_rad = local_dir.z.atan2(local_dir.x.hypot(local_dir.y));

    // Positive roll drops the right wing, so a left turn banks with negative
    // roll.
    let roll_rad = if params.add_roll_on_turns {
        -yaw_rad * params.roll_scale
    } else {
        0.0
    };

    let roll_q = UnitQuaternion::from_axis_angle(&BodyAxis::Forward.unit(), roll_rad);
    let pitch_q = UnitQuaternion::from_axis_angle(&BodyAxis::Right.unit(), pitch_rad);
    let yaw_q = UnitQuaternion::from_axis_angle(&BodyAxis::Up.unit(), yaw_rad);

    yaw_q * pitch_q * roll_q
}

fn direct_rotation(local_dir: &Vector3<f64>) -> UnitQuaternion<f64> {
    UnitQuaternion::rotation_between(&Vector3::x(), local_dir)
        .unwrap_or_else(|| UnitQuaternion::from_axis_angle(&BodyAxis::Up.unit(), PI))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::pose::EulerDeg;

    fn vec_close(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
        (a - b).norm() < 1e-9
    }

    #[test]
    fn test_coincident_is_facing() {
        let params = Params::default();
        let attitude = EulerDeg::new(0.0, 10.0, 45.0).to_quat();
        let forward = attitude * Vector3::x();

        let out = face(&attitude, &forward, &params);

        assert!(out.facing);
        assert_eq!(out.steering_rotation, UnitQuaternion::identity());

        // Half a degree off is still within the threshold
        let slightly_off = EulerDeg::new(0.0, 10.0, 45.5).to_quat() * Vector3::x();
        assert!(face(&attitude, &slightly_off, &params).facing);
    }

    #[test]
    fn test_banked_carries_forward_onto_direction() {
        let params = Params::default();
        let attitude = EulerDeg::new(0.0, 0.0, 30.0).to_quat();
        let direction = Vector3::new(1.0, 2.0, 1.5).normalize();

        let out = face(&attitude, &direction, &params);
        assert!(!out.facing);

        // Applying the body frame rotation points the craft at the direction
        let new_forward = (attitude * out.steering_rotation) * Vector3::x();
        assert!(vec_close(&new_forward, &direction));

        // Without banking there's no roll component
        let euler = EulerDeg::from_quat(&out.steering_rotation);
        assert!(euler.roll.abs() < 1e-9);
    }

    #[test]
    fn test_banked_local_angles() {
        let params = Params::default();
        let attitude = UnitQuaternion::identity();

        // 30 deg left and 20 deg up
        let direction = EulerDeg::new(0.0, 20.0, 30.0).to_quat() * Vector3::x();
        let euler = EulerDeg::from_quat(&face(&attitude, &direction, &params).steering_rotation);

        assert!((euler.yaw - 30.0).abs() < 1e-9);
        assert!((euler.pitch - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_bank_into_turn() {
        let mut params = Params::default();
        params.add_roll_on_turns = true;
        params.roll_scale = 0.5;

        let attitude = UnitQuaternion::identity();
        let left = EulerDeg::new(0.0, 0.0, 40.0).to_quat() * Vector3::x();

        let out = face(&attitude, &left, &params);
        let euler = EulerDeg::from_quat(&out.steering_rotation);

        assert!((euler.yaw - 40.0).abs() < 1e-9);
        assert!((euler.roll + 20.0).abs() < 1e-9);

        // The bank does not change where the nose ends up
        assert!(vec_close(&(out.steering_rotation * Vector3::x()), &left));
    }

    #[test]
    fn test_direct_mode() {
        let mut params = Params::default();
        params.face_mode = FaceMode::Direct;

        let attitude = EulerDeg::new(10.0, 0.0, -20.0).to_quat();
        let direction = Vector3::new(0.0, -1.0, 1.0).normalize();

        let out = face(&attitude, &direction, &params);
        assert!(!out.facing);

        let new_forward = (attitude * out.steering_rotation) * Vector3::x();
        assert!(vec_close(&new_forward, &direction));
    }

    #[test]
    fn test_direction_behind() {
        let attitude = UnitQuaternion::identity();
        let behind = -Vector3::x();

        for mode in [FaceMode::Banked, FaceMode::Direct].iter() {
            let mut params = Params::default();
            params.face_mode = *mode;

            let out = face(&attitude, &behind, &params);

            assert!(!out.facing);
            assert!(vec_close(&(out.steering_rotation * Vector3::x()), &behind));
        }
    }
}
