//! AlignAxis: match one Euler angle of the target attitude

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::{Unit, UnitQuaternion, Vector3};

use crate::pose::{BodyAxis, EulerDeg};
use util::maths::ang_dist_deg;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignOutput {
    /// The angle is within tolerance of the expected angle.
    pub aligned: bool,

    /// Shortest signed difference from the current to the expected angle.
    ///
    /// Units: degrees
    pub error_deg: f64,

    /// Rotation to command, in the body frame.
    pub steering_rotation: UnitQuaternion<f64>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Rotate about `axis` (body frame) to bring `current_deg` to `expected_deg`.
pub fn align_axis(
    current_deg: f64,
    expected_deg: f64,
    axis: &Unit<Vector3<f64>>,
    tolerance_deg: f64,
) -> AlignOutput {
    let error_deg = ang_dist_deg(current_deg, expected_deg);

    if error_deg.abs() < tolerance_deg {
        return AlignOutput {
            aligned: true,
            error_deg,
            steering_rotation: UnitQuaternion::identity(),
        };
    }

    AlignOutput {
        aligned: false,
        error_deg,
        steering_rotation: UnitQuaternion::from_axis_angle(axis, error_deg.to_radians()),
    }
}

/// The body frame axis a rotation about which changes only the Euler angle
/// belonging to `axis`.
///
/// Yaw turns about world up, pitch about the yawed right axis and roll about
/// the body forward axis.
pub fn gimbal_axis(attitude: &UnitQuaternion<f64>, axis: BodyAxis) -> Unit<Vector3<f64>> {
    match axis {
        BodyAxis::Forward => BodyAxis::Forward.unit(),
        BodyAxis::Right => {
            let yaw_rad = EulerDeg::from_quat(attitude).yaw.to_radians();
            let yawed_right =
                UnitQuaternion::from_axis_angle(&Vector3::z_axis(), yaw_rad) * BodyAxis::Right.unit();

            Unit::new_normalize(attitude.inverse() * yawed_right.into_inner())
        }
        BodyAxis::Up => Unit::new_normalize(attitude.inverse() * Vector3::z()),
    }
}

/// Align the given Euler angle of `attitude` with the same angle of `target`.
pub fn align_attitude_axis(
    attitude: &UnitQuaternion<f64>,
    target: &UnitQuaternion<f64>,
    axis: BodyAxis,
    tolerance_deg: f64,
) -> AlignOutput {
    let current = EulerDeg::from_quat(attitude).get(axis);
    let expected = EulerDeg::from_quat(target).get(axis);

    align_axis(current, expected, &gimbal_axis(attitude, axis), tolerance_deg)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
