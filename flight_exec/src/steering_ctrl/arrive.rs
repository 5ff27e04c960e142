//! Arrive: fly to the target position, slowing down on approach

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;

use super::{face, CraftSnapshot, FaceOutput, Params};
use crate::pose::clamp_norm;
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArriveOutput {
    /// The craft is inside the target reached radius.
    pub arrived: bool,

    /// The acceleration to command, in the world frame.
    ///
    /// Units: meters/second^2
    pub steering_velocity: Vector3<f64>,

    /// The speed the craft should be flying at along its forward axis.
    ///
    /// Units: meters/second
    pub target_speed_ms: f64,

    /// Distance to the target.
    ///
    /// Units: meters
    pub distance_m: f64,

    /// The steering velocity was limited to the maximum acceleration.
    pub accel_limited: bool,

    /// The result of facing the direction of travel, `None` once arrived.
    pub face: Option<FaceOutput>,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Compute the steering needed to fly the craft to `target_position_m`.
pub fn arrive(target_position_m: &Vector3<f64>, craft: &CraftSnapshot, params: &Params) -> ArriveOutput {
    let direction = target_position_m - craft.pose.position_m;
    let distance_m = direction.norm();

    if distance_m < params.target_reached_radius_m || distance_m <= 0.0 {
        return ArriveOutput {
            arrived: true,
            steering_velocity: Vector3::zeros(),
            target_speed_ms: 0.0,
            distance_m,
            accel_limited: false,
            face: None,
        };
    }

    let norm_dir = direction / distance_m;

    // Turn towards the target while flying
    let face_out = face(&craft.pose.attitude_q, &norm_dir, params);

    let forward = craft.pose.forward();

    let mut target_speed_ms = ramp_speed(
        distance_m,
        craft.max_speed_ms,
        params.target_slow_radius_m,
    );
    target_speed_ms *= forward.dot(&norm_dir);
    target_speed_ms = clamp(target_speed_ms, craft.min_speed_ms, craft.max_speed_ms);

    let desired_velocity = forward * target_speed_ms;

    let (steering_velocity, accel_limited) = clamp_norm(
        (desired_velocity - craft.velocity_ms) / params.time_to_target_s,
        craft.max_accel_mss,
    );

    ArriveOutput {
        arrived: false,
        steering_velocity,
        target_speed_ms,
        distance_m,
        accel_limited,
        face: Some(face_out),
    }
}

/// The desired speed at a given distance from the target.
///
/// Full speed outside the slow radius, ramping linearly to zero at the target
/// inside it.
pub fn ramp_speed(distance_m: f64, max_speed_ms: f64, slow_radius_m: f64) -> f64 {
    if distance_m > slow_radius_m {
        max_speed_ms
    } else {
        max_speed_ms * distance_m / slow_radius_m
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::pose::{EulerDeg, Pose};

    fn snapshot(pose: Pose, velocity_ms: Vector3<f64>) -> CraftSnapshot {
        CraftSnapshot {
            pose,
            velocity_ms,
            min_speed_ms: 5.0,
            max_speed_ms: 4000.0,
            max_accel_mss: 500.0,
        }
    }

    #[test]
    fn test_ramp_speed() {
        assert_eq!(ramp_speed(1000.0, 4000.0, 500.0), 4000.0);
        assert_eq!(ramp_speed(250.0, 4000.0, 500.0), 2000.0);
        assert_eq!(ramp_speed(500.0, 4000.0, 500.0), 4000.0);
        assert_eq!(ramp_speed(5.0, 4000.0, 500.0), 40.0);
    }

    #[test]
    fn test_arrived_inside_radius() {
        let params = Params::default();
        let craft = snapshot(Pose::default(), Vector3::new(10.0, 0.0, 0.0));

        let out = arrive(&Vector3::new(3.0, 0.0, 0.0), &craft, &params);
        assert!(out.arrived);
        assert_eq!(out.steering_velocity, Vector3::zeros());
        assert!(out.face.is_none());

        // Zero distance is arrived even with a zero radius
        let mut params = Params::default();
        params.target_reached_radius_m = 0.0;
        let out = arrive(&Vector3::zeros(), &craft, &params);
        assert!(out.arrived);
        assert_eq!(out.steering_velocity, Vector3::zeros());
    }

    #[test]
    fn test_target_speed_ahead() {
        let params = Params::default();
        let craft = snapshot(Pose::default(), Vector3::zeros());

        let far = arrive(&Vector3::new(1000.0, 0.0, 0.0), &craft, &params);
        assert!(!far.arrived);
        assert_eq!(far.target_speed_ms, 4000.0);
        assert!(far.face.map_or(false, |f| f.facing));

        let near = arrive(&Vector3::new(250.0, 0.0, 0.0), &craft, &params);
        assert_eq!(near.target_speed_ms, 2000.0);

        // (2000 - 0) / 0.1 is way over the acceleration limit
        assert!(near.accel_limited);
        assert!((near.steering_velocity.norm() - 500.0).abs() < 1e-9);
        assert!(near.steering_velocity.x > 0.0);
    }

    #[test]
    fn test_target_behind_uses_min_speed() {
        let params = Params::default();
        let craft = snapshot(Pose::default(), Vector3::zeros());

        let out = arrive(&Vector3::new(-1000.0, 0.0, 0.0), &craft, &params);

        assert!(!out.arrived);
        assert_eq!(out.target_speed_ms, 5.0);
        assert!(out.face.map_or(false, |f| !f.facing));
    }

    #[test]
    fn test_steering_velocity_never_exceeds_max_accel() {
        let params = Params::default();
        let target = Vector3::new(300.0, -200.0, 100.0);

        for yaw in (-180..180).step_by(45) {
            for vel in &[-4000.0, -50.0, 0.0, 50.0, 4000.0] {
                let pose = Pose::from_euler_deg(
                    Vector3::new(0.0, 0.0, 0.0),
                    EulerDeg::new(0.0, 0.0, yaw as f64),
                );
                let craft = snapshot(pose, Vector3::new(*vel, *vel * 0.5, -*vel));

                let out = arrive(&target, &craft, &params);

                assert!(out.steering_velocity.norm() <= craft.max_accel_mss + 1e-9);
                assert!(out.target_speed_ms >= craft.min_speed_ms);
                assert!(out.target_speed_ms <= craft.max_speed_ms);
            }
        }
    }

    #[test]
    fn test_tracks_desired_velocity() {
        let mut params = Params::default();
        params.time_to_target_s = 1.0;

        // Close to the desired speed the steering is the plain error
        let craft = snapshot(Pose::default(), Vector3::new(1900.0, 0.0, 0.0));
        let out = arrive(&Vector3::new(250.0, 0.0, 0.0), &craft, &params);

        assert!(!out.accel_limited);
        assert!((out.steering_velocity - Vector3::new(100.0, 0.0, 0.0)).norm() < 1e-9);
    }
}
