//! # Flight Executable Parameters
//!
//! This module provides parameters for the flight executable.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::pose::{EulerDeg, Pose};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightExecParams {
    /// Simulated time step of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// If true each cycle is paced to take `cycle_period_s` of wall time.
    pub real_time: bool,

    /// The run ends after this much simulated time whatever the steering is
    /// doing.
    ///
    /// Units: seconds
    pub max_duration_s: f64,

    /// Write the module archives each cycle.
    pub archive: bool,

    /// Units: meters
    pub initial_position_m: [f64; 3],

    pub initial_euler_deg: EulerDeg,

    /// Units: meters
    pub default_target_position_m: [f64; 3],

    pub default_target_euler_deg: EulerDeg,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl FlightExecParams {
    pub fn initial_pose(&self) -> Pose {
        Pose::from_euler_deg(
            Vector3::from_column_slice(&self.initial_position_m),
            self.initial_euler_deg,
        )
    }

    pub fn default_target_pose(&self) -> Pose {
        Pose::from_euler_deg(
            Vector3::from_column_slice(&self.default_target_position_m),
            self.default_target_euler_deg,
        )
    }
}

impl Default for FlightExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.02,
            real_time: false,
            max_duration_s: 600.0,
            archive: true,
            initial_position_m: [0.0; 3],
            initial_euler_deg: EulerDeg::default(),
            default_target_position_m: [2000.0, 500.0, 300.0],
            default_target_euler_deg: EulerDeg::new(0.0, 0.0, 90.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_load_params_file() -> Result<(), util::params::LoadError> {
        let p: FlightExecParams = util::params::from_toml_str(
            r#"
            cycle_period_s = 0.05
            real_time = false
            max_duration_s = 120.0
            archive = false
            initial_position_m = [0.0, 0.0, 100.0]
            default_target_position_m = [500.0, 0.0, 100.0]

            [initial_euler_deg]
            roll = 0.0
            pitch = 0.0
            yaw = 45.0

            [default_target_euler_deg]
            roll = 10.0
            pitch = 0.0
            yaw = 0.0
            "#,
        )?;

        assert_eq!(p.cycle_period_s, 0.05);
        assert_eq!(p.initial_pose().position_m, Vector3::new(0.0, 0.0, 100.0));
        assert!((p.initial_pose().euler_deg().yaw - 45.0).abs() < 1e-9);
        assert!((p.default_target_pose().euler_deg().roll - 10.0).abs() < 1e-9);

        Ok(())
    }
}
