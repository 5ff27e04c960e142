//! Commands passed into steering control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::pose::{EulerDeg, Pose};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command to the steering controller, as issued from a script.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SteeringCmd {
    /// Steer to a new target point.
    SetTarget {
        /// Units: meters,
        /// Frame: World
        position_m: [f64; 3],

        /// Attitude to finish in.
        #[serde(default)]
        euler_deg: EulerDeg,
    },

    /// Start moving to the current target again.
    Start,

    /// Stop all movement.
    Stop,

    /// Forget the current target.
    DropTarget,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SteeringCmd {
    /// The pose a `SetTarget` command asks for.
    pub fn target_pose(&self) -> Option<Pose> {
        match self {
            SteeringCmd::SetTarget {
                position_m,
                euler_deg,
            } => Some(Pose::from_euler_deg(
                Vector3::from_column_slice(position_m),
                *euler_deg,
            )),
            _ => None,
        }
    }

    /// Determine if the command is valid (i.e. all values are finite).
    pub fn is_valid(&self) -> bool {
        match self {
            SteeringCmd::SetTarget {
                position_m,
                euler_deg,
            } => {
                position_m.iter().all(|v| v.is_finite())
                    && euler_deg.roll.is_finite()
                    && euler_deg.pitch.is_finite()
                    && euler_deg.yaw.is_finite()
            }
            SteeringCmd::Start | SteeringCmd::Stop | SteeringCmd::DropTarget => true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cmd_from_json() -> Result<(), serde_json::Error> {
        let cmd: SteeringCmd = serde_json::from_str(
            r#"{"SetTarget": {"position_m": [100.0, 0.0, 20.0], "euler_deg": {"roll": 0.0, "pitch": 0.0, "yaw": 90.0}}}"#,
        )?;

        assert!(cmd.is_valid());

        let pose = cmd.target_pose().unwrap_or_default();
        assert_eq!(pose.position_m, Vector3::new(100.0, 0.0, 20.0));
        assert!((pose.euler_deg().yaw - 90.0).abs() < 1e-9);

        // Attitude is optional
        let cmd: SteeringCmd = serde_json::from_str(r#"{"SetTarget": {"position_m": [1.0, 2.0, 3.0]}}"#)?;
        assert_eq!(cmd.target_pose().map(|p| p.attitude_q), Some(Default::default()));

        let stop: SteeringCmd = serde_json::from_str(r#""Stop""#)?;
        assert_eq!(stop, SteeringCmd::Stop);
        assert!(stop.target_pose().is_none());

        Ok(())
    }
}
