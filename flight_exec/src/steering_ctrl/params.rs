//! Parameters structure for steering control

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use super::SteeringCtrlError;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for steering control.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- ARRIVAL ----

    /// The craft has arrived when it is closer than this to the target.
    ///
    /// Units: meters
    pub target_reached_radius_m: f64,

    /// Inside this distance the desired speed ramps down linearly.
    ///
    /// Units: meters
    pub target_slow_radius_m: f64,

    /// Time over which the velocity error should be removed.
    ///
    /// Units: seconds
    pub time_to_target_s: f64,

    // ---- ORIENTATION ----

    /// An axis is aligned when its error is below this.
    ///
    /// Units: degrees
    pub target_angle_reached_tolerance_deg: f64,

    /// Bank angle commanded per degree of yaw while facing.
    pub roll_scale: f64,

    /// Bank into turns while facing the direction of travel.
    pub add_roll_on_turns: bool,

    /// The facing algorithm to use while moving.
    pub face_mode: FaceMode,

    // ---- DEBUG ----

    pub debug_all: bool,
    pub debug_rotation: bool,
    pub debug_movement: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// How the craft turns to face its direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum FaceMode {
    /// Yaw about the up axis and pitch about the right axis, optionally
    /// banking into the turn.
    Banked,

    /// The shortest rotation from forward onto the direction.
    Direct,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            target_reached_radius_m: 5.0,
            target_slow_radius_m: 500.0,
            time_to_target_s: 0.1,
            target_angle_reached_tolerance_deg: 1.0,
            roll_scale: 0.5,
            add_roll_on_turns: false,
            face_mode: FaceMode::Banked,
            debug_all: true,
            debug_rotation: false,
            debug_movement: false,
        }
    }
}

impl Params {
    /// Check the parameters are usable.
    pub fn validate(&self) -> Result<(), SteeringCtrlError> {
        if !(self.target_reached_radius_m >= 0.0) {
            return Err(SteeringCtrlError::InvalidParams(format!(
                "target_reached_radius_m must be non-negative, found {}",
                self.target_reached_radius_m
            )));
        }

        if !(self.target_slow_radius_m >= 0.0) {
            return Err(SteeringCtrlError::InvalidParams(format!(
                "target_slow_radius_m must be non-negative, found {}",
                self.target_slow_radius_m
            )));
        }

        if !(self.time_to_target_s > 0.0) {
            return Err(SteeringCtrlError::InvalidParams(format!(
                "time_to_target_s must be positive, found {}",
                self.time_to_target_s
            )));
        }

        if !(self.target_angle_reached_tolerance_deg > 0.0) {
            return Err(SteeringCtrlError::InvalidParams(format!(
                "target_angle_reached_tolerance_deg must be positive, found {}",
                self.target_angle_reached_tolerance_deg
            )));
        }

        if !self.roll_scale.is_finite() {
            return Err(SteeringCtrlError::InvalidParams(format!(
                "roll_scale must be finite, found {}",
                self.roll_scale
            )));
        }

        Ok(())
    }

    /// True if any debug reporting is enabled.
    pub fn debug_enabled(&self) -> bool {
        self.debug_all || self.debug_rotation || self.debug_movement
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(Params::default().validate().is_ok());

        let mut p = Params::default();
        p.time_to_target_s = 0.0;
        assert!(matches!(p.validate(), Err(SteeringCtrlError::InvalidParams(_))));

        let mut p = Params::default();
        p.target_reached_radius_m = std::f64::NAN;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_from_toml() -> Result<(), util::params::LoadError> {
        let p: Params = util::params::from_toml_str(
            r#"
            target_reached_radius_m = 5.0
            target_slow_radius_m = 500.0
            time_to_target_s = 0.1
            target_angle_reached_tolerance_deg = 1.0
            roll_scale = 0.5
            add_roll_on_turns = true
            face_mode = "Direct"
            debug_all = false
            debug_rotation = true
            debug_movement = false
            "#,
        )?;

        assert!(p.add_roll_on_turns);
        assert_eq!(p.face_mode, FaceMode::Direct);
        assert!(p.debug_enabled());

        Ok(())
    }
}
