//! Parameters structure for the craft

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the kinematic craft.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {

    // ---- LINEAR ----

    /// The slowest the craft will be asked to fly while steering.
    ///
    /// Units: meters/second
    pub min_speed_ms: f64,

    /// Maximum magnitude of the velocity.
    ///
    /// Units: meters/second
    pub max_speed_ms: f64,

    /// Maximum magnitude of the linear input.
    ///
    /// Units: meters/second^2
    pub max_accel_mss: f64,

    // ---- ANGULAR ----

    /// Units: degrees/second
    pub max_roll_rate_degs: f64,

    /// Units: degrees/second
    pub max_pitch_rate_degs: f64,

    /// Units: degrees/second
    pub max_yaw_rate_degs: f64,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            min_speed_ms: 5.0,
            max_speed_ms: 4000.0,
            max_accel_mss: 500.0,
            max_roll_rate_degs: 10.0,
            max_pitch_rate_degs: 10.0,
            max_yaw_rate_degs: 10.0,
        }
    }
}
