//! Module interfaces
//!
//! Each cyclic module in `flight_exec` (steering control and the craft
//! integrator) implements [`State`], so the executable can initialise and
//! step them the same way.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// A module which is initialised once and then processed every cycle.
pub trait State {
    /// What the module needs to start, usually its parameter file path.
    type InitData;
    type InitError;

    /// Per cycle input, at least the cycle's time step.
    type InputData;
    /// What the module produced this cycle.
    type OutputData;
    /// Flags and monitoring quantities for this cycle, archived by the
    /// module.
    type StatusReport;
    type ProcError;

    /// Load parameters and open the module's archives in the session.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Run one cycle, returning the output and the status report.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
