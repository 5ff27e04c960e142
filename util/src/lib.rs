//! Utility library for the flight steering software.
//!
//! Provides the pieces shared by every executable in the workspace: the
//! session (run directory and epoch), logging, parameter loading, CSV
//! archiving, the cyclic module contract and the timed command script
//! interpreter.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod archive;
pub mod host;
pub mod logger;
pub mod maths;
pub mod module;
pub mod params;
pub mod session;
pub mod script_interpreter;
pub mod time;
