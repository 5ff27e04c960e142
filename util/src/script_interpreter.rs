//! # Command script interpreter module
//!
//! This module provides an interpreter for timed command scripts. A script
//! is a text file of lines of the form:
//!
//! ```text
//! <time_s>: <json command>;
//! ```
//!
//! where `<time_s>` is the simulation time at which the command becomes due
//! and the JSON payload deserialises into the caller's command type. Lines
//! that do not match (comments, blank lines) are ignored.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command<C> {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    cmd: C,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` to acquire the commands that need executing.
pub struct ScriptInterpreter<C> {
    _script_path: PathBuf,
    cmds: VecDeque<Command<C>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, serde_json::Error),

    #[error("Script commands are not in time order at {0} s")]
    OutOfOrder(f64),
}

/// Result of polling the interpreter.
pub enum PendingCmds<C> {
    None,
    Some(Vec<C>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<C> ScriptInterpreter<C>
where
    C: DeserializeOwned,
{
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().to_string(),
            ));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let cmds = Self::parse(&script)?;

        Ok(ScriptInterpreter {
            _script_path: path,
            cmds,
        })
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script_str(script: &str) -> Result<Self, ScriptError> {
        Ok(ScriptInterpreter {
            _script_path: PathBuf::new(),
            cmds: Self::parse(script)?,
        })
    }

    fn parse(script: &str) -> Result<VecDeque<Command<C>>, ScriptError> {
        let mut queue: VecDeque<Command<C>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

        for cap in re.captures_iter(script) {
            let time_str = cap.get(1).map(|m| m.as_str()).unwrap_or("");
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}: {}", time_str, e)))?;

            let payload = cap.get(3).map(|m| m.as_str()).unwrap_or("");
            let cmd: C = serde_json::from_str(payload)
                .map_err(|e| ScriptError::InvalidCmd(exec_time_s, e))?;

            if let Some(last) = queue.back() {
                if exec_time_s < last.exec_time_s {
                    return Err(ScriptError::OutOfOrder(exec_time_s));
                }
            }

            queue.push_back(Command { exec_time_s, cmd });
        }

        if queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(queue)
    }
}

impl<C> ScriptInterpreter<C> {
    /// Return the commands due at or before `current_time_s`.
    pub fn get_pending_cmds(&mut self, current_time_s: f64) -> PendingCmds<C> {
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript;
        }

        let mut due = vec![];

        while self
            .cmds
            .front()
            .map_or(false, |c| c.exec_time_s <= current_time_s)
        {
            if let Some(c) = self.cmds.pop_front() {
                due.push(c.cmd);
            }
        }

        if due.is_empty() {
            PendingCmds::None
        } else {
            PendingCmds::Some(due)
        }
    }

    /// Get the number of commands remaining in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    enum TestCmd {
        Go { speed: f64 },
        Halt,
    }

    const SCRIPT: &str = r#"
# A comment line is ignored
0.0: {"Go": {"speed": 1.5}};
1.0: "Halt";
1.0: {"Go": {"speed": 2.0}};
"#;

    #[test]
    fn test_pending_cmds() -> Result<(), ScriptError> {
        let mut si: ScriptInterpreter<TestCmd> = ScriptInterpreter::from_script_str(SCRIPT)?;

        assert_eq!(si.get_num_cmds(), 3);
        assert_eq!(si.get_duration(), 1.0);

        match si.get_pending_cmds(0.5) {
            PendingCmds::Some(v) => assert_eq!(v, vec![TestCmd::Go { speed: 1.5 }]),
            _ => panic!("Expected one command"),
        }

        assert!(matches!(si.get_pending_cmds(0.9), PendingCmds::None));

        match si.get_pending_cmds(1.0) {
            PendingCmds::Some(v) => assert_eq!(v.len(), 2),
            _ => panic!("Expected two commands"),
        }

        assert!(matches!(si.get_pending_cmds(2.0), PendingCmds::EndOfScript));

        Ok(())
    }

    #[test]
    fn test_empty_script() {
        let r: Result<ScriptInterpreter<TestCmd>, _> = ScriptInterpreter::from_script_str("# nothing\n");
        assert!(matches!(r, Err(ScriptError::ScriptEmpty)));
    }

    #[test]
    fn test_invalid_cmd() {
        let r: Result<ScriptInterpreter<TestCmd>, _> =
            ScriptInterpreter::from_script_str("2.0: {\"Fly\": 1};\n");
        assert!(matches!(r, Err(ScriptError::InvalidCmd(t, _)) if t == 2.0));
    }

    #[test]
    fn test_out_of_order() {
        let r: Result<ScriptInterpreter<TestCmd>, _> =
            ScriptInterpreter::from_script_str("2.0: \"Halt\";\n1.0: \"Halt\";\n");
        assert!(matches!(r, Err(ScriptError::OutOfOrder(_))));
    }
}
