//! Main flight simulation executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Scripted command processing
//!         - Steering control processing
//!         - Craft integration
//!         - Archiving
//!     - Save a summary of the run
//!
//! Time in the loop is simulated: every cycle advances it by exactly the
//! cycle period, and wall clock pacing is optional.
//!
//! # Usage
//!
//! `flight_exec [script]`, where `script` is an optional path to a command
//! script. Without a script the craft flies to the default target from
//! `flight_exec.toml`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use serde::Serialize;
use std::cell::RefCell;
use std::env;
use std::rc::Rc;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use flight_lib::{
    craft::{self, Craft, KinematicCraft},
    params::FlightExecParams,
    pose::{EulerDeg, Target, TargetPoint},
    steering_ctrl::{
        self, ArchiveObserver, LogObserver, NavState, SteeringCmd, SteeringCtrl,
    },
};
use util::{
    archive::Archived,
    host,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
    script_interpreter::{PendingCmds, ScriptInterpreter},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of the run, saved into the session at exit.
#[derive(Serialize)]
struct RunSummary {
    end_time: String,
    sim_time_s: f64,
    num_cycles: u64,
    num_state_changes: u64,
    script_completed: bool,
    final_nav_state: NavState,
    final_position_m: [f64; 3],
    final_euler_deg: EulerDeg,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("flight_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Debug, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Flight Simulation Executable\n");
    info!("Running on: {}", host::get_host_info());
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: FlightExecParams =
        util::params::load("flight_exec.toml").wrap_err("Could not load exec params")?;

    if !(exec_params.cycle_period_s > 0.0) {
        return Err(eyre!(
            "The cycle period must be positive, found {}",
            exec_params.cycle_period_s
        ));
    }

    info!("Exec parameters loaded");

    // ---- INITIALISE SCRIPT ----

    let args: Vec<String> = env::args().collect();

    debug!("CLI arguments: {:?}", args);

    let mut script: Option<ScriptInterpreter<SteeringCmd>> = match args.len() {
        1 => {
            info!("No script provided, flying to the default target\n");
            None
        }
        2 => {
            info!("Loading script from \"{}\"", &args[1]);

            let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

            info!(
                "Loaded script lasts {:.02} s and contains {} commands\n",
                si.get_duration(),
                si.get_num_cmds()
            );

            Some(si)
        }
        n => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                n - 1
            ))
        }
    };

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut kinematic_craft = KinematicCraft::default();
    kinematic_craft
        .init("craft.toml", &session)
        .wrap_err("Failed to initialise the craft")?;
    kinematic_craft.set_pose(exec_params.initial_pose());

    // The environment owns the targets, steering only ever sees weak
    // references to them.
    let default_target: Rc<RefCell<dyn Target>> =
        Rc::new(RefCell::new(TargetPoint::new(exec_params.default_target_pose())));
    let mut current_target: Option<Rc<RefCell<dyn Target>>> = None;

    kinematic_craft.set_default_target(Rc::downgrade(&default_target));

    let craft = Rc::new(RefCell::new(kinematic_craft));
    info!("Craft init complete");

    let mut steering = SteeringCtrl::default();
    steering
        .init("steering_ctrl.toml", &session)
        .wrap_err("Failed to initialise SteeringCtrl")?;

    steering.add_observer(Box::new(LogObserver));
    if exec_params.archive {
        steering.add_observer(Box::new(
            ArchiveObserver::new(&session).wrap_err("Failed to create the steering archive")?,
        ));
    }

    let craft_dyn: Rc<RefCell<dyn Craft>> = craft.clone();
    steering.possess(Rc::downgrade(&craft_dyn));
    info!("SteeringCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let steering_input = steering_ctrl::InputData {
        dt_s: exec_params.cycle_period_s,
    };
    let craft_input = craft::InputData {
        dt_s: exec_params.cycle_period_s,
    };

    let max_cycles = util::time::seconds_to_cycles(exec_params.max_duration_s, exec_params.cycle_period_s);

    let mut num_cycles: u64 = 0;
    let mut num_state_changes: u64 = 0;
    let mut script_completed = script.is_none();

    loop {
        let cycle_start_instant = Instant::now();
        let sim_time_s = num_cycles as f64 * exec_params.cycle_period_s;

        // ---- SCRIPTED COMMANDS ----

        if let Some(ref mut si) = script {
            match si.get_pending_cmds(sim_time_s) {
                PendingCmds::None => (),
                PendingCmds::Some(cmds) => {
                    for cmd in cmds.iter() {
                        exec_cmd(cmd, &mut steering, &mut current_target);
                    }
                }
                PendingCmds::EndOfScript => {
                    if !script_completed {
                        info!("End of command script reached");
                    }
                    script_completed = true;
                }
            }
        }

        // ---- STEERING CONTROL ----

        match steering.proc(&steering_input) {
            Ok((_, report)) => {
                if report.state_changed {
                    num_state_changes += 1;
                }
            }
            Err(e) => warn!("Error during SteeringCtrl processing: {}", e),
        }

        // ---- CRAFT INTEGRATION ----

        let craft_result = craft.borrow_mut().proc(&craft_input);
        craft_result.wrap_err("Craft integration failed")?;

        // ---- WRITE ARCHIVES ----

        if exec_params.archive {
            if let Err(e) = steering.write() {
                warn!("Could not write the SteeringCtrl archive: {}", e);
            }
            if let Err(e) = craft.borrow_mut().write() {
                warn!("Could not write the craft archive: {}", e);
            }
        }

        num_cycles += 1;

        // ---- END CONDITIONS ----

        if script_completed && steering.nav_state() == NavState::Stopped && !steering.target_moved() {
            info!("Steering complete after {:.02} s", sim_time_s);
            break;
        }

        if num_cycles >= max_cycles {
            warn!(
                "Maximum duration of {:.02} s reached, stopping",
                exec_params.max_duration_s
            );
            break;
        }

        // ---- CYCLE MANAGEMENT ----

        if exec_params.real_time {
            let cycle_dur = Instant::now() - cycle_start_instant;

            match Duration::from_secs_f64(exec_params.cycle_period_s).checked_sub(cycle_dur) {
                Some(d) => thread::sleep(d),
                None => warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64() - exec_params.cycle_period_s
                ),
            }
        }
    }

    // ---- SHUTDOWN ----

    let final_pose = craft.borrow().pose();
    let summary = RunSummary {
        end_time: chrono::Utc::now().to_rfc3339(),
        sim_time_s: num_cycles as f64 * exec_params.cycle_period_s,
        num_cycles,
        num_state_changes,
        script_completed,
        final_nav_state: steering.nav_state(),
        final_position_m: [
            final_pose.position_m.x,
            final_pose.position_m.y,
            final_pose.position_m.z,
        ],
        final_euler_deg: final_pose.euler_deg(),
    };

    info!(
        "Final position {:?}, attitude {:?}",
        summary.final_position_m, summary.final_euler_deg
    );

    session.save("summary.json", summary);

    info!("End of execution");

    session.exit();

    Ok(())
}

/// Execute a single scripted command.
fn exec_cmd(
    cmd: &SteeringCmd,
    steering: &mut SteeringCtrl,
    current_target: &mut Option<Rc<RefCell<dyn Target>>>,
) {
    if !cmd.is_valid() {
        warn!("Ignoring invalid command: {:?}", cmd);
        return;
    }

    info!("Executing {:?}", cmd);

    match cmd {
        SteeringCmd::SetTarget { .. } => {
            if let Some(pose) = cmd.target_pose() {
                let target: Rc<RefCell<dyn Target>> = Rc::new(RefCell::new(TargetPoint::new(pose)));
                steering.set_target(Rc::downgrade(&target));

                // Replacing the target releases the old one
                *current_target = Some(target);
            }
        }
        SteeringCmd::Start => steering.start(),
        SteeringCmd::Stop => steering.stop_movement(),
        SteeringCmd::DropTarget => {
            steering.drop_target();
            *current_target = None;
        }
    }
}
