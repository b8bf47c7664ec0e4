//! Main approach executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Advance the simulation by the measured tick duration
//!         - Frame acquisition
//!         - Object location processing
//!         - Approach control processing
//!         - Send the command to the drive, unless the tick faulted
//!         - Write archives
//!     - Stop the drive and save the run summary
//!
//! # Modules
//!
//! All modules (e.g. `approach_ctrl`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!     2. Implement `util::archive::Archived` for that struct.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use approach_lib::{
    approach_ctrl,
    data_store::DataStore,
    obj_loc,
    params::ApproachExecParams,
    sim::{SimError, SimParams, SimScene},
};
use comms_if::eqpt::{
    drive::{ActuationCommand, DriveSink},
    FrameSource,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{error, info, warn};
use std::thread;
use std::time::{Duration, Instant};
use structopt::StructOpt;

// Internal
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
    time::TickClock,
};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Approach a coloured target in simulation.
#[derive(Debug, StructOpt)]
#[structopt(name = "approach_exec")]
struct Opt {
    /// Stop after this many cycles, overriding the exec parameters
    #[structopt(long)]
    max_cycles: Option<u64>,

    /// Name of the target to look for, overriding the ObjLoc parameters
    #[structopt(long)]
    target: Option<String>,

    /// Enable phase hysteresis with this margin in pixels
    #[structopt(long)]
    hysteresis_margin: Option<f64>,

    /// Log every cycle's processing
    #[structopt(short, long)]
    verbose: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("approach_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = if opt.verbose {
        LevelFilter::Trace
    } else {
        LevelFilter::Info
    };
    logger_init(level, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Approach Executable\n");
    info!("Session directory: {:?}\n", session.session_root);
    info!("CLI arguments: {:?}", opt);

    // ---- LOAD PARAMETERS ----

    let mut exec_params: ApproachExecParams =
        util::params::load("approach_exec.toml").wrap_err("Could not load exec params")?;
    let mut obj_loc_params: obj_loc::Params =
        util::params::load("obj_loc.toml").wrap_err("Could not load ObjLoc params")?;
    let mut approach_ctrl_params: approach_ctrl::Params =
        util::params::load("approach_ctrl.toml").wrap_err("Could not load ApproachCtrl params")?;
    let sim_params: SimParams =
        util::params::load("sim.toml").wrap_err("Could not load sim params")?;

    // Command line overrides
    if let Some(n) = opt.max_cycles {
        exec_params.max_num_cycles = Some(n);
    }
    if let Some(t) = opt.target {
        obj_loc_params.target = t;
    }
    if let Some(m) = opt.hysteresis_margin {
        approach_ctrl_params.hysteresis_margin_px = Some(m);
    }

    exec_params.validate().wrap_err("Invalid exec params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();
    let mut clock = TickClock::new();

    // ---- INITIALISE MODULES ----

    ds.obj_loc
        .init(obj_loc_params, &session)
        .wrap_err("Failed to initialise ObjLoc")?;
    info!("ObjLoc init complete");

    ds.approach_ctrl
        .init(approach_ctrl_params, &session)
        .wrap_err("Failed to initialise ApproachCtrl")?;
    info!("ApproachCtrl init complete");

    let mut sim = SimScene::new(sim_params).wrap_err("Failed to initialise the simulation")?;
    info!("Simulation init complete");

    let overlay_dir = session.session_root.join("overlay");
    if exec_params.overlay_save_interval_cycles.is_some() {
        std::fs::create_dir_all(&overlay_dir).wrap_err("Failed to create the overlay directory")?;
    }

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let cycle_period = Duration::from_secs_f64(exec_params.cycle_period_s);
    let mut settled = false;
    let mut aborted = false;

    // First tick is measured from here
    clock.reset();

    loop {
        if let Some(max) = exec_params.max_num_cycles {
            if ds.num_cycles >= max {
                info!("Maximum number of cycles ({}) reached, stopping", max);
                break;
            }
        }

        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(clock.tick());

        // ---- SIMULATION ----

        match sim.step(ds.dt_s) {
            Ok(()) => (),
            Err(SimError::Collision(t)) => {
                error!("Robot collided with the target at t = {:.2} s", t);
                aborted = true;
                break;
            }
            Err(e) => warn!("Simulation step skipped: {}", e),
        }

        // ---- DATA INPUT ----

        let frame = sim.acquire().wrap_err("Failed to acquire a frame")?;

        // ---- OBJECT LOCATION ----

        let located = match ds.obj_loc.proc(&frame) {
            Ok((o, r)) => {
                ds.obj_loc_output = o;
                ds.obj_loc_status_rpt = r;
                if r.target_detected {
                    ds.num_detected_cycles += 1;
                }
                true
            }
            Err(e) => {
                warn!("Error during ObjLoc processing: {}", e);
                false
            }
        };

        // ---- APPROACH CONTROL ----

        let cmd = if located {
            ds.approach_ctrl_input = approach_ctrl::InputData {
                sample: ds.obj_loc_output,
                dt_s: ds.dt_s,
            };

            match ds.approach_ctrl.proc(&ds.approach_ctrl_input) {
                Ok((o, r)) => {
                    ds.approach_ctrl_output = Some(o);
                    ds.approach_ctrl_status_rpt = r;
                    Some(o)
                }
                Err(e) => {
                    warn!("Error during ApproachCtrl processing: {}", e);
                    None
                }
            }
        } else {
            None
        };

        // Send demands to the drive, if the tick faulted the previous command holds
        match cmd {
            Some(c) => {
                sim.send(c);
                ds.record_ok();
            }
            None => {
                ds.record_fault();
                if ds.num_consec_faulted_ticks > exec_params.max_consec_faulted_ticks {
                    error!(
                        "Maximum number of consecutive faulted ticks ({}) exceeded",
                        exec_params.max_consec_faulted_ticks
                    );
                    aborted = true;
                    break;
                }
            }
        }

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.obj_loc.write() {
            warn!("Could not write ObjLoc archives: {}", e);
        }
        if let Err(e) = ds.approach_ctrl.write() {
            warn!("Could not write ApproachCtrl archives: {}", e);
        }

        if let Some(interval) = exec_params.overlay_save_interval_cycles {
            if interval > 0 && ds.num_cycles % interval == 0 {
                if let Some(overlay) = ds.obj_loc.render_overlay(&frame.cam.image) {
                    let path = overlay_dir.join(format!("overlay_{:06}.png", ds.num_cycles));
                    if let Err(e) = overlay.save(&path) {
                        warn!("Could not save overlay {:?}: {}", path, e);
                    }
                }
            }
        }

        // ---- SETTLED CHECK ----

        if let Some(c) = cmd {
            let rpt = ds.approach_ctrl_status_rpt;
            if rpt.detection
                && !rpt.conservative_drive
                && rpt.dist_error_cm.abs() <= exec_params.settled_dist_error_cm
                && c.drive.abs() <= exec_params.settled_drive_dem
            {
                info!(
                    "Approach settled at {:.1} cm from the target after {} cycles",
                    ds.obj_loc_status_rpt.distance_cm, ds.num_cycles
                );
                settled = true;
                break;
            }
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match cycle_period.checked_sub(cycle_dur) {
            Some(d) => thread::sleep(d),
            None => warn!(
                "Cycle overran by {:.06} s",
                cycle_dur.as_secs_f64() - cycle_period.as_secs_f64()
            ),
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }

    // ---- SHUTDOWN ----

    sim.send(ActuationCommand::stop());
    info!("Stop command sent");

    let summary = ds.summary(settled, aborted);
    info!("Run summary: {:#?}", summary);
    session.save("run_summary.json", summary);

    info!("End of execution");
    session.exit();

    if aborted {
        return Err(eyre!("Run aborted after {} cycles", ds.num_cycles));
    }

    Ok(())
}
