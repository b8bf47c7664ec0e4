//! # Data Store

use comms_if::eqpt::drive::ActuationCommand;
use serde::Serialize;

use crate::{
    approach_ctrl::{self, ApproachCtrl, ControlSample, Phase},
    obj_loc::{self, ObjLoc},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Time since the previous cycle
    pub dt_s: f64,

    // ObjLoc
    pub obj_loc: ObjLoc,
    pub obj_loc_output: Option<ControlSample>,
    pub obj_loc_status_rpt: obj_loc::StatusReport,

    // ApproachCtrl
    pub approach_ctrl: ApproachCtrl,
    pub approach_ctrl_input: approach_ctrl::InputData,
    pub approach_ctrl_output: Option<ActuationCommand>,
    pub approach_ctrl_status_rpt: approach_ctrl::StatusReport,

    // Monitoring Counters
    /// Number of consecutive ticks which produced no command
    pub num_consec_faulted_ticks: u64,

    /// Total number of ticks which produced no command
    pub num_faulted_ticks: u64,

    /// Number of cycles in which the target was detected
    pub num_detected_cycles: u64,
}

/// Summary of a run, saved at the end of the session.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub num_cycles: u64,
    pub num_faulted_ticks: u64,
    pub num_detected_cycles: u64,
    pub final_phase: Phase,
    pub final_lat_error_px: f64,
    pub final_dist_error_cm: f64,
    pub final_cmd: Option<ActuationCommand>,
    pub settled: bool,
    pub aborted: bool,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a cycle.
    ///
    /// Clears those items that need clearing at the start of a cycle.
    pub fn cycle_start(&mut self, dt_s: f64) {
        self.dt_s = dt_s;

        self.obj_loc_output = None;
        self.obj_loc_status_rpt = obj_loc::StatusReport::default();

        self.approach_ctrl_input = approach_ctrl::InputData::default();
        self.approach_ctrl_output = None;
        self.approach_ctrl_status_rpt = approach_ctrl::StatusReport::default();
    }

    /// Record a tick which produced no command.
    pub fn record_fault(&mut self) {
        self.num_consec_faulted_ticks += 1;
        self.num_faulted_ticks += 1;
    }

    /// Record a tick which produced a command.
    pub fn record_ok(&mut self) {
        self.num_consec_faulted_ticks = 0;
    }

    /// Build the end of run summary.
    pub fn summary(&self, settled: bool, aborted: bool) -> RunSummary {
        let state = self.approach_ctrl.state();

        RunSummary {
            num_cycles: self.num_cycles,
            num_faulted_ticks: self.num_faulted_ticks,
            num_detected_cycles: self.num_detected_cycles,
            final_phase: state.phase,
            final_lat_error_px: state.last_lat_error_px,
            final_dist_error_cm: state.last_dist_error_cm,
            final_cmd: self.approach_ctrl_output,
            settled,
            aborted,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fault_counters() {
        let mut ds = DataStore::default();
        ds.record_fault();
        ds.record_fault();
        assert_eq!(ds.num_consec_faulted_ticks, 2);

        ds.record_ok();
        ds.record_fault();
        assert_eq!(ds.num_consec_faulted_ticks, 1);
        assert_eq!(ds.num_faulted_ticks, 3);
    }

    #[test]
    fn test_cycle_start_clears_outputs() {
        let mut ds = DataStore::default();
        ds.obj_loc_output = Some(ControlSample::new(1.0, 2.0));
        ds.approach_ctrl_output = Some(ActuationCommand::stop());

        ds.cycle_start(0.05);
        assert_eq!(ds.obj_loc_output, None);
        assert_eq!(ds.approach_ctrl_output, None);
        assert_eq!(ds.dt_s, 0.05);
    }
}
