//! Implementations for the ApproachCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, info};
use serde::Serialize;

// Internal
use super::{tick, ApproachCtrlError, ControlSample, ControllerState, Params, ParamsError};
use super::{StatusReport, TickOutput};
use comms_if::eqpt::drive::ActuationCommand;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Approach control module state
#[derive(Default)]
pub struct ApproachCtrl {
    pub(crate) params: Params,

    pub(crate) state: ControllerState,
    arch_state: Archiver,

    pub(crate) report: StatusReport,
    arch_report: Archiver,

    pub(crate) output: Option<ActuationCommand>,
    arch_output: Archiver,
}

/// Input data to approach control.
#[derive(Debug, Default, Clone, Copy)]
pub struct InputData {
    /// The sample produced by ObjLoc this cycle, `None` if nothing was
    /// detected.
    pub sample: Option<ControlSample>,

    /// Time since the previous tick.
    ///
    /// Units: seconds
    pub dt_s: f64,
}

/// Record written to the output archive, flat so it can be written as CSV.
#[derive(Debug, PartialEq, Serialize)]
struct OutputRecord {
    emitted: bool,
    drive: f64,
    steer: f64,
}

/// Initialisation errors
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(#[from] ParamsError),

    #[error("Could not create an archive: {0}")]
    ArchiveError(#[from] ArchiveError),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ApproachCtrl {
    /// Create a new controller with zeroed state and no archiving.
    pub fn new(params: Params) -> Result<Self, ParamsError> {
        params.validate()?;

        Ok(Self {
            params,
            ..Default::default()
        })
    }

    /// Zero the controller state, used when an approach is re-engaged.
    pub fn reset(&mut self) {
        debug!("ApproachCtrl state reset");
        self.state = ControllerState::default();
        self.report = StatusReport::default();
        self.output = None;
    }

    /// Current controller state.
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Parameters the controller is running with.
    pub fn params(&self) -> &Params {
        &self.params
    }
}

impl State for ApproachCtrl {
    type InitData = Params;
    type InitError = InitError;

    type InputData = InputData;
    type OutputData = ActuationCommand;
    type StatusReport = StatusReport;
    type ProcError = ApproachCtrlError;

    /// Initialise the ApproachCtrl module.
    ///
    /// Expected init data is the already loaded parameters, so that the
    /// executable can apply command line overrides first.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        init_data.validate()?;

        self.params = init_data;
        self.reset();

        self.arch_state = Archiver::from_path(session, "approach_ctrl/state.csv")?;
        self.arch_report = Archiver::from_path(session, "approach_ctrl/status_report.csv")?;
        self.arch_output = Archiver::from_path(session, "approach_ctrl/output.csv")?;

        info!(
            "ApproachCtrl initialised: standoff {} cm, tolerance {} px, hysteresis {:?}",
            self.params.target_standoff_cm,
            self.params.heading_tolerance_px,
            self.params.hysteresis_margin_px
        );

        Ok(())
    }

    /// Perform cyclic processing of approach control.
    ///
    /// On error the internal state is unchanged, no output is held and the
    /// report is marked as faulted.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        let TickOutput { cmd, report } =
            match tick(&mut self.state, &self.params, input_data.sample, input_data.dt_s) {
                Ok(o) => o,
                Err(e) => {
                    self.output = None;
                    self.report.faulted = true;
                    return Err(e);
                }
            };

        self.report = report;
        self.output = Some(cmd);

        Ok((cmd, report))
    }
}

impl ApproachCtrl {
    fn output_record(&self) -> OutputRecord {
        match self.output {
            Some(cmd) => OutputRecord {
                emitted: true,
                drive: cmd.drive,
                steer: cmd.steer,
            },
            None => OutputRecord {
                emitted: false,
                drive: 0.0,
                steer: 0.0,
            },
        }
    }
}

impl Archived for ApproachCtrl {
    fn write(&mut self) -> Result<(), ArchiveError> {
        let record = self.output_record();

        self.arch_state.serialise(self.state)?;
        self.arch_report.serialise(self.report)?;
        self.arch_output.serialise(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::approach_ctrl::Phase;

    #[test]
    fn test_new_rejects_invalid_params() {
        let mut params = Params::default();
        params.smoothing_alpha = -0.1;
        assert!(ApproachCtrl::new(params).is_err());
    }

    #[test]
    fn test_proc_and_reset() {
        let mut ctrl = ApproachCtrl::new(Params::default()).unwrap();

        let (cmd, report) = ctrl
            .proc(&InputData {
                sample: Some(ControlSample::new(100.0, 0.0)),
                dt_s: 0.1,
            })
            .unwrap();
        assert_eq!(report.phase, Phase::Seeking);
        assert_eq!(ctrl.output, Some(cmd));
        assert!(ctrl.state().lat_integral > 0.0);

        ctrl.reset();
        assert_eq!(*ctrl.state(), ControllerState::default());
        assert_eq!(ctrl.output, None);
    }

    #[test]
    fn test_faulted_proc_not_archived_as_emitted() {
        let mut ctrl = ApproachCtrl::new(Params::default()).unwrap();

        let (cmd, report) = ctrl
            .proc(&InputData {
                sample: Some(ControlSample::new(20.0, 90.0)),
                dt_s: 0.1,
            })
            .unwrap();
        assert!(!report.faulted);
        assert_eq!(
            ctrl.output_record(),
            OutputRecord {
                emitted: true,
                drive: cmd.drive,
                steer: cmd.steer,
            }
        );
        let state = *ctrl.state();

        let res = ctrl.proc(&InputData {
            sample: Some(ControlSample::new(20.0, 90.0)),
            dt_s: 0.0,
        });
        assert!(matches!(res, Err(ApproachCtrlError::InvalidTick(_))));
        assert_eq!(*ctrl.state(), state);
        assert_eq!(ctrl.output, None);
        assert!(ctrl.report.faulted);
        assert_eq!(ctrl.report.phase, report.phase);
        assert_eq!(
            ctrl.output_record(),
            OutputRecord {
                emitted: false,
                drive: 0.0,
                steer: 0.0,
            }
        );

        // The next good tick clears the fault
        let (_, report) = ctrl
            .proc(&InputData {
                sample: Some(ControlSample::new(20.0, 90.0)),
                dt_s: 0.1,
            })
            .unwrap();
        assert!(!report.faulted);
        assert!(ctrl.output.is_some());
    }
}
