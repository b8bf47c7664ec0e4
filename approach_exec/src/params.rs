//! # Approach Executable Parameters
//!
//! This module provides parameters for the approach executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproachExecParams {
    /// Target period of one cycle.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Stop after this many cycles, or run until stopped if not set.
    pub max_num_cycles: Option<u64>,

    /// Number of consecutive faulted ticks after which the run is aborted.
    pub max_consec_faulted_ticks: u64,

    /// Save an overlay image of the detected target every this many cycles,
    /// or never if not set.
    pub overlay_save_interval_cycles: Option<u64>,

    /// Stop the run once the robot is within this distance of the standoff
    /// and the drive demand has settled below `settled_drive_dem`.
    ///
    /// Units: centimeters
    pub settled_dist_error_cm: f64,

    /// Drive demand magnitude below which the approach is considered settled
    pub settled_drive_dem: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ExecParamsError {
    #[error("Cycle period must be positive and finite, found {0}")]
    InvalidCyclePeriod(f64),

    #[error("Settled thresholds must not be negative or NaN, found {0} cm and {1}")]
    InvalidSettledThresholds(f64, f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for ApproachExecParams {
    fn default() -> Self {
        Self {
            cycle_period_s: 0.05,
            max_num_cycles: Some(1200),
            max_consec_faulted_ticks: 10,
            overlay_save_interval_cycles: Some(20),
            settled_dist_error_cm: 5.0,
            settled_drive_dem: 0.05,
        }
    }
}

impl ApproachExecParams {
    /// Check the parameters can be used to run the cyclic loop.
    pub fn validate(&self) -> Result<(), ExecParamsError> {
        if !(self.cycle_period_s > 0.0) || !self.cycle_period_s.is_finite() {
            return Err(ExecParamsError::InvalidCyclePeriod(self.cycle_period_s));
        }
        if !(self.settled_dist_error_cm >= 0.0 && self.settled_drive_dem >= 0.0) {
            return Err(ExecParamsError::InvalidSettledThresholds(
                self.settled_dist_error_cm,
                self.settled_drive_dem,
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate_cycle_period() {
        let mut p = ApproachExecParams::default();
        assert!(p.validate().is_ok());

        for period in [0.0, -0.05, f64::INFINITY, f64::NAN].iter() {
            p.cycle_period_s = *period;
            assert!(matches!(
                p.validate(),
                Err(ExecParamsError::InvalidCyclePeriod(_))
            ));
        }
    }

    #[test]
    fn test_validate_settled_thresholds() {
        let mut p = ApproachExecParams::default();
        p.settled_drive_dem = -0.1;
        assert!(matches!(
            p.validate(),
            Err(ExecParamsError::InvalidSettledThresholds(..))
        ));
    }
}
