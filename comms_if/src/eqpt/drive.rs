//! # Drive Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Normalised demand sent to the drive actuators each tick.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuationCommand {
    /// Forward (positive) or backward (negative) speed demand, in `[-1, 1]`.
    pub drive: f64,

    /// Steering demand in `[-1, 1]`, positive turns right.
    pub steer: f64,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Equipment which accepts drive demands.
///
/// Sending is fire-and-forget, there is no acknowledgement.
pub trait DriveSink {
    fn send(&mut self, cmd: ActuationCommand);
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ActuationCommand {
    /// A command which brings the robot to a stop with the steering centred.
    pub fn stop() -> Self {
        Self::default()
    }

    /// True if both demands are inside the normalised range.
    pub fn is_normalised(&self) -> bool {
        (-1.0..=1.0).contains(&self.drive) && (-1.0..=1.0).contains(&self.steer)
    }
}
