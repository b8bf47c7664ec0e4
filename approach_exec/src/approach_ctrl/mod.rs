//! # Approach control module
//!
//! Approach control drives the robot towards a target seen by the camera and
//! holds it at a standoff distance. Two channels operate on the errors
//! reported by ObjLoc each tick:
//!
//! - The lateral channel is a PID controller on the horizontal pixel offset
//!   of the target from the image centre, producing the steer demand.
//! - The distance channel is a PD controller on the difference between the
//!   measured range and the standoff distance, producing the drive demand.
//!
//! The controller is in one of two phases. While `Seeking` the target is too
//! far off-centre to close on it, so the robot only turns and holds the
//! conservative drive demand (backing away by default). Once `Aligned` the
//! steer demand is scaled down and reversed to settle the heading, the
//! lateral integral is cleared, and the distance channel takes over the drive.
//!
//! Both outputs are saturated to `[-1, 1]` and passed through an exponential
//! low pass filter before being sent to the drive.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controllers;
mod params;
mod state;
mod tick;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::*;
pub use state::*;
pub use tick::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ApproachCtrl processing.
///
/// A tick which returns one of these errors has not modified the controller
/// state and has produced no command.
#[derive(Debug, thiserror::Error)]
pub enum ApproachCtrlError {
    #[error("Invalid tick duration {0} s, the time since the last tick must be positive")]
    InvalidTick(f64),

    #[error("Control sample contains a non-finite value: {0:?}")]
    NonFiniteSample(ControlSample),

    #[error("Controller state would become non-finite, tick rejected")]
    NonFiniteState,
}
