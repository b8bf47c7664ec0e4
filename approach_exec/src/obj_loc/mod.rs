//! # Object location module
//!
//! ObjLoc finds a coloured target in the forward camera frame and turns it
//! into the errors used by approach control:
//!
//! - The lateral error is the horizontal offset of the target's centroid from
//!   the centre of the image, negative to the left and positive to the right.
//! - The distance is taken from the depth image at the centroid, or from the
//!   lidar sample looking towards the target, or from a configured fallback.
//!   Zero means no reliable reading.
//!
//! The target is the largest 8-connected region of pixels whose HSV colour
//! falls in the range of the selected target.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod colour;
mod overlay;
mod params;
mod range;
mod region;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

pub use colour::*;
pub use overlay::*;
pub use params::*;
pub use range::*;
pub use region::*;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ObjLoc processing.
#[derive(Debug, thiserror::Error)]
pub enum ObjLocError {
    #[error("Expected a {expected:?} frame but got {found:?}")]
    UnexpectedFrameSize {
        expected: (u32, u32),
        found: (u32, u32),
    },

    #[error("No colour range is configured for target \"{0}\"")]
    UnknownTarget(String),

    #[error("Invalid parameters: {0}")]
    InvalidParams(&'static str),

    #[error("Could not create an archive: {0}")]
    ArchiveError(#[from] util::archive::ArchiveError),
}
