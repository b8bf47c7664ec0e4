//! # Lidar Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of samples in a scan from the reference lidar, spanning a full revolution.
pub const REF_NUM_SAMPLES: usize = 720;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single revolution of range samples.
///
/// Sample 0 points straight ahead and the sample angle increases counter-clockwise, so the samples
/// just to the right of forward are at the end of the scan.
#[derive(Debug, Clone)]
pub struct LidarScan {
    /// UTC timestamp at which the scan was acquired
    pub timestamp: DateTime<Utc>,

    /// Range samples in centimeters, zero where there was no return.
    pub samples_cm: Vec<f64>,
}
