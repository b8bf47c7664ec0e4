//! Parameters structure for the simulation

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::SimError;
use comms_if::eqpt::{
    cam::{REF_IMAGE_HEIGHT_PX, REF_IMAGE_WIDTH_PX},
    lidar::REF_NUM_SAMPLES,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the simulated scene.
///
/// Positions are in the world frame, X to the right and Y forward of the
/// robot's start pose. Headings are measured clockwise from +Y.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    // ---- ROBOT ----
    /// Units: centimeters
    pub start_pos_cm: [f64; 2],

    /// Units: radians
    pub start_heading_rad: f64,

    /// Speed at a drive demand of 1
    ///
    /// Units: centimeters/second
    pub max_speed_cms: f64,

    /// Front wheel angle at a steer demand of 1
    ///
    /// Units: radians
    pub max_steer_angle_rad: f64,

    /// Units: centimeters
    pub wheelbase_cm: f64,

    // ---- TARGET ----
    /// Units: centimeters
    pub target_pos_cm: [f64; 2],

    /// Units: centimeters
    pub target_radius_cm: f64,

    pub target_colour: [u8; 3],

    pub background_colour: [u8; 3],

    // ---- SENSORS ----
    pub image_width_px: u32,
    pub image_height_px: u32,

    /// Horizontal field of view of the camera
    ///
    /// Units: degrees
    pub hfov_deg: f64,

    /// Produce a depth image with every frame
    pub provide_depth: bool,

    /// Produce a lidar scan with every frame
    pub provide_lidar: bool,

    pub lidar_num_samples: usize,

    /// Amplitude of the noise added to depth and lidar ranges, zero to
    /// disable.
    ///
    /// Units: centimeters
    pub range_noise_cm: f64,

    /// Rate at which the range noise varies
    ///
    /// Units: 1/seconds
    pub range_noise_freq_hz: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            start_pos_cm: [0.0, 0.0],
            start_heading_rad: 0.0,
            max_speed_cms: 100.0,
            max_steer_angle_rad: 0.35,
            wheelbase_cm: 32.0,
            target_pos_cm: [60.0, 250.0],
            target_radius_cm: 10.0,
            target_colour: [255, 40, 40],
            background_colour: [40, 90, 120],
            image_width_px: REF_IMAGE_WIDTH_PX,
            image_height_px: REF_IMAGE_HEIGHT_PX,
            hfov_deg: 110.0,
            provide_depth: true,
            provide_lidar: false,
            lidar_num_samples: REF_NUM_SAMPLES,
            range_noise_cm: 0.0,
            range_noise_freq_hz: 0.5,
        }
    }
}

impl SimParams {
    pub fn validate(&self) -> Result<(), SimError> {
        let positive = [
            ("max_speed_cms", self.max_speed_cms),
            ("wheelbase_cm", self.wheelbase_cm),
            ("target_radius_cm", self.target_radius_cm),
        ];
        for &(name, value) in positive.iter() {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::InvalidParams(name));
            }
        }

        if !(self.hfov_deg > 0.0 && self.hfov_deg < 180.0) {
            return Err(SimError::InvalidParams("hfov_deg"));
        }
        if !(self.max_steer_angle_rad >= 0.0 && self.max_steer_angle_rad < std::f64::consts::FRAC_PI_2) {
            return Err(SimError::InvalidParams("max_steer_angle_rad"));
        }
        if self.image_width_px == 0 || self.image_height_px == 0 {
            return Err(SimError::InvalidParams("image dimensions"));
        }
        if self.provide_lidar && self.lidar_num_samples == 0 {
            return Err(SimError::InvalidParams("lidar_num_samples"));
        }
        if !(self.range_noise_cm.is_finite() && self.range_noise_cm >= 0.0) {
            return Err(SimError::InvalidParams("range_noise_cm"));
        }

        Ok(())
    }
}
