//! Parameters structure for ObjLoc

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{ColourRange, ObjLocError};
use comms_if::eqpt::cam::{REF_IMAGE_HEIGHT_PX, REF_IMAGE_WIDTH_PX};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for object location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Params {
    /// Expected width of the camera frames
    pub image_width_px: u32,

    /// Expected height of the camera frames
    pub image_height_px: u32,

    /// Name of the entry in `targets` to look for
    pub target: String,

    /// Known target colours, by name
    pub targets: HashMap<String, ColourRange>,

    /// Smallest region considered to be a target
    pub min_region_area_px: usize,

    /// Scale from a depth image value to centimeters
    pub depth_scale_cm_per_unit: f64,

    /// Number of lidar samples per pixel of lateral error
    pub lidar_px_to_sample_scale: f64,

    /// Distance reported when a target is seen but neither depth nor lidar
    /// gives a reading. This is only an approximation to let the controller
    /// close on the target, not a measurement.
    ///
    /// Units: centimeters
    pub fixed_distance_fallback_cm: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        let mut targets = HashMap::new();
        targets.insert(
            String::from("red_cone"),
            ColourRange::new([160, 50, 50], [10, 255, 255]),
        );
        // Wide red band with no saturation or value floor
        targets.insert(
            String::from("red_wide"),
            ColourRange::new([134, 0, 0], [179, 255, 255]),
        );
        targets.insert(
            String::from("deer"),
            ColourRange::new([107, 0, 67], [124, 185, 207]),
        );
        targets.insert(
            String::from("candle"),
            ColourRange::new([0, 0, 207], [179, 255, 239]),
        );

        Self {
            image_width_px: REF_IMAGE_WIDTH_PX,
            image_height_px: REF_IMAGE_HEIGHT_PX,
            target: String::from("red_cone"),
            targets,
            min_region_area_px: 30,
            depth_scale_cm_per_unit: 0.1,
            lidar_px_to_sample_scale: 0.34,
            fixed_distance_fallback_cm: None,
        }
    }
}

impl Params {
    /// Colour range of the selected target.
    pub fn target_range(&self) -> Result<ColourRange, ObjLocError> {
        self.targets
            .get(&self.target)
            .copied()
            .ok_or_else(|| ObjLocError::UnknownTarget(self.target.clone()))
    }

    /// Check the parameters can be used for object location.
    pub fn validate(&self) -> Result<(), ObjLocError> {
        if self.image_width_px == 0 || self.image_height_px == 0 {
            return Err(ObjLocError::InvalidParams("image dimensions must be non-zero"));
        }
        if self.min_region_area_px == 0 {
            return Err(ObjLocError::InvalidParams("min_region_area_px must be at least 1"));
        }
        if !(self.depth_scale_cm_per_unit.is_finite() && self.depth_scale_cm_per_unit > 0.0) {
            return Err(ObjLocError::InvalidParams(
                "depth_scale_cm_per_unit must be finite and positive",
            ));
        }
        if !(self.lidar_px_to_sample_scale.is_finite() && self.lidar_px_to_sample_scale >= 0.0) {
            return Err(ObjLocError::InvalidParams(
                "lidar_px_to_sample_scale must be finite and not negative",
            ));
        }
        if let Some(d) = self.fixed_distance_fallback_cm {
            if !(d.is_finite() && d > 0.0) {
                return Err(ObjLocError::InvalidParams(
                    "fixed_distance_fallback_cm must be finite and positive",
                ));
            }
        }

        let range = self.target_range()?;
        if !range.is_valid() {
            return Err(ObjLocError::InvalidParams("target colour range is empty"));
        }

        Ok(())
    }
}
