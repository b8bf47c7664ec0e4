//! # Camera Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use image::RgbImage;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Width of the reference forward camera image
pub const REF_IMAGE_WIDTH_PX: u32 = 640;

/// Height of the reference forward camera image
pub const REF_IMAGE_HEIGHT_PX: u32 = 480;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A colour image from a camera
#[derive(Debug, Clone)]
pub struct CamImage {
    /// UTC timestamp at which the frame was acquired
    pub timestamp: DateTime<Utc>,

    /// The image itself, 8 bit RGB
    pub image: RgbImage,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CamImage {
    /// Get the (width, height) of the image in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
